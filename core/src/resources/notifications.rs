use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::normalize::MessageResponse;
use crate::request::RequestSpec;
use crate::resource::{Resource, ResourceKind};
use crate::types::{Notification, UnreadCount};

impl Resource<Notification> {
    pub async fn mark_read(&self, id: &str) -> Result<Notification, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Put, self.action_path(id, "read"));
        self.client().fetch_entity(spec, Notification::ENTITY_KEY).await
    }

    pub async fn mark_all_read(&self) -> Result<MessageResponse, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Put, "/notifications/read-all");
        self.client().fetch_message(spec).await
    }

    pub async fn unread_count(&self) -> Result<UnreadCount, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, "/notifications/unread-count");
        self.client().fetch_json(spec).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::HttpMethod;
    use crate::query::Query;
    use crate::testing::scripted_client;
    use serde_json::json;

    #[tokio::test]
    async fn read_flags_and_counts() {
        let (client, transport) = scripted_client();
        transport.reply(200, json!({"notification": {"_id": "n1", "message": "hi", "read": true}}));
        transport.reply(200, json!({"message": "All notifications marked as read"}));
        transport.reply(200, json!({"unreadCount": 0}));
        let notifications = client.notifications();

        assert!(notifications.mark_read("n1").await.unwrap().read);
        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/api/notifications/n1/read");

        notifications.mark_all_read().await.unwrap();
        assert_eq!(transport.last_request().url, "http://localhost:3000/api/notifications/read-all");

        assert_eq!(notifications.unread_count().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn list_filters_unread() {
        let (client, transport) = scripted_client();
        transport.reply(
            200,
            json!({"notifications": [{"_id": "n1", "type": "follow", "message": "bob followed you"}], "totalNotifications": 4, "currentPage": 1, "totalPages": 4}),
        );

        let page = client
            .notifications()
            .list(&Query::new().param("read", false).page(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total_items, 4);
        assert_eq!(page.items[0].kind.as_deref(), Some("follow"));
        assert_eq!(
            transport.last_request().url,
            "http://localhost:3000/api/notifications?read=false&page=1&limit=1"
        );
    }
}
