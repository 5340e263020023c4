use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::RequestSpec;
use crate::resource::{segment, Resource, ResourceKind};
use crate::types::Collection;

impl Resource<Collection> {
    pub async fn add_post(&self, id: &str, post_id: &str) -> Result<Collection, ApiError> {
        let body = ApiClient::json_body(&json!({ "postId": post_id }))?;
        let spec = RequestSpec::new(HttpMethod::Post, self.action_path(id, "posts")).body(body);
        self.client().fetch_entity(spec, Collection::ENTITY_KEY).await
    }

    pub async fn remove_post(&self, id: &str, post_id: &str) -> Result<Collection, ApiError> {
        let path = format!("{}/{}", self.action_path(id, "posts"), segment(post_id));
        self.client()
            .fetch_entity(RequestSpec::new(HttpMethod::Delete, path), Collection::ENTITY_KEY)
            .await
    }
}
