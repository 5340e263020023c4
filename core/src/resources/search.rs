//! Full-text search across resource kinds: `GET /search/{kind}?q=<term>`.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::normalize::PaginatedResult;
use crate::query::Query;
use crate::request::RequestSpec;
use crate::resource::ResourceKind;
use crate::types::{Post, Tag, User};

#[derive(Debug, Clone)]
pub struct Search {
    client: ApiClient,
}

impl Search {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Search the kind named by `T::PATH`; results use `T`'s pagination keys.
    pub async fn search<T: ResourceKind>(&self, term: &str, query: &Query) -> Result<PaginatedResult<T>, ApiError> {
        let query = Query::new().param("q", term).merge(query.clone());
        let spec = RequestSpec::new(HttpMethod::Get, format!("/search/{}", T::PATH)).query(query);
        self.client.fetch_page(spec, T::PAGE_KEYS).await
    }

    pub async fn posts(&self, term: &str, query: &Query) -> Result<PaginatedResult<Post>, ApiError> {
        self.search(term, query).await
    }

    pub async fn users(&self, term: &str, query: &Query) -> Result<PaginatedResult<User>, ApiError> {
        self.search(term, query).await
    }

    pub async fn tags(&self, term: &str, query: &Query) -> Result<PaginatedResult<Tag>, ApiError> {
        self.search(term, query).await
    }
}

#[cfg(test)]
mod tests {
    use crate::query::Query;
    use crate::testing::scripted_client;
    use serde_json::json;

    #[tokio::test]
    async fn term_is_encoded_and_pagination_normalized() {
        let (client, transport) = scripted_client();
        transport.reply(
            200,
            json!({"posts": [{"_id": "p1", "title": "Async Rust"}], "totalPosts": 1, "currentPage": 1, "totalPages": 1}),
        );

        let page = client.search().posts("async rust", &Query::new().param("limit", 5)).await.unwrap();

        assert_eq!(page.items[0].title, "Async Rust");
        assert_eq!(
            transport.last_request().url,
            "http://localhost:3000/api/search/posts?q=async+rust&limit=5"
        );
    }

    #[tokio::test]
    async fn users_and_tags_use_their_own_paths() {
        let (client, transport) = scripted_client();
        transport.reply(200, json!({"users": [], "totalUsers": 0}));
        transport.reply(200, json!({"data": [{"_id": "t1", "name": "rust"}], "totalItems": 1}));
        let search = client.search();

        assert!(search.users("ada", &Query::new()).await.unwrap().items.is_empty());
        assert_eq!(transport.last_request().url, "http://localhost:3000/api/search/users?q=ada");

        assert_eq!(search.tags("ru", &Query::new()).await.unwrap().total_items, 1);
        assert_eq!(transport.last_request().url, "http://localhost:3000/api/search/tags?q=ru");
    }
}
