use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::query::Query;
use crate::request::RequestSpec;
use crate::resource::{segment, Resource, ResourceKind};
use crate::types::{LikeStatus, Post};

impl Resource<Post> {
    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, format!("/posts/slug/{}", segment(slug)));
        self.client().fetch_entity(spec, Post::ENTITY_KEY).await
    }

    pub async fn like(&self, id: &str) -> Result<LikeStatus, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, self.action_path(id, "like"));
        self.client().fetch_json(spec).await
    }

    pub async fn unlike(&self, id: &str) -> Result<LikeStatus, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Delete, self.action_path(id, "like"));
        self.client().fetch_json(spec).await
    }

    pub async fn trending(&self, limit: Option<u32>) -> Result<Vec<Post>, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, "/posts/trending").query(Query::new().param_opt("limit", limit));
        let page = self.client().fetch_page(spec, Post::PAGE_KEYS).await?;
        Ok(page.items)
    }

    pub async fn related(&self, id: &str, limit: Option<u32>) -> Result<Vec<Post>, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, self.action_path(id, "related"))
            .query(Query::new().param_opt("limit", limit));
        let page = self.client().fetch_page(spec, Post::PAGE_KEYS).await?;
        Ok(page.items)
    }
}
