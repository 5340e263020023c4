use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::RequestSpec;
use crate::resource::{Resource, ResourceKind};
use crate::types::{Draft, Post};

impl Resource<Draft> {
    /// Turn a draft into a published post.
    pub async fn publish(&self, id: &str) -> Result<Post, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, self.action_path(id, "publish"));
        self.client().fetch_entity(spec, Post::ENTITY_KEY).await
    }
}
