//! Tags and categories. Both are plain CRUD; categories can also be looked
//! up by slug.

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::RequestSpec;
use crate::resource::{segment, Resource, ResourceKind};
use crate::types::Category;

impl Resource<Category> {
    pub async fn by_slug(&self, slug: &str) -> Result<Category, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, format!("/categories/slug/{}", segment(slug)));
        self.client().fetch_entity(spec, Category::ENTITY_KEY).await
    }
}
