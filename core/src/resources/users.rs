use crate::error::ApiError;
use crate::http::{HttpMethod, RequestBody};
use crate::normalize::{MessageResponse, PaginatedResult};
use crate::query::Query;
use crate::request::RequestSpec;
use crate::resource::{Resource, ResourceKind};
use crate::types::User;
use crate::upload::{UploadFile, UploadRequest};

impl Resource<User> {
    pub async fn follow(&self, id: &str) -> Result<MessageResponse, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, self.action_path(id, "follow"));
        self.client().fetch_message(spec).await
    }

    pub async fn unfollow(&self, id: &str) -> Result<MessageResponse, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Delete, self.action_path(id, "follow"));
        self.client().fetch_message(spec).await
    }

    pub async fn followers(&self, id: &str, query: &Query) -> Result<PaginatedResult<User>, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, self.action_path(id, "followers")).query(query.clone());
        self.client().fetch_page(spec, User::PAGE_KEYS).await
    }

    pub async fn following(&self, id: &str, query: &Query) -> Result<PaginatedResult<User>, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, self.action_path(id, "following")).query(query.clone());
        self.client().fetch_page(spec, User::PAGE_KEYS).await
    }

    /// Replace the avatar; returns the updated user.
    pub async fn upload_avatar(&self, id: &str, file: UploadFile) -> Result<User, ApiError> {
        let body = UploadRequest::new(file).into_multipart();
        let spec = RequestSpec::new(HttpMethod::Post, self.action_path(id, "avatar")).body(RequestBody::Multipart(body));
        self.client().fetch_entity(spec, User::ENTITY_KEY).await
    }
}
