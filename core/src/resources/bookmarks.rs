use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::RequestSpec;
use crate::resource::{segment, Resource};
use crate::types::{Bookmark, BookmarkStatus};

impl Resource<Bookmark> {
    /// Whether the current user has bookmarked `post_id`.
    pub async fn check_status(&self, post_id: &str) -> Result<BookmarkStatus, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, format!("/bookmarks/check/{}", segment(post_id)));
        self.client().fetch_json(spec).await
    }
}
