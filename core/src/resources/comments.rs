use crate::error::ApiError;
use crate::normalize::PaginatedResult;
use crate::query::Query;
use crate::resource::Resource;
use crate::types::Comment;

impl Resource<Comment> {
    /// Comments on one post; `query` adds paging or sorting.
    pub async fn for_post(&self, post_id: &str, query: &Query) -> Result<PaginatedResult<Comment>, ApiError> {
        let query = Query::new().param("post", post_id).merge(query.clone());
        self.list(&query).await
    }
}
