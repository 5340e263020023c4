use crate::error::ApiError;
use crate::http::{HttpMethod, RequestBody};
use crate::request::RequestSpec;
use crate::resource::{Resource, ResourceKind};
use crate::types::Media;
use crate::upload::{UploadFile, UploadRequest};

impl Resource<Media> {
    fn upload_path(&self) -> String {
        format!("{}/upload", self.collection_path())
    }

    /// Upload one or more files. A single file answers with one document,
    /// several files with a list; both come back as a `Vec`.
    pub async fn upload(&self, request: UploadRequest) -> Result<Vec<Media>, ApiError> {
        let multiple = request.is_multiple();
        let spec = RequestSpec::new(HttpMethod::Post, self.upload_path())
            .body(RequestBody::Multipart(request.into_multipart()));
        let response = self.client().send(spec).await?;
        if multiple {
            Ok(self.client().parse_page(&response, Media::PAGE_KEYS)?.items)
        } else {
            Ok(vec![self.client().parse_entity(&response, Media::ENTITY_KEY)?])
        }
    }

    pub async fn upload_one(&self, file: UploadFile) -> Result<Media, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, self.upload_path())
            .body(RequestBody::Multipart(UploadRequest::new(file).into_multipart()));
        self.client().fetch_entity(spec, Media::ENTITY_KEY).await
    }
}
