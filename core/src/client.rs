//! Request pipeline shared by every resource facade.
//!
//! # Design
//! `ApiClient` holds the base URL, the shared `Session` and a `Transport`.
//! Work is split the same way for every call: `build` produces an
//! `HttpRequest`, a transport executes it, and a `parse_*` method turns the
//! `HttpResponse` into a typed value. The `fetch_*` helpers chain the three.
//! Hosts that perform their own I/O can call `build` and `parse_*` directly
//! and still get the same headers, classification and session handling.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::classify::{classify, classify_http};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestBody};
use crate::normalize::{body_json, normalize_entity, normalize_message, normalize_page, MessageResponse, PageKeys, PaginatedResult};
use crate::request::{build_request, RequestSpec};
use crate::session::Session;
use crate::transport::Transport;

#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<Session>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Serialize `payload` into a JSON request body.
    pub fn json_body<B: Serialize + ?Sized>(payload: &B) -> Result<RequestBody, ApiError> {
        serde_json::to_string(payload)
            .map(RequestBody::Json)
            .map_err(ApiError::encode)
    }

    /// Build the request using the token held right now.
    pub fn build(&self, spec: RequestSpec) -> HttpRequest {
        let token = self.session.get_token();
        build_request(&self.base_url, spec, token.as_deref())
    }

    /// Build, execute and classify. Non-2xx responses never come back as `Ok`.
    pub async fn send(&self, spec: RequestSpec) -> Result<HttpResponse, ApiError> {
        let request = self.build(spec);
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|failure| classify(failure, &self.session))?;
        self.check(&response)?;
        Ok(response)
    }

    /// Classify a response a host executed itself. 2xx passes; anything
    /// else goes through the classifier, including the 401 session clear.
    pub fn check(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        Err(classify_http(response.status, &response.body, &self.session))
    }

    pub fn parse_json<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, ApiError> {
        self.check(response)?;
        let body = body_json(response)?;
        T::deserialize(&body).map_err(|e| ApiError::decode(response.status, e))
    }

    pub fn parse_entity<T: DeserializeOwned>(&self, response: &HttpResponse, key: &str) -> Result<T, ApiError> {
        self.check(response)?;
        let body = body_json(response)?;
        normalize_entity(&body, key).map_err(|e| ApiError::decode(response.status, e))
    }

    pub fn parse_page<T: DeserializeOwned>(
        &self,
        response: &HttpResponse,
        keys: PageKeys,
    ) -> Result<PaginatedResult<T>, ApiError> {
        self.check(response)?;
        let body = body_json(response)?;
        normalize_page(&body, keys).map_err(|e| ApiError::decode(response.status, e))
    }

    pub fn parse_message(&self, response: &HttpResponse) -> Result<MessageResponse, ApiError> {
        self.check(response)?;
        Ok(normalize_message(&body_json(response)?))
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        let response = self.send(spec).await?;
        self.parse_json(&response)
    }

    pub async fn fetch_entity<T: DeserializeOwned>(&self, spec: RequestSpec, key: &str) -> Result<T, ApiError> {
        let response = self.send(spec).await?;
        self.parse_entity(&response, key)
    }

    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        keys: PageKeys,
    ) -> Result<PaginatedResult<T>, ApiError> {
        let response = self.send(spec).await?;
        self.parse_page(&response, keys)
    }

    pub async fn fetch_message(&self, spec: RequestSpec) -> Result<MessageResponse, ApiError> {
        let response = self.send(spec).await?;
        self.parse_message(&response)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
