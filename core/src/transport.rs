//! Executing requests over the network.
//!
//! A transport either returns the 2xx response or a `TransportFailure` that
//! keeps "nothing came back" apart from "the server said no". The retry
//! wrapper depends on that split: only GETs that never got an answer are
//! sent again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Why a request did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// No response was received: DNS, refused connection, reset, timeout.
    Network { message: String },
    /// The server answered with a non-2xx status.
    Http { status: u16, body: String },
    /// The request could not be encoded locally (for instance a bad MIME type).
    Encode { message: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed transport. Timeouts, when configured, count as network
/// failures.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.body(json),
            RequestBody::Multipart(body) => {
                let form = body.into_form().map_err(|e| TransportFailure::Encode {
                    message: e.to_string(),
                })?;
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| TransportFailure::Network {
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.map_err(|e| TransportFailure::Network {
            message: e.to_string(),
        })?;

        if !(200..300).contains(&status) {
            return Err(TransportFailure::Http { status, body });
        }
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sends an idempotent request a second time when the first attempt got no
/// response. HTTP failures and non-idempotent methods pass straight through.
#[derive(Debug, Clone)]
pub struct RetryTransport<T> {
    inner: T,
}

impl<T> RetryTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        if !request.method.is_idempotent() {
            return self.inner.execute(request).await;
        }
        match self.inner.execute(request.clone()).await {
            Err(TransportFailure::Network { message }) => {
                tracing::debug!(url = %request.url, %message, "network failure, retrying once");
                self.inner.execute(request).await
            }
            other => other,
        }
    }
}
