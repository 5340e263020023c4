//! Typed API client and session layer for the blog backend.
//!
//! # Overview
//! Every REST resource kind, file upload, paginated list and bearer-token
//! call goes through one pipeline:
//! facade → query serializer + request builder → transport →
//! error classifier (may clear the session) or response normalizer → caller.
//!
//! # Design
//! - `Session` is an explicit shared object with a change channel; a 401
//!   anywhere clears it so later requests go out without a stale token.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`),
//!   so hosts can run the I/O themselves and reuse `build` / `parse_*`.
//! - `PaginatedResult` is the only list shape callers see, whatever field
//!   names the backend used.
//! - `Resource<T>` implements CRUD once; resource-specific actions are
//!   inherent methods on its concrete instantiations.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod query;
pub mod request;
pub mod resource;
pub mod resources;
pub mod sequence;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

#[cfg(test)]
mod testing;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use normalize::{MessageResponse, PageKeys, PaginatedResult};
pub use query::Query;
pub use request::RequestSpec;
pub use resource::{Resource, ResourceKind};
pub use resources::{Auth, Search};
pub use sequence::Sequencer;
pub use session::{FileStorage, MemoryStorage, NoopStorage, Session, TokenStorage};
pub use transport::{ReqwestTransport, RetryTransport, Transport, TransportFailure};
pub use upload::{UploadFile, UploadFiles, UploadRequest};
