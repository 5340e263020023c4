//! Generic CRUD facade.
//!
//! # Design
//! A resource kind is described once by implementing `ResourceKind` (path,
//! singular key, pagination keys). `Resource<T>` then provides list, get,
//! create, update and delete for it. Resource-specific actions are inherent
//! methods on the concrete `Resource<Post>`, `Resource<User>`, ... so a new
//! kind needs no new plumbing.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::normalize::{MessageResponse, PageKeys, PaginatedResult};
use crate::query::Query;
use crate::request::RequestSpec;

pub trait ResourceKind: DeserializeOwned + Send + 'static {
    /// Collection path without slashes, e.g. `posts`.
    const PATH: &'static str;
    /// Key wrapping a single entity, e.g. `post`.
    const ENTITY_KEY: &'static str;
    /// Keys of the item list and total count, e.g. `posts` / `totalPosts`.
    const PAGE_KEYS: PageKeys;
}

/// Implement `ResourceKind` for a DTO.
#[macro_export]
macro_rules! resource_kind {
    ($ty:ty, path = $path:literal, entity = $entity:literal, items = $items:literal, total = $total:literal) => {
        impl $crate::resource::ResourceKind for $ty {
            const PATH: &'static str = $path;
            const ENTITY_KEY: &'static str = $entity;
            const PAGE_KEYS: $crate::normalize::PageKeys = $crate::normalize::PageKeys {
                items: $items,
                total: $total,
            };
        }
    };
}

pub struct Resource<T> {
    client: ApiClient,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T: ResourceKind> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("path", &T::PATH).finish()
    }
}

impl<T: ResourceKind> Resource<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `/{PATH}`
    pub fn collection_path(&self) -> String {
        format!("/{}", T::PATH)
    }

    /// `/{PATH}/{id}` with the id percent-encoded.
    pub fn item_path(&self, id: &str) -> String {
        format!("/{}/{}", T::PATH, segment(id))
    }

    /// `/{PATH}/{id}/{action}`
    pub fn action_path(&self, id: &str, action: &str) -> String {
        format!("{}/{action}", self.item_path(id))
    }

    pub async fn list(&self, query: &Query) -> Result<PaginatedResult<T>, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, self.collection_path()).query(query.clone());
        self.client.fetch_page(spec, T::PAGE_KEYS).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<T, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Get, self.item_path(id));
        self.client.fetch_entity(spec, T::ENTITY_KEY).await
    }

    pub async fn create<P: Serialize + ?Sized + Sync>(&self, payload: &P) -> Result<T, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, self.collection_path()).body(ApiClient::json_body(payload)?);
        self.client.fetch_entity(spec, T::ENTITY_KEY).await
    }

    pub async fn update<P: Serialize + ?Sized + Sync>(&self, id: &str, patch: &P) -> Result<T, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Put, self.item_path(id)).body(ApiClient::json_body(patch)?);
        self.client.fetch_entity(spec, T::ENTITY_KEY).await
    }

    pub async fn delete(&self, id: &str) -> Result<MessageResponse, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Delete, self.item_path(id));
        self.client.fetch_message(spec).await
    }
}

/// Percent-encode one path segment; only RFC 3986 unreserved characters pass.
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
