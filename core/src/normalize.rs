//! Reshaping success bodies into canonical results.
//!
//! Resource endpoints name their pagination fields after the resource
//! (`posts`/`totalPosts`, `users`/`totalUsers`, `media`/`totalMedia`) while
//! generic ones use `data`/`totalItems`. Everything above this module sees
//! only `PaginatedResult`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

const GENERIC_ITEMS_KEY: &str = "data";
const GENERIC_TOTAL_KEY: &str = "totalItems";
const ID_KEYS: [&str; 2] = ["_id", "id"];

/// Backend-independent list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> PaginatedResult<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Resource-specific field names tried before the generic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageKeys {
    pub items: &'static str,
    pub total: &'static str,
}

impl PageKeys {
    pub const GENERIC: PageKeys = PageKeys {
        items: GENERIC_ITEMS_KEY,
        total: GENERIC_TOTAL_KEY,
    };
}

/// `{message}` acknowledgement, returned by deletes and toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn normalize_page<T: DeserializeOwned>(
    body: &Value,
    keys: PageKeys,
) -> Result<PaginatedResult<T>, serde_json::Error> {
    let raw_items = match body {
        Value::Array(_) => Some(body),
        _ => first_present(body, &[keys.items, GENERIC_ITEMS_KEY]),
    };
    let items: Vec<T> = match raw_items {
        Some(items) => Vec::<T>::deserialize(items)?,
        None => Vec::new(),
    };

    let total_items = first_present(body, &[keys.total, GENERIC_TOTAL_KEY])
        .and_then(as_count)
        .unwrap_or(items.len() as u64);
    let current_page = body.get("currentPage").and_then(as_count).unwrap_or(1);
    let total_pages = body.get("totalPages").and_then(as_count).unwrap_or(1);

    Ok(PaginatedResult {
        items,
        current_page,
        total_pages,
        total_items,
    })
}

/// The entity under `key`, else under `data`, else the body itself. A body
/// carrying its own `_id`/`id` is already the entity and is never unwrapped.
pub fn normalize_entity<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, serde_json::Error> {
    if ID_KEYS.iter().any(|k| body.get(*k).is_some_and(|v| !v.is_null())) {
        return T::deserialize(body);
    }
    let inner = [key, GENERIC_ITEMS_KEY]
        .into_iter()
        .filter_map(|k| body.get(k))
        .find(|v| v.is_object())
        .unwrap_or(body);
    T::deserialize(inner)
}

/// Empty (204) bodies become a default acknowledgement.
pub fn normalize_message(body: &Value) -> MessageResponse {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("ok")
        .to_string();
    MessageResponse { message }
}

fn first_present<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| body.get(*k)).find(|v| !v.is_null())
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a response body as JSON; an empty body reads as `null`.
pub(crate) fn body_json(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::decode(response.status, e))
}
