//! Query-string serialization for list and filter endpoints.
//!
//! Empty values (`None`, JSON `null`, `""`) never reach the wire, and list
//! values become repeated keys (`tags=a&tags=b`). A comma-joined list would
//! be read by the backend as one tag named `a,b`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// One query parameter value before stringification.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<QueryValue>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

macro_rules! int_query_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for QueryValue {
            fn from(value: $ty) -> Self {
                QueryValue::Int(i64::from(value))
            }
        })*
    };
}

int_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryValue> + Clone> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

/// Ordered set of query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Like `param`, but `None` is dropped.
    pub fn param_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Page and page size, the pair every list endpoint understands.
    pub fn page(self, page: u32, limit: u32) -> Self {
        self.param("page", page).param("limit", limit)
    }

    /// Build a query from any struct or map that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(params: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(params).map_err(ApiError::encode)? {
            Value::Object(map) => {
                let params = map
                    .into_iter()
                    .filter_map(|(key, value)| from_json(value).map(|value| (key, value)))
                    .collect();
                Ok(Self { params })
            }
            Value::Null => Ok(Self::default()),
            other => Err(ApiError::encode(format!(
                "query parameters must be an object, got {other}"
            ))),
        }
    }

    /// Append every parameter of `other`.
    pub fn merge(mut self, other: Query) -> Self {
        self.params.extend(other.params);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Wire pairs after omission and list expansion.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            push_pairs(&mut pairs, key, value);
        }
        pairs
    }

    /// Percent-encoded query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: &str, value: &QueryValue) {
    match value {
        QueryValue::Text(text) if text.is_empty() => {}
        QueryValue::Text(text) => pairs.push((key.to_string(), text.clone())),
        QueryValue::Int(n) => pairs.push((key.to_string(), n.to_string())),
        QueryValue::Float(n) => pairs.push((key.to_string(), n.to_string())),
        QueryValue::Bool(b) => pairs.push((key.to_string(), b.to_string())),
        QueryValue::List(items) => {
            for item in items {
                push_pairs(pairs, key, item);
            }
        }
    }
}

fn from_json(value: Value) -> Option<QueryValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(QueryValue::Bool(b)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => QueryValue::Int(i),
            // u64 beyond i64 and floats keep their JSON spelling.
            None => QueryValue::Text(n.to_string()),
        }),
        Value::String(s) => Some(QueryValue::Text(s)),
        Value::Array(items) => Some(QueryValue::List(
            items.into_iter().filter_map(from_json).collect(),
        )),
        Value::Object(_) => Some(QueryValue::Text(value.to_string())),
    }
}
