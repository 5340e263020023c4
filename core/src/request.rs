//! Request assembly: URL, headers and body for one call.
//!
//! Building never fails. A missing token just leaves out the `Authorization`
//! header and the backend answers 401 where auth is required.

use crate::http::{find_header, HttpMethod, HttpRequest, RequestBody};
use crate::query::Query;

pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Everything a caller decides about a request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub query: Option<Query>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Join `base_url` and `spec.path`, then apply content-type and bearer rules.
pub fn build_request(base_url: &str, spec: RequestSpec, token: Option<&str>) -> HttpRequest {
    let RequestSpec {
        method,
        path,
        query,
        body,
        headers: explicit,
    } = spec;

    let mut url = join_url(base_url, &path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query.to_query_string());
    }

    let is_multipart = matches!(body, RequestBody::Multipart(_));
    let mut headers: Vec<(String, String)> = explicit
        .into_iter()
        .filter(|(name, _)| !(is_multipart && name.eq_ignore_ascii_case(CONTENT_TYPE)))
        .collect();

    if matches!(body, RequestBody::Json(_)) && find_header(&headers, CONTENT_TYPE).is_none() {
        headers.push((CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    if let Some(token) = token {
        if find_header(&headers, AUTHORIZATION).is_none() {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }
    }

    HttpRequest {
        method,
        url,
        headers,
        body,
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{UploadFile, UploadRequest};

    const BASE: &str = "http://localhost:3000/api";

    #[test]
    fn adds_bearer_header_when_token_present() {
        let req = build_request(BASE, RequestSpec::new(HttpMethod::Get, "/posts"), Some("T"));
        assert_eq!(req.header("Authorization"), Some("Bearer T"));
    }

    #[test]
    fn omits_auth_header_entirely_without_token() {
        let req = build_request(BASE, RequestSpec::new(HttpMethod::Get, "/posts"), None);
        assert!(req.headers.iter().all(|(k, _)| !k.eq_ignore_ascii_case("authorization")));
        assert!(req.headers.is_empty());
    }

    #[test]
    fn json_bodies_get_json_content_type() {
        let spec = RequestSpec::new(HttpMethod::Post, "posts")
            .body(RequestBody::Json(r#"{"title":"x"}"#.to_string()));
        let req = build_request(BASE, spec, None);
        assert_eq!(req.url, "http://localhost:3000/api/posts");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn multipart_bodies_never_carry_manual_content_type() {
        let body = UploadRequest::new(UploadFile::new("a.png", vec![1])).into_multipart();
        let spec = RequestSpec::new(HttpMethod::Post, "/media/upload")
            .header("Content-Type", "multipart/form-data")
            .body(RequestBody::Multipart(body));
        let req = build_request(BASE, spec, Some("T"));
        assert!(req.header(CONTENT_TYPE).is_none());
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer T"));
    }

    #[test]
    fn query_is_appended_and_empty_query_is_not() {
        let spec = RequestSpec::new(HttpMethod::Get, "/posts")
            .query(Query::new().param("status", "published").page(1, 10));
        let req = build_request(BASE, spec, None);
        assert_eq!(req.url, "http://localhost:3000/api/posts?status=published&page=1&limit=10");

        let spec = RequestSpec::new(HttpMethod::Get, "/posts").query(Query::new().param("q", ""));
        assert_eq!(build_request(BASE, spec, None).url, "http://localhost:3000/api/posts");
    }

    #[test]
    fn explicit_authorization_wins() {
        let spec = RequestSpec::new(HttpMethod::Get, "/auth/me").header("Authorization", "Bearer other");
        let req = build_request(BASE, spec, Some("T"));
        let auth: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(AUTHORIZATION))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer other"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = build_request("http://localhost:3000/api/", RequestSpec::new(HttpMethod::Get, "/tags"), None);
        assert_eq!(req.url, "http://localhost:3000/api/tags");
    }
}
