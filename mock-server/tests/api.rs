use axum::http::{self, Request, StatusCode};
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

async fn call(app: &mut RouterIntoService<String>, request: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

async fn register(app: &mut RouterIntoService<String>, name: &str) -> (String, String) {
    let body = format!(r#"{{"username":"{name}","email":"{name}@example.com","password":"pw"}}"#);
    let resp = call(app, json_request("POST", "/api/auth/register", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    (
        json["token"].as_str().unwrap().to_string(),
        json["user"]["_id"].as_str().unwrap().to_string(),
    )
}

// --- auth ---

#[tokio::test]
async fn me_without_token_is_401_with_message() {
    let resp = app().oneshot(get("/api/auth/me", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "No token provided");
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let resp = app().oneshot(get("/api/auth/me", Some("expired"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "Token is not valid");
}

#[tokio::test]
async fn bad_login_uses_error_field() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"email":"nobody@example.com","password":"x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn register_login_me() {
    let mut app = app().into_service();
    let (_, id) = register(&mut app, "ada").await;

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"email":"ada@example.com","password":"pw"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["user"].get("password").is_none());
    let token = json["token"].as_str().unwrap().to_string();

    let resp = call(&mut app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"]["_id"], id.as_str());
}

// --- posts ---

#[tokio::test]
async fn empty_post_list_has_resource_specific_keys() {
    let resp = app().oneshot(get("/api/posts", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["posts"], serde_json::json!([]));
    assert_eq!(json["totalPosts"], 0);
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["totalPages"], 1);
}

#[tokio::test]
async fn create_post_requires_title() {
    let mut app = app().into_service();
    let (token, _) = register(&mut app, "ada").await;

    let resp = call(&mut app, json_request("POST", "/api/posts", Some(&token), r#"{"title":""}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Title is required");
}

#[tokio::test]
async fn post_not_found() {
    let resp = app().oneshot(get("/api/posts/missing", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Post not found");
}

#[tokio::test]
async fn filters_by_status_and_any_tag() {
    let mut app = app().into_service();
    let (token, _) = register(&mut app, "ada").await;
    for body in [
        r#"{"title":"One","tags":["rust"],"status":"published"}"#,
        r#"{"title":"Two","tags":["async"],"status":"published"}"#,
        r#"{"title":"Three","tags":["go"],"status":"published"}"#,
        r#"{"title":"Four","tags":["rust"]}"#,
    ] {
        let resp = call(&mut app, json_request("POST", "/api/posts", Some(&token), body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = call(&mut app, get("/api/posts?status=published&tags=rust&tags=async", None)).await;
    let json = body_json(resp).await;
    assert_eq!(json["totalPosts"], 2);
    let titles: Vec<&str> = json["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);

    let resp = call(&mut app, get("/api/posts?page=2&limit=3", None)).await;
    let json = body_json(resp).await;
    assert_eq!(json["posts"].as_array().unwrap().len(), 1);
    assert_eq!(json["currentPage"], 2);
    assert_eq!(json["totalPages"], 2);
}

#[tokio::test]
async fn post_lifecycle() {
    let mut app = app().into_service();
    let (token, author) = register(&mut app, "ada").await;
    let (other, _) = register(&mut app, "bob").await;

    // create
    let resp = call(
        &mut app,
        json_request("POST", "/api/posts", Some(&token), r#"{"title":"Hello World","content":"hi"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["author"], author.as_str());
    assert_eq!(created["status"], "draft");
    let id = created["_id"].as_str().unwrap().to_string();

    // by slug is wrapped
    let resp = call(&mut app, get("/api/posts/slug/hello-world", None)).await;
    assert_eq!(body_json(resp).await["post"]["_id"], id.as_str());

    // someone else cannot edit
    let resp = call(
        &mut app,
        json_request("PUT", &format!("/api/posts/{id}"), Some(&other), r#"{"title":"Mine"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // like toggles
    let resp = call(&mut app, json_request("POST", &format!("/api/posts/{id}/like"), Some(&other), "")).await;
    let json = body_json(resp).await;
    assert_eq!((json["likes"].as_u64(), json["liked"].as_bool()), (Some(1), Some(true)));
    let resp = call(&mut app, json_request("DELETE", &format!("/api/posts/{id}/like"), Some(&other), "")).await;
    assert_eq!(body_json(resp).await["likes"], 0);

    // author edits
    let resp = call(
        &mut app,
        json_request("PUT", &format!("/api/posts/{id}"), Some(&token), r#"{"status":"published"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["title"], "Hello World");

    // delete
    let resp = call(&mut app, json_request("DELETE", &format!("/api/posts/{id}"), Some(&token), "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Post deleted");

    let resp = call(&mut app, get(&format!("/api/posts/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- users, tags ---

#[tokio::test]
async fn cannot_follow_yourself() {
    let mut app = app().into_service();
    let (token, id) = register(&mut app, "ada").await;

    let resp = call(&mut app, json_request("POST", &format!("/api/users/{id}/follow"), Some(&token), "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tags_list_uses_generic_keys() {
    let mut app = app().into_service();
    let (token, _) = register(&mut app, "ada").await;

    let resp = call(&mut app, json_request("POST", "/api/tags", Some(&token), r#"{"name":"rust"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["tag"]["name"], "rust");

    let resp = call(&mut app, get("/api/tags", None)).await;
    let json = body_json(resp).await;
    assert_eq!(json["totalItems"], 1);
    assert_eq!(json["data"][0]["name"], "rust");
}

// --- media ---

#[tokio::test]
async fn upload_single_file() {
    let mut app = app().into_service();
    let (token, _) = register(&mut app, "ada").await;

    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"alt\"\r\n\r\nlogo\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/media/upload")
        .header(http::header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(body)
        .unwrap();

    let resp = call(&mut app, request).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["media"]["originalName"], "a.png");
    assert_eq!(json["media"]["mimeType"], "image/png");
    assert_eq!(json["media"]["size"], 7);
    assert_eq!(json["media"]["alt"], "logo");

    let resp = call(&mut app, get("/api/media", None)).await;
    assert_eq!(body_json(resp).await["totalMedia"], 1);
}
