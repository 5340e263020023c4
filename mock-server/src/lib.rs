//! In-memory stand-in for the blog backend.
//!
//! Reproduces the wire behaviour the client has to cope with: bearer-token
//! auth, `error`/`message` error bodies, and list endpoints that name their
//! pagination fields per resource (`posts`/`totalPosts`, `users`/`totalUsers`,
//! `media`/`totalMedia`) or generically (`data`/`totalItems`).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const DEFAULT_LIMIT: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub avatar: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub status: String,
    pub likes: Vec<String>,
    pub views: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub url: String,
    pub mime_type: Option<String>,
    pub size: u64,
    pub alt: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub post: String,
    pub user: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub tokens: HashMap<String, String>,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
    pub media: Vec<Media>,
    pub bookmarks: Vec<Bookmark>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTag {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmark {
    pub post_id: String,
}

/// A non-2xx reply with a JSON body.
#[derive(Debug)]
pub struct Failure(StatusCode, Value);

impl Failure {
    fn error(status: StatusCode, message: &str) -> Self {
        Failure(status, json!({ "error": message }))
    }

    fn message(status: StatusCode, message: &str) -> Self {
        Failure(status, json!({ "message": message }))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

type Reply = Result<(StatusCode, Json<Value>), Failure>;

fn ok(body: Value) -> Reply {
    Ok((StatusCode::OK, Json(body)))
}

fn created(body: Value) -> Reply {
    Ok((StatusCode::CREATED, Json(body)))
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn app() -> Router {
    app_with_store(Arc::new(RwLock::new(Store::default())))
}

pub fn app_with_store(db: Db) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/trending", get(trending_posts))
        .route("/api/posts/slug/{slug}", get(get_post_by_slug))
        .route("/api/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/api/posts/{id}/like", post(like_post).delete(unlike_post))
        .route("/api/posts/{id}/related", get(related_posts))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/follow", post(follow_user).delete(unfollow_user))
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/media", get(list_media))
        .route("/api/media/upload", post(upload_media))
        .route("/api/bookmarks", post(create_bookmark))
        .route("/api/bookmarks/check/{post_id}", get(check_bookmark))
        .route("/api/search/posts", get(search_posts))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Params(Vec<(String, String)>);

impl Params {
    fn parse(raw: Option<String>) -> Self {
        let pairs = raw
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Params(pairs)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn all(&self, key: &str) -> Vec<&str> {
        self.0.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    fn number(&self, key: &str, default: usize) -> usize {
        self.first(key)
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    }
}

struct Page<T> {
    items: Vec<T>,
    total: usize,
    page: usize,
    pages: usize,
}

fn paginate<T: Clone>(items: &[T], params: &Params) -> Page<T> {
    let page = params.number("page", 1);
    let limit = params.number("limit", DEFAULT_LIMIT);
    let total = items.len();
    let pages = total.div_ceil(limit).max(1);
    let items = items.iter().skip((page - 1) * limit).take(limit).cloned().collect();
    Page {
        items,
        total,
        page,
        pages,
    }
}

fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Failure> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Failure::message(StatusCode::UNAUTHORIZED, "No token provided"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Failure::message(StatusCode::UNAUTHORIZED, "No token provided"))?;
    store
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| Failure::message(StatusCode::UNAUTHORIZED, "Token is not valid"))
}

fn issue_token(store: &mut Store, user_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user_id.to_string());
    token
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-")
}

fn find_post(store: &Store, id: &str) -> Result<usize, Failure> {
    store
        .posts
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| Failure::message(StatusCode::NOT_FOUND, "Post not found"))
}

fn post_page(page: Page<Post>) -> Value {
    json!({
        "posts": page.items,
        "totalPosts": page.total,
        "currentPage": page.page,
        "totalPages": page.pages,
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Reply {
    if input.username.is_empty() || input.email.is_empty() || input.password.is_empty() {
        return Err(Failure::error(
            StatusCode::BAD_REQUEST,
            "Username, email and password are required",
        ));
    }
    let mut store = db.write().await;
    if store.users.iter().any(|u| u.email == input.email) {
        return Err(Failure::message(StatusCode::BAD_REQUEST, "User already exists"));
    }
    let user = User {
        id: new_id(),
        username: input.username,
        email: input.email,
        password: input.password,
        avatar: None,
        followers: Vec::new(),
        following: Vec::new(),
    };
    store.users.push(user.clone());
    let token = issue_token(&mut store, &user.id);
    created(json!({ "token": token, "user": user }))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply {
    let mut store = db.write().await;
    let user = store
        .users
        .iter()
        .find(|u| u.email == input.email && u.password == input.password)
        .cloned()
        .ok_or_else(|| Failure::error(StatusCode::BAD_REQUEST, "Invalid credentials"))?;
    let token = issue_token(&mut store, &user.id);
    ok(json!({ "token": token, "user": user }))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    let user = store.users.iter().find(|u| u.id == user_id);
    ok(json!({ "user": user }))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut store = db.write().await;
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        store.tokens.remove(token);
    }
    ok(json!({ "message": "Logged out" }))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

async fn list_posts(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let store = db.read().await;
    let tags = params.all("tags");
    let matching: Vec<Post> = store
        .posts
        .iter()
        .filter(|p| params.first("status").is_none_or(|s| p.status == s))
        .filter(|p| params.first("author").is_none_or(|a| p.author == a))
        .filter(|p| tags.is_empty() || p.tags.iter().any(|t| tags.contains(&t.as_str())))
        .cloned()
        .collect();
    ok(post_page(paginate(&matching, &params)))
}

async fn create_post(State(db): State<Db>, headers: HeaderMap, Json(input): Json<CreatePost>) -> Reply {
    let mut store = db.write().await;
    let author = authenticate(&store, &headers)?;
    if input.title.trim().is_empty() {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Title is required"));
    }
    let post = Post {
        id: new_id(),
        slug: slugify(&input.title),
        title: input.title,
        content: input.content,
        author,
        tags: input.tags,
        status: input.status.unwrap_or_else(|| "draft".to_string()),
        likes: Vec::new(),
        views: 0,
    };
    store.posts.push(post.clone());
    created(to_json(&post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    let mut store = db.write().await;
    let index = find_post(&store, &id)?;
    store.posts[index].views += 1;
    ok(to_json(&store.posts[index]))
}

async fn get_post_by_slug(State(db): State<Db>, Path(slug): Path<String>) -> Reply {
    let store = db.read().await;
    let post = store
        .posts
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| Failure::message(StatusCode::NOT_FOUND, "Post not found"))?;
    ok(json!({ "post": post }))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<UpdatePost>,
) -> Reply {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let index = find_post(&store, &id)?;
    let post = &mut store.posts[index];
    if post.author != user_id {
        return Err(Failure::error(StatusCode::FORBIDDEN, "Not authorized to edit this post"));
    }
    if let Some(title) = input.title {
        post.slug = slugify(&title);
        post.title = title;
    }
    if let Some(content) = input.content {
        post.content = content;
    }
    if let Some(tags) = input.tags {
        post.tags = tags;
    }
    if let Some(status) = input.status {
        post.status = status;
    }
    ok(to_json(post))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let index = find_post(&store, &id)?;
    if store.posts[index].author != user_id {
        return Err(Failure::error(StatusCode::FORBIDDEN, "Not authorized to delete this post"));
    }
    store.posts.remove(index);
    ok(json!({ "message": "Post deleted" }))
}

async fn like_post(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    set_like(db, id, headers, true).await
}

async fn unlike_post(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    set_like(db, id, headers, false).await
}

async fn set_like(db: Db, id: String, headers: HeaderMap, liked: bool) -> Reply {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let index = find_post(&store, &id)?;
    let likes = &mut store.posts[index].likes;
    likes.retain(|u| *u != user_id);
    if liked {
        likes.push(user_id);
    }
    ok(json!({ "likes": likes.len(), "liked": liked }))
}

async fn trending_posts(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let store = db.read().await;
    let mut posts = store.posts.clone();
    posts.sort_by(|a, b| b.likes.len().cmp(&a.likes.len()).then(b.views.cmp(&a.views)));
    posts.truncate(params.number("limit", 5));
    ok(json!({ "posts": posts }))
}

async fn related_posts(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let index = find_post(&store, &id)?;
    let source = &store.posts[index];
    let related: Vec<&Post> = store
        .posts
        .iter()
        .filter(|p| p.id != source.id && p.tags.iter().any(|t| source.tags.contains(t)))
        .collect();
    ok(to_json(&related))
}

async fn search_posts(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let term = params.first("q").unwrap_or_default().to_lowercase();
    let store = db.read().await;
    let matching: Vec<Post> = store
        .posts
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&term) || p.content.to_lowercase().contains(&term))
        .cloned()
        .collect();
    ok(post_page(paginate(&matching, &params)))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn list_users(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let store = db.read().await;
    let page = paginate(&store.users, &params);
    ok(json!({
        "users": page.items,
        "totalUsers": page.total,
        "currentPage": page.page,
        "totalPages": page.pages,
    }))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let user = store
        .users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| Failure::message(StatusCode::NOT_FOUND, "User not found"))?;
    ok(json!({ "user": user }))
}

async fn follow_user(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    set_follow(db, id, headers, true).await
}

async fn unfollow_user(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    set_follow(db, id, headers, false).await
}

async fn set_follow(db: Db, target: String, headers: HeaderMap, follow: bool) -> Reply {
    let mut store = db.write().await;
    let me = authenticate(&store, &headers)?;
    if me == target {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "You cannot follow yourself"));
    }
    if !store.users.iter().any(|u| u.id == target) {
        return Err(Failure::message(StatusCode::NOT_FOUND, "User not found"));
    }
    for user in store.users.iter_mut() {
        if user.id == target {
            user.followers.retain(|u| *u != me);
            if follow {
                user.followers.push(me.clone());
            }
        } else if user.id == me {
            user.following.retain(|u| *u != target);
            if follow {
                user.following.push(target.clone());
            }
        }
    }
    let message = if follow { "User followed" } else { "User unfollowed" };
    ok(json!({ "message": message }))
}

// ---------------------------------------------------------------------------
// Tags, media, bookmarks
// ---------------------------------------------------------------------------

async fn list_tags(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let store = db.read().await;
    let page = paginate(&store.tags, &params);
    ok(json!({
        "data": page.items,
        "totalItems": page.total,
        "currentPage": page.page,
        "totalPages": page.pages,
    }))
}

async fn create_tag(State(db): State<Db>, headers: HeaderMap, Json(input): Json<CreateTag>) -> Reply {
    let mut store = db.write().await;
    authenticate(&store, &headers)?;
    if input.name.trim().is_empty() {
        return Err(Failure::error(StatusCode::UNPROCESSABLE_ENTITY, "Tag name is required"));
    }
    if store.tags.iter().any(|t| t.name == input.name) {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Tag already exists"));
    }
    let tag = Tag {
        id: new_id(),
        name: input.name,
    };
    store.tags.push(tag.clone());
    created(json!({ "tag": tag }))
}

async fn list_media(State(db): State<Db>, RawQuery(raw): RawQuery) -> Reply {
    let params = Params::parse(raw);
    let store = db.read().await;
    let page = paginate(&store.media, &params);
    ok(json!({
        "media": page.items,
        "totalMedia": page.total,
        "currentPage": page.page,
        "totalPages": page.pages,
    }))
}

async fn upload_media(State(db): State<Db>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    {
        let store = db.read().await;
        authenticate(&store, &headers)?;
    }

    let bad_request = |e: axum::extract::multipart::MultipartError| {
        Failure::error(StatusCode::BAD_REQUEST, &e.body_text())
    };
    let mut single = None;
    let mut many = Vec::new();
    let mut alt = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_request)?;
        match name.as_str() {
            "alt" => alt = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "file" | "files" => {
                let id = new_id();
                let media = Media {
                    filename: format!("{id}-{original_name}"),
                    url: format!("/uploads/{id}-{original_name}"),
                    id,
                    original_name,
                    mime_type,
                    size: bytes.len() as u64,
                    alt: None,
                };
                if name == "file" {
                    single = Some(media);
                } else {
                    many.push(media);
                }
            }
            _ => {}
        }
    }

    let mut store = db.write().await;
    match single {
        Some(mut media) => {
            media.alt = alt;
            store.media.push(media.clone());
            created(json!({ "media": media }))
        }
        None if !many.is_empty() => {
            for media in &mut many {
                media.alt = alt.clone();
            }
            store.media.extend(many.iter().cloned());
            created(json!({ "media": many }))
        }
        None => Err(Failure::error(StatusCode::BAD_REQUEST, "No file uploaded")),
    }
}

async fn create_bookmark(State(db): State<Db>, headers: HeaderMap, Json(input): Json<CreateBookmark>) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    find_post(&store, &input.post_id)?;
    let bookmark = Bookmark {
        id: new_id(),
        post: input.post_id,
        user,
    };
    store.bookmarks.push(bookmark.clone());
    created(json!({ "bookmark": bookmark }))
}

async fn check_bookmark(State(db): State<Db>, Path(post_id): Path<String>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let found = store.bookmarks.iter().find(|b| b.post == post_id && b.user == user);
    ok(json!({
        "bookmarked": found.is_some(),
        "bookmarkId": found.map(|b| b.id.clone()),
    }))
}
