//! Resource facades and their registrations.

mod auth;
mod bookmarks;
mod collections;
mod comments;
mod drafts;
mod media;
mod notifications;
mod posts;
mod search;
mod taxonomy;
mod users;

pub use auth::Auth;
pub use search::Search;

use crate::client::ApiClient;
use crate::resource::{Resource, ResourceKind};
use crate::resource_kind;
use crate::types::{Bookmark, Category, Collection, Comment, Draft, Media, Notification, Post, Tag, User};

resource_kind!(Post, path = "posts", entity = "post", items = "posts", total = "totalPosts");
resource_kind!(User, path = "users", entity = "user", items = "users", total = "totalUsers");
resource_kind!(Tag, path = "tags", entity = "tag", items = "tags", total = "totalTags");
resource_kind!(Category, path = "categories", entity = "category", items = "categories", total = "totalCategories");
resource_kind!(Comment, path = "comments", entity = "comment", items = "comments", total = "totalComments");
resource_kind!(Draft, path = "drafts", entity = "draft", items = "drafts", total = "totalDrafts");
resource_kind!(Bookmark, path = "bookmarks", entity = "bookmark", items = "bookmarks", total = "totalBookmarks");
resource_kind!(Collection, path = "collections", entity = "collection", items = "collections", total = "totalCollections");
resource_kind!(Media, path = "media", entity = "media", items = "media", total = "totalMedia");
resource_kind!(Notification, path = "notifications", entity = "notification", items = "notifications", total = "totalNotifications");

impl ApiClient {
    pub fn resource<T: ResourceKind>(&self) -> Resource<T> {
        Resource::new(self.clone())
    }

    pub fn auth(&self) -> Auth {
        Auth::new(self.clone())
    }

    pub fn search(&self) -> Search {
        Search::new(self.clone())
    }

    pub fn posts(&self) -> Resource<Post> {
        self.resource()
    }

    pub fn users(&self) -> Resource<User> {
        self.resource()
    }

    pub fn tags(&self) -> Resource<Tag> {
        self.resource()
    }

    pub fn categories(&self) -> Resource<Category> {
        self.resource()
    }

    pub fn comments(&self) -> Resource<Comment> {
        self.resource()
    }

    pub fn drafts(&self) -> Resource<Draft> {
        self.resource()
    }

    pub fn bookmarks(&self) -> Resource<Bookmark> {
        self.resource()
    }

    pub fn collections(&self) -> Resource<Collection> {
        self.resource()
    }

    pub fn media(&self) -> Resource<Media> {
        self.resource()
    }

    pub fn notifications(&self) -> Resource<Notification> {
        self.resource()
    }
}
