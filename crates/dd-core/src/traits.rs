//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewPost, NewReply, Post, PostEdit, Reply, ReplyEdit, User};

/// Persistence contract for accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fails with `AppError::Conflict` if the username or email is taken.
    async fn insert_user(&self, user: User) -> Result<()>;
}

/// Persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn insert_post(&self, post: NewPost) -> Result<Post>;
    async fn update_post(&self, id: Uuid, edit: PostEdit) -> Result<Option<Post>>;

    /// Removes the post and every reply under it. Returns `false` if the
    /// post did not exist.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}

/// Persistence contract for replies.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReplyRepo: Send + Sync {
    /// Replies of one post, oldest first.
    async fn list_replies(&self, post_id: Uuid) -> Result<Vec<Reply>>;
    async fn get_reply(&self, id: Uuid) -> Result<Option<Reply>>;
    async fn insert_reply(&self, reply: NewReply) -> Result<Reply>;
    async fn update_reply(&self, id: Uuid, edit: ReplyEdit) -> Result<Option<Reply>>;
    async fn delete_reply(&self, id: Uuid) -> Result<bool>;
}

/// Password hashing and identity-token contract.
///
/// Times are passed in so callers (and tests) control the clock.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Salted one-way hash of `password`.
    async fn hash_password(&self, password: &str) -> Result<String>;

    /// Checks `password` against a stored hash. `Ok(false)` on mismatch.
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;

    /// Signed token binding `user_id`, expiring one TTL after `issued_at`.
    fn issue_token(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String>;

    /// Returns the user id bound by `token` if it verifies and has not
    /// expired at `now`. Fails with `AppError::InvalidCredential` otherwise.
    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid>;
}
