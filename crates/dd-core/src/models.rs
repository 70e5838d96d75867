//! # Domain Models
//!
//! These structs represent the core entities of DigitalDiary.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
///
/// `password_hash` is skipped by serde so a `User` can never leak it into a
/// response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The slice of a `User` embedded in posts and replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// A diary entry, with its author resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author: Author,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` until the first edit
    pub updated_at: DateTime<Utc>,
}

/// A reply under a post, with its author resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for inserting a post. The store resolves `author_id` into an
/// `Author` when it hands the post back.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReply {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Changes applied by an edit. `None` leaves the field as it is;
/// `edited_at` always lands in `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyEdit {
    pub content: String,
    pub edited_at: DateTime<Utc>,
}

/// Who a request is acting as, after the bearer token has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}
