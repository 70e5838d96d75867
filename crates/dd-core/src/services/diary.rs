//! Posts and replies: reads are open, every mutation goes through the
//! ownership guard first.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Identity, NewPost, NewReply, Post, PostEdit, Reply, ReplyEdit};
use crate::ownership::authorize;
use crate::traits::{PostRepo, ReplyRepo};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Partial edit; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub content: String,
}

/// Edit bodies are decoded after the ownership check, never before.
fn decode_edit<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

pub async fn list_posts(posts: &dyn PostRepo) -> Result<Vec<Post>> {
    posts.list_posts().await
}

pub async fn get_post(posts: &dyn PostRepo, id: Uuid) -> Result<Post> {
    posts.get_post(id).await?.ok_or_else(|| AppError::not_found("Post"))
}

pub async fn create_post(
    posts: &dyn PostRepo,
    identity: &Identity,
    form: PostForm,
    now: DateTime<Utc>,
) -> Result<Post> {
    validation::check_post(&form.title, &form.content)?;
    posts
        .insert_post(NewPost {
            id: Uuid::now_v7(),
            author_id: identity.user_id,
            title: form.title,
            content: form.content,
            created_at: now,
        })
        .await
}

pub async fn update_post(
    posts: &dyn PostRepo,
    identity: &Identity,
    id: Uuid,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<Post> {
    let post = get_post(posts, id).await?;
    authorize(identity, &post)?;
    let patch: PostPatch = decode_edit(body)?;

    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty())
        || patch.content.as_deref().is_some_and(|c| c.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Title and content cannot be empty".to_string(),
        ));
    }

    let edit = PostEdit {
        title: patch.title,
        content: patch.content,
        edited_at: now,
    };
    posts
        .update_post(id, edit)
        .await?
        .ok_or_else(|| AppError::not_found("Post"))
}

/// Deletes the post and, with it, all of its replies.
pub async fn delete_post(posts: &dyn PostRepo, identity: &Identity, id: Uuid) -> Result<()> {
    let post = get_post(posts, id).await?;
    authorize(identity, &post)?;

    if !posts.delete_post(id).await? {
        return Err(AppError::not_found("Post"));
    }
    log::info!("post {id} deleted by {}", identity.user_id);
    Ok(())
}

pub async fn list_replies(
    posts: &dyn PostRepo,
    replies: &dyn ReplyRepo,
    post_id: Uuid,
) -> Result<Vec<Reply>> {
    get_post(posts, post_id).await?;
    replies.list_replies(post_id).await
}

/// A reply that exists but hangs off another post is reported as missing.
pub async fn get_reply(replies: &dyn ReplyRepo, post_id: Uuid, reply_id: Uuid) -> Result<Reply> {
    replies
        .get_reply(reply_id)
        .await?
        .filter(|reply| reply.post_id == post_id)
        .ok_or_else(|| AppError::not_found("Reply"))
}

pub async fn create_reply(
    posts: &dyn PostRepo,
    replies: &dyn ReplyRepo,
    identity: &Identity,
    post_id: Uuid,
    form: ReplyForm,
    now: DateTime<Utc>,
) -> Result<Reply> {
    validation::check_reply(&form.content)?;
    get_post(posts, post_id).await?;

    replies
        .insert_reply(NewReply {
            id: Uuid::now_v7(),
            post_id,
            author_id: identity.user_id,
            content: form.content,
            created_at: now,
        })
        .await
}

pub async fn update_reply(
    replies: &dyn ReplyRepo,
    identity: &Identity,
    post_id: Uuid,
    reply_id: Uuid,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<Reply> {
    let reply = get_reply(replies, post_id, reply_id).await?;
    authorize(identity, &reply)?;
    let form: ReplyForm = decode_edit(body)?;
    validation::check_reply(&form.content)?;

    let edit = ReplyEdit {
        content: form.content,
        edited_at: now,
    };
    replies
        .update_reply(reply_id, edit)
        .await?
        .ok_or_else(|| AppError::not_found("Reply"))
}

pub async fn delete_reply(
    replies: &dyn ReplyRepo,
    identity: &Identity,
    post_id: Uuid,
    reply_id: Uuid,
) -> Result<()> {
    let reply = get_reply(replies, post_id, reply_id).await?;
    authorize(identity, &reply)?;

    if !replies.delete_reply(reply_id).await? {
        return Err(AppError::not_found("Reply"));
    }
    Ok(())
}
