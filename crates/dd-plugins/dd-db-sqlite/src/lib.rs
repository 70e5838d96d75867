//! # dd-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `dd-core` domain models. The schema is created on connect.

use std::str::FromStr;

use async_trait::async_trait;
use dd_core::error::{AppError, Result};
use dd_core::models::{Author, NewPost, NewReply, Post, PostEdit, Reply, ReplyEdit, User};
use dd_core::traits::{PostRepo, ReplyRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            BLOB PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id         BLOB PRIMARY KEY,
    author_id  BLOB NOT NULL REFERENCES users(id),
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS posts_created_at ON posts(created_at);

CREATE TABLE IF NOT EXISTS replies (
    id         BLOB PRIMARY KEY,
    post_id    BLOB NOT NULL REFERENCES posts(id),
    author_id  BLOB NOT NULL REFERENCES users(id),
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS replies_post_id ON replies(post_id, created_at);
"#;

const SELECT_POST: &str = "SELECT p.id, p.title, p.content, p.created_at, p.updated_at, \
     u.id AS author_id, u.username AS author_username \
     FROM posts p JOIN users u ON u.id = p.author_id";

const SELECT_REPLY: &str = "SELECT r.id, r.post_id, r.content, r.created_at, r.updated_at, \
     u.id AS author_id, u.username AS author_username \
     FROM replies r JOIN users u ON u.id = r.author_id";

#[derive(Clone)]
pub struct SqliteDiaryRepo {
    pool: SqlitePool,
}

impl SqliteDiaryRepo {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// In-memory databases live inside a single connection, so the pool is
    /// pinned to one connection that never expires.
    pub async fn new(url: &str) -> std::result::Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        log::info!("sqlite store ready at {url}");
        Ok(Self { pool })
    }
}

fn store_err(err: sqlx::Error) -> AppError {
    log::error!("sqlite: {err}");
    AppError::store(err)
}

fn insert_user_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = if db.message().contains("email") {
                "Email already registered"
            } else {
                "Username already taken"
            };
            return AppError::Conflict(message.to_string());
        }
    }
    store_err(err)
}

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn author_from_row(row: &SqliteRow) -> std::result::Result<Author, sqlx::Error> {
    Ok(Author {
        id: row.try_get("author_id")?,
        username: row.try_get("author_username")?,
    })
}

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        author: author_from_row(row)?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn reply_from_row(row: &SqliteRow) -> std::result::Result<Reply, sqlx::Error> {
    Ok(Reply {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author: author_from_row(row)?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl SqliteDiaryRepo {
    async fn find_user_where(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE {column} = ?"
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(user_from_row).transpose().map_err(store_err)
    }
}

#[async_trait]
impl UserRepo for SqliteDiaryRepo {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.as_ref().map(user_from_row).transpose().map_err(store_err)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user_where("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_user_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepo for SqliteDiaryRepo {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let sql = format!("{SELECT_POST} ORDER BY p.created_at DESC, p.id DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.iter()
            .map(post_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(store_err)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let sql = format!("{SELECT_POST} WHERE p.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(post_from_row).transpose().map_err(store_err)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        self.get_post(post.id)
            .await?
            .ok_or_else(|| AppError::store(format!("post {} missing after insert", post.id)))
    }

    async fn update_post(&self, id: Uuid, edit: PostEdit) -> Result<Option<Post>> {
        let result = sqlx::query(
            "UPDATE posts SET title = COALESCE(?, title), content = COALESCE(?, content), updated_at = ? WHERE id = ?",
        )
        .bind(edit.title)
        .bind(edit.content)
        .bind(edit.edited_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    /// Replies first, then the post, in one transaction so a failure
    /// cannot leave orphaned replies behind.
    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let replies = sqlx::query("DELETE FROM replies WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        let post = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        log::debug!(
            "deleted post {id} with {} replies",
            replies.rows_affected()
        );
        Ok(post.rows_affected() > 0)
    }
}

#[async_trait]
impl ReplyRepo for SqliteDiaryRepo {
    async fn list_replies(&self, post_id: Uuid) -> Result<Vec<Reply>> {
        let sql = format!("{SELECT_REPLY} WHERE r.post_id = ? ORDER BY r.created_at ASC, r.id ASC");
        let rows = sqlx::query(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.iter()
            .map(reply_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(store_err)
    }

    async fn get_reply(&self, id: Uuid) -> Result<Option<Reply>> {
        let sql = format!("{SELECT_REPLY} WHERE r.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(reply_from_row).transpose().map_err(store_err)
    }

    async fn insert_reply(&self, reply: NewReply) -> Result<Reply> {
        sqlx::query(
            "INSERT INTO replies (id, post_id, author_id, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(reply.id)
        .bind(reply.post_id)
        .bind(reply.author_id)
        .bind(&reply.content)
        .bind(reply.created_at)
        .bind(reply.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        self.get_reply(reply.id)
            .await?
            .ok_or_else(|| AppError::store(format!("reply {} missing after insert", reply.id)))
    }

    async fn update_reply(&self, id: Uuid, edit: ReplyEdit) -> Result<Option<Reply>> {
        let result = sqlx::query("UPDATE replies SET content = ?, updated_at = ? WHERE id = ?")
            .bind(edit.content)
            .bind(edit.edited_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_reply(id).await
    }

    async fn delete_reply(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM replies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }
}
