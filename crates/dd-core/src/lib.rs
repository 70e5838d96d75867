//! digital-diary/crates/dd-core/src/lib.rs
//!
//! The central domain logic and interface definitions for DigitalDiary.

pub mod error;
pub mod models;
pub mod ownership;
pub mod services;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ownership::{authorize, Authored};
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User {
            id: Uuid::now_v7(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_reply_uses_client_field_names() {
        let now = chrono::Utc::now();
        let reply = Reply {
            id: Uuid::now_v7(),
            post_id: Uuid::now_v7(),
            author: Author { id: Uuid::now_v7(), username: "bob".into() },
            content: "Hello Rust!".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert!(json.get("postId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["author"]["username"], "bob");
    }
}
