//! # Ownership Guard
//!
//! Single-author model: only the author of a resource may edit or delete it.
//! No roles, no admin override.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Identity, Post, Reply};

/// Anything with exactly one author.
pub trait Authored {
    /// Lowercase noun used in error messages ("post", "reply").
    const KIND: &'static str;

    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    const KIND: &'static str = "post";

    fn author_id(&self) -> Uuid {
        self.author.id
    }
}

impl Authored for Reply {
    const KIND: &'static str = "reply";

    fn author_id(&self) -> Uuid {
        self.author.id
    }
}

/// `Ok(())` when `identity` wrote `resource`, `AppError::Forbidden` otherwise.
pub fn authorize<R: Authored>(identity: &Identity, resource: &R) -> Result<()> {
    if resource.author_id() == identity.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You can only edit or delete your own {}",
            R::KIND
        )))
    }
}
