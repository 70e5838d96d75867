//! # Request Authenticator
//!
//! Turns a raw `Authorization` header into an `Identity`, or the reason it
//! could not.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::traits::{AuthProvider, UserRepo};

/// Pulls the token out of `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let raw = header.ok_or(AppError::MissingCredential)?;
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::MalformedCredential),
    }
}

/// Verifies the presented token and confirms its user still exists.
/// Only the id is resolved; the profile is not loaded for the handler.
pub async fn authenticate(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    header: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Identity> {
    let token = bearer_token(header)?;
    let user_id = auth.verify_token(token, now)?;

    match users.find_user_by_id(user_id).await? {
        Some(_) => Ok(Identity { user_id }),
        None => {
            log::info!("rejected token for deleted user {user_id}");
            Err(AppError::StaleIdentity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::traits::{MockAuthProvider, MockUserRepo};
    use uuid::Uuid;

    #[test]
    fn header_shapes() {
        assert_eq!(bearer_token(None), Err(AppError::MissingCredential));
        assert_eq!(bearer_token(Some("Bearer")), Err(AppError::MalformedCredential));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AppError::MalformedCredential));
        assert_eq!(bearer_token(Some("Basic abc")), Err(AppError::MalformedCredential));
        assert_eq!(bearer_token(Some("Bearer a b")), Err(AppError::MalformedCredential));
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer abc")), Ok("abc"));
    }

    #[tokio::test]
    async fn live_user_resolves_to_identity() {
        let id = Uuid::now_v7();
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_token().returning(move |_, _| Ok(id));
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_id().returning(|id| {
            Ok(Some(User {
                id,
                username: "alice".into(),
                email: "alice@x.com".into(),
                password_hash: String::new(),
                created_at: Utc::now(),
            }))
        });

        let identity = authenticate(&users, &auth, Some("Bearer t"), Utc::now()).await.unwrap();
        assert_eq!(identity.user_id, id);
    }

    #[tokio::test]
    async fn deleted_user_is_stale() {
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_token().returning(|_, _| Ok(Uuid::now_v7()));
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_id().returning(|_| Ok(None));

        let err = authenticate(&users, &auth, Some("Bearer t"), Utc::now()).await.unwrap_err();
        assert_eq!(err, AppError::StaleIdentity);
    }

    #[tokio::test]
    async fn bad_token_skips_the_user_lookup() {
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_token().returning(|_, _| Err(AppError::InvalidCredential));
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_id().never();

        let err = authenticate(&users, &auth, Some("Bearer junk"), Utc::now()).await.unwrap_err();
        assert_eq!(err, AppError::InvalidCredential);
    }
}
