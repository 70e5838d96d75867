//! # Credential Issuer
//!
//! Registration, login and token issuing. Password hashing and token
//! signing are delegated to the `AuthProvider` plugin.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::traits::{AuthProvider, UserRepo};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form. The web client sends `emailOrUsername`; API callers send
/// `username`. Either is matched against usernames, then emails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "emailOrUsername")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Creates an account. The plaintext password never reaches the store.
pub async fn register(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    form: Registration,
    now: DateTime<Utc>,
) -> Result<User> {
    let (username, email) =
        validation::check_registration(&form.username, &form.email, &form.password)?;

    if users.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = auth.hash_password(&form.password).await?;
    let user = User {
        id: Uuid::now_v7(),
        username,
        email,
        password_hash,
        created_at: now,
    };
    users.insert_user(user.clone()).await?;

    log::info!("registered user {} ({})", user.username, user.id);
    Ok(user)
}

pub async fn login(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    credentials: Credentials,
) -> Result<User> {
    let identifier = credentials.username.trim();
    if identifier.is_empty() || credentials.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let mut found = users.find_user_by_username(identifier).await?;
    if found.is_none() && identifier.contains('@') {
        found = users.find_user_by_email(identifier).await?;
    }
    let user = found.ok_or(AppError::UnknownUser)?;

    if !auth.verify_password(&credentials.password, &user.password_hash).await? {
        log::debug!("password mismatch for {}", user.username);
        return Err(AppError::Authentication("Incorrect password".to_string()));
    }
    Ok(user)
}

/// Token for `user`, valid for the provider's TTL from `now`.
pub fn issue_token(auth: &dyn AuthProvider, user: &User, now: DateTime<Utc>) -> Result<String> {
    auth.issue_token(user.id, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockAuthProvider, MockUserRepo};
    use mockall::predicate::eq;

    fn stored(username: &str, email: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: username.into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        }
    }

    fn form(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_stores_the_hash_not_the_password() {
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_username().returning(|_| Ok(None));
        users.expect_find_user_by_email().returning(|_| Ok(None));
        users
            .expect_insert_user()
            .withf(|u| u.password_hash == "hashed:pw123" && u.username == "alice")
            .times(1)
            .returning(|_| Ok(()));

        let mut auth = MockAuthProvider::new();
        auth.expect_hash_password()
            .with(eq("pw123"))
            .returning(|pw| Ok(format!("hashed:{pw}")));

        let user = register(&users, &auth, form("alice", "alice@x.com", "pw123"), Utc::now())
            .await
            .unwrap();
        assert_eq!(user.email, "alice@x.com");
        assert_ne!(user.password_hash, "pw123");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_whatever_the_email() {
        let mut users = MockUserRepo::new();
        users
            .expect_find_user_by_username()
            .returning(|_| Ok(Some(stored("alice", "alice@x.com"))));
        users.expect_insert_user().never();
        let auth = MockAuthProvider::new();

        let err = register(&users, &auth, form("alice", "other@y.org", "pw"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_username().returning(|_| Ok(None));
        users
            .expect_find_user_by_email()
            .returning(|_| Ok(Some(stored("alice", "alice@x.com"))));
        users.expect_insert_user().never();
        let auth = MockAuthProvider::new();

        let err = register(&users, &auth, form("bob", "alice@x.com", "pw"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_email_never_touches_the_store() {
        let users = MockUserRepo::new();
        let auth = MockAuthProvider::new();
        let err = register(&users, &auth, form("alice", "not-an-email", "pw"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn login_with_unknown_username() {
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_username().returning(|_| Ok(None));
        let auth = MockAuthProvider::new();

        let creds = Credentials { username: "ghost".into(), password: "pw".into() };
        assert_eq!(login(&users, &auth, creds).await.unwrap_err(), AppError::UnknownUser);
    }

    #[tokio::test]
    async fn login_with_wrong_password() {
        let mut users = MockUserRepo::new();
        users
            .expect_find_user_by_username()
            .returning(|_| Ok(Some(stored("alice", "alice@x.com"))));
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_password().returning(|_, _| Ok(false));

        let creds = Credentials { username: "alice".into(), password: "wrong".into() };
        assert_eq!(
            login(&users, &auth, creds).await.unwrap_err(),
            AppError::Authentication("Incorrect password".into())
        );
    }

    #[tokio::test]
    async fn login_falls_back_to_email() {
        let mut users = MockUserRepo::new();
        users.expect_find_user_by_username().returning(|_| Ok(None));
        users
            .expect_find_user_by_email()
            .with(eq("alice@x.com"))
            .returning(|_| Ok(Some(stored("alice", "alice@x.com"))));
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_password().returning(|_, _| Ok(true));

        let creds = Credentials { username: "alice@x.com".into(), password: "pw123".into() };
        assert_eq!(login(&users, &auth, creds).await.unwrap().username, "alice");
    }

    #[test]
    fn client_login_field_is_accepted() {
        let creds: Credentials =
            serde_json::from_str(r#"{"emailOrUsername":"alice","password":"pw"}"#).unwrap();
        assert_eq!(creds.username, "alice");
    }
}
