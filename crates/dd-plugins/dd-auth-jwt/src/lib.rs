//! # dd-auth-jwt
//!
//! Argon2 + JWT implementation of `AuthProvider`.
//! Passwords are hashed with Argon2id; identity tokens are HS256 JWTs that
//! carry the user id and an expiry, nothing else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dd_core::error::{AppError, Result};
use dd_core::traits::AuthProvider;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default validity window of an identity token, in seconds (3 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3 * 60 * 60;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AppError::store(format!("argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Token payload: the user id plus issue and expiry times, nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct JwtAuthProvider {
    /// HMAC key; `SecretString` keeps it out of `Debug` output
    secret: SecretString,
    ttl: Duration,
    argon2: Argon2Params,
}

impl JwtAuthProvider {
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self {
            secret,
            ttl,
            argon2: Argon2Params::default(),
        }
    }

    pub fn with_argon2_params(mut self, params: Argon2Params) -> Self {
        self.argon2 = params;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn hash_with(params: Argon2Params, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::store(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_with(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::store(format!("parse stored hash: {e}")))?;
    // Parameters come from the stored hash itself
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    /// Hashing is CPU-bound, so it runs on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let params = self.argon2;
        tokio::task::spawn_blocking(move || hash_with(params, &password))
            .await
            .map_err(AppError::store)?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_with(&password, &hash))
            .await
            .map_err(AppError::store)?
    }

    fn issue_token(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = TokenClaims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::default(), &claims, &key)
            .map_err(|e| AppError::store(format!("sign token: {e}")))
    }

    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::default();
        // Expiry is checked below against the caller's clock, without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| {
            log::debug!("token rejected: {e}");
            AppError::InvalidCredential
        })?;

        if now.timestamp() >= data.claims.exp {
            log::debug!("token for {} expired", data.claims.sub);
            return Err(AppError::InvalidCredential);
        }
        Ok(data.claims.sub)
    }
}
