//! Request Authenticator as an extractor: a handler that takes
//! `AuthenticatedUser` only runs for a caller with a valid bearer token.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::Utc;
use dd_core::error::AppError;
use dd_core::models::Identity;
use dd_core::services::authenticator;
use futures_util::future::LocalBoxFuture;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));

        Box::pin(async move {
            let state = state.ok_or_else(|| AppError::store("AppState is not registered"))?;
            let header = match header {
                None => None,
                Some(Ok(value)) => Some(value),
                Some(Err(_)) => return Err(AppError::MalformedCredential.into()),
            };

            let identity = authenticator::authenticate(
                state.users.as_ref(),
                state.auth.as_ref(),
                header.as_deref(),
                Utc::now(),
            )
            .await?;
            Ok(AuthenticatedUser(identity))
        })
    }
}
