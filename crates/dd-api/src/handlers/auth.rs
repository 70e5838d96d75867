//! `/api/auth`: registration and login. Both answer with a fresh token.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use dd_core::services::accounts::{self, Credentials, Registration};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub email: String,
    pub token: String,
}

pub async fn register(
    data: web::Data<AppState>,
    form: web::Json<Registration>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let user = accounts::register(data.users.as_ref(), data.auth.as_ref(), form.into_inner(), now).await?;
    let token = accounts::issue_token(data.auth.as_ref(), &user, now)?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        username: user.username,
        token,
    }))
}

pub async fn login(
    data: web::Data<AppState>,
    form: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let user = accounts::login(data.users.as_ref(), data.auth.as_ref(), form.into_inner()).await?;
    let token = accounts::issue_token(data.auth.as_ref(), &user, Utc::now())?;

    log::info!("{} logged in", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse {
        username: user.username,
        email: user.email,
        token,
    }))
}
