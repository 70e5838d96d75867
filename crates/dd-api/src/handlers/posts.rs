//! `/api/posts`

use actix_web::{web, HttpResponse};
use chrono::Utc;
use dd_core::services::diary::{self, PostForm};
use uuid::Uuid;

use crate::error::{ApiError, MessageBody};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

pub async fn list_posts(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let posts = diary::list_posts(data.posts.as_ref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_post(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let post = diary::get_post(data.posts.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create_post(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, ApiError> {
    let post = diary::create_post(data.posts.as_ref(), &identity, form.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn update_post(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    // Raw body: a non-author must hear 403 whatever they sent.
    let post = diary::update_post(
        data.posts.as_ref(),
        &identity,
        path.into_inner(),
        &body,
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    diary::delete_post(data.posts.as_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageBody::new("Post and its replies deleted")))
}
