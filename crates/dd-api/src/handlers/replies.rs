//! `/api/posts/{id}/replies`

use actix_web::{web, HttpResponse};
use chrono::Utc;
use dd_core::services::diary::{self, ReplyForm};
use uuid::Uuid;

use crate::error::{ApiError, MessageBody};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

pub async fn list_replies(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let replies =
        diary::list_replies(data.posts.as_ref(), data.replies.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(replies))
}

pub async fn get_reply(
    data: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (post_id, reply_id) = path.into_inner();
    let reply = diary::get_reply(data.replies.as_ref(), post_id, reply_id).await?;
    Ok(HttpResponse::Ok().json(reply))
}

pub async fn create_reply(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Json<ReplyForm>,
) -> Result<HttpResponse, ApiError> {
    let reply = diary::create_reply(
        data.posts.as_ref(),
        data.replies.as_ref(),
        &identity,
        path.into_inner(),
        form.into_inner(),
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Created().json(reply))
}

pub async fn update_reply(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let (post_id, reply_id) = path.into_inner();
    let reply = diary::update_reply(
        data.replies.as_ref(),
        &identity,
        post_id,
        reply_id,
        &body,
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(reply))
}

pub async fn delete_reply(
    AuthenticatedUser(identity): AuthenticatedUser,
    data: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (post_id, reply_id) = path.into_inner();
    diary::delete_reply(data.replies.as_ref(), &identity, post_id, reply_id).await?;
    Ok(HttpResponse::Ok().json(MessageBody::new("Reply deleted")))
}
