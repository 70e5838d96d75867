//! # dd-api
//!
//! The web routing and orchestration layer for DigitalDiary.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

use actix_web::web;
use dd_core::error::AppError;

pub use error::ApiError;
pub use state::AppState;

use handlers::{auth, posts, replies};

/// Configures the `/api` routes plus the body and path extractor settings,
/// so malformed JSON and unparsable ids answer with the usual error body.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(path_config()).service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .service(web::resource("/register").route(web::post().to(auth::register)))
                    .service(web::resource("/login").route(web::post().to(auth::login))),
            )
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .service(
                web::resource("/posts/{id}/replies")
                    .route(web::get().to(replies::list_replies))
                    .route(web::post().to(replies::create_reply)),
            )
            .service(
                web::resource("/posts/{id}/replies/{reply_id}")
                    .route(web::get().to(replies::get_reply))
                    .route(web::put().to(replies::update_reply))
                    .route(web::delete().to(replies::delete_reply)),
            ),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::from(AppError::Validation(format!("Invalid request body: {err}"))).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| {
        ApiError::from(AppError::not_found("Resource")).into()
    })
}
