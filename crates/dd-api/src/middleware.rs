//! digital-diary/crates/dd-api/src/middleware.rs Middleware
//!
//! Request logging and CORS for the single-page client.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;

/// remote-ip "request-line" status-code response-size "referrer" "user-agent" time
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// Any origin unless one is configured. The client sends its token in the
/// `Authorization` header, so that header must be allowed.
pub fn cors_policy(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}
