//! # DigitalDiary Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use configs::Settings;
use dd_api::{middleware, AppState};

// Feature-gated imports: each port is filled by whichever plugin is compiled in
#[cfg(feature = "db-sqlite")]
use dd_db_sqlite::SqliteDiaryRepo;

#[cfg(feature = "auth-jwt")]
use dd_auth_jwt::{Argon2Params, JwtAuthProvider};

#[cfg(not(all(feature = "db-sqlite", feature = "auth-jwt")))]
compile_error!("digital-diary needs a store plugin (db-sqlite) and an auth plugin (auth-jwt)");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Settings first, so RUST_LOG from .env reaches the logger
    let settings = Settings::load().context("invalid configuration")?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteDiaryRepo::new(&settings.database_url)
        .await
        .context("failed to open the sqlite store")?;

    // 2. Initialize Auth Implementation
    #[cfg(feature = "auth-jwt")]
    let auth = JwtAuthProvider::new(
        settings.jwt_secret,
        chrono::Duration::seconds(settings.token_ttl_secs),
    )
    .with_argon2_params(Argon2Params {
        memory_kib: settings.hashing.memory_kib,
        iterations: settings.hashing.iterations,
        parallelism: settings.hashing.parallelism,
    });

    // 3. Wrap in AppState (dynamic dispatch over the ports)
    let state = web::Data::new(AppState::new(repo, auth));
    let cors_origin = settings.cors_origin;

    log::info!(
        "DigitalDiary starting on http://{}:{}",
        settings.host,
        settings.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::cors_policy(cors_origin.as_deref()))
            .wrap(middleware::standard_middleware())
            .configure(dd_api::configure_routes)
    })
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("cannot bind {}:{}", settings.host, settings.port))?
    .run()
    .await?;

    Ok(())
}
