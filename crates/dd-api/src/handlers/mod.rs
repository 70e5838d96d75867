//! # dd-api Handlers
//!
//! Thin glue between HTTP requests and the dd-core services. Mutating
//! handlers take an `AuthenticatedUser`, so they never run unauthenticated.

pub mod auth;
pub mod posts;
pub mod replies;
