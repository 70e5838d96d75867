//! Use cases. Each function takes the ports it needs, so the API layer
//! decides which plugin sits behind them.

pub mod accounts;
pub mod authenticator;
pub mod diary;
