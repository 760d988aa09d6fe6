//! Liveness endpoint served next to the webhook route.

use axum::{routing::get, Router};

/// Body returned by `GET /`.
pub const HEALTH_TEXT: &str = "✅ Bot is running and webhook is set.";

/// Router answering `GET /` so hosting platforms can probe the process.
#[must_use]
pub fn router() -> Router {
    Router::new().route("/", get(|| async { HEALTH_TEXT }))
}
