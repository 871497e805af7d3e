pub mod error;
pub mod health;
pub mod statistics;

use axum::{Router, routing::get};

pub use error::{ApiError, ErrorResponse};

use crate::AppState;

/// Routes served under the `/api` prefix.
pub fn get_api_routes() -> Router<AppState> {
    Router::new().route(
        "/statistics",
        get(statistics::report)
            .post(statistics::record)
            .delete(statistics::reset),
    )
}
