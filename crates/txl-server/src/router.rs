use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all TXL endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/v1/transactions",
            get(handler::list_all_handler).post(handler::append_handler),
        )
        .route(
            "/v1/transactions/reference",
            get(handler::find_by_reference_query_handler),
        )
        .route(
            "/v1/transactions/reference/:reference",
            get(handler::find_by_reference_handler),
        )
        .route(
            "/v1/users/:user/transactions",
            get(handler::list_by_user_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
