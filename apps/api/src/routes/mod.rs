pub mod applications;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/favicon.ico", get(health::favicon_handler))
        .route("/health", get(health::health_handler))
        // Applications API
        .route("/apply", post(applications::handle_apply))
        .route("/applications", get(applications::handle_list_applications))
        .route(
            "/applications/:id",
            get(applications::handle_get_application),
        )
        .with_state(state)
}
