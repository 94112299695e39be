use axum::Router;

use crate::AppState;

pub mod health;

/// Every API route, bound to the shared state.
pub fn create_router(state: AppState) -> Router {
    Router::new().merge(health::routes()).with_state(state)
}
