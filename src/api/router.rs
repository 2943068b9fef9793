use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::companies;
use super::health;
use super::middleware::{logging_middleware, require_identity};
use super::state::AppState;
use super::surveys;
use super::teams;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", auth::create_protected_auth_router())
        .nest("/companies", companies::create_companies_router())
        .nest("/teams", teams::create_teams_router())
        .nest("/surveys", surveys::create_surveys_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_identity));

    let v1 = Router::new()
        .nest("/auth", auth::create_public_auth_router())
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
