pub mod auth;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod users;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::auth::CredentialService;
use handlers::ApiDoc;

/// Shared per-request context: the connection pool and the credential
/// service. Both are cheap handles onto shared state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub credentials: CredentialService,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for CredentialService {
    fn from_ref(state: &AppState) -> Self {
        state.credentials.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/", get(handlers::root))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route(
            "/api/v1/sensor-data/batch",
            post(handlers::create_readings_batch).get(handlers::get_batch_zone_readings),
        )
        .route(
            "/api/v1/sensor-data/single",
            post(handlers::create_reading).get(handlers::get_single_zone_readings),
        )
        .route("/api/v1/sensor-data/{zone_id}", get(handlers::get_zone_readings))
        .route(
            "/api/v1/sensor-data/{zone_id}/{plant_id}",
            get(handlers::get_zone_plant_readings),
        )
        .route(
            "/api/v1/analytics/growth-rate/{plant_id}",
            get(handlers::get_growth_rate),
        )
        .route(
            "/api/v1/analytics/optimal-conditions/{species_id}",
            get(handlers::get_optimal_conditions),
        )
        .route(
            "/api/v1/analytics/yield-prediction/{zone_id}",
            get(handlers::get_yield_prediction),
        )
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
