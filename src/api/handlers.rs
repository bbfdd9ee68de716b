use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use sqlx::PgPool;
use tracing::debug;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::{
    dto::{
        CurrentUserDto, GrowthRateDto, GrowthRatesResponse, MessageResponse, OptimalConditionsDto,
        SensorReadingCreate, SensorReadingDto, TokenResponse, UserCredentials, UserDto,
        YieldPredictionDto,
    },
    errors::AppError,
    users,
};
use crate::{
    analytics::{self, AnalyticsError},
    db,
    sensors::SensorService,
};

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Store a list of readings atomically; the response keeps request order.
#[utoipa::path(
    post,
    path = "/api/v1/sensor-data/batch",
    request_body = Vec<SensorReadingCreate>,
    responses(
        (status = 200, description = "Stored readings with generated ids", body = Vec<SensorReadingDto>),
        (status = 400, description = "Malformed payload"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensor-data"
)]
pub async fn create_readings_batch(
    State(pool): State<PgPool>,
    payload: Result<Json<Vec<SensorReadingCreate>>, JsonRejection>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let Json(readings) = payload?;
    let stored = SensorService::new(pool)
        .ingest_batch(readings.into_iter().map(Into::into).collect())
        .await?;
    Ok(Json(stored.into_iter().map(Into::into).collect()))
}

/// Store a single reading.
#[utoipa::path(
    post,
    path = "/api/v1/sensor-data/single",
    request_body = SensorReadingCreate,
    responses(
        (status = 200, description = "Stored reading with generated id", body = SensorReadingDto),
        (status = 400, description = "Malformed payload"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensor-data"
)]
pub async fn create_reading(
    State(pool): State<PgPool>,
    payload: Result<Json<SensorReadingCreate>, JsonRejection>,
) -> Result<Json<SensorReadingDto>, AppError> {
    let Json(reading) = payload?;
    let stored = SensorService::new(pool).ingest_one(reading.into()).await?;
    Ok(Json(stored.into()))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// All readings for a zone (exact match), in insertion order.
#[utoipa::path(
    get,
    path = "/api/v1/sensor-data/{zone_id}",
    params(
        ("zone_id" = String, Path, description = "Zone identifier (exact match)"),
    ),
    responses(
        (status = 200, description = "Zone readings", body = Vec<SensorReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensor-data"
)]
pub async fn get_zone_readings(
    State(pool): State<PgPool>,
    Path(zone_id): Path<String>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    zone_readings(&pool, &zone_id).await
}

// `batch` and `single` are ordinary zone ids too. Their static POST routes
// win over `{zone_id}`, so the GET side is routed here explicitly.

pub async fn get_batch_zone_readings(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    zone_readings(&pool, "batch").await
}

pub async fn get_single_zone_readings(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    zone_readings(&pool, "single").await
}

async fn zone_readings(pool: &PgPool, zone_id: &str) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let rows = db::readings::by_zone(pool, zone_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Readings for a zone (exact match) whose plant id contains `plant_id`.
#[utoipa::path(
    get,
    path = "/api/v1/sensor-data/{zone_id}/{plant_id}",
    params(
        ("zone_id"  = String, Path, description = "Zone identifier (exact match)"),
        ("plant_id" = String, Path, description = "Plant id fragment (substring match)"),
    ),
    responses(
        (status = 200, description = "Matching readings", body = Vec<SensorReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensor-data"
)]
pub async fn get_zone_plant_readings(
    State(pool): State<PgPool>,
    Path((zone_id, plant_id)): Path<(String, String)>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let rows = db::readings::by_zone_and_plant(&pool, &zone_id, &plant_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Height change between consecutive readings of a plant.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/growth-rate/{plant_id}",
    params(
        ("plant_id" = String, Path, description = "Plant identifier (exact match)"),
    ),
    responses(
        (status = 200, description = "Growth deltas; empty when heights are missing", body = GrowthRatesResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn get_growth_rate(
    State(pool): State<PgPool>,
    Path(plant_id): Path<String>,
) -> Result<Json<GrowthRatesResponse>, AppError> {
    let readings = db::readings::by_plant(&pool, &plant_id).await?;
    let growth_rates = analytics::growth_rates(&readings);
    debug!(plant_id = %plant_id, readings = readings.len(), deltas = growth_rates.len(), "Growth rate computed");

    Ok(Json(GrowthRatesResponse {
        growth_rates: growth_rates.into_iter().map(GrowthRateDto::from).collect(),
    }))
}

/// Observed min/max temperature, humidity and soil moisture for a plant id.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/optimal-conditions/{species_id}",
    params(
        ("species_id" = String, Path, description = "Matched against the reading's plant id"),
    ),
    responses(
        (status = 200, description = "Observed ranges", body = OptimalConditionsDto),
        (status = 404, description = "No sensor data for this species"),
        (status = 422, description = "A measurement is missing on every reading"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn get_optimal_conditions(
    State(pool): State<PgPool>,
    Path(species_id): Path<String>,
) -> Result<Json<OptimalConditionsDto>, AppError> {
    let readings = db::readings::by_plant(&pool, &species_id).await?;
    let conditions = analytics::optimal_conditions(&readings).map_err(|e| match e {
        AnalyticsError::NoReadings => {
            AppError::NotFound("No sensor data found for this species".to_owned())
        }
        other => other.into(),
    })?;
    Ok(Json(conditions.into()))
}

/// Yield bucket for a zone from its mean temperature and humidity.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/yield-prediction/{zone_id}",
    params(
        ("zone_id" = String, Path, description = "Zone identifier (exact match)"),
    ),
    responses(
        (status = 200, description = "Yield bucket and the means it was derived from", body = YieldPredictionDto),
        (status = 404, description = "No data for the zone"),
        (status = 422, description = "No temperature or humidity values recorded"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn get_yield_prediction(
    State(pool): State<PgPool>,
    Path(zone_id): Path<String>,
) -> Result<Json<YieldPredictionDto>, AppError> {
    let readings = db::readings::by_zone(&pool, &zone_id).await?;
    let prediction = analytics::predict_yield(&readings).map_err(|e| match e {
        AnalyticsError::NoReadings => AppError::NotFound("No data found for the zone".to_owned()),
        other => other.into(),
    })?;
    Ok(Json(YieldPredictionDto::new(zone_id, prediction)))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse),
    ),
    tag = "system"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Plant API!".to_owned(),
    })
}

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        create_readings_batch,
        create_reading,
        get_zone_readings,
        get_zone_plant_readings,
        get_growth_rate,
        get_optimal_conditions,
        get_yield_prediction,
        root,
        health,
        users::register,
        users::login,
        users::me,
    ),
    components(schemas(
        SensorReadingCreate,
        SensorReadingDto,
        GrowthRateDto,
        GrowthRatesResponse,
        OptimalConditionsDto,
        YieldPredictionDto,
        MessageResponse,
        UserCredentials,
        UserDto,
        TokenResponse,
        CurrentUserDto,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "sensor-data", description = "Reading ingestion and lookup"),
        (name = "analytics",   description = "Derived plant statistics"),
        (name = "users",       description = "Registration and login"),
        (name = "system",      description = "System endpoints"),
    ),
    info(
        title = "Plant Monitor API",
        version = "0.1.0",
        description = "REST API for plant-environment sensor readings and analytics"
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected endpoints.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
