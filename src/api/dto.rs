use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    analytics::{GrowthRate, OptimalConditions, YieldPrediction},
    db::models::{PlantReading, User},
    sensors::ReadingInput,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request body for `POST /register` and `POST /login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserDto {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

/// One reading as submitted by a sensor gateway.
///
/// Numeric fields are not range-checked; any float is stored as given.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SensorReadingCreate {
    pub zone_id: String,
    pub plant_id: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_level: f64,
    #[serde(default)]
    pub plant_height: Option<f64>,
    /// Observation time (RFC3339). Defaults to ingestion time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<SensorReadingCreate> for ReadingInput {
    fn from(r: SensorReadingCreate) -> Self {
        Self {
            zone_id: r.zone_id,
            plant_id: r.plant_id,
            temperature: r.temperature,
            humidity: r.humidity,
            soil_moisture: r.soil_moisture,
            light_level: r.light_level,
            plant_height: r.plant_height,
            timestamp: r.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub id: Uuid,
    pub zone_id: String,
    pub plant_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub light_level: Option<f64>,
    pub plant_height: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PlantReading> for SensorReadingDto {
    fn from(r: PlantReading) -> Self {
        Self {
            id: r.id,
            zone_id: r.zone_id,
            plant_id: r.plant_id,
            temperature: r.temperature,
            humidity: r.humidity,
            soil_moisture: r.soil_moisture,
            light_level: r.light_level,
            plant_height: r.plant_height,
            timestamp: r.timestamp,
            created_at: r.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GrowthRateDto {
    /// Timestamp of the later reading of the pair.
    pub timestamp: DateTime<Utc>,
    /// Height difference to the previous reading.
    pub growth_rate: f64,
}

impl From<GrowthRate> for GrowthRateDto {
    fn from(g: GrowthRate) -> Self {
        Self {
            timestamp: g.timestamp,
            growth_rate: g.growth_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GrowthRatesResponse {
    pub growth_rates: Vec<GrowthRateDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OptimalConditionsDto {
    pub temperature_range: String,
    pub humidity_range: String,
    pub soil_moisture_range: String,
}

impl From<OptimalConditions> for OptimalConditionsDto {
    fn from(o: OptimalConditions) -> Self {
        Self {
            temperature_range: o.temperature_range,
            humidity_range: o.humidity_range,
            soil_moisture_range: o.soil_moisture_range,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct YieldPredictionDto {
    /// Yield bucket: 10, 20 or 30.
    pub predicted_yield: u8,
    pub zone: String,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
}

impl YieldPredictionDto {
    pub fn new(zone: String, p: YieldPrediction) -> Self {
        Self {
            predicted_yield: p.bucket.value(),
            zone,
            avg_temperature: p.avg_temperature,
            avg_humidity: p.avg_humidity,
        }
    }
}
