use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string.
    pub hashed_password: String,
}

/// One row of `plant_readings`.
///
/// Measurement columns are nullable in storage; ingestion always fills them
/// but analytics treat a missing value as absent rather than zero.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlantReading {
    pub id: Uuid,
    pub zone_id: String,
    pub plant_id: String,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub light_level: Option<f64>,
    pub plant_height: Option<f64>,
    /// When the observation was taken.
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A reading ready for insertion; the id is generated by the service, not
/// by the database.
#[derive(Debug, Clone)]
pub struct NewPlantReading {
    pub id: Uuid,
    pub zone_id: String,
    pub plant_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_level: f64,
    pub plant_height: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
