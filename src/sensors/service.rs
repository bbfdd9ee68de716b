use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{
    self,
    models::{NewPlantReading, PlantReading},
};

/// A reading before it has an id. `timestamp` is the observation time, if
/// the sender supplied one.
#[derive(Debug, Clone)]
pub struct ReadingInput {
    pub zone_id: String,
    pub plant_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_level: f64,
    pub plant_height: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

pub struct SensorService {
    pool: PgPool,
}

impl SensorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores one reading under a freshly generated id.
    pub async fn ingest_one(&self, input: ReadingInput) -> Result<PlantReading, sqlx::Error> {
        let reading = prepare(input, Utc::now());
        let stored = db::readings::insert_one(&self.pool, &reading).await?;

        info!(
            id = %stored.id,
            zone_id = %stored.zone_id,
            plant_id = %stored.plant_id,
            "Sensor reading stored"
        );
        Ok(stored)
    }

    /// Stores every reading in one transaction; the result keeps input order.
    pub async fn ingest_batch(
        &self,
        inputs: Vec<ReadingInput>,
    ) -> Result<Vec<PlantReading>, sqlx::Error> {
        let now = Utc::now();
        let readings: Vec<NewPlantReading> =
            inputs.into_iter().map(|i| prepare(i, now)).collect();

        let stored = db::readings::insert_batch(&self.pool, &readings).await?;

        info!(count = stored.len(), "Sensor reading batch stored");
        Ok(stored)
    }
}

/// Assigns an id and fills in the observation time when the client omitted it.
fn prepare(input: ReadingInput, now: DateTime<Utc>) -> NewPlantReading {
    NewPlantReading {
        id: Uuid::new_v4(),
        zone_id: input.zone_id,
        plant_id: input.plant_id,
        temperature: input.temperature,
        humidity: input.humidity,
        soil_moisture: input.soil_moisture,
        light_level: input.light_level,
        plant_height: input.plant_height,
        timestamp: input.timestamp.unwrap_or(now),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn input(timestamp: Option<DateTime<Utc>>) -> ReadingInput {
        ReadingInput {
            zone_id: "zone-a".into(),
            plant_id: "pl1".into(),
            temperature: 21.5,
            humidity: 55.0,
            soil_moisture: 32.0,
            light_level: 800.0,
            plant_height: Some(12.0),
            timestamp,
        }
    }

    #[test]
    fn prepare_defaults_timestamp_to_ingestion_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let r = prepare(input(None), now);
        assert_eq!(r.timestamp, now);
        assert_eq!(r.created_at, now);
    }

    #[test]
    fn prepare_keeps_client_timestamp() {
        let observed = Utc.with_ymd_and_hms(2024, 5, 30, 6, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let r = prepare(input(Some(observed)), now);
        assert_eq!(r.timestamp, observed);
        assert_eq!(r.created_at, now);
    }

    #[test]
    fn prepare_generates_distinct_ids() {
        let now = Utc::now();
        let a = prepare(input(None), now);
        let b = prepare(input(None), now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn prepare_copies_measurements() {
        let r = prepare(input(None), Utc::now());
        assert_eq!(r.zone_id, "zone-a");
        assert_eq!(r.plant_id, "pl1");
        assert_eq!(r.temperature, 21.5);
        assert_eq!(r.humidity, 55.0);
        assert_eq!(r.soil_moisture, 32.0);
        assert_eq!(r.light_level, 800.0);
        assert_eq!(r.plant_height, Some(12.0));
    }
}
