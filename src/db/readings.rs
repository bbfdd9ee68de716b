use sqlx::{PgExecutor, PgPool};

use super::models::{NewPlantReading, PlantReading};

const INSERT_SQL: &str = r#"
    INSERT INTO plant_readings
        (id, zone_id, plant_id, temperature, humidity,
         soil_moisture, light_level, plant_height, "timestamp", created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, zone_id, plant_id, temperature, humidity,
              soil_moisture, light_level, plant_height, "timestamp", created_at
"#;

async fn insert_with<'e, E: PgExecutor<'e>>(
    executor: E,
    reading: &NewPlantReading,
) -> Result<PlantReading, sqlx::Error> {
    sqlx::query_as::<_, PlantReading>(INSERT_SQL)
        .bind(reading.id)
        .bind(&reading.zone_id)
        .bind(&reading.plant_id)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.soil_moisture)
        .bind(reading.light_level)
        .bind(reading.plant_height)
        .bind(reading.timestamp)
        .bind(reading.created_at)
        .fetch_one(executor)
        .await
}

pub async fn insert_one(pool: &PgPool, reading: &NewPlantReading) -> Result<PlantReading, sqlx::Error> {
    insert_with(pool, reading).await
}

/// Inserts every reading inside one transaction and returns the stored rows
/// in input order. Any failure rolls the whole batch back.
pub async fn insert_batch(
    pool: &PgPool,
    readings: &[NewPlantReading],
) -> Result<Vec<PlantReading>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut stored = Vec::with_capacity(readings.len());

    for reading in readings {
        stored.push(insert_with(&mut *tx, reading).await?);
    }

    tx.commit().await?;
    Ok(stored)
}

/// All readings whose `zone_id` equals `zone_id`, in insertion order.
pub async fn by_zone(pool: &PgPool, zone_id: &str) -> Result<Vec<PlantReading>, sqlx::Error> {
    sqlx::query_as::<_, PlantReading>(
        r#"
        SELECT id, zone_id, plant_id, temperature, humidity,
               soil_moisture, light_level, plant_height, "timestamp", created_at
        FROM plant_readings
        WHERE zone_id = $1
        ORDER BY ingest_seq ASC
        "#,
    )
    .bind(zone_id)
    .fetch_all(pool)
    .await
}

/// Readings in `zone_id` (exact match) whose `plant_id` contains
/// `plant_fragment` as a literal substring, in insertion order.
pub async fn by_zone_and_plant(
    pool: &PgPool,
    zone_id: &str,
    plant_fragment: &str,
) -> Result<Vec<PlantReading>, sqlx::Error> {
    sqlx::query_as::<_, PlantReading>(
        r#"
        SELECT id, zone_id, plant_id, temperature, humidity,
               soil_moisture, light_level, plant_height, "timestamp", created_at
        FROM plant_readings
        WHERE zone_id = $1
          AND strpos(plant_id, $2) > 0
        ORDER BY ingest_seq ASC
        "#,
    )
    .bind(zone_id)
    .bind(plant_fragment)
    .fetch_all(pool)
    .await
}

/// All readings whose `plant_id` equals `plant_id`, in insertion order.
pub async fn by_plant(pool: &PgPool, plant_id: &str) -> Result<Vec<PlantReading>, sqlx::Error> {
    sqlx::query_as::<_, PlantReading>(
        r#"
        SELECT id, zone_id, plant_id, temperature, humidity,
               soil_moisture, light_level, plant_height, "timestamp", created_at
        FROM plant_readings
        WHERE plant_id = $1
        ORDER BY ingest_seq ASC
        "#,
    )
    .bind(plant_id)
    .fetch_all(pool)
    .await
}
