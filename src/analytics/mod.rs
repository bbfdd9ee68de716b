//! Derived statistics over a plant's or zone's full set of readings.
//!
//! Every function here is pure: callers fetch the readings (in insertion
//! order) and pass them in.

use chrono::{DateTime, Utc};

use crate::db::models::PlantReading;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("no readings found")]
    NoReadings,
    /// Readings exist but none of them carry this measurement.
    #[error("no {0} values recorded")]
    MissingMeasurement(&'static str),
}

// ---------------------------------------------------------------------------
// Growth rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthRate {
    /// Timestamp of the later reading of the pair.
    pub timestamp: DateTime<Utc>,
    pub growth_rate: f64,
}

/// Height delta for each consecutive pair of readings where both heights are
/// known. Pairs with a missing height are skipped, not bridged.
pub fn growth_rates(readings: &[PlantReading]) -> Vec<GrowthRate> {
    readings
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            match (prev.plant_height, curr.plant_height) {
                (Some(before), Some(after)) => Some(GrowthRate {
                    timestamp: curr.timestamp,
                    growth_rate: after - before,
                }),
                _ => None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Optimal conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimalConditions {
    /// e.g. `"18.00-24.50°C"`
    pub temperature_range: String,
    /// e.g. `"40.00-65.00%"`
    pub humidity_range: String,
    /// e.g. `"30.00-42.10"`
    pub soil_moisture_range: String,
}

/// Observed `[min, max]` of temperature, humidity and soil moisture.
pub fn optimal_conditions(readings: &[PlantReading]) -> Result<OptimalConditions, AnalyticsError> {
    if readings.is_empty() {
        return Err(AnalyticsError::NoReadings);
    }

    let temperature = range(readings.iter().map(|r| r.temperature), "temperature")?;
    let humidity = range(readings.iter().map(|r| r.humidity), "humidity")?;
    let soil_moisture = range(readings.iter().map(|r| r.soil_moisture), "soil moisture")?;

    Ok(OptimalConditions {
        temperature_range: format_range(temperature, "°C"),
        humidity_range: format_range(humidity, "%"),
        soil_moisture_range: format_range(soil_moisture, ""),
    })
}

fn range(
    values: impl Iterator<Item = Option<f64>>,
    name: &'static str,
) -> Result<(f64, f64), AnalyticsError> {
    values
        .flatten()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(AnalyticsError::MissingMeasurement(name))
}

fn format_range((min, max): (f64, f64), unit: &str) -> String {
    format!("{min:.2}-{max:.2}{unit}")
}

// ---------------------------------------------------------------------------
// Yield prediction
// ---------------------------------------------------------------------------

/// Coarse yield category derived from mean temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldBucket {
    /// Cold and dry: mean temperature < 15 and mean humidity < 50.
    Low,
    /// 15 ≤ temperature ≤ 25 and 50 ≤ humidity ≤ 70.
    Moderate,
    /// Anything else.
    High,
}

impl YieldBucket {
    pub fn classify(avg_temperature: f64, avg_humidity: f64) -> Self {
        if avg_temperature < 15.0 && avg_humidity < 50.0 {
            Self::Low
        } else if (15.0..=25.0).contains(&avg_temperature) && (50.0..=70.0).contains(&avg_humidity) {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::Low => 10,
            Self::Moderate => 20,
            Self::High => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YieldPrediction {
    pub bucket: YieldBucket,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
}

pub fn predict_yield(readings: &[PlantReading]) -> Result<YieldPrediction, AnalyticsError> {
    if readings.is_empty() {
        return Err(AnalyticsError::NoReadings);
    }

    let avg_temperature = mean(readings.iter().map(|r| r.temperature), "temperature")?;
    let avg_humidity = mean(readings.iter().map(|r| r.humidity), "humidity")?;

    Ok(YieldPrediction {
        bucket: YieldBucket::classify(avg_temperature, avg_humidity),
        avg_temperature,
        avg_humidity,
    })
}

/// Mean of the present values; all-absent is an error instead of a 0/0.
fn mean(
    values: impl Iterator<Item = Option<f64>>,
    name: &'static str,
) -> Result<f64, AnalyticsError> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Err(AnalyticsError::MissingMeasurement(name));
    }
    Ok(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn reading(temperature: f64, humidity: f64, soil: f64, height: Option<f64>, at: DateTime<Utc>) -> PlantReading {
        PlantReading {
            id: Uuid::new_v4(),
            zone_id: "zone-a".into(),
            plant_id: "pl1".into(),
            temperature: Some(temperature),
            humidity: Some(humidity),
            soil_moisture: Some(soil),
            light_level: Some(500.0),
            plant_height: height,
            timestamp: at,
            created_at: at,
        }
    }

    fn with_height(height: Option<f64>, at: DateTime<Utc>) -> PlantReading {
        reading(20.0, 50.0, 30.0, height, at)
    }

    // -----------------------------------------------------------------------
    // growth_rates
    // -----------------------------------------------------------------------

    #[test]
    fn growth_rate_skips_pairs_with_missing_height() {
        let readings = vec![
            with_height(Some(1.0), t(0)),
            with_height(Some(1.5), t(1)),
            with_height(None, t(2)),
        ];
        assert_eq!(
            growth_rates(&readings),
            vec![GrowthRate { timestamp: t(1), growth_rate: 0.5 }]
        );
    }

    #[test]
    fn growth_rate_does_not_bridge_gaps() {
        let readings = vec![
            with_height(Some(1.0), t(0)),
            with_height(None, t(1)),
            with_height(Some(3.0), t(2)),
        ];
        assert!(growth_rates(&readings).is_empty());
    }

    #[test]
    fn growth_rate_can_be_negative() {
        let readings = vec![with_height(Some(2.0), t(0)), with_height(Some(1.25), t(1))];
        assert_eq!(growth_rates(&readings)[0].growth_rate, -0.75);
    }

    #[test]
    fn growth_rate_empty_and_single_inputs_yield_nothing() {
        assert!(growth_rates(&[]).is_empty());
        assert!(growth_rates(&[with_height(Some(1.0), t(0))]).is_empty());
    }

    #[test]
    fn growth_rate_all_missing_heights_yield_nothing() {
        let readings = vec![with_height(None, t(0)), with_height(None, t(1))];
        assert!(growth_rates(&readings).is_empty());
    }

    // -----------------------------------------------------------------------
    // optimal_conditions
    // -----------------------------------------------------------------------

    #[test]
    fn optimal_conditions_single_reading() {
        let oc = optimal_conditions(&[reading(20.0, 50.0, 30.0, None, t(0))]).unwrap();
        assert_eq!(oc.temperature_range, "20.00-20.00°C");
        assert_eq!(oc.humidity_range, "50.00-50.00%");
        assert_eq!(oc.soil_moisture_range, "30.00-30.00");
    }

    #[test]
    fn optimal_conditions_spans_min_to_max() {
        let readings = vec![
            reading(22.5, 61.0, 35.0, None, t(0)),
            reading(18.25, 70.5, 31.0, None, t(1)),
            reading(19.0, 55.0, 40.1, None, t(2)),
        ];
        let oc = optimal_conditions(&readings).unwrap();
        assert_eq!(oc.temperature_range, "18.25-22.50°C");
        assert_eq!(oc.humidity_range, "55.00-70.50%");
        assert_eq!(oc.soil_moisture_range, "31.00-40.10");
    }

    #[test]
    fn optimal_conditions_ignores_missing_values() {
        let mut partial = reading(5.0, 10.0, 10.0, None, t(1));
        partial.temperature = None;
        let readings = vec![reading(20.0, 50.0, 30.0, None, t(0)), partial];
        let oc = optimal_conditions(&readings).unwrap();
        assert_eq!(oc.temperature_range, "20.00-20.00°C");
        assert_eq!(oc.humidity_range, "10.00-50.00%");
    }

    #[test]
    fn optimal_conditions_without_readings_is_an_error() {
        assert_eq!(optimal_conditions(&[]), Err(AnalyticsError::NoReadings));
    }

    #[test]
    fn optimal_conditions_with_no_soil_values_is_an_error() {
        let mut r = reading(20.0, 50.0, 30.0, None, t(0));
        r.soil_moisture = None;
        assert_eq!(
            optimal_conditions(&[r]),
            Err(AnalyticsError::MissingMeasurement("soil moisture"))
        );
    }

    // -----------------------------------------------------------------------
    // predict_yield
    // -----------------------------------------------------------------------

    #[test]
    fn yield_buckets_follow_thresholds() {
        assert_eq!(YieldBucket::classify(10.0, 40.0).value(), 10);
        assert_eq!(YieldBucket::classify(20.0, 60.0).value(), 20);
        assert_eq!(YieldBucket::classify(30.0, 80.0).value(), 30);
    }

    #[test]
    fn yield_bucket_boundaries_are_inclusive_for_moderate() {
        assert_eq!(YieldBucket::classify(15.0, 50.0), YieldBucket::Moderate);
        assert_eq!(YieldBucket::classify(25.0, 70.0), YieldBucket::Moderate);
        assert_eq!(YieldBucket::classify(14.9, 50.0), YieldBucket::High);
        assert_eq!(YieldBucket::classify(14.9, 49.9), YieldBucket::Low);
        assert_eq!(YieldBucket::classify(20.0, 70.1), YieldBucket::High);
    }

    #[test]
    fn predict_yield_averages_readings() {
        let readings = vec![
            reading(18.0, 55.0, 30.0, None, t(0)),
            reading(22.0, 65.0, 30.0, None, t(1)),
        ];
        let p = predict_yield(&readings).unwrap();
        assert_eq!(p.avg_temperature, 20.0);
        assert_eq!(p.avg_humidity, 60.0);
        assert_eq!(p.bucket, YieldBucket::Moderate);
    }

    #[test]
    fn predict_yield_ignores_missing_values() {
        let mut partial = reading(100.0, 40.0, 30.0, None, t(1));
        partial.temperature = None;
        let readings = vec![reading(10.0, 40.0, 30.0, None, t(0)), partial];
        let p = predict_yield(&readings).unwrap();
        assert_eq!(p.avg_temperature, 10.0);
        assert_eq!(p.bucket, YieldBucket::Low);
    }

    #[test]
    fn predict_yield_without_readings_is_an_error() {
        assert_eq!(predict_yield(&[]), Err(AnalyticsError::NoReadings));
    }

    #[test]
    fn predict_yield_all_humidity_missing_is_an_error() {
        let mut r = reading(20.0, 50.0, 30.0, None, t(0));
        r.humidity = None;
        assert_eq!(
            predict_yield(&[r]),
            Err(AnalyticsError::MissingMeasurement("humidity"))
        );
    }
}
