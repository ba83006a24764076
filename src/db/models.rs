use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Capture time format. Fixed width, so lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Mirrors the `sensor_type` column, stored as lowercase text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ValueEnum,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    #[default]
    #[value(name = "temperature")]
    Temperature,
    #[value(name = "humidity")]
    Humidity,
    #[value(name = "co2")]
    Co2,
    #[value(name = "light")]
    Light,
}

impl SensorType {
    pub const ALL: [SensorType; 4] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Co2,
        SensorType::Light,
    ];

    /// Display unit. The only place unit strings come from.
    pub fn unit(self) -> &'static str {
        match self {
            SensorType::Temperature => "°C",
            SensorType::Humidity => "%",
            SensorType::Co2 => "ppm",
            SensorType::Light => "lux",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Co2 => "co2",
            SensorType::Light => "light",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated operator input, everything a `Reading` needs except the capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingInput {
    pub greenhouse_id: String,
    pub greenhouse_name: String,
    pub zone_id: String,
    pub zone_name: String,
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub value: f64,
    pub threshold_min: f64,
    pub threshold_max: f64,
}

/// One sensor observation. Built once per submission and never mutated.
///
/// Serialized field order is the declaration order below, which is also the
/// key order of every log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    greenhouse_id: String,
    greenhouse_name: String,
    zone_id: String,
    zone_name: String,
    sensor_id: String,
    sensor_type: SensorType,
    unit: &'static str,
    value: f64,
    timestamp: String,
    threshold_min: f64,
    threshold_max: f64,
}

impl Reading {
    /// Stamps `input` with `captured_at` and derives the unit from the sensor type.
    pub fn capture(input: ReadingInput, captured_at: NaiveDateTime) -> Self {
        Self {
            greenhouse_id: input.greenhouse_id,
            greenhouse_name: input.greenhouse_name,
            zone_id: input.zone_id,
            zone_name: input.zone_name,
            sensor_id: input.sensor_id,
            sensor_type: input.sensor_type,
            unit: input.sensor_type.unit(),
            value: input.value,
            timestamp: captured_at.format(TIMESTAMP_FORMAT).to_string(),
            threshold_min: input.threshold_min,
            threshold_max: input.threshold_max,
        }
    }

    pub fn greenhouse_id(&self) -> &str {
        &self.greenhouse_id
    }

    pub fn greenhouse_name(&self) -> &str {
        &self.greenhouse_name
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn threshold_min(&self) -> f64 {
        self.threshold_min
    }

    pub fn threshold_max(&self) -> f64 {
        self.threshold_max
    }

    /// `true` when the value lies in the closed interval `[threshold_min, threshold_max]`.
    ///
    /// A reversed pair (min > max) contains nothing, so every value is out of range.
    pub fn within_thresholds(&self) -> bool {
        self.threshold_min <= self.value && self.value <= self.threshold_max
    }
}

/// Row shape returned by the recent-readings query.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecentReading {
    pub greenhouse_name: String,
    pub zone_name: String,
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub timestamp: String,
}
