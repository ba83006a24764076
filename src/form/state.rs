use std::fmt;

use clap::ValueEnum;

use crate::db::models::SensorType;

/// Editable fields of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum FormField {
    GreenhouseId,
    GreenhouseName,
    ZoneId,
    ZoneName,
    SensorId,
    Value,
    ThresholdMin,
    ThresholdMax,
}

impl FormField {
    /// Identifier and name fields, in validation order.
    pub const TEXT: [FormField; 5] = [
        FormField::GreenhouseId,
        FormField::GreenhouseName,
        FormField::ZoneId,
        FormField::ZoneName,
        FormField::SensorId,
    ];

    /// Numeric fields, in validation order.
    pub const NUMERIC: [FormField; 3] = [
        FormField::Value,
        FormField::ThresholdMin,
        FormField::ThresholdMax,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::GreenhouseId => "greenhouse_id",
            FormField::GreenhouseName => "greenhouse_name",
            FormField::ZoneId => "zone_id",
            FormField::ZoneName => "zone_name",
            FormField::SensorId => "sensor_id",
            FormField::Value => "value",
            FormField::ThresholdMin => "threshold_min",
            FormField::ThresholdMax => "threshold_max",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current contents of the form, owned by the interface and handed to the
/// controller on submit. Inputs are kept verbatim until validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub greenhouse_id: String,
    pub greenhouse_name: String,
    pub zone_id: String,
    pub zone_name: String,
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub value: String,
    pub threshold_min: String,
    pub threshold_max: String,
    /// Whether a submission also goes to the database.
    pub save_to_database: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            greenhouse_id: String::new(),
            greenhouse_name: String::new(),
            zone_id: String::new(),
            zone_name: String::new(),
            sensor_id: String::new(),
            sensor_type: SensorType::default(),
            value: String::new(),
            threshold_min: String::new(),
            threshold_max: String::new(),
            save_to_database: true,
        }
    }
}

impl FormState {
    /// Read-only unit display, always derived from the selected sensor type.
    pub fn unit(&self) -> &'static str {
        self.sensor_type.unit()
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::GreenhouseId => &self.greenhouse_id,
            FormField::GreenhouseName => &self.greenhouse_name,
            FormField::ZoneId => &self.zone_id,
            FormField::ZoneName => &self.zone_name,
            FormField::SensorId => &self.sensor_id,
            FormField::Value => &self.value,
            FormField::ThresholdMin => &self.threshold_min,
            FormField::ThresholdMax => &self.threshold_max,
        }
    }

    pub fn set(&mut self, field: FormField, input: impl Into<String>) {
        let slot = match field {
            FormField::GreenhouseId => &mut self.greenhouse_id,
            FormField::GreenhouseName => &mut self.greenhouse_name,
            FormField::ZoneId => &mut self.zone_id,
            FormField::ZoneName => &mut self.zone_name,
            FormField::SensorId => &mut self.sensor_id,
            FormField::Value => &mut self.value,
            FormField::ThresholdMin => &mut self.threshold_min,
            FormField::ThresholdMax => &mut self.threshold_max,
        };
        *slot = input.into();
    }
}
