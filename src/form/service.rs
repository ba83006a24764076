use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use super::state::{FormField, FormState};
use crate::{
    db::models::{Reading, ReadingInput},
    error::ValidationError,
    gateway::{PersistOutcome, PersistenceGateway},
};

/// Advisory raised when an accepted reading falls outside its own range.
/// Never blocks or undoes a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdAdvisory {
    pub value: f64,
    pub threshold_min: f64,
    pub threshold_max: f64,
}

impl ThresholdAdvisory {
    pub fn message(&self) -> String {
        format!(
            "sensor value ({}) is outside the accepted range [{}, {}]",
            self.value, self.threshold_min, self.threshold_max
        )
    }
}

/// A submission that passed validation.
#[derive(Debug)]
pub struct Submission {
    pub reading: Reading,
    pub outcome: PersistOutcome,
    pub advisory: Option<ThresholdAdvisory>,
}

pub struct FormController {
    gateway: PersistenceGateway,
}

impl FormController {
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Checks all eight fields for content in form order, then parses the
    /// numeric fields. Returns at the first failure. Min and max are not compared.
    pub fn validate(form: &FormState) -> Result<ReadingInput, ValidationError> {
        for field in FormField::TEXT.into_iter().chain(FormField::NUMERIC) {
            if form.get(field).trim().is_empty() {
                return Err(ValidationError::Empty { field });
            }
        }

        let [value, threshold_min, threshold_max] = FormField::NUMERIC.map(|field| parse_number(form, field));

        Ok(ReadingInput {
            greenhouse_id: form.greenhouse_id.trim().to_owned(),
            greenhouse_name: form.greenhouse_name.trim().to_owned(),
            zone_id: form.zone_id.trim().to_owned(),
            zone_name: form.zone_name.trim().to_owned(),
            sensor_id: form.sensor_id.trim().to_owned(),
            sensor_type: form.sensor_type,
            value: value?,
            threshold_min: threshold_min?,
            threshold_max: threshold_max?,
        })
    }

    /// Validates `form` and persists it stamped with the current local time.
    pub async fn submit(&self, form: &FormState) -> Result<Submission, ValidationError> {
        self.submit_at(form, Local::now().naive_local()).await
    }

    /// Like [`submit`](Self::submit) with an explicit capture time.
    ///
    /// Validation failures return before any sink is touched. Sink failures are
    /// reported inside the returned `Submission`.
    pub async fn submit_at(
        &self,
        form: &FormState,
        captured_at: NaiveDateTime,
    ) -> Result<Submission, ValidationError> {
        let input = Self::validate(form).inspect_err(|e| {
            warn!(field = %e.field(), error = %e, "Submission rejected");
        })?;
        let reading = Reading::capture(input, captured_at);

        let outcome = self.gateway.persist(&reading, form.save_to_database).await;

        let advisory = (outcome.stored_anywhere() && !reading.within_thresholds()).then(|| {
            ThresholdAdvisory {
                value: reading.value(),
                threshold_min: reading.threshold_min(),
                threshold_max: reading.threshold_max(),
            }
        });
        if let Some(a) = &advisory {
            warn!(sensor_id = %reading.sensor_id(), "{}", a.message());
        }

        info!(
            sensor_id = %reading.sensor_id(),
            complete = outcome.is_complete(),
            "Submission processed"
        );
        Ok(Submission { reading, outcome, advisory })
    }

    /// Blanks every input and resets the sensor type, which resets the unit.
    /// The database toggle is left as the operator set it.
    pub fn clear(form: &mut FormState) {
        *form = FormState {
            save_to_database: form.save_to_database,
            ..FormState::default()
        };
    }
}

fn parse_number(form: &FormState, field: FormField) -> Result<f64, ValidationError> {
    let raw = form.get(field).trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            input: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::Config,
        db::models::SensorType,
        gateway::TableWrite,
    };

    fn filled() -> FormState {
        FormState {
            greenhouse_id: "G1".into(),
            greenhouse_name: "North".into(),
            zone_id: "Z1".into(),
            zone_name: "Bay1".into(),
            sensor_id: "S1".into(),
            sensor_type: SensorType::Temperature,
            value: "42".into(),
            threshold_min: "10".into(),
            threshold_max: "30".into(),
            save_to_database: true,
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    async fn controller(dir: &TempDir) -> FormController {
        let gateway = PersistenceGateway::new(&Config::in_dir(dir.path()));
        gateway.initialize().await.unwrap();
        FormController::new(gateway)
    }

    fn log_lines(c: &FormController) -> usize {
        std::fs::read_to_string(c.gateway().log_path())
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    async fn row_count(c: &FormController) -> usize {
        c.gateway().fetch_recent(u32::MAX).await.unwrap().len()
    }

    #[test]
    fn validate_accepts_filled_form_and_trims_text() {
        let mut form = filled();
        form.greenhouse_name = "  North ".into();
        form.value = " 42 ".into();
        let input = FormController::validate(&form).unwrap();
        assert_eq!(input.greenhouse_name, "North");
        assert_eq!(input.value, 42.0);
        assert_eq!(input.threshold_max, 30.0);
    }

    #[test]
    fn validate_reports_each_blank_text_field() {
        for field in FormField::TEXT {
            let mut form = filled();
            form.set(field, "   ");
            let err = FormController::validate(&form).unwrap_err();
            assert!(matches!(err, ValidationError::Empty { field: f } if f == field));
        }
    }

    #[test]
    fn text_fields_are_checked_before_numbers() {
        let mut form = filled();
        form.sensor_id.clear();
        form.value = "abc".into();
        let err = FormController::validate(&form).unwrap_err();
        assert_eq!(err.field(), FormField::SensorId);
    }

    #[test]
    fn blank_numbers_are_reported_before_unparsable_ones() {
        let mut form = filled();
        form.value = "abc".into();
        form.threshold_min.clear();
        let err = FormController::validate(&form).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: FormField::ThresholdMin }), "{err:?}");
    }

    #[test]
    fn validate_names_the_non_numeric_field() {
        for field in FormField::NUMERIC {
            let mut form = filled();
            form.set(field, "twelve");
            let err = FormController::validate(&form).unwrap_err();
            assert_eq!(err.field(), field);
            assert!(err.to_string().contains(field.as_str()));
            assert!(err.to_string().contains("twelve"));
        }
    }

    #[test]
    fn blank_number_is_reported_as_missing() {
        let mut form = filled();
        form.threshold_min.clear();
        let err = FormController::validate(&form).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: FormField::ThresholdMin }));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            let mut form = filled();
            form.value = raw.into();
            assert!(matches!(
                FormController::validate(&form),
                Err(ValidationError::NotANumber { field: FormField::Value, .. })
            ));
        }
    }

    #[test]
    fn reversed_thresholds_and_negative_values_pass() {
        let mut form = filled();
        form.value = "-5.5".into();
        form.threshold_min = "50".into();
        form.threshold_max = "1e1".into();
        let input = FormController::validate(&form).unwrap();
        assert_eq!(input.threshold_min, 50.0);
        assert_eq!(input.threshold_max, 10.0);
    }

    #[tokio::test]
    async fn rejected_submission_touches_no_sink() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        c.submit_at(&filled(), noon()).await.unwrap();

        for field in FormField::TEXT {
            let mut bad = filled();
            bad.set(field, "  ");
            assert!(c.submit_at(&bad, noon()).await.is_err(), "{field} accepted blank");
            assert_eq!(log_lines(&c), 1, "{field} reached the log");
            assert_eq!(row_count(&c).await, 1, "{field} reached the table");
        }
        for field in FormField::NUMERIC {
            let mut bad = filled();
            bad.set(field, "high");
            assert!(c.submit_at(&bad, noon()).await.is_err());
            assert_eq!(log_lines(&c), 1);
            assert_eq!(row_count(&c).await, 1);
        }
    }

    #[tokio::test]
    async fn rejected_submission_keeps_form_contents() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        let mut form = filled();
        form.value = "n/a".into();
        let before = form.clone();

        assert!(c.submit(&form).await.is_err());
        assert_eq!(form, before);
    }

    #[tokio::test]
    async fn toggle_off_logs_but_inserts_nothing() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        let mut form = filled();
        form.save_to_database = false;

        let s = c.submit_at(&form, noon()).await.unwrap();
        assert!(matches!(s.outcome.table, TableWrite::Skipped));
        assert_eq!(log_lines(&c), 1);
        assert_eq!(row_count(&c).await, 0);
    }

    #[tokio::test]
    async fn value_inside_closed_range_raises_no_advisory() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        for v in ["10", "20", "30"] {
            let mut form = filled();
            form.value = v.into();
            let s = c.submit_at(&form, noon()).await.unwrap();
            assert!(s.advisory.is_none(), "value {v} should be in range");
        }
    }

    #[tokio::test]
    async fn value_outside_range_raises_advisory_after_persisting() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        let mut form = filled();
        form.value = "9.99".into();

        let s = c.submit_at(&form, noon()).await.unwrap();
        let advisory = s.advisory.unwrap();
        assert_eq!(advisory.value, 9.99);
        assert!(advisory.message().contains("[10, 30]"));
        assert_eq!(row_count(&c).await, 1);
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        let form = filled();
        assert_eq!(form.unit(), "°C");

        let s = c.submit_at(&form, noon()).await.unwrap();
        assert!(s.outcome.is_complete());
        assert_eq!(s.reading.unit(), "°C");
        assert_eq!(s.reading.value(), 42.0);
        assert!(s.advisory.is_some());
        assert_eq!(log_lines(&c), 1);

        let rows = c.gateway().fetch_recent(15).await.unwrap();
        assert_eq!(rows.len(), 1);
        let top = &rows[0];
        assert_eq!(top.greenhouse_name, "North");
        assert_eq!(top.zone_name, "Bay1");
        assert_eq!(top.sensor_id, "S1");
        assert_eq!(top.sensor_type, SensorType::Temperature);
        assert_eq!(top.value, 42.0);
        assert_eq!(top.unit, "°C");
        assert_eq!(top.timestamp, "2024-05-20 12:00:00");
    }

    #[tokio::test]
    async fn clear_resets_inputs_without_touching_storage() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir).await;
        let mut form = filled();
        form.sensor_type = SensorType::Co2;
        form.save_to_database = false;
        c.submit_at(&form, noon()).await.unwrap();

        FormController::clear(&mut form);

        for field in FormField::TEXT.into_iter().chain(FormField::NUMERIC) {
            assert_eq!(form.get(field), "");
        }
        assert_eq!(form.sensor_type, SensorType::Temperature);
        assert_eq!(form.unit(), "°C");
        assert!(!form.save_to_database);
        assert_eq!(log_lines(&c), 1);
    }
}
