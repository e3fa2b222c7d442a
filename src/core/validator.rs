use crate::config::ProcessingConfig;
use crate::domain::model::{RawRecord, ValidatedRecord};
use crate::utils::error::RecordError;
use serde_json::Value;

/// Batches larger than `max_records` are reported but not rejected. Flip this
/// only together with the regression test that pins the current behaviour.
pub const OVERSIZED_BATCH_IS_ACCEPTED: bool = true;

/// Positive ids divisible by this value must carry a `company.name`.
pub const COMPANY_CHECK_MODULUS: i64 = 7;

#[derive(Debug, Clone)]
pub struct DataValidator {
    required_fields: Vec<String>,
    min_records: usize,
    max_records: usize,
}

impl DataValidator {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            required_fields: config.required_fields.clone(),
            min_records: config.min_records,
            max_records: config.max_records,
        }
    }

    /// `Ok(false)` for a non-integer id; `Err` for a missing required field or a
    /// failed `company.name` lookup.
    pub fn validate_record(&self, record: &RawRecord) -> Result<bool, RecordError> {
        Ok(self.check_record(record)?.is_some())
    }

    fn check_record(&self, record: &RawRecord) -> Result<Option<i64>, RecordError> {
        if let Some(field) = self.required_fields.iter().find(|f| !record.contains(f)) {
            tracing::debug!("Required field missing: {}", field);
            return Err(RecordError::MissingField {
                field: field.clone(),
            });
        }

        let Some(id) = record.integer_id() else {
            tracing::error!("Invalid id: {}", record.id_for_log());
            return Ok(None);
        };

        if id > 0 && id % COMPANY_CHECK_MODULUS == 0 {
            let _company_name = company_name(record)?;
            // No length check on the name: a length can never be negative, so the
            // historical `len < 0` rejection is a no-op and is not reproduced.
        }

        // email is read but not constrained.
        let _email = record.get("email");

        Ok(Some(id))
    }

    /// Keeps the records that validate, in input order. Rejections are logged and
    /// never propagate.
    pub fn validate_batch(&self, records: Vec<Value>) -> Vec<ValidatedRecord> {
        let total = records.len();
        let mut valid = Vec::with_capacity(total);

        for item in records {
            let record = match RawRecord::from_value(item) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Invalid user (ID: None): {}", e);
                    continue;
                }
            };

            match self.check_record(&record) {
                Ok(Some(id)) => valid.push(ValidatedRecord::new(id, record)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Invalid user (ID: {}): {}", record.id_for_log(), e);
                }
            }
        }

        tracing::info!("Validated {} of {} users", valid.len(), total);
        valid
    }

    pub fn validate_data_structure(&self, data: &Value) -> bool {
        let Some(items) = data.as_array() else {
            tracing::error!("Data must be a list");
            return false;
        };

        if items.len() < self.min_records {
            tracing::error!(
                "Insufficient data: {} < {}",
                items.len(),
                self.min_records
            );
            return false;
        }

        if items.len() > self.max_records {
            tracing::error!("Too many records: {} > {}", items.len(), self.max_records);
            return OVERSIZED_BATCH_IS_ACCEPTED;
        }

        true
    }
}

fn company_name(record: &RawRecord) -> Result<&Value, RecordError> {
    record
        .get("company")
        .and_then(Value::as_object)
        .and_then(|company| company.get("name"))
        .ok_or_else(|| RecordError::Lookup {
            path: "company.name".to_string(),
        })
}
