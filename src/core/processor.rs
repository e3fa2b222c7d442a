use crate::config::AppConfig;
use crate::core::validator::DataValidator;
use crate::domain::model::{
    Environment, FilteredRow, FilteredTable, ProcessedRow, ProcessedTable, Summary,
    ValidatedRecord, ENVIRONMENT_COLUMN, IS_VALID_COLUMN, PROCESSING_TIMESTAMP_COLUMN,
};
use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDateTime, Timelike};
use serde_json::Value;

/// Rows with this id are flagged `is_valid = false`. Fixed business rule.
pub const INVALID_ROW_ID: i64 = 7;

pub const PROCESSING_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const SUMMARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const SUMMARY_TIMESTAMP_MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// ISO-8601 timestamp for the summary. The fractional part is only written
/// when the microsecond component is non-zero.
pub fn summary_timestamp(now: NaiveDateTime) -> String {
    if now.nanosecond() / 1_000 == 0 {
        now.format(SUMMARY_TIMESTAMP_FORMAT).to_string()
    } else {
        now.format(SUMMARY_TIMESTAMP_MICROS_FORMAT).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct DataProcessor {
    validator: DataValidator,
    required_fields: Vec<String>,
    filter_threshold: i64,
    environment: Environment,
}

impl DataProcessor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            validator: DataValidator::new(&config.processing),
            required_fields: config.processing.required_fields.clone(),
            filter_threshold: config.processing.filter_threshold,
            environment: config.environment,
        }
    }

    pub fn validator(&self) -> &DataValidator {
        &self.validator
    }

    /// Structure check, per-record validation, filtering and enrichment.
    pub fn process_users(&self, payload: Value, now: NaiveDateTime) -> Result<ProcessedTable> {
        if !self.validator.validate_data_structure(&payload) {
            return Err(EtlError::StructuralError {
                message: "payload must be a list with at least the minimum number of records"
                    .to_string(),
            });
        }

        let Value::Array(users) = payload else {
            return Err(EtlError::StructuralError {
                message: "payload is not a list".to_string(),
            });
        };

        tracing::info!("Processing {} records...", users.len());

        let valid_users = self.validator.validate_batch(users);
        if valid_users.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "no valid users found".to_string(),
            });
        }

        let filtered = self.apply_filters(&valid_users);
        let table = enrich(filtered, now, self.environment);

        if table.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!("no users with id <= {}", self.filter_threshold),
            });
        }

        tracing::info!("✅ Processing complete: {} records", table.len());
        Ok(table)
    }

    /// Keeps `id <= filter_threshold` and projects onto the required fields seen
    /// in the batch, in configuration order.
    pub fn apply_filters(&self, records: &[ValidatedRecord]) -> FilteredTable {
        tracing::debug!("Applying filters (id <= {})", self.filter_threshold);

        let columns: Vec<String> = self
            .required_fields
            .iter()
            .filter(|field| records.iter().any(|r| r.contains(field)))
            .cloned()
            .collect();

        let rows: Vec<FilteredRow> = records
            .iter()
            .filter(|r| r.id() <= self.filter_threshold)
            .map(|r| FilteredRow {
                id: r.id(),
                values: columns
                    .iter()
                    .map(|c| r.get(c).cloned().unwrap_or(Value::Null))
                    .collect(),
            })
            .collect();

        tracing::debug!("Filters applied: {} records kept", rows.len());
        FilteredTable { columns, rows }
    }

    pub fn generate_summary(&self, table: &ProcessedTable, now: NaiveDateTime) -> Summary {
        generate_summary(table, now, self.environment)
    }
}

pub fn is_row_valid(id: i64) -> bool {
    id != INVALID_ROW_ID
}

/// Appends the processing timestamp, environment and validity flag to every row.
pub fn enrich(filtered: FilteredTable, now: NaiveDateTime, environment: Environment) -> ProcessedTable {
    let processing_timestamp = now.format(PROCESSING_TIMESTAMP_FORMAT).to_string();

    let mut columns = filtered.columns;
    columns.extend(
        [PROCESSING_TIMESTAMP_COLUMN, ENVIRONMENT_COLUMN, IS_VALID_COLUMN]
            .iter()
            .map(|c| c.to_string()),
    );

    let rows = filtered
        .rows
        .into_iter()
        .map(|row| {
            let is_valid = is_row_valid(row.id);
            if !is_valid {
                tracing::debug!("Record ID {} marked as invalid", row.id);
            }
            ProcessedRow {
                id: row.id,
                values: row.values,
                processing_timestamp: processing_timestamp.clone(),
                environment,
                is_valid,
            }
        })
        .collect();

    ProcessedTable { columns, rows }
}

pub fn generate_summary(table: &ProcessedTable, now: NaiveDateTime, environment: Environment) -> Summary {
    let valid_records = if table.has_column(IS_VALID_COLUMN) {
        table.rows.iter().filter(|r| r.is_valid).count()
    } else {
        0
    };

    let summary = Summary {
        total_records: table.len(),
        columns: table.columns.clone(),
        valid_records,
        generated_at: summary_timestamp(now),
        environment,
    };

    tracing::info!("Summary generated: {} records", summary.total_records);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(14, 0, 5, 123456)
            .unwrap()
    }

    fn user(id: i64) -> Value {
        json!({
            "id": id,
            "name": format!("User {}", id),
            "username": format!("user{}", id),
            "email": format!("user{}@example.com", id),
            "phone": "555-0100",
            "website": "example.com",
            "address": {"city": "Gwenborough"}
        })
    }

    fn processor() -> DataProcessor {
        let mut config = AppConfig::default();
        config.environment = Environment::Staging;
        DataProcessor::new(&config)
    }

    #[test]
    fn test_filter_keeps_ids_up_to_threshold() {
        let p = processor();
        let records = p
            .validator()
            .validate_batch((1..=10).map(user).collect());

        let filtered = p.apply_filters(&records);

        let ids: Vec<i64> = filtered.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            filtered.columns,
            vec!["id", "name", "username", "email", "phone", "website"]
        );
    }

    #[test]
    fn test_projection_tolerates_absent_required_field() {
        let mut config = AppConfig::default();
        config.processing.required_fields.push("nickname".to_string());
        let p = DataProcessor::new(&config);

        // Validated records built without the extra field.
        let records = DataProcessor::new(&AppConfig::default())
            .validator()
            .validate_batch(vec![user(1), user(2)]);

        let filtered = p.apply_filters(&records);
        assert!(!filtered.columns.iter().any(|c| c == "nickname"));
        assert_eq!(filtered.rows[0].values.len(), 6);
        assert_eq!(filtered.rows[1].values[1], json!("User 2"));
    }

    #[test]
    fn test_enrich_flags_only_id_seven() {
        let filtered = FilteredTable {
            columns: vec!["id".to_string()],
            rows: [6, 7, 8]
                .iter()
                .map(|&id| FilteredRow {
                    id,
                    values: vec![json!(id)],
                })
                .collect(),
        };

        let table = enrich(filtered, now(), Environment::Development);

        let flags: Vec<bool> = table.rows.iter().map(|r| r.is_valid).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(
            table.columns,
            vec!["id", "processing_timestamp", "environment", "is_valid"]
        );
        assert!(table
            .rows
            .iter()
            .all(|r| r.processing_timestamp == "2024-05-01 14:00:05"
                && r.environment == Environment::Development));
    }

    #[test]
    fn test_process_users_end_to_end_keeps_only_id_one() {
        let mut seven = user(7);
        seven["company"] = json!({"name": "X"});
        let payload = json!([user(1), seven, user(6)]);

        let table = processor().process_users(payload, now()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].id, 1);
        assert!(table.rows[0].is_valid);
        assert_eq!(table.rows[0].environment, Environment::Staging);
    }

    #[test]
    fn test_process_users_with_raised_threshold_flags_seven() {
        let mut config = AppConfig::default();
        config.processing.filter_threshold = 10;
        let p = DataProcessor::new(&config);

        let mut seven = user(7);
        seven["company"] = json!({"name": "X"});
        let table = p.process_users(json!([user(1), seven]), now()).unwrap();

        let summary = p.generate_summary(&table, now());
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.valid_records, 1);
    }

    #[test]
    fn test_process_users_rejects_bad_structure() {
        let p = processor();
        assert!(matches!(
            p.process_users(json!([]), now()),
            Err(EtlError::StructuralError { .. })
        ));
        assert!(matches!(
            p.process_users(json!({"users": []}), now()),
            Err(EtlError::StructuralError { .. })
        ));
    }

    #[test]
    fn test_process_users_fails_when_nothing_survives() {
        let p = processor();
        assert!(matches!(
            p.process_users(json!([{"id": 1}]), now()),
            Err(EtlError::ProcessingError { .. })
        ));
        assert!(matches!(
            p.process_users(json!([user(6), user(8)]), now()),
            Err(EtlError::ProcessingError { .. })
        ));
    }

    #[test]
    fn test_summary_counts() {
        let filtered = FilteredTable {
            columns: vec!["id".to_string()],
            rows: (5..=8)
                .map(|id| FilteredRow {
                    id,
                    values: vec![json!(id)],
                })
                .collect(),
        };
        let table = enrich(filtered, now(), Environment::Production);

        let summary = generate_summary(&table, now(), Environment::Production);

        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.valid_records, 3);
        assert_eq!(summary.columns, table.columns);
        assert_eq!(summary.generated_at, "2024-05-01T14:00:05.123456");
        assert_eq!(summary.environment, Environment::Production);
    }

    #[test]
    fn test_summary_timestamp_omits_zero_micros() {
        let whole_second = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        assert_eq!(summary_timestamp(whole_second), "2024-05-01T14:00:00");

        // Sub-microsecond precision is dropped, like the micro-resolution clock.
        let nanos_only = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_nano_opt(14, 0, 0, 999)
            .unwrap();
        assert_eq!(summary_timestamp(nanos_only), "2024-05-01T14:00:00");

        let one_micro = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(14, 0, 0, 1)
            .unwrap();
        assert_eq!(summary_timestamp(one_micro), "2024-05-01T14:00:00.000001");
        assert_eq!(summary_timestamp(now()), "2024-05-01T14:00:05.123456");
    }

    #[test]
    fn test_summary_of_empty_table() {
        let summary = generate_summary(&ProcessedTable::default(), now(), Environment::Staging);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.valid_records, 0);
        assert!(summary.columns.is_empty());

        let enriched_empty = enrich(FilteredTable::default(), now(), Environment::Staging);
        let summary = generate_summary(&enriched_empty, now(), Environment::Staging);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.valid_records, 0);
        assert_eq!(summary.columns.len(), 3);
    }
}
