use crate::utils::error::{EtlError, RecordError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const PROCESSING_TIMESTAMP_COLUMN: &str = "processing_timestamp";
pub const ENVIRONMENT_COLUMN: &str = "environment";
pub const IS_VALID_COLUMN: &str = "is_valid";

/// Deployment environment the collector runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(EtlError::InvalidConfigValueError {
                field: "environment".to_string(),
                value: other.to_string(),
                reason: "Expected one of: development, staging, production".to_string(),
            }),
        }
    }
}

/// One user object exactly as the API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: Map<String, Value>,
}

impl RawRecord {
    pub fn from_value(value: Value) -> std::result::Result<Self, RecordError> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            _ => Err(RecordError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// The `id` field, when it holds a JSON integer that fits in an `i64`.
    pub fn integer_id(&self) -> Option<i64> {
        self.data.get("id").and_then(Value::as_i64)
    }

    /// Best-effort id for log lines.
    pub fn id_for_log(&self) -> String {
        self.data
            .get("id")
            .map(Value::to_string)
            .unwrap_or_else(|| "None".to_string())
    }
}

/// A record that carries every required field and an integer id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    id: i64,
    record: RawRecord,
}

impl ValidatedRecord {
    pub(crate) fn new(id: i64, record: RawRecord) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.record.contains(key)
    }

    pub fn raw(&self) -> &RawRecord {
        &self.record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    pub id: i64,
    /// Aligned with `FilteredTable::columns`; `Null` where the record lacked a column.
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    pub columns: Vec<String>,
    pub rows: Vec<FilteredRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub id: i64,
    pub values: Vec<Value>,
    pub processing_timestamp: String,
    pub environment: Environment,
    pub is_valid: bool,
}

impl ProcessedRow {
    /// Every cell of the row, enrichment columns last.
    pub fn cells(&self) -> Vec<Value> {
        let mut cells = self.values.clone();
        cells.push(Value::String(self.processing_timestamp.clone()));
        cells.push(Value::String(self.environment.to_string()));
        cells.push(Value::Bool(self.is_valid));
        cells
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedTable {
    /// Full header, including the enrichment columns once they are appended.
    pub columns: Vec<String>,
    pub rows: Vec<ProcessedRow>,
}

impl ProcessedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Batch statistics written next to the table. Field names on the wire match
/// the `summary.json` files produced by earlier collector releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "colunas")]
    pub columns: Vec<String>,
    #[serde(rename = "registros_validos")]
    pub valid_records: usize,
    #[serde(rename = "data_processamento")]
    pub generated_at: String,
    #[serde(rename = "ambiente")]
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub table: ProcessedTable,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub table_path: String,
    /// `None` when the summary could not be written.
    pub summary_path: Option<String>,
}
