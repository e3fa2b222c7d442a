use crate::domain::model::{ProcessedTable, Summary};
use crate::domain::ports::{ReportWriter, Storage};
use crate::utils::encoding::FileEncoding;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Writes the processed table as CSV and the summary as JSON through a `Storage`.
pub struct FileReportWriter<S: Storage> {
    storage: S,
    encoding: FileEncoding,
}

impl<S: Storage> FileReportWriter<S> {
    pub fn new(storage: S, encoding: FileEncoding) -> Self {
        Self { storage, encoding }
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn table_to_csv(table: &ProcessedTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.cells().iter().map(cell_to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

#[async_trait]
impl<S: Storage> ReportWriter for FileReportWriter<S> {
    async fn write_table(&self, table: &ProcessedTable, path: &str) -> Result<String> {
        if table.is_empty() {
            tracing::error!("Refusing to write an empty table");
            return Err(EtlError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "table has no rows",
            )));
        }

        tracing::info!("💾 Saving data to: {}", path);
        let data = table_to_csv(table)?;
        let full_path = self.storage.write_file(path, &data).await?;

        tracing::info!("✅ File saved: {}", full_path);
        tracing::info!("  → Size: {} bytes", data.len());
        tracing::info!("  → Records: {}", table.len());
        Ok(full_path)
    }

    async fn write_summary(&self, summary: &Summary, path: &str) -> Result<String> {
        let json = serde_json::to_string_pretty(summary)?;
        let data = self.encoding.encode(&json)?;
        let full_path = self.storage.write_file(path, &data).await?;

        tracing::info!("Summary saved to: {} ({})", full_path, self.encoding);
        Ok(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::{Environment, ProcessedRow};
    use serde_json::json;
    use tempfile::TempDir;

    fn table() -> ProcessedTable {
        ProcessedTable {
            columns: vec![
                "id".to_string(),
                "name".to_string(),
                "processing_timestamp".to_string(),
                "environment".to_string(),
                "is_valid".to_string(),
            ],
            rows: vec![ProcessedRow {
                id: 1,
                values: vec![json!(1), json!("Graham, Leanne")],
                processing_timestamp: "2024-05-01 14:00:00".to_string(),
                environment: Environment::Production,
                is_valid: true,
            }],
        }
    }

    fn summary(environment: Environment) -> Summary {
        Summary {
            total_records: 1,
            columns: vec!["id".to_string()],
            valid_records: 1,
            generated_at: "2024-05-01T14:00:00".to_string(),
            environment,
        }
    }

    #[test]
    fn test_table_to_csv_quotes_and_flattens_cells() {
        let csv = String::from_utf8(table_to_csv(&table()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "id,name,processing_timestamp,environment,is_valid");
        assert_eq!(
            lines[1],
            "1,\"Graham, Leanne\",2024-05-01 14:00:00,production,true"
        );
    }

    #[tokio::test]
    async fn test_write_table_and_summary() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = FileReportWriter::new(storage, FileEncoding::Utf8);

        let table_path = writer.write_table(&table(), "users.csv").await.unwrap();
        let summary_path = writer
            .write_summary(&summary(Environment::Staging), "summary.json")
            .await
            .unwrap();

        assert!(std::path::Path::new(&table_path).exists());
        let written: Value =
            serde_json::from_slice(&std::fs::read(&summary_path).unwrap()).unwrap();
        assert_eq!(written["ambiente"], "staging");
        assert_eq!(written["total_registros"], 1);
    }

    #[tokio::test]
    async fn test_empty_table_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = FileReportWriter::new(storage, FileEncoding::Utf8);

        assert!(writer
            .write_table(&ProcessedTable::default(), "users.csv")
            .await
            .is_err());
        assert!(!temp_dir.path().join("users.csv").exists());
    }

    #[tokio::test]
    async fn test_latin1_summary_fails_on_unencodable_text() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = FileReportWriter::new(storage, FileEncoding::Latin1);

        let mut s = summary(Environment::Production);
        s.columns.push("名前".to_string());

        let err = writer.write_summary(&s, "summary.json").await.unwrap_err();
        assert!(matches!(err, EtlError::EncodingError { .. }));
    }
}
