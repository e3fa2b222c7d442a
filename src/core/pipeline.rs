use crate::config::AppConfig;
use crate::core::processor::DataProcessor;
use crate::domain::model::{LoadResult, TransformResult};
use crate::domain::ports::{Clock, Fetcher, Pipeline, ReportWriter};
use crate::utils::error::Result;
use serde_json::Value;

/// Fetch, validate/filter/enrich, and persist the user list.
pub struct UserPipeline<F: Fetcher, W: ReportWriter, C: Clock> {
    fetcher: F,
    writer: W,
    clock: C,
    processor: DataProcessor,
    table_file: String,
    summary_file: String,
}

impl<F: Fetcher, W: ReportWriter, C: Clock> UserPipeline<F, W, C> {
    pub fn new(fetcher: F, writer: W, clock: C, config: &AppConfig) -> Self {
        Self {
            fetcher,
            writer,
            clock,
            processor: DataProcessor::new(config),
            table_file: config.output.table_filename.clone(),
            summary_file: config.output.summary_filename.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, W: ReportWriter, C: Clock> Pipeline for UserPipeline<F, W, C> {
    async fn extract(&self) -> Result<Value> {
        self.fetcher.fetch_users().await
    }

    async fn transform(&self, payload: Value) -> Result<TransformResult> {
        let table = self.processor.process_users(payload, self.clock.now())?;

        tracing::info!("Generating summary...");
        let summary = self.processor.generate_summary(&table, self.clock.now());

        Ok(TransformResult { table, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadResult> {
        let table_path = self.writer.write_table(&result.table, &self.table_file).await?;

        let summary_path = match self
            .writer
            .write_summary(&result.summary, &self.summary_file)
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("⚠️ Failed to save summary (non-critical): {}", e);
                None
            }
        };

        Ok(LoadResult {
            table_path,
            summary_path,
        })
    }
}
