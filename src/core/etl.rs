use crate::core::schedule::ScheduleGate;
use crate::domain::ports::{Clock, Pipeline};
use crate::utils::error::{EtlError, Result};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub records_written: usize,
    pub valid_records: usize,
    pub table_path: String,
    /// `None` when the summary could not be saved.
    pub summary_path: Option<String>,
}

pub struct EtlEngine<P: Pipeline, C: Clock> {
    pipeline: P,
    gate: ScheduleGate,
    clock: C,
}

impl<P: Pipeline, C: Clock> EtlEngine<P, C> {
    pub fn new(pipeline: P, gate: ScheduleGate, clock: C) -> Self {
        Self {
            pipeline,
            gate,
            clock,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("STEP 1: Checking execution time...");
        let now = self.clock.now();
        if !self.gate.can_run(now) {
            tracing::warn!("The collector only runs at {}", self.gate.allowed_time());
            tracing::info!("Use --ignore-schedule outside production to skip this check");
            self.gate.time_until_next_run(now);
            return Err(EtlError::ScheduleClosed {
                current: now.format("%H:%M").to_string(),
                allowed: self.gate.allowed_time(),
            });
        }

        tracing::info!("STEP 2: Collecting data from the API...");
        let payload = self.pipeline.extract().await.map_err(|e| {
            tracing::error!("❌ Failed to collect data from the API");
            e
        })?;

        tracing::info!("STEP 3: Processing and validating data...");
        let result = self.pipeline.transform(payload).await.map_err(|e| {
            tracing::error!("❌ Data processing failed");
            e
        })?;
        let records_written = result.table.len();
        let valid_records = result.summary.valid_records;

        tracing::info!("STEP 4: Saving files...");
        let loaded = self.pipeline.load(result).await.map_err(|e| {
            tracing::error!("❌ Failed to save the table");
            e
        })?;

        tracing::info!("✅ Processing finished successfully");
        tracing::info!("Total records processed: {}", records_written);
        tracing::info!("File generated: {}", loaded.table_path);

        Ok(RunReport {
            records_written,
            valid_records,
            table_path: loaded.table_path,
            summary_path: loaded.summary_path,
        })
    }
}
