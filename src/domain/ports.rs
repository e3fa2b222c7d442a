use crate::domain::model::{LoadResult, ProcessedTable, Summary, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Source of the raw user payload.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The decoded JSON body. Any transport, status or decoding problem is an error.
    async fn fetch_users(&self) -> Result<Value>;
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write_table(&self, table: &ProcessedTable, path: &str) -> Result<String>;
    async fn write_summary(&self, summary: &Summary, path: &str) -> Result<String>;
}

/// Local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Value>;
    async fn transform(&self, payload: Value) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadResult>;
}
