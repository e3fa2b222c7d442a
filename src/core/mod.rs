pub mod etl;
pub mod pipeline;
pub mod processor;
pub mod schedule;
pub mod validator;

pub use crate::domain::model::{
    RawRecord, ProcessedRow, ProcessedTable, Summary, TransformResult, ValidatedRecord,
};
pub use crate::domain::ports::{Clock, Fetcher, Pipeline, ReportWriter, Storage};
pub use crate::utils::error::Result;
