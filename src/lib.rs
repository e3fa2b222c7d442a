pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{
    clock::{FixedClock, SystemClock},
    http::ApiClient,
    storage::LocalStorage,
    writer::FileReportWriter,
};
pub use config::AppConfig;
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::UserPipeline,
    processor::DataProcessor,
    schedule::ScheduleGate,
    validator::DataValidator,
};
pub use domain::model::Environment;
pub use utils::error::{EtlError, Result};
