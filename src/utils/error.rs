use thiserror::Error;

/// Reasons a single user record is rejected. These never leave the batch
/// validator; the record is logged and dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("required field '{field}' not found")]
    MissingField { field: String },

    #[error("lookup of '{path}' failed")]
    Lookup { path: String },

    #[error("record is not a JSON object")]
    NotAnObject,
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned a malformed body: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("API returned status {status}: {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot encode character {character:?} as {encoding}")]
    EncodingError { encoding: String, character: char },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid data structure: {message}")]
    StructuralError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Execution not allowed at {current}; scheduled for {allowed}")]
    ScheduleClosed { current: String, allowed: String },

    #[error("Execution interrupted")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structural,
    Record,
    Persistence,
    Transport,
    Configuration,
    Schedule,
    Interrupted,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_)
            | EtlError::InvalidResponse(_)
            | EtlError::HttpStatusError { .. } => ErrorCategory::Transport,
            EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::EncodingError { .. } => ErrorCategory::Persistence,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::StructuralError { .. } => ErrorCategory::Structural,
            EtlError::ProcessingError { .. } => ErrorCategory::Record,
            EtlError::ScheduleClosed { .. } => ErrorCategory::Schedule,
            EtlError::Interrupted => ErrorCategory::Interrupted,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check network connectivity and the api.base_url setting",
            ErrorCategory::Persistence => {
                "Check that the output directory is writable and the encoding fits the data"
            }
            ErrorCategory::Configuration => "Fix the configuration file or environment variables",
            ErrorCategory::Structural => "The API payload must be a non-empty JSON array",
            ErrorCategory::Record => "Inspect the warnings above for rejected records",
            ErrorCategory::Schedule => {
                "Run at the scheduled time, or pass --ignore-schedule outside production"
            }
            ErrorCategory::Interrupted => "Re-run the collector",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
