#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::Environment;
use crate::utils::encoding::FileEncoding;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REQUIRED_FIELDS: [&str; 6] = ["id", "name", "username", "email", "phone", "website"];
pub const DEFAULT_OPTIONAL_FIELDS: [&str; 3] = ["company", "address", "geo_location"];

/// Application configuration. Built once at startup and handed to each component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub schedule: ScheduleConfig,
    pub api: ApiConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local time of day, `HH:MM`, at which the collector may run.
    pub run_at: String,
    /// Open the gate regardless of the clock. Ignored in production.
    pub bypass: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            run_at: "14:00".to_string(),
            bypass: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub users_endpoint: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com".to_string(),
            users_endpoint: "/users".to_string(),
            timeout_seconds: 10,
            user_agent: "DataCollector/2.0".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn users_url(&self) -> String {
        format!("{}{}", self.base_url, self.users_endpoint)
    }

    pub fn user_url(&self, user_id: i64) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub required_fields: Vec<String>,
    /// Informational; optional fields are never required nor projected.
    pub optional_fields: Vec<String>,
    pub min_records: usize,
    pub max_records: usize,
    /// Records with `id` above this value are filtered out.
    pub filter_threshold: i64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            optional_fields: DEFAULT_OPTIONAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            min_records: 1,
            max_records: 100,
            filter_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub table_filename: String,
    pub summary_filename: String,
    /// Falls back to latin-1 in production and utf-8 elsewhere.
    pub encoding: Option<FileEncoding>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            table_filename: "processed_users.csv".to_string(),
            summary_filename: "summary.json".to_string(),
            encoding: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references (e.g. `${API_KEY}`) with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Applies `APP_ENV` and `LOG_LEVEL` on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var("APP_ENV").ok().as_deref(),
            std::env::var("LOG_LEVEL").ok().as_deref(),
        )
    }

    pub(crate) fn apply_overrides(
        &mut self,
        app_env: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<()> {
        if let Some(env) = app_env {
            self.environment = env.parse()?;
        }
        if let Some(level) = log_level {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    pub fn file_encoding(&self) -> FileEncoding {
        self.output.encoding.unwrap_or(if self.environment.is_production() {
            FileEncoding::Latin1
        } else {
            FileEncoding::Utf8
        })
    }

    pub fn run_at(&self) -> Result<NaiveTime> {
        validation::validate_time_of_day("schedule.run_at", &self.schedule.run_at)
    }

    pub fn table_path(&self) -> PathBuf {
        Path::new(&self.output.directory).join(&self.output.table_filename)
    }

    pub fn summary_path(&self) -> PathBuf {
        Path::new(&self.output.directory).join(&self.output.summary_filename)
    }

    /// Checks that the configured values are usable.
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_url("api.users_url", &self.api.users_url())?;
        validation::validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("api.user_agent", &self.api.user_agent)?;

        self.run_at()?;

        validation::validate_positive_number("processing.min_records", self.processing.min_records, 1)?;
        validation::validate_positive_number(
            "processing.max_records",
            self.processing.max_records,
            self.processing.min_records,
        )?;

        if self.processing.required_fields.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "processing.required_fields".to_string(),
            });
        }
        for field in &self.processing.required_fields {
            validation::validate_non_empty_string("processing.required_fields", field)?;
        }
        if !self.processing.required_fields.iter().any(|f| f == "id") {
            return Err(EtlError::InvalidConfigValueError {
                field: "processing.required_fields".to_string(),
                value: self.processing.required_fields.join(","),
                reason: "The id field must be required".to_string(),
            });
        }

        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_path("output.table_filename", &self.output.table_filename)?;
        validation::validate_path("output.summary_filename", &self.output.summary_filename)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
