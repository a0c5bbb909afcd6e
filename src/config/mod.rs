#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, WebConfig};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Fully resolved settings: command line over config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_path: String,
    pub data_path: String,
    pub delimiter: u8,
    pub format: OutputFormat,
    pub export_path: Option<String>,
    pub host: String,
    pub port: u16,
    pub verbose: bool,
    pub json_logs: bool,
}

/// Values a front end may supply on its command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model_path: Option<String>,
    pub data_path: Option<String>,
    pub delimiter: Option<char>,
    pub format: Option<OutputFormat>,
    pub export_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Settings {
    pub fn resolve(file: &TomlConfig, overrides: Overrides) -> Result<Self> {
        file.validate()?;

        let model_path = overrides
            .model_path
            .or_else(|| file.model_path().map(str::to_string));
        let data_path = overrides
            .data_path
            .or_else(|| file.data_path().map(str::to_string));
        let delimiter = match overrides.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => {
                return Err(crate::utils::error::PredictorError::InvalidConfigValueError {
                    field: "delimiter".to_string(),
                    value: c.to_string(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                })
            }
            None => file.delimiter().unwrap_or(b','),
        };

        let settings = Self {
            model_path: validation::validate_required_field("model.path", &model_path)?.clone(),
            data_path: validation::validate_required_field("data.path", &data_path)?.clone(),
            delimiter,
            format: overrides.format.or(file.format()).unwrap_or_default(),
            export_path: overrides
                .export_path
                .or_else(|| file.export_path().map(str::to_string)),
            host: overrides
                .host
                .or_else(|| file.host().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port()).unwrap_or(DEFAULT_PORT),
            verbose: overrides.verbose || file.verbose(),
            json_logs: overrides.json_logs || file.json_logs(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("model.path", &self.model_path)?;
        validation::validate_file_extension("model.path", &self.model_path, &["json"])?;
        validation::validate_path("data.path", &self.data_path)?;
        validation::validate_file_extension("data.path", &self.data_path, &["csv", "tsv", "txt"])?;
        if let Some(export_path) = &self.export_path {
            validation::validate_file_extension("output.export_path", export_path, &["zip"])?;
        }
        validation::validate_non_empty_string("server.host", &self.host)?;
        validation::validate_range("server.port", self.port, 1, u16::MAX)?;
        Ok(())
    }
}
