use thiserror::Error;

/// Failures raised by a classifier or by loading one.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Model file is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    #[error("Model returned {got} labels for {expected} rows")]
    LabelCount { expected: usize, got: usize },

    #[error("Model returned unknown position group label {0}")]
    UnknownLabel(i64),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Schema error: required field {field} is missing from the input")]
    SchemaError { field: String },

    #[error("Schema error: field {field} has invalid value '{value}': {reason}")]
    InvalidFieldError {
        field: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Not found: {what}")]
    NotFoundError { what: String },

    #[error("Invalid request: {message}")]
    InvalidRequestError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PredictorError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PredictorError::NotFoundError { .. } | PredictorError::InvalidRequestError { .. } => {
                ErrorSeverity::Low
            }
            PredictorError::ConfigError { .. }
            | PredictorError::MissingConfigError { .. }
            | PredictorError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
            PredictorError::SchemaError { .. }
            | PredictorError::InvalidFieldError { .. }
            | PredictorError::CsvError(_)
            | PredictorError::SerializationError(_) => ErrorSeverity::High,
            PredictorError::Model(_) | PredictorError::IoError(_) | PredictorError::ZipError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictorError::SchemaError { .. }
                | PredictorError::InvalidFieldError { .. }
                | PredictorError::NotFoundError { .. }
                | PredictorError::InvalidRequestError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PredictorError::SchemaError { field } => {
                format!("The input data has no '{}' column", field)
            }
            PredictorError::InvalidFieldError { field, value, .. } => {
                format!("Column '{}' contains an unreadable value '{}'", field, value)
            }
            PredictorError::Model(e) => format!("The prediction model failed: {}", e),
            PredictorError::NotFoundError { what } => format!("Nothing found for {}", what),
            PredictorError::InvalidRequestError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PredictorError::SchemaError { .. } => {
                "Check the CSV header: Race, Driver, Constructor, Circuit, Grid, Laps, Rank, Year, Date, Position_Order"
            }
            PredictorError::InvalidFieldError { .. } => {
                "Numeric columns must hold integers and Date must be YYYY-MM-DD"
            }
            PredictorError::Model(_) => "Re-export the model artifact and check its feature list",
            PredictorError::CsvError(_) => "Check the data file delimiter and quoting",
            PredictorError::IoError(_) => "Check that the file paths exist and are readable",
            PredictorError::ConfigError { .. }
            | PredictorError::MissingConfigError { .. }
            | PredictorError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            PredictorError::NotFoundError { .. } => "Pick a race or driver present in the data",
            PredictorError::InvalidRequestError { .. } => {
                "Choose a driver or switch the prediction type to all drivers"
            }
            PredictorError::SerializationError(_) | PredictorError::ZipError(_) => {
                "Check the output path and free disk space"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
