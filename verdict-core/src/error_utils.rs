use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Service(e) => {
                error!("External service error details: {:?}", e);
            }
            CoreError::Data(e) => {
                error!("Data error details: {:?}", e);
            }
            CoreError::Model(e) => {
                error!("Model error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Service(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            CoreError::Timeout { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Service(e) => e.retry_after(),
            CoreError::Timeout { seconds } => Some(Duration::from_secs(*seconds)),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Service(e) => e.user_friendly_message(),
            CoreError::Data(e) => e.user_friendly_message(),
            CoreError::Model(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("File operation failed: {}", e),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Render { message } => format!("Could not render image: {}", message),
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::Timeout { .. } => {
                "The operation took too long to complete. Please try again.".to_string()
            }
            _ => "An unexpected error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Service(_) => "EXTERNAL_SERVICE".to_string(),
            CoreError::Data(_) => "DATA".to_string(),
            CoreError::Model(_) => "MODEL".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Render { .. } => "RENDER".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for ServiceError {
    fn log_error(&self) -> &Self {
        error!("ServiceError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ServiceError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            ServiceError::RateLimitExceeded { .. } => true,
            ServiceError::RequestTimeout { .. } => true,
            ServiceError::ServerError { status_code, .. } => *status_code >= 500,
            ServiceError::InvalidResponse { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ServiceError::RateLimitExceeded { retry_after, .. } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ServiceError::AuthenticationFailed { service, .. } => format!(
                "{} authentication failed. Please check your credentials.",
                service
            ),
            ServiceError::RateLimitExceeded { retry_after, .. } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            ServiceError::Forbidden { resource, .. } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            ServiceError::NotFound { resource, .. } => {
                format!("'{}' not found or is private.", resource)
            }
            ServiceError::RequestTimeout { service } => {
                format!("Request to {} timed out. Please try again.", service)
            }
            _ => format!(
                "{} returned an error. Please try again later.",
                self.service()
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ServiceError::AuthenticationFailed { .. } => "SERVICE_AUTH_FAILED".to_string(),
            ServiceError::RateLimitExceeded { .. } => "SERVICE_RATE_LIMIT".to_string(),
            ServiceError::Forbidden { .. } => "SERVICE_FORBIDDEN".to_string(),
            ServiceError::NotFound { .. } => "SERVICE_NOT_FOUND".to_string(),
            ServiceError::RequestTimeout { .. } => "SERVICE_TIMEOUT".to_string(),
            ServiceError::InvalidResponse { .. } => "SERVICE_INVALID_RESPONSE".to_string(),
            ServiceError::ServerError { .. } => "SERVICE_SERVER_ERROR".to_string(),
            ServiceError::UnexpectedStatus { .. } => "SERVICE_UNEXPECTED_STATUS".to_string(),
        }
    }
}

impl ErrorExt for DataError {
    fn log_error(&self) -> &Self {
        error!("DataError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("DataError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DataError::SourceMissing { path } => {
                format!("Dataset '{}' does not exist. Run the scraper first.", path)
            }
            DataError::MissingColumn { column, .. } => {
                format!("Dataset is missing the '{}' column.", column)
            }
            DataError::EmptyDataset { path } => {
                format!("Dataset '{}' has no usable rows after filtering.", path)
            }
            _ => "Dataset could not be read. Please check the file format.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            DataError::SourceMissing { .. } => "DATA_SOURCE_MISSING".to_string(),
            DataError::MissingColumn { .. } => "DATA_MISSING_COLUMN".to_string(),
            DataError::EmptyDataset { .. } => "DATA_EMPTY".to_string(),
            DataError::Csv(_) => "DATA_CSV_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ModelError {
    fn log_error(&self) -> &Self {
        error!("ModelError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ModelError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ModelError::EmptyTrainingSet => {
                "No training examples left after filtering.".to_string()
            }
            ModelError::EncodingFailed { .. } => "Failed to save the trained model.".to_string(),
            ModelError::EmptyVocabulary => {
                "No words were left in the posts after removing stop words.".to_string()
            }
            _ => "Model error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ModelError::NotFitted { .. } => "MODEL_NOT_FITTED".to_string(),
            ModelError::EmptyTrainingSet => "MODEL_EMPTY_TRAINING_SET".to_string(),
            ModelError::LengthMismatch { .. } => "MODEL_LENGTH_MISMATCH".to_string(),
            ModelError::EmptyVocabulary => "MODEL_EMPTY_VOCABULARY".to_string(),
            ModelError::Preprocessing { .. } => "MODEL_PREPROCESSING_FAILED".to_string(),
            ModelError::TrainingFailed { .. } => "MODEL_TRAINING_FAILED".to_string(),
            ModelError::PredictionFailed { .. } => "MODEL_PREDICTION_FAILED".to_string(),
            ModelError::EncodingFailed { .. } => "MODEL_ENCODING_FAILED".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false // Config errors are typically not retryable
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::InsufficientSamples { samples, folds } => format!(
                "Only {} training samples for {}-fold cross-validation. Collect more data or lower the fold count.",
                samples, folds
            ),
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::InsufficientSamples { .. } => "CONFIG_INSUFFICIENT_SAMPLES".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
            if error.is_retryable() {
                if let Some(retry_after) = error.retry_after() {
                    info!("Error is retryable. Retry after: {:?}", retry_after);
                }
            }
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
