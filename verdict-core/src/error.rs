use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("External service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rendering failed: {message}")]
    Render { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return CoreError::Data(DataError::Csv(err));
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io) => CoreError::Io(io),
            other => CoreError::Internal {
                message: format!("{:?}", other),
            },
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("{service} authentication failed: {reason}")]
    AuthenticationFailed { service: String, reason: String },

    #[error("{service} rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { service: String, retry_after: u64 },

    #[error("Forbidden access to {service} resource: {resource}")]
    Forbidden { service: String, resource: String },

    #[error("{service} resource not found: {resource}")]
    NotFound { service: String, resource: String },

    #[error("{service} request timeout")]
    RequestTimeout { service: String },

    #[error("Invalid {service} response: {details}")]
    InvalidResponse { service: String, details: String },

    #[error("{service} server error: {status_code}")]
    ServerError { service: String, status_code: u16 },

    #[error("Unexpected {service} status: {status_code}")]
    UnexpectedStatus { service: String, status_code: u16 },
}

impl ServiceError {
    pub fn service(&self) -> &str {
        match self {
            ServiceError::AuthenticationFailed { service, .. }
            | ServiceError::RateLimitExceeded { service, .. }
            | ServiceError::Forbidden { service, .. }
            | ServiceError::NotFound { service, .. }
            | ServiceError::RequestTimeout { service }
            | ServiceError::InvalidResponse { service, .. }
            | ServiceError::ServerError { service, .. }
            | ServiceError::UnexpectedStatus { service, .. } => service,
        }
    }
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Tabular source not found: {path}")]
    SourceMissing { path: String },

    #[error("Required column '{column}' missing from {path}")]
    MissingColumn { column: String, path: String },

    #[error("No usable rows in {path}")]
    EmptyDataset { path: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{component} used before fit")]
    NotFitted { component: String },

    #[error("Cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("Feature and label counts differ: {features} features, {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("Vocabulary is empty after normalization")]
    EmptyVocabulary,

    #[error("Text preprocessing failed: {reason}")]
    Preprocessing { reason: String },

    #[error("Classifier training failed: {reason}")]
    TrainingFailed { reason: String },

    #[error("Prediction failed: {reason}")]
    PredictionFailed { reason: String },

    #[error("Model encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Training split has {samples} samples, fewer than the {folds} folds requested")]
    InsufficientSamples { samples: usize, folds: usize },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
