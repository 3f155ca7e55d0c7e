use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for order service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new telemetry error
    pub fn telemetry<S: Into<String>>(msg: S) -> Self {
        Self::Telemetry(msg.into())
    }

    /// Creates a new logging error
    pub fn logging<S: Into<String>>(msg: S) -> Self {
        Self::Logging(msg.into())
    }

    /// Creates a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Self::Server(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Yaml(_) => "config",
            Self::Telemetry(_) => "telemetry",
            Self::Logging(_) => "logging",
            Self::Server(_) => "server",
            Self::Io(_) => "io",
        }
    }
}

impl From<opentelemetry::trace::TraceError> for ServiceError {
    fn from(err: opentelemetry::trace::TraceError) -> Self {
        Self::Telemetry(err.to_string())
    }
}
