//! Configuration, errors and domain types for the order service.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel, LoggingConfig, ServerConfig, TelemetryConfig};
pub use error::{Result, ServiceError};
pub use types::{CheckoutResponse, CheckoutResult, CheckoutStatus, OrderIdentity, Scenario};
