//! Configuration management for the order service.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable overrides (through the CLI layer)
//! - Validation and defaults

use crate::core::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Complete configuration for the order service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Trace pipeline configuration
    pub telemetry: TelemetryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub bind_address: IpAddr,
    /// HTTP port
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

/// Trace pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Explicit service name; wins over the derived `order-service-{config_type}`
    pub service_name: Option<String>,
    /// Collector configuration under test, folded into the derived service name
    pub config_type: String,
    /// Reported as `service.version`
    pub service_version: String,
    /// Reported as `deployment.environment`
    pub environment: String,
    /// OTLP/gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Export spans to the collector; when off spans are still created but dropped
    pub export_enabled: bool,
    /// Exporter request timeout
    #[serde(with = "humantime_serde")]
    pub export_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include targets, thread ids and line numbers
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            service_name: None,
            config_type: "unknown".to_string(),
            service_version: "1.0.0".to_string(),
            environment: "tail-sampling-demo".to_string(),
            otlp_endpoint: "http://otel-collector:4317".to_string(),
            export_enabled: true,
            export_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ServiceError::config("port must be greater than 0"));
        }

        if self.server.shutdown_grace.is_zero() {
            return Err(ServiceError::config("shutdown_grace must be greater than 0"));
        }

        if self.telemetry.service_name().trim().is_empty() {
            return Err(ServiceError::config("service name must not be empty"));
        }

        if self.telemetry.export_enabled {
            let endpoint = &self.telemetry.otlp_endpoint;
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ServiceError::config(format!(
                    "otlp_endpoint must be an http(s) URL, got '{}'",
                    endpoint
                )));
            }
        }

        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind_address, self.server.port)
    }
}

impl TelemetryConfig {
    /// Effective `service.name` resource attribute
    pub fn service_name(&self) -> String {
        match &self.service_name {
            Some(name) => name.clone(),
            None => format!("order-service-{}", self.config_type),
        }
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)?;
        Ok(self)
    }

    /// Set bind address
    pub fn bind_address(mut self, addr: IpAddr) -> Self {
        self.config.server.bind_address = addr;
        self
    }

    /// Set HTTP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set explicit service name
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.telemetry.service_name = Some(name.into());
        self
    }

    /// Set collector configuration type
    pub fn config_type(mut self, config_type: impl Into<String>) -> Self {
        self.config.telemetry.config_type = config_type.into();
        self
    }

    /// Set deployment environment
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.telemetry.environment = environment.into();
        self
    }

    /// Set OTLP endpoint
    pub fn otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.telemetry.otlp_endpoint = endpoint.into();
        self
    }

    /// Enable or disable span export
    pub fn export_enabled(mut self, enabled: bool) -> Self {
        self.config.telemetry.export_enabled = enabled;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        if debug {
            self.config.logging.level = LogLevel::Debug;
        }
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
