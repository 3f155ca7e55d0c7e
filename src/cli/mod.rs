//! Command-line interface for the order service.
//!
//! Every option can also be supplied through the environment, which is how
//! the service is configured when it runs next to a collector in a
//! container.

use crate::core::{Config, ConfigBuilder, Result, ServiceError};
use crate::server::{self, AppState};
use crate::simulator::Simulator;
use crate::telemetry::Telemetry;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Demo checkout service that produces traces for tail-sampling pipelines.
#[derive(Parser, Debug)]
#[command(name = "order-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// HTTP port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "ORDER_SERVICE_BIND")]
    pub bind: Option<IpAddr>,

    /// Configuration file path (YAML)
    #[arg(short, long, env = "ORDER_SERVICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Explicit service name reported to the collector
    #[arg(long, env = "OTEL_SERVICE_NAME")]
    pub service_name: Option<String>,

    /// Collector configuration under test, used to derive the service name
    #[arg(long, env = "CONFIG_TYPE")]
    pub config_type: Option<String>,

    /// Deployment environment reported on every span
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// OTLP/gRPC collector endpoint
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Create spans but do not export them
    #[arg(long, env = "ORDER_SERVICE_NO_EXPORT")]
    pub no_export: bool,

    /// Enable debug logging
    #[arg(short, long, env = "ORDER_SERVICE_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and environment variables (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        if let Some(path) = &self.config {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                ServiceError::config(format!("Failed to read config file {:?}: {}", path, e))
            })?;
            builder = builder.from_yaml(&content)?;
        }

        self.apply_overrides(builder).build()
    }

    fn apply_overrides(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(bind) = self.bind {
            builder = builder.bind_address(bind);
        }
        if let Some(name) = &self.service_name {
            builder = builder.service_name(name.clone());
        }
        if let Some(config_type) = &self.config_type {
            builder = builder.config_type(config_type.clone());
        }
        if let Some(environment) = &self.environment {
            builder = builder.environment(environment.clone());
        }
        if let Some(endpoint) = &self.otlp_endpoint {
            builder = builder.otlp_endpoint(endpoint.clone());
        }
        if self.no_export {
            builder = builder.export_enabled(false);
        }
        if self.debug {
            builder = builder.debug(true);
        }
        builder
    }
}

/// Initialize logging based on configuration.
pub fn init_logging(config: &Config) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    let fmt_layer = if config.logging.structured {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .compact()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ServiceError::logging(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Execute the order service.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Listen address: {}", config.listen_addr());
        println!("  Service name: {}", config.telemetry.service_name());
        println!("  Environment: {}", config.telemetry.environment);
        if config.telemetry.export_enabled {
            println!("  OTLP endpoint: {}", config.telemetry.otlp_endpoint);
        } else {
            println!("  OTLP export: disabled");
        }
        return Ok(());
    }

    init_logging(&config)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded configuration from: {:?}", path);
    }

    let telemetry = Telemetry::init(&config.telemetry)?;
    let state = AppState::new(telemetry.clone(), Simulator::from_entropy());

    let result = server::serve(&config, state).await;

    tracing::info!("Flushing pending spans");
    if let Err(e) = telemetry.shutdown() {
        tracing::warn!(category = e.category(), "Trace pipeline shutdown failed: {}", e);
    }

    result
}
