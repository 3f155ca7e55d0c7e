//! Order service - synthetic traces for tail-sampling demos.
//!
//! A tiny checkout service whose only job is to produce traces with
//! realistic variance, so a tail-sampling collector has something to decide
//! on. Each `/checkout` call randomly lands in one of three scenarios:
//!
//! - **normal**: fast and successful
//! - **high latency**: successful but slower than 1.5 seconds
//! - **error**: HTTP 500 with an error span tagged `issue_detected="true"`
//!
//! # Architecture
//!
//! - `core`: configuration, errors and per-request domain types
//! - `simulator`: scenario selection, span annotation and induced latency
//! - `telemetry`: owned OpenTelemetry pipeline and span handles
//! - `server`: axum router and per-request server spans
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use order_service::core::Config;
//! use order_service::server::{self, AppState};
//! use order_service::simulator::Simulator;
//! use order_service::telemetry::Telemetry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new()?;
//!     let telemetry = Telemetry::init(&config.telemetry)?;
//!     let state = AppState::new(telemetry.clone(), Simulator::from_entropy());
//!     server::serve(&config, state).await?;
//!     telemetry.shutdown()?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod server;
pub mod simulator;
pub mod telemetry;

// Re-export core types for convenience
pub use crate::core::{Config, Result};
