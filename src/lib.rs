//! # vsr: vSphere reconciliation CLI
//!
//! Invocation surface around the reconcilers: argv parsing, module argument
//! documents, connection settings, logging, and the JSON result envelope.
//!
//! ## Modules
//!
//! - **cli**: Subcommand and flag parsing
//! - **error**: Usage / parameter / configuration errors
//! - **params**: Argument documents and per-module parameter validation
//! - **config**: Connection settings (args, environment, profile file)
//! - **logging**: `tracing` subscriber setup
//! - **report**: JSON result envelope and exit codes
//! - **runner**: Connect, reconcile, report

pub mod cli;
pub mod error;
pub mod params;
pub mod config;
pub mod logging;
pub mod report;
pub mod runner;

pub use error::AppError;
pub use report::RunOutcome;
