//! # gpuplan Shared Library
//!
//! Shared utilities and types for the gpuplan workspace.
//! This crate provides the error taxonomy and the command-line option groups
//! used by the planner and the unified CLI.
//!
//! ## Features
//!
//! - **Error Handling**: One error type with exit code mapping
//! - **CLI Plumbing**: Logging and output option groups for clap

pub mod cli;
pub mod error;

// Re-export commonly used types for convenience
pub use cli::{LoggingOptions, OutputFormat, OutputOptions};
pub use error::{GpuplanError, Result};
