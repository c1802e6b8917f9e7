//! # gpuplan CLI
//!
//! Unified command-line interface for the gpuplan capacity planner.
//! Provides subcommands for fleet planning, fixed-fleet estimation and
//! catalog listing.
//!
//! ## Usage
//!
//! ```bash
//! # Smallest fleet serving Llama-3-70B at 500 tokens/s within 10 s
//! gpuplan plan -m Llama-3-70B -t 500 -l 10
//!
//! # Same target in FP8 with a custom GPU list, as JSON
//! gpuplan plan -m Llama-3-70B -t 500 -l 10 -w fp8 --gpu-file data/gpu_specs.tsv --format json
//!
//! # Memory and latency of every model on 4 GPUs
//! gpuplan estimate -g 4 -c 16
//!
//! # List the built-in GPUs
//! gpuplan catalog gpus
//! ```

pub mod cli_options;

pub use cli_options::{Cli, Commands};
