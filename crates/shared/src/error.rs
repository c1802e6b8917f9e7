//! # Shared Error Handling Module
//!
//! Error handling for the gpuplan workspace with error classification,
//! context preservation, and exit code mapping for the command-line surface.
//!
//! ## Error Categories
//!
//! - **Lookup Errors**: A requested model is missing from the catalog
//! - **Capability Errors**: A GPU cannot run the requested precision
//! - **Input Errors**: Invalid performance targets or catalog records
//! - **Loading Errors**: Catalog files that cannot be read or parsed
//! - **Configuration Errors**: Invalid planner configuration or environment
//!
//! Numeric sentinels produced by the performance model (out-of-range values,
//! results that cannot be computed) are not errors. They travel as tagged
//! metric values so that a single degenerate configuration never aborts a
//! whole planning run.

use thiserror::Error;
use tracing::warn;

/// Result type alias for gpuplan operations
///
/// This is the standard Result type used throughout the gpuplan codebase.
pub type Result<T> = std::result::Result<T, GpuplanError>;

/// Error types for gpuplan operations
///
/// Each variant carries enough context to print an actionable message to the
/// operator without consulting logs.
///
/// ## Design Principles
///
/// - Error messages are human-readable and actionable
/// - Context is preserved through the error chain
/// - Every variant maps to a stable process exit code
#[derive(Error, Debug)]
pub enum GpuplanError {
    /// Requested model is absent from the catalog
    ///
    /// Fatal for the invocation that asked for it, never for the process.
    /// The list of known names is carried so the caller can offer it.
    ///
    /// **Exit Code**: 2
    #[error("Model '{name}' not found in catalog (available: {})", .available.join(", "))]
    ModelNotFound {
        /// Name that was requested
        name: String,
        /// Names present in the catalog, in catalog order
        available: Vec<String>,
    },

    /// GPU has no compute throughput entry for the requested precision
    ///
    /// The recommender drops such GPUs from its candidate set silently. The
    /// error only surfaces when a single GPU is planned directly.
    ///
    /// **Exit Code**: 69
    #[error("GPU '{gpu}' does not support {precision} compute")]
    UnsupportedPrecision {
        /// GPU name from the catalog
        gpu: String,
        /// Precision identifier that was requested
        precision: String,
    },

    /// Performance target failed validation
    ///
    /// **Exit Code**: 64
    #[error("Invalid performance target: {reason}")]
    InvalidTarget {
        /// Which constraint was violated
        reason: String,
    },

    /// Catalog record failed validation
    ///
    /// Raised for duplicate names and physically meaningless attributes such
    /// as zero memory or zero layers.
    ///
    /// **Exit Code**: 65
    #[error("Invalid {entity} spec: {reason}")]
    InvalidSpec {
        /// Record kind and name, e.g. `gpu 'H100 PCIe'`
        entity: String,
        /// Which constraint was violated
        reason: String,
    },

    /// Catalog file could not be read or parsed
    ///
    /// **Exit Code**: 66
    #[error("Failed to load catalog from {path}{}: {message}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    CatalogLoad {
        /// Path of the offending file
        path: String,
        /// 1-based line number when the failure is tied to a record
        line: Option<usize>,
        /// Descriptive error message
        message: String,
        /// Underlying I/O or parse error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Planner configuration errors
    ///
    /// These errors occur at startup when command-line options or
    /// `GPUPLAN_*` environment variables hold invalid values.
    ///
    /// **Exit Code**: 78
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// Optional source error for additional context
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal errors
    ///
    /// Unexpected failures that indicate a bug, such as a serializer
    /// rejecting a value the planner produced.
    ///
    /// **Exit Code**: 70
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal failure
        message: String,
        /// Source error for debugging
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GpuplanError {
    /// Creates a model lookup error
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gpuplan_shared::error::GpuplanError;
    ///
    /// let error = GpuplanError::model_not_found("Llama-4", vec!["Llama-3-8B".to_string()]);
    /// assert!(error.to_string().contains("Llama-3-8B"));
    /// ```
    pub fn model_not_found(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::ModelNotFound {
            name: name.into(),
            available,
        }
    }

    /// Creates an unsupported precision error
    pub fn unsupported_precision(gpu: impl Into<String>, precision: impl Into<String>) -> Self {
        Self::UnsupportedPrecision {
            gpu: gpu.into(),
            precision: precision.into(),
        }
    }

    /// Creates a target validation error
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    /// Creates a catalog record validation error
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gpuplan_shared::error::GpuplanError;
    ///
    /// let error = GpuplanError::invalid_spec("gpu 'A10'", "memory_gb must be positive");
    /// ```
    pub fn invalid_spec(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Creates a catalog loading error
    ///
    /// # Arguments
    ///
    /// * `path` - File that failed to load
    /// * `line` - Optional 1-based line of the offending record
    /// * `message` - Error description
    /// * `source` - Optional underlying I/O or parse error
    pub fn catalog_load(
        path: impl Into<String>,
        line: Option<usize>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::CatalogLoad {
            path: path.into(),
            line,
            message: message.into(),
            source,
        }
    }

    /// Creates a configuration error with context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gpuplan_shared::error::GpuplanError;
    ///
    /// let error = GpuplanError::configuration("fleet_ceiling must be at least 1", None);
    /// ```
    pub fn configuration(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source,
        }
    }

    /// Creates an internal error with source context
    pub fn internal(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    /// Maps this error to a process exit code
    ///
    /// Codes follow the BSD `sysexits.h` conventions where one fits, so shell
    /// scripts wrapping the CLI can branch on the failure class.
    ///
    /// # Exit Code Mapping
    ///
    /// - Model not found: 2
    /// - Invalid target: 64 (`EX_USAGE`)
    /// - Invalid spec: 65 (`EX_DATAERR`)
    /// - Catalog load: 66 (`EX_NOINPUT`)
    /// - Unsupported precision: 69 (`EX_UNAVAILABLE`)
    /// - Internal: 70 (`EX_SOFTWARE`)
    /// - Configuration: 78 (`EX_CONFIG`)
    pub fn exit_code(&self) -> i32 {
        match self {
            GpuplanError::ModelNotFound { .. } => 2,
            GpuplanError::InvalidTarget { .. } => 64,
            GpuplanError::InvalidSpec { .. } => 65,
            GpuplanError::CatalogLoad { .. } => 66,
            GpuplanError::UnsupportedPrecision { .. } => {
                // The recommender filters these; reaching the exit path means
                // a single GPU was planned directly.
                warn!("Unsupported precision reached exit code mapping");
                69
            }
            GpuplanError::Internal { .. } => 70,
            GpuplanError::Configuration { .. } => 78,
        }
    }

    /// Checks whether the error only excludes one candidate
    ///
    /// Skippable errors remove a single GPU from consideration and must not
    /// abort a run over the whole catalog.
    pub fn is_skippable(&self) -> bool {
        matches!(self, GpuplanError::UnsupportedPrecision { .. })
    }
}

/// Conversion from I/O errors
///
/// Loaders attach the path themselves; this conversion covers the remaining
/// cases such as writing reports to stdout.
impl From<std::io::Error> for GpuplanError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                GpuplanError::catalog_load("unknown", None, "File not found", Some(Box::new(err)))
            }
            _ => GpuplanError::internal("I/O error", Some(Box::new(err))),
        }
    }
}

/// Conversion from JSON errors
impl From<serde_json::Error> for GpuplanError {
    fn from(err: serde_json::Error) -> Self {
        GpuplanError::internal(format!("JSON error: {}", err), Some(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_lists_available() {
        let err = GpuplanError::model_not_found(
            "missing",
            vec!["Llama-3-8B".to_string(), "Llama-3-70B".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "Model 'missing' not found in catalog (available: Llama-3-8B, Llama-3-70B)"
        );
    }

    #[test]
    fn test_catalog_load_message_with_line() {
        let err = GpuplanError::catalog_load("gpus.tsv", Some(3), "bad number", None);
        assert_eq!(
            err.to_string(),
            "Failed to load catalog from gpus.tsv (line 3): bad number"
        );

        let err = GpuplanError::catalog_load("gpus.tsv", None, "empty file", None);
        assert_eq!(
            err.to_string(),
            "Failed to load catalog from gpus.tsv: empty file"
        );
    }

    #[test]
    fn test_skippable_classification() {
        assert!(GpuplanError::unsupported_precision("A100", "fp8").is_skippable());
        assert!(!GpuplanError::invalid_target("bad").is_skippable());
        assert!(!GpuplanError::model_not_found("x", vec![]).is_skippable());
    }
}
