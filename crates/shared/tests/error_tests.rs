//! Error Tests
//!
//! Tests for error types, classification, and conversion.

use gpuplan_shared::error::GpuplanError;

#[test]
fn test_error_construction() {
    let err = GpuplanError::model_not_found("x", vec![]);
    assert!(matches!(err, GpuplanError::ModelNotFound { .. }));

    let err = GpuplanError::unsupported_precision("A100 80 GB SXM", "fp8");
    assert!(matches!(err, GpuplanError::UnsupportedPrecision { .. }));

    let err = GpuplanError::invalid_target("token_rate must be positive");
    assert!(matches!(err, GpuplanError::InvalidTarget { .. }));

    let err = GpuplanError::invalid_spec("model 'x'", "n_layers must be positive");
    assert!(matches!(err, GpuplanError::InvalidSpec { .. }));

    let err = GpuplanError::catalog_load("gpus.tsv", Some(2), "bad", None);
    assert!(matches!(err, GpuplanError::CatalogLoad { .. }));

    let err = GpuplanError::configuration("bad", None);
    assert!(matches!(err, GpuplanError::Configuration { .. }));

    let err = GpuplanError::internal("bug", None);
    assert!(matches!(err, GpuplanError::Internal { .. }));
}

#[test]
fn test_exit_code_mapping() {
    assert_eq!(GpuplanError::model_not_found("x", vec![]).exit_code(), 2);
    assert_eq!(GpuplanError::invalid_target("bad").exit_code(), 64);
    assert_eq!(GpuplanError::invalid_spec("gpu", "bad").exit_code(), 65);
    assert_eq!(
        GpuplanError::catalog_load("f", None, "bad", None).exit_code(),
        66
    );
    assert_eq!(
        GpuplanError::unsupported_precision("g", "fp8").exit_code(),
        69
    );
    assert_eq!(GpuplanError::internal("bug", None).exit_code(), 70);
    assert_eq!(GpuplanError::configuration("bad", None).exit_code(), 78);
}

#[test]
fn test_error_display_messages() {
    assert_eq!(
        GpuplanError::unsupported_precision("A100 40 GB SXM", "fp8").to_string(),
        "GPU 'A100 40 GB SXM' does not support fp8 compute"
    );
    assert_eq!(
        GpuplanError::invalid_target("max_latency must be positive").to_string(),
        "Invalid performance target: max_latency must be positive"
    );
    assert_eq!(
        GpuplanError::invalid_spec("gpu 'A10'", "memory_gb must be positive").to_string(),
        "Invalid gpu 'A10' spec: memory_gb must be positive"
    );
}

#[test]
fn test_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: GpuplanError = io_err.into();
    assert!(matches!(err, GpuplanError::CatalogLoad { .. }));

    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: GpuplanError = io_err.into();
    assert!(matches!(err, GpuplanError::Internal { .. }));

    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: GpuplanError = json_err.into();
    assert!(matches!(err, GpuplanError::Internal { .. }));
    assert!(err.to_string().starts_with("Internal error: JSON error"));
}

#[test]
fn test_error_source_chain() {
    use std::error::Error;

    let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
    let err = GpuplanError::catalog_load("models.tsv", None, "read failed", Some(Box::new(io_err)));
    let source = err.source().expect("source should be preserved");
    assert_eq!(source.to_string(), "truncated");
}
