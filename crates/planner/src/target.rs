//! Performance targets for capacity planning

use crate::precision::Precision;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};

/// Desired serving performance for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTarget {
    /// Sustained output tokens per second across all requests
    pub token_rate: f64,
    /// Maximum acceptable end-to-end latency in seconds
    pub max_latency: f64,
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub precision: Precision,
    /// Explicit concurrency; derived from the rate when absent
    #[serde(default)]
    pub max_concurrent: Option<u32>,
}

impl PerformanceTarget {
    /// Creates a validated target with derived concurrency
    pub fn new(
        token_rate: f64,
        max_latency: f64,
        prompt_tokens: u32,
        response_tokens: u32,
        precision: Precision,
    ) -> Result<Self> {
        let target = Self {
            token_rate,
            max_latency,
            prompt_tokens,
            response_tokens,
            precision,
            max_concurrent: None,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_max_concurrent(mut self, max_concurrent: u32) -> Result<Self> {
        self.max_concurrent = Some(max_concurrent);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.token_rate.is_finite() && self.token_rate > 0.0) {
            return Err(GpuplanError::invalid_target(format!(
                "token_rate must be positive, got {}",
                self.token_rate
            )));
        }
        if !(self.max_latency.is_finite() && self.max_latency > 0.0) {
            return Err(GpuplanError::invalid_target(format!(
                "max_latency must be positive, got {}",
                self.max_latency
            )));
        }
        if self.response_tokens == 0 {
            return Err(GpuplanError::invalid_target(
                "response_tokens must be at least 1",
            ));
        }
        if self.max_concurrent == Some(0) {
            return Err(GpuplanError::invalid_target(
                "max_concurrent must be at least 1 when given",
            ));
        }
        Ok(())
    }

    /// Tokens held in the KV cache per request
    pub fn context_window(&self) -> u64 {
        self.prompt_tokens as u64 + self.response_tokens as u64
    }

    /// Concurrent requests the fleet must hold
    ///
    /// Derived as `ceil(token_rate * max_latency / response_tokens)`: each
    /// request emits `response_tokens` within `max_latency`, so that many
    /// requests in flight sustain the target rate.
    pub fn concurrency(&self) -> u64 {
        match self.max_concurrent {
            Some(n) => n as u64,
            None => {
                let derived =
                    (self.token_rate * self.max_latency / self.response_tokens as f64).ceil();
                (derived as u64).max(1)
            }
        }
    }
}
