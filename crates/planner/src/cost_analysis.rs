//! Fleet cost analysis

use crate::catalog::GpuSpec;
use serde::{Deserialize, Serialize};

/// Operating and acquisition cost of a fleet of identical GPUs
///
/// Each figure is `None` when the GPU record carries no price for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetCost {
    pub monthly_opex: Option<f64>,
    pub total_capex: Option<f64>,
}

impl FleetCost {
    pub fn for_fleet(gpu: &GpuSpec, fleet_size: u32, days_per_month: u32) -> Self {
        let units = fleet_size as f64;
        Self {
            monthly_opex: gpu
                .opex_per_day
                .map(|per_day| units * per_day * days_per_month as f64),
            total_capex: gpu.capex.map(|capex| units * capex),
        }
    }

    /// Opex over `months` plus capex, when both are known
    pub fn total_cost_of_ownership(&self, months: u32) -> Option<f64> {
        match (self.monthly_opex, self.total_capex) {
            (Some(opex), Some(capex)) => Some(opex * months as f64 + capex),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_cost_with_prices() {
        let gpu = GpuSpec::new("H100 PCIe", 80.0, 2000.0).with_costs(150.0, 25_000.0);
        let cost = FleetCost::for_fleet(&gpu, 4, 30);
        assert_eq!(cost.monthly_opex, Some(18_000.0));
        assert_eq!(cost.total_capex, Some(100_000.0));
        assert_eq!(cost.total_cost_of_ownership(12), Some(316_000.0));
    }

    #[test]
    fn test_fleet_cost_without_prices() {
        let gpu = GpuSpec::new("L40S", 48.0, 864.0);
        let cost = FleetCost::for_fleet(&gpu, 2, 30);
        assert_eq!(cost, FleetCost::default());
        assert_eq!(cost.total_cost_of_ownership(12), None);
    }
}
