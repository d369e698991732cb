use serde::Deserialize;

use super::{HistoryData, ResourceRecommendation, RunResult, Strategy, StrategyError};
use crate::common::{NormalizedWorkload, ResourceType};

const DEFAULT_REDUCTION_PERCENTAGE: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PercentageReductionSettings {
    #[serde(default = "default_reduction_percentage")]
    pub reduction_percentage: f64,
}

fn default_reduction_percentage() -> f64 {
    DEFAULT_REDUCTION_PERCENTAGE
}

impl Default for PercentageReductionSettings {
    fn default() -> Self {
        Self {
            reduction_percentage: DEFAULT_REDUCTION_PERCENTAGE,
        }
    }
}

impl PercentageReductionSettings {
    pub fn validate(&self) -> Result<(), StrategyError> {
        let percentage = self.reduction_percentage;
        if percentage > 0.0 && percentage <= 100.0 {
            Ok(())
        } else {
            Err(StrategyError::InvalidReductionPercentage(percentage))
        }
    }
}

/// Recommends the current allocation reduced by a fixed percentage. Needs no history.
#[derive(Debug)]
pub struct PercentageReductionStrategy {
    settings: PercentageReductionSettings,
}

impl PercentageReductionStrategy {
    pub const NAME: &'static str = "dummy";

    pub fn new(settings: PercentageReductionSettings) -> Result<Self, StrategyError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    fn recommend(&self, workload: &NormalizedWorkload, resource_type: &ResourceType, label: &str) -> ResourceRecommendation {
        let reduction_factor = 1.0 - self.settings.reduction_percentage / 100.0;
        let reduce = |current: Option<f64>| current.filter(|value| *value > 0.0).map(|value| value * reduction_factor);

        let request = reduce(workload.allocations.request(resource_type));
        let limit = reduce(workload.allocations.limit(resource_type));

        if request.is_none() && limit.is_none() {
            return ResourceRecommendation::undefined(format!("No current {label} allocation defined"));
        }

        ResourceRecommendation::Recommended {
            request,
            limit,
            info: format!("Reduced by {}% from current allocation", self.settings.reduction_percentage),
        }
    }
}

impl Strategy for PercentageReductionStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> String {
        let percentage = self.settings.reduction_percentage;
        format!(
            "CPU request: current value - {percentage}%, limit: current value - {percentage}%\n\
             Memory request: current value - {percentage}%, limit: current value - {percentage}%\n\
             Uses no historical data, current allocations are reduced by a fixed percentage."
        )
    }

    fn metrics(&self) -> &[&'static str] {
        &[]
    }

    fn run(&self, _history: &HistoryData, workload: &NormalizedWorkload) -> RunResult {
        RunResult::from([
            (ResourceType::Cpu, self.recommend(workload, &ResourceType::Cpu, "CPU")),
            (ResourceType::Memory, self.recommend(workload, &ResourceType::Memory, "Memory")),
        ])
    }
}
