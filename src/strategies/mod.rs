mod percentage_reduction;

use std::collections::BTreeMap;

pub use percentage_reduction::{PercentageReductionSettings, PercentageReductionStrategy};
use serde::Deserialize;
use thiserror::Error;

use crate::common::{NormalizedWorkload, ResourceType};

/// Single point of a historical series.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

/// Historical series keyed by metric name.
pub type HistoryData = BTreeMap<String, Vec<Sample>>;

pub type RunResult = BTreeMap<ResourceType, ResourceRecommendation>;

#[derive(Clone, Debug, PartialEq)]
pub enum ResourceRecommendation {
    Recommended { request: Option<f64>, limit: Option<f64>, info: String },
    /// No recommendation is possible for this resource.
    Undefined { info: String },
}

impl ResourceRecommendation {
    pub fn undefined(info: impl Into<String>) -> Self {
        Self::Undefined { info: info.into() }
    }

    pub fn request(&self) -> Option<f64> {
        match self {
            Self::Recommended { request, .. } => *request,
            Self::Undefined { .. } => None,
        }
    }

    pub fn limit(&self) -> Option<f64> {
        match self {
            Self::Recommended { limit, .. } => *limit,
            Self::Undefined { .. } => None,
        }
    }

    pub fn info(&self) -> &str {
        match self {
            Self::Recommended { info, .. } | Self::Undefined { info } => info,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. })
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    #[error("reduction percentage must be greater than 0 and at most 100, got {0}")]
    InvalidReductionPercentage(f64),
    #[error("unknown strategy {0}, available strategies: {available}", available = StrategyCatalog::NAMES.join(", "))]
    UnknownStrategy(String),
    #[error("invalid settings for strategy {0}: {1}")]
    InvalidSettings(String, String),
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> String;

    /// Names of the historical metrics `run` expects. Empty means no history has to be queried.
    fn metrics(&self) -> &[&'static str];

    fn run(&self, history: &HistoryData, workload: &NormalizedWorkload) -> RunResult;
}

pub struct StrategyCatalog;

impl StrategyCatalog {
    pub const NAMES: [&'static str; 1] = [PercentageReductionStrategy::NAME];

    pub fn create(name: &str, settings: Option<&serde_json::Value>) -> Result<Box<dyn Strategy>, StrategyError> {
        match name {
            PercentageReductionStrategy::NAME => {
                let settings: PercentageReductionSettings = match settings {
                    Some(settings) => serde_json::from_value(settings.clone()).map_err(|e| StrategyError::InvalidSettings(name.to_owned(), e.to_string()))?,
                    None => PercentageReductionSettings::default(),
                };
                Ok(Box::new(PercentageReductionStrategy::new(settings)?))
            },
            _ => Err(StrategyError::UnknownStrategy(name.to_owned())),
        }
    }
}
