use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use typed_builder::TypedBuilder;

use crate::{common::WorkloadKind, Result};

const DEFAULT_MAX_CONCURRENT_PATCHES: usize = 8;

#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct WorkloadTarget {
    pub kind: WorkloadKind,
    #[builder(setter(into))]
    pub namespace: String,
    #[builder(setter(into))]
    pub name: String,
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct StrategyConfiguration {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default)]
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    /// Kubeconfig context, the current context when missing.
    #[builder(default)]
    #[serde(default)]
    pub cluster: Option<String>,
    #[builder(default = true)]
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[builder(default)]
    pub enable_open_telemetry: Option<bool>,
    #[builder(default = DEFAULT_MAX_CONCURRENT_PATCHES)]
    #[serde(default = "default_max_concurrent_patches")]
    pub max_concurrent_patches: usize,
    pub strategy: StrategyConfiguration,
    pub workloads: Vec<WorkloadTarget>,
}

fn default_dry_run() -> bool {
    true
}

fn default_max_concurrent_patches() -> usize {
    DEFAULT_MAX_CONCURRENT_PATCHES
}

#[derive(Error, Debug, PartialEq)]
enum ConfigurationError {
    #[error("max concurrent patches must be between 1 and {max}, got {0}", max = Semaphore::MAX_PERMITS)]
    MaxConcurrentPatches(usize),
    #[error("at least one workload must be configured")]
    NoWorkloads,
    #[error("workload {0} must have a name and a namespace")]
    WorkloadTarget(String),
    #[error("strategy name must be not empty")]
    StrategyName,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if !(1..=Semaphore::MAX_PERMITS).contains(&self.max_concurrent_patches) {
            return Err(ConfigurationError::MaxConcurrentPatches(self.max_concurrent_patches).into());
        }
        if self.strategy.name.is_empty() {
            return Err(ConfigurationError::StrategyName.into());
        }
        if self.workloads.is_empty() {
            return Err(ConfigurationError::NoWorkloads.into());
        }
        if let Some(target) = self.workloads.iter().find(|target| target.name.is_empty() || target.namespace.is_empty()) {
            return Err(ConfigurationError::WorkloadTarget(format!("{} {}/{}", target.kind, target.namespace, target.name)).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_from_yaml() {
        let m = r"
cluster: staging
dry_run: false
max_concurrent_patches: 4
strategy:
  name: dummy
  settings:
    reduction_percentage: 15
workloads:
  - kind: Deployment
    namespace: prod
    name: web
  - kind: Rollout
    namespace: prod
    name: checkout
";
        let configuration: Configuration = serde_yaml::from_str(m).unwrap();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.cluster.as_deref(), Some("staging"));
        assert!(!configuration.dry_run);
        assert_eq!(configuration.max_concurrent_patches, 4);
        assert_eq!(configuration.workloads[1].kind, WorkloadKind::Rollout);
        assert_eq!(configuration.strategy.settings.as_ref().and_then(|s| s.get("reduction_percentage")).and_then(serde_json::Value::as_f64), Some(15.0));
    }

    #[test]
    fn test_defaults() {
        let m = r"
strategy:
  name: dummy
workloads:
  - kind: Deployment
    namespace: prod
    name: web
";
        let configuration: Configuration = serde_yaml::from_str(m).unwrap();
        assert!(configuration.dry_run);
        assert_eq!(configuration.max_concurrent_patches, DEFAULT_MAX_CONCURRENT_PATCHES);
        assert!(configuration.cluster.is_none());
        assert!(configuration.strategy.settings.is_none());
    }

    #[test]
    fn test_validation() {
        let strategy = || StrategyConfiguration::builder().name("dummy").build();
        let target = WorkloadTarget::builder().kind(WorkloadKind::Deployment).namespace("prod").name("web").build();

        let configuration = Configuration::builder().strategy(strategy()).workloads(vec![]).build();
        assert_eq!(configuration.validate().unwrap_err().to_string(), ConfigurationError::NoWorkloads.to_string());

        let configuration = Configuration::builder().strategy(strategy()).workloads(vec![target.clone()]).max_concurrent_patches(0).build();
        assert_eq!(configuration.validate().unwrap_err().to_string(), ConfigurationError::MaxConcurrentPatches(0).to_string());

        let nameless = WorkloadTarget::builder().kind(WorkloadKind::Deployment).namespace("prod").name("").build();
        let configuration = Configuration::builder().strategy(strategy()).workloads(vec![target.clone(), nameless]).build();
        assert!(configuration.validate().is_err());

        let configuration = Configuration::builder().strategy(StrategyConfiguration::builder().name("").build()).workloads(vec![target.clone()]).build();
        assert_eq!(configuration.validate().unwrap_err().to_string(), ConfigurationError::StrategyName.to_string());

        let configuration = Configuration::builder().strategy(strategy()).workloads(vec![target]).build();
        assert!(configuration.validate().is_ok());
        assert!(configuration.dry_run);
    }

    #[test]
    fn test_oversized_pool_is_rejected() {
        let m = r"
max_concurrent_patches: 18446744073709551615
strategy:
  name: dummy
workloads:
  - kind: Deployment
    namespace: prod
    name: web
";
        let configuration: Configuration = serde_yaml::from_str(m).unwrap();
        assert_eq!(configuration.max_concurrent_patches, usize::MAX);
        assert_eq!(configuration.validate().unwrap_err().to_string(), ConfigurationError::MaxConcurrentPatches(usize::MAX).to_string());

        let configuration = Configuration::builder()
            .strategy(StrategyConfiguration::builder().name("dummy").build())
            .workloads(vec![WorkloadTarget::builder().kind(WorkloadKind::Deployment).namespace("prod").name("web").build()])
            .max_concurrent_patches(Semaphore::MAX_PERMITS)
            .build();
        assert!(configuration.validate().is_ok());
    }
}
