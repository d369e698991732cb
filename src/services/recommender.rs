use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

use crate::{
    common::NormalizedWorkload,
    patchers::ResourceApplier,
    strategies::{HistoryData, Strategy},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub not_applied: usize,
    /// Recommendations that were undefined or carried no request value.
    pub without_request: usize,
}

/// Runs a strategy over a batch of workloads and applies the recommended requests.
#[derive(TypedBuilder)]
pub struct RecommendationService {
    strategy: Arc<dyn Strategy>,
    applier: ResourceApplier,
    dry_run: bool,
}

impl RecommendationService {
    pub async fn run(&self, workloads: &[NormalizedWorkload]) -> ApplySummary {
        if !self.strategy.metrics().is_empty() {
            warn!("Strategy {} expects metrics {:?}, running without history", self.strategy.name(), self.strategy.metrics());
        }
        let history = HistoryData::new();

        let mut summary = ApplySummary::default();
        let mut applies = vec![];
        for workload in workloads {
            for (resource_type, recommendation) in self.strategy.run(&history, workload) {
                info!("{workload} container {} {resource_type}: {}", workload.container, recommendation.info());
                let Some(request) = recommendation.request() else {
                    summary.without_request += 1;
                    continue;
                };
                let applier = &self.applier;
                let dry_run = self.dry_run;
                applies.push(async move { applier.apply(workload, &resource_type, request, dry_run).await });
            }
        }

        for applied in join_all(applies).await {
            if applied {
                summary.applied += 1;
            } else {
                summary.not_applied += 1;
            }
        }
        info!(
            "Recommendations applied {} not applied {} without request {} dry run {}",
            summary.applied, summary.not_applied, summary.without_request, self.dry_run
        );
        summary
    }
}
