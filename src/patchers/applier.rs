use tracing::{error, info, span, warn, Instrument, Level};

use super::{ContainerIndex, ContainerLocator, PatchDispatcher, PatchOperation, PatchPathResolver};
use crate::common::{resource_units, NormalizedWorkload, ResourceType};

const UNSET_VALUE: &str = "<unset>";

/// Applies one recommended request value to one container of a workload.
#[derive(Clone)]
pub struct ResourceApplier {
    dispatcher: PatchDispatcher,
}

impl ResourceApplier {
    pub fn new(dispatcher: PatchDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Returns `true` when the patch was accepted, or would have been in dry-run mode.
    /// Workloads whose kind is not enabled for apply are skipped and reported as `false`.
    pub async fn apply(&self, workload: &NormalizedWorkload, resource_type: &ResourceType, recommended_value: f64, dry_run: bool) -> bool {
        let span = span!(Level::INFO, "ResourceApplier", kind = %workload.kind, id = %workload.id(), container = %workload.container, resource = %resource_type);
        self.apply_internal(workload, resource_type, recommended_value, dry_run).instrument(span).await
    }

    async fn apply_internal(&self, workload: &NormalizedWorkload, resource_type: &ResourceType, recommended_value: f64, dry_run: bool) -> bool {
        if !workload.kind.is_eligible_for_apply() {
            info!("Skipping {workload} for resource recommendation, currently only supporting Deployment");
            return false;
        }

        if !recommended_value.is_finite() {
            error!("Error applying resource recommendation: invalid recommended value {recommended_value}");
            return false;
        }

        let container_index = ContainerLocator::locate(workload);
        if let ContainerIndex::Defaulted(reason) = &container_index {
            warn!("Patching container index {} of {workload} as a best-effort default, {reason}", container_index.index());
        }
        let containers_path = PatchPathResolver::resolve(&workload.kind);

        let current_value =
            workload.allocations.request(resource_type).map_or_else(|| UNSET_VALUE.to_owned(), |value| resource_units::format(resource_type, value));
        let new_value = resource_units::format(resource_type, recommended_value);
        let operation = PatchOperation::replace_request(containers_path, container_index.index(), resource_type, new_value.clone());

        info!(
            "Applying {resource_type} recommendation for {workload}, container {}: {current_value} -> {new_value}",
            workload.container
        );
        if dry_run {
            info!("Dry run, would apply {} {} = {}", workload.id(), operation.path(), operation.value());
            return true;
        }

        if self.dispatcher.dispatch(workload, &[operation]).await {
            info!("Successfully applied {resource_type} recommendation to {workload}");
            true
        } else {
            error!("Failed to apply {resource_type} recommendation to {workload}");
            false
        }
    }
}
