use std::{fmt::Debug, sync::Arc};

use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment, StatefulSet},
    batch::v1::{CronJob, Job},
};
use kube::{
    api::{Api, DynamicObject, Patch, PatchParams},
    Client,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::{
    sync::{AcquireError, OwnedSemaphorePermit, Semaphore},
    task::{JoinError, JoinHandle},
};
use tracing::{debug, error, span, Instrument, Level};

use super::PatchOperation;
use crate::common::{custom_object_resource, NormalizedWorkload, PatchEndpoint};

#[derive(Error, Debug)]
enum PatchError {
    #[error("{0}")]
    Api(#[from] kube::Error),
    #[error("can't serialize patch {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("worker failed {0}")]
    Worker(#[from] JoinError),
    #[error("worker pool closed {0}")]
    PoolClosed(#[from] AcquireError),
}

/// Submits JSON patches through the typed API of each workload kind.
///
/// Every request runs on its own task and holds a permit of a bounded pool while in flight, so a
/// slow API server delays at most `max_concurrent_patches` requests and never the caller.
#[derive(Clone)]
pub struct PatchDispatcher {
    client: Client,
    workers: Arc<Semaphore>,
}

impl PatchDispatcher {
    pub fn new(client: Client, max_concurrent_patches: usize) -> Self {
        Self {
            client,
            workers: Arc::new(Semaphore::new(max_concurrent_patches.clamp(1, Semaphore::MAX_PERMITS))),
        }
    }

    pub async fn dispatch(&self, workload: &NormalizedWorkload, operations: &[PatchOperation]) -> bool {
        let Some(endpoint) = workload.kind.profile().map(|profile| &profile.endpoint) else {
            error!("Unsupported workload type for patching: {workload}");
            return false;
        };

        let span = span!(Level::INFO, "PatchDispatcher", kind = %workload.kind, id = %workload.id());
        match self.submit(endpoint, workload, operations).instrument(span.clone()).await {
            Ok(()) => {
                span.in_scope(|| debug!("patch accepted"));
                true
            },
            Err(PatchError::Api(kube::Error::Api(response))) => {
                span.in_scope(|| error!("Kubernetes API error patching {workload}: {} {} {}", response.code, response.reason, response.message));
                false
            },
            Err(e) => {
                span.in_scope(|| error!("Unexpected error patching {workload}: {e}"));
                false
            },
        }
    }

    async fn submit(&self, endpoint: &PatchEndpoint, workload: &NormalizedWorkload, operations: &[PatchOperation]) -> Result<(), PatchError> {
        let patch: json_patch::Patch = serde_json::from_value(serde_json::to_value(operations)?)?;

        let permit = Arc::clone(&self.workers).acquire_owned().await?;
        let client = self.client.clone();
        let namespace = workload.namespace.as_str();
        let name = workload.name.clone();
        let task = match endpoint {
            PatchEndpoint::Deployment => spawn_patch(Api::<Deployment>::namespaced(client, namespace), name, patch, permit),
            PatchEndpoint::StatefulSet => spawn_patch(Api::<StatefulSet>::namespaced(client, namespace), name, patch, permit),
            PatchEndpoint::DaemonSet => spawn_patch(Api::<DaemonSet>::namespaced(client, namespace), name, patch, permit),
            PatchEndpoint::Job => spawn_patch(Api::<Job>::namespaced(client, namespace), name, patch, permit),
            PatchEndpoint::CronJob => spawn_patch(Api::<CronJob>::namespaced(client, namespace), name, patch, permit),
            PatchEndpoint::CustomObject { group, version, plural } => {
                let resource = custom_object_resource(group, version, plural, &workload.kind);
                spawn_patch(Api::<DynamicObject>::namespaced_with(client, namespace, &resource), name, patch, permit)
            },
        };
        task.await??;
        Ok(())
    }
}

fn spawn_patch<K>(api: Api<K>, name: String, patch: json_patch::Patch, permit: OwnedSemaphorePermit) -> JoinHandle<Result<(), kube::Error>>
where
    K: Clone + DeserializeOwned + Debug + Send + 'static,
{
    tokio::spawn(
        async move {
            let _permit = permit;
            api.patch(&name, &PatchParams::default(), &Patch::Json::<()>(patch)).await.map(|_| ())
        }
        .in_current_span(),
    )
}
