use itertools::Itertools;
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment, StatefulSet},
    batch::v1::{CronJob, Job},
};
use kube::{
    api::{Api, DynamicObject},
    Client,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::{
    common::{custom_object_resource, Allocations, NormalizedWorkload, PatchEndpoint, WorkloadKind, WorkloadObject},
    configuration::WorkloadTarget,
};

#[derive(Error, Debug)]
enum LoaderError {
    #[error("unsupported workload kind {0}")]
    UnsupportedKind(WorkloadKind),
    #[error("{0}")]
    Api(#[from] kube::Error),
}

/// Fetches configured workloads and describes every container of each one.
#[derive(TypedBuilder)]
pub struct WorkloadLoader {
    client: Client,
}

impl WorkloadLoader {
    pub async fn load(&self, targets: &[WorkloadTarget]) -> Vec<NormalizedWorkload> {
        info!("Loading workloads {}", targets.iter().map(|target| format!("{} {}/{}", target.kind, target.namespace, target.name)).join(", "));
        futures::future::join_all(targets.iter().map(|target| self.load_target(target))).await.into_iter().flatten().collect()
    }

    async fn load_target(&self, target: &WorkloadTarget) -> Vec<NormalizedWorkload> {
        match self.fetch(target).await {
            Ok(object) => normalize(target, &object),
            Err(e) => {
                warn!("Can't load {} {}/{}: {e}", target.kind, target.namespace, target.name);
                vec![]
            },
        }
    }

    async fn fetch(&self, target: &WorkloadTarget) -> Result<WorkloadObject, LoaderError> {
        let profile = target.kind.profile().ok_or_else(|| LoaderError::UnsupportedKind(target.kind.clone()))?;
        let object = match profile.endpoint {
            PatchEndpoint::Deployment => WorkloadObject::from(self.get::<Deployment>(target).await?),
            PatchEndpoint::StatefulSet => WorkloadObject::from(self.get::<StatefulSet>(target).await?),
            PatchEndpoint::DaemonSet => WorkloadObject::from(self.get::<DaemonSet>(target).await?),
            PatchEndpoint::Job => WorkloadObject::from(self.get::<Job>(target).await?),
            PatchEndpoint::CronJob => WorkloadObject::from(self.get::<CronJob>(target).await?),
            PatchEndpoint::CustomObject { group, version, plural } => {
                let resource = custom_object_resource(group, version, plural, &target.kind);
                let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), &target.namespace, &resource);
                WorkloadObject::from(api.get(&target.name).await?)
            },
        };
        Ok(object)
    }

    async fn get<K>(&self, target: &WorkloadTarget) -> Result<K, kube::Error>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()> + Clone + DeserializeOwned + std::fmt::Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &target.namespace);
        api.get(&target.name).await
    }
}

pub fn normalize(target: &WorkloadTarget, object: &WorkloadObject) -> Vec<NormalizedWorkload> {
    let Some(containers) = object.containers() else {
        warn!("{} {}/{} has no pod template, skipping", target.kind, target.namespace, target.name);
        return vec![];
    };

    containers
        .iter()
        .map(|container| {
            let allocations = Allocations::from_requirements(container.resources.as_ref());
            debug!("{} {}/{} container {} allocations {allocations:?}", target.kind, target.namespace, target.name, container.name);
            NormalizedWorkload::builder()
                .kind(target.kind.clone())
                .namespace(target.namespace.clone())
                .name(target.name.clone())
                .container(container.name.clone())
                .allocations(allocations)
                .object(object.clone())
                .build()
        })
        .collect()
}
