use std::fmt::Display;

use tracing::warn;

use crate::common::NormalizedWorkload;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DefaultReason {
    MissingObject,
    UnsupportedKind,
    ContainerNotFound,
}

impl Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingObject => "no fetched object",
            Self::UnsupportedKind => "unsupported workload kind",
            Self::ContainerNotFound => "container not found",
        };
        f.write_str(reason)
    }
}

/// Position of the target container. A defaulted index is a best-effort guess of 0.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContainerIndex {
    Resolved(usize),
    Defaulted(DefaultReason),
}

impl ContainerIndex {
    pub fn index(&self) -> usize {
        match self {
            Self::Resolved(index) => *index,
            Self::Defaulted(_) => 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

pub struct ContainerLocator;

impl ContainerLocator {
    pub fn locate(workload: &NormalizedWorkload) -> ContainerIndex {
        let Some(object) = workload.object.as_ref() else {
            warn!("No fetched object available for {workload}, using container index 0");
            return ContainerIndex::Defaulted(DefaultReason::MissingObject);
        };

        let containers = workload.kind.containers_path().and_then(|_| object.containers());
        let Some(containers) = containers else {
            warn!("Unsupported workload type {} for {workload}, using container index 0", workload.kind);
            return ContainerIndex::Defaulted(DefaultReason::UnsupportedKind);
        };

        if let Some(index) = containers.iter().position(|container| container.name == workload.container) {
            ContainerIndex::Resolved(index)
        } else {
            warn!("Container {} not found in {workload}, using container index 0", workload.container);
            ContainerIndex::Defaulted(DefaultReason::ContainerNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::{apps::v1::Deployment, batch::v1::CronJob};
    use kube::api::DynamicObject;

    use super::*;
    use crate::common::{WorkloadKind, WorkloadObject};

    const DEPLOYMENT: &str = r"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
      - name: app
        image: nginx
      - name: sidecar
        image: envoy
";

    fn workload(kind: WorkloadKind, container: &str, object: Option<WorkloadObject>) -> NormalizedWorkload {
        let builder = NormalizedWorkload::builder().kind(kind).namespace("prod").name("web").container(container);
        match object {
            Some(object) => builder.object(object).build(),
            None => builder.build(),
        }
    }

    fn deployment() -> WorkloadObject {
        WorkloadObject::from(serde_yaml::from_str::<Deployment>(DEPLOYMENT).unwrap())
    }

    #[test]
    fn test_locate_named_container() {
        assert_eq!(ContainerLocator::locate(&workload(WorkloadKind::Deployment, "sidecar", Some(deployment()))), ContainerIndex::Resolved(1));
        assert_eq!(ContainerLocator::locate(&workload(WorkloadKind::Deployment, "app", Some(deployment()))), ContainerIndex::Resolved(0));
    }

    #[test]
    fn test_missing_object_defaults() {
        let index = ContainerLocator::locate(&workload(WorkloadKind::Deployment, "sidecar", None));
        assert_eq!(index, ContainerIndex::Defaulted(DefaultReason::MissingObject));
        assert_eq!(index.index(), 0);
        assert!(!index.is_resolved());
    }

    #[test]
    fn test_unknown_container_defaults() {
        let index = ContainerLocator::locate(&workload(WorkloadKind::Deployment, "worker", Some(deployment())));
        assert_eq!(index, ContainerIndex::Defaulted(DefaultReason::ContainerNotFound));
        assert_eq!(index.index(), 0);
    }

    #[test]
    fn test_unsupported_kind_defaults() {
        let index = ContainerLocator::locate(&workload(WorkloadKind::Unknown("ReplicaSet".to_owned()), "sidecar", Some(deployment())));
        assert_eq!(index, ContainerIndex::Defaulted(DefaultReason::UnsupportedKind));

        let pod_set: DynamicObject = serde_yaml::from_str(
            r"
apiVersion: core.strimzi.io/v1beta2
kind: StrimziPodSet
metadata:
  name: web
  namespace: prod
spec:
  pods: []
",
        )
        .unwrap();
        let index = ContainerLocator::locate(&workload(WorkloadKind::StrimziPodSet, "kafka", Some(WorkloadObject::from(pod_set))));
        assert_eq!(index, ContainerIndex::Defaulted(DefaultReason::UnsupportedKind));
    }

    #[test]
    fn test_locate_in_cron_job_template() {
        let cron_job: CronJob = serde_yaml::from_str(
            r"
apiVersion: batch/v1
kind: CronJob
metadata:
  name: web
  namespace: prod
spec:
  schedule: '0 * * * *'
  jobTemplate:
    spec:
      template:
        spec:
          containers:
          - name: first
            image: busybox
          - name: second
            image: busybox
          - name: third
            image: busybox
",
        )
        .unwrap();
        let index = ContainerLocator::locate(&workload(WorkloadKind::CronJob, "third", Some(WorkloadObject::from(cron_job))));
        assert_eq!(index, ContainerIndex::Resolved(2));
    }

    #[test]
    fn test_locate_in_custom_resource() {
        let rollout: DynamicObject = serde_yaml::from_str(
            r"
apiVersion: argoproj.io/v1alpha1
kind: Rollout
metadata:
  name: web
  namespace: prod
spec:
  template:
    spec:
      containers:
      - name: init
        image: busybox
      - name: app
        image: nginx
",
        )
        .unwrap();
        let index = ContainerLocator::locate(&workload(WorkloadKind::Rollout, "app", Some(WorkloadObject::from(rollout))));
        assert_eq!(index, ContainerIndex::Resolved(1));
    }
}
