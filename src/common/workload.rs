use std::{borrow::Cow, collections::BTreeMap, fmt::Display, sync::Arc};

use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment, StatefulSet},
    batch::v1::{CronJob, Job},
    core::v1::{Container, PodTemplateSpec, ResourceRequirements},
};
use kube::api::DynamicObject;
use typed_builder::TypedBuilder;

use super::{create_id, resource_units, ResourceType, WorkloadKind};

/// Object as it was fetched from the cluster.
#[derive(Clone, Debug)]
pub enum WorkloadObject {
    Deployment(Arc<Deployment>),
    StatefulSet(Arc<StatefulSet>),
    DaemonSet(Arc<DaemonSet>),
    Job(Arc<Job>),
    CronJob(Arc<CronJob>),
    Dynamic(Arc<DynamicObject>),
}

impl WorkloadObject {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::Deployment(_) => WorkloadKind::Deployment,
            Self::StatefulSet(_) => WorkloadKind::StatefulSet,
            Self::DaemonSet(_) => WorkloadKind::DaemonSet,
            Self::Job(_) => WorkloadKind::Job,
            Self::CronJob(_) => WorkloadKind::CronJob,
            Self::Dynamic(object) => object.types.as_ref().map_or_else(|| WorkloadKind::Unknown(String::new()), |types| WorkloadKind::from(types.kind.as_str())),
        }
    }

    /// Containers of the pod template, `None` when the object does not expose a single template.
    pub fn containers(&self) -> Option<Cow<'_, [Container]>> {
        fn template_containers(template: &PodTemplateSpec) -> Option<Cow<'_, [Container]>> {
            template.spec.as_ref().map(|spec| Cow::Borrowed(spec.containers.as_slice()))
        }

        match self {
            Self::Deployment(deployment) => template_containers(&deployment.spec.as_ref()?.template),
            Self::StatefulSet(stateful_set) => template_containers(&stateful_set.spec.as_ref()?.template),
            Self::DaemonSet(daemon_set) => template_containers(&daemon_set.spec.as_ref()?.template),
            Self::Job(job) => template_containers(&job.spec.as_ref()?.template),
            Self::CronJob(cron_job) => template_containers(&cron_job.spec.as_ref()?.job_template.spec.as_ref()?.template),
            Self::Dynamic(object) => {
                let path = self.kind().containers_path()?;
                let containers = object.data.pointer(path)?;
                serde_json::from_value::<Vec<Container>>(containers.clone()).ok().map(Cow::Owned)
            },
        }
    }
}

impl From<Deployment> for WorkloadObject {
    fn from(value: Deployment) -> Self {
        Self::Deployment(Arc::new(value))
    }
}

impl From<StatefulSet> for WorkloadObject {
    fn from(value: StatefulSet) -> Self {
        Self::StatefulSet(Arc::new(value))
    }
}

impl From<DaemonSet> for WorkloadObject {
    fn from(value: DaemonSet) -> Self {
        Self::DaemonSet(Arc::new(value))
    }
}

impl From<Job> for WorkloadObject {
    fn from(value: Job) -> Self {
        Self::Job(Arc::new(value))
    }
}

impl From<CronJob> for WorkloadObject {
    fn from(value: CronJob) -> Self {
        Self::CronJob(Arc::new(value))
    }
}

impl From<DynamicObject> for WorkloadObject {
    fn from(value: DynamicObject) -> Self {
        Self::Dynamic(Arc::new(value))
    }
}

/// Current requests and limits of one container. Unset values are `None`, never zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocations {
    pub requests: BTreeMap<ResourceType, Option<f64>>,
    pub limits: BTreeMap<ResourceType, Option<f64>>,
}

impl Allocations {
    pub fn from_requirements(requirements: Option<&ResourceRequirements>) -> Self {
        let read = |quantities: Option<&BTreeMap<String, k8s_openapi::apimachinery::pkg::api::resource::Quantity>>| {
            [ResourceType::Cpu, ResourceType::Memory]
                .into_iter()
                .map(|resource_type| {
                    let value = quantities
                        .and_then(|quantities| quantities.get(resource_type.as_str()))
                        .and_then(|quantity| resource_units::parse_quantity(&quantity.0).ok())
                        .filter(|value| *value > 0.0);
                    (resource_type, value)
                })
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            requests: read(requirements.and_then(|r| r.requests.as_ref())),
            limits: read(requirements.and_then(|r| r.limits.as_ref())),
        }
    }

    #[must_use]
    pub fn with_request(mut self, resource_type: ResourceType, value: f64) -> Self {
        self.requests.insert(resource_type, Some(value));
        self
    }

    #[must_use]
    pub fn with_limit(mut self, resource_type: ResourceType, value: f64) -> Self {
        self.limits.insert(resource_type, Some(value));
        self
    }

    pub fn request(&self, resource_type: &ResourceType) -> Option<f64> {
        self.requests.get(resource_type).copied().flatten()
    }

    pub fn limit(&self, resource_type: &ResourceType) -> Option<f64> {
        self.limits.get(resource_type).copied().flatten()
    }
}

/// A single container of a workload, as handed over by discovery.
#[derive(Clone, Debug, TypedBuilder)]
pub struct NormalizedWorkload {
    pub kind: WorkloadKind,
    #[builder(setter(into))]
    pub namespace: String,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub container: String,
    #[builder(default)]
    pub allocations: Allocations,
    #[builder(default, setter(strip_option))]
    pub object: Option<WorkloadObject>,
}

impl NormalizedWorkload {
    pub fn id(&self) -> String {
        create_id(&self.name, &self.namespace)
    }
}

impl Display for NormalizedWorkload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    use super::*;

    #[test]
    fn test_allocations_from_requirements() {
        let requirements = ResourceRequirements {
            requests: Some(BTreeMap::from([("cpu".to_owned(), Quantity("250m".to_owned())), ("memory".to_owned(), Quantity("0".to_owned()))])),
            limits: Some(BTreeMap::from([("memory".to_owned(), Quantity("256Mi".to_owned())), ("cpu".to_owned(), Quantity("garbage".to_owned()))])),
            ..Default::default()
        };
        let allocations = Allocations::from_requirements(Some(&requirements));
        assert_eq!(allocations.request(&ResourceType::Cpu), Some(0.25));
        assert_eq!(allocations.request(&ResourceType::Memory), None);
        assert_eq!(allocations.limit(&ResourceType::Memory), Some(268_435_456.0));
        assert_eq!(allocations.limit(&ResourceType::Cpu), None);
        assert_eq!(allocations.requests.len(), 2);
    }

    #[test]
    fn test_missing_requirements_are_unset() {
        let allocations = Allocations::from_requirements(None);
        assert_eq!(allocations.requests.get(&ResourceType::Cpu), Some(&None));
        assert_eq!(allocations.limit(&ResourceType::Memory), None);
    }

    #[test]
    fn test_cron_job_containers_are_nested() {
        let m = r"
apiVersion: batch/v1
kind: CronJob
metadata:
  name: report
  namespace: batch
spec:
  schedule: '*/5 * * * *'
  jobTemplate:
    spec:
      template:
        spec:
          restartPolicy: OnFailure
          containers:
          - name: main
            image: busybox
          - name: uploader
            image: busybox
";
        let cron_job: CronJob = serde_yaml::from_str(m).unwrap();
        let object = WorkloadObject::from(cron_job);
        assert_eq!(object.kind(), WorkloadKind::CronJob);
        let names: Vec<_> = object.containers().unwrap().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["main", "uploader"]);
    }

    #[test]
    fn test_dynamic_containers_follow_kind_path() {
        let m = r"
apiVersion: argoproj.io/v1alpha1
kind: Rollout
metadata:
  name: web
  namespace: prod
spec:
  template:
    spec:
      containers:
      - name: app
        image: nginx
        resources:
          requests:
            cpu: 500m
";
        let rollout: DynamicObject = serde_yaml::from_str(m).unwrap();
        let object = WorkloadObject::from(rollout);
        assert_eq!(object.kind(), WorkloadKind::Rollout);
        let containers = object.containers().unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(Allocations::from_requirements(containers[0].resources.as_ref()).request(&ResourceType::Cpu), Some(0.5));
    }

    #[test]
    fn test_strimzi_pod_set_has_no_template() {
        let m = r"
apiVersion: core.strimzi.io/v1beta2
kind: StrimziPodSet
metadata:
  name: kafka
  namespace: kafka
spec:
  pods: []
";
        let pod_set: DynamicObject = serde_yaml::from_str(m).unwrap();
        assert!(WorkloadObject::from(pod_set).containers().is_none());
    }
}
