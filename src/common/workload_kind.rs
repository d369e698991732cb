use std::fmt::Display;

use kube::api::ApiResource;
use serde::{Deserialize, Serialize};

pub const STANDARD_CONTAINERS_PATH: &str = "/spec/template/spec/containers";
pub const CRON_JOB_CONTAINERS_PATH: &str = "/spec/jobTemplate/spec/template/spec/containers";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    Rollout,
    DeploymentConfig,
    StrimziPodSet,
    Unknown(String),
}

/// Endpoint used to submit a patch for a kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatchEndpoint {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    CustomObject {
        group: &'static str,
        version: &'static str,
        plural: &'static str,
    },
}

/// Dynamic resource description of a custom object endpoint.
pub fn custom_object_resource(group: &str, version: &str, plural: &str, kind: &WorkloadKind) -> ApiResource {
    ApiResource {
        group: group.to_owned(),
        version: version.to_owned(),
        api_version: format!("{group}/{version}"),
        kind: kind.to_string(),
        plural: plural.to_owned(),
    }
}

/// One row of the kind table. Everything that differs between workload kinds lives here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KindProfile {
    /// JSON pointer to the container list of the pod template, if the kind has one.
    pub containers_path: Option<&'static str>,
    pub endpoint: PatchEndpoint,
    pub eligible_for_apply: bool,
}

static DEPLOYMENT: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::Deployment,
    eligible_for_apply: true,
};

static STATEFUL_SET: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::StatefulSet,
    eligible_for_apply: false,
};

static DAEMON_SET: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::DaemonSet,
    eligible_for_apply: false,
};

static JOB: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::Job,
    eligible_for_apply: false,
};

// CronJob resolves and dispatches correctly but is not enabled for apply yet.
static CRON_JOB: KindProfile = KindProfile {
    containers_path: Some(CRON_JOB_CONTAINERS_PATH),
    endpoint: PatchEndpoint::CronJob,
    eligible_for_apply: false,
};

static ROLLOUT: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::CustomObject {
        group: "argoproj.io",
        version: "v1alpha1",
        plural: "rollouts",
    },
    eligible_for_apply: false,
};

static DEPLOYMENT_CONFIG: KindProfile = KindProfile {
    containers_path: Some(STANDARD_CONTAINERS_PATH),
    endpoint: PatchEndpoint::CustomObject {
        group: "apps.openshift.io",
        version: "v1",
        plural: "deploymentconfigs",
    },
    eligible_for_apply: false,
};

// StrimziPodSet carries full pod definitions instead of a single template.
static STRIMZI_POD_SET: KindProfile = KindProfile {
    containers_path: None,
    endpoint: PatchEndpoint::CustomObject {
        group: "core.strimzi.io",
        version: "v1beta2",
        plural: "strimzipodsets",
    },
    eligible_for_apply: false,
};

impl WorkloadKind {
    pub fn profile(&self) -> Option<&'static KindProfile> {
        match self {
            Self::Deployment => Some(&DEPLOYMENT),
            Self::StatefulSet => Some(&STATEFUL_SET),
            Self::DaemonSet => Some(&DAEMON_SET),
            Self::Job => Some(&JOB),
            Self::CronJob => Some(&CRON_JOB),
            Self::Rollout => Some(&ROLLOUT),
            Self::DeploymentConfig => Some(&DEPLOYMENT_CONFIG),
            Self::StrimziPodSet => Some(&STRIMZI_POD_SET),
            Self::Unknown(_) => None,
        }
    }

    pub fn containers_path(&self) -> Option<&'static str> {
        self.profile().and_then(|profile| profile.containers_path)
    }

    pub fn is_eligible_for_apply(&self) -> bool {
        self.profile().is_some_and(|profile| profile.eligible_for_apply)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
            Self::Rollout => "Rollout",
            Self::DeploymentConfig => "DeploymentConfig",
            Self::StrimziPodSet => "StrimziPodSet",
            Self::Unknown(kind) => kind,
        }
    }
}

impl From<&str> for WorkloadKind {
    fn from(value: &str) -> Self {
        match value {
            "Deployment" => Self::Deployment,
            "StatefulSet" => Self::StatefulSet,
            "DaemonSet" => Self::DaemonSet,
            "Job" => Self::Job,
            "CronJob" => Self::CronJob,
            "Rollout" => Self::Rollout,
            "DeploymentConfig" => Self::DeploymentConfig,
            "StrimziPodSet" => Self::StrimziPodSet,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for WorkloadKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<WorkloadKind> for String {
    fn from(value: WorkloadKind) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
