pub mod resource_units;
mod workload;
mod workload_kind;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
pub use workload::{Allocations, NormalizedWorkload, WorkloadObject};
pub use workload_kind::{custom_object_resource, KindProfile, PatchEndpoint, WorkloadKind, CRON_JOB_CONTAINERS_PATH, STANDARD_CONTAINERS_PATH};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Cpu,
    Memory,
    Other(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        match value {
            "cpu" => Self::Cpu,
            "memory" => Self::Memory,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn create_id(name: &str, namespace: &str) -> String {
    format!("{namespace}/{name}")
}
