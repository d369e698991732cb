use serde::Serialize;
use tracing::warn;

use crate::common::{ResourceType, WorkloadKind, STANDARD_CONTAINERS_PATH};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum PatchOp {
    Replace,
}

/// One RFC 6902 operation changing one resource of one container.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PatchOperation {
    op: PatchOp,
    path: String,
    value: String,
}

impl PatchOperation {
    pub fn replace_request(containers_path: &str, container_index: usize, resource_type: &ResourceType, value: String) -> Self {
        Self {
            op: PatchOp::Replace,
            path: format!("{containers_path}/{container_index}/resources/requests/{resource_type}"),
            value,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

pub struct PatchPathResolver;

impl PatchPathResolver {
    pub fn resolve(kind: &WorkloadKind) -> &'static str {
        if let Some(path) = kind.containers_path() {
            path
        } else {
            warn!("Unknown workload kind {kind}, using default container path");
            STANDARD_CONTAINERS_PATH
        }
    }
}
