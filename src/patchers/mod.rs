mod applier;
mod container_locator;
mod dispatcher;
mod patch;

pub use applier::ResourceApplier;
pub use container_locator::{ContainerIndex, ContainerLocator, DefaultReason};
pub use dispatcher::PatchDispatcher;
pub use patch::{PatchOperation, PatchPathResolver};
