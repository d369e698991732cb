mod recommender;
mod workload_loader;

pub use recommender::{ApplySummary, RecommendationService};
pub use workload_loader::{normalize, WorkloadLoader};
