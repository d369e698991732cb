use std::sync::Arc;

use kube::{config::KubeConfigOptions, Client, Config};
use tracing::info;

pub mod common;
pub mod configuration;
pub mod patchers;
pub mod services;
pub mod strategies;

pub use configuration::Configuration;
use patchers::{PatchDispatcher, ResourceApplier};
use services::{ApplySummary, RecommendationService, WorkloadLoader};
use strategies::StrategyCatalog;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

async fn create_client(cluster: Option<&str>) -> Result<Client> {
    let config = match cluster {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_owned()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options).await?
        },
        None => Config::infer().await?,
    };
    Ok(Client::try_from(config)?)
}

pub async fn start(configuration: Configuration) -> Result<ApplySummary> {
    info!("Kubesizer started, dry run {}", configuration.dry_run);
    let strategy = StrategyCatalog::create(&configuration.strategy.name, configuration.strategy.settings.as_ref())?;
    info!("Using strategy {}\n{}", strategy.name(), strategy.description());

    let client = create_client(configuration.cluster.as_deref()).await?;
    let workloads = WorkloadLoader::builder().client(client.clone()).build().load(&configuration.workloads).await;

    let applier = ResourceApplier::new(PatchDispatcher::new(client, configuration.max_concurrent_patches));
    let service = RecommendationService::builder().strategy(Arc::from(strategy)).applier(applier).dry_run(configuration.dry_run).build();
    let summary = service.run(&workloads).await;

    info!("Kubesizer finished");
    Ok(summary)
}
