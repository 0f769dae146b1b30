use chainidx_pipeline::{Config, Supervisor};
use tracing::error;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    chainidx_telemetry::init_tracing("chainidx");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let outcome: anyhow::Result<()> = runtime.block_on(async {
        let config = Config::from_env()?;
        Supervisor::run(config).await?;
        Ok(())
    });

    if let Err(err) = &outcome {
        error!(error = %err, "indexer crashed");
    }
    outcome
}
