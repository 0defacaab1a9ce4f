use anyhow::Context;
use memo_bench::{Config, Fixtures, Orchestrator, OutputFormat};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Loaded configuration: endpoint={}, workload={}, duration={}s",
        config.endpoint,
        config.workload,
        config.duration.as_secs()
    );
    if let Some(seed) = config.seed {
        info!("Deterministic run with seed {}", seed);
    }

    let output = config.output;
    let orchestrator = Orchestrator::new(config, Fixtures::default());
    let result = orchestrator.run().await.context("benchmark setup failed")?;

    match output {
        OutputFormat::Text => result.print_summary(),
        OutputFormat::Json => println!("{}", result.to_json()),
    }

    if !result.passed() {
        std::process::exit(1);
    }
    Ok(())
}
