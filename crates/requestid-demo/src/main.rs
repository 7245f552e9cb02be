//! requestid demo: a small axum service whose handlers read the request id
//! injected by a [`requestid::Tracer`].

mod config;
mod server;

use config::DemoConfig;
use server::AppState;

fn main() -> anyhow::Result<()> {
    // Determine config path
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        // Check for --config flag first
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            // Fall back to positional arg
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("REQUESTID_CONFIG").ok())
            .unwrap_or_else(|| "requestid.toml".to_string())
    };

    let config = DemoConfig::load(&config_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        requestid_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            key = %config.tracer.key,
            id_format = ?config.tracer.id_format,
            "Starting requestid demo"
        );

        run(config).await
    })
}

async fn run(config: DemoConfig) -> anyhow::Result<()> {
    let tracer = config.tracer.build()?;

    let state = AppState { config, tracer };

    server::run(state).await
}
