use qanda_service::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match std::env::var("QANDA_CONFIG") {
        Ok(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {path}: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => Config::from_env(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = qanda_api::run_server(config).await {
        tracing::error!(error = %err, "Server terminated with error");
        std::process::exit(1);
    }
}
