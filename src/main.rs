use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use caseload_sorter::config::ServiceConfig;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match ServiceConfig::from_env() {
        Ok(config) => caseload_sorter::run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
