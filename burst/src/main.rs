use dispatcher::{log_faults, run_batch, LoadConfig};
use reqwest::Client;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let config = LoadConfig::new("localhost", 8080, 0..140);

    info!(
        "firing {} phone lookups at http://{}:{}",
        config.phones.len(),
        config.host,
        config.port
    );

    let outcomes = run_batch(&Client::new(), &config, config.phones.clone(), None).await;
    log_faults(&outcomes);
}
