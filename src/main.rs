use std::{io, num::NonZeroUsize};

use clap::Parser;
use dispatcher::{interactive_loop, log_faults, run_batch, LoadConfig};
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(about = "Floods the local call-center server with phone lookups")]
struct Args {
    /// Cap on concurrent requests; in interactive mode, the size of each
    /// round of lookups.
    #[arg(long = "num_connections")]
    num_connections: Option<NonZeroUsize>,

    /// Fire the whole phone range once and exit instead of prompting.
    #[arg(long)]
    automatic: bool,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let config = LoadConfig::new("localhost", 8080, 0..2500);
    let client = Client::new();
    let connections = args.num_connections.map(NonZeroUsize::get);

    info!(
        "target http://{}:{}, {} phones, connections {:?}",
        config.host,
        config.port,
        config.phones.len(),
        connections
    );

    if args.automatic {
        let outcomes = run_batch(&client, &config, config.phones.clone(), connections).await;
        log_faults(&outcomes);
    } else {
        let stdin = BufReader::new(tokio::io::stdin());
        interactive_loop(stdin, &client, &config, connections).await?;
    }

    Ok(())
}
