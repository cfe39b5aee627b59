use std::{
    error::Error,
    fmt,
    io::{self, Write},
    ops::Range,
    sync::Arc,
};

use reqwest::Client;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::Semaphore,
    task::JoinError,
};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub host: String,
    pub port: u16,
    pub phones: Range<u32>,
}

impl LoadConfig {
    pub fn new(host: impl Into<String>, port: u16, phones: Range<u32>) -> Self {
        Self {
            host: host.into(),
            port,
            phones,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    host: String,
    port: u16,
    path: String,
}

impl Target {
    pub fn for_phone(config: &LoadConfig, phone: u32) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            path: format!("/phone={phone}"),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug)]
pub struct ResponseRecord {
    pub status: u16,
    pub body: String,
}

#[derive(Debug)]
pub enum DispatchError {
    Request(reqwest::Error),
    Worker(JoinError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Request(err) => write!(f, "request failed: {err}"),
            DispatchError::Worker(err) => write!(f, "worker aborted: {err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Request(err) => Some(err),
            DispatchError::Worker(err) => Some(err),
        }
    }
}

pub async fn send_request(
    client: &Client,
    target: &Target,
) -> Result<ResponseRecord, DispatchError> {
    let response = client
        .get(target.url())
        .send()
        .await
        .map_err(|err| DispatchError::Request(err))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|err| DispatchError::Request(err))?;

    Ok(ResponseRecord { status, body })
}

fn report(target: &Target, record: &ResponseRecord) -> String {
    format!(
        "Response from {}:{}{}:\nResponse Code: {}\nResponse Data:\n{}",
        target.host, target.port, target.path, record.status, record.body
    )
}

pub async fn dispatch(client: &Client, target: &Target) -> Result<(), DispatchError> {
    let record = send_request(client, target).await?;

    println!("{}", report(target, &record));

    Ok(())
}

pub async fn run_batch<I>(
    client: &Client,
    config: &LoadConfig,
    phones: I,
    limit: Option<usize>,
) -> Vec<Result<(), DispatchError>>
where
    I: IntoIterator<Item = u32>,
{
    let semaphore = limit.map(|permits| Arc::new(Semaphore::new(permits)));

    let mut handles = Vec::new();

    for phone in phones {
        let client = client.clone();
        let target = Target::for_phone(config, phone);
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => Some(
                    semaphore
                        .acquire_owned()
                        .await
                        .expect("worker pool semaphore closed"),
                ),
                None => None,
            };

            dispatch(&client, &target).await
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());

    for handle in handles {
        outcomes.push(match handle.await {
            Ok(outcome) => outcome,
            Err(err) => Err(DispatchError::Worker(err)),
        });
    }

    outcomes
}

pub async fn run_chunks(
    client: &Client,
    config: &LoadConfig,
    chunk_size: Option<usize>,
) -> Vec<Result<(), DispatchError>> {
    let phones: Vec<u32> = config.phones.clone().collect();

    let Some(size) = chunk_size else {
        debug!("no connection bound, dispatching all {} phones at once", phones.len());
        return run_batch(client, config, phones, None).await;
    };

    let mut outcomes = Vec::with_capacity(phones.len());

    // Each chunk is its own submit-and-wait cycle; the join barrier keeps
    // chunks from overlapping.
    for chunk in phones.chunks(size) {
        debug!("dispatching chunk of {} phones", chunk.len());
        outcomes.extend(run_batch(client, config, chunk.iter().copied(), None).await);
    }

    outcomes
}

pub fn log_faults(outcomes: &[Result<(), DispatchError>]) {
    for fault in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
        warn!("{fault}");
    }
}

pub async fn interactive_loop<R>(
    input: R,
    client: &Client,
    config: &LoadConfig,
    chunk_size: Option<usize>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        print!("Dispatch next round? [y/N]: ");
        io::stdout().flush()?;

        match lines.next_line().await? {
            Some(answer) if is_yes(&answer) => {
                let outcomes = run_chunks(client, config, chunk_size).await;
                log_faults(&outcomes);
            }
            _ => break,
        }
    }

    Ok(())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
