//! Method implementations for the probe adapter.
//!
//! The probe reports on the host it is installed in: it counts the host's
//! resources through the host API and attaches the count to its own adapter
//! instance object.

use adapterkit_client::{ClientConfig, DEFAULT_PAGE_SIZE, TokenAuthHttpClient};
use adapterkit_model::{CollectResult, EndpointResult, TestResult};
use adapterkit_pipe::{AdapterInstance, ClusterConnectionInfo, PipePair};
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

pub const COLLECTION_NUMBER_METRIC: &str = "collection|number";
pub const RESOURCE_COUNT_METRIC: &str = "resources|count";

/// A method the host can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdapterMethod {
    #[value(name = "test")]
    Test,
    #[value(name = "collect")]
    Collect,
    #[value(name = "endpoint_urls")]
    EndpointUrls,
    #[value(name = "adapter_definition")]
    AdapterDefinition,
}

impl fmt::Display for AdapterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Test => "test",
            Self::Collect => "collect",
            Self::EndpointUrls => "endpoint_urls",
            Self::AdapterDefinition => "adapter_definition",
        };
        f.write_str(name)
    }
}

/// Runs `method`: reads the adapter instance from the input pipe and writes
/// the method's result to the output pipe.
pub async fn run(method: AdapterMethod, pipes: &PipePair) -> Result<()> {
    match method {
        AdapterMethod::Test => {
            let instance = read_instance(pipes).await?;
            send(pipes, test_connection(&instance).await).await
        }
        AdapterMethod::Collect => {
            let instance = read_instance(pipes).await?;
            send(pipes, collect(&instance).await?).await
        }
        AdapterMethod::EndpointUrls => {
            let instance = read_instance(pipes).await?;
            send(pipes, endpoint_urls(&instance)).await
        }
        AdapterMethod::AdapterDefinition => bail!("{method} is not supported by this adapter"),
    }
}

async fn read_instance(pipes: &PipePair) -> Result<AdapterInstance> {
    let pipes = pipes.clone();
    tokio::task::spawn_blocking(move || AdapterInstance::from_input(&pipes))
        .await
        .context("input reader panicked")?
        .context("failed to read adapter instance")
}

async fn send<T: Serialize + Send + 'static>(pipes: &PipePair, payload: T) -> Result<()> {
    let pipes = pipes.clone();
    tokio::task::spawn_blocking(move || pipes.send(&payload))
        .await
        .context("output writer panicked")?
        .context("failed to write result")
}

/// Checks that the host API accepts the instance's connection settings.
pub async fn test_connection(instance: &AdapterInstance) -> TestResult {
    let mut result = TestResult::new();
    let Some(info) = &instance.cluster_connection_info else {
        result.with_error("adapter instance has no cluster connection info");
        return result;
    };

    let outcome = match TokenAuthHttpClient::new(ClientConfig::from_connection_info(info)) {
        Ok(client) => {
            let version = client.get("/versions/current").await;
            client.close().await;
            version.map(|_| ())
        }
        Err(e) => Err(e),
    };
    if let Err(e) = outcome {
        error!("connection test failed: {e}");
        result.with_error(format!("connection test failed: {e}"));
    }
    result
}

/// Collects the adapter instance object with its self-monitoring metrics.
///
/// A failed resource count marks the result failed but still reports the
/// instance object.
pub async fn collect(instance: &AdapterInstance) -> Result<CollectResult> {
    let mut object = instance.to_object();
    object.with_metric(COLLECTION_NUMBER_METRIC, instance.collection_number as f64);

    let mut result = CollectResult::new();
    if let Some(info) = &instance.cluster_connection_info {
        match count_resources(info).await {
            Ok(count) => {
                info!(count, "counted host resources");
                object.with_metric(RESOURCE_COUNT_METRIC, count as f64);
            }
            Err(e) => {
                error!("resource count failed: {e}");
                result.with_error(format!("failed to count resources: {e}"));
            }
        }
    }

    result.add_object(object)?;
    Ok(result)
}

async fn count_resources(info: &ClusterConnectionInfo) -> adapterkit_client::ClientResult<usize> {
    let client = TokenAuthHttpClient::new(ClientConfig::from_connection_info(info))?;
    let resources = client
        .get_paged("/resources", "resourceList", DEFAULT_PAGE_SIZE)
        .await;
    client.close().await;
    Ok(resources?.len())
}

/// The URLs the probe connects to.
pub fn endpoint_urls(instance: &AdapterInstance) -> EndpointResult {
    let mut result = EndpointResult::new();
    if let Some(info) = &instance.cluster_connection_info {
        result.with_endpoint(ClientConfig::from_connection_info(info).base_url);
    }
    result
}
