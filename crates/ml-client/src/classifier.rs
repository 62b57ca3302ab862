//! gRPC client for the zero-shot classification service.
//!
//! The service wraps a natural-language-inference model and scores each
//! requested label against the query independently.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, error, info};

use crate::proto::{
    zero_shot_classifier_client::ZeroShotClassifierClient as GrpcClassifierClient,
    ScoreLabelsRequest,
};
use crate::{LabelScorer, MLClientError};

/// Client for the zero-shot classification service.
///
/// Wraps the generated gRPC client. Cloning is cheap; tonic channels
/// multiplex requests over one connection.
#[derive(Clone)]
pub struct ZeroShotClassifierClient {
    client: GrpcClassifierClient<Channel>,
    service_addr: String,
}

impl ZeroShotClassifierClient {
    /// Connect to the classification service, failing if it is unreachable.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, MLClientError> {
        let addr = addr.into();
        info!("Connecting to classification service at {}", addr);

        let channel = endpoint(&addr, None)?
            .connect()
            .await
            .map_err(|e| MLClientError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client: GrpcClassifierClient::new(channel),
            service_addr: addr,
        })
    }

    /// Create a client without touching the network.
    ///
    /// The connection is established on the first call, so a classifier that
    /// is down at start-up only affects the requests that need it.
    pub fn connect_lazy(
        addr: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, MLClientError> {
        let addr = addr.into();
        debug!("Configured lazy connection to classification service at {}", addr);

        let channel = endpoint(&addr, timeout)?.connect_lazy();
        Ok(Self {
            client: GrpcClassifierClient::new(channel),
            service_addr: addr,
        })
    }

    /// Get the address of the service this client talks to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}

fn endpoint(addr: &str, timeout: Option<Duration>) -> Result<Endpoint, MLClientError> {
    let endpoint = Channel::from_shared(addr.to_string())
        .map_err(|e| MLClientError::Config(format!("Invalid classifier address {}: {}", addr, e)))?;
    Ok(match timeout {
        Some(timeout) => endpoint.timeout(timeout),
        None => endpoint,
    })
}

#[async_trait]
impl LabelScorer for ZeroShotClassifierClient {
    async fn score_labels(
        &self,
        query: &str,
        labels: &[String],
    ) -> Result<HashMap<String, f32>, MLClientError> {
        debug!("Scoring {} labels for query '{}'", labels.len(), query);

        let request = tonic::Request::new(ScoreLabelsRequest {
            query: query.to_string(),
            labels: labels.to_vec(),
            multi_label: true,
        });

        let response = self
            .client
            .clone()
            .score_labels(request)
            .await
            .map_err(|status| {
                error!("gRPC error while scoring labels: {}", status);
                MLClientError::ScoringError(status.to_string())
            })?;

        let mut scores = HashMap::with_capacity(labels.len());
        for entry in response.into_inner().scores {
            if !labels.contains(&entry.label) {
                error!("Classification service returned unrequested label '{}'", entry.label);
                return Err(MLClientError::InvalidResponse(format!(
                    "Unrequested label '{}'",
                    entry.label
                )));
            }
            scores.insert(entry.label, entry.score);
        }
        Ok(scores)
    }
}
