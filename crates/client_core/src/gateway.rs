//! Typed request/response boundary to the remote record store.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EventId, FilterSpec, QualityEvent},
    error::ApiErrorBody,
    protocol::{
        AnalysisRequest, AnalysisResult, CreateEventRequest, DeleteEventResponse, EventPatch,
        HealthResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

/// One call is one round trip. Implementations forward values as given and
/// surface whatever the store answers; validation belongs to the store.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn list(&self, filter: FilterSpec) -> Result<Vec<QualityEvent>, GatewayError>;
    async fn create(&self, request: CreateEventRequest) -> Result<QualityEvent, GatewayError>;
    async fn get_by_id(&self, id: EventId) -> Result<QualityEvent, GatewayError>;
    async fn update(&self, id: EventId, patch: EventPatch) -> Result<QualityEvent, GatewayError>;
    async fn delete(&self, id: EventId) -> Result<(), GatewayError>;
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, GatewayError>;
    async fn health(&self) -> Result<HealthResponse, GatewayError>;
}

pub struct HttpRecordGateway {
    http: Client,
    base_url: String,
}

impl HttpRecordGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .with_context(|| format!("invalid record store url '{base_url}'"))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RecordGateway for HttpRecordGateway {
    async fn list(&self, filter: FilterSpec) -> Result<Vec<QualityEvent>, GatewayError> {
        debug!(?filter, "listing events");
        let response = self
            .http
            .get(self.url("/events"))
            .query(&filter)
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = decode(response).await?;
        Ok(decode_rows(rows))
    }

    async fn create(&self, request: CreateEventRequest) -> Result<QualityEvent, GatewayError> {
        debug!(title = %request.title, "creating event");
        let response = self
            .http
            .post(self.url("/events"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_by_id(&self, id: EventId) -> Result<QualityEvent, GatewayError> {
        debug!(event_id = id.0, "fetching event");
        let response = self
            .http
            .get(self.url(&format!("/events/{id}")))
            .send()
            .await?;
        decode(response).await
    }

    async fn update(&self, id: EventId, patch: EventPatch) -> Result<QualityEvent, GatewayError> {
        debug!(event_id = id.0, "updating event");
        let response = self
            .http
            .put(self.url(&format!("/events/{id}")))
            .json(&patch)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, id: EventId) -> Result<(), GatewayError> {
        debug!(event_id = id.0, "deleting event");
        let response = self
            .http
            .delete(self.url(&format!("/events/{id}")))
            .send()
            .await?;
        let body: DeleteEventResponse = decode(response).await?;
        if !body.ok {
            return Err(GatewayError::Remote {
                status: 200,
                message: format!("store declined to delete event {id}"),
            });
        }
        Ok(())
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, GatewayError> {
        debug!(action = %request.action, event_id = ?request.event_id, "requesting analysis");
        let response = self
            .http
            .post(self.url("/ai/analyze"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        let response = self.http.get(self.url("/")).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
            .map(|body| body.message())
            .unwrap_or_else(|_| {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });
        warn!(status = status.as_u16(), %message, "record store rejected request");
        return Err(GatewayError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes)
        .map_err(|err| GatewayError::Network(format!("malformed response: {err}")))
}

/// Rows that do not decode (labels outside the known sets, missing fields) are
/// skipped so one bad record cannot hide the rest of the list.
fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<QualityEvent> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned();
            match serde_json::from_value::<QualityEvent>(row) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(
                        operation = "list",
                        event_id = ?id,
                        error = %err,
                        "skipping undecodable event"
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
