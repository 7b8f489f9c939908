use shared::protocol::AnalysisAction;
use thiserror::Error;

/// Failure of one gateway round trip. Neither variant is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Unreachable store, timeout, or a response body that could not be decoded.
    #[error("network error: {0}")]
    Network(String),
    /// The store answered and rejected the request.
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Remote { status: 404, .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return GatewayError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        GatewayError::Network(err.to_string())
    }
}

/// Raised before dispatch when an analysis action cannot be built from the
/// current selection. Never reaches the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisAdvisory {
    #[error("select an event before running {0}")]
    SelectionRequired(AnalysisAction),
    #[error("selected event '{0}' is not a numeric identifier")]
    InvalidSelection(String),
}
