use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{EventId, EventStatus, EventType, Priority, Severity, UnknownLabel};

/// Body of `POST /events`: every record field except the store-assigned ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    pub department: String,
    pub initiator: String,
    pub status: EventStatus,
    pub severity: Severity,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<String>,
}

/// Partial update for `PUT /events/{id}`. Unset fields are not serialized, so the
/// store leaves them alone. `due_date: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub due_date: Option<Option<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisAction {
    HighRisk,
    SummarizeOpenLastMonth,
    SuggestNextSteps,
    CapaTrends,
    ClosureDraft,
}

impl AnalysisAction {
    pub const ALL: &'static [AnalysisAction] = &[
        AnalysisAction::HighRisk,
        AnalysisAction::SummarizeOpenLastMonth,
        AnalysisAction::SuggestNextSteps,
        AnalysisAction::CapaTrends,
        AnalysisAction::ClosureDraft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisAction::HighRisk => "high_risk",
            AnalysisAction::SummarizeOpenLastMonth => "summarize_open_last_month",
            AnalysisAction::SuggestNextSteps => "suggest_next_steps",
            AnalysisAction::CapaTrends => "capa_trends",
            AnalysisAction::ClosureDraft => "closure_draft",
        }
    }

    /// Actions scoped to a single record must carry its identifier.
    pub fn requires_event_id(self) -> bool {
        matches!(
            self,
            AnalysisAction::SuggestNextSteps | AnalysisAction::ClosureDraft
        )
    }
}

impl fmt::Display for AnalysisAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisAction {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| UnknownLabel {
                kind: "analysis action",
                value: raw.to_string(),
            })
    }
}

/// Body of `POST /ai/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub action: AnalysisAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe_days: Option<u32>,
}

const DEFAULT_ANALYSIS_TITLE: &str = "Analysis Result";
const NARRATIVE_FIELD: &str = "gemini_text";

/// Action-specific response of the analysis endpoint, kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub serde_json::Value);

impl AnalysisResult {
    pub fn title(&self) -> &str {
        self.str_field("title").unwrap_or(DEFAULT_ANALYSIS_TITLE)
    }

    /// Natural-language text produced by the inference provider, if it ran.
    pub fn narrative(&self) -> Option<&str> {
        self.str_field(NARRATIVE_FIELD)
    }

    pub fn model(&self) -> Option<&str> {
        self.str_field("model")
    }

    /// The analysis endpoint reports some failures inline with a 200 status.
    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}
