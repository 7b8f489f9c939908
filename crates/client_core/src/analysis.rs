//! Maps user-chosen analysis actions to gateway requests and results to views.

use shared::{
    domain::EventId,
    protocol::{AnalysisAction, AnalysisRequest, AnalysisResult},
};

use crate::error::AnalysisAdvisory;

/// Builds the request for `action` from the currently selected event, as the
/// selection control holds it. The selection is ignored for unscoped actions.
pub fn plan_request(
    action: AnalysisAction,
    selected: Option<&str>,
    timeframe_days: Option<u32>,
) -> Result<AnalysisRequest, AnalysisAdvisory> {
    let event_id = if action.requires_event_id() {
        let raw = selected
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(AnalysisAdvisory::SelectionRequired(action))?;
        let id = raw
            .parse::<i64>()
            .map_err(|_| AnalysisAdvisory::InvalidSelection(raw.to_string()))?;
        Some(EventId(id))
    } else {
        None
    };

    Ok(AnalysisRequest {
        action,
        event_id,
        timeframe_days: timeframe_days
            .filter(|_| action == AnalysisAction::SummarizeOpenLastMonth),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisView {
    /// Model-written text, shown verbatim as preformatted text.
    Narrative { title: String, text: String },
    /// Full response dump when no narrative is present.
    Structured { title: String, body: String },
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let title = result.title().to_string();
        match result.narrative() {
            Some(text) => AnalysisView::Narrative {
                title,
                text: text.to_string(),
            },
            None => AnalysisView::Structured {
                title,
                body: result.pretty(),
            },
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AnalysisView::Narrative { title, .. } | AnalysisView::Structured { title, .. } => title,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            AnalysisView::Narrative { text, .. } => text,
            AnalysisView::Structured { body, .. } => body,
        }
    }
}
