//! Three-step draft editor that produces a validated create request.

use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{EventStatus, EventType, Priority, Severity},
    protocol::CreateEventRequest,
};
use thiserror::Error;

const DUE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Basics,
    Details,
    RiskAndSchedule,
}

impl WizardStep {
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Basics => "Basics",
            WizardStep::Details => "Details",
            WizardStep::RiskAndSchedule => "Risk & Schedule",
        }
    }

    fn following(self) -> Option<WizardStep> {
        match self {
            WizardStep::Basics => Some(WizardStep::Details),
            WizardStep::Details => Some(WizardStep::RiskAndSchedule),
            WizardStep::RiskAndSchedule => None,
        }
    }

    fn preceding(self) -> Option<WizardStep> {
        match self {
            WizardStep::Basics => None,
            WizardStep::Details => Some(WizardStep::Basics),
            WizardStep::RiskAndSchedule => Some(WizardStep::Details),
        }
    }
}

/// Why a wizard control is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardBlock {
    #[error("title is required")]
    MissingTitle,
    #[error("event type is required")]
    MissingEventType,
    #[error("description is required")]
    MissingDescription,
    #[error("already on the first step")]
    NoPreviousStep,
    #[error("already on the last step")]
    NoNextStep,
    #[error("submit is only available on the last step")]
    NotOnFinalStep,
    #[error("status is required")]
    MissingStatus,
    #[error("severity is required")]
    MissingSeverity,
    #[error("priority is required")]
    MissingPriority,
    #[error("due date '{0}' is not a valid date and time")]
    InvalidDueDate(String),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("the creation wizard is not open")]
    WizardClosed,
}

/// A record under construction. Enumerated fields are optional so a cleared
/// selection is representable; text fields hold raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub event_type: Option<EventType>,
    pub title: String,
    pub description: String,
    pub department: String,
    pub initiator: String,
    pub status: Option<EventStatus>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub due_date: String,
    pub attachments: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            event_type: None,
            title: String::new(),
            description: String::new(),
            department: String::new(),
            initiator: String::new(),
            status: Some(EventStatus::Open),
            severity: Some(Severity::Medium),
            priority: Some(Priority::Medium),
            due_date: String::new(),
            attachments: String::new(),
        }
    }
}

/// One edited input. Applying it replaces that field and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    EventType(Option<EventType>),
    Title(String),
    Description(String),
    Department(String),
    Initiator(String),
    Status(Option<EventStatus>),
    Severity(Option<Severity>),
    Priority(Option<Priority>),
    DueDate(String),
    Attachments(String),
}

impl EventDraft {
    pub fn set(&mut self, field: DraftField) {
        match field {
            DraftField::EventType(value) => self.event_type = value,
            DraftField::Title(value) => self.title = value,
            DraftField::Description(value) => self.description = value,
            DraftField::Department(value) => self.department = value,
            DraftField::Initiator(value) => self.initiator = value,
            DraftField::Status(value) => self.status = value,
            DraftField::Severity(value) => self.severity = value,
            DraftField::Priority(value) => self.priority = value,
            DraftField::DueDate(value) => self.due_date = value,
            DraftField::Attachments(value) => self.attachments = value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wizard {
    step: WizardStep,
    draft: EventDraft,
}

impl Wizard {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    /// Opens at the first step. The draft carries over from any earlier visit.
    pub fn enter(&mut self) {
        self.step = WizardStep::Basics;
    }

    pub fn edit(&mut self, field: DraftField) {
        self.draft.set(field);
    }

    pub fn can_advance(&self) -> Result<(), WizardBlock> {
        match self.step {
            WizardStep::Basics => {
                if is_blank(&self.draft.title) {
                    return Err(WizardBlock::MissingTitle);
                }
                if self.draft.event_type.is_none() {
                    return Err(WizardBlock::MissingEventType);
                }
                if is_blank(&self.draft.description) {
                    return Err(WizardBlock::MissingDescription);
                }
                Ok(())
            }
            WizardStep::Details => Ok(()),
            WizardStep::RiskAndSchedule => Err(WizardBlock::NoNextStep),
        }
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardBlock> {
        self.can_advance()?;
        self.step = self.step.following().ok_or(WizardBlock::NoNextStep)?;
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardBlock> {
        self.step = self.step.preceding().ok_or(WizardBlock::NoPreviousStep)?;
        Ok(self.step)
    }

    pub fn can_submit(&self) -> Result<(), WizardBlock> {
        self.submission().map(|_| ())
    }

    /// Builds the create request: blank due date and attachments become absent.
    pub fn submission(&self) -> Result<CreateEventRequest, WizardBlock> {
        if self.step != WizardStep::RiskAndSchedule {
            return Err(WizardBlock::NotOnFinalStep);
        }
        let draft = &self.draft;
        let status = draft.status.ok_or(WizardBlock::MissingStatus)?;
        let severity = draft.severity.ok_or(WizardBlock::MissingSeverity)?;
        let priority = draft.priority.ok_or(WizardBlock::MissingPriority)?;
        let event_type = draft.event_type.ok_or(WizardBlock::MissingEventType)?;

        Ok(CreateEventRequest {
            event_type,
            title: draft.title.clone(),
            description: draft.description.clone(),
            department: draft.department.clone(),
            initiator: draft.initiator.clone(),
            status,
            severity,
            priority,
            due_date: parse_due_date(&draft.due_date)?,
            attachments: non_blank(&draft.attachments),
        })
    }

    /// Called once the store accepted the record.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn parse_due_date(raw: &str) -> Result<Option<NaiveDateTime>, WizardBlock> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(parsed) = DUE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(Some(parsed));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| WizardBlock::InvalidDueDate(raw.to_string()))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: &str) -> Option<String> {
    (!is_blank(value)).then(|| value.trim().to_string())
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
