//! Client-side state and workflow for quality-event records: the record store
//! gateway, per-operation task slots, the sorted list view, the creation wizard
//! and the analysis orchestrator.

pub mod analysis;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod store;
pub mod task;
pub mod view;
pub mod wizard;

pub use analysis::{plan_request, AnalysisView};
pub use controller::Controller;
pub use error::{AnalysisAdvisory, GatewayError};
pub use gateway::{HttpRecordGateway, RecordGateway};
pub use store::{Completion, EventsStore, Screen};
pub use task::{AsyncTask, TaskState, TaskTicket};
pub use view::{sorted, SortSpec};
pub use wizard::{DraftField, EventDraft, Wizard, WizardBlock, WizardStep};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
