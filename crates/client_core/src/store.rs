//! Client-side state for the events screens and the single place completions
//! are applied. The record collection changes only on list success (replace)
//! and create success (prepend).

use shared::{
    domain::{EventId, FilterSpec, QualityEvent},
    protocol::{AnalysisAction, AnalysisRequest, AnalysisResult, CreateEventRequest},
};
use tracing::info;

use crate::{
    analysis::{plan_request, AnalysisView},
    error::{AnalysisAdvisory, GatewayError},
    task::{AsyncTask, TaskTicket},
    view::{sorted, SortSpec},
    wizard::{Wizard, WizardBlock},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    List,
    Wizard,
}

/// Outcome of one dispatched operation, tagged with the ticket it was issued.
#[derive(Debug, Clone)]
pub enum Completion {
    Listed {
        ticket: TaskTicket,
        result: Result<Vec<QualityEvent>, GatewayError>,
    },
    Created {
        ticket: TaskTicket,
        result: Result<QualityEvent, GatewayError>,
    },
    Fetched {
        ticket: TaskTicket,
        result: Result<QualityEvent, GatewayError>,
    },
    Updated {
        ticket: TaskTicket,
        result: Result<QualityEvent, GatewayError>,
    },
    Analyzed {
        ticket: TaskTicket,
        result: Result<AnalysisResult, GatewayError>,
    },
}

impl Completion {
    pub fn operation(&self) -> &'static str {
        match self {
            Completion::Listed { .. } => "list",
            Completion::Created { .. } => "create",
            Completion::Fetched { .. } => "get_by_id",
            Completion::Updated { .. } => "update",
            Completion::Analyzed { .. } => "analyze",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventsStore {
    records: Vec<QualityEvent>,
    filter: FilterSpec,
    sort: SortSpec,
    selected: Option<String>,
    screen: Screen,
    wizard: Wizard,
    list: AsyncTask<()>,
    creation: AsyncTask<QualityEvent>,
    detail: AsyncTask<QualityEvent>,
    update: AsyncTask<QualityEvent>,
    analysis: AsyncTask<AnalysisResult>,
}

impl Default for EventsStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            selected: None,
            screen: Screen::default(),
            wizard: Wizard::default(),
            list: AsyncTask::new("list"),
            creation: AsyncTask::new("create"),
            detail: AsyncTask::new("get_by_id"),
            update: AsyncTask::new("update"),
            analysis: AsyncTask::new("analyze"),
        }
    }
}

impl EventsStore {
    pub fn records(&self) -> &[QualityEvent] {
        &self.records
    }

    /// Records in display order for the current sort.
    pub fn visible(&self) -> Vec<&QualityEvent> {
        sorted(&self.records, self.sort)
    }

    pub fn filter(&self) -> FilterSpec {
        self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, selected: Option<String>) {
        self.selected = selected;
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn list_task(&self) -> &AsyncTask<()> {
        &self.list
    }

    pub fn creation_task(&self) -> &AsyncTask<QualityEvent> {
        &self.creation
    }

    pub fn detail_task(&self) -> &AsyncTask<QualityEvent> {
        &self.detail
    }

    pub fn update_task(&self) -> &AsyncTask<QualityEvent> {
        &self.update
    }

    pub fn analysis_task(&self) -> &AsyncTask<AnalysisResult> {
        &self.analysis
    }

    pub fn analysis_view(&self) -> Option<AnalysisView> {
        self.analysis.data().map(AnalysisView::from_result)
    }

    pub fn open_wizard(&mut self) {
        self.wizard.enter();
        self.screen = Screen::Wizard;
    }

    /// Leaves the wizard without persisting. The draft is kept as is.
    pub fn cancel_wizard(&mut self) {
        self.screen = Screen::List;
    }

    pub fn begin_list(&mut self, filter: FilterSpec) -> TaskTicket {
        self.filter = filter;
        self.list.begin()
    }

    pub fn begin_submission(&mut self) -> Result<(TaskTicket, CreateEventRequest), WizardBlock> {
        if self.screen != Screen::Wizard {
            return Err(WizardBlock::WizardClosed);
        }
        if self.creation.is_pending() {
            return Err(WizardBlock::SubmissionInFlight);
        }
        let request = self.wizard.submission()?;
        Ok((self.creation.begin(), request))
    }

    pub fn begin_detail(&mut self) -> TaskTicket {
        self.detail.begin()
    }

    pub fn begin_update(&mut self) -> TaskTicket {
        self.update.begin()
    }

    /// Validates the selection first; an advisory leaves the analysis slot untouched.
    pub fn begin_analysis(
        &mut self,
        action: AnalysisAction,
        timeframe_days: Option<u32>,
    ) -> Result<(TaskTicket, AnalysisRequest), AnalysisAdvisory> {
        let request = plan_request(action, self.selected.as_deref(), timeframe_days)?;
        Ok((self.analysis.begin(), request))
    }

    pub fn clear_analysis(&mut self) {
        self.analysis.reset();
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Listed { ticket, result } => match result {
                Ok(records) => {
                    if self.list.fulfill(ticket, ()) {
                        info!(count = records.len(), "event list replaced");
                        self.records = records;
                    }
                }
                Err(err) => {
                    self.list.reject(ticket, err);
                }
            },
            Completion::Created { ticket, result } => match result {
                Ok(event) => {
                    if self.creation.fulfill(ticket, event.clone()) {
                        info!(event_id = event.id.0, "event created");
                        self.records.insert(0, event);
                        self.wizard.reset();
                        self.screen = Screen::List;
                    }
                }
                Err(err) => {
                    self.creation.reject(ticket, err);
                }
            },
            Completion::Fetched { ticket, result } => settle(&mut self.detail, ticket, result),
            Completion::Updated { ticket, result } => settle(&mut self.update, ticket, result),
            Completion::Analyzed { ticket, result } => settle(&mut self.analysis, ticket, result),
        }
    }

    pub fn record(&self, id: EventId) -> Option<&QualityEvent> {
        self.records.iter().find(|event| event.id == id)
    }
}

fn settle<T>(task: &mut AsyncTask<T>, ticket: TaskTicket, result: Result<T, GatewayError>) {
    match result {
        Ok(data) => {
            task.fulfill(ticket, data);
        }
        Err(err) => {
            task.reject(ticket, err);
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
