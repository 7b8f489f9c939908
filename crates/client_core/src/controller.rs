//! Dispatches gateway work as independent tasks and feeds their completions
//! back into the store.
//!
//! Dispatch methods return as soon as the task is spawned. Completions are
//! applied only when the caller pumps them with [`Controller::next_completion`]
//! or [`Controller::settle`], so all state changes happen on the caller's task.

use std::{future::Future, sync::Arc};

use shared::{
    domain::{EventId, FilterSpec},
    protocol::{AnalysisAction, EventPatch},
};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{
    error::{AnalysisAdvisory, GatewayError},
    gateway::RecordGateway,
    store::{Completion, EventsStore},
    view::SortSpec,
    wizard::{DraftField, WizardBlock, WizardStep},
};

pub struct Controller {
    gateway: Arc<dyn RecordGateway>,
    store: EventsStore,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Controller {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            store: EventsStore::default(),
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn store(&self) -> &EventsStore {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn RecordGateway> {
        &self.gateway
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Re-fetches with the current filter.
    pub fn refresh(&mut self) {
        self.fetch_list(self.store.filter());
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.fetch_list(filter);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.store.set_sort(sort);
    }

    pub fn select_event(&mut self, selected: Option<String>) {
        self.store.select(selected);
    }

    pub fn open_wizard(&mut self) {
        self.store.open_wizard();
    }

    pub fn cancel_wizard(&mut self) {
        self.store.cancel_wizard();
    }

    pub fn edit_draft(&mut self, field: DraftField) {
        self.store.wizard_mut().edit(field);
    }

    pub fn wizard_next(&mut self) -> Result<WizardStep, WizardBlock> {
        self.store.wizard_mut().next()
    }

    pub fn wizard_back(&mut self) -> Result<WizardStep, WizardBlock> {
        self.store.wizard_mut().back()
    }

    pub fn submit(&mut self) -> Result<(), WizardBlock> {
        let (ticket, request) = self.store.begin_submission()?;
        self.spawn(
            "create",
            move |err| Completion::Created {
                ticket,
                result: Err(err),
            },
            move |gateway| async move {
                Completion::Created {
                    ticket,
                    result: gateway.create(request).await,
                }
            },
        );
        Ok(())
    }

    pub fn fetch_event(&mut self, id: EventId) {
        let ticket = self.store.begin_detail();
        self.spawn(
            "get_by_id",
            move |err| Completion::Fetched {
                ticket,
                result: Err(err),
            },
            move |gateway| async move {
                Completion::Fetched {
                    ticket,
                    result: gateway.get_by_id(id).await,
                }
            },
        );
    }

    pub fn update_event(&mut self, id: EventId, patch: EventPatch) {
        let ticket = self.store.begin_update();
        self.spawn(
            "update",
            move |err| Completion::Updated {
                ticket,
                result: Err(err),
            },
            move |gateway| async move {
                Completion::Updated {
                    ticket,
                    result: gateway.update(id, patch).await,
                }
            },
        );
    }

    pub fn run_analysis(
        &mut self,
        action: AnalysisAction,
        timeframe_days: Option<u32>,
    ) -> Result<(), AnalysisAdvisory> {
        let (ticket, request) = self.store.begin_analysis(action, timeframe_days)?;
        self.spawn(
            "analyze",
            move |err| Completion::Analyzed {
                ticket,
                result: Err(err),
            },
            move |gateway| async move {
                Completion::Analyzed {
                    ticket,
                    result: gateway.analyze(request).await,
                }
            },
        );
        Ok(())
    }

    pub fn clear_analysis(&mut self) {
        self.store.clear_analysis();
    }

    /// Waits for one completion and applies it. Returns `false` when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.accept(completion);
                true
            }
            None => false,
        }
    }

    /// Applies completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn fetch_list(&mut self, filter: FilterSpec) {
        let ticket = self.store.begin_list(filter);
        self.spawn(
            "list",
            move |err| Completion::Listed {
                ticket,
                result: Err(err),
            },
            move |gateway| async move {
                Completion::Listed {
                    ticket,
                    result: gateway.list(filter).await,
                }
            },
        );
    }

    fn accept(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(
            operation = completion.operation(),
            in_flight = self.in_flight,
            "applying completion"
        );
        self.store.apply(completion);
    }

    /// Runs `work` on its own task. If that task dies before producing a
    /// completion, `aborted` builds the rejection for the same slot and ticket.
    fn spawn<A, F, Fut>(&mut self, operation: &'static str, aborted: A, work: F)
    where
        A: FnOnce(GatewayError) -> Completion + Send + 'static,
        F: FnOnce(Arc<dyn RecordGateway>) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let worker = tokio::spawn(work(Arc::clone(&self.gateway)));
        let completions_tx = self.completions_tx.clone();
        self.in_flight += 1;
        debug!(operation, in_flight = self.in_flight, "dispatching");
        tokio::spawn(async move {
            let completion = match worker.await {
                Ok(completion) => completion,
                Err(err) => {
                    error!(operation, error = %err, "operation task aborted");
                    aborted(GatewayError::Network(format!("task aborted: {err}")))
                }
            };
            // The receiver lives as long as the controller; a send error only
            // means the controller was dropped.
            let _ = completions_tx.send(completion);
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
