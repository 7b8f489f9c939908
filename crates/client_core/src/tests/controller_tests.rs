use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{EventStatus, EventType, QualityEvent, Severity},
    protocol::{AnalysisRequest, AnalysisResult, CreateEventRequest, HealthResponse},
};
use tokio::sync::{oneshot, Mutex};

use super::*;
use crate::{
    error::GatewayError,
    fixtures::{event, ids},
    store::Screen,
};

type ListReply = Result<Vec<QualityEvent>, GatewayError>;

#[derive(Default)]
struct ScriptedGateway {
    list_calls: Mutex<Vec<FilterSpec>>,
    gated_lists: Mutex<Vec<(FilterSpec, oneshot::Receiver<ListReply>)>>,
    created: Mutex<Vec<CreateEventRequest>>,
    create_failure: Option<GatewayError>,
    list_panics: bool,
    analyses: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedGateway {
    async fn gate_list(&self, filter: FilterSpec) -> oneshot::Sender<ListReply> {
        let (tx, rx) = oneshot::channel();
        self.gated_lists.lock().await.push((filter, rx));
        tx
    }
}

#[async_trait]
impl RecordGateway for ScriptedGateway {
    async fn list(&self, filter: FilterSpec) -> Result<Vec<QualityEvent>, GatewayError> {
        self.list_calls.lock().await.push(filter);
        if self.list_panics {
            panic!("record store client poisoned");
        }
        let gate = {
            let mut gated = self.gated_lists.lock().await;
            gated
                .iter()
                .position(|(gated_filter, _)| *gated_filter == filter)
                .map(|index| gated.remove(index).1)
        };
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::Network("gate dropped".to_string()))),
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, request: CreateEventRequest) -> Result<QualityEvent, GatewayError> {
        self.created.lock().await.push(request.clone());
        if let Some(err) = &self.create_failure {
            return Err(err.clone());
        }
        let mut created = event(100, request.severity, None);
        created.title = request.title;
        created.event_type = request.event_type;
        created.due_date = request.due_date;
        Ok(created)
    }

    async fn get_by_id(&self, id: EventId) -> Result<QualityEvent, GatewayError> {
        if id.0 == 404 {
            return Err(GatewayError::Remote {
                status: 404,
                message: "Event not found".to_string(),
            });
        }
        Ok(event(id.0, Severity::Low, None))
    }

    async fn update(&self, id: EventId, patch: EventPatch) -> Result<QualityEvent, GatewayError> {
        let mut updated = event(id.0, Severity::Low, None);
        if let Some(status) = patch.status {
            updated.status = status;
        }
        Ok(updated)
    }

    async fn delete(&self, _id: EventId) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, GatewayError> {
        self.analyses.lock().await.push(request.clone());
        Ok(AnalysisResult(json!({
            "title": format!("{} result", request.action),
            "gemini_text": "- looks fine",
        })))
    }

    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            service: None,
        })
    }
}

fn controller(gateway: &Arc<ScriptedGateway>) -> Controller {
    Controller::new(Arc::clone(gateway) as Arc<dyn RecordGateway>)
}

fn fill_wizard(controller: &mut Controller) {
    controller.open_wizard();
    controller.edit_draft(DraftField::EventType(Some(EventType::Capa)));
    controller.edit_draft(DraftField::Title("Label mix-up".to_string()));
    controller.edit_draft(DraftField::Description("Wrong label batch 17".to_string()));
    controller.wizard_next().expect("to details");
    controller.edit_draft(DraftField::Department("Packaging".to_string()));
    controller.edit_draft(DraftField::Initiator("Kai".to_string()));
    controller.wizard_next().expect("to risk");
    controller.edit_draft(DraftField::DueDate(String::new()));
}

#[tokio::test]
async fn superseded_list_fetch_cannot_overwrite_newer_filter() {
    let gateway = Arc::new(ScriptedGateway::default());
    let all = FilterSpec::default();
    let closed = FilterSpec {
        status: Some(EventStatus::Closed),
        ..FilterSpec::default()
    };
    let older_gate = gateway.gate_list(all).await;
    let newer_gate = gateway.gate_list(closed).await;

    let mut controller = controller(&gateway);
    controller.set_filter(all);
    controller.set_filter(closed);
    assert_eq!(controller.in_flight(), 2);
    assert!(controller.store().list_task().is_pending());

    newer_gate
        .send(Ok(vec![event(5, Severity::Low, None)]))
        .expect("newer reply");
    assert!(controller.next_completion().await);
    assert_eq!(ids(&controller.store().visible()), vec![5]);

    older_gate
        .send(Ok(vec![
            event(6, Severity::High, None),
            event(5, Severity::Low, None),
        ]))
        .expect("older reply");
    controller.settle().await;

    assert_eq!(controller.in_flight(), 0);
    assert_eq!(ids(&controller.store().visible()), vec![5]);
    assert_eq!(controller.store().filter(), closed);
    assert_eq!(gateway.list_calls.lock().await.len(), 2);
}

#[tokio::test]
async fn sort_change_does_not_dispatch() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = controller(&gateway);
    controller.set_sort(SortSpec::DueDesc);

    assert_eq!(controller.in_flight(), 0);
    assert!(!controller.next_completion().await);
    assert!(gateway.list_calls.lock().await.is_empty());
}

#[tokio::test]
async fn submission_sends_absent_due_date_and_prepends_record() {
    let gateway = Arc::new(ScriptedGateway::default());
    let existing = gateway.gate_list(FilterSpec::default()).await;
    let mut controller = controller(&gateway);

    controller.refresh();
    existing
        .send(Ok(vec![
            event(2, Severity::High, None),
            event(1, Severity::Low, None),
        ]))
        .expect("reply");
    controller.settle().await;

    fill_wizard(&mut controller);
    controller.submit().expect("submittable");
    controller.settle().await;

    let created = gateway.created.lock().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].due_date, None);
    assert_eq!(created[0].status, EventStatus::Open);
    assert_eq!(created[0].department, "Packaging");

    let store = controller.store();
    assert_eq!(ids(&store.visible()), vec![100, 2, 1]);
    assert_eq!(store.screen(), Screen::List);
    assert!(store.wizard().draft().title.is_empty());
    assert_eq!(gateway.list_calls.lock().await.len(), 1);
}

#[tokio::test]
async fn failed_submission_stays_on_final_step() {
    let gateway = Arc::new(ScriptedGateway {
        create_failure: Some(GatewayError::Network("timed out".to_string())),
        ..ScriptedGateway::default()
    });
    let mut controller = controller(&gateway);

    fill_wizard(&mut controller);
    controller.submit().expect("submittable");
    controller.settle().await;

    let store = controller.store();
    assert_eq!(store.screen(), Screen::Wizard);
    assert_eq!(store.wizard().step(), WizardStep::RiskAndSchedule);
    assert_eq!(store.wizard().draft().title, "Label mix-up");
    assert_eq!(store.creation_task().error(), Some("network error: timed out"));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn blocked_wizard_makes_no_network_call() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = controller(&gateway);
    controller.open_wizard();
    controller.edit_draft(DraftField::Title("Leak".to_string()));
    controller.edit_draft(DraftField::EventType(Some(EventType::Deviation)));

    assert_eq!(
        controller.wizard_next(),
        Err(WizardBlock::MissingDescription)
    );
    assert_eq!(controller.submit(), Err(WizardBlock::NotOnFinalStep));
    assert_eq!(controller.in_flight(), 0);
    assert!(gateway.created.lock().await.is_empty());
}

#[tokio::test]
async fn scoped_analysis_without_selection_performs_no_call() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = controller(&gateway);

    let advisory = controller
        .run_analysis(AnalysisAction::ClosureDraft, None)
        .expect_err("selection required");
    assert_eq!(
        advisory,
        AnalysisAdvisory::SelectionRequired(AnalysisAction::ClosureDraft)
    );
    assert_eq!(controller.in_flight(), 0);
    assert!(controller.store().analysis_task().is_idle());
    assert!(gateway.analyses.lock().await.is_empty());

    controller.select_event(Some("42".to_string()));
    controller
        .run_analysis(AnalysisAction::ClosureDraft, None)
        .expect("dispatched");
    controller.settle().await;

    let analyses = gateway.analyses.lock().await;
    assert_eq!(analyses.len(), 1);
    assert_eq!(
        serde_json::to_value(&analyses[0]).expect("json"),
        json!({"action": "closure_draft", "event_id": 42})
    );
    let view = controller.store().analysis_view().expect("view");
    assert_eq!(view.body(), "- looks fine");
}

#[tokio::test]
async fn analysis_and_list_fetch_settle_independently() {
    let gateway = Arc::new(ScriptedGateway::default());
    let gate = gateway.gate_list(FilterSpec::default()).await;
    let mut controller = controller(&gateway);

    controller.refresh();
    controller
        .run_analysis(AnalysisAction::CapaTrends, None)
        .expect("dispatched");

    assert!(controller.next_completion().await);
    assert!(controller.store().list_task().is_pending());
    assert!(controller.store().analysis_task().data().is_some());

    controller.clear_analysis();
    assert!(controller.store().analysis_task().is_idle());

    gate.send(Ok(vec![event(3, Severity::Medium, None)]))
        .expect("reply");
    controller.settle().await;
    assert_eq!(ids(&controller.store().visible()), vec![3]);
    assert!(controller.store().analysis_task().is_idle());
}

#[tokio::test]
async fn detail_and_update_use_their_own_slots() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = controller(&gateway);

    controller.fetch_event(EventId(404));
    controller.update_event(
        EventId(8),
        EventPatch {
            status: Some(EventStatus::InProgress),
            ..EventPatch::default()
        },
    );
    controller.settle().await;

    let store = controller.store();
    assert_eq!(store.detail_task().error(), Some("remote error 404: Event not found"));
    assert_eq!(
        store.update_task().data().map(|record| record.status),
        Some(EventStatus::InProgress)
    );
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn panicking_operation_rejects_its_slot() {
    let gateway = Arc::new(ScriptedGateway {
        list_panics: true,
        ..ScriptedGateway::default()
    });
    let mut controller = controller(&gateway);
    controller.refresh();

    tokio::time::timeout(Duration::from_secs(2), controller.settle())
        .await
        .expect("settle returns after the panic");

    assert_eq!(controller.in_flight(), 0);
    assert!(!controller.store().list_task().is_pending());
    let error = controller.store().list_task().error().expect("rejected");
    assert!(error.contains("task aborted"), "unexpected error: {error}");
}
