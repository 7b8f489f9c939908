use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    wizard::parse_due_date, AnalysisView, Controller, DraftField, HttpRecordGateway,
    RecordGateway, SortSpec,
};
use shared::{
    domain::{EventId, EventStatus, EventType, FilterSpec, Priority, Severity},
    protocol::{AnalysisAction, EventPatch},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, normalize_base_url};

#[derive(Parser, Debug)]
#[command(name = "qms", about = "Track deviations, CAPAs, change controls and audits")]
struct Args {
    /// Overrides the record store url from qms.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List events, filtered by the store and sorted locally.
    List {
        #[arg(long)]
        status: Option<EventStatus>,
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long = "type")]
        event_type: Option<EventType>,
        #[arg(long, default_value = "none")]
        sort: SortSpec,
    },
    Show {
        id: i64,
    },
    /// Create an event through the three wizard steps.
    Create(CreateArgs),
    Update {
        id: i64,
        #[arg(long)]
        status: Option<EventStatus>,
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
    },
    Delete {
        id: i64,
    },
    Analyze {
        action: AnalysisAction,
        /// Event the action is scoped to (suggest_next_steps, closure_draft).
        #[arg(long)]
        event_id: Option<String>,
        #[arg(long)]
        timeframe_days: Option<u32>,
    },
    Health,
}

#[derive(ClapArgs, Debug)]
struct CreateArgs {
    #[arg(long = "type")]
    event_type: Option<EventType>,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long, default_value = "")]
    initiator: String,
    #[arg(long, default_value = "")]
    attachments: String,
    #[arg(long)]
    status: Option<EventStatus>,
    #[arg(long)]
    severity: Option<Severity>,
    #[arg(long)]
    priority: Option<Priority>,
    /// Due date and time, e.g. 2025-04-01T17:45.
    #[arg(long, default_value = "")]
    due: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    let base_url = normalize_base_url(&settings.api_base_url)?;
    info!(base_url = %base_url, "using record store");

    let gateway = HttpRecordGateway::new(&base_url, settings.request_timeout())?;
    let mut controller = Controller::new(Arc::new(gateway));

    match args.command {
        Command::List {
            status,
            severity,
            event_type,
            sort,
        } => {
            controller.set_sort(sort);
            controller.set_filter(FilterSpec {
                status,
                severity,
                event_type,
            });
            controller.settle().await;
            if let Some(err) = controller.store().list_task().error() {
                bail!("failed to list events: {err}");
            }
            print!("{}", render::render_table(&controller.store().visible()));
        }
        Command::Show { id } => {
            controller.fetch_event(EventId(id));
            controller.settle().await;
            let task = controller.store().detail_task();
            if let Some(err) = task.error() {
                bail!("failed to load event {id}: {err}");
            }
            let event = task.data().context("event lookup returned nothing")?;
            print!("{}", render::render_event(event));
        }
        Command::Create(create) => create_event(&mut controller, create).await?,
        Command::Update {
            id,
            status,
            severity,
            priority,
            due,
            clear_due,
        } => {
            let due_date = if clear_due {
                Some(None)
            } else {
                match due {
                    Some(raw) => Some(parse_due_date(&raw)?),
                    None => None,
                }
            };
            let patch = EventPatch {
                status,
                severity,
                priority,
                due_date,
                ..EventPatch::default()
            };
            if patch.is_empty() {
                bail!("nothing to update; pass --status, --severity, --priority or --due");
            }
            controller.update_event(EventId(id), patch);
            controller.settle().await;
            let task = controller.store().update_task();
            if let Some(err) = task.error() {
                bail!("failed to update event {id}: {err}");
            }
            let event = task.data().context("update returned nothing")?;
            print!("{}", render::render_event(event));
        }
        Command::Delete { id } => {
            controller
                .gateway()
                .delete(EventId(id))
                .await
                .with_context(|| format!("failed to delete event {id}"))?;
            println!("Deleted event #{id}");
        }
        Command::Analyze {
            action,
            event_id,
            timeframe_days,
        } => {
            controller.select_event(event_id);
            controller.run_analysis(action, timeframe_days)?;
            controller.settle().await;
            let store = controller.store();
            if let Some(err) = store.analysis_task().error() {
                bail!("analysis {action} failed: {err}");
            }
            let result = store
                .analysis_task()
                .data()
                .ok_or_else(|| anyhow!("analysis {action} returned nothing"))?;
            if let Some(model) = result.model() {
                info!(model, "narrative generated");
            }
            if let Some(reported) = result.error() {
                warn!(%action, reported, "record store reported an analysis problem");
            }
            let view = AnalysisView::from_result(result);
            print!("{}", render::render_analysis(&view));
        }
        Command::Health => {
            let health = controller
                .gateway()
                .health()
                .await
                .context("record store health check failed")?;
            println!(
                "{} ({})",
                health.status,
                health.service.as_deref().unwrap_or("unknown service")
            );
        }
    }

    Ok(())
}

async fn create_event(controller: &mut Controller, create: CreateArgs) -> Result<()> {
    controller.open_wizard();

    controller.edit_draft(DraftField::EventType(create.event_type));
    controller.edit_draft(DraftField::Title(create.title));
    controller.edit_draft(DraftField::Description(create.description));
    advance(controller)?;

    controller.edit_draft(DraftField::Department(create.department));
    controller.edit_draft(DraftField::Initiator(create.initiator));
    controller.edit_draft(DraftField::Attachments(create.attachments));
    advance(controller)?;

    if let Some(status) = create.status {
        controller.edit_draft(DraftField::Status(Some(status)));
    }
    if let Some(severity) = create.severity {
        controller.edit_draft(DraftField::Severity(Some(severity)));
    }
    if let Some(priority) = create.priority {
        controller.edit_draft(DraftField::Priority(Some(priority)));
    }
    controller.edit_draft(DraftField::DueDate(create.due));
    controller
        .submit()
        .map_err(|block| anyhow!("cannot submit: {block}"))?;
    controller.settle().await;

    let task = controller.store().creation_task();
    if let Some(err) = task.error() {
        bail!("failed to create event: {err}");
    }
    let event = task.data().context("create returned nothing")?;
    println!("Created event #{} ({})", event.id, event.title);
    Ok(())
}

fn advance(controller: &mut Controller) -> Result<()> {
    let step = controller.store().wizard().step();
    controller
        .wizard_next()
        .map_err(|block| anyhow!("cannot leave {}: {block}", step.label()))?;
    Ok(())
}
