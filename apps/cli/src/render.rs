//! Plain-text rendering for terminal output.

use chrono::NaiveDateTime;
use client_core::AnalysisView;
use shared::domain::QualityEvent;

const LIST_HEADERS: [&str; 7] = [
    "Event ID",
    "Title",
    "Type",
    "Status",
    "Due Date",
    "Initiator",
    "Severity",
];

pub fn format_due(due: Option<NaiveDateTime>) -> String {
    due.map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_table(records: &[&QualityEvent]) -> String {
    if records.is_empty() {
        return "No events\n".to_string();
    }

    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|event| {
            [
                event.id.to_string(),
                event.title.clone(),
                event.event_type.to_string(),
                event.status.to_string(),
                format_due(event.due_date),
                event.initiator.clone(),
                event.severity.to_string(),
            ]
        })
        .collect();

    let mut widths = LIST_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &LIST_HEADERS.map(str::to_string), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn render_event(event: &QualityEvent) -> String {
    let mut out = format!("#{} {}\n", event.id, event.title);
    let fields = [
        ("Type", event.event_type.to_string()),
        ("Status", event.status.to_string()),
        ("Severity", event.severity.to_string()),
        ("Priority", event.priority.to_string()),
        ("Department", event.department.clone()),
        ("Initiator", event.initiator.clone()),
        ("Due", format_due(event.due_date)),
        (
            "Attachments",
            event.attachments.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ];
    for (label, value) in fields {
        out.push_str(&format!("  {label:<12}{value}\n"));
    }
    out.push_str(&format!("\n{}\n", event.description));
    out
}

pub fn render_analysis(view: &AnalysisView) -> String {
    format!("{}\n\n{}\n", view.title(), view.body())
}
