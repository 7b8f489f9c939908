//! Display ordering over already-fetched records. Filtering is the store's job;
//! nothing here is ever sent to the server.

use std::{cmp::Ordering, fmt, str::FromStr};

use shared::domain::{QualityEvent, UnknownLabel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortSpec {
    /// Keep the order the store delivered (newest first).
    #[default]
    None,
    DueAsc,
    DueDesc,
    SeverityAsc,
    SeverityDesc,
}

impl SortSpec {
    pub fn as_str(self) -> &'static str {
        match self {
            SortSpec::None => "none",
            SortSpec::DueAsc => "due_asc",
            SortSpec::DueDesc => "due_desc",
            SortSpec::SeverityAsc => "severity_asc",
            SortSpec::SeverityDesc => "severity_desc",
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortSpec::None),
            "due_asc" => Ok(SortSpec::DueAsc),
            "due_desc" => Ok(SortSpec::DueDesc),
            "severity_asc" | "sev_asc" => Ok(SortSpec::SeverityAsc),
            "severity_desc" | "sev_desc" => Ok(SortSpec::SeverityDesc),
            _ => Err(UnknownLabel {
                kind: "sort",
                value: raw.to_string(),
            }),
        }
    }
}

/// Returns the records in display order without touching `records`.
///
/// Missing due dates go last for both due orderings. Severity orders by the
/// label text, so `Critical < High < Low < Medium`. The sort is stable.
pub fn sorted(records: &[QualityEvent], spec: SortSpec) -> Vec<&QualityEvent> {
    let mut view: Vec<&QualityEvent> = records.iter().collect();
    match spec {
        SortSpec::None => {}
        SortSpec::DueAsc => view.sort_by(|a, b| due_ascending(a, b)),
        // Reversed comparison where a missing date is the minimum: missing lands last.
        SortSpec::DueDesc => view.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
        SortSpec::SeverityAsc => {
            view.sort_by(|a, b| a.severity.as_str().cmp(b.severity.as_str()))
        }
        SortSpec::SeverityDesc => {
            view.sort_by(|a, b| b.severity.as_str().cmp(a.severity.as_str()))
        }
    }
    view
}

fn due_ascending(a: &QualityEvent, b: &QualityEvent) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
