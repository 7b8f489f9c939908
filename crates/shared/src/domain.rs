use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(EventId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} label '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of wire labels. The label is what the store persists and
/// what list filters send, so it must match byte for byte.
macro_rules! label_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| {
                        candidate.as_str() == trimmed
                            || cli_spelling(candidate.as_str()) == trimmed.to_ascii_lowercase()
                    })
                    .ok_or_else(|| UnknownLabel {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }
    };
}

/// `Change Control` -> `change_control`, `In-Progress` -> `in_progress`.
fn cli_spelling(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

label_enum!(EventType, "event type", {
    Deviation => "Deviation",
    Capa => "CAPA",
    ChangeControl => "Change Control",
    Audit => "Audit",
});

label_enum!(EventStatus, "status", {
    Open => "Open",
    InProgress => "In-Progress",
    Closed => "Closed",
});

label_enum!(Severity, "severity", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

label_enum!(Priority, "priority", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

/// A persisted quality-management record. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityEvent {
    pub id: EventId,
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    pub department: String,
    pub initiator: String,
    pub status: EventStatus,
    pub severity: Severity,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub attachments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Server-side constraints for a list fetch. `None` means no constraint and the
/// parameter is left out of the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.severity.is_none() && self.event_type.is_none()
    }
}
