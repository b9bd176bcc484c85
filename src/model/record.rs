//! Performance records: one row of the record store per topic.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ThreadId;

/// A performance opportunity tracked from proposal to confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub thread_id: ThreadId,
    pub event: String,

    /// Canonical date/time entries, or the raw text while a date retry is pending.
    pub proposed_dates: Vec<String>,

    pub location: String,
    pub info: String,

    /// Empty until the performance is accepted.
    pub confirmed_dates: Vec<String>,

    pub status: Status,
}

/// Where a performance stands in its lifecycle.
///
/// `Pending` is stored as an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
}

impl Status {
    /// The value written to the STATUS column.
    pub fn as_cell(self) -> &'static str {
        match self {
            Self::Pending => "",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Reads a STATUS cell. Surrounding whitespace and case are ignored.
    pub fn from_cell(cell: &str) -> Option<Self> {
        match cell.trim().to_ascii_uppercase().as_str() {
            "" => Some(Self::Pending),
            "ACCEPTED" => Some(Self::Accepted),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Fields an admin may edit while the record is in this status.
    pub fn modifiable_fields(self) -> &'static [Field] {
        match self {
            Self::Pending => &[
                Field::Event,
                Field::ProposedDates,
                Field::Location,
                Field::Info,
            ],
            Self::Accepted => &[
                Field::Event,
                Field::ConfirmedDates,
                Field::Location,
                Field::Info,
                Field::Status,
            ],
            Self::Rejected => &[],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            other => f.write_str(other.as_cell()),
        }
    }
}

/// An editable field of a performance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Event,
    ProposedDates,
    Location,
    Info,
    ConfirmedDates,
    Status,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Event,
        Field::ProposedDates,
        Field::Location,
        Field::Info,
        Field::ConfirmedDates,
        Field::Status,
    ];

    /// The column header shown to admins.
    pub fn label(self) -> &'static str {
        match self {
            Self::Event => "EVENT",
            Self::ProposedDates => "PROPOSED DATE | TIME",
            Self::Location => "LOCATION",
            Self::Info => "PERFORMANCE INFO",
            Self::ConfirmedDates => "CONFIRMED DATE | TIME",
            Self::Status => "STATUS",
        }
    }

    /// Short key used in button payloads, free of separator characters.
    pub fn key(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::ProposedDates => "proposed",
            Self::Location => "location",
            Self::Info => "info",
            Self::ConfirmedDates => "confirmed",
            Self::Status => "status",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl PerformanceRecord {
    /// A fresh proposal: pending, nothing confirmed.
    pub fn proposed(
        thread_id: ThreadId,
        event: impl Into<String>,
        proposed_dates: Vec<String>,
        location: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        Self {
            thread_id,
            event: event.into(),
            proposed_dates,
            location: location.into(),
            info: info.into(),
            confirmed_dates: Vec::new(),
            status: Status::Pending,
        }
    }

    /// The entries selected by `indices`, in proposal order.
    ///
    /// Duplicate and out-of-range indices are dropped; click order is irrelevant.
    pub fn select_proposed(&self, indices: &[usize]) -> Vec<String> {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.proposed_dates.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
            .into_iter()
            .map(|i| self.proposed_dates[i].clone())
            .collect()
    }

    /// The dates shown in announcements for the current status.
    pub fn announced_dates(&self) -> &[String] {
        match self.status {
            Status::Accepted => &self.confirmed_dates,
            Status::Pending | Status::Rejected => &self.proposed_dates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PerformanceRecord {
        PerformanceRecord::proposed(
            42,
            "Welcome Tea",
            vec!["A".into(), "B".into(), "C".into()],
            "Hall",
            "",
        )
    }

    #[test]
    fn status_cells_round_trip() {
        for status in [Status::Pending, Status::Accepted, Status::Rejected] {
            assert_eq!(Status::from_cell(status.as_cell()), Some(status));
        }
        assert_eq!(Status::from_cell(" accepted "), Some(Status::Accepted));
        assert_eq!(Status::from_cell("MAYBE"), None);
    }

    #[test]
    fn rejected_records_have_no_modifiable_fields() {
        assert!(Status::Rejected.modifiable_fields().is_empty());
        assert!(Status::Pending.modifiable_fields().contains(&Field::ProposedDates));
        assert!(!Status::Pending.modifiable_fields().contains(&Field::Status));
        assert!(Status::Accepted.modifiable_fields().contains(&Field::ConfirmedDates));
        assert!(!Status::Accepted.modifiable_fields().contains(&Field::ProposedDates));
    }

    #[test]
    fn selection_follows_proposal_order() {
        let record = sample();
        assert_eq!(record.select_proposed(&[2, 0]), vec!["A", "C"]);
        assert_eq!(record.select_proposed(&[1, 1, 7]), vec!["B"]);
        assert!(record.select_proposed(&[]).is_empty());
    }

    #[test]
    fn field_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("PROPOSED DATE | TIME"), None);
    }
}
