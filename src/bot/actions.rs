//! Button payloads.
//!
//! Every inline button carries a `|`-separated payload naming the action and
//! the thread it belongs to, e.g. `confirm|812|accept` or `date|812|2`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::{Field, ThreadId};
use crate::transport::Button;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Perf,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Accept,
    Reject,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePick {
    /// Flip one proposed date in or out of the selection.
    Toggle(usize),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChoice {
    Rejected,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Topic {
        thread_id: ThreadId,
        kind: TopicKind,
    },
    Confirm {
        thread_id: ThreadId,
        choice: ConfirmChoice,
    },
    Date {
        thread_id: ThreadId,
        pick: DatePick,
    },
    /// `None` cancels the modify flow.
    Modify {
        thread_id: ThreadId,
        field: Option<Field>,
    },
    Status {
        thread_id: ThreadId,
        choice: StatusChoice,
    },
}

impl ButtonAction {
    pub fn thread_id(self) -> ThreadId {
        match self {
            Self::Topic { thread_id, .. }
            | Self::Confirm { thread_id, .. }
            | Self::Date { thread_id, .. }
            | Self::Modify { thread_id, .. }
            | Self::Status { thread_id, .. } => thread_id,
        }
    }

    pub fn button(self, label: impl Into<String>) -> Button {
        Button::new(label, self.to_string())
    }

    /// Reads a payload back. Unknown payloads are `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split('|');
        let action = parts.next()?;
        let thread_id: ThreadId = parts.next()?.parse().ok()?;
        let arg = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let action = match action {
            "topic" => Self::Topic {
                thread_id,
                kind: match arg {
                    "perf" => TopicKind::Perf,
                    "others" => TopicKind::Others,
                    _ => return None,
                },
            },
            "confirm" => Self::Confirm {
                thread_id,
                choice: match arg {
                    "accept" => ConfirmChoice::Accept,
                    "reject" => ConfirmChoice::Reject,
                    "cancel" => ConfirmChoice::Cancel,
                    _ => return None,
                },
            },
            "date" => Self::Date {
                thread_id,
                pick: match arg {
                    "done" => DatePick::Done,
                    index => DatePick::Toggle(index.parse().ok()?),
                },
            },
            "modify" => Self::Modify {
                thread_id,
                field: match arg {
                    "cancel" => None,
                    key => Some(Field::from_key(key)?),
                },
            },
            "status" => Self::Status {
                thread_id,
                choice: match arg {
                    "rejected" => StatusChoice::Rejected,
                    "cancel" => StatusChoice::Cancel,
                    _ => return None,
                },
            },
            _ => return None,
        };
        Some(action)
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Topic { thread_id, kind } => {
                let kind = match kind {
                    TopicKind::Perf => "perf",
                    TopicKind::Others => "others",
                };
                write!(f, "topic|{thread_id}|{kind}")
            }
            Self::Confirm { thread_id, choice } => {
                let choice = match choice {
                    ConfirmChoice::Accept => "accept",
                    ConfirmChoice::Reject => "reject",
                    ConfirmChoice::Cancel => "cancel",
                };
                write!(f, "confirm|{thread_id}|{choice}")
            }
            Self::Date {
                thread_id,
                pick: DatePick::Toggle(index),
            } => write!(f, "date|{thread_id}|{index}"),
            Self::Date {
                thread_id,
                pick: DatePick::Done,
            } => write!(f, "date|{thread_id}|done"),
            Self::Modify { thread_id, field } => {
                write!(f, "modify|{thread_id}|{}", field.map_or("cancel", Field::key))
            }
            Self::Status { thread_id, choice } => {
                let choice = match choice {
                    StatusChoice::Rejected => "rejected",
                    StatusChoice::Cancel => "cancel",
                };
                write!(f, "status|{thread_id}|{choice}")
            }
        }
    }
}

/// One toggle button per proposed date, then the confirm button.
///
/// Selected dates are ticked. Dates with interest-poll votes show the count.
pub fn date_buttons(
    thread_id: ThreadId,
    dates: &[String],
    selected: &BTreeSet<usize>,
    interest: &BTreeMap<String, usize>,
) -> Vec<Button> {
    let mut buttons: Vec<Button> = dates
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let mut label = if selected.contains(&i) {
                format!("✅ {date}")
            } else {
                date.clone()
            };
            if let Some(&n) = interest.get(date).filter(|&&n| n > 0) {
                label.push_str(&format!(" ({n} interested)"));
            }
            ButtonAction::Date {
                thread_id,
                pick: DatePick::Toggle(i),
            }
            .button(label)
        })
        .collect();
    buttons.push(
        ButtonAction::Date {
            thread_id,
            pick: DatePick::Done,
        }
        .button("✅ Confirm Selection"),
    );
    buttons
}
