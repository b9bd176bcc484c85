//! Poll types: interest polls for proposed dates, training attendance polls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{MessageId, PollId, ThreadId};

/// What a poll is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PollKind {
    /// Weekly practice attendance. Only "Yes" voters are tracked.
    Training,

    /// Which proposed dates members can attend.
    Interest,
}

/// A sent poll: its message in the chat and the transport's poll id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRef {
    pub message_id: MessageId,
    pub poll_id: PollId,
}

/// An interest poll built from a record's proposed dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestPoll {
    pub thread_id: ThreadId,
    pub question: String,
    pub options: Vec<String>,
    pub allows_multiple: bool,

    /// Option index to the proposed date it stands for.
    pub dates: BTreeMap<usize, String>,
}

impl InterestPoll {
    /// Builds the poll for a set of proposed dates.
    ///
    /// One date gives a yes/no poll where "Yes" maps to that date;
    /// several give a multi-select poll with one option per date.
    /// Returns `None` when there is nothing to ask about.
    pub fn for_dates(thread_id: ThreadId, dates: &[String]) -> Option<Self> {
        match dates {
            [] => None,
            [only] => Some(Self {
                thread_id,
                question: format!("Are you interested in the performance on {only}?"),
                options: vec!["Yes".into(), "No".into()],
                allows_multiple: false,
                dates: BTreeMap::from([(0, only.clone())]),
            }),
            many => Some(Self {
                thread_id,
                question: "Which dates are you interested in?".into(),
                options: many.to_vec(),
                allows_multiple: true,
                dates: many.iter().cloned().enumerate().collect(),
            }),
        }
    }

    pub fn date_for_option(&self, option: usize) -> Option<&str> {
        self.dates.get(&option).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_date_is_a_yes_no_poll() {
        let poll = InterestPoll::for_dates(7, &["23 AUG 2025 | 8:00pm".into()]).unwrap();
        assert_eq!(poll.options, vec!["Yes", "No"]);
        assert!(!poll.allows_multiple);
        assert_eq!(
            poll.question,
            "Are you interested in the performance on 23 AUG 2025 | 8:00pm?"
        );
        assert_eq!(poll.date_for_option(0), Some("23 AUG 2025 | 8:00pm"));
        assert_eq!(poll.date_for_option(1), None);
    }

    #[test]
    fn several_dates_are_a_multi_select_poll() {
        let dates = vec!["23 AUG 2025".to_string(), "24 AUG 2025".to_string()];
        let poll = InterestPoll::for_dates(7, &dates).unwrap();
        assert_eq!(poll.options, dates);
        assert!(poll.allows_multiple);
        assert_eq!(poll.date_for_option(1), Some("24 AUG 2025"));
    }

    #[test]
    fn no_dates_no_poll() {
        assert!(InterestPoll::for_dates(7, &[]).is_none());
    }
}
