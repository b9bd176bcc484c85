//! Poll registry and vote tabulation.
//!
//! Every poll the bot sends is registered under its transport-issued id with
//! its kind. Answers for unknown polls are ignored.
//!
//! The two kinds count differently:
//!
//! - Training polls keep the set of members who chose "Yes". Adding is
//!   idempotent and a later change of vote does not remove anyone.
//! - Interest polls keep each voter's full current selection, replaced
//!   wholesale on every answer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::model::{InterestPoll, PollId, PollKind, ThreadId, UserId};

/// Option index of "Yes" in a training poll.
pub const TRAINING_YES: usize = 0;

#[derive(Debug)]
enum Tally {
    Training {
        yes: BTreeSet<UserId>,
    },
    Interest {
        poll: InterestPoll,
        votes: HashMap<UserId, BTreeSet<usize>>,
    },
}

#[derive(Debug)]
struct Tracked {
    thread_id: ThreadId,
    tally: Tally,
}

#[derive(Debug, Default)]
pub struct PollRegistry {
    polls: HashMap<PollId, Tracked>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a training poll with an empty yes-set.
    ///
    /// Older training polls stop counting; their ids are returned.
    pub fn register_training(&mut self, poll_id: PollId, thread_id: ThreadId) -> Vec<PollId> {
        let superseded: Vec<PollId> = self
            .polls
            .iter()
            .filter(|(_, t)| matches!(t.tally, Tally::Training { .. }))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &superseded {
            self.polls.remove(id);
        }
        self.polls.insert(
            poll_id,
            Tracked {
                thread_id,
                tally: Tally::Training {
                    yes: BTreeSet::new(),
                },
            },
        );
        superseded
    }

    /// Registers an interest poll with no votes.
    pub fn register_interest(&mut self, poll_id: PollId, poll: InterestPoll) {
        self.polls.insert(
            poll_id,
            Tracked {
                thread_id: poll.thread_id,
                tally: Tally::Interest {
                    poll,
                    votes: HashMap::new(),
                },
            },
        );
    }

    /// Records an answer. Returns the poll's kind, or `None` if unknown.
    pub fn record_vote(
        &mut self,
        poll_id: &str,
        voter: UserId,
        options: &[usize],
    ) -> Option<PollKind> {
        let Some(tracked) = self.polls.get_mut(poll_id) else {
            warn!(poll_id, "answer for unknown poll");
            return None;
        };

        match &mut tracked.tally {
            Tally::Training { yes } => {
                if options.contains(&TRAINING_YES) && yes.insert(voter) {
                    debug!(poll_id, voter, "training yes vote");
                }
                Some(PollKind::Training)
            }
            Tally::Interest { votes, .. } => {
                votes.insert(voter, options.iter().copied().collect());
                debug!(poll_id, voter, ?options, "interest vote");
                Some(PollKind::Interest)
            }
        }
    }

    pub fn yes_voters(&self, poll_id: &str) -> Option<&BTreeSet<UserId>> {
        match &self.polls.get(poll_id)?.tally {
            Tally::Training { yes } => Some(yes),
            Tally::Interest { .. } => None,
        }
    }

    /// Interested voters per proposed date.
    pub fn interest_tally(&self, poll_id: &str) -> Option<BTreeMap<String, usize>> {
        let Tally::Interest { poll, votes } = &self.polls.get(poll_id)?.tally else {
            return None;
        };
        let mut tally: BTreeMap<String, usize> = poll
            .dates
            .values()
            .map(|d| (d.clone(), 0))
            .collect();
        for option in votes.values().flatten() {
            if let Some(date) = poll.date_for_option(*option) {
                *tally.entry(date.to_string()).or_default() += 1;
            }
        }
        Some(tally)
    }

    /// Forgets a poll and its votes.
    pub fn retire(&mut self, poll_id: &str) -> bool {
        self.polls.remove(poll_id).is_some()
    }

    /// Forgets every poll posted in a thread.
    pub fn retire_thread(&mut self, thread_id: ThreadId) {
        self.polls.retain(|_, t| t.thread_id != thread_id);
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }
}
