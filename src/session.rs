//! Conversation state held between chat events.
//!
//! One [`ThreadState`] per discussion topic, created on first touch and
//! dropped when the topic reaches a terminal state or is deleted.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Field, MessageId, PollRef, ThreadId, UserId};
use crate::polls::PollRegistry;

/// What the next input in a thread is expected to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    /// The full `Event // Date // Location // Info` line.
    AwaitingFullInput,

    /// Just the dates, after a proposal whose dates did not parse.
    AwaitingDateRetry {
        event: String,
        location: String,
        info: String,
    },

    /// A new text value for one field.
    AwaitingModifyValue { field: Field },

    /// Toggling proposed dates on a selection prompt.
    SelectingDates {
        purpose: SelectionPurpose,
        selected: BTreeSet<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPurpose {
    /// Confirming a pending performance.
    Accept,

    /// Changing the confirmed dates of an accepted one.
    Reconfirm,
}

/// Pending input and the member it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub by: UserId,
    pub input: PendingInput,
}

/// The bot's latest complaint and the input that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPair {
    pub error: MessageId,
    pub input: Option<MessageId>,
}

#[derive(Debug, Default)]
pub struct ThreadState {
    pub pending: Option<Pending>,

    /// The pinned opportunity or summary announcement.
    pub summary: Option<MessageId>,

    pub interest_poll: Option<PollRef>,
    pub last_error: Option<ErrorPair>,

    /// Prompts still on screen, removed when their step ends.
    pub prompts: Vec<MessageId>,
}

impl ThreadState {
    /// Pending input, if it was started by `user`.
    pub fn pending_for(&self, user: UserId) -> Option<&PendingInput> {
        self.pending
            .as_ref()
            .filter(|p| p.by == user)
            .map(|p| &p.input)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    threads: HashMap<ThreadId, ThreadState>,

    /// Topics already offered the PERF / OTHERS choice.
    initialized: HashSet<ThreadId>,

    /// Topics marked OTHERS.
    ignored: HashSet<ThreadId>,

    pub polls: PollRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread(&mut self, thread_id: ThreadId) -> &mut ThreadState {
        self.threads.entry(thread_id).or_default()
    }

    pub fn get(&self, thread_id: ThreadId) -> Option<&ThreadState> {
        self.threads.get(&thread_id)
    }

    pub fn set_pending(&mut self, thread_id: ThreadId, by: UserId, input: PendingInput) {
        self.thread(thread_id).pending = Some(Pending { by, input });
    }

    pub fn clear_pending(&mut self, thread_id: ThreadId) -> Option<Pending> {
        self.threads.get_mut(&thread_id)?.pending.take()
    }

    pub fn take_prompts(&mut self, thread_id: ThreadId) -> Vec<MessageId> {
        self.threads
            .get_mut(&thread_id)
            .map(|t| std::mem::take(&mut t.prompts))
            .unwrap_or_default()
    }

    /// Records a topic as offered the PERF / OTHERS choice.
    /// Returns `false` if it already was.
    pub fn mark_initialized(&mut self, thread_id: ThreadId) -> bool {
        self.initialized.insert(thread_id)
    }

    pub fn ignore(&mut self, thread_id: ThreadId) {
        self.ignored.insert(thread_id);
        self.threads.remove(&thread_id);
    }

    pub fn is_ignored(&self, thread_id: ThreadId) -> bool {
        self.ignored.contains(&thread_id)
    }

    /// Drops all state for a thread, including its polls and topic marks.
    pub fn dispose(&mut self, thread_id: ThreadId) -> Option<ThreadState> {
        self.polls.retire_thread(thread_id);
        self.initialized.remove(&thread_id);
        self.ignored.remove(&thread_id);
        self.threads.remove(&thread_id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}
