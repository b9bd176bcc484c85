//! Deferred actions: a cancellable delay queue.
//!
//! At most one task of each kind is queued per thread. Scheduling again
//! replaces the earlier task, so a stale reminder never fires after a newer
//! poll. The event loop drains due tasks and runs each once.

use std::collections::BTreeMap;

use jiff::Timestamp;
use jiff::civil::Date;
use tracing::debug;

use crate::model::{PollId, ThreadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Remove a rejected performance's topic.
    DeleteTopic { thread_id: ThreadId },

    /// Remind the voting topic about the upcoming training.
    TrainingReminder {
        thread_id: ThreadId,
        training_date: Date,
        /// Local date the reminder goes out.
        remind_on: Date,
        poll_id: PollId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskKind {
    DeleteTopic,
    TrainingReminder,
}

impl Task {
    pub fn thread_id(&self) -> ThreadId {
        match self {
            Self::DeleteTopic { thread_id } | Self::TrainingReminder { thread_id, .. } => {
                *thread_id
            }
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::DeleteTopic { .. } => TaskKind::DeleteTopic,
            Self::TrainingReminder { .. } => TaskKind::TrainingReminder,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BTreeMap<(ThreadId, TaskKind), (Timestamp, Task)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to run at `at`, returning the task it replaced.
    pub fn schedule(&mut self, at: Timestamp, task: Task) -> Option<Task> {
        let key = (task.thread_id(), task.kind());
        debug!(thread_id = key.0, kind = ?key.1, %at, "scheduled");
        self.queue.insert(key, (at, task)).map(|(_, old)| old)
    }

    /// Cancels everything queued for a thread.
    pub fn cancel_thread(&mut self, thread_id: ThreadId) -> Vec<Task> {
        let keys: Vec<_> = self
            .queue
            .keys()
            .filter(|(t, _)| *t == thread_id)
            .copied()
            .collect();
        keys.into_iter()
            .filter_map(|k| self.queue.remove(&k))
            .map(|(_, task)| task)
            .collect()
    }

    /// Removes and returns every task due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<Task> {
        let due: Vec<_> = self
            .queue
            .iter()
            .filter(|(_, (at, _))| *at <= now)
            .map(|(key, _)| *key)
            .collect();

        let mut tasks: Vec<(Timestamp, Task)> = due
            .into_iter()
            .filter_map(|k| self.queue.remove(&k))
            .collect();
        tasks.sort_by_key(|(at, _)| *at);
        tasks.into_iter().map(|(_, task)| task).collect()
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.queue.values().map(|(at, _)| *at).min()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
