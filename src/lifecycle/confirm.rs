//! Accepting and rejecting performances.

use jiff::SignedDuration;
use tracing::info;

use crate::format;
use crate::model::{PerformanceRecord, Status, ThreadId};
use crate::schedule::Task;
use crate::storage::{Column, RecordStore, join_dates};
use crate::transport::Transport;

use super::{Lifecycle, LifecycleError, Result, ensure_canonical_dates};

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Lifecycle<'_, S, T> {
    /// Accepts a pending performance on the selected proposed dates.
    ///
    /// Selection order is ignored; confirmed dates keep proposal order.
    pub fn accept(&mut self, thread_id: ThreadId, selected: &[usize]) -> Result<PerformanceRecord> {
        let (row, mut record) = self.find(thread_id)?;
        match record.status {
            Status::Pending => {}
            Status::Rejected => return Err(LifecycleError::RecordImmutable(thread_id)),
            Status::Accepted => {
                return Err(LifecycleError::InvalidTransition {
                    from: record.status,
                    to: Status::Accepted,
                });
            }
        }

        ensure_canonical_dates(&record)?;
        let confirmed = record.select_proposed(selected);
        if confirmed.is_empty() {
            return Err(LifecycleError::NoDateSelected);
        }

        self.store
            .update_cell(row, Column::ConfirmedDates, &join_dates(&confirmed))?;
        self.store
            .update_cell(row, Column::Status, Status::Accepted.as_cell())?;
        record.confirmed_dates = confirmed;
        record.status = Status::Accepted;
        info!(thread_id, dates = ?record.confirmed_dates, "performance accepted");

        self.retire_interest_poll(thread_id);
        self.announce(&record);
        Ok(record)
    }

    /// Rejects a pending or accepted performance and schedules its topic
    /// for deletion.
    ///
    /// Confirmed dates are cleared before the status is written, so a failed
    /// write leaves a record that can still be rejected again.
    pub fn reject(&mut self, thread_id: ThreadId) -> Result<PerformanceRecord> {
        let (row, mut record) = self.find(thread_id)?;
        if record.status == Status::Rejected {
            return Err(LifecycleError::RecordImmutable(thread_id));
        }

        if !record.confirmed_dates.is_empty() {
            self.store.update_cell(row, Column::ConfirmedDates, "")?;
        }
        self.store
            .update_cell(row, Column::Status, Status::Rejected.as_cell())?;
        record.status = Status::Rejected;
        record.confirmed_dates.clear();
        info!(thread_id, "performance rejected");

        self.retire_interest_poll(thread_id);
        self.session.clear_pending(thread_id);
        self.dismiss_prompts(thread_id);
        self.say(thread_id, format::REJECTED_NOTICE);

        let delay = SignedDuration::from_secs(
            i64::try_from(self.config.topic_delete_delay_secs).unwrap_or(i64::MAX),
        );
        let at = self.now.checked_add(delay).unwrap_or(self.now);
        self.scheduler
            .schedule(at, Task::DeleteTopic { thread_id });
        Ok(record)
    }
}
