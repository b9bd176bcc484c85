//! Field edits, date re-selection and the performance reminder.

use tracing::info;

use crate::datetime::to_strings;
use crate::format;
use crate::model::{Field, PerformanceRecord, Status, ThreadId};
use crate::storage::{Column, RecordStore, join_dates};
use crate::transport::Transport;

use super::{Lifecycle, LifecycleError, Result, ensure_canonical_dates};

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Lifecycle<'_, S, T> {
    /// Sets one field from typed text.
    ///
    /// Date fields must parse in full or nothing is written. Setting STATUS
    /// is only a way to reject.
    pub fn modify_field(
        &mut self,
        thread_id: ThreadId,
        field: Field,
        value: &str,
    ) -> Result<PerformanceRecord> {
        let (row, mut record) = self.find(thread_id)?;
        if record.status == Status::Rejected {
            return Err(LifecycleError::RecordImmutable(thread_id));
        }
        if !record.status.modifiable_fields().contains(&field) {
            return Err(LifecycleError::FieldNotModifiableInState {
                field,
                status: record.status,
            });
        }

        let value = value.trim();
        match field {
            Field::Status => {
                if !value.eq_ignore_ascii_case(Status::Rejected.as_cell()) {
                    return Err(LifecycleError::InvalidStatusValue(value.to_string()));
                }
                return self.reject(thread_id);
            }
            Field::ProposedDates | Field::ConfirmedDates => {
                let dates = to_strings(&self.parser().parse_and_format(value)?);
                self.store
                    .update_cell(row, Column::from(field), &join_dates(&dates))?;
                if field == Field::ProposedDates {
                    record.proposed_dates = dates;
                } else {
                    record.confirmed_dates = dates;
                }
            }
            Field::Event | Field::Location | Field::Info => {
                self.store.update_cell(row, Column::from(field), value)?;
                let slot = match field {
                    Field::Event => &mut record.event,
                    Field::Location => &mut record.location,
                    _ => &mut record.info,
                };
                *slot = value.to_string();
            }
        }
        info!(thread_id, field = field.key(), "field modified");

        self.announce(&record);
        if field == Field::ProposedDates {
            self.refresh_interest_poll(&record);
        }
        Ok(record)
    }

    /// Picks new confirmed dates from the proposed ones.
    pub fn reselect_confirmed(
        &mut self,
        thread_id: ThreadId,
        selected: &[usize],
    ) -> Result<PerformanceRecord> {
        let (row, mut record) = self.find(thread_id)?;
        match record.status {
            Status::Accepted => {}
            Status::Rejected => return Err(LifecycleError::RecordImmutable(thread_id)),
            Status::Pending => {
                return Err(LifecycleError::FieldNotModifiableInState {
                    field: Field::ConfirmedDates,
                    status: record.status,
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
        record.confirmed_dates = confirmed;
        info!(thread_id, dates = ?record.confirmed_dates, "confirmed dates reselected");

        self.announce(&record);
        Ok(record)
    }

    /// Posts the pre-show reminder. Read-only.
    pub fn remind(&self, thread_id: ThreadId) -> Result<()> {
        let (_, record) = self.find(thread_id)?;
        let text = if record.status == Status::Accepted {
            format::performance_reminder(&record)
        } else {
            format::REMIND_NOT_CONFIRMED.to_string()
        };
        self.say(thread_id, &text);
        Ok(())
    }
}
