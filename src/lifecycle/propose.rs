//! Proposals and date retries.

use tracing::{info, warn};

use crate::datetime::{DateTimeError, to_strings};
use crate::model::{PerformanceRecord, ThreadId, UserId};
use crate::session::PendingInput;
use crate::storage::{Column, RecordStore, Row, find_record, join_dates};
use crate::transport::Transport;

use super::{Lifecycle, LifecycleError, Result};

/// A proposal line: `Event // Date // Location // Info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalInput {
    pub event: String,
    pub dates: String,
    pub location: String,
    pub info: String,
}

impl ProposalInput {
    /// Splits on `//`. The first three parts are required; anything after
    /// the location is info.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split("//").map(str::trim).collect();
        if parts.len() < 3 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(LifecycleError::InvalidOpportunityFormat);
        }
        Ok(Self {
            event: parts[0].to_string(),
            dates: parts[1].to_string(),
            location: parts[2].to_string(),
            info: parts[3..].join(" // "),
        })
    }
}

#[derive(Debug)]
pub enum ProposeOutcome {
    /// Stored with canonical dates, announced and polled.
    Announced(PerformanceRecord),

    /// Stored with the raw date text; the dates are asked for again.
    AwaitingDateRetry {
        record: PerformanceRecord,
        error: DateTimeError,
    },
}

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Lifecycle<'_, S, T> {
    /// Records a new proposal for a thread.
    ///
    /// Unparsable dates do not lose the proposal: the row is written with
    /// the raw text and `author`'s next input in the thread is a date retry.
    pub fn propose(
        &mut self,
        thread_id: ThreadId,
        author: UserId,
        input: ProposalInput,
    ) -> Result<ProposeOutcome> {
        if find_record(self.store, thread_id)?.is_some() {
            return Err(LifecycleError::AlreadyRegistered(thread_id));
        }

        match self.parser().parse_and_format(&input.dates) {
            Ok(dates) => {
                let record = PerformanceRecord::proposed(
                    thread_id,
                    input.event,
                    to_strings(&dates),
                    input.location,
                    input.info,
                );
                self.store.append_row(&Row::from_record(&record))?;
                info!(thread_id, event = %record.event, "proposal recorded");

                self.session.clear_pending(thread_id);
                self.publish(&record);
                Ok(ProposeOutcome::Announced(record))
            }
            Err(error) => {
                let record = PerformanceRecord::proposed(
                    thread_id,
                    input.event.clone(),
                    vec![input.dates],
                    input.location.clone(),
                    input.info.clone(),
                );
                self.store.append_row(&Row::from_record(&record))?;
                warn!(thread_id, %error, "proposal recorded with unparsed dates");

                self.session.set_pending(
                    thread_id,
                    author,
                    PendingInput::AwaitingDateRetry {
                        event: input.event,
                        location: input.location,
                        info: input.info,
                    },
                );
                Ok(ProposeOutcome::AwaitingDateRetry { record, error })
            }
        }
    }

    /// Retries just the dates of a proposal.
    ///
    /// On failure the latest raw text replaces the stored dates and the
    /// retry stays pending. On success the buffered fields are written back
    /// and the proposal is published.
    pub fn retry_dates(&mut self, thread_id: ThreadId, raw: &str) -> Result<ProposeOutcome> {
        let Some(PendingInput::AwaitingDateRetry {
            event,
            location,
            info,
        }) = self
            .session
            .get(thread_id)
            .and_then(|t| t.pending.as_ref())
            .map(|p| p.input.clone())
        else {
            return Err(LifecycleError::NoPendingInput(thread_id));
        };

        let (row, record) = self.find(thread_id)?;
        let raw = raw.trim();

        let dates = match self.parser().parse_and_format(raw) {
            Ok(dates) => to_strings(&dates),
            Err(error) => {
                self.store.update_cell(row, Column::ProposedDates, raw)?;
                warn!(thread_id, %error, "date retry failed");
                let record = PerformanceRecord {
                    proposed_dates: vec![raw.to_string()],
                    ..record
                };
                return Ok(ProposeOutcome::AwaitingDateRetry { record, error });
            }
        };

        self.store.update_cell(row, Column::Event, &event)?;
        self.store
            .update_cell(row, Column::ProposedDates, &join_dates(&dates))?;
        self.store.update_cell(row, Column::Location, &location)?;
        self.store.update_cell(row, Column::Info, &info)?;
        let record = PerformanceRecord {
            event,
            proposed_dates: dates,
            location,
            info,
            ..record
        };
        info!(thread_id, "proposal dates corrected");

        self.session.clear_pending(thread_id);
        self.publish(&record);
        Ok(ProposeOutcome::Announced(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_line_splits_on_double_slash() {
        let input =
            ProposalInput::parse("NTU Welcome Tea // 23 JUN 2025 8:00pm // NYA // Formal wear")
                .unwrap();
        assert_eq!(input.event, "NTU Welcome Tea");
        assert_eq!(input.dates, "23 JUN 2025 8:00pm");
        assert_eq!(input.location, "NYA");
        assert_eq!(input.info, "Formal wear");
    }

    #[test]
    fn info_is_optional_and_keeps_extra_parts() {
        assert_eq!(ProposalInput::parse("A // 1jan // B").unwrap().info, "");
        assert_eq!(
            ProposalInput::parse("A // 1jan // B // x // y").unwrap().info,
            "x // y"
        );
    }

    #[test]
    fn missing_required_parts_are_rejected() {
        for text in ["A // 1jan", "A //  // B", " // 1jan // B", "just text"] {
            assert!(
                matches!(
                    ProposalInput::parse(text),
                    Err(LifecycleError::InvalidOpportunityFormat)
                ),
                "{text:?}"
            );
        }
    }
}
