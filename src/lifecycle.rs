//! The performance lifecycle.
//!
//! A record starts PENDING when proposed and ends ACCEPTED or REJECTED:
//!
//! ```text
//! PENDING ──accept──▶ ACCEPTED
//!    │                   │
//!    └──reject──▶ REJECTED ◀──reject
//! ```
//!
//! REJECTED is terminal. Every operation reads the record from the store,
//! validates, writes, and only then touches the chat. Chat failures are
//! logged and never undo a write. Store failures abort before any write.

mod confirm;
mod modify;
mod propose;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use tracing::{debug, warn};

use crate::config::Config;
use crate::datetime::{CanonicalDateTime, DateParser, DateTimeError};
use crate::format;
use crate::model::{Field, InterestPoll, MessageId, PerformanceRecord, Status, ThreadId};
use crate::schedule::Scheduler;
use crate::session::{ErrorPair, Session};
use crate::storage::{RecordStore, StorageError, find_record};
use crate::transport::{self, Button, PollRequest, Transport};

pub use propose::{ProposalInput, ProposeOutcome};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    InvalidDateTimeFormat(#[from] DateTimeError),

    #[error("expected 'Event // Date // Location // Info'")]
    InvalidOpportunityFormat,

    #[error("no date selected")]
    NoDateSelected,

    #[error("thread {0} is not registered")]
    RecordNotFound(ThreadId),

    #[error("thread {0} is already registered")]
    AlreadyRegistered(ThreadId),

    #[error("thread {0} is rejected and can no longer change")]
    RecordImmutable(ThreadId),

    #[error("{} cannot be modified while {status}", field.label())]
    FieldNotModifiableInState { field: Field, status: Status },

    #[error("cannot go from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("status can only become REJECTED, got '{0}'")]
    InvalidStatusValue(String),

    #[error("no input is pending in thread {0}")]
    NoPendingInput(ThreadId),

    #[error("record store: {0}")]
    Store(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, LifecycleError>;

impl LifecycleError {
    /// Bad input the member can correct and resend.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateTimeFormat(_) | Self::InvalidOpportunityFormat | Self::NoDateSelected
        )
    }

    /// The message posted to the thread.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDateTimeFormat(e) => e.hint(),
            Self::InvalidOpportunityFormat => format::OPPORTUNITY_FORMAT_HINT.to_string(),
            Self::NoDateSelected => format::NO_DATE_SELECTED.to_string(),
            Self::RecordNotFound(_) => format::NOT_REGISTERED.to_string(),
            Self::AlreadyRegistered(_) => "❌ This thread is already registered.".to_string(),
            Self::RecordImmutable(_) => {
                "❌ This performance is already REJECTED. You cannot modify it.".to_string()
            }
            Self::FieldNotModifiableInState { field, status } => format!(
                "⛔ You can't modify *{}* in the current status (*{status}*).",
                field.label()
            ),
            Self::InvalidTransition { from, .. } => format::already_marked(*from),
            Self::InvalidStatusValue(_) => "⛔ STATUS can only be changed to *REJECTED*.".to_string(),
            Self::NoPendingInput(_) => "⚠️ Nothing is waiting for input here.".to_string(),
            Self::Store(e) => format!("❌ Failed to update: `{e}`"),
        }
    }
}

/// Logs a failed chat call and carries on.
pub(crate) fn best_effort<R>(
    what: &str,
    thread_id: ThreadId,
    result: transport::Result<R>,
) -> Option<R> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(thread_id, "{what} failed: {e}");
            None
        }
    }
}

/// Fails on the first proposed date that is not in canonical form, as
/// when a date retry is still outstanding.
pub(crate) fn ensure_canonical_dates(record: &PerformanceRecord) -> Result<()> {
    for date in &record.proposed_dates {
        date.parse::<CanonicalDateTime>()?;
    }
    Ok(())
}

/// One event's view of the lifecycle: collaborators plus the clock.
pub struct Lifecycle<'a, S: ?Sized, T: ?Sized> {
    store: &'a S,
    transport: &'a T,
    session: &'a mut Session,
    scheduler: &'a mut Scheduler,
    config: &'a Config,
    now: Timestamp,
}

impl<'a, S: RecordStore + ?Sized, T: Transport + ?Sized> Lifecycle<'a, S, T> {
    pub fn new(
        store: &'a S,
        transport: &'a T,
        session: &'a mut Session,
        scheduler: &'a mut Scheduler,
        config: &'a Config,
        now: Timestamp,
    ) -> Self {
        Self {
            store,
            transport,
            session,
            scheduler,
            config,
            now,
        }
    }

    pub fn session(&mut self) -> &mut Session {
        &mut *self.session
    }

    /// Dates without a year land in the current year of the group's offset.
    pub fn parser(&self) -> DateParser {
        let local = self.now.to_zoned(TimeZone::fixed(self.config.offset()));
        DateParser::new(local.year())
    }

    /// The record for a thread and its row index.
    pub fn find(&self, thread_id: ThreadId) -> Result<(usize, PerformanceRecord)> {
        find_record(self.store, thread_id)?.ok_or(LifecycleError::RecordNotFound(thread_id))
    }

    pub fn say(&self, thread_id: ThreadId, text: &str) -> Option<MessageId> {
        best_effort(
            "send message",
            thread_id,
            self.transport.send_message(thread_id, text),
        )
    }

    pub fn delete(&self, thread_id: ThreadId, message_id: MessageId) {
        best_effort(
            "delete message",
            thread_id,
            self.transport.delete_message(thread_id, message_id),
        );
    }

    /// Sends a prompt that is deleted when its step ends.
    pub fn prompt(
        &mut self,
        thread_id: ThreadId,
        text: &str,
        buttons: &[Button],
    ) -> Option<MessageId> {
        let message_id = best_effort(
            "send prompt",
            thread_id,
            self.transport.send_prompt(thread_id, text, buttons),
        )?;
        self.session.thread(thread_id).prompts.push(message_id);
        Some(message_id)
    }

    pub fn edit_buttons(&self, thread_id: ThreadId, message_id: MessageId, buttons: &[Button]) {
        best_effort(
            "edit buttons",
            thread_id,
            self.transport.edit_buttons(thread_id, message_id, buttons),
        );
    }

    /// Tells the thread what went wrong.
    ///
    /// Recoverable errors keep the pending input so the member can try
    /// again. Anything else ends the current step.
    pub fn report(&mut self, thread_id: ThreadId, input: Option<MessageId>, error: &LifecycleError) {
        if error.is_recoverable() {
            debug!(thread_id, %error, "asking for corrected input");
        } else {
            warn!(thread_id, %error, "operation failed");
            self.session.clear_pending(thread_id);
            self.dismiss_prompts(thread_id);
        }
        self.replace_error(thread_id, input, &error.user_message());
    }

    /// Posts `text` as the thread's only outstanding error.
    ///
    /// The previous error and the input that caused it are deleted first.
    pub fn replace_error(&mut self, thread_id: ThreadId, input: Option<MessageId>, text: &str) {
        self.clear_error(thread_id);
        if let Some(error) = self.say(thread_id, text) {
            self.session.thread(thread_id).last_error = Some(ErrorPair { error, input });
        }
    }

    pub fn clear_error(&mut self, thread_id: ThreadId) {
        let Some(pair) = self.session.thread(thread_id).last_error.take() else {
            return;
        };
        self.delete(thread_id, pair.error);
        if let Some(input) = pair.input {
            self.delete(thread_id, input);
        }
    }

    /// Deletes prompts still on screen in a thread.
    pub fn dismiss_prompts(&mut self, thread_id: ThreadId) {
        for message_id in self.session.take_prompts(thread_id) {
            self.delete(thread_id, message_id);
        }
    }

    /// Replaces the pinned announcement with one for `record`.
    fn announce(&mut self, record: &PerformanceRecord) {
        let thread_id = record.thread_id;
        if let Some(old) = self.session.thread(thread_id).summary.take() {
            best_effort(
                "unpin announcement",
                thread_id,
                self.transport.unpin_message(thread_id, old),
            );
            self.delete(thread_id, old);
        }

        let Some(message_id) = self.say(thread_id, &format::announcement(record)) else {
            return;
        };
        best_effort(
            "pin announcement",
            thread_id,
            self.transport.pin_message(thread_id, message_id),
        );
        self.session.thread(thread_id).summary = Some(message_id);
    }

    /// Replaces the thread's interest poll with one for the current dates.
    ///
    /// Finalized records and dates that are not all canonical get no poll.
    fn refresh_interest_poll(&mut self, record: &PerformanceRecord) {
        let thread_id = record.thread_id;
        if record.status != Status::Pending {
            debug!(thread_id, status = %record.status, "no interest poll for finalized record");
            return;
        }

        if let Some(old) = self.session.thread(thread_id).interest_poll.take() {
            self.session.polls.retire(&old.poll_id);
            self.delete(thread_id, old.message_id);
        }

        if let Err(e) = ensure_canonical_dates(record) {
            warn!(thread_id, "skipping interest poll: {e}");
            return;
        }
        let Some(poll) = InterestPoll::for_dates(thread_id, &record.proposed_dates) else {
            return;
        };

        let request = PollRequest {
            question: poll.question.clone(),
            options: poll.options.clone(),
            allows_multiple: poll.allows_multiple,
        };
        let Some(sent) = best_effort(
            "send interest poll",
            thread_id,
            self.transport.send_poll(thread_id, &request),
        ) else {
            return;
        };
        debug!(thread_id, poll_id = %sent.poll_id, "interest poll sent");
        self.session
            .polls
            .register_interest(sent.poll_id.clone(), poll);
        self.session.thread(thread_id).interest_poll = Some(sent);
    }

    /// Stops counting the thread's interest poll. The message stays.
    fn retire_interest_poll(&mut self, thread_id: ThreadId) {
        if let Some(old) = self.session.thread(thread_id).interest_poll.take() {
            self.session.polls.retire(&old.poll_id);
        }
    }

    /// Announcement plus interest poll, after a successful proposal.
    fn publish(&mut self, record: &PerformanceRecord) {
        self.announce(record);
        self.refresh_interest_poll(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::schedule::Task;
    use crate::session::PendingInput;
    use crate::storage::{Column, Row, Storage};
    use crate::transport::Outbound;
    use crate::transport::recording::{Call, RecordingTransport};

    const ADMIN: i64 = 1;
    const THREAD: ThreadId = 500;

    struct Harness {
        store: Storage,
        transport: RecordingTransport,
        session: Session,
        scheduler: Scheduler,
        config: Config,
        now: Timestamp,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Storage::open_in_memory().unwrap(),
                transport: RecordingTransport::with_admins(vec![ADMIN]),
                session: Session::new(),
                scheduler: Scheduler::new(),
                config: Config::default(),
                // Monday 2025-08-18 10:00 at +08:00.
                now: "2025-08-18T02:00:00Z".parse().unwrap(),
            }
        }

        fn lc(&mut self) -> Lifecycle<'_, Storage, RecordingTransport> {
            Lifecycle::new(
                &self.store,
                &self.transport,
                &mut self.session,
                &mut self.scheduler,
                &self.config,
                self.now,
            )
        }

        fn record(&self) -> PerformanceRecord {
            find_record(&self.store, THREAD).unwrap().unwrap().1
        }

        fn propose(&mut self, text: &str) -> ProposeOutcome {
            let input = ProposalInput::parse(text).unwrap();
            self.lc().propose(THREAD, ADMIN, input).unwrap()
        }

        fn interest_poll_id(&self) -> String {
            self.session
                .get(THREAD)
                .and_then(|t| t.interest_poll.clone())
                .unwrap()
                .poll_id
        }
    }

    #[test]
    fn proposal_with_valid_dates_is_announced_with_a_poll() {
        let mut h = Harness::new();

        let outcome = h.propose("Welcome Tea // 23aug 8pm, 24aug 9pm // Hall // Formal");

        let ProposeOutcome::Announced(record) = outcome else {
            panic!("expected announcement");
        };
        assert_eq!(
            record.proposed_dates,
            vec!["23 AUG 2025 | 8:00pm", "24 AUG 2025 | 9:00pm"]
        );
        assert_eq!(h.record(), record);
        assert_eq!(record.status, Status::Pending);

        let polls = h.transport.polls();
        assert_eq!(polls.len(), 1);
        assert!(polls[0].allows_multiple);
        assert_eq!(polls[0].options, record.proposed_dates);
        assert!(h.transport.messages()[0].contains("Performance Opportunity"));
        assert!(
            h.transport
                .sent()
                .iter()
                .any(|o| matches!(o, Outbound::PinMessage { .. }))
        );
        assert!(
            h.session
                .polls
                .interest_tally(&h.interest_poll_id())
                .is_some()
        );
    }

    #[test]
    fn proposal_with_bad_dates_keeps_the_raw_text() {
        let mut h = Harness::new();

        let outcome = h.propose("Gala // next friday // Hall");

        let ProposeOutcome::AwaitingDateRetry { record, error } = outcome else {
            panic!("expected retry");
        };
        assert_eq!(record.proposed_dates, vec!["next friday"]);
        assert_eq!(h.record().proposed_dates, vec!["next friday"]);
        assert_eq!(h.record().status, Status::Pending);
        assert!(matches!(error, DateTimeError::InvalidEntries { multiple: false, .. }));
        assert!(h.transport.polls().is_empty());
        assert_eq!(
            h.session.get(THREAD).unwrap().pending_for(ADMIN),
            Some(&PendingInput::AwaitingDateRetry {
                event: "Gala".into(),
                location: "Hall".into(),
                info: String::new(),
            })
        );
    }

    #[test]
    fn date_retry_loops_until_the_dates_parse() {
        let mut h = Harness::new();
        h.propose("Gala // next friday // Hall // Bring drums");

        let outcome = h.lc().retry_dates(THREAD, "still bad").unwrap();
        assert!(matches!(outcome, ProposeOutcome::AwaitingDateRetry { .. }));
        assert_eq!(h.record().proposed_dates, vec!["still bad"]);

        let outcome = h.lc().retry_dates(THREAD, "23aug 8pm").unwrap();
        let ProposeOutcome::Announced(record) = outcome else {
            panic!("expected announcement");
        };
        assert_eq!(record.proposed_dates, vec!["23 AUG 2025 | 8:00pm"]);
        assert_eq!(record.info, "Bring drums");
        assert_eq!(h.record(), record);
        assert!(h.session.get(THREAD).unwrap().pending.is_none());

        let polls = h.transport.polls();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].options, vec!["Yes", "No"]);
        assert_eq!(
            polls[0].question,
            "Are you interested in the performance on 23 AUG 2025 | 8:00pm?"
        );
    }

    #[test]
    fn retry_without_pending_input_fails() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");

        let err = h.lc().retry_dates(THREAD, "24aug").unwrap_err();
        assert!(matches!(err, LifecycleError::NoPendingInput(THREAD)));
    }

    #[test]
    fn proposing_twice_in_a_thread_fails() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");

        let input = ProposalInput::parse("Other // 24aug // Hall").unwrap();
        let err = h.lc().propose(THREAD, ADMIN, input).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyRegistered(THREAD)));
        assert_eq!(h.record().event, "Gala");
    }

    #[test]
    fn accept_keeps_proposal_order() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug, 24aug, 25aug // Hall");
        let poll_id = h.interest_poll_id();
        let first_summary = h.session.get(THREAD).unwrap().summary.unwrap();

        let record = h.lc().accept(THREAD, &[2, 0]).unwrap();

        assert_eq!(record.status, Status::Accepted);
        assert_eq!(record.confirmed_dates, vec!["23 AUG 2025", "25 AUG 2025"]);
        assert_eq!(h.record(), record);

        assert!(h.transport.deleted().contains(&first_summary));
        assert!(
            h.transport
                .messages()
                .last()
                .unwrap()
                .starts_with("📢 *Performance Summary*")
        );
        assert!(h.session.polls.interest_tally(&poll_id).is_none());
        assert_eq!(h.transport.polls().len(), 1);
    }

    #[test]
    fn accept_without_dates_is_recoverable() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug, 24aug // Hall");

        let err = h.lc().accept(THREAD, &[]).unwrap_err();

        assert!(matches!(err, LifecycleError::NoDateSelected));
        assert!(err.is_recoverable());
        assert_eq!(h.record().status, Status::Pending);
        assert!(h.record().confirmed_dates.is_empty());
    }

    #[test]
    fn accept_refuses_dates_that_never_parsed() {
        let mut h = Harness::new();
        h.propose("Gala // next friday // Hall");

        let err = h.lc().accept(THREAD, &[0]).unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::InvalidDateTimeFormat(DateTimeError::Unrecognized(ref entry))
                if entry == "next friday"
        ));
        assert!(err.is_recoverable());
        let record = h.record();
        assert_eq!(record.status, Status::Pending);
        assert!(record.confirmed_dates.is_empty());
    }

    #[test]
    fn accepting_twice_fails() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let err = h.lc().accept(THREAD, &[0]).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: Status::Accepted,
                to: Status::Accepted
            }
        ));
    }

    #[test]
    fn accept_then_reject_is_terminal() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let record = h.lc().reject(THREAD).unwrap();

        assert_eq!(record.status, Status::Rejected);
        assert!(record.confirmed_dates.is_empty());
        assert_eq!(h.record(), record);
        assert!(
            h.transport
                .messages()
                .contains(&format::REJECTED_NOTICE.to_string())
        );

        let err = h.lc().reject(THREAD).unwrap_err();
        assert!(matches!(err, LifecycleError::RecordImmutable(THREAD)));
        let err = h
            .lc()
            .modify_field(THREAD, Field::Event, "New name")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::RecordImmutable(THREAD)));
        assert_eq!(h.record().event, "Gala");
    }

    #[test]
    fn reject_schedules_topic_deletion() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");

        h.lc().reject(THREAD).unwrap();

        assert!(h.scheduler.take_due(h.now).is_empty());
        let later = h.now.checked_add(jiff::SignedDuration::from_secs(5)).unwrap();
        assert_eq!(
            h.scheduler.take_due(later),
            vec![Task::DeleteTopic { thread_id: THREAD }]
        );
    }

    /// Refuses writes to one column.
    struct LockedColumn<'a> {
        inner: &'a Storage,
        locked: Column,
    }

    impl RecordStore for LockedColumn<'_> {
        fn append_row(&self, row: &Row) -> crate::storage::Result<()> {
            self.inner.append_row(row)
        }

        fn rows(&self) -> crate::storage::Result<Vec<Row>> {
            self.inner.rows()
        }

        fn update_cell(
            &self,
            index: usize,
            column: Column,
            value: &str,
        ) -> crate::storage::Result<()> {
            if column == self.locked {
                return Err(StorageError::Corrupt(format!(
                    "{} is read-only",
                    column.header()
                )));
            }
            self.inner.update_cell(index, column, value)
        }
    }

    #[test]
    fn failed_reject_can_be_retried() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let store = LockedColumn {
            inner: &h.store,
            locked: Column::Status,
        };
        let err = Lifecycle::new(
            &store,
            &h.transport,
            &mut h.session,
            &mut h.scheduler,
            &h.config,
            h.now,
        )
        .reject(THREAD)
        .unwrap_err();

        assert!(matches!(err, LifecycleError::Store(_)));
        assert!(h.scheduler.next_due().is_none());
        let record = h.record();
        assert_eq!(record.status, Status::Accepted);
        assert!(record.confirmed_dates.is_empty());

        let record = h.lc().reject(THREAD).unwrap();
        assert_eq!(record.status, Status::Rejected);
        assert_eq!(h.scheduler.len(), 1);
    }

    #[test]
    fn reject_survives_a_failing_chat() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.transport.fail(Call::SendMessage);

        let record = h.lc().reject(THREAD).unwrap();

        assert_eq!(record.status, Status::Rejected);
        assert_eq!(h.record().status, Status::Rejected);
        assert_eq!(h.scheduler.len(), 1);
    }

    #[test]
    fn chat_failures_do_not_lose_the_proposal() {
        let mut h = Harness::new();
        h.transport.fail(Call::SendMessage);
        h.transport.fail(Call::SendPoll);

        let outcome = h.propose("Gala // 23aug // Hall");

        assert!(matches!(outcome, ProposeOutcome::Announced(_)));
        assert_eq!(h.record().proposed_dates, vec!["23 AUG 2025"]);
        assert!(h.session.get(THREAD).is_none_or(|t| t.summary.is_none()));
    }

    #[test]
    fn unknown_thread_is_not_found() {
        let mut h = Harness::new();

        assert!(matches!(
            h.lc().accept(THREAD, &[0]).unwrap_err(),
            LifecycleError::RecordNotFound(THREAD)
        ));
        assert!(matches!(
            h.lc().reject(THREAD).unwrap_err(),
            LifecycleError::RecordNotFound(THREAD)
        ));
        assert!(matches!(
            h.lc().modify_field(THREAD, Field::Info, "x").unwrap_err(),
            LifecycleError::RecordNotFound(THREAD)
        ));
        assert!(h.store.rows().unwrap().is_empty());
        assert!(h.transport.sent().is_empty());
    }

    #[test]
    fn fields_are_gated_by_status() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug, 24aug // Hall");

        for field in [Field::ConfirmedDates, Field::Status] {
            let err = h.lc().modify_field(THREAD, field, "x").unwrap_err();
            assert!(
                matches!(
                    err,
                    LifecycleError::FieldNotModifiableInState {
                        status: Status::Pending,
                        ..
                    }
                ),
                "{field:?}"
            );
        }

        h.lc().accept(THREAD, &[0]).unwrap();
        let err = h
            .lc()
            .modify_field(THREAD, Field::ProposedDates, "1sep")
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::FieldNotModifiableInState {
                field: Field::ProposedDates,
                status: Status::Accepted,
            }
        ));
    }

    #[test]
    fn bad_dates_in_a_modification_write_nothing() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.transport.clear();

        let err = h
            .lc()
            .modify_field(THREAD, Field::ProposedDates, "23aug, garbage")
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::InvalidDateTimeFormat(DateTimeError::InvalidEntries {
                multiple: true,
                ..
            })
        ));
        assert_eq!(h.record().proposed_dates, vec!["23 AUG 2025"]);
        assert!(h.transport.sent().is_empty());
    }

    #[test]
    fn modifying_proposed_dates_replaces_the_poll() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        let old = h
            .session
            .get(THREAD)
            .and_then(|t| t.interest_poll.clone())
            .unwrap();

        let record = h
            .lc()
            .modify_field(THREAD, Field::ProposedDates, "1sep 7pm, 2sep")
            .unwrap();

        assert_eq!(
            record.proposed_dates,
            vec!["01 SEP 2025 | 7:00pm", "02 SEP 2025"]
        );
        assert!(h.transport.deleted().contains(&old.message_id));
        assert!(h.session.polls.interest_tally(&old.poll_id).is_none());

        let polls = h.transport.polls();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[1].options, record.proposed_dates);
        assert_ne!(h.interest_poll_id(), old.poll_id);
    }

    #[test]
    fn modifying_text_fields_reannounces_without_a_new_poll() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");

        let record = h
            .lc()
            .modify_field(THREAD, Field::Location, "  Main Stage ")
            .unwrap();

        assert_eq!(record.location, "Main Stage");
        assert_eq!(h.record().location, "Main Stage");
        assert_eq!(h.transport.polls().len(), 1);
        assert!(h.transport.messages().last().unwrap().contains("• Main Stage"));
    }

    #[test]
    fn confirmed_dates_can_be_retyped_while_accepted() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug, 24aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let record = h
            .lc()
            .modify_field(THREAD, Field::ConfirmedDates, "24aug 1930")
            .unwrap();

        assert_eq!(record.confirmed_dates, vec!["24 AUG 2025 | 7:30pm"]);
        assert_eq!(record.status, Status::Accepted);
    }

    #[test]
    fn status_can_only_become_rejected() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let err = h
            .lc()
            .modify_field(THREAD, Field::Status, "PENDING")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidStatusValue(_)));

        let record = h
            .lc()
            .modify_field(THREAD, Field::Status, "rejected")
            .unwrap();
        assert_eq!(record.status, Status::Rejected);
        assert!(h.record().confirmed_dates.is_empty());
    }

    #[test]
    fn reselecting_confirmed_dates() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug, 24aug, 25aug // Hall");
        h.lc().accept(THREAD, &[0]).unwrap();

        let record = h.lc().reselect_confirmed(THREAD, &[2, 1]).unwrap();
        assert_eq!(record.confirmed_dates, vec!["24 AUG 2025", "25 AUG 2025"]);
        assert_eq!(h.record().confirmed_dates, record.confirmed_dates);

        assert!(matches!(
            h.lc().reselect_confirmed(THREAD, &[]).unwrap_err(),
            LifecycleError::NoDateSelected
        ));
    }

    #[test]
    fn reminder_only_after_confirmation() {
        let mut h = Harness::new();
        h.propose("Gala // 23aug // Hall");

        h.lc().remind(THREAD).unwrap();
        assert_eq!(
            h.transport.messages().last().unwrap(),
            format::REMIND_NOT_CONFIRMED
        );

        h.lc().accept(THREAD, &[0]).unwrap();
        h.lc().remind(THREAD).unwrap();
        assert!(
            h.transport
                .messages()
                .last()
                .unwrap()
                .starts_with("📢 *Performance Reminder*")
        );
    }

    #[test]
    fn only_the_latest_error_stays_on_screen() {
        let mut h = Harness::new();

        h.lc().replace_error(THREAD, Some(40), "first");
        let first = h.session.get(THREAD).unwrap().last_error.unwrap();
        h.lc().replace_error(THREAD, Some(41), "second");

        let deleted = h.transport.deleted();
        assert!(deleted.contains(&first.error));
        assert!(deleted.contains(&40));
        assert!(!deleted.contains(&41));
        assert_eq!(
            h.session.get(THREAD).unwrap().last_error.unwrap().input,
            Some(41)
        );
    }

    #[test]
    fn default_year_follows_the_group_offset() {
        let mut h = Harness::new();
        // 2025-12-31 20:00 UTC is already 2026 at +08:00.
        h.now = "2025-12-31T20:00:00Z".parse().unwrap();

        assert_eq!(h.lc().parser(), DateParser::new(2026));
    }
}
