//! Inline button presses.

use std::collections::BTreeSet;

use jiff::Timestamp;
use tracing::{debug, warn};

use crate::format;
use crate::lifecycle::{LifecycleError, ensure_canonical_dates};
use crate::model::{Field, MessageId, Status, ThreadId, UserId};
use crate::session::{Pending, PendingInput, SelectionPurpose};
use crate::storage::RecordStore;
use crate::transport::Transport;

use super::Bot;
use super::actions::{
    ButtonAction, ConfirmChoice, DatePick, StatusChoice, TopicKind, date_buttons,
};

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Bot<'_, S, T> {
    pub(super) fn on_button(
        &mut self,
        thread_id: ThreadId,
        user_id: UserId,
        message_id: MessageId,
        data: &str,
        now: Timestamp,
    ) {
        let Some(action) = ButtonAction::parse(data) else {
            warn!(thread_id, data, "unrecognized button payload");
            return;
        };
        if action.thread_id() != thread_id {
            warn!(thread_id, data, "button payload names another thread");
            return;
        }
        if !self.is_admin(user_id) {
            debug!(thread_id, user_id, "button press from non-admin ignored");
            return;
        }

        match action {
            ButtonAction::Topic { kind, .. } => self.classify_topic(thread_id, user_id, kind, now),
            ButtonAction::Confirm { choice, .. } => {
                self.on_confirm_choice(thread_id, user_id, choice, now);
            }
            ButtonAction::Date { pick, .. } => self.on_date_pick(thread_id, message_id, pick, now),
            ButtonAction::Modify { field, .. } => {
                self.on_modify_field(thread_id, user_id, field, now);
            }
            ButtonAction::Status { choice, .. } => {
                let mut lc = self.lifecycle(now);
                lc.dismiss_prompts(thread_id);
                let result = match choice {
                    StatusChoice::Rejected => lc
                        .modify_field(thread_id, Field::Status, Status::Rejected.as_cell())
                        .map(drop),
                    StatusChoice::Cancel => Ok(()),
                };
                if let Err(e) = result {
                    lc.report(thread_id, None, &e);
                }
            }
        }
    }

    fn classify_topic(
        &mut self,
        thread_id: ThreadId,
        user_id: UserId,
        kind: TopicKind,
        now: Timestamp,
    ) {
        let mut lc = self.lifecycle(now);
        lc.dismiss_prompts(thread_id);
        match kind {
            TopicKind::Perf => {
                lc.session()
                    .set_pending(thread_id, user_id, PendingInput::AwaitingFullInput);
                lc.prompt(thread_id, format::FULL_INPUT_PROMPT, &[]);
            }
            TopicKind::Others => {
                lc.session().ignore(thread_id);
                debug!(thread_id, "topic marked as others");
            }
        }
    }

    fn on_confirm_choice(
        &mut self,
        thread_id: ThreadId,
        user_id: UserId,
        choice: ConfirmChoice,
        now: Timestamp,
    ) {
        let interest = self.interest_counts(thread_id);
        let mut lc = self.lifecycle(now);
        lc.dismiss_prompts(thread_id);
        match choice {
            ConfirmChoice::Accept => {
                let record = match lc.find(thread_id) {
                    Ok((_, record)) => record,
                    Err(e) => return lc.report(thread_id, None, &e),
                };
                if record.status != Status::Pending {
                    lc.say(thread_id, &format::already_marked(record.status));
                    return;
                }
                if record.proposed_dates.is_empty() {
                    lc.say(thread_id, format::NO_PROPOSED_DATES);
                    return;
                }
                if let Err(e) = ensure_canonical_dates(&record) {
                    return lc.report(thread_id, None, &e);
                }
                let selected = BTreeSet::new();
                let buttons = date_buttons(thread_id, &record.proposed_dates, &selected, &interest);
                lc.session().set_pending(
                    thread_id,
                    user_id,
                    PendingInput::SelectingDates {
                        purpose: SelectionPurpose::Accept,
                        selected,
                    },
                );
                lc.prompt(thread_id, format::SELECT_DATES_PROMPT, &buttons);
            }
            ConfirmChoice::Reject => {
                if let Err(e) = lc.reject(thread_id) {
                    lc.report(thread_id, None, &e);
                }
            }
            ConfirmChoice::Cancel => {}
        }
    }

    /// Toggles a date on the selection prompt, or submits the selection.
    fn on_date_pick(
        &mut self,
        thread_id: ThreadId,
        message_id: MessageId,
        pick: DatePick,
        now: Timestamp,
    ) {
        let Some(Pending {
            by,
            input: PendingInput::SelectingDates { purpose, mut selected },
        }) = self.session.get(thread_id).and_then(|t| t.pending.clone())
        else {
            debug!(thread_id, "date button without an open selection");
            return;
        };
        let interest = match purpose {
            SelectionPurpose::Accept => self.interest_counts(thread_id),
            SelectionPurpose::Reconfirm => Default::default(),
        };
        let mut lc = self.lifecycle(now);

        match pick {
            DatePick::Toggle(index) => {
                let record = match lc.find(thread_id) {
                    Ok((_, record)) => record,
                    Err(e) => return lc.report(thread_id, None, &e),
                };
                if index >= record.proposed_dates.len() {
                    warn!(thread_id, index, "date index out of range");
                    return;
                }
                if !selected.remove(&index) {
                    selected.insert(index);
                }
                let buttons = date_buttons(thread_id, &record.proposed_dates, &selected, &interest);
                lc.session()
                    .set_pending(thread_id, by, PendingInput::SelectingDates { purpose, selected });
                lc.edit_buttons(thread_id, message_id, &buttons);
            }
            DatePick::Done => {
                let indices: Vec<usize> = selected.into_iter().collect();
                let result = match purpose {
                    SelectionPurpose::Accept => lc.accept(thread_id, &indices),
                    SelectionPurpose::Reconfirm => lc.reselect_confirmed(thread_id, &indices),
                };
                match result {
                    Ok(_) => {
                        lc.session().clear_pending(thread_id);
                        lc.dismiss_prompts(thread_id);
                        lc.clear_error(thread_id);
                    }
                    Err(e) => lc.report(thread_id, None, &e),
                }
            }
        }
    }

    fn on_modify_field(
        &mut self,
        thread_id: ThreadId,
        user_id: UserId,
        field: Option<Field>,
        now: Timestamp,
    ) {
        let mut lc = self.lifecycle(now);
        lc.dismiss_prompts(thread_id);
        let Some(field) = field else {
            lc.session().clear_pending(thread_id);
            return;
        };

        let record = match lc.find(thread_id) {
            Ok((_, record)) => record,
            Err(e) => return lc.report(thread_id, None, &e),
        };
        if record.status == Status::Rejected {
            return lc.report(thread_id, None, &LifecycleError::RecordImmutable(thread_id));
        }
        if !record.status.modifiable_fields().contains(&field) {
            let error = LifecycleError::FieldNotModifiableInState {
                field,
                status: record.status,
            };
            return lc.report(thread_id, None, &error);
        }

        match field {
            Field::Status => {
                let buttons = [
                    ButtonAction::Status {
                        thread_id,
                        choice: StatusChoice::Rejected,
                    }
                    .button(Status::Rejected.as_cell()),
                    ButtonAction::Status {
                        thread_id,
                        choice: StatusChoice::Cancel,
                    }
                    .button("Cancel"),
                ];
                lc.prompt(thread_id, format::STATUS_PROMPT, &buttons);
            }
            Field::ConfirmedDates => {
                if record.proposed_dates.is_empty() {
                    lc.say(thread_id, format::NO_PROPOSED_DATES);
                    return;
                }
                if let Err(e) = ensure_canonical_dates(&record) {
                    return lc.report(thread_id, None, &e);
                }
                let selected: BTreeSet<usize> = record
                    .proposed_dates
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| record.confirmed_dates.contains(*d))
                    .map(|(i, _)| i)
                    .collect();
                let buttons = date_buttons(
                    thread_id,
                    &record.proposed_dates,
                    &selected,
                    &Default::default(),
                );
                lc.session().set_pending(
                    thread_id,
                    user_id,
                    PendingInput::SelectingDates {
                        purpose: SelectionPurpose::Reconfirm,
                        selected,
                    },
                );
                lc.prompt(thread_id, format::RESELECT_DATES_PROMPT, &buttons);
            }
            _ => {
                lc.session()
                    .set_pending(thread_id, user_id, PendingInput::AwaitingModifyValue { field });
                lc.prompt(thread_id, &format::modify_value_prompt(field.label()), &[]);
            }
        }
    }
}
