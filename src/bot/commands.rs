//! Slash commands. All of them are admin only.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use tracing::{debug, error, info};

use crate::format;
use crate::lifecycle::{LifecycleError, best_effort};
use crate::model::{MessageId, Status, ThreadId, UserId};
use crate::schedule::Task;
use crate::storage::RecordStore;
use crate::training;
use crate::transport::{Button, Transport};

use super::Bot;
use super::actions::{ButtonAction, ConfirmChoice};

/// `/confirmation@encore_bot` → `confirmation`.
fn command_name(raw: &str) -> &str {
    let name = raw.trim().trim_start_matches('/');
    name.split('@').next().unwrap_or(name)
}

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Bot<'_, S, T> {
    pub(super) fn on_command(
        &mut self,
        thread_id: Option<ThreadId>,
        user_id: UserId,
        message_id: MessageId,
        raw_name: &str,
        now: Timestamp,
    ) {
        let name = command_name(raw_name);
        if !self.is_admin(user_id) {
            debug!(user_id, command = name, "command from non-admin deleted");
            if let Some(thread_id) = thread_id {
                self.delete_command(thread_id, message_id);
            }
            return;
        }
        let Some(thread_id) = thread_id else {
            debug!(command = name, "command outside a topic ignored");
            return;
        };

        match name {
            "threadid" => {
                self.lifecycle(now)
                    .say(thread_id, &format::thread_id_reply(thread_id));
            }
            "poll" => self.send_training_poll(thread_id, message_id, now),
            "confirmation" | "modify" | "cancel" | "remind"
                if self.config.is_exempt(thread_id) =>
            {
                debug!(thread_id, command = name, "exempt thread, command ignored");
            }
            "confirmation" => self.start_confirmation(thread_id, now),
            "modify" => self.start_modify(thread_id, now),
            "cancel" => {
                let mut lc = self.lifecycle(now);
                lc.session().clear_pending(thread_id);
                lc.dismiss_prompts(thread_id);
                lc.delete(thread_id, message_id);
            }
            "remind" => {
                let mut lc = self.lifecycle(now);
                if let Err(e) = lc.remind(thread_id) {
                    lc.report(thread_id, None, &e);
                }
            }
            other => debug!(thread_id, command = other, "unknown command"),
        }
    }

    fn delete_command(&self, thread_id: ThreadId, message_id: MessageId) {
        best_effort(
            "delete command",
            thread_id,
            self.transport.delete_message(thread_id, message_id),
        );
    }

    /// Offers ACCEPT / REJECT for a pending performance.
    fn start_confirmation(&mut self, thread_id: ThreadId, now: Timestamp) {
        let mut lc = self.lifecycle(now);
        let record = match lc.find(thread_id) {
            Ok((_, record)) => record,
            Err(e) => {
                lc.report(thread_id, None, &e);
                return;
            }
        };
        if record.status != Status::Pending {
            lc.say(thread_id, &format::already_marked(record.status));
            return;
        }

        let choice = |choice, label| ButtonAction::Confirm { thread_id, choice }.button(label);
        let buttons = [
            choice(ConfirmChoice::Accept, "✅ Accept"),
            choice(ConfirmChoice::Reject, "❌ Reject"),
            choice(ConfirmChoice::Cancel, "Cancel"),
        ];
        lc.dismiss_prompts(thread_id);
        lc.prompt(thread_id, format::CONFIRM_PROMPT, &buttons);
    }

    /// Lists the fields the record's status allows changing.
    fn start_modify(&mut self, thread_id: ThreadId, now: Timestamp) {
        let mut lc = self.lifecycle(now);
        let record = match lc.find(thread_id) {
            Ok((_, record)) => record,
            Err(e) => {
                lc.report(thread_id, None, &e);
                return;
            }
        };
        if record.status == Status::Rejected {
            lc.report(thread_id, None, &LifecycleError::RecordImmutable(thread_id));
            return;
        }

        let mut buttons: Vec<Button> = record
            .status
            .modifiable_fields()
            .iter()
            .map(|&field| {
                ButtonAction::Modify {
                    thread_id,
                    field: Some(field),
                }
                .button(field.label())
            })
            .collect();
        buttons.push(
            ButtonAction::Modify {
                thread_id,
                field: None,
            }
            .button("Cancel"),
        );
        lc.session().clear_pending(thread_id);
        lc.dismiss_prompts(thread_id);
        lc.prompt(thread_id, format::MODIFY_PROMPT, &buttons);
    }

    /// Posts the weekly training poll and schedules its reminder.
    ///
    /// Only allowed in the voting topic; elsewhere the command just vanishes.
    fn send_training_poll(&mut self, thread_id: ThreadId, message_id: MessageId, now: Timestamp) {
        self.delete_command(thread_id, message_id);
        if self.config.voting_thread_id != Some(thread_id) {
            debug!(thread_id, "training poll outside the voting thread");
            return;
        }

        let offset = self.config.offset();
        let today = now.to_zoned(TimeZone::fixed(offset)).date();
        let timing = training::next_weekday(today, self.config.training_weekday.into()).and_then(
            |date| {
                let at = training::next_reminder(
                    now,
                    offset,
                    self.config.reminder_weekday.into(),
                    self.config.reminder_time,
                )?;
                Ok((date, at))
            },
        );
        let (training_date, remind_at) = match timing {
            Ok(timing) => timing,
            Err(e) => {
                error!(thread_id, "cannot compute training dates: {e}");
                return;
            }
        };

        let Some(sent) = best_effort(
            "send training poll",
            thread_id,
            self.transport
                .send_poll(thread_id, &training::poll_request(training_date)),
        ) else {
            return;
        };
        let superseded = self
            .session
            .polls
            .register_training(sent.poll_id.clone(), thread_id);
        if !superseded.is_empty() {
            debug!(?superseded, "older training polls no longer counted");
        }

        let remind_on = remind_at.to_zoned(TimeZone::fixed(offset)).date();
        if remind_on > training_date {
            info!(
                thread_id,
                %training_date,
                "training poll sent, reminder would come after training"
            );
            return;
        }
        self.scheduler.schedule(
            remind_at,
            Task::TrainingReminder {
                thread_id,
                training_date,
                remind_on,
                poll_id: sent.poll_id,
            },
        );
        info!(thread_id, %training_date, %remind_at, "training poll sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_normalized() {
        assert_eq!(command_name("/modify"), "modify");
        assert_eq!(command_name("/poll@encore_bot"), "poll");
        assert_eq!(command_name("remind"), "remind");
    }
}
