//! Free-text replies to the bot's prompts.

use jiff::Timestamp;
use tracing::debug;

use crate::lifecycle::{Lifecycle, ProposalInput, ProposeOutcome, Result};
use crate::model::{MessageId, ThreadId, UserId};
use crate::session::PendingInput;
use crate::storage::RecordStore;
use crate::transport::Transport;

use super::Bot;

impl<S: RecordStore + ?Sized, T: Transport + ?Sized> Bot<'_, S, T> {
    /// Feeds text to whatever the author's pending input in the thread is.
    /// Text nobody asked for is left alone.
    pub(super) fn on_text(
        &mut self,
        thread_id: ThreadId,
        user_id: UserId,
        message_id: MessageId,
        text: &str,
        now: Timestamp,
    ) {
        if self.config.is_exempt(thread_id) || self.session.is_ignored(thread_id) {
            return;
        }
        let Some(pending) = self
            .session
            .get(thread_id)
            .and_then(|t| t.pending_for(user_id))
            .cloned()
        else {
            return;
        };

        let mut lc = self.lifecycle(now);
        match pending {
            PendingInput::AwaitingFullInput => {
                let result = ProposalInput::parse(text)
                    .and_then(|input| lc.propose(thread_id, user_id, input));
                finish_proposal(&mut lc, thread_id, message_id, result);
            }
            PendingInput::AwaitingDateRetry { .. } => {
                let result = lc.retry_dates(thread_id, text);
                finish_proposal(&mut lc, thread_id, message_id, result);
            }
            PendingInput::AwaitingModifyValue { field } => {
                match lc.modify_field(thread_id, field, text) {
                    Ok(_) => {
                        lc.session().clear_pending(thread_id);
                        lc.dismiss_prompts(thread_id);
                        lc.clear_error(thread_id);
                    }
                    Err(e) => lc.report(thread_id, Some(message_id), &e),
                }
            }
            PendingInput::SelectingDates { .. } => {
                debug!(thread_id, "text ignored during date selection");
            }
        }
    }
}

fn finish_proposal<S: RecordStore + ?Sized, T: Transport + ?Sized>(
    lc: &mut Lifecycle<'_, S, T>,
    thread_id: ThreadId,
    message_id: MessageId,
    result: Result<ProposeOutcome>,
) {
    match result {
        Ok(ProposeOutcome::Announced(_)) => {
            lc.clear_error(thread_id);
            lc.dismiss_prompts(thread_id);
        }
        Ok(ProposeOutcome::AwaitingDateRetry { error, .. }) => {
            lc.replace_error(thread_id, Some(message_id), &error.hint());
        }
        Err(e) => lc.report(thread_id, Some(message_id), &e),
    }
}
