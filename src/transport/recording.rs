//! In-memory transport for tests: records every call, fails on demand.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::model::{MessageId, PollRef, ThreadId, UserId};

use super::{Button, Outbound, PollRequest, Result, Role, Transport, TransportError};

/// Which call to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    SendMessage,
    SendPrompt,
    EditButtons,
    DeleteMessage,
    PinMessage,
    UnpinMessage,
    SendPoll,
    DeleteTopic,
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: RefCell<Vec<Outbound>>,
    failing: RefCell<HashSet<Call>>,
    next_id: Cell<MessageId>,
    admins: Vec<UserId>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_admins(vec![])
    }

    pub fn with_admins(admins: Vec<UserId>) -> Self {
        Self {
            next_id: Cell::new(100),
            admins,
            ..Self::default()
        }
    }

    pub fn fail(&self, call: Call) {
        self.failing.borrow_mut().insert(call);
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.borrow().clone()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }

    /// Texts of plain messages, in send order.
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|o| match o {
                Outbound::SendMessage { text, .. } | Outbound::SendPrompt { text, .. } => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn polls(&self) -> Vec<PollRequest> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|o| match o {
                Outbound::SendPoll { poll, .. } => Some(poll.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|o| match o {
                Outbound::DeleteMessage { message_id, .. } => Some(*message_id),
                _ => None,
            })
            .collect()
    }

    /// The buttons of the most recent prompt.
    pub fn last_buttons(&self) -> Vec<Button> {
        self.sent
            .borrow()
            .iter()
            .rev()
            .find_map(|o| match o {
                Outbound::SendPrompt { buttons, .. } | Outbound::EditButtons { buttons, .. } => {
                    Some(buttons.clone())
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    fn check(&self, call: Call) -> Result<()> {
        if self.failing.borrow().contains(&call) {
            return Err(TransportError::Rejected(format!("{call:?} failed")));
        }
        Ok(())
    }

    fn record(&self, call: Call, action: Outbound) -> Result<()> {
        self.check(call)?;
        self.sent.borrow_mut().push(action);
        Ok(())
    }

    fn allocate(&self) -> MessageId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl Transport for RecordingTransport {
    fn send_message(&self, thread_id: ThreadId, text: &str) -> Result<MessageId> {
        self.check(Call::SendMessage)?;
        let message_id = self.allocate();
        self.record(
            Call::SendMessage,
            Outbound::SendMessage {
                thread_id,
                message_id,
                text: text.to_string(),
            },
        )?;
        Ok(message_id)
    }

    fn send_prompt(
        &self,
        thread_id: ThreadId,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageId> {
        self.check(Call::SendPrompt)?;
        let message_id = self.allocate();
        self.record(
            Call::SendPrompt,
            Outbound::SendPrompt {
                thread_id,
                message_id,
                text: text.to_string(),
                buttons: buttons.to_vec(),
            },
        )?;
        Ok(message_id)
    }

    fn edit_buttons(
        &self,
        thread_id: ThreadId,
        message_id: MessageId,
        buttons: &[Button],
    ) -> Result<()> {
        self.record(
            Call::EditButtons,
            Outbound::EditButtons {
                thread_id,
                message_id,
                buttons: buttons.to_vec(),
            },
        )
    }

    fn delete_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.record(
            Call::DeleteMessage,
            Outbound::DeleteMessage {
                thread_id,
                message_id,
            },
        )
    }

    fn pin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.record(
            Call::PinMessage,
            Outbound::PinMessage {
                thread_id,
                message_id,
            },
        )
    }

    fn unpin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.record(
            Call::UnpinMessage,
            Outbound::UnpinMessage {
                thread_id,
                message_id,
            },
        )
    }

    fn send_poll(&self, thread_id: ThreadId, poll: &PollRequest) -> Result<PollRef> {
        self.check(Call::SendPoll)?;
        let message_id = self.allocate();
        let poll_id = format!("poll-{message_id}");
        self.record(
            Call::SendPoll,
            Outbound::SendPoll {
                thread_id,
                message_id,
                poll_id: poll_id.clone(),
                poll: poll.clone(),
            },
        )?;
        Ok(PollRef {
            message_id,
            poll_id,
        })
    }

    fn delete_topic(&self, thread_id: ThreadId) -> Result<()> {
        self.record(Call::DeleteTopic, Outbound::DeleteTopic { thread_id })
    }

    fn member_role(&self, user_id: UserId) -> Result<Role> {
        Ok(if self.admins.contains(&user_id) {
            Role::Administrator
        } else {
            Role::Member
        })
    }
}
