//! The chat transport: everything the bot says or does in the group.
//!
//! Outbound calls are best-effort. Callers log failures and carry on; a
//! failed delete or pin never undoes a record change that already landed.

#[cfg(test)]
pub mod recording;

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{MessageId, PollRef, ThreadId, UserId};

/// Errors from outbound chat calls.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode outbound action: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("rejected by chat platform: {0}")]
    Rejected(String),
}

pub type Result<T> = core::result::Result<T, TransportError>;

/// An inline button. `data` comes back verbatim in a button event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// A poll to send. Votes are never anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub allows_multiple: bool,
}

/// A member's standing in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Administrator,
    Member,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// Outbound operations against the chat venue.
pub trait Transport {
    fn send_message(&self, thread_id: ThreadId, text: &str) -> Result<MessageId>;

    /// Sends a message with one button per row.
    fn send_prompt(&self, thread_id: ThreadId, text: &str, buttons: &[Button])
    -> Result<MessageId>;

    /// Replaces the buttons under an existing prompt.
    fn edit_buttons(&self, thread_id: ThreadId, message_id: MessageId, buttons: &[Button])
    -> Result<()>;

    fn delete_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()>;

    /// Pins without notifying members.
    fn pin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()>;

    fn unpin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()>;

    fn send_poll(&self, thread_id: ThreadId, poll: &PollRequest) -> Result<PollRef>;

    /// Deletes a whole discussion topic.
    fn delete_topic(&self, thread_id: ThreadId) -> Result<()>;

    fn member_role(&self, user_id: UserId) -> Result<Role>;
}

/// One outbound action, as written by [`ConsoleTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outbound {
    SendMessage {
        thread_id: ThreadId,
        message_id: MessageId,
        text: String,
    },
    SendPrompt {
        thread_id: ThreadId,
        message_id: MessageId,
        text: String,
        buttons: Vec<Button>,
    },
    EditButtons {
        thread_id: ThreadId,
        message_id: MessageId,
        buttons: Vec<Button>,
    },
    DeleteMessage {
        thread_id: ThreadId,
        message_id: MessageId,
    },
    PinMessage {
        thread_id: ThreadId,
        message_id: MessageId,
    },
    UnpinMessage {
        thread_id: ThreadId,
        message_id: MessageId,
    },
    SendPoll {
        thread_id: ThreadId,
        message_id: MessageId,
        poll_id: String,
        #[serde(flatten)]
        poll: PollRequest,
    },
    DeleteTopic {
        thread_id: ThreadId,
    },
}

/// Writes each outbound action as one JSON line.
///
/// Message ids are allocated sequentially from 1; poll ids are random UUIDs.
/// The configured admins are the only members reported as admins.
pub struct ConsoleTransport<W: Write> {
    out: RefCell<W>,
    next_message_id: Cell<MessageId>,
    admins: Vec<UserId>,
}

impl<W: Write> ConsoleTransport<W> {
    pub fn new(out: W, admins: Vec<UserId>) -> Self {
        Self {
            out: RefCell::new(out),
            next_message_id: Cell::new(1),
            admins,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn allocate(&self) -> MessageId {
        let id = self.next_message_id.get();
        self.next_message_id.set(id + 1);
        id
    }

    fn emit(&self, action: &Outbound) -> Result<()> {
        let mut out = self.out.borrow_mut();
        serde_json::to_writer(&mut *out, action)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write> Transport for ConsoleTransport<W> {
    fn send_message(&self, thread_id: ThreadId, text: &str) -> Result<MessageId> {
        let message_id = self.allocate();
        self.emit(&Outbound::SendMessage {
            thread_id,
            message_id,
            text: text.to_string(),
        })?;
        Ok(message_id)
    }

    fn send_prompt(
        &self,
        thread_id: ThreadId,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageId> {
        let message_id = self.allocate();
        self.emit(&Outbound::SendPrompt {
            thread_id,
            message_id,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        })?;
        Ok(message_id)
    }

    fn edit_buttons(
        &self,
        thread_id: ThreadId,
        message_id: MessageId,
        buttons: &[Button],
    ) -> Result<()> {
        self.emit(&Outbound::EditButtons {
            thread_id,
            message_id,
            buttons: buttons.to_vec(),
        })
    }

    fn delete_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.emit(&Outbound::DeleteMessage {
            thread_id,
            message_id,
        })
    }

    fn pin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.emit(&Outbound::PinMessage {
            thread_id,
            message_id,
        })
    }

    fn unpin_message(&self, thread_id: ThreadId, message_id: MessageId) -> Result<()> {
        self.emit(&Outbound::UnpinMessage {
            thread_id,
            message_id,
        })
    }

    fn send_poll(&self, thread_id: ThreadId, poll: &PollRequest) -> Result<PollRef> {
        let message_id = self.allocate();
        let poll_id = Uuid::new_v4().to_string();
        self.emit(&Outbound::SendPoll {
            thread_id,
            message_id,
            poll_id: poll_id.clone(),
            poll: poll.clone(),
        })?;
        Ok(PollRef {
            message_id,
            poll_id,
        })
    }

    fn delete_topic(&self, thread_id: ThreadId) -> Result<()> {
        self.emit(&Outbound::DeleteTopic { thread_id })
    }

    fn member_role(&self, user_id: UserId) -> Result<Role> {
        Ok(if self.admins.contains(&user_id) {
            Role::Administrator
        } else {
            Role::Member
        })
    }
}
