//! Core data model for Encore.
//!
//! These types represent the scheduling workflow:
//! performance records, their status, the fields an admin can edit,
//! and the polls that gauge interest or training attendance.

mod poll;
mod record;

pub use poll::{InterestPoll, PollKind, PollRef};
pub use record::{Field, PerformanceRecord, Status};

/// Identifier of a discussion topic in the group chat.
pub type ThreadId = i64;

/// Identifier of a chat member.
pub type UserId = i64;

/// Identifier of a message sent to the group chat.
pub type MessageId = i64;

/// Opaque poll identifier issued by the chat transport.
pub type PollId = String;
