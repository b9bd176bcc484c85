//! Event dispatch.
//!
//! The bot turns inbound chat events into lifecycle operations and chat
//! replies. It owns the conversation state and the deferred-task queue; the
//! record store, transport and config are borrowed for its whole life.
//!
//! Events arrive one at a time. After each one the caller runs whatever
//! deferred tasks have come due with [`Bot::run_due`].

mod actions;
mod commands;
mod press;
mod text;

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::format;
use crate::lifecycle::{Lifecycle, best_effort};
use crate::model::{MessageId, PollId, ThreadId, UserId};
use crate::schedule::{Scheduler, Task};
use crate::session::Session;
use crate::storage::RecordStore;
use crate::training;
use crate::transport::Transport;

pub use actions::ButtonAction;
use actions::TopicKind;

/// One inbound chat event, as read from the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    /// A new discussion topic was opened.
    TopicCreated { thread_id: ThreadId, user_id: UserId },

    /// A slash command. `name` may carry the leading `/` and a `@bot` suffix.
    Command {
        thread_id: Option<ThreadId>,
        user_id: UserId,
        message_id: MessageId,
        name: String,
    },

    Text {
        thread_id: Option<ThreadId>,
        user_id: UserId,
        message_id: MessageId,
        text: String,
    },

    /// An inline button press. `message_id` is the message holding the button.
    Button {
        thread_id: ThreadId,
        user_id: UserId,
        message_id: MessageId,
        data: String,
    },

    PollAnswer {
        poll_id: PollId,
        user_id: UserId,
        option_ids: Vec<usize>,
    },

    /// Nothing happened; only the clock moved.
    Tick,
}

pub struct Bot<'a, S: ?Sized, T: ?Sized> {
    store: &'a S,
    transport: &'a T,
    config: &'a Config,
    session: Session,
    scheduler: Scheduler,
}

impl<'a, S: RecordStore + ?Sized, T: Transport + ?Sized> Bot<'a, S, T> {
    pub fn new(store: &'a S, transport: &'a T, config: &'a Config) -> Self {
        Self {
            store,
            transport,
            config,
            session: Session::new(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.scheduler.next_due()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn handle(&mut self, event: Event, now: Timestamp) {
        match event {
            Event::TopicCreated { thread_id, user_id } => {
                self.on_topic_created(thread_id, user_id, now);
            }
            Event::Command {
                thread_id,
                user_id,
                message_id,
                name,
            } => self.on_command(thread_id, user_id, message_id, &name, now),
            Event::Text {
                thread_id: Some(thread_id),
                user_id,
                message_id,
                text,
            } => self.on_text(thread_id, user_id, message_id, &text, now),
            Event::Text { thread_id: None, .. } => {}
            Event::Button {
                thread_id,
                user_id,
                message_id,
                data,
            } => self.on_button(thread_id, user_id, message_id, &data, now),
            Event::PollAnswer {
                poll_id,
                user_id,
                option_ids,
            } => {
                self.session
                    .polls
                    .record_vote(&poll_id, user_id, &option_ids);
            }
            Event::Tick => {}
        }
    }

    /// Runs every deferred task due at `now`. Returns how many ran.
    pub fn run_due(&mut self, now: Timestamp) -> usize {
        let due = self.scheduler.take_due(now);
        let count = due.len();
        for task in due {
            match task {
                Task::DeleteTopic { thread_id } => {
                    best_effort(
                        "delete topic",
                        thread_id,
                        self.transport.delete_topic(thread_id),
                    );
                    self.session.dispose(thread_id);
                    self.scheduler.cancel_thread(thread_id);
                    info!(thread_id, "topic closed");
                }
                Task::TrainingReminder {
                    thread_id,
                    training_date,
                    remind_on,
                    poll_id,
                } => {
                    let going = self
                        .session
                        .polls
                        .yes_voters(&poll_id)
                        .map_or(0, BTreeSet::len);
                    best_effort(
                        "send training reminder",
                        thread_id,
                        self.transport.send_message(
                            thread_id,
                            &training::reminder_text(remind_on, training_date),
                        ),
                    );
                    info!(thread_id, %training_date, going, "training reminder sent");
                }
            }
        }
        count
    }

    fn lifecycle(&mut self, now: Timestamp) -> Lifecycle<'_, S, T> {
        Lifecycle::new(
            self.store,
            self.transport,
            &mut self.session,
            &mut self.scheduler,
            self.config,
            now,
        )
    }

    fn is_admin(&self, user_id: UserId) -> bool {
        match self.transport.member_role(user_id) {
            Ok(role) => role.is_admin(),
            Err(e) => {
                warn!(user_id, "member lookup failed: {e}");
                false
            }
        }
    }

    /// Interest-poll votes per proposed date, empty without a live poll.
    fn interest_counts(&self, thread_id: ThreadId) -> BTreeMap<String, usize> {
        self.session
            .get(thread_id)
            .and_then(|t| t.interest_poll.as_ref())
            .and_then(|p| self.session.polls.interest_tally(&p.poll_id))
            .unwrap_or_default()
    }

    /// Offers the PERF / OTHERS choice once per topic, to admins only.
    fn on_topic_created(&mut self, thread_id: ThreadId, user_id: UserId, now: Timestamp) {
        if self.config.is_exempt(thread_id) || !self.session.mark_initialized(thread_id) {
            return;
        }
        if !self.is_admin(user_id) {
            debug!(thread_id, user_id, "topic opened by non-admin, not classified");
            return;
        }

        let buttons = [
            ButtonAction::Topic {
                thread_id,
                kind: TopicKind::Perf,
            }
            .button("PERF"),
            ButtonAction::Topic {
                thread_id,
                kind: TopicKind::Others,
            }
            .button("OTHERS"),
        ];
        self.lifecycle(now)
            .prompt(thread_id, format::TOPIC_PROMPT, &buttons);
    }
}
