//! Message templates posted to the group.

use crate::datetime::CanonicalDateTime;
use crate::model::{PerformanceRecord, Status};

pub const TOPIC_PROMPT: &str = "What's the topic for? PERF or OTHERS?";

pub const FULL_INPUT_PROMPT: &str =
    "\u{1F4DD} Please enter: *Event // Date // Location // Info (If any)*";

pub const OPPORTUNITY_FORMAT_HINT: &str = "❌ Invalid input format. Use:\n\
     *Event // Date // Location // Info (optional)*\n\n\
     Example:\n\
     `NTU Welcome Tea // 23 JUN 2025 8:00pm // NYA // Formal wear required`";

pub const CONFIRM_PROMPT: &str = "🎯 Is this performance *ACCEPTED* or *REJECTED*?";
pub const SELECT_DATES_PROMPT: &str = "🗓️ Select final date(s) to confirm:";
pub const RESELECT_DATES_PROMPT: &str =
    "📅 Please choose the *confirmed date*, then press ✅ Confirm Selection:";
pub const NO_DATE_SELECTED: &str = "⚠️ Please select at least one date before confirming.";
pub const NO_PROPOSED_DATES: &str = "⚠️ No proposed dates available to choose from.";
pub const MODIFY_PROMPT: &str = "✏️ What would you like to update?";
pub const STATUS_PROMPT: &str = "🚦 Please select the new *STATUS*: ";
pub const REJECTED_NOTICE: &str = "❌ Performance rejected. This topic will now be closed.";
pub const NOT_REGISTERED: &str = "❌ This thread is not registered.";
pub const REMIND_NOT_CONFIRMED: &str = "⚠️ Reminder can only be used *after confirmation*.";

pub fn modify_value_prompt(label: &str) -> String {
    format!("✅ Got it! What is the new value for *{label}*?")
}

pub fn thread_id_reply(thread_id: i64) -> String {
    format!("\u{1F9F5} This topic's thread ID is: {thread_id}")
}

/// One bullet per date, re-rendered in canonical form where it parses.
fn date_lines(dates: &[String]) -> String {
    dates
        .iter()
        .map(|d| match d.parse::<CanonicalDateTime>() {
            Ok(canonical) => format!("• {canonical}"),
            Err(_) => format!("• {d}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The pinned announcement for a record.
///
/// Pending records show their proposed dates as an opportunity; accepted
/// ones show the confirmed dates as a summary.
pub fn announcement(record: &PerformanceRecord) -> String {
    let (title, dates_heading) = match record.status {
        Status::Accepted => ("Performance Summary", "Confirmed Date | Time"),
        Status::Pending | Status::Rejected => ("Performance Opportunity", "Date | Time"),
    };
    format!(
        "📢 *{title}*\n\n\
         📍 *Event*\n• {event}\n\n\
         📅 *{dates_heading}*\n{dates}\n\n\
         📌 *Location*\n• {location}\n\n\
         📝 *Performance Information:*\n{info}",
        event = record.event,
        dates = date_lines(record.announced_dates()),
        location = record.location,
        info = record.info.trim(),
    )
}

/// Pre-show reminder for an accepted record.
pub fn performance_reminder(record: &PerformanceRecord) -> String {
    format!(
        "📢 *Performance Reminder*\n\n\
         📍 *Event*\n• {event}\n\n\
         📅 *Date | Time*\n{dates}\n\n\
         📌 *Location*\n• {location}\n\n\
         *📝 Final Preparation Notes*\n\n\
         *👀 Glasses & Contact Lens*\n\
         If you wear glasses, try your best to perform without them (e.g. wear contact lens). \
         Default is *no glasses* on stage. Make sure you're comfortable before show day.\n\n\
         *🎽 Costume Tips*\n\
         Our costumes are sleeveless and v-neck. A black sports top underneath is best.\n\n\
         *🦶 Barefoot Reminder*\n\
         Everyone will be performing *barefoot*. Don't forget!\n\n\
         *💇 Hair Tying*\n\
         If you have long hair, please tie it up neatly. \
         You can also ask someone to help if needed.\n\n\
         *📺 Recap the Drum Score*\n\
         Make sure to go through the performance videos again and recap the score \
         before the show. Stay sharp!",
        event = record.event,
        dates = date_lines(&record.confirmed_dates),
        location = record.location,
    )
}

pub fn already_marked(status: Status) -> String {
    format!("❌ This performance is already marked as `{status}`.")
}
