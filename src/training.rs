//! Weekly training attendance: poll wording and reminder timing.

use jiff::civil::{Date, Time, Weekday};
use jiff::tz::{Offset, TimeZone};
use jiff::{Timestamp, ToSpan};

use crate::transport::PollRequest;

/// The next `weekday` strictly after `today`.
pub fn next_weekday(today: Date, weekday: Weekday) -> Result<Date, jiff::Error> {
    today.nth_weekday(1, weekday)
}

/// The next `weekday` at `time` in the fixed `offset` that is later than `now`.
///
/// Today counts if its `time` has not passed yet.
pub fn next_reminder(
    now: Timestamp,
    offset: Offset,
    weekday: Weekday,
    time: Time,
) -> Result<Timestamp, jiff::Error> {
    let tz = TimeZone::fixed(offset);
    let today = now.to_zoned(tz.clone()).date();
    let ahead = (weekday.to_monday_zero_offset() - today.weekday().to_monday_zero_offset())
        .rem_euclid(7);

    let day = today.checked_add(i64::from(ahead).days())?;
    let at = day.to_datetime(time).to_zoned(tz.clone())?.timestamp();
    if now < at {
        return Ok(at);
    }
    let day = day.checked_add(7.days())?;
    Ok(day.to_datetime(time).to_zoned(tz)?.timestamp())
}

pub fn poll_request(training_date: Date) -> PollRequest {
    PollRequest {
        question: format!(
            "Are you joining the training on {}?",
            training_date.strftime("%B %d, %Y")
        ),
        options: vec!["Yes".into(), "No".into()],
        allows_multiple: false,
    }
}

/// The reminder sent on `remind_on`, worded by how far off training is.
pub fn reminder_text(remind_on: Date, training_date: Date) -> String {
    let when = match training_date.duration_since(remind_on).as_hours() / 24 {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        _ => format!("on {}", training_date.strftime("%A")),
    };
    format!(
        "Reminder: There's training {when}, {}. If you haven't voted yet, please do so!",
        training_date.strftime("%B %d, %Y")
    )
}
