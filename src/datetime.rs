//! Flexible date/time parsing for loosely typed human input.
//!
//! Entries like `23aug25 2:30pm`, `24jun 1430` or `23Aug` normalize to the
//! canonical form `DD MON YYYY` or `DD MON YYYY | H:MMam`. Several entries
//! are separated by commas and either all parse or the whole input fails.
//!
//! Accepted shape, after lower-casing and time shorthand normalization:
//!
//! ```text
//! <day>[ |-]<month>[[ |-]<year>][ <time>]
//! ```
//!
//! A missing year is the current calendar year at parse time. Two-digit
//! years are always 20YY.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use jiff::Zoned;
use jiff::civil::{Date, Time};
use regex::Regex;

/// Errors from parsing date/time entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateTimeError {
    #[error("unrecognized date format: '{0}'")]
    Unrecognized(String),

    #[error("invalid time '{time}' in '{entry}'")]
    InvalidTime { entry: String, time: String },

    #[error("invalid date: '{0}'")]
    InvalidDate(String),

    /// At least one comma-separated entry failed.
    #[error("invalid date/time entries: {}", .invalid.join(", "))]
    InvalidEntries { invalid: Vec<String>, multiple: bool },
}

pub type Result<T> = core::result::Result<T, DateTimeError>;

impl DateTimeError {
    /// The message shown to the person who typed the input.
    pub fn hint(&self) -> String {
        match self {
            Self::Unrecognized(entry) => format!(
                "❌ Invalid date format: '{entry}'\n\
                 👉 Use formats like '24jun25' or '24jun25 2:30pm'."
            ),
            Self::InvalidTime { time, .. } => format!(
                "❌ Time format is invalid: '{time}'\n\
                 👉 Use formats like 2pm, 2:30pm, 1430"
            ),
            Self::InvalidDate(entry) => format!(
                "❌ Date format is invalid: '{entry}'\n\
                 👉 Use formats like '24jun25', not numeric months."
            ),
            Self::InvalidEntries {
                multiple: false, ..
            } => "❌ Invalid *date/time* format.\n\
                  👉 Use formats like:\n\
                  - `23aug25 8:30pm`\n\
                  - `23aug 1430`\n\
                  - `23aug25`\n\
                  - `23aug`\n\
                  \n⚠️ Make sure your input uses letters for month (e.g. `aug`, not `08`)."
                .to_string(),
            Self::InvalidEntries { multiple: true, .. } => {
                "❌ One or more *date/time* entries are invalid.\n\
                 👉 Use correct comma `,` between entries and formats like:\n\
                 - `23aug 8pm, 24aug 9pm`\n\
                 - `23aug25 1430, 24aug25`\n\
                 \n⚠️ Use *letter months*, not numeric (e.g. `aug`, not `08`)."
                    .to_string()
            }
        }
    }
}

/// A parsed entry: a calendar date with an optional time of day.
///
/// Displays in canonical form and parses back from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalDateTime {
    pub date: Date,
    pub time: Option<Time>,
}

impl fmt::Display for CanonicalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.strftime("%d %b %Y").to_string().to_uppercase();
        f.write_str(&date)?;
        if let Some(time) = self.time {
            let hour = time.hour();
            let meridiem = if hour < 12 { "am" } else { "pm" };
            let hour = match hour % 12 {
                0 => 12,
                h => h,
            };
            write!(f, " | {hour}:{:02}{meridiem}", time.minute())?;
        }
        Ok(())
    }
}

impl FromStr for CanonicalDateTime {
    type Err = DateTimeError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = CANONICAL
            .captures(s.trim())
            .ok_or_else(|| DateTimeError::Unrecognized(s.to_string()))?;

        let month = month_number(&caps[2].to_ascii_lowercase())
            .ok_or_else(|| DateTimeError::InvalidDate(s.to_string()))?;
        let date = build_date(&caps[1], month, &caps[3])
            .ok_or_else(|| DateTimeError::InvalidDate(s.to_string()))?;

        let time = match (caps.get(4), caps.get(5), caps.get(6)) {
            (Some(h), Some(m), Some(meridiem)) => Some(
                twelve_hour(
                    h.as_str(),
                    m.as_str(),
                    &meridiem.as_str().to_ascii_lowercase(),
                )
                .ok_or_else(|| {
                    DateTimeError::InvalidTime {
                        entry: s.to_string(),
                        time: format!("{}:{}{}", h.as_str(), m.as_str(), meridiem.as_str()),
                    }
                })?,
            ),
            _ => None,
        };

        Ok(Self { date, time })
    }
}

/// Parses entries against a fixed default year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    default_year: i16,
}

impl DateParser {
    pub fn new(default_year: i16) -> Self {
        Self { default_year }
    }

    /// A parser defaulting to the current calendar year of the system clock.
    // TODO: substitute the intended event year near year boundaries once a
    // rule for it is agreed; `31dec` typed in January lands a year early.
    pub fn current() -> Self {
        Self::new(Zoned::now().year())
    }

    /// Parses a single entry into canonical form.
    pub fn parse_one(&self, entry: &str) -> Result<CanonicalDateTime> {
        let original = entry.trim();
        let normalized = normalize(&original.to_lowercase());

        let caps = ENTRY
            .captures(&normalized)
            .ok_or_else(|| DateTimeError::Unrecognized(original.to_string()))?;

        let day = &caps[1];
        let month = month_number(&caps[2])
            .ok_or_else(|| DateTimeError::InvalidDate(original.to_string()))?;
        let year = match caps.get(3).map(|m| m.as_str()) {
            None => self.default_year.to_string(),
            Some(y) if y.len() == 2 => format!("20{y}"),
            Some(y) if y.len() == 4 => y.to_string(),
            Some(_) => return Err(DateTimeError::InvalidDate(original.to_string())),
        };

        let Some(time_part) = caps.get(4).map(|m| m.as_str()) else {
            let date = build_date(day, month, &year)
                .ok_or_else(|| DateTimeError::InvalidDate(original.to_string()))?;
            return Ok(CanonicalDateTime { date, time: None });
        };

        let invalid_time = || DateTimeError::InvalidTime {
            entry: original.to_string(),
            time: time_part.to_string(),
        };
        let date = build_date(day, month, &year).ok_or_else(invalid_time)?;
        let time = parse_time(time_part).ok_or_else(invalid_time)?;

        Ok(CanonicalDateTime {
            date,
            time: Some(time),
        })
    }

    /// Parses comma-separated entries. Any invalid or empty entry fails the whole input.
    pub fn parse_and_format(&self, entries: &str) -> Result<Vec<CanonicalDateTime>> {
        let parts: Vec<&str> = entries.split(',').map(str::trim).collect();
        let mut parsed = Vec::with_capacity(parts.len());
        let mut invalid = Vec::new();

        for part in &parts {
            if part.is_empty() {
                invalid.push("(empty)".to_string());
                continue;
            }
            match self.parse_one(part) {
                Ok(entry) => parsed.push(entry),
                Err(_) => invalid.push((*part).to_string()),
            }
        }

        if !invalid.is_empty() {
            return Err(DateTimeError::InvalidEntries {
                invalid,
                multiple: parts.len() > 1,
            });
        }
        Ok(parsed)
    }
}

/// Parses entries against the current calendar year.
pub fn parse_and_format(entries: &str) -> Result<Vec<CanonicalDateTime>> {
    DateParser::current().parse_and_format(entries)
}

/// Renders parsed entries as their canonical strings.
pub fn to_strings(entries: &[CanonicalDateTime]) -> Vec<String> {
    entries.iter().map(ToString::to_string).collect()
}

// ── Grammar ──

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2})[\s-]?([a-z]{3,9})[\s-]?(\d{2,4})?(?:\s+(\d{1,2}:\d{2}(?:\s?(?:am|pm))?))?$",
    )
    .expect("entry pattern is valid")
});

static CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}) ([A-Za-z]{3}) (\d{4})(?: \| (\d{1,2}):(\d{2})([AaPp][Mm]))?$")
        .expect("canonical pattern is valid")
});

/// Time shorthand rewrites, applied in order.
static REWRITES: LazyLock<[(Regex, &'static str); 5]> = LazyLock::new(|| {
    let re = |pattern: &str| Regex::new(pattern).expect("rewrite pattern is valid");
    [
        // 2.30 -> 2:30
        (re(r"(\d{1,2})\.(\d{2})"), "${1}:${2}"),
        // 1430 -> 14:30, only as a separate token.
        (re(r"(^|\s)(\d{2})(\d{2})\b"), "${1}${2}:${3}"),
        // 230pm -> 2:30 pm
        (re(r"\b(\d{1,2})(\d{2})\s?(am|pm)\b"), "${1}:${2} ${3}"),
        // 2:30pm -> 2:30 pm
        (re(r"(\d{1,2}:\d{2})\s?(am|pm)\b"), "${1} ${2}"),
        // 2pm -> 2:00 pm
        (re(r"(^|[^:\d])(\d{1,2})\s?(am|pm)\b"), "${1}${2}:00 ${3}"),
    ]
});

fn normalize(lower: &str) -> String {
    REWRITES
        .iter()
        .fold(lower.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

/// Abbreviated or full month name, lower-case.
fn month_number(name: &str) -> Option<i8> {
    MONTHS
        .iter()
        .position(|(abbr, full)| name == *abbr || name == *full)
        .and_then(|i| i8::try_from(i + 1).ok())
}

fn build_date(day: &str, month: i8, year: &str) -> Option<Date> {
    let day: i8 = day.parse().ok()?;
    let year: i16 = year.parse().ok()?;
    Date::new(year, month, day).ok()
}

static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("24h pattern is valid"));

static TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s?(am|pm)$").expect("12h pattern is valid")
});

/// 24-hour `HH:MM` first, then 12-hour `HH:MM am`.
fn parse_time(time: &str) -> Option<Time> {
    if let Some(caps) = TIME_24H.captures(time) {
        let hour: i8 = caps[1].parse().ok()?;
        let minute: i8 = caps[2].parse().ok()?;
        return Time::new(hour, minute, 0, 0).ok();
    }
    let caps = TIME_12H.captures(time)?;
    twelve_hour(&caps[1], &caps[2], &caps[3])
}

fn twelve_hour(hour: &str, minute: &str, meridiem: &str) -> Option<Time> {
    let hour: i8 = hour.parse().ok()?;
    let minute: i8 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour % 12, meridiem) {
        (h, "pm") => h + 12,
        (h, _) => h,
    };
    Time::new(hour, minute, 0, 0).ok()
}
