use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];
}

/// One weekday entry. `open`/`close` are `HH:MM` and only meaningful when the
/// attraction is not closed that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: Weekday,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
}

impl DayHours {
    pub fn open(day: Weekday, open: &str, close: &str) -> Self {
        Self {
            day,
            closed: false,
            open: Some(open.to_string()),
            close: Some(close.to_string()),
        }
    }

    pub fn closed(day: Weekday) -> Self {
        Self {
            day,
            closed: true,
            open: None,
            close: None,
        }
    }
}

/// Weekly schedule stored as JSONB on the attraction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningHours(pub Vec<DayHours>);

impl OpeningHours {
    pub fn days(&self) -> &[DayHours] {
        &self.0
    }
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn parse_time(
    value: Option<&str>,
    day: Weekday,
    which: &str,
) -> Result<NaiveTime, ValidationError> {
    let raw = value.ok_or_else(|| {
        invalid(
            "opening_hours",
            format!("{which} time is required for {day:?}"),
        )
    })?;
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| {
        invalid(
            "opening_hours",
            format!("{which} time for {day:?} must be HH:MM, got '{raw}'"),
        )
    })
}

/// Exactly one entry per weekday; open days need `open < close`.
pub fn validate_opening_hours(hours: &OpeningHours) -> Result<(), ValidationError> {
    if hours.0.len() != Weekday::ALL.len() {
        return Err(invalid(
            "opening_hours",
            format!("expected 7 weekday entries, got {}", hours.0.len()),
        ));
    }

    let days: HashSet<Weekday> = hours.0.iter().map(|d| d.day).collect();
    if days.len() != Weekday::ALL.len() {
        return Err(invalid(
            "opening_hours",
            "each weekday must appear exactly once".to_string(),
        ));
    }

    for entry in hours.0.iter().filter(|d| !d.closed) {
        let open = parse_time(entry.open.as_deref(), entry.day, "Opening")?;
        let close = parse_time(entry.close.as_deref(), entry.day, "Closing")?;
        if open >= close {
            return Err(invalid(
                "opening_hours",
                format!("{:?} closes before it opens", entry.day),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn standard_week() -> OpeningHours {
    OpeningHours(
        Weekday::ALL
            .iter()
            .map(|&day| match day {
                Weekday::Sunday => DayHours::closed(day),
                _ => DayHours::open(day, "09:00", "17:30"),
            })
            .collect(),
    )
}
