//! Date input parsing for date-typed form fields.
//!
//! Date values are stored as ISO calendar dates (`YYYY-MM-DD`). The form
//! accepts a few natural phrases as well, resolved against a reference day.

use chrono::{Datelike, Duration, NaiveDate};

/// Storage format of date field values.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Parse a stored date value.
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE).ok()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday".."sunday" (and "mon".."sun"), "this friday", "next friday"
/// - "end of week" / "eow", "end of month" / "eom"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_date_input(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = input.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            return Some(monday + Duration::days(6));
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(year, month, 1).map(|d| d - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some((split, _)) = rest.char_indices().last() {
            let (amount, unit) = rest.split_at(split);
            if let Ok(n) = amount.trim().parse::<i64>() {
                // Out-of-range offsets resolve to no date.
                let offset = match unit {
                    "d" => Duration::try_days(n),
                    "w" => Duration::try_weeks(n),
                    // Approximate: 30 days per month
                    "m" => n.checked_mul(30).and_then(Duration::try_days),
                    _ => return parse_iso(&s),
                };
                return offset.and_then(|d| today.checked_add_signed(d));
            }
        }
    }

    let (day_name, next_week) = if let Some(rest) = s.strip_prefix("next ") {
        (rest, true)
    } else if let Some(rest) = s.strip_prefix("this ") {
        (rest, false)
    } else {
        (s.as_str(), false)
    };
    if let Some(target) = weekday_index(day_name) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target + 7 - current) % 7;
        let days = if next_week { ahead + 7 } else { ahead };
        return Some(today + Duration::days(days));
    }

    parse_iso(&s)
}

fn weekday_index(name: &str) -> Option<i64> {
    let idx = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(idx)
}
