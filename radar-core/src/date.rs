//! Date helpers for bank SMS text.
//!
//! Banks write dates as `12-04-23`, `04/05/2024`, `05-Mar-24` or the
//! compact `18Feb25`. Records keep the bank's text; these helpers expand
//! month names to numbers and derive a calendar date when needed.

use chrono::{Local, NaiveDate};

fn month_number(abbr: &str) -> Option<u32> {
    let month = match abbr.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Split `18Feb25` / `18-Feb-25` into (day, month, year text).
fn split_month_name_date(s: &str) -> Option<(u32, u32, &str)> {
    let s = s.trim();
    let day_len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if day_len == 0 || day_len > 2 {
        return None;
    }
    let day: u32 = s[..day_len].parse().ok()?;
    let rest = s[day_len..].strip_prefix('-').unwrap_or(&s[day_len..]);

    let month_len = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if month_len != 3 {
        return None;
    }
    let month = month_number(&rest[..3])?;
    let year = rest[3..].strip_prefix('-').unwrap_or(&rest[3..]);
    if !(year.len() == 2 || year.len() == 4) || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(1..=31).contains(&day) {
        return None;
    }
    Some((day, month, year))
}

/// Reformat a month-name date into the numeric `dd-mm-yy` form.
///
/// `"18Feb25"` becomes `"18-02-25"`, `"5-Mar-2024"` becomes `"05-03-2024"`.
/// The year keeps the number of digits it was written with.
pub fn expand_month_name_date(s: &str) -> Option<String> {
    let (day, month, year) = split_month_name_date(s)?;
    Some(format!("{day:02}-{month:02}-{year}"))
}

/// Format a calendar date the way records store it (`dd-mm-yy`)
pub fn format_sms_date(date: NaiveDate) -> String {
    date.format("%d-%m-%y").to_string()
}

/// Today's date in record form, used when a message carries no date
pub fn today() -> String {
    format_sms_date(Local::now().date_naive())
}

/// Derive a calendar date from any of the textual forms banks use.
pub fn parse_sms_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some((day, month, year)) = split_month_name_date(s) {
        let year = full_year(year)?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let mut parts = s.split(['-', '/']);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year = full_year(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn full_year(year: &str) -> Option<i32> {
    let y: i32 = year.parse().ok()?;
    match year.len() {
        2 => Some(2000 + y),
        4 => Some(y),
        _ => None,
    }
}
