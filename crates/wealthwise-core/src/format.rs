//! Number and date formatting for user-facing text (en-US conventions)

use chrono::{Datelike, NaiveDate};

/// Format a number with thousands separators and up to three fraction
/// digits, trailing zeros dropped: `1234.5` -> `1,234.5`, `1200000` -> `1,200,000`.
pub fn amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let scaled = (value.abs() * 1000.0).round() as u128;
    let whole = scaled / 1000;
    let frac = scaled % 1000;

    let mut out = String::new();
    if value < 0.0 && scaled > 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if frac > 0 {
        let digits = format!("{:03}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Format a whole-currency amount: rounds first, then groups
pub fn whole(value: f64) -> String {
    amount(value.round())
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// US short date: `3/7/2026`
pub fn short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}
