// Formatting helpers shared by the analyzer, report and notifier
use chrono::{DateTime, FixedOffset, Utc};

const TAIPEI_OFFSET_SECS: i32 = 8 * 3600;

/// Fixed-decimal rendering of an optional value; undefined renders as `N/A`.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "N/A".to_string(),
    }
}

/// Percentage change from `from` to `to`; 0 when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    let change = (to - from) / from * 100.0;
    if change.is_finite() { change } else { 0.0 }
}

/// `$1,234.56` above 1000, two decimals above 1, four below.
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        format!("${}", group_thousands(price))
    } else if price >= 1.0 {
        format!("${price:.2}")
    } else {
        format!("${price:.4}")
    }
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

pub fn to_taipei(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(TAIPEI_OFFSET_SECS) {
        Some(offset) => time.with_timezone(&offset),
        None => time.fixed_offset(),
    }
}

/// Current time in Taipei as `YYYY-MM-DD HH:MM:SS`.
pub fn taipei_now() -> String {
    format_taipei(Utc::now())
}

pub fn format_taipei(time: DateTime<Utc>) -> String {
    to_taipei(time).format("%Y-%m-%d %H:%M:%S").to_string()
}
