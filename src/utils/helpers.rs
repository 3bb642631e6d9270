use chrono::{Duration, NaiveDate, NaiveDateTime};

#[must_use]
pub fn col_name_to_index(name: &str) -> Option<usize> {
    let mut result = 0;

    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }

        let val = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result * 26 + val;
    }

    if result == 0 {
        return None;
    }

    Some(result)
}

/// Parse an A1-style cell reference into zero-based (row, col).
#[must_use]
pub fn parse_cell_ref(a1: &str) -> Option<(u32, u32)> {
    let clean = a1.trim().trim_start_matches('$');
    let split = clean.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = clean.split_at(split);
    let letters = letters.trim_end_matches('$');

    let col = col_name_to_index(letters)?;
    let row: u32 = digits.trim_start_matches('$').parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, (col - 1) as u32))
}

/// Parse an A1-style range reference (e.g. "A1:C3") into zero-based
/// ((first_row, first_col), (last_row, last_col)). A bare cell reference
/// is treated as a single-cell range.
#[must_use]
pub fn parse_range_ref(range: &str) -> Option<((u32, u32), (u32, u32))> {
    let clean = range.replace('$', "");
    let mut parts = clean.split(':');
    let a = parts.next()?;
    let b = parts.next().unwrap_or(a);

    let (r1, c1) = parse_cell_ref(a)?;
    let (r2, c2) = parse_cell_ref(b)?;

    Some(((r1.min(r2), c1.min(c2)), (r1.max(r2), c1.max(c2))))
}

/// Convert an Excel serial date number to an ISO date or datetime string.
/// Excel counts days from 1900-01-01 (day 1) and pretends 1900 was a leap
/// year, so dates past February 1900 need a one-day adjustment.
#[must_use]
pub fn excel_date_to_iso_string(excel_date: f64) -> String {
    let days = if excel_date > 59.0 {
        excel_date - 1.0
    } else {
        excel_date
    };

    let base_date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();

    let whole_days = days.trunc() as i64;
    let fractional_day = days.fract();

    let mut date = base_date + Duration::days(whole_days - 1);

    if fractional_day > 0.0 {
        let seconds_in_day = 24.0 * 60.0 * 60.0;
        let mut seconds = (fractional_day * seconds_in_day).round() as u32;

        // A fraction within rounding distance of midnight rounds up to a
        // full day; carry it into the date rather than producing hour 24.
        if seconds >= 86_400 {
            date += Duration::days(1);
            seconds = 0;
        }

        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;

        let datetime = NaiveDateTime::new(
            date,
            chrono::NaiveTime::from_hms_opt(hours, minutes, secs).unwrap(),
        );

        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}
