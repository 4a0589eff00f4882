//! Calendar age in years, months and days.

use chrono::{Datelike, NaiveDate};

/// Full years, months and days from `birthdate` to `today`.
///
/// Missing days are borrowed from the months before `today`, walking back
/// until the day count is non-negative. A birthdate in the future gives all
/// zeros.
pub fn age(birthdate: NaiveDate, today: NaiveDate) -> (u32, u32, u32) {
    if today < birthdate {
        return (0, 0, 0);
    }

    let mut years = today.year() - birthdate.year();
    let mut months = today.month() as i32 - birthdate.month() as i32;
    let mut days = today.day() as i32 - birthdate.day() as i32;

    let (mut y, mut m) = (today.year(), today.month());
    while days < 0 {
        (y, m) = if m == 1 { (y - 1, 12) } else { (y, m - 1) };
        days += days_in_month(y, m) as i32;
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    (years as u32, months as u32, days as u32)
}

/// `"Y years, M months, D days"` with singular forms where the count is 1.
pub fn format_age(birthdate: NaiveDate, today: NaiveDate) -> String {
    let (y, m, d) = age(birthdate, today);
    format!(
        "{} year{}, {} month{}, {} day{}",
        y,
        plural(y),
        m,
        plural(m),
        d,
        plural(d)
    )
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(30, |d| d.day())
}
