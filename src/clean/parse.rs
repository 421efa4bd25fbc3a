//! Parse-or-null helpers shared by the cleaners
//!
//! None of these return errors: a value that cannot be understood becomes
//! `None` (and a `Null` cell), and the row stays in the table.

use crate::table::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("valid digit pattern"));

/// Date layouts tried in order by [`parse_date_lenient`]
///
/// Month names match full or abbreviated, in any case. Slashed numeric dates
/// are read month first, then day first when the first field cannot be a
/// month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y %B %d",
    "%B %Y %d",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d-%B-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Whether `text` contains a decimal digit in any script
///
/// Other numeric characters such as `½`, `²` or `Ⅻ` do not count.
pub fn contains_digit(text: &str) -> bool {
    DECIMAL_DIGIT.is_match(text)
}

/// Parse a human-written calendar date
///
/// Accepts the layouts in `DATE_FORMATS`, optionally followed by a time of
/// day (which is discarded), and RFC 3339 timestamps. Years must have four
/// digits so that two-digit-year text is left for stricter patterns.
///
/// # Example
/// ```
/// use retail_data_centraliser::clean::parse_date_lenient;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2005, 11, 23);
/// assert_eq!(parse_date_lenient("2005 November 23"), expected);
/// assert_eq!(parse_date_lenient("November 2005 23"), expected);
/// assert_eq!(parse_date_lenient("2005/11/23"), expected);
/// assert_eq!(parse_date_lenient("GMPJOG11FL"), None);
/// ```
pub fn parse_date_lenient(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .filter(|date| date.year() >= 1000)
}

/// Parse a date against exactly one `chrono` pattern
pub fn parse_date_strict(text: &str, pattern: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), pattern).ok()
}

/// Coerce a cell to a `Date` cell using the lenient parser
pub fn coerce_date(value: Value) -> Value {
    match value {
        Value::Date(d) => Value::Date(d),
        Value::Text(text) => parse_date_lenient(&text).into(),
        _ => Value::Null,
    }
}

/// A card expiry: month and year with no day component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthYear {
    pub month: u32,
    pub year: i32,
}

impl MonthYear {
    /// Parse `MM/YY`
    ///
    /// The month may be one or two digits and must be 1-12; the year is two
    /// digits, pivoting at 69 (`69`-`99` are 1900s, `00`-`68` are 2000s).
    ///
    /// # Example
    /// ```
    /// use retail_data_centraliser::clean::MonthYear;
    ///
    /// let expiry = MonthYear::parse("09/27").unwrap();
    /// assert_eq!(expiry.to_string(), "09/27");
    /// assert_eq!(expiry.year, 2027);
    /// assert!(MonthYear::parse("13/27").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let (month, year) = text.trim().split_once('/')?;
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if month.len() > 2 || year.len() != 2 || !all_digits(month) || !all_digits(year) {
            return None;
        }

        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }

        let yy: i32 = year.parse().ok()?;
        let year = if yy >= 69 { 1900 + yy } else { 2000 + yy };
        Some(Self { month, year })
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year.rem_euclid(100))
    }
}

/// Parse `MM/YY` into `(month, year)`; see [`MonthYear::parse`]
pub fn parse_month_year(text: &str) -> Option<(u32, i32)> {
    MonthYear::parse(text).map(|e| (e.month, e.year))
}
