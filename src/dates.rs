use serde::{de::Error as _, Deserialize, Deserializer};
use time::{macros::format_description, Date, OffsetDateTime};

use crate::error::AppError;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Optional `YYYY-MM-DD` field where a blank value (`?date=`) means absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid date '{s}', expected YYYY-MM-DD"))),
    }
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}
