use serde::Deserialize;
use time::Date;

use crate::dates::blank_as_none;

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    /// Last day of the history window; today (UTC) when absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_date: Option<Date>,
}
