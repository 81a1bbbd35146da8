//! Row format of the append-only `Daily` worksheet.

use chrono::NaiveDate;

use crate::probe::ProductProbeResult;

pub const DAILY_SHEET: &str = "Daily";
pub const DAILY_HEADERS: [&str; 8] = [
    "product_id",
    "date",
    "url",
    "product_name",
    "size_count",
    "sizes_avail",
    "sizes_all",
    "status",
];

const LIST_SEPARATOR: &str = ", ";

/// Render one result as a `Daily` row for `date` (the run's UTC date).
/// A failed probe leaves the count cell empty.
#[must_use]
pub fn daily_row(result: &ProductProbeResult, date: NaiveDate) -> Vec<String> {
    vec![
        result.product_id.clone(),
        date.format("%Y-%m-%d").to_string(),
        result.url.clone(),
        result.name.clone(),
        result
            .size_count
            .map_or(String::new(), |count| count.to_string()),
        result.sizes_avail.join(LIST_SEPARATOR),
        result.sizes_all.join(LIST_SEPARATOR),
        result.status.to_string(),
    ]
}
