//! Localized month and weekday names, exposed to the frontend under the
//! `loc` namespace of the JSON locale artifact.

use crate::i18n::Language;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Weekday keys, starting the week on Sunday.
const WEEKDAY_KEYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Build the calendar labels for a language.
///
/// Keys are `MonthLong1`..`MonthLong12`, `MonthShort1`..`MonthShort12`,
/// `DayLongSun`..`DayLongSat` and `DayShortSun`..`DayShortSat`.
pub fn calendar_labels(language: Language) -> BTreeMap<String, String> {
    let locale = language.config().calendar_locale;
    let mut labels = BTreeMap::new();

    for month in 1..=12u32 {
        let Some(date) = NaiveDate::from_ymd_opt(2000, month, 1) else {
            continue;
        };
        labels.insert(
            format!("MonthLong{}", month),
            date.format_localized("%B", locale).to_string(),
        );
        labels.insert(
            format!("MonthShort{}", month),
            date.format_localized("%b", locale).to_string(),
        );
    }

    // 2023-01-01 is a Sunday
    for (offset, key) in WEEKDAY_KEYS.iter().enumerate() {
        let Some(date) = NaiveDate::from_ymd_opt(2023, 1, 1 + offset as u32) else {
            continue;
        };
        labels.insert(
            format!("DayLong{}", key),
            date.format_localized("%A", locale).to_string(),
        );
        labels.insert(
            format!("DayShort{}", key),
            date.format_localized("%a", locale).to_string(),
        );
    }

    labels
}
