use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DurationBucket, SessionTally};

static FORTY_FIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)45\s*(?:min|分鐘|分)?").expect("valid regex"));

static COMPOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:\s*\+\s*\d)+").expect("valid regex"));

static TRAILING_DIGIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d)\s*(?:[(（][^)）]*[)）]\s*)?$").expect("valid regex")
});

fn bucket_for_digit(digit: char) -> Option<DurationBucket> {
    match digit {
        '2' => Some(DurationBucket::OneHour),
        '1' => Some(DurationBucket::HalfHour),
        _ => None,
    }
}

/// Reads billing units out of the operator's title shorthand.
///
/// First match wins:
/// 1. `45` (optionally `min`, `分`, `分鐘`) is one 45-minute session.
/// 2. `2+1`-style compounds count every `2` as one hour and every `1` as a
///    half hour.
/// 3. A lone trailing `2` or `1`, optionally followed by a parenthetical
///    note, is one hour or a half hour.
/// 4. Anything else is a half hour.
pub fn classify(title: &str) -> SessionTally {
    let title = title.trim();

    if FORTY_FIVE.is_match(title) {
        return SessionTally::single(DurationBucket::FortyFiveMin);
    }

    if let Some(compound) = COMPOUND.find(title) {
        let mut tally = SessionTally::default();
        compound
            .as_str()
            .chars()
            .filter_map(bucket_for_digit)
            .for_each(|bucket| tally.add(bucket));
        return tally;
    }

    let trailing = TRAILING_DIGIT
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
        .and_then(bucket_for_digit);

    SessionTally::single(trailing.unwrap_or(DurationBucket::HalfHour))
}
