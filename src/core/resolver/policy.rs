//! Survivor ranking.
//!
//! Best first:
//! 1. larger pixel area
//! 2. earlier capture time (unknown sorts last)
//! 3. `.png` before anything else
//!
//! Ties beyond that keep discovery order.

use crate::core::duplicates::MediaRecord;
use crate::core::metadata::parse_capture_time;
use chrono::NaiveDateTime;
use std::cmp::{Ordering, Reverse};

/// Capture time used for ordering; unknown is the latest possible time
pub fn capture_sort_key(record: &MediaRecord) -> NaiveDateTime {
    record
        .capture_time
        .as_deref()
        .and_then(parse_capture_time)
        .unwrap_or(NaiveDateTime::MAX)
}

/// Total order over group members, best first
pub fn compare(a: &MediaRecord, b: &MediaRecord) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(record: &MediaRecord) -> (Reverse<u64>, NaiveDateTime, bool) {
    (
        Reverse(record.resolution.area()),
        capture_sort_key(record),
        record.extension != ".png",
    )
}

/// Stable-sort `members` best first
pub fn rank(members: &mut [MediaRecord]) {
    members.sort_by(compare);
}
