//! Send-eligibility policy
//!
//! Pure decision function with every input injected, so it can be tested
//! without a clock or a live gateway.

use chrono::NaiveDate;

/// Should a reminder fire for this record today?
///
/// - Not yet: the deadline is more than `threshold_days` away.
/// - Not again: a reminder already went out today.
/// - Otherwise yes, including overdue deadlines, which keep firing once
///   per calendar day until acknowledged.
pub fn should_send(
    deadline_date: NaiveDate,
    last_reminded: NaiveDate,
    today: NaiveDate,
    threshold_days: i64,
) -> bool {
    if (deadline_date - today).num_days() > threshold_days {
        return false;
    }

    if last_reminded == today {
        return false;
    }

    true
}
