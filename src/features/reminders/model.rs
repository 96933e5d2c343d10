//! Reminder record model
//!
//! One record per user, persisted as a JSON object keyed by the user's
//! Discord ID. Dates are calendar dates (no time component); the wire
//! format is ISO-8601 (`yyyy-MM-dd`).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// "Never reminded" sentinel for `last_reminded` (1970-01-01).
pub fn epoch_sentinel() -> NaiveDate {
    NaiveDate::default()
}

/// Deadline for a freshly created reminder: one contract period from
/// today, shifted by `offset` days. None when the result falls outside
/// the representable date range.
pub fn initial_deadline(today: NaiveDate, contract_days: i64, offset: i64) -> Option<NaiveDate> {
    let days = contract_days.checked_add(offset)?;
    today.checked_add_signed(Duration::try_days(days)?)
}

/// A single user's renewal reminder state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Channel to notify in. A record without a channel is inert and is
    /// skipped by the sweep.
    pub channel_id: Option<String>,
    /// Renewal period in days; each renewal pushes the deadline forward
    /// by this much.
    pub contract_days: i64,
    /// The date the next renewal is due.
    pub deadline_date: NaiveDate,
    /// The date a reminder was last sent, or the epoch sentinel.
    pub last_reminded: NaiveDate,
    /// Message ID of the outstanding (not yet acknowledged) reminder.
    pub reminder_message_id: Option<String>,
}

impl Reminder {
    /// Build a fresh record: never reminded, no outstanding notification.
    pub fn new(channel_id: Option<String>, contract_days: i64, deadline_date: NaiveDate) -> Self {
        Reminder {
            channel_id,
            contract_days,
            deadline_date,
            last_reminded: epoch_sentinel(),
            reminder_message_id: None,
        }
    }

    /// Advance the deadline by one contract period and drop any outstanding
    /// notification. Used by both acknowledgment and manual `/vps update`.
    /// Returns the new deadline, or None when it would leave the
    /// representable date range; the record is untouched in that case.
    pub fn advance_deadline(&mut self) -> Option<NaiveDate> {
        let next = self
            .deadline_date
            .checked_add_signed(Duration::try_days(self.contract_days)?)?;
        self.deadline_date = next;
        self.reminder_message_id = None;
        Some(next)
    }

    /// Record a successfully sent reminder.
    pub fn mark_reminded(&mut self, today: NaiveDate, message_id: String) {
        self.last_reminded = today;
        self.reminder_message_id = Some(message_id);
    }
}
