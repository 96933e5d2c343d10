//! # Reminders Feature
//!
//! The renewal reminder lifecycle engine: persisted per-user deadline
//! records, the send-eligibility policy, the hourly sweep, and the
//! reaction-acknowledgment path that extends deadlines.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod model;
pub mod policy;
pub mod scheduler;
pub mod service;
pub mod store;

pub use model::{epoch_sentinel, initial_deadline, Reminder};
pub use policy::should_send;
pub use scheduler::{ReminderScheduler, SWEEP_INTERVAL};
pub use service::{Acknowledged, ReminderService};
pub use store::{InMemoryReminderStore, JsonReminderStore, ReminderMap, ReminderStore};
