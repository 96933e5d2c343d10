//! # Features Layer
//!
//! Feature modules for the renewal reminder bot.

pub mod reminders;

pub use reminders::{ReminderScheduler, ReminderService};
