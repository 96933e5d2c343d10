// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Application layer
pub mod commands;

// Re-export core config
pub use core::Config;

// Re-export feature items
pub use features::reminders::{
    epoch_sentinel, should_send, Acknowledged, InMemoryReminderStore, JsonReminderStore, Reminder,
    ReminderMap, ReminderScheduler, ReminderService, ReminderStore, SWEEP_INTERVAL,
};
