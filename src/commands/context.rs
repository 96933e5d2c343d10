//! Shared context for command handlers

use std::sync::Arc;

use crate::features::reminders::ReminderService;

/// Services shared by every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub service: Arc<ReminderService>,
}

impl CommandContext {
    pub fn new(service: Arc<ReminderService>) -> Self {
        CommandContext { service }
    }
}
