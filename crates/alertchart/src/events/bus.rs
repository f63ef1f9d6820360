//! Event bus for queuing events and commands.
//!
//! The [`EventBus`] collects what the dashboard emits while it handles a
//! message; the runner drains both queues afterwards.

use std::collections::VecDeque;

use super::types::{Command, DashboardEvent};

/// Two FIFO queues: events to report and commands to execute.
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<DashboardEvent>,
    commands: VecDeque<Command>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: DashboardEvent) {
        self.events.push_back(event);
    }

    pub fn dispatch(&mut self, cmd: Command) {
        self.commands.push_back(cmd);
    }

    /// Drain all pending events in FIFO order.
    pub fn drain_events(&mut self) -> impl Iterator<Item = DashboardEvent> + '_ {
        self.events.drain(..)
    }

    /// Take all pending commands, leaving the queue empty.
    #[must_use]
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands).into_iter().collect()
    }

    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    #[must_use]
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Clear all pending events and commands.
    pub fn clear(&mut self) {
        self.events.clear();
        self.commands.clear();
    }
}
