//! Lifecycle wrapper around one outstanding asynchronous operation.
//!
//! Each slot hands out a [`TaskTicket`] on dispatch. Only the ticket of the most
//! recent dispatch may settle the slot; results carrying an older ticket are
//! dropped, so a slow response can never overwrite a newer one.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskState<T> {
    Idle,
    Pending,
    Fulfilled(T),
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct AsyncTask<T> {
    name: &'static str,
    state: TaskState<T>,
    generation: u64,
}

impl<T> AsyncTask<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: TaskState::Idle,
            generation: 0,
        }
    }

    /// `idle|settled -> pending`. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self) -> TaskTicket {
        self.generation += 1;
        self.state = TaskState::Pending;
        TaskTicket {
            generation: self.generation,
        }
    }

    /// Returns `false` when the ticket was superseded and the value was dropped.
    pub fn fulfill(&mut self, ticket: TaskTicket, data: T) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = TaskState::Fulfilled(data);
        true
    }

    /// Failures are logged only when they settle the slot.
    pub fn reject(&mut self, ticket: TaskTicket, error: impl fmt::Display) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        let message = error.to_string();
        warn!(operation = self.name, error = %message, "operation failed");
        self.state = TaskState::Rejected(message);
        true
    }

    /// Back to idle. Work still in flight for this slot will be discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = TaskState::Idle;
    }

    pub fn state(&self) -> &TaskState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TaskState::Pending)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TaskState::Idle)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            TaskState::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            TaskState::Fulfilled(data) => Some(data),
            _ => None,
        }
    }

    fn is_current(&self, ticket: TaskTicket) -> bool {
        ticket.generation == self.generation
    }

    fn accepts(&self, ticket: TaskTicket) -> bool {
        if self.is_current(ticket) && self.is_pending() {
            return true;
        }
        warn!(
            operation = self.name,
            generation = ticket.generation,
            current = self.generation,
            "discarding stale completion"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_from_pending_to_fulfilled() {
        let mut task = AsyncTask::new("list");
        assert!(task.is_idle());

        let ticket = task.begin();
        assert!(task.is_pending());
        assert_eq!(task.data(), None);

        assert!(task.fulfill(ticket, 7));
        assert_eq!(task.state(), &TaskState::Fulfilled(7));
        assert_eq!(task.data(), Some(&7));
        assert_eq!(task.error(), None);
    }

    #[test]
    fn rejection_carries_message_and_clears_on_next_dispatch() {
        let mut task: AsyncTask<u8> = AsyncTask::new("create");
        let ticket = task.begin();
        assert!(task.reject(ticket, "network error: refused"));
        assert_eq!(task.error(), Some("network error: refused"));

        task.begin();
        assert_eq!(task.error(), None);
        assert!(task.is_pending());
    }

    #[test]
    fn superseded_ticket_cannot_overwrite_newer_result() {
        let mut task = AsyncTask::new("list");
        let older = task.begin();
        let newer = task.begin();

        assert!(task.fulfill(newer, "fresh"));
        assert!(!task.fulfill(older, "stale"));
        assert_eq!(task.data(), Some(&"fresh"));
        assert!(!task.reject(older, "late failure"));
        assert_eq!(task.data(), Some(&"fresh"));
    }

    #[test]
    fn reset_discards_in_flight_work() {
        let mut task = AsyncTask::new("analysis");
        let ticket = task.begin();
        task.reset();

        assert!(!task.fulfill(ticket, 1));
        assert!(task.is_idle());
    }

    #[test]
    fn ticket_settles_at_most_once() {
        let mut task = AsyncTask::new("detail");
        let ticket = task.begin();
        assert!(task.fulfill(ticket, 1));
        assert!(!task.fulfill(ticket, 2));
        assert_eq!(task.data(), Some(&1));
    }
}
