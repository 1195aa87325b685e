//! Finite state machine for optimistic pipeline changes

use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Change state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeState {
    /// No change made yet
    Idle,

    /// Applied locally, waiting for the backend
    Pending,

    /// Backend accepted the last change
    Confirmed,

    /// Backend rejected the last change and the local copy was restored
    RolledBack,
}

/// Change event
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// A change was applied locally
    Stage,

    /// The backend accepted it
    Confirm,

    /// The backend rejected it
    Reject(String),

    /// Forget the outcome of the last change
    Reset,
}

/// Change FSM
#[derive(Debug, Clone)]
pub struct ChangeFsm {
    state: ChangeState,
    error: Option<String>,
    rollback_count: u32,
}

impl ChangeFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: ChangeState::Idle,
            error: None,
            rollback_count: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> &ChangeState {
        &self.state
    }

    /// Error of the last rejected change, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of changes rolled back so far
    pub fn rollback_count(&self) -> u32 {
        self.rollback_count
    }

    /// Whether a change is waiting for the backend
    pub fn is_pending(&self) -> bool {
        self.state == ChangeState::Pending
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: ChangeEvent) -> Result<(), ConsoleError> {
        let new_state = match (&self.state, &event) {
            (
                ChangeState::Idle | ChangeState::Confirmed | ChangeState::RolledBack,
                ChangeEvent::Stage,
            ) => {
                self.error = None;
                ChangeState::Pending
            }

            (ChangeState::Pending, ChangeEvent::Confirm) => ChangeState::Confirmed,
            (ChangeState::Pending, ChangeEvent::Reject(err)) => {
                self.error = Some(err.clone());
                self.rollback_count += 1;
                ChangeState::RolledBack
            }

            (ChangeState::Confirmed | ChangeState::RolledBack, ChangeEvent::Reset) => {
                self.error = None;
                ChangeState::Idle
            }

            // Invalid transitions
            (state, event) => {
                return Err(ConsoleError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for ChangeFsm {
    fn default() -> Self {
        Self::new()
    }
}
