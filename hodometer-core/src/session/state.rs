//! Session state machine
//!
//! ```text
//! Undecided ──PersistRequested──► Current(id) ──Reported──► Closed(id)
//!                                     ▲                        │
//!                                     └─────── Reopened ───────┘
//!                                              (id + 1)
//! ```
//!
//! `Undecided` lasts from boot until the first persist, which assigns
//! `last_known_id + 1`. The id is then fixed for the rest of the session.

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No id assigned yet this boot
    Undecided,
    /// Accumulating under a fixed id
    Current { id: u32 },
    /// Acknowledged; a new session follows immediately
    Closed { id: u32 },
}

/// Inputs to the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Something wants the counters written
    PersistRequested,
    /// The companion app acknowledged the current session
    Reported,
    /// Start the next session after a close
    Reopened,
}

impl SessionState {
    /// Id of the session still accumulating, if any
    pub fn current_id(&self) -> Option<u32> {
        match self {
            SessionState::Current { id } => Some(*id),
            _ => None,
        }
    }

    /// Id shown to the companion app; 0 while undecided
    pub fn live_id(&self) -> u32 {
        match self {
            SessionState::Undecided => 0,
            SessionState::Current { id } | SessionState::Closed { id } => *id,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent, last_known_id: u32) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Undecided, PersistRequested) => Current {
                id: last_known_id.wrapping_add(1),
            },
            (Current { id }, Reported) => Closed { id },
            (Closed { id }, Reopened) => Current {
                id: id.wrapping_add(1),
            },

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_persist_assigns_next_id() {
        let state = SessionState::Undecided.transition(SessionEvent::PersistRequested, 41);
        assert_eq!(state, SessionState::Current { id: 42 });
    }

    #[test]
    fn test_repeated_persists_keep_id() {
        let mut state = SessionState::Undecided;
        for _ in 0..5 {
            state = state.transition(SessionEvent::PersistRequested, 7);
        }
        assert_eq!(state.current_id(), Some(8));
    }

    #[test]
    fn test_report_then_reopen() {
        let state = SessionState::Current { id: 3 }
            .transition(SessionEvent::Reported, 3)
            .transition(SessionEvent::Reopened, 3);
        assert_eq!(state, SessionState::Current { id: 4 });
    }

    #[test]
    fn test_report_while_undecided_ignored() {
        let state = SessionState::Undecided.transition(SessionEvent::Reported, 3);
        assert_eq!(state, SessionState::Undecided);
        assert_eq!(state.live_id(), 0);
    }

    #[test]
    fn test_closed_is_not_current() {
        let state = SessionState::Closed { id: 9 };
        assert_eq!(state.current_id(), None);
        assert_eq!(state.live_id(), 9);
    }
}
