//! Per-actor login/logout ordering.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::Anomaly;
use crate::event::SessionMarker;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn,
}

#[derive(Default)]
pub struct SessionDetector {
    sessions: HashMap<String, SessionState>,
}

impl SessionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `actor`; unseen actors are logged out.
    pub fn state(&self, actor: &str) -> SessionState {
        self.sessions.get(actor).copied().unwrap_or_default()
    }

    pub fn observe(
        &mut self,
        marker: SessionMarker,
        actor: &str,
        activity: &str,
        ts: NaiveDateTime,
    ) -> Option<Anomaly> {
        match marker {
            SessionMarker::Login => {
                self.sessions
                    .insert(actor.to_string(), SessionState::LoggedIn);
                None
            }
            SessionMarker::Logout => match self.state(actor) {
                SessionState::LoggedIn => {
                    self.sessions
                        .insert(actor.to_string(), SessionState::LoggedOut);
                    None
                }
                SessionState::LoggedOut => Some(Anomaly::OrderViolation {
                    timestamp: ts,
                    actor: actor.to_string(),
                    activity: activity.to_string(),
                }),
            },
            SessionMarker::Neutral => None,
        }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
