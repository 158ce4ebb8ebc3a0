//! Rule-based anomaly detection over ordered activity events.

pub mod anomaly;
pub mod engine;
pub mod gap;
pub mod policy;
pub mod session;
pub mod spike;

pub use anomaly::{Anomaly, AnomalyKind};
pub use engine::{detect, Engine};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::ConfigError;

/// Precondition violations raised by the engine. A rejected event leaves the
/// engine state untouched.
#[derive(Debug, Error, PartialEq)]
pub enum DetectError {
    #[error("event at {timestamp} arrived after {previous}; input must be sorted by timestamp")]
    OutOfOrder {
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
    #[error("event at {timestamp} has an empty activity")]
    EmptyActivity { timestamp: NaiveDateTime },
    #[error("event '{activity}' at {timestamp} has no actor in its message")]
    MissingActor {
        timestamp: NaiveDateTime,
        activity: String,
    },
    #[error("invalid detection config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
