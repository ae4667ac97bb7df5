//! Fatal generation errors.
//!
//! Only input that makes a schedule impossible is an error. Everything else
//! degrades to defaults and is reported as a [`Notice`](crate::models::Notice).

use thiserror::Error;

/// Errors that stop schedule generation.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The configuration lists no teams.
    #[error("tournament has no teams")]
    NoTeams,

    /// The configuration could not be parsed.
    #[error("invalid tournament configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
