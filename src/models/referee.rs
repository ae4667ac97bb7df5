//! Referee policy model.
//!
//! The mode is a sum type: each variant carries only the settings it uses.
//!
//! ```
//! use u_tournament::models::{RefereeConfig, RefereeMode};
//!
//! let json = r#"{ "mode": "organizer", "numberOfReferees": 3, "maxConsecutiveMatches": 1 }"#;
//! let config: RefereeConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.mode.pool_size(), Some(3));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default organizer pool size.
pub const DEFAULT_REFEREE_POOL: u32 = 2;

fn default_pool() -> u32 {
    DEFAULT_REFEREE_POOL
}

/// How referees are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RefereeMode {
    /// No referees are assigned.
    #[default]
    None,
    /// Referees come from an organizer-provided pool numbered `1..=n`.
    #[serde(rename_all = "camelCase")]
    Organizer {
        #[serde(default = "default_pool")]
        number_of_referees: u32,
        /// At most this many consecutive slots per referee. `None` = unlimited.
        #[serde(default)]
        max_consecutive_matches: Option<u32>,
        /// Display names, index 0 = referee 1.
        #[serde(default)]
        referee_names: Vec<String>,
    },
    /// Playing teams referee each other; the number is the team's 1-based
    /// position in the team list.
    Teams,
}

impl RefereeMode {
    /// Organizer pool with default settings.
    pub fn organizer(number_of_referees: u32) -> Self {
        Self::Organizer {
            number_of_referees,
            max_consecutive_matches: None,
            referee_names: Vec::new(),
        }
    }

    /// Pool size in organizer mode.
    pub fn pool_size(&self) -> Option<u32> {
        match self {
            Self::Organizer {
                number_of_referees, ..
            } => Some(*number_of_referees),
            _ => None,
        }
    }

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Organizer { .. } => "organizer",
            Self::Teams => "teams",
        }
    }
}

/// Policy for refereeing knockout matches in teams mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinalsRefereeMode {
    /// No team referees in knockout matches.
    #[default]
    None,
    /// Any team not playing in the match may referee it.
    NeutralTeams,
}

/// Complete referee configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefereeConfig {
    /// Assignment mode and its settings.
    #[serde(flatten)]
    pub mode: RefereeMode,
    /// Match ID → referee number. Always overrides computed values.
    #[serde(default)]
    pub manual_assignments: BTreeMap<String, u32>,
    /// Knockout policy in teams mode.
    #[serde(default)]
    pub finals_referee_mode: Option<FinalsRefereeMode>,
}

impl RefereeConfig {
    /// Creates a configuration for the given mode.
    pub fn new(mode: RefereeMode) -> Self {
        Self {
            mode,
            manual_assignments: BTreeMap::new(),
            finals_referee_mode: None,
        }
    }

    /// Pins a referee to a match.
    pub fn with_manual(mut self, match_id: impl Into<String>, referee: u32) -> Self {
        self.manual_assignments.insert(match_id.into(), referee);
        self
    }

    /// Sets the knockout policy.
    pub fn with_finals_mode(mut self, mode: FinalsRefereeMode) -> Self {
        self.finals_referee_mode = Some(mode);
        self
    }

    /// Display name for a referee number in organizer mode.
    pub fn referee_name(&self, number: u32) -> Option<&str> {
        match &self.mode {
            RefereeMode::Organizer { referee_names, .. } => number
                .checked_sub(1)
                .and_then(|i| referee_names.get(i as usize))
                .map(String::as_str),
            _ => None,
        }
    }
}
