//! Team references and placeholders.
//!
//! A match side is either a concrete team or a placeholder standing for a
//! team that is not known yet (`group-a-1st`, `semi1-winner`, `TBD`).
//! Placeholders are the string boundary of the playoff graph: inside the
//! engine brackets use typed handles, and only matches handed to callers
//! carry the string form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a scheduled match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeamRef {
    /// A concrete team ID.
    Team(String),
    /// A symbolic reference resolved later.
    Placeholder(Placeholder),
}

impl TeamRef {
    /// Creates a concrete team reference.
    pub fn team(id: impl Into<String>) -> Self {
        Self::Team(id.into())
    }

    /// Concrete team ID, if this side is not a placeholder.
    pub fn team_id(&self) -> Option<&str> {
        match self {
            Self::Team(id) => Some(id),
            Self::Placeholder(_) => None,
        }
    }

    /// Placeholder, if this side is symbolic.
    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Self::Team(_) => None,
            Self::Placeholder(p) => Some(p),
        }
    }

    /// Resource key used for rest and conflict tracking.
    ///
    /// Returns `None` for `TBD`, which never identifies a team.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Team(id) => Some(id.clone()),
            Self::Placeholder(Placeholder::Tbd) => None,
            Self::Placeholder(p) => Some(p.to_string()),
        }
    }
}

/// A symbolic team reference.
///
/// Serialized in its string form, e.g. `"group-b-2nd"` or `"qf3-loser"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Placeholder {
    /// The team finishing `place` (1-based) in group `group`.
    GroupPlace { group: String, place: u8 },
    /// The best second-placed team across all groups.
    BestSecond,
    /// The winner of the match with this ID.
    Winner(String),
    /// The loser of the match with this ID.
    Loser(String),
    /// Unknown.
    Tbd,
}

impl Placeholder {
    /// Creates a group-place placeholder.
    pub fn group_place(group: impl Into<String>, place: u8) -> Self {
        Self::GroupPlace {
            group: group.into(),
            place,
        }
    }

    /// Parses the string form. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "TBD" {
            return Some(Self::Tbd);
        }
        if s == "bestSecond" {
            return Some(Self::BestSecond);
        }
        if let Some(key) = s.strip_suffix("-winner") {
            return (!key.is_empty()).then(|| Self::Winner(key.to_string()));
        }
        if let Some(key) = s.strip_suffix("-loser") {
            return (!key.is_empty()).then(|| Self::Loser(key.to_string()));
        }
        let rest = s.strip_prefix("group-")?;
        let (group, ordinal) = rest.rsplit_once('-')?;
        if group.is_empty() {
            return None;
        }
        let digits: String = ordinal.chars().take_while(|c| c.is_ascii_digit()).collect();
        let place: u8 = digits.parse().ok()?;
        if place == 0 || ordinal[digits.len()..] != *ordinal_suffix(place as u32) {
            return None;
        }
        Some(Self::group_place(group.to_ascii_uppercase(), place))
    }

    /// ID of the match this placeholder depends on, if any.
    pub fn source_match(&self) -> Option<&str> {
        match self {
            Self::Winner(key) | Self::Loser(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupPlace { group, place } => write!(
                f,
                "group-{}-{}{}",
                group.to_ascii_lowercase(),
                place,
                ordinal_suffix(*place as u32)
            ),
            Self::BestSecond => f.write_str("bestSecond"),
            Self::Winner(key) => write!(f, "{key}-winner"),
            Self::Loser(key) => write!(f, "{key}-loser"),
            Self::Tbd => f.write_str("TBD"),
        }
    }
}

impl TryFrom<String> for Placeholder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a placeholder: {value}"))
    }
}

impl From<Placeholder> for String {
    fn from(value: Placeholder) -> Self {
        value.to_string()
    }
}

/// English ordinal suffix (`1` → `"st"`, `12` → `"th"`, `23` → `"rd"`).
pub fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Whether a raw team reference string is a placeholder.
///
/// True for `TBD`, anything containing `group-`, a `-1st`/`-2nd`/`-3rd`/`-4th`
/// place marker, `bestSecond`, or a winner/loser marker.
pub fn is_placeholder(s: &str) -> bool {
    const MARKERS: [&str; 8] = [
        "group-", "-1st", "-2nd", "-3rd", "-4th", "bestSecond", "-winner", "-loser",
    ];
    s == "TBD" || MARKERS.iter().any(|m| s.contains(m))
}
