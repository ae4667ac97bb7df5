//! Scheduled match model.
//!
//! A scheduled match binds two team references to a slot, a field and a
//! wall-clock window. Its `id` never changes after creation: referee or
//! field edits mutate the match in place so external records keep pointing
//! at it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Placeholder, TeamRef, TimeWindow};

/// Tournament phase a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    GroupStage,
    RoundOf16,
    Quarterfinal,
    Semifinal,
    Final,
}

impl MatchPhase {
    /// All phases in chronological order.
    pub const ALL: [MatchPhase; 5] = [
        MatchPhase::GroupStage,
        MatchPhase::RoundOf16,
        MatchPhase::Quarterfinal,
        MatchPhase::Semifinal,
        MatchPhase::Final,
    ];

    /// Whether this is a knockout phase.
    pub fn is_playoff(self) -> bool {
        self != MatchPhase::GroupStage
    }

    /// Wire name (`"groupStage"`, `"roundOf16"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            MatchPhase::GroupStage => "groupStage",
            MatchPhase::RoundOf16 => "roundOf16",
            MatchPhase::Quarterfinal => "quarterfinal",
            MatchPhase::Semifinal => "semifinal",
            MatchPhase::Final => "final",
        }
    }
}

/// Home or away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Home,
    Away,
}

/// Final score of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Home goals.
    pub home: u32,
    /// Away goals.
    pub away: u32,
    /// Penalty shoot-out result `(home, away)`, if one was needed.
    #[serde(default)]
    pub penalties: Option<(u32, u32)>,
}

impl Score {
    /// Creates a regular-time score.
    pub fn new(home: u32, away: u32) -> Self {
        Self {
            home,
            away,
            penalties: None,
        }
    }

    /// Adds a shoot-out result.
    pub fn with_penalties(mut self, home: u32, away: u32) -> Self {
        self.penalties = Some((home, away));
        self
    }

    /// Winning side, falling back to the shoot-out on a draw.
    ///
    /// Returns `None` for an undecided draw.
    pub fn winner(&self) -> Option<Side> {
        let decide = |h: u32, a: u32| match h.cmp(&a) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        };
        decide(self.home, self.away)
            .or_else(|| self.penalties.and_then(|(h, a)| decide(h, a)))
    }

    /// Whether regular time ended level.
    pub fn is_draw(&self) -> bool {
        self.home == self.away
    }
}

/// A match bound to a slot, a field and a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMatch {
    /// Stable match identifier.
    pub id: String,
    /// Running number in chronological order (1-based).
    pub match_number: u32,
    /// Tournament phase.
    pub phase: MatchPhase,
    /// Group label for group-stage matches.
    #[serde(default)]
    pub group: Option<String>,
    /// Home side.
    pub home: TeamRef,
    /// Away side.
    pub away: TeamRef,
    /// Resolved home display name.
    #[serde(default)]
    pub home_name: String,
    /// Resolved away display name.
    #[serde(default)]
    pub away_name: String,
    /// Field number (1-based).
    pub field: u32,
    /// Global slot index (0-based).
    pub slot: u32,
    /// Kick-off.
    pub start: NaiveDateTime,
    /// Final whistle.
    pub end: NaiveDateTime,
    /// Referee number (pool number or team number, depending on mode).
    #[serde(default)]
    pub referee: Option<u32>,
    /// Result, once played.
    #[serde(default)]
    pub score: Option<Score>,
    /// Display label (`"Halbfinale 1"`, `"Final"`, ...).
    #[serde(default)]
    pub label: Option<String>,
}

impl ScheduledMatch {
    /// Creates a match; names default to the raw references.
    pub fn new(
        id: impl Into<String>,
        phase: MatchPhase,
        home: TeamRef,
        away: TeamRef,
        window: TimeWindow,
    ) -> Self {
        let home_name = raw_name(&home);
        let away_name = raw_name(&away);
        Self {
            id: id.into(),
            match_number: 0,
            phase,
            group: None,
            home,
            away,
            home_name,
            away_name,
            field: 1,
            slot: 0,
            start: window.start,
            end: window.end,
            referee: None,
            score: None,
            label: None,
        }
    }

    /// Places the match in a cell.
    pub fn at_cell(mut self, slot: u32, field: u32) -> Self {
        self.slot = slot;
        self.field = field;
        self
    }

    /// Sets the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the match number.
    pub fn with_number(mut self, match_number: u32) -> Self {
        self.match_number = match_number;
        self
    }

    /// Sets the referee.
    pub fn with_referee(mut self, referee: u32) -> Self {
        self.referee = Some(referee);
        self
    }

    /// Sets the score.
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Time window of this match.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.window().duration_minutes()
    }

    /// Whether a result has been recorded.
    pub fn is_finished(&self) -> bool {
        self.score.is_some()
    }

    /// Reference on the given side.
    pub fn side(&self, side: Side) -> &TeamRef {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Concrete team IDs taking part (placeholders skipped).
    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        [&self.home, &self.away].into_iter().filter_map(|r| r.team_id())
    }

    /// Whether the given concrete team plays in this match.
    pub fn involves_team(&self, team_id: &str) -> bool {
        self.team_ids().any(|id| id == team_id)
    }

    /// IDs of matches whose outcome feeds this one.
    pub fn source_matches(&self) -> impl Iterator<Item = &str> {
        [&self.home, &self.away]
            .into_iter()
            .filter_map(|r| r.placeholder().and_then(Placeholder::source_match))
    }
}

fn raw_name(team_ref: &TeamRef) -> String {
    match team_ref {
        TeamRef::Team(id) => id.clone(),
        TeamRef::Placeholder(p) => p.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> TimeWindow {
        let d = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        TimeWindow::new(
            d.and_hms_opt(10, 0, 0).unwrap(),
            d.and_hms_opt(10, 10, 0).unwrap(),
        )
    }

    #[test]
    fn test_score_winner() {
        assert_eq!(Score::new(2, 1).winner(), Some(Side::Home));
        assert_eq!(Score::new(0, 3).winner(), Some(Side::Away));
        assert_eq!(Score::new(1, 1).winner(), None);
        assert_eq!(Score::new(1, 1).with_penalties(4, 5).winner(), Some(Side::Away));
        assert!(Score::new(1, 1).is_draw());
    }

    #[test]
    fn test_match_builder() {
        let m = ScheduledMatch::new(
            "m1",
            MatchPhase::GroupStage,
            TeamRef::team("t1"),
            TeamRef::team("t2"),
            window(),
        )
        .at_cell(3, 2)
        .with_group("A")
        .with_number(7)
        .with_referee(1);

        assert_eq!(m.slot, 3);
        assert_eq!(m.field, 2);
        assert_eq!(m.match_number, 7);
        assert_eq!(m.group.as_deref(), Some("A"));
        assert_eq!(m.referee, Some(1));
        assert_eq!(m.duration_minutes(), 10);
        assert_eq!(m.home_name, "t1");
        assert!(m.involves_team("t2"));
        assert!(!m.involves_team("t3"));
        assert!(!m.is_finished());
    }

    #[test]
    fn test_source_matches() {
        let m = ScheduledMatch::new(
            "final",
            MatchPhase::Final,
            TeamRef::Placeholder(Placeholder::Winner("semi1".into())),
            TeamRef::Placeholder(Placeholder::Winner("semi2".into())),
            window(),
        );
        let sources: Vec<&str> = m.source_matches().collect();
        assert_eq!(sources, vec!["semi1", "semi2"]);
        assert_eq!(m.team_ids().count(), 0);
        assert_eq!(m.home_name, "semi1-winner");
    }

    #[test]
    fn test_phase_order() {
        assert!(MatchPhase::GroupStage < MatchPhase::RoundOf16);
        assert!(MatchPhase::Semifinal < MatchPhase::Final);
        assert!(!MatchPhase::GroupStage.is_playoff());
        assert!(MatchPhase::Quarterfinal.is_playoff());
        assert_eq!(MatchPhase::RoundOf16.as_str(), "roundOf16");
    }

    #[test]
    fn test_match_serde_roundtrip() {
        let m = ScheduledMatch::new(
            "semi1",
            MatchPhase::Semifinal,
            TeamRef::Placeholder(Placeholder::group_place("A", 2)),
            TeamRef::team("t9"),
            window(),
        )
        .with_score(Score::new(1, 1).with_penalties(3, 2));

        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"group-a-2nd\""));
        assert!(json.contains("\"phase\":\"semifinal\""));
        let back: ScheduledMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
