//! Generated schedule (solution) model.
//!
//! A generated schedule is the complete output of one pipeline run: every
//! match in chronological order, the phase slices over them, the initial
//! standings and the notices raised while degrading input or relaxing
//! constraints.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    FinalsPreset, GroupSystem, Locale, MatchPhase, RefereeConfig, ScheduledMatch, Standing,
    TimeWindow,
};

/// Category of a non-fatal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    /// An input value was replaced by a safe default.
    DegradedInput,
    /// A soft constraint could not be met and was relaxed.
    ConstraintInfeasibility,
}

/// A non-fatal observation made during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Creates a degraded-input notice and logs it.
    pub fn degraded(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(kind = "degraded_input", "{message}");
        Self {
            kind: NoticeKind::DegradedInput,
            message,
        }
    }

    /// Creates a constraint-infeasibility notice and logs it.
    pub fn infeasible(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(kind = "constraint_infeasibility", "{message}");
        Self {
            kind: NoticeKind::ConstraintInfeasibility,
            message,
        }
    }
}

/// A named, time-bounded slice of the match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub phase: MatchPhase,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// IDs of the matches in this phase, chronological.
    pub match_ids: Vec<String>,
}

/// Tournament metadata echoed into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentMeta {
    pub name: String,
    pub group_system: GroupSystem,
    pub number_of_fields: u32,
    pub number_of_groups: u32,
    /// Preset that was asked for.
    pub requested_preset: FinalsPreset,
    /// Preset actually generated after fallbacks.
    pub effective_preset: FinalsPreset,
    pub referee_config: RefereeConfig,
    pub locale: Locale,
}

/// Root output of the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    /// All matches ordered by slot, then field.
    pub all_matches: Vec<ScheduledMatch>,
    /// Phases with at least one match.
    pub phases: Vec<Phase>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub total_duration_minutes: i64,
    /// All-zero standings, one per team.
    pub initial_standings: Vec<Standing>,
    pub meta: TournamentMeta,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl GeneratedSchedule {
    /// Builds phases and event bounds from an ordered match list.
    pub fn assemble(
        all_matches: Vec<ScheduledMatch>,
        initial_standings: Vec<Standing>,
        meta: TournamentMeta,
        notices: Vec<Notice>,
        fallback_start: NaiveDateTime,
    ) -> Self {
        let phases = build_phases(&all_matches);
        let start = all_matches
            .iter()
            .map(|m| m.start)
            .min()
            .unwrap_or(fallback_start);
        let end = all_matches.iter().map(|m| m.end).max().unwrap_or(start);
        Self {
            all_matches,
            phases,
            start,
            end,
            total_duration_minutes: TimeWindow::new(start, end).duration_minutes(),
            initial_standings,
            meta,
            notices,
        }
    }

    /// Finds a match by ID.
    pub fn match_by_id(&self, id: &str) -> Option<&ScheduledMatch> {
        self.all_matches.iter().find(|m| m.id == id)
    }

    /// Matches of a phase, chronological.
    pub fn matches_in_phase(&self, phase: MatchPhase) -> Vec<&ScheduledMatch> {
        self.all_matches.iter().filter(|m| m.phase == phase).collect()
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.all_matches.len()
    }

    /// Sets or clears the referee of a match, keeping its identity.
    ///
    /// Returns `false` if no match has this ID.
    pub fn assign_referee(&mut self, match_id: &str, referee: Option<u32>) -> bool {
        match self.all_matches.iter_mut().find(|m| m.id == match_id) {
            Some(m) => {
                m.referee = referee;
                true
            }
            None => false,
        }
    }

    /// Moves a match to another field in the same slot, keeping its identity.
    ///
    /// Returns `false` if no match has this ID or `field` is 0. The result is
    /// not checked for clashes; run the conflict detector afterwards.
    pub fn move_to_field(&mut self, match_id: &str, field: u32) -> bool {
        if field == 0 {
            return false;
        }
        match self.all_matches.iter_mut().find(|m| m.id == match_id) {
            Some(m) => {
                m.field = field;
                true
            }
            None => false,
        }
    }

    /// Whether generation ran without any notices.
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty()
    }
}

fn build_phases(matches: &[ScheduledMatch]) -> Vec<Phase> {
    MatchPhase::ALL
        .iter()
        .filter_map(|&phase| {
            let in_phase: Vec<&ScheduledMatch> =
                matches.iter().filter(|m| m.phase == phase).collect();
            let start = in_phase.iter().map(|m| m.start).min()?;
            let end = in_phase.iter().map(|m| m.end).max()?;
            Some(Phase {
                phase,
                start,
                end,
                match_ids: in_phase.iter().map(|m| m.id.clone()).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamRef;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn m(id: &str, phase: MatchPhase, start: NaiveDateTime) -> ScheduledMatch {
        let w = TimeWindow::new(start, start + Duration::minutes(10));
        ScheduledMatch::new(id, phase, TeamRef::team("a"), TeamRef::team("b"), w)
    }

    fn meta() -> TournamentMeta {
        TournamentMeta {
            name: "Cup".into(),
            group_system: GroupSystem::GroupsAndFinals,
            number_of_fields: 1,
            number_of_groups: 2,
            requested_preset: FinalsPreset::FinalOnly,
            effective_preset: FinalsPreset::FinalOnly,
            referee_config: RefereeConfig::default(),
            locale: Locale::De,
        }
    }

    fn sample() -> GeneratedSchedule {
        let matches = vec![
            m("g1", MatchPhase::GroupStage, at(10, 0)),
            m("g2", MatchPhase::GroupStage, at(10, 12)),
            m("final", MatchPhase::Final, at(10, 40)),
        ];
        GeneratedSchedule::assemble(matches, Vec::new(), meta(), Vec::new(), at(9, 0))
    }

    #[test]
    fn test_assemble_bounds() {
        let s = sample();
        assert_eq!(s.start, at(10, 0));
        assert_eq!(s.end, at(10, 50));
        assert_eq!(s.total_duration_minutes, 50);
        assert!(s.is_clean());
    }

    #[test]
    fn test_only_non_empty_phases() {
        let s = sample();
        let phases: Vec<MatchPhase> = s.phases.iter().map(|p| p.phase).collect();
        assert_eq!(phases, vec![MatchPhase::GroupStage, MatchPhase::Final]);
        assert_eq!(s.phases[0].match_ids, vec!["g1", "g2"]);
        assert_eq!(s.phases[0].end, at(10, 22));
    }

    #[test]
    fn test_empty_schedule_uses_fallback_start() {
        let s = GeneratedSchedule::assemble(Vec::new(), Vec::new(), meta(), Vec::new(), at(9, 0));
        assert_eq!(s.start, at(9, 0));
        assert_eq!(s.total_duration_minutes, 0);
        assert!(s.phases.is_empty());
    }

    #[test]
    fn test_identity_preserving_edits() {
        let mut s = sample();
        assert!(s.assign_referee("g2", Some(3)));
        assert!(s.move_to_field("g2", 2));
        let g2 = s.match_by_id("g2").unwrap();
        assert_eq!(g2.referee, Some(3));
        assert_eq!(g2.field, 2);
        assert_eq!(s.all_matches[1].id, "g2");

        assert!(s.assign_referee("g2", None));
        assert_eq!(s.match_by_id("g2").unwrap().referee, None);
        assert!(!s.assign_referee("nope", Some(1)));
        assert!(!s.move_to_field("g1", 0));
    }

    #[test]
    fn test_notice_factories() {
        let n = Notice::degraded("bad date");
        assert_eq!(n.kind, NoticeKind::DegradedInput);
        let n = Notice::infeasible("rest relaxed");
        assert_eq!(n.kind, NoticeKind::ConstraintInfeasibility);
    }

    #[test]
    fn test_matches_in_phase() {
        let s = sample();
        assert_eq!(s.matches_in_phase(MatchPhase::GroupStage).len(), 2);
        assert!(s.matches_in_phase(MatchPhase::Semifinal).is_empty());
        assert_eq!(s.match_count(), 3);
    }
}
