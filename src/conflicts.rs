//! Conflict detection over arbitrary match lists.
//!
//! Works on any list of [`ScheduledMatch`], including hand-edited ones, and
//! reports every clash it finds. Nothing is modified.
//!
//! # Rules
//!
//! Two matches clash on a resource (team, referee or field) when their
//! half-open windows overlap: `start1 < end2 && start2 < end1`.
//!
//! | Kind | Severity |
//! |------|----------|
//! | `team_double_booking` | error |
//! | `referee_double_booking` | error |
//! | `field_overlap` | error |
//! | `dependency_violation` | error |
//! | `break_violation` | warning |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::ScheduledMatch;

/// Conflict category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    TeamDoubleBooking,
    RefereeDoubleBooking,
    FieldOverlap,
    /// Gap between a team's consecutive matches is below the minimum.
    BreakViolation,
    /// A match starts before a match it depends on has ended.
    DependencyViolation,
}

/// Conflict severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A detected conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    /// IDs of the matches involved, in list order.
    pub match_ids: Vec<String>,
    /// Team key, referee number or field number the clash is on.
    pub resource: String,
    pub message: String,
}

impl Conflict {
    fn new(kind: ConflictKind, ids: [&str; 2], resource: String, message: String) -> Self {
        let severity = match kind {
            ConflictKind::BreakViolation => Severity::Warning,
            _ => Severity::Error,
        };
        Self {
            kind,
            severity,
            match_ids: ids.iter().map(|s| s.to_string()).collect(),
            resource,
            message,
        }
    }
}

/// Checks match lists for overlaps, short breaks and ordering errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    min_break_minutes: i64,
}

impl ConflictDetector {
    /// Creates a detector without a break requirement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum minutes between two matches of the same team.
    pub fn with_min_break_minutes(mut self, minutes: i64) -> Self {
        self.min_break_minutes = minutes.max(0);
        self
    }

    /// All conflicts in `matches`, errors before warnings.
    pub fn detect(&self, matches: &[ScheduledMatch]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let mut teams: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut referees: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut fields: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, m) in matches.iter().enumerate() {
            for key in [m.home.key(), m.away.key()].into_iter().flatten() {
                let entry = teams.entry(key).or_default();
                // a team on both sides is one booking
                if entry.last() != Some(&i) {
                    entry.push(i);
                }
            }
            if let Some(r) = m.referee {
                referees.entry(r).or_default().push(i);
            }
            fields.entry(m.field).or_default().push(i);
        }

        for (team, indices) in &teams {
            overlaps(matches, indices, |a, b| {
                conflicts.push(Conflict::new(
                    ConflictKind::TeamDoubleBooking,
                    [&a.id, &b.id],
                    team.clone(),
                    format!("team {team} plays {} and {} at the same time", a.id, b.id),
                ));
            });
        }
        for (referee, indices) in &referees {
            overlaps(matches, indices, |a, b| {
                conflicts.push(Conflict::new(
                    ConflictKind::RefereeDoubleBooking,
                    [&a.id, &b.id],
                    referee.to_string(),
                    format!("referee {referee} is booked for {} and {}", a.id, b.id),
                ));
            });
        }
        for (field, indices) in &fields {
            overlaps(matches, indices, |a, b| {
                conflicts.push(Conflict::new(
                    ConflictKind::FieldOverlap,
                    [&a.id, &b.id],
                    field.to_string(),
                    format!("field {field} hosts {} and {} at once", a.id, b.id),
                ));
            });
        }

        self.dependencies(matches, &mut conflicts);
        if self.min_break_minutes > 0 {
            self.breaks(matches, &teams, &mut conflicts);
        }

        conflicts.sort_by_key(|c| c.severity);
        if !conflicts.is_empty() {
            tracing::debug!(count = conflicts.len(), "conflicts detected");
        }
        conflicts
    }

    fn dependencies(&self, matches: &[ScheduledMatch], conflicts: &mut Vec<Conflict>) {
        let by_id: HashMap<&str, &ScheduledMatch> =
            matches.iter().map(|m| (m.id.as_str(), m)).collect();
        for m in matches {
            for source in m.source_matches() {
                let Some(s) = by_id.get(source) else {
                    continue;
                };
                if m.start < s.end {
                    conflicts.push(Conflict::new(
                        ConflictKind::DependencyViolation,
                        [&s.id, &m.id],
                        source.to_string(),
                        format!("{} starts before {} has ended", m.id, s.id),
                    ));
                }
            }
        }
    }

    fn breaks(
        &self,
        matches: &[ScheduledMatch],
        teams: &BTreeMap<String, Vec<usize>>,
        conflicts: &mut Vec<Conflict>,
    ) {
        for (team, indices) in teams {
            let mut ordered = indices.clone();
            ordered.sort_by_key(|&i| (matches[i].start, matches[i].end));
            for pair in ordered.windows(2) {
                let (a, b) = (&matches[pair[0]], &matches[pair[1]]);
                let gap = a.window().gap_minutes_to(&b.window());
                // negative gaps are overlaps, reported above
                if (0..self.min_break_minutes).contains(&gap) {
                    conflicts.push(Conflict::new(
                        ConflictKind::BreakViolation,
                        [&a.id, &b.id],
                        team.clone(),
                        format!(
                            "team {team} rests {gap} min between {} and {} (minimum {})",
                            a.id, b.id, self.min_break_minutes
                        ),
                    ));
                }
            }
        }
    }
}

/// Calls `report` for every overlapping pair among `indices`.
fn overlaps<F>(matches: &[ScheduledMatch], indices: &[usize], mut report: F)
where
    F: FnMut(&ScheduledMatch, &ScheduledMatch),
{
    for (k, &i) in indices.iter().enumerate() {
        for &j in &indices[k + 1..] {
            let (a, b) = (&matches[i], &matches[j]);
            if a.window().overlaps(&b.window()) {
                report(a, b);
            }
        }
    }
}

/// Whether any conflict is an error.
pub fn has_errors(conflicts: &[Conflict]) -> bool {
    conflicts.iter().any(|c| c.severity == Severity::Error)
}
