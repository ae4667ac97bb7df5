//! Schedule quality metrics (KPIs).
//!
//! Computes tournament-level indicators from a list of scheduled matches.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Duration | First kick-off to last final whistle |
//! | Slots Used | Distinct slots with at least one match |
//! | Field Utilization | Matches / (slots used × fields) |
//! | Min / Avg Rest | Gap between consecutive matches of a team |
//! | Referee Spread | Max minus min matches per referee |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::ScheduledMatch;
use crate::referee::referee_workload;

/// Schedule performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleKpi {
    /// Minutes from the first start to the last end.
    pub total_duration_minutes: i64,
    /// Number of distinct slots in use.
    pub slots_used: usize,
    /// Highest field number in use.
    pub fields_used: u32,
    /// Fraction of (slot, field) cells holding a match (0.0..1.0).
    pub field_utilization: f64,
    /// Shortest rest of any team between two of its matches.
    pub min_rest_minutes: Option<i64>,
    /// Mean rest between consecutive matches of a team.
    pub avg_rest_minutes: f64,
    /// Matches per referee.
    pub referee_workload: BTreeMap<u32, usize>,
    /// Max minus min of `referee_workload`.
    pub referee_spread: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from scheduled matches.
    ///
    /// Rest is measured for concrete teams only; placeholders are skipped.
    pub fn calculate(matches: &[ScheduledMatch]) -> Self {
        let start = matches.iter().map(|m| m.start).min();
        let end = matches.iter().map(|m| m.end).max();
        let total_duration_minutes = match (start, end) {
            (Some(s), Some(e)) => (e - s).num_minutes(),
            _ => 0,
        };

        let slots: BTreeSet<u32> = matches.iter().map(|m| m.slot).collect();
        let fields_used = matches.iter().map(|m| m.field).max().unwrap_or(0);
        let cells = slots.len() * fields_used as usize;
        let field_utilization = if cells == 0 {
            0.0
        } else {
            matches.len() as f64 / cells as f64
        };

        // Rest per team
        let mut by_team: BTreeMap<&str, Vec<&ScheduledMatch>> = BTreeMap::new();
        for m in matches {
            for id in m.team_ids() {
                by_team.entry(id).or_default().push(m);
            }
        }
        let mut rests = Vec::new();
        for team_matches in by_team.values_mut() {
            team_matches.sort_by_key(|m| m.start);
            for pair in team_matches.windows(2) {
                rests.push(pair[0].window().gap_minutes_to(&pair[1].window()));
            }
        }
        let min_rest_minutes = rests.iter().copied().min();
        let avg_rest_minutes = if rests.is_empty() {
            0.0
        } else {
            rests.iter().sum::<i64>() as f64 / rests.len() as f64
        };

        let referee_workload = referee_workload(matches);
        let referee_spread = match (
            referee_workload.values().max(),
            referee_workload.values().min(),
        ) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        Self {
            total_duration_minutes,
            slots_used: slots.len(),
            fields_used,
            field_utilization,
            min_rest_minutes,
            avg_rest_minutes,
            referee_workload,
            referee_spread,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_rest_minutes: i64, max_referee_spread: usize) -> bool {
        self.min_rest_minutes.map_or(true, |r| r >= min_rest_minutes)
            && self.referee_spread <= max_referee_spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchPhase, TeamRef, TimeWindow};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(min: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            + Duration::minutes(min)
    }

    fn m(id: &str, home: &str, away: &str, slot: u32, field: u32) -> ScheduledMatch {
        let start = 12 * slot as i64;
        let w = TimeWindow::new(at(start), at(start + 10));
        ScheduledMatch::new(id, MatchPhase::GroupStage, TeamRef::team(home), TeamRef::team(away), w)
            .at_cell(slot, field)
    }

    #[test]
    fn test_kpi_basic() {
        let matches = vec![
            m("a", "t1", "t2", 0, 1),
            m("b", "t3", "t4", 0, 2),
            m("c", "t1", "t3", 1, 1),
        ];
        let kpi = ScheduleKpi::calculate(&matches);
        assert_eq!(kpi.total_duration_minutes, 22);
        assert_eq!(kpi.slots_used, 2);
        assert_eq!(kpi.fields_used, 2);
        assert!((kpi.field_utilization - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_rest() {
        let matches = vec![
            m("a", "t1", "t2", 0, 1),
            m("b", "t1", "t3", 1, 1),
            m("c", "t2", "t3", 3, 1),
        ];
        let kpi = ScheduleKpi::calculate(&matches);
        // t1: 2, t2: 26, t3: 14
        assert_eq!(kpi.min_rest_minutes, Some(2));
        assert!((kpi.avg_rest_minutes - 14.0).abs() < 1e-10);
        assert!(kpi.meets_thresholds(2, 0));
        assert!(!kpi.meets_thresholds(5, 0));
    }

    #[test]
    fn test_kpi_referees() {
        let mut matches = vec![
            m("a", "t1", "t2", 0, 1),
            m("b", "t3", "t4", 1, 1),
            m("c", "t1", "t3", 2, 1),
        ];
        matches[0].referee = Some(1);
        matches[1].referee = Some(2);
        matches[2].referee = Some(1);
        let kpi = ScheduleKpi::calculate(&matches);
        assert_eq!(kpi.referee_workload[&1], 2);
        assert_eq!(kpi.referee_spread, 1);
        assert!(!kpi.meets_thresholds(0, 0));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&[]);
        assert_eq!(kpi.total_duration_minutes, 0);
        assert_eq!(kpi.field_utilization, 0.0);
        assert_eq!(kpi.min_rest_minutes, None);
        assert!(kpi.meets_thresholds(10, 0));
    }
}
