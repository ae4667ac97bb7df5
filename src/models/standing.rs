//! Group standings.
//!
//! Standings are always derived from finished group-stage matches and never
//! stored: resolving a placeholder recomputes them, so a corrected score is
//! reflected immediately.

use serde::{Deserialize, Serialize};

use super::{MatchPhase, ScheduledMatch, Team};

/// Points for a win.
pub const POINTS_WIN: u32 = 3;
/// Points for a draw.
pub const POINTS_DRAW: u32 = 1;

/// Aggregate group-stage record of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team_id: String,
    pub group: Option<String>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl Standing {
    /// All-zero standing for a team.
    pub fn initial(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            group: team.group.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
        }
    }

    /// Goals for minus goals against.
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_WIN;
            }
            std::cmp::Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_DRAW;
            }
            std::cmp::Ordering::Less => self.lost += 1,
        }
    }

    /// Ranking order: points, goal difference, goals scored (all descending).
    pub fn compare(&self, other: &Self) -> std::cmp::Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| other.goal_difference().cmp(&self.goal_difference()))
            .then_with(|| other.goals_for.cmp(&self.goals_for))
    }
}

/// Computes ranked standings for `teams` from finished group-stage matches.
///
/// Only matches where both sides are among `teams` count. Teams that tie on
/// every criterion keep their configuration order.
pub fn compute_standings(teams: &[&Team], matches: &[ScheduledMatch]) -> Vec<Standing> {
    let mut table: Vec<Standing> = teams.iter().map(|t| Standing::initial(t)).collect();
    let position = |id: &str| table_index(teams, id);

    for m in matches {
        if m.phase != MatchPhase::GroupStage {
            continue;
        }
        let (Some(score), Some(home), Some(away)) = (m.score, m.home.team_id(), m.away.team_id())
        else {
            continue;
        };
        let (Some(h), Some(a)) = (position(home), position(away)) else {
            continue;
        };
        table[h].record(score.home, score.away);
        table[a].record(score.away, score.home);
    }

    table.sort_by(|a, b| a.compare(b));
    table
}

fn table_index(teams: &[&Team], id: &str) -> Option<usize> {
    teams.iter().position(|t| t.id == id)
}

/// Whether every group-stage match of `group` has a result.
///
/// A group with no matches is never finished.
pub fn group_finished(group: &str, matches: &[ScheduledMatch]) -> bool {
    let mut any = false;
    for m in matches {
        if m.phase == MatchPhase::GroupStage && m.group.as_deref() == Some(group) {
            if !m.is_finished() {
                return false;
            }
            any = true;
        }
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Score, TeamRef, TimeWindow};
    use chrono::NaiveDate;

    fn teams() -> Vec<Team> {
        vec![
            Team::new("a").with_group("A"),
            Team::new("b").with_group("A"),
            Team::new("c").with_group("A"),
        ]
    }

    fn played(id: &str, home: &str, away: &str, score: Option<Score>) -> ScheduledMatch {
        let d = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let w = TimeWindow::new(
            d.and_hms_opt(10, 0, 0).unwrap(),
            d.and_hms_opt(10, 10, 0).unwrap(),
        );
        let mut m = ScheduledMatch::new(
            id,
            MatchPhase::GroupStage,
            TeamRef::team(home),
            TeamRef::team(away),
            w,
        )
        .with_group("A");
        m.score = score;
        m
    }

    #[test]
    fn test_initial_standing() {
        let t = Team::new("a").with_group("A");
        let s = Standing::initial(&t);
        assert_eq!(s.points, 0);
        assert_eq!(s.played, 0);
        assert_eq!(s.group.as_deref(), Some("A"));
    }

    #[test]
    fn test_compute_standings() {
        let teams = teams();
        let refs: Vec<&Team> = teams.iter().collect();
        let matches = vec![
            played("m1", "a", "b", Some(Score::new(2, 0))),
            played("m2", "b", "c", Some(Score::new(1, 1))),
            played("m3", "c", "a", Some(Score::new(3, 1))),
        ];

        let table = compute_standings(&refs, &matches);
        // c: 4 pts (+2), a: 3 pts (0), b: 1 pt (-2)
        assert_eq!(table[0].team_id, "c");
        assert_eq!(table[0].points, 4);
        assert_eq!(table[1].team_id, "a");
        assert_eq!(table[1].goal_difference(), 0);
        assert_eq!(table[2].team_id, "b");
        assert_eq!(table[2].drawn, 1);
        assert_eq!(table[2].lost, 1);
    }

    #[test]
    fn test_unplayed_matches_ignored() {
        let teams = teams();
        let refs: Vec<&Team> = teams.iter().collect();
        let matches = vec![
            played("m1", "b", "a", Some(Score::new(1, 0))),
            played("m2", "a", "c", None),
        ];
        let table = compute_standings(&refs, &matches);
        assert_eq!(table[0].team_id, "b");
        assert_eq!(table.iter().map(|s| s.played).sum::<u32>(), 2);
    }

    #[test]
    fn test_tie_keeps_configuration_order() {
        let teams = teams();
        let refs: Vec<&Team> = teams.iter().collect();
        let table = compute_standings(&refs, &[]);
        let order: Vec<&str> = table.iter().map(|s| s.team_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_group_finished() {
        let mut matches = vec![
            played("m1", "a", "b", Some(Score::new(2, 0))),
            played("m2", "b", "c", None),
        ];
        assert!(!group_finished("A", &matches));
        matches[1].score = Some(Score::new(0, 0));
        assert!(group_finished("A", &matches));
        assert!(!group_finished("B", &matches));
    }
}
