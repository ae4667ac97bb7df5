//! Round-robin pairing generation (circle method).
//!
//! # Algorithm
//!
//! 1. Append a bye if the team count is odd.
//! 2. Fix position 0; rotate positions `1..n` one step per round.
//! 3. Each round pairs position `i` with position `n - 1 - i`.
//! 4. Pairings touching the bye are dropped.
//!
//! `n` teams yield `n(n-1)/2` pairings over `n - 1` rounds (`n` rounds
//! when `n` is odd). Every unordered pair appears exactly once.
//!
//! # Reference
//! Rasmussen & Trick (2008), "Round robin scheduling - a survey", EJOR 188(3)

use serde::{Deserialize, Serialize};

use crate::models::{GroupAssignment, Team};

/// Two teams that meet once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    /// Home team ID.
    pub team_a: String,
    /// Away team ID.
    pub team_b: String,
    /// Group label.
    pub group: String,
    /// Circle-method round (1-based).
    pub round: u32,
}

impl Pairing {
    /// Whether the given team plays in this pairing.
    pub fn involves(&self, team_id: &str) -> bool {
        self.team_a == team_id || self.team_b == team_id
    }
}

/// Rounds of a single round robin over `n` positions.
///
/// Each round lists `(home, away)` index pairs; byes are already removed.
pub fn round_robin_rounds(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }

    // None = bye
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let size = slots.len();

    let mut rounds = Vec::with_capacity(size - 1);
    for round in 0..size - 1 {
        let mut pairs = Vec::with_capacity(size / 2);
        for i in 0..size / 2 {
            let (a, b) = (slots[i], slots[size - 1 - i]);
            if let (Some(a), Some(b)) = (a, b) {
                // alternate home side of the fixed position
                if i == 0 && round % 2 == 1 {
                    pairs.push((b, a));
                } else {
                    pairs.push((a, b));
                }
            }
        }
        rounds.push(pairs);
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Pairings of one group.
pub fn generate_pairings(teams: &[&Team], group: &str) -> Vec<Pairing> {
    round_robin_rounds(teams.len())
        .into_iter()
        .enumerate()
        .flat_map(|(r, pairs)| {
            pairs.into_iter().map(move |(a, b)| Pairing {
                team_a: teams[a].id.clone(),
                team_b: teams[b].id.clone(),
                group: group.to_string(),
                round: r as u32 + 1,
            })
        })
        .collect()
}

/// Pairings of every group, group by group.
pub fn generate_group_pairings(groups: &[GroupAssignment<'_>]) -> Vec<Pairing> {
    let pairings: Vec<Pairing> = groups
        .iter()
        .flat_map(|g| generate_pairings(&g.teams, &g.label))
        .collect();
    tracing::debug!(
        groups = groups.len(),
        pairings = pairings.len(),
        "generated group pairings"
    );
    pairings
}
