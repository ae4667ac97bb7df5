//! Referee assignment.
//!
//! # Modes
//!
//! - **None**: matches are left untouched.
//! - **Organizer**: referees `1..=n` from an organizer pool. Each pick comes
//!   from the referees with the fewest assignments so far, so workloads never
//!   differ by more than one. Among those, a referee free in the slot who does
//!   not exceed `max_consecutive_matches` is preferred; ties follow rotation
//!   order after the previously assigned referee.
//! - **Teams**: on each field, the home team of the previous match referees
//!   the next one. The first match on a field has no referee. Knockout
//!   matches are only covered under [`FinalsRefereeMode::NeutralTeams`].
//!
//! Manual assignments are applied last and always win.
//!
//! # Reference
//! Duarte et al. (2007), "Referee assignment in sports leagues", PATAT

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{FinalsRefereeMode, Notice, RefereeConfig, RefereeMode, ScheduledMatch, Team};

/// Assigns referee numbers according to a [`RefereeConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RefereeAssigner<'a> {
    config: &'a RefereeConfig,
}

impl<'a> RefereeAssigner<'a> {
    /// Creates an assigner for the given configuration.
    pub fn new(config: &'a RefereeConfig) -> Self {
        Self { config }
    }

    /// Writes referee numbers into `matches`.
    ///
    /// `teams` is the configured team list; in teams mode a referee number
    /// is the 1-based position of a team in it. Returns notices for
    /// relaxations and ignored manual assignments.
    pub fn assign(&self, matches: &mut [ScheduledMatch], teams: &[Team]) -> Vec<Notice> {
        self.assign_from(matches, 0, teams)
    }

    /// Like [`assign`](Self::assign), but keeps `matches[..from]` as they are.
    ///
    /// The referees already carried by the kept matches seed the organizer
    /// workloads and rotation, so appended matches continue the balance
    /// from the actual assignments.
    pub fn assign_from(
        &self,
        matches: &mut [ScheduledMatch],
        from: usize,
        teams: &[Team],
    ) -> Vec<Notice> {
        let mut notices = Vec::new();
        match &self.config.mode {
            RefereeMode::None => {}
            RefereeMode::Organizer {
                number_of_referees,
                max_consecutive_matches,
                ..
            } => {
                let pool = if *number_of_referees == 0 {
                    notices.push(Notice::degraded(
                        "referee pool of 0 replaced by a single referee",
                    ));
                    1
                } else {
                    *number_of_referees
                };
                let relaxed = assign_organizer(matches, from, pool, *max_consecutive_matches);
                if relaxed > 0 {
                    notices.push(Notice::infeasible(format!(
                        "{relaxed} referee pick(s) double-booked or over the consecutive limit"
                    )));
                }
            }
            RefereeMode::Teams => {
                assign_teams(matches, from, teams, self.config.finals_referee_mode);
            }
        }
        self.apply_manual(matches, from, &mut notices);
        tracing::debug!(
            mode = self.config.mode.as_str(),
            matches = matches.len() - from.min(matches.len()),
            "referees assigned"
        );
        notices
    }

    fn apply_manual(
        &self,
        matches: &mut [ScheduledMatch],
        from: usize,
        notices: &mut Vec<Notice>,
    ) {
        for (id, referee) in &self.config.manual_assignments {
            match matches.iter().position(|m| &m.id == id) {
                Some(i) if i >= from => matches[i].referee = Some(*referee),
                Some(_) => {}
                None => notices.push(Notice::degraded(format!(
                    "manual referee assignment for unknown match '{id}' ignored"
                ))),
            }
        }
    }
}

/// Match indices in (slot, field) order.
fn chronological(matches: &[ScheduledMatch]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..matches.len()).collect();
    order.sort_by_key(|&i| (matches[i].slot, matches[i].field, matches[i].match_number));
    order
}

#[derive(Debug, Clone, Copy, Default)]
struct Load {
    count: u32,
    last_slot: Option<u32>,
    /// Consecutive slots ending at `last_slot`.
    run: u32,
}

impl Load {
    fn run_if_assigned(&self, slot: u32) -> u32 {
        match self.last_slot {
            Some(last) if last == slot => self.run,
            Some(last) if last + 1 == slot => self.run + 1,
            _ => 1,
        }
    }

    fn book(&mut self, slot: u32) {
        self.run = self.run_if_assigned(slot);
        self.last_slot = Some(slot);
        self.count += 1;
    }
}

/// Assigns `matches[from..]`; earlier matches only seed the loads.
///
/// Returns the number of picks that had to break a soft rule.
fn assign_organizer(
    matches: &mut [ScheduledMatch],
    from: usize,
    pool: u32,
    max_consecutive: Option<u32>,
) -> usize {
    let mut loads = vec![Load::default(); pool as usize];
    let mut busy: HashMap<u32, HashSet<usize>> = HashMap::new();
    let mut cursor = 0usize;
    let mut relaxed = 0;

    for index in chronological(matches) {
        let slot = matches[index].slot;
        if index < from {
            // referees outside the pool carry no load
            let kept = matches[index]
                .referee
                .and_then(|r| (r as usize).checked_sub(1))
                .filter(|&r| r < loads.len());
            if let Some(r) = kept {
                busy.entry(slot).or_default().insert(r);
                loads[r].book(slot);
                cursor = (r + 1) % loads.len();
            }
            continue;
        }
        let min = loads.iter().map(|l| l.count).min().unwrap_or(0);
        // rotation order starting after the last pick
        let rotation: Vec<usize> = (0..loads.len())
            .map(|k| (cursor + k) % loads.len())
            .filter(|&r| loads[r].count == min)
            .collect();

        let in_slot = busy.entry(slot).or_default();
        let free = |r: &usize| !in_slot.contains(r);
        let within_limit = |r: &usize| {
            max_consecutive.map_or(true, |k| loads[*r].run_if_assigned(slot) <= k.max(1))
        };

        let pick = rotation
            .iter()
            .copied()
            .find(|r| free(r) && within_limit(r))
            .or_else(|| rotation.iter().copied().find(|r| free(r)));
        let pick = match pick {
            Some(r) => r,
            None => {
                relaxed += 1;
                rotation[0]
            }
        };
        if !within_limit(&pick) && free(&pick) {
            relaxed += 1;
        }

        in_slot.insert(pick);
        loads[pick].book(slot);
        cursor = (pick + 1) % loads.len();
        matches[index].referee = Some(pick as u32 + 1);
    }
    relaxed
}

fn assign_teams(
    matches: &mut [ScheduledMatch],
    from: usize,
    teams: &[Team],
    finals_mode: Option<FinalsRefereeMode>,
) {
    let number = |id: &str| teams.iter().position(|t| t.id == id).map(|i| i as u32 + 1);
    let mut previous_home: BTreeMap<u32, Option<String>> = BTreeMap::new();

    for index in chronological(matches) {
        let field = matches[index].field;
        let referee_team = previous_home.get(&field).cloned().flatten();
        let m = &matches[index];

        let referee = referee_team.and_then(|team_id| {
            if m.phase.is_playoff() && !is_valid_finals_referee(&team_id, m, finals_mode) {
                return None;
            }
            number(&team_id)
        });

        previous_home.insert(field, m.home.team_id().map(str::to_string));
        if index >= from {
            matches[index].referee = referee;
        }
    }
}

/// Whether `team_id` may referee the knockout match `m`.
///
/// Always false without a finals mode or under [`FinalsRefereeMode::None`].
/// Under [`FinalsRefereeMode::NeutralTeams`] the team must not play in `m`.
pub fn is_valid_finals_referee(
    team_id: &str,
    m: &ScheduledMatch,
    finals_mode: Option<FinalsRefereeMode>,
) -> bool {
    match finals_mode {
        None | Some(FinalsRefereeMode::None) => false,
        Some(FinalsRefereeMode::NeutralTeams) => !m.involves_team(team_id),
    }
}

/// Number of matches per referee.
pub fn referee_workload(matches: &[ScheduledMatch]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for r in matches.iter().filter_map(|m| m.referee) {
        *counts.entry(r).or_insert(0) += 1;
    }
    counts
}
