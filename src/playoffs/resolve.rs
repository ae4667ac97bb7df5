//! Placeholder resolution.
//!
//! A placeholder resolves to a real team only once its deciding condition
//! holds:
//!
//! - `group-x-Nth`: every group-stage match of group X is finished.
//! - `bestSecond`: every group is finished.
//! - `key-winner` / `key-loser`: match `key` has a decided score, and its
//!   own sides resolve.
//!
//! Until then a localized label is shown instead. Standings are recomputed
//! on every call; nothing is cached, so corrected scores show up at once.

use std::collections::BTreeMap;

use crate::models::{
    compute_standings, group_finished, ordinal_suffix, Locale, MatchPhase, Placeholder,
    ScheduledMatch, Side, Team, TeamRef,
};

/// Winner/loser chains deeper than this are treated as unresolved.
const MAX_DEPTH: usize = 16;

/// Teams, matches and label settings needed to resolve placeholders.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    teams: &'a [Team],
    matches: &'a [ScheduledMatch],
    locale: Locale,
    group_names: Option<&'a BTreeMap<String, String>>,
}

impl<'a> ResolveContext<'a> {
    /// Creates a context; teams must carry their group labels.
    pub fn new(teams: &'a [Team], matches: &'a [ScheduledMatch]) -> Self {
        Self {
            teams,
            matches,
            locale: Locale::De,
            group_names: None,
        }
    }

    /// Sets the label language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets custom group display names (label → name).
    pub fn with_group_names(mut self, names: &'a BTreeMap<String, String>) -> Self {
        self.group_names = Some(names);
        self
    }

    /// Team behind a reference, if already known.
    pub fn resolve(&self, team_ref: &TeamRef) -> Option<&'a Team> {
        self.resolve_at(team_ref, 0)
    }

    /// Team behind a placeholder, if already known.
    pub fn resolve_placeholder(&self, placeholder: &Placeholder) -> Option<&'a Team> {
        self.placeholder_at(placeholder, 0)
    }

    fn resolve_at(&self, team_ref: &TeamRef, depth: usize) -> Option<&'a Team> {
        match team_ref {
            TeamRef::Team(id) => self.team(id),
            TeamRef::Placeholder(p) => self.placeholder_at(p, depth),
        }
    }

    fn placeholder_at(&self, placeholder: &Placeholder, depth: usize) -> Option<&'a Team> {
        if depth > MAX_DEPTH {
            return None;
        }
        match placeholder {
            Placeholder::GroupPlace { group, place } => self.group_place(group, *place),
            Placeholder::BestSecond => self.best_second(),
            Placeholder::Winner(key) => self.outcome(key, true, depth),
            Placeholder::Loser(key) => self.outcome(key, false, depth),
            Placeholder::Tbd => None,
        }
    }

    fn team(&self, id: &str) -> Option<&'a Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Canonical spelling of a group label as used by the teams.
    fn canonical_group(&self, group: &str) -> Option<&'a str> {
        self.teams
            .iter()
            .filter_map(|t| t.group.as_deref())
            .find(|g| g.eq_ignore_ascii_case(group))
    }

    fn members(&self, group: &str) -> Vec<&'a Team> {
        self.teams.iter().filter(|t| t.in_group(group)).collect()
    }

    /// Distinct group labels in first-seen order.
    fn groups(&self) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = Vec::new();
        for g in self.teams.iter().filter_map(|t| t.group.as_deref()) {
            if !out.contains(&g) {
                out.push(g);
            }
        }
        out.sort_unstable();
        out
    }

    fn group_place(&self, group: &str, place: u8) -> Option<&'a Team> {
        let group = self.canonical_group(group)?;
        if place == 0 || !group_finished(group, self.matches) {
            return None;
        }
        let table = compute_standings(&self.members(group), self.matches);
        let standing = table.get(place as usize - 1)?;
        self.team(&standing.team_id)
    }

    fn best_second(&self) -> Option<&'a Team> {
        let groups = self.groups();
        if groups.is_empty() || !groups.iter().all(|g| group_finished(g, self.matches)) {
            return None;
        }
        let seconds: Vec<_> = groups
            .iter()
            .filter_map(|g| compute_standings(&self.members(g), self.matches).into_iter().nth(1))
            .collect();
        // min_by would keep the last of equals
        let mut best = seconds.first()?;
        for s in &seconds[1..] {
            if s.compare(best) == std::cmp::Ordering::Less {
                best = s;
            }
        }
        self.team(&best.team_id)
    }

    fn outcome(&self, key: &str, winner: bool, depth: usize) -> Option<&'a Team> {
        let m = self.matches.iter().find(|m| m.id == key)?;
        let won = m.score?.winner()?;
        let side = match (won, winner) {
            (Side::Home, true) | (Side::Away, false) => Side::Home,
            _ => Side::Away,
        };
        self.resolve_at(m.side(side), depth + 1)
    }

    /// Display name: the team name once known, otherwise a localized label.
    pub fn display_name(&self, team_ref: &TeamRef) -> String {
        if let Some(team) = self.resolve(team_ref) {
            return team.name.clone();
        }
        match team_ref {
            TeamRef::Team(id) => id.clone(),
            TeamRef::Placeholder(p) => self.placeholder_label(p),
        }
    }

    /// Localized label of an unresolved placeholder.
    pub fn placeholder_label(&self, placeholder: &Placeholder) -> String {
        match (self.locale, placeholder) {
            (Locale::De, Placeholder::GroupPlace { group, place }) => {
                format!("{place}. {}", self.group_display(group))
            }
            (Locale::En, Placeholder::GroupPlace { group, place }) => format!(
                "{place}{} {}",
                ordinal_suffix(*place as u32),
                self.group_display(group)
            ),
            (Locale::De, Placeholder::BestSecond) => "Bester Zweiter".to_string(),
            (Locale::En, Placeholder::BestSecond) => "Best runner-up".to_string(),
            (Locale::De, Placeholder::Winner(key)) => format!("Sieger {}", self.match_label(key)),
            (Locale::En, Placeholder::Winner(key)) => format!("Winner {}", self.match_label(key)),
            (Locale::De, Placeholder::Loser(key)) => {
                format!("Verlierer {}", self.match_label(key))
            }
            (Locale::En, Placeholder::Loser(key)) => format!("Loser {}", self.match_label(key)),
            (_, Placeholder::Tbd) => "TBD".to_string(),
        }
    }

    fn group_display(&self, group: &str) -> String {
        let label = self.canonical_group(group).unwrap_or(group);
        let custom = self.group_names.and_then(|names| {
            names
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(label))
                .map(|(_, v)| v.clone())
        });
        match (custom, self.locale) {
            (Some(name), _) => name,
            (None, Locale::De) => format!("Gruppe {label}"),
            (None, Locale::En) => format!("Group {label}"),
        }
    }

    fn match_label(&self, key: &str) -> String {
        self.matches
            .iter()
            .find(|m| m.id == key)
            .and_then(|m| m.label.clone())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Rewrites `home_name`/`away_name` of every match from current results.
pub fn refresh_names(
    matches: &mut [ScheduledMatch],
    teams: &[Team],
    locale: Locale,
    group_names: &BTreeMap<String, String>,
) {
    let names: Vec<(String, String)> = {
        let ctx = ResolveContext::new(teams, matches)
            .with_locale(locale)
            .with_group_names(group_names);
        matches
            .iter()
            .map(|m| (ctx.display_name(&m.home), ctx.display_name(&m.away)))
            .collect()
    };
    for (m, (home, away)) in matches.iter_mut().zip(names) {
        m.home_name = home;
        m.away_name = away;
    }
}

/// Whether any side of a playoff match still waits on a result.
pub fn has_open_placeholders(teams: &[Team], matches: &[ScheduledMatch]) -> bool {
    let ctx = ResolveContext::new(teams, matches);
    matches
        .iter()
        .filter(|m| m.phase != MatchPhase::GroupStage)
        .any(|m| ctx.resolve(&m.home).is_none() || ctx.resolve(&m.away).is_none())
}
