//! Property tests over generated schedules.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use u_tournament::models::{
    FinalsConfig, FinalsPreset, MatchPhase, RefereeConfig, RefereeMode, Team, TournamentConfig,
};
use u_tournament::playoffs::generate_bracket;
use u_tournament::referee::referee_workload;
use u_tournament::scheduler::{generate_pairings, ScheduleGenerator};
use u_tournament::validation::{validate_bracket, validate_matches};
use u_tournament::{has_errors, ConflictDetector, GeneratedSchedule};

const PRESETS: [FinalsPreset; 6] = [
    FinalsPreset::None,
    FinalsPreset::FinalOnly,
    FinalsPreset::Top4,
    FinalsPreset::Top8,
    FinalsPreset::Top16,
    FinalsPreset::AllPlaces,
];

fn teams(n: usize) -> Vec<Team> {
    (1..=n).map(|i| Team::new(format!("t{i}"))).collect()
}

fn generator() -> ScheduleGenerator {
    ScheduleGenerator::new().with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
}

fn config(n: usize, groups: u32, fields: u32, preset: usize) -> TournamentConfig {
    let base = TournamentConfig::new(teams(n))
        .with_fields(fields)
        .with_start("2025-06-14", "10:00");
    if groups > 1 {
        base.with_finals(groups, FinalsConfig::new(PRESETS[preset % PRESETS.len()]))
    } else {
        base
    }
}

fn generate(config: &TournamentConfig) -> GeneratedSchedule {
    generator().generate(config).unwrap()
}

proptest! {
    /// Every pair of teams meets exactly once.
    #[test]
    fn prop_pairing_counts(n in 0usize..20) {
        let teams = teams(n);
        let refs: Vec<&Team> = teams.iter().collect();
        let pairings = generate_pairings(&refs, "A");
        prop_assert_eq!(pairings.len(), n * n.saturating_sub(1) / 2);

        let mut seen = HashSet::new();
        for p in &pairings {
            prop_assert_ne!(&p.team_a, &p.team_b);
            let key = if p.team_a < p.team_b {
                (p.team_a.clone(), p.team_b.clone())
            } else {
                (p.team_b.clone(), p.team_a.clone())
            };
            prop_assert!(seen.insert(key));
        }
    }

    /// Cells are unique and nobody plays twice at once.
    #[test]
    fn prop_schedule_is_conflict_free(
        n in 2usize..14,
        groups in 1u32..5,
        fields in 1u32..4,
        preset in 0usize..6,
    ) {
        let cfg = config(n, groups, fields, preset);
        let s = generate(&cfg);
        prop_assert!(validate_matches(&s.all_matches).is_ok());
        let conflicts = ConflictDetector::new().detect(&s.all_matches);
        prop_assert!(!has_errors(&conflicts), "{:?}", conflicts);
        prop_assert!(s.all_matches.iter().all(|m| m.field >= 1 && m.field <= fields));

        let mut per_group: BTreeMap<String, usize> = BTreeMap::new();
        for m in s.matches_in_phase(MatchPhase::GroupStage) {
            *per_group.entry(m.group.clone().unwrap_or_default()).or_insert(0) += 1;
        }
        for g in cfg.group_assignments() {
            let size = g.teams.len();
            let played = per_group.get(&g.label).copied().unwrap_or(0);
            prop_assert_eq!(played, size * size.saturating_sub(1) / 2);
        }
    }

    /// Brackets only reference earlier matches and contain no cycle.
    #[test]
    fn prop_bracket_closure(groups in 0usize..12, preset in 0usize..6, size in 1usize..7) {
        let sizes = vec![size; groups];
        let outcome = generate_bracket(PRESETS[preset], groups, &sizes);
        prop_assert!(validate_bracket(&outcome.bracket).is_ok());
        for m in outcome.bracket.matches() {
            prop_assert!(m.depends_on.iter().all(|d| d.0 < m.id.0));
        }
    }

    /// Organizer workloads never differ by more than one.
    #[test]
    fn prop_organizer_balance(n in 2usize..12, fields in 1u32..4, pool in 1u32..6) {
        let config = config(n, 1, fields, 0)
            .with_referees(RefereeConfig::new(RefereeMode::organizer(pool)));
        let s = generate(&config);
        let load = referee_workload(&s.all_matches);
        let used: usize = load.values().sum();
        prop_assert_eq!(used, s.match_count());
        if s.match_count() >= pool as usize {
            prop_assert_eq!(load.len(), pool as usize);
        }
        let max = load.values().max().copied().unwrap_or(0);
        let min = load.values().min().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    /// In teams mode the previous home team on a field referees.
    #[test]
    fn prop_teams_referee_rule(n in 2usize..10, fields in 1u32..4) {
        let config = config(n, 1, fields, 0)
            .with_referees(RefereeConfig::new(RefereeMode::Teams));
        let s = generate(&config);
        for field in 1..=fields {
            let mut on_field: Vec<_> = s.all_matches.iter().filter(|m| m.field == field).collect();
            on_field.sort_by_key(|m| m.slot);
            if let Some(first) = on_field.first() {
                prop_assert_eq!(first.referee, None);
            }
            for pair in on_field.windows(2) {
                let home = pair[0].home.team_id().unwrap();
                let number = config.teams.iter().position(|t| t.id == home).unwrap() as u32 + 1;
                prop_assert_eq!(pair[1].referee, Some(number));
            }
        }
    }

    /// Same input, same output.
    #[test]
    fn prop_idempotent(n in 2usize..12, groups in 1u32..4, preset in 0usize..6) {
        let config = config(n, groups, 2, preset)
            .with_referees(RefereeConfig::new(RefereeMode::organizer(2)));
        let a = serde_json::to_string(&generate(&config)).unwrap();
        let b = serde_json::to_string(&generate(&config)).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn test_shuffled_team_order() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut teams = teams(9);
        teams.shuffle(&mut rng);
        let groups = rng.random_range(2..=3);
        let config = TournamentConfig::new(teams)
            .with_finals(groups, FinalsConfig::new(FinalsPreset::Top4))
            .with_fields(2);
        let s = generate(&config);

        let per_group: usize = config
            .group_assignments()
            .iter()
            .map(|g| g.teams.len() * (g.teams.len() - 1) / 2)
            .sum();
        assert_eq!(s.matches_in_phase(MatchPhase::GroupStage).len(), per_group);
        assert!(!has_errors(&ConflictDetector::new().detect(&s.all_matches)));
    }
}
