//! End-to-end schedule generation.
//!
//! # Pipeline
//!
//! 1. Validate the configuration; only an empty team list is fatal.
//! 2. Normalize fields, timings and the start time.
//! 3. Pair teams within their groups (circle method).
//! 4. Place group matches on the slot grid, round by round.
//! 5. Build the playoff bracket for the (possibly downgraded) preset.
//! 6. Place playoff matches after the group stage plus the phase break,
//!    continuing the slot clock.
//! 7. Number matches chronologically, assign referees and resolve names.
//!
//! Generation is pure: the same configuration and reference date always
//! yield the same schedule.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::pairing::generate_group_pairings;
use super::slots::{SlotPlan, SlotScheduler};
use crate::dispatching::RuleEngine;
use crate::error::ScheduleError;
use crate::models::{
    compute_standings, FinalsConfig, FinalsPreset, GeneratedSchedule, GroupAssignment,
    GroupSystem, Locale, MatchPhase, Notice, Placeholder, ScheduledMatch, SlotCandidate,
    SlotTiming, Standing, Team, TeamRef, TimeWindow, TournamentConfig, TournamentMeta,
};
use crate::playoffs::{generate_bracket, refresh_names, Bracket, BracketOutcome, PlayoffRound};
use crate::referee::RefereeAssigner;
use crate::validation::{validate_config, validate_matches};

/// Serial group shared by the third-place match and the final.
const FINAL_SERIAL_GROUP: u32 = 4;

/// Where and when a stage runs.
#[derive(Debug, Clone, Copy)]
struct StageClock {
    fields: u32,
    first_slot: u32,
    start: NaiveDateTime,
    timing: SlotTiming,
}

impl StageClock {
    fn window_of(&self, slot: u32) -> TimeWindow {
        self.timing
            .window(self.start, slot.saturating_sub(self.first_slot))
    }
}

/// Generates complete tournament schedules.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_tournament::models::{FinalsConfig, FinalsPreset, Team, TournamentConfig};
/// use u_tournament::scheduler::ScheduleGenerator;
///
/// let teams = (1..=8).map(|i| Team::new(format!("t{i}"))).collect();
/// let config = TournamentConfig::new(teams)
///     .with_finals(2, FinalsConfig::new(FinalsPreset::Top4))
///     .with_fields(2)
///     .with_start("2025-06-14", "10:00");
///
/// let schedule = ScheduleGenerator::new()
///     .with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
///     .generate(&config)
///     .unwrap();
/// assert_eq!(schedule.match_count(), 12 + 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    reference_date: Option<NaiveDate>,
    rule_engine: RuleEngine,
}

impl ScheduleGenerator {
    /// Creates a generator with the default fairness rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date used when no valid start date is configured.
    ///
    /// Defaults to the local date at generation time.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Sets the rule engine used for slot selection.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Generates a full schedule from scratch.
    ///
    /// # Errors
    /// [`ScheduleError::NoTeams`] if the configuration lists no teams.
    /// Every other problem degrades to a default and is reported in
    /// [`GeneratedSchedule::notices`].
    pub fn generate(&self, config: &TournamentConfig) -> Result<GeneratedSchedule, ScheduleError> {
        if config.teams.is_empty() {
            return Err(ScheduleError::NoTeams);
        }
        let mut notices = config_notices(config);

        let fields = config.fields(&mut notices);
        let group_clock = StageClock {
            fields,
            first_slot: 0,
            start: config.start_datetime(self.today(), &mut notices),
            timing: config.group_timing(&mut notices),
        };
        let teams = config.teams_with_groups();
        let groups = config.group_assignments();

        let (mut all, plan) = self.group_stage(&groups, config.min_rest_slots, group_clock);
        report_plan("group stage", &plan, &mut notices);

        let mut effective = FinalsPreset::None;
        if config.group_system == GroupSystem::GroupsAndFinals {
            let outcome = bracket_for(config, &groups, &mut notices);
            effective = outcome.effective;

            let clock = StageClock {
                fields,
                first_slot: plan.next_slot,
                start: playoff_start(&all, group_clock.start, config.break_between_phases),
                timing: config.final_timing(&mut notices),
            };
            let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
            let (playoffs, plan) = self.playoff_stage(
                &outcome.bracket,
                &labels,
                &config.finals_config,
                config.locale,
                clock,
            );
            report_plan("playoffs", &plan, &mut notices);
            all.extend(playoffs);
        }

        all.sort_by_key(|m| (m.slot, m.field));
        for (i, m) in all.iter_mut().enumerate() {
            m.match_number = i as u32 + 1;
        }

        notices.extend(RefereeAssigner::new(&config.referee_config).assign(&mut all, &teams));
        refresh_names(&mut all, &teams, config.locale, &config.group_names);
        if let Err(errors) = validate_matches(&all) {
            notices.extend(errors.into_iter().map(|e| Notice::infeasible(e.message)));
        }

        tracing::info!(
            matches = all.len(),
            groups = groups.len(),
            fields,
            notices = notices.len(),
            "schedule generated"
        );

        let standings = initial_standings(&groups, &teams);
        let meta = tournament_meta(config, fields, groups.len(), effective);
        Ok(GeneratedSchedule::assemble(
            all,
            standings,
            meta,
            notices,
            group_clock.start,
        ))
    }

    /// Combines persisted matches with a freshly generated playoff stage.
    ///
    /// Persisted matches are kept verbatim: IDs, timing, referees and
    /// scores. A playoff stage is appended only when the persisted list has
    /// group matches and no playoff matches; it starts after the last
    /// persisted group match plus the phase break, in the slots after the
    /// last persisted slot.
    ///
    /// # Errors
    /// [`ScheduleError::NoTeams`] if the configuration lists no teams.
    pub fn merge_persisted(
        &self,
        config: &TournamentConfig,
        persisted: &[ScheduledMatch],
    ) -> Result<GeneratedSchedule, ScheduleError> {
        if config.teams.is_empty() {
            return Err(ScheduleError::NoTeams);
        }
        let mut notices = config_notices(config);

        let fields = config.fields(&mut notices);
        let fallback_start = config.start_datetime(self.today(), &mut notices);
        let teams = config.teams_with_groups();
        let groups = config.group_assignments();

        let mut all = persisted.to_vec();
        let has_group = all.iter().any(|m| m.phase == MatchPhase::GroupStage);
        let has_playoff = all.iter().any(|m| m.phase.is_playoff());

        let mut effective = FinalsPreset::None;
        if config.group_system == GroupSystem::GroupsAndFinals {
            let outcome = bracket_for(config, &groups, &mut notices);
            effective = outcome.effective;

            if has_group && !has_playoff {
                let clock = StageClock {
                    fields,
                    first_slot: all.iter().map(|m| m.slot + 1).max().unwrap_or(0),
                    start: playoff_start(&all, fallback_start, config.break_between_phases),
                    timing: config.final_timing(&mut notices),
                };
                let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
                let (mut playoffs, plan) = self.playoff_stage(
                    &outcome.bracket,
                    &labels,
                    &config.finals_config,
                    config.locale,
                    clock,
                );
                report_plan("playoffs", &plan, &mut notices);

                let mut number = all.iter().map(|m| m.match_number).max().unwrap_or(0);
                playoffs.sort_by_key(|m| (m.slot, m.field));
                for m in &mut playoffs {
                    number += 1;
                    m.match_number = number;
                }
                let appended = playoffs.len();
                all.extend(playoffs);
                self.finish_appended(config, &teams, &mut all, persisted.len(), &mut notices);
                tracing::info!(persisted = persisted.len(), appended, "playoffs merged");
            } else {
                tracing::debug!(has_group, has_playoff, "persisted schedule kept as is");
            }
        }

        let standings = initial_standings(&groups, &teams);
        let meta = tournament_meta(config, fields, groups.len(), effective);
        Ok(GeneratedSchedule::assemble(all, standings, meta, notices, fallback_start))
    }

    /// Referees and names for matches at `from..`. Referees continue from
    /// the ones the persisted matches carry; names are resolved over the
    /// whole list.
    fn finish_appended(
        &self,
        config: &TournamentConfig,
        teams: &[Team],
        all: &mut [ScheduledMatch],
        from: usize,
        notices: &mut Vec<Notice>,
    ) {
        let assigner = RefereeAssigner::new(&config.referee_config);
        notices.extend(assigner.assign_from(all, from, teams));

        let mut scratch = all.to_vec();
        refresh_names(&mut scratch, teams, config.locale, &config.group_names);
        for (m, computed) in all[from..].iter_mut().zip(&scratch[from..]) {
            m.home_name = computed.home_name.clone();
            m.away_name = computed.away_name.clone();
        }
    }

    fn group_stage(
        &self,
        groups: &[GroupAssignment<'_>],
        min_rest_slots: u32,
        clock: StageClock,
    ) -> (Vec<ScheduledMatch>, SlotPlan) {
        let pairings = generate_group_pairings(groups);

        let mut ids = Vec::with_capacity(pairings.len());
        let mut counter: HashMap<&str, u32> = HashMap::new();
        for p in &pairings {
            let n = counter.entry(p.group.as_str()).or_insert(0);
            *n += 1;
            ids.push(format!("group-{}-{n}", p.group.to_lowercase()));
        }

        let candidates: Vec<SlotCandidate> = pairings
            .iter()
            .zip(&ids)
            .map(|(p, id)| {
                SlotCandidate::new(id.clone(), vec![p.team_a.clone(), p.team_b.clone()])
                    .with_hint(p.round)
            })
            .collect();

        let plan = SlotScheduler::new(clock.fields)
            .with_min_rest_slots(min_rest_slots)
            .with_first_slot(clock.first_slot)
            .with_rule_engine(self.rule_engine.clone())
            .schedule(&candidates);

        let matches = plan
            .assignments
            .iter()
            .map(|a| {
                let p = &pairings[a.candidate];
                ScheduledMatch::new(
                    ids[a.candidate].clone(),
                    MatchPhase::GroupStage,
                    TeamRef::team(p.team_a.clone()),
                    TeamRef::team(p.team_b.clone()),
                    clock.window_of(a.slot),
                )
                .at_cell(a.slot, a.field)
                .with_group(p.group.clone())
            })
            .collect();

        tracing::debug!(
            matches = plan.assignments.len(),
            slots = plan.slots_used(clock.first_slot),
            "group stage placed"
        );
        (matches, plan)
    }

    fn playoff_stage(
        &self,
        bracket: &Bracket,
        labels: &[String],
        finals: &FinalsConfig,
        locale: Locale,
        clock: StageClock,
    ) -> (Vec<ScheduledMatch>, SlotPlan) {
        let refs: Vec<_> = bracket
            .matches()
            .iter()
            .map(|m| {
                (
                    bracket.reference_with(&m.home, labels),
                    bracket.reference_with(&m.away, labels),
                )
            })
            .collect();

        let candidates: Vec<SlotCandidate> = bracket
            .matches()
            .iter()
            .zip(&refs)
            .map(|(m, (home, away))| {
                let participants = [home, away]
                    .into_iter()
                    .filter(|p| **p != Placeholder::Tbd)
                    .map(ToString::to_string)
                    .collect();
                let mut c = SlotCandidate::new(m.key.clone(), participants)
                    .with_marks(vec![format!("{}-winner", m.key), format!("{}-loser", m.key)])
                    .with_hint(m.round.ordinal());
                for dep in &m.depends_on {
                    c = c.with_dependency(dep.0);
                }
                match serial_group(m.round, finals) {
                    Some(g) => c.with_serial_group(g),
                    None => c,
                }
            })
            .collect();

        // dependencies already keep rounds apart
        let plan = SlotScheduler::new(clock.fields)
            .with_min_rest_slots(0)
            .with_first_slot(clock.first_slot)
            .with_rule_engine(self.rule_engine.clone())
            .schedule(&candidates);

        let matches = plan
            .assignments
            .iter()
            .map(|a| {
                let m = &bracket.matches()[a.candidate];
                let (home, away) = refs[a.candidate].clone();
                ScheduledMatch::new(
                    m.key.clone(),
                    m.round.phase(),
                    TeamRef::Placeholder(home),
                    TeamRef::Placeholder(away),
                    clock.window_of(a.slot),
                )
                .at_cell(a.slot, a.field)
                .with_label(m.label(locale))
            })
            .collect();

        tracing::debug!(
            matches = plan.assignments.len(),
            slots = plan.slots_used(clock.first_slot),
            "playoffs placed"
        );
        (matches, plan)
    }
}

/// Serial group of a knockout round, if its matches must not share a slot.
fn serial_group(round: PlayoffRound, finals: &FinalsConfig) -> Option<u32> {
    match round {
        PlayoffRound::RoundOf16 if !finals.parallel_round_of16 => Some(1),
        PlayoffRound::Quarterfinal if !finals.parallel_quarterfinals => Some(2),
        PlayoffRound::Semifinal if !finals.parallel_semifinals => Some(3),
        PlayoffRound::ThirdPlace | PlayoffRound::Final => Some(FINAL_SERIAL_GROUP),
        _ => None,
    }
}

fn config_notices(config: &TournamentConfig) -> Vec<Notice> {
    match validate_config(config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .into_iter()
            .map(|e| Notice::degraded(e.message))
            .collect(),
    }
}

fn bracket_for(
    config: &TournamentConfig,
    groups: &[GroupAssignment<'_>],
    notices: &mut Vec<Notice>,
) -> BracketOutcome {
    let sizes: Vec<usize> = groups.iter().map(|g| g.teams.len()).collect();
    let outcome = generate_bracket(config.finals_config.preset, groups.len(), &sizes);
    if outcome.downgraded() {
        notices.push(Notice::degraded(format!(
            "finals preset {} needs more groups than {}, using {}",
            outcome.requested.as_str(),
            groups.len(),
            outcome.effective.as_str()
        )));
    }
    outcome
}

/// Kick-off of the playoffs: last group match end plus the phase break.
fn playoff_start(
    matches: &[ScheduledMatch],
    fallback: NaiveDateTime,
    break_minutes: u32,
) -> NaiveDateTime {
    matches
        .iter()
        .filter(|m| m.phase == MatchPhase::GroupStage)
        .map(|m| m.end)
        .max()
        .map_or(fallback, |end| end + Duration::minutes(break_minutes as i64))
}

fn report_plan(stage: &str, plan: &SlotPlan, notices: &mut Vec<Notice>) {
    if plan.relaxed > 0 {
        notices.push(Notice::infeasible(format!(
            "{stage}: {} match(es) placed with the rest window relaxed",
            plan.relaxed
        )));
    }
    if plan.forced > 0 {
        notices.push(Notice::infeasible(format!(
            "{stage}: {} match(es) placed with unmet dependencies",
            plan.forced
        )));
    }
}

fn initial_standings(groups: &[GroupAssignment<'_>], teams: &[Team]) -> Vec<Standing> {
    groups
        .iter()
        .flat_map(|g| {
            let members: Vec<&Team> = g
                .teams
                .iter()
                .filter_map(|t| teams.iter().find(|x| x.id == t.id))
                .collect();
            compute_standings(&members, &[])
        })
        .collect()
}

fn tournament_meta(
    config: &TournamentConfig,
    fields: u32,
    groups: usize,
    effective: FinalsPreset,
) -> TournamentMeta {
    TournamentMeta {
        name: config.name.clone(),
        group_system: config.group_system,
        number_of_fields: fields,
        number_of_groups: groups as u32,
        requested_preset: config.finals_config.preset,
        effective_preset: effective,
        referee_config: config.referee_config.clone(),
        locale: config.locale,
    }
}
