//! Tournament configuration.
//!
//! The configuration is the single explicit input of the engine: every
//! generation call receives it whole and nothing is kept between calls.
//! Field names follow the camelCase JSON used by tournament front ends.
//!
//! # Degraded Input
//! Unknown presets, unusable durations and unparseable dates never fail.
//! They are replaced by safe defaults, and the pipeline reports each
//! substitution as a [`Notice`](super::Notice).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    group_label, parse_start_date, parse_start_time, GroupAssignment, Notice, RefereeConfig,
    SlotTiming, Team, SINGLE_GROUP,
};
use crate::error::ScheduleError;

/// How the tournament is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupSystem {
    /// All teams in one round robin, no playoffs.
    #[default]
    RoundRobin,
    /// Group stage followed by a playoff preset.
    GroupsAndFinals,
}

/// Named playoff bracket shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinalsPreset {
    #[default]
    None,
    FinalOnly,
    Top4,
    Top8,
    Top16,
    AllPlaces,
}

impl FinalsPreset {
    /// Parses a preset name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "final-only" => Some(Self::FinalOnly),
            "top-4" => Some(Self::Top4),
            "top-8" => Some(Self::Top8),
            "top-16" => Some(Self::Top16),
            "all-places" => Some(Self::AllPlaces),
            _ => None,
        }
    }

    /// Wire name of the preset.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FinalOnly => "final-only",
            Self::Top4 => "top-4",
            Self::Top8 => "top-8",
            Self::Top16 => "top-16",
            Self::AllPlaces => "all-places",
        }
    }
}

impl From<String> for FinalsPreset {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_else(|| {
            tracing::warn!(preset = %value, "unknown finals preset, using none");
            Self::None
        })
    }
}

impl From<FinalsPreset> for String {
    fn from(value: FinalsPreset) -> Self {
        value.as_str().to_string()
    }
}

/// How a drawn knockout match is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Tiebreaker {
    /// Straight to a shoot-out; no extra time is reserved.
    #[default]
    Penalties,
    /// Extra time before the shoot-out; reserved in every knockout slot.
    ExtraTime { minutes: u32 },
}

impl Tiebreaker {
    /// Minutes to reserve per knockout match.
    pub fn reserved_minutes(&self) -> u32 {
        match self {
            Self::Penalties => 0,
            Self::ExtraTime { minutes } => *minutes,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Playoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalsConfig {
    /// Bracket shape.
    #[serde(default)]
    pub preset: FinalsPreset,
    /// Round-of-16 matches may share a slot.
    #[serde(default = "default_true")]
    pub parallel_round_of16: bool,
    /// Quarterfinals may share a slot.
    #[serde(default = "default_true")]
    pub parallel_quarterfinals: bool,
    /// Semifinals may share a slot.
    #[serde(default = "default_true")]
    pub parallel_semifinals: bool,
    /// Drawn knockout matches.
    #[serde(default)]
    pub tiebreaker: Tiebreaker,
}

impl FinalsConfig {
    /// Creates a configuration for a preset with parallel rounds.
    pub fn new(preset: FinalsPreset) -> Self {
        Self {
            preset,
            parallel_round_of16: true,
            parallel_quarterfinals: true,
            parallel_semifinals: true,
            tiebreaker: Tiebreaker::Penalties,
        }
    }
}

impl Default for FinalsConfig {
    fn default() -> Self {
        Self::new(FinalsPreset::None)
    }
}

/// Language for placeholder and match labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    De,
    En,
}

fn default_one() -> u32 {
    1
}

fn default_game() -> u32 {
    SlotTiming::DEFAULT_GAME_MINUTES
}

fn default_break() -> u32 {
    2
}

fn default_halftime() -> u32 {
    5
}

fn default_phase_break() -> u32 {
    10
}

/// Full tournament definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    /// Groups used when teams carry no group label.
    #[serde(default = "default_one")]
    pub number_of_groups: u32,
    #[serde(default = "default_one")]
    pub number_of_fields: u32,
    #[serde(default)]
    pub group_system: GroupSystem,
    #[serde(default = "default_game")]
    pub group_phase_game_duration: u32,
    #[serde(default = "default_break")]
    pub group_phase_break_duration: u32,
    #[serde(default = "default_one")]
    pub game_periods: u32,
    #[serde(default = "default_halftime")]
    pub halftime_break: u32,
    /// Falls back to the group-phase value.
    #[serde(default)]
    pub final_round_game_duration: Option<u32>,
    /// Falls back to the group-phase value.
    #[serde(default)]
    pub final_round_break_duration: Option<u32>,
    #[serde(default)]
    pub finals_config: FinalsConfig,
    #[serde(default)]
    pub referee_config: RefereeConfig,
    /// Minutes between the last group match and the first playoff match.
    #[serde(default = "default_phase_break")]
    pub break_between_phases: u32,
    /// `YYYY-MM-DD` or `DD.MM.YYYY`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// `HH:MM`.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Empty slots a team should get between two matches.
    #[serde(default = "default_one")]
    pub min_rest_slots: u32,
    #[serde(default)]
    pub locale: Locale,
    /// Custom display names per group label.
    #[serde(default)]
    pub group_names: BTreeMap<String, String>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            teams: Vec::new(),
            number_of_groups: 1,
            number_of_fields: 1,
            group_system: GroupSystem::RoundRobin,
            group_phase_game_duration: default_game(),
            group_phase_break_duration: default_break(),
            game_periods: 1,
            halftime_break: default_halftime(),
            final_round_game_duration: None,
            final_round_break_duration: None,
            finals_config: FinalsConfig::default(),
            referee_config: RefereeConfig::default(),
            break_between_phases: default_phase_break(),
            start_date: None,
            start_time: None,
            min_rest_slots: 1,
            locale: Locale::De,
            group_names: BTreeMap::new(),
        }
    }
}

/// Kick-off used when no valid start time is configured.
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl TournamentConfig {
    /// Creates a round-robin configuration for the given teams.
    pub fn new(teams: Vec<Team>) -> Self {
        Self {
            teams,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the tournament name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Switches to group stage + playoffs with the given preset.
    pub fn with_finals(mut self, groups: u32, finals: FinalsConfig) -> Self {
        self.group_system = GroupSystem::GroupsAndFinals;
        self.number_of_groups = groups;
        self.finals_config = finals;
        self
    }

    /// Sets the number of fields.
    pub fn with_fields(mut self, fields: u32) -> Self {
        self.number_of_fields = fields;
        self
    }

    /// Sets group-phase game and break durations (minutes).
    pub fn with_durations(mut self, game: u32, break_minutes: u32) -> Self {
        self.group_phase_game_duration = game;
        self.group_phase_break_duration = break_minutes;
        self
    }

    /// Sets multi-period play.
    pub fn with_periods(mut self, periods: u32, halftime: u32) -> Self {
        self.game_periods = periods;
        self.halftime_break = halftime;
        self
    }

    /// Sets the referee configuration.
    pub fn with_referees(mut self, referee_config: RefereeConfig) -> Self {
        self.referee_config = referee_config;
        self
    }

    /// Sets start date and time as raw strings.
    pub fn with_start(mut self, date: impl Into<String>, time: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self.start_time = Some(time.into());
        self
    }

    /// Sets the minimum rest between a team's matches (in slots).
    pub fn with_min_rest_slots(mut self, slots: u32) -> Self {
        self.min_rest_slots = slots;
        self
    }

    /// Sets the label language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets a custom display name for a group.
    pub fn with_group_name(mut self, label: impl Into<String>, name: impl Into<String>) -> Self {
        self.group_names.insert(label.into(), name.into());
        self
    }

    /// Field count, at least one.
    pub fn fields(&self, notices: &mut Vec<Notice>) -> u32 {
        if self.number_of_fields == 0 {
            notices.push(Notice::degraded("numberOfFields is 0, using 1 field"));
            return 1;
        }
        self.number_of_fields
    }

    /// Group-stage timing with defaults substituted.
    pub fn group_timing(&self, notices: &mut Vec<Notice>) -> SlotTiming {
        let mut timing = SlotTiming::new(
            self.group_phase_game_duration,
            self.group_phase_break_duration,
        )
        .with_periods(self.game_periods, self.halftime_break);
        if timing.sanitize() {
            notices.push(Notice::degraded(format!(
                "group-phase timing unusable, using {} minutes in {} period(s)",
                timing.game_minutes, timing.periods
            )));
        }
        timing
    }

    /// Playoff timing: final-round values, falling back to group-phase values.
    pub fn final_timing(&self, notices: &mut Vec<Notice>) -> SlotTiming {
        let game = self
            .final_round_game_duration
            .filter(|&g| g > 0)
            .unwrap_or(self.group_phase_game_duration);
        let brk = self
            .final_round_break_duration
            .unwrap_or(self.group_phase_break_duration);
        let mut timing = SlotTiming::new(game, brk)
            .with_periods(self.game_periods, self.halftime_break)
            .with_extra_minutes(self.finals_config.tiebreaker.reserved_minutes());
        if timing.sanitize() {
            notices.push(Notice::degraded(format!(
                "final-round timing unusable, using {} minutes in {} period(s)",
                timing.game_minutes, timing.periods
            )));
        }
        timing
    }

    /// Tournament kick-off.
    ///
    /// Unparseable or missing dates fall back to `today`, and times fall back
    /// to 09:00.
    pub fn start_datetime(&self, today: NaiveDate, notices: &mut Vec<Notice>) -> NaiveDateTime {
        let date = match self.start_date.as_deref() {
            Some(raw) => parse_start_date(raw).unwrap_or_else(|| {
                notices.push(Notice::degraded(format!(
                    "unrecognized start date '{raw}', using {today}"
                )));
                today
            }),
            None => today,
        };
        let time = match self.start_time.as_deref() {
            Some(raw) => parse_start_time(raw).unwrap_or_else(|| {
                notices.push(Notice::degraded(format!(
                    "unrecognized start time '{raw}', using 09:00"
                )));
                default_start_time()
            }),
            None => default_start_time(),
        };
        date.and_time(time)
    }

    /// Teams grouped for the group stage, ordered by label.
    ///
    /// Round robin puts everyone into [`SINGLE_GROUP`]. With groups, labelled
    /// teams keep their label and unlabelled teams are dealt round-robin over
    /// `number_of_groups` groups.
    pub fn group_assignments(&self) -> Vec<GroupAssignment<'_>> {
        if self.group_system == GroupSystem::RoundRobin {
            return vec![GroupAssignment {
                label: SINGLE_GROUP.to_string(),
                teams: self.teams.iter().collect(),
            }];
        }

        let groups = self.number_of_groups.max(1) as usize;
        let mut by_label: BTreeMap<String, Vec<&Team>> = BTreeMap::new();
        let mut unlabelled = 0usize;
        for team in &self.teams {
            let label = match &team.group {
                Some(g) => g.clone(),
                None => {
                    let l = group_label(unlabelled % groups);
                    unlabelled += 1;
                    l
                }
            };
            by_label.entry(label).or_default().push(team);
        }

        by_label
            .into_iter()
            .map(|(label, teams)| GroupAssignment { label, teams })
            .collect()
    }

    /// Teams with their effective group label filled in.
    pub fn teams_with_groups(&self) -> Vec<Team> {
        let mut out = Vec::with_capacity(self.teams.len());
        for group in self.group_assignments() {
            for team in group.teams {
                let mut t = team.clone();
                if self.group_system == GroupSystem::GroupsAndFinals {
                    t.group = Some(group.label.clone());
                }
                out.push(t);
            }
        }
        // keep configuration order
        out.sort_by_key(|t| self.teams.iter().position(|c| c.id == t.id));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoticeKind;

    fn teams(n: usize) -> Vec<Team> {
        (1..=n).map(|i| Team::new(format!("t{i}"))).collect()
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(FinalsPreset::parse("top-4"), Some(FinalsPreset::Top4));
        assert_eq!(FinalsPreset::parse("all-places"), Some(FinalsPreset::AllPlaces));
        assert_eq!(FinalsPreset::parse("top-32"), None);
        for p in [
            FinalsPreset::None,
            FinalsPreset::FinalOnly,
            FinalsPreset::Top4,
            FinalsPreset::Top8,
            FinalsPreset::Top16,
            FinalsPreset::AllPlaces,
        ] {
            assert_eq!(FinalsPreset::parse(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_unknown_preset_degrades_to_none() {
        let f: FinalsConfig = serde_json::from_str(r#"{ "preset": "top-32" }"#).unwrap();
        assert_eq!(f.preset, FinalsPreset::None);
        assert!(f.parallel_semifinals);
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "teams": [ { "id": "t1", "name": "Lions" }, { "id": "t2", "name": "Tigers" } ],
            "numberOfFields": 2,
            "startDate": "14.06.2025",
            "startTime": "10:00"
        }"#;
        let c = TournamentConfig::from_json(json).unwrap();
        assert_eq!(c.teams.len(), 2);
        assert_eq!(c.number_of_fields, 2);
        assert_eq!(c.group_system, GroupSystem::RoundRobin);
        assert_eq!(c.group_phase_game_duration, SlotTiming::DEFAULT_GAME_MINUTES);
        assert_eq!(c.finals_config.preset, FinalsPreset::None);
        assert_eq!(c.min_rest_slots, 1);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = TournamentConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let c = TournamentConfig::new(teams(4))
            .with_name("Cup")
            .with_finals(2, FinalsConfig::new(FinalsPreset::Top4))
            .with_group_name("A", "Nord");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"preset\":\"top-4\""));
        assert!(json.contains("\"groupSystem\":\"groupsAndFinals\""));
        let back = TournamentConfig::from_json(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_start_datetime_formats() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut notices = Vec::new();

        let iso = TournamentConfig::new(teams(2)).with_start("2025-06-14", "10:30");
        let german = TournamentConfig::new(teams(2)).with_start("14.06.2025", "10:30");
        let expected = NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(iso.start_datetime(today, &mut notices), expected);
        assert_eq!(german.start_datetime(today, &mut notices), expected);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_start_datetime_fallback() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut notices = Vec::new();
        let c = TournamentConfig::new(teams(2)).with_start("June 14th", "soon");
        let start = c.start_datetime(today, &mut notices);
        assert_eq!(start, today.and_time(default_start_time()));
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.kind == NoticeKind::DegradedInput));
    }

    #[test]
    fn test_timing_fallbacks() {
        let mut notices = Vec::new();
        let mut c = TournamentConfig::new(teams(2)).with_durations(12, 3);
        c.final_round_game_duration = Some(20);
        c.finals_config.tiebreaker = Tiebreaker::ExtraTime { minutes: 6 };

        let g = c.group_timing(&mut notices);
        assert_eq!(g.slot_minutes(), 15);
        let f = c.final_timing(&mut notices);
        assert_eq!(f.game_minutes, 20);
        assert_eq!(f.break_minutes, 3); // falls back to group break
        assert_eq!(f.match_minutes(), 26);
        assert!(notices.is_empty());

        c.group_phase_game_duration = 0;
        c.number_of_fields = 0;
        let g = c.group_timing(&mut notices);
        assert_eq!(g.game_minutes, SlotTiming::DEFAULT_GAME_MINUTES);
        assert_eq!(c.fields(&mut notices), 1);
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn test_group_assignments_round_robin() {
        let c = TournamentConfig::new(teams(5));
        let groups = c.group_assignments();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, SINGLE_GROUP);
        assert_eq!(groups[0].teams.len(), 5);
    }

    #[test]
    fn test_group_assignments_dealt() {
        let c =
            TournamentConfig::new(teams(5)).with_finals(2, FinalsConfig::new(FinalsPreset::Top4));
        let groups = c.group_assignments();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "A");
        let a: Vec<&str> = groups[0].teams.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(a, vec!["t1", "t3", "t5"]);
        assert_eq!(groups[1].teams.len(), 2);
    }

    #[test]
    fn test_group_assignments_labelled() {
        let teams = vec![
            Team::new("x").with_group("B"),
            Team::new("y").with_group("A"),
            Team::new("z").with_group("B"),
        ];
        let c = TournamentConfig::new(teams).with_finals(2, FinalsConfig::default());
        let groups = c.group_assignments();
        assert_eq!(groups[0].label, "A");
        assert_eq!(groups[1].label, "B");
        assert_eq!(groups[1].teams.len(), 2);

        let filled = c.teams_with_groups();
        assert_eq!(filled[0].id, "x");
        assert_eq!(filled[0].group.as_deref(), Some("B"));
    }
}
