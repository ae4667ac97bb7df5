//! Input and output integrity checks.
//!
//! Checks the structural integrity of configurations, brackets and match
//! lists. Detects:
//! - Empty tournaments and undersized groups
//! - Duplicate IDs and doubly used (slot, field) cells
//! - References to matches that do not exist
//! - Circular match dependencies (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{GroupSystem, ScheduledMatch, TournamentConfig};
use crate::playoffs::Bracket;
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The configuration lists no teams.
    EmptyTournament,
    /// A team has an empty ID.
    EmptyId,
    /// Two entities share the same ID.
    DuplicateId,
    /// A group has fewer than two teams and plays no matches.
    UndersizedGroup,
    /// A match references a match that doesn't exist.
    DanglingReference,
    /// The dependency graph contains a cycle.
    CyclicDependency,
    /// Two matches occupy the same slot on the same field.
    DuplicateCell,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a tournament configuration.
///
/// Checks:
/// 1. At least one team
/// 2. No empty team IDs
/// 3. No duplicate team IDs
/// 4. With groups, every group has at least two teams
pub fn validate_config(config: &TournamentConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.teams.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyTournament,
            "Tournament has no teams",
        ));
    }

    let mut ids = HashSet::new();
    for team in &config.teams {
        if team.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Team '{}' has an empty ID", team.name),
            ));
        }
        if !ids.insert(team.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate team ID: {}", team.id),
            ));
        }
    }

    if config.group_system == GroupSystem::GroupsAndFinals {
        for group in config.group_assignments() {
            if group.teams.len() < 2 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UndersizedGroup,
                    format!("Group {} has {} team(s)", group.label, group.teams.len()),
                ));
            }
        }
    }

    into_result(errors)
}

/// Validates a playoff bracket.
///
/// Checks:
/// 1. No duplicate match keys
/// 2. Every dependency points at a match in the bracket
/// 3. No circular dependencies
pub fn validate_bracket(bracket: &Bracket) -> ValidationResult {
    let mut errors = Vec::new();

    let mut keys = HashSet::new();
    for m in bracket.matches() {
        if !keys.insert(m.key.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate playoff key: {}", m.key),
            ));
        }
    }

    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for m in bracket.matches() {
        for dep in &m.depends_on {
            match bracket.get(*dep) {
                Some(d) => adj.entry(d.key.as_str()).or_default().push(m.key.as_str()),
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::DanglingReference,
                    format!("Match '{}' depends on unknown match #{}", m.key, dep.0),
                )),
            }
        }
    }

    let nodes: Vec<&str> = bracket.matches().iter().map(|m| m.key.as_str()).collect();
    if let Some(cycle_err) = detect_cycles(&nodes, &adj) {
        errors.push(cycle_err);
    }

    into_result(errors)
}

/// Validates a list of scheduled matches.
///
/// Checks:
/// 1. No duplicate match IDs
/// 2. No two matches in the same (slot, field) cell
/// 3. Every winner/loser reference points at a listed match
/// 4. No circular winner/loser references
pub fn validate_matches(matches: &[ScheduledMatch]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    let mut cells = HashMap::new();
    for m in matches {
        if !ids.insert(m.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate match ID: {}", m.id),
            ));
        }
        if let Some(other) = cells.insert((m.slot, m.field), m.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCell,
                format!(
                    "Matches '{other}' and '{}' share slot {} on field {}",
                    m.id, m.slot, m.field
                ),
            ));
        }
    }

    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for m in matches {
        for source in m.source_matches() {
            if ids.contains(source) {
                adj.entry(source).or_default().push(m.id.as_str());
            } else {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DanglingReference,
                    format!("Match '{}' references unknown match '{source}'", m.id),
                ));
            }
        }
    }

    let nodes: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    if let Some(cycle_err) = detect_cycles(&nodes, &adj) {
        errors.push(cycle_err);
    }

    into_result(errors)
}

/// Detects cycles in a dependency graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
fn detect_cycles<'a>(
    nodes: &[&'a str],
    adj: &HashMap<&'a str, Vec<&'a str>>,
) -> Option<ValidationError> {
    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in nodes {
        if !visited.contains(node) && has_cycle_dfs(node, adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving match '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FinalsConfig, FinalsPreset, MatchPhase, Placeholder, Team, TeamRef, TimeWindow,
    };
    use crate::playoffs::generate_bracket;
    use chrono::NaiveDate;

    fn teams(n: usize) -> Vec<Team> {
        (1..=n).map(|i| Team::new(format!("t{i}"))).collect()
    }

    fn window() -> TimeWindow {
        let d = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        TimeWindow::new(d.and_hms_opt(10, 0, 0).unwrap(), d.and_hms_opt(10, 10, 0).unwrap())
    }

    fn ph(s: &str) -> TeamRef {
        TeamRef::Placeholder(Placeholder::parse(s).unwrap())
    }

    fn sm(id: &str, home: TeamRef, away: TeamRef, slot: u32) -> ScheduledMatch {
        ScheduledMatch::new(id, MatchPhase::Final, home, away, window()).at_cell(slot, 1)
    }

    #[test]
    fn test_valid_config() {
        let config = TournamentConfig::new(teams(8))
            .with_finals(2, FinalsConfig::new(FinalsPreset::Top4));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_tournament() {
        let errors = validate_config(&TournamentConfig::new(Vec::new())).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyTournament));
    }

    #[test]
    fn test_duplicate_and_empty_team_ids() {
        let config = TournamentConfig::new(vec![Team::new("a"), Team::new("a"), Team::new(" ")]);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyId));
    }

    #[test]
    fn test_undersized_group() {
        let config = TournamentConfig::new(teams(3))
            .with_finals(2, FinalsConfig::new(FinalsPreset::FinalOnly));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UndersizedGroup);
    }

    #[test]
    fn test_generated_brackets_are_valid() {
        for preset in [
            FinalsPreset::FinalOnly,
            FinalsPreset::Top4,
            FinalsPreset::Top8,
            FinalsPreset::Top16,
            FinalsPreset::AllPlaces,
        ] {
            for groups in 0..=8 {
                let outcome = generate_bracket(preset, groups, &[]);
                assert!(validate_bracket(&outcome.bracket).is_ok(), "{preset:?} / {groups}");
            }
        }
    }

    #[test]
    fn test_bracket_cycle_and_dangling() {
        // arena order is bypassed through deserialization
        let json = r#"{ "matches": [
            { "id": 0, "key": "a", "round": "semifinal", "number": 1,
              "home": { "winner": 1 }, "away": { "seed": "bestSecond" },
              "rank": null, "dependsOn": [1] },
            { "id": 1, "key": "b", "round": "final", "number": 1,
              "home": { "winner": 0 }, "away": { "loser": 7 },
              "rank": null, "dependsOn": [0, 7] }
        ] }"#;
        let bracket: Bracket = serde_json::from_str(json).unwrap();
        let errors = validate_bracket(&bracket).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DanglingReference));
    }

    #[test]
    fn test_valid_matches() {
        let matches = vec![
            sm("semi1", TeamRef::team("t1"), TeamRef::team("t2"), 0),
            sm("semi2", TeamRef::team("t3"), TeamRef::team("t4"), 1),
            sm("final", ph("semi1-winner"), ph("semi2-winner"), 2),
        ];
        assert!(validate_matches(&matches).is_ok());
    }

    #[test]
    fn test_duplicate_cell_and_id() {
        let matches = vec![
            sm("x", TeamRef::team("t1"), TeamRef::team("t2"), 0),
            sm("x", TeamRef::team("t3"), TeamRef::team("t4"), 0),
        ];
        let errors = validate_matches(&matches).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateCell));
    }

    #[test]
    fn test_match_reference_errors() {
        let matches = vec![
            sm("a", ph("b-winner"), ph("ghost-loser"), 0),
            sm("b", ph("a-winner"), TeamRef::team("t1"), 1),
        ];
        let errors = validate_matches(&matches).unwrap_err();
        assert!(errors.iter().any(|e| {
            e.kind == ValidationErrorKind::DanglingReference && e.message.contains("ghost")
        }));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }
}
