//! Built-in fairness rules.
//!
//! # Categories
//!
//! - **Rest**: REST (hard filter outside the relaxed pass)
//! - **Load**: LOAD, FIELD
//! - **Spread**: IDLE
//!
//! # Score Convention
//! All rules return lower scores for better-fitting candidates.

use super::{FairnessRule, RuleScore, SlotContext, INFEASIBLE};
use crate::models::SlotCandidate;

/// Minimum rest between two matches of a participant.
///
/// Infeasible when any participant played within the last
/// `min_rest_slots` slots. Always 0 in the relaxed pass.
#[derive(Debug, Clone, Copy)]
pub struct RestWindow;

impl FairnessRule for RestWindow {
    fn name(&self) -> &'static str {
        "REST"
    }

    fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> RuleScore {
        if context.relaxed {
            return 0.0;
        }
        let too_soon = candidate.participants.iter().any(|token| {
            context
                .slots_since(token)
                .is_some_and(|gap| gap <= context.min_rest_slots)
        });
        if too_soon {
            INFEASIBLE
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Minimum Rest Window"
    }
}

/// Fewest matches played so far.
///
/// Sum of placed matches over all participants; keeps every team's match
/// count level as the grid fills.
#[derive(Debug, Clone, Copy)]
pub struct MatchLoad;

impl FairnessRule for MatchLoad {
    fn name(&self) -> &'static str {
        "LOAD"
    }

    fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> RuleScore {
        candidate
            .participants
            .iter()
            .map(|t| context.count(t) as f64)
            .sum()
    }

    fn description(&self) -> &'static str {
        "Fewest Matches Played"
    }
}

/// Longest waiting time since the last match.
///
/// A participant that has not played yet counts as waiting `slot + 1`
/// slots, more than anyone who has.
#[derive(Debug, Clone, Copy)]
pub struct IdleTime;

impl FairnessRule for IdleTime {
    fn name(&self) -> &'static str {
        "IDLE"
    }

    fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> RuleScore {
        let waited: u32 = candidate
            .participants
            .iter()
            .map(|t| context.slots_since(t).unwrap_or(context.slot + 1))
            .sum();
        -(waited as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Idle Time"
    }
}

/// Fewest matches on the open cell's field.
///
/// Rotates participants across fields. Not part of the default set.
#[derive(Debug, Clone, Copy)]
pub struct FieldRotation;

impl FairnessRule for FieldRotation {
    fn name(&self) -> &'static str {
        "FIELD"
    }

    fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> RuleScore {
        candidate
            .participants
            .iter()
            .map(|t| context.field_count(t) as f64)
            .sum()
    }

    fn description(&self) -> &'static str {
        "Field Rotation"
    }
}
