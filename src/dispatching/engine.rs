//! Rule engine for multi-criteria slot selection.
//!
//! Composes fairness rules with configurable evaluation modes and
//! tie-breaking strategies.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::sync::Arc;

use super::{rules, FairnessRule, RuleScore, SlotContext};
use crate::models::SlotCandidate;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    Sequential,
    /// Compute weighted sum of all rule scores.
    #[default]
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order (default, reproducible).
    #[default]
    InputOrder,
    /// Deterministic by candidate ID (lexicographic).
    ById,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn FairnessRule>,
    weight: f64,
}

/// A composable rule engine for choosing the next match of a cell.
///
/// Any rule returning [`INFEASIBLE`](super::INFEASIBLE) excludes the
/// candidate regardless of weight or mode.
///
/// # Example
/// ```
/// use u_tournament::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::RestWindow)
///     .with_weighted_rule(rules::MatchLoad, 2.0)
///     .with_rule(rules::IdleTime);
/// assert_eq!(engine.rule_count(), 3);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Weighted,
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// The default fairness rule set.
    ///
    /// Rest window as a hard filter, then fewest matches played, then
    /// longest waiting time.
    pub fn fairness() -> Self {
        Self::new()
            .with_rule(rules::RestWindow)
            .with_weighted_rule(rules::MatchLoad, 2.0)
            .with_weighted_rule(rules::IdleTime, 1.0)
    }

    /// Adds a rule (weight 1.0).
    pub fn with_rule<R: FairnessRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: FairnessRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Number of configured rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Feasible candidates among `eligible`, best first.
    ///
    /// The sort is stable, so equal scores keep the order of `eligible`.
    pub fn sort_indices(
        &self,
        candidates: &[SlotCandidate],
        eligible: &[usize],
        context: &SlotContext,
    ) -> Vec<usize> {
        let mut scored: Vec<(usize, Vec<RuleScore>)> = eligible
            .iter()
            .map(|&i| (i, self.evaluate(&candidates[i], context)))
            .filter(|(_, scores)| scores.iter().all(|s| s.is_finite()))
            .collect();

        match &self.mode {
            EvaluationMode::Sequential => {
                scored.sort_by(|(a, sa), (b, sb)| {
                    self.compare_sequential(sa, sb)
                        .then_with(|| self.break_tie(&candidates[*a], &candidates[*b]))
                });
            }
            EvaluationMode::Weighted => {
                scored.sort_by(|(a, sa), (b, sb)| {
                    let wa: f64 = sa.iter().sum();
                    let wb: f64 = sb.iter().sum();
                    let ord = if (wa - wb).abs() > self.epsilon {
                        wa.partial_cmp(&wb).unwrap_or(std::cmp::Ordering::Equal)
                    } else {
                        std::cmp::Ordering::Equal
                    };
                    ord.then_with(|| self.break_tie(&candidates[*a], &candidates[*b]))
                });
            }
        }

        scored.into_iter().map(|(i, _)| i).collect()
    }

    /// Returns the best feasible candidate among `eligible`.
    pub fn select_best(
        &self,
        candidates: &[SlotCandidate],
        eligible: &[usize],
        context: &SlotContext,
    ) -> Option<usize> {
        self.sort_indices(candidates, eligible, context).first().copied()
    }

    /// Weighted scores of a single candidate, one per rule.
    ///
    /// An infeasible score stays infinite whatever its weight.
    pub fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| {
                let score = wr.rule.evaluate(candidate, context);
                if score.is_infinite() {
                    score
                } else {
                    score * wr.weight
                }
            })
            .collect()
    }

    /// Whether no rule forbids the candidate.
    pub fn is_feasible(&self, candidate: &SlotCandidate, context: &SlotContext) -> bool {
        self.evaluate(candidate, context)
            .iter()
            .all(|s| s.is_finite())
    }

    fn compare_sequential(&self, a: &[RuleScore], b: &[RuleScore]) -> std::cmp::Ordering {
        for (score_a, score_b) in a.iter().zip(b) {
            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        std::cmp::Ordering::Equal
    }

    fn break_tie(&self, a: &SlotCandidate, b: &SlotCandidate) -> std::cmp::Ordering {
        match &self.tie_breaker {
            TieBreaker::InputOrder => std::cmp::Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::fairness()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
