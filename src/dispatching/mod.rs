//! Fairness rules and rule engine for slot assignment.
//!
//! The slot scheduler asks the rule engine which waiting match should take
//! the open (slot, field) cell. Each rule scores a candidate against the
//! current partially-filled grid; the engine combines the scores and picks
//! the lowest.
//!
//! # Usage
//!
//! ```
//! use u_tournament::dispatching::{rules, EvaluationMode, RuleEngine, SlotContext};
//! use u_tournament::models::SlotCandidate;
//!
//! let engine = RuleEngine::new()
//!     .with_mode(EvaluationMode::Weighted)
//!     .with_rule(rules::RestWindow)
//!     .with_weighted_rule(rules::MatchLoad, 2.0);
//!
//! let candidates = vec![
//!     SlotCandidate::new("m1", vec!["a".into(), "b".into()]),
//!     SlotCandidate::new("m2", vec!["c".into(), "d".into()]),
//! ];
//! let context = SlotContext::new(1);
//! assert_eq!(engine.select_best(&candidates, &[0, 1], &context), Some(0));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SlotContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::models::SlotCandidate;
use std::fmt::Debug;

/// Score returned by a fairness rule.
///
/// Lower scores = placed first. [`INFEASIBLE`] excludes the candidate.
pub type RuleScore = f64;

/// Score marking a candidate that must not take the cell.
pub const INFEASIBLE: RuleScore = f64::INFINITY;

/// A rule that scores how well a candidate fits the open cell.
///
/// # Score Convention
/// **Lower score = better fit.** Return [`INFEASIBLE`] to forbid the
/// placement under the current context.
pub trait FairnessRule: Send + Sync + Debug {
    /// Rule name (e.g., "REST", "LOAD").
    fn name(&self) -> &'static str;

    /// Scores a candidate for the cell described by `context`.
    fn evaluate(&self, candidate: &SlotCandidate, context: &SlotContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
