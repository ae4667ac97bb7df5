//! Fairness-aware greedy slot assignment.
//!
//! # Algorithm
//!
//! 1. Stable-sort candidates by slot hint (no hint sorts last).
//! 2. Fill the grid slot by slot, field by field.
//! 3. For each open cell, drop candidates that cannot take it at all: a
//!    participant already plays in this slot, a dependency is not placed in
//!    an earlier slot, or a serial-group sibling already took this slot.
//! 4. Ask the rule engine for the best remaining candidate (strict pass).
//! 5. If nothing fits, retry the same cell with the rest window ignored
//!    (relaxed pass), so a field never idles while a pairing could play.
//! 6. If still nothing fits, advance to the next slot.
//!
//! Every iteration of the outer loop places at least one candidate: an
//! empty slot can only mean every remaining candidate waits on a
//! dependency that will never be placed, and then the first one is placed
//! anyway. The loop therefore terminates after at most `n` slots.
//!
//! # Complexity
//! O(n² × f × r) where n=candidates, f=fields, r=rules.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::HashSet;

use crate::dispatching::{RuleEngine, SlotContext};
use crate::models::{SlotAssignment, SlotCandidate};

/// Result of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPlan {
    /// Placements in chronological order (slot, then field).
    pub assignments: Vec<SlotAssignment>,
    /// Placements made with the rest window ignored.
    pub relaxed: usize,
    /// Placements made with unsatisfiable dependencies ignored.
    pub forced: usize,
    /// First slot after the last placement.
    pub next_slot: u32,
}

impl SlotPlan {
    /// Assignment for a candidate index.
    pub fn for_candidate(&self, index: usize) -> Option<&SlotAssignment> {
        self.assignments.iter().find(|a| a.candidate == index)
    }

    /// Number of slots used.
    pub fn slots_used(&self, first_slot: u32) -> u32 {
        self.next_slot.saturating_sub(first_slot)
    }
}

/// Greedy slot scheduler.
///
/// # Example
///
/// ```
/// use u_tournament::scheduler::SlotScheduler;
/// use u_tournament::models::SlotCandidate;
///
/// let candidates = vec![
///     SlotCandidate::new("m1", vec!["a".into(), "b".into()]).with_hint(1),
///     SlotCandidate::new("m2", vec!["c".into(), "d".into()]).with_hint(1),
///     SlotCandidate::new("m3", vec!["a".into(), "c".into()]).with_hint(2),
/// ];
/// let plan = SlotScheduler::new(2).schedule(&candidates);
/// assert_eq!(plan.assignments.len(), 3);
/// assert_eq!(plan.for_candidate(2).map(|a| a.slot), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct SlotScheduler {
    fields: u32,
    min_rest_slots: u32,
    first_slot: u32,
    rule_engine: RuleEngine,
}

impl SlotScheduler {
    /// Creates a scheduler for `fields` parallel fields (at least one).
    pub fn new(fields: u32) -> Self {
        Self {
            fields: fields.max(1),
            min_rest_slots: 1,
            first_slot: 0,
            rule_engine: RuleEngine::fairness(),
        }
    }

    /// Sets the empty slots required between two matches of a participant.
    pub fn with_min_rest_slots(mut self, slots: u32) -> Self {
        self.min_rest_slots = slots;
        self
    }

    /// Sets the slot index the run starts at.
    pub fn with_first_slot(mut self, slot: u32) -> Self {
        self.first_slot = slot;
        self
    }

    /// Sets the rule engine used to pick candidates.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Number of fields.
    pub fn fields(&self) -> u32 {
        self.fields
    }

    /// Places every candidate in a (slot, field) cell.
    pub fn schedule(&self, candidates: &[SlotCandidate]) -> SlotPlan {
        let mut remaining: Vec<usize> = (0..candidates.len()).collect();
        remaining.sort_by_key(|&i| {
            let hint = candidates[i].slot_hint;
            (hint.is_none(), hint.unwrap_or(0))
        });

        let mut placed_slot: Vec<Option<u32>> = vec![None; candidates.len()];
        let mut context = SlotContext::new(self.min_rest_slots);
        let mut plan = SlotPlan {
            next_slot: self.first_slot,
            ..SlotPlan::default()
        };
        let mut slot = self.first_slot;

        while !remaining.is_empty() {
            let mut busy: HashSet<&str> = HashSet::new();
            let mut serial_used: HashSet<u32> = HashSet::new();
            let mut placed_here = 0usize;

            for field in 1..=self.fields {
                if remaining.is_empty() {
                    break;
                }
                context.slot = slot;
                context.field = field;

                let eligible: Vec<usize> = remaining
                    .iter()
                    .copied()
                    .filter(|&i| {
                        let c = &candidates[i];
                        c.tokens().all(|t| !busy.contains(t))
                            && c.serial_group.map_or(true, |g| !serial_used.contains(&g))
                            && c.depends_on.iter().all(|&d| {
                                placed_slot
                                    .get(d)
                                    .copied()
                                    .flatten()
                                    .is_some_and(|s| s < slot)
                            })
                    })
                    .collect();

                context.relaxed = false;
                let mut relaxed = false;
                let mut pick = self.rule_engine.select_best(candidates, &eligible, &context);
                if pick.is_none() {
                    context.relaxed = true;
                    pick = self.rule_engine.select_best(candidates, &eligible, &context);
                    context.relaxed = false;
                    relaxed = pick.is_some();
                }

                let Some(index) = pick else {
                    break;
                };

                let candidate = &candidates[index];
                if relaxed {
                    tracing::debug!(id = %candidate.id, slot, "rest window relaxed");
                    plan.relaxed += 1;
                }
                busy.extend(candidate.tokens());
                if let Some(g) = candidate.serial_group {
                    serial_used.insert(g);
                }
                place(
                    &mut plan,
                    &mut context,
                    &mut placed_slot,
                    candidates,
                    index,
                    (slot, field),
                    relaxed,
                );
                remaining.retain(|&i| i != index);
                placed_here += 1;
            }

            if placed_here == 0 {
                // only reachable with cyclic or dangling dependencies
                let index = remaining.remove(0);
                tracing::warn!(
                    id = %candidates[index].id,
                    slot,
                    "dependencies unsatisfiable, placing anyway"
                );
                plan.forced += 1;
                place(
                    &mut plan,
                    &mut context,
                    &mut placed_slot,
                    candidates,
                    index,
                    (slot, 1),
                    true,
                );
            }

            slot += 1;
        }

        plan.next_slot = slot;
        tracing::debug!(
            placed = plan.assignments.len(),
            slots = plan.slots_used(self.first_slot),
            relaxed = plan.relaxed,
            "slot assignment finished"
        );
        plan
    }
}

fn place(
    plan: &mut SlotPlan,
    context: &mut SlotContext,
    placed_slot: &mut [Option<u32>],
    candidates: &[SlotCandidate],
    index: usize,
    (slot, field): (u32, u32),
    relaxed: bool,
) {
    context.record(&candidates[index], slot, field);
    placed_slot[index] = Some(slot);
    plan.assignments.push(SlotAssignment {
        candidate: index,
        slot,
        field,
        relaxed,
    });
}

impl Default for SlotScheduler {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn c(id: &str, teams: &[&str]) -> SlotCandidate {
        SlotCandidate::new(id, teams.iter().map(|t| t.to_string()).collect())
    }

    fn cells(plan: &SlotPlan) -> Vec<(u32, u32)> {
        plan.assignments.iter().map(|a| (a.slot, a.field)).collect()
    }

    #[test]
    fn test_rounds_on_two_fields() {
        let candidates = vec![
            c("m1", &["a", "b"]).with_hint(1),
            c("m2", &["c", "d"]).with_hint(1),
            c("m3", &["a", "c"]).with_hint(2),
        ];
        let plan = SlotScheduler::new(2).schedule(&candidates);
        assert_eq!(cells(&plan), vec![(0, 1), (0, 2), (1, 1)]);
        assert_eq!(plan.assignments[0].candidate, 0);
        assert_eq!(plan.assignments[1].candidate, 1);
        assert_eq!(plan.next_slot, 2);
    }

    #[test]
    fn test_unique_cells_and_no_double_booking() {
        let teams = ["a", "b", "c", "d", "e", "f"];
        let mut candidates = Vec::new();
        for i in 0..teams.len() {
            for j in i + 1..teams.len() {
                candidates.push(c(&format!("{i}-{j}"), &[teams[i], teams[j]]));
            }
        }
        let plan = SlotScheduler::new(3).schedule(&candidates);
        assert_eq!(plan.assignments.len(), candidates.len());

        let unique: HashSet<(u32, u32)> = cells(&plan).into_iter().collect();
        assert_eq!(unique.len(), candidates.len());

        for a in &plan.assignments {
            for b in &plan.assignments {
                if a.candidate != b.candidate && a.slot == b.slot {
                    let ta = &candidates[a.candidate].participants;
                    let tb = &candidates[b.candidate].participants;
                    assert!(ta.iter().all(|t| !tb.contains(t)));
                }
            }
        }
    }

    #[test]
    fn test_rest_window_respected_when_possible() {
        // One field, a plays twice: the other match fills the gap.
        let candidates = vec![
            c("m1", &["a", "b"]),
            c("m2", &["a", "c"]),
            c("m3", &["d", "e"]),
        ];
        let plan = SlotScheduler::new(1).schedule(&candidates);
        let order: Vec<usize> = plan.assignments.iter().map(|a| a.candidate).collect();
        assert_eq!(order, vec![0, 2, 1]);
        assert_eq!(plan.relaxed, 0);
    }

    #[test]
    fn test_rest_window_relaxed_when_impossible() {
        let candidates = vec![c("m1", &["a", "b"]), c("m2", &["a", "b"])];
        let plan = SlotScheduler::new(1).schedule(&candidates);
        assert_eq!(cells(&plan), vec![(0, 1), (1, 1)]);
        assert_eq!(plan.relaxed, 1);
        assert!(plan.assignments[1].relaxed);
    }

    #[test]
    fn test_relaxed_pass_fills_every_field() {
        // 4 teams, 3 rounds of 2 on 2 fields: nobody can rest, no field idles
        let candidates = vec![
            c("m1", &["a", "d"]).with_hint(1),
            c("m2", &["b", "c"]).with_hint(1),
            c("m3", &["a", "c"]).with_hint(2),
            c("m4", &["d", "b"]).with_hint(2),
            c("m5", &["a", "b"]).with_hint(3),
            c("m6", &["c", "d"]).with_hint(3),
        ];
        let plan = SlotScheduler::new(2).schedule(&candidates);
        assert_eq!(
            cells(&plan),
            vec![(0, 1), (0, 2), (1, 1), (1, 2), (2, 1), (2, 2)]
        );
        assert_eq!(plan.next_slot, 3);
        assert_eq!(plan.relaxed, 4);
        assert!(!plan.assignments[0].relaxed);
        assert!(plan.assignments[3].relaxed);
    }

    #[test]
    fn test_dependencies_go_to_later_slots() {
        let candidates = vec![
            c("final", &["s1-w", "s2-w"]).with_dependency(1).with_dependency(2),
            c("s1", &["a", "b"]).with_marks(vec!["s1-w".into()]),
            c("s2", &["c", "d"]).with_marks(vec!["s2-w".into()]),
        ];
        let plan = SlotScheduler::new(4).with_min_rest_slots(0).schedule(&candidates);
        assert_eq!(plan.for_candidate(1).map(|a| a.slot), Some(0));
        assert_eq!(plan.for_candidate(2).map(|a| a.slot), Some(0));
        assert_eq!(plan.for_candidate(0).map(|a| a.slot), Some(1));
        assert_eq!(plan.relaxed, 0);
    }

    #[test]
    fn test_serial_group() {
        let candidates = vec![
            c("s1", &["a", "b"]).with_serial_group(3),
            c("s2", &["c", "d"]).with_serial_group(3),
        ];
        let plan = SlotScheduler::new(2).schedule(&candidates);
        assert_eq!(cells(&plan), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_cyclic_dependencies_terminate() {
        let candidates = vec![
            c("x", &["a", "b"]).with_dependency(1),
            c("y", &["c", "d"]).with_dependency(0),
            c("z", &["e", "f"]).with_dependency(9),
        ];
        let plan = SlotScheduler::new(2).schedule(&candidates);
        assert_eq!(plan.assignments.len(), 3);
        assert!(plan.forced >= 1);
    }

    #[test]
    fn test_hint_order_and_first_slot() {
        let candidates = vec![
            c("late", &["a", "b"]),
            c("early", &["c", "d"]).with_hint(1),
        ];
        let plan = SlotScheduler::new(1)
            .with_first_slot(10)
            .with_min_rest_slots(0)
            .schedule(&candidates);
        assert_eq!(plan.assignments[0].candidate, 1);
        assert_eq!(plan.assignments[0].slot, 10);
        assert_eq!(plan.slots_used(10), 2);
    }

    #[test]
    fn test_zero_fields_degrade() {
        let s = SlotScheduler::new(0);
        assert_eq!(s.fields(), 1);
        assert!(s.schedule(&[]).assignments.is_empty());
    }
}
