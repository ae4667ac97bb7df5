//! Grid state passed to fairness rules.

use std::collections::HashMap;

use crate::models::SlotCandidate;

/// Runtime slot-filling state passed to fairness rules.
///
/// Describes the open cell and what every participant token has played so
/// far. The scheduler updates it in place as matches are placed.
#[derive(Debug, Clone, Default)]
pub struct SlotContext {
    /// Slot of the open cell.
    pub slot: u32,
    /// Field of the open cell (1-based).
    pub field: u32,
    /// Empty slots required between two matches of one participant.
    pub min_rest_slots: u32,
    /// Rest window ignored (relaxed pass).
    pub relaxed: bool,
    /// Last slot each token was busy in.
    pub last_slot: HashMap<String, u32>,
    /// Matches placed per token.
    pub match_count: HashMap<String, u32>,
    /// Matches placed per (token, field).
    pub field_counts: HashMap<(String, u32), u32>,
}

impl SlotContext {
    /// Creates a context with the given rest requirement at slot 0, field 1.
    pub fn new(min_rest_slots: u32) -> Self {
        Self {
            field: 1,
            min_rest_slots,
            ..Default::default()
        }
    }

    /// Moves to the given cell.
    pub fn at_cell(mut self, slot: u32, field: u32) -> Self {
        self.slot = slot;
        self.field = field;
        self
    }

    /// Records that `token` played in `slot`.
    pub fn with_played(mut self, token: impl Into<String>, slot: u32) -> Self {
        self.mark(&token.into(), slot, self.field);
        self
    }

    /// Sets the relaxed flag.
    pub fn relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    /// Records a placement of `candidate` in the given cell.
    pub fn record(&mut self, candidate: &SlotCandidate, slot: u32, field: u32) {
        for token in candidate.tokens() {
            self.mark(token, slot, field);
        }
    }

    fn mark(&mut self, token: &str, slot: u32, field: u32) {
        self.last_slot.insert(token.to_string(), slot);
        *self.match_count.entry(token.to_string()).or_insert(0) += 1;
        *self
            .field_counts
            .entry((token.to_string(), field))
            .or_insert(0) += 1;
    }

    /// Slots since `token` last played, if it played at all.
    pub fn slots_since(&self, token: &str) -> Option<u32> {
        self.last_slot
            .get(token)
            .map(|&last| self.slot.saturating_sub(last))
    }

    /// Matches placed for `token`.
    pub fn count(&self, token: &str) -> u32 {
        self.match_count.get(token).copied().unwrap_or(0)
    }

    /// Matches placed for `token` on the open cell's field.
    pub fn field_count(&self, token: &str) -> u32 {
        self.field_counts
            .get(&(token.to_string(), self.field))
            .copied()
            .unwrap_or(0)
    }
}
