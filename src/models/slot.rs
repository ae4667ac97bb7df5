//! Slot scheduler input and output.

use serde::{Deserialize, Serialize};

/// An item waiting for a (slot, field) cell.
///
/// Participants are opaque tokens: team IDs for group matches, placeholder
/// keys for knockout matches. The scheduler only compares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    /// Caller's identifier.
    pub id: String,
    /// Participant tokens tracked for rest and double-booking.
    pub participants: Vec<String>,
    /// Tokens recorded as busy once this candidate is placed.
    ///
    /// A knockout match marks `"semi1-winner"`/`"semi1-loser"` so that
    /// matches fed by it respect the rest window as well.
    pub marks: Vec<String>,
    /// Preferred ordering key (round number). `None` sorts last.
    pub slot_hint: Option<u32>,
    /// Indices (in the input batch) that must be placed in an earlier slot.
    pub depends_on: Vec<usize>,
    /// Candidates sharing a serial group never share a slot.
    pub serial_group: Option<u32>,
}

impl SlotCandidate {
    /// Creates a candidate with the given participants.
    pub fn new(id: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            id: id.into(),
            participants,
            marks: Vec::new(),
            slot_hint: None,
            depends_on: Vec::new(),
            serial_group: None,
        }
    }

    /// Sets the ordering hint.
    pub fn with_hint(mut self, hint: u32) -> Self {
        self.slot_hint = Some(hint);
        self
    }

    /// Adds a dependency on another input index.
    pub fn with_dependency(mut self, index: usize) -> Self {
        self.depends_on.push(index);
        self
    }

    /// Sets the serial group.
    pub fn with_serial_group(mut self, group: u32) -> Self {
        self.serial_group = Some(group);
        self
    }

    /// Sets the tokens marked on placement.
    pub fn with_marks(mut self, marks: Vec<String>) -> Self {
        self.marks = marks;
        self
    }

    /// Participant and mark tokens together.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .chain(self.marks.iter())
            .map(String::as_str)
    }
}

/// A candidate bound to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// Index of the candidate in the input batch.
    pub candidate: usize,
    /// Global slot index.
    pub slot: u32,
    /// Field number (1-based).
    pub field: u32,
    /// Placed with the rest window ignored.
    pub relaxed: bool,
}
