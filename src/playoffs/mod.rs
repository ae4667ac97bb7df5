//! Knockout stage.
//!
//! - **`bracket`**: Arena of playoff matches linked by typed handles
//! - **`presets`**: Preset → bracket shape, with fallbacks for few groups
//! - **`resolve`**: Placeholder → team resolution and localized labels
//!
//! # Reference
//! Kendall et al. (2010), "Scheduling in sports: An annotated bibliography",
//! Computers & Operations Research 37(1)

mod bracket;
mod presets;
mod resolve;

pub use bracket::{Bracket, Participant, PlayoffId, PlayoffMatch, PlayoffRound, Rank, Seed};
pub use presets::{
    effective_preset, expected_match_count, generate_bracket, BracketOutcome, ASSUMED_GROUP_SIZE,
};
pub use resolve::{has_open_placeholders, refresh_names, ResolveContext};
