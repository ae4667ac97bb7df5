//! Tournament domain models.
//!
//! Provides the data types shared by the pairing, slot, bracket and referee
//! stages, and the output they produce together.
//!
//! # Domain Mappings
//!
//! | u-tournament | Scheduling term |
//! |--------------|-----------------|
//! | Team | Resource (one match at a time) |
//! | ScheduledMatch | Assignment (activity × slot × field) |
//! | Field | Parallel machine |
//! | Referee | Secondary resource |
//! | GeneratedSchedule | Schedule |

mod config;
mod fixture;
mod placeholder;
mod referee;
mod schedule;
mod slot;
mod standing;
mod team;
mod time;

pub use config::{
    default_start_time, FinalsConfig, FinalsPreset, GroupSystem, Locale, Tiebreaker,
    TournamentConfig,
};
pub use fixture::{MatchPhase, Score, ScheduledMatch, Side};
pub use placeholder::{is_placeholder, ordinal_suffix, Placeholder, TeamRef};
pub use referee::{FinalsRefereeMode, RefereeConfig, RefereeMode, DEFAULT_REFEREE_POOL};
pub use schedule::{GeneratedSchedule, Notice, NoticeKind, Phase, TournamentMeta};
pub use slot::{SlotAssignment, SlotCandidate};
pub use standing::{compute_standings, group_finished, Standing, POINTS_DRAW, POINTS_WIN};
pub use team::{group_index, group_label, GroupAssignment, Team, SINGLE_GROUP};
pub use time::{parse_start_date, parse_start_time, SlotTiming, TimeWindow};
