//! Tournament scheduling engine.
//!
//! Turns a tournament definition (teams, groups, fields, durations, playoff
//! preset, referee policy) into a fully time-slotted schedule: round-robin
//! group fixtures, a dependency-correct playoff bracket, and referee and
//! field assignments.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `TeamRef`, `Placeholder`,
//!   `ScheduledMatch`, `TournamentConfig`, `GeneratedSchedule`, `Notice`
//! - **`dispatching`**: Fairness rules and the rule engine used per cell
//! - **`scheduler`**: Pairings, slot assignment, the generation pipeline, KPIs
//! - **`playoffs`**: Bracket arena, presets, placeholder resolution
//! - **`referee`**: Organizer-pool and teams-referee assignment
//! - **`conflicts`**: Overlap, break and dependency checks on any match list
//! - **`validation`**: Input integrity checks (duplicate IDs, DAG cycles)
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_tournament::{ConflictDetector, ScheduleGenerator, TournamentConfig};
//!
//! let json = r#"{
//!     "name": "Sommercup",
//!     "teams": [
//!         { "id": "t1", "name": "Adler" }, { "id": "t2", "name": "Bären" },
//!         { "id": "t3", "name": "Cobras" }, { "id": "t4", "name": "Drachen" }
//!     ],
//!     "numberOfFields": 2,
//!     "startDate": "2025-06-14",
//!     "startTime": "10:00"
//! }"#;
//! let config = TournamentConfig::from_json(json).unwrap();
//! let schedule = ScheduleGenerator::new()
//!     .with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
//!     .generate(&config)
//!     .unwrap();
//!
//! assert_eq!(schedule.match_count(), 6);
//! assert!(ConflictDetector::new().detect(&schedule.all_matches).is_empty());
//! ```
//!
//! # References
//!
//! - Rasmussen & Trick (2008), "Round robin scheduling - a survey"
//! - Kendall et al. (2010), "Scheduling in sports: An annotated bibliography"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod conflicts;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod playoffs;
pub mod referee;
pub mod scheduler;
pub mod validation;

pub use conflicts::{has_errors, Conflict, ConflictDetector, ConflictKind, Severity};
pub use error::ScheduleError;
pub use models::{
    GeneratedSchedule, Notice, NoticeKind, ScheduledMatch, Team, TeamRef, TournamentConfig,
};
pub use referee::{is_valid_finals_referee, RefereeAssigner};
pub use scheduler::{ScheduleGenerator, ScheduleKpi};
