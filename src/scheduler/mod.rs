//! Pairing, slot assignment and the generation pipeline.
//!
//! # Algorithm
//!
//! Pairings come from the circle method. `SlotScheduler` then fills a
//! (slot × field) grid greedily, asking the fairness rule engine for the
//! best candidate of every cell. `ScheduleGenerator` chains both stages
//! with the playoff bracket and referee assignment.
//!
//! # KPI
//!
//! `ScheduleKpi` computes tournament metrics: total duration, field
//! utilization, team rest and referee spread.
//!
//! # References
//!
//! - Rasmussen & Trick (2008), "Round robin scheduling - a survey"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

mod generator;
mod kpi;
mod pairing;
mod slots;

pub use generator::ScheduleGenerator;
pub use kpi::ScheduleKpi;
pub use pairing::{generate_group_pairings, generate_pairings, round_robin_rounds, Pairing};
pub use slots::{SlotPlan, SlotScheduler};
