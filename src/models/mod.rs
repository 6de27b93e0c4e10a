//! Domain models for a Glintlock campaign world.
//!
//! # Core Concepts
//!
//! ## Per-file Entities
//!
//! - [`Character`]: The player character, parsed from the first markdown file in
//!   the characters directory (frontmatter + body).
//! - [`Npc`]: One record per markdown file in the NPC directory.
//!
//! ## Global Trackers
//!
//! Each of these comes from a single well-known document:
//!
//! - [`Quest`]: Quest list bucketed by status heading.
//! - [`LogEntry`]: Session log, most recent first.
//! - [`MythEntry`]: Dooms with their omen counts.
//! - [`ClockEntry`]: Progress clocks.
//! - [`Calendar`]: In-world date, season, weather and upcoming events.
//! - [`GmNotes`]: Strong start, secrets and NPC moves for the GM screen.
//!
//! ## Aggregate
//!
//! - [`WorldSnapshot`]: One internally consistent view of everything above,
//!   rebuilt wholesale on every refresh.
//!
//! All records are plain values. Nothing here is mutated after a parser builds it.

mod calendar;
mod character;
mod gm_notes;
mod log;
mod npc;
mod quest;
mod snapshot;
mod tracker;

pub use calendar::*;
pub use character::*;
pub use gm_notes::*;
pub use log::*;
pub use npc::*;
pub use quest::*;
pub use snapshot::*;
pub use tracker::*;
