//! Game rules that do not belong to any single action.
//!
//! This crate holds the pure, read-only rules every action handler leans on:
//! how timers resolve against `now`, how experience maps to levels and
//! stamina, where land ends and placements collide, how boosts adjust base
//! values, what everything costs, and whether a state satisfies a requirement
//! set. Nothing here mutates a [`GameState`] except
//! [`RequirementSet::charge`] and the constructor [`starting_farm`].
//!
//! # Modules
//!
//! - [`timers`] -- `time_left` / `is_ready` / `regenerated`, gem pricing for
//!   instant completion.
//! - [`progression`] -- Level curve, skill points, stamina cap and
//!   regeneration.
//! - [`land`] -- Tile spiral, footprint overlap, collision detection.
//! - [`boosts`] -- The ordered boost pipeline.
//! - [`catalogue`] -- Crops, fruit, flowers, minerals, buildings, recipes,
//!   composters, crafting, shop, expansions, achievements.
//! - [`requirements`] -- [`RequirementSet`] and its read-only evaluator.
//! - [`starting`] -- The new-player farm.
//! - [`error`] -- [`TimerError`] and [`WorldError`].
//!
//! [`GameState`]: homestead_types::GameState

pub mod boosts;
pub mod catalogue;
pub mod error;
pub mod land;
pub mod progression;
pub mod requirements;
pub mod starting;
pub mod timers;

pub use boosts::{Boost, BoostSource, Effect, Target, duration_for, yield_for};
pub use error::{TimerError, WorldError};
pub use land::{Collision, detect_collision, overlapping_pairs};
pub use progression::{bumpkin_level, max_stamina, replenished_stamina};
pub use requirements::{Evaluation, RequirementSet, TimeWindow, Unmet};
pub use starting::starting_farm;
pub use timers::{instant_gems, is_ready, ready_at, time_left};
