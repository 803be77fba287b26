//! Action handlers for the Homestead engine.
//!
//! Each action kind is handled by one [`ActionHandler`] impl on its payload
//! type. A handler validates against a state and, on success, produces the
//! next state; it never touches the state it was given. The [`registry`]
//! dispatches a [`GameAction`] to its handler and declares which subsystems
//! each kind may change.
//!
//! # Modules
//!
//! - [`error`] -- [`GameError`] and its validation, temporal, and integrity
//!   variants.
//! - [`handler`] -- The [`ActionHandler`] trait and shared helpers.
//! - [`registry`] -- [`dispatch`], [`requirements_for`], and the
//!   permitted-subsystem table.
//! - [`crops`] -- Planting, harvesting, and fertilising crop plots.
//! - [`fruits`] -- Fruit patches with multi-harvest trees.
//! - [`flowers`] -- Flower beds.
//! - [`mushrooms`] -- Picking wild mushrooms.
//! - [`chickens`] -- Feeding chickens and collecting eggs.
//! - [`minerals`] -- Multi-strike rock extraction.
//! - [`stamina`] -- Bumpkin stamina replenishment.
//! - [`placement`] -- Placing, moving, and removing things on the island.
//! - [`production`] -- Cooking, composting, crafting, and feeding the bumpkin.
//! - [`speed_up`] -- Finishing a running process with gems.
//! - [`expansion`] -- Land expansion.
//! - [`economy`] -- Shop, market, and delivery orders.
//! - [`progression`] -- Achievements, skills, and wearables.
//! - [`settlement`] -- Withdrawals awaiting on-chain settlement.
//!
//! [`GameAction`]: homestead_types::GameAction

pub mod chickens;
pub mod crops;
pub mod economy;
pub mod error;
pub mod expansion;
pub mod flowers;
pub mod fruits;
pub mod handler;
pub mod minerals;
pub mod mushrooms;
pub mod placement;
pub mod production;
pub mod progression;
pub mod registry;
pub mod settlement;
pub mod speed_up;
pub mod stamina;

pub use error::{
    ErrorKind, ErrorSeverity, GameError, IntegrityReport, TemporalError, ValidationError,
    Violation,
};
pub use handler::ActionHandler;
pub use registry::{dispatch, handler_kind, permitted_subsystems, requirements_for};
