//! Transition engine for the Homestead farming game.
//!
//! The engine is a pure function `(state, action, now) -> Result<state>`.
//! This crate wraps the action handlers with the global integrity guard,
//! drives a per-farm session through its transition states, and answers
//! speculative questions for the presentation layer.
//!
//! # Modules
//!
//! - [`config`] -- [`EngineConfig`] and its YAML parser.
//! - [`guard`] -- Pre-dispatch temporal checks and the post-transition
//!   integrity audit.
//! - [`engine`] -- [`TransitionEngine`] and the [`apply_action`] entry point.
//! - [`session`] -- [`Session`]: the committed baseline and the
//!   `Idle -> Validating -> Applying -> Committed | Rejected` machine.
//! - [`query`] -- [`Query`]: read-only dry runs and requirement evaluation.

pub mod config;
pub mod engine;
pub mod guard;
pub mod query;
pub mod session;

pub use config::{ConfigError, EngineConfig, IntegrityConfig};
pub use engine::{TransitionEngine, apply_action};
pub use query::Query;
pub use session::{Phase, Session, SessionStats};

pub use homestead_actions::{ErrorKind, ErrorSeverity, GameError};
