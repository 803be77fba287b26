//! Read-only questions a presentation layer asks before submitting.
//!
//! A [`Query`] borrows the state immutably, so it cannot change it. Its
//! answers come from the same pipeline as a real transition:
//! [`Query::can_apply`] runs the full guard, handler, and audit and throws
//! the result away.

use homestead_actions::{GameError, requirements_for};
use homestead_types::{GameAction, GameState, Timestamp};
use homestead_world::{Evaluation, RequirementSet};

use crate::engine::TransitionEngine;
use crate::session::Session;

/// Speculative view of one state.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    engine: &'a TransitionEngine,
    state: &'a GameState,
}

impl<'a> Query<'a> {
    /// Ask questions about `state` under `engine`'s configuration.
    pub const fn new(engine: &'a TransitionEngine, state: &'a GameState) -> Self {
        Self { engine, state }
    }

    /// Whether `action` would be accepted at `now`, and if not, the exact
    /// error the real transition would return.
    pub fn can_apply(&self, action: &GameAction, now: Timestamp) -> Result<(), GameError> {
        self.engine.validate(self.state, action, None, now)?;
        self.engine.execute(self.state, action, now).map(drop)
    }

    /// The requirement set `action` would be charged.
    pub fn requirements(
        &self,
        action: &GameAction,
        now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        requirements_for(self.state, action, now)
    }

    /// Every unmet part of `action`'s requirement set.
    pub fn evaluate(&self, action: &GameAction, now: Timestamp) -> Result<Evaluation, GameError> {
        Ok(self.requirements(action, now)?.evaluate(self.state, now))
    }
}

impl Session {
    /// Speculative view of the committed baseline.
    pub const fn query(&self) -> Query<'_> {
        Query::new(self.engine(), self.state())
    }
}
