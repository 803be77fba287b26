//! Land expansion.
//!
//! Growing the island is a two-step process: `land.expanded` charges the
//! requirements for the next tile and starts a construction, and
//! `land.revealed` claims it once finished. Only one construction runs at a
//! time.

use rust_decimal::Decimal;

use homestead_types::{
    ActionKind, Construction, ExpansionSpedUp, GameState, LandExpanded, LandRevealed, Timestamp,
};
use homestead_world::catalogue::expansion;
use homestead_world::land::MAX_EXPANSIONS;
use homestead_world::timers::{ready_at, remaining};
use homestead_world::{RequirementSet, TimerError};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, record_activity, require};
use crate::speed_up::spend_gems;

fn next_expansion(state: &GameState) -> Result<(RequirementSet, u64), GameError> {
    if state.expansions >= MAX_EXPANSIONS {
        return Err(GameError::rule("No more land available"));
    }
    expansion(state.expansions).ok_or(GameError::rule("No more land available"))
}

/// The running construction, rejecting a clock that moved behind its start.
fn construction(state: &GameState, now: Timestamp) -> Result<Construction, GameError> {
    let construction = state
        .expansion_construction
        .clone()
        .ok_or(GameError::rule("Expansion not in progress"))?;
    if now < construction.created_at {
        return Err(TimerError::ClockMovedBackward {
            event_at: construction.created_at,
            now,
        }
        .into());
    }
    Ok(construction)
}

impl ActionHandler for LandExpanded {
    const KIND: ActionKind = ActionKind::LandExpanded;

    fn requirements(
        &self,
        state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(next_expansion(state)?.0)
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        if state.expansion_construction.is_some() {
            return Err(GameError::rule("Land is already being expanded"));
        }
        let (requirements, construction_ms) = next_expansion(state)?;
        require(&requirements, state, now)?;
        requirements.charge(state)?;

        state.expansion_construction = Some(Construction {
            created_at: now,
            ready_at: ready_at(now, construction_ms)?,
        });
        Ok(())
    }
}

impl ActionHandler for LandRevealed {
    const KIND: ActionKind = ActionKind::LandRevealed;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let construction = construction(state, now)?;
        if remaining(construction.ready_at, now) > 0 {
            return Err(ValidationError::NotReady.into());
        }

        state.expansions = state
            .expansions
            .checked_add(1)
            .filter(|n| *n <= MAX_EXPANSIONS)
            .ok_or(GameError::rule("No more land available"))?;
        state.expansion_construction = None;

        record_activity(state, "Land Expanded", Decimal::ONE)
    }
}

impl ActionHandler for ExpansionSpedUp {
    const KIND: ActionKind = ActionKind::ExpansionSpedUp;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let construction = construction(state, now)?;
        let left = remaining(construction.ready_at, now);
        if left == 0 {
            return Err(GameError::rule("Expansion already complete"));
        }

        spend_gems(state, left, now)?;
        state.expansion_construction = Some(Construction {
            ready_at: now,
            ..construction
        });
        Ok(())
    }
}
