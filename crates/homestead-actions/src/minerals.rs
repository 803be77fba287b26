//! Rock extraction with a multi-hit strike counter.
//!
//! A rock yields only after [`MineralDef::strikes`] consecutive strikes on the
//! same rock with the same tool. Progress lives in `state.strike`:
//!
//! - a strike on the rock and tool the cursor names advances it;
//! - a strike on any other rock, or with any other tool, restarts it at one;
//! - a strike with a tool the mineral does not accept is rejected, and the
//!   cursor is left as it was;
//! - the threshold strike consumes one tool, yields, stamps `mined_at`, and
//!   clears the cursor.
//!
//! Every other committed action clears the cursor too; the dispatcher does
//! that, not this module.
//!
//! [`MineralDef::strikes`]: homestead_world::catalogue::MineralDef::strikes

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_types::{ActionKind, GameState, RockStruck, StrikeCursor, Timestamp};
use homestead_world::boosts::Target;
use homestead_world::catalogue::mineral;
use homestead_world::timers::{back_dated, time_left};
use homestead_world::{RequirementSet, duration_for, yield_for};

use crate::error::GameError;
use crate::handler::{ActionHandler, bumpkin, record_activity, require};

/// Hits the cursor would hold after `action`.
fn next_hits(action: &RockStruck, state: &GameState) -> u32 {
    match &state.strike {
        Some(cursor) if cursor.rock == action.id && cursor.tool == action.tool => {
            cursor.hits.saturating_add(1)
        }
        _ => 1,
    }
}

impl ActionHandler for RockStruck {
    const KIND: ActionKind = ActionKind::RockStruck;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.tool, Decimal::ONE))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let rock = state
            .rocks
            .get(&self.id)
            .ok_or_else(|| GameError::not_found("Rock", &self.id))?;
        if rock.kind != self.kind {
            return Err(GameError::rule("Rock holds a different mineral"));
        }

        let def = mineral(rock.kind);
        if self.tool != def.tool {
            return Err(GameError::rule("Wrong tool"));
        }
        if rock.times_mined > 0 && time_left(rock.mined_at, def.recovery_ms, now)? > 0 {
            return Err(GameError::rule("Rock is still recovering"));
        }
        require(&self.requirements(state, now)?, state, now)?;

        let hits = next_hits(self, state);
        if hits < def.strikes {
            state.strike = Some(StrikeCursor {
                rock: self.id.clone(),
                tool: self.tool,
                hits,
            });
            return Ok(());
        }

        let amount = yield_for(state, Target::MineralYield(def.name), None, Decimal::ONE)?;
        let boosted = duration_for(state, Target::MineralTime(def.name), def.recovery_ms)?;
        debit(&mut state.inventory, self.tool, Decimal::ONE)?;
        credit(&mut state.inventory, def.name, amount)?;

        let rock = state
            .rocks
            .get_mut(&self.id)
            .ok_or_else(|| GameError::not_found("Rock", &self.id))?;
        rock.mined_at = back_dated(now, def.recovery_ms, boosted);
        rock.times_mined = rock.times_mined.saturating_add(1);
        state.strike = None;

        record_activity(state, format!("{} Mined", def.name), Decimal::ONE)
    }
}
