//! Finishing a running process instantly with gems.

use homestead_ledger::inventory::debit;
use homestead_types::{
    ActionKind, GameState, ItemName, ProcessSpedUp, ProcessTarget, Production, Timestamp,
};
use homestead_world::{RequirementSet, instant_gems};

use crate::error::GameError;
use crate::handler::{ActionHandler, record_activity, require};
use crate::production::production_left;

/// Charge the gems that finish `ms_left` of work and count them in the
/// `"Gems Spent"` activity.
pub(crate) fn spend_gems(
    state: &mut GameState,
    ms_left: u64,
    now: Timestamp,
) -> Result<(), GameError> {
    let gems = instant_gems(ms_left);
    require(
        &RequirementSet::default().with_item(ItemName::Gem, gems),
        state,
        now,
    )?;
    debit(&mut state.inventory, ItemName::Gem, gems)?;
    record_activity(state, "Gems Spent", gems)
}

fn process<'a>(
    action: &ProcessSpedUp,
    state: &'a GameState,
) -> Result<&'a Production, GameError> {
    let process = match &action.target {
        ProcessTarget::Building { building_id } => state
            .buildings
            .get(building_id)
            .ok_or_else(|| GameError::not_found("Building", building_id))?
            .producing
            .as_ref(),
        ProcessTarget::CraftingBox => state.crafting_box.as_ref(),
    };
    process.ok_or(GameError::rule("Nothing in progress"))
}

fn process_mut<'a>(
    action: &ProcessSpedUp,
    state: &'a mut GameState,
) -> Option<&'a mut Production> {
    match &action.target {
        ProcessTarget::Building { building_id } => state
            .buildings
            .get_mut(building_id)
            .and_then(|b| b.producing.as_mut()),
        ProcessTarget::CraftingBox => state.crafting_box.as_mut(),
    }
}

impl ActionHandler for ProcessSpedUp {
    const KIND: ActionKind = ActionKind::ProcessSpedUp;

    fn requirements(
        &self,
        state: &GameState,
        now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let left = production_left(process(self, state)?, now)?;
        Ok(RequirementSet::default().with_item(ItemName::Gem, instant_gems(left)))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let left = production_left(process(self, state)?, now)?;
        if left == 0 {
            return Err(GameError::rule("Already complete"));
        }

        spend_gems(state, left, now)?;

        let running = process_mut(self, state).ok_or(GameError::rule("Nothing in progress"))?;
        running.ready_at = now;
        Ok(())
    }
}
