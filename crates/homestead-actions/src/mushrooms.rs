//! Wild mushrooms.
//!
//! Mushrooms are spawned by the host into `state.mushrooms`; picking one
//! removes it and credits its amount to the item it names.

use rust_decimal::Decimal;

use homestead_ledger::inventory::credit;
use homestead_types::{ActionKind, GameState, MushroomPicked, Timestamp};

use crate::error::GameError;
use crate::handler::{ActionHandler, record_activity};

impl ActionHandler for MushroomPicked {
    const KIND: ActionKind = ActionKind::MushroomPicked;

    fn apply(&self, state: &mut GameState, _now: Timestamp) -> Result<(), GameError> {
        let field = state
            .mushrooms
            .as_mut()
            .ok_or(GameError::rule("Mushrooms not populated"))?;
        let mushroom = field
            .mushrooms
            .remove(&self.id)
            .ok_or_else(|| GameError::not_found("Mushroom", &self.id))?;

        credit(&mut state.inventory, mushroom.name, mushroom.amount)?;
        record_activity(state, format!("{} Picked", mushroom.name), Decimal::ONE)
    }
}
