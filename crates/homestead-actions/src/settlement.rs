//! Withdrawals for on-chain settlement.
//!
//! The engine never talks to a chain. A withdrawal removes the items and
//! coins from the farm and appends a [`PendingSettlement`] that the host's
//! settlement bridge picks up. Once the bridge has paid it out, the host
//! submits a [`SettlementAcknowledged`] action that drops the record.

use rust_decimal::Decimal;

use homestead_ledger::inventory::balance;
use homestead_types::{
    ActionKind, CollectibleName, GameState, ItemName, ItemsWithdrawn, PendingSettlement,
    SettlementAcknowledged, Timestamp,
};
use homestead_world::RequirementSet;

use crate::error::GameError;
use crate::handler::{ActionHandler, record_activity, require};

/// Copies of `item` currently placed on the island.
fn placed(state: &GameState, item: ItemName) -> usize {
    match item {
        ItemName::CropPlot => state.crops.len(),
        ItemName::Chicken => state.chickens.len(),
        other => CollectibleName::try_from(other).map_or(0, |name| {
            state.collectibles.values().filter(|c| c.name == name).count()
        }),
    }
}

impl ActionHandler for ItemsWithdrawn {
    const KIND: ActionKind = ActionKind::ItemsWithdrawn;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet {
            coins: self.coins,
            items: self.items.clone(),
            ..RequirementSet::default()
        })
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        if self.items.is_empty() && self.coins.is_zero() {
            return Err(GameError::rule("Nothing to withdraw"));
        }
        if self.coins < Decimal::ZERO || self.items.values().any(|q| *q <= Decimal::ZERO) {
            return Err(GameError::rule("Invalid amount"));
        }

        let cost = self.requirements(state, now)?;
        require(&cost, state, now)?;
        for (item, amount) in &self.items {
            let unplaced = balance(&state.inventory, *item)
                .checked_sub(Decimal::from(placed(state, *item)))
                .unwrap_or(Decimal::ZERO);
            if unplaced < *amount {
                return Err(GameError::rule("Item is placed on the island"));
            }
        }
        cost.charge(state)?;

        let sequence = state.settlement.next_sequence;
        state.settlement.pending.push(PendingSettlement {
            sequence,
            items: self.items.clone(),
            coins: self.coins,
            requested_at: now,
        });
        state.settlement.next_sequence = sequence
            .checked_add(1)
            .ok_or(GameError::rule("Settlement sequence overflow"))?;

        record_activity(state, "Withdrawal Requested", Decimal::ONE)
    }
}

impl ActionHandler for SettlementAcknowledged {
    const KIND: ActionKind = ActionKind::SettlementAcknowledged;

    fn apply(&self, state: &mut GameState, _now: Timestamp) -> Result<(), GameError> {
        let pending = &mut state.settlement.pending;
        let position = pending
            .iter()
            .position(|p| p.sequence == self.sequence)
            .ok_or_else(|| GameError::not_found("Settlement", self.sequence))?;
        pending.remove(position);
        Ok(())
    }
}
