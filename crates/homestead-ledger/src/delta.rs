//! What a transition changed.
//!
//! [`StateDelta::between`] compares the state before and after a handler ran
//! and reports the set of [`Subsystem`]s that differ plus the signed change of
//! every inventory item and of the coin balance. Placement tables that still
//! share storage with the prior state are skipped without a deep comparison.
//!
//! Engine bookkeeping (`bookkeeping`, `strike`) is not a subsystem: the
//! orchestrator maintains it, and handlers are not audited for it.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use homestead_types::{GameState, ItemName, Table};

use crate::LedgerError;
use crate::inventory::balance;

/// An independently audited part of the farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subsystem {
    /// Coin balance.
    Coins,
    /// Inventory quantities.
    Inventory,
    /// Owned wearables.
    Wardrobe,
    /// Bumpkin record: experience, skills, stamina, equipment, activity.
    Bumpkin,
    /// Crop plots.
    Crops,
    /// Fruit patches.
    FruitPatches,
    /// Flower beds.
    FlowerBeds,
    /// Rocks.
    Rocks,
    /// Buildings and their productions.
    Buildings,
    /// Placed collectibles.
    Collectibles,
    /// Chickens.
    Chickens,
    /// Wild mushrooms.
    Mushrooms,
    /// Owned land and land under construction.
    Land,
    /// Crafting box.
    CraftingBox,
    /// Delivery orders.
    Delivery,
    /// Market quotes.
    Market,
    /// Pending settlements.
    Settlement,
}

/// Differences between two states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    /// Subsystems whose value differs.
    pub changed: BTreeSet<Subsystem>,
    /// Signed change per inventory item; items with no net change are omitted.
    pub items: BTreeMap<ItemName, Decimal>,
    /// Signed change of the coin balance.
    pub coins: Decimal,
}

fn table_changed<T: PartialEq>(before: &Table<T>, after: &Table<T>) -> bool {
    !before.shares_storage(after) && before != after
}

fn signed_change(before: Decimal, after: Decimal, context: &str) -> Result<Decimal, LedgerError> {
    after
        .checked_sub(before)
        .ok_or_else(|| LedgerError::overflow(format!("delta of {context}")))
}

impl StateDelta {
    /// Compute the delta from `before` to `after`.
    pub fn between(before: &GameState, after: &GameState) -> Result<Self, LedgerError> {
        let mut changed = BTreeSet::new();
        let mut mark = |flag: bool, subsystem: Subsystem| {
            if flag {
                changed.insert(subsystem);
            }
        };

        mark(before.coins != after.coins, Subsystem::Coins);
        mark(before.inventory != after.inventory, Subsystem::Inventory);
        mark(before.wardrobe != after.wardrobe, Subsystem::Wardrobe);
        mark(before.bumpkin != after.bumpkin, Subsystem::Bumpkin);
        mark(table_changed(&before.crops, &after.crops), Subsystem::Crops);
        mark(
            table_changed(&before.fruit_patches, &after.fruit_patches),
            Subsystem::FruitPatches,
        );
        mark(
            table_changed(&before.flower_beds, &after.flower_beds),
            Subsystem::FlowerBeds,
        );
        mark(table_changed(&before.rocks, &after.rocks), Subsystem::Rocks);
        mark(
            table_changed(&before.buildings, &after.buildings),
            Subsystem::Buildings,
        );
        mark(
            table_changed(&before.collectibles, &after.collectibles),
            Subsystem::Collectibles,
        );
        mark(
            table_changed(&before.chickens, &after.chickens),
            Subsystem::Chickens,
        );
        mark(before.mushrooms != after.mushrooms, Subsystem::Mushrooms);
        mark(
            before.expansions != after.expansions
                || before.expansion_construction != after.expansion_construction,
            Subsystem::Land,
        );
        mark(before.crafting_box != after.crafting_box, Subsystem::CraftingBox);
        mark(before.delivery != after.delivery, Subsystem::Delivery);
        mark(before.market != after.market, Subsystem::Market);
        mark(before.settlement != after.settlement, Subsystem::Settlement);

        let mut items = BTreeMap::new();
        let keys: BTreeSet<ItemName> = before
            .inventory
            .keys()
            .chain(after.inventory.keys())
            .copied()
            .collect();
        for item in keys {
            let change = signed_change(
                balance(&before.inventory, item),
                balance(&after.inventory, item),
                item.label(),
            )?;
            if !change.is_zero() {
                items.insert(item, change);
            }
        }

        Ok(Self {
            changed,
            items,
            coins: signed_change(before.coins, after.coins, "coins")?,
        })
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Subsystems changed that are not in `permitted`.
    pub fn unpermitted(&self, permitted: &[Subsystem]) -> Vec<Subsystem> {
        self.changed
            .iter()
            .filter(|s| !permitted.contains(s))
            .copied()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{Coordinates, CropPlot, Dimensions, Footprint, PlacementId};

    use super::*;

    fn farm() -> GameState {
        let mut state = GameState::default();
        state.coins = dec!(10);
        state.inventory.insert(ItemName::Wood, dec!(4));
        state.crops.insert(
            PlacementId::from("1"),
            CropPlot {
                footprint: Footprint::at(Coordinates::new(0, 0), Dimensions::new(1, 1)),
                created_at: 0,
                crop: None,
                fertiliser: None,
            },
        );
        state
    }

    #[test]
    fn identical_states_have_empty_delta() {
        let state = farm();
        let delta = StateDelta::between(&state, &state.clone()).unwrap();
        assert!(delta.is_empty());
        assert!(delta.items.is_empty());
        assert_eq!(delta.coins, Decimal::ZERO);
    }

    #[test]
    fn records_signed_item_and_coin_changes() {
        let before = farm();
        let mut after = before.clone();
        after.coins = dec!(7.5);
        after.inventory.insert(ItemName::Wood, dec!(1));
        after.inventory.insert(ItemName::Stone, dec!(2));

        let delta = StateDelta::between(&before, &after).unwrap();
        assert_eq!(delta.coins, dec!(-2.5));
        assert_eq!(delta.items.get(&ItemName::Wood), Some(&dec!(-3)));
        assert_eq!(delta.items.get(&ItemName::Stone), Some(&dec!(2)));
        assert_eq!(
            delta.changed,
            BTreeSet::from([Subsystem::Coins, Subsystem::Inventory])
        );
    }

    #[test]
    fn detached_but_equal_table_is_unchanged() {
        let before = farm();
        let mut after = before.clone();
        let id = PlacementId::from("1");
        if let Some(plot) = after.crops.get_mut(&id) {
            plot.created_at = 0;
        }
        let delta = StateDelta::between(&before, &after).unwrap();
        assert!(!delta.changed.contains(&Subsystem::Crops));
    }

    #[test]
    fn unpermitted_lists_extra_subsystems() {
        let before = farm();
        let mut after = before.clone();
        after.coins = dec!(0);
        after.expansions = 9;
        let delta = StateDelta::between(&before, &after).unwrap();
        assert_eq!(delta.unpermitted(&[Subsystem::Coins]), vec![Subsystem::Land]);
    }
}
