//! Fruit patches.
//!
//! A fruit seed gives [`FRUIT_HARVESTS`] harvests. Each harvest stamps
//! `harvested_at` back-dated by the boosted replenish time, so a patch with a
//! speed boost comes due `base * factor` after each harvest and the boost
//! carries into every following cycle. Once no harvests are left the tree
//! must be chopped with an axe before the patch can be replanted.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_types::{
    ActionKind, AppliedFertiliser, CompostName, FruitHarvested, FruitPatchFertilised,
    FruitPlanted, FruitTreeRemoved, GameState, ItemName, PlantedFruit, Timestamp,
};
use homestead_world::boosts::Target;
use homestead_world::catalogue::{FRUIT_HARVESTS, fruit, fruit_for_seed};
use homestead_world::timers::{back_dated, time_left};
use homestead_world::{RequirementSet, duration_for, yield_for};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, bumpkin, record_activity, require_level};

impl ActionHandler for FruitPlanted {
    const KIND: ActionKind = ActionKind::FruitPlanted;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let def = fruit(fruit_for_seed(self.seed));
        Ok(RequirementSet::default()
            .with_item(self.seed, Decimal::ONE)
            .with_level(def.level))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let name = fruit_for_seed(self.seed);
        let def = fruit(name);
        require_level(state, def.level)?;

        let patch = state
            .fruit_patches
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        if patch.fruit.is_some() {
            return Err(GameError::rule("Fruit is already planted"));
        }

        let boosted = duration_for(state, Target::FruitTime(name), def.replenish_ms)?;
        debit(&mut state.inventory, self.seed, Decimal::ONE)?;

        let patch = state
            .fruit_patches
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        patch.fruit = Some(PlantedFruit {
            name,
            planted_at: back_dated(now, def.replenish_ms, boosted),
            harvested_at: 0,
            harvests_left: FRUIT_HARVESTS,
        });

        record_activity(state, format!("{} Planted", self.seed), Decimal::ONE)
    }
}

impl ActionHandler for FruitHarvested {
    const KIND: ActionKind = ActionKind::FruitHarvested;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let patch = state
            .fruit_patches
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        let planted = patch
            .fruit
            .clone()
            .ok_or(GameError::Validation(ValidationError::NothingPlanted))?;
        let fertiliser = patch.fertiliser.as_ref().map(|f| f.name);

        let def = fruit(planted.name);
        if time_left(planted.planted_at, def.replenish_ms, now)? > 0 {
            return Err(ValidationError::NotReady.into());
        }
        if time_left(planted.harvested_at, def.replenish_ms, now)? > 0 {
            return Err(ValidationError::StillReplenishing.into());
        }
        if planted.harvests_left == 0 {
            return Err(ValidationError::NoHarvestLeft.into());
        }

        let amount = yield_for(state, Target::FruitYield(planted.name), fertiliser, Decimal::ONE)?;
        let boosted = duration_for(state, Target::FruitTime(planted.name), def.replenish_ms)?;
        credit(&mut state.inventory, planted.name, amount)?;

        let patch = state
            .fruit_patches
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        if let Some(fruit) = patch.fruit.as_mut() {
            fruit.harvests_left = planted.harvests_left.saturating_sub(1);
            fruit.harvested_at = back_dated(now, def.replenish_ms, boosted);
        }

        record_activity(state, format!("{} Harvested", planted.name), Decimal::ONE)
    }
}

impl ActionHandler for FruitTreeRemoved {
    const KIND: ActionKind = ActionKind::FruitTreeRemoved;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(ItemName::Axe, Decimal::ONE))
    }

    fn apply(&self, state: &mut GameState, _now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let patch = state
            .fruit_patches
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        let planted = patch
            .fruit
            .as_ref()
            .ok_or(GameError::Validation(ValidationError::NothingPlanted))?;
        if planted.harvests_left > 0 {
            return Err(GameError::rule("Fruit is still available"));
        }

        debit(&mut state.inventory, ItemName::Axe, Decimal::ONE)?;
        credit(&mut state.inventory, ItemName::Wood, Decimal::ONE)?;

        let patch = state
            .fruit_patches
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        patch.fruit = None;
        patch.fertiliser = None;

        record_activity(state, "Fruit Tree Removed", Decimal::ONE)
    }
}

impl ActionHandler for FruitPatchFertilised {
    const KIND: ActionKind = ActionKind::FruitPatchFertilised;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.fertiliser, Decimal::ONE))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        if self.fertiliser != CompostName::FruitfulBlend {
            return Err(GameError::rule("Only Fruitful Blend can fertilise a fruit patch"));
        }
        let patch = state
            .fruit_patches
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        if patch.fertiliser.is_some() {
            return Err(GameError::rule("Fruit patch already fertilised"));
        }

        debit(&mut state.inventory, self.fertiliser, Decimal::ONE)?;

        let patch = state
            .fruit_patches
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Fruit patch", &self.index))?;
        patch.fertiliser = Some(AppliedFertiliser {
            name: self.fertiliser,
            fertilised_at: now,
        });

        record_activity(state, format!("{} Used", self.fertiliser), Decimal::ONE)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{
        Collectible, CollectibleName, Coordinates, Dimensions, Footprint, FruitSeedName, HOUR_MS,
        PlacementId,
    };
    use homestead_world::starting_farm;

    use super::*;

    const PATCH: &str = "patch-1";

    fn farm() -> GameState {
        let mut state = starting_farm(0);
        if let Some(b) = state.bumpkin.as_mut() {
            b.experience = dec!(10000);
        }
        state.inventory.insert(ItemName::AppleSeed, dec!(1));
        state.inventory.insert(ItemName::OrangeSeed, dec!(1));
        state
    }

    fn plant(state: &GameState, seed: FruitSeedName, now: Timestamp) -> GameState {
        FruitPlanted {
            index: PlacementId::from(PATCH),
            seed,
        }
        .handle(state, now)
        .unwrap()
    }

    fn harvest(state: &GameState, now: Timestamp) -> Result<GameState, GameError> {
        FruitHarvested {
            index: PlacementId::from(PATCH),
        }
        .handle(state, now)
    }

    #[test]
    fn harvest_before_growth_is_not_ready() {
        let state = plant(&farm(), FruitSeedName::AppleSeed, 0);
        assert_eq!(harvest(&state, HOUR_MS), Err(ValidationError::NotReady.into()));
    }

    #[test]
    fn second_harvest_must_wait_for_replenish() {
        let state = plant(&farm(), FruitSeedName::AppleSeed, 0);
        let once = harvest(&state, 12 * HOUR_MS).unwrap();
        assert_eq!(once.balance(ItemName::Apple), dec!(1));
        assert_eq!(
            harvest(&once, 13 * HOUR_MS).map_err(|e| e.to_string()),
            Err("Fruit is still replenishing".to_owned())
        );
        let twice = harvest(&once, 24 * HOUR_MS).unwrap();
        assert_eq!(twice.balance(ItemName::Apple), dec!(2));
    }

    #[test]
    fn three_harvests_then_none_left() {
        let mut state = plant(&farm(), FruitSeedName::AppleSeed, 0);
        for cycle in 1..=3 {
            state = harvest(&state, cycle * 12 * HOUR_MS).unwrap();
        }
        assert_eq!(
            harvest(&state, 48 * HOUR_MS),
            Err(ValidationError::NoHarvestLeft.into())
        );
    }

    #[test]
    fn speed_boost_compounds_across_cycles() {
        let mut state = farm();
        state.collectibles.insert(
            PlacementId::from("monkey"),
            Collectible {
                name: CollectibleName::SquirrelMonkey,
                footprint: Footprint::at(Coordinates::new(-3, -1), Dimensions::new(2, 2)),
                created_at: 0,
            },
        );
        // Orange: 8h base, 4h with the Squirrel Monkey.
        let state = plant(&state, FruitSeedName::OrangeSeed, 10 * HOUR_MS);
        assert!(harvest(&state, 14 * HOUR_MS - 1).is_err());
        let once = harvest(&state, 14 * HOUR_MS).unwrap();
        let fruit = once
            .fruit_patches
            .get(&PlacementId::from(PATCH))
            .and_then(|p| p.fruit.clone())
            .unwrap();
        assert_eq!(fruit.harvested_at, 10 * HOUR_MS);
        assert!(harvest(&once, 18 * HOUR_MS - 1).is_err());
        assert!(harvest(&once, 18 * HOUR_MS).is_ok());
    }

    #[test]
    fn tree_removal_needs_exhausted_tree_and_axe() {
        let mut state = plant(&farm(), FruitSeedName::AppleSeed, 0);
        let remove = FruitTreeRemoved {
            index: PlacementId::from(PATCH),
        };
        assert_eq!(
            remove.handle(&state, 12 * HOUR_MS),
            Err(GameError::rule("Fruit is still available"))
        );
        for cycle in 1..=3 {
            state = harvest(&state, cycle * 12 * HOUR_MS).unwrap();
        }
        let cleared = remove.handle(&state, 40 * HOUR_MS).unwrap();
        assert_eq!(cleared.balance(ItemName::Axe), dec!(0));
        assert_eq!(cleared.balance(ItemName::Wood), dec!(6));
        assert!(
            cleared
                .fruit_patches
                .get(&PlacementId::from(PATCH))
                .is_some_and(|p| p.fruit.is_none())
        );
        assert!(remove.handle(&cleared, 40 * HOUR_MS).is_err());
    }

    #[test]
    fn fruitful_blend_adds_yield() {
        let mut state = farm();
        state.inventory.insert(ItemName::FruitfulBlend, dec!(1));
        let state = FruitPatchFertilised {
            index: PlacementId::from(PATCH),
            fertiliser: CompostName::FruitfulBlend,
        }
        .handle(&state, 0)
        .unwrap();
        let state = plant(&state, FruitSeedName::AppleSeed, 0);
        let harvested = harvest(&state, 12 * HOUR_MS).unwrap();
        assert_eq!(harvested.balance(ItemName::Apple), dec!(1.1));
    }

    #[test]
    fn sprout_mix_cannot_fertilise_a_patch() {
        let mut state = farm();
        state.inventory.insert(ItemName::SproutMix, dec!(1));
        let result = FruitPatchFertilised {
            index: PlacementId::from(PATCH),
            fertiliser: CompostName::SproutMix,
        }
        .handle(&state, 0);
        assert!(result.is_err());
    }
}
