//! Chickens: feeding and egg collection.
//!
//! A chicken eats wheat when fed and lays an egg [`EGG_LAY_MS`] later. It
//! cannot be fed again until the egg is collected.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_types::{ActionKind, ChickenFed, EggCollected, GameState, ItemName, Timestamp};
use homestead_world::boosts::Target;
use homestead_world::catalogue::{CHICKEN_FEED, EGG_LAY_MS};
use homestead_world::timers::time_left;
use homestead_world::{RequirementSet, yield_for};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, bumpkin, record_activity};

fn feed_amount(state: &GameState) -> Result<Decimal, GameError> {
    Ok(yield_for(state, Target::ChickenFeed, None, CHICKEN_FEED)?)
}

impl ActionHandler for ChickenFed {
    const KIND: ActionKind = ActionKind::ChickenFed;

    fn requirements(
        &self,
        state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(ItemName::Wheat, feed_amount(state)?))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let chicken = state
            .chickens
            .get(&self.id)
            .ok_or_else(|| GameError::not_found("Chicken", &self.id))?;
        if chicken.fed_at.is_some() {
            return Err(GameError::rule("Chicken is not hungry"));
        }

        let feed = feed_amount(state)?;
        debit(&mut state.inventory, ItemName::Wheat, feed)?;

        let chicken = state
            .chickens
            .get_mut(&self.id)
            .ok_or_else(|| GameError::not_found("Chicken", &self.id))?;
        chicken.fed_at = Some(now);

        record_activity(state, "Chicken Fed", Decimal::ONE)
    }
}

impl ActionHandler for EggCollected {
    const KIND: ActionKind = ActionKind::EggCollected;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let chicken = state
            .chickens
            .get(&self.id)
            .ok_or_else(|| GameError::not_found("Chicken", &self.id))?;
        let fed_at = chicken
            .fed_at
            .ok_or(GameError::rule("Chicken has not been fed"))?;
        if time_left(fed_at, EGG_LAY_MS, now)? > 0 {
            return Err(ValidationError::NotReady.into());
        }

        let eggs = yield_for(state, Target::EggYield, None, Decimal::ONE)?;
        credit(&mut state.inventory, ItemName::Egg, eggs)?;

        let chicken = state
            .chickens
            .get_mut(&self.id)
            .ok_or_else(|| GameError::not_found("Chicken", &self.id))?;
        chicken.fed_at = None;

        record_activity(state, "Egg Collected", Decimal::ONE)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{
        Collectible, CollectibleName, Coordinates, DAY_MS, Dimensions, Footprint, PlacementId,
        SkillName,
    };
    use homestead_world::starting_farm;

    use super::*;

    fn farm() -> GameState {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Wheat, dec!(2));
        state
    }

    fn fed(state: &GameState, now: Timestamp) -> Result<GameState, GameError> {
        ChickenFed {
            id: PlacementId::from("chicken-1"),
        }
        .handle(state, now)
    }

    fn collect(state: &GameState, now: Timestamp) -> Result<GameState, GameError> {
        EggCollected {
            id: PlacementId::from("chicken-1"),
        }
        .handle(state, now)
    }

    #[test]
    fn feed_then_collect_after_two_days() {
        let state = fed(&farm(), 0).unwrap();
        assert_eq!(state.balance(ItemName::Wheat), dec!(1));
        assert_eq!(collect(&state, DAY_MS), Err(ValidationError::NotReady.into()));
        let collected = collect(&state, 2 * DAY_MS).unwrap();
        assert_eq!(collected.balance(ItemName::Egg), dec!(1));
        assert!(fed(&collected, 2 * DAY_MS).is_ok());
    }

    #[test]
    fn fed_chicken_cannot_be_fed_again() {
        let state = fed(&farm(), 0).unwrap();
        assert_eq!(fed(&state, 1), Err(GameError::rule("Chicken is not hungry")));
    }

    #[test]
    fn hungry_chicken_has_no_egg() {
        assert_eq!(
            collect(&farm(), 0),
            Err(GameError::rule("Chicken has not been fed"))
        );
    }

    #[test]
    fn fat_chicken_and_egg_cellent_boost() {
        let mut state = farm();
        state.collectibles.insert(
            PlacementId::from("fat"),
            Collectible {
                name: CollectibleName::FatChicken,
                footprint: Footprint::at(Coordinates::new(-1, -3), Dimensions::new(1, 1)),
                created_at: 0,
            },
        );
        if let Some(b) = state.bumpkin.as_mut() {
            b.skills.insert(SkillName::EggCellent);
        }
        let state = fed(&state, 0).unwrap();
        assert_eq!(state.balance(ItemName::Wheat), dec!(1.1));
        let collected = collect(&state, 2 * DAY_MS).unwrap();
        assert_eq!(collected.balance(ItemName::Egg), dec!(1.1));
    }
}
