//! Flower beds.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_types::{
    ActionKind, FlowerHarvested, FlowerPlanted, GameState, PlantedFlower, Timestamp,
};
use homestead_world::boosts::Target;
use homestead_world::catalogue::{flower_grow_ms, flower_seed};
use homestead_world::timers::{back_dated, time_left};
use homestead_world::{RequirementSet, duration_for};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, bumpkin, record_activity, require_level};

impl ActionHandler for FlowerPlanted {
    const KIND: ActionKind = ActionKind::FlowerPlanted;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default()
            .with_item(self.seed, Decimal::ONE)
            .with_level(flower_seed(self.seed).level))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let def = flower_seed(self.seed);
        require_level(state, def.level)?;

        let bed = state
            .flower_beds
            .get(&self.id)
            .ok_or_else(|| GameError::not_found("Flower bed", &self.id))?;
        if bed.flower.is_some() {
            return Err(GameError::rule("Flower is already planted"));
        }

        let boosted = duration_for(state, Target::FlowerTime(def.name), def.grow_ms)?;
        debit(&mut state.inventory, self.seed, Decimal::ONE)?;

        let bed = state
            .flower_beds
            .get_mut(&self.id)
            .ok_or_else(|| GameError::not_found("Flower bed", &self.id))?;
        bed.flower = Some(PlantedFlower {
            name: def.name,
            planted_at: back_dated(now, def.grow_ms, boosted),
        });

        record_activity(state, format!("{} Planted", self.seed), Decimal::ONE)
    }
}

impl ActionHandler for FlowerHarvested {
    const KIND: ActionKind = ActionKind::FlowerHarvested;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let bed = state
            .flower_beds
            .get(&self.id)
            .ok_or_else(|| GameError::not_found("Flower bed", &self.id))?;
        let planted = bed
            .flower
            .clone()
            .ok_or(GameError::Validation(ValidationError::NothingPlanted))?;

        if time_left(planted.planted_at, flower_grow_ms(planted.name), now)? > 0 {
            return Err(ValidationError::NotReady.into());
        }

        credit(&mut state.inventory, planted.name, Decimal::ONE)?;
        let bed = state
            .flower_beds
            .get_mut(&self.id)
            .ok_or_else(|| GameError::not_found("Flower bed", &self.id))?;
        bed.flower = None;

        record_activity(state, format!("{} Harvested", planted.name), Decimal::ONE)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{DAY_MS, FlowerSeedName, ItemName, PlacementId};
    use homestead_world::starting_farm;

    use super::*;

    fn farm() -> GameState {
        let mut state = starting_farm(0);
        if let Some(b) = state.bumpkin.as_mut() {
            b.experience = dec!(200);
        }
        state.inventory.insert(ItemName::SunpetalSeed, dec!(2));
        state
    }

    #[test]
    fn flower_grows_in_a_day() {
        let state = FlowerPlanted {
            id: PlacementId::from("bed-1"),
            seed: FlowerSeedName::SunpetalSeed,
        }
        .handle(&farm(), 0)
        .unwrap();
        assert_eq!(state.balance(ItemName::SunpetalSeed), dec!(1));

        let harvest = FlowerHarvested {
            id: PlacementId::from("bed-1"),
        };
        assert_eq!(
            harvest.handle(&state, DAY_MS - 1),
            Err(ValidationError::NotReady.into())
        );
        let harvested = harvest.handle(&state, DAY_MS).unwrap();
        assert_eq!(harvested.balance(ItemName::RedPansy), dec!(1));
        assert!(
            harvested
                .flower_beds
                .get(&PlacementId::from("bed-1"))
                .is_some_and(|b| b.flower.is_none())
        );
    }

    #[test]
    fn level_gate_applies() {
        let mut state = farm();
        if let Some(b) = state.bumpkin.as_mut() {
            b.experience = dec!(0);
        }
        let result = FlowerPlanted {
            id: PlacementId::from("bed-1"),
            seed: FlowerSeedName::SunpetalSeed,
        }
        .handle(&state, 0);
        assert!(result.is_err());
    }

    #[test]
    fn empty_bed_has_nothing_to_harvest() {
        let result = FlowerHarvested {
            id: PlacementId::from("bed-1"),
        }
        .handle(&farm(), 0);
        assert_eq!(result, Err(ValidationError::NothingPlanted.into()));
    }
}
