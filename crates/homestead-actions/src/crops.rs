//! Crop plots: planting, fertilising, harvesting.
//!
//! Growth time boosts are applied once, at planting, by back-dating
//! `planted_at` so that readiness is always `planted_at + base <= now`.
//! Rapid Root halves what is left of a growing crop, or the whole growth
//! of the next crop when it is spread on an empty plot.
//! Yield boosts are evaluated at harvest against the plot's fertiliser and
//! whatever collectibles, wearables, and skills are active at that moment.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_types::{
    ActionKind, AppliedFertiliser, CompostName, CropHarvested, GameState, PlantedCrop,
    PlotFertilised, SeedPlanted, Timestamp,
};
use homestead_world::boosts::Target;
use homestead_world::catalogue::{crop, crop_for_seed};
use homestead_world::timers::{back_dated, time_left};
use homestead_world::{RequirementSet, duration_for, yield_for};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, bumpkin, record_activity, require_level};

impl ActionHandler for SeedPlanted {
    const KIND: ActionKind = ActionKind::SeedPlanted;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let def = crop(crop_for_seed(self.item));
        Ok(RequirementSet::default()
            .with_item(self.item, Decimal::ONE)
            .with_level(def.level))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let name = crop_for_seed(self.item);
        let def = crop(name);
        require_level(state, def.level)?;

        let plot = state
            .crops
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        if plot.crop.is_some() {
            return Err(GameError::rule("Crop is already planted"));
        }
        let rapid_root = plot
            .fertiliser
            .as_ref()
            .is_some_and(|f| f.name == CompostName::RapidRoot);

        let mut boosted = duration_for(state, Target::CropTime(name), def.harvest_ms)?;
        if rapid_root {
            boosted /= 2;
        }
        debit(&mut state.inventory, self.item, Decimal::ONE)?;

        let plot = state
            .crops
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        plot.crop = Some(PlantedCrop {
            name,
            planted_at: back_dated(now, def.harvest_ms, boosted),
        });

        record_activity(state, format!("{name} Planted"), Decimal::ONE)
    }
}

impl ActionHandler for CropHarvested {
    const KIND: ActionKind = ActionKind::CropHarvested;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let plot = state
            .crops
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        let planted = plot
            .crop
            .clone()
            .ok_or(GameError::Validation(ValidationError::NothingPlanted))?;
        let fertiliser = plot.fertiliser.as_ref().map(|f| f.name);

        let def = crop(planted.name);
        if time_left(planted.planted_at, def.harvest_ms, now)? > 0 {
            return Err(ValidationError::NotReady.into());
        }

        let amount = yield_for(state, Target::CropYield(planted.name), fertiliser, Decimal::ONE)?;
        credit(&mut state.inventory, planted.name, amount)?;

        let plot = state
            .crops
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        plot.crop = None;
        plot.fertiliser = None;

        record_activity(state, format!("{} Harvested", planted.name), Decimal::ONE)
    }
}

impl ActionHandler for PlotFertilised {
    const KIND: ActionKind = ActionKind::PlotFertilised;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.fertiliser, Decimal::ONE))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        if self.fertiliser == CompostName::FruitfulBlend {
            return Err(GameError::rule("Cannot apply Fruitful Blend to a plot"));
        }
        let plot = state
            .crops
            .get(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        if plot.fertiliser.is_some() {
            return Err(GameError::rule("Plot already fertilised"));
        }

        // Rapid Root halves whatever growth time is left.
        let planted_at = match (&plot.crop, self.fertiliser) {
            (Some(planted), CompostName::RapidRoot) => {
                let left = time_left(planted.planted_at, crop(planted.name).harvest_ms, now)?;
                if left == 0 {
                    return Err(GameError::rule("Crop is fully grown"));
                }
                Some(planted.planted_at.saturating_sub(left / 2))
            }
            _ => None,
        };

        debit(&mut state.inventory, self.fertiliser, Decimal::ONE)?;

        let plot = state
            .crops
            .get_mut(&self.index)
            .ok_or_else(|| GameError::not_found("Plot", &self.index))?;
        if let (Some(planted), Some(at)) = (plot.crop.as_mut(), planted_at) {
            planted.planted_at = at;
        }
        plot.fertiliser = Some(AppliedFertiliser {
            name: self.fertiliser,
            fertilised_at: now,
        });

        record_activity(state, format!("{} Used", self.fertiliser), Decimal::ONE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{
        Collectible, CollectibleName, CropSeedName, Dimensions, Footprint, Coordinates, ItemName,
        PlacementId, SECOND_MS,
    };
    use homestead_world::starting_farm;

    use super::*;

    fn plant(state: &GameState, now: Timestamp) -> GameState {
        SeedPlanted {
            index: PlacementId::from("plot-1"),
            item: CropSeedName::SunflowerSeed,
        }
        .handle(state, now)
        .unwrap()
    }

    fn harvest(state: &GameState, now: Timestamp) -> Result<GameState, GameError> {
        CropHarvested {
            index: PlacementId::from("plot-1"),
        }
        .handle(state, now)
    }

    #[test]
    fn plant_consumes_seed_and_records_activity() {
        let state = plant(&starting_farm(0), 0);
        assert_eq!(state.balance(ItemName::SunflowerSeed), dec!(9));
        let plot = state.crops.get(&PlacementId::from("plot-1")).unwrap();
        assert_eq!(plot.crop.as_ref().map(|c| c.planted_at), Some(0));
        let planted = state.bumpkin.as_ref().unwrap().activity_count("Sunflower Planted");
        assert_eq!(planted, dec!(1));
    }

    #[test]
    fn planting_on_occupied_plot_is_rejected() {
        let state = plant(&starting_farm(0), 0);
        let again = SeedPlanted {
            index: PlacementId::from("plot-1"),
            item: CropSeedName::SunflowerSeed,
        }
        .handle(&state, 1);
        assert_eq!(again, Err(GameError::rule("Crop is already planted")));
    }

    #[test]
    fn planting_on_missing_plot_is_rejected() {
        let result = SeedPlanted {
            index: PlacementId::from("nope"),
            item: CropSeedName::SunflowerSeed,
        }
        .handle(&starting_farm(0), 0);
        assert_eq!(result.map_err(|e| e.to_string()), Err("Plot not found: nope".to_owned()));
    }

    #[test]
    fn planting_above_level_is_rejected() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::KaleSeed, dec!(1));
        let result = SeedPlanted {
            index: PlacementId::from("plot-1"),
            item: CropSeedName::KaleSeed,
        }
        .handle(&state, 0);
        assert!(matches!(
            result,
            Err(GameError::Validation(ValidationError::Unmet(_)))
        ));
    }

    #[test]
    fn harvest_before_growth_is_not_ready() {
        let state = plant(&starting_farm(0), 0);
        assert_eq!(
            harvest(&state, 30 * SECOND_MS),
            Err(ValidationError::NotReady.into())
        );
    }

    #[test]
    fn harvest_after_growth_yields_and_clears_plot() {
        let state = plant(&starting_farm(0), 0);
        let harvested = harvest(&state, 61 * SECOND_MS).unwrap();
        assert_eq!(harvested.balance(ItemName::Sunflower), dec!(1));
        let plot = harvested.crops.get(&PlacementId::from("plot-1")).unwrap();
        assert!(plot.crop.is_none());
        assert_eq!(
            harvested
                .bumpkin
                .as_ref()
                .unwrap()
                .activity_count("Sunflower Harvested"),
            dec!(1)
        );
    }

    #[test]
    fn second_harvest_finds_nothing() {
        let state = plant(&starting_farm(0), 0);
        let harvested = harvest(&state, 61 * SECOND_MS).unwrap();
        assert_eq!(
            harvest(&harvested, 61 * SECOND_MS),
            Err(ValidationError::NothingPlanted.into())
        );
    }

    #[test]
    fn nancy_back_dates_planting() {
        let mut state = starting_farm(0);
        state.collectibles.insert(
            PlacementId::from("c1"),
            Collectible {
                name: CollectibleName::Nancy,
                footprint: Footprint::at(Coordinates::new(-3, -2), Dimensions::new(1, 1)),
                created_at: 0,
            },
        );
        let state = plant(&state, 100 * SECOND_MS);
        let plot = state.crops.get(&PlacementId::from("plot-1")).unwrap();
        // 60s * 0.85 = 51s, so planting is back-dated by 9s.
        assert_eq!(plot.crop.as_ref().map(|c| c.planted_at), Some(91 * SECOND_MS));
        assert!(harvest(&state, 151 * SECOND_MS).is_ok());
        assert!(harvest(&state, 150 * SECOND_MS).is_err());
    }

    #[test]
    fn sprout_mix_adds_yield_and_is_consumed_by_harvest() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::SproutMix, dec!(1));
        let state = PlotFertilised {
            index: PlacementId::from("plot-1"),
            fertiliser: CompostName::SproutMix,
        }
        .handle(&state, 0)
        .unwrap();
        let state = plant(&state, 0);
        let harvested = harvest(&state, 60 * SECOND_MS).unwrap();
        assert_eq!(harvested.balance(ItemName::Sunflower), dec!(1.2));
        let plot = harvested.crops.get(&PlacementId::from("plot-1")).unwrap();
        assert!(plot.fertiliser.is_none());
    }

    #[test]
    fn rapid_root_halves_remaining_time() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::RapidRoot, dec!(1));
        let state = plant(&state, 0);
        let state = PlotFertilised {
            index: PlacementId::from("plot-1"),
            fertiliser: CompostName::RapidRoot,
        }
        .handle(&state, 20 * SECOND_MS)
        .unwrap();
        // 40s left, halved to 20s: ready at 40s.
        assert!(harvest(&state, 40 * SECOND_MS).is_ok());
        assert!(harvest(&state, 39 * SECOND_MS).is_err());
    }

    #[test]
    fn rapid_root_on_empty_plot_speeds_the_next_crop() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::RapidRoot, dec!(1));
        let state = PlotFertilised {
            index: PlacementId::from("plot-1"),
            fertiliser: CompostName::RapidRoot,
        }
        .handle(&state, 0)
        .unwrap();
        assert_eq!(state.balance(ItemName::RapidRoot), dec!(0));

        // 60s halved to 30s: planted at 100s, ready at 130s.
        let state = plant(&state, 100 * SECOND_MS);
        assert_eq!(
            harvest(&state, 129 * SECOND_MS),
            Err(ValidationError::NotReady.into())
        );
        let harvested = harvest(&state, 130 * SECOND_MS).unwrap();
        assert_eq!(harvested.balance(ItemName::Sunflower), dec!(1));

        // The fertiliser goes with the harvest; the next crop grows normally.
        let replanted = plant(&harvested, 130 * SECOND_MS);
        assert!(harvest(&replanted, 189 * SECOND_MS).is_err());
        assert!(harvest(&replanted, 190 * SECOND_MS).is_ok());
    }

    #[test]
    fn double_fertilising_is_rejected() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::SproutMix, dec!(2));
        let action = PlotFertilised {
            index: PlacementId::from("plot-1"),
            fertiliser: CompostName::SproutMix,
        };
        let state = action.handle(&state, 0).unwrap();
        assert_eq!(
            action.handle(&state, 0),
            Err(GameError::rule("Plot already fertilised"))
        );
    }
}
