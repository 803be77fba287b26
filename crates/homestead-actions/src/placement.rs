//! Placing, moving, and removing things on the island.
//!
//! Every placement is checked against owned land and every other footprint
//! before it is written. Placeable stock is counted, not consumed: an
//! inventory count of "Crop Plot" or a collectible includes the copies
//! already on the island, so the available stock is the count minus what is
//! placed.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{balance, debit};
use homestead_types::{
    ActionKind, Building, BuildingConstructed, BuildingName, Collectible, CollectiblePlaced,
    CropPlot, Footprint, GameState, ItemName, PlacementId, PlacementKind, PlacementMoved,
    PlacementRemoved, PlotPlaced, Timestamp,
};
use homestead_world::catalogue::{
    COMPOSTER_LOCK_RADIUS, building, collectible_dimensions, resource_dimensions,
};
use homestead_world::land::overlaps;
use homestead_world::timers::ready_at;
use homestead_world::{RequirementSet, Unmet, detect_collision};

use crate::error::{GameError, ValidationError};
use crate::handler::{ActionHandler, record_activity, require};

/// Reject a footprint that hits water or another placement.
fn ensure_free(
    state: &GameState,
    footprint: &Footprint,
    ignore: Option<(PlacementKind, &PlacementId)>,
) -> Result<(), GameError> {
    match detect_collision(state, footprint, ignore) {
        Some(collision) => Err(ValidationError::Collision(collision).into()),
        None => Ok(()),
    }
}

/// Whether `id` is already used in the table for `kind`.
fn id_taken(state: &GameState, kind: PlacementKind, id: &PlacementId) -> bool {
    match kind {
        PlacementKind::Plot => state.crops.contains(id),
        PlacementKind::FruitPatch => state.fruit_patches.contains(id),
        PlacementKind::FlowerBed => state.flower_beds.contains(id),
        PlacementKind::Rock => state.rocks.contains(id),
        PlacementKind::Building => state.buildings.contains(id),
        PlacementKind::Collectible => state.collectibles.contains(id),
        PlacementKind::Chicken => state.chickens.contains(id),
    }
}

fn ensure_new_id(state: &GameState, kind: PlacementKind, id: &PlacementId) -> Result<(), GameError> {
    if id_taken(state, kind, id) {
        return Err(GameError::rule("Id already in use"));
    }
    Ok(())
}

/// Current footprint of a placement.
fn footprint_of(state: &GameState, kind: PlacementKind, id: &PlacementId) -> Option<Footprint> {
    match kind {
        PlacementKind::Plot => state.crops.get(id).map(|p| p.footprint),
        PlacementKind::FruitPatch => state.fruit_patches.get(id).map(|p| p.footprint),
        PlacementKind::FlowerBed => state.flower_beds.get(id).map(|p| p.footprint),
        PlacementKind::Rock => state.rocks.get(id).map(|p| p.footprint),
        PlacementKind::Building => state.buildings.get(id).map(|p| p.footprint),
        PlacementKind::Collectible => state.collectibles.get(id).map(|p| p.footprint),
        PlacementKind::Chicken => state.chickens.get(id).map(|p| p.footprint),
    }
}

/// Mutable footprint of a placement.
fn footprint_mut<'a>(
    state: &'a mut GameState,
    kind: PlacementKind,
    id: &PlacementId,
) -> Option<&'a mut Footprint> {
    match kind {
        PlacementKind::Plot => state.crops.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::FruitPatch => state.fruit_patches.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::FlowerBed => state.flower_beds.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::Rock => state.rocks.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::Building => state.buildings.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::Collectible => state.collectibles.get_mut(id).map(|p| &mut p.footprint),
        PlacementKind::Chicken => state.chickens.get_mut(id).map(|p| &mut p.footprint),
    }
}

/// Grow a footprint by `radius` cells on every side.
fn widened(footprint: &Footprint, radius: i32) -> Footprint {
    let grow = u32::try_from(radius).unwrap_or(0).saturating_mul(2);
    Footprint {
        x: footprint.x.saturating_sub(radius),
        y: footprint.y.saturating_add(radius),
        width: footprint.width.saturating_add(grow),
        height: footprint.height.saturating_add(grow),
    }
}

/// Whether a plot or patch at `footprint` sits inside the area of an
/// Advanced Composter that is still producing at `now`.
fn is_locked_by_composter(state: &GameState, footprint: &Footprint, now: Timestamp) -> bool {
    state.buildings.values().any(|b| {
        b.name == BuildingName::AdvancedComposter
            && b.producing.as_ref().is_some_and(|p| p.ready_at > now)
            && overlaps(&widened(&b.footprint, COMPOSTER_LOCK_RADIUS), footprint)
    })
}

// ---------------------------------------------------------------------------
// Placing
// ---------------------------------------------------------------------------

impl ActionHandler for PlotPlaced {
    const KIND: ActionKind = ActionKind::PlotPlaced;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let placed = Decimal::from(state.crops.len());
        let available = balance(&state.inventory, ItemName::CropPlot)
            .checked_sub(placed)
            .unwrap_or(Decimal::ZERO);
        if available < Decimal::ONE {
            return Err(GameError::rule("No plots available"));
        }
        ensure_new_id(state, PlacementKind::Plot, &self.id)?;

        let footprint = Footprint::at(self.coordinates, resource_dimensions(PlacementKind::Plot));
        ensure_free(state, &footprint, None)?;

        state.crops.insert(
            self.id.clone(),
            CropPlot {
                footprint,
                created_at: now,
                crop: None,
                fertiliser: None,
            },
        );
        Ok(())
    }
}

impl ActionHandler for BuildingConstructed {
    const KIND: ActionKind = ActionKind::BuildingConstructed;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(building(self.name).requirements)
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let def = building(self.name);
        require(&def.requirements, state, now)?;
        if state.building_count(self.name) >= def.limit {
            return Err(GameError::rule("Building limit reached"));
        }
        ensure_new_id(state, PlacementKind::Building, &self.id)?;

        let footprint = Footprint::at(self.coordinates, def.dimensions);
        ensure_free(state, &footprint, None)?;

        def.requirements.charge(state)?;
        state.buildings.insert(
            self.id.clone(),
            Building {
                name: self.name,
                footprint,
                created_at: now,
                ready_at: ready_at(now, def.construction_ms)?,
                producing: None,
            },
        );

        record_activity(state, format!("{} Constructed", self.name), Decimal::ONE)
    }
}

impl ActionHandler for CollectiblePlaced {
    const KIND: ActionKind = ActionKind::CollectiblePlaced;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let placed = state
            .collectibles
            .values()
            .filter(|c| c.name == self.name)
            .count();
        let required = Decimal::from(placed.saturating_add(1));
        let available = balance(&state.inventory, self.name);
        if available < required {
            return Err(Unmet::Item {
                item: self.name.into(),
                required,
                available,
            }
            .into());
        }
        ensure_new_id(state, PlacementKind::Collectible, &self.id)?;

        let footprint = Footprint::at(self.coordinates, collectible_dimensions(self.name));
        ensure_free(state, &footprint, None)?;

        state.collectibles.insert(
            self.id.clone(),
            Collectible {
                name: self.name,
                footprint,
                created_at: now,
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Moving and removing
// ---------------------------------------------------------------------------

impl ActionHandler for PlacementMoved {
    const KIND: ActionKind = ActionKind::PlacementMoved;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let current = footprint_of(state, self.kind, &self.id)
            .ok_or_else(|| GameError::not_found("Placement", &self.id))?;

        if matches!(self.kind, PlacementKind::Plot | PlacementKind::FruitPatch)
            && is_locked_by_composter(state, &current, now)
        {
            return Err(GameError::rule("Locked by an active Advanced Composter"));
        }

        let target = current.moved_to(self.coordinates);
        ensure_free(state, &target, Some((self.kind, &self.id)))?;

        let footprint = footprint_mut(state, self.kind, &self.id)
            .ok_or_else(|| GameError::not_found("Placement", &self.id))?;
        *footprint = target;
        Ok(())
    }
}

impl ActionHandler for PlacementRemoved {
    const KIND: ActionKind = ActionKind::PlacementRemoved;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        if self.kind == PlacementKind::Collectible {
            return Ok(RequirementSet::default().with_item(ItemName::RustyShovel, Decimal::ONE));
        }
        Ok(RequirementSet::default())
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let missing = || GameError::not_found("Placement", &self.id);
        let in_use = || GameError::rule("Placement is in use");

        match self.kind {
            PlacementKind::Plot => {
                let plot = state.crops.get(&self.id).ok_or_else(missing)?;
                if plot.crop.is_some() {
                    return Err(GameError::rule("Crop is growing"));
                }
                state.crops.remove(&self.id);
            }
            PlacementKind::FruitPatch => {
                let patch = state.fruit_patches.get(&self.id).ok_or_else(missing)?;
                if patch.fruit.is_some() {
                    return Err(in_use());
                }
                state.fruit_patches.remove(&self.id);
            }
            PlacementKind::FlowerBed => {
                let bed = state.flower_beds.get(&self.id).ok_or_else(missing)?;
                if bed.flower.is_some() {
                    return Err(in_use());
                }
                state.flower_beds.remove(&self.id);
            }
            PlacementKind::Rock => {
                state.rocks.remove(&self.id).ok_or_else(missing)?;
            }
            PlacementKind::Building => {
                let b = state.buildings.get(&self.id).ok_or_else(missing)?;
                if b.producing.is_some() {
                    return Err(in_use());
                }
                state.buildings.remove(&self.id);
            }
            PlacementKind::Collectible => {
                if !state.collectibles.contains(&self.id) {
                    return Err(missing());
                }
                require(&self.requirements(state, now)?, state, now)?;
                debit(&mut state.inventory, ItemName::RustyShovel, Decimal::ONE)?;
                state.collectibles.remove(&self.id);
            }
            PlacementKind::Chicken => {
                let chicken = state.chickens.get(&self.id).ok_or_else(missing)?;
                if chicken.fed_at.is_some() {
                    return Err(in_use());
                }
                state.chickens.remove(&self.id);
            }
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::{
        CollectibleName, Coordinates, CropSeedName, Dimensions, Production, SeedPlanted,
    };
    use homestead_world::{Collision, starting_farm};

    use super::*;

    fn at(x: i32, y: i32) -> Coordinates {
        Coordinates::new(x, y)
    }

    #[test]
    fn plot_placed_on_free_land() {
        let state = PlotPlaced {
            id: PlacementId::from("plot-4"),
            coordinates: at(-3, 1),
        }
        .handle(&starting_farm(0), 5)
        .unwrap();
        assert_eq!(state.crops.len(), 4);
        assert_eq!(
            state.crops.get(&PlacementId::from("plot-4")).map(|p| p.created_at),
            Some(5)
        );
    }

    #[test]
    fn no_plots_left_to_place() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::CropPlot, dec!(3));
        let result = PlotPlaced {
            id: PlacementId::from("plot-4"),
            coordinates: at(-3, 1),
        }
        .handle(&state, 0);
        assert_eq!(result, Err(GameError::rule("No plots available")));
    }

    #[test]
    fn building_over_a_plot_collides() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Stone, dec!(2));
        let result = BuildingConstructed {
            id: PlacementId::from("fire"),
            name: BuildingName::FirePit,
            coordinates: at(-2, 2),
        }
        .handle(&state, 0);
        assert_eq!(result.map_err(|e| e.to_string()), Err("collision".to_owned()));
    }

    #[test]
    fn building_in_water_collides() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Stone, dec!(2));
        let result = BuildingConstructed {
            id: PlacementId::from("fire"),
            name: BuildingName::FirePit,
            coordinates: at(20, 20),
        }
        .handle(&state, 0);
        assert_eq!(
            result,
            Err(ValidationError::Collision(Collision::Water).into())
        );
    }

    #[test]
    fn building_charges_and_starts_construction() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Stone, dec!(2));
        let state = BuildingConstructed {
            id: PlacementId::from("fire"),
            name: BuildingName::FirePit,
            coordinates: at(5, 0),
        }
        .handle(&state, 1_000)
        .unwrap();
        assert_eq!(state.balance(ItemName::Wood), dec!(2));
        assert_eq!(state.balance(ItemName::Stone), dec!(0));
        let b = state.buildings.get(&PlacementId::from("fire")).unwrap();
        assert_eq!(b.ready_at, 31_000);
    }

    #[test]
    fn building_without_resources_is_insufficient() {
        let result = BuildingConstructed {
            id: PlacementId::from("fire"),
            name: BuildingName::FirePit,
            coordinates: at(5, 0),
        }
        .handle(&starting_farm(0), 0);
        assert_eq!(
            result.map_err(|e| e.to_string()),
            Err("Insufficient Stone".to_owned())
        );
    }

    #[test]
    fn collectible_needs_unplaced_stock() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Nancy, dec!(1));
        let place = |id: &str, x: i32| CollectiblePlaced {
            id: PlacementId::from(id),
            name: CollectibleName::Nancy,
            coordinates: at(x, -3),
        };
        let state = place("n1", -1).handle(&state, 0).unwrap();
        assert!(place("n2", 0).handle(&state, 0).is_err());
    }

    #[test]
    fn move_ignores_own_footprint() {
        let state = PlacementMoved {
            kind: PlacementKind::Plot,
            id: PlacementId::from("plot-1"),
            coordinates: at(-2, 1),
        }
        .handle(&starting_farm(0), 0)
        .unwrap();
        assert_eq!(
            state.crops.get(&PlacementId::from("plot-1")).map(|p| p.footprint.y),
            Some(1)
        );
    }

    #[test]
    fn move_onto_neighbour_collides() {
        let result = PlacementMoved {
            kind: PlacementKind::Plot,
            id: PlacementId::from("plot-1"),
            coordinates: at(-1, 2),
        }
        .handle(&starting_farm(0), 0);
        assert!(matches!(
            result,
            Err(GameError::Validation(ValidationError::Collision(
                Collision::Placement { .. }
            )))
        ));
    }

    #[test]
    fn active_advanced_composter_locks_nearby_plots() {
        let mut state = starting_farm(0);
        state.flower_beds.remove(&PlacementId::from("bed-1"));
        state.buildings.insert(
            PlacementId::from("adv"),
            Building {
                name: BuildingName::AdvancedComposter,
                footprint: Footprint::at(at(-2, 0), Dimensions::new(2, 2)),
                created_at: 0,
                ready_at: 0,
                producing: Some(Production {
                    item: ItemName::RapidRoot,
                    amount: dec!(10),
                    started_at: 0,
                    ready_at: 1_000,
                    boosted_at: None,
                }),
            },
        );
        let action = PlacementMoved {
            kind: PlacementKind::Plot,
            id: PlacementId::from("plot-1"),
            coordinates: at(-3, 1),
        };
        assert_eq!(
            action.handle(&state, 500),
            Err(GameError::rule("Locked by an active Advanced Composter"))
        );
        assert!(action.handle(&state, 1_000).is_ok());
    }

    #[test]
    fn growing_plot_cannot_be_removed() {
        let state = SeedPlanted {
            index: PlacementId::from("plot-1"),
            item: CropSeedName::SunflowerSeed,
        }
        .handle(&starting_farm(0), 0)
        .unwrap();
        let remove = PlacementRemoved {
            kind: PlacementKind::Plot,
            id: PlacementId::from("plot-1"),
        };
        assert_eq!(remove.handle(&state, 1), Err(GameError::rule("Crop is growing")));
        let empty = remove.handle(&starting_farm(0), 1).unwrap();
        assert_eq!(empty.crops.len(), 2);
    }

    #[test]
    fn collectible_removal_uses_a_shovel() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Nancy, dec!(1));
        let state = CollectiblePlaced {
            id: PlacementId::from("n1"),
            name: CollectibleName::Nancy,
            coordinates: at(-1, -3),
        }
        .handle(&state, 0)
        .unwrap();
        let remove = PlacementRemoved {
            kind: PlacementKind::Collectible,
            id: PlacementId::from("n1"),
        };
        assert_eq!(
            remove.handle(&state, 0).map_err(|e| e.to_string()),
            Err("Insufficient Rusty Shovel".to_owned())
        );

        let mut with_shovel = state;
        with_shovel.inventory.insert(ItemName::RustyShovel, dec!(1));
        let removed = remove.handle(&with_shovel, 0).unwrap();
        assert!(removed.collectibles.is_empty());
        assert_eq!(removed.balance(ItemName::RustyShovel), dec!(0));
        assert_eq!(removed.balance(ItemName::Nancy), dec!(1));
    }
}
