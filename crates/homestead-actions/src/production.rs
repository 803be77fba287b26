//! Timed production: cooking, composting, the crafting box, and feeding the
//! bumpkin what was cooked.
//!
//! A running process is a [`Production`] with an absolute `ready_at`. Start
//! handlers charge the inputs and stamp `started_at = now`; collect handlers
//! credit the output once `now >= ready_at` and clear the slot. A building
//! runs one process at a time and must have finished construction first.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, debit};
use homestead_ledger::quantity::scale;
use homestead_types::{
    ActionKind, Building, BumpkinFed, CompostAccelerated, CompostCollected, CompostStarted,
    CraftingCollected, CraftingStarted, FoodName, GameState, ItemName, PlacementId, Production,
    RecipeCollected, RecipeCooked, Timestamp,
};
use homestead_world::boosts::Target;
use homestead_world::catalogue::{
    COMPOST_ACCELERATION_MS, ComposterDef, composter, craftable, recipe,
};
use homestead_world::timers::{ready_at, remaining};
use homestead_world::{RequirementSet, TimerError, duration_for};

use crate::error::{GameError, ValidationError};
use crate::handler::{
    ActionHandler, bumpkin, gain_experience, record_activity, require, require_whole_amount,
};

/// Milliseconds until a process completes.
///
/// A `now` before the process started is a clock moving backward.
pub(crate) fn production_left(process: &Production, now: Timestamp) -> Result<u64, GameError> {
    if now < process.started_at {
        return Err(TimerError::ClockMovedBackward {
            event_at: process.started_at,
            now,
        }
        .into());
    }
    Ok(remaining(process.ready_at, now))
}

/// A finished building, or why it cannot be used.
fn finished_building<'a>(
    state: &'a GameState,
    id: &PlacementId,
    now: Timestamp,
) -> Result<&'a Building, GameError> {
    let building = state
        .buildings
        .get(id)
        .ok_or_else(|| GameError::not_found("Building", id))?;
    if building.ready_at > now {
        return Err(GameError::rule("Building is under construction"));
    }
    Ok(building)
}

/// Set or clear the process a building runs.
fn set_producing(
    state: &mut GameState,
    id: &PlacementId,
    producing: Option<Production>,
) -> Result<(), GameError> {
    let building = state
        .buildings
        .get_mut(id)
        .ok_or_else(|| GameError::not_found("Building", id))?;
    building.producing = producing;
    Ok(())
}

/// Take a finished process out of its slot and credit its output.
fn collect(state: &mut GameState, process: &Production, now: Timestamp) -> Result<(), GameError> {
    if production_left(process, now)? > 0 {
        return Err(ValidationError::NotReady.into());
    }
    credit(&mut state.inventory, process.item, process.amount)?;
    Ok(())
}

fn ingredients(items: &BTreeMap<ItemName, Decimal>) -> RequirementSet {
    RequirementSet {
        items: items.clone(),
        ..RequirementSet::default()
    }
}

// ---------------------------------------------------------------------------
// Cooking
// ---------------------------------------------------------------------------

impl ActionHandler for RecipeCooked {
    const KIND: ActionKind = ActionKind::RecipeCooked;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(ingredients(&recipe(self.item).ingredients))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        let def = recipe(self.item);
        let building = finished_building(state, &self.building_id, now)?;
        if building.name != def.building {
            return Err(GameError::rule("Recipe needs a different building"));
        }
        if building.producing.is_some() {
            return Err(GameError::rule("Building is busy"));
        }

        let cost = ingredients(&def.ingredients);
        require(&cost, state, now)?;
        let cooking_ms = duration_for(state, Target::CookingTime, def.cooking_ms)?;
        cost.charge(state)?;

        set_producing(
            state,
            &self.building_id,
            Some(Production {
                item: self.item.into(),
                amount: Decimal::ONE,
                started_at: now,
                ready_at: ready_at(now, cooking_ms)?,
                boosted_at: None,
            }),
        )?;

        record_activity(state, format!("{} Cooked", self.item), Decimal::ONE)
    }
}

impl ActionHandler for RecipeCollected {
    const KIND: ActionKind = ActionKind::RecipeCollected;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let building = finished_building(state, &self.building_id, now)?;
        let process = building
            .producing
            .clone()
            .filter(|p| FoodName::try_from(p.item).is_ok())
            .ok_or(GameError::rule("Nothing is cooking"))?;

        collect(state, &process, now)?;
        set_producing(state, &self.building_id, None)
    }
}

// ---------------------------------------------------------------------------
// Composting
// ---------------------------------------------------------------------------

/// The composter rules for a finished building.
fn composter_at(
    state: &GameState,
    id: &PlacementId,
    now: Timestamp,
) -> Result<(ComposterDef, Option<Production>), GameError> {
    let building = finished_building(state, id, now)?;
    let def = composter(building.name).ok_or(GameError::rule("Building is not a composter"))?;
    Ok((def, building.producing.clone()))
}

impl ActionHandler for CompostStarted {
    const KIND: ActionKind = ActionKind::CompostStarted;

    fn requirements(
        &self,
        state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let building = state
            .buildings
            .get(&self.building_id)
            .ok_or_else(|| GameError::not_found("Building", &self.building_id))?;
        let def = composter(building.name).ok_or(GameError::rule("Building is not a composter"))?;
        Ok(ingredients(&def.inputs))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let (def, producing) = composter_at(state, &self.building_id, now)?;
        if producing.is_some() {
            return Err(GameError::rule("Composter is busy"));
        }

        let cost = ingredients(&def.inputs);
        require(&cost, state, now)?;
        cost.charge(state)?;

        set_producing(
            state,
            &self.building_id,
            Some(Production {
                item: def.produces.into(),
                amount: def.amount,
                started_at: now,
                ready_at: ready_at(now, def.production_ms)?,
                boosted_at: None,
            }),
        )
    }
}

impl ActionHandler for CompostCollected {
    const KIND: ActionKind = ActionKind::CompostCollected;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let (def, producing) = composter_at(state, &self.building_id, now)?;
        let process = producing.ok_or(GameError::rule("Composter is not producing"))?;

        collect(state, &process, now)?;
        set_producing(state, &self.building_id, None)?;

        record_activity(state, format!("{} Collected", def.produces), process.amount)
    }
}

impl ActionHandler for CompostAccelerated {
    const KIND: ActionKind = ActionKind::CompostAccelerated;

    fn requirements(
        &self,
        state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let building = state
            .buildings
            .get(&self.building_id)
            .ok_or_else(|| GameError::not_found("Building", &self.building_id))?;
        let def = composter(building.name).ok_or(GameError::rule("Building is not a composter"))?;
        Ok(RequirementSet::default().with_item(ItemName::Egg, def.accelerator_eggs))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let (def, producing) = composter_at(state, &self.building_id, now)?;
        let mut process = producing.ok_or(GameError::rule("Composter is not producing"))?;
        if production_left(&process, now)? == 0 {
            return Err(GameError::rule("Compost is already complete"));
        }
        if process.boosted_at.is_some() {
            return Err(GameError::rule("Compost is already accelerated"));
        }

        require(&self.requirements(state, now)?, state, now)?;
        debit(&mut state.inventory, ItemName::Egg, def.accelerator_eggs)?;

        process.ready_at = process
            .ready_at
            .saturating_sub(COMPOST_ACCELERATION_MS)
            .max(process.started_at);
        process.boosted_at = Some(now);
        set_producing(state, &self.building_id, Some(process))
    }
}

// ---------------------------------------------------------------------------
// Crafting box
// ---------------------------------------------------------------------------

impl ActionHandler for CraftingStarted {
    const KIND: ActionKind = ActionKind::CraftingStarted;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        craftable(self.item)
            .map(|def| def.cost)
            .ok_or(GameError::rule("Item cannot be crafted"))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let def = craftable(self.item).ok_or(GameError::rule("Item cannot be crafted"))?;
        if state.crafting_box.is_some() {
            return Err(GameError::rule("Crafting box is busy"));
        }

        require(&def.cost, state, now)?;
        def.cost.charge(state)?;

        state.crafting_box = Some(Production {
            item: def.item,
            amount: Decimal::ONE,
            started_at: now,
            ready_at: ready_at(now, def.crafting_ms)?,
            boosted_at: None,
        });
        Ok(())
    }
}

impl ActionHandler for CraftingCollected {
    const KIND: ActionKind = ActionKind::CraftingCollected;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let process = state
            .crafting_box
            .clone()
            .ok_or(GameError::rule("Nothing is being crafted"))?;

        collect(state, &process, now)?;
        state.crafting_box = None;

        record_activity(state, format!("{} Crafted", process.item), process.amount)
    }
}

// ---------------------------------------------------------------------------
// Eating
// ---------------------------------------------------------------------------

impl ActionHandler for BumpkinFed {
    const KIND: ActionKind = ActionKind::BumpkinFed;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.food, self.amount))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        bumpkin(state)?;
        require_whole_amount(self.amount)?;
        require(&self.requirements(state, now)?, state, now)?;

        let experience = scale(recipe(self.food).experience, self.amount)?;
        debit(&mut state.inventory, self.food, self.amount)?;
        gain_experience(state, experience)?;

        record_activity(state, format!("{} Fed", self.food), self.amount)
    }
}
