//! The boost pipeline.
//!
//! Collectibles on the island, wearables on the bumpkin, learned skills, and
//! fertilisers on a plot all adjust a base quantity (a harvest yield) or a
//! base duration (a growth time). Rather than scattering those conditions
//! through every handler, each source declares its [`Effect`] on a
//! [`Target`] in one table ([`effect`]), and the pipeline applies every
//! active effect in a fixed order:
//!
//! | Stage | Applies |
//! |-------|---------|
//! | 1. Base | catalogue value |
//! | 2. Collectible | flat bonuses from placed collectibles |
//! | 3. Wearable | flat bonuses from equipped wearables |
//! | 4. Skill | flat bonuses from learned skills |
//! | 5. Fertiliser | flat bonuses from the plot's fertiliser |
//! | 6. Multiplier | every multiplicative effect, in source order |
//!
//! Durations only take multiplicative effects. The order is fixed, so a
//! given state and boost set always produce the same result.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use homestead_types::{
    CollectibleName, CompostName, CropName, FlowerName, FruitName, GameState, MineralName,
    SkillName, WearableName,
};

use crate::error::WorldError;

/// Pipeline stage a boost source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Placed collectibles.
    Collectible,
    /// Equipped wearables.
    Wearable,
    /// Learned skills.
    Skill,
    /// Fertiliser on the target plot or patch.
    Fertiliser,
}

/// Where a boost comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoostSource {
    /// A collectible placed on the island.
    Collectible(CollectibleName),
    /// A wearable the bumpkin has equipped.
    Wearable(WearableName),
    /// A skill the bumpkin has learned.
    Skill(SkillName),
    /// A fertiliser on the target.
    Fertiliser(CompostName),
}

impl BoostSource {
    /// The source's pipeline stage.
    pub const fn stage(self) -> Stage {
        match self {
            Self::Collectible(_) => Stage::Collectible,
            Self::Wearable(_) => Stage::Wearable,
            Self::Skill(_) => Stage::Skill,
            Self::Fertiliser(_) => Stage::Fertiliser,
        }
    }
}

/// How a boost adjusts its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Add a flat amount.
    Add(Decimal),
    /// Multiply by a factor.
    Multiply(Decimal),
}

/// What a boost applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Harvest yield of a crop.
    CropYield(CropName),
    /// Growth time of a crop.
    CropTime(CropName),
    /// Harvest yield of a fruit.
    FruitYield(FruitName),
    /// Replenish time of a fruit.
    FruitTime(FruitName),
    /// Growth time of a flower.
    FlowerTime(FlowerName),
    /// Mining yield of a mineral.
    MineralYield(MineralName),
    /// Recovery time of a mineral.
    MineralTime(MineralName),
    /// Eggs per collection.
    EggYield,
    /// Wheat eaten per feeding.
    ChickenFeed,
    /// Cooking time.
    CookingTime,
}

/// An active boost: its source and effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boost {
    /// Where the boost comes from.
    pub source: BoostSource,
    /// What it does.
    pub effect: Effect,
}

/// The effect `source` has on `target`, if any.
#[allow(clippy::match_same_arms)]
pub fn effect(source: BoostSource, target: Target) -> Option<Effect> {
    use BoostSource as S;
    use Target as T;

    let add = |mantissa: i64, scale: u32| Some(Effect::Add(Decimal::new(mantissa, scale)));
    let mul = |mantissa: i64, scale: u32| Some(Effect::Multiply(Decimal::new(mantissa, scale)));

    match (source, target) {
        // --- Collectibles ---
        (S::Collectible(CollectibleName::LadyBug), T::FruitYield(FruitName::Apple)) => add(25, 2),
        (S::Collectible(CollectibleName::BlackBearry), T::FruitYield(FruitName::Blueberry)) => {
            add(1, 0)
        }
        (S::Collectible(CollectibleName::SquirrelMonkey), T::FruitTime(FruitName::Orange)) => {
            mul(5, 1)
        }
        (S::Collectible(CollectibleName::Nana), T::FruitTime(FruitName::Banana)) => mul(9, 1),
        (S::Collectible(CollectibleName::Nancy), T::CropTime(_)) => mul(85, 2),
        (S::Collectible(CollectibleName::Scarecrow), T::CropYield(_)) => mul(12, 1),
        (S::Collectible(CollectibleName::RockyTheMole), T::MineralYield(MineralName::Iron)) => {
            add(25, 2)
        }
        (S::Collectible(CollectibleName::Nugget), T::MineralYield(MineralName::Gold)) => {
            add(25, 2)
        }
        (S::Collectible(CollectibleName::FatChicken), T::ChickenFeed) => mul(9, 1),

        // --- Wearables ---
        (
            S::Wearable(WearableName::FruitPickerApron),
            T::FruitYield(
                FruitName::Apple | FruitName::Orange | FruitName::Blueberry | FruitName::Banana,
            ),
        ) => add(1, 1),
        (S::Wearable(WearableName::BananaAmulet), T::FruitYield(FruitName::Banana)) => add(5, 1),
        (S::Wearable(WearableName::BananaOnesie), T::FruitTime(FruitName::Banana)) => mul(8, 1),
        (S::Wearable(WearableName::SunflowerAmulet), T::CropYield(CropName::Sunflower)) => {
            mul(11, 1)
        }
        (S::Wearable(WearableName::MinerHat), T::MineralTime(MineralName::Stone)) => mul(9, 1),

        // --- Skills ---
        (S::Skill(SkillName::GreenThumb), T::CropTime(_)) => mul(95, 2),
        (S::Skill(SkillName::Orchardist), T::FruitTime(_)) => mul(9, 1),
        (S::Skill(SkillName::Prospector), T::MineralYield(MineralName::Stone)) => add(2, 1),
        (S::Skill(SkillName::Chef), T::CookingTime) => mul(9, 1),
        (S::Skill(SkillName::EggCellent), T::EggYield) => add(1, 1),

        // --- Fertilisers ---
        (S::Fertiliser(CompostName::SproutMix), T::CropYield(_)) => add(2, 1),
        (S::Fertiliser(CompostName::FruitfulBlend), T::FruitYield(_)) => add(1, 1),

        _ => None,
    }
}

/// Every boost active on `state` for `target`, in pipeline order.
///
/// `fertiliser` is the fertiliser on the specific plot or patch being
/// harvested, if any.
pub fn active_boosts(
    state: &GameState,
    target: Target,
    fertiliser: Option<CompostName>,
) -> Vec<Boost> {
    let mut sources: Vec<BoostSource> = CollectibleName::ALL
        .iter()
        .filter(|name| state.is_collectible_placed(**name))
        .map(|name| BoostSource::Collectible(*name))
        .collect();
    if let Some(bumpkin) = &state.bumpkin {
        sources.extend(bumpkin.equipped.values().map(|w| BoostSource::Wearable(*w)));
        sources.extend(bumpkin.skills.iter().map(|s| BoostSource::Skill(*s)));
    }
    sources.extend(fertiliser.map(BoostSource::Fertiliser));
    sources.sort();
    sources.dedup();

    sources
        .into_iter()
        .filter_map(|source| effect(source, target).map(|effect| Boost { source, effect }))
        .collect()
}

/// Apply the pipeline to a base quantity.
pub fn boosted_amount(base: Decimal, boosts: &[Boost]) -> Result<Decimal, WorldError> {
    let overflow = WorldError::ArithmeticOverflow {
        context: "boosted amount",
    };
    let mut flat = base;
    for boost in boosts {
        if let Effect::Add(amount) = boost.effect {
            flat = flat.checked_add(amount).ok_or(overflow.clone())?;
        }
    }
    let mut total = flat;
    for boost in boosts {
        if let Effect::Multiply(factor) = boost.effect {
            total = total.checked_mul(factor).ok_or(overflow.clone())?;
        }
    }
    Ok(total)
}

/// Apply the multiplicative part of the pipeline to a base duration,
/// truncated to whole milliseconds.
pub fn boosted_duration(base_ms: u64, boosts: &[Boost]) -> Result<u64, WorldError> {
    let mut total = Decimal::from(base_ms);
    for boost in boosts {
        if let Effect::Multiply(factor) = boost.effect {
            total = total
                .checked_mul(factor)
                .ok_or(WorldError::ArithmeticOverflow {
                    context: "boosted duration",
                })?;
        }
    }
    total
        .trunc()
        .to_u64()
        .ok_or(WorldError::InvalidBoostedValue { value: total })
}

/// Convenience: active boosts for `target` applied to `base`.
pub fn yield_for(
    state: &GameState,
    target: Target,
    fertiliser: Option<CompostName>,
    base: Decimal,
) -> Result<Decimal, WorldError> {
    boosted_amount(base, &active_boosts(state, target, fertiliser))
}

/// Convenience: active boosts for `target` applied to `base_ms`.
pub fn duration_for(state: &GameState, target: Target, base_ms: u64) -> Result<u64, WorldError> {
    boosted_duration(base_ms, &active_boosts(state, target, None))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use rust_decimal_macros::dec;

    use homestead_types::{
        Bumpkin, Collectible, Coordinates, Dimensions, Footprint, PlacementId, Stamina,
        WearableSlot,
    };

    use super::*;

    fn with_bumpkin() -> GameState {
        GameState {
            bumpkin: Some(Bumpkin {
                experience: Decimal::ZERO,
                skills: BTreeSet::new(),
                stamina: Stamina {
                    value: dec!(100),
                    replenished_at: 0,
                },
                equipped: BTreeMap::new(),
                activity: BTreeMap::new(),
                achievements: BTreeSet::new(),
            }),
            ..GameState::default()
        }
    }

    fn place(state: &mut GameState, id: &str, name: CollectibleName) {
        state.collectibles.insert(
            PlacementId::from(id),
            Collectible {
                name,
                footprint: Footprint::at(Coordinates::new(0, 0), Dimensions::new(1, 1)),
                created_at: 0,
            },
        );
    }

    #[test]
    fn no_boosts_returns_base() {
        let state = with_bumpkin();
        let target = Target::FruitYield(FruitName::Apple);
        assert_eq!(yield_for(&state, target, None, dec!(1)), Ok(dec!(1)));
    }

    #[test]
    fn flat_bonuses_stack_across_stages() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::LadyBug);
        if let Some(b) = state.bumpkin.as_mut() {
            b.equipped
                .insert(WearableSlot::Coat, WearableName::FruitPickerApron);
        }
        let target = Target::FruitYield(FruitName::Apple);
        let amount = yield_for(&state, target, Some(CompostName::FruitfulBlend), dec!(1));
        assert_eq!(amount, Ok(dec!(1.45)));
    }

    #[test]
    fn boosts_are_in_stage_order() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::Scarecrow);
        let boosts = active_boosts(
            &state,
            Target::CropYield(CropName::Kale),
            Some(CompostName::SproutMix),
        );
        let stages: Vec<Stage> = boosts.iter().map(|b| b.source.stage()).collect();
        assert_eq!(stages, vec![Stage::Collectible, Stage::Fertiliser]);
    }

    #[test]
    fn multipliers_apply_after_flats() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::Scarecrow);
        let amount = yield_for(
            &state,
            Target::CropYield(CropName::Kale),
            Some(CompostName::SproutMix),
            dec!(1),
        );
        // (1 + 0.2) * 1.2
        assert_eq!(amount, Ok(dec!(1.44)));
    }

    #[test]
    fn duplicate_collectibles_count_once() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::BlackBearry);
        place(&mut state, "2", CollectibleName::BlackBearry);
        let amount = yield_for(&state, Target::FruitYield(FruitName::Blueberry), None, dec!(1));
        assert_eq!(amount, Ok(dec!(2)));
    }

    #[test]
    fn time_boosts_multiply() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::Nana);
        if let Some(b) = state.bumpkin.as_mut() {
            b.equipped
                .insert(WearableSlot::Onesie, WearableName::BananaOnesie);
        }
        let ms = duration_for(&state, Target::FruitTime(FruitName::Banana), 1_000_000);
        assert_eq!(ms, Ok(720_000));
    }

    #[test]
    fn squirrel_monkey_halves_orange_time_only() {
        let mut state = with_bumpkin();
        place(&mut state, "1", CollectibleName::SquirrelMonkey);
        assert_eq!(
            duration_for(&state, Target::FruitTime(FruitName::Orange), 1_000),
            Ok(500)
        );
        assert_eq!(
            duration_for(&state, Target::FruitTime(FruitName::Apple), 1_000),
            Ok(1_000)
        );
    }
}
