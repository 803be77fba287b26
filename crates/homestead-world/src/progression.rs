//! Bumpkin levels, skill points, and stamina.
//!
//! The level is never stored: it is derived from total experience against a
//! fixed threshold table. Maximum stamina grows with level, and stamina
//! regeneration slows geometrically as the bumpkin levels up, decaying toward
//! a floor of one twenty-fourth of the pool per hour.

use rust_decimal::Decimal;

use homestead_types::{Bumpkin, HOUR_MS, SECOND_MS, Timestamp};

use crate::error::{TimerError, WorldError};
use crate::timers::{Rate, regenerated};

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Experience needed to reach each level; index 0 is level 1.
const LEVEL_THRESHOLDS: [i64; 20] = [
    0, 5, 15, 30, 50, 80, 120, 200, 300, 400, 500, 650, 800, 1000, 1250, 1500, 1800, 2100, 2400,
    2800,
];

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 20;

/// Level for a given amount of experience.
pub fn bumpkin_level(experience: Decimal) -> u32 {
    let reached = LEVEL_THRESHOLDS
        .iter()
        .take_while(|threshold| experience >= Decimal::from(**threshold))
        .count();
    u32::try_from(reached).unwrap_or(MAX_LEVEL).max(1)
}

/// Experience still needed for the next level, `None` at max level.
pub fn experience_to_next_level(experience: Decimal) -> Option<Decimal> {
    let level = bumpkin_level(experience);
    let index = usize::try_from(level).ok()?;
    let next = LEVEL_THRESHOLDS.get(index)?;
    Decimal::from(*next).checked_sub(experience)
}

/// Whether no further level can be reached.
pub fn is_max_level(experience: Decimal) -> bool {
    bumpkin_level(experience) >= MAX_LEVEL
}

/// Skill points not yet spent: one per level above 1.
pub fn available_skill_points(bumpkin: &Bumpkin) -> u32 {
    let earned = bumpkin_level(bumpkin.experience).saturating_sub(1);
    let spent = u32::try_from(bumpkin.skills.len()).unwrap_or(u32::MAX);
    earned.saturating_sub(spent)
}

// ---------------------------------------------------------------------------
// Stamina
// ---------------------------------------------------------------------------

/// Stamina cap at a level: `100 + 10 * (level - 1)`.
pub fn max_stamina(level: u32) -> Decimal {
    let bonus = level.saturating_sub(1).saturating_mul(10);
    Decimal::from(100_u32.saturating_add(bonus))
}

/// Share of the pool regenerated per hour, scaled by 24:
/// `1 + 23 * 0.9^(level - 1)`, i.e. `24 * (1/24 + 23/24 * 0.9^(level - 1))`.
fn regen_share_x24(level: u32) -> Result<Decimal, WorldError> {
    let overflow = WorldError::ArithmeticOverflow {
        context: "stamina regeneration rate",
    };
    let decay = Decimal::new(9, 1);
    let mut factor = Decimal::ONE;
    for _ in 1..level {
        factor = factor.checked_mul(decay).ok_or(overflow.clone())?;
    }
    Decimal::from(23)
        .checked_mul(factor)
        .and_then(|v| v.checked_add(Decimal::ONE))
        .ok_or(overflow)
}

/// Stamina regenerated per day-long period at `level`, as a [`Rate`].
pub fn stamina_rate(level: u32) -> Result<Rate, WorldError> {
    let amount = max_stamina(level)
        .checked_mul(regen_share_x24(level)?)
        .ok_or(WorldError::ArithmeticOverflow {
            context: "stamina regeneration rate",
        })?;
    Ok(Rate {
        amount,
        period_ms: HOUR_MS.saturating_mul(24),
    })
}

/// Truncate a timestamp to whole seconds.
const fn whole_seconds(at: Timestamp) -> Timestamp {
    (at / SECOND_MS).saturating_mul(SECOND_MS)
}

/// Stamina value at `now`, regenerated over whole elapsed seconds and capped
/// at the level's maximum.
pub fn replenished_stamina(bumpkin: &Bumpkin, now: Timestamp) -> Result<Decimal, WorldError> {
    let level = bumpkin_level(bumpkin.experience);
    let last_at = whole_seconds(bumpkin.stamina.replenished_at);
    let current = whole_seconds(now);
    if current < last_at {
        return Err(TimerError::ClockMovedBackward {
            event_at: bumpkin.stamina.replenished_at,
            now,
        }
        .into());
    }
    Ok(regenerated(
        bumpkin.stamina.value,
        last_at,
        current,
        stamina_rate(level)?,
        max_stamina(level),
    )?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use rust_decimal_macros::dec;

    use homestead_types::{SkillName, Stamina};

    use super::*;

    fn bumpkin(experience: Decimal, value: Decimal, replenished_at: Timestamp) -> Bumpkin {
        Bumpkin {
            experience,
            skills: BTreeSet::new(),
            stamina: Stamina {
                value,
                replenished_at,
            },
            equipped: BTreeMap::new(),
            activity: BTreeMap::new(),
            achievements: BTreeSet::new(),
        }
    }

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(bumpkin_level(dec!(0)), 1);
        assert_eq!(bumpkin_level(dec!(4.99)), 1);
        assert_eq!(bumpkin_level(dec!(5)), 2);
        assert_eq!(bumpkin_level(dec!(2799)), 19);
        assert_eq!(bumpkin_level(dec!(2800)), 20);
        assert_eq!(bumpkin_level(dec!(1000000)), 20);
    }

    #[test]
    fn experience_to_next() {
        assert_eq!(experience_to_next_level(dec!(3)), Some(dec!(2)));
        assert_eq!(experience_to_next_level(dec!(2800)), None);
        assert!(is_max_level(dec!(2800)));
        assert!(!is_max_level(dec!(2799)));
    }

    #[test]
    fn skill_points_track_level() {
        let mut b = bumpkin(dec!(15), dec!(0), 0);
        assert_eq!(available_skill_points(&b), 2);
        b.skills.insert(SkillName::GreenThumb);
        assert_eq!(available_skill_points(&b), 1);
    }

    #[test]
    fn max_stamina_grows_with_level() {
        assert_eq!(max_stamina(1), dec!(100));
        assert_eq!(max_stamina(5), dec!(140));
    }

    #[test]
    fn level_one_regenerates_full_pool_per_hour() {
        let b = bumpkin(dec!(0), dec!(10), 0);
        assert_eq!(replenished_stamina(&b, HOUR_MS / 2), Ok(dec!(60)));
        assert_eq!(replenished_stamina(&b, HOUR_MS), Ok(dec!(100)));
    }

    #[test]
    fn half_pool_after_an_hour_caps_at_max() {
        let b = bumpkin(dec!(0), dec!(50), 0);
        assert_eq!(replenished_stamina(&b, HOUR_MS), Ok(dec!(100)));
    }

    #[test]
    fn higher_levels_regenerate_slower() {
        let low = bumpkin(dec!(0), dec!(0), 0);
        let high = bumpkin(dec!(80), dec!(0), 0);
        let low_gain = replenished_stamina(&low, 60 * SECOND_MS).unwrap();
        let high_gain = replenished_stamina(&high, 60 * SECOND_MS).unwrap();
        assert!(high_gain / max_stamina(6) < low_gain / max_stamina(1));
    }

    #[test]
    fn partial_seconds_are_ignored() {
        let b = bumpkin(dec!(0), dec!(0), 1_200);
        assert_eq!(replenished_stamina(&b, 1_900), Ok(dec!(0)));
    }

    #[test]
    fn backward_clock_is_rejected() {
        let b = bumpkin(dec!(0), dec!(0), 10_000);
        assert!(matches!(
            replenished_stamina(&b, 5_000),
            Err(WorldError::Timer(TimerError::ClockMovedBackward { .. }))
        ));
    }
}
