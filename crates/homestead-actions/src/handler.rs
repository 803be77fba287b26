//! The handler contract and the helpers every handler family shares.

use rust_decimal::Decimal;

use homestead_ledger::quantity;
use homestead_types::{ActionKind, Bumpkin, GameState, Timestamp};
use homestead_world::{RequirementSet, bumpkin_level};

use crate::error::{GameError, ValidationError};

/// One action kind's transition.
///
/// Implemented on the payload struct of each kind. `apply` re-validates every
/// precondition it relies on; nothing is assumed to have been checked by the
/// caller. It may leave `state` partly written when it fails, so callers go
/// through [`handle`](Self::handle), which works on a copy and only returns
/// it on success.
pub trait ActionHandler {
    /// Dispatch key.
    const KIND: ActionKind;

    /// The coins and items this action would charge against `state`.
    ///
    /// Read-only; used by the speculative query interface. Actions whose cost
    /// depends on nothing but the catalogue still take the state so a lookup
    /// miss can be reported the same way the transition would report it.
    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default())
    }

    /// Apply the action to `state` in place.
    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError>;

    /// Produce the next state without touching `state`.
    fn handle(&self, state: &GameState, now: Timestamp) -> Result<GameState, GameError> {
        let mut next = state.clone();
        self.apply(&mut next, now)?;
        Ok(next)
    }
}

/// The farm's bumpkin.
pub fn bumpkin(state: &GameState) -> Result<&Bumpkin, GameError> {
    state
        .bumpkin
        .as_ref()
        .ok_or(GameError::Validation(ValidationError::NoBumpkin))
}

/// The farm's bumpkin, mutably.
pub fn bumpkin_mut(state: &mut GameState) -> Result<&mut Bumpkin, GameError> {
    state
        .bumpkin
        .as_mut()
        .ok_or(GameError::Validation(ValidationError::NoBumpkin))
}

/// Reject unless the bumpkin has reached `level`.
pub fn require_level(state: &GameState, level: u32) -> Result<(), GameError> {
    let current = bumpkin_level(bumpkin(state)?.experience);
    if current < level {
        return Err(homestead_world::Unmet::Level {
            required: level,
            current,
        }
        .into());
    }
    Ok(())
}

/// Reject with the first unmet requirement, if any.
pub fn require(set: &RequirementSet, state: &GameState, now: Timestamp) -> Result<(), GameError> {
    match set.evaluate(state, now).unmet.into_iter().next() {
        Some(unmet) => Err(unmet.into()),
        None => Ok(()),
    }
}

/// Reject a quantity that is not a positive whole number.
pub fn require_whole_amount(amount: Decimal) -> Result<(), GameError> {
    if amount <= Decimal::ZERO || !amount.fract().is_zero() {
        return Err(GameError::rule("Invalid amount"));
    }
    Ok(())
}

/// Add `amount` to a named activity counter. A farm without a bumpkin keeps
/// no counters.
pub fn record_activity(
    state: &mut GameState,
    name: impl Into<String>,
    amount: Decimal,
) -> Result<(), GameError> {
    let Some(bumpkin) = state.bumpkin.as_mut() else {
        return Ok(());
    };
    let counter = bumpkin.activity.entry(name.into()).or_insert(Decimal::ZERO);
    *counter = quantity::add(*counter, amount)?;
    Ok(())
}

/// Add experience to the bumpkin.
pub fn gain_experience(state: &mut GameState, amount: Decimal) -> Result<(), GameError> {
    let bumpkin = bumpkin_mut(state)?;
    bumpkin.experience = quantity::add(bumpkin.experience, amount)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_world::starting_farm;

    use super::*;

    #[test]
    fn activity_counters_accumulate() {
        let mut state = starting_farm(0);
        record_activity(&mut state, "Sunflower Harvested", dec!(1)).unwrap();
        record_activity(&mut state, "Sunflower Harvested", dec!(1.5)).unwrap();
        let count = state
            .bumpkin
            .as_ref()
            .map(|b| b.activity_count("Sunflower Harvested"));
        assert_eq!(count, Some(dec!(2.5)));
    }

    #[test]
    fn activity_without_bumpkin_is_ignored() {
        let mut state = GameState::default();
        assert!(record_activity(&mut state, "Anything", dec!(1)).is_ok());
        assert!(matches!(
            gain_experience(&mut state, dec!(1)),
            Err(GameError::Validation(ValidationError::NoBumpkin))
        ));
    }

    #[test]
    fn whole_amounts_only() {
        assert!(require_whole_amount(dec!(3)).is_ok());
        assert!(require_whole_amount(dec!(0)).is_err());
        assert!(require_whole_amount(dec!(-1)).is_err());
        assert!(require_whole_amount(dec!(1.5)).is_err());
    }

    #[test]
    fn level_gate() {
        let state = starting_farm(0);
        assert!(require_level(&state, 1).is_ok());
        assert_eq!(
            require_level(&state, 3).map_err(|e| e.to_string()),
            Err("Bumpkin level 3 required".to_owned())
        );
    }
}
