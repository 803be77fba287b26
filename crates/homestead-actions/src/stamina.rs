//! Stamina replenishment.

use homestead_types::{ActionKind, GameState, StaminaReplenished, Timestamp};
use homestead_world::replenished_stamina;

use crate::error::GameError;
use crate::handler::{ActionHandler, bumpkin_mut};

impl ActionHandler for StaminaReplenished {
    const KIND: ActionKind = ActionKind::StaminaReplenished;

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let bumpkin = bumpkin_mut(state)?;
        let value = replenished_stamina(bumpkin, now)?;
        bumpkin.stamina.value = value;
        bumpkin.stamina.replenished_at = now;
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::HOUR_MS;
    use homestead_world::starting_farm;

    use crate::error::ErrorKind;

    use super::*;

    #[test]
    fn half_pool_refills_within_an_hour() {
        let mut state = starting_farm(0);
        if let Some(b) = state.bumpkin.as_mut() {
            b.stamina.value = dec!(50);
        }
        let next = StaminaReplenished {}.handle(&state, HOUR_MS).unwrap();
        let stamina = next.bumpkin.as_ref().map(|b| b.stamina.clone()).unwrap();
        assert_eq!(stamina.value, dec!(100));
        assert_eq!(stamina.replenished_at, HOUR_MS);
    }

    #[test]
    fn backward_clock_is_temporal() {
        let state = starting_farm(10_000);
        let err = StaminaReplenished {}.handle(&state, 5_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalIntegrity);
    }

    #[test]
    fn no_bumpkin_is_rejected() {
        assert!(StaminaReplenished {}.handle(&GameState::default(), 0).is_err());
    }
}
