//! The state transition engine.
//!
//! One call, one action, one outcome. Each transition runs these stages:
//!
//! 1. **Guard** -- [`guard::check_before`]: ban, time travel, replay, clock
//!    skew, rate window.
//! 2. **Dispatch** -- exactly one handler produces a candidate next state
//!    from a clone of the input.
//! 3. **Audit** -- [`guard::check_after`] re-checks the candidate
//!    independently of the handler.
//! 4. **Commit** -- [`guard::record_commit`] stamps the bookkeeping and the
//!    candidate is returned.
//!
//! Any failure returns the error and nothing else; the caller's state is
//! only ever borrowed, so a rejected transition cannot leak a partial write.
//! The engine performs no I/O and never reads a clock: `now` is always an
//! argument.

use tracing::{debug, error, warn};

use homestead_actions::{ErrorSeverity, GameError, dispatch};
use homestead_types::{ActionEnvelope, ActionKind, GameAction, GameState, Timestamp};

use crate::config::EngineConfig;
use crate::guard;

/// Applies actions to farms under one configuration.
///
/// Holds no per-farm state, so one engine can serve any number of sessions
/// on any number of threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionEngine {
    config: EngineConfig,
}

impl TransitionEngine {
    /// Create an engine with the given configuration.
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply a client envelope, honouring its `createdAt` for the skew check.
    pub fn apply(
        &self,
        state: &GameState,
        envelope: &ActionEnvelope,
        now: Timestamp,
    ) -> Result<GameState, GameError> {
        self.run(state, &envelope.action, envelope.created_at, now)
    }

    /// Apply a bare action.
    pub fn apply_action(
        &self,
        state: &GameState,
        action: &GameAction,
        now: Timestamp,
    ) -> Result<GameState, GameError> {
        self.run(state, action, None, now)
    }

    /// Decode a JSON action and apply it.
    ///
    /// An unknown `type` fails with [`GameError::UnknownActionKind`]; a known
    /// type with bad fields with [`GameError::MalformedAction`].
    pub fn apply_json(
        &self,
        state: &GameState,
        raw: &str,
        now: Timestamp,
    ) -> Result<GameState, GameError> {
        let envelope = ActionEnvelope::from_json(raw).map_err(|err| {
            let err = GameError::from(err);
            warn!(now, %err, "Action could not be decoded");
            err
        })?;
        self.apply(state, &envelope, now)
    }

    fn run(
        &self,
        state: &GameState,
        action: &GameAction,
        created_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<GameState, GameError> {
        let result = self
            .validate(state, action, created_at, now)
            .and_then(|()| self.execute(state, action, now));
        log_outcome(action.kind(), now, result.as_ref().map(|_| ()));
        result
    }

    /// Global guards that run before any handler.
    pub(crate) fn validate(
        &self,
        state: &GameState,
        action: &GameAction,
        created_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<(), GameError> {
        guard::check_before(state, action, created_at, now, &self.config.integrity)
    }

    /// Dispatch, audit, and stamp the bookkeeping of an already validated
    /// action.
    pub(crate) fn execute(
        &self,
        state: &GameState,
        action: &GameAction,
        now: Timestamp,
    ) -> Result<GameState, GameError> {
        let integrity = &self.config.integrity;
        let mut next = dispatch(state, action, now)?;
        guard::check_after(state, &next, action.kind(), integrity)?;
        guard::record_commit(&mut next, action, now, integrity);
        Ok(next)
    }
}

/// Log a transition outcome at the level its severity calls for.
pub(crate) fn log_outcome(kind: ActionKind, now: Timestamp, outcome: Result<(), &GameError>) {
    let Err(err) = outcome else {
        debug!(%kind, now, "Action committed");
        return;
    };
    match err.severity() {
        ErrorSeverity::Recoverable => debug!(%kind, now, %err, "Action rejected"),
        ErrorSeverity::Suspicious => warn!(%kind, now, %err, "Temporal integrity signal"),
        ErrorSeverity::ClientFault => warn!(%kind, now, %err, "Action refused"),
        ErrorSeverity::Fatal => error!(%kind, now, %err, "Integrity violation"),
    }
}

/// Apply `action` to `state` at `now` with the default configuration.
pub fn apply_action(
    state: &GameState,
    action: &GameAction,
    now: Timestamp,
) -> Result<GameState, GameError> {
    TransitionEngine::default().apply_action(state, action, now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_actions::{ErrorKind, ValidationError};
    use homestead_types::{
        CropHarvested, CropSeedName, ItemName, PlacementId, SeedPlanted, SeedsBought,
    };
    use homestead_world::starting_farm;

    use super::*;

    fn plant() -> GameAction {
        SeedPlanted {
            index: PlacementId::from("plot-1"),
            item: CropSeedName::SunflowerSeed,
        }
        .into()
    }

    #[test]
    fn commit_stamps_bookkeeping() {
        let state = starting_farm(0);
        let next = apply_action(&state, &plant(), 5_000).unwrap();
        assert_eq!(next.bookkeeping.last_processed_at, 5_000);
        assert_eq!(next.bookkeeping.recent_actions, vec![5_000]);
        assert_eq!(state.balance(ItemName::SunflowerSeed), dec!(10));
        assert_eq!(next.balance(ItemName::SunflowerSeed), dec!(9));
    }

    #[test]
    fn rejection_leaves_input_untouched() {
        let state = starting_farm(0);
        let harvest: GameAction = CropHarvested {
            index: PlacementId::from("plot-1"),
        }
        .into();
        assert_eq!(
            apply_action(&state, &harvest, 0),
            Err(GameError::Validation(ValidationError::NothingPlanted))
        );
        assert_eq!(state, starting_farm(0));
    }

    #[test]
    fn envelope_skew_is_checked() {
        let engine = TransitionEngine::default();
        let envelope = ActionEnvelope {
            action: plant(),
            created_at: Some(0),
        };
        let err = engine.apply(&starting_farm(0), &envelope, 3_600_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalIntegrity);
    }

    #[test]
    fn json_entry_point_classifies_errors() {
        let engine = TransitionEngine::default();
        let state = starting_farm(0);
        assert_eq!(
            engine
                .apply_json(&state, r#"{"type":"crop.teleported"}"#, 0)
                .unwrap_err()
                .kind(),
            ErrorKind::UnknownActionKind
        );
        assert_eq!(
            engine
                .apply_json(&state, r#"{"type":"seed.planted","index":7}"#, 0)
                .unwrap_err()
                .kind(),
            ErrorKind::MalformedAction
        );
        let planted = engine
            .apply_json(
                &state,
                r#"{"type":"seed.planted","index":"plot-1","item":"Sunflower Seed","createdAt":900}"#,
                1_000,
            )
            .unwrap();
        assert!(
            planted
                .crops
                .get(&PlacementId::from("plot-1"))
                .is_some_and(|plot| plot.crop.is_some())
        );
    }

    #[test]
    fn replayed_purchase_is_charged_once() {
        let buy: GameAction = SeedsBought {
            item: ItemName::SunflowerSeed,
            amount: dec!(1),
        }
        .into();
        let once = apply_action(&starting_farm(0), &buy, 1_000).unwrap();
        assert_eq!(once.coins, dec!(19.99));

        let err = apply_action(&once, &buy, 1_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalIntegrity);
        assert_eq!(err.severity(), ErrorSeverity::Suspicious);

        let twice = apply_action(&once, &buy, 1_001).unwrap();
        assert_eq!(twice.coins, dec!(19.98));
    }

    #[test]
    fn same_inputs_same_output() {
        let state = starting_farm(0);
        let first = apply_action(&state, &plant(), 10).unwrap();
        let second = apply_action(&state, &plant(), 10).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
