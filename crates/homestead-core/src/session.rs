//! Per-farm session: the committed baseline and the transition state machine.
//!
//! ```text
//! Idle -> Validating -> Applying -> Committed
//!              |            |
//!              +------------+-----> Rejected
//! ```
//!
//! `Committed` and `Rejected` are terminal for one action; the next
//! [`Session::submit`] starts again from `Idle`. Only `Committed` replaces
//! the baseline. The host serialises submissions per farm; `&mut self`
//! enforces one transition in flight.

use serde::Serialize;

use homestead_actions::GameError;
use homestead_types::{
    ActionEnvelope, ActionKind, GameState, PendingSettlement, SettlementAcknowledged, Timestamp,
};

use crate::engine::{TransitionEngine, log_outcome};

/// Where a session is in its current transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for an action.
    #[default]
    Idle,
    /// Running the global guards.
    Validating,
    /// Running the handler and the post-transition audit.
    Applying,
    /// The last action was accepted; its output is the baseline.
    Committed,
    /// The last action was refused; the baseline is unchanged.
    Rejected,
}

impl Phase {
    /// Whether the machine may move from `self` to `next`.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Applying | Self::Rejected)
                | (Self::Applying, Self::Committed | Self::Rejected)
                | (Self::Committed | Self::Rejected, Self::Idle)
        )
    }

    /// Whether the phase ends a transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Rejected)
    }
}

/// Counters over the life of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Actions accepted.
    pub committed: u64,
    /// Actions refused.
    pub rejected: u64,
}

/// One farm's committed state and the engine that advances it.
#[derive(Debug, Clone)]
pub struct Session {
    engine: TransitionEngine,
    baseline: GameState,
    phase: Phase,
    stats: SessionStats,
}

impl Session {
    /// Open a session on a loaded or freshly created farm.
    pub fn new(engine: TransitionEngine, baseline: GameState) -> Self {
        Self {
            engine,
            baseline,
            phase: Phase::Idle,
            stats: SessionStats::default(),
        }
    }

    /// The committed baseline.
    pub const fn state(&self) -> &GameState {
        &self.baseline
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Accepted and refused action counts.
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The engine this session applies actions with.
    pub const fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    /// Close the session and hand back the baseline.
    pub fn into_state(self) -> GameState {
        self.baseline
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase change {:?} -> {next:?}",
            self.phase
        );
        tracing::trace!(from = ?self.phase, to = ?next, "Session phase");
        self.phase = next;
    }

    /// Run one action through the machine.
    ///
    /// On success the new baseline is returned. On failure the baseline is
    /// exactly what it was before the call.
    pub fn submit(
        &mut self,
        envelope: &ActionEnvelope,
        now: Timestamp,
    ) -> Result<&GameState, GameError> {
        if self.phase.is_terminal() {
            self.enter(Phase::Idle);
        }
        let kind = envelope.kind();

        self.enter(Phase::Validating);
        let validated = self
            .engine
            .validate(&self.baseline, &envelope.action, envelope.created_at, now);
        if let Err(err) = validated {
            return Err(self.reject(kind, now, err));
        }

        self.enter(Phase::Applying);
        match self.engine.execute(&self.baseline, &envelope.action, now) {
            Ok(next) => {
                self.baseline = next;
                self.stats.committed = self.stats.committed.saturating_add(1);
                self.enter(Phase::Committed);
                log_outcome(kind, now, Ok(()));
                Ok(&self.baseline)
            }
            Err(err) => Err(self.reject(kind, now, err)),
        }
    }

    /// Decode a JSON action and submit it. A decoding failure is a
    /// rejection like any other.
    pub fn submit_json(&mut self, raw: &str, now: Timestamp) -> Result<&GameState, GameError> {
        match ActionEnvelope::from_json(raw) {
            Ok(envelope) => self.submit(&envelope, now),
            Err(err) => {
                if self.phase.is_terminal() {
                    self.enter(Phase::Idle);
                }
                self.enter(Phase::Validating);
                self.enter(Phase::Rejected);
                self.stats.rejected = self.stats.rejected.saturating_add(1);
                let err = GameError::from(err);
                tracing::warn!(now, %err, "Action could not be decoded");
                Err(err)
            }
        }
    }

    fn reject(&mut self, kind: ActionKind, now: Timestamp, err: GameError) -> GameError {
        self.stats.rejected = self.stats.rejected.saturating_add(1);
        self.enter(Phase::Rejected);
        log_outcome(kind, now, Err(&err));
        err
    }

    /// Withdrawals still waiting for the settlement bridge.
    pub fn pending_settlements(&self) -> &[PendingSettlement] {
        &self.baseline.settlement.pending
    }

    /// Drop a withdrawal the settlement bridge has confirmed.
    ///
    /// The acknowledgement is an ordinary [`SettlementAcknowledged`] action,
    /// so it passes the same guard, audit, and commit as any other. Returns
    /// the record that was dropped.
    pub fn acknowledge_settlement(
        &mut self,
        sequence: u64,
        now: Timestamp,
    ) -> Result<PendingSettlement, GameError> {
        let settled = self
            .pending_settlements()
            .iter()
            .find(|p| p.sequence == sequence)
            .cloned();
        let ack = ActionEnvelope::new(SettlementAcknowledged { sequence }.into());
        self.submit(&ack, now)?;
        let settled = settled.ok_or_else(|| GameError::not_found("Settlement", sequence))?;
        tracing::info!(sequence, "Settlement acknowledged");
        Ok(settled)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_actions::ErrorKind;
    use homestead_types::{
        CropSeedName, GameAction, ItemName, ItemsWithdrawn, PlacementId, SeedPlanted,
    };
    use homestead_world::starting_farm;

    use super::*;

    fn plant(plot: &str) -> ActionEnvelope {
        ActionEnvelope::new(GameAction::SeedPlanted(SeedPlanted {
            index: PlacementId::from(plot),
            item: CropSeedName::SunflowerSeed,
        }))
    }

    fn session() -> Session {
        Session::new(TransitionEngine::default(), starting_farm(0))
    }

    #[test]
    fn legal_phase_changes() {
        use Phase::{Applying, Committed, Idle, Rejected, Validating};
        assert!(Idle.can_advance_to(Validating));
        assert!(Validating.can_advance_to(Rejected));
        assert!(Applying.can_advance_to(Committed));
        assert!(Committed.can_advance_to(Idle));
        assert!(!Idle.can_advance_to(Committed));
        assert!(!Validating.can_advance_to(Committed));
        assert!(!Rejected.can_advance_to(Applying));
    }

    #[test]
    fn commit_replaces_baseline() {
        let mut session = session();
        session.submit(&plant("plot-1"), 1_000).unwrap();
        assert_eq!(session.phase(), Phase::Committed);
        assert_eq!(session.state().balance(ItemName::SunflowerSeed), dec!(9));
        assert_eq!(session.stats().committed, 1);
    }

    #[test]
    fn rejection_keeps_baseline() {
        let mut session = session();
        session.submit(&plant("plot-1"), 1_000).unwrap();
        let before = session.state().clone();

        assert!(session.submit(&plant("plot-1"), 2_000).is_err());
        assert_eq!(session.phase(), Phase::Rejected);
        assert_eq!(session.state(), &before);

        assert!(session.submit(&plant("plot-2"), 500).is_err());
        assert_eq!(session.state(), &before);
        assert_eq!(session.stats().rejected, 2);

        session.submit(&plant("plot-2"), 3_000).unwrap();
        assert_eq!(session.phase(), Phase::Committed);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut session = session();
        assert_eq!(
            session.submit_json("{\"type\":\"seed.planted\"}", 0).unwrap_err().kind(),
            ErrorKind::MalformedAction
        );
        assert_eq!(session.phase(), Phase::Rejected);
        assert_eq!(session.state(), &starting_farm(0));
    }

    #[test]
    fn settlement_round_trip() {
        let mut session = session();
        let withdraw = ActionEnvelope::new(GameAction::ItemsWithdrawn(ItemsWithdrawn {
            items: [(ItemName::Wood, dec!(1))].into_iter().collect(),
            coins: dec!(0),
        }));
        session.submit(&withdraw, 10).unwrap();
        assert_eq!(session.pending_settlements().len(), 1);
        assert_eq!(withdraw.kind(), ActionKind::ItemsWithdrawn);

        let settled = session.acknowledge_settlement(0, 20).unwrap();
        assert_eq!(settled.requested_at, 10);
        assert!(session.pending_settlements().is_empty());
        assert_eq!(session.state().bookkeeping.last_processed_at, 20);
        assert_eq!(session.stats().committed, 2);

        let before = session.state().clone();
        assert_eq!(
            session.acknowledge_settlement(0, 30).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(session.state(), &before);
        assert_eq!(session.phase(), Phase::Rejected);
    }
}
