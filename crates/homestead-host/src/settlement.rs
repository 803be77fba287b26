//! Hand-off of withdrawals to whatever settles them off-farm.
//!
//! An accepted `items.withdrawn` action leaves a [`PendingSettlement`] on
//! the farm. The host forwards each one to a [`SettlementBridge`] and, once
//! the bridge accepts it, submits a `settlement.acknowledged` action through
//! the session. A refused withdrawal stays pending and is offered again
//! after the next commit.

use homestead_core::Session;
use homestead_types::{FarmId, PendingSettlement, Timestamp};

use crate::error::HostError;

/// Destination for confirmed withdrawals.
pub trait SettlementBridge {
    /// Settle one withdrawal. Returning `Ok` means the farm may forget it.
    fn forward(&mut self, farm: FarmId, withdrawal: &PendingSettlement) -> Result<(), HostError>;
}

/// Bridge that only records withdrawals in the log.
///
/// Sequence numbers must arrive in increasing order; a repeat is refused
/// so a withdrawal is never paid out twice.
#[derive(Debug, Default)]
pub struct LoggingBridge {
    forwarded: u64,
    last_sequence: Option<u64>,
}

impl LoggingBridge {
    /// Withdrawals forwarded so far.
    pub const fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

impl SettlementBridge for LoggingBridge {
    fn forward(&mut self, farm: FarmId, withdrawal: &PendingSettlement) -> Result<(), HostError> {
        if self
            .last_sequence
            .is_some_and(|last| withdrawal.sequence <= last)
        {
            return Err(HostError::Settlement {
                sequence: withdrawal.sequence,
                message: "already forwarded".to_owned(),
            });
        }
        let items: Vec<String> = withdrawal
            .items
            .iter()
            .map(|(item, amount)| format!("{item:?}={amount}"))
            .collect();
        tracing::info!(
            %farm,
            sequence = withdrawal.sequence,
            coins = %withdrawal.coins,
            items = ?items,
            requested_at = withdrawal.requested_at,
            "Withdrawal forwarded"
        );
        self.forwarded = self.forwarded.saturating_add(1);
        self.last_sequence = Some(withdrawal.sequence);
        Ok(())
    }
}

/// Forward every pending withdrawal and acknowledge the accepted ones,
/// reading the acknowledgement time from `clock`.
///
/// Returns how many were settled. Bridge failures and refused
/// acknowledgements are logged, not propagated.
pub fn settle(
    session: &mut Session,
    bridge: &mut impl SettlementBridge,
    farm: FarmId,
    clock: impl Fn() -> Timestamp,
) -> u64 {
    let pending = session.pending_settlements().to_vec();
    let mut settled = 0u64;
    for withdrawal in &pending {
        if let Err(err) = bridge.forward(farm, withdrawal) {
            tracing::warn!(%farm, sequence = withdrawal.sequence, %err, "Settlement deferred");
            continue;
        }
        match session.acknowledge_settlement(withdrawal.sequence, clock()) {
            Ok(_) => settled = settled.saturating_add(1),
            Err(err) => tracing::warn!(
                %farm,
                sequence = withdrawal.sequence,
                %err,
                "Acknowledgement refused"
            ),
        }
    }
    settled
}
