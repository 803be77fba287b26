//! Error types for the `homestead-world` crate.
//!
//! Timer calculus has its own [`TimerError`] because a clock moving backward
//! is a temporal-integrity signal, not an ordinary failure; everything else
//! returns [`WorldError`].

use rust_decimal::Decimal;

use homestead_ledger::LedgerError;
use homestead_types::Timestamp;

/// Errors raised by the timer calculus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// `now` is earlier than the recorded event.
    #[error("Actions cannot go back in time")]
    ClockMovedBackward {
        /// The recorded event time.
        event_at: Timestamp,
        /// The supplied current time.
        now: Timestamp,
    },

    /// Timestamp arithmetic overflowed.
    #[error("arithmetic overflow in timer calculation: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },
}

/// Errors raised by world rules: progression, boosts, land, requirements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A timer calculation failed.
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// A quantity operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A boost factor or duration could not be represented.
    #[error("invalid boosted value: {value}")]
    InvalidBoostedValue {
        /// The value that could not be converted.
        value: Decimal,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },
}
