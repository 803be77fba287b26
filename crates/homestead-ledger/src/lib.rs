//! Numeric resource model and state bookkeeping for the Homestead engine.
//!
//! Every quantity in a farm (inventory counts, coins, experience, stamina) is a
//! [`Decimal`]. Floating point never touches a balance: fractional boosts such
//! as "+0.25 per harvest" accumulate over thousands of harvests and must come
//! out identical on every replay.
//!
//! # Architecture
//!
//! - [`quantity`] -- Checked `add` / `subtract` / `scale` over non-negative decimals.
//! - [`inventory`] -- Inventory and coin `balance` / `has` / `credit` / `debit`.
//! - [`delta`] -- [`StateDelta`]: which subsystems and balances a transition changed.
//! - [`audit`] -- Post-transition audit: non-negativity, permitted subsystems, gain caps.
//! - [`format`] -- Compact display of quantities for the presentation layer.
//!
//! # Invariant
//!
//! No quantity ever goes below zero. Operations that would produce a negative
//! result return [`LedgerError`] instead, and the audit re-checks the whole
//! state after every transition as a second line of defence.
//!
//! The ledger never panics; it returns errors.

pub mod audit;
pub mod delta;
pub mod format;
pub mod inventory;
pub mod quantity;

pub use audit::{Anomaly, AuditResult, audit_transition};
pub use delta::{StateDelta, Subsystem};
pub use format::shorten_count;
pub use inventory::{balance, credit, credit_coins, debit, debit_coins, has};
pub use quantity::{add, scale, subtract};

use rust_decimal::Decimal;

use homestead_types::ItemName;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by quantity arithmetic and inventory bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A subtraction would leave a negative quantity.
    #[error("insufficient resource: available {available}, required {required}")]
    InsufficientResource {
        /// Quantity on hand.
        available: Decimal,
        /// Quantity requested.
        required: Decimal,
    },

    /// An inventory debit exceeds the item's balance.
    #[error("Insufficient {item}")]
    InsufficientItem {
        /// The item being debited.
        item: ItemName,
        /// Quantity on hand.
        available: Decimal,
        /// Quantity requested.
        required: Decimal,
    },

    /// A coin debit exceeds the coin balance.
    #[error("Insufficient coins")]
    InsufficientCoins {
        /// Coins on hand.
        available: Decimal,
        /// Coins requested.
        required: Decimal,
    },

    /// A quantity operand was negative where only non-negative values are valid.
    #[error("quantity must not be negative, got {quantity}")]
    NegativeQuantity {
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },
}

impl LedgerError {
    /// Shorthand for an overflow error.
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }
}
