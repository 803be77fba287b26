//! Post-transition audit.
//!
//! Handlers already refuse to overdraw a balance or touch a subsystem they do
//! not own. The audit re-checks the produced state independently of the
//! handler so that a handler bug, or a tampered snapshot, surfaces as an
//! [`Anomaly`] instead of being persisted.
//!
//! Three checks run, in order:
//!
//! 1. **Non-negativity** -- every coin, inventory, experience, and stamina
//!    quantity in the new state is `>= 0`.
//! 2. **Permitted subsystems** -- the [`StateDelta`] touches only the
//!    subsystems the action kind declares.
//! 3. **Gain cap** -- no single item grows by more than the configured cap in
//!    one transition.

use rust_decimal::Decimal;

use homestead_types::{GameState, ItemName};

use crate::LedgerError;
use crate::delta::{StateDelta, Subsystem};

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A quantity ended below zero.
    NegativeBalance {
        /// Which quantity (`"coins"`, an item name, `"experience"`, ...).
        field: String,
        /// The offending value.
        value: Decimal,
    },
    /// A subsystem the action kind may not change was changed.
    UnpermittedChange {
        /// The subsystem.
        subsystem: Subsystem,
    },
    /// An item grew by more than the per-transition cap.
    ExcessiveGain {
        /// The item.
        item: ItemName,
        /// How much it grew.
        gain: Decimal,
        /// The configured cap.
        cap: Decimal,
    },
}

impl core::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NegativeBalance { field, value } => write!(f, "{field} is negative ({value})"),
            Self::UnpermittedChange { subsystem } => {
                write!(f, "unpermitted change to {subsystem:?}")
            }
            Self::ExcessiveGain { item, gain, cap } => {
                write!(f, "{item} grew by {gain}, cap is {cap}")
            }
        }
    }
}

/// Outcome of an audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// No findings.
    Clean,
    /// One or more findings; the transition must be rejected.
    Anomalies(Vec<Anomaly>),
}

impl AuditResult {
    /// Whether the audit passed.
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

fn negative(field: impl Into<String>, value: Decimal) -> Option<Anomaly> {
    (value < Decimal::ZERO).then(|| Anomaly::NegativeBalance {
        field: field.into(),
        value,
    })
}

/// Every negative quantity in `state`.
pub fn negative_balances(state: &GameState) -> Vec<Anomaly> {
    let mut found: Vec<Anomaly> = Vec::new();
    found.extend(negative("coins", state.coins));
    for (item, amount) in &state.inventory {
        found.extend(negative(item.label(), *amount));
    }
    if let Some(bumpkin) = &state.bumpkin {
        found.extend(negative("experience", bumpkin.experience));
        found.extend(negative("stamina", bumpkin.stamina.value));
        for (name, count) in &bumpkin.activity {
            found.extend(negative(format!("activity {name}"), *count));
        }
    }
    for pending in &state.settlement.pending {
        found.extend(negative("settlement coins", pending.coins));
        for (item, amount) in &pending.items {
            found.extend(negative(format!("settlement {item}"), *amount));
        }
    }
    found
}

/// Audit the transition from `before` to `after`.
///
/// `permitted` lists the subsystems the action kind may change; `max_gain`
/// caps the growth of any single inventory item.
pub fn audit_transition(
    before: &GameState,
    after: &GameState,
    permitted: &[Subsystem],
    max_gain: Decimal,
) -> Result<AuditResult, LedgerError> {
    let mut anomalies = negative_balances(after);

    let delta = StateDelta::between(before, after)?;
    anomalies.extend(
        delta
            .unpermitted(permitted)
            .into_iter()
            .map(|subsystem| Anomaly::UnpermittedChange { subsystem }),
    );
    for (item, change) in &delta.items {
        if *change > max_gain {
            anomalies.push(Anomaly::ExcessiveGain {
                item: *item,
                gain: *change,
                cap: max_gain,
            });
        }
    }

    if anomalies.is_empty() {
        Ok(AuditResult::Clean)
    } else {
        tracing::error!(count = anomalies.len(), "state audit found anomalies");
        Ok(AuditResult::Anomalies(anomalies))
    }
}
