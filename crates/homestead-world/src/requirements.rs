//! Requirement sets and the gating evaluator.
//!
//! A [`RequirementSet`] bundles what an action needs before it may proceed:
//! a coin and item cost, a minimum bumpkin level, a count of finished
//! buildings, a time window, and activity-counter thresholds. Evaluation is
//! read-only, reports every unmet sub-requirement (not just the first), and
//! is safe to call speculatively; [`RequirementSet::charge`] is the only part
//! that mutates, and handlers call it after evaluation passes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use homestead_ledger::inventory::{balance, debit_all};
use homestead_ledger::{LedgerError, debit_coins};
use homestead_types::{BuildingName, GameState, ItemName, Timestamp};

use crate::progression::bumpkin_level;

/// Inclusive-exclusive availability window `[from, until)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Earliest time, if bounded.
    pub from: Option<Timestamp>,
    /// First time no longer available, if bounded.
    pub until: Option<Timestamp>,
}

/// Costs and prerequisites of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSet {
    /// Coins charged.
    #[serde(default)]
    pub coins: Decimal,
    /// Items charged.
    #[serde(default)]
    pub items: BTreeMap<ItemName, Decimal>,
    /// Minimum bumpkin level.
    #[serde(default)]
    pub bumpkin_level: Option<u32>,
    /// Minimum count of finished buildings per type.
    #[serde(default)]
    pub buildings: BTreeMap<BuildingName, usize>,
    /// Availability window.
    #[serde(default)]
    pub window: Option<TimeWindow>,
    /// Minimum activity-counter values.
    #[serde(default)]
    pub activities: BTreeMap<String, Decimal>,
}

/// One sub-requirement that is not met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Unmet {
    /// Not enough coins.
    Coins {
        /// Coins required.
        required: Decimal,
        /// Coins held.
        available: Decimal,
    },
    /// Not enough of an item.
    Item {
        /// The item.
        item: ItemName,
        /// Quantity required.
        required: Decimal,
        /// Quantity held.
        available: Decimal,
    },
    /// A level is required but the farm has no bumpkin.
    NoBumpkin,
    /// Bumpkin level too low.
    Level {
        /// Level required.
        required: u32,
        /// Current level.
        current: u32,
    },
    /// Not enough finished buildings of a type.
    Building {
        /// The building.
        name: BuildingName,
        /// Count required.
        required: usize,
        /// Count finished.
        built: usize,
    },
    /// Before the availability window opens.
    NotYetAvailable {
        /// When it opens.
        from: Timestamp,
    },
    /// After the availability window closes.
    Expired {
        /// When it closed.
        until: Timestamp,
    },
    /// An activity counter is below its threshold.
    Activity {
        /// Counter name.
        name: String,
        /// Value required.
        required: Decimal,
        /// Current value.
        current: Decimal,
    },
}

impl core::fmt::Display for Unmet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Coins { .. } => f.write_str("Insufficient coins"),
            Self::Item { item, .. } => write!(f, "Insufficient {item}"),
            Self::NoBumpkin => f.write_str("You do not have a Bumpkin"),
            Self::Level { required, .. } => write!(f, "Bumpkin level {required} required"),
            Self::Building { name, .. } => write!(f, "Missing {name}"),
            Self::NotYetAvailable { .. } => f.write_str("Not yet available"),
            Self::Expired { .. } => f.write_str("No longer available"),
            Self::Activity { name, required, .. } => write!(f, "Requires {required} {name}"),
        }
    }
}

/// Result of evaluating a [`RequirementSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Every unmet sub-requirement, in evaluation order.
    pub unmet: Vec<Unmet>,
}

impl Evaluation {
    /// Whether every sub-requirement is met.
    pub fn is_satisfied(&self) -> bool {
        self.unmet.is_empty()
    }

    /// The first unmet sub-requirement, if any.
    pub fn first_unmet(&self) -> Option<&Unmet> {
        self.unmet.first()
    }
}

impl RequirementSet {
    /// A set that only charges coins.
    pub fn coins(coins: Decimal) -> Self {
        Self {
            coins,
            ..Self::default()
        }
    }

    /// A set that only requires an activity counter threshold.
    pub fn activity(name: impl Into<String>, required: Decimal) -> Self {
        Self {
            activities: BTreeMap::from([(name.into(), required)]),
            ..Self::default()
        }
    }

    /// Add an item cost.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<ItemName>, amount: Decimal) -> Self {
        self.items.insert(item.into(), amount);
        self
    }

    /// Require a minimum bumpkin level.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.bumpkin_level = Some(level);
        self
    }

    /// Whether the set has no cost.
    pub fn is_free(&self) -> bool {
        self.coins.is_zero() && self.items.values().all(Decimal::is_zero)
    }

    /// Evaluate against `state` at `now` without mutating anything.
    pub fn evaluate(&self, state: &GameState, now: Timestamp) -> Evaluation {
        let mut unmet = Vec::new();

        if state.coins < self.coins {
            unmet.push(Unmet::Coins {
                required: self.coins,
                available: state.coins,
            });
        }

        for (item, required) in &self.items {
            let available = balance(&state.inventory, *item);
            if available < *required {
                unmet.push(Unmet::Item {
                    item: *item,
                    required: *required,
                    available,
                });
            }
        }

        if let Some(required) = self.bumpkin_level {
            match &state.bumpkin {
                None => unmet.push(Unmet::NoBumpkin),
                Some(bumpkin) => {
                    let current = bumpkin_level(bumpkin.experience);
                    if current < required {
                        unmet.push(Unmet::Level { required, current });
                    }
                }
            }
        }

        for (name, required) in &self.buildings {
            let built = state
                .buildings
                .values()
                .filter(|b| b.name == *name && b.ready_at <= now)
                .count();
            if built < *required {
                unmet.push(Unmet::Building {
                    name: *name,
                    required: *required,
                    built,
                });
            }
        }

        if let Some(window) = self.window {
            if let Some(from) = window.from.filter(|from| now < *from) {
                unmet.push(Unmet::NotYetAvailable { from });
            }
            if let Some(until) = window.until.filter(|until| now >= *until) {
                unmet.push(Unmet::Expired { until });
            }
        }

        for (name, required) in &self.activities {
            let current = state
                .bumpkin
                .as_ref()
                .map_or(Decimal::ZERO, |b| b.activity_count(name));
            if current < *required {
                unmet.push(Unmet::Activity {
                    name: name.clone(),
                    required: *required,
                    current,
                });
            }
        }

        Evaluation { unmet }
    }

    /// Debit the coin and item cost from `state`.
    ///
    /// Call only after [`evaluate`](Self::evaluate) passes; a shortfall still
    /// fails cleanly.
    pub fn charge(&self, state: &mut GameState) -> Result<(), LedgerError> {
        debit_all(&mut state.inventory, &self.items)?;
        debit_coins(&mut state.coins, self.coins)
    }

    /// The same set with every cost multiplied by `amount`.
    pub fn times(&self, amount: Decimal) -> Result<Self, LedgerError> {
        let scale = |q: Decimal| homestead_ledger::scale(q, amount);
        let mut items = BTreeMap::new();
        for (item, q) in &self.items {
            items.insert(*item, scale(*q)?);
        }
        Ok(Self {
            coins: scale(self.coins)?,
            items,
            ..self.clone()
        })
    }
}
