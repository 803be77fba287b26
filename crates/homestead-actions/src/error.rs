//! The engine's error taxonomy.
//!
//! Every rejected transition surfaces as a [`GameError`], whatever stage
//! rejected it. The five variants are the five kinds a host needs to tell
//! apart: an ordinary validation failure it shows to the player, a
//! temporal-integrity signal it aggregates for anti-cheat, a client fault
//! (unknown or malformed action), and an integrity violation that points at a
//! handler bug or tampering.

use rust_decimal::Decimal;

use homestead_ledger::{Anomaly, LedgerError};
use homestead_types::{ActionKind, ActionParseError, PlacementId, Timestamp};
use homestead_world::{Collision, TimerError, Unmet, WorldError};

/// A precondition a handler found unmet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The target entity does not exist.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Kind of entity (`"Plot"`, `"Mushroom"`, ...).
        what: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A timer has not elapsed yet.
    #[error("Not ready")]
    NotReady,

    /// A fruit patch was harvested before it replenished.
    #[error("Fruit is still replenishing")]
    StillReplenishing,

    /// The plot, patch, or bed is empty.
    #[error("Nothing was planted")]
    NothingPlanted,

    /// A fruit tree has no harvests left.
    #[error("No harvest left")]
    NoHarvestLeft,

    /// The farm has no bumpkin.
    #[error("You do not have a Bumpkin")]
    NoBumpkin,

    /// A footprint overlaps water or another placement.
    #[error("collision")]
    Collision(Collision),

    /// A requirement set is not satisfied.
    #[error("{0}")]
    Unmet(Unmet),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(LedgerError),

    /// A game rule refused the action.
    #[error("{0}")]
    Rule(&'static str),

    /// The farm is banned.
    #[error("Farm is banned")]
    Banned,

    /// Arithmetic overflowed while computing the result.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

/// A temporal-integrity signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    /// `now` is earlier than an entity's recorded event.
    #[error("Actions cannot go back in time")]
    ClockMovedBackward {
        /// The entity's recorded event time.
        event_at: Timestamp,
        /// The supplied time.
        now: Timestamp,
    },

    /// `now` is earlier than the farm's last processed action.
    #[error("Actions cannot go back in time: last processed {last_processed_at}, now {now}")]
    TimeTravel {
        /// Timestamp of the last committed action.
        last_processed_at: Timestamp,
        /// The supplied time.
        now: Timestamp,
    },

    /// The same action was already committed at this `now`.
    #[error("Action {kind} was already processed at {now}")]
    Replayed {
        /// Kind of the repeated action.
        kind: ActionKind,
        /// The supplied time.
        now: Timestamp,
    },

    /// The action's own timestamp is too far from the engine's `now`.
    #[error("Clock skew of {skew_ms}ms exceeds {max_skew_ms}ms")]
    ClockSkew {
        /// Observed skew.
        skew_ms: u64,
        /// Allowed skew.
        max_skew_ms: u64,
    },

    /// Too many actions inside the rate window.
    #[error("Too many actions: {count} within {window_ms}ms")]
    RateLimited {
        /// Actions already inside the window.
        count: usize,
        /// Window length.
        window_ms: u64,
    },
}

/// One finding of the post-transition integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A ledger audit finding.
    Ledger(Anomaly),
    /// Two placements overlap.
    Overlap {
        /// First placement.
        first: PlacementId,
        /// Second placement.
        second: PlacementId,
    },
    /// A process finishes before it starts.
    ProcessOrder {
        /// Which process.
        process: String,
        /// Start time.
        started_at: Timestamp,
        /// Ready time.
        ready_at: Timestamp,
    },
    /// An entity timestamp moved backward.
    TimestampRegressed {
        /// Which entity field.
        field: String,
        /// Value before the transition.
        before: Timestamp,
        /// Value after the transition.
        after: Timestamp,
    },
    /// A quantity grew past a hard limit.
    Excessive {
        /// What grew.
        field: String,
        /// New value.
        value: Decimal,
    },
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ledger(anomaly) => write!(f, "{anomaly}"),
            Self::Overlap { first, second } => write!(f, "{first} overlaps {second}"),
            Self::ProcessOrder {
                process,
                started_at,
                ready_at,
            } => write!(f, "{process} ready at {ready_at} before start {started_at}"),
            Self::TimestampRegressed {
                field,
                before,
                after,
            } => write!(f, "{field} moved back from {before} to {after}"),
            Self::Excessive { field, value } => write!(f, "{field} reached {value}"),
        }
    }
}

/// Everything the integrity check found wrong with one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    /// The action that produced the state.
    pub action: ActionKind,
    /// Findings, in check order.
    pub violations: Vec<Violation>,
}

impl core::fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:", self.action)?;
        for violation in &self.violations {
            write!(f, " {violation};")?;
        }
        Ok(())
    }
}

/// Why a transition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A precondition is unmet.
    #[error(transparent)]
    Validation(ValidationError),

    /// A clock or rate anomaly.
    #[error(transparent)]
    TemporalIntegrity(TemporalError),

    /// The action's tag is not in the catalogue.
    #[error("Unknown action kind: {0}")]
    UnknownActionKind(String),

    /// The action's fields do not match its tag.
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    /// The produced state failed the integrity check.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(Box<IntegrityReport>),
}

/// The kind of a [`GameError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// [`GameError::Validation`].
    Validation,
    /// [`GameError::TemporalIntegrity`].
    TemporalIntegrity,
    /// [`GameError::UnknownActionKind`].
    UnknownActionKind,
    /// [`GameError::MalformedAction`].
    MalformedAction,
    /// [`GameError::IntegrityViolation`].
    IntegrityViolation,
}

/// How seriously a host should take a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Show to the player; nothing else.
    Recoverable,
    /// Recoverable, but worth aggregating as an anti-cheat signal.
    Suspicious,
    /// The client sent something the engine cannot read.
    ClientFault,
    /// A handler bug or tampering; escalate.
    Fatal,
}

impl GameError {
    /// Shorthand for a rule rejection.
    pub const fn rule(reason: &'static str) -> Self {
        Self::Validation(ValidationError::Rule(reason))
    }

    /// Shorthand for a missing entity.
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::Validation(ValidationError::NotFound {
            what,
            id: id.to_string(),
        })
    }

    /// The error's kind.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::TemporalIntegrity(_) => ErrorKind::TemporalIntegrity,
            Self::UnknownActionKind(_) => ErrorKind::UnknownActionKind,
            Self::MalformedAction(_) => ErrorKind::MalformedAction,
            Self::IntegrityViolation(_) => ErrorKind::IntegrityViolation,
        }
    }

    /// The error's severity.
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(_) => ErrorSeverity::Recoverable,
            Self::TemporalIntegrity(_) => ErrorSeverity::Suspicious,
            Self::UnknownActionKind(_) | Self::MalformedAction(_) => ErrorSeverity::ClientFault,
            Self::IntegrityViolation(_) => ErrorSeverity::Fatal,
        }
    }
}

impl From<ValidationError> for GameError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<TemporalError> for GameError {
    fn from(err: TemporalError) -> Self {
        Self::TemporalIntegrity(err)
    }
}

impl From<LedgerError> for GameError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ArithmeticOverflow { context } => {
                Self::Validation(ValidationError::Overflow(context))
            }
            other => Self::Validation(ValidationError::Ledger(other)),
        }
    }
}

impl From<TimerError> for GameError {
    fn from(err: TimerError) -> Self {
        match err {
            TimerError::ClockMovedBackward { event_at, now } => {
                Self::TemporalIntegrity(TemporalError::ClockMovedBackward { event_at, now })
            }
            TimerError::ArithmeticOverflow { context } => {
                Self::Validation(ValidationError::Overflow(context.to_owned()))
            }
        }
    }
}

impl From<WorldError> for GameError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::Timer(timer) => timer.into(),
            WorldError::Ledger(ledger) => ledger.into(),
            other @ (WorldError::InvalidBoostedValue { .. }
            | WorldError::ArithmeticOverflow { .. }) => {
                Self::Validation(ValidationError::Overflow(other.to_string()))
            }
        }
    }
}

impl From<Unmet> for GameError {
    fn from(unmet: Unmet) -> Self {
        Self::Validation(ValidationError::Unmet(unmet))
    }
}

impl From<ActionParseError> for GameError {
    fn from(err: ActionParseError) -> Self {
        match err {
            ActionParseError::UnknownKind(kind) => Self::UnknownActionKind(kind),
            ActionParseError::Malformed(reason) => Self::MalformedAction(reason),
        }
    }
}
