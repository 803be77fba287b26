//! Timer and recovery calculus.
//!
//! Nothing in the engine ticks. Growth, recovery, and regeneration are derived
//! on demand from a stored event timestamp, a duration, and the caller's `now`:
//!
//! ```text
//! time_left   = max(0, event_at + duration - now)
//! is_ready    = time_left == 0
//! regenerated = min(last_value + rate * (now - last_at), cap)
//! ```
//!
//! A `now` earlier than the stored event is never clamped to zero: it raises
//! [`TimerError::ClockMovedBackward`] so the caller can treat it as a
//! temporal-integrity signal.

use rust_decimal::Decimal;

use homestead_types::{MINUTE_MS, Timestamp};

use crate::error::TimerError;

/// Milliseconds remaining until `event_at + duration_ms`.
pub fn time_left(
    event_at: Timestamp,
    duration_ms: u64,
    now: Timestamp,
) -> Result<u64, TimerError> {
    if now < event_at {
        return Err(TimerError::ClockMovedBackward { event_at, now });
    }
    let ready = ready_at(event_at, duration_ms)?;
    Ok(ready.saturating_sub(now))
}

/// Whether `duration_ms` has fully elapsed since `event_at`.
pub fn is_ready(event_at: Timestamp, duration_ms: u64, now: Timestamp) -> Result<bool, TimerError> {
    Ok(time_left(event_at, duration_ms, now)? == 0)
}

/// `event_at + duration_ms`.
pub fn ready_at(event_at: Timestamp, duration_ms: u64) -> Result<Timestamp, TimerError> {
    event_at
        .checked_add(duration_ms)
        .ok_or(TimerError::ArithmeticOverflow { context: "ready_at" })
}

/// Milliseconds until an absolute `ready_at`; zero once passed.
pub const fn remaining(ready_at: Timestamp, now: Timestamp) -> u64 {
    ready_at.saturating_sub(now)
}

/// Back-date a start timestamp so that a boosted duration reads as the base
/// duration: `start + base` then falls due at `now + boosted`.
pub const fn back_dated(now: Timestamp, base_ms: u64, boosted_ms: u64) -> Timestamp {
    now.saturating_sub(base_ms.saturating_sub(boosted_ms))
}

/// A regeneration rate: `amount` per `period_ms` milliseconds.
///
/// Kept as a fraction so the division happens once, after multiplying by the
/// elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    /// Quantity regenerated per period.
    pub amount: Decimal,
    /// Period length in milliseconds.
    pub period_ms: u64,
}

/// `min(last_value + rate * (now - last_at), cap)`.
///
/// A `last_value` already above `cap` is returned unchanged rather than cut
/// down.
pub fn regenerated(
    last_value: Decimal,
    last_at: Timestamp,
    now: Timestamp,
    rate: Rate,
    cap: Decimal,
) -> Result<Decimal, TimerError> {
    if now < last_at {
        return Err(TimerError::ClockMovedBackward {
            event_at: last_at,
            now,
        });
    }
    if last_value >= cap {
        return Ok(last_value);
    }
    if rate.period_ms == 0 {
        return Ok(cap);
    }
    let overflow = TimerError::ArithmeticOverflow {
        context: "regenerated",
    };
    let elapsed = Decimal::from(now.saturating_sub(last_at));
    let gained = rate
        .amount
        .checked_mul(elapsed)
        .and_then(|v| v.checked_div(Decimal::from(rate.period_ms)))
        .ok_or(overflow.clone())?;
    let value = last_value.checked_add(gained).ok_or(overflow)?;
    Ok(value.min(cap))
}

/// Gems needed to finish a process instantly: one gem per started ten
/// minutes remaining, never less than one.
pub fn instant_gems(ms_left: u64) -> Decimal {
    let per_gem = MINUTE_MS.saturating_mul(10);
    let gems = ms_left.div_ceil(per_gem).max(1);
    Decimal::from(gems)
}
