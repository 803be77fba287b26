//! Checked arithmetic over non-negative quantities.
//!
//! These three operations are the only way the engine combines quantities.
//! They never wrap, never round, and never produce a negative result.

use rust_decimal::Decimal;

use crate::LedgerError;

/// Reject negative operands.
pub fn ensure_non_negative(quantity: Decimal) -> Result<Decimal, LedgerError> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(LedgerError::NegativeQuantity { quantity });
    }
    Ok(quantity)
}

/// `a + b`, failing on overflow or a negative operand.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    ensure_non_negative(a)?;
    ensure_non_negative(b)?;
    a.checked_add(b)
        .ok_or_else(|| LedgerError::overflow(format!("{a} + {b}")))
}

/// `a - b`, failing with [`LedgerError::InsufficientResource`] when `b > a`.
pub fn subtract(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    ensure_non_negative(b)?;
    if b > a {
        return Err(LedgerError::InsufficientResource {
            available: a,
            required: b,
        });
    }
    a.checked_sub(b)
        .ok_or_else(|| LedgerError::overflow(format!("{a} - {b}")))
}

/// `a * factor`, failing on overflow or a negative operand.
pub fn scale(a: Decimal, factor: Decimal) -> Result<Decimal, LedgerError> {
    ensure_non_negative(a)?;
    ensure_non_negative(factor)?;
    a.checked_mul(factor)
        .ok_or_else(|| LedgerError::overflow(format!("{a} * {factor}")))
}

/// Sum an iterator of quantities.
pub fn sum<I>(quantities: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    quantities.into_iter().try_fold(Decimal::ZERO, add)
}
