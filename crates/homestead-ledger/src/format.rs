//! Compact display of quantities.
//!
//! `shorten_count` renders a balance for a tight UI slot: values are always
//! rounded toward zero (a player never sees more than they own) and large
//! values are denominated in `k`, `m`, `b`, `t`, `q`.

use rust_decimal::{Decimal, RoundingStrategy};

const MAX_DISPLAY_CHARS: usize = 4;
const SUFFIXES: [&str; 5] = ["k", "m", "b", "t", "q"];

fn truncated(value: Decimal, dp: u32) -> String {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::ToZero)
        .normalize()
        .to_string()
}

/// Render `count` compactly.
///
/// | Magnitude | Decimals | Example |
/// |-----------|----------|---------|
/// | `< 0.01` | -- | `0`, `-0` |
/// | `< 10` | 2 | `0.24` |
/// | `< 100` | 1 | `23.4` |
/// | `< 1000` | 0 | `456` |
/// | `>= 1000` | up to 4 characters + suffix | `67.3k`, `234m` |
///
/// Beyond the `q` range the magnitude is printed whole: `234567q`.
pub fn shorten_count(count: Decimal) -> String {
    let positive = !count.is_sign_negative() || count.is_zero();
    let absolute = count.abs();

    if absolute < Decimal::new(1, 2) {
        return if positive { "0" } else { "-0" }.to_owned();
    }
    if absolute < Decimal::TEN {
        return truncated(count, 2);
    }
    if absolute < Decimal::ONE_HUNDRED {
        return truncated(count, 1);
    }
    if absolute < Decimal::ONE_THOUSAND {
        return truncated(count, 0);
    }

    let mut power: usize = 0;
    let mut magnitude = count;
    while magnitude.abs() >= Decimal::ONE_THOUSAND && power < SUFFIXES.len() {
        match magnitude.checked_div(Decimal::ONE_THOUSAND) {
            Some(next) => magnitude = next,
            None => break,
        }
        power = power.saturating_add(1);
    }
    let suffix = SUFFIXES
        .get(power.saturating_sub(1))
        .copied()
        .unwrap_or("q");

    if magnitude.abs() >= Decimal::ONE_THOUSAND {
        return format!("{}{suffix}", truncated(magnitude, 0));
    }

    let text = truncated(magnitude, 1);
    let mut shown: String = text.chars().take(MAX_DISPLAY_CHARS).collect();
    if shown.ends_with('.') {
        shown.pop();
    }
    format!("{shown}{suffix}")
}
