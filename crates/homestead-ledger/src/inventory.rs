//! Inventory and coin bookkeeping.
//!
//! A debit that fails leaves the inventory untouched. An item debited down to
//! zero keeps an explicit zero entry; crediting zero of an absent item adds
//! nothing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use homestead_types::ItemName;

use crate::LedgerError;
use crate::quantity::{add, ensure_non_negative, subtract};

/// Inventory map type used throughout the engine.
pub type Inventory = BTreeMap<ItemName, Decimal>;

/// Quantity of `item` held, zero when absent.
pub fn balance(inventory: &Inventory, item: impl Into<ItemName>) -> Decimal {
    inventory
        .get(&item.into())
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// Whether at least `amount` of `item` is held.
pub fn has(inventory: &Inventory, item: impl Into<ItemName>, amount: Decimal) -> bool {
    balance(inventory, item) >= amount
}

/// Add `amount` of `item`.
pub fn credit(
    inventory: &mut Inventory,
    item: impl Into<ItemName>,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let item = item.into();
    ensure_non_negative(amount)?;
    if amount.is_zero() && !inventory.contains_key(&item) {
        return Ok(());
    }
    let next = add(balance(inventory, item), amount)?;
    inventory.insert(item, next);
    Ok(())
}

/// Remove `amount` of `item`, failing with [`LedgerError::InsufficientItem`]
/// when the balance is too low.
pub fn debit(
    inventory: &mut Inventory,
    item: impl Into<ItemName>,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let item = item.into();
    ensure_non_negative(amount)?;
    if amount.is_zero() {
        return Ok(());
    }
    let available = balance(inventory, item);
    let next = subtract(available, amount).map_err(|e| match e {
        LedgerError::InsufficientResource { available, required } => {
            LedgerError::InsufficientItem {
                item,
                available,
                required,
            }
        }
        other => other,
    })?;
    inventory.insert(item, next);
    Ok(())
}

/// Debit every `(item, amount)` in `costs`, checking all balances first so a
/// shortfall leaves the inventory untouched.
pub fn debit_all(inventory: &mut Inventory, costs: &Inventory) -> Result<(), LedgerError> {
    for (item, amount) in costs {
        let available = balance(inventory, *item);
        if available < *amount {
            return Err(LedgerError::InsufficientItem {
                item: *item,
                available,
                required: *amount,
            });
        }
    }
    for (item, amount) in costs {
        debit(inventory, *item, *amount)?;
    }
    Ok(())
}

/// Credit every `(item, amount)` in `gains`.
pub fn credit_all(inventory: &mut Inventory, gains: &Inventory) -> Result<(), LedgerError> {
    for (item, amount) in gains {
        credit(inventory, *item, *amount)?;
    }
    Ok(())
}

/// Add `amount` coins.
pub fn credit_coins(coins: &mut Decimal, amount: Decimal) -> Result<(), LedgerError> {
    *coins = add(*coins, amount)?;
    Ok(())
}

/// Remove `amount` coins, failing with [`LedgerError::InsufficientCoins`].
pub fn debit_coins(coins: &mut Decimal, amount: Decimal) -> Result<(), LedgerError> {
    *coins = subtract(*coins, amount).map_err(|e| match e {
        LedgerError::InsufficientResource { available, required } => {
            LedgerError::InsufficientCoins {
                available,
                required,
            }
        }
        other => other,
    })?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_types::CropName;

    use super::*;

    #[test]
    fn credit_then_debit() {
        let mut inv = Inventory::new();
        credit(&mut inv, ItemName::Wood, dec!(3)).unwrap();
        credit(&mut inv, CropName::Kale, dec!(1.25)).unwrap();
        debit(&mut inv, ItemName::Wood, dec!(3)).unwrap();

        assert_eq!(balance(&inv, ItemName::Wood), Decimal::ZERO);
        assert!(inv.contains_key(&ItemName::Wood));
        assert!(has(&inv, ItemName::Kale, dec!(1.25)));
        assert!(!has(&inv, ItemName::Kale, dec!(1.5)));
    }

    #[test]
    fn failed_debit_leaves_inventory_untouched() {
        let mut inv = Inventory::from([(ItemName::Stone, dec!(2))]);
        let before = inv.clone();
        let result = debit(&mut inv, ItemName::Stone, dec!(3));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientItem {
                item: ItemName::Stone,
                available: dec!(2),
                required: dec!(3),
            })
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn insufficient_item_message_names_item() {
        let mut inv = Inventory::new();
        let err = debit(&mut inv, ItemName::SunflowerSeed, dec!(1)).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient Sunflower Seed");
    }

    #[test]
    fn zero_credit_adds_no_entry() {
        let mut inv = Inventory::new();
        credit(&mut inv, ItemName::Gold, Decimal::ZERO).unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn debit_all_is_atomic() {
        let mut inv = Inventory::from([(ItemName::Wood, dec!(5)), (ItemName::Stone, dec!(1))]);
        let before = inv.clone();
        let costs = Inventory::from([(ItemName::Wood, dec!(2)), (ItemName::Stone, dec!(2))]);
        assert!(debit_all(&mut inv, &costs).is_err());
        assert_eq!(inv, before);

        let costs = Inventory::from([(ItemName::Wood, dec!(2)), (ItemName::Stone, dec!(1))]);
        debit_all(&mut inv, &costs).unwrap();
        assert_eq!(balance(&inv, ItemName::Wood), dec!(3));
        assert_eq!(balance(&inv, ItemName::Stone), Decimal::ZERO);
    }

    #[test]
    fn coins_cannot_go_negative() {
        let mut coins = dec!(10);
        debit_coins(&mut coins, dec!(4)).unwrap();
        assert_eq!(coins, dec!(6));
        assert!(matches!(
            debit_coins(&mut coins, dec!(7)),
            Err(LedgerError::InsufficientCoins { .. })
        ));
        assert_eq!(coins, dec!(6));
        credit_coins(&mut coins, dec!(0.5)).unwrap();
        assert_eq!(coins, dec!(6.5));
    }
}
