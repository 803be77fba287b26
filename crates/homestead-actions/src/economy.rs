//! Buying and selling.
//!
//! Shop prices are catalogue data. Market prices are quoted by the host into
//! `state.market`; a sale must quote the price it saw and land within
//! [`MARKET_QUOTE_TTL_MS`] of the quote.

use rust_decimal::Decimal;

use homestead_ledger::inventory::{credit, credit_all, credit_coins, debit, debit_all};
use homestead_ledger::quantity::scale;
use homestead_types::{
    ActionKind, CropSold, GameState, MarketSold, OrderDelivered, SeedsBought, Timestamp,
    ToolCrafted,
};
use homestead_world::catalogue::{MARKET_QUOTE_TTL_MS, crop, seed_offer, tool_cost};
use homestead_world::{RequirementSet, TimeWindow, TimerError};

use crate::error::GameError;
use crate::handler::{ActionHandler, record_activity, require, require_whole_amount};

/// Reject a quantity that is zero or negative.
fn require_positive(amount: Decimal) -> Result<(), GameError> {
    if amount <= Decimal::ZERO {
        return Err(GameError::rule("Invalid amount"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

impl ActionHandler for SeedsBought {
    const KIND: ActionKind = ActionKind::SeedsBought;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let offer = seed_offer(self.item).ok_or(GameError::rule("This item is not for sale"))?;
        Ok(RequirementSet::coins(scale(offer.price, self.amount)?).with_level(offer.level))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        require_whole_amount(self.amount)?;
        let cost = self.requirements(state, now)?;
        require(&cost, state, now)?;
        cost.charge(state)?;
        credit(&mut state.inventory, self.item, self.amount)?;

        record_activity(state, "Coins Spent", cost.coins)?;
        record_activity(state, format!("{} Bought", self.item), self.amount)
    }
}

impl ActionHandler for CropSold {
    const KIND: ActionKind = ActionKind::CropSold;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.crop, self.amount))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        require_positive(self.amount)?;
        require(&self.requirements(state, now)?, state, now)?;

        let coins = scale(crop(self.crop).sell_price, self.amount)?;
        debit(&mut state.inventory, self.crop, self.amount)?;
        credit_coins(&mut state.coins, coins)?;

        record_activity(state, "Coins Earned", coins)?;
        record_activity(state, format!("{} Sold", self.crop), self.amount)
    }
}

impl ActionHandler for ToolCrafted {
    const KIND: ActionKind = ActionKind::ToolCrafted;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(tool_cost(self.tool).times(self.amount)?)
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        require_whole_amount(self.amount)?;
        let cost = self.requirements(state, now)?;
        require(&cost, state, now)?;
        cost.charge(state)?;
        credit(&mut state.inventory, self.tool, self.amount)?;

        record_activity(state, format!("{} Crafted", self.tool), self.amount)
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

impl ActionHandler for MarketSold {
    const KIND: ActionKind = ActionKind::MarketSold;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(RequirementSet::default().with_item(self.item, self.amount))
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        require_positive(self.amount)?;
        let quote = state
            .market
            .get(&self.item)
            .cloned()
            .ok_or(GameError::rule("No market price"))?;
        if now < quote.quoted_at {
            return Err(TimerError::ClockMovedBackward {
                event_at: quote.quoted_at,
                now,
            }
            .into());
        }
        if now.saturating_sub(quote.quoted_at) > MARKET_QUOTE_TTL_MS {
            return Err(GameError::rule("Price expired"));
        }
        if quote.price != self.price {
            return Err(GameError::rule("Price changed"));
        }
        require(&self.requirements(state, now)?, state, now)?;

        let coins = scale(quote.price, self.amount)?;
        debit(&mut state.inventory, self.item, self.amount)?;
        credit_coins(&mut state.coins, coins)?;

        record_activity(state, "Coins Earned", coins)?;
        record_activity(state, format!("{} Sold", self.item), self.amount)
    }
}

// ---------------------------------------------------------------------------
// Deliveries
// ---------------------------------------------------------------------------

fn order_index(action: &OrderDelivered, state: &GameState) -> Result<usize, GameError> {
    state
        .delivery
        .orders
        .iter()
        .position(|o| o.id == action.id)
        .ok_or_else(|| GameError::not_found("Order", &action.id))
}

impl ActionHandler for OrderDelivered {
    const KIND: ActionKind = ActionKind::OrderDelivered;

    fn requirements(
        &self,
        state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        let index = order_index(self, state)?;
        let order = state
            .delivery
            .orders
            .get(index)
            .ok_or_else(|| GameError::not_found("Order", &self.id))?;
        Ok(RequirementSet {
            items: order.items.clone(),
            window: Some(TimeWindow {
                from: Some(order.ready_at),
                until: order.expires_at,
            }),
            ..RequirementSet::default()
        })
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        let index = order_index(self, state)?;
        let order = state
            .delivery
            .orders
            .get(index)
            .cloned()
            .ok_or_else(|| GameError::not_found("Order", &self.id))?;
        if order.completed_at.is_some() {
            return Err(GameError::rule("Order has already been completed"));
        }
        require(&self.requirements(state, now)?, state, now)?;

        debit_all(&mut state.inventory, &order.items)?;
        credit_all(&mut state.inventory, &order.reward.items)?;
        credit_coins(&mut state.coins, order.reward.coins)?;

        if let Some(slot) = state.delivery.orders.get_mut(index) {
            slot.completed_at = Some(now);
        }
        state.delivery.fulfilled_count = state
            .delivery
            .fulfilled_count
            .checked_add(1)
            .ok_or(GameError::rule("Delivery count overflow"))?;

        record_activity(state, "Coins Earned", order.reward.coins)?;
        record_activity(state, "Order Delivered", Decimal::ONE)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal_macros::dec;

    use homestead_types::{
        CropName, ItemName, MINUTE_MS, MarketQuote, Order, OrderId, Reward, ToolName,
    };
    use homestead_world::starting_farm;

    use super::*;

    #[test]
    fn buying_seeds_costs_coins() {
        let state = SeedsBought {
            item: ItemName::SunflowerSeed,
            amount: dec!(10),
        }
        .handle(&starting_farm(0), 0)
        .unwrap();
        assert_eq!(state.coins, dec!(19.9));
        assert_eq!(state.balance(ItemName::SunflowerSeed), dec!(20));
    }

    #[test]
    fn seed_level_gate() {
        let result = SeedsBought {
            item: ItemName::KaleSeed,
            amount: dec!(1),
        }
        .handle(&starting_farm(0), 0);
        assert!(result.map_err(|e| e.to_string()).unwrap_err().starts_with("Bumpkin level"));
    }

    #[test]
    fn non_seed_is_not_for_sale() {
        let result = SeedsBought {
            item: ItemName::Gem,
            amount: dec!(1),
        }
        .handle(&starting_farm(0), 0);
        assert_eq!(result, Err(GameError::rule("This item is not for sale")));
    }

    #[test]
    fn selling_fractional_crops() {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Sunflower, dec!(2.4));
        let sold = CropSold {
            crop: CropName::Sunflower,
            amount: dec!(2.4),
        }
        .handle(&state, 0)
        .unwrap();
        assert_eq!(sold.balance(ItemName::Sunflower), dec!(0));
        assert_eq!(sold.coins, dec!(20.048));
    }

    #[test]
    fn selling_more_than_owned() {
        let result = CropSold {
            crop: CropName::Potato,
            amount: dec!(1),
        }
        .handle(&starting_farm(0), 0);
        assert_eq!(
            result.map_err(|e| e.to_string()),
            Err("Insufficient Potato".to_owned())
        );
    }

    #[test]
    fn crafting_two_pickaxes() {
        let mut state = starting_farm(0);
        state.coins = dec!(40);
        state.inventory.insert(ItemName::Wood, dec!(6));
        let crafted = ToolCrafted {
            tool: ToolName::Pickaxe,
            amount: dec!(2),
        }
        .handle(&state, 0)
        .unwrap();
        assert_eq!(crafted.coins, dec!(0));
        assert_eq!(crafted.balance(ItemName::Wood), dec!(0));
        assert_eq!(crafted.balance(ItemName::Pickaxe), dec!(5));
    }

    fn quoted(price: Decimal) -> GameState {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Iron, dec!(3));
        state.market.insert(
            ItemName::Iron,
            MarketQuote {
                price,
                quoted_at: 1_000,
            },
        );
        state
    }

    fn sell(price: Decimal) -> MarketSold {
        MarketSold {
            item: ItemName::Iron,
            amount: dec!(2),
            price,
        }
    }

    #[test]
    fn market_sale_at_quoted_price() {
        let sold = sell(dec!(1.5)).handle(&quoted(dec!(1.5)), 2_000).unwrap();
        assert_eq!(sold.coins, dec!(23));
        assert_eq!(sold.balance(ItemName::Iron), dec!(1));
    }

    #[test]
    fn stale_or_changed_quotes_are_rejected() {
        let state = quoted(dec!(1.5));
        assert_eq!(
            sell(dec!(1.5)).handle(&state, 1_000 + 5 * MINUTE_MS + 1),
            Err(GameError::rule("Price expired"))
        );
        assert_eq!(
            sell(dec!(2)).handle(&state, 2_000),
            Err(GameError::rule("Price changed"))
        );
    }

    fn with_order(expires_at: Option<Timestamp>) -> GameState {
        let mut state = starting_farm(0);
        state.inventory.insert(ItemName::Sunflower, dec!(5));
        state.delivery.orders.push(Order {
            id: OrderId::from("o1"),
            from: "Betty".to_owned(),
            items: BTreeMap::from([(ItemName::Sunflower, dec!(5))]),
            reward: Reward {
                coins: dec!(8),
                items: BTreeMap::from([(ItemName::PotatoSeed, dec!(2))]),
            },
            created_at: 0,
            ready_at: 100,
            expires_at,
            completed_at: None,
        });
        state
    }

    fn deliver() -> OrderDelivered {
        OrderDelivered {
            id: OrderId::from("o1"),
        }
    }

    #[test]
    fn delivering_an_order_pays_once() {
        let delivered = deliver().handle(&with_order(None), 200).unwrap();
        assert_eq!(delivered.coins, dec!(28));
        assert_eq!(delivered.balance(ItemName::Sunflower), dec!(0));
        assert_eq!(delivered.balance(ItemName::PotatoSeed), dec!(5));
        assert_eq!(delivered.delivery.fulfilled_count, 1);
        assert_eq!(
            deliver().handle(&delivered, 300),
            Err(GameError::rule("Order has already been completed"))
        );
    }

    #[test]
    fn order_window_is_enforced() {
        let state = with_order(Some(500));
        assert_eq!(
            deliver().handle(&state, 50).map_err(|e| e.to_string()),
            Err("Not yet available".to_owned())
        );
        assert_eq!(
            deliver().handle(&state, 500).map_err(|e| e.to_string()),
            Err("No longer available".to_owned())
        );
    }
}
