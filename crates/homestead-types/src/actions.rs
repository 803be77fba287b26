//! Player action payloads and the wire envelope.
//!
//! An action arrives as an internally tagged JSON object:
//!
//! ```json
//! { "type": "fruit.harvested", "index": "1", "createdAt": 1700000000000 }
//! ```
//!
//! [`GameAction`] is the closed sum of every action kind the engine knows;
//! [`ActionKind`] is its fieldless discriminant, used as the dispatch key and
//! for the per-kind subsystem permissions. Both are generated from the single
//! catalogue at the bottom of this file so a new kind cannot be added to one
//! and forgotten in the other.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::enums::{
    AchievementName, BuildingName, CollectibleName, CompostName, CropName, CropSeedName,
    FlowerSeedName, FoodName, FruitSeedName, ItemName, MineralName, PlacementKind, SkillName,
    ToolName, WearableName,
};
use crate::ids::{OrderId, PlacementId};
use crate::structs::Coordinates;

// ---------------------------------------------------------------------------
// Payloads: crops, fruit, flowers
// ---------------------------------------------------------------------------

/// Plant a crop seed on an empty plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPlanted {
    /// Target plot.
    pub index: PlacementId,
    /// Seed to plant.
    pub item: CropSeedName,
}

/// Harvest a grown crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropHarvested {
    /// Target plot.
    pub index: PlacementId,
}

/// Apply a fertiliser to a plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotFertilised {
    /// Target plot.
    pub index: PlacementId,
    /// Fertiliser to apply.
    pub fertiliser: CompostName,
}

/// Plant a fruit seed on an empty patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitPlanted {
    /// Target patch.
    pub index: PlacementId,
    /// Seed to plant.
    pub seed: FruitSeedName,
}

/// Harvest a fruit patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitHarvested {
    /// Target patch.
    pub index: PlacementId,
}

/// Chop down an exhausted fruit tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitTreeRemoved {
    /// Target patch.
    pub index: PlacementId,
}

/// Apply a fertiliser to a fruit patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitPatchFertilised {
    /// Target patch.
    pub index: PlacementId,
    /// Fertiliser to apply.
    pub fertiliser: CompostName,
}

/// Plant a flower seed in an empty bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerPlanted {
    /// Target bed.
    pub id: PlacementId,
    /// Seed to plant.
    pub seed: FlowerSeedName,
}

/// Harvest a grown flower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerHarvested {
    /// Target bed.
    pub id: PlacementId,
}

/// Pick a wild mushroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MushroomPicked {
    /// Target mushroom.
    pub id: PlacementId,
}

/// Feed a chicken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChickenFed {
    /// Target chicken.
    pub id: PlacementId,
}

/// Collect a fed chicken's egg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggCollected {
    /// Target chicken.
    pub id: PlacementId,
}

// ---------------------------------------------------------------------------
// Payloads: extraction and stamina
// ---------------------------------------------------------------------------

/// Strike a rock once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockStruck {
    /// Mineral the client believes the rock holds.
    pub kind: MineralName,
    /// Target rock.
    pub id: PlacementId,
    /// Tool used for this strike.
    pub tool: ToolName,
}

/// Bring stamina up to date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaReplenished {}

// ---------------------------------------------------------------------------
// Payloads: placement
// ---------------------------------------------------------------------------

/// Place a crop plot from inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPlaced {
    /// Id for the new plot.
    pub id: PlacementId,
    /// Anchor cell.
    pub coordinates: Coordinates,
}

/// Construct a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingConstructed {
    /// Id for the new building.
    pub id: PlacementId,
    /// Building type.
    pub name: BuildingName,
    /// Anchor cell.
    pub coordinates: Coordinates,
}

/// Place a collectible from inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiblePlaced {
    /// Id for the new collectible.
    pub id: PlacementId,
    /// Collectible type.
    pub name: CollectibleName,
    /// Anchor cell.
    pub coordinates: Coordinates,
}

/// Move any placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementMoved {
    /// Which table the placement lives in.
    pub kind: PlacementKind,
    /// Target placement.
    pub id: PlacementId,
    /// New anchor cell.
    pub coordinates: Coordinates,
}

/// Remove a placement back to inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRemoved {
    /// Which table the placement lives in.
    pub kind: PlacementKind,
    /// Target placement.
    pub id: PlacementId,
}

// ---------------------------------------------------------------------------
// Payloads: production
// ---------------------------------------------------------------------------

/// Start cooking a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCooked {
    /// Food to cook.
    pub item: FoodName,
    /// Cooking building.
    pub building_id: PlacementId,
}

/// Collect a cooked recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCollected {
    /// Cooking building.
    pub building_id: PlacementId,
}

/// Start a composter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompostStarted {
    /// Composter building.
    pub building_id: PlacementId,
}

/// Collect finished compost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompostCollected {
    /// Composter building.
    pub building_id: PlacementId,
}

/// Accelerate a running composter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompostAccelerated {
    /// Composter building.
    pub building_id: PlacementId,
}

/// Start crafting an item in the crafting box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftingStarted {
    /// Item to craft.
    pub item: ItemName,
}

/// Collect the crafting box output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingCollected {}

/// Which process a gem speed-up targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProcessTarget {
    /// Production inside a building (cooking or composting).
    #[serde(rename_all = "camelCase")]
    Building {
        /// Producing building.
        building_id: PlacementId,
    },
    /// The crafting box.
    CraftingBox,
}

/// Finish a running process instantly by spending gems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpedUp {
    /// Process to finish.
    pub target: ProcessTarget,
}

/// Feed cooked food to the bumpkin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpkinFed {
    /// Food to eat.
    pub food: FoodName,
    /// How many to eat.
    pub amount: Decimal,
}

// ---------------------------------------------------------------------------
// Payloads: land
// ---------------------------------------------------------------------------

/// Start constructing the next land tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandExpanded {}

/// Reveal a finished land tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandRevealed {}

/// Finish land construction instantly by spending gems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSpedUp {}

// ---------------------------------------------------------------------------
// Payloads: economy and progression
// ---------------------------------------------------------------------------

/// Buy seeds at the fixed shop price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedsBought {
    /// Seed to buy.
    pub item: ItemName,
    /// How many to buy.
    pub amount: Decimal,
}

/// Sell crops at the fixed shop price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSold {
    /// Crop to sell.
    pub crop: CropName,
    /// How many to sell.
    pub amount: Decimal,
}

/// Craft tools at the workbench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCrafted {
    /// Tool to craft.
    pub tool: ToolName,
    /// How many to craft.
    pub amount: Decimal,
}

/// Sell items at the dynamic market price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSold {
    /// Item to sell.
    pub item: ItemName,
    /// How many to sell.
    pub amount: Decimal,
    /// Unit price the client saw.
    pub price: Decimal,
}

/// Deliver a delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDelivered {
    /// Target order.
    pub id: OrderId,
}

/// Claim an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementClaimed {
    /// Achievement to claim.
    pub achievement: AchievementName,
}

/// Learn a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLearned {
    /// Skill to learn.
    pub skill: SkillName,
}

/// Equip a wardrobe item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableEquipped {
    /// Wearable to equip.
    pub wearable: WearableName,
}

/// Withdraw items and coins for on-chain settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsWithdrawn {
    /// Items to withdraw.
    #[serde(default)]
    pub items: BTreeMap<ItemName, Decimal>,
    /// Coins to withdraw.
    #[serde(default)]
    pub coins: Decimal,
}

/// Confirm that the settlement bridge paid out a pending withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAcknowledged {
    /// Sequence number of the settled withdrawal.
    pub sequence: u64,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Generates [`GameAction`] and [`ActionKind`] from one list of
/// `Variant => "wire.tag"` entries. Each variant wraps the payload struct of
/// the same name.
macro_rules! action_catalogue {
    ( $( $(#[$doc:meta])* $variant:ident => $tag:literal ),+ $(,)? ) => {
        /// A player action with its payload.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum GameAction {
            $( $(#[$doc])* #[serde(rename = $tag)] $variant($variant) ),+
        }

        /// Discriminant of a [`GameAction`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ActionKind {
            $( $(#[$doc])* #[serde(rename = $tag)] $variant ),+
        }

        impl ActionKind {
            /// Every kind, in catalogue order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire tag of this kind.
            pub const fn tag(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }

            /// Resolve a wire tag.
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl GameAction {
            /// The action's discriminant.
            pub const fn kind(&self) -> ActionKind {
                match self {
                    $(Self::$variant(_) => ActionKind::$variant),+
                }
            }
        }

        $(
            impl From<$variant> for GameAction {
                fn from(payload: $variant) -> Self {
                    Self::$variant(payload)
                }
            }
        )+
    };
}

action_catalogue! {
    /// Plant a crop.
    SeedPlanted => "seed.planted",
    /// Harvest a crop.
    CropHarvested => "crop.harvested",
    /// Fertilise a plot.
    PlotFertilised => "plot.fertilised",
    /// Plant a fruit.
    FruitPlanted => "fruit.planted",
    /// Harvest a fruit patch.
    FruitHarvested => "fruit.harvested",
    /// Chop an exhausted fruit tree.
    FruitTreeRemoved => "fruitTree.removed",
    /// Fertilise a fruit patch.
    FruitPatchFertilised => "fruitPatch.fertilised",
    /// Plant a flower.
    FlowerPlanted => "flower.planted",
    /// Harvest a flower.
    FlowerHarvested => "flower.harvested",
    /// Pick a wild mushroom.
    MushroomPicked => "mushroom.picked",
    /// Feed a chicken.
    ChickenFed => "chicken.fed",
    /// Collect an egg.
    EggCollected => "chicken.collectEgg",
    /// Strike a rock.
    RockStruck => "rock.struck",
    /// Replenish stamina.
    StaminaReplenished => "bumpkin.replenishStamina",
    /// Place a crop plot.
    PlotPlaced => "plot.placed",
    /// Construct a building.
    BuildingConstructed => "building.constructed",
    /// Place a collectible.
    CollectiblePlaced => "collectible.placed",
    /// Move a placement.
    PlacementMoved => "placement.moved",
    /// Remove a placement.
    PlacementRemoved => "placement.removed",
    /// Start cooking.
    RecipeCooked => "recipe.cooked",
    /// Collect cooked food.
    RecipeCollected => "recipe.collected",
    /// Start composting.
    CompostStarted => "compost.started",
    /// Collect compost.
    CompostCollected => "compost.collected",
    /// Accelerate composting.
    CompostAccelerated => "compost.accelerated",
    /// Start crafting.
    CraftingStarted => "crafting.started",
    /// Collect crafted item.
    CraftingCollected => "crafting.collected",
    /// Gem speed-up of a process.
    ProcessSpedUp => "process.spedUp",
    /// Feed the bumpkin.
    BumpkinFed => "bumpkin.fed",
    /// Start a land expansion.
    LandExpanded => "land.expanded",
    /// Reveal an expansion.
    LandRevealed => "land.revealed",
    /// Gem speed-up of an expansion.
    ExpansionSpedUp => "expansion.spedUp",
    /// Buy seeds.
    SeedsBought => "seeds.bought",
    /// Sell crops.
    CropSold => "crop.sold",
    /// Craft tools.
    ToolCrafted => "tool.crafted",
    /// Sell at market price.
    MarketSold => "market.sold",
    /// Deliver an order.
    OrderDelivered => "order.delivered",
    /// Claim an achievement.
    AchievementClaimed => "achievement.claimed",
    /// Learn a skill.
    SkillLearned => "skill.learned",
    /// Equip a wearable.
    WearableEquipped => "wearable.equipped",
    /// Withdraw for on-chain settlement.
    ItemsWithdrawn => "items.withdrawn",
    /// Confirm a settled withdrawal.
    SettlementAcknowledged => "settlement.acknowledged",
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Why a raw action could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    /// The `type` tag names no known action kind.
    #[error("unknown action kind: {0}")]
    UnknownKind(String),

    /// The payload does not match its kind's schema.
    #[error("malformed action: {0}")]
    Malformed(String),
}

/// An action as submitted by a client, with its optional client timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEnvelope {
    /// The action.
    #[serde(flatten)]
    pub action: GameAction,
    /// Client-side creation time, if the client sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl ActionEnvelope {
    /// Wrap an action without a client timestamp.
    pub const fn new(action: GameAction) -> Self {
        Self {
            action,
            created_at: None,
        }
    }

    /// Decode a JSON action, separating unknown kinds from malformed
    /// payloads of known kinds.
    pub fn from_json(raw: &str) -> Result<Self, ActionParseError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ActionParseError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ActionParseError> {
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ActionParseError::Malformed("missing \"type\" tag".to_owned()))?;
        if ActionKind::from_tag(tag).is_none() {
            return Err(ActionParseError::UnknownKind(tag.to_owned()));
        }
        serde_json::from_value(value).map_err(|e| ActionParseError::Malformed(e.to_string()))
    }

    /// The action's discriminant.
    pub const fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn every_tag_resolves_to_its_kind() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tag(kind.tag()), Some(*kind));
        }
        assert_eq!(ActionKind::from_tag("crop.teleported"), None);
    }

    #[test]
    fn parses_client_wire_format() {
        let envelope = ActionEnvelope::from_json(
            r#"{"type":"fruit.harvested","index":"1","createdAt":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(envelope.created_at, Some(1_700_000_000_000));
        assert_eq!(
            envelope.action,
            GameAction::FruitHarvested(FruitHarvested {
                index: PlacementId::from("1")
            })
        );
    }

    #[test]
    fn parses_camel_case_fields_and_numeric_amounts() {
        let envelope =
            ActionEnvelope::from_json(r#"{"type":"recipe.cooked","item":"Boiled Eggs","buildingId":"7"}"#)
                .unwrap();
        assert_eq!(envelope.kind(), ActionKind::RecipeCooked);

        let sold = ActionEnvelope::from_json(r#"{"type":"crop.sold","crop":"Kale","amount":2.5}"#).unwrap();
        assert_eq!(
            sold.action,
            GameAction::CropSold(CropSold {
                crop: CropName::Kale,
                amount: dec!(2.5)
            })
        );
    }

    #[test]
    fn empty_payloads_parse() {
        let envelope = ActionEnvelope::from_json(r#"{"type":"bumpkin.replenishStamina"}"#).unwrap();
        assert_eq!(envelope.kind(), ActionKind::StaminaReplenished);
        assert_eq!(envelope.created_at, None);
    }

    #[test]
    fn process_target_is_tagged() {
        let envelope = ActionEnvelope::from_json(
            r#"{"type":"process.spedUp","target":{"kind":"building","buildingId":"3"}}"#,
        )
        .unwrap();
        assert_eq!(
            envelope.action,
            GameAction::ProcessSpedUp(ProcessSpedUp {
                target: ProcessTarget::Building {
                    building_id: PlacementId::from("3")
                }
            })
        );
    }

    #[test]
    fn unknown_kind_is_distinguished_from_malformed() {
        assert_eq!(
            ActionEnvelope::from_json(r#"{"type":"crop.teleported"}"#),
            Err(ActionParseError::UnknownKind("crop.teleported".to_owned()))
        );
        assert!(matches!(
            ActionEnvelope::from_json(r#"{"type":"seed.planted","index":"1","item":"Moon Seed"}"#),
            Err(ActionParseError::Malformed(_))
        ));
        assert!(matches!(
            ActionEnvelope::from_json(r#"{"index":"1"}"#),
            Err(ActionParseError::Malformed(_))
        ));
        assert!(matches!(
            ActionEnvelope::from_json("not json"),
            Err(ActionParseError::Malformed(_))
        ));
    }

    #[test]
    fn serializes_with_type_tag() {
        let envelope = ActionEnvelope {
            action: GameAction::from(CropHarvested {
                index: PlacementId::from("2"),
            }),
            created_at: Some(5),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "crop.harvested");
        assert_eq!(json["index"], "2");
        assert_eq!(json["createdAt"], 5);
    }
}
