//! The farm aggregate and the entities it owns.
//!
//! [`GameState`] is the root value the transition engine consumes and returns.
//! Every entity on the island lives in a [`Table`] keyed by [`PlacementId`];
//! pending processes carry explicit `started_at`/`ready_at` pairs and readiness
//! is always derived from `now`, never stored.
//!
//! Field names serialize in camelCase to stay compatible with persisted farm
//! snapshots.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::actions::GameAction;
use crate::enums::{
    AchievementName, BuildingName, CollectibleName, CompostName, CropName, FlowerName, FruitName,
    ItemName, MineralName, SkillName, ToolName, WearableName, WearableSlot,
};
use crate::ids::{OrderId, PlacementId};
use crate::table::Table;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Island grid coordinates of a placement's anchor cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    /// Column; grows to the east.
    pub x: i32,
    /// Row; grows to the north.
    pub y: i32,
}

impl Coordinates {
    /// Construct a coordinate pair.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a placement, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Cells along x.
    pub width: u32,
    /// Cells along y.
    pub height: u32,
}

impl Dimensions {
    /// Construct dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The cells a placement occupies.
///
/// A footprint anchored at `(x, y)` covers columns `x .. x + width` and rows
/// `y - height + 1 ..= y`: the anchor is the top-left cell and the footprint
/// extends east and south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    /// Anchor column.
    pub x: i32,
    /// Anchor row.
    pub y: i32,
    /// Cells along x.
    pub width: u32,
    /// Cells along y.
    pub height: u32,
}

impl Footprint {
    /// Anchor `dimensions` at `coordinates`.
    pub const fn at(coordinates: Coordinates, dimensions: Dimensions) -> Self {
        Self {
            x: coordinates.x,
            y: coordinates.y,
            width: dimensions.width,
            height: dimensions.height,
        }
    }

    /// The anchor cell.
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.x, self.y)
    }

    /// The footprint's size.
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// The same footprint re-anchored at `coordinates`.
    #[must_use]
    pub const fn moved_to(self, coordinates: Coordinates) -> Self {
        Self::at(coordinates, self.dimensions())
    }
}

// ---------------------------------------------------------------------------
// Bumpkin
// ---------------------------------------------------------------------------

/// Stamina pool with its last regeneration timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamina {
    /// Current stamina.
    pub value: Decimal,
    /// When `value` was last brought up to date.
    pub replenished_at: Timestamp,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bumpkin {
    /// Total experience; the level is derived from it.
    pub experience: Decimal,
    /// Learned skills.
    #[serde(default)]
    pub skills: BTreeSet<SkillName>,
    /// Stamina pool.
    pub stamina: Stamina,
    /// Wearables worn, one per slot.
    #[serde(default)]
    pub equipped: BTreeMap<WearableSlot, WearableName>,
    /// Named activity counters (`"Sunflower Harvested"`, `"Gems Spent"`, ...).
    #[serde(default)]
    pub activity: BTreeMap<String, Decimal>,
    /// Claimed achievements.
    #[serde(default)]
    pub achievements: BTreeSet<AchievementName>,
}

impl Bumpkin {
    /// Current value of an activity counter, zero when never recorded.
    pub fn activity_count(&self, name: &str) -> Decimal {
        self.activity.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    /// Whether a wearable is equipped in any slot.
    pub fn is_wearing(&self, wearable: WearableName) -> bool {
        self.equipped.values().any(|w| *w == wearable)
    }
}

// ---------------------------------------------------------------------------
// Crops, fruit, flowers
// ---------------------------------------------------------------------------

/// Fertiliser applied to a plot or fruit patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFertiliser {
    /// Which fertiliser.
    pub name: CompostName,
    /// When it was applied.
    pub fertilised_at: Timestamp,
}

/// A crop growing on a plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantedCrop {
    /// What is growing.
    pub name: CropName,
    /// Back-dated planting time; ready at `planted_at + base growth`.
    pub planted_at: Timestamp,
}

/// A crop plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPlot {
    /// Occupied cells.
    pub footprint: Footprint,
    /// When the plot was placed.
    pub created_at: Timestamp,
    /// Growing crop, if any.
    #[serde(default)]
    pub crop: Option<PlantedCrop>,
    /// Applied fertiliser, if any.
    #[serde(default)]
    pub fertiliser: Option<AppliedFertiliser>,
}

/// A fruit tree or bush growing on a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantedFruit {
    /// What is growing.
    pub name: FruitName,
    /// Back-dated planting time.
    pub planted_at: Timestamp,
    /// Back-dated last harvest time; equals `planted_at` before the first harvest.
    pub harvested_at: Timestamp,
    /// Harvests remaining before the tree must be chopped.
    pub harvests_left: u32,
}

/// A fruit patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitPatch {
    /// Occupied cells.
    pub footprint: Footprint,
    /// When the patch was placed.
    pub created_at: Timestamp,
    /// Planted fruit, if any.
    #[serde(default)]
    pub fruit: Option<PlantedFruit>,
    /// Applied fertiliser, if any.
    #[serde(default)]
    pub fertiliser: Option<AppliedFertiliser>,
}

/// A flower growing in a bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantedFlower {
    /// What is growing.
    pub name: FlowerName,
    /// Back-dated planting time.
    pub planted_at: Timestamp,
}

/// A flower bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerBed {
    /// Occupied cells.
    pub footprint: Footprint,
    /// When the bed was placed.
    pub created_at: Timestamp,
    /// Growing flower, if any.
    #[serde(default)]
    pub flower: Option<PlantedFlower>,
}

// ---------------------------------------------------------------------------
// Resource nodes, buildings, collectibles, animals
// ---------------------------------------------------------------------------

/// A mineable rock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rock {
    /// Mineral yielded.
    pub kind: MineralName,
    /// Occupied cells.
    pub footprint: Footprint,
    /// When the rock was placed.
    pub created_at: Timestamp,
    /// Back-dated last mining time; zero when never mined.
    #[serde(default)]
    pub mined_at: Timestamp,
    /// Total times mined.
    #[serde(default)]
    pub times_mined: u32,
}

/// A timed production: cooking, composting, or crafting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    /// What is produced.
    pub item: ItemName,
    /// How much is produced.
    pub amount: Decimal,
    /// When production started.
    pub started_at: Timestamp,
    /// When the output can be collected.
    pub ready_at: Timestamp,
    /// When an accelerator was applied, if any.
    #[serde(default)]
    pub boosted_at: Option<Timestamp>,
}

/// A constructed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Building type.
    pub name: BuildingName,
    /// Occupied cells.
    pub footprint: Footprint,
    /// When construction started.
    pub created_at: Timestamp,
    /// When construction finishes.
    pub ready_at: Timestamp,
    /// Production in progress, if any.
    #[serde(default)]
    pub producing: Option<Production>,
}

/// A placed collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    /// Collectible type.
    pub name: CollectibleName,
    /// Occupied cells.
    pub footprint: Footprint,
    /// When it was placed.
    pub created_at: Timestamp,
}

/// A chicken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chicken {
    /// Occupied cells.
    pub footprint: Footprint,
    /// When the chicken was last fed; cleared when its egg is collected.
    #[serde(default)]
    pub fed_at: Option<Timestamp>,
}

/// A wild mushroom spawned on the island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mushroom {
    /// Item gained when picked.
    pub name: ItemName,
    /// Quantity gained when picked.
    pub amount: Decimal,
    /// Where it grows.
    pub coordinates: Coordinates,
}

/// Spawned wild mushrooms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mushrooms {
    /// When the current batch spawned.
    pub spawned_at: Timestamp,
    /// Unpicked mushrooms.
    pub mushrooms: Table<Mushroom>,
}

// ---------------------------------------------------------------------------
// Pending processes
// ---------------------------------------------------------------------------

/// Land expansion under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Construction {
    /// When construction started.
    pub created_at: Timestamp,
    /// When the land can be revealed.
    pub ready_at: Timestamp,
}

/// Coins and items granted by an order or achievement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Coins granted.
    #[serde(default)]
    pub coins: Decimal,
    /// Items granted.
    #[serde(default)]
    pub items: BTreeMap<ItemName, Decimal>,
}

/// A delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Who placed the order.
    pub from: String,
    /// Items to hand over.
    pub items: BTreeMap<ItemName, Decimal>,
    /// What delivering pays.
    pub reward: Reward,
    /// When the order was issued.
    pub created_at: Timestamp,
    /// Earliest delivery time.
    pub ready_at: Timestamp,
    /// Latest delivery time, if bounded.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
    /// When the order was delivered.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

/// Delivery board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// Open and completed orders.
    pub orders: Vec<Order>,
    /// Total orders delivered.
    pub fulfilled_count: u32,
}

/// A server-quoted sell price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    /// Coins paid per unit.
    pub price: Decimal,
    /// When the host stamped the quote.
    pub quoted_at: Timestamp,
}

/// A withdrawal awaiting on-chain settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSettlement {
    /// Monotonic sequence number within this farm.
    pub sequence: u64,
    /// Items removed from the inventory.
    pub items: BTreeMap<ItemName, Decimal>,
    /// Coins removed from the balance.
    pub coins: Decimal,
    /// When the withdrawal was requested.
    pub requested_at: Timestamp,
}

/// Withdrawals handed to the host's settlement bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Withdrawals not yet acknowledged by the host.
    pub pending: Vec<PendingSettlement>,
    /// Next sequence number to assign.
    pub next_sequence: u64,
}

/// Progress of a multi-hit rock strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeCursor {
    /// Rock being struck.
    pub rock: PlacementId,
    /// Tool used for the strikes so far.
    pub tool: ToolName,
    /// Strikes landed so far.
    pub hits: u32,
}

/// Anti-cheat bookkeeping maintained by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookkeeping {
    /// `now` of the last committed action.
    pub last_processed_at: Timestamp,
    /// `now` of recently committed actions, oldest first, used for rate limiting.
    #[serde(default)]
    pub recent_actions: Vec<Timestamp>,
    /// Actions committed at exactly `last_processed_at`. An identical action
    /// arriving at that same `now` is a replay.
    #[serde(default)]
    pub committed_at_last: Vec<GameAction>,
    /// Set by the host; a banned farm accepts no actions.
    #[serde(default)]
    pub banned: bool,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The root farm aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Coin balance.
    pub coins: Decimal,
    /// Inventory quantities.
    #[serde(default)]
    pub inventory: BTreeMap<ItemName, Decimal>,
    /// Owned wearables.
    #[serde(default)]
    pub wardrobe: BTreeMap<WearableName, u32>,
    /// The player character, absent on brand new accounts.
    #[serde(default)]
    pub bumpkin: Option<Bumpkin>,
    /// Number of land tiles owned.
    pub expansions: u32,
    /// Crop plots.
    #[serde(default)]
    pub crops: Table<CropPlot>,
    /// Fruit patches.
    #[serde(default)]
    pub fruit_patches: Table<FruitPatch>,
    /// Flower beds.
    #[serde(default)]
    pub flower_beds: Table<FlowerBed>,
    /// Stone, iron, gold, and crimstone rocks.
    #[serde(default)]
    pub rocks: Table<Rock>,
    /// Buildings.
    #[serde(default)]
    pub buildings: Table<Building>,
    /// Placed collectibles.
    #[serde(default)]
    pub collectibles: Table<Collectible>,
    /// Chickens.
    #[serde(default)]
    pub chickens: Table<Chicken>,
    /// Wild mushrooms.
    #[serde(default)]
    pub mushrooms: Option<Mushrooms>,
    /// Land expansion under construction.
    #[serde(default)]
    pub expansion_construction: Option<Construction>,
    /// Crafting box production.
    #[serde(default)]
    pub crafting_box: Option<Production>,
    /// Delivery orders.
    #[serde(default)]
    pub delivery: Delivery,
    /// Market sell quotes.
    #[serde(default)]
    pub market: BTreeMap<ItemName, MarketQuote>,
    /// Withdrawals awaiting settlement.
    #[serde(default)]
    pub settlement: Settlement,
    /// Multi-hit rock strike in progress.
    #[serde(default)]
    pub strike: Option<StrikeCursor>,
    /// Engine bookkeeping.
    #[serde(default)]
    pub bookkeeping: Bookkeeping,
}

impl GameState {
    /// Inventory quantity of an item, zero when absent.
    pub fn balance(&self, item: impl Into<ItemName>) -> Decimal {
        self.inventory
            .get(&item.into())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether a collectible of this type is placed on the island.
    pub fn is_collectible_placed(&self, name: CollectibleName) -> bool {
        self.collectibles.values().any(|c| c.name == name)
    }

    /// Number of buildings of this type, finished or not.
    pub fn building_count(&self, name: BuildingName) -> usize {
        self.buildings.values().filter(|b| b.name == name).count()
    }

    /// Whether any withdrawal awaits external settlement.
    pub fn is_pending_settlement(&self) -> bool {
        !self.settlement.pending.is_empty()
    }

    /// Whether the bumpkin has a skill.
    pub fn has_skill(&self, skill: SkillName) -> bool {
        self.bumpkin
            .as_ref()
            .is_some_and(|b| b.skills.contains(&skill))
    }

    /// Whether the bumpkin wears a wearable.
    pub fn is_wearing(&self, wearable: WearableName) -> bool {
        self.bumpkin.as_ref().is_some_and(|b| b.is_wearing(wearable))
    }
}
