//! Shared type definitions for the Homestead game state transition engine.
//!
//! This crate is the single source of truth for the farm data model and the
//! action wire format. It holds data only: every rule about how state may
//! change lives downstream in `homestead-world`, `homestead-actions`, and
//! `homestead-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for placement, order, and farm identifiers
//! - [`enums`] -- Item names and their typed subsets, buildings, wearables, skills
//! - [`table`] -- Copy-on-write placement tables
//! - [`structs`] -- [`GameState`] and the entities it owns
//! - [`actions`] -- Action payloads, [`GameAction`], [`ActionKind`], the wire envelope

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;
pub mod table;

/// Milliseconds since the Unix epoch. Every timestamp in the engine uses it.
pub type Timestamp = u64;

/// One second in [`Timestamp`] units.
pub const SECOND_MS: Timestamp = 1_000;
/// One minute in [`Timestamp`] units.
pub const MINUTE_MS: Timestamp = 60_000;
/// One hour in [`Timestamp`] units.
pub const HOUR_MS: Timestamp = 3_600_000;
/// One day in [`Timestamp`] units.
pub const DAY_MS: Timestamp = 86_400_000;

pub use actions::{
    AchievementClaimed, ActionEnvelope, ActionKind, ActionParseError, BuildingConstructed,
    BumpkinFed, ChickenFed, CollectiblePlaced, CompostAccelerated, CompostCollected,
    CompostStarted, CraftingCollected, CraftingStarted, CropHarvested, CropSold, EggCollected,
    ExpansionSpedUp, FlowerHarvested, FlowerPlanted, FruitHarvested, FruitPatchFertilised,
    FruitPlanted, FruitTreeRemoved, GameAction, ItemsWithdrawn, LandExpanded, LandRevealed,
    MarketSold, MushroomPicked, OrderDelivered, PlacementMoved, PlacementRemoved, PlotFertilised,
    PlotPlaced, ProcessSpedUp, ProcessTarget, RecipeCollected, RecipeCooked, RockStruck,
    SeedPlanted, SeedsBought, SettlementAcknowledged, SkillLearned, StaminaReplenished,
    ToolCrafted, WearableEquipped,
};
pub use enums::{
    AchievementName, BuildingName, CollectibleName, CompostName, CropName, CropSeedName,
    FlowerName, FlowerSeedName, FoodName, FruitName, FruitSeedName, ItemName, MineralName,
    PlacementKind, SkillName, ToolName, WearableName, WearableSlot,
};
pub use ids::{FarmId, OrderId, PlacementId};
pub use structs::{
    AppliedFertiliser, Bookkeeping, Building, Bumpkin, Chicken, Collectible, Construction,
    Coordinates, CropPlot, Delivery, Dimensions, FlowerBed, Footprint, FruitPatch, GameState,
    MarketQuote, Mushroom, Mushrooms, Order, PendingSettlement, PlantedCrop, PlantedFlower,
    PlantedFruit, Production, Reward, Rock, Settlement, Stamina, StrikeCursor,
};
pub use table::Table;
