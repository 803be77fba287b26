//! Game-rule data: growth times, prices, recipes, and building costs.
//!
//! Every lookup is a total function over a typed name, so a catalogue entry
//! cannot be missing for a name that exists. Lookups keyed by the flat
//! [`ItemName`] (shop and crafting) return `Option` because most items are
//! not sold or crafted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use homestead_types::{
    AchievementName, BuildingName, CollectibleName, CompostName, CropName, CropSeedName,
    Dimensions, FlowerName, FlowerSeedName, FoodName, FruitName, FruitSeedName, ItemName,
    MineralName, PlacementKind, Reward, SECOND_MS, ToolName, WearableName, WearableSlot,
};

use crate::requirements::RequirementSet;

const fn seconds(s: u64) -> u64 {
    s.saturating_mul(SECOND_MS)
}

fn items<const N: usize>(entries: [(ItemName, i64); N]) -> BTreeMap<ItemName, Decimal> {
    entries
        .into_iter()
        .map(|(item, amount)| (item, Decimal::from(amount)))
        .collect()
}

// ---------------------------------------------------------------------------
// Crops
// ---------------------------------------------------------------------------

/// A crop's growing and trading rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropDef {
    /// The crop.
    pub name: CropName,
    /// Seed that grows it.
    pub seed: CropSeedName,
    /// Base growth time.
    pub harvest_ms: u64,
    /// Coins per seed at the shop.
    pub seed_price: Decimal,
    /// Coins paid per crop sold.
    pub sell_price: Decimal,
    /// Bumpkin level needed to plant or buy.
    pub level: u32,
}

/// Rules for a crop.
pub fn crop(name: CropName) -> CropDef {
    use CropName as C;
    use CropSeedName as S;
    let (seed, secs, seed_price, sell_price, level) = match name {
        C::Sunflower => (S::SunflowerSeed, 60, Decimal::new(1, 2), Decimal::new(2, 2), 1),
        C::Potato => (S::PotatoSeed, 300, Decimal::new(1, 1), Decimal::new(14, 2), 1),
        C::Pumpkin => (S::PumpkinSeed, 1_800, Decimal::new(2, 1), Decimal::new(4, 1), 2),
        C::Carrot => (S::CarrotSeed, 3_600, Decimal::new(5, 1), Decimal::new(8, 1), 2),
        C::Cabbage => (S::CabbageSeed, 7_200, Decimal::ONE, Decimal::new(15, 1), 3),
        C::Beetroot => (S::BeetrootSeed, 14_400, Decimal::TWO, Decimal::new(28, 1), 3),
        C::Cauliflower => (S::CauliflowerSeed, 28_800, Decimal::from(3), Decimal::new(425, 2), 4),
        C::Parsnip => (S::ParsnipSeed, 43_200, Decimal::from(5), Decimal::new(65, 1), 4),
        C::Radish => (S::RadishSeed, 86_400, Decimal::from(7), Decimal::new(95, 1), 5),
        C::Wheat => (S::WheatSeed, 86_400, Decimal::from(5), Decimal::from(7), 5),
        C::Kale => (S::KaleSeed, 129_600, Decimal::from(7), Decimal::TEN, 7),
    };
    CropDef {
        name,
        seed,
        harvest_ms: seconds(secs),
        seed_price,
        sell_price,
        level,
    }
}

/// The crop a seed grows into.
pub fn crop_for_seed(seed: CropSeedName) -> CropName {
    CropName::ALL
        .iter()
        .copied()
        .find(|c| crop(*c).seed == seed)
        .unwrap_or(CropName::Sunflower)
}

// ---------------------------------------------------------------------------
// Fruit
// ---------------------------------------------------------------------------

/// Harvests a fruit seed yields before the tree must be chopped.
pub const FRUIT_HARVESTS: u32 = 3;

/// A fruit's growing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruitDef {
    /// The fruit.
    pub name: FruitName,
    /// Seed that grows it.
    pub seed: FruitSeedName,
    /// Base time between harvests.
    pub replenish_ms: u64,
    /// Coins per seed at the shop.
    pub seed_price: Decimal,
    /// Bumpkin level needed to plant or buy.
    pub level: u32,
}

/// Rules for a fruit.
pub fn fruit(name: FruitName) -> FruitDef {
    let (seed, secs, price, level) = match name {
        FruitName::Blueberry => (FruitSeedName::BlueberrySeed, 6 * 3_600, 30, 12),
        FruitName::Orange => (FruitSeedName::OrangeSeed, 8 * 3_600, 50, 13),
        FruitName::Apple => (FruitSeedName::AppleSeed, 12 * 3_600, 70, 14),
        FruitName::Banana => (FruitSeedName::BananaPlant, 12 * 3_600, 70, 16),
    };
    FruitDef {
        name,
        seed,
        replenish_ms: seconds(secs),
        seed_price: Decimal::from(price),
        level,
    }
}

/// The fruit a seed grows into.
pub fn fruit_for_seed(seed: FruitSeedName) -> FruitName {
    match seed {
        FruitSeedName::AppleSeed => FruitName::Apple,
        FruitSeedName::BlueberrySeed => FruitName::Blueberry,
        FruitSeedName::OrangeSeed => FruitName::Orange,
        FruitSeedName::BananaPlant => FruitName::Banana,
    }
}

// ---------------------------------------------------------------------------
// Flowers
// ---------------------------------------------------------------------------

/// A flower seed's growing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowerDef {
    /// The seed.
    pub seed: FlowerSeedName,
    /// Flower it grows into.
    pub name: FlowerName,
    /// Base growth time.
    pub grow_ms: u64,
    /// Coins per seed at the shop.
    pub seed_price: Decimal,
    /// Bumpkin level needed to plant or buy.
    pub level: u32,
}

/// Rules for a flower seed.
pub fn flower_seed(seed: FlowerSeedName) -> FlowerDef {
    let (name, days, price, level): (FlowerName, u64, i64, u32) = match seed {
        FlowerSeedName::SunpetalSeed => (FlowerName::RedPansy, 1, 16, 6),
        FlowerSeedName::BloomSeed => (FlowerName::YellowPansy, 2, 32, 8),
        FlowerSeedName::LilySeed => (FlowerName::PurpleCosmos, 5, 48, 10),
    };
    FlowerDef {
        seed,
        name,
        grow_ms: seconds(days.saturating_mul(86_400)),
        seed_price: Decimal::from(price),
        level,
    }
}

/// Base growth time of a flower, from its seed's rules.
pub fn flower_grow_ms(name: FlowerName) -> u64 {
    FlowerSeedName::ALL
        .iter()
        .map(|s| flower_seed(*s))
        .find(|def| def.name == name)
        .map_or(0, |def| def.grow_ms)
}

// ---------------------------------------------------------------------------
// Minerals
// ---------------------------------------------------------------------------

/// A rock's mining rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineralDef {
    /// The mineral.
    pub name: MineralName,
    /// Tool consumed by the final strike.
    pub tool: ToolName,
    /// Strikes needed before the rock yields.
    pub strikes: u32,
    /// Base recovery time after mining.
    pub recovery_ms: u64,
}

/// Rules for a mineral.
pub const fn mineral(name: MineralName) -> MineralDef {
    let (tool, strikes, hours): (ToolName, u32, u64) = match name {
        MineralName::Stone => (ToolName::Pickaxe, 3, 4),
        MineralName::Iron => (ToolName::StonePickaxe, 3, 8),
        MineralName::Gold => (ToolName::IronPickaxe, 3, 24),
        MineralName::Crimstone => (ToolName::GoldPickaxe, 5, 24),
    };
    MineralDef {
        name,
        tool,
        strikes,
        recovery_ms: seconds(hours.saturating_mul(3_600)),
    }
}

// ---------------------------------------------------------------------------
// Chickens and mushrooms
// ---------------------------------------------------------------------------

/// Time from feeding until an egg can be collected.
pub const EGG_LAY_MS: u64 = seconds(2 * 86_400);

/// Wheat eaten per feeding, before boosts.
pub const CHICKEN_FEED: Decimal = Decimal::ONE;

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Cost of one tool at the workbench.
pub fn tool_cost(tool: ToolName) -> RequirementSet {
    let (coins, ingredients) = match tool {
        ToolName::Axe => (20, items([])),
        ToolName::Pickaxe => (20, items([(ItemName::Wood, 3)])),
        ToolName::StonePickaxe => (20, items([(ItemName::Wood, 3), (ItemName::Stone, 5)])),
        ToolName::IronPickaxe => (80, items([(ItemName::Wood, 3), (ItemName::Iron, 5)])),
        ToolName::GoldPickaxe => (100, items([(ItemName::Wood, 3), (ItemName::Gold, 3)])),
        ToolName::RustyShovel => (10, items([])),
    };
    RequirementSet {
        coins: Decimal::from(coins),
        items: ingredients,
        ..RequirementSet::default()
    }
}

// ---------------------------------------------------------------------------
// Placement sizes
// ---------------------------------------------------------------------------

/// Size of a plot, patch, bed, rock, or chicken.
pub const fn resource_dimensions(kind: PlacementKind) -> Dimensions {
    match kind {
        PlacementKind::Plot | PlacementKind::Chicken => Dimensions::new(1, 1),
        PlacementKind::FlowerBed => Dimensions::new(3, 1),
        PlacementKind::FruitPatch
        | PlacementKind::Rock
        | PlacementKind::Building
        | PlacementKind::Collectible => Dimensions::new(2, 2),
    }
}

/// Size of a collectible.
pub const fn collectible_dimensions(name: CollectibleName) -> Dimensions {
    match name {
        CollectibleName::SquirrelMonkey
        | CollectibleName::Scarecrow
        | CollectibleName::RockyTheMole
        | CollectibleName::Nugget => Dimensions::new(2, 2),
        CollectibleName::LadyBug
        | CollectibleName::BlackBearry
        | CollectibleName::Nana
        | CollectibleName::Nancy
        | CollectibleName::FatChicken
        | CollectibleName::BasicBear => Dimensions::new(1, 1),
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Construction rules for a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingDef {
    /// The building.
    pub name: BuildingName,
    /// Footprint size.
    pub dimensions: Dimensions,
    /// Cost and level gate.
    pub requirements: RequirementSet,
    /// Construction time.
    pub construction_ms: u64,
    /// Most copies a farm may build.
    pub limit: usize,
}

/// Construction rules for a building.
pub fn building(name: BuildingName) -> BuildingDef {
    use BuildingName as B;
    let (w, h, coins, ingredients, level, secs, limit) = match name {
        B::FirePit => (3, 2, 0, items([(ItemName::Wood, 3), (ItemName::Stone, 2)]), 1, 30, 1),
        B::Workbench => (3, 2, 0, items([(ItemName::Wood, 5)]), 1, 60, 1),
        B::Kitchen => (
            4,
            3,
            10,
            items([(ItemName::Wood, 30), (ItemName::Stone, 5)]),
            5,
            30 * 60,
            1,
        ),
        B::HenHouse => (
            4,
            3,
            100,
            items([(ItemName::Wood, 30), (ItemName::Iron, 5), (ItemName::Gold, 5)]),
            6,
            2 * 3_600,
            1,
        ),
        B::WaterWell => (2, 2, 100, items([(ItemName::Wood, 5), (ItemName::Stone, 5)]), 2, 5 * 60, 4),
        B::CompostBin => (2, 2, 10, items([(ItemName::Wood, 5), (ItemName::Stone, 5)]), 3, 60, 1),
        B::TurboComposter => (
            2,
            2,
            50,
            items([(ItemName::Wood, 10), (ItemName::Iron, 5)]),
            9,
            5 * 60,
            1,
        ),
        B::AdvancedComposter => (
            2,
            2,
            200,
            items([(ItemName::Wood, 20), (ItemName::Gold, 5)]),
            12,
            10 * 60,
            1,
        ),
    };
    BuildingDef {
        name,
        dimensions: Dimensions::new(w, h),
        requirements: RequirementSet {
            coins: Decimal::from(coins),
            items: ingredients,
            bumpkin_level: Some(level),
            ..RequirementSet::default()
        },
        construction_ms: seconds(secs),
        limit,
    }
}

// ---------------------------------------------------------------------------
// Cooking
// ---------------------------------------------------------------------------

/// A cooking recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDef {
    /// The food.
    pub food: FoodName,
    /// Building that cooks it.
    pub building: BuildingName,
    /// Ingredients consumed.
    pub ingredients: BTreeMap<ItemName, Decimal>,
    /// Base cooking time.
    pub cooking_ms: u64,
    /// Experience gained per food eaten.
    pub experience: Decimal,
}

/// Recipe for a food.
pub fn recipe(food: FoodName) -> RecipeDef {
    use FoodName as F;
    let (building, ingredients, secs, xp) = match food {
        F::MashedPotato => (BuildingName::FirePit, items([(ItemName::Potato, 8)]), 30, 3),
        F::PumpkinSoup => (BuildingName::FirePit, items([(ItemName::Pumpkin, 10)]), 3 * 60, 24),
        F::BumpkinBroth => (
            BuildingName::FirePit,
            items([(ItemName::Carrot, 10), (ItemName::Cabbage, 5)]),
            20 * 60,
            96,
        ),
        F::BoiledEggs => (BuildingName::FirePit, items([(ItemName::Egg, 1)]), 60 * 60, 90),
        F::SunflowerCrunch => (
            BuildingName::Kitchen,
            items([(ItemName::Sunflower, 300)]),
            10 * 60,
            50,
        ),
        F::FruitSalad => (
            BuildingName::Kitchen,
            items([
                (ItemName::Apple, 1),
                (ItemName::Orange, 1),
                (ItemName::Blueberry, 1),
            ]),
            30 * 60,
            225,
        ),
    };
    RecipeDef {
        food,
        building,
        ingredients,
        cooking_ms: seconds(secs),
        experience: Decimal::from(xp),
    }
}

// ---------------------------------------------------------------------------
// Composting
// ---------------------------------------------------------------------------

/// Time an accelerator removes from a running composter.
pub const COMPOST_ACCELERATION_MS: u64 = seconds(3_600);

/// A composter's production rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposterDef {
    /// Composter building.
    pub building: BuildingName,
    /// Fertiliser produced.
    pub produces: CompostName,
    /// Fertiliser produced per run.
    pub amount: Decimal,
    /// Inputs consumed per run.
    pub inputs: BTreeMap<ItemName, Decimal>,
    /// Time per run.
    pub production_ms: u64,
    /// Eggs consumed to accelerate.
    pub accelerator_eggs: Decimal,
}

/// Composter rules for a building, `None` if it is not a composter.
pub fn composter(building: BuildingName) -> Option<ComposterDef> {
    let (produces, amount, inputs, hours, eggs): (CompostName, i64, BTreeMap<ItemName, Decimal>, u64, i64) =
        match building {
        BuildingName::CompostBin => (
            CompostName::SproutMix,
            10,
            items([(ItemName::Sunflower, 5), (ItemName::Potato, 2)]),
            6,
            5,
        ),
        BuildingName::TurboComposter => (
            CompostName::FruitfulBlend,
            3,
            items([(ItemName::Orange, 2), (ItemName::Blueberry, 2)]),
            8,
            5,
        ),
        BuildingName::AdvancedComposter => (
            CompostName::RapidRoot,
            10,
            items([(ItemName::Kale, 2), (ItemName::Apple, 2)]),
            12,
            10,
        ),
        _ => return None,
    };
    Some(ComposterDef {
        building,
        produces,
        amount: Decimal::from(amount),
        inputs,
        production_ms: seconds(hours.saturating_mul(3_600)),
        accelerator_eggs: Decimal::from(eggs),
    })
}

/// Radius, in cells from the composter footprint, within which plots and
/// patches are locked while an Advanced Composter is producing.
pub const COMPOSTER_LOCK_RADIUS: i32 = 2;

// ---------------------------------------------------------------------------
// Crafting box
// ---------------------------------------------------------------------------

/// A crafting box recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftDef {
    /// Item produced.
    pub item: ItemName,
    /// Coins and ingredients charged.
    pub cost: RequirementSet,
    /// Crafting time.
    pub crafting_ms: u64,
}

/// Crafting box recipe for an item, `None` if it cannot be crafted.
pub fn craftable(item: ItemName) -> Option<CraftDef> {
    let (coins, ingredients, secs) = match item {
        ItemName::BasicBear => (0, items([(ItemName::Wood, 10)]), 3_600),
        ItemName::BlackBearry => (
            0,
            items([(ItemName::BasicBear, 1), (ItemName::Blueberry, 10)]),
            2 * 3_600,
        ),
        ItemName::Scarecrow => (
            50,
            items([(ItemName::Wood, 20), (ItemName::Wheat, 10)]),
            4 * 3_600,
        ),
        _ => return None,
    };
    Some(CraftDef {
        item,
        cost: RequirementSet {
            coins: Decimal::from(coins),
            items: ingredients,
            ..RequirementSet::default()
        },
        crafting_ms: seconds(secs),
    })
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

/// Price and level gate of a seed sold at the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOffer {
    /// Coins per seed.
    pub price: Decimal,
    /// Bumpkin level needed to buy.
    pub level: u32,
}

/// Shop offer for an item, `None` if the shop does not sell it.
pub fn seed_offer(item: ItemName) -> Option<SeedOffer> {
    if let Ok(seed) = CropSeedName::try_from(item) {
        let def = crop(crop_for_seed(seed));
        return Some(SeedOffer {
            price: def.seed_price,
            level: def.level,
        });
    }
    if let Ok(seed) = FruitSeedName::try_from(item) {
        let def = fruit(fruit_for_seed(seed));
        return Some(SeedOffer {
            price: def.seed_price,
            level: def.level,
        });
    }
    if let Ok(seed) = FlowerSeedName::try_from(item) {
        let def = flower_seed(seed);
        return Some(SeedOffer {
            price: def.seed_price,
            level: def.level,
        });
    }
    None
}

/// How long a market quote stays valid.
pub const MARKET_QUOTE_TTL_MS: u64 = seconds(5 * 60);

// ---------------------------------------------------------------------------
// Land expansion
// ---------------------------------------------------------------------------

/// Requirements and construction time to grow from `expansions` to
/// `expansions + 1` tiles, `None` when no more land is available.
pub fn expansion(expansions: u32) -> Option<(RequirementSet, u64)> {
    use ItemName::{Gold, Iron, Stone, Wood};
    let (coins, ingredients, level, secs) = match expansions {
        3 => (0, items([(Wood, 3)]), 1, 5),
        4 => (0, items([(Wood, 5)]), 2, 60),
        5 => (0, items([(Wood, 5), (Stone, 1)]), 3, 5 * 60),
        6 => (10, items([(Wood, 10), (Stone, 3)]), 4, 3_600),
        7 => (25, items([(Wood, 20), (Stone, 5), (Iron, 1)]), 5, 4 * 3_600),
        8 => (50, items([(Wood, 30), (Stone, 10), (Iron, 3)]), 7, 8 * 3_600),
        9 => (
            100,
            items([(Wood, 50), (Stone, 15), (Iron, 5), (Gold, 1)]),
            9,
            12 * 3_600,
        ),
        10 => (
            200,
            items([(Wood, 75), (Stone, 20), (Iron, 8), (Gold, 3)]),
            11,
            24 * 3_600,
        ),
        11 => (
            400,
            items([(Wood, 100), (Stone, 30), (Iron, 10), (Gold, 5)]),
            13,
            36 * 3_600,
        ),
        _ => return None,
    };
    Some((
        RequirementSet {
            coins: Decimal::from(coins),
            items: ingredients,
            bumpkin_level: Some(level),
            ..RequirementSet::default()
        },
        seconds(secs),
    ))
}

// ---------------------------------------------------------------------------
// Achievements and wearables
// ---------------------------------------------------------------------------

/// An achievement's unlock condition and reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDef {
    /// The achievement.
    pub name: AchievementName,
    /// Conditions to claim; nothing is charged.
    pub requirements: RequirementSet,
    /// What claiming grants.
    pub reward: Reward,
}

/// Rules for an achievement.
pub fn achievement(name: AchievementName) -> AchievementDef {
    let (requirements, coins, reward_items) = match name {
        AchievementName::BusyBumpkin => (
            RequirementSet {
                bumpkin_level: Some(2),
                ..RequirementSet::default()
            },
            10,
            items([]),
        ),
        AchievementName::FarmHand => (
            RequirementSet::activity("Sunflower Harvested", Decimal::from(100)),
            5,
            items([(ItemName::PotatoSeed, 10)]),
        ),
        AchievementName::AppleOfMyEye => (
            RequirementSet::activity("Apple Harvested", Decimal::from(50)),
            20,
            items([]),
        ),
        AchievementName::RockSolid => (
            RequirementSet::activity("Stone Mined", Decimal::from(20)),
            0,
            items([(ItemName::Gem, 1)]),
        ),
    };
    AchievementDef {
        name,
        requirements,
        reward: Reward {
            coins: Decimal::from(coins),
            items: reward_items,
        },
    }
}

/// Body slot a wearable occupies.
pub const fn wearable_slot(wearable: WearableName) -> WearableSlot {
    match wearable {
        WearableName::FruitPickerApron => WearableSlot::Coat,
        WearableName::BananaAmulet | WearableName::SunflowerAmulet => WearableSlot::Necklace,
        WearableName::BananaOnesie => WearableSlot::Onesie,
        WearableName::MinerHat => WearableSlot::Hat,
        WearableName::FarmerPants => WearableSlot::Pants,
        WearableName::RedFarmerShirt => WearableSlot::Shirt,
        WearableName::FarmerPitchfork => WearableSlot::Tool,
    }
}
