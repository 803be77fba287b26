//! Enumeration types for the Homestead farm.
//!
//! [`ItemName`] is the flat namespace of everything that can sit in a farm's
//! inventory. The narrower enums ([`CropName`], [`FruitName`], [`ToolName`], ...)
//! are typed subsets of it: each of their variants names the same item, and a
//! `From` conversion lifts them into [`ItemName`] so inventory bookkeeping
//! never needs a string.
//!
//! Serialized names are the player-facing display names (`"Sunflower Seed"`,
//! `"Stone Pickaxe"`), which is what persisted farms and action payloads use.

use serde::{Deserialize, Serialize};

/// Generates a display-named enum with `ALL`, `label()` and `Display`.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[doc = concat!("`", $label, "`")]
                #[serde(rename = $label)]
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Player-facing display name.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Look up a variant by its display name.
            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.label() == label)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

/// Generates a typed subset of [`ItemName`] plus its lifting conversion.
macro_rules! item_subset {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        named_enum! {
            $(#[$meta])*
            $name { $( $variant => $label ),+ }
        }

        impl From<$name> for ItemName {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant),+
                }
            }
        }

        impl TryFrom<ItemName> for $name {
            type Error = ItemName;

            fn try_from(item: ItemName) -> Result<Self, Self::Error> {
                match item {
                    $(ItemName::$variant => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Inventory items
// ---------------------------------------------------------------------------

named_enum! {
    /// Anything that can be held in a farm inventory.
    ItemName {
        // --- Crops ---
        Sunflower => "Sunflower",
        Potato => "Potato",
        Pumpkin => "Pumpkin",
        Carrot => "Carrot",
        Cabbage => "Cabbage",
        Beetroot => "Beetroot",
        Cauliflower => "Cauliflower",
        Parsnip => "Parsnip",
        Radish => "Radish",
        Wheat => "Wheat",
        Kale => "Kale",

        // --- Crop seeds ---
        SunflowerSeed => "Sunflower Seed",
        PotatoSeed => "Potato Seed",
        PumpkinSeed => "Pumpkin Seed",
        CarrotSeed => "Carrot Seed",
        CabbageSeed => "Cabbage Seed",
        BeetrootSeed => "Beetroot Seed",
        CauliflowerSeed => "Cauliflower Seed",
        ParsnipSeed => "Parsnip Seed",
        RadishSeed => "Radish Seed",
        WheatSeed => "Wheat Seed",
        KaleSeed => "Kale Seed",

        // --- Fruits ---
        Apple => "Apple",
        Blueberry => "Blueberry",
        Orange => "Orange",
        Banana => "Banana",

        // --- Fruit seeds ---
        AppleSeed => "Apple Seed",
        BlueberrySeed => "Blueberry Seed",
        OrangeSeed => "Orange Seed",
        BananaPlant => "Banana Plant",

        // --- Flowers ---
        RedPansy => "Red Pansy",
        YellowPansy => "Yellow Pansy",
        PurpleCosmos => "Purple Cosmos",

        // --- Flower seeds ---
        SunpetalSeed => "Sunpetal Seed",
        BloomSeed => "Bloom Seed",
        LilySeed => "Lily Seed",

        // --- Resources ---
        Wood => "Wood",
        Stone => "Stone",
        Iron => "Iron",
        Gold => "Gold",
        Crimstone => "Crimstone",
        Egg => "Egg",
        WildMushroom => "Wild Mushroom",
        Gem => "Gem",

        // --- Tools ---
        Axe => "Axe",
        Pickaxe => "Pickaxe",
        StonePickaxe => "Stone Pickaxe",
        IronPickaxe => "Iron Pickaxe",
        GoldPickaxe => "Gold Pickaxe",
        RustyShovel => "Rusty Shovel",

        // --- Fertilisers ---
        SproutMix => "Sprout Mix",
        FruitfulBlend => "Fruitful Blend",
        RapidRoot => "Rapid Root",

        // --- Food ---
        MashedPotato => "Mashed Potato",
        PumpkinSoup => "Pumpkin Soup",
        BumpkinBroth => "Bumpkin Broth",
        BoiledEggs => "Boiled Eggs",
        SunflowerCrunch => "Sunflower Crunch",
        FruitSalad => "Fruit Salad",

        // --- Placeables ---
        CropPlot => "Crop Plot",
        Chicken => "Chicken",

        // --- Collectibles ---
        LadyBug => "Lady Bug",
        BlackBearry => "Black Bearry",
        SquirrelMonkey => "Squirrel Monkey",
        Nana => "Nana",
        Nancy => "Nancy",
        Scarecrow => "Scarecrow",
        RockyTheMole => "Rocky the Mole",
        Nugget => "Nugget",
        FatChicken => "Fat Chicken",
        BasicBear => "Basic Bear",
    }
}

item_subset! {
    /// A crop grown on a crop plot.
    CropName {
        Sunflower => "Sunflower",
        Potato => "Potato",
        Pumpkin => "Pumpkin",
        Carrot => "Carrot",
        Cabbage => "Cabbage",
        Beetroot => "Beetroot",
        Cauliflower => "Cauliflower",
        Parsnip => "Parsnip",
        Radish => "Radish",
        Wheat => "Wheat",
        Kale => "Kale",
    }
}

item_subset! {
    /// A seed that grows into a [`CropName`].
    CropSeedName {
        SunflowerSeed => "Sunflower Seed",
        PotatoSeed => "Potato Seed",
        PumpkinSeed => "Pumpkin Seed",
        CarrotSeed => "Carrot Seed",
        CabbageSeed => "Cabbage Seed",
        BeetrootSeed => "Beetroot Seed",
        CauliflowerSeed => "Cauliflower Seed",
        ParsnipSeed => "Parsnip Seed",
        RadishSeed => "Radish Seed",
        WheatSeed => "Wheat Seed",
        KaleSeed => "Kale Seed",
    }
}

item_subset! {
    /// A fruit harvested from a fruit patch.
    FruitName {
        Apple => "Apple",
        Blueberry => "Blueberry",
        Orange => "Orange",
        Banana => "Banana",
    }
}

item_subset! {
    /// A seed planted in a fruit patch.
    FruitSeedName {
        AppleSeed => "Apple Seed",
        BlueberrySeed => "Blueberry Seed",
        OrangeSeed => "Orange Seed",
        BananaPlant => "Banana Plant",
    }
}

item_subset! {
    /// A flower grown in a flower bed.
    FlowerName {
        RedPansy => "Red Pansy",
        YellowPansy => "Yellow Pansy",
        PurpleCosmos => "Purple Cosmos",
    }
}

item_subset! {
    /// A seed planted in a flower bed.
    FlowerSeedName {
        SunpetalSeed => "Sunpetal Seed",
        BloomSeed => "Bloom Seed",
        LilySeed => "Lily Seed",
    }
}

item_subset! {
    /// A mineral yielded by a rock node.
    MineralName {
        Stone => "Stone",
        Iron => "Iron",
        Gold => "Gold",
        Crimstone => "Crimstone",
    }
}

item_subset! {
    /// A craftable tool consumed by gathering actions.
    ToolName {
        Axe => "Axe",
        Pickaxe => "Pickaxe",
        StonePickaxe => "Stone Pickaxe",
        IronPickaxe => "Iron Pickaxe",
        GoldPickaxe => "Gold Pickaxe",
        RustyShovel => "Rusty Shovel",
    }
}

item_subset! {
    /// A fertiliser produced by composters.
    CompostName {
        SproutMix => "Sprout Mix",
        FruitfulBlend => "Fruitful Blend",
        RapidRoot => "Rapid Root",
    }
}

item_subset! {
    /// A cooked food that can be fed to the bumpkin.
    FoodName {
        MashedPotato => "Mashed Potato",
        PumpkinSoup => "Pumpkin Soup",
        BumpkinBroth => "Bumpkin Broth",
        BoiledEggs => "Boiled Eggs",
        SunflowerCrunch => "Sunflower Crunch",
        FruitSalad => "Fruit Salad",
    }
}

item_subset! {
    /// A decoration that can be placed on the island and may grant boosts.
    CollectibleName {
        LadyBug => "Lady Bug",
        BlackBearry => "Black Bearry",
        SquirrelMonkey => "Squirrel Monkey",
        Nana => "Nana",
        Nancy => "Nancy",
        Scarecrow => "Scarecrow",
        RockyTheMole => "Rocky the Mole",
        Nugget => "Nugget",
        FatChicken => "Fat Chicken",
        BasicBear => "Basic Bear",
    }
}

// ---------------------------------------------------------------------------
// Non-inventory names
// ---------------------------------------------------------------------------

named_enum! {
    /// A building that can be constructed on the island.
    BuildingName {
        FirePit => "Fire Pit",
        Kitchen => "Kitchen",
        HenHouse => "Hen House",
        WaterWell => "Water Well",
        CompostBin => "Compost Bin",
        TurboComposter => "Turbo Composter",
        AdvancedComposter => "Advanced Composter",
        Workbench => "Workbench",
    }
}

named_enum! {
    /// A wearable owned in the wardrobe and equipped on the bumpkin.
    WearableName {
        FruitPickerApron => "Fruit Picker Apron",
        BananaAmulet => "Banana Amulet",
        BananaOnesie => "Banana Onesie",
        SunflowerAmulet => "Sunflower Amulet",
        MinerHat => "Miner Hat",
        FarmerPants => "Farmer Pants",
        RedFarmerShirt => "Red Farmer Shirt",
        FarmerPitchfork => "Farmer Pitchfork",
    }
}

/// Body slot a wearable occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WearableSlot {
    /// Head.
    Hat,
    /// Torso.
    Shirt,
    /// Legs.
    Pants,
    /// Over the shirt.
    Coat,
    /// Around the neck.
    Necklace,
    /// Full-body costume.
    Onesie,
    /// Held in hand.
    Tool,
}

named_enum! {
    /// A skill the bumpkin can learn with skill points.
    SkillName {
        GreenThumb => "Green Thumb",
        Orchardist => "Orchardist",
        Prospector => "Prospector",
        Chef => "Chef",
        EggCellent => "Egg-cellent",
    }
}

named_enum! {
    /// A milestone that can be claimed once its requirements are met.
    AchievementName {
        BusyBumpkin => "Busy Bumpkin",
        AppleOfMyEye => "Apple of my Eye",
        RockSolid => "Rock Solid",
        FarmHand => "Farm Hand",
    }
}

/// Kind of placeable entity, used by generic move/remove actions and by the
/// collision detector to name what an overlap hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementKind {
    /// A crop plot.
    Plot,
    /// A fruit patch.
    FruitPatch,
    /// A flower bed.
    FlowerBed,
    /// A mineral rock.
    Rock,
    /// A building.
    Building,
    /// A collectible decoration.
    Collectible,
    /// A chicken.
    Chicken,
}

impl core::fmt::Display for PlacementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Plot => "plot",
            Self::FruitPatch => "fruit patch",
            Self::FlowerBed => "flower bed",
            Self::Rock => "rock",
            Self::Building => "building",
            Self::Collectible => "collectible",
            Self::Chicken => "chicken",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn items_serialize_by_display_name() {
        let json = serde_json::to_string(&ItemName::SunflowerSeed).unwrap();
        assert_eq!(json, "\"Sunflower Seed\"");
        let back: ItemName = serde_json::from_str("\"Stone Pickaxe\"").unwrap();
        assert_eq!(back, ItemName::StonePickaxe);
    }

    #[test]
    fn subsets_lift_into_items() {
        assert_eq!(ItemName::from(CropName::Kale), ItemName::Kale);
        assert_eq!(ItemName::from(ToolName::GoldPickaxe), ItemName::GoldPickaxe);
        assert_eq!(ItemName::from(CollectibleName::RockyTheMole), ItemName::RockyTheMole);
    }

    #[test]
    fn items_narrow_into_subsets() {
        assert_eq!(CropSeedName::try_from(ItemName::KaleSeed), Ok(CropSeedName::KaleSeed));
        assert_eq!(CropSeedName::try_from(ItemName::Kale), Err(ItemName::Kale));
    }

    #[test]
    fn subset_labels_match_item_labels() {
        for crop in CropName::ALL {
            assert_eq!(crop.label(), ItemName::from(*crop).label());
        }
        for tool in ToolName::ALL {
            assert_eq!(tool.label(), ItemName::from(*tool).label());
        }
    }

    #[test]
    fn from_label_finds_variant() {
        assert_eq!(ItemName::from_label("Wild Mushroom"), Some(ItemName::WildMushroom));
        assert_eq!(ItemName::from_label("Unobtainium"), None);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let parsed: Result<ItemName, _> = serde_json::from_str("\"Unobtainium\"");
        assert!(parsed.is_err());
    }
}
