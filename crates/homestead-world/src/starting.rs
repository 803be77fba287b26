//! The new-player farm.
//!
//! Three land tiles (the origin tile, the tile east of it, and the tile south
//! of it), a bumpkin at level 1 with a full stamina pool, and a handful of
//! resource placements laid out so that none overlap and all sit on land.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use homestead_types::{
    Bookkeeping, Bumpkin, Chicken, Coordinates, CropPlot, FlowerBed, Footprint, FruitPatch,
    GameState, ItemName, MineralName, PlacementId, PlacementKind, Rock, Stamina, Table,
    Timestamp,
};

use crate::catalogue::resource_dimensions;
use crate::progression::max_stamina;

/// Tiles owned by a new farm.
pub const STARTING_EXPANSIONS: u32 = 3;

/// Helper to build a footprint sized for a resource kind.
const fn footprint(kind: PlacementKind, x: i32, y: i32) -> Footprint {
    Footprint::at(Coordinates::new(x, y), resource_dimensions(kind))
}

fn rock(kind: MineralName, x: i32, y: i32, created_at: Timestamp) -> Rock {
    Rock {
        kind,
        footprint: footprint(PlacementKind::Rock, x, y),
        created_at,
        mined_at: 0,
        times_mined: 0,
    }
}

/// Build the state a brand-new farm starts from.
///
/// Every placement and the stamina clock are stamped with `created_at`, which
/// also becomes the last processed timestamp.
pub fn starting_farm(created_at: Timestamp) -> GameState {
    let crops: Table<CropPlot> = [(-2, 2), (-1, 2), (0, 2)]
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            (
                PlacementId::new(format!("plot-{}", i.saturating_add(1))),
                CropPlot {
                    footprint: footprint(PlacementKind::Plot, x, y),
                    created_at,
                    crop: None,
                    fertiliser: None,
                },
            )
        })
        .collect();

    let rocks: Table<Rock> = [
        ("stone-1", rock(MineralName::Stone, 3, 2, created_at)),
        ("stone-2", rock(MineralName::Stone, 5, 2, created_at)),
        ("iron-1", rock(MineralName::Iron, 3, -1, created_at)),
    ]
    .into_iter()
    .map(|(id, r)| (PlacementId::from(id), r))
    .collect();

    let fruit_patches: Table<FruitPatch> = [(
        PlacementId::from("patch-1"),
        FruitPatch {
            footprint: footprint(PlacementKind::FruitPatch, 1, 2),
            created_at,
            fruit: None,
            fertiliser: None,
        },
    )]
    .into_iter()
    .collect();

    let flower_beds: Table<FlowerBed> = [(
        PlacementId::from("bed-1"),
        FlowerBed {
            footprint: footprint(PlacementKind::FlowerBed, -2, 0),
            created_at,
            flower: None,
        },
    )]
    .into_iter()
    .collect();

    let chickens: Table<Chicken> = [(
        PlacementId::from("chicken-1"),
        Chicken {
            footprint: footprint(PlacementKind::Chicken, -3, -3),
            fed_at: None,
        },
    )]
    .into_iter()
    .collect();

    let inventory = [
        (ItemName::CropPlot, 4),
        (ItemName::Chicken, 1),
        (ItemName::SunflowerSeed, 10),
        (ItemName::PotatoSeed, 3),
        (ItemName::Axe, 1),
        (ItemName::Pickaxe, 3),
        (ItemName::Wood, 5),
    ]
    .into_iter()
    .map(|(item, amount)| (item, Decimal::from(amount)))
    .collect();

    GameState {
        coins: Decimal::from(20),
        inventory,
        bumpkin: Some(Bumpkin {
            experience: Decimal::ZERO,
            skills: BTreeSet::new(),
            stamina: Stamina {
                value: max_stamina(1),
                replenished_at: created_at,
            },
            equipped: BTreeMap::new(),
            activity: BTreeMap::new(),
            achievements: BTreeSet::new(),
        }),
        expansions: STARTING_EXPANSIONS,
        crops,
        fruit_patches,
        flower_beds,
        rocks,
        chickens,
        bookkeeping: Bookkeeping {
            last_processed_at: created_at,
            ..Bookkeeping::default()
        },
        ..GameState::default()
    }
}
