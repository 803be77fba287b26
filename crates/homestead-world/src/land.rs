//! Island land and placement collision.
//!
//! The island is a union of 6x6 tiles. A farm with `expansions = n` owns the
//! first `n` tiles of a fixed spiral around the origin; every other cell is
//! water.
//!
//! Footprint geometry: a footprint anchored at `(x, y)` with size `(w, h)`
//! covers `x <= cx < x + w` and `y - h < cy <= y`. Two footprints collide when
//! those half-open ranges intersect on both axes. Touching edges do not
//! collide.

use homestead_types::{Footprint, GameState, PlacementId, PlacementKind};

/// Side length of a land tile, in cells.
pub const TILE_SIZE: i32 = 6;

/// Tile offsets in the order land is acquired.
const LAND_SPIRAL: [(i32, i32); 12] = [
    (0, 0),
    (1, 0),
    (0, -1),
    (1, -1),
    (-1, 0),
    (-1, -1),
    (0, 1),
    (1, 1),
    (-1, 1),
    (2, 1),
    (2, 0),
    (2, -1),
];

/// Most tiles a farm can own.
pub const MAX_EXPANSIONS: u32 = 12;

/// What a proposed footprint collides with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// At least one cell lies outside owned land.
    Water,
    /// Overlaps an existing placement.
    Placement {
        /// Table the placement lives in.
        kind: PlacementKind,
        /// Its id.
        id: PlacementId,
    },
}

/// Cell bounds of a land tile as `(min_x, max_x, min_y, max_y)`, inclusive.
const fn tile_bounds(tile: (i32, i32)) -> (i32, i32, i32, i32) {
    let min_x = tile.0.saturating_mul(TILE_SIZE).saturating_sub(TILE_SIZE / 2);
    let min_y = tile.1.saturating_mul(TILE_SIZE).saturating_sub(TILE_SIZE / 2);
    (
        min_x,
        min_x.saturating_add(TILE_SIZE - 1),
        min_y,
        min_y.saturating_add(TILE_SIZE - 1),
    )
}

/// Whether cell `(x, y)` is on land owned with `expansions` tiles.
pub fn is_cell_on_land(x: i32, y: i32, expansions: u32) -> bool {
    let owned = usize::try_from(expansions.min(MAX_EXPANSIONS)).unwrap_or(0);
    LAND_SPIRAL.iter().take(owned).any(|tile| {
        let (min_x, max_x, min_y, max_y) = tile_bounds(*tile);
        (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)
    })
}

/// Every cell of a footprint.
fn cells(footprint: &Footprint) -> impl Iterator<Item = (i32, i32)> {
    let width = i32::try_from(footprint.width).unwrap_or(i32::MAX);
    let height = i32::try_from(footprint.height).unwrap_or(i32::MAX);
    let x0 = footprint.x;
    let y0 = footprint.y;
    (0..width).flat_map(move |dx| {
        (0..height).map(move |dy| (x0.saturating_add(dx), y0.saturating_sub(dy)))
    })
}

/// Whether every cell of `footprint` is on owned land.
pub fn is_on_land(footprint: &Footprint, expansions: u32) -> bool {
    cells(footprint).all(|(x, y)| is_cell_on_land(x, y, expansions))
}

fn extent(start: i32, len: u32) -> i64 {
    i64::from(start).saturating_add(i64::from(len))
}

/// Whether two footprints share a cell.
pub fn overlaps(a: &Footprint, b: &Footprint) -> bool {
    if a.width == 0 || a.height == 0 || b.width == 0 || b.height == 0 {
        return false;
    }
    let (ax, bx) = (i64::from(a.x), i64::from(b.x));
    let x_overlap = ax < extent(b.x, b.width) && bx < extent(a.x, a.width);

    // Rows run downward from the anchor: (y - h, y].
    let (ay, by) = (i64::from(a.y), i64::from(b.y));
    let a_bottom = ay.saturating_sub(i64::from(a.height));
    let b_bottom = by.saturating_sub(i64::from(b.height));
    let y_overlap = a_bottom < by && b_bottom < ay;

    x_overlap && y_overlap
}

/// Every placement footprint on the farm, tagged with its table and id.
pub fn placements(state: &GameState) -> Vec<(PlacementKind, &PlacementId, Footprint)> {
    let mut all = Vec::new();
    all.extend(
        state
            .crops
            .iter()
            .map(|(id, p)| (PlacementKind::Plot, id, p.footprint)),
    );
    all.extend(
        state
            .fruit_patches
            .iter()
            .map(|(id, p)| (PlacementKind::FruitPatch, id, p.footprint)),
    );
    all.extend(
        state
            .flower_beds
            .iter()
            .map(|(id, p)| (PlacementKind::FlowerBed, id, p.footprint)),
    );
    all.extend(
        state
            .rocks
            .iter()
            .map(|(id, p)| (PlacementKind::Rock, id, p.footprint)),
    );
    all.extend(
        state
            .buildings
            .iter()
            .map(|(id, p)| (PlacementKind::Building, id, p.footprint)),
    );
    all.extend(
        state
            .collectibles
            .iter()
            .map(|(id, p)| (PlacementKind::Collectible, id, p.footprint)),
    );
    all.extend(
        state
            .chickens
            .iter()
            .map(|(id, p)| (PlacementKind::Chicken, id, p.footprint)),
    );
    all
}

/// First collision of `footprint` with water or another placement.
///
/// `ignore` names the placement being moved so it does not collide with its
/// own old position.
pub fn detect_collision(
    state: &GameState,
    footprint: &Footprint,
    ignore: Option<(PlacementKind, &PlacementId)>,
) -> Option<Collision> {
    if !is_on_land(footprint, state.expansions) {
        return Some(Collision::Water);
    }
    placements(state)
        .into_iter()
        .filter(|(kind, id, _)| ignore != Some((*kind, *id)))
        .find(|(_, _, other)| overlaps(footprint, other))
        .map(|(kind, id, _)| Collision::Placement {
            kind,
            id: id.clone(),
        })
}

/// Every pair of overlapping placements, for the post-transition audit.
pub fn overlapping_pairs(state: &GameState) -> Vec<(PlacementId, PlacementId)> {
    let all = placements(state);
    let mut pairs = Vec::new();
    for (i, (_, a_id, a)) in all.iter().enumerate() {
        for (_, b_id, b) in all.iter().skip(i.saturating_add(1)) {
            if overlaps(a, b) {
                pairs.push(((*a_id).clone(), (*b_id).clone()));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use homestead_types::{Coordinates, CropPlot, Dimensions};

    use super::*;

    fn fp(x: i32, y: i32, w: u32, h: u32) -> Footprint {
        Footprint::at(Coordinates::new(x, y), Dimensions::new(w, h))
    }

    #[test]
    fn overlapping_squares_collide() {
        assert!(overlaps(&fp(0, 0, 2, 2), &fp(1, -1, 2, 2)));
        assert!(overlaps(&fp(0, 0, 3, 3), &fp(1, -1, 1, 1)));
    }

    #[test]
    fn adjacent_squares_do_not_collide() {
        assert!(!overlaps(&fp(0, 0, 2, 2), &fp(2, 0, 2, 2)));
        assert!(!overlaps(&fp(0, 0, 2, 2), &fp(0, -2, 2, 2)));
        assert!(!overlaps(&fp(0, 0, 2, 2), &fp(0, 2, 2, 2)));
    }

    #[test]
    fn rows_extend_downward() {
        // (0,0) 1x2 covers rows 0 and -1; (0,-1) covers row -1 only.
        assert!(overlaps(&fp(0, 0, 1, 2), &fp(0, -1, 1, 1)));
        assert!(!overlaps(&fp(0, 0, 1, 2), &fp(0, 1, 1, 1)));
    }

    #[test]
    fn land_grows_along_spiral() {
        assert!(is_cell_on_land(0, 0, 1));
        assert!(is_cell_on_land(-3, 2, 1));
        assert!(!is_cell_on_land(3, 0, 1));
        assert!(is_cell_on_land(3, 0, 2));
        assert!(is_cell_on_land(0, -6, 3));
        assert!(!is_cell_on_land(0, -6, 2));
    }

    #[test]
    fn footprint_partly_in_water_is_off_land() {
        assert!(is_on_land(&fp(-3, 2, 6, 6), 1));
        assert!(!is_on_land(&fp(-3, 2, 7, 6), 1));
        assert!(is_on_land(&fp(-3, 2, 7, 6), 2));
    }

    #[test]
    fn detect_collision_reports_placement() {
        let mut state = GameState {
            expansions: 3,
            ..GameState::default()
        };
        state.crops.insert(
            PlacementId::from("1"),
            CropPlot {
                footprint: fp(0, 0, 1, 1),
                created_at: 0,
                crop: None,
                fertiliser: None,
            },
        );

        assert_eq!(
            detect_collision(&state, &fp(-1, 1, 2, 2), None),
            Some(Collision::Placement {
                kind: PlacementKind::Plot,
                id: PlacementId::from("1"),
            })
        );
        assert_eq!(detect_collision(&state, &fp(1, 0, 1, 1), None), None);
        assert_eq!(detect_collision(&state, &fp(40, 40, 1, 1), None), Some(Collision::Water));

        let id = PlacementId::from("1");
        assert_eq!(
            detect_collision(&state, &fp(0, 0, 1, 1), Some((PlacementKind::Plot, &id))),
            None
        );
    }

    #[test]
    fn overlapping_pairs_finds_conflicts() {
        let mut state = GameState::default();
        for (id, x) in [("1", 0), ("2", 0), ("3", 4)] {
            state.crops.insert(
                PlacementId::from(id),
                CropPlot {
                    footprint: fp(x, 0, 1, 1),
                    created_at: 0,
                    crop: None,
                    fertiliser: None,
                },
            );
        }
        assert_eq!(
            overlapping_pairs(&state),
            vec![(PlacementId::from("1"), PlacementId::from("2"))]
        );
    }
}
