//! The action catalogue: dispatch and per-kind audit permissions.
//!
//! Every [`GameAction`] variant maps to exactly one [`ActionHandler`]. The
//! match in [`dispatch`] is exhaustive, so a new action kind does not compile
//! until it has a handler and a permission entry.

use homestead_ledger::Subsystem;
use homestead_ledger::Subsystem::{
    Buildings, Bumpkin, Chickens, Coins, Collectibles, CraftingBox, Crops, Delivery,
    FlowerBeds, FruitPatches, Inventory, Land, Mushrooms, Rocks, Settlement,
};
use homestead_types::{ActionKind, GameAction, GameState, Timestamp};
use homestead_world::RequirementSet;

use crate::error::GameError;
use crate::handler::ActionHandler;

/// Run `$body` with `$payload` bound to the action's payload, whatever its
/// kind.
macro_rules! with_payload {
    ($action:expr, $payload:ident => $body:expr) => {
        match $action {
            GameAction::SeedPlanted($payload) => $body,
            GameAction::CropHarvested($payload) => $body,
            GameAction::PlotFertilised($payload) => $body,
            GameAction::FruitPlanted($payload) => $body,
            GameAction::FruitHarvested($payload) => $body,
            GameAction::FruitTreeRemoved($payload) => $body,
            GameAction::FruitPatchFertilised($payload) => $body,
            GameAction::FlowerPlanted($payload) => $body,
            GameAction::FlowerHarvested($payload) => $body,
            GameAction::MushroomPicked($payload) => $body,
            GameAction::ChickenFed($payload) => $body,
            GameAction::EggCollected($payload) => $body,
            GameAction::RockStruck($payload) => $body,
            GameAction::StaminaReplenished($payload) => $body,
            GameAction::PlotPlaced($payload) => $body,
            GameAction::BuildingConstructed($payload) => $body,
            GameAction::CollectiblePlaced($payload) => $body,
            GameAction::PlacementMoved($payload) => $body,
            GameAction::PlacementRemoved($payload) => $body,
            GameAction::RecipeCooked($payload) => $body,
            GameAction::RecipeCollected($payload) => $body,
            GameAction::CompostStarted($payload) => $body,
            GameAction::CompostCollected($payload) => $body,
            GameAction::CompostAccelerated($payload) => $body,
            GameAction::CraftingStarted($payload) => $body,
            GameAction::CraftingCollected($payload) => $body,
            GameAction::ProcessSpedUp($payload) => $body,
            GameAction::BumpkinFed($payload) => $body,
            GameAction::LandExpanded($payload) => $body,
            GameAction::LandRevealed($payload) => $body,
            GameAction::ExpansionSpedUp($payload) => $body,
            GameAction::SeedsBought($payload) => $body,
            GameAction::CropSold($payload) => $body,
            GameAction::ToolCrafted($payload) => $body,
            GameAction::MarketSold($payload) => $body,
            GameAction::OrderDelivered($payload) => $body,
            GameAction::AchievementClaimed($payload) => $body,
            GameAction::SkillLearned($payload) => $body,
            GameAction::WearableEquipped($payload) => $body,
            GameAction::ItemsWithdrawn($payload) => $body,
            GameAction::SettlementAcknowledged($payload) => $body,
        }
    };
}

/// Produce the next state for `action`, leaving `state` untouched.
///
/// Every committed player action other than a rock strike ends a strike
/// sequence. A settlement acknowledgement comes from the host, not the
/// player, so it leaves the cursor alone.
pub fn dispatch(
    state: &GameState,
    action: &GameAction,
    now: Timestamp,
) -> Result<GameState, GameError> {
    let kind = action.kind();
    tracing::trace!(%kind, now, "dispatching action");

    let mut next = with_payload!(action, payload => payload.handle(state, now))?;
    if !matches!(
        kind,
        ActionKind::RockStruck | ActionKind::SettlementAcknowledged
    ) {
        next.strike = None;
    }
    Ok(next)
}

/// The requirement set `action` would be charged against `state`.
pub fn requirements_for(
    state: &GameState,
    action: &GameAction,
    now: Timestamp,
) -> Result<RequirementSet, GameError> {
    with_payload!(action, payload => payload.requirements(state, now))
}

/// Handler key of the action's payload; always equal to `action.kind()`.
pub fn handler_kind(action: &GameAction) -> ActionKind {
    fn key<H: ActionHandler>(_: &H) -> ActionKind {
        H::KIND
    }
    with_payload!(action, payload => key(payload))
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

const PLACEMENTS: &[Subsystem] = &[
    Crops,
    FruitPatches,
    FlowerBeds,
    Rocks,
    Buildings,
    Collectibles,
    Chickens,
];

const PLACEMENTS_AND_INVENTORY: &[Subsystem] = &[
    Inventory,
    Crops,
    FruitPatches,
    FlowerBeds,
    Rocks,
    Buildings,
    Collectibles,
    Chickens,
];

/// Subsystems an action of `kind` may change. The post-transition audit
/// flags any other change as an integrity violation.
pub const fn permitted_subsystems(kind: ActionKind) -> &'static [Subsystem] {
    use ActionKind as K;
    match kind {
        K::SeedPlanted | K::CropHarvested | K::PlotFertilised => &[Inventory, Crops, Bumpkin],
        K::FruitPlanted | K::FruitHarvested | K::FruitTreeRemoved | K::FruitPatchFertilised => {
            &[Inventory, FruitPatches, Bumpkin]
        }
        K::FlowerPlanted | K::FlowerHarvested => &[Inventory, FlowerBeds, Bumpkin],
        K::MushroomPicked => &[Inventory, Mushrooms, Bumpkin],
        K::ChickenFed | K::EggCollected => &[Inventory, Chickens, Bumpkin],
        K::RockStruck => &[Inventory, Rocks, Bumpkin],
        K::StaminaReplenished | K::SkillLearned | K::WearableEquipped => &[Bumpkin],
        K::PlotPlaced => &[Crops],
        K::BuildingConstructed => &[Coins, Inventory, Buildings, Bumpkin],
        K::CollectiblePlaced => &[Collectibles],
        K::PlacementMoved => PLACEMENTS,
        K::PlacementRemoved => PLACEMENTS_AND_INVENTORY,
        K::RecipeCooked | K::CompostCollected => &[Inventory, Buildings, Bumpkin],
        K::RecipeCollected | K::CompostStarted | K::CompostAccelerated => {
            &[Inventory, Buildings]
        }
        K::CraftingStarted => &[Coins, Inventory, CraftingBox],
        K::CraftingCollected => &[Inventory, CraftingBox, Bumpkin],
        K::ProcessSpedUp => &[Inventory, Buildings, CraftingBox, Bumpkin],
        K::BumpkinFed => &[Inventory, Bumpkin],
        K::LandExpanded => &[Coins, Inventory, Land],
        K::LandRevealed => &[Land, Bumpkin],
        K::ExpansionSpedUp => &[Inventory, Land, Bumpkin],
        K::SeedsBought
        | K::CropSold
        | K::ToolCrafted
        | K::MarketSold
        | K::AchievementClaimed => &[Coins, Inventory, Bumpkin],
        K::OrderDelivered => &[Coins, Inventory, Delivery, Bumpkin],
        K::ItemsWithdrawn => &[Coins, Inventory, Settlement, Bumpkin],
        K::SettlementAcknowledged => &[Settlement],
    }
}
