//! Temporal and post-transition integrity guard.
//!
//! The guard runs twice per action:
//!
//! 1. **Before dispatch** ([`check_before`]) -- ban check, time travel
//!    against the last committed action, replay of an action already
//!    committed at the same `now`, client clock skew, and the rate window.
//!    A failure here means no handler runs.
//!
//! 2. **After the handler** ([`check_after`]) -- an independent re-check of
//!    the produced state: ledger audit (non-negativity, permitted
//!    subsystems, per-item gain cap), coin gain cap, placement overlap,
//!    process ordering, and recovery timestamps that must never move back.
//!    Every finding is collected into one [`IntegrityReport`].
//!
//! [`record_commit`] updates the anti-cheat bookkeeping once a transition is
//! accepted.

use rust_decimal::Decimal;

use homestead_actions::{
    GameError, IntegrityReport, TemporalError, ValidationError, Violation, permitted_subsystems,
};
use homestead_ledger::{AuditResult, audit_transition};
use homestead_types::{ActionKind, GameAction, GameState, Timestamp};
use homestead_world::overlapping_pairs;

use crate::config::IntegrityConfig;

// ---------------------------------------------------------------------------
// Before dispatch
// ---------------------------------------------------------------------------

/// Global checks that run before any handler.
///
/// `created_at` is the client's own timestamp for the action, when it sent
/// one.
pub fn check_before(
    state: &GameState,
    action: &GameAction,
    created_at: Option<Timestamp>,
    now: Timestamp,
    config: &IntegrityConfig,
) -> Result<(), GameError> {
    let bookkeeping = &state.bookkeeping;
    if bookkeeping.banned {
        return Err(ValidationError::Banned.into());
    }

    if now < bookkeeping.last_processed_at {
        return Err(TemporalError::TimeTravel {
            last_processed_at: bookkeeping.last_processed_at,
            now,
        }
        .into());
    }

    if now == bookkeeping.last_processed_at && bookkeeping.committed_at_last.contains(action) {
        return Err(TemporalError::Replayed {
            kind: action.kind(),
            now,
        }
        .into());
    }

    if let Some(created_at) = created_at {
        let skew_ms = created_at.abs_diff(now);
        if skew_ms > config.max_clock_skew_ms {
            return Err(TemporalError::ClockSkew {
                skew_ms,
                max_skew_ms: config.max_clock_skew_ms,
            }
            .into());
        }
    }

    let count = in_window(&bookkeeping.recent_actions, now, config.rate_window_ms).count();
    if count >= config.max_actions_per_window {
        return Err(TemporalError::RateLimited {
            count,
            window_ms: config.rate_window_ms,
        }
        .into());
    }

    Ok(())
}

fn in_window(
    recent: &[Timestamp],
    now: Timestamp,
    window_ms: Timestamp,
) -> impl Iterator<Item = &Timestamp> {
    let floor = now.saturating_sub(window_ms);
    recent.iter().filter(move |at| **at > floor)
}

/// Stamp an accepted transition into the farm's bookkeeping.
pub fn record_commit(
    state: &mut GameState,
    action: &GameAction,
    now: Timestamp,
    config: &IntegrityConfig,
) {
    let bookkeeping = &mut state.bookkeeping;
    if now != bookkeeping.last_processed_at {
        bookkeeping.committed_at_last.clear();
    }
    bookkeeping.committed_at_last.push(action.clone());
    bookkeeping.last_processed_at = now;
    let floor = now.saturating_sub(config.rate_window_ms);
    bookkeeping.recent_actions.retain(|at| *at > floor);
    bookkeeping.recent_actions.push(now);
}

// ---------------------------------------------------------------------------
// After the handler
// ---------------------------------------------------------------------------

/// Re-check the state a handler produced for `kind`.
pub fn check_after(
    before: &GameState,
    after: &GameState,
    kind: ActionKind,
    config: &IntegrityConfig,
) -> Result<(), GameError> {
    let mut violations = Vec::new();

    if let AuditResult::Anomalies(anomalies) = audit_transition(
        before,
        after,
        permitted_subsystems(kind),
        config.max_item_gain,
    )? {
        violations.extend(anomalies.into_iter().map(Violation::Ledger));
    }

    let coin_gain = after
        .coins
        .checked_sub(before.coins)
        .unwrap_or(Decimal::MAX);
    if coin_gain > config.max_coin_gain {
        violations.push(Violation::Excessive {
            field: "coins".to_owned(),
            value: coin_gain,
        });
    }

    violations.extend(
        overlapping_pairs(after)
            .into_iter()
            .map(|(first, second)| Violation::Overlap { first, second }),
    );
    violations.extend(process_order(after));
    violations.extend(regressed_timestamps(before, after));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(GameError::IntegrityViolation(Box::new(IntegrityReport {
            action: kind,
            violations,
        })))
    }
}

fn ordered(process: String, started_at: Timestamp, ready_at: Timestamp) -> Option<Violation> {
    (ready_at < started_at).then_some(Violation::ProcessOrder {
        process,
        started_at,
        ready_at,
    })
}

/// Every process in `state` that finishes before it starts.
fn process_order(state: &GameState) -> Vec<Violation> {
    let mut found = Vec::new();
    for (id, building) in state.buildings.iter() {
        found.extend(ordered(
            format!("construction of {id}"),
            building.created_at,
            building.ready_at,
        ));
        if let Some(producing) = &building.producing {
            found.extend(ordered(
                format!("production in {id}"),
                producing.started_at,
                producing.ready_at,
            ));
        }
    }
    if let Some(crafting) = &state.crafting_box {
        found.extend(ordered(
            "crafting box".to_owned(),
            crafting.started_at,
            crafting.ready_at,
        ));
    }
    if let Some(construction) = &state.expansion_construction {
        found.extend(ordered(
            "land expansion".to_owned(),
            construction.created_at,
            construction.ready_at,
        ));
    }
    found
}

fn regressed(field: String, before: Timestamp, after: Timestamp) -> Option<Violation> {
    (after < before).then_some(Violation::TimestampRegressed {
        field,
        before,
        after,
    })
}

/// Recovery timestamps that moved backward on entities present in both
/// states.
///
/// A rock's first strike back-dates `mined_at` past its placement time, so
/// rocks are only compared once they have been mined. A fruit's
/// `harvested_at` is compared only while the same tree stands.
fn regressed_timestamps(before: &GameState, after: &GameState) -> Vec<Violation> {
    let mut found = Vec::new();

    for (id, rock) in after.rocks.iter() {
        if let Some(old) = before.rocks.get(id).filter(|old| old.times_mined > 0) {
            found.extend(regressed(
                format!("rock {id} minedAt"),
                old.mined_at,
                rock.mined_at,
            ));
        }
    }

    for (id, patch) in after.fruit_patches.iter() {
        let old = before
            .fruit_patches
            .get(id)
            .and_then(|old| old.fruit.as_ref());
        if let (Some(old), Some(fruit)) = (old, patch.fruit.as_ref())
            && old.planted_at == fruit.planted_at
        {
            found.extend(regressed(
                format!("fruit patch {id} harvestedAt"),
                old.harvested_at,
                fruit.harvested_at,
            ));
        }
    }

    for (id, chicken) in after.chickens.iter() {
        let old = before.chickens.get(id).and_then(|old| old.fed_at);
        if let (Some(old), Some(fed_at)) = (old, chicken.fed_at) {
            found.extend(regressed(format!("chicken {id} fedAt"), old, fed_at));
        }
    }

    if let (Some(old), Some(bumpkin)) = (&before.bumpkin, &after.bumpkin) {
        found.extend(regressed(
            "stamina replenishedAt".to_owned(),
            old.stamina.replenished_at,
            bumpkin.stamina.replenished_at,
        ));
    }

    if let (Some(old), Some(mushrooms)) = (&before.mushrooms, &after.mushrooms) {
        found.extend(regressed(
            "mushrooms spawnedAt".to_owned(),
            old.spawned_at,
            mushrooms.spawned_at,
        ));
    }

    found
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use homestead_actions::ErrorKind;
    use homestead_ledger::{Anomaly, Subsystem};
    use homestead_types::{ItemName, PlacementId, Production, SeedsBought, StaminaReplenished};
    use homestead_world::starting_farm;

    use super::*;

    fn config() -> IntegrityConfig {
        IntegrityConfig::default()
    }

    fn replenish() -> GameAction {
        StaminaReplenished {}.into()
    }

    #[test]
    fn fresh_farm_passes() {
        assert_eq!(check_before(&starting_farm(0), &replenish(), None, 0, &config()), Ok(()));
    }

    #[test]
    fn banned_farm_is_rejected() {
        let mut state = starting_farm(0);
        state.bookkeeping.banned = true;
        assert_eq!(
            check_before(&state, &replenish(), None, 0, &config()),
            Err(GameError::Validation(ValidationError::Banned))
        );
    }

    #[test]
    fn earlier_now_is_time_travel() {
        let mut state = starting_farm(0);
        state.bookkeeping.last_processed_at = 10_000;
        let err = check_before(&state, &replenish(), None, 9_999, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalIntegrity);
        assert_eq!(check_before(&state, &replenish(), None, 10_000, &config()), Ok(()));
    }

    #[test]
    fn same_action_at_same_now_is_a_replay() {
        let mut state = starting_farm(0);
        record_commit(&mut state, &replenish(), 5_000, &config());
        assert_eq!(
            check_before(&state, &replenish(), None, 5_000, &config()),
            Err(GameError::TemporalIntegrity(TemporalError::Replayed {
                kind: ActionKind::StaminaReplenished,
                now: 5_000,
            }))
        );

        let buy: GameAction = SeedsBought {
            item: ItemName::SunflowerSeed,
            amount: dec!(1),
        }
        .into();
        assert_eq!(check_before(&state, &buy, None, 5_000, &config()), Ok(()));
        assert_eq!(check_before(&state, &replenish(), None, 5_001, &config()), Ok(()));
    }

    #[test]
    fn replay_memory_resets_when_time_moves() {
        let mut state = starting_farm(0);
        record_commit(&mut state, &replenish(), 5_000, &config());
        let buy: GameAction = SeedsBought {
            item: ItemName::SunflowerSeed,
            amount: dec!(1),
        }
        .into();
        record_commit(&mut state, &buy, 5_000, &config());
        assert_eq!(state.bookkeeping.committed_at_last.len(), 2);
        assert!(check_before(&state, &replenish(), None, 5_000, &config()).is_err());

        record_commit(&mut state, &buy, 6_000, &config());
        assert_eq!(state.bookkeeping.committed_at_last, vec![buy]);
        assert_eq!(check_before(&state, &replenish(), None, 6_000, &config()), Ok(()));
    }

    #[test]
    fn client_clock_skew() {
        let state = starting_farm(0);
        assert_eq!(
            check_before(&state, &replenish(), Some(1_000_000), 1_300_000, &config()),
            Ok(())
        );
        assert_eq!(
            check_before(&state, &replenish(), Some(1_000_000), 1_300_001, &config()),
            Err(GameError::TemporalIntegrity(TemporalError::ClockSkew {
                skew_ms: 300_001,
                max_skew_ms: 300_000,
            }))
        );
        assert!(check_before(&state, &replenish(), Some(1_300_001), 1_000_000, &config()).is_err());
    }

    #[test]
    fn rate_window_slides() {
        let config = IntegrityConfig {
            max_actions_per_window: 2,
            ..IntegrityConfig::default()
        };
        let mut state = starting_farm(0);
        record_commit(&mut state, &replenish(), 100, &config);
        record_commit(&mut state, &replenish(), 200, &config);
        assert_eq!(
            check_before(&state, &replenish(), None, 300, &config),
            Err(GameError::TemporalIntegrity(TemporalError::RateLimited {
                count: 2,
                window_ms: 1_000,
            }))
        );
        assert_eq!(check_before(&state, &replenish(), None, 1_100, &config), Ok(()));

        record_commit(&mut state, &replenish(), 1_150, &config);
        assert_eq!(state.bookkeeping.recent_actions, vec![200, 1_150]);
        assert_eq!(state.bookkeeping.last_processed_at, 1_150);
    }

    #[test]
    fn unchanged_state_is_clean() {
        let state = starting_farm(0);
        assert_eq!(
            check_after(&state, &state.clone(), ActionKind::CropHarvested, &config()),
            Ok(())
        );
    }

    fn report(result: Result<(), GameError>) -> Vec<Violation> {
        match result.unwrap_err() {
            GameError::IntegrityViolation(report) => report.violations,
            _ => Vec::new(),
        }
    }

    #[test]
    fn unrelated_subsystem_is_a_violation() {
        let before = starting_farm(0);
        let mut after = before.clone();
        after.coins = dec!(1000);
        let violations = report(check_after(
            &before,
            &after,
            ActionKind::StaminaReplenished,
            &config(),
        ));
        assert_eq!(
            violations,
            vec![Violation::Ledger(Anomaly::UnpermittedChange {
                subsystem: Subsystem::Coins,
            })]
        );
    }

    #[test]
    fn gain_caps_apply() {
        let before = starting_farm(0);
        let mut after = before.clone();
        after.inventory.insert(ItemName::Gold, dec!(10001));
        after.coins = dec!(2000000);
        let violations = report(check_after(&before, &after, ActionKind::CropSold, &config()));
        assert_eq!(violations.len(), 2);
        assert!(matches!(
            violations.first(),
            Some(Violation::Ledger(Anomaly::ExcessiveGain { .. }))
        ));
        assert!(matches!(
            violations.get(1),
            Some(Violation::Excessive { field, .. }) if field == "coins"
        ));
    }

    #[test]
    fn overlapping_placements_are_reported() {
        let before = starting_farm(0);
        let mut after = before.clone();
        let plot = after.crops.get(&PlacementId::from("plot-1")).cloned().unwrap();
        after.crops.insert(PlacementId::from("plot-copy"), plot);
        let violations = report(check_after(&before, &after, ActionKind::PlotPlaced, &config()));
        assert!(matches!(violations.as_slice(), [Violation::Overlap { .. }]));
    }

    #[test]
    fn backwards_process_is_reported() {
        let before = starting_farm(0);
        let mut after = before.clone();
        after.crafting_box = Some(Production {
            item: ItemName::BasicBear,
            amount: dec!(1),
            started_at: 5_000,
            ready_at: 4_000,
            boosted_at: None,
        });
        let violations = report(check_after(
            &before,
            &after,
            ActionKind::CraftingStarted,
            &config(),
        ));
        assert_eq!(
            violations,
            vec![Violation::ProcessOrder {
                process: "crafting box".to_owned(),
                started_at: 5_000,
                ready_at: 4_000,
            }]
        );
    }

    #[test]
    fn mined_rock_cannot_move_back() {
        let mut before = starting_farm(0);
        let id = PlacementId::from("stone-1");
        if let Some(rock) = before.rocks.get_mut(&id) {
            rock.times_mined = 1;
            rock.mined_at = 50_000;
        }
        let mut after = before.clone();
        if let Some(rock) = after.rocks.get_mut(&id) {
            rock.mined_at = 40_000;
        }
        let violations = report(check_after(&before, &after, ActionKind::RockStruck, &config()));
        assert_eq!(
            violations,
            vec![Violation::TimestampRegressed {
                field: "rock stone-1 minedAt".to_owned(),
                before: 50_000,
                after: 40_000,
            }]
        );
    }
}
