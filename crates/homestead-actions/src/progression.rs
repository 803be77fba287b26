//! Achievements, skills, and wearables.

use homestead_ledger::inventory::{credit_all, credit_coins};
use homestead_types::{
    AchievementClaimed, ActionKind, GameState, SkillLearned, Timestamp, WearableEquipped,
};
use homestead_world::RequirementSet;
use homestead_world::catalogue::{achievement, wearable_slot};
use homestead_world::progression::available_skill_points;

use crate::error::GameError;
use crate::handler::{ActionHandler, bumpkin, bumpkin_mut, require};

impl ActionHandler for AchievementClaimed {
    const KIND: ActionKind = ActionKind::AchievementClaimed;

    fn requirements(
        &self,
        _state: &GameState,
        _now: Timestamp,
    ) -> Result<RequirementSet, GameError> {
        Ok(achievement(self.achievement).requirements)
    }

    fn apply(&self, state: &mut GameState, now: Timestamp) -> Result<(), GameError> {
        if bumpkin(state)?.achievements.contains(&self.achievement) {
            return Err(GameError::rule("Achievement already claimed"));
        }
        let def = achievement(self.achievement);
        require(&def.requirements, state, now)?;

        credit_all(&mut state.inventory, &def.reward.items)?;
        credit_coins(&mut state.coins, def.reward.coins)?;
        bumpkin_mut(state)?.achievements.insert(self.achievement);
        Ok(())
    }
}

impl ActionHandler for SkillLearned {
    const KIND: ActionKind = ActionKind::SkillLearned;

    fn apply(&self, state: &mut GameState, _now: Timestamp) -> Result<(), GameError> {
        let bumpkin = bumpkin_mut(state)?;
        if bumpkin.skills.contains(&self.skill) {
            return Err(GameError::rule("Skill already learned"));
        }
        if available_skill_points(bumpkin) == 0 {
            return Err(GameError::rule("No skill points available"));
        }
        bumpkin.skills.insert(self.skill);
        Ok(())
    }
}

impl ActionHandler for WearableEquipped {
    const KIND: ActionKind = ActionKind::WearableEquipped;

    fn apply(&self, state: &mut GameState, _now: Timestamp) -> Result<(), GameError> {
        let owned = state.wardrobe.get(&self.wearable).copied().unwrap_or(0);
        if owned == 0 {
            return Err(GameError::rule("Wearable is not in the wardrobe"));
        }
        bumpkin_mut(state)?
            .equipped
            .insert(wearable_slot(self.wearable), self.wearable);
        Ok(())
    }
}
