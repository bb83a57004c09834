//! Action input collaborator

use crate::config::BattleConfig;
use crate::moves::MoveWithTarget;
use crate::roster::Roster;
use crate::types::{GroupId, Side};

/// What one side decided for the round
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// One slot per actor; `None` for actors that do nothing
    Actions(Vec<Option<MoveWithTarget>>),
    /// Leave the battle before any move of the round runs
    Retreat,
}

/// What an action source can see and change while declaring
pub struct DeclarationContext<'a> {
    pub roster: &'a Roster,
    pub side: Side,
    pub group: GroupId,
    pub opposing: GroupId,
    pub round: u32,
    /// Narration flags may be changed between rounds
    pub config: &'a mut BattleConfig,
}

/// Producer of declared moves: a player menu, a monster script, a test
pub trait ActionSource {
    fn declare(&mut self, ctx: &mut DeclarationContext<'_>) -> Declaration;
}

impl<F> ActionSource for F
where
    F: FnMut(&mut DeclarationContext<'_>) -> Declaration,
{
    fn declare(&mut self, ctx: &mut DeclarationContext<'_>) -> Declaration {
        self(ctx)
    }
}

/// Every living member uses its basic attack on the first living opponent
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackFirstLiving;

impl ActionSource for AttackFirstLiving {
    fn declare(&mut self, ctx: &mut DeclarationContext<'_>) -> Declaration {
        let target = ctx
            .roster
            .living_members(ctx.opposing)
            .ok()
            .and_then(|ids| ids.into_iter().next());
        let accuracy = ctx.config.constants.default_attack_accuracy;
        let members = ctx.roster.living_members(ctx.group).unwrap_or_default();
        let actions = members
            .into_iter()
            .map(|id| {
                let attacker = ctx.roster.combatant(id).ok()?;
                Some(MoveWithTarget::new(attacker.basic_attack(accuracy), id, target))
            })
            .collect();
        Declaration::Actions(actions)
    }
}
