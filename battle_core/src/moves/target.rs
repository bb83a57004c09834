//! Target resolution and deterministic retargeting

use super::TargetType;
use crate::error::BattleError;
use crate::roster::Roster;
use crate::types::{CombatantId, GroupId};

/// Pick a replacement for a target that died before the move resolved
///
/// The first living candidate in group order wins:
/// - single enemy: first living member of the opposing group
/// - single ally: first living member of the actor's group other than the actor
/// - single ally or self: first living member of the actor's group
///
/// Returns `None` when nobody qualifies; the move is then not executed.
pub fn replacement_target(
    roster: &Roster,
    actor: CombatantId,
    own: GroupId,
    opposing: GroupId,
    target_type: TargetType,
) -> Result<Option<CombatantId>, BattleError> {
    let candidate = match target_type {
        TargetType::SingleEnemy => roster.living_members(opposing)?.into_iter().next(),
        TargetType::SingleAlly => roster
            .living_members(own)?
            .into_iter()
            .find(|id| *id != actor),
        TargetType::SingleAllyOrSelf => roster.living_members(own)?.into_iter().next(),
        TargetType::SelfTarget => roster.is_alive(actor).then_some(actor),
        TargetType::OwnTeam | TargetType::EnemyTeam | TargetType::Field => None,
    };
    Ok(candidate)
}

/// Every combatant a move lands on
pub fn resolve_targets(
    roster: &Roster,
    actor: CombatantId,
    target: Option<CombatantId>,
    own: GroupId,
    opposing: GroupId,
    target_type: TargetType,
) -> Result<Vec<CombatantId>, BattleError> {
    Ok(match target_type {
        TargetType::SelfTarget => vec![actor],
        TargetType::SingleEnemy | TargetType::SingleAlly | TargetType::SingleAllyOrSelf => {
            target.into_iter().collect()
        }
        TargetType::OwnTeam => roster.living_members(own)?,
        TargetType::EnemyTeam => roster.living_members(opposing)?,
        TargetType::Field => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::types::Side;

    struct Teams {
        roster: Roster,
        heroes: GroupId,
        monsters: GroupId,
        hero: Vec<CombatantId>,
        monster: Vec<CombatantId>,
    }

    fn teams() -> Teams {
        let mut roster = Roster::new();
        let heroes = roster.add_group("Heroes", Side::Human);
        let monsters = roster.add_group("Monsters", Side::Enemy);
        let hero = (0..3)
            .map(|i| {
                roster
                    .spawn_into(heroes, Combatant::new(format!("Hero{}", i), 10, 0))
                    .unwrap()
            })
            .collect();
        let monster = (0..3)
            .map(|_| roster.spawn_into(monsters, Combatant::new("Slime", 10, 0)).unwrap())
            .collect();
        Teams {
            roster,
            heroes,
            monsters,
            hero,
            monster,
        }
    }

    fn kill(roster: &mut Roster, id: CombatantId) {
        let (c, bus) = roster.split_mut(id).unwrap();
        c.kill(bus);
    }

    #[test]
    fn test_enemy_replacement_is_first_living() {
        let mut t = teams();
        kill(&mut t.roster, t.monster[0]);
        let replacement =
            replacement_target(&t.roster, t.hero[0], t.heroes, t.monsters, TargetType::SingleEnemy).unwrap();
        assert_eq!(replacement, Some(t.monster[1]));

        // Same state, same answer
        let again =
            replacement_target(&t.roster, t.hero[0], t.heroes, t.monsters, TargetType::SingleEnemy).unwrap();
        assert_eq!(again, replacement);
    }

    #[test]
    fn test_ally_replacement_excludes_actor() {
        let mut t = teams();
        kill(&mut t.roster, t.hero[1]);
        let ally =
            replacement_target(&t.roster, t.hero[0], t.heroes, t.monsters, TargetType::SingleAlly).unwrap();
        assert_eq!(ally, Some(t.hero[2]));
        let ally_or_self = replacement_target(
            &t.roster,
            t.hero[0],
            t.heroes,
            t.monsters,
            TargetType::SingleAllyOrSelf,
        )
        .unwrap();
        assert_eq!(ally_or_self, Some(t.hero[0]));
    }

    #[test]
    fn test_no_candidate() {
        let mut t = teams();
        for id in t.monster.clone() {
            kill(&mut t.roster, id);
        }
        let replacement =
            replacement_target(&t.roster, t.hero[0], t.heroes, t.monsters, TargetType::SingleEnemy).unwrap();
        assert_eq!(replacement, None);
    }

    #[test]
    fn test_team_targets_skip_dead() {
        let mut t = teams();
        kill(&mut t.roster, t.monster[1]);
        let targets =
            resolve_targets(&t.roster, t.hero[0], None, t.heroes, t.monsters, TargetType::EnemyTeam).unwrap();
        assert_eq!(targets, vec![t.monster[0], t.monster[2]]);
    }
}
