//! Combat engine: melee and spell resolution, obstacle clearing, rewards and
//! the win condition.

use valor_core::{
    hero_reaches, monster_reaches, ActionError, AttackOutcome, CellCoord, Event, Faction, Resource,
    SpellElement, SpellSource, UnitId, TERRAIN_BONUS,
};

use crate::World;

const HERO_CRITICAL_CHANCE: f64 = 0.15;
const MONSTER_CRITICAL_CHANCE: f64 = 0.10;
const AGILITY_DODGE_FACTOR: f64 = 0.002;
const GOLD_PER_LEVEL: u32 = 500;
const EXPERIENCE_PER_LEVEL: u32 = 2;

/// Base melee damage of a hero: 5% of strength per point of weapon damage.
pub(crate) const fn melee_damage(strength: u32, weapon: u32) -> u32 {
    let weapon = if weapon == 0 { 1 } else { weapon };
    let damage = strength as u64 * weapon as u64 / 20;
    if damage > u32::MAX as u64 {
        u32::MAX
    } else {
        damage as u32
    }
}

/// Damage a monster deals to a hero wearing `armor`.
pub(crate) const fn monster_damage(level: u32, base: u32, critical: bool, armor: u32) -> u32 {
    let multiplier = if critical { 2 } else { 1 };
    let raw = level as u64 * base as u64 * multiplier / 10;
    let raw = if raw > u32::MAX as u64 {
        u32::MAX
    } else {
        raw as u32
    };
    raw.saturating_sub(armor)
}

/// Permanent 10% spell debuff, truncated.
pub(crate) const fn attenuate(value: u32) -> u32 {
    (value as u64 * 9 / 10) as u32
}

impl World {
    pub(crate) fn hero_attack(
        &mut self,
        hero: UnitId,
        target: UnitId,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (hero_index, hero_cell) = self.living_hero(hero)?;
        let (monster_index, monster_cell) = self.living_monster(target)?;
        if !hero_reaches(hero_cell, monster_cell) {
            return Err(ActionError::InvalidTarget(target));
        }

        let dodge = f64::from(self.monsters[monster_index].dodge_percent) * 0.01;
        if self.dice.chance(dodge) {
            tracing::debug!(%hero, %target, "attack dodged");
            out.push(Event::AttackResolved {
                attacker: hero,
                target,
                outcome: AttackOutcome::Dodged,
            });
            return Ok(());
        }

        let attacker = &self.heroes[hero_index];
        let mut damage = melee_damage(attacker.current.strength, attacker.weapon_damage());
        let critical = self.dice.chance(HERO_CRITICAL_CHANCE);
        if critical {
            damage = damage.saturating_mul(2);
        }
        let remaining = self.monsters[monster_index].take_damage(damage);
        tracing::debug!(%hero, %target, damage, critical, remaining, "hero attack landed");
        out.push(Event::AttackResolved {
            attacker: hero,
            target,
            outcome: AttackOutcome::Hit {
                damage,
                critical,
                remaining,
            },
        });

        if remaining == 0 {
            self.defeat_monster(monster_index, monster_cell, out);
        }
        Ok(())
    }

    /// Casts a learned spell or a scroll from the inventory.
    ///
    /// Spells never miss. After the damage lands the target keeps a permanent
    /// debuff chosen by the spell's element.
    pub(crate) fn cast_spell(
        &mut self,
        hero: UnitId,
        source: SpellSource,
        target: UnitId,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (hero_index, hero_cell) = self.living_hero(hero)?;
        let caster = &self.heroes[hero_index];
        let (book, index) = match source {
            SpellSource::Learned(index) => (&caster.spells, index),
            SpellSource::Inventory(index) => (&caster.inventory, index),
        };
        let Some((name, spell)) = book
            .get(index)
            .and_then(|item| Some((item.name.clone(), *item.as_spell()?)))
        else {
            return Err(ActionError::InvalidSelection {
                index,
                available: book.len(),
            });
        };

        let (monster_index, monster_cell) = self.living_monster(target)?;
        if !hero_reaches(hero_cell, monster_cell) {
            return Err(ActionError::InvalidTarget(target));
        }
        if caster.mana < spell.mana_cost {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Mana,
                required: spell.mana_cost,
                available: caster.mana,
            });
        }

        let caster = &mut self.heroes[hero_index];
        caster.mana -= spell.mana_cost;
        if let SpellSource::Inventory(index) = source {
            let _ = caster.inventory.remove(index);
        }

        let monster = &mut self.monsters[monster_index];
        let remaining = monster.take_damage(spell.damage);
        match spell.element {
            SpellElement::Ice => monster.base_damage = attenuate(monster.base_damage),
            SpellElement::Fire => monster.defense = attenuate(monster.defense),
            SpellElement::Lightning => monster.dodge_percent = attenuate(monster.dodge_percent),
        }
        tracing::debug!(%hero, %target, spell = %name, remaining, "spell cast");
        out.push(Event::SpellCast {
            hero,
            target,
            spell: name,
            element: spell.element,
            damage: spell.damage,
            remaining,
        });

        if remaining == 0 {
            self.defeat_monster(monster_index, monster_cell, out);
        }
        Ok(())
    }

    /// Lets a monster strike the weakest hero within its reach.
    pub(crate) fn monster_strike(
        &mut self,
        monster: UnitId,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (monster_index, monster_cell) = self.living_monster(monster)?;
        let (hero_index, hero_cell) = self
            .heroes
            .iter()
            .enumerate()
            .filter(|(_, hero)| hero.is_alive())
            .filter_map(|(index, hero)| {
                let cell = self.registry.position(hero.id)?;
                monster_reaches(monster_cell, cell).then_some((index, cell))
            })
            .min_by_key(|(index, _)| self.heroes[*index].health)
            .ok_or(ActionError::InvalidTarget(monster))?;
        let target = self.heroes[hero_index].id;

        let dodge =
            (f64::from(self.heroes[hero_index].current.agility) * AGILITY_DODGE_FACTOR).min(1.0);
        if self.dice.chance(dodge) {
            tracing::debug!(%monster, hero = %target, "hero dodged");
            out.push(Event::AttackResolved {
                attacker: monster,
                target,
                outcome: AttackOutcome::Dodged,
            });
            return Ok(());
        }

        let critical = self.dice.chance(MONSTER_CRITICAL_CHANCE);
        let attacker = &self.monsters[monster_index];
        let defender = &mut self.heroes[hero_index];
        let damage = monster_damage(
            attacker.level,
            attacker.base_damage,
            critical,
            defender.armor_reduction(),
        );
        let remaining = defender.take_damage(damage);
        tracing::debug!(
            %monster,
            hero = %target,
            damage,
            critical,
            remaining,
            "monster attack landed"
        );
        out.push(Event::AttackResolved {
            attacker: monster,
            target,
            outcome: AttackOutcome::Hit {
                damage,
                critical,
                remaining,
            },
        });

        if remaining == 0 {
            self.defeat_hero(hero_index, hero_cell, out);
        }
        Ok(())
    }

    /// Turns one obstacle around the hero into plain ground.
    ///
    /// A single candidate is cleared without a choice; several need one.
    pub(crate) fn clear_obstacle(
        &mut self,
        hero: UnitId,
        choice: Option<usize>,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (_, cell) = self.living_hero(hero)?;
        let candidates = self.board.obstacles_around(cell);
        let target = match (candidates.as_slice(), choice) {
            ([only], _) => *only,
            (_, Some(index)) if index < candidates.len() => candidates[index],
            (_, choice) => {
                return Err(ActionError::InvalidSelection {
                    index: choice.unwrap_or(0),
                    available: candidates.len(),
                })
            }
        };

        if !self.board.clear_obstacle(target) {
            return Err(ActionError::InvalidPosition { cell: target });
        }
        tracing::debug!(%hero, cell = %target, "obstacle cleared");
        out.push(Event::ObstacleCleared { hero, cell: target });
        Ok(())
    }

    /// Records a winner when a living unit stands on the opposing Nexus.
    pub(crate) fn check_victory(&mut self, out: &mut Vec<Event>) {
        if self.winner.is_some() {
            return;
        }
        let heroes = self
            .heroes
            .iter()
            .filter(|hero| hero.is_alive())
            .map(|hero| (hero.id, Faction::Heroes));
        let monsters = self
            .monsters
            .iter()
            .filter(|monster| monster.is_alive())
            .map(|monster| (monster.id, Faction::Monsters));

        let victory = monsters.chain(heroes).find_map(|(unit, faction)| {
            let cell = self.registry.position(unit)?;
            self.board
                .is_nexus_of(cell, faction.opponent())
                .then_some((faction, unit, cell))
        });

        if let Some((winner, unit, cell)) = victory {
            tracing::info!(%winner, %unit, %cell, "opposing nexus reached");
            self.winner = Some(winner);
            out.push(Event::GameWon { winner, unit, cell });
        }
    }

    fn defeat_monster(&mut self, index: usize, cell: CellCoord, out: &mut Vec<Event>) {
        let monster = self.monsters.remove(index);
        let _ = self.registry.remove(&mut self.board, monster.id);
        tracing::info!(monster = %monster.name, %cell, "monster defeated");
        out.push(Event::UnitDefeated {
            unit: monster.id,
            faction: Faction::Monsters,
            cell,
        });
        self.distribute_rewards(monster.level, out);
    }

    fn distribute_rewards(&mut self, level: u32, out: &mut Vec<Event>) {
        let gold = GOLD_PER_LEVEL.saturating_mul(level);
        let experience = EXPERIENCE_PER_LEVEL.saturating_mul(level);
        for hero in self.heroes.iter_mut().filter(|hero| hero.is_alive()) {
            hero.gold = hero.gold.saturating_add(gold);
            out.push(Event::RewardsGranted {
                hero: hero.id,
                gold,
                experience,
            });
            for reached in hero.gain_experience(experience) {
                tracing::info!(hero = %hero.name, level = reached, "hero leveled up");
                out.push(Event::HeroLeveledUp {
                    hero: hero.id,
                    level: reached,
                });
            }
        }
    }

    /// Takes a fallen hero off the board until the end-of-round respawn.
    fn defeat_hero(&mut self, index: usize, cell: CellCoord, out: &mut Vec<Event>) {
        let hero = &mut self.heroes[index];
        let id = hero.id;
        tracing::info!(hero = %hero.name, %cell, "hero defeated");
        if let Some(attribute) = hero.lose_terrain_bonus() {
            out.push(Event::TerrainBonusLost {
                hero: id,
                attribute,
                amount: TERRAIN_BONUS,
            });
        }
        let _ = self.registry.remove(&mut self.board, id);
        out.push(Event::UnitDefeated {
            unit: id,
            faction: Faction::Heroes,
            cell,
        });
    }
}
