//! Plain text presentation of the board, the roster and world events.

use std::{collections::HashMap, fmt::Write as _};

use valor_core::{
    AttackOutcome, Event, Faction, HeroSnapshot, MonsterSnapshot, TerrainKind, UnitId,
};
use valor_world::GridBoard;

/// Width of a rendered cell, excluding the separator.
const CELL_WIDTH: usize = 5;

const fn glyph(terrain: TerrainKind) -> char {
    match terrain {
        TerrainKind::Plain => '.',
        TerrainKind::Bush => 'b',
        TerrainKind::Cave => 'c',
        TerrainKind::Koulou => 'k',
        TerrainKind::Obstacle => '#',
        TerrainKind::Inaccessible => 'X',
        TerrainKind::Nexus(Faction::Heroes) => 'H',
        TerrainKind::Nexus(Faction::Monsters) => 'M',
        TerrainKind::Mystery => '?',
        TerrainKind::Treasure => 't',
        TerrainKind::Market => '$',
    }
}

/// Display labels for every unit on the board.
#[derive(Debug, Default)]
pub(crate) struct Labels {
    labels: HashMap<UnitId, String>,
    names: HashMap<UnitId, String>,
}

impl Labels {
    /// Records the current roster, keeping names of units that left it.
    pub(crate) fn refresh(&mut self, heroes: &[HeroSnapshot], monsters: &[MonsterSnapshot]) {
        for hero in heroes {
            let _ = self.labels.insert(hero.id, hero.label());
            let _ = self.names.insert(hero.id, hero.name.clone());
        }
        for monster in monsters {
            let _ = self.labels.insert(monster.id, monster.label());
            let _ = self.names.insert(monster.id, monster.name.clone());
        }
    }

    /// Remembers a monster introduced between prompts.
    pub(crate) fn remember(&mut self, unit: UnitId, name: &str) {
        let _ = self.names.insert(unit, name.to_owned());
    }

    /// Human-readable name of a unit.
    pub(crate) fn name(&self, unit: UnitId) -> String {
        self.names
            .get(&unit)
            .cloned()
            .unwrap_or_else(|| format!("unit {unit}"))
    }

    fn label(&self, unit: UnitId) -> Option<&str> {
        self.labels.get(&unit).map(String::as_str)
    }
}

/// Draws the board one row per line, Nexus of the monsters on top.
///
/// Each cell shows its terrain glyph followed by the label of the unit
/// standing on it. Starting footprints are drawn in lower case.
pub(crate) fn board(board: &GridBoard, labels: &Labels) -> String {
    let mut out = String::new();
    let columns = usize::try_from(board.columns()).unwrap_or(0);
    let rule = format!("+{}\n", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(columns));
    out.push_str(&rule);
    for (cell, space) in board.cells() {
        let unit = space
            .occupant()
            .and_then(|unit| labels.label(unit).map(str::to_owned))
            .or_else(|| {
                space
                    .footprint()
                    .and_then(|unit| labels.label(unit).map(str::to_ascii_lowercase))
            })
            .unwrap_or_default();
        let _ = write!(out, "| {} {unit:<2}", glyph(space.terrain()));
        if cell.column() + 1 == board.columns() {
            out.push_str("|\n");
            out.push_str(&rule);
        }
    }
    out
}

/// One-line summary of a hero.
pub(crate) fn hero_line(hero: &HeroSnapshot) -> String {
    let place = hero
        .cell
        .map_or_else(|| "fallen".to_owned(), |cell| cell.to_string());
    format!(
        "{} {} ({}, level {}) at {place}: \
         health {}/{} mana {}/{} gold {} xp {} str {} dex {} agi {}",
        hero.label(),
        hero.name,
        hero.class,
        hero.level,
        hero.health.current,
        hero.health.maximum,
        hero.mana.current,
        hero.mana.maximum,
        hero.gold,
        hero.experience,
        hero.current.strength,
        hero.current.dexterity,
        hero.current.agility,
    )
}

/// One-line summary of a monster.
pub(crate) fn monster_line(monster: &MonsterSnapshot) -> String {
    format!(
        "{} {} ({}, level {}) at {}: health {}/{} damage {} defense {} dodge {}%",
        monster.label(),
        monster.name,
        monster.kind,
        monster.level,
        monster.cell,
        monster.health.current,
        monster.health.maximum,
        monster.base_damage,
        monster.defense,
        monster.dodge_percent,
    )
}

/// Narrates an event, or `None` for bookkeeping the player need not see.
pub(crate) fn describe(event: &Event, labels: &Labels) -> Option<String> {
    let name = |unit: &UnitId| labels.name(*unit);
    let line = match event {
        Event::UnitMoved { unit, to, .. } => format!("{} moves to {to}", name(unit)),
        Event::HeroTeleported { hero, ally, to, .. } => {
            format!("{} teleports next to {} at {to}", name(hero), name(ally))
        }
        Event::HeroRecalled { hero, to, .. } => format!("{} recalls to {to}", name(hero)),
        Event::TerrainBonusGained {
            hero,
            attribute,
            amount,
        } => format!("{} gains {amount} {attribute} from the terrain", name(hero)),
        Event::TerrainBonusLost { .. } | Event::RoundAdvanced { .. } => return None,
        Event::TreasureOpened {
            hero,
            gold,
            experience,
            item,
            ..
        } => {
            let loot = item
                .as_deref()
                .map_or_else(String::new, |item| format!(" and {item}"));
            format!(
                "{} opens a chest: {gold} gold, {experience} experience{loot}",
                name(hero)
            )
        }
        Event::AttackResolved {
            attacker,
            target,
            outcome,
        } => match outcome {
            AttackOutcome::Dodged => {
                format!("{} dodges {}'s attack", name(target), name(attacker))
            }
            AttackOutcome::Hit {
                damage,
                critical,
                remaining,
            } => format!(
                "{} hits {} for {damage}{} ({remaining} health left)",
                name(attacker),
                name(target),
                if *critical { " (critical)" } else { "" },
            ),
        },
        Event::SpellCast {
            hero,
            target,
            spell,
            element,
            damage,
            remaining,
        } => format!(
            "{} casts {spell} ({element}) on {} for {damage} ({remaining} health left)",
            name(hero),
            name(target)
        ),
        Event::UnitDefeated { unit, .. } => format!("{} has fallen", name(unit)),
        Event::RewardsGranted {
            hero,
            gold,
            experience,
        } => format!("{} earns {gold} gold and {experience} experience", name(hero)),
        Event::HeroLeveledUp { hero, level } => format!("{} reaches level {level}", name(hero)),
        Event::ObstacleCleared { hero, cell } => {
            format!("{} clears the obstacle at {cell}", name(hero))
        }
        Event::PotionConsumed { hero, potion } => format!("{} drinks {potion}", name(hero)),
        Event::ItemEquipped { hero, item } => format!("{} equips {item}", name(hero)),
        Event::ItemUnequipped { hero, item } => format!("{} stows {item}", name(hero)),
        Event::SpellLearned { hero, spell } => format!("{} learns {spell}", name(hero)),
        Event::ItemPurchased { hero, item, cost } => {
            format!("{} buys {item} for {cost} gold", name(hero))
        }
        Event::ItemSold { hero, item, refund } => {
            format!("{} sells {item} for {refund} gold", name(hero))
        }
        Event::HeroRegenerated { hero, health, mana } => {
            format!("{} recovers {health} health and {mana} mana", name(hero))
        }
        Event::HeroRespawned { hero, cell } => format!("{} respawns at {cell}", name(hero)),
        Event::MonsterSpawned {
            name: monster,
            cell,
            level,
            ..
        } => format!("{monster} (level {level}) emerges at {cell}"),
        Event::PositionRecovered { unit, cell } => {
            format!("{} is returned to {cell}", name(unit))
        }
        Event::ActionRejected { reason, .. } => format!("refused: {reason}"),
        Event::GameWon { winner, unit, cell } => {
            format!("{} reaches {cell}; the {winner} win!", name(unit))
        }
    };
    Some(line)
}
