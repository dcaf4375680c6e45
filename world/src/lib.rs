#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Valor Lanes.
//!
//! The world owns the board, the unit roster, the position registry, the
//! combat log and the dice. Every mutation arrives as a [`Command`] through
//! [`apply`], which validates it, executes it and reports the outcome as
//! [`Event`] values. Read access goes through the [`query`] module.

mod board;
mod combat;
mod dice;
mod lifecycle;
mod log;
mod movement;
mod registry;
mod setup;
mod treasure;
mod units;
mod upkeep;

use valor_core::{ActionError, CellCoord, Command, Dice, Event, Faction, GameConfig, UnitId};

pub use board::{GridBoard, Space};
pub use dice::{ScriptedDice, SeededDice};
pub use log::CombatLog;
pub use registry::{Inconsistency, UnitPositionRegistry};
pub use setup::{SetupError, WorldBuilder, MAX_HEROES};

use units::{Hero, Monster};

/// Represents the authoritative Valor Lanes world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    board: GridBoard,
    registry: UnitPositionRegistry,
    heroes: Vec<Hero>,
    monsters: Vec<Monster>,
    dice: Box<dyn Dice>,
    log: CombatLog,
    round: u32,
    next_unit: u32,
    winner: Option<Faction>,
}

impl World {
    /// Starts configuring a new world.
    #[must_use]
    pub fn builder(config: GameConfig) -> WorldBuilder {
        WorldBuilder::new(config)
    }

    fn allocate_id(&mut self) -> UnitId {
        self.next_unit = self.next_unit.saturating_add(1);
        UnitId::new(self.next_unit)
    }

    fn hero_index(&self, hero: UnitId) -> Option<usize> {
        self.heroes.iter().position(|candidate| candidate.id == hero)
    }

    fn monster_index(&self, monster: UnitId) -> Option<usize> {
        self.monsters
            .iter()
            .position(|candidate| candidate.id == monster)
    }

    /// Resolves a living, placed hero to its roster index and cell.
    fn living_hero(&self, hero: UnitId) -> Result<(usize, CellCoord), ActionError> {
        self.hero_index(hero)
            .filter(|index| self.heroes[*index].is_alive())
            .and_then(|index| Some((index, self.registry.position(hero)?)))
            .ok_or(ActionError::InvalidTarget(hero))
    }

    /// Resolves a living, placed monster to its roster index and cell.
    fn living_monster(&self, monster: UnitId) -> Result<(usize, CellCoord), ActionError> {
        self.monster_index(monster)
            .filter(|index| self.monsters[*index].is_alive())
            .and_then(|index| Some((index, self.registry.position(monster)?)))
            .ok_or(ActionError::InvalidTarget(monster))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and produce a single
/// [`Event::ActionRejected`]. Once a faction has won, commands are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Some(winner) = world.winner {
        tracing::debug!(%winner, ?command, "ignoring command after the game ended");
        return;
    }

    let start = out_events.len();
    let actor = command_actor(&command);
    if let Some(hero) = actor.filter(|unit| world.hero_index(*unit).is_some()) {
        world.reconcile(hero, out_events);
    }

    let result = match command {
        Command::Move { unit, direction } => world.move_unit(unit, direction, out_events),
        Command::Teleport { hero, ally } => world.teleport(hero, ally, out_events),
        Command::Recall { hero } => world.recall(hero, out_events),
        Command::Attack { hero, target } => world.hero_attack(hero, target, out_events),
        Command::CastSpell {
            hero,
            spell,
            target,
        } => world.cast_spell(hero, spell, target, out_events),
        Command::UsePotion { hero, item } => world.use_potion(hero, item, out_events),
        Command::Equip { hero, item } => world.equip(hero, item, out_events),
        Command::Unequip { hero, slot } => world.unequip(hero, slot, out_events),
        Command::ClearObstacle { hero, choice } => world.clear_obstacle(hero, choice, out_events),
        Command::Purchase { hero, item } => world.purchase(hero, item, out_events),
        Command::Sell { hero, item } => world.sell(hero, item, out_events),
        Command::MonsterStrike { monster } => world.monster_strike(monster, out_events),
        Command::SpawnMonster { spec } => world.spawn_monster(spec, out_events),
        Command::EndRound => {
            world.end_round(out_events);
            Ok(())
        }
    };

    match result {
        Ok(()) => world.check_victory(out_events),
        Err(reason) => {
            tracing::debug!(unit = ?actor, %reason, "command rejected");
            out_events.push(Event::ActionRejected {
                unit: actor,
                reason,
            });
        }
    }

    world.log.record_all(&out_events[start..]);
}

fn command_actor(command: &Command) -> Option<UnitId> {
    match command {
        Command::Move { unit, .. } => Some(*unit),
        Command::Teleport { hero, .. }
        | Command::Recall { hero }
        | Command::Attack { hero, .. }
        | Command::CastSpell { hero, .. }
        | Command::UsePotion { hero, .. }
        | Command::Equip { hero, .. }
        | Command::Unequip { hero, .. }
        | Command::ClearObstacle { hero, .. }
        | Command::Purchase { hero, .. }
        | Command::Sell { hero, .. } => Some(*hero),
        Command::MonsterStrike { monster } => Some(*monster),
        Command::SpawnMonster { .. } | Command::EndRound => None,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use valor_core::{
        hero_reaches, monster_reaches, CellCoord, Event, Faction, GameConfig, HeroSnapshot,
        MonsterSnapshot, UnitId,
    };

    use super::{GridBoard, Inconsistency, UnitPositionRegistry, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &GridBoard {
        &world.board
    }

    /// Provides read-only access to the position registry.
    #[must_use]
    pub fn registry(world: &World) -> &UnitPositionRegistry {
        &world.registry
    }

    /// Number of the round currently being played, starting at 1.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Faction that reached the opposing Nexus, if any.
    #[must_use]
    pub fn winner(world: &World) -> Option<Faction> {
        world.winner
    }

    /// Snapshots of every hero in roster order, fallen ones included.
    #[must_use]
    pub fn heroes(world: &World) -> Vec<HeroSnapshot> {
        world
            .heroes
            .iter()
            .map(|hero| hero.snapshot(world.registry.position(hero.id)))
            .collect()
    }

    /// Snapshot of a single hero.
    #[must_use]
    pub fn hero(world: &World, hero: UnitId) -> Option<HeroSnapshot> {
        let index = world.hero_index(hero)?;
        Some(world.heroes[index].snapshot(world.registry.position(hero)))
    }

    /// Snapshots of every living monster in roster order.
    #[must_use]
    pub fn monsters(world: &World) -> Vec<MonsterSnapshot> {
        world
            .monsters
            .iter()
            .filter(|monster| monster.is_alive())
            .filter_map(|monster| Some(monster.snapshot(world.registry.position(monster.id)?)))
            .collect()
    }

    /// Snapshot of a single living monster.
    #[must_use]
    pub fn monster(world: &World, monster: UnitId) -> Option<MonsterSnapshot> {
        monsters(world)
            .into_iter()
            .find(|snapshot| snapshot.id == monster)
    }

    /// Cell a unit stands on.
    #[must_use]
    pub fn position(world: &World, unit: UnitId) -> Option<CellCoord> {
        world.registry.position(unit)
    }

    /// Living monsters a hero can strike, in roster order.
    #[must_use]
    pub fn monsters_in_reach(world: &World, hero: UnitId) -> Vec<UnitId> {
        let Ok((_, cell)) = world.living_hero(hero) else {
            return Vec::new();
        };
        monsters(world)
            .into_iter()
            .filter(|monster| hero_reaches(cell, monster.cell))
            .map(|monster| monster.id)
            .collect()
    }

    /// Living heroes a monster can strike, in roster order.
    #[must_use]
    pub fn heroes_in_reach(world: &World, monster: UnitId) -> Vec<UnitId> {
        let Ok((_, cell)) = world.living_monster(monster) else {
            return Vec::new();
        };
        world
            .heroes
            .iter()
            .filter(|hero| hero.is_alive())
            .filter(|hero| {
                world
                    .registry
                    .position(hero.id)
                    .is_some_and(|hero_cell| monster_reaches(cell, hero_cell))
            })
            .map(|hero| hero.id)
            .collect()
    }

    /// Whether a hero has at least one monster within striking reach.
    #[must_use]
    pub fn is_in_battle(world: &World, hero: UnitId) -> bool {
        !monsters_in_reach(world, hero).is_empty()
    }

    /// Whether a hero stands on a Nexus cell of the heroes' row.
    #[must_use]
    pub fn at_home_nexus(world: &World, hero: UnitId) -> bool {
        world
            .registry
            .position(hero)
            .is_some_and(|cell| world.board.is_nexus_of(cell, Faction::Heroes))
    }

    /// Obstacles a hero could clear, in disambiguation order.
    #[must_use]
    pub fn obstacle_candidates(world: &World, hero: UnitId) -> Vec<CellCoord> {
        world
            .living_hero(hero)
            .map(|(_, cell)| world.board.obstacles_around(cell))
            .unwrap_or_default()
    }

    /// Living allies standing in another lane, valid as teleport anchors.
    #[must_use]
    pub fn teleport_allies(world: &World, hero: UnitId) -> Vec<UnitId> {
        let Ok((_, cell)) = world.living_hero(hero) else {
            return Vec::new();
        };
        world
            .heroes
            .iter()
            .filter(|ally| ally.id != hero && ally.is_alive())
            .filter(|ally| {
                world
                    .registry
                    .position(ally.id)
                    .is_some_and(|ally_cell| ally_cell.column().abs_diff(cell.column()) > 1)
            })
            .map(|ally| ally.id)
            .collect()
    }

    /// Whether a unit could step onto `cell` right now.
    #[must_use]
    pub fn is_open(world: &World, cell: CellCoord) -> bool {
        world.board.is_open(cell)
    }

    /// Number of monsters currently alive.
    #[must_use]
    pub fn live_monster_count(world: &World) -> usize {
        world
            .monsters
            .iter()
            .filter(|monster| monster.is_alive())
            .count()
    }

    /// Highest level among all heroes, fallen or not.
    #[must_use]
    pub fn highest_hero_level(world: &World) -> u32 {
        world
            .heroes
            .iter()
            .map(|hero| hero.level)
            .max()
            .unwrap_or(1)
    }

    /// Most recent combat records, oldest first.
    #[must_use]
    pub fn combat_log(world: &World) -> Vec<Event> {
        world.log.iter().cloned().collect()
    }

    /// Mismatches between stored positions and occupant pointers.
    #[must_use]
    pub fn consistency_report(world: &World) -> Vec<Inconsistency> {
        world.registry.audit(&world.board)
    }
}
