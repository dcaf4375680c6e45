//! World construction: board generation and the initial roster layout.

use thiserror::Error;
use valor_core::{
    ActionError, CellCoord, Dice, Faction, GameConfig, HeroSpec, MonsterSpec, MAX_LIVE_MONSTERS,
    WELCOME_BANNER,
};

use crate::{
    board::GridBoard,
    log::CombatLog,
    registry::UnitPositionRegistry,
    units::{Hero, Monster},
    World,
};

/// Upper bound on the hero roster.
pub const MAX_HEROES: usize = 3;

/// Column stride between the starting pairs of adjacent lanes.
const LANE_STRIDE: u32 = 3;

/// Reasons a world cannot be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// The board needs two Nexus rows and at least one interior row.
    #[error("board needs at least three rows, got {rows}")]
    LayoutTooSmall {
        /// Rows requested.
        rows: u32,
    },
    /// More units were requested than a faction may field.
    #[error("at most {limit} {faction} may start, got {requested}")]
    RosterTooLarge {
        /// Faction whose roster is too large.
        faction: Faction,
        /// Units requested.
        requested: usize,
        /// Allowed maximum.
        limit: usize,
    },
    /// A standard starting footprint would overlap a lane wall.
    #[error("starting footprint of {faction} slot {slot} overlaps wall column {column}")]
    FootprintOnWall {
        /// Faction of the unit.
        faction: Faction,
        /// One-based display slot.
        slot: usize,
        /// Wall column hit by the footprint.
        column: u32,
    },
    /// A standard starting footprint falls off the board.
    #[error("starting footprint of {faction} slot {slot} lies outside the board")]
    FootprintOutOfBounds {
        /// Faction of the unit.
        faction: Faction,
        /// One-based display slot.
        slot: usize,
    },
    /// A unit could not be placed on its starting cell.
    #[error("cannot place {name}: {source}")]
    Placement {
        /// Name of the unit.
        name: String,
        /// Why the board refused the placement.
        #[source]
        source: ActionError,
    },
}

#[derive(Clone, Copy, Debug)]
enum Placement {
    Standard,
    At(CellCoord),
}

/// Collects the board and roster before building a [`World`].
#[derive(Debug)]
pub struct WorldBuilder {
    config: GameConfig,
    board: Option<GridBoard>,
    heroes: Vec<(HeroSpec, Placement)>,
    monsters: Vec<(MonsterSpec, Placement)>,
}

impl WorldBuilder {
    pub(crate) fn new(config: GameConfig) -> Self {
        Self {
            config,
            board: None,
            heroes: Vec::new(),
            monsters: Vec::new(),
        }
    }

    /// Uses a prepared board instead of generating one from the dice.
    #[must_use]
    pub fn board(mut self, board: GridBoard) -> Self {
        self.config.board = board.layout().clone();
        self.board = Some(board);
        self
    }

    /// Adds a hero at the next standard starting pair on the heroes' row.
    #[must_use]
    pub fn hero(mut self, spec: HeroSpec) -> Self {
        self.heroes.push((spec, Placement::Standard));
        self
    }

    /// Adds a hero at an explicit cell; its anchor stays the standard one.
    #[must_use]
    pub fn hero_at(mut self, spec: HeroSpec, cell: CellCoord) -> Self {
        self.heroes.push((spec, Placement::At(cell)));
        self
    }

    /// Adds a monster at the next standard starting pair on the monsters' row.
    #[must_use]
    pub fn monster(mut self, spec: MonsterSpec) -> Self {
        self.monsters.push((spec, Placement::Standard));
        self
    }

    /// Adds a monster at an explicit cell.
    #[must_use]
    pub fn monster_at(mut self, spec: MonsterSpec, cell: CellCoord) -> Self {
        self.monsters.push((spec, Placement::At(cell)));
        self
    }

    /// Builds the world, generating the board from `dice` when none was supplied.
    pub fn build(self, mut dice: Box<dyn Dice>) -> Result<World, SetupError> {
        let layout = self.config.board.clone();
        if layout.rows < 3 {
            return Err(SetupError::LayoutTooSmall { rows: layout.rows });
        }
        check_roster(Faction::Heroes, self.heroes.len(), MAX_HEROES)?;
        check_roster(Faction::Monsters, self.monsters.len(), MAX_LIVE_MONSTERS)?;

        let mut board = match self.board {
            Some(board) => board,
            None => GridBoard::generate(layout.clone(), dice.as_mut()),
        };
        board.enforce_walls();

        let mut world = World {
            banner: WELCOME_BANNER,
            log: CombatLog::new(self.config.combat_log_capacity),
            config: self.config,
            board,
            registry: UnitPositionRegistry::default(),
            heroes: Vec::new(),
            monsters: Vec::new(),
            dice,
            round: 1,
            next_unit: 0,
            winner: None,
        };

        let hero_row = layout.last_row();
        for (index, (spec, placement)) in self.heroes.into_iter().enumerate() {
            let (first, second) = starting_pair(&world.board, Faction::Heroes, index)?;
            let anchor = CellCoord::new(hero_row, second);
            let id = world.allocate_id();
            let cell = place(&mut world, id, &spec.name, placement, anchor)?;
            if matches!(placement, Placement::Standard) {
                world.board.mark_footprint(id, CellCoord::new(hero_row, first));
            }
            tracing::debug!(hero = %spec.name, %cell, %anchor, "hero placed");
            world
                .heroes
                .push(Hero::from_spec(id, slot_label(index), spec, anchor));
        }

        for (index, (spec, placement)) in self.monsters.into_iter().enumerate() {
            let (first, second) = starting_pair(&world.board, Faction::Monsters, index)?;
            let home = CellCoord::new(0, second);
            let id = world.allocate_id();
            let cell = place(&mut world, id, &spec.name, placement, home)?;
            if matches!(placement, Placement::Standard) {
                world.board.mark_footprint(id, CellCoord::new(0, first));
            }
            tracing::debug!(monster = %spec.name, %cell, "monster placed");
            world
                .monsters
                .push(Monster::from_spec(id, slot_label(index), spec));
        }

        Ok(world)
    }
}

fn check_roster(faction: Faction, requested: usize, limit: usize) -> Result<(), SetupError> {
    if requested > limit {
        return Err(SetupError::RosterTooLarge {
            faction,
            requested,
            limit,
        });
    }
    Ok(())
}

/// Columns of the double-wide starting footprint for roster position `index`.
///
/// Guards against footprints that would land on a lane wall; such a layout
/// would strand the unit once the walls are enforced.
fn starting_pair(
    board: &GridBoard,
    faction: Faction,
    index: usize,
) -> Result<(u32, u32), SetupError> {
    let slot = index + 1;
    let lane = u32::try_from(index).unwrap_or(u32::MAX);
    let first = lane.saturating_mul(LANE_STRIDE);
    let second = first.saturating_add(1);
    if second >= board.columns() {
        return Err(SetupError::FootprintOutOfBounds { faction, slot });
    }
    for column in [first, second] {
        if board.layout().is_wall_column(column) {
            tracing::error!(%faction, slot, column, "starting footprint overlaps a lane wall");
            return Err(SetupError::FootprintOnWall {
                faction,
                slot,
                column,
            });
        }
    }
    Ok((first, second))
}

fn place(
    world: &mut World,
    id: valor_core::UnitId,
    name: &str,
    placement: Placement,
    standard: CellCoord,
) -> Result<CellCoord, SetupError> {
    let cell = match placement {
        Placement::Standard => standard,
        Placement::At(cell) => cell,
    };
    world
        .registry
        .place(&mut world.board, id, cell)
        .map_err(|source| SetupError::Placement {
            name: name.to_owned(),
            source,
        })?;
    Ok(cell)
}

fn slot_label(index: usize) -> u8 {
    u8::try_from(index + 1).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query, ScriptedDice};
    use valor_core::{BoardLayout, HeroClass, MonsterKind, TerrainKind};

    fn plain() -> GridBoard {
        GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain)
    }

    fn dice() -> Box<dyn Dice> {
        Box::new(ScriptedDice::new())
    }

    #[test]
    fn standard_layout_places_pairs_and_anchors() {
        let world = World::builder(GameConfig::default())
            .board(plain())
            .hero(HeroSpec::new("Gaerdal", HeroClass::Warrior, 2000))
            .hero(HeroSpec::new("Rillifane", HeroClass::Sorcerer, 2000))
            .hero(HeroSpec::new("Parzival", HeroClass::Paladin, 2000))
            .monster(MonsterSpec::from_template(MonsterKind::Dragon, 1, "Igneel"))
            .build(dice())
            .expect("standard layout");

        let heroes = query::heroes(&world);
        let cells: Vec<_> = heroes.iter().map(|hero| hero.cell).collect();
        assert_eq!(
            cells,
            vec![
                Some(CellCoord::new(7, 1)),
                Some(CellCoord::new(7, 4)),
                Some(CellCoord::new(7, 7)),
            ]
        );
        assert!(heroes.iter().all(|hero| hero.cell == Some(hero.anchor)));

        let board = query::board(&world);
        let footprint = board.get(CellCoord::new(7, 3)).expect("on board");
        assert_eq!(footprint.footprint(), Some(heroes[1].id));
        assert_eq!(footprint.occupant(), None);

        let monsters = query::monsters(&world);
        assert_eq!(monsters[0].cell, CellCoord::new(0, 1));
        assert_eq!(monsters[0].label(), "M1");
        assert!(query::consistency_report(&world).is_empty());
    }

    #[test]
    fn footprint_on_wall_is_refused() {
        let layout = BoardLayout {
            wall_columns: vec![3, 5],
            ..BoardLayout::default()
        };
        let result = World::builder(GameConfig::default())
            .board(GridBoard::uniform(layout, TerrainKind::Plain))
            .hero(HeroSpec::new("Gaerdal", HeroClass::Warrior, 2000))
            .hero(HeroSpec::new("Rillifane", HeroClass::Sorcerer, 2000))
            .build(dice());
        assert_eq!(
            result.err(),
            Some(SetupError::FootprintOnWall {
                faction: Faction::Heroes,
                slot: 2,
                column: 3,
            })
        );
    }

    #[test]
    fn oversized_rosters_are_refused() {
        let mut builder = World::builder(GameConfig::default()).board(plain());
        for index in 0..4 {
            builder = builder.monster(MonsterSpec::from_template(
                MonsterKind::Spirit,
                1,
                format!("Spirit {index}"),
            ));
        }
        assert!(matches!(
            builder.build(dice()),
            Err(SetupError::RosterTooLarge { limit: 3, .. })
        ));
    }

    #[test]
    fn explicit_placement_on_a_wall_is_refused() {
        let result = World::builder(GameConfig::default())
            .board(plain())
            .hero_at(
                HeroSpec::new("Gaerdal", HeroClass::Warrior, 2000),
                CellCoord::new(3, 2),
            )
            .build(dice());
        assert!(matches!(result, Err(SetupError::Placement { .. })));
    }
}
