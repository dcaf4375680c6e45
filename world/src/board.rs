//! Lane board topology: terrain tags, occupant pointers and footprints.

use valor_core::{
    ActionError, BoardLayout, CellCoord, Dice, Direction, Faction, MoveBlock, TerrainKind, UnitId,
};

const MYSTERY_CHANCE: f64 = 0.15;

/// Single board cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Space {
    terrain: TerrainKind,
    occupant: Option<UnitId>,
    footprint: Option<UnitId>,
}

impl Space {
    const fn new(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            occupant: None,
            footprint: None,
        }
    }

    /// Terrain tag of the cell.
    #[must_use]
    pub const fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Unit standing on the cell.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Unit whose double-wide starting footprint covers this cell.
    ///
    /// Purely visual: a footprint never blocks movement and never counts as
    /// an occupant.
    #[must_use]
    pub const fn footprint(&self) -> Option<UnitId> {
        self.footprint
    }
}

/// Fixed-size matrix of cells owned by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridBoard {
    layout: BoardLayout,
    spaces: Vec<Space>,
}

impl GridBoard {
    /// Generates a lane board, drawing interior terrain from `dice`.
    ///
    /// Row 0 becomes the monsters' Nexus and the last row the heroes' Nexus.
    /// Wall columns are Inaccessible in every row. Interior cells are rolled
    /// row by row, then every interior cell gets an independent chance to be
    /// overwritten by a Mystery.
    pub fn generate(layout: BoardLayout, dice: &mut dyn Dice) -> Self {
        let mut board = Self::with_fill(layout, |_| TerrainKind::Plain);
        for index in 0..board.spaces.len() {
            let cell = board.coord(index);
            if board.is_interior(cell) {
                board.spaces[index].terrain = roll_terrain(dice.below(100));
            }
        }
        for index in 0..board.spaces.len() {
            let cell = board.coord(index);
            if board.is_interior(cell) && dice.chance(MYSTERY_CHANCE) {
                board.spaces[index].terrain = TerrainKind::Mystery;
            }
        }
        board
    }

    /// Builds a lane board whose interior is entirely `fill`.
    #[must_use]
    pub fn uniform(layout: BoardLayout, fill: TerrainKind) -> Self {
        Self::with_fill(layout, |_| fill)
    }

    fn with_fill(layout: BoardLayout, fill: impl Fn(CellCoord) -> TerrainKind) -> Self {
        let capacity_u64 = u64::from(layout.columns) * u64::from(layout.rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut board = Self {
            spaces: vec![Space::new(TerrainKind::Plain); capacity],
            layout,
        };
        for index in 0..board.spaces.len() {
            let cell = board.coord(index);
            board.spaces[index].terrain = if board.layout.is_wall_column(cell.column()) {
                TerrainKind::Inaccessible
            } else if cell.row() == 0 {
                TerrainKind::Nexus(Faction::Monsters)
            } else if cell.row() == board.layout.last_row() {
                TerrainKind::Nexus(Faction::Heroes)
            } else {
                fill(cell)
            };
        }
        board
    }

    /// Replaces the terrain of an interior, non-wall cell.
    ///
    /// Nexus rows and wall columns are fixed by the layout and cannot be
    /// overridden.
    pub fn with_terrain(
        mut self,
        cell: CellCoord,
        terrain: TerrainKind,
    ) -> Result<Self, ActionError> {
        let index = self.checked_index(cell)?;
        if !self.is_interior(cell) {
            return Err(ActionError::InvalidPosition { cell });
        }
        self.spaces[index].terrain = terrain;
        Ok(self)
    }

    /// Geometry the board was built from.
    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.layout.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.layout.columns
    }

    /// Whether `cell` lies on the board.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Retrieves a cell, failing with `InvalidPosition` outside the board.
    pub fn get(&self, cell: CellCoord) -> Result<&Space, ActionError> {
        let index = self.checked_index(cell)?;
        Ok(&self.spaces[index])
    }

    /// Terrain of `cell`, or `None` outside the board.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainKind> {
        self.get(cell).ok().map(Space::terrain)
    }

    /// Occupant of `cell`, or `None` when empty or outside the board.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.get(cell).ok().and_then(Space::occupant)
    }

    /// Whether a unit could step onto `cell` right now.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.check_entry(Some(cell)).is_ok()
    }

    /// Validates a movement target produced by [`CellCoord::step`].
    pub fn check_entry(&self, target: Option<CellCoord>) -> Result<CellCoord, MoveBlock> {
        let Some(cell) = target else {
            return Err(MoveBlock::OutOfBounds);
        };
        let Ok(space) = self.get(cell) else {
            return Err(MoveBlock::OutOfBounds);
        };
        match space.terrain {
            TerrainKind::Inaccessible => Err(MoveBlock::Inaccessible(cell)),
            TerrainKind::Obstacle => Err(MoveBlock::Obstacle(cell)),
            _ if space.occupant.is_some() => Err(MoveBlock::Occupied(cell)),
            _ => Ok(cell),
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Space)> + '_ {
        self.spaces
            .iter()
            .enumerate()
            .map(|(index, space)| (self.coord(index), space))
    }

    /// Obstacles among the nine cells centred on `center`.
    ///
    /// Candidates are listed centre first, then up, down, left, right and the
    /// four diagonals; callers disambiguate by position in this list.
    #[must_use]
    pub fn obstacles_around(&self, center: CellCoord) -> Vec<CellCoord> {
        let up = center.step(Direction::Up);
        let down = center.step(Direction::Down);
        let left = center.step(Direction::Left);
        let right = center.step(Direction::Right);
        let neighbourhood = [
            Some(center),
            up,
            down,
            left,
            right,
            up.and_then(|cell| cell.step(Direction::Left)),
            up.and_then(|cell| cell.step(Direction::Right)),
            down.and_then(|cell| cell.step(Direction::Left)),
            down.and_then(|cell| cell.step(Direction::Right)),
        ];
        neighbourhood
            .into_iter()
            .flatten()
            .filter(|cell| self.terrain(*cell) == Some(TerrainKind::Obstacle))
            .collect()
    }

    /// Whether `cell` is a Nexus belonging to `faction`.
    #[must_use]
    pub fn is_nexus_of(&self, cell: CellCoord, faction: Faction) -> bool {
        self.terrain(cell) == Some(TerrainKind::Nexus(faction))
    }

    pub(crate) fn place_occupant(
        &mut self,
        unit: UnitId,
        cell: CellCoord,
    ) -> Result<(), ActionError> {
        let index = self.checked_index(cell)?;
        let space = &mut self.spaces[index];
        match space.terrain {
            TerrainKind::Inaccessible => return Err(MoveBlock::Inaccessible(cell).into()),
            TerrainKind::Obstacle => return Err(MoveBlock::Obstacle(cell).into()),
            _ => {}
        }
        if space.occupant.is_some() {
            return Err(MoveBlock::Occupied(cell).into());
        }
        space.occupant = Some(unit);
        space.footprint = None;
        Ok(())
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<UnitId> {
        let index = self.index(cell)?;
        self.spaces[index].occupant.take()
    }

    /// Removes every occupant pointer and footprint referencing `unit`.
    pub(crate) fn forget(&mut self, unit: UnitId) {
        for space in &mut self.spaces {
            if space.occupant == Some(unit) {
                space.occupant = None;
            }
            if space.footprint == Some(unit) {
                space.footprint = None;
            }
        }
    }

    pub(crate) fn mark_footprint(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            let space = &mut self.spaces[index];
            if space.occupant.is_none() && space.terrain.is_enterable() {
                space.footprint = Some(unit);
            }
        }
    }

    pub(crate) fn clear_footprints(&mut self, unit: UnitId) {
        for space in &mut self.spaces {
            if space.footprint == Some(unit) {
                space.footprint = None;
            }
        }
    }

    /// Forces every wall column back to Inaccessible.
    pub(crate) fn enforce_walls(&mut self) {
        for index in 0..self.spaces.len() {
            let cell = self.coord(index);
            if self.layout.is_wall_column(cell.column()) {
                self.spaces[index].terrain = TerrainKind::Inaccessible;
            }
        }
    }

    /// Turns an Obstacle into Plain. The transition is one-way.
    pub(crate) fn clear_obstacle(&mut self, cell: CellCoord) -> bool {
        match self.index(cell) {
            Some(index) if self.spaces[index].terrain == TerrainKind::Obstacle => {
                self.spaces[index].terrain = TerrainKind::Plain;
                true
            }
            _ => false,
        }
    }

    /// Turns a Mystery into an opened Treasure. The transition is one-way.
    pub(crate) fn reveal_mystery(&mut self, cell: CellCoord) -> bool {
        match self.index(cell) {
            Some(index) if self.spaces[index].terrain == TerrainKind::Mystery => {
                self.spaces[index].terrain = TerrainKind::Treasure;
                true
            }
            _ => false,
        }
    }

    fn is_interior(&self, cell: CellCoord) -> bool {
        cell.row() > 0
            && cell.row() < self.layout.last_row()
            && !self.layout.is_wall_column(cell.column())
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, ActionError> {
        self.index(cell)
            .ok_or(ActionError::InvalidPosition { cell })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.layout.columns && cell.row() < self.layout.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.layout.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn coord(&self, index: usize) -> CellCoord {
        let width = usize::try_from(self.layout.columns).unwrap_or(1).max(1);
        let row = u32::try_from(index / width).unwrap_or(u32::MAX);
        let column = u32::try_from(index % width).unwrap_or(u32::MAX);
        CellCoord::new(row, column)
    }
}

/// Maps a uniform draw in `0..100` onto interior terrain.
pub(crate) const fn roll_terrain(value: u32) -> TerrainKind {
    match value {
        0..=14 => TerrainKind::Bush,
        15..=29 => TerrainKind::Cave,
        30..=44 => TerrainKind::Koulou,
        45..=54 => TerrainKind::Obstacle,
        _ => TerrainKind::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedDice;

    fn plain_board() -> GridBoard {
        GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain)
    }

    #[test]
    fn terrain_thresholds_are_cumulative() {
        assert_eq!(roll_terrain(0), TerrainKind::Bush);
        assert_eq!(roll_terrain(14), TerrainKind::Bush);
        assert_eq!(roll_terrain(15), TerrainKind::Cave);
        assert_eq!(roll_terrain(29), TerrainKind::Cave);
        assert_eq!(roll_terrain(30), TerrainKind::Koulou);
        assert_eq!(roll_terrain(44), TerrainKind::Koulou);
        assert_eq!(roll_terrain(45), TerrainKind::Obstacle);
        assert_eq!(roll_terrain(54), TerrainKind::Obstacle);
        assert_eq!(roll_terrain(55), TerrainKind::Plain);
        assert_eq!(roll_terrain(99), TerrainKind::Plain);
    }

    #[test]
    fn boundary_rows_are_nexus_except_walls() {
        let board = plain_board();
        for column in 0..8 {
            let top = board.terrain(CellCoord::new(0, column));
            let bottom = board.terrain(CellCoord::new(7, column));
            if column == 2 || column == 5 {
                assert_eq!(top, Some(TerrainKind::Inaccessible));
                assert_eq!(bottom, Some(TerrainKind::Inaccessible));
            } else {
                assert_eq!(top, Some(TerrainKind::Nexus(Faction::Monsters)));
                assert_eq!(bottom, Some(TerrainKind::Nexus(Faction::Heroes)));
            }
        }
        for row in 1..7 {
            assert_eq!(
                board.terrain(CellCoord::new(row, 2)),
                Some(TerrainKind::Inaccessible)
            );
            assert_eq!(
                board.terrain(CellCoord::new(row, 5)),
                Some(TerrainKind::Inaccessible)
            );
        }
    }

    #[test]
    fn generation_rolls_terrain_then_mysteries() {
        let mut dice = ScriptedDice::new()
            .with_values([0])
            .with_chances([true]);
        let board = GridBoard::generate(BoardLayout::default(), &mut dice);
        assert_eq!(
            board.terrain(CellCoord::new(1, 0)),
            Some(TerrainKind::Mystery),
            "first interior cell rolled bush, then became a mystery"
        );
        assert_eq!(
            board.terrain(CellCoord::new(1, 1)),
            Some(TerrainKind::Bush),
            "remaining cells fall back to the scripted default draw"
        );
        assert_eq!(
            board.terrain(CellCoord::new(3, 2)),
            Some(TerrainKind::Inaccessible)
        );
    }

    #[test]
    fn get_rejects_out_of_bounds() {
        let board = plain_board();
        let cell = CellCoord::new(8, 0);
        assert_eq!(board.get(cell), Err(ActionError::InvalidPosition { cell }));
    }

    #[test]
    fn place_occupant_rejects_walls_obstacles_and_occupied_cells() {
        let obstacle = CellCoord::new(3, 3);
        let mut board = plain_board()
            .with_terrain(obstacle, TerrainKind::Obstacle)
            .expect("interior cell");
        let wall = CellCoord::new(4, 2);
        assert!(board.place_occupant(UnitId::new(1), wall).is_err());
        assert!(board.place_occupant(UnitId::new(1), obstacle).is_err());

        let open = CellCoord::new(4, 4);
        board.place_occupant(UnitId::new(1), open).expect("open cell");
        assert_eq!(
            board.place_occupant(UnitId::new(2), open),
            Err(MoveBlock::Occupied(open).into())
        );
        assert_eq!(board.occupant(open), Some(UnitId::new(1)));
    }

    #[test]
    fn nexus_rows_cannot_be_overridden() {
        let result = plain_board().with_terrain(CellCoord::new(0, 0), TerrainKind::Plain);
        assert!(result.is_err());
        let wall = plain_board().with_terrain(CellCoord::new(3, 5), TerrainKind::Plain);
        assert!(wall.is_err());
    }

    #[test]
    fn obstacles_are_listed_in_neighbourhood_order() {
        let center = CellCoord::new(3, 4);
        let board = plain_board()
            .with_terrain(CellCoord::new(2, 3), TerrainKind::Obstacle)
            .and_then(|board| board.with_terrain(CellCoord::new(4, 4), TerrainKind::Obstacle))
            .and_then(|board| board.with_terrain(CellCoord::new(1, 4), TerrainKind::Obstacle))
            .expect("interior cells");
        assert_eq!(
            board.obstacles_around(center),
            vec![CellCoord::new(4, 4), CellCoord::new(2, 3)]
        );
    }

    #[test]
    fn clearing_and_revealing_are_one_way() {
        let obstacle = CellCoord::new(3, 3);
        let mystery = CellCoord::new(3, 4);
        let mut board = plain_board()
            .with_terrain(obstacle, TerrainKind::Obstacle)
            .and_then(|board| board.with_terrain(mystery, TerrainKind::Mystery))
            .expect("interior cells");

        assert!(board.clear_obstacle(obstacle));
        assert_eq!(board.terrain(obstacle), Some(TerrainKind::Plain));
        assert!(!board.clear_obstacle(obstacle));

        assert!(board.reveal_mystery(mystery));
        assert_eq!(board.terrain(mystery), Some(TerrainKind::Treasure));
        assert!(!board.reveal_mystery(mystery));
    }

    #[test]
    fn footprints_never_block_and_clear_on_entry() {
        let mut board = plain_board();
        let cell = CellCoord::new(7, 0);
        board.mark_footprint(UnitId::new(1), cell);
        assert!(board.is_open(cell));
        board.place_occupant(UnitId::new(2), cell).expect("footprint is not an occupant");
        assert_eq!(board.get(cell).map(Space::footprint), Ok(None));
    }
}
