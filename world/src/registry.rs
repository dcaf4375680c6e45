//! Binding between stored unit coordinates and the board's occupant pointers.

use std::collections::BTreeMap;

use valor_core::{ActionError, CellCoord, UnitId};

use crate::board::GridBoard;

/// Mismatch between the registry and the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// The cell recorded for the unit does not point back at it.
    Displaced {
        /// Unit whose record is stale.
        unit: UnitId,
        /// Cell recorded in the registry.
        recorded: CellCoord,
    },
    /// A cell points at a unit that the registry places elsewhere or nowhere.
    Stray {
        /// Unit referenced by the cell.
        unit: UnitId,
        /// Cell holding the stale pointer.
        cell: CellCoord,
    },
}

impl Inconsistency {
    /// Unit affected by the mismatch.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::Displaced { unit, .. } | Self::Stray { unit, .. } => *unit,
        }
    }
}

/// Single source of truth for where every placed unit stands.
///
/// Every placement and relocation goes through the registry so the stored
/// coordinate and the board's occupant pointer change together. Terrain
/// passability beyond what the board itself enforces is the caller's concern.
#[derive(Clone, Debug, Default)]
pub struct UnitPositionRegistry {
    positions: BTreeMap<UnitId, CellCoord>,
}

impl UnitPositionRegistry {
    /// Cell the unit stands on, if placed.
    #[must_use]
    pub fn position(&self, unit: UnitId) -> Option<CellCoord> {
        self.positions.get(&unit).copied()
    }

    /// Every placed unit with its cell, ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, CellCoord)> + '_ {
        self.positions.iter().map(|(unit, cell)| (*unit, *cell))
    }

    /// Places a unit that is not currently on the board.
    pub(crate) fn place(
        &mut self,
        board: &mut GridBoard,
        unit: UnitId,
        cell: CellCoord,
    ) -> Result<(), ActionError> {
        debug_assert!(
            !self.positions.contains_key(&unit),
            "place requires an unplaced unit"
        );
        board.place_occupant(unit, cell)?;
        let _ = self.positions.insert(unit, cell);
        Ok(())
    }

    /// Moves a placed unit, returning the cell it left.
    pub(crate) fn relocate(
        &mut self,
        board: &mut GridBoard,
        unit: UnitId,
        to: CellCoord,
    ) -> Result<CellCoord, ActionError> {
        let Some(from) = self.position(unit) else {
            return Err(ActionError::InvalidTarget(unit));
        };
        if from == to {
            return Ok(from);
        }
        board.place_occupant(unit, to)?;
        let _ = board.vacate(from);
        board.clear_footprints(unit);
        let _ = self.positions.insert(unit, to);
        Ok(from)
    }

    /// Takes a unit off the board, returning the cell it occupied.
    pub(crate) fn remove(&mut self, board: &mut GridBoard, unit: UnitId) -> Option<CellCoord> {
        let cell = self.positions.remove(&unit)?;
        board.forget(unit);
        Some(cell)
    }

    /// Drops every trace of a unit, whether or not the records agree.
    pub(crate) fn purge(&mut self, board: &mut GridBoard, unit: UnitId) {
        let _ = self.positions.remove(&unit);
        board.forget(unit);
    }

    /// Lists every mismatch between stored coordinates and occupant pointers.
    #[must_use]
    pub fn audit(&self, board: &GridBoard) -> Vec<Inconsistency> {
        let mut report: Vec<Inconsistency> = self
            .positions
            .iter()
            .filter(|(unit, cell)| board.occupant(**cell) != Some(**unit))
            .map(|(unit, cell)| Inconsistency::Displaced {
                unit: *unit,
                recorded: *cell,
            })
            .collect();
        report.extend(board.cells().filter_map(|(cell, space)| {
            let unit = space.occupant()?;
            (self.position(unit) != Some(cell)).then_some(Inconsistency::Stray { unit, cell })
        }));
        report
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, unit: UnitId, cell: CellCoord) {
        let _ = self.positions.insert(unit, cell);
    }
}
