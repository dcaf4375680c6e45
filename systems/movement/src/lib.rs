#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic monster behaviour: strike when a hero is in reach, otherwise
//! advance one greedy step toward the heroes' Nexus.

use valor_core::{CellCoord, Command, Direction, MonsterSnapshot, UnitId};

/// Step order tried by advancing monsters.
const STEP_PREFERENCE: [Direction; 3] = [Direction::Down, Direction::Left, Direction::Right];

/// Pure system that decides a monster's action for its turn.
#[derive(Debug)]
pub struct Movement {
    preference: [Direction; 3],
}

impl Movement {
    /// Emits the command for one monster's turn.
    ///
    /// `heroes_in_reach` lists the heroes the monster could strike and
    /// `is_cell_open` reports whether a cell may be entered. A monster boxed
    /// in on all candidate sides emits nothing and waits.
    pub fn handle<F>(
        &mut self,
        monster: &MonsterSnapshot,
        heroes_in_reach: &[UnitId],
        is_cell_open: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        if !heroes_in_reach.is_empty() {
            out.push(Command::MonsterStrike {
                monster: monster.id,
            });
            return;
        }

        match self.next_step(monster.cell, is_cell_open) {
            Some(direction) => out.push(Command::Move {
                unit: monster.id,
                direction,
            }),
            None => {
                tracing::debug!(
                    monster = %monster.name,
                    cell = %monster.cell,
                    "monster is boxed in"
                );
            }
        }
    }

    /// First open direction in preference order; obstacles are never routed
    /// around.
    #[must_use]
    pub fn next_step<F>(&self, cell: CellCoord, is_cell_open: F) -> Option<Direction>
    where
        F: Fn(CellCoord) -> bool,
    {
        self.preference.iter().copied().find(|direction| {
            cell.step(*direction)
                .is_some_and(|target| is_cell_open(target))
        })
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            preference: STEP_PREFERENCE,
        }
    }
}
