//! Session configuration shared by the world, systems and adapters.

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Health and mana restored when a fallen hero respawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespawnVitality {
    /// Respawn with full health and mana.
    #[default]
    Full,
    /// Respawn with half health and mana, rounded up.
    Half,
}

impl RespawnVitality {
    /// Portion of `maximum` restored on respawn.
    #[must_use]
    pub const fn restore(self, maximum: u32) -> u32 {
        match self {
            Self::Full => maximum,
            Self::Half => maximum / 2 + maximum % 2,
        }
    }
}

/// Board dimensions and the columns that form permanent lane walls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLayout {
    /// Number of rows, including both Nexus rows.
    pub rows: u32,
    /// Number of columns.
    pub columns: u32,
    /// Columns that are walls in every row.
    pub wall_columns: Vec<u32>,
}

impl BoardLayout {
    /// Whether `column` is a lane wall.
    #[must_use]
    pub fn is_wall_column(&self, column: u32) -> bool {
        self.wall_columns.contains(&column)
    }

    /// Index of the heroes' Nexus row.
    #[must_use]
    pub const fn last_row(&self) -> u32 {
        self.rows.saturating_sub(1)
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 8,
            wall_columns: vec![2, 5],
        }
    }
}

/// Tunable parameters of a play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Difficulty preset governing spawn cadence.
    pub difficulty: Difficulty,
    /// Seed for every random stream; drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Gold each hero starts with.
    pub starting_gold: u32,
    /// Vitality restored on respawn.
    pub respawn: RespawnVitality,
    /// Number of combat records retained.
    pub combat_log_capacity: usize,
    /// Board geometry.
    pub board: BoardLayout,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: None,
            starting_gold: 2000,
            respawn: RespawnVitality::default(),
            combat_log_capacity: 10,
            board: BoardLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_respawn_rounds_up() {
        assert_eq!(RespawnVitality::Half.restore(101), 51);
        assert_eq!(RespawnVitality::Half.restore(100), 50);
        assert_eq!(RespawnVitality::Full.restore(101), 101);
    }

    #[test]
    fn default_layout_has_two_walls() {
        let layout = BoardLayout::default();
        assert!(layout.is_wall_column(2));
        assert!(layout.is_wall_column(5));
        assert!(!layout.is_wall_column(4));
        assert_eq!(layout.last_row(), 7);
    }
}
