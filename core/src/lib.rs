#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Valor Lanes engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Rejected commands never mutate state;
//! they surface as [`Event::ActionRejected`] carrying an [`ActionError`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
mod items;
mod units;

pub use config::{BoardLayout, GameConfig, RespawnVitality};
pub use items::{
    weapon_damage, Armor, Handedness, Item, ItemKind, Potion, Spell, SpellElement, Stat, Weapon,
    WEAPON_DAMAGE_CAP,
};
pub use units::{
    Attributes, BaseStats, HeroClass, HeroSnapshot, HeroSpec, MonsterKind, MonsterSnapshot,
    MonsterSpec, Vital,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Valor Lanes.";

/// Highest level a hero can reach.
pub const MAX_LEVEL: u32 = 10;

/// Upper bound on simultaneously living monsters.
pub const MAX_LIVE_MONSTERS: usize = 3;

/// Attribute bonus granted by Bush, Cave and Koulou terrain.
pub const TERRAIN_BONUS: u32 = 10;

/// Side of the conflict a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Player-controlled heroes defending the bottom row.
    Heroes,
    /// Computer-controlled monsters descending from the top row.
    Monsters,
}

impl Faction {
    /// Faction fighting against `self`.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Heroes => Self::Monsters,
            Self::Monsters => Self::Heroes,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heroes => f.write_str("heroes"),
            Self::Monsters => f.write_str("monsters"),
        }
    }
}

/// Difficulty preset controlling how often reinforcements arrive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// A monster may spawn every sixth round.
    Easy,
    /// A monster may spawn every fourth round.
    #[default]
    Medium,
    /// A monster may spawn every second round.
    Hard,
}

impl Difficulty {
    /// Number of rounds between spawn attempts.
    #[must_use]
    pub const fn spawn_interval(self) -> u32 {
        match self {
            Self::Easy => 6,
            Self::Medium => 4,
            Self::Hard => 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => f.write_str("easy"),
            Self::Medium => f.write_str("medium"),
            Self::Hard => f.write_str("hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(Self::Easy),
            "medium" | "2" => Ok(Self::Medium),
            "hard" | "3" => Ok(Self::Hard),
            _ => Err(UnknownVariant::new("difficulty", value)),
        }
    }
}

/// Error returned when parsing an enumeration from text fails.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Unique identifier assigned to a hero or monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single board cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    #[must_use]
    pub const fn chebyshev_distance(self, other: CellCoord) -> u32 {
        let rows = self.row.abs_diff(other.row);
        let columns = self.column.abs_diff(other.column);
        if rows > columns {
            rows
        } else {
            columns
        }
    }

    /// Neighbouring cell one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant; the
    /// board is responsible for rejecting steps past its far edges.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Down => (self.row.checked_add(1)?, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
            Direction::Right => (self.row, self.column.checked_add(1)?),
        };
        Some(CellCoord::new(row, column))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Whether a hero standing on `hero` can strike a monster standing on `monster`.
///
/// Heroes reach the full 8-neighbourhood plus their own cell.
#[must_use]
pub const fn hero_reaches(hero: CellCoord, monster: CellCoord) -> bool {
    hero.chebyshev_distance(monster) <= 1
}

/// Whether a monster standing on `monster` can strike a hero standing on `hero`.
///
/// Monsters reach orthogonal neighbours and their own cell; diagonals are out of reach.
#[must_use]
pub const fn monster_reaches(monster: CellCoord, hero: CellCoord) -> bool {
    monster.manhattan_distance(hero) <= 1
}

/// Cardinal movement directions available to units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices (the monsters' home row).
    Up,
    /// Movement toward increasing row indices (the heroes' home row).
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Maps the conventional `w`/`a`/`s`/`d` keys to a direction.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::Up),
            'a' => Some(Self::Left),
            's' => Some(Self::Down),
            'd' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Hero attribute that terrain can temporarily raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Physical power; scales melee damage.
    Strength,
    /// Finesse; scales spell power in catalogs that use it.
    Dexterity,
    /// Evasiveness; scales the chance to dodge monster attacks.
    Agility,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strength => f.write_str("strength"),
            Self::Dexterity => f.write_str("dexterity"),
            Self::Agility => f.write_str("agility"),
        }
    }
}

/// Terrain tag carried by every board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open ground without effects.
    Plain,
    /// Undergrowth granting a dexterity bonus to heroes.
    Bush,
    /// Cavern granting an agility bonus to heroes.
    Cave,
    /// Sacred ground granting a strength bonus to heroes.
    Koulou,
    /// Blocking rubble that heroes may clear into plain ground.
    Obstacle,
    /// Permanent wall separating lanes.
    Inaccessible,
    /// Home row of the given faction.
    Nexus(Faction),
    /// Unexplored cell that hides a treasure chest.
    Mystery,
    /// Mystery cell whose chest has already been opened.
    Treasure,
    /// Trading post; inert on the lane board.
    Market,
}

impl TerrainKind {
    /// Whether a unit may ever stand on this terrain.
    #[must_use]
    pub const fn is_enterable(self) -> bool {
        !matches!(self, Self::Obstacle | Self::Inaccessible)
    }

    /// Attribute raised for heroes standing on this terrain, if any.
    #[must_use]
    pub const fn bonus(self) -> Option<Attribute> {
        match self {
            Self::Bush => Some(Attribute::Dexterity),
            Self::Cave => Some(Attribute::Agility),
            Self::Koulou => Some(Attribute::Strength),
            _ => None,
        }
    }
}

/// Identifies which equipped item an unequip request refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    /// Equipped weapon at the given position.
    Weapon(usize),
    /// The armor slot.
    Armor,
}

/// Identifies which spell a hero intends to cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellSource {
    /// Permanently learned spell at the given position; reusable.
    Learned(usize),
    /// Spell scroll at the given inventory position; consumed on cast.
    Inventory(usize),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Requests that a unit advance a single step in the specified direction.
    Move {
        /// Identifier of the hero or monster attempting to move.
        unit: UnitId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a hero jump next to an ally in another lane.
    Teleport {
        /// Hero performing the teleport.
        hero: UnitId,
        /// Ally whose surroundings receive the hero.
        ally: UnitId,
    },
    /// Requests that a hero return to its anchor cell.
    Recall {
        /// Hero returning home.
        hero: UnitId,
    },
    /// Requests a melee strike from a hero against a monster in reach.
    Attack {
        /// Attacking hero.
        hero: UnitId,
        /// Monster receiving the blow.
        target: UnitId,
    },
    /// Requests that a hero cast a spell at a monster in reach.
    CastSpell {
        /// Casting hero.
        hero: UnitId,
        /// Which spell to use.
        spell: SpellSource,
        /// Monster receiving the spell.
        target: UnitId,
    },
    /// Requests that a hero drink a potion from their inventory.
    UsePotion {
        /// Hero drinking the potion.
        hero: UnitId,
        /// Inventory position of the potion.
        item: usize,
    },
    /// Requests that a hero equip a weapon or armor from their inventory.
    Equip {
        /// Hero changing equipment.
        hero: UnitId,
        /// Inventory position of the item to equip.
        item: usize,
    },
    /// Requests that a hero return an equipped item to their inventory.
    Unequip {
        /// Hero changing equipment.
        hero: UnitId,
        /// Equipment slot to empty.
        slot: EquipSlot,
    },
    /// Requests that a hero clear an obstacle from their surroundings.
    ClearObstacle {
        /// Hero clearing the obstacle.
        hero: UnitId,
        /// Position among the candidate obstacles; required when more than one qualifies.
        choice: Option<usize>,
    },
    /// Requests that a hero buy an item while standing on their Nexus.
    Purchase {
        /// Hero spending gold.
        hero: UnitId,
        /// Item offered by the catalog.
        item: Item,
    },
    /// Requests that a hero sell an inventory item while standing on their Nexus.
    Sell {
        /// Hero receiving gold.
        hero: UnitId,
        /// Inventory position of the item to sell.
        item: usize,
    },
    /// Requests that a monster strike the weakest hero within its reach.
    MonsterStrike {
        /// Monster performing the attack.
        monster: UnitId,
    },
    /// Requests that a new monster enter the monsters' Nexus row.
    SpawnMonster {
        /// Stat block of the monster to introduce.
        spec: MonsterSpec,
    },
    /// Closes the current round: regeneration, respawns and round advance.
    EndRound,
}

/// Result of a single melee attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// The defender evaded the blow entirely.
    Dodged,
    /// The blow connected.
    Hit {
        /// Health removed from the defender.
        damage: u32,
        /// Whether the critical roll doubled the damage.
        critical: bool,
        /// Defender health remaining after the hit.
        remaining: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a unit moved a single step.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a hero teleported next to an ally.
    HeroTeleported {
        /// Hero that teleported.
        hero: UnitId,
        /// Ally the hero joined.
        ally: UnitId,
        /// Cell the hero left.
        from: CellCoord,
        /// Cell the hero arrived at.
        to: CellCoord,
    },
    /// Confirms that a hero returned to its anchor.
    HeroRecalled {
        /// Hero that was recalled.
        hero: UnitId,
        /// Cell the hero left.
        from: CellCoord,
        /// Anchor cell the hero arrived at.
        to: CellCoord,
    },
    /// Reports that a hero gained a terrain bonus on entering a cell.
    TerrainBonusGained {
        /// Hero receiving the bonus.
        hero: UnitId,
        /// Attribute that was raised.
        attribute: Attribute,
        /// Amount added to the attribute.
        amount: u32,
    },
    /// Reports that a hero lost a terrain bonus on leaving a cell.
    TerrainBonusLost {
        /// Hero losing the bonus.
        hero: UnitId,
        /// Attribute that was lowered.
        attribute: Attribute,
        /// Amount removed from the attribute.
        amount: u32,
    },
    /// Reports that a hero uncovered and opened a treasure chest.
    TreasureOpened {
        /// Hero that opened the chest.
        hero: UnitId,
        /// Cell that turned from Mystery into Treasure.
        cell: CellCoord,
        /// Gold found in the chest.
        gold: u32,
        /// Experience granted by the chest.
        experience: u32,
        /// Name of the item found, if any.
        item: Option<String>,
    },
    /// Reports the resolution of a melee attack.
    AttackResolved {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that defended.
        target: UnitId,
        /// Whether and how hard the blow connected.
        outcome: AttackOutcome,
    },
    /// Reports that a hero cast a spell at a monster.
    SpellCast {
        /// Casting hero.
        hero: UnitId,
        /// Monster hit by the spell.
        target: UnitId,
        /// Name of the spell.
        spell: String,
        /// Element of the spell, which determines the debuff.
        element: SpellElement,
        /// Health removed from the monster.
        damage: u32,
        /// Monster health remaining after the spell.
        remaining: u32,
    },
    /// Reports that a unit's health reached zero.
    UnitDefeated {
        /// Unit that fell.
        unit: UnitId,
        /// Faction the fallen unit belonged to.
        faction: Faction,
        /// Cell the unit occupied when it fell.
        cell: CellCoord,
    },
    /// Reports rewards paid to a hero after a monster fell.
    RewardsGranted {
        /// Hero receiving rewards.
        hero: UnitId,
        /// Gold added.
        gold: u32,
        /// Experience added.
        experience: u32,
    },
    /// Reports that a hero reached a new level.
    HeroLeveledUp {
        /// Hero that leveled up.
        hero: UnitId,
        /// Level reached.
        level: u32,
    },
    /// Reports that an obstacle was cleared into plain ground.
    ObstacleCleared {
        /// Hero that cleared the obstacle.
        hero: UnitId,
        /// Cell that became plain ground.
        cell: CellCoord,
    },
    /// Reports that a hero drank a potion.
    PotionConsumed {
        /// Hero that drank the potion.
        hero: UnitId,
        /// Name of the potion.
        potion: String,
    },
    /// Reports that a hero equipped an item.
    ItemEquipped {
        /// Hero changing equipment.
        hero: UnitId,
        /// Name of the equipped item.
        item: String,
    },
    /// Reports that a hero moved an equipped item back into the inventory.
    ItemUnequipped {
        /// Hero changing equipment.
        hero: UnitId,
        /// Name of the unequipped item.
        item: String,
    },
    /// Reports that a hero learned a spell permanently.
    SpellLearned {
        /// Hero that learned the spell.
        hero: UnitId,
        /// Name of the spell.
        spell: String,
    },
    /// Reports that a hero bought an item.
    ItemPurchased {
        /// Buying hero.
        hero: UnitId,
        /// Name of the item.
        item: String,
        /// Gold spent.
        cost: u32,
    },
    /// Reports that a hero sold an item.
    ItemSold {
        /// Selling hero.
        hero: UnitId,
        /// Name of the item.
        item: String,
        /// Gold received.
        refund: u32,
    },
    /// Reports end-of-round regeneration for a living hero.
    HeroRegenerated {
        /// Hero that regenerated.
        hero: UnitId,
        /// Health restored.
        health: u32,
        /// Mana restored.
        mana: u32,
    },
    /// Reports that a fallen hero returned at its anchor.
    HeroRespawned {
        /// Hero that returned.
        hero: UnitId,
        /// Anchor cell the hero returned to.
        cell: CellCoord,
    },
    /// Reports that a new monster entered the board.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: UnitId,
        /// Cell the monster occupies.
        cell: CellCoord,
        /// Level of the monster.
        level: u32,
        /// Display name of the monster.
        name: String,
    },
    /// Announces that a round completed.
    RoundAdvanced {
        /// Number of the round that just completed.
        round: u32,
    },
    /// Reports that a unit's position was repaired after an inconsistency.
    PositionRecovered {
        /// Unit whose position was repaired.
        unit: UnitId,
        /// Cell the unit was moved to.
        cell: CellCoord,
    },
    /// Reports that a command was rejected without mutating the world.
    ActionRejected {
        /// Unit the command was issued for, when applicable.
        unit: Option<UnitId>,
        /// Specific reason the command failed.
        reason: ActionError,
    },
    /// Announces that a faction reached the opposing Nexus.
    GameWon {
        /// Faction that won.
        winner: Faction,
        /// Unit that reached the opposing Nexus.
        unit: UnitId,
        /// Nexus cell that was reached.
        cell: CellCoord,
    },
}

impl Event {
    /// Whether the event belongs in the bounded combat log.
    #[must_use]
    pub const fn is_combat_record(&self) -> bool {
        matches!(
            self,
            Self::AttackResolved { .. }
                | Self::SpellCast { .. }
                | Self::UnitDefeated { .. }
                | Self::HeroRespawned { .. }
                | Self::MonsterSpawned { .. }
                | Self::GameWon { .. }
        )
    }
}

/// Reasons a movement request can be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveBlock {
    /// The target lies outside the board.
    #[error("the destination lies outside the board")]
    OutOfBounds,
    /// The target is a lane wall.
    #[error("{0} is a wall")]
    Inaccessible(CellCoord),
    /// The target is blocked by an obstacle.
    #[error("{0} is blocked by an obstacle")]
    Obstacle(CellCoord),
    /// The target holds another unit.
    #[error("{0} is occupied")]
    Occupied(CellCoord),
    /// Teleport requires the ally to stand in another lane.
    #[error("the ally stands in the same lane")]
    SameLane,
    /// No candidate cell next to the ally is free.
    #[error("no free cell next to the ally")]
    NoFreeCell,
    /// The action is only available on the heroes' Nexus.
    #[error("the hero is not standing on the heroes' Nexus")]
    NotAtNexus,
}

/// Resource that can run short when a hero acts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Current mana.
    Mana,
    /// Gold held.
    Gold,
    /// Hero level compared to an item's requirement.
    Level,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mana => f.write_str("mana"),
            Self::Gold => f.write_str("gold"),
            Self::Level => f.write_str("level"),
        }
    }
}

/// Recoverable reasons a command is refused by the world.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
    /// A coordinate lies outside the board.
    #[error("{cell} lies outside the board")]
    InvalidPosition {
        /// Offending coordinate.
        cell: CellCoord,
    },
    /// A movement was refused.
    #[error("illegal move: {reason}")]
    IllegalMove {
        /// Why the movement was refused.
        reason: MoveBlock,
    },
    /// The hero lacks mana, gold or level for the action.
    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        /// Resource that ran short.
        resource: Resource,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },
    /// The referenced unit is dead, absent or out of reach.
    #[error("unit {0} is not a valid target")]
    InvalidTarget(UnitId),
    /// A menu or item index does not refer to a usable entry.
    #[error("selection {index} is not available ({available} options)")]
    InvalidSelection {
        /// Index that was requested.
        index: usize,
        /// Number of valid entries.
        available: usize,
    },
}

impl ActionError {
    pub(crate) const fn blocked(reason: MoveBlock) -> Self {
        Self::IllegalMove { reason }
    }
}

impl From<MoveBlock> for ActionError {
    fn from(reason: MoveBlock) -> Self {
        Self::blocked(reason)
    }
}

/// Source of randomness consumed by the world.
///
/// Implementations must be deterministic for a given seed so sessions can be
/// replayed.
pub trait Dice: fmt::Debug {
    /// Returns `true` with the provided probability, clamped to `[0, 1]`.
    fn chance(&mut self, probability: f64) -> bool;

    /// Draws a uniform value in `0..upper`; an `upper` of zero yields zero.
    fn below(&mut self, upper: u32) -> u32;
}
