//! Roster construction parameters and read-only unit snapshots.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Attribute, CellCoord, Item, UnitId, UnknownVariant};

/// Hero archetype determining starting stats and level-up growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeroClass {
    /// Strength and agility focused fighter.
    Warrior,
    /// Dexterity and agility focused caster with a deep mana pool.
    Sorcerer,
    /// Strength and dexterity focused knight.
    Paladin,
}

impl HeroClass {
    /// Level-one stats for the class.
    #[must_use]
    pub const fn base_stats(self) -> BaseStats {
        let (mana, strength, dexterity, agility) = match self {
            Self::Warrior => (500, 750, 500, 750),
            Self::Sorcerer => (700, 500, 750, 750),
            Self::Paladin => (500, 750, 750, 500),
        };
        BaseStats {
            health: 100,
            mana,
            strength,
            dexterity,
            agility,
        }
    }

    /// Percentage growth applied to an attribute on level-up.
    #[must_use]
    pub const fn growth_percent(self, attribute: Attribute) -> u32 {
        match (self, attribute) {
            (Self::Warrior, Attribute::Dexterity)
            | (Self::Sorcerer, Attribute::Strength)
            | (Self::Paladin, Attribute::Agility) => 5,
            _ => 10,
        }
    }
}

impl fmt::Display for HeroClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warrior => f.write_str("Warrior"),
            Self::Sorcerer => f.write_str("Sorcerer"),
            Self::Paladin => f.write_str("Paladin"),
        }
    }
}

impl FromStr for HeroClass {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warrior" | "w" => Ok(Self::Warrior),
            "sorcerer" | "s" => Ok(Self::Sorcerer),
            "paladin" | "p" => Ok(Self::Paladin),
            _ => Err(UnknownVariant::new("hero class", value)),
        }
    }
}

/// Maximum vitals and base attributes of a hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum health.
    pub health: u32,
    /// Maximum mana.
    pub mana: u32,
    /// Base strength.
    pub strength: u32,
    /// Base dexterity.
    pub dexterity: u32,
    /// Base agility.
    pub agility: u32,
}

/// Construction parameters for a single hero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSpec {
    /// Display name.
    pub name: String,
    /// Class governing growth.
    pub class: HeroClass,
    /// Starting stats at level one.
    pub stats: BaseStats,
    /// Starting gold.
    pub gold: u32,
    /// Items carried at the start of the session.
    pub inventory: Vec<Item>,
}

impl HeroSpec {
    /// Creates a hero with the class defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, class: HeroClass, gold: u32) -> Self {
        Self {
            name: name.into(),
            class,
            stats: class.base_stats(),
            gold,
            inventory: Vec::new(),
        }
    }

    /// Replaces the class defaults with explicit stats.
    #[must_use]
    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = stats;
        self
    }

    /// Adds an item to the starting inventory.
    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }
}

/// Monster archetype used to derive stat blocks per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Hard-hitting monster.
    Dragon,
    /// Heavily armored monster.
    Exoskeleton,
    /// Elusive monster with a high dodge chance.
    Spirit,
}

impl MonsterKind {
    /// Every archetype, in a stable order.
    pub const ALL: [MonsterKind; 3] = [Self::Dragon, Self::Exoskeleton, Self::Spirit];

    /// Names drawn for spawned monsters of this archetype.
    #[must_use]
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::Dragon => &["Desghidorrah", "Chrysophylax", "Natsunomeryu", "Igneel"],
            Self::Exoskeleton => &["Cyrrollalee", "Brandobaris", "Big Bad Wolf", "Aasterinian"],
            Self::Spirit => &["Andrealphus", "Blinky", "Casper", "Aim Haborym"],
        }
    }
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dragon => f.write_str("Dragon"),
            Self::Exoskeleton => f.write_str("Exoskeleton"),
            Self::Spirit => f.write_str("Spirit"),
        }
    }
}

/// Construction parameters for a single monster.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterSpec {
    /// Display name.
    pub name: String,
    /// Archetype the stats were derived from.
    pub kind: MonsterKind,
    /// Level; maximum health is `level × 100`.
    pub level: u32,
    /// Damage rating before level scaling.
    pub base_damage: u32,
    /// Defense rating.
    pub defense: u32,
    /// Chance to dodge hero attacks, in whole percent.
    pub dodge_percent: u32,
}

impl MonsterSpec {
    /// Derives the stat block of an archetype at the given level.
    #[must_use]
    pub fn from_template(kind: MonsterKind, level: u32, name: impl Into<String>) -> Self {
        let level = level.max(1);
        let (base_damage, defense, dodge_percent) = match kind {
            MonsterKind::Dragon => (150 * level, 100 * level, 10 + level),
            MonsterKind::Exoskeleton => (100 * level, 200 * level, 15 + level),
            MonsterKind::Spirit => (100 * level, 100 * level, 30 + 2 * level),
        };
        Self {
            name: name.into(),
            kind,
            level,
            base_damage,
            defense,
            dodge_percent: dodge_percent.min(60),
        }
    }

    /// Maximum health implied by the level.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.level.saturating_mul(100)
    }
}

/// Current and maximum value of a depletable resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vital {
    /// Present value.
    pub current: u32,
    /// Upper bound.
    pub maximum: u32,
}

/// Strength, dexterity and agility values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength value.
    pub strength: u32,
    /// Dexterity value.
    pub dexterity: u32,
    /// Agility value.
    pub agility: u32,
}

impl Attributes {
    /// Value of a single attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Agility => self.agility,
        }
    }
}

/// Read-only view of a hero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeroSnapshot {
    /// Identifier of the hero.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Class.
    pub class: HeroClass,
    /// Display slot, starting at 1 (`H1`).
    pub slot: u8,
    /// Current level.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u32,
    /// Gold held.
    pub gold: u32,
    /// Health.
    pub health: Vital,
    /// Mana.
    pub mana: Vital,
    /// Attributes before temporary modifiers.
    pub base: Attributes,
    /// Attributes including terrain and potion modifiers.
    pub current: Attributes,
    /// Attribute raised by the terrain underfoot, if any.
    pub terrain_bonus: Option<Attribute>,
    /// Cell the hero stands on; `None` while awaiting respawn.
    pub cell: Option<CellCoord>,
    /// Home-row cell the hero recalls and respawns to.
    pub anchor: CellCoord,
    /// Equipped weapons.
    pub weapons: Vec<Item>,
    /// Equipped armor.
    pub armor: Option<Item>,
    /// Carried, unequipped items.
    pub inventory: Vec<Item>,
    /// Permanently learned spells.
    pub spells: Vec<Item>,
}

impl HeroSnapshot {
    /// Whether the hero has health remaining.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health.current > 0
    }

    /// Short board label such as `H1`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("H{}", self.slot)
    }
}

/// Read-only view of a monster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterSnapshot {
    /// Identifier of the monster.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Archetype.
    pub kind: MonsterKind,
    /// Display slot, starting at 1 (`M1`).
    pub slot: u8,
    /// Level.
    pub level: u32,
    /// Health.
    pub health: Vital,
    /// Current damage rating.
    pub base_damage: u32,
    /// Current defense rating.
    pub defense: u32,
    /// Current dodge chance in whole percent.
    pub dodge_percent: u32,
    /// Cell the monster stands on.
    pub cell: CellCoord,
}

impl MonsterSnapshot {
    /// Short board label such as `M1`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("M{}", self.slot)
    }
}
