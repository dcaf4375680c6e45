//! Item families carried, equipped and consumed by heroes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ceiling applied to the weapon contribution of a melee attack.
pub const WEAPON_DAMAGE_CAP: u32 = 1000;

/// Tradeable item with its family-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Display name; also used to de-duplicate learned spells.
    pub name: String,
    /// Catalog price in gold. Items sell for half.
    pub cost: u32,
    /// Minimum hero level required to buy the item.
    pub level_requirement: u32,
    /// Family-specific data.
    pub kind: ItemKind,
}

impl Item {
    /// Creates a new item.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: u32, level_requirement: u32, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            cost,
            level_requirement,
            kind,
        }
    }

    /// Gold received when the item is sold.
    #[must_use]
    pub const fn sell_value(&self) -> u32 {
        self.cost / 2
    }

    /// Weapon payload when the item is a weapon.
    #[must_use]
    pub const fn as_weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            ItemKind::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    /// Armor payload when the item is armor.
    #[must_use]
    pub const fn as_armor(&self) -> Option<&Armor> {
        match &self.kind {
            ItemKind::Armor(armor) => Some(armor),
            _ => None,
        }
    }

    /// Spell payload when the item is a spell.
    #[must_use]
    pub const fn as_spell(&self) -> Option<&Spell> {
        match &self.kind {
            ItemKind::Spell(spell) => Some(spell),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ItemKind::Weapon(weapon) => write!(
                f,
                "{} (weapon, {} damage, {}-handed)",
                self.name,
                weapon.damage,
                match weapon.hands {
                    Handedness::One => "one",
                    Handedness::Two => "two",
                }
            ),
            ItemKind::Armor(armor) => {
                write!(f, "{} (armor, -{} damage)", self.name, armor.reduction)
            }
            ItemKind::Potion(potion) => {
                write!(f, "{} (potion", self.name)?;
                for (stat, amount) in &potion.effects {
                    write!(f, ", +{amount} {stat}")?;
                }
                f.write_str(")")
            }
            ItemKind::Spell(spell) => write!(
                f,
                "{} ({} spell, {} damage, {} mana)",
                self.name, spell.element, spell.damage, spell.mana_cost
            ),
        }
    }
}

/// Closed set of item families.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Equippable weapon.
    Weapon(Weapon),
    /// Equippable armor.
    Armor(Armor),
    /// Single-use attribute boost.
    Potion(Potion),
    /// Damaging spell with an elemental debuff.
    Spell(Spell),
}

/// Number of hands a weapon occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    /// Up to two may be equipped together.
    One,
    /// Occupies both weapon slots and deals 1.5× damage.
    Two,
}

/// Weapon payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weapon {
    /// Raw damage rating.
    pub damage: u32,
    /// Hands required to wield the weapon.
    pub hands: Handedness,
}

/// Armor payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Armor {
    /// Flat amount subtracted from incoming monster damage.
    pub reduction: u32,
}

/// Statistic a potion can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Current health, capped at the maximum.
    Health,
    /// Current mana, capped at the maximum.
    Mana,
    /// Current strength.
    Strength,
    /// Current dexterity.
    Dexterity,
    /// Current agility.
    Agility,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Health => f.write_str("health"),
            Self::Mana => f.write_str("mana"),
            Self::Strength => f.write_str("strength"),
            Self::Dexterity => f.write_str("dexterity"),
            Self::Agility => f.write_str("agility"),
        }
    }
}

/// Potion payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Potion {
    /// Attribute deltas applied when the potion is consumed.
    pub effects: Vec<(Stat, u32)>,
}

/// Element of a spell; each applies a different permanent debuff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellElement {
    /// Lowers the target's base damage by 10%.
    Ice,
    /// Lowers the target's defense by 10%.
    Fire,
    /// Lowers the target's dodge chance by 10%.
    Lightning,
}

impl fmt::Display for SpellElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ice => f.write_str("ice"),
            Self::Fire => f.write_str("fire"),
            Self::Lightning => f.write_str("lightning"),
        }
    }
}

/// Spell payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spell {
    /// Damage dealt on cast; never dodged.
    pub damage: u32,
    /// Mana consumed on cast.
    pub mana_cost: u32,
    /// Element determining the debuff.
    pub element: SpellElement,
}

/// Weapon contribution to a melee strike.
///
/// A lone two-handed weapon counts for 1.5× its damage (truncated); any other
/// combination sums the equipped damage. The result never exceeds
/// [`WEAPON_DAMAGE_CAP`].
#[must_use]
pub fn weapon_damage(weapons: &[Weapon]) -> u32 {
    let raw: u64 = match weapons {
        [single] if single.hands == Handedness::Two => u64::from(single.damage) * 3 / 2,
        _ => weapons.iter().map(|weapon| u64::from(weapon.damage)).sum(),
    };
    raw.min(u64::from(WEAPON_DAMAGE_CAP)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_handed(damage: u32) -> Weapon {
        Weapon {
            damage,
            hands: Handedness::One,
        }
    }

    #[test]
    fn bare_hands_contribute_nothing() {
        assert_eq!(weapon_damage(&[]), 0);
    }

    #[test]
    fn one_handed_weapons_sum() {
        assert_eq!(weapon_damage(&[one_handed(300), one_handed(250)]), 550);
    }

    #[test]
    fn two_handed_weapon_gains_half_again() {
        let greatsword = Weapon {
            damage: 301,
            hands: Handedness::Two,
        };
        assert_eq!(weapon_damage(&[greatsword]), 451);
    }

    #[test]
    fn weapon_damage_never_exceeds_cap() {
        let colossal = Weapon {
            damage: 900,
            hands: Handedness::Two,
        };
        assert_eq!(weapon_damage(&[colossal]), WEAPON_DAMAGE_CAP);
        assert_eq!(
            weapon_damage(&[one_handed(u32::MAX), one_handed(u32::MAX)]),
            WEAPON_DAMAGE_CAP
        );
    }

    #[test]
    fn items_sell_for_half_their_cost() {
        let item = Item::new("Dagger", 201, 1, ItemKind::Weapon(one_handed(50)));
        assert_eq!(item.sell_value(), 100);
        assert!(item.as_weapon().is_some());
        assert!(item.as_armor().is_none());
    }
}
