//! Treasure chests hidden in Mystery cells.

use valor_core::{
    Armor, Dice, Handedness, Item, ItemKind, Potion, Spell, SpellElement, Stat, Weapon,
};

const GOLD_MIN: u32 = 100;
const GOLD_SPREAD: u32 = 401;
const EXPERIENCE_MIN: u32 = 5;
const EXPERIENCE_SPREAD: u32 = 16;
const ITEM_CHANCE: f64 = 0.4;
const MAX_LOOT_LEVEL: u32 = 5;

/// Contents of an opened chest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Chest {
    pub(crate) gold: u32,
    pub(crate) experience: u32,
    pub(crate) item: Option<Item>,
}

impl Chest {
    /// Rolls gold in 100..=500, experience in 5..=20 and a 40% chance of loot.
    pub(crate) fn roll(dice: &mut dyn Dice) -> Self {
        let gold = GOLD_MIN + dice.below(GOLD_SPREAD);
        let experience = EXPERIENCE_MIN + dice.below(EXPERIENCE_SPREAD);
        let item = dice.chance(ITEM_CHANCE).then(|| {
            let level = 1 + dice.below(MAX_LOOT_LEVEL);
            loot(dice.below(4), level)
        });
        Self {
            gold,
            experience,
            item,
        }
    }
}

fn loot(kind: u32, level: u32) -> Item {
    match kind {
        0 => Item::new(
            format!("Tarnished Blade +{level}"),
            150 * level,
            level,
            ItemKind::Weapon(Weapon {
                damage: level + 1,
                hands: Handedness::One,
            }),
        ),
        1 => Item::new(
            format!("Salvaged Mail +{level}"),
            120 * level,
            level,
            ItemKind::Armor(Armor {
                reduction: 5 * level,
            }),
        ),
        2 => Item::new(
            format!("Chest Tonic {level}"),
            60 * level,
            level,
            ItemKind::Potion(Potion {
                effects: vec![(Stat::Health, 40 * level), (Stat::Mana, 40 * level)],
            }),
        ),
        _ => {
            let (element, rune) = match level % 3 {
                0 => (SpellElement::Ice, "Frost"),
                1 => (SpellElement::Fire, "Ember"),
                _ => (SpellElement::Lightning, "Storm"),
            };
            Item::new(
                format!("Forgotten {rune} Scroll"),
                200 * level,
                level,
                ItemKind::Spell(Spell {
                    damage: 60 * level,
                    mana_cost: 40 * level,
                    element,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedDice;

    #[test]
    fn chest_rewards_span_documented_ranges() {
        let mut low = ScriptedDice::new();
        let chest = Chest::roll(&mut low);
        assert_eq!((chest.gold, chest.experience, chest.item), (100, 5, None));

        let mut high = ScriptedDice::new().with_values([400, 15]);
        let chest = Chest::roll(&mut high);
        assert_eq!((chest.gold, chest.experience), (500, 20));
    }

    #[test]
    fn lucky_chest_contains_leveled_loot() {
        let mut dice = ScriptedDice::new()
            .with_values([0, 0, 2, 3])
            .with_chances([true]);
        let chest = Chest::roll(&mut dice);
        let item = chest.item.expect("item roll succeeded");
        assert_eq!(item.level_requirement, 3);
        assert!(item.as_spell().is_some());
    }
}
