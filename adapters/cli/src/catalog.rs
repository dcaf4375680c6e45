//! Fixed merchandise sold at the heroes' Nexus.

use valor_core::{
    Armor, Handedness, Item, ItemKind, Potion, Spell, SpellElement, Stat, Weapon,
};

fn weapon(name: &str, cost: u32, level: u32, damage: u32, hands: Handedness) -> Item {
    Item::new(name, cost, level, ItemKind::Weapon(Weapon { damage, hands }))
}

fn armor(name: &str, cost: u32, level: u32, reduction: u32) -> Item {
    Item::new(name, cost, level, ItemKind::Armor(Armor { reduction }))
}

fn potion(name: &str, cost: u32, level: u32, effects: &[(Stat, u32)]) -> Item {
    Item::new(
        name,
        cost,
        level,
        ItemKind::Potion(Potion {
            effects: effects.to_vec(),
        }),
    )
}

fn spell(
    name: &str,
    cost: u32,
    level: u32,
    damage: u32,
    mana_cost: u32,
    element: SpellElement,
) -> Item {
    Item::new(
        name,
        cost,
        level,
        ItemKind::Spell(Spell {
            damage,
            mana_cost,
            element,
        }),
    )
}

/// Every item the market offers, grouped by family.
pub(crate) fn catalog() -> Vec<Item> {
    vec![
        weapon("Dagger", 200, 1, 2, Handedness::One),
        weapon("Sword", 500, 1, 4, Handedness::One),
        weapon("Bow", 300, 2, 3, Handedness::Two),
        weapon("Axe", 550, 5, 6, Handedness::One),
        weapon("Scythe", 1000, 6, 7, Handedness::Two),
        armor("Platinum Shield", 150, 1, 5),
        armor("Breastplate", 350, 3, 12),
        armor("Full Body Armor", 1000, 8, 30),
        potion("Healing Potion", 250, 1, &[(Stat::Health, 100)]),
        potion("Magic Potion", 350, 2, &[(Stat::Mana, 100)]),
        potion("Strength Potion", 200, 1, &[(Stat::Strength, 75)]),
        potion("Luck Elixir", 500, 4, &[(Stat::Agility, 65)]),
        potion(
            "Mermaid Tears",
            850,
            5,
            &[(Stat::Health, 100), (Stat::Mana, 100), (Stat::Agility, 100)],
        ),
        spell("Ice Blade", 250, 1, 60, 40, SpellElement::Ice),
        spell("Breath of Fire", 350, 1, 70, 50, SpellElement::Fire),
        spell("Lightning Dagger", 400, 1, 80, 60, SpellElement::Lightning),
        spell("Snow Cannon", 500, 2, 120, 90, SpellElement::Ice),
        spell("Flame Tornado", 700, 4, 180, 130, SpellElement::Fire),
        spell("Thunder Blast", 750, 4, 200, 150, SpellElement::Lightning),
    ]
}
