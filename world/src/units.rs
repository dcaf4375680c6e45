//! Mutable hero and monster state owned by the world.

use valor_core::{
    weapon_damage, Attribute, Attributes, CellCoord, HeroClass, HeroSnapshot, HeroSpec, Item,
    MonsterKind, MonsterSnapshot, MonsterSpec, RespawnVitality, UnitId, Vital, Weapon, MAX_LEVEL,
    TERRAIN_BONUS,
};

const HEALTH_PER_LEVEL: u32 = 100;
const REGEN_PERCENT: u32 = 10;
const MANA_GROWTH_PERCENT: u32 = 10;

#[derive(Clone, Debug)]
pub(crate) struct Hero {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) class: HeroClass,
    pub(crate) slot: u8,
    pub(crate) level: u32,
    pub(crate) experience: u32,
    pub(crate) gold: u32,
    pub(crate) max_health: u32,
    pub(crate) health: u32,
    pub(crate) max_mana: u32,
    pub(crate) mana: u32,
    pub(crate) base: Attributes,
    pub(crate) current: Attributes,
    pub(crate) terrain_bonus: Option<Attribute>,
    pub(crate) anchor: CellCoord,
    pub(crate) weapons: Vec<Item>,
    pub(crate) armor: Option<Item>,
    pub(crate) inventory: Vec<Item>,
    pub(crate) spells: Vec<Item>,
}

impl Hero {
    pub(crate) fn from_spec(id: UnitId, slot: u8, spec: HeroSpec, anchor: CellCoord) -> Self {
        let stats = spec.stats;
        let base = Attributes {
            strength: stats.strength,
            dexterity: stats.dexterity,
            agility: stats.agility,
        };
        Self {
            id,
            name: spec.name,
            class: spec.class,
            slot,
            level: 1,
            experience: 0,
            gold: spec.gold,
            max_health: stats.health,
            health: stats.health,
            max_mana: stats.mana,
            mana: stats.mana,
            base,
            current: base,
            terrain_bonus: None,
            anchor,
            weapons: Vec::new(),
            armor: None,
            inventory: spec.inventory,
            spells: Vec::new(),
        }
    }

    pub(crate) const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Restores vitals and resets attributes to base, keeping any terrain bonus.
    pub(crate) fn restore(&mut self, vitality: RespawnVitality) {
        self.health = vitality.restore(self.max_health);
        self.mana = vitality.restore(self.max_mana);
        self.current = self.base;
        if let Some(attribute) = self.terrain_bonus {
            let value = attribute_mut(&mut self.current, attribute);
            *value = value.saturating_add(TERRAIN_BONUS);
        }
    }

    /// Grants the terrain bonus for `attribute`; a hero holds at most one.
    pub(crate) fn gain_terrain_bonus(&mut self, attribute: Attribute) -> bool {
        if self.terrain_bonus.is_some() {
            return false;
        }
        let value = attribute_mut(&mut self.current, attribute);
        *value = value.saturating_add(TERRAIN_BONUS);
        self.terrain_bonus = Some(attribute);
        true
    }

    /// Reverses the active terrain bonus exactly.
    pub(crate) fn lose_terrain_bonus(&mut self) -> Option<Attribute> {
        let attribute = self.terrain_bonus.take()?;
        let value = attribute_mut(&mut self.current, attribute);
        *value = value.saturating_sub(TERRAIN_BONUS);
        Some(attribute)
    }

    pub(crate) fn raise_current(&mut self, attribute: Attribute, amount: u32) {
        let value = attribute_mut(&mut self.current, attribute);
        *value = value.saturating_add(amount);
    }

    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    pub(crate) fn recharge(&mut self, amount: u32) -> u32 {
        let before = self.mana;
        self.mana = self.mana.saturating_add(amount).min(self.max_mana);
        self.mana - before
    }

    /// End-of-round regeneration of 10% of maximum health and mana, floored.
    pub(crate) fn regenerate(&mut self) -> (u32, u32) {
        let health = self.heal(self.max_health * REGEN_PERCENT / 100);
        let mana = self.recharge(self.max_mana * REGEN_PERCENT / 100);
        (health, mana)
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    /// Adds experience and returns every level reached as a result.
    pub(crate) fn gain_experience(&mut self, amount: u32) -> Vec<u32> {
        self.experience = self.experience.saturating_add(amount);
        let mut reached = Vec::new();
        while self.level < MAX_LEVEL && self.experience >= self.level * 10 {
            self.level_up();
            reached.push(self.level);
        }
        reached
    }

    fn level_up(&mut self) {
        self.restore(RespawnVitality::Full);
        self.level += 1;
        self.max_health = self.max_health.saturating_add(HEALTH_PER_LEVEL);
        self.max_mana = grow(self.max_mana, MANA_GROWTH_PERCENT);
        for attribute in [Attribute::Strength, Attribute::Dexterity, Attribute::Agility] {
            let percent = self.class.growth_percent(attribute);
            let value = attribute_mut(&mut self.base, attribute);
            *value = grow(*value, percent);
        }
        self.restore(RespawnVitality::Full);
    }

    pub(crate) fn equipped_weapons(&self) -> Vec<Weapon> {
        self.weapons
            .iter()
            .filter_map(Item::as_weapon)
            .copied()
            .collect()
    }

    pub(crate) fn weapon_damage(&self) -> u32 {
        weapon_damage(&self.equipped_weapons())
    }

    pub(crate) fn armor_reduction(&self) -> u32 {
        self.armor
            .as_ref()
            .and_then(Item::as_armor)
            .map_or(0, |armor| armor.reduction)
    }

    pub(crate) fn snapshot(&self, cell: Option<CellCoord>) -> HeroSnapshot {
        HeroSnapshot {
            id: self.id,
            name: self.name.clone(),
            class: self.class,
            slot: self.slot,
            level: self.level,
            experience: self.experience,
            gold: self.gold,
            health: Vital {
                current: self.health,
                maximum: self.max_health,
            },
            mana: Vital {
                current: self.mana,
                maximum: self.max_mana,
            },
            base: self.base,
            current: self.current,
            terrain_bonus: self.terrain_bonus,
            cell,
            anchor: self.anchor,
            weapons: self.weapons.clone(),
            armor: self.armor.clone(),
            inventory: self.inventory.clone(),
            spells: self.spells.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) kind: MonsterKind,
    pub(crate) slot: u8,
    pub(crate) level: u32,
    pub(crate) max_health: u32,
    pub(crate) health: u32,
    pub(crate) base_damage: u32,
    pub(crate) defense: u32,
    pub(crate) dodge_percent: u32,
}

impl Monster {
    pub(crate) fn from_spec(id: UnitId, slot: u8, spec: MonsterSpec) -> Self {
        let max_health = spec.max_health();
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            slot,
            level: spec.level,
            max_health,
            health: max_health,
            base_damage: spec.base_damage,
            defense: spec.defense,
            dodge_percent: spec.dodge_percent,
        }
    }

    pub(crate) const fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub(crate) fn snapshot(&self, cell: CellCoord) -> MonsterSnapshot {
        MonsterSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            slot: self.slot,
            level: self.level,
            health: Vital {
                current: self.health,
                maximum: self.max_health,
            },
            base_damage: self.base_damage,
            defense: self.defense,
            dodge_percent: self.dodge_percent,
            cell,
        }
    }
}

fn attribute_mut(attributes: &mut Attributes, attribute: Attribute) -> &mut u32 {
    match attribute {
        Attribute::Strength => &mut attributes.strength,
        Attribute::Dexterity => &mut attributes.dexterity,
        Attribute::Agility => &mut attributes.agility,
    }
}

/// Raises `value` by `percent`, rounding the increase up.
pub(crate) const fn grow(value: u32, percent: u32) -> u32 {
    let increase = (value as u64 * percent as u64 + 99) / 100;
    let grown = value as u64 + increase;
    if grown > u32::MAX as u64 {
        u32::MAX
    } else {
        grown as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valor_core::BaseStats;

    fn hero_from(spec: HeroSpec) -> Hero {
        Hero::from_spec(UnitId::new(1), 1, spec, CellCoord::new(7, 1))
    }

    fn warrior() -> Hero {
        hero_from(HeroSpec::new("Gaerdal", HeroClass::Warrior, 2000))
    }

    fn attributes(strength: u32, dexterity: u32, agility: u32) -> Attributes {
        Attributes {
            strength,
            dexterity,
            agility,
        }
    }

    #[test]
    fn growth_rounds_increase_up() {
        assert_eq!(grow(750, 10), 825);
        assert_eq!(grow(500, 5), 525);
        assert_eq!(grow(501, 5), 527);
        assert_eq!(grow(0, 10), 0);
    }

    #[test]
    fn terrain_bonus_round_trips_exactly() {
        let mut hero = warrior();
        let before = hero.current;
        assert!(hero.gain_terrain_bonus(Attribute::Dexterity));
        assert_eq!(hero.current.dexterity, before.dexterity + TERRAIN_BONUS);
        assert!(!hero.gain_terrain_bonus(Attribute::Agility), "bonuses never stack");
        assert_eq!(hero.lose_terrain_bonus(), Some(Attribute::Dexterity));
        assert_eq!(hero.current, before);
        assert_eq!(hero.lose_terrain_bonus(), None);
    }

    #[test]
    fn restore_keeps_active_terrain_bonus() {
        let mut hero = warrior();
        assert!(hero.gain_terrain_bonus(Attribute::Strength));
        hero.raise_current(Attribute::Strength, 50);
        hero.restore(RespawnVitality::Full);
        assert_eq!(hero.current.strength, hero.base.strength + TERRAIN_BONUS);
        let _ = hero.lose_terrain_bonus();
        assert_eq!(hero.current.strength, hero.base.strength);
    }

    #[test]
    fn warrior_level_up_grows_by_class() {
        let mut hero = warrior();
        let _ = hero.take_damage(60);
        let levels = hero.gain_experience(10);

        assert_eq!(levels, vec![2]);
        assert_eq!(hero.max_health, 200);
        assert_eq!(hero.health, 200);
        assert_eq!(hero.max_mana, 550);
        assert_eq!(hero.base.strength, 825);
        assert_eq!(hero.base.dexterity, 525);
        assert_eq!(hero.base.agility, 825);
        assert_eq!(hero.current, hero.base);
    }

    #[test]
    fn sorcerer_level_up_favours_dexterity_and_agility() {
        let mut hero = hero_from(HeroSpec::new("Rillifane", HeroClass::Sorcerer, 2000));
        let _ = hero.take_damage(99);
        hero.mana = 0;

        assert_eq!(hero.gain_experience(12), vec![2]);
        assert_eq!(hero.experience, 12);
        assert_eq!(hero.base, attributes(525, 825, 825));
        assert_eq!(hero.current, hero.base);
        assert_eq!((hero.max_health, hero.health), (200, 200));
        assert_eq!((hero.max_mana, hero.mana), (770, 770));
    }

    #[test]
    fn paladin_level_up_favours_strength_and_dexterity() {
        let mut hero = hero_from(HeroSpec::new("Parzival", HeroClass::Paladin, 2000));

        assert_eq!(hero.gain_experience(10), vec![2]);
        assert_eq!(hero.base, attributes(825, 825, 525));
        assert_eq!((hero.max_health, hero.health), (200, 200));
        assert_eq!((hero.max_mana, hero.mana), (550, 550));
    }

    #[test]
    fn uneven_stats_round_every_increase_up() {
        let stats = BaseStats {
            health: 100,
            mana: 333,
            strength: 333,
            dexterity: 457,
            agility: 91,
        };
        let mut hero =
            hero_from(HeroSpec::new("Parzival", HeroClass::Paladin, 0).with_stats(stats));

        let _ = hero.gain_experience(10);

        assert_eq!(hero.base, attributes(367, 503, 96));
        assert_eq!(hero.max_mana, 367);
    }

    #[test]
    fn one_grant_can_cross_several_thresholds() {
        let mut hero = hero_from(HeroSpec::new("Rillifane", HeroClass::Sorcerer, 2000));

        assert_eq!(hero.gain_experience(30), vec![2, 3, 4]);
        assert_eq!(hero.level, 4);
        assert_eq!(hero.base, attributes(580, 999, 999));
        assert_eq!((hero.max_health, hero.health), (400, 400));
        assert_eq!((hero.max_mana, hero.mana), (932, 932));
        assert!(hero.gain_experience(9).is_empty(), "level 4 needs 40 in total");
        assert_eq!(hero.gain_experience(1), vec![5]);
    }

    #[test]
    fn level_is_capped() {
        let mut hero = warrior();
        let levels = hero.gain_experience(10_000);
        assert_eq!(levels, (2..=MAX_LEVEL).collect::<Vec<_>>());
        assert_eq!(hero.level, MAX_LEVEL);
        assert_eq!(hero.max_health, 100 + 9 * HEALTH_PER_LEVEL);
        assert!(hero.gain_experience(10_000).is_empty());
        assert_eq!(hero.max_health, 1000);
    }

    #[test]
    fn level_up_keeps_the_terrain_bonus() {
        let mut hero = hero_from(HeroSpec::new("Parzival", HeroClass::Paladin, 2000));
        assert!(hero.gain_terrain_bonus(Attribute::Dexterity));

        let _ = hero.gain_experience(10);

        assert_eq!(hero.base.dexterity, 825);
        assert_eq!(hero.current.dexterity, 825 + TERRAIN_BONUS);
        assert_eq!(hero.lose_terrain_bonus(), Some(Attribute::Dexterity));
        assert_eq!(hero.current, hero.base);
    }

    #[test]
    fn regeneration_is_floored_and_capped() {
        let mut hero = warrior();
        hero.max_health = 105;
        hero.health = 50;
        hero.mana = 495;
        assert_eq!(hero.regenerate(), (10, 5));
        assert_eq!(hero.health, 60);
        assert_eq!(hero.mana, 500);
    }
}
