//! Inventory, equipment and Nexus trading.

use valor_core::{
    ActionError, Attribute, EquipSlot, Event, Faction, Handedness, Item, ItemKind, MoveBlock,
    Resource, Stat, UnitId,
};

use crate::{units::Hero, World};

const MAX_ONE_HANDED: usize = 2;

/// Adds a spell to the hero's permanent spell book unless already known.
pub(crate) fn learn_spell(hero: &mut Hero, spell: Item, out: &mut Vec<Event>) {
    if knows_spell(hero, &spell) {
        return;
    }
    out.push(Event::SpellLearned {
        hero: hero.id,
        spell: spell.name.clone(),
    });
    hero.spells.push(spell);
}

fn knows_spell(hero: &Hero, spell: &Item) -> bool {
    hero.spells.iter().any(|known| known.name == spell.name)
}

fn selection_error(index: usize, available: usize) -> ActionError {
    ActionError::InvalidSelection { index, available }
}

impl World {
    pub(crate) fn use_potion(
        &mut self,
        hero: UnitId,
        item: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (index, _) = self.living_hero(hero)?;
        let drinker = &mut self.heroes[index];
        let available = drinker.inventory.len();
        let is_potion = matches!(
            drinker.inventory.get(item).map(|entry| &entry.kind),
            Some(ItemKind::Potion(_))
        );
        if !is_potion {
            return Err(selection_error(item, available));
        }

        let potion = drinker.inventory.remove(item);
        if let ItemKind::Potion(effects) = &potion.kind {
            for (stat, amount) in &effects.effects {
                match stat {
                    Stat::Health => {
                        let _ = drinker.heal(*amount);
                    }
                    Stat::Mana => {
                        let _ = drinker.recharge(*amount);
                    }
                    Stat::Strength => drinker.raise_current(Attribute::Strength, *amount),
                    Stat::Dexterity => drinker.raise_current(Attribute::Dexterity, *amount),
                    Stat::Agility => drinker.raise_current(Attribute::Agility, *amount),
                }
            }
        }
        tracing::debug!(%hero, potion = %potion.name, "potion consumed");
        out.push(Event::PotionConsumed {
            hero,
            potion: potion.name,
        });
        Ok(())
    }

    /// Moves a weapon or armor from the inventory into an equipment slot.
    ///
    /// A two-handed weapon displaces every equipped weapon; a one-handed
    /// weapon displaces an equipped two-hander or takes a free hand.
    pub(crate) fn equip(
        &mut self,
        hero: UnitId,
        item: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (index, _) = self.living_hero(hero)?;
        let wearer = &mut self.heroes[index];
        let available = wearer.inventory.len();
        let Some(candidate) = wearer.inventory.get(item) else {
            return Err(selection_error(item, available));
        };

        let weapon = match &candidate.kind {
            ItemKind::Weapon(weapon) => Some(*weapon),
            ItemKind::Armor(_) => None,
            ItemKind::Potion(_) | ItemKind::Spell(_) => {
                return Err(selection_error(item, available));
            }
        };

        let displaced: Vec<Item> = match weapon {
            Some(weapon) => {
                let holds_two_hander = wearer
                    .equipped_weapons()
                    .iter()
                    .any(|equipped| equipped.hands == Handedness::Two);
                if weapon.hands == Handedness::Two || holds_two_hander {
                    wearer.weapons.drain(..).collect()
                } else if wearer.weapons.len() < MAX_ONE_HANDED {
                    Vec::new()
                } else {
                    return Err(selection_error(item, available));
                }
            }
            None => wearer.armor.take().into_iter().collect(),
        };

        let equipped = wearer.inventory.remove(item);
        let name = equipped.name.clone();
        if equipped.as_armor().is_some() {
            wearer.armor = Some(equipped);
        } else {
            wearer.weapons.push(equipped);
        }
        for item in displaced {
            out.push(Event::ItemUnequipped {
                hero,
                item: item.name.clone(),
            });
            wearer.inventory.push(item);
        }
        tracing::debug!(%hero, item = %name, "item equipped");
        out.push(Event::ItemEquipped { hero, item: name });
        Ok(())
    }

    pub(crate) fn unequip(
        &mut self,
        hero: UnitId,
        slot: EquipSlot,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (index, _) = self.living_hero(hero)?;
        let wearer = &mut self.heroes[index];
        let item = match slot {
            EquipSlot::Weapon(position) => {
                if position >= wearer.weapons.len() {
                    return Err(selection_error(position, wearer.weapons.len()));
                }
                wearer.weapons.remove(position)
            }
            EquipSlot::Armor => wearer.armor.take().ok_or(selection_error(0, 0))?,
        };
        out.push(Event::ItemUnequipped {
            hero,
            item: item.name.clone(),
        });
        wearer.inventory.push(item);
        Ok(())
    }

    /// Buys an item at the heroes' Nexus.
    ///
    /// Spells are learned on purchase; a spell the hero already knows is kept
    /// as a single-use scroll instead.
    pub(crate) fn purchase(
        &mut self,
        hero: UnitId,
        item: Item,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let index = self.trading_hero(hero)?;
        let buyer = &mut self.heroes[index];
        if buyer.level < item.level_requirement {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Level,
                required: item.level_requirement,
                available: buyer.level,
            });
        }
        if buyer.gold < item.cost {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Gold,
                required: item.cost,
                available: buyer.gold,
            });
        }

        buyer.gold -= item.cost;
        tracing::debug!(%hero, item = %item.name, cost = item.cost, "item purchased");
        out.push(Event::ItemPurchased {
            hero,
            item: item.name.clone(),
            cost: item.cost,
        });
        if item.as_spell().is_some() && !knows_spell(buyer, &item) {
            learn_spell(buyer, item, out);
        } else {
            buyer.inventory.push(item);
        }
        Ok(())
    }

    pub(crate) fn sell(
        &mut self,
        hero: UnitId,
        item: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let index = self.trading_hero(hero)?;
        let seller = &mut self.heroes[index];
        if item >= seller.inventory.len() {
            return Err(selection_error(item, seller.inventory.len()));
        }
        let sold = seller.inventory.remove(item);
        let refund = sold.sell_value();
        seller.gold = seller.gold.saturating_add(refund);
        tracing::debug!(%hero, item = %sold.name, refund, "item sold");
        out.push(Event::ItemSold {
            hero,
            item: sold.name,
            refund,
        });
        Ok(())
    }

    fn trading_hero(&self, hero: UnitId) -> Result<usize, ActionError> {
        let (index, cell) = self.living_hero(hero)?;
        if !self.board.is_nexus_of(cell, Faction::Heroes) {
            return Err(MoveBlock::NotAtNexus.into());
        }
        Ok(index)
    }
}
