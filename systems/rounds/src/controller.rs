//! Input boundary between the round scheduler and whoever steers the heroes.

use std::fmt;

use thiserror::Error;
use valor_core::{
    ActionError, CellCoord, Command, Direction, EquipSlot, Event, HeroSnapshot, Item,
    MonsterSnapshot, SpellSource, UnitId,
};
use valor_world::GridBoard;

/// Menu entries a hero may be offered on its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Step one cell.
    Move,
    /// Strike a monster in reach.
    Attack,
    /// Cast a learned spell or a scroll.
    CastSpell,
    /// Drink a potion.
    UsePotion,
    /// Equip or unequip weapons and armor.
    Equipment,
    /// Clear an adjacent obstacle.
    RemoveObstacle,
    /// Jump next to an ally in another lane.
    Teleport,
    /// Return to the anchor cell.
    Recall,
    /// Trade at the heroes' Nexus.
    Shop,
    /// Inspect the combat log without spending the turn.
    ViewLog,
    /// Inspect the roster without spending the turn.
    Status,
    /// Pass the turn.
    Skip,
}

impl ActionKind {
    /// Actions offered while a monster is within the hero's reach.
    pub const BATTLE: [ActionKind; 9] = [
        Self::Move,
        Self::Attack,
        Self::CastSpell,
        Self::UsePotion,
        Self::Equipment,
        Self::RemoveObstacle,
        Self::ViewLog,
        Self::Status,
        Self::Skip,
    ];

    /// Actions offered while no monster is within reach.
    pub const EXPLORATION: [ActionKind; 10] = [
        Self::Move,
        Self::Teleport,
        Self::Recall,
        Self::UsePotion,
        Self::Equipment,
        Self::RemoveObstacle,
        Self::Shop,
        Self::ViewLog,
        Self::Status,
        Self::Skip,
    ];

    /// Menu set for the given in-battle state.
    #[must_use]
    pub fn offered(in_battle: bool) -> Vec<ActionKind> {
        if in_battle {
            Self::BATTLE.to_vec()
        } else {
            Self::EXPLORATION.to_vec()
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Move => "move",
            Self::Attack => "attack",
            Self::CastSpell => "cast spell",
            Self::UsePotion => "use potion",
            Self::Equipment => "equipment",
            Self::RemoveObstacle => "remove obstacle",
            Self::Teleport => "teleport",
            Self::Recall => "recall",
            Self::Shop => "shop",
            Self::ViewLog => "view log",
            Self::Status => "status",
            Self::Skip => "skip",
        };
        f.write_str(label)
    }
}

/// Trade requested at the heroes' Nexus.
#[derive(Clone, Debug, PartialEq)]
pub enum ShopOrder {
    /// Buy a catalog item.
    Buy(Item),
    /// Sell the inventory item at the given position.
    Sell(usize),
}

/// A controller's answer to a [`TurnPrompt`].
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// Step one cell.
    Move(Direction),
    /// Strike the given monster.
    Attack(UnitId),
    /// Cast a spell at the given monster.
    CastSpell {
        /// Spell to cast.
        spell: SpellSource,
        /// Monster to hit.
        target: UnitId,
    },
    /// Drink the potion at the given inventory position.
    UsePotion(usize),
    /// Equip the inventory item at the given position.
    Equip(usize),
    /// Return an equipped item to the inventory.
    Unequip(EquipSlot),
    /// Clear an obstacle, choosing among several candidates when needed.
    RemoveObstacle(Option<usize>),
    /// Jump next to the given ally.
    Teleport(UnitId),
    /// Return to the anchor cell.
    Recall,
    /// Trade at the heroes' Nexus.
    Shop(ShopOrder),
    /// Show the combat log.
    ViewLog,
    /// Show the roster.
    Status,
    /// Pass the turn.
    Skip,
}

impl Decision {
    /// Menu entry this decision belongs to.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Move(_) => ActionKind::Move,
            Self::Attack(_) => ActionKind::Attack,
            Self::CastSpell { .. } => ActionKind::CastSpell,
            Self::UsePotion(_) => ActionKind::UsePotion,
            Self::Equip(_) | Self::Unequip(_) => ActionKind::Equipment,
            Self::RemoveObstacle(_) => ActionKind::RemoveObstacle,
            Self::Teleport(_) => ActionKind::Teleport,
            Self::Recall => ActionKind::Recall,
            Self::Shop(_) => ActionKind::Shop,
            Self::ViewLog => ActionKind::ViewLog,
            Self::Status => ActionKind::Status,
            Self::Skip => ActionKind::Skip,
        }
    }

    /// World command carrying out the decision, if it mutates the world.
    pub(crate) fn into_command(self, hero: UnitId) -> Option<Command> {
        let command = match self {
            Self::Move(direction) => Command::Move {
                unit: hero,
                direction,
            },
            Self::Attack(target) => Command::Attack { hero, target },
            Self::CastSpell { spell, target } => Command::CastSpell {
                hero,
                spell,
                target,
            },
            Self::UsePotion(item) => Command::UsePotion { hero, item },
            Self::Equip(item) => Command::Equip { hero, item },
            Self::Unequip(slot) => Command::Unequip { hero, slot },
            Self::RemoveObstacle(choice) => Command::ClearObstacle { hero, choice },
            Self::Teleport(ally) => Command::Teleport { hero, ally },
            Self::Recall => Command::Recall { hero },
            Self::Shop(ShopOrder::Buy(item)) => Command::Purchase { hero, item },
            Self::Shop(ShopOrder::Sell(item)) => Command::Sell { hero, item },
            Self::ViewLog | Self::Status | Self::Skip => return None,
        };
        Some(command)
    }
}

/// Why the previous decision for this turn did not go through.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The decision belongs to a menu entry that was not offered.
    #[error("{0} is not available right now")]
    NotOffered(ActionKind),
    /// The world refused the command.
    #[error(transparent)]
    Refused(#[from] ActionError),
}

/// Everything a controller needs to choose a hero's action.
#[derive(Clone, Debug)]
pub struct TurnPrompt {
    /// Round being played.
    pub round: u32,
    /// Hero whose turn it is.
    pub hero: HeroSnapshot,
    /// Whether a monster is within the hero's reach.
    pub in_battle: bool,
    /// Menu entries on offer.
    pub actions: Vec<ActionKind>,
    /// Monsters the hero can strike.
    pub targets: Vec<MonsterSnapshot>,
    /// Allies valid as teleport destinations.
    pub allies: Vec<HeroSnapshot>,
    /// Obstacles the hero could clear, in selection order.
    pub obstacles: Vec<CellCoord>,
    /// Whether the hero stands on its own Nexus and may trade.
    pub at_nexus: bool,
    /// Feedback on the previous attempt in this turn.
    pub rejection: Option<Rejection>,
    /// Board as it stands when the prompt is issued.
    pub board: GridBoard,
    /// Every hero, in roster order.
    pub party: Vec<HeroSnapshot>,
    /// Every live monster, in roster order.
    pub monsters: Vec<MonsterSnapshot>,
}

impl TurnPrompt {
    /// Whether the given menu entry is on offer.
    #[must_use]
    pub fn offers(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }
}

/// Steers the heroes and observes the game.
///
/// Answering `Ok(None)` cancels the current choice and re-prompts without
/// spending the turn. An error aborts the round and is handed back to the
/// caller of the scheduler.
pub trait HeroController {
    /// Failure raised when input can no longer be obtained.
    type Error;

    /// Chooses an action for the prompted hero.
    fn decide(&mut self, prompt: &TurnPrompt) -> Result<Option<Decision>, Self::Error>;

    /// Receives every batch of events the world produced.
    fn observe(&mut self, _events: &[Event]) {}

    /// Presents the most recent combat records.
    fn show_combat_log(&mut self, _records: &[Event]) {}

    /// Presents the current roster of both factions.
    fn show_status(&mut self, _heroes: &[HeroSnapshot], _monsters: &[MonsterSnapshot]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use valor_core::{Direction, MoveBlock};

    #[test]
    fn battle_swaps_travel_for_fighting() {
        let battle = ActionKind::offered(true);
        let exploration = ActionKind::offered(false);
        assert!(battle.contains(&ActionKind::Attack));
        assert!(!battle.contains(&ActionKind::Shop));
        assert!(!battle.contains(&ActionKind::Teleport));
        assert!(exploration.contains(&ActionKind::Recall));
        assert!(!exploration.contains(&ActionKind::CastSpell));
    }

    #[test]
    fn informational_decisions_carry_no_command() {
        let hero = UnitId::new(1);
        assert_eq!(Decision::Skip.into_command(hero), None);
        assert_eq!(Decision::ViewLog.into_command(hero), None);
        assert_eq!(
            Decision::Move(Direction::Up).into_command(hero),
            Some(Command::Move {
                unit: hero,
                direction: Direction::Up,
            })
        );
        assert_eq!(Decision::Unequip(EquipSlot::Armor).kind(), ActionKind::Equipment);
    }

    #[test]
    fn rejections_read_naturally() {
        assert_eq!(
            Rejection::NotOffered(ActionKind::Shop).to_string(),
            "shop is not available right now"
        );
        let refused = Rejection::from(ActionError::from(MoveBlock::NotAtNexus));
        assert_eq!(refused.to_string(), ActionError::from(MoveBlock::NotAtNexus).to_string());
    }
}
