#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Valor Lanes session.

use valor_core::{Dice, GameConfig, HeroClass, HeroSpec, MonsterKind, MonsterSpec};
use valor_world::{query, SeededDice, SetupError, World, MAX_HEROES};

const WARRIOR_NAMES: [&str; 3] = ["Gaerdal Ironhand", "Sehanine Monnbow", "Muamman Duathall"];
const SORCERER_NAMES: [&str; 3] = ["Rillifane Rallathil", "Segojan Earthcaller", "Reign Havoc"];
const PALADIN_NAMES: [&str; 3] = ["Parzival", "Sehanine Moonbow", "Skoraeus Stonebones"];

/// Level of the monsters guarding the lanes when a session starts.
const OPENING_MONSTER_LEVEL: u32 = 1;

/// Produces the data required to start a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the session starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Creates hero specifications for the chosen classes in lane order.
    #[must_use]
    pub fn roster(&self, classes: &[HeroClass], starting_gold: u32) -> Vec<HeroSpec> {
        let mut drafted = [0_usize; 3];
        classes
            .iter()
            .map(|class| {
                let (names, count) = match class {
                    HeroClass::Warrior => (&WARRIOR_NAMES, &mut drafted[0]),
                    HeroClass::Sorcerer => (&SORCERER_NAMES, &mut drafted[1]),
                    HeroClass::Paladin => (&PALADIN_NAMES, &mut drafted[2]),
                };
                let name = names[*count % names.len()];
                *count += 1;
                HeroSpec::new(name, *class, starting_gold)
            })
            .collect()
    }

    /// Draws one level-one monster per lane.
    #[must_use]
    pub fn opening_monsters(&self, lanes: usize, dice: &mut dyn Dice) -> Vec<MonsterSpec> {
        (0..lanes)
            .map(|_| {
                let kind = MonsterKind::ALL[roll_index(dice, MonsterKind::ALL.len())];
                let names = kind.names();
                let name = names[roll_index(dice, names.len())];
                MonsterSpec::from_template(kind, OPENING_MONSTER_LEVEL, name)
            })
            .collect()
    }

    /// Builds a world with the chosen heroes and one opening monster per lane.
    ///
    /// The board, combat rolls and opening monsters all derive from the
    /// configured seed.
    pub fn assemble(&self, config: GameConfig, classes: &[HeroClass]) -> Result<World, SetupError> {
        let seed = config.seed.unwrap_or_default();
        let heroes = self.roster(classes, config.starting_gold);
        let mut content = SeededDice::new(seed.wrapping_add(1));
        let monsters = self.opening_monsters(MAX_HEROES, &mut content);

        tracing::info!(
            seed,
            difficulty = %config.difficulty,
            heroes = heroes.len(),
            "assembling world"
        );
        let builder = heroes
            .into_iter()
            .fold(World::builder(config), |builder, hero| builder.hero(hero));
        monsters
            .into_iter()
            .fold(builder, |builder, monster| builder.monster(monster))
            .build(Box::new(SeededDice::new(seed)))
    }
}

fn roll_index(dice: &mut dyn Dice, len: usize) -> usize {
    let upper = u32::try_from(len).unwrap_or(u32::MAX);
    usize::try_from(dice.below(upper)).unwrap_or(0)
}
