#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for introducing new monsters.
//!
//! The system listens for completed rounds and, on every round divisible by
//! the difficulty's spawn interval, asks the world to introduce one monster
//! leveled to the strongest hero. Monster content is drawn from a private
//! seeded stream so a session replays identically.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valor_core::{Command, Difficulty, Event, MonsterKind, MonsterSpec, MAX_LIVE_MONSTERS};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    difficulty: Difficulty,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided difficulty and seed.
    #[must_use]
    pub const fn new(difficulty: Difficulty, rng_seed: u64) -> Self {
        Self {
            difficulty,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: u32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.difficulty.spawn_interval(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Number of rounds between spawn attempts.
    #[must_use]
    pub const fn spawn_interval(&self) -> u32 {
        self.spawn_interval
    }

    /// Consumes events and world facts to emit spawn commands.
    ///
    /// `live_monsters` is the number of monsters currently alive and
    /// `highest_level` the highest level among all heroes.
    pub fn handle(
        &mut self,
        events: &[Event],
        live_monsters: usize,
        highest_level: u32,
        out: &mut Vec<Command>,
    ) {
        if self.spawn_interval == 0 {
            return;
        }

        let mut live = live_monsters;
        for event in events {
            let Event::RoundAdvanced { round } = *event else {
                continue;
            };
            if round % self.spawn_interval != 0 {
                continue;
            }
            if live >= MAX_LIVE_MONSTERS {
                tracing::debug!(round, live, "monster capacity reached, no spawn");
                continue;
            }

            let spec = self.next_monster(highest_level);
            tracing::info!(round, monster = %spec.name, level = spec.level, "spawning monster");
            out.push(Command::SpawnMonster { spec });
            live += 1;
        }
    }

    fn next_monster(&mut self, level: u32) -> MonsterSpec {
        let kind = MonsterKind::ALL[self.rng.gen_range(0..MonsterKind::ALL.len())];
        let names = kind.names();
        let name = names[self.rng.gen_range(0..names.len())];
        MonsterSpec::from_template(kind, level, name)
    }
}
