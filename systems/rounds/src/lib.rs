#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduling for Valor Lanes.
//!
//! A round runs three phases in strict order: every living hero acts through
//! a [`HeroController`], every living monster strikes or advances, and the
//! round closes with regeneration, respawns and reinforcements. The loop stops
//! the moment either faction reaches the opposing Nexus.

mod controller;

use valor_core::{ActionError, Command, Event, Faction, GameConfig, UnitId};
use valor_system_movement::Movement;
use valor_system_spawning::{Config as SpawnConfig, Spawning};
use valor_world::{self as world, query, World};

pub use controller::{ActionKind, Decision, HeroController, Rejection, ShopOrder, TurnPrompt};

/// Stage of the round the scheduler is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Heroes act in roster order.
    HeroPhase,
    /// Monsters act in roster order.
    MonsterPhase,
    /// Regeneration, respawns and reinforcements.
    EndOfRound,
    /// A faction has won; no further rounds are played.
    Finished,
}

/// Result of playing one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Nobody has won yet.
    Continue,
    /// The given faction reached the opposing Nexus.
    Won(Faction),
}

/// Drives rounds against a world, consulting a controller for hero turns.
#[derive(Debug)]
pub struct RoundScheduler {
    phase: Phase,
    movement: Movement,
    spawning: Spawning,
}

impl RoundScheduler {
    /// Creates a scheduler for a world built from `config`.
    ///
    /// `spawn_seed` feeds the stream that picks reinforcement monsters.
    #[must_use]
    pub fn new(config: &GameConfig, spawn_seed: u64) -> Self {
        Self {
            phase: Phase::HeroPhase,
            movement: Movement::default(),
            spawning: Spawning::new(SpawnConfig::new(config.difficulty, spawn_seed)),
        }
    }

    /// Phase the scheduler is in or will start with.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Plays rounds until a faction wins or `round_limit` rounds have been
    /// played, returning the winner if any.
    pub fn play<C: HeroController>(
        &mut self,
        world: &mut World,
        controller: &mut C,
        round_limit: Option<u32>,
    ) -> Result<Option<Faction>, C::Error> {
        let mut played = 0;
        while round_limit.map_or(true, |limit| played < limit) {
            if let RoundOutcome::Won(winner) = self.play_round(world, controller)? {
                return Ok(Some(winner));
            }
            played += 1;
        }
        Ok(None)
    }

    /// Plays a single round.
    pub fn play_round<C: HeroController>(
        &mut self,
        world: &mut World,
        controller: &mut C,
    ) -> Result<RoundOutcome, C::Error> {
        if let Some(winner) = query::winner(world) {
            self.phase = Phase::Finished;
            return Ok(RoundOutcome::Won(winner));
        }
        tracing::info!(round = query::round(world), "round started");

        self.phase = Phase::HeroPhase;
        let heroes: Vec<UnitId> = query::heroes(world).iter().map(|hero| hero.id).collect();
        for hero in heroes {
            Self::hero_turn(world, controller, hero)?;
            if let Some(outcome) = self.finish_if_won(world) {
                return Ok(outcome);
            }
        }

        self.phase = Phase::MonsterPhase;
        let monsters: Vec<UnitId> = query::monsters(world)
            .iter()
            .map(|monster| monster.id)
            .collect();
        for monster in monsters {
            self.monster_turn(world, controller, monster);
            if let Some(outcome) = self.finish_if_won(world) {
                return Ok(outcome);
            }
        }

        self.phase = Phase::EndOfRound;
        self.end_round(world, controller);
        self.phase = Phase::HeroPhase;
        Ok(RoundOutcome::Continue)
    }

    /// Re-prompts until the hero completes an action or skips; only a
    /// controller error ends the turn early.
    fn hero_turn<C: HeroController>(
        world: &mut World,
        controller: &mut C,
        hero: UnitId,
    ) -> Result<(), C::Error> {
        let mut rejection = None;
        loop {
            let Some(prompt) = prompt_for(world, hero, rejection.take()) else {
                return Ok(());
            };
            let Some(decision) = controller.decide(&prompt)? else {
                continue;
            };
            let kind = decision.kind();
            if !prompt.offers(kind) {
                rejection = Some(Rejection::NotOffered(kind));
                continue;
            }

            match decision {
                Decision::ViewLog => controller.show_combat_log(&query::combat_log(world)),
                Decision::Status => {
                    controller.show_status(&query::heroes(world), &query::monsters(world));
                }
                Decision::Skip => {
                    tracing::debug!(%hero, "turn skipped");
                    return Ok(());
                }
                decision => {
                    let Some(command) = decision.into_command(hero) else {
                        continue;
                    };
                    match execute(world, controller, command) {
                        Some(reason) => {
                            tracing::debug!(%hero, %reason, "decision refused, prompting again");
                            rejection = Some(Rejection::Refused(reason));
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    fn monster_turn<C: HeroController>(
        &mut self,
        world: &mut World,
        controller: &mut C,
        monster: UnitId,
    ) {
        let Some(snapshot) = query::monster(world, monster) else {
            return;
        };
        let targets = query::heroes_in_reach(world, monster);
        let mut commands = Vec::new();
        self.movement.handle(
            &snapshot,
            &targets,
            |cell| query::is_open(world, cell),
            &mut commands,
        );
        for command in commands {
            if let Some(reason) = execute(world, controller, command) {
                tracing::debug!(%monster, %reason, "monster action refused");
            }
        }
    }

    fn end_round<C: HeroController>(&mut self, world: &mut World, controller: &mut C) {
        let mut events = Vec::new();
        world::apply(world, Command::EndRound, &mut events);
        controller.observe(&events);

        let mut commands = Vec::new();
        self.spawning.handle(
            &events,
            query::live_monster_count(world),
            query::highest_hero_level(world),
            &mut commands,
        );
        for command in commands {
            if let Some(reason) = execute(world, controller, command) {
                tracing::warn!(%reason, "reinforcement could not be placed");
            }
        }
    }

    fn finish_if_won(&mut self, world: &World) -> Option<RoundOutcome> {
        let winner = query::winner(world)?;
        tracing::info!(%winner, round = query::round(world), "game over");
        self.phase = Phase::Finished;
        Some(RoundOutcome::Won(winner))
    }
}

/// Applies a command, shows the events to the controller and returns the
/// reason if the world refused it.
fn execute<C: HeroController>(
    world: &mut World,
    controller: &mut C,
    command: Command,
) -> Option<ActionError> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    controller.observe(&events);
    events.into_iter().find_map(|event| match event {
        Event::ActionRejected { reason, .. } => Some(reason),
        _ => None,
    })
}

fn prompt_for(world: &World, hero: UnitId, rejection: Option<Rejection>) -> Option<TurnPrompt> {
    if query::winner(world).is_some() {
        return None;
    }
    let snapshot = query::hero(world, hero)
        .filter(|snapshot| snapshot.is_alive() && snapshot.cell.is_some())?;
    let in_battle = query::is_in_battle(world, hero);
    Some(TurnPrompt {
        round: query::round(world),
        in_battle,
        actions: ActionKind::offered(in_battle),
        targets: query::monsters_in_reach(world, hero)
            .into_iter()
            .filter_map(|monster| query::monster(world, monster))
            .collect(),
        allies: query::teleport_allies(world, hero)
            .into_iter()
            .filter_map(|ally| query::hero(world, ally))
            .collect(),
        obstacles: query::obstacle_candidates(world, hero),
        at_nexus: query::at_home_nexus(world, hero),
        hero: snapshot,
        rejection,
        board: query::board(world).clone(),
        party: query::heroes(world),
        monsters: query::monsters(world),
    })
}
