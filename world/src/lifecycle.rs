//! Round upkeep: regeneration, respawns, monster spawns and position repair.

use valor_core::{
    ActionError, CellCoord, Event, Faction, MonsterSpec, MoveBlock, UnitId, MAX_LIVE_MONSTERS,
    TERRAIN_BONUS,
};

use crate::{units::Monster, World};

impl World {
    /// Closes the current round.
    ///
    /// Living heroes regenerate, fallen heroes return to their anchors and the
    /// round counter advances.
    pub(crate) fn end_round(&mut self, out: &mut Vec<Event>) {
        for index in 0..self.heroes.len() {
            let hero = &mut self.heroes[index];
            if hero.is_alive() {
                let (health, mana) = hero.regenerate();
                if health > 0 || mana > 0 {
                    out.push(Event::HeroRegenerated {
                        hero: hero.id,
                        health,
                        mana,
                    });
                }
            } else {
                self.respawn(index, out);
            }
        }

        tracing::info!(round = self.round, "round complete");
        out.push(Event::RoundAdvanced { round: self.round });
        self.round = self.round.saturating_add(1);
    }

    fn respawn(&mut self, index: usize, out: &mut Vec<Event>) {
        let hero = &self.heroes[index];
        let (id, anchor) = (hero.id, hero.anchor);
        let Some(cell) = self.home_cell(anchor) else {
            tracing::warn!(hero = %hero.name, %anchor, "no free nexus cell, respawn deferred");
            return;
        };
        if let Err(error) = self.registry.place(&mut self.board, id, cell) {
            tracing::warn!(hero = %id, %cell, %error, "respawn placement failed");
            return;
        }

        let vitality = self.config.respawn;
        self.heroes[index].restore(vitality);
        tracing::info!(hero = %id, %cell, "hero respawned");
        out.push(Event::HeroRespawned { hero: id, cell });
        self.enter_cell(index, cell, out);
    }

    /// Anchor if free, otherwise the closest free cell of the heroes' Nexus row.
    fn home_cell(&self, anchor: CellCoord) -> Option<CellCoord> {
        let row = self.board.layout().last_row();
        (0..self.board.columns())
            .map(|column| CellCoord::new(row, column))
            .filter(|cell| {
                self.board.is_nexus_of(*cell, Faction::Heroes) && self.board.is_open(*cell)
            })
            .min_by_key(|cell| (cell.column().abs_diff(anchor.column()), cell.column()))
    }

    /// Introduces a monster on the monsters' Nexus row.
    ///
    /// Lanes are tried in order, inner column of each starting pair first. The
    /// monster takes the lowest display slot not held by a living monster.
    pub(crate) fn spawn_monster(
        &mut self,
        spec: MonsterSpec,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let living = self.monsters.iter().filter(|monster| monster.is_alive()).count();
        if living >= MAX_LIVE_MONSTERS {
            return Err(MoveBlock::NoFreeCell.into());
        }
        let cell = spawn_cells(self.board.columns())
            .find(|cell| {
                self.board.is_nexus_of(*cell, Faction::Monsters) && self.board.is_open(*cell)
            })
            .ok_or(MoveBlock::NoFreeCell)?;
        let slot = (1..=u8::MAX)
            .find(|slot| {
                !self
                    .monsters
                    .iter()
                    .any(|monster| monster.is_alive() && monster.slot == *slot)
            })
            .unwrap_or(u8::MAX);

        let id = self.allocate_id();
        self.registry.place(&mut self.board, id, cell)?;
        let monster = Monster::from_spec(id, slot, spec);
        tracing::info!(monster = %monster.name, level = monster.level, %cell, "monster spawned");
        out.push(Event::MonsterSpawned {
            monster: id,
            cell,
            level: monster.level,
            name: monster.name.clone(),
        });
        self.monsters.push(monster);
        Ok(())
    }

    /// Repairs a hero whose stored position and occupant pointer disagree by
    /// recalling it home.
    pub(crate) fn reconcile(&mut self, hero: UnitId, out: &mut Vec<Event>) {
        let damaged = self
            .registry
            .audit(&self.board)
            .iter()
            .any(|inconsistency| inconsistency.unit() == hero);
        if !damaged {
            return;
        }
        let Some(index) = self.hero_index(hero) else {
            return;
        };

        tracing::warn!(%hero, "position record out of sync, recalling to anchor");
        self.registry.purge(&mut self.board, hero);
        if let Some(attribute) = self.heroes[index].lose_terrain_bonus() {
            out.push(Event::TerrainBonusLost {
                hero,
                attribute,
                amount: TERRAIN_BONUS,
            });
        }
        if !self.heroes[index].is_alive() {
            return;
        }
        let anchor = self.heroes[index].anchor;
        let Some(cell) = self.home_cell(anchor) else {
            tracing::warn!(%hero, %anchor, "no free nexus cell for recovery");
            return;
        };
        if self.registry.place(&mut self.board, hero, cell).is_ok() {
            out.push(Event::PositionRecovered { unit: hero, cell });
            self.enter_cell(index, cell, out);
        }
    }
}

/// Starting cells of the monsters' row in lane order.
fn spawn_cells(columns: u32) -> impl Iterator<Item = CellCoord> {
    (0..MAX_LIVE_MONSTERS as u32)
        .flat_map(|lane| [lane * 3 + 1, lane * 3])
        .filter(move |column| *column < columns)
        .map(|column| CellCoord::new(0, column))
}

#[cfg(test)]
mod tests {
    use valor_core::{
        BoardLayout, Command, GameConfig, HeroClass, HeroSpec, MonsterKind, RespawnVitality,
        TerrainKind,
    };

    use super::*;
    use crate::{apply, query, GridBoard, ScriptedDice};

    fn plain() -> GridBoard {
        GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain)
    }

    fn brute() -> MonsterSpec {
        MonsterSpec {
            base_damage: 500,
            ..MonsterSpec::from_template(MonsterKind::Dragon, 10, "Desghidorrah")
        }
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn end_of_round_regenerates_and_advances() {
        let mut world = World::builder(GameConfig::default())
            .board(plain())
            .hero(HeroSpec::new("Gaerdal", HeroClass::Warrior, 0))
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");
        let events = run(&mut world, Command::EndRound);
        assert_eq!(events, vec![Event::RoundAdvanced { round: 1 }]);
        assert_eq!(query::round(&world), 2);
    }

    fn slain_hero(vitality: RespawnVitality) -> (World, UnitId) {
        let config = GameConfig {
            respawn: vitality,
            ..GameConfig::default()
        };
        let mut world = World::builder(config)
            .board(plain())
            .hero_at(HeroSpec::new("Gaerdal", HeroClass::Warrior, 0), CellCoord::new(3, 1))
            .monster_at(brute(), CellCoord::new(2, 1))
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");
        let hero = query::heroes(&world)[0].id;
        let monster = query::monsters(&world)[0].id;
        let events = run(&mut world, Command::MonsterStrike { monster });
        assert!(events.contains(&Event::UnitDefeated {
            unit: hero,
            faction: Faction::Heroes,
            cell: CellCoord::new(3, 1),
        }));
        (world, hero)
    }

    #[test]
    fn fallen_heroes_leave_the_board_until_the_round_ends() {
        let (mut world, hero) = slain_hero(RespawnVitality::Full);
        assert_eq!(query::position(&world, hero), None);
        assert!(query::board(&world).occupant(CellCoord::new(3, 1)).is_none());

        let events = run(&mut world, Command::EndRound);
        assert_eq!(
            events[0],
            Event::HeroRespawned {
                hero,
                cell: CellCoord::new(7, 1),
            }
        );
        let snapshot = query::hero(&world, hero).expect("hero");
        assert_eq!(snapshot.health.current, snapshot.health.maximum);
        assert_eq!(snapshot.cell, Some(snapshot.anchor));
    }

    #[test]
    fn half_vitality_respawn_restores_half() {
        let (mut world, hero) = slain_hero(RespawnVitality::Half);
        let _ = run(&mut world, Command::EndRound);
        let snapshot = query::hero(&world, hero).expect("hero");
        assert_eq!(snapshot.health.current, 50);
        assert_eq!(snapshot.mana.current, snapshot.mana.maximum.div_ceil(2));
    }

    #[test]
    fn respawn_falls_back_to_the_nearest_nexus_cell() {
        let mut world = World::builder(GameConfig::default())
            .board(plain())
            .hero_at(HeroSpec::new("Gaerdal", HeroClass::Warrior, 0), CellCoord::new(7, 4))
            .hero_at(HeroSpec::new("Rillifane", HeroClass::Sorcerer, 0), CellCoord::new(3, 4))
            .monster_at(brute(), CellCoord::new(2, 4))
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");
        let fallen = query::heroes(&world)[1].id;
        let monster = query::monsters(&world)[0].id;
        let _ = run(&mut world, Command::MonsterStrike { monster });
        assert_eq!(query::position(&world, fallen), None);

        let events = run(&mut world, Command::EndRound);
        assert!(events.contains(&Event::HeroRespawned {
            hero: fallen,
            cell: CellCoord::new(7, 3),
        }));
    }

    #[test]
    fn spawns_fill_lanes_in_order_and_respect_capacity() {
        let mut world = World::builder(GameConfig::default())
            .board(plain())
            .monster(MonsterSpec::from_template(MonsterKind::Spirit, 1, "Casper"))
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");

        let events = run(
            &mut world,
            Command::SpawnMonster {
                spec: MonsterSpec::from_template(MonsterKind::Dragon, 2, "Natsunomeryu"),
            },
        );
        let spawned = query::monsters(&world)[1].clone();
        assert_eq!(
            events,
            vec![Event::MonsterSpawned {
                monster: spawned.id,
                cell: CellCoord::new(0, 0),
                level: 2,
                name: "Natsunomeryu".to_owned(),
            }]
        );
        assert_eq!(spawned.label(), "M2");

        let _ = run(
            &mut world,
            Command::SpawnMonster {
                spec: MonsterSpec::from_template(MonsterKind::Dragon, 2, "Chrysophylax"),
            },
        );
        assert_eq!(query::live_monster_count(&world), 3);

        let events = run(
            &mut world,
            Command::SpawnMonster {
                spec: MonsterSpec::from_template(MonsterKind::Dragon, 2, "Kas"),
            },
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                unit: None,
                reason: MoveBlock::NoFreeCell.into(),
            }]
        );
    }

    #[test]
    fn out_of_sync_hero_is_recalled_before_acting() {
        let mut world = World::builder(GameConfig::default())
            .board(plain())
            .hero_at(HeroSpec::new("Gaerdal", HeroClass::Warrior, 0), CellCoord::new(3, 3))
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");
        let hero = query::heroes(&world)[0].id;
        world.registry.corrupt(hero, CellCoord::new(4, 4));
        assert!(!query::consistency_report(&world).is_empty());

        let events = run(
            &mut world,
            Command::Move {
                unit: hero,
                direction: valor_core::Direction::Up,
            },
        );
        assert_eq!(
            events[0],
            Event::PositionRecovered {
                unit: hero,
                cell: CellCoord::new(7, 1),
            }
        );
        assert_eq!(query::position(&world, hero), Some(CellCoord::new(6, 1)));
        assert!(query::consistency_report(&world).is_empty());
    }
}
