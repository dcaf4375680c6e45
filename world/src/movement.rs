//! Movement engine: single steps, teleports, recalls and terrain effects.

use valor_core::{
    ActionError, CellCoord, Direction, Event, MoveBlock, TerrainKind, UnitId, TERRAIN_BONUS,
};

use crate::{treasure::Chest, upkeep::learn_spell, World};

impl World {
    /// Moves a hero or monster one cell.
    ///
    /// Fails without side effects when the target is off the board, a wall, an
    /// obstacle or occupied.
    pub(crate) fn move_unit(
        &mut self,
        unit: UnitId,
        direction: Direction,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        if let Ok((index, from)) = self.living_hero(unit) {
            let to = self.board.check_entry(from.step(direction))?;
            return self.relocate_hero(index, to, out, |from| Event::UnitMoved { unit, from, to });
        }

        let (_, from) = self.living_monster(unit)?;
        let to = self.board.check_entry(from.step(direction))?;
        let _ = self.registry.relocate(&mut self.board, unit, to)?;
        tracing::debug!(%unit, %from, %to, "monster stepped");
        out.push(Event::UnitMoved { unit, from, to });
        Ok(())
    }

    /// Places a hero next to an ally standing in a different lane.
    ///
    /// Candidates are tried below, left of and right of the ally; the first
    /// free, enterable one wins.
    pub(crate) fn teleport(
        &mut self,
        hero: UnitId,
        ally: UnitId,
        out: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (index, from) = self.living_hero(hero)?;
        if ally == hero {
            return Err(ActionError::InvalidTarget(ally));
        }
        let (_, ally_cell) = self.living_hero(ally)?;
        if from.column().abs_diff(ally_cell.column()) <= 1 {
            return Err(MoveBlock::SameLane.into());
        }

        let destination = [Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter_map(|direction| ally_cell.step(direction))
            .find(|cell| *cell != from && self.board.is_open(*cell))
            .ok_or(MoveBlock::NoFreeCell)?;

        self.relocate_hero(index, destination, out, |from| Event::HeroTeleported {
            hero,
            ally,
            from,
            to: destination,
        })
    }

    /// Returns a hero to its anchor cell.
    pub(crate) fn recall(&mut self, hero: UnitId, out: &mut Vec<Event>) -> Result<(), ActionError> {
        let (index, from) = self.living_hero(hero)?;
        let anchor = self.heroes[index].anchor;
        if from != anchor {
            let _ = self.board.check_entry(Some(anchor))?;
        }
        self.relocate_hero(index, anchor, out, |from| Event::HeroRecalled {
            hero,
            from,
            to: anchor,
        })
    }

    /// Relocates a placed hero: reverse the old terrain effect, move through
    /// the registry, then apply the new cell's effect.
    fn relocate_hero(
        &mut self,
        index: usize,
        to: CellCoord,
        out: &mut Vec<Event>,
        arrival: impl FnOnce(CellCoord) -> Event,
    ) -> Result<(), ActionError> {
        let hero = &mut self.heroes[index];
        let id = hero.id;
        let lost = hero.lose_terrain_bonus();

        let from = match self.registry.relocate(&mut self.board, id, to) {
            Ok(from) => from,
            Err(error) => {
                if let Some(attribute) = lost {
                    let _ = self.heroes[index].gain_terrain_bonus(attribute);
                }
                return Err(error);
            }
        };

        if let Some(attribute) = lost {
            out.push(Event::TerrainBonusLost {
                hero: id,
                attribute,
                amount: TERRAIN_BONUS,
            });
        }
        tracing::debug!(hero = %id, %from, %to, "hero relocated");
        out.push(arrival(from));
        self.enter_cell(index, to, out);
        Ok(())
    }

    /// Applies the effects of the terrain a hero just stepped onto.
    pub(crate) fn enter_cell(&mut self, index: usize, cell: CellCoord, out: &mut Vec<Event>) {
        let Some(terrain) = self.board.terrain(cell) else {
            return;
        };
        if terrain == TerrainKind::Mystery && self.board.reveal_mystery(cell) {
            self.open_chest(index, cell, out);
            return;
        }
        let Some(attribute) = terrain.bonus() else {
            return;
        };
        let hero = &mut self.heroes[index];
        if hero.gain_terrain_bonus(attribute) {
            out.push(Event::TerrainBonusGained {
                hero: hero.id,
                attribute,
                amount: TERRAIN_BONUS,
            });
        }
    }

    fn open_chest(&mut self, index: usize, cell: CellCoord, out: &mut Vec<Event>) {
        let chest = Chest::roll(self.dice.as_mut());
        let hero = &mut self.heroes[index];
        hero.gold = hero.gold.saturating_add(chest.gold);
        tracing::debug!(hero = %hero.id, %cell, gold = chest.gold, "treasure opened");
        out.push(Event::TreasureOpened {
            hero: hero.id,
            cell,
            gold: chest.gold,
            experience: chest.experience,
            item: chest.item.as_ref().map(|item| item.name.clone()),
        });

        if let Some(item) = chest.item {
            if item.as_spell().is_some() {
                learn_spell(hero, item.clone(), out);
            }
            hero.inventory.push(item);
        }
        for level in hero.gain_experience(chest.experience) {
            out.push(Event::HeroLeveledUp { hero: hero.id, level });
        }
    }
}

#[cfg(test)]
mod tests {
    use valor_core::{
        Attribute, BoardLayout, CellCoord, Command, Direction, Event, GameConfig, HeroClass,
        HeroSpec, MonsterKind, MonsterSpec, MoveBlock, TerrainKind, UnitId,
    };

    use crate::{apply, query, GridBoard, ScriptedDice, World};

    fn board_with(cells: &[(CellCoord, TerrainKind)]) -> GridBoard {
        cells.iter().fold(
            GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain),
            |board, (cell, terrain)| board.with_terrain(*cell, *terrain).expect("interior"),
        )
    }

    fn world_with(board: GridBoard, heroes: &[CellCoord], dice: ScriptedDice) -> World {
        let names = ["Gaerdal", "Rillifane", "Parzival"];
        heroes
            .iter()
            .zip(names)
            .fold(World::builder(GameConfig::default()).board(board), |builder, (cell, name)| {
                builder.hero_at(HeroSpec::new(name, HeroClass::Warrior, 2000), *cell)
            })
            .build(Box::new(dice))
            .expect("valid world")
    }

    fn hero_id(world: &World, slot: usize) -> UnitId {
        query::heroes(world)[slot].id
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn bush_bonus_is_reversed_on_exit() {
        let bush = CellCoord::new(5, 1);
        let mut world = world_with(
            board_with(&[(bush, TerrainKind::Bush)]),
            &[CellCoord::new(6, 1)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let before = query::hero(&world, hero).expect("hero").current;

        let events = run(&mut world, Command::Move { unit: hero, direction: Direction::Up });
        assert!(events.contains(&Event::TerrainBonusGained {
            hero,
            attribute: Attribute::Dexterity,
            amount: 10,
        }));
        let on_bush = query::hero(&world, hero).expect("hero").current;
        assert_eq!(on_bush.dexterity, before.dexterity + 10);

        let _ = run(&mut world, Command::Move { unit: hero, direction: Direction::Down });
        let after = query::hero(&world, hero).expect("hero").current;
        assert_eq!(after, before);
    }

    #[test]
    fn walking_between_bonus_cells_never_stacks() {
        let cave = CellCoord::new(4, 1);
        let koulou = CellCoord::new(4, 0);
        let mut world = world_with(
            board_with(&[(cave, TerrainKind::Cave), (koulou, TerrainKind::Koulou)]),
            &[CellCoord::new(5, 1)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let base = query::hero(&world, hero).expect("hero").base;

        let _ = run(&mut world, Command::Move { unit: hero, direction: Direction::Up });
        let _ = run(&mut world, Command::Move { unit: hero, direction: Direction::Left });
        let snapshot = query::hero(&world, hero).expect("hero");
        assert_eq!(snapshot.current.agility, base.agility);
        assert_eq!(snapshot.current.strength, base.strength + 10);
        assert_eq!(snapshot.terrain_bonus, Some(Attribute::Strength));
    }

    #[test]
    fn blocked_moves_leave_the_world_untouched() {
        let obstacle = CellCoord::new(4, 1);
        let mut world = world_with(
            board_with(&[(obstacle, TerrainKind::Obstacle)]),
            &[CellCoord::new(5, 1), CellCoord::new(5, 0)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);

        let cases = [
            (Direction::Up, MoveBlock::Obstacle(obstacle)),
            (Direction::Right, MoveBlock::Inaccessible(CellCoord::new(5, 2))),
            (Direction::Left, MoveBlock::Occupied(CellCoord::new(5, 0))),
        ];
        for (direction, reason) in cases {
            let events = run(&mut world, Command::Move { unit: hero, direction });
            assert_eq!(
                events,
                vec![Event::ActionRejected {
                    unit: Some(hero),
                    reason: reason.into(),
                }]
            );
            assert_eq!(query::position(&world, hero), Some(CellCoord::new(5, 1)));
        }
    }

    #[test]
    fn stepping_off_the_board_is_an_illegal_move() {
        let mut world = world_with(
            board_with(&[]),
            &[CellCoord::new(3, 0)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let events = run(&mut world, Command::Move { unit: hero, direction: Direction::Left });
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                unit: Some(hero),
                reason: MoveBlock::OutOfBounds.into(),
            }]
        );
    }

    #[test]
    fn teleport_requires_another_lane() {
        let mut world = world_with(
            board_with(&[]),
            &[CellCoord::new(4, 0), CellCoord::new(4, 1)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let ally = hero_id(&world, 1);
        let events = run(&mut world, Command::Teleport { hero, ally });
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                unit: Some(hero),
                reason: MoveBlock::SameLane.into(),
            }]
        );
    }

    #[test]
    fn teleport_lands_below_the_ally_when_free() {
        let mut world = world_with(
            board_with(&[]),
            &[CellCoord::new(2, 0), CellCoord::new(3, 4)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let ally = hero_id(&world, 1);
        let events = run(&mut world, Command::Teleport { hero, ally });
        assert!(events.contains(&Event::HeroTeleported {
            hero,
            ally,
            from: CellCoord::new(2, 0),
            to: CellCoord::new(4, 4),
        }));
    }

    #[test]
    fn teleport_skips_blocked_candidates_in_order() {
        // Below is an obstacle and the left neighbour is a wall.
        let mut world = world_with(
            board_with(&[(CellCoord::new(4, 6), TerrainKind::Obstacle)]),
            &[CellCoord::new(2, 0), CellCoord::new(3, 6)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let ally = hero_id(&world, 1);
        let _ = run(&mut world, Command::Teleport { hero, ally });
        assert_eq!(query::position(&world, hero), Some(CellCoord::new(3, 7)));
        assert!(query::consistency_report(&world).is_empty());
    }

    #[test]
    fn teleport_fails_when_every_candidate_is_taken() {
        let mut world = world_with(
            board_with(&[(CellCoord::new(4, 1), TerrainKind::Obstacle)]),
            &[CellCoord::new(3, 6), CellCoord::new(3, 1), CellCoord::new(3, 0)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let ally = hero_id(&world, 1);
        let events = run(&mut world, Command::Teleport { hero, ally });
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                unit: Some(hero),
                reason: MoveBlock::NoFreeCell.into(),
            }]
        );
        assert_eq!(query::position(&world, hero), Some(CellCoord::new(3, 6)));
    }

    #[test]
    fn recall_returns_to_anchor_and_reverses_terrain() {
        let koulou = CellCoord::new(5, 0);
        let mut world = world_with(
            board_with(&[(koulou, TerrainKind::Koulou)]),
            &[CellCoord::new(6, 0)],
            ScriptedDice::new(),
        );
        let hero = hero_id(&world, 0);
        let base = query::hero(&world, hero).expect("hero").base;
        let _ = run(&mut world, Command::Move { unit: hero, direction: Direction::Up });

        let events = run(&mut world, Command::Recall { hero });
        assert!(events.contains(&Event::HeroRecalled {
            hero,
            from: koulou,
            to: CellCoord::new(7, 1),
        }));
        let snapshot = query::hero(&world, hero).expect("hero");
        assert_eq!(snapshot.cell, Some(snapshot.anchor));
        assert_eq!(snapshot.current, base);
    }

    #[test]
    fn first_hero_on_a_mystery_opens_the_chest_once() {
        let mystery = CellCoord::new(5, 1);
        let dice = ScriptedDice::new().with_values([200, 3]);
        let mut world = world_with(
            board_with(&[(mystery, TerrainKind::Mystery)]),
            &[CellCoord::new(6, 1)],
            dice,
        );
        let hero = hero_id(&world, 0);

        let events = run(&mut world, Command::Move { unit: hero, direction: Direction::Up });
        assert!(events.contains(&Event::TreasureOpened {
            hero,
            cell: mystery,
            gold: 300,
            experience: 8,
            item: None,
        }));
        assert_eq!(
            query::board(&world).terrain(mystery),
            Some(TerrainKind::Treasure)
        );
        let snapshot = query::hero(&world, hero).expect("hero");
        assert_eq!(snapshot.gold, 2300);
        assert_eq!(snapshot.experience, 8);

        let _ = run(&mut world, Command::Move { unit: hero, direction: Direction::Down });
        let again = run(&mut world, Command::Move { unit: hero, direction: Direction::Up });
        assert!(!again
            .iter()
            .any(|event| matches!(event, Event::TreasureOpened { .. })));
    }

    #[test]
    fn monsters_ignore_terrain_effects() {
        let mystery = CellCoord::new(2, 1);
        let mut world = World::builder(GameConfig::default())
            .board(board_with(&[(mystery, TerrainKind::Mystery)]))
            .monster_at(
                MonsterSpec::from_template(MonsterKind::Dragon, 1, "Igneel"),
                CellCoord::new(1, 1),
            )
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world");
        let monster = query::monsters(&world)[0].id;

        let events = run(&mut world, Command::Move { unit: monster, direction: Direction::Down });
        assert_eq!(
            events,
            vec![Event::UnitMoved {
                unit: monster,
                from: CellCoord::new(1, 1),
                to: mystery,
            }]
        );
        assert_eq!(query::board(&world).terrain(mystery), Some(TerrainKind::Mystery));
    }
}
