use valor_core::{
    BoardLayout, CellCoord, Event, Faction, GameConfig, HeroClass, HeroSpec, MonsterKind,
    MonsterSpec, TerrainKind,
};
use valor_system_movement::Movement;
use valor_world::{self as world, query, GridBoard, ScriptedDice, World};

fn monster_turn(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    for monster in query::monsters(world) {
        let targets = query::heroes_in_reach(world, monster.id);
        let mut commands = Vec::new();
        movement.handle(&monster, &targets, |cell| query::is_open(world, cell), &mut commands);
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
    events
}

#[test]
fn lone_monster_marches_to_the_heroes_nexus() {
    let mut world = World::builder(GameConfig::default())
        .board(GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain))
        .monster(MonsterSpec::from_template(MonsterKind::Dragon, 1, "Igneel"))
        .build(Box::new(ScriptedDice::new()))
        .expect("valid world");
    let mut movement = Movement::default();

    let mut turns = 0;
    while query::winner(&world).is_none() && turns < 10 {
        let _ = monster_turn(&mut world, &mut movement);
        turns += 1;
    }

    assert_eq!(turns, 7);
    assert_eq!(query::winner(&world), Some(Faction::Monsters));
    assert_eq!(query::monsters(&world)[0].cell, CellCoord::new(7, 1));
}

#[test]
fn obstacles_are_sidestepped_not_routed_around() {
    let board = GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain)
        .with_terrain(CellCoord::new(2, 1), TerrainKind::Obstacle)
        .expect("interior cell");
    let mut world = World::builder(GameConfig::default())
        .board(board)
        .monster_at(
            MonsterSpec::from_template(MonsterKind::Spirit, 1, "Blinky"),
            CellCoord::new(1, 1),
        )
        .build(Box::new(ScriptedDice::new()))
        .expect("valid world");
    let monster = query::monsters(&world)[0].id;
    let mut movement = Movement::default();

    let events = monster_turn(&mut world, &mut movement);
    assert_eq!(
        events,
        vec![Event::UnitMoved {
            unit: monster,
            from: CellCoord::new(1, 1),
            to: CellCoord::new(1, 0),
        }]
    );
}

#[test]
fn monsters_strike_instead_of_moving_when_a_hero_is_adjacent() {
    let mut world = World::builder(GameConfig::default())
        .board(GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain))
        .hero_at(
            HeroSpec::new("Gaerdal", HeroClass::Warrior, 0),
            CellCoord::new(3, 4),
        )
        .monster_at(
            MonsterSpec::from_template(MonsterKind::Exoskeleton, 1, "Brandobaris"),
            CellCoord::new(2, 4),
        )
        .build(Box::new(ScriptedDice::new()))
        .expect("valid world");
    let monster = query::monsters(&world)[0].id;
    let mut movement = Movement::default();

    let events = monster_turn(&mut world, &mut movement);
    assert!(matches!(
        events[..],
        [Event::AttackResolved { attacker, .. }] if attacker == monster
    ));
    assert_eq!(query::position(&world, monster), Some(CellCoord::new(2, 4)));
}

#[test]
fn boxed_in_monster_waits() {
    let board = GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain)
        .with_terrain(CellCoord::new(2, 0), TerrainKind::Obstacle)
        .expect("interior cell");
    let world = World::builder(GameConfig::default())
        .board(board)
        .monster_at(
            MonsterSpec::from_template(MonsterKind::Dragon, 1, "Igneel"),
            CellCoord::new(1, 0),
        )
        .monster_at(
            MonsterSpec::from_template(MonsterKind::Dragon, 1, "Kas"),
            CellCoord::new(1, 1),
        )
        .build(Box::new(ScriptedDice::new()))
        .expect("valid world");
    let movement = Movement::default();
    let stuck = &query::monsters(&world)[0];
    assert_eq!(
        movement.next_step(stuck.cell, |cell| query::is_open(&world, cell)),
        None
    );
}
