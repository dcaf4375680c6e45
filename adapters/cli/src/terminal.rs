//! Line-oriented hero controller reading choices from a terminal.

use std::io::{self, BufRead, Write};

use valor_core::{
    Direction, EquipSlot, Event, HeroSnapshot, Item, ItemKind, MonsterSnapshot, SpellSource, UnitId,
};
use valor_system_rounds::{ActionKind, Decision, HeroController, ShopOrder, TurnPrompt};

use crate::{
    render::{self, Labels},
    transcript::Transcript,
};

/// Sink for the optional event transcript.
pub(crate) type TranscriptSink = Transcript<Box<dyn Write>>;

/// Prompts the player for every hero turn and narrates what happens.
///
/// Typing `q` at any prompt ends the session with an
/// [`io::ErrorKind::Interrupted`] error. A blank or unrecognised answer backs
/// out of the current menu without spending the turn.
pub(crate) struct Terminal<R, W> {
    input: R,
    output: W,
    catalog: Vec<Item>,
    labels: Labels,
    transcript: Option<TranscriptSink>,
    pending: Option<io::Error>,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub(crate) fn new(input: R, output: W, catalog: Vec<Item>) -> Self {
        Self {
            input,
            output,
            catalog,
            labels: Labels::default(),
            transcript: None,
            pending: None,
        }
    }

    pub(crate) fn with_transcript(mut self, transcript: TranscriptSink) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Flushes the transcript and reports any write failure seen while
    /// observing events.
    pub(crate) fn finish(&mut self) -> io::Result<()> {
        if let Some(error) = self.pending.take() {
            return Err(error);
        }
        match self.transcript.as_mut() {
            Some(transcript) => transcript.flush(),
            None => Ok(()),
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        let answer = line.trim().to_ascii_lowercase();
        if answer == "q" {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "player quit"));
        }
        Ok(answer)
    }

    /// Lists `options` and returns the chosen position, if any.
    fn choose(&mut self, title: &str, options: &[String]) -> io::Result<Option<usize>> {
        if options.is_empty() {
            writeln!(self.output, "Nothing to choose for {title}.")?;
            return Ok(None);
        }
        writeln!(self.output, "{title}:")?;
        for (position, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", position + 1)?;
        }
        write!(self.output, "> ")?;
        let answer = self.read_line()?;
        let choice = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .filter(|position| *position < options.len());
        if choice.is_none() {
            writeln!(self.output, "Back to the menu.")?;
        }
        Ok(choice)
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question} ")?;
        self.read_line()
    }

    fn draw(&mut self, prompt: &TurnPrompt) -> io::Result<()> {
        self.labels.refresh(&prompt.party, &prompt.monsters);
        writeln!(self.output)?;
        write!(self.output, "{}", render::board(&prompt.board, &self.labels))?;
        writeln!(
            self.output,
            "Round {} | {}",
            prompt.round,
            render::hero_line(&prompt.hero)
        )?;
        if let Some(rejection) = &prompt.rejection {
            writeln!(self.output, "That did not work: {rejection}")?;
        }
        Ok(())
    }

    fn decide_move(&mut self) -> io::Result<Option<Decision>> {
        let answer = self.ask("Direction (w/a/s/d):")?;
        Ok(answer
            .chars()
            .next()
            .and_then(Direction::from_key)
            .map(Decision::Move))
    }

    fn pick_target(&mut self, targets: &[MonsterSnapshot]) -> io::Result<Option<UnitId>> {
        if let [only] = targets {
            return Ok(Some(only.id));
        }
        let options: Vec<String> = targets.iter().map(render::monster_line).collect();
        Ok(self.choose("Target", &options)?.map(|position| targets[position].id))
    }

    fn decide_spell(&mut self, prompt: &TurnPrompt) -> io::Result<Option<Decision>> {
        let hero = &prompt.hero;
        let mut sources = Vec::new();
        let mut options = Vec::new();
        for (position, spell) in hero.spells.iter().enumerate() {
            sources.push(SpellSource::Learned(position));
            options.push(format!("{spell} [learned]"));
        }
        for (position, item) in hero.inventory.iter().enumerate() {
            if item.as_spell().is_some() {
                sources.push(SpellSource::Inventory(position));
                options.push(format!("{item} [scroll]"));
            }
        }
        let Some(choice) = self.choose("Spell", &options)? else {
            return Ok(None);
        };
        let target = self.pick_target(&prompt.targets)?;
        Ok(target.map(|target| Decision::CastSpell {
            spell: sources[choice],
            target,
        }))
    }

    fn decide_potion(&mut self, hero: &HeroSnapshot) -> io::Result<Option<Decision>> {
        let potions = inventory_positions(hero, |item| matches!(item.kind, ItemKind::Potion(_)));
        let options = describe_positions(hero, &potions);
        Ok(self
            .choose("Potion", &options)?
            .map(|choice| Decision::UsePotion(potions[choice])))
    }

    fn decide_equipment(&mut self, hero: &HeroSnapshot) -> io::Result<Option<Decision>> {
        let answer = self.ask("Equip or unequip (e/u):")?;
        match answer.as_str() {
            "e" => {
                let gear = inventory_positions(hero, |item| {
                    item.as_weapon().is_some() || item.as_armor().is_some()
                });
                let options = describe_positions(hero, &gear);
                Ok(self
                    .choose("Equip", &options)?
                    .map(|choice| Decision::Equip(gear[choice])))
            }
            "u" => {
                let mut slots: Vec<EquipSlot> =
                    (0..hero.weapons.len()).map(EquipSlot::Weapon).collect();
                let mut options: Vec<String> =
                    hero.weapons.iter().map(ToString::to_string).collect();
                if let Some(armor) = &hero.armor {
                    slots.push(EquipSlot::Armor);
                    options.push(armor.to_string());
                }
                Ok(self
                    .choose("Unequip", &options)?
                    .map(|choice| Decision::Unequip(slots[choice])))
            }
            _ => Ok(None),
        }
    }

    fn decide_obstacle(&mut self, prompt: &TurnPrompt) -> io::Result<Option<Decision>> {
        match prompt.obstacles.as_slice() {
            [] => {
                writeln!(self.output, "No obstacle within reach.")?;
                Ok(None)
            }
            [_] => Ok(Some(Decision::RemoveObstacle(None))),
            cells => {
                let options: Vec<String> = cells.iter().map(ToString::to_string).collect();
                Ok(self
                    .choose("Obstacle", &options)?
                    .map(|choice| Decision::RemoveObstacle(Some(choice))))
            }
        }
    }

    fn decide_teleport(&mut self, allies: &[HeroSnapshot]) -> io::Result<Option<Decision>> {
        let options: Vec<String> = allies.iter().map(render::hero_line).collect();
        Ok(self
            .choose("Ally", &options)?
            .map(|choice| Decision::Teleport(allies[choice].id)))
    }

    fn decide_shop(&mut self, prompt: &TurnPrompt) -> io::Result<Option<Decision>> {
        if !prompt.at_nexus {
            writeln!(self.output, "The market is only reachable from the heroes' Nexus.")?;
            return Ok(None);
        }
        writeln!(self.output, "Gold: {}", prompt.hero.gold)?;
        let answer = self.ask("Buy or sell (b/s):")?;
        match answer.as_str() {
            "b" => {
                let options: Vec<String> = self
                    .catalog
                    .iter()
                    .map(|item| {
                        format!(
                            "{item}: {} gold, level {}",
                            item.cost, item.level_requirement
                        )
                    })
                    .collect();
                let choice = self.choose("Buy", &options)?;
                Ok(choice.map(|position| {
                    Decision::Shop(ShopOrder::Buy(self.catalog[position].clone()))
                }))
            }
            "s" => {
                let options: Vec<String> = prompt
                    .hero
                    .inventory
                    .iter()
                    .map(|item| format!("{item}: sells for {}", item.sell_value()))
                    .collect();
                Ok(self
                    .choose("Sell", &options)?
                    .map(|position| Decision::Shop(ShopOrder::Sell(position))))
            }
            _ => Ok(None),
        }
    }
}

fn inventory_positions(hero: &HeroSnapshot, keep: impl Fn(&Item) -> bool) -> Vec<usize> {
    hero.inventory
        .iter()
        .enumerate()
        .filter(|(_, item)| keep(item))
        .map(|(position, _)| position)
        .collect()
}

fn describe_positions(hero: &HeroSnapshot, positions: &[usize]) -> Vec<String> {
    positions
        .iter()
        .map(|position| hero.inventory[*position].to_string())
        .collect()
}

impl<R: BufRead, W: Write> HeroController for Terminal<R, W> {
    type Error = io::Error;

    fn decide(&mut self, prompt: &TurnPrompt) -> Result<Option<Decision>, Self::Error> {
        if let Some(error) = self.pending.take() {
            return Err(error);
        }
        self.draw(prompt)?;
        let options: Vec<String> = prompt.actions.iter().map(ToString::to_string).collect();
        let question = format!("{}, choose an action", prompt.hero.name);
        let Some(choice) = self.choose(&question, &options)? else {
            return Ok(None);
        };

        match prompt.actions[choice] {
            ActionKind::Move => self.decide_move(),
            ActionKind::Attack => Ok(self.pick_target(&prompt.targets)?.map(Decision::Attack)),
            ActionKind::CastSpell => self.decide_spell(prompt),
            ActionKind::UsePotion => self.decide_potion(&prompt.hero),
            ActionKind::Equipment => self.decide_equipment(&prompt.hero),
            ActionKind::RemoveObstacle => self.decide_obstacle(prompt),
            ActionKind::Teleport => self.decide_teleport(&prompt.allies),
            ActionKind::Recall => Ok(Some(Decision::Recall)),
            ActionKind::Shop => self.decide_shop(prompt),
            ActionKind::ViewLog => Ok(Some(Decision::ViewLog)),
            ActionKind::Status => Ok(Some(Decision::Status)),
            ActionKind::Skip => Ok(Some(Decision::Skip)),
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::MonsterSpawned { monster, name, .. } = event {
                self.labels.remember(*monster, name);
            }
            let mut result = match render::describe(event, &self.labels) {
                Some(line) => writeln!(self.output, "{line}"),
                None => Ok(()),
            };
            if let Some(transcript) = self.transcript.as_mut() {
                result = result.and_then(|()| transcript.record(event));
            }
            if let Err(error) = result {
                tracing::error!(%error, "failed to report event");
                let _ = self.pending.get_or_insert(error);
            }
        }
    }

    fn show_combat_log(&mut self, records: &[Event]) {
        let lines: Vec<String> = records
            .iter()
            .filter_map(|record| render::describe(record, &self.labels))
            .collect();
        let result = if lines.is_empty() {
            writeln!(self.output, "No combat yet.")
        } else {
            lines
                .iter()
                .try_for_each(|line| writeln!(self.output, "  {line}"))
        };
        if let Err(error) = result {
            let _ = self.pending.get_or_insert(error);
        }
    }

    fn show_status(&mut self, heroes: &[HeroSnapshot], monsters: &[MonsterSnapshot]) {
        let result = heroes
            .iter()
            .map(render::hero_line)
            .chain(monsters.iter().map(render::monster_line))
            .try_for_each(|line| writeln!(self.output, "  {line}"));
        if let Err(error) = result {
            let _ = self.pending.get_or_insert(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;
    use valor_core::{BoardLayout, CellCoord, GameConfig, HeroClass, HeroSpec, TerrainKind};
    use valor_system_rounds::RoundScheduler;
    use valor_world::{query, GridBoard, ScriptedDice, World};

    fn world_with_hero_at(cell: CellCoord) -> World {
        World::builder(GameConfig::default())
            .board(GridBoard::uniform(BoardLayout::default(), TerrainKind::Plain))
            .hero_at(HeroSpec::new("Gaerdal", HeroClass::Warrior, 1000), cell)
            .build(Box::new(ScriptedDice::new()))
            .expect("valid world")
    }

    fn play(world: &mut World, script: &str) -> (io::Result<()>, String) {
        let mut output = Vec::new();
        let mut terminal = Terminal::new(script.as_bytes(), &mut output, catalog());
        let mut scheduler = RoundScheduler::new(&GameConfig::default(), 0);
        let result = scheduler.play_round(world, &mut terminal).map(|_| ());
        drop(terminal);
        (result, String::from_utf8(output).expect("utf-8 output"))
    }

    #[test]
    fn numbered_menu_and_wasd_move_the_hero() {
        let mut world = world_with_hero_at(CellCoord::new(6, 1));
        let hero = query::heroes(&world)[0].id;

        let (result, output) = play(&mut world, "1\nw\n");

        assert!(result.is_ok());
        assert_eq!(query::position(&world, hero), Some(CellCoord::new(5, 1)));
        assert!(output.contains("Gaerdal moves to (5, 1)"));
    }

    #[test]
    fn invalid_answers_back_out_without_spending_the_turn() {
        let mut world = world_with_hero_at(CellCoord::new(6, 1));
        let hero = query::heroes(&world)[0].id;

        let (result, output) = play(&mut world, "42\n1\nz\n1\nw\n");

        assert!(result.is_ok());
        assert!(output.contains("Back to the menu."));
        assert_eq!(query::position(&world, hero), Some(CellCoord::new(5, 1)));
    }

    #[test]
    fn shopping_at_the_nexus_buys_from_the_catalog() {
        let mut world = world_with_hero_at(CellCoord::new(7, 1));

        let (result, _) = play(&mut world, "7\nb\n1\n");

        assert!(result.is_ok());
        let hero = &query::heroes(&world)[0];
        assert_eq!(hero.gold, 800);
        assert_eq!(hero.inventory[0].name, "Dagger");
    }

    #[test]
    fn quitting_and_closed_input_end_the_session() {
        let mut world = world_with_hero_at(CellCoord::new(6, 1));
        let (quit, _) = play(&mut world, "q\n");
        assert_eq!(
            quit.map_err(|error| error.kind()),
            Err(io::ErrorKind::Interrupted)
        );

        let (closed, _) = play(&mut world, "");
        assert_eq!(
            closed.map_err(|error| error.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }
}
