//! JSON-lines record of every event a session produced.

use std::io::{self, Write};

use serde::Serialize;
use valor_core::Event;

#[derive(Serialize)]
struct Entry<'a> {
    round: u32,
    event: &'a Event,
}

/// Appends one JSON object per event, tagged with the round it happened in.
#[derive(Debug)]
pub(crate) struct Transcript<W: Write> {
    out: W,
    round: u32,
}

impl<W: Write> Transcript<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, round: 1 }
    }

    pub(crate) fn record(&mut self, event: &Event) -> io::Result<()> {
        serde_json::to_writer(
            &mut self.out,
            &Entry {
                round: self.round,
                event,
            },
        )?;
        self.out.write_all(b"\n")?;
        if let Event::RoundAdvanced { round } = event {
            self.round = round.saturating_add(1);
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
