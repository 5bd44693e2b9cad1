use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tripwire_core::{
    ActionOutcome, CellCount, Coord, Coord2, GameConfig, GameController, GridViewport, InputEvent,
    MouseButtons,
};
use web_time::Instant;

use crate::screen::Screen;
use crate::tileset::Tileset;

const HELP: &str = "\
Commands:
  o ROW COL   open a tile
  f ROW COL   place or remove a flag
  c ROW COL   chord around an opened number
  r           release, hides peeked tiles again
  n [W H M]   new game, optionally W wide, H tall with M mines
  h           this help
  q           quit";

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    Release,
    New(Option<(Coord, Coord, CellCount)>),
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command, type h for help")]
    Empty,
    #[error("Unknown command {0:?}, type h for help")]
    Unknown(String),
    #[error("Expected a row and a column")]
    MissingCoords,
    #[error("Expected a width, a height and a mine count")]
    MissingSize,
    #[error("Not a coordinate: {0:?}")]
    BadCoord(String),
    #[error("Not a number: {0:?}")]
    BadNumber(String),
    #[error("Too many arguments")]
    TrailingInput,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;

        let command = match name {
            "o" | "open" => Self::Open(parse_coords(&mut words)?),
            "f" | "flag" => Self::Flag(parse_coords(&mut words)?),
            "c" | "chord" => Self::Chord(parse_coords(&mut words)?),
            "r" | "release" => Self::Release,
            "n" | "new" => Self::New(parse_size(&mut words)?),
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_owned())),
        };

        if words.next().is_some() {
            return Err(CommandError::TrailingInput);
        }
        Ok(command)
    }
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Coord2, CommandError> {
    let mut coord = || {
        let word = words.next().ok_or(CommandError::MissingCoords)?;
        word.parse::<Coord>()
            .map_err(|_| CommandError::BadCoord(word.to_owned()))
    };
    let row = coord()?;
    let col = coord()?;
    Ok((row, col))
}

/// Either nothing at all or all three of width, height and mines.
fn parse_size<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Option<(Coord, Coord, CellCount)>, CommandError> {
    let Some(width) = words.next() else {
        return Ok(None);
    };
    let height = words.next().ok_or(CommandError::MissingSize)?;
    let mines = words.next().ok_or(CommandError::MissingSize)?;

    let bad = |word: &str| CommandError::BadNumber(word.to_owned());
    Ok(Some((
        width.parse().map_err(|_| bad(width))?,
        height.parse().map_err(|_| bad(height))?,
        mines.parse().map_err(|_| bad(mines))?,
    )))
}

fn viewport_for(config: GameConfig) -> GridViewport {
    // one "pixel" per tile, positions are (col, row)
    GridViewport::new(config.width.into(), config.height.into(), config)
}

/// Line-driven frontend: reads commands, feeds them to the controller and redraws.
pub struct App {
    game: GameController,
    screen: Screen,
    viewport: GridViewport,
    tileset: Tileset,
    pending_release: bool,
}

impl App {
    pub fn new(game: GameController, tileset: Tileset) -> Self {
        let screen = Screen::new(game.symbols());
        let viewport = viewport_for(game.config());
        Self {
            game,
            screen,
            viewport,
            tileset,
            pending_release: false,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        self.draw(out)?;

        for line in input.lines() {
            let line = line?;

            // a chord only peeks while the buttons are held, the next command lets go
            if self.pending_release {
                self.pending_release = false;
                self.dispatch(InputEvent::Release);
            }
            self.restart_when_due(Instant::now(), out)?;

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(out, "{}", err)?;
                    continue;
                }
            };
            log::trace!("Command: {:?}", command);

            let event = match command {
                Command::Quit => break,
                Command::Help => {
                    writeln!(out, "{}", HELP)?;
                    continue;
                }
                Command::New(None) => {
                    self.game.restart();
                    self.reset_screen();
                    self.draw(out)?;
                    continue;
                }
                Command::New(Some((width, height, mines))) => {
                    let config = GameConfig::new_unchecked(width, height, mines);
                    if let Err(err) = self.game.restart_with(config) {
                        writeln!(out, "{}", err)?;
                    } else {
                        self.reset_screen();
                        self.draw(out)?;
                    }
                    continue;
                }
                Command::Release => InputEvent::Release,
                Command::Open(coords) | Command::Flag(coords) | Command::Chord(coords) => {
                    let buttons = match command {
                        Command::Open(_) => MouseButtons::LEFT,
                        Command::Flag(_) => MouseButtons::RIGHT,
                        _ => MouseButtons::LEFT | MouseButtons::RIGHT,
                    };
                    let (row, col) = coords;
                    let Some(index) = self.viewport.index_at(col.into(), row.into()) else {
                        writeln!(
                            out,
                            "({}, {}) is outside the {}x{} board",
                            row, col, self.viewport.cols, self.viewport.rows
                        )?;
                        continue;
                    };
                    let Some(event) = InputEvent::from_press(buttons, index) else {
                        continue;
                    };
                    if matches!(event, InputEvent::BothPressed(_)) {
                        self.pending_release = true;
                    }
                    event
                }
            };

            if self.game.is_finished() && event.index().is_some() {
                writeln!(out, "Game over, type n for a new game.")?;
                continue;
            }

            let outcome = self.dispatch(event);
            if outcome.has_update() {
                self.draw(out)?;
            }
            if matches!(outcome, ActionOutcome::Won | ActionOutcome::Lost) {
                log::info!(
                    "Game {} after {}s",
                    if self.game.is_won() { "won" } else { "lost" },
                    self.game.elapsed_secs()
                );
                if self.game.is_lost() {
                    writeln!(out, "Type n to try again.")?;
                }
            }
        }
        Ok(())
    }

    /// Starts over once a finished game has been on screen long enough.
    fn restart_when_due<W: Write>(&mut self, now: Instant, out: &mut W) -> io::Result<bool> {
        if !self.game.finish_delay_elapsed_at(now) {
            return Ok(false);
        }
        self.game.restart();
        self.reset_screen();
        self.draw(out)?;
        Ok(true)
    }

    fn dispatch(&mut self, event: InputEvent) -> ActionOutcome {
        let outcome = self.game.handle(event);
        let changes = self.game.take_changes();
        self.screen.apply(&changes);
        debug_assert_eq!(self.screen.cells(), &self.game.symbols());
        log::debug!("{:?}: {:?}, {} tiles changed", event, outcome, changes.len());
        outcome
    }

    fn reset_screen(&mut self) {
        self.game.take_changes();
        self.pending_release = false;
        self.screen = Screen::new(self.game.symbols());
        self.viewport = viewport_for(self.game.config());
    }

    fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        self.screen.draw(&self.tileset, &self.game.hud(), out)
    }
}
