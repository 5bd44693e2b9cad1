use ndarray::Array2;
use std::io::{self, Write};
use tripwire_core::{Coord, GameState, HudStatus, Symbol, TileChange, index_to_coords};

use crate::tileset::Tileset;

/// Last drawn symbol of every tile, kept in sync from the board's change list.
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    cells: Array2<Symbol>,
}

impl Screen {
    pub fn new(cells: Array2<Symbol>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &Array2<Symbol> {
        &self.cells
    }

    /// Applies changes in order, the last one for a tile wins.
    pub fn apply(&mut self, changes: &[TileChange]) {
        let width = self.cells.ncols() as Coord;
        for change in changes {
            let (row, col) = index_to_coords(change.index, width);
            match self.cells.get_mut([row.into(), col.into()]) {
                Some(cell) => *cell = change.symbol,
                None => log::warn!("Change for tile {} is off the screen", change.index),
            }
        }
    }

    pub fn draw<W: Write>(&self, tileset: &Tileset, hud: &HudStatus, out: &mut W) -> io::Result<()> {
        let (rows, cols) = self.cells.dim();
        let label_width = digits(rows.saturating_sub(1));
        let cell_width = tileset.width().max(digits(cols.saturating_sub(1)));

        writeln!(
            out,
            "Mines: {:<4} Flags: {:<4} Time: {}s",
            hud.flags_remaining, hud.flags_placed, hud.elapsed_secs
        )?;
        match hud.state {
            GameState::NotStarted => writeln!(out, "Open a tile to start.")?,
            GameState::InProgress => {}
            GameState::Won => writeln!(out, "All mines found, you win!")?,
            GameState::Lost => writeln!(out, "Boom! You lose.")?,
        }

        write!(out, "{:label_width$}", "")?;
        for col in 0..cols {
            write!(out, " {col:>cell_width$}")?;
        }
        writeln!(out)?;

        for (row, line) in self.cells.outer_iter().enumerate() {
            write!(out, "{row:>label_width$}")?;
            for &symbol in line.iter() {
                write!(out, " {:>cell_width$}", tileset.glyph(symbol))?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
