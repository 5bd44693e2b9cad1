#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use controller::*;
pub use error::*;
pub use input::*;
pub use tile::*;
pub use types::*;

mod board;
mod controller;
mod error;
mod input;
mod tile;
mod types;

/// Board dimensions and mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(width, height, mines);
        config.validate()?;
        Ok(config)
    }

    /// Checks the board has at least one tile, at least one mine, and at least one tile free of
    /// mines.
    pub fn validate(&self) -> Result<()> {
        self.validate_size()?;
        // the game only ends by flagging every mine
        if self.mines == 0 {
            log::warn!("Rejected configuration without mines");
            return Err(GameError::NoMines);
        }
        if self.mines >= self.total_tiles() {
            log::warn!(
                "Rejected configuration, requested {} mines but only {} tiles",
                self.mines,
                self.total_tiles()
            );
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub(crate) fn validate_size(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            Err(GameError::InvalidSize)
        } else {
            Ok(())
        }
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.width, self.height)
    }

    /// `(rows, cols)` shape for grids of this board.
    pub const fn shape(&self) -> [usize; 2] {
        [self.height as usize, self.width as usize]
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(9, 9, 10)
    }
}
