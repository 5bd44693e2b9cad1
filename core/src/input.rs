use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Mouse buttons held down, laid out like the DOM `MouseEvent.buttons` mask.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
    }
}

/// Player actions, already mapped to a tile on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Open a tile.
    PrimaryPress(TileIndex),
    /// Place or remove a flag.
    SecondaryPress(TileIndex),
    /// Chord around a revealed tile.
    BothPressed(TileIndex),
    /// Buttons let go, ends a peek.
    Release,
}

impl InputEvent {
    /// Picks the action for the buttons held down right after a press on `index`.
    ///
    /// Left and right together, or the middle button alone, chord.
    pub fn from_press(buttons: MouseButtons, index: TileIndex) -> Option<Self> {
        if buttons.contains(MouseButtons::LEFT | MouseButtons::RIGHT)
            || buttons.contains(MouseButtons::MIDDLE)
        {
            Some(Self::BothPressed(index))
        } else if buttons.contains(MouseButtons::LEFT) {
            Some(Self::PrimaryPress(index))
        } else if buttons.contains(MouseButtons::RIGHT) {
            Some(Self::SecondaryPress(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> Option<TileIndex> {
        match self {
            Self::PrimaryPress(index) | Self::SecondaryPress(index) | Self::BothPressed(index) => {
                Some(index)
            }
            Self::Release => None,
        }
    }
}

/// Screen area a board is drawn into, tiles are stretched to fill it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridViewport {
    pub width_px: u32,
    pub height_px: u32,
    pub cols: Coord,
    pub rows: Coord,
}

impl GridViewport {
    pub fn new(width_px: u32, height_px: u32, config: GameConfig) -> Self {
        Self {
            width_px,
            height_px,
            cols: config.width,
            rows: config.height,
        }
    }

    /// Tile under the screen position `(x, y)`, `None` anywhere outside the grid.
    pub fn index_at(&self, x: i32, y: i32) -> Option<TileIndex> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width_px || y >= self.height_px {
            return None;
        }

        let tile_width = self.width_px.checked_div(self.cols.into())?;
        let tile_height = self.height_px.checked_div(self.rows.into())?;
        let col = Coord::try_from(x.checked_div(tile_width)?).ok()?;
        let row = Coord::try_from(y.checked_div(tile_height)?).ok()?;

        // leftover pixels past the last whole tile
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(coords_to_index((row, col), self.cols))
    }
}
