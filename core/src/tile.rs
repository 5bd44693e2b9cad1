use serde::{Deserialize, Serialize};

/// Interaction state of a single tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    /// Transient highlight while a chord is held down, otherwise behaves as `Hidden`.
    Peeking,
    /// The mine the player stepped on.
    MineTriggered,
}

impl TileState {
    /// Whether a reveal or flood-reveal may still open this tile.
    pub const fn is_concealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Peeking)
    }
}

/// One cell of the board.
///
/// `is_mine` and `mine_count` are fixed when mines are placed, only `state` changes afterwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub(crate) mine_count: u8,
    pub(crate) is_mine: bool,
    pub(crate) state: TileState,
}

impl Tile {
    /// Number of mined neighbors, meaningless on a mine.
    pub const fn mine_count(self) -> u8 {
        self.mine_count
    }

    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    pub const fn state(self) -> TileState {
        self.state
    }

    /// How this tile should be drawn.
    pub const fn symbol(self) -> Symbol {
        use TileState::*;

        match self.state {
            Hidden => Symbol::Hidden,
            Flagged => Symbol::Flag,
            Peeking => Symbol::Empty,
            MineTriggered if self.is_mine => Symbol::MineTriggered,
            _ if self.is_mine => Symbol::Mine,
            _ => Symbol::from_count(self.mine_count),
        }
    }
}

/// Render-facing appearance of a tile.
///
/// The discriminants are the tile indices in the atlas, in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    Empty = 0,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Hidden,
    Flag,
    Mine,
    MineTriggered,
}

impl Symbol {
    pub const COUNT: usize = 13;

    pub const ALL: [Symbol; Self::COUNT] = [
        Symbol::Empty,
        Symbol::One,
        Symbol::Two,
        Symbol::Three,
        Symbol::Four,
        Symbol::Five,
        Symbol::Six,
        Symbol::Seven,
        Symbol::Eight,
        Symbol::Hidden,
        Symbol::Flag,
        Symbol::Mine,
        Symbol::MineTriggered,
    ];

    /// Numeric symbol for a revealed safe tile, saturating at `Eight`.
    pub const fn from_count(count: u8) -> Self {
        use Symbol::*;

        match count {
            0 => Empty,
            1 => One,
            2 => Two,
            3 => Three,
            4 => Four,
            5 => Five,
            6 => Six,
            7 => Seven,
            _ => Eight,
        }
    }

    pub const fn atlas_index(self) -> u8 {
        self as u8
    }

    pub const fn from_atlas_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }
}
