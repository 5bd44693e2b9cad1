use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Neighbor list of a single tile, never longer than 8.
pub type Neighbors = SmallVec<[TileIndex; 8]>;

/// Emitted whenever a tile changes appearance, so a renderer can redraw incrementally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub index: TileIndex,
    pub symbol: Symbol,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Placed => true,
            Self::Removed => true,
        }
    }
}

/// Grid of tiles plus the algorithms that operate on it.
///
/// Mutators are meant to be driven by [`GameController`], which checks the game rules first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    tiles: Array2<Tile>,
    generated: bool,
    #[serde(skip)]
    changes: Vec<TileChange>,
}

impl Board {
    /// Blank board, mines are placed later by [`Board::generate`].
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate_size()?;
        Ok(Self::new_unchecked(config))
    }

    pub(crate) fn new_unchecked(config: GameConfig) -> Self {
        Self {
            config,
            tiles: Array2::default(config.shape()),
            generated: false,
            changes: Vec::new(),
        }
    }

    /// Board with a known mine layout, the mine count is taken from the distinct indices given.
    pub fn with_mines(width: Coord, height: Coord, mines: &[TileIndex]) -> Result<Self> {
        let mut board = Self::new(GameConfig::new_unchecked(width, height, 0))?;

        for &index in mines {
            let index = board.validate_index(index)?;
            if !board[index].is_mine {
                board.place_mine(index);
                board.config.mines += 1;
            }
        }

        board.config.validate()?;
        board.generated = true;
        Ok(board)
    }

    /// Places the configured number of mines uniformly at random, never on `exclude`.
    ///
    /// Uses rejection sampling: candidates already holding a mine, or equal to `exclude`, are
    /// drawn again.
    pub fn generate<R: Rng + ?Sized>(&mut self, exclude: TileIndex, rng: &mut R) -> Result<()> {
        if self.generated {
            return Err(GameError::AlreadyGenerated);
        }
        let exclude = self.validate_index(exclude)?;

        let total_tiles = self.len();
        if self.config.mines >= total_tiles {
            log::warn!(
                "Cannot keep a safe start tile, requested {} mines but only {} tiles",
                self.config.mines,
                total_tiles
            );
            return Err(GameError::TooManyMines);
        }

        for _ in 0..self.config.mines {
            let index = loop {
                let candidate: TileIndex = rng.random_range(0..total_tiles);
                if candidate != exclude && !self[candidate].is_mine {
                    break candidate;
                }
            };
            self.place_mine(index);
        }

        self.generated = true;
        log::debug!(
            "Placed {} mines on a {}x{} board, start tile {}",
            self.config.mines,
            self.config.width,
            self.config.height,
            exclude
        );
        Ok(())
    }

    fn place_mine(&mut self, index: TileIndex) {
        self.tile_mut(index).is_mine = true;
        for neighbor in self.neighbors(index) {
            self.tile_mut(neighbor).mine_count += 1;
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// `(width, height)` in tiles.
    pub fn size(&self) -> (Coord, Coord) {
        (self.config.width, self.config.height)
    }

    pub fn len(&self) -> CellCount {
        self.config.total_tiles()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn validate_index(&self, index: TileIndex) -> Result<TileIndex> {
        if index < self.len() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    pub fn coords_of(&self, index: TileIndex) -> Coord2 {
        index_to_coords(index, self.config.width)
    }

    pub fn index_of(&self, coords: Coord2) -> Option<TileIndex> {
        let (row, col) = coords;
        if row < self.config.height && col < self.config.width {
            Some(coords_to_index(coords, self.config.width))
        } else {
            None
        }
    }

    pub fn tile(&self, index: TileIndex) -> Option<Tile> {
        self.validate_index(index).ok().map(|index| self[index])
    }

    /// All tiles with their index, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileIndex, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, &tile)| (i as TileIndex, tile))
    }

    pub fn mine_indices(&self) -> Vec<TileIndex> {
        self.tiles()
            .filter(|(_, tile)| tile.is_mine)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn symbol_at(&self, index: TileIndex) -> Option<Symbol> {
        self.tile(index).map(Tile::symbol)
    }

    /// Full snapshot of what every tile looks like, indexed by `[row, col]`.
    pub fn symbols(&self) -> Array2<Symbol> {
        self.tiles.map(|tile| tile.symbol())
    }

    /// Up to 8 adjacent tiles in the order down, down-right, down-left, up, up-left, up-right,
    /// right, left.
    pub fn neighbors(&self, index: TileIndex) -> NeighborIter {
        NeighborIter::new(index, self.config.width, self.config.height)
    }

    /// Neighbors that can still be opened, i.e. `Hidden` or `Peeking`.
    pub fn hidden_neighbors(&self, index: TileIndex) -> Neighbors {
        self.neighbors(index)
            .filter(|&neighbor| self[neighbor].state.is_concealed())
            .collect()
    }

    pub fn count_neighbors_in_state(&self, index: TileIndex, state: TileState) -> u8 {
        self.neighbors(index)
            .filter(|&neighbor| self[neighbor].state == state)
            .count() as u8
    }

    /// Opens a tile whether or not it holds a mine.
    ///
    /// Callers must not pass a tile that is already revealed.
    pub fn reveal(&mut self, index: TileIndex) {
        if self.validate_index(index).is_err() {
            return;
        }
        debug_assert_ne!(self[index].state, TileState::Revealed);
        self.set_state(index, TileState::Revealed);
    }

    /// Opens the safe concealed neighbors of `index`, continuing through every newly opened
    /// tile with a zero count. Returns how many tiles were opened.
    ///
    /// A tile is revealed before it is queued and only concealed tiles are picked up, so every
    /// tile is opened at most once and the walk ends. Mines and flags are never opened.
    pub fn flood_reveal(&mut self, index: TileIndex) -> CellCount {
        if self.validate_index(index).is_err() {
            return 0;
        }

        let mut revealed = 0;
        let mut to_visit = VecDeque::from([index]);

        while let Some(visit_index) = to_visit.pop_front() {
            for neighbor in self.hidden_neighbors(visit_index) {
                let tile = self[neighbor];
                if tile.is_mine {
                    continue;
                }

                self.set_state(neighbor, TileState::Revealed);
                revealed += 1;
                log::trace!(
                    "Flood opened tile {}, mine count: {}",
                    neighbor,
                    tile.mine_count
                );

                if tile.mine_count == 0 {
                    to_visit.push_back(neighbor);
                }
            }
        }

        revealed
    }

    pub fn toggle_flag(&mut self, index: TileIndex) -> FlagOutcome {
        use TileState::*;

        match self.tile(index).map(Tile::state) {
            Some(Hidden) => {
                self.set_state(index, Flagged);
                FlagOutcome::Placed
            }
            Some(Flagged) => {
                self.set_state(index, Hidden);
                FlagOutcome::Removed
            }
            _ => FlagOutcome::NoChange,
        }
    }

    pub(crate) fn set_state(&mut self, index: TileIndex, state: TileState) {
        let tile = self.tile_mut(index);
        tile.state = state;
        let symbol = tile.symbol();
        self.changes.push(TileChange { index, symbol });
    }

    /// Marks the hidden neighbors of `index` as peeking, returns how many changed.
    pub(crate) fn mark_peeking(&mut self, index: TileIndex) -> CellCount {
        let mut marked = 0;
        for neighbor in self.neighbors(index) {
            if self[neighbor].state == TileState::Hidden {
                self.set_state(neighbor, TileState::Peeking);
                marked += 1;
            }
        }
        marked
    }

    /// Turns every peeking tile back into a hidden one, returns how many changed.
    pub(crate) fn clear_peeking(&mut self) -> CellCount {
        let peeking: Vec<_> = self
            .tiles()
            .filter(|(_, tile)| tile.state == TileState::Peeking)
            .map(|(index, _)| index)
            .collect();

        for &index in &peeking {
            self.set_state(index, TileState::Hidden);
        }
        peeking.len() as CellCount
    }

    /// Shows every mine except the one that was stepped on, returns how many changed.
    pub(crate) fn reveal_mines(&mut self) -> CellCount {
        let hidden_mines: Vec<_> = self
            .tiles()
            .filter(|(_, tile)| {
                tile.is_mine
                    && !matches!(tile.state, TileState::MineTriggered | TileState::Revealed)
            })
            .map(|(index, _)| index)
            .collect();

        for &index in &hidden_mines {
            self.set_state(index, TileState::Revealed);
        }
        hidden_mines.len() as CellCount
    }

    /// Whether the flagged set is exactly the mine set.
    pub fn flags_match_mines(&self) -> bool {
        self.tiles
            .iter()
            .all(|tile| tile.is_mine == (tile.state == TileState::Flagged))
    }

    /// Drains the pending change notifications, oldest first.
    pub fn take_changes(&mut self) -> Vec<TileChange> {
        core::mem::take(&mut self.changes)
    }

    fn tile_mut(&mut self, index: TileIndex) -> &mut Tile {
        let coords = self.coords_of(index);
        &mut self.tiles[coords.to_nd_index()]
    }
}

impl Index<TileIndex> for Board {
    type Output = Tile;

    fn index(&self, index: TileIndex) -> &Self::Output {
        &self.tiles[self.coords_of(index).to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn states(board: &Board) -> Vec<TileState> {
        board.tiles().map(|(_, tile)| tile.state).collect()
    }

    #[test]
    fn new_board_is_blank() {
        let board = Board::new(GameConfig::default()).unwrap();

        assert_eq!(board.len(), 81);
        assert!(!board.is_generated());
        assert!(board.tiles().all(|(_, tile)| tile == Tile::default()));
    }

    #[test]
    fn generate_places_exact_mines_with_consistent_counts() {
        for seed in 0..200 {
            let config = GameConfig::new(9, 9, 10).unwrap();
            let mut board = Board::new(config).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let exclude = (seed % 81) as TileIndex;

            board.generate(exclude, &mut rng).unwrap();

            assert_eq!(board.mine_indices().len(), 10);
            assert!(!board[exclude].is_mine());

            // brute-force neighbor scan on coordinates
            for (index, tile) in board.tiles() {
                let (row, col) = board.coords_of(index);
                let mut expected = 0;
                for r in row.saturating_sub(1)..=(row + 1).min(8) {
                    for c in col.saturating_sub(1)..=(col + 1).min(8) {
                        if (r, c) != (row, col) && board[coords_to_index((r, c), 9)].is_mine() {
                            expected += 1;
                        }
                    }
                }
                assert_eq!(tile.mine_count(), expected, "seed {} tile {}", seed, index);
            }
        }
    }

    #[test]
    fn generate_is_deterministic_for_a_seed() {
        let config = GameConfig::new(16, 16, 40).unwrap();
        let mut a = Board::new(config).unwrap();
        let mut b = Board::new(config).unwrap();

        a.generate(100, &mut SmallRng::seed_from_u64(7)).unwrap();
        b.generate(100, &mut SmallRng::seed_from_u64(7)).unwrap();

        assert_eq!(a.mine_indices(), b.mine_indices());
    }

    #[test]
    fn generate_fills_every_tile_but_the_start() {
        let config = GameConfig::new(3, 3, 8).unwrap();
        let mut board = Board::new(config).unwrap();

        board.generate(4, &mut SmallRng::seed_from_u64(1)).unwrap();

        assert_eq!(board.mine_indices(), [0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(board[4].mine_count(), 8);
    }

    #[test]
    fn generate_rejects_full_boards() {
        let config = GameConfig::new_unchecked(3, 3, 9);
        let mut board = Board::new(config).unwrap();

        let result = board.generate(0, &mut SmallRng::seed_from_u64(1));

        assert_eq!(result, Err(GameError::TooManyMines));
        assert!(!board.is_generated());
        assert!(board.mine_indices().is_empty());
    }

    #[test]
    fn generate_runs_once() {
        let mut board = Board::new(GameConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        board.generate(0, &mut rng).unwrap();

        assert_eq!(board.generate(0, &mut rng), Err(GameError::AlreadyGenerated));
        assert_eq!(board.mine_indices().len(), 10);
    }

    #[test]
    fn generate_rejects_out_of_range_start() {
        let mut board = Board::new(GameConfig::default()).unwrap();

        let result = board.generate(81, &mut SmallRng::seed_from_u64(3));

        assert_eq!(result, Err(GameError::InvalidIndex));
    }

    #[test]
    fn generation_does_not_emit_changes() {
        let mut board = Board::new(GameConfig::default()).unwrap();

        board.generate(40, &mut SmallRng::seed_from_u64(5)).unwrap();

        assert!(board.take_changes().is_empty());
    }

    #[test]
    fn with_mines_counts_distinct_mines() {
        let board = Board::with_mines(3, 3, &[0, 0, 8]).unwrap();

        assert_eq!(board.config().mines, 2);
        assert!(board.is_generated());
        assert_eq!(board[4].mine_count(), 2);
        assert_eq!(board[1].mine_count(), 1);
        assert_eq!(board[2].mine_count(), 0);
    }

    #[test]
    fn with_mines_rejects_bad_layouts() {
        assert_eq!(
            Board::with_mines(2, 1, &[0, 1]),
            Err(GameError::TooManyMines)
        );
        assert_eq!(Board::with_mines(2, 2, &[4]), Err(GameError::InvalidIndex));
        assert_eq!(Board::with_mines(2, 2, &[]), Err(GameError::NoMines));
    }

    #[test]
    fn hidden_neighbors_include_peeking_only() {
        let mut board = Board::with_mines(3, 3, &[8]).unwrap();
        board.set_state(1, TileState::Revealed);
        board.set_state(3, TileState::Flagged);
        board.set_state(5, TileState::Peeking);

        assert_eq!(board.hidden_neighbors(4).as_slice(), [7, 8, 6, 0, 2, 5]);
        assert_eq!(board.count_neighbors_in_state(4, TileState::Flagged), 1);
    }

    #[test]
    fn flood_reveal_opens_every_safe_tile_once() {
        // 9x9 with a single mine in the corner, everything else is connected
        let mut board = Board::with_mines(9, 9, &[0]).unwrap();

        board.reveal(80);
        let opened = board.flood_reveal(80);

        assert_eq!(opened, 79);
        let changes = board.take_changes();
        let indices: BTreeSet<_> = changes.iter().map(|change| change.index).collect();
        assert_eq!(changes.len(), 80);
        assert_eq!(indices.len(), 80);
        assert!(!indices.contains(&0));
        assert_eq!(board[0].state(), TileState::Hidden);
        assert!(
            board
                .tiles()
                .filter(|(index, _)| *index != 0)
                .all(|(_, tile)| tile.state() == TileState::Revealed)
        );
    }

    #[test]
    fn flood_reveal_matches_known_region() {
        // 5x5, a wall of mines down column 2 splits the board
        //
        //   0 1 2 3 4
        // 0 . 2 * 2 .
        // 1 . 3 * 3 .
        // 2 . 3 * 3 .
        // 3 . 3 * 3 .
        // 4 . 2 * 2 .
        let mines = [2, 7, 12, 17, 22];
        let mut board = Board::with_mines(5, 5, &mines).unwrap();

        board.reveal(0);
        board.flood_reveal(0);

        let expected: BTreeSet<TileIndex> = [0, 1, 5, 6, 10, 11, 15, 16, 20, 21].into();
        for (index, tile) in board.tiles() {
            let open = tile.state() == TileState::Revealed;
            assert_eq!(open, expected.contains(&index), "tile {}", index);
        }
        assert_eq!(board[6].mine_count(), 3);
    }

    #[test]
    fn flood_reveal_stops_at_numbers_and_skips_flags() {
        //   0 1 2 3
        // 0 . . 1 *
        // 1 . . 1 1
        // 2 . . . .
        let mut board = Board::with_mines(4, 3, &[3]).unwrap();
        board.toggle_flag(8);
        board.take_changes();

        board.reveal(0);
        board.flood_reveal(0);

        assert_eq!(board[8].state(), TileState::Flagged);
        assert_eq!(board[3].state(), TileState::Hidden);
        assert_eq!(board[2].state(), TileState::Revealed);
        assert_eq!(board[7].state(), TileState::Revealed);
        assert_eq!(board[11].state(), TileState::Revealed);
    }

    #[test]
    fn flood_reveal_from_number_opens_only_safe_neighbors() {
        let mut board = Board::with_mines(3, 1, &[0]).unwrap();

        board.reveal(1);
        board.flood_reveal(1);

        assert_eq!(
            states(&board),
            [TileState::Hidden, TileState::Revealed, TileState::Revealed]
        );
    }

    #[test]
    fn toggle_flag_twice_restores_hidden() {
        let mut board = Board::with_mines(3, 3, &[0]).unwrap();

        assert_eq!(board.toggle_flag(4), FlagOutcome::Placed);
        assert_eq!(board[4].state(), TileState::Flagged);
        assert_eq!(board.toggle_flag(4), FlagOutcome::Removed);
        assert_eq!(board[4].state(), TileState::Hidden);
    }

    #[test]
    fn toggle_flag_rejects_other_states() {
        let mut board = Board::with_mines(3, 3, &[0]).unwrap();
        board.reveal(4);
        board.set_state(5, TileState::Peeking);

        assert_eq!(board.toggle_flag(4), FlagOutcome::NoChange);
        assert_eq!(board.toggle_flag(5), FlagOutcome::NoChange);
        assert_eq!(board.toggle_flag(9), FlagOutcome::NoChange);
        assert_eq!(board[4].state(), TileState::Revealed);
    }

    #[test]
    fn changes_carry_new_symbols() {
        let mut board = Board::with_mines(2, 2, &[0]).unwrap();

        board.toggle_flag(0);
        board.reveal(3);

        assert_eq!(
            board.take_changes(),
            vec![
                TileChange {
                    index: 0,
                    symbol: Symbol::Flag
                },
                TileChange {
                    index: 3,
                    symbol: Symbol::One
                },
            ]
        );
        assert!(board.take_changes().is_empty());
    }

    #[test]
    fn peeking_marks_and_clears_hidden_neighbors() {
        let mut board = Board::with_mines(3, 3, &[0]).unwrap();
        board.reveal(4);
        board.toggle_flag(0);

        assert_eq!(board.mark_peeking(4), 7);
        assert_eq!(board[0].state(), TileState::Flagged);
        assert_eq!(board.symbol_at(1), Some(Symbol::Empty));

        assert_eq!(board.clear_peeking(), 7);
        assert_eq!(board[1].state(), TileState::Hidden);
        assert_eq!(board.clear_peeking(), 0);
    }

    #[test]
    fn reveal_mines_keeps_triggered_mine() {
        let mut board = Board::with_mines(3, 1, &[0, 2]).unwrap();
        board.set_state(0, TileState::MineTriggered);

        assert_eq!(board.reveal_mines(), 1);
        assert_eq!(board.symbol_at(0), Some(Symbol::MineTriggered));
        assert_eq!(board.symbol_at(2), Some(Symbol::Mine));
        assert_eq!(board.symbol_at(1), Some(Symbol::Hidden));
    }

    #[test]
    fn flags_must_match_mines_exactly() {
        let mut board = Board::with_mines(3, 1, &[0]).unwrap();
        assert!(!board.flags_match_mines());

        board.toggle_flag(0);
        assert!(board.flags_match_mines());

        board.toggle_flag(1);
        assert!(!board.flags_match_mines());
    }

    #[test]
    fn symbols_snapshot_is_row_major() {
        let mut board = Board::with_mines(3, 2, &[5]).unwrap();
        board.reveal(0);
        board.flood_reveal(0);

        let symbols = board.symbols();

        assert_eq!(symbols.dim(), (2, 3));
        assert_eq!(symbols[[0, 0]], Symbol::Empty);
        assert_eq!(symbols[[0, 1]], Symbol::One);
        assert_eq!(symbols[[1, 2]], Symbol::Hidden);
    }

    #[test]
    fn index_and_coords_agree() {
        let board = Board::new(GameConfig::new(4, 3, 1).unwrap()).unwrap();

        assert_eq!(board.coords_of(7), (1, 3));
        assert_eq!(board.index_of((1, 3)), Some(7));
        assert_eq!(board.index_of((3, 0)), None);
        assert_eq!(board.index_of((0, 4)), None);
        assert_eq!(board.tile(12), None);
    }
}
