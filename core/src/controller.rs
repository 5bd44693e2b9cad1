use alloc::vec::Vec;
use core::time::Duration;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// How long a finished board stays on screen before the frontend moves on.
pub const FINISH_DISPLAY_DELAY: Duration = Duration::from_millis(3500);

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChordOutcome {
    NoChange,
    /// Not enough flags around the tile, hidden neighbors are only highlighted until release.
    Peeking,
    /// Flags were trusted and the remaining neighbors opened.
    Opened,
    /// A flag around the tile was on a safe tile, the game is lost.
    Misflagged,
}

impl ChordOutcome {
    pub const fn has_update(self) -> bool {
        use ChordOutcome::*;
        match self {
            NoChange => false,
            Peeking => true,
            Opened => true,
            Misflagged => true,
        }
    }
}

/// Summary of a handled input event, for frontends that only need to know what to redraw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    NoChange,
    Changed,
    Won,
    Lost,
}

impl ActionOutcome {
    fn from_transition(before: GameState, after: GameState, changed: bool) -> Self {
        match (before, after) {
            (before, GameState::Won) if before != GameState::Won => Self::Won,
            (before, GameState::Lost) if before != GameState::Lost => Self::Lost,
            _ if changed => Self::Changed,
            _ => Self::NoChange,
        }
    }

    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Game-level values shown next to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudStatus {
    pub state: GameState,
    pub mines: CellCount,
    pub flags_placed: CellCount,
    pub flags_remaining: isize,
    pub elapsed_secs: u64,
}

/// Runs one game at a time on top of a [`Board`].
///
/// Every player action is checked against the current state first, actions that are not
/// allowed leave everything untouched.
#[derive(Clone, Debug)]
pub struct GameController {
    board: Board,
    rng: SmallRng,
    state: GameState,
    flags_placed: CellCount,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl GameController {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_board(Board::new_unchecked(config), seed))
    }

    /// Starts from an existing board, mines are only placed on the first reveal if the board has
    /// none yet.
    pub fn with_board(board: Board, seed: u64) -> Self {
        Self {
            board,
            rng: SmallRng::seed_from_u64(seed),
            state: Default::default(),
            flags_placed: 0,
            started_at: None,
            ended_at: None,
        }
    }

    /// Throws the current board away and sets up a fresh game with the same configuration.
    pub fn restart(&mut self) {
        let config = self.board.config();
        self.reset(config);
    }

    pub fn restart_with(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.reset(config);
        Ok(())
    }

    fn reset(&mut self, config: GameConfig) {
        log::debug!(
            "New game: {}x{}, {} mines",
            config.width,
            config.height,
            config.mines
        );
        self.board = Board::new_unchecked(config);
        self.state = GameState::NotStarted;
        self.flags_placed = 0;
        self.started_at = None;
        self.ended_at = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.board.config()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        !self.state.is_initial()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn is_lost(&self) -> bool {
        matches!(self.state, GameState::Lost)
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed
    }

    /// How many mines have not been flagged yet, negative when there are too many flags.
    pub fn flags_remaining(&self) -> isize {
        (self.board.config().mines as isize) - (self.flags_placed as isize)
    }

    /// Time since the first reveal, frozen once the game ends.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self
                .ended_at
                .unwrap_or_else(Instant::now)
                .saturating_duration_since(started_at),
            None => Duration::ZERO,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    pub fn hud(&self) -> HudStatus {
        HudStatus {
            state: self.state,
            mines: self.board.config().mines,
            flags_placed: self.flags_placed,
            flags_remaining: self.flags_remaining(),
            elapsed_secs: self.elapsed_secs(),
        }
    }

    /// Non-blocking check for whether the finished board has been shown long enough.
    pub fn finish_delay_elapsed(&self) -> bool {
        self.finish_delay_elapsed_at(Instant::now())
    }

    pub fn finish_delay_elapsed_at(&self, now: Instant) -> bool {
        self.ended_at
            .is_some_and(|ended_at| now.saturating_duration_since(ended_at) >= FINISH_DISPLAY_DELAY)
    }

    pub fn symbols(&self) -> Array2<Symbol> {
        self.board.symbols()
    }

    pub fn take_changes(&mut self) -> Vec<TileChange> {
        self.board.take_changes()
    }

    pub fn handle(&mut self, event: InputEvent) -> ActionOutcome {
        use InputEvent::*;

        let before = self.state;
        let changed = match event {
            PrimaryPress(index) => self.reveal(index).has_update(),
            SecondaryPress(index) => self.toggle_flag(index).has_update(),
            BothPressed(index) => self.chord(index).has_update(),
            Release => self.release() > 0,
        };
        ActionOutcome::from_transition(before, self.state, changed)
    }

    /// Opens a tile, placing the mines first if this is the opening move.
    pub fn reveal(&mut self, index: TileIndex) -> RevealOutcome {
        if self.board.validate_index(index).is_err() {
            log::debug!("Ignored reveal outside the board: {}", index);
            return RevealOutcome::NoChange;
        }
        if self.state.is_finished() {
            return RevealOutcome::NoChange;
        }

        if self.state.is_initial() {
            if !self.board.is_generated() {
                if let Err(err) = self.board.generate(index, &mut self.rng) {
                    log::warn!("Could not start the game: {}", err);
                    return RevealOutcome::NoChange;
                }
            }
            self.mark_started();
        }

        let tile = self.board[index];
        if !tile.state().is_concealed() {
            log::trace!("Ignored reveal on {:?} tile {}", tile.state(), index);
            return RevealOutcome::NoChange;
        }

        if tile.is_mine() {
            log::debug!("Stepped on a mine at {}", index);
            self.board.set_state(index, TileState::MineTriggered);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        self.board.reveal(index);
        log::debug!("Open tile {}, mine count: {}", index, tile.mine_count());
        if tile.mine_count() == 0 {
            self.board.flood_reveal(index);
        }
        RevealOutcome::Revealed
    }

    /// Places or removes a flag, placing the last available flag settles the game.
    pub fn toggle_flag(&mut self, index: TileIndex) -> FlagOutcome {
        if !self.state.is_in_progress() {
            return FlagOutcome::NoChange;
        }

        let outcome = self.board.toggle_flag(index);
        match outcome {
            FlagOutcome::Placed => {
                self.flags_placed += 1;
                log::debug!("Flag placed on {}, {} left", index, self.flags_remaining());
                if self.flags_placed == self.board.config().mines {
                    let won = self.board.flags_match_mines();
                    self.end_game(won);
                }
            }
            FlagOutcome::Removed => {
                self.flags_placed = self.flags_placed.saturating_sub(1);
                log::debug!("Flag removed from {}, {} left", index, self.flags_remaining());
            }
            FlagOutcome::NoChange => {}
        }
        outcome
    }

    /// Both-buttons action on a revealed tile.
    ///
    /// With fewer flags around than its number the hidden neighbors are only highlighted. With at
    /// least as many flags the flags are trusted: a flag on a safe tile loses the game, otherwise
    /// every other concealed neighbor is opened.
    pub fn chord(&mut self, index: TileIndex) -> ChordOutcome {
        if !self.state.is_in_progress() {
            return ChordOutcome::NoChange;
        }
        let Some(tile) = self.board.tile(index) else {
            return ChordOutcome::NoChange;
        };
        if tile.state() != TileState::Revealed {
            return ChordOutcome::NoChange;
        }

        let flags = self
            .board
            .count_neighbors_in_state(index, TileState::Flagged);
        if flags < tile.mine_count() {
            let peeked = self.board.mark_peeking(index);
            log::trace!("Peeking {} tiles around {}", peeked, index);
            return ChordOutcome::Peeking;
        }

        let misflagged = self.board.neighbors(index).any(|neighbor| {
            let neighbor = self.board[neighbor];
            neighbor.state() == TileState::Flagged && !neighbor.is_mine()
        });
        if misflagged {
            log::debug!("Chord on {} trusted a wrong flag", index);
            self.end_game(false);
            return ChordOutcome::Misflagged;
        }

        let mut opened = false;
        for neighbor in self.board.hidden_neighbors(index) {
            // an earlier flood in this loop may already have opened it
            let neighbor_tile = self.board[neighbor];
            if neighbor_tile.is_mine() || !neighbor_tile.state().is_concealed() {
                continue;
            }

            self.board.reveal(neighbor);
            opened = true;
            if neighbor_tile.mine_count() == 0 {
                self.board.flood_reveal(neighbor);
            }
        }

        if opened {
            log::debug!("Chord opened around {}", index);
            ChordOutcome::Opened
        } else {
            ChordOutcome::NoChange
        }
    }

    /// Ends a peek, every highlighted tile goes back to hidden. Returns how many tiles changed.
    pub fn release(&mut self) -> CellCount {
        self.board.clear_peeking()
    }

    fn mark_started(&mut self) {
        if self.state.is_initial() {
            log::debug!("Game started");
            self.started_at = Some(Instant::now());
            self.state = GameState::InProgress;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        self.ended_at = Some(Instant::now());
        let shown = self.board.reveal_mines();
        log::debug!(
            "Game {} after {:?}, {} mines shown",
            if won { "won" } else { "lost" },
            self.elapsed(),
            shown
        );
    }
}
