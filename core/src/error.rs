use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board must be at least one tile wide and one tile tall")]
    InvalidSize,
    #[error("Tile index out of range")]
    InvalidIndex,
    #[error("A board needs at least one mine")]
    NoMines,
    #[error("Too many mines, at least one tile must stay safe")]
    TooManyMines,
    #[error("Mines were already placed on this board")]
    AlreadyGenerated,
}

pub type Result<T> = core::result::Result<T, GameError>;
