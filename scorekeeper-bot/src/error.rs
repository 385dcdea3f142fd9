use scorekeeper_core::{GameError, PlayerId};
use thiserror::Error;

use crate::parse::ScoreError;

/// Reasons a command is refused. The `Display` text is shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BotError {
    #[error("No game is running in this channel. Start one with `read`.")]
    NoGame,

    #[error("Only the reader can do that.")]
    NotReader,

    #[error("<@{0}> is already reading in this channel.")]
    ReaderAlreadySet(PlayerId),

    #[error("The reader can't buzz in.")]
    ReaderCannotBuzz,

    #[error(transparent)]
    InvalidScore(#[from] ScoreError),

    #[error("{0}")]
    Game(#[from] GameError),
}
