use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
  #[error("a game is already running in this channel")]
  AlreadyRunning,

  #[error("no game is running in this channel")]
  NotFound,
}

pub type Result<T> = std::result::Result<T, GameError>;
