//! Games indexed by channel.
//!
//! One process can host any number of sessions at once. The map itself is
//! lock-free; each game serializes its own operations.

use std::sync::Arc;

use tracing::info;

use crate::error::{GameError, Result};
use crate::game::Game;
use crate::models::{ChannelId, PlayerId};

/// Thread-safe map of running games, one per channel.
/// Uses scc::HashMap so lookups never block each other.
pub struct GameRegistry {
  games: scc::HashMap<ChannelId, Arc<Game>>,
}

impl GameRegistry {
  pub fn new() -> Self {
    Self {
      games: scc::HashMap::new(),
    }
  }

  /// Start a game in `channel` moderated by `reader`.
  /// Fails if the channel already has one.
  pub async fn start(&self, channel: ChannelId, reader: PlayerId) -> Result<Arc<Game>> {
    let game = Arc::new(Game::with_reader(reader));
    self
      .games
      .insert_async(channel, Arc::clone(&game))
      .await
      .map_err(|_| GameError::AlreadyRunning)?;

    info!(channel, reader, "game started");
    Ok(game)
  }

  /// The game running in `channel`, if any.
  pub async fn get(&self, channel: ChannelId) -> Option<Arc<Game>> {
    self
      .games
      .read_async(&channel, |_, game| Arc::clone(game))
      .await
  }

  /// The game running in `channel`, starting one moderated by `reader` if
  /// there is none. The flag is true when this call created the game.
  pub async fn get_or_start(&self, channel: ChannelId, reader: PlayerId) -> (Arc<Game>, bool) {
    loop {
      if let Some(game) = self.get(channel).await {
        return (game, false);
      }
      // Another task may win the insert; go around and pick up its game.
      if let Ok(game) = self.start(channel, reader).await {
        return (game, true);
      }
    }
  }

  /// Stop the game in `channel` and hand it back for a final look.
  pub async fn end(&self, channel: ChannelId) -> Result<Arc<Game>> {
    let (_, game) = self
      .games
      .remove_async(&channel)
      .await
      .ok_or(GameError::NotFound)?;

    info!(channel, "game ended");
    Ok(game)
  }

  /// Number of running games.
  pub fn len(&self) -> usize {
    self.games.len()
  }

  pub fn is_empty(&self) -> bool {
    self.games.is_empty()
  }
}

impl Default for GameRegistry {
  fn default() -> Self {
    Self::new()
  }
}
