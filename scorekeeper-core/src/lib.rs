mod error;
mod game;
mod models;
mod phase;
mod registry;

pub use error::{GameError, Result};
pub use game::{FrontChange, Game};
pub use models::{Buzz, ChannelId, PlayerId, PlayerScore};
pub use phase::Phase;
pub use registry::GameRegistry;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_leaderboard_serializes_as_rows() {
    let game = Game::new();
    game.add_player(42);
    game.score_player(15);

    let json = serde_json::to_value(&*game.scores()).unwrap();
    assert_eq!(json, serde_json::json!([{ "player": 42, "score": 15 }]));
  }
}
