use serde::Serialize;

/// Opaque player identity (a Discord user id in deployment).
pub type PlayerId = u64;

/// Opaque channel identity; one game runs per channel.
pub type ChannelId = u64;

/// A pending attempt to answer the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buzz {
  /// Who buzzed
  pub player: PlayerId,
  /// Monotonic arrival number assigned by the owning game.
  /// Only compared for ordering, never shown to anyone.
  pub arrival: u64,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerScore {
  pub player: PlayerId,
  /// Sum of every delta the player received across all phases. Wider than
  /// a single delta so the sum can't overflow.
  pub score: i64,
}
