//! A whole quiz session: every question asked so far, the reader, and the
//! leaderboard derived from them.
//!
//! Phase state and the reader sit behind separate locks. Everything that
//! touches phases (including the leaderboard cache) happens inside one
//! critical section, so a reader of the leaderboard never sees it paired
//! with newer phase state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::models::{PlayerId, PlayerScore};
use crate::phase::Phase;

/// Cached leaderboard. `Fresh` may hold an empty list; that is distinct
/// from not knowing.
#[derive(Debug, Clone)]
enum Leaderboard {
  Stale,
  Fresh(Arc<[PlayerScore]>),
}

/// One transition of the undo walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UndoStep {
  /// An action in the current phase was reversed.
  Undone(PlayerId),
  /// The current phase had no history and was dropped; the previous phase
  /// is current again.
  DroppedPhase,
  /// Only the first phase is left and it has nothing to undo.
  Exhausted,
}

#[derive(Debug)]
struct Rounds {
  /// Oldest first, never empty.
  phases: Vec<Phase>,
  leaderboard: Leaderboard,
  next_arrival: u64,
}

impl Rounds {
  fn new() -> Self {
    Self {
      phases: vec![Phase::new()],
      leaderboard: Leaderboard::Stale,
      next_arrival: 0,
    }
  }

  fn current(&self) -> &Phase {
    self
      .phases
      .last()
      .expect("a game always has at least one phase")
  }

  fn current_mut(&mut self) -> &mut Phase {
    self
      .phases
      .last_mut()
      .expect("a game always has at least one phase")
  }

  fn invalidate(&mut self) {
    self.leaderboard = Leaderboard::Stale;
  }

  fn undo_step(&mut self) -> UndoStep {
    if let Some(player) = self.current_mut().undo() {
      return UndoStep::Undone(player);
    }
    if self.phases.len() > 1 {
      self.phases.pop();
      return UndoStep::DroppedPhase;
    }
    UndoStep::Exhausted
  }

  /// Sum every phase's deltas per player, highest total first.
  /// Equal totals keep the order players were first scored in.
  fn tally(&self) -> Vec<PlayerScore> {
    let mut totals: Vec<PlayerScore> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();

    for phase in &self.phases {
      for &(player, delta) in phase.scores() {
        match index.entry(player) {
          Entry::Occupied(entry) => totals[*entry.get()].score += i64::from(delta),
          Entry::Vacant(entry) => {
            entry.insert(totals.len());
            totals.push(PlayerScore {
              player,
              score: i64::from(delta),
            });
          }
        }
      }
    }

    // sort_by is stable, which is what keeps the tie-break deterministic
    totals.sort_by(|a, b| b.score.cmp(&a.score));
    totals
  }
}

/// Who was up before and after a queue change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontChange {
  pub before: Option<PlayerId>,
  pub after: Option<PlayerId>,
}

/// Scoring state for one session.
#[derive(Debug)]
pub struct Game {
  rounds: Mutex<Rounds>,
  reader: Mutex<Option<PlayerId>>,
}

impl Game {
  /// Create a game with one empty phase and no reader.
  pub fn new() -> Self {
    Self {
      rounds: Mutex::new(Rounds::new()),
      reader: Mutex::new(None),
    }
  }

  /// Create a game moderated by `reader`.
  pub fn with_reader(reader: PlayerId) -> Self {
    Self {
      rounds: Mutex::new(Rounds::new()),
      reader: Mutex::new(Some(reader)),
    }
  }

  // ========================================================================
  // Reader
  // ========================================================================

  pub fn reader(&self) -> Option<PlayerId> {
    *self.reader_slot()
  }

  /// Change who reads. A new reader loses any buzz they still have
  /// pending on the current question.
  pub fn set_reader(&self, reader: Option<PlayerId>) {
    *self.reader_slot() = reader;
    debug!(?reader, "reader changed");

    let Some(player) = reader else {
      return;
    };
    if self.rounds().current_mut().drop_buzz(player) {
      debug!(player, "dropped new reader's buzz");
    }
  }

  // ========================================================================
  // Buzzing
  // ========================================================================

  /// Queue a buzz for `player` on the current question.
  ///
  /// The reader can't buzz, and a player already waiting can't buzz twice.
  pub fn add_player(&self, player: PlayerId) -> bool {
    self.buzz_in(player).is_some()
  }

  /// Like [`Game::add_player`], but reports the front of the queue around
  /// the buzz, read under the same lock. `None` if the buzz was refused.
  pub fn buzz_in(&self, player: PlayerId) -> Option<FrontChange> {
    if self.reader() == Some(player) {
      return None;
    }

    let mut rounds = self.rounds();
    let arrival = rounds.next_arrival;
    let before = rounds.current().next_player();
    if !rounds.current_mut().add_buzz(player, arrival) {
      return None;
    }
    rounds.next_arrival += 1;
    debug!(player, arrival, "buzz queued");
    Some(FrontChange {
      before,
      after: rounds.current().next_player(),
    })
  }

  /// Take back a pending buzz on the current question.
  pub fn withdraw_player(&self, player: PlayerId) -> bool {
    self.withdraw(player).is_some()
  }

  /// Like [`Game::withdraw_player`], but reports the front of the queue
  /// around the withdrawal. `None` if there was nothing to withdraw.
  pub fn withdraw(&self, player: PlayerId) -> Option<FrontChange> {
    if self.reader() == Some(player) {
      return None;
    }

    let mut rounds = self.rounds();
    let before = rounds.current().next_player();
    if !rounds.current_mut().withdraw(player) {
      return None;
    }
    debug!(player, "buzz withdrawn");
    Some(FrontChange {
      before,
      after: rounds.current().next_player(),
    })
  }

  /// Who answers next on the current question.
  pub fn next_player(&self) -> Option<PlayerId> {
    self.rounds().current().next_player()
  }

  // ========================================================================
  // Scoring
  // ========================================================================

  /// Score whoever is at the front of the queue.
  ///
  /// A positive delta settles the question and opens the next one. Returns
  /// false, changing nothing, if nobody is waiting.
  pub fn score_player(&self, delta: i32) -> bool {
    let mut rounds = self.rounds();
    let player = rounds.current().next_player();
    if !rounds.current_mut().try_score(delta) {
      return false;
    }

    rounds.invalidate();
    if delta > 0 {
      rounds.phases.push(Phase::new());
    }
    debug!(?player, delta, phases = rounds.phases.len(), "player scored");
    true
  }

  /// Move on without scoring the current question.
  pub fn next_question(&self) {
    let mut rounds = self.rounds();
    rounds.phases.push(Phase::new());
    debug!(phases = rounds.phases.len(), "skipped to next question");
  }

  /// Reverse the most recent action, reaching back into earlier questions
  /// when the current one has no history.
  ///
  /// Returns the player whose action was undone.
  pub fn undo(&self) -> Option<PlayerId> {
    let mut rounds = self.rounds();
    let undone = loop {
      match rounds.undo_step() {
        UndoStep::Undone(player) => break Some(player),
        UndoStep::DroppedPhase => continue,
        UndoStep::Exhausted => break None,
      }
    };
    rounds.invalidate();
    debug!(?undone, phases = rounds.phases.len(), "undo");
    undone
  }

  /// Totals for every player who has been scored, highest first.
  ///
  /// The result is cached until the next change to the game, so repeated
  /// calls with nothing in between hand back the same allocation. Callers
  /// that only show the top N are expected to cut the list themselves.
  pub fn scores(&self) -> Arc<[PlayerScore]> {
    let mut rounds = self.rounds();
    if let Leaderboard::Fresh(cached) = &rounds.leaderboard {
      return Arc::clone(cached);
    }

    let fresh: Arc<[PlayerScore]> = rounds.tally().into();
    debug!(players = fresh.len(), "leaderboard recomputed");
    rounds.leaderboard = Leaderboard::Fresh(Arc::clone(&fresh));
    fresh
  }

  // ========================================================================
  // Resetting
  // ========================================================================

  /// Wipe the current question in place. Earlier questions and the reader
  /// are left alone.
  pub fn clear_current_round(&self) {
    let mut rounds = self.rounds();
    rounds.current_mut().clear();
    rounds.invalidate();
    debug!(phases = rounds.phases.len(), "current round cleared");
  }

  /// Back to a single empty phase with no reader.
  pub fn clear_all(&self) {
    {
      let mut rounds = self.rounds();
      rounds.phases.clear();
      rounds.phases.push(Phase::new());
      rounds.invalidate();
    }
    self.set_reader(None);
    debug!("game cleared");
  }

  // ========================================================================
  // Inspection
  // ========================================================================

  pub fn phase_count(&self) -> usize {
    self.rounds().phases.len()
  }

  /// A copy of every phase, oldest first.
  pub fn snapshot(&self) -> Vec<Phase> {
    self.rounds().phases.clone()
  }

  // Every critical section leaves `Rounds` consistent before anything that
  // can panic, so a poisoned lock still guards valid state.
  fn rounds(&self) -> MutexGuard<'_, Rounds> {
    self.rounds.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn reader_slot(&self) -> MutexGuard<'_, Option<PlayerId>> {
    self.reader.lock().unwrap_or_else(PoisonError::into_inner)
  }

  #[cfg(test)]
  fn undo_step(&self) -> UndoStep {
    self.rounds().undo_step()
  }
}

impl Default for Game {
  fn default() -> Self {
    Self::new()
  }
}
