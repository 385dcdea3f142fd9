//! State for a single question.
//!
//! A phase owns the buzz queue for one question, the players who withdrew,
//! the deltas awarded while the question was live, and the log of actions
//! that `undo` walks back through. It knows nothing about readers or what a
//! delta means; [`crate::Game`] layers those rules on top.

use std::collections::HashSet;

use crate::models::{Buzz, PlayerId};

/// A reversible change to a phase, recorded in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
  /// The buzz entered the queue. `was_withdrawn` remembers the withdrawn
  /// mark the buzz cleared, so undo can put it back.
  Buzzed { buzz: Buzz, was_withdrawn: bool },
  /// The buzz left the queue through a withdrawal.
  Withdrew { buzz: Buzz },
  /// The buzz left the front of the queue with a score.
  /// `first_score` is set when this delta created the player's entry.
  Scored {
    buzz: Buzz,
    delta: i32,
    first_score: bool,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phase {
  /// Pending buzzes sorted by arrival. Small N, so a Vec beats anything fancier.
  queue: Vec<Buzz>,
  withdrawn: HashSet<PlayerId>,
  /// Accumulated deltas in first-scored order.
  scores: Vec<(PlayerId, i32)>,
  actions: Vec<Action>,
}

impl Phase {
  /// Create an empty phase.
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue a buzz.
  ///
  /// Returns false if the player is already waiting in the queue.
  pub fn add_buzz(&mut self, player: PlayerId, arrival: u64) -> bool {
    if self.is_queued(player) {
      return false;
    }

    let buzz = Buzz { player, arrival };
    self.insert_in_order(buzz);
    let was_withdrawn = self.withdrawn.remove(&player);
    self.actions.push(Action::Buzzed { buzz, was_withdrawn });
    true
  }

  /// Pull a pending buzz out of the queue.
  ///
  /// Returns false if the player has nothing pending.
  pub fn withdraw(&mut self, player: PlayerId) -> bool {
    let Some(idx) = self.queue.iter().position(|b| b.player == player) else {
      return false;
    };

    let buzz = self.queue.remove(idx);
    self.withdrawn.insert(player);
    self.actions.push(Action::Withdrew { buzz });
    true
  }

  /// Remove a pending buzz without logging it, for a player who can no
  /// longer answer at all. Unlike `withdraw` there is nothing to undo.
  pub fn drop_buzz(&mut self, player: PlayerId) -> bool {
    let before = self.queue.len();
    self.queue.retain(|b| b.player != player);
    self.queue.len() != before
  }

  /// The player who answers next, if anyone is waiting.
  pub fn next_player(&self) -> Option<PlayerId> {
    self.queue.first().map(|b| b.player)
  }

  /// Score the player at the front of the queue and remove them from it.
  ///
  /// Returns false, changing nothing, if nobody is waiting or the player's
  /// total for this phase would overflow. The sign of `delta` means nothing
  /// here; deciding whether the question is settled is the game's job.
  pub fn try_score(&mut self, delta: i32) -> bool {
    let Some(&front) = self.queue.first() else {
      return false;
    };

    // Work out the new total before anything moves
    let existing = self.score_index(front.player);
    let total = match existing {
      Some(idx) => match self.scores[idx].1.checked_add(delta) {
        Some(total) => total,
        None => return false,
      },
      None => delta,
    };

    let buzz = self.queue.remove(0);
    let first_score = match existing {
      Some(idx) => {
        self.scores[idx].1 = total;
        false
      }
      None => {
        self.scores.push((buzz.player, total));
        true
      }
    };
    self.actions.push(Action::Scored {
      buzz,
      delta,
      first_score,
    });
    true
  }

  /// Reverse the most recent action.
  ///
  /// Returns the player the undone action belonged to, or `None` when the
  /// phase has no history left.
  pub fn undo(&mut self) -> Option<PlayerId> {
    let action = self.actions.pop()?;

    let player = match action {
      Action::Buzzed { buzz, was_withdrawn } => {
        self.queue.retain(|b| b.player != buzz.player);
        if was_withdrawn {
          self.withdrawn.insert(buzz.player);
        }
        buzz.player
      }
      Action::Withdrew { buzz } => {
        self.withdrawn.remove(&buzz.player);
        self.insert_in_order(buzz);
        buzz.player
      }
      Action::Scored {
        buzz,
        delta,
        first_score,
      } => {
        if let Some(idx) = self.score_index(buzz.player) {
          if first_score {
            self.scores.remove(idx);
          } else {
            self.scores[idx].1 -= delta;
          }
        }
        // Scored buzzes always came off the front, so arrival order puts
        // them straight back there.
        self.insert_in_order(buzz);
        buzz.player
      }
    };

    Some(player)
  }

  /// Forget everything, as if the phase had just been created.
  pub fn clear(&mut self) {
    self.queue.clear();
    self.withdrawn.clear();
    self.scores.clear();
    self.actions.clear();
  }

  /// Per-player deltas awarded in this phase, in first-scored order.
  pub fn scores(&self) -> &[(PlayerId, i32)] {
    &self.scores
  }

  /// Pending buzzes, front first.
  pub fn queue(&self) -> &[Buzz] {
    &self.queue
  }

  pub fn is_withdrawn(&self, player: PlayerId) -> bool {
    self.withdrawn.contains(&player)
  }

  /// Whether `undo` has anything to reverse.
  pub fn has_history(&self) -> bool {
    !self.actions.is_empty()
  }

  fn is_queued(&self, player: PlayerId) -> bool {
    self.queue.iter().any(|b| b.player == player)
  }

  fn score_index(&self, player: PlayerId) -> Option<usize> {
    self.scores.iter().position(|(p, _)| *p == player)
  }

  fn insert_in_order(&mut self, buzz: Buzz) {
    let idx = self.queue.partition_point(|b| b.arrival < buzz.arrival);
    self.queue.insert(idx, buzz);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALICE: PlayerId = 1;
  const BOB: PlayerId = 2;
  const CAROL: PlayerId = 3;

  fn queued(phase: &Phase) -> Vec<PlayerId> {
    phase.queue().iter().map(|b| b.player).collect()
  }

  #[test]
  fn test_buzzes_queue_in_arrival_order() {
    let mut phase = Phase::new();
    assert!(phase.add_buzz(ALICE, 1));
    assert!(phase.add_buzz(BOB, 2));
    assert!(phase.add_buzz(CAROL, 3));

    assert_eq!(queued(&phase), vec![ALICE, BOB, CAROL]);
    assert_eq!(phase.next_player(), Some(ALICE));
  }

  #[test]
  fn test_late_stamp_still_sorted() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 5);
    phase.add_buzz(BOB, 2);

    assert_eq!(phase.next_player(), Some(BOB));
  }

  #[test]
  fn test_duplicate_buzz_rejected() {
    let mut phase = Phase::new();
    assert!(phase.add_buzz(ALICE, 1));
    let before = phase.clone();

    assert!(!phase.add_buzz(ALICE, 2));
    assert_eq!(phase, before);
  }

  #[test]
  fn test_withdraw_requires_pending_buzz() {
    let mut phase = Phase::new();
    assert!(!phase.withdraw(ALICE));
    assert!(!phase.has_history());

    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);
    assert!(phase.withdraw(ALICE));
    assert!(phase.is_withdrawn(ALICE));
    assert_eq!(phase.next_player(), Some(BOB));
    assert!(!phase.withdraw(ALICE));
  }

  #[test]
  fn test_rebuzz_after_withdraw_goes_to_back() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);
    phase.withdraw(ALICE);

    assert!(phase.add_buzz(ALICE, 3));
    assert!(!phase.is_withdrawn(ALICE));
    assert_eq!(queued(&phase), vec![BOB, ALICE]);

    // Undoing the rebuzz brings the withdrawn mark back
    assert_eq!(phase.undo(), Some(ALICE));
    assert!(phase.is_withdrawn(ALICE));
    assert_eq!(queued(&phase), vec![BOB]);
  }

  #[test]
  fn test_drop_buzz_leaves_no_history() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);

    assert!(phase.drop_buzz(ALICE));
    assert!(!phase.drop_buzz(ALICE));
    assert_eq!(queued(&phase), vec![BOB]);
    assert!(!phase.is_withdrawn(ALICE));
  }

  #[test]
  fn test_score_on_empty_queue_is_rejected() {
    let mut phase = Phase::new();
    assert!(!phase.try_score(10));
    assert!(phase.scores().is_empty());
    assert!(!phase.has_history());
  }

  #[test]
  fn test_overflowing_score_is_rejected_whole() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    assert!(phase.try_score(i32::MIN + 1));
    phase.add_buzz(ALICE, 2);
    phase.add_buzz(BOB, 3);
    let before = phase.clone();

    assert!(!phase.try_score(-5));
    assert_eq!(phase, before);
    assert_eq!(phase.next_player(), Some(ALICE));

    // The log still ends with Alice's rebuzz
    assert_eq!(phase.undo(), Some(BOB));
    assert_eq!(phase.undo(), Some(ALICE));
    assert_eq!(queued(&phase), Vec::<PlayerId>::new());
  }

  #[test]
  fn test_score_pops_front_and_accumulates() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);

    assert!(phase.try_score(-5));
    assert_eq!(phase.next_player(), Some(BOB));
    assert_eq!(phase.scores(), &[(ALICE, -5)]);

    assert!(phase.try_score(10));
    assert_eq!(phase.next_player(), None);
    assert_eq!(phase.scores(), &[(ALICE, -5), (BOB, 10)]);
  }

  #[test]
  fn test_scored_player_can_buzz_again() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.try_score(-5);

    assert!(phase.add_buzz(ALICE, 2));
    assert_eq!(phase.next_player(), Some(ALICE));
  }

  #[test]
  fn test_undo_withdraw_restores_position() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);
    phase.add_buzz(CAROL, 3);
    phase.withdraw(BOB);

    assert_eq!(phase.undo(), Some(BOB));
    assert_eq!(queued(&phase), vec![ALICE, BOB, CAROL]);
    assert!(!phase.is_withdrawn(BOB));
  }

  #[test]
  fn test_undo_score_restores_front_and_totals() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);
    phase.try_score(-5);

    assert_eq!(phase.undo(), Some(ALICE));
    assert_eq!(phase.next_player(), Some(ALICE));
    assert!(phase.scores().is_empty());
  }

  #[test]
  fn test_every_action_round_trips_through_undo() {
    let mut base = Phase::new();
    base.add_buzz(ALICE, 1);
    base.add_buzz(BOB, 2);

    let ops: Vec<Box<dyn Fn(&mut Phase) -> bool>> = vec![
      Box::new(|p: &mut Phase| p.add_buzz(CAROL, 3)),
      Box::new(|p: &mut Phase| p.withdraw(BOB)),
      Box::new(|p: &mut Phase| p.try_score(-5)),
      Box::new(|p: &mut Phase| p.try_score(15)),
    ];

    for op in ops {
      let mut phase = base.clone();
      assert!(op(&mut phase));
      assert_ne!(phase, base);
      assert!(phase.undo().is_some());
      assert_eq!(phase, base);
    }
  }

  #[test]
  fn test_repeat_deltas_sum_and_undo_in_order() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.try_score(-5);
    phase.add_buzz(ALICE, 2);
    phase.try_score(10);
    assert_eq!(phase.scores(), &[(ALICE, 5)]);

    // Second score comes off first, leaving the penalty in place
    assert_eq!(phase.undo(), Some(ALICE));
    assert_eq!(phase.scores(), &[(ALICE, -5)]);
    assert_eq!(phase.next_player(), Some(ALICE));

    assert_eq!(phase.undo(), Some(ALICE));
    assert!(phase.queue().is_empty());

    assert_eq!(phase.undo(), Some(ALICE));
    assert!(phase.scores().is_empty());
    assert_eq!(phase.next_player(), Some(ALICE));

    assert_eq!(phase.undo(), Some(ALICE));
    assert_eq!(phase.undo(), None);
    assert_eq!(phase, Phase::new());
  }

  #[test]
  fn test_clear_resets_everything() {
    let mut phase = Phase::new();
    phase.add_buzz(ALICE, 1);
    phase.add_buzz(BOB, 2);
    phase.withdraw(BOB);
    phase.try_score(10);

    phase.clear();
    assert_eq!(phase, Phase::new());
    assert_eq!(phase.undo(), None);
  }
}
