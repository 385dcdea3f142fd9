/// Turning plain chat messages into game actions
use thiserror::Error;

/// Point values a reader may award. Anything else is almost certainly a typo.
pub const ACCEPTED_SCORES: [i32; 5] = [-5, 0, 10, 15, 20];

const BUZZ_WORDS: [&str; 3] = ["buzz", "bz", "buzzer"];
const WITHDRAW_WORDS: [&str; 3] = ["wd", "withdraw", "withdrawn"];
const NO_PENALTY_WORDS: [&str; 2] = ["no penalty", "np"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{0} is not an accepted score (use one of -5, 0, 10, 15, 20)")]
    Unsupported(i32),
}

/// What a chat message asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Buzz,
    Withdraw,
    Score(i32),
}

/// Validates a score the reader wants to award
///
/// Rules:
/// - Must be one of the accepted point values
pub fn validate_score(value: i32) -> Result<i32, ScoreError> {
    if ACCEPTED_SCORES.contains(&value) {
        Ok(value)
    } else {
        Err(ScoreError::Unsupported(value))
    }
}

/// Parses a score typed into chat
///
/// Rules:
/// - "no penalty" / "np" mean 0
/// - Otherwise a signed integer that passes `validate_score`
pub fn parse_score(text: &str) -> Result<i32, ScoreError> {
    let text = text.trim();
    if matches_any(text, &NO_PENALTY_WORDS) {
        return Ok(0);
    }

    let value = text
        .parse::<i32>()
        .map_err(|_| ScoreError::NotANumber(text.to_string()))?;
    validate_score(value)
}

/// Parses a whole chat message. Returns `None` for ordinary conversation.
pub fn parse_message(content: &str) -> Option<ChatAction> {
    let content = content.trim();
    if matches_any(content, &BUZZ_WORDS) {
        Some(ChatAction::Buzz)
    } else if matches_any(content, &WITHDRAW_WORDS) {
        Some(ChatAction::Withdraw)
    } else {
        parse_score(content).ok().map(ChatAction::Score)
    }
}

fn matches_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.eq_ignore_ascii_case(word))
}
