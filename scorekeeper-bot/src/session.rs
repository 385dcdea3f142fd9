//! What each command does to a channel's game.
//!
//! These handlers know nothing about Discord: they take ids, run the game
//! operation, and describe what to say back. Slash commands and plain chat
//! messages both land here.

use std::sync::Arc;

use scorekeeper_core::{ChannelId, Game, GameRegistry, PlayerId, PlayerScore};
use tracing::info;

use crate::error::BotError;
use crate::parse::validate_score;
use crate::render::mention;

/// What to tell the channel after handling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing worth saying.
    Silent,
    Text(String),
    /// A leaderboard, rendered by the caller.
    Scores(Arc<[PlayerScore]>),
}

pub type Result<T> = std::result::Result<T, BotError>;

async fn game_in(games: &GameRegistry, channel: ChannelId) -> Result<Arc<Game>> {
    games.get(channel).await.ok_or(BotError::NoGame)
}

/// The channel's game, provided `author` is its reader.
async fn reader_game(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Arc<Game>> {
    let game = game_in(games, channel).await?;
    if game.reader() != Some(author) {
        return Err(BotError::NotReader);
    }
    Ok(game)
}

fn next_up(game: &Game) -> Reply {
    match game.next_player() {
        Some(player) => Reply::Text(mention(player)),
        None => Reply::Silent,
    }
}

/// Become the reader, starting a game if the channel has none.
pub async fn read(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let (game, created) = games.get_or_start(channel, author).await;
    if !created {
        match game.reader() {
            Some(reader) if reader == author => {}
            Some(reader) => return Err(BotError::ReaderAlreadySet(reader)),
            None => game.set_reader(Some(author)),
        }
    }
    Ok(Reply::Text(format!("{} is the reader.", mention(author))))
}

/// Hand the reader role to someone else.
pub async fn set_reader(
    games: &GameRegistry,
    channel: ChannelId,
    author: PlayerId,
    new_reader: PlayerId,
) -> Result<Reply> {
    let game = reader_game(games, channel, author).await?;
    game.set_reader(Some(new_reader));
    info!(channel, from = author, to = new_reader, "reader handed over");
    Ok(Reply::Text(format!("{} is now the reader.", mention(new_reader))))
}

/// Buzz in. Only announces the player when they're up right away.
pub async fn buzz(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let game = game_in(games, channel).await?;
    if game.reader() == Some(author) {
        return Err(BotError::ReaderCannotBuzz);
    }

    match game.buzz_in(author) {
        Some(change) if change.after == Some(author) => Ok(Reply::Text(mention(author))),
        _ => Ok(Reply::Silent),
    }
}

/// Take back a buzz. Announces whoever inherits the front of the queue.
pub async fn withdraw(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let game = game_in(games, channel).await?;
    match game.withdraw(author) {
        Some(change) if change.before == Some(author) => Ok(change
            .after
            .map_or(Reply::Silent, |next| Reply::Text(mention(next)))),
        _ => Ok(Reply::Silent),
    }
}

/// Score the player who is up. A correct answer moves on quietly; a miss
/// calls the next player in the queue.
pub async fn score(
    games: &GameRegistry,
    channel: ChannelId,
    author: PlayerId,
    delta: i32,
) -> Result<Reply> {
    let delta = validate_score(delta)?;
    let game = reader_game(games, channel, author).await?;
    if !game.score_player(delta) || delta > 0 {
        return Ok(Reply::Silent);
    }
    Ok(next_up(&game))
}

pub async fn undo(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let game = reader_game(games, channel, author).await?;
    let Some(player) = game.undo() else {
        return Ok(Reply::Text("Nothing to undo.".to_string()));
    };

    let mut text = format!("Undid the last action for {}.", mention(player));
    if let Some(next) = game.next_player() {
        text.push_str(&format!(" {} is up.", mention(next)));
    }
    Ok(Reply::Text(text))
}

pub async fn next_question(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let game = reader_game(games, channel, author).await?;
    game.next_question();
    Ok(Reply::Text("Moving on to the next question.".to_string()))
}

/// Wipe the current question without touching earlier ones.
pub async fn clear(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    let game = reader_game(games, channel, author).await?;
    game.clear_current_round();
    Ok(Reply::Text("Cleared the current question.".to_string()))
}

/// End the game and show the final standings.
pub async fn end(games: &GameRegistry, channel: ChannelId, author: PlayerId) -> Result<Reply> {
    reader_game(games, channel, author).await?;
    let game = games.end(channel).await?;
    let final_scores = game.scores();
    // Anyone still holding the game sees it reset rather than half-finished
    game.clear_all();
    Ok(Reply::Scores(final_scores))
}

pub async fn scores(games: &GameRegistry, channel: ChannelId) -> Result<Reply> {
    let game = game_in(games, channel).await?;
    Ok(Reply::Scores(game.scores()))
}
