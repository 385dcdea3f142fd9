//! Leaderboard presentation.
//!
//! The game hands back every player's total. Chat only ever shows the top
//! [`SCORES_LIST_LIMIT`] rows, and that cut happens here.

use arrayvec::ArrayVec;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};
use scorekeeper_core::{PlayerId, PlayerScore};

/// Most rows shown in a leaderboard message.
pub const SCORES_LIST_LIMIT: usize = 10;

const EMBED_COLOR: u32 = 0x5865F2;

/// Discord mention markup for a user.
pub fn mention(player: PlayerId) -> String {
    format!("<@{}>", player)
}

/// The rows worth showing, best first.
pub fn top_scores(scores: &[PlayerScore]) -> ArrayVec<PlayerScore, SCORES_LIST_LIMIT> {
    scores.iter().copied().take(SCORES_LIST_LIMIT).collect()
}

/// Numbered leaderboard lines, one per shown player.
pub fn format_leaderboard(scores: &[PlayerScore]) -> String {
    if scores.is_empty() {
        return "No one has scored yet.".to_string();
    }

    top_scores(scores)
        .iter()
        .enumerate()
        .map(|(rank, entry)| format!("{}. {}: {}", rank + 1, mention(entry.player), entry.score))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn leaderboard_embed(scores: &[PlayerScore]) -> CreateEmbed {
    let embed = CreateEmbed::default()
        .title("Scores")
        .description(format_leaderboard(scores))
        .color(EMBED_COLOR);

    let hidden = scores.len().saturating_sub(SCORES_LIST_LIMIT);
    if hidden > 0 {
        embed.footer(CreateEmbedFooter::new(format!(
            "{} more player{} not shown",
            hidden,
            if hidden == 1 { "" } else { "s" }
        )))
    } else {
        embed
    }
}
