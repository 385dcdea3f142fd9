use poise::CreateReply;
use poise::command;
use poise::serenity_prelude::{self as serenity, CreateMessage};
use scorekeeper_bot::parse::{self, ChatAction};
use scorekeeper_bot::render;
use scorekeeper_bot::session::{self, Reply};
use scorekeeper_bot::{Context, Data, Error};

fn ids(ctx: &Context<'_>) -> (u64, u64) {
    (ctx.channel_id().get(), ctx.author().id.get())
}

/// Send a handler's reply as a command response. Slash commands must say
/// something, so silent replies become a private acknowledgement.
async fn respond(ctx: Context<'_>, reply: Reply) -> Result<(), Error> {
    let message = match reply {
        Reply::Silent => CreateReply::default().content("Got it.").ephemeral(true),
        Reply::Text(text) => CreateReply::default().content(text),
        Reply::Scores(scores) => CreateReply::default().embed(render::leaderboard_embed(&scores)),
    };
    ctx.send(message).await?;
    Ok(())
}

/// Become the reader for this channel, starting a game if needed
#[command(slash_command, prefix_command)]
pub async fn read(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::read(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Make someone else the reader
#[command(slash_command, prefix_command, rename = "setreader")]
pub async fn set_reader(
    ctx: Context<'_>,
    #[description = "The new reader"] user: serenity::User,
) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::set_reader(&ctx.data().games, channel, author, user.id.get()).await?;
    respond(ctx, reply).await
}

/// Buzz in to answer the current question
#[command(slash_command, prefix_command)]
pub async fn buzz(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::buzz(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Take back your buzz
#[command(slash_command, prefix_command)]
pub async fn withdraw(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::withdraw(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Score the player who is up (reader only)
#[command(slash_command, prefix_command)]
pub async fn points(
    ctx: Context<'_>,
    #[description = "Points to award: -5, 0, 10, 15 or 20"] value: i32,
) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::score(&ctx.data().games, channel, author, value).await?;
    respond(ctx, reply).await
}

/// Undo the most recent buzz, withdrawal or score (reader only)
#[command(slash_command, prefix_command)]
pub async fn undo(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::undo(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Skip to the next question without scoring (reader only)
#[command(slash_command, prefix_command)]
pub async fn next(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::next_question(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Clear the current question (reader only)
#[command(slash_command, prefix_command)]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::clear(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// End the game and show final scores (reader only)
#[command(slash_command, prefix_command)]
pub async fn end(ctx: Context<'_>) -> Result<(), Error> {
    let (channel, author) = ids(&ctx);
    let reply = session::end(&ctx.data().games, channel, author).await?;
    respond(ctx, reply).await
}

/// Show the scores for this channel's game
#[command(slash_command, prefix_command)]
pub async fn score(ctx: Context<'_>) -> Result<(), Error> {
    let reply = session::scores(&ctx.data().games, ctx.channel_id().get()).await?;
    respond(ctx, reply).await
}

/// Plain chat messages drive buzzing and scoring without a command prefix.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let serenity::FullEvent::Message { new_message } = event else {
        return Ok(());
    };
    if new_message.author.bot {
        return Ok(());
    }
    let Some(action) = parse::parse_message(&new_message.content) else {
        return Ok(());
    };

    let channel = new_message.channel_id.get();
    let author = new_message.author.id.get();
    let result = match action {
        ChatAction::Buzz => session::buzz(&data.games, channel, author).await,
        ChatAction::Withdraw => session::withdraw(&data.games, channel, author).await,
        ChatAction::Score(delta) => session::score(&data.games, channel, author, delta).await,
    };

    match result {
        Ok(Reply::Silent) => {}
        Ok(Reply::Text(text)) => {
            new_message.channel_id.say(ctx, text).await?;
        }
        Ok(Reply::Scores(scores)) => {
            new_message
                .channel_id
                .send_message(
                    ctx,
                    CreateMessage::new().embed(render::leaderboard_embed(&scores)),
                )
                .await?;
        }
        // A "10" from someone who isn't reading is just chat
        Err(err) => tracing::debug!(%err, channel, author, ?action, "ignored chat message"),
    }
    Ok(())
}
