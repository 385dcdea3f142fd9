mod discord_commands;
use anyhow::Context as _;
use poise::{Framework, FrameworkError, FrameworkOptions, PrefixFrameworkOptions, serenity_prelude as serenity};
use scorekeeper_bot::config::Config;
use scorekeeper_bot::{BotError, Data, Error};
use tracing_subscriber::EnvFilter;

/// Refusals go back to the user as-is; anything else is our problem and gets logged.
async fn on_error(error: FrameworkError<'_, Data, Error>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let command = &ctx.command().name;
            let message = match error.downcast_ref::<BotError>() {
                Some(refusal) => {
                    tracing::warn!(%command, %refusal, "command refused");
                    refusal.to_string()
                }
                None => {
                    tracing::error!(%command, ?error, "command failed");
                    "Something went wrong. Please try again.".to_string()
                }
            };
            if let Err(e) = ctx.say(message).await {
                tracing::error!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting scorekeeper bot...");
    // Load configuration from environment variables or use defaults
    let config = Config::from_env();
    tracing::info!(
        "Configuration: prefix={}, register_globally={}",
        config.discord_command_prefix,
        config.register_commands_globally
    );
    let token = config
        .discord_token
        .clone()
        .context("DISCORD_TOKEN environment variable is required")?;

    // Plain-message buzzing needs to read message content
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![
                discord_commands::read(),
                discord_commands::set_reader(),
                discord_commands::buzz(),
                discord_commands::withdraw(),
                discord_commands::points(),
                discord_commands::undo(),
                discord_commands::next(),
                discord_commands::clear(),
                discord_commands::end(),
                discord_commands::score(),
            ],
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(config.discord_command_prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(discord_commands::event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::info!(
                        "Executing command '{}' by user '{}'",
                        ctx.command().name,
                        ctx.author().name
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    tracing::info!(
                        "Finished command '{}' by user '{}'",
                        ctx.command().name,
                        ctx.author().name
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let register_globally = config.register_commands_globally;
            Box::pin(async move {
                if register_globally {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }
                Ok(Data::new())
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("Error creating Discord client")?;
    if let Err(e) = client.start().await {
        tracing::error!("Discord client error: {:?}", e);
        return Err(e.into());
    }
    Ok(())
}
