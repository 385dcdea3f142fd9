pub mod config;
mod error;
pub mod parse;
pub mod render;
pub mod session;

pub use error::BotError;

use scorekeeper_core::GameRegistry;

/// Shared state handed to every command and event.
pub struct Data {
    pub games: GameRegistry,
}

impl Data {
    pub fn new() -> Self {
        Self {
            games: GameRegistry::new(),
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
