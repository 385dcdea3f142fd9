use std::env::var;

use dotenvy::dotenv;

/// Bot configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord API Token
    /// Env: DISCORD_TOKEN (required to start the bot, not to build a Config)
    pub discord_token: Option<String>,

    /// Discord Command Prefix for prefix (non-slash) commands
    /// Env: DISCORD_COMMAND_PREFIX (default: "!")
    pub discord_command_prefix: String,

    /// Register slash commands globally at startup.
    /// Env: REGISTER_COMMANDS_GLOBALLY (default: true)
    /// Global registration can take a while to propagate, so turn it off while iterating locally.
    pub register_commands_globally: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for local runs mostly
        let defaults = Self::default();
        Self {
            discord_token: var("DISCORD_TOKEN").ok().filter(|token| !token.is_empty()),
            discord_command_prefix: env_or_default_string(
                "DISCORD_COMMAND_PREFIX",
                &defaults.discord_command_prefix,
            ),
            register_commands_globally: env_or_default(
                "REGISTER_COMMANDS_GLOBALLY",
                defaults.register_commands_globally,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: None,
            discord_command_prefix: "!".to_string(),
            register_commands_globally: true,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discord_token, None);
        assert_eq!(config.discord_command_prefix, "!");
        assert!(config.register_commands_globally);
    }

    #[test]
    fn test_env_or_default_falls_back() {
        assert_eq!(env_or_default("SCOREKEEPER_TEST_UNSET_NUMBER", 7u32), 7);
        assert_eq!(
            env_or_default_string("SCOREKEEPER_TEST_UNSET_STRING", "fallback"),
            "fallback"
        );
    }
}
