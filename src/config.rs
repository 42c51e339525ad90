//! Runtime configuration from environment variables (a `.env` file is
//! loaded first when present).
use crate::game::setup::GameSetup;
use crate::game::words::Difficulty;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Starting values for the setup form
    pub setup: GameSetup,
    /// External word-pair generator command line
    pub word_command: Option<String>,
    /// Database directory override
    pub data_dir: Option<PathBuf>,
    /// Log directory override
    pub log_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `UNDERCOVER_DIFFICULTY` - easy, medium or hard (default: medium)
    /// - `UNDERCOVER_PLAYERS` - players on the setup form (default: 5)
    /// - `UNDERCOVER_WORD_COMMAND` - command that prints a JSON word pair
    /// - `UNDERCOVER_DATA_DIR` - where the database lives
    /// - `UNDERCOVER_LOG_DIR` - where log files go
    /// - `UNDERCOVER_SEED` - RNG seed
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(difficulty) = read_env::<Difficulty>("UNDERCOVER_DIFFICULTY") {
            config.setup.difficulty = difficulty;
        }
        if let Some(players) = read_env::<usize>("UNDERCOVER_PLAYERS") {
            config.setup.players = players;
        }

        config.word_command = read_env::<String>("UNDERCOVER_WORD_COMMAND")
            .filter(|command| !command.trim().is_empty());
        config.data_dir = read_env::<PathBuf>("UNDERCOVER_DATA_DIR");
        config.log_dir = read_env::<PathBuf>("UNDERCOVER_LOG_DIR");
        config.seed = read_env::<u64>("UNDERCOVER_SEED");

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process environment is not raced by parallel tests
    #[test]
    fn test_from_env() {
        env::set_var("UNDERCOVER_DIFFICULTY", "hard");
        env::set_var("UNDERCOVER_PLAYERS", "not a number");
        env::set_var("UNDERCOVER_WORD_COMMAND", "  ");
        env::set_var("UNDERCOVER_SEED", " 42 ");

        let config = AppConfig::from_env();
        assert_eq!(config.setup.difficulty, Difficulty::Hard);
        assert_eq!(config.setup.players, 5);
        assert_eq!(config.word_command, None);
        assert_eq!(config.seed, Some(42));

        for key in [
            "UNDERCOVER_DIFFICULTY",
            "UNDERCOVER_PLAYERS",
            "UNDERCOVER_WORD_COMMAND",
            "UNDERCOVER_SEED",
        ] {
            env::remove_var(key);
        }
        let config = AppConfig::from_env();
        assert_eq!(config.setup.difficulty, Difficulty::Medium);
        assert_eq!(config.seed, None);
    }
}
