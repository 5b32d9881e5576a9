//! Application configuration constants.
//!
//! Centralizes values that would otherwise be scattered through the
//! handlers and the scoring code.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::GameKind;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(db) = config.database {
                if let Some(path) = db.path {
                    tracing::info!("Using database from config.toml: {}", path);
                    return PathBuf::from(path);
                }
            }
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/arcade.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Session Configuration ====================

/// Login session duration in hours (1 week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

// ==================== Scoring Configuration ====================

/// Points awarded per correctly answered question, in every game.
///
/// The achievement tracker also uses this to convert a score total back
/// into a question count, so changing it rescales every `total`-kind and
/// per-game achievement.
pub const POINTS_PER_QUESTION: i64 = 10;

// ==================== Game Configuration ====================

/// Static metadata for one of the five games
pub struct GameInfo {
    pub kind: GameKind,
    pub slug: &'static str,
    pub title: &'static str,
    pub blurb: &'static str,
}

/// All game definitions, in menu order
pub const GAMES: [GameInfo; 5] = [
    GameInfo {
        kind: GameKind::WordMatch,
        slug: "word-match",
        title: "Word Match",
        blurb: "Match the English word to its Arabic translation",
    },
    GameInfo {
        kind: GameKind::FillBlank,
        slug: "fill-blank",
        title: "Fill in the Blank",
        blurb: "Complete the sentence with the right word",
    },
    GameInfo {
        kind: GameKind::Translation,
        slug: "translation",
        title: "Translation Quiz",
        blurb: "Pick the correct translation",
    },
    GameInfo {
        kind: GameKind::LetterScramble,
        slug: "letter-scramble",
        title: "Letter Scramble",
        blurb: "Unscramble the letters to form a word",
    },
    GameInfo {
        kind: GameKind::AudioListen,
        slug: "audio-listen",
        title: "Listen & Type",
        blurb: "Listen to the word and type what you hear",
    },
];

/// Look up game metadata by URL slug
pub fn game_by_slug(slug: &str) -> Option<&'static GameInfo> {
    GAMES.iter().find(|g| g.slug == slug)
}

/// Look up game metadata by kind
pub fn game_info(kind: GameKind) -> &'static GameInfo {
    GAMES
        .iter()
        .find(|g| g.kind == kind)
        .expect("every GameKind has a GAMES entry")
}

// ==================== Admin Configuration ====================

/// Rows per page in admin tables
pub const ADMIN_PAGE_SIZE: i64 = 10;

/// Badge gradient used when a definition does not carry one
pub const DEFAULT_GRADIENT: &str = "from-yellow-400 to-orange-500";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_game_kind_has_info() {
        for kind in GameKind::ALL {
            assert_eq!(game_info(kind).kind, kind);
        }
    }

    #[test]
    fn test_game_by_slug() {
        assert_eq!(
            game_by_slug("word-match").map(|g| g.kind),
            Some(GameKind::WordMatch)
        );
        assert!(game_by_slug("word_match").is_none());
        assert!(game_by_slug("").is_none());
    }
}
