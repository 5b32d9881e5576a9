pub mod achievement;
pub mod game;
pub mod question;

pub use achievement::{AchievementDefinition, AchievementKind, UserAchievementState};
pub use game::{GameKind, ScoreRecord};
pub use question::{
    AudioWord, FillBlankQuestion, LetterScrambleQuestion, TranslationQuestion, WordPair,
};
