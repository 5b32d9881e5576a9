//! Question-bank row types for the five games.
//!
//! Each mirrors one admin-managed collection. `sort_order` is the
//! admin-chosen display position, not an id.

use serde::{Deserialize, Serialize};

/// Word Match: an English/Arabic pair to be matched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPair {
  pub id: i64,
  pub english: String,
  pub arabic: String,
  pub sort_order: i64,
}

/// Fill in the Blank: a sentence with a `___` gap and a fixed option list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillBlankQuestion {
  pub id: i64,
  /// Contains a single `___` placeholder
  pub sentence: String,
  /// The word that fills the blank
  pub answer: String,
  /// Choice buttons shown to the player (includes the answer)
  pub options: Vec<String>,
  pub sort_order: i64,
}

/// Translation Quiz: a word and four candidate translations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationQuestion {
  pub id: i64,
  pub word: String,
  pub correct: String,
  pub options: Vec<String>,
  pub sort_order: i64,
}

/// Letter Scramble: a word to reassemble, with a hint and its translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterScrambleQuestion {
  pub id: i64,
  pub word: String,
  pub hint: String,
  pub translation: String,
  pub sort_order: i64,
}

/// Listen & Type: a spoken English word and its Arabic translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioWord {
  pub id: i64,
  pub english: String,
  pub arabic: String,
  pub sort_order: i64,
}
