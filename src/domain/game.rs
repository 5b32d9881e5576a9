use serde::{Deserialize, Serialize};

use crate::config;

/// The five playable games. The string forms are the score-dimension keys
/// used in stored documents and achievement kinds, so they stay camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
  WordMatch,
  FillBlank,
  Translation,
  LetterScramble,
  AudioListen,
}

impl GameKind {
  pub const ALL: [GameKind; 5] = [
    Self::WordMatch,
    Self::FillBlank,
    Self::Translation,
    Self::LetterScramble,
    Self::AudioListen,
  ];

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "wordMatch" => Some(Self::WordMatch),
      "fillBlank" => Some(Self::FillBlank),
      "translation" => Some(Self::Translation),
      "letterScramble" => Some(Self::LetterScramble),
      "audioListen" => Some(Self::AudioListen),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::WordMatch => "wordMatch",
      Self::FillBlank => "fillBlank",
      Self::Translation => "translation",
      Self::LetterScramble => "letterScramble",
      Self::AudioListen => "audioListen",
    }
  }
}

/// Cumulative point totals for one user, one value per game.
///
/// The row is created lazily on the first score-earning event; a user who
/// has never answered a question has no record at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
  pub word_match: i64,
  pub fill_blank: i64,
  pub translation: i64,
  pub letter_scramble: i64,
  pub audio_listen: i64,
}

impl ScoreRecord {
  pub fn get(&self, game: GameKind) -> i64 {
    match game {
      GameKind::WordMatch => self.word_match,
      GameKind::FillBlank => self.fill_blank,
      GameKind::Translation => self.translation,
      GameKind::LetterScramble => self.letter_scramble,
      GameKind::AudioListen => self.audio_listen,
    }
  }

  /// Sum of all five per-game totals
  pub fn total(&self) -> i64 {
    GameKind::ALL.iter().map(|g| self.get(*g)).sum()
  }

  /// Questions answered in one game, derived from its point total
  pub fn questions_answered(&self, game: GameKind) -> i64 {
    self.get(game) / config::POINTS_PER_QUESTION
  }

  /// Questions answered across all games
  pub fn total_questions(&self) -> i64 {
    self.total() / config::POINTS_PER_QUESTION
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_game_kind_roundtrip() {
    for kind in GameKind::ALL {
      assert_eq!(GameKind::from_str(kind.as_str()), Some(kind));
    }
  }

  #[test]
  fn test_game_kind_from_str_invalid() {
    assert_eq!(GameKind::from_str("wordmatch"), None);
    assert_eq!(GameKind::from_str("WordMatch"), None);
    assert_eq!(GameKind::from_str(""), None);
  }

  #[test]
  fn test_score_record_total() {
    let record = ScoreRecord {
      word_match: 500,
      fill_blank: 20,
      translation: 30,
      letter_scramble: 0,
      audio_listen: 10,
    };
    assert_eq!(record.total(), 560);
    assert_eq!(record.get(GameKind::WordMatch), 500);
    assert_eq!(record.get(GameKind::LetterScramble), 0);
  }

  #[test]
  fn test_questions_answered_floors() {
    let record = ScoreRecord {
      word_match: 95,
      ..Default::default()
    };
    // 95 points at 10 points per question = 9 full questions
    assert_eq!(record.questions_answered(GameKind::WordMatch), 9);
    assert_eq!(record.total_questions(), 9);
  }
}
