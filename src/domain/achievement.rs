use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GameKind;

/// Which score dimension feeds an achievement's progress.
///
/// `Unknown` preserves whatever tag was stored so admin-entered typos
/// survive a round-trip; such definitions compute zero progress and can
/// never unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementKind {
  /// Raw point total across all games
  TotalScore,
  /// Questions answered across all games
  TotalQuestions,
  /// Questions answered in one specific game
  Game(GameKind),
  /// Unrecognized tag, kept verbatim
  Unknown(String),
}

impl AchievementKind {
  pub fn from_str(s: &str) -> Self {
    match s {
      "total_score" => Self::TotalScore,
      "total" => Self::TotalQuestions,
      _ => match GameKind::from_str(s) {
        Some(game) => Self::Game(game),
        None => Self::Unknown(s.to_string()),
      },
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::TotalScore => "total_score",
      Self::TotalQuestions => "total",
      Self::Game(game) => game.as_str(),
      Self::Unknown(raw) => raw,
    }
  }

  pub fn is_known(&self) -> bool {
    !matches!(self, Self::Unknown(_))
  }
}

/// One unlockable badge. Created and edited by admins; read-only to the
/// tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
  pub id: String,
  pub title: String,
  pub description: String,
  pub kind: AchievementKind,
  /// Progress at or above this value unlocks the badge
  pub target: i64,
  pub icon: String,
  pub gradient: Option<String>,
}

/// Per-user achievement document: computed progress per definition plus
/// the permanent set of unlocked badge ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievementState {
  /// Achievement id -> current computed progress value
  pub progress: BTreeMap<String, i64>,
  /// Ids that have ever crossed their target, in unlock order.
  /// Monotonic: ids are appended, never removed.
  pub unlocked: Vec<String>,
  pub last_updated: DateTime<Utc>,
}

impl Default for UserAchievementState {
  fn default() -> Self {
    Self {
      progress: BTreeMap::new(),
      unlocked: Vec::new(),
      last_updated: Utc::now(),
    }
  }
}

impl UserAchievementState {
  pub fn is_unlocked(&self, id: &str) -> bool {
    self.unlocked.iter().any(|u| u == id)
  }

  pub fn progress_for(&self, id: &str) -> i64 {
    self.progress.get(id).copied().unwrap_or(0)
  }
}
