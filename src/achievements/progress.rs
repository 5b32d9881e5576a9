//! Progress arithmetic: pure functions from definitions, prior state,
//! and score inputs to a new state plus the badges unlocked by the
//! transition.
//!
//! Unlocks are sticky. Once an id is in the unlocked set it stays there,
//! even if a later computation would put its progress below target.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config;
use crate::domain::{AchievementDefinition, AchievementKind, GameKind, ScoreRecord, UserAchievementState};

/// Result of one progress computation
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
  pub state: UserAchievementState,
  /// Ids that crossed their target in this computation, in definition
  /// order. Never contains an id that was already unlocked.
  pub newly_unlocked: Vec<String>,
}

/// Merge a single score-earning event into the prior state.
///
/// `total_score`-kind progress is replaced with `new_total_score` and
/// `total`-kind with the derived question count; per-game kinds increment
/// their previously stored value by one when the event's game matches.
/// Other stored values carry over unchanged.
pub fn apply_event(
  definitions: &[AchievementDefinition],
  prior: &UserAchievementState,
  game: GameKind,
  new_total_score: i64,
) -> ProgressOutcome {
  let mut progress = prior.progress.clone();
  let total_questions = new_total_score / config::POINTS_PER_QUESTION;

  for def in definitions {
    match &def.kind {
      AchievementKind::TotalScore => {
        progress.insert(def.id.clone(), new_total_score);
      }
      AchievementKind::TotalQuestions => {
        progress.insert(def.id.clone(), total_questions);
      }
      AchievementKind::Game(kind) if *kind == game => {
        *progress.entry(def.id.clone()).or_insert(0) += 1;
      }
      AchievementKind::Game(_) | AchievementKind::Unknown(_) => {}
    }
  }

  collect_unlocks(definitions, prior, progress)
}

/// Re-derive every progress value from the authoritative score record,
/// ignoring previously stored progress entirely.
pub fn reconcile(
  definitions: &[AchievementDefinition],
  prior: &UserAchievementState,
  scores: &ScoreRecord,
) -> ProgressOutcome {
  let mut progress = BTreeMap::new();

  for def in definitions {
    let value = match &def.kind {
      AchievementKind::TotalScore => scores.total(),
      AchievementKind::TotalQuestions => scores.total_questions(),
      AchievementKind::Game(kind) => scores.questions_answered(*kind),
      AchievementKind::Unknown(_) => 0,
    };
    progress.insert(def.id.clone(), value);
  }

  collect_unlocks(definitions, prior, progress)
}

fn collect_unlocks(
  definitions: &[AchievementDefinition],
  prior: &UserAchievementState,
  progress: BTreeMap<String, i64>,
) -> ProgressOutcome {
  let mut unlocked = prior.unlocked.clone();
  let mut newly_unlocked = Vec::new();

  for def in definitions {
    if !def.kind.is_known() {
      // Unrecognized kinds never unlock, whatever their stored value
      continue;
    }
    if unlocked.iter().any(|id| id == &def.id) {
      continue;
    }
    if progress.get(&def.id).copied().unwrap_or(0) >= def.target {
      unlocked.push(def.id.clone());
      newly_unlocked.push(def.id.clone());
    }
  }

  ProgressOutcome {
    state: UserAchievementState {
      progress,
      unlocked,
      last_updated: Utc::now(),
    },
    newly_unlocked,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn def(id: &str, kind: &str, target: i64) -> AchievementDefinition {
    AchievementDefinition {
      id: id.to_string(),
      title: id.to_string(),
      description: String::new(),
      kind: AchievementKind::from_str(kind),
      target,
      icon: "trophy".to_string(),
      gradient: None,
    }
  }

  fn scores_word_match(points: i64) -> ScoreRecord {
    ScoreRecord {
      word_match: points,
      ..Default::default()
    }
  }

  #[test]
  fn test_reconcile_scenario_total_unlocks_per_game_does_not() {
    // 500 word-match points: 50 total questions, 50 word-match questions
    let definitions = vec![def("total_50", "total", 50), def("wordMatch_100", "wordMatch", 100)];
    let prior = UserAchievementState::default();

    let outcome = reconcile(&definitions, &prior, &scores_word_match(500));

    assert_eq!(outcome.state.progress_for("total_50"), 50);
    assert_eq!(outcome.state.progress_for("wordMatch_100"), 50);
    assert_eq!(outcome.newly_unlocked, vec!["total_50".to_string()]);
    assert!(outcome.state.is_unlocked("total_50"));
    assert!(!outcome.state.is_unlocked("wordMatch_100"));
  }

  #[test]
  fn test_threshold_exact_boundary() {
    let definitions = vec![def("total_50", "total", 50)];
    let prior = UserAchievementState::default();

    // Exactly 10*T points unlocks
    let at = reconcile(&definitions, &prior, &scores_word_match(500));
    assert!(at.state.is_unlocked("total_50"));

    // One question short does not
    let below = reconcile(&definitions, &prior, &scores_word_match(490));
    assert!(!below.state.is_unlocked("total_50"));
    assert!(below.newly_unlocked.is_empty());
  }

  #[test]
  fn test_reconcile_is_idempotent() {
    let definitions = vec![
      def("total_50", "total", 50),
      def("total_score_1000", "total_score", 1000),
      def("translation_100", "translation", 100),
    ];
    let scores = ScoreRecord {
      word_match: 500,
      translation: 320,
      ..Default::default()
    };

    let first = reconcile(&definitions, &UserAchievementState::default(), &scores);
    let second = reconcile(&definitions, &first.state, &scores);

    assert_eq!(second.state.progress, first.state.progress);
    assert_eq!(second.state.unlocked, first.state.unlocked);
    assert!(second.newly_unlocked.is_empty());
  }

  #[test]
  fn test_unlocks_are_monotonic() {
    let definitions = vec![def("total_score_100", "total_score", 100)];
    let mut prior = UserAchievementState::default();
    prior.unlocked.push("total_score_100".to_string());
    prior.progress.insert("total_score_100".to_string(), 150);

    // Score dropped below target (cannot happen in production, but the
    // unlock must survive regardless)
    let outcome = reconcile(&definitions, &prior, &scores_word_match(0));
    assert!(outcome.state.is_unlocked("total_score_100"));
    assert_eq!(outcome.state.progress_for("total_score_100"), 0);
    assert!(outcome.newly_unlocked.is_empty());
  }

  #[test]
  fn test_apply_event_per_game_isolation() {
    let definitions = vec![
      def("translation_100", "translation", 100),
      def("wordMatch_100", "wordMatch", 100),
    ];
    let mut prior = UserAchievementState::default();
    prior.progress.insert("translation_100".to_string(), 7);
    prior.progress.insert("wordMatch_100".to_string(), 3);

    let outcome = apply_event(&definitions, &prior, GameKind::Translation, 110);

    assert_eq!(outcome.state.progress_for("translation_100"), 8);
    // Untouched by a translation event
    assert_eq!(outcome.state.progress_for("wordMatch_100"), 3);
  }

  #[test]
  fn test_apply_event_replaces_total_kinds() {
    let definitions = vec![
      def("total_score_500", "total_score", 500),
      def("total_50", "total", 50),
    ];
    let mut prior = UserAchievementState::default();
    prior.progress.insert("total_score_500".to_string(), 120);
    prior.progress.insert("total_50".to_string(), 12);

    let outcome = apply_event(&definitions, &prior, GameKind::FillBlank, 340);

    assert_eq!(outcome.state.progress_for("total_score_500"), 340);
    assert_eq!(outcome.state.progress_for("total_50"), 34);
  }

  #[test]
  fn test_apply_event_unlock_then_no_repeat() {
    let definitions = vec![def("audioListen_50", "audioListen", 50)];
    let mut prior = UserAchievementState::default();
    prior.progress.insert("audioListen_50".to_string(), 49);

    let first = apply_event(&definitions, &prior, GameKind::AudioListen, 500);
    assert_eq!(first.state.progress_for("audioListen_50"), 50);
    assert_eq!(first.newly_unlocked, vec!["audioListen_50".to_string()]);

    let second = apply_event(&definitions, &first.state, GameKind::AudioListen, 510);
    assert_eq!(second.state.progress_for("audioListen_50"), 51);
    assert!(second.newly_unlocked.is_empty());
    assert!(second.state.is_unlocked("audioListen_50"));
  }

  #[test]
  fn test_unknown_kind_never_progresses_or_unlocks() {
    let definitions = vec![def("mystery_1", "not_a_kind", 1)];
    let prior = UserAchievementState::default();

    let reconciled = reconcile(&definitions, &prior, &scores_word_match(10_000));
    assert_eq!(reconciled.state.progress_for("mystery_1"), 0);
    assert!(reconciled.newly_unlocked.is_empty());

    let event = apply_event(&definitions, &prior, GameKind::WordMatch, 10_000);
    assert_eq!(event.state.progress_for("mystery_1"), 0);
    assert!(event.newly_unlocked.is_empty());
  }

  #[test]
  fn test_unknown_kind_stale_value_never_unlocks() {
    // An admin fixing a kind tag later should not be pre-empted by a
    // stale stored value unlocking the old entry
    let definitions = vec![def("mystery_1", "not_a_kind", 1)];
    let mut prior = UserAchievementState::default();
    prior.progress.insert("mystery_1".to_string(), 999);

    let outcome = apply_event(&definitions, &prior, GameKind::WordMatch, 10);
    assert!(!outcome.state.is_unlocked("mystery_1"));
    assert!(outcome.newly_unlocked.is_empty());
  }

  #[test]
  fn test_missing_score_dimensions_treated_as_zero() {
    let definitions = vec![
      def("fillBlank_10", "fillBlank", 10),
      def("letterScramble_10", "letterScramble", 10),
    ];
    let outcome = reconcile(
      &definitions,
      &UserAchievementState::default(),
      &scores_word_match(300),
    );
    assert_eq!(outcome.state.progress_for("fillBlank_10"), 0);
    assert_eq!(outcome.state.progress_for("letterScramble_10"), 0);
    assert!(outcome.newly_unlocked.is_empty());
  }
}
