//! The two tracker procedures: the incremental updater invoked after
//! every correct answer and the full reconciler invoked by the
//! achievements page.
//!
//! Both read-merge-write the per-user state document while the caller
//! holds the connection lock, so two invocations can never interleave
//! their read and write phases in-process.

use rusqlite::Connection;
use std::collections::BTreeMap;

use crate::db::{achievements as store, scores};
use crate::domain::GameKind;

use super::progress;

/// Result of a full reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
  pub total_score: i64,
  pub unlocked_count: usize,
  pub progress: BTreeMap<String, i64>,
  /// Ids unlocked by this reconciliation (final set minus prior set)
  pub newly_unlocked: Vec<String>,
}

/// Merge one score-earning event into the user's achievement state and
/// return the ids of badges that just unlocked.
///
/// `points_delta` is the award that triggered the call; the threshold
/// math works from `new_total_score` (the caller's post-award sum across
/// all games), so the delta is informational. Any storage failure
/// degrades to an empty result; the score update itself has already
/// been persisted by the caller and must not be disturbed.
pub fn update_progress(
  conn: &Connection,
  user_id: i64,
  game: GameKind,
  points_delta: i64,
  new_total_score: i64,
) -> Vec<String> {
  tracing::debug!(
    "Achievement update for user {}: +{} in {}, total {}",
    user_id,
    points_delta,
    game.as_str(),
    new_total_score
  );

  match try_update(conn, user_id, game, new_total_score) {
    Ok(newly_unlocked) => newly_unlocked,
    Err(e) => {
      tracing::warn!("Achievement update failed for user {}: {}", user_id, e);
      Vec::new()
    }
  }
}

fn try_update(
  conn: &Connection,
  user_id: i64,
  game: GameKind,
  new_total_score: i64,
) -> rusqlite::Result<Vec<String>> {
  let prior = store::get_user_state(conn, user_id)?.unwrap_or_default();
  let definitions = store::load_definitions(conn)?;

  let outcome = progress::apply_event(&definitions, &prior, game, new_total_score);
  store::put_user_state(conn, user_id, &outcome.state)?;

  Ok(outcome.newly_unlocked)
}

/// Re-derive the user's whole achievement state from their stored score
/// totals and persist it.
///
/// Returns `None` when the user has no score record yet (nothing to
/// reconcile) or when any read fails; idempotent when scores and
/// definitions are unchanged.
pub fn reconcile(conn: &Connection, user_id: i64) -> Option<ReconcileSummary> {
  match try_reconcile(conn, user_id) {
    Ok(summary) => summary,
    Err(e) => {
      tracing::warn!("Achievement reconciliation failed for user {}: {}", user_id, e);
      None
    }
  }
}

fn try_reconcile(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<ReconcileSummary>> {
  let Some(score_record) = scores::get_scores(conn, user_id)? else {
    tracing::debug!("No scores for user {}; skipping reconciliation", user_id);
    return Ok(None);
  };

  let definitions = store::load_definitions(conn)?;
  let prior = store::get_user_state(conn, user_id)?.unwrap_or_default();

  let outcome = progress::reconcile(&definitions, &prior, &score_record);
  store::put_user_state(conn, user_id, &outcome.state)?;

  Ok(Some(ReconcileSummary {
    total_score: score_record.total(),
    unlocked_count: outcome.state.unlocked.len(),
    progress: outcome.state.progress,
    newly_unlocked: outcome.newly_unlocked,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::achievements as store;
  use crate::db::scores::add_points;
  use crate::testing::TestEnv;

  fn seed_defs(env: &TestEnv) {
    store::seed_definitions(&env.conn).unwrap();
  }

  #[test]
  fn test_reconcile_without_scores_returns_none() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");

    assert_eq!(reconcile(&env.conn, user), None);
    // No state document should have been created either
    assert!(store::get_user_state(&env.conn, user).unwrap().is_none());
  }

  #[test]
  fn test_reconcile_scenario_from_scores() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");
    add_points(&env.conn, user, GameKind::WordMatch, 500).unwrap();

    let summary = reconcile(&env.conn, user).unwrap();
    assert_eq!(summary.total_score, 500);
    // total_50 unlocks at 50 questions; wordMatch_100 sits at 50/100
    assert!(summary.newly_unlocked.contains(&"total_50".to_string()));
    assert!(!summary.newly_unlocked.contains(&"wordMatch_100".to_string()));
    assert_eq!(summary.progress.get("wordMatch_100"), Some(&50));

    let state = store::get_user_state(&env.conn, user).unwrap().unwrap();
    assert!(state.is_unlocked("total_50"));
  }

  #[test]
  fn test_reconcile_twice_reports_no_new_unlocks() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");
    add_points(&env.conn, user, GameKind::Translation, 1000).unwrap();

    let first = reconcile(&env.conn, user).unwrap();
    assert!(!first.newly_unlocked.is_empty());

    let second = reconcile(&env.conn, user).unwrap();
    assert!(second.newly_unlocked.is_empty());
    assert_eq!(second.progress, first.progress);
    assert_eq!(second.unlocked_count, first.unlocked_count);
  }

  #[test]
  fn test_reconcile_heals_drifted_progress() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");
    add_points(&env.conn, user, GameKind::AudioListen, 200).unwrap();

    // Simulate drift from a missed incremental update
    let mut state = store::get_user_state(&env.conn, user)
      .unwrap()
      .unwrap_or_default();
    state.progress.insert("audioListen_50".to_string(), 3);
    store::put_user_state(&env.conn, user, &state).unwrap();

    let summary = reconcile(&env.conn, user).unwrap();
    assert_eq!(summary.progress.get("audioListen_50"), Some(&20));
  }

  #[test]
  fn test_update_progress_increments_and_unlocks() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");

    // Walk audioListen_50 up to its threshold
    let mut state = crate::domain::UserAchievementState::default();
    state.progress.insert("audioListen_50".to_string(), 49);
    store::put_user_state(&env.conn, user, &state).unwrap();

    let unlocked = update_progress(&env.conn, user, GameKind::AudioListen, 10, 500);
    assert_eq!(unlocked, vec!["audioListen_50".to_string()]);

    // Next event increments past the target without re-reporting
    let unlocked = update_progress(&env.conn, user, GameKind::AudioListen, 10, 510);
    assert!(unlocked.is_empty());
    let state = store::get_user_state(&env.conn, user).unwrap().unwrap();
    assert_eq!(state.progress_for("audioListen_50"), 51);
  }

  #[test]
  fn test_update_progress_first_event_creates_state() {
    let env = TestEnv::new().unwrap();
    seed_defs(&env);
    let user = env.create_user("player");

    let unlocked = update_progress(&env.conn, user, GameKind::Translation, 10, 10);
    assert!(unlocked.is_empty());

    let state = store::get_user_state(&env.conn, user).unwrap().unwrap();
    assert_eq!(state.progress_for("translation_100"), 1);
    assert_eq!(state.progress_for("total_50"), 1);
  }
}
