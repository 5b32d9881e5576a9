//! Achievement definitions and per-user achievement state.
//!
//! Definitions are admin-managed reference data. The per-user state row
//! mirrors a document store: `progress` and `unlocked` are JSON columns
//! replaced whole on every write.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::collections::BTreeMap;

use crate::domain::{AchievementDefinition, AchievementKind, UserAchievementState};

fn row_to_definition(row: &rusqlite::Row) -> Result<AchievementDefinition> {
  let kind_str: String = row.get(3)?;
  Ok(AchievementDefinition {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    kind: AchievementKind::from_str(&kind_str),
    target: row.get(4)?,
    icon: row.get(5)?,
    gradient: row.get(6)?,
  })
}

/// Load every achievement definition, warning once per definition whose
/// kind tag is not recognized (those compute zero progress forever).
pub fn load_definitions(conn: &Connection) -> Result<Vec<AchievementDefinition>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, title, description, kind, target, icon, gradient
    FROM achievements
    ORDER BY target ASC
    "#,
  )?;
  let definitions = stmt
    .query_map([], row_to_definition)?
    .collect::<Result<Vec<_>>>()?;

  for def in &definitions {
    if !def.kind.is_known() {
      tracing::warn!(
        "Achievement '{}' has unrecognized kind '{}'; it will never unlock",
        def.id,
        def.kind.as_str()
      );
    }
  }

  Ok(definitions)
}

pub fn get_definition(conn: &Connection, id: &str) -> Result<Option<AchievementDefinition>> {
  conn
    .query_row(
      r#"
      SELECT id, title, description, kind, target, icon, gradient
      FROM achievements WHERE id = ?1
      "#,
      params![id],
      row_to_definition,
    )
    .optional()
}

pub fn upsert_definition(conn: &Connection, def: &AchievementDefinition) -> Result<()> {
  conn.execute(
    r#"
    INSERT OR REPLACE INTO achievements (id, title, description, kind, target, icon, gradient)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
    params![
      def.id,
      def.title,
      def.description,
      def.kind.as_str(),
      def.target,
      def.icon,
      def.gradient,
    ],
  )?;
  Ok(())
}

pub fn delete_definition(conn: &Connection, id: &str) -> Result<()> {
  conn.execute("DELETE FROM achievements WHERE id = ?1", params![id])?;
  Ok(())
}

pub fn definition_count(conn: &Connection) -> Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM achievements", [], |row| row.get(0))
}

/// Seed the stock badge set if the table is empty (idempotent).
/// Ids follow the `<kind>_<target>` convention so they stay readable.
pub fn seed_definitions(conn: &Connection) -> Result<()> {
  if definition_count(conn)? > 0 {
    return Ok(());
  }

  let stock: [(&str, &str, &str, i64, &str, Option<&str>); 8] = [
    (
      "Beginner",
      "Answer 50 questions in any game",
      "total",
      50,
      "trophy",
      Some("from-yellow-400 to-orange-500"),
    ),
    (
      "Language Lover",
      "Answer 100 questions",
      "total",
      100,
      "star",
      Some("from-purple-400 to-pink-500"),
    ),
    (
      "Advanced",
      "Answer 150 questions",
      "total",
      150,
      "target",
      Some("from-blue-400 to-cyan-500"),
    ),
    (
      "Legend",
      "Answer 300 questions",
      "total",
      300,
      "crown",
      Some("from-red-500 to-rose-600"),
    ),
    (
      "Translation Expert",
      "Answer 100 translation questions",
      "translation",
      100,
      "award",
      None,
    ),
    (
      "Translation King",
      "Answer 200 translation questions",
      "translation",
      200,
      "crown",
      None,
    ),
    (
      "Word Match Pro",
      "Complete 100 matching exercises",
      "wordMatch",
      100,
      "zap",
      None,
    ),
    (
      "Golden Ear",
      "Complete 50 listening exercises",
      "audioListen",
      50,
      "medal",
      None,
    ),
  ];

  for (title, description, kind, target, icon, gradient) in stock {
    let def = AchievementDefinition {
      id: format!("{}_{}", kind, target),
      title: title.to_string(),
      description: description.to_string(),
      kind: AchievementKind::from_str(kind),
      target,
      icon: icon.to_string(),
      gradient: gradient.map(|g| g.to_string()),
    };
    upsert_definition(conn, &def)?;
  }

  tracing::info!("Seeded {} stock achievements", stock.len());
  Ok(())
}

/// Read a user's achievement state. `None` if they have none yet.
pub fn get_user_state(conn: &Connection, user_id: i64) -> Result<Option<UserAchievementState>> {
  let row: Option<(String, String, String)> = conn
    .query_row(
      "SELECT progress, unlocked, last_updated FROM user_achievements WHERE user_id = ?1",
      params![user_id],
      |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()?;

  let Some((progress_json, unlocked_json, last_updated)) = row else {
    return Ok(None);
  };

  // Treat a malformed document as absent rather than failing the caller
  let progress: BTreeMap<String, i64> =
    serde_json::from_str(&progress_json).unwrap_or_else(|e| {
      tracing::warn!("Corrupt progress document for user {}: {}", user_id, e);
      BTreeMap::new()
    });
  let unlocked: Vec<String> = serde_json::from_str(&unlocked_json).unwrap_or_else(|e| {
    tracing::warn!("Corrupt unlocked document for user {}: {}", user_id, e);
    Vec::new()
  });

  Ok(Some(UserAchievementState {
    progress,
    unlocked,
    last_updated: DateTime::parse_from_rfc3339(&last_updated)
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or_else(|_| Utc::now()),
  }))
}

/// Replace a user's achievement state document
pub fn put_user_state(
  conn: &Connection,
  user_id: i64,
  state: &UserAchievementState,
) -> Result<()> {
  let progress_json = serde_json::to_string(&state.progress)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
  let unlocked_json = serde_json::to_string(&state.unlocked)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

  conn.execute(
    r#"
    INSERT OR REPLACE INTO user_achievements (user_id, progress, unlocked, last_updated)
    VALUES (?1, ?2, ?3, ?4)
    "#,
    params![
      user_id,
      progress_json,
      unlocked_json,
      state.last_updated.to_rfc3339(),
    ],
  )?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_seed_is_idempotent() {
    let env = TestEnv::new().unwrap();
    seed_definitions(&env.conn).unwrap();
    let first = definition_count(&env.conn).unwrap();
    assert!(first > 0);

    seed_definitions(&env.conn).unwrap();
    assert_eq!(definition_count(&env.conn).unwrap(), first);
  }

  #[test]
  fn test_seed_ids_follow_convention() {
    let env = TestEnv::new().unwrap();
    seed_definitions(&env.conn).unwrap();

    let def = get_definition(&env.conn, "total_50").unwrap().unwrap();
    assert_eq!(def.kind, AchievementKind::TotalQuestions);
    assert_eq!(def.target, 50);

    let def = get_definition(&env.conn, "audioListen_50").unwrap().unwrap();
    assert_eq!(def.title, "Golden Ear");
  }

  #[test]
  fn test_unknown_kind_survives_roundtrip() {
    let env = TestEnv::new().unwrap();
    let def = AchievementDefinition {
      id: "mystery_10".to_string(),
      title: "Mystery".to_string(),
      description: "Typo'd by an admin".to_string(),
      kind: AchievementKind::from_str("wordmatch"),
      target: 10,
      icon: "star".to_string(),
      gradient: None,
    };
    upsert_definition(&env.conn, &def).unwrap();

    let loaded = load_definitions(&env.conn).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].kind, AchievementKind::Unknown("wordmatch".to_string()));
  }

  #[test]
  fn test_user_state_roundtrip() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("player");

    assert!(get_user_state(&env.conn, user).unwrap().is_none());

    let mut state = UserAchievementState::default();
    state.progress.insert("total_50".to_string(), 12);
    state.unlocked.push("wordMatch_100".to_string());
    put_user_state(&env.conn, user, &state).unwrap();

    let loaded = get_user_state(&env.conn, user).unwrap().unwrap();
    assert_eq!(loaded.progress_for("total_50"), 12);
    assert!(loaded.is_unlocked("wordMatch_100"));
  }

  #[test]
  fn test_corrupt_state_treated_as_empty() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("player");
    env
      .conn
      .execute(
        "INSERT INTO user_achievements (user_id, progress, unlocked, last_updated)
         VALUES (?1, 'not json', 'also not', '2024-01-01T00:00:00Z')",
        params![user],
      )
      .unwrap();

    let loaded = get_user_state(&env.conn, user).unwrap().unwrap();
    assert!(loaded.progress.is_empty());
    assert!(loaded.unlocked.is_empty());
  }
}
