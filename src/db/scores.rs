//! Per-user score totals.
//!
//! The tracker never touches this table on the incremental path; only the
//! answer handlers (write) and the reconciler (read) do.

use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{GameKind, ScoreRecord};

fn column_for(game: GameKind) -> &'static str {
  match game {
    GameKind::WordMatch => "word_match",
    GameKind::FillBlank => "fill_blank",
    GameKind::Translation => "translation",
    GameKind::LetterScramble => "letter_scramble",
    GameKind::AudioListen => "audio_listen",
  }
}

/// Read a user's score record. `None` until their first score event.
pub fn get_scores(conn: &Connection, user_id: i64) -> Result<Option<ScoreRecord>> {
  conn
    .query_row(
      r#"
      SELECT word_match, fill_blank, translation, letter_scramble, audio_listen
      FROM scores WHERE user_id = ?1
      "#,
      params![user_id],
      |row| {
        Ok(ScoreRecord {
          word_match: row.get(0)?,
          fill_blank: row.get(1)?,
          translation: row.get(2)?,
          letter_scramble: row.get(3)?,
          audio_listen: row.get(4)?,
        })
      },
    )
    .optional()
}

/// Add points to one game's total, creating the all-zero row on first
/// use. Returns the updated record.
pub fn add_points(
  conn: &Connection,
  user_id: i64,
  game: GameKind,
  points: i64,
) -> Result<ScoreRecord> {
  conn.execute(
    "INSERT OR IGNORE INTO scores (user_id) VALUES (?1)",
    params![user_id],
  )?;
  conn.execute(
    &format!(
      "UPDATE scores SET {col} = {col} + ?1 WHERE user_id = ?2",
      col = column_for(game)
    ),
    params![points, user_id],
  )?;
  get_scores(conn, user_id).map(|record| record.unwrap_or_default())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_no_record_before_first_event() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("player");
    assert_eq!(get_scores(&env.conn, user).unwrap(), None);
  }

  #[test]
  fn test_add_points_creates_row() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("player");

    let record = add_points(&env.conn, user, GameKind::Translation, 10).unwrap();
    assert_eq!(record.translation, 10);
    assert_eq!(record.word_match, 0);
    assert_eq!(record.total(), 10);
  }

  #[test]
  fn test_add_points_accumulates_per_game() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("player");

    add_points(&env.conn, user, GameKind::WordMatch, 10).unwrap();
    add_points(&env.conn, user, GameKind::WordMatch, 10).unwrap();
    let record = add_points(&env.conn, user, GameKind::AudioListen, 10).unwrap();

    assert_eq!(record.word_match, 20);
    assert_eq!(record.audio_listen, 10);
    assert_eq!(record.total(), 30);
  }
}
