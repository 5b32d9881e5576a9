//! Question banks for the five games.
//!
//! One table per game, managed from the admin console. Option lists are
//! stored as JSON arrays in a text column. List queries take the admin
//! table's search term and page window.

use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{
  AudioWord, FillBlankQuestion, GameKind, LetterScrambleQuestion, TranslationQuestion, WordPair,
};

fn options_to_json(options: &[String]) -> Result<String> {
  serde_json::to_string(options).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn options_from_json(json: &str) -> Vec<String> {
  serde_json::from_str(json).unwrap_or_else(|e| {
    tracing::warn!("Corrupt options list: {}", e);
    Vec::new()
  })
}

fn like_pattern(search: &str) -> String {
  format!("%{}%", search)
}

// ==================== Word Match ====================

fn row_to_word_pair(row: &rusqlite::Row) -> Result<WordPair> {
  Ok(WordPair {
    id: row.get(0)?,
    english: row.get(1)?,
    arabic: row.get(2)?,
    sort_order: row.get(3)?,
  })
}

pub fn list_word_pairs(
  conn: &Connection,
  search: &str,
  limit: i64,
  offset: i64,
) -> Result<Vec<WordPair>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, english, arabic, sort_order FROM word_match_questions
    WHERE english LIKE ?1 OR arabic LIKE ?1
    ORDER BY sort_order ASC, id ASC
    LIMIT ?2 OFFSET ?3
    "#,
  )?;
  stmt
    .query_map(params![like_pattern(search), limit, offset], row_to_word_pair)?
    .collect()
}

pub fn count_word_pairs(conn: &Connection, search: &str) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM word_match_questions WHERE english LIKE ?1 OR arabic LIKE ?1",
    params![like_pattern(search)],
    |row| row.get(0),
  )
}

pub fn insert_word_pair(conn: &Connection, english: &str, arabic: &str, sort_order: i64) -> Result<i64> {
  conn.execute(
    "INSERT INTO word_match_questions (english, arabic, sort_order) VALUES (?1, ?2, ?3)",
    params![english, arabic, sort_order],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_word_pair(
  conn: &Connection,
  id: i64,
  english: &str,
  arabic: &str,
  sort_order: i64,
) -> Result<()> {
  conn.execute(
    "UPDATE word_match_questions SET english = ?1, arabic = ?2, sort_order = ?3 WHERE id = ?4",
    params![english, arabic, sort_order, id],
  )?;
  Ok(())
}

pub fn get_word_pair(conn: &Connection, id: i64) -> Result<Option<WordPair>> {
  conn
    .query_row(
      "SELECT id, english, arabic, sort_order FROM word_match_questions WHERE id = ?1",
      params![id],
      row_to_word_pair,
    )
    .optional()
}

pub fn random_word_pair(conn: &Connection) -> Result<Option<WordPair>> {
  conn
    .query_row(
      "SELECT id, english, arabic, sort_order FROM word_match_questions ORDER BY RANDOM() LIMIT 1",
      [],
      row_to_word_pair,
    )
    .optional()
}

/// Distractor translations for a word-match round: other pairs' Arabic
/// sides, excluding the current pair.
pub fn random_arabic_distractors(conn: &Connection, exclude_id: i64, limit: i64) -> Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT arabic FROM word_match_questions WHERE id != ?1 ORDER BY RANDOM() LIMIT ?2",
  )?;
  stmt.query_map(params![exclude_id, limit], |row| row.get(0))?.collect()
}

// ==================== Fill in the Blank ====================

fn row_to_fill_blank(row: &rusqlite::Row) -> Result<FillBlankQuestion> {
  let options_json: String = row.get(3)?;
  Ok(FillBlankQuestion {
    id: row.get(0)?,
    sentence: row.get(1)?,
    answer: row.get(2)?,
    options: options_from_json(&options_json),
    sort_order: row.get(4)?,
  })
}

pub fn list_fill_blank(
  conn: &Connection,
  search: &str,
  limit: i64,
  offset: i64,
) -> Result<Vec<FillBlankQuestion>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, sentence, answer, options, sort_order FROM fill_blank_questions
    WHERE sentence LIKE ?1 OR answer LIKE ?1
    ORDER BY sort_order ASC, id ASC
    LIMIT ?2 OFFSET ?3
    "#,
  )?;
  stmt
    .query_map(params![like_pattern(search), limit, offset], row_to_fill_blank)?
    .collect()
}

pub fn count_fill_blank(conn: &Connection, search: &str) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM fill_blank_questions WHERE sentence LIKE ?1 OR answer LIKE ?1",
    params![like_pattern(search)],
    |row| row.get(0),
  )
}

pub fn insert_fill_blank(
  conn: &Connection,
  sentence: &str,
  answer: &str,
  options: &[String],
  sort_order: i64,
) -> Result<i64> {
  conn.execute(
    "INSERT INTO fill_blank_questions (sentence, answer, options, sort_order) VALUES (?1, ?2, ?3, ?4)",
    params![sentence, answer, options_to_json(options)?, sort_order],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_fill_blank(
  conn: &Connection,
  id: i64,
  sentence: &str,
  answer: &str,
  options: &[String],
  sort_order: i64,
) -> Result<()> {
  conn.execute(
    "UPDATE fill_blank_questions SET sentence = ?1, answer = ?2, options = ?3, sort_order = ?4 WHERE id = ?5",
    params![sentence, answer, options_to_json(options)?, sort_order, id],
  )?;
  Ok(())
}

pub fn get_fill_blank(conn: &Connection, id: i64) -> Result<Option<FillBlankQuestion>> {
  conn
    .query_row(
      "SELECT id, sentence, answer, options, sort_order FROM fill_blank_questions WHERE id = ?1",
      params![id],
      row_to_fill_blank,
    )
    .optional()
}

pub fn random_fill_blank(conn: &Connection) -> Result<Option<FillBlankQuestion>> {
  conn
    .query_row(
      "SELECT id, sentence, answer, options, sort_order FROM fill_blank_questions ORDER BY RANDOM() LIMIT 1",
      [],
      row_to_fill_blank,
    )
    .optional()
}

// ==================== Translation ====================

fn row_to_translation(row: &rusqlite::Row) -> Result<TranslationQuestion> {
  let options_json: String = row.get(3)?;
  Ok(TranslationQuestion {
    id: row.get(0)?,
    word: row.get(1)?,
    correct: row.get(2)?,
    options: options_from_json(&options_json),
    sort_order: row.get(4)?,
  })
}

pub fn list_translation(
  conn: &Connection,
  search: &str,
  limit: i64,
  offset: i64,
) -> Result<Vec<TranslationQuestion>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, word, correct, options, sort_order FROM translation_questions
    WHERE word LIKE ?1 OR correct LIKE ?1
    ORDER BY sort_order ASC, id ASC
    LIMIT ?2 OFFSET ?3
    "#,
  )?;
  stmt
    .query_map(params![like_pattern(search), limit, offset], row_to_translation)?
    .collect()
}

pub fn count_translation(conn: &Connection, search: &str) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM translation_questions WHERE word LIKE ?1 OR correct LIKE ?1",
    params![like_pattern(search)],
    |row| row.get(0),
  )
}

pub fn insert_translation(
  conn: &Connection,
  word: &str,
  correct: &str,
  options: &[String],
  sort_order: i64,
) -> Result<i64> {
  conn.execute(
    "INSERT INTO translation_questions (word, correct, options, sort_order) VALUES (?1, ?2, ?3, ?4)",
    params![word, correct, options_to_json(options)?, sort_order],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_translation(
  conn: &Connection,
  id: i64,
  word: &str,
  correct: &str,
  options: &[String],
  sort_order: i64,
) -> Result<()> {
  conn.execute(
    "UPDATE translation_questions SET word = ?1, correct = ?2, options = ?3, sort_order = ?4 WHERE id = ?5",
    params![word, correct, options_to_json(options)?, sort_order, id],
  )?;
  Ok(())
}

pub fn get_translation(conn: &Connection, id: i64) -> Result<Option<TranslationQuestion>> {
  conn
    .query_row(
      "SELECT id, word, correct, options, sort_order FROM translation_questions WHERE id = ?1",
      params![id],
      row_to_translation,
    )
    .optional()
}

pub fn random_translation(conn: &Connection) -> Result<Option<TranslationQuestion>> {
  conn
    .query_row(
      "SELECT id, word, correct, options, sort_order FROM translation_questions ORDER BY RANDOM() LIMIT 1",
      [],
      row_to_translation,
    )
    .optional()
}

// ==================== Letter Scramble ====================

fn row_to_scramble(row: &rusqlite::Row) -> Result<LetterScrambleQuestion> {
  Ok(LetterScrambleQuestion {
    id: row.get(0)?,
    word: row.get(1)?,
    hint: row.get(2)?,
    translation: row.get(3)?,
    sort_order: row.get(4)?,
  })
}

pub fn list_letter_scramble(
  conn: &Connection,
  search: &str,
  limit: i64,
  offset: i64,
) -> Result<Vec<LetterScrambleQuestion>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, word, hint, translation, sort_order FROM letter_scramble_questions
    WHERE word LIKE ?1 OR hint LIKE ?1
    ORDER BY sort_order ASC, id ASC
    LIMIT ?2 OFFSET ?3
    "#,
  )?;
  stmt
    .query_map(params![like_pattern(search), limit, offset], row_to_scramble)?
    .collect()
}

pub fn count_letter_scramble(conn: &Connection, search: &str) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM letter_scramble_questions WHERE word LIKE ?1 OR hint LIKE ?1",
    params![like_pattern(search)],
    |row| row.get(0),
  )
}

pub fn insert_letter_scramble(
  conn: &Connection,
  word: &str,
  hint: &str,
  translation: &str,
  sort_order: i64,
) -> Result<i64> {
  conn.execute(
    "INSERT INTO letter_scramble_questions (word, hint, translation, sort_order) VALUES (?1, ?2, ?3, ?4)",
    params![word, hint, translation, sort_order],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_letter_scramble(
  conn: &Connection,
  id: i64,
  word: &str,
  hint: &str,
  translation: &str,
  sort_order: i64,
) -> Result<()> {
  conn.execute(
    "UPDATE letter_scramble_questions SET word = ?1, hint = ?2, translation = ?3, sort_order = ?4 WHERE id = ?5",
    params![word, hint, translation, sort_order, id],
  )?;
  Ok(())
}

pub fn get_letter_scramble(conn: &Connection, id: i64) -> Result<Option<LetterScrambleQuestion>> {
  conn
    .query_row(
      "SELECT id, word, hint, translation, sort_order FROM letter_scramble_questions WHERE id = ?1",
      params![id],
      row_to_scramble,
    )
    .optional()
}

pub fn random_letter_scramble(conn: &Connection) -> Result<Option<LetterScrambleQuestion>> {
  conn
    .query_row(
      "SELECT id, word, hint, translation, sort_order FROM letter_scramble_questions ORDER BY RANDOM() LIMIT 1",
      [],
      row_to_scramble,
    )
    .optional()
}

// ==================== Listen & Type ====================

fn row_to_audio_word(row: &rusqlite::Row) -> Result<AudioWord> {
  Ok(AudioWord {
    id: row.get(0)?,
    english: row.get(1)?,
    arabic: row.get(2)?,
    sort_order: row.get(3)?,
  })
}

pub fn list_audio_words(
  conn: &Connection,
  search: &str,
  limit: i64,
  offset: i64,
) -> Result<Vec<AudioWord>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, english, arabic, sort_order FROM audio_words
    WHERE english LIKE ?1 OR arabic LIKE ?1
    ORDER BY sort_order ASC, id ASC
    LIMIT ?2 OFFSET ?3
    "#,
  )?;
  stmt
    .query_map(params![like_pattern(search), limit, offset], row_to_audio_word)?
    .collect()
}

pub fn count_audio_words(conn: &Connection, search: &str) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM audio_words WHERE english LIKE ?1 OR arabic LIKE ?1",
    params![like_pattern(search)],
    |row| row.get(0),
  )
}

pub fn insert_audio_word(conn: &Connection, english: &str, arabic: &str, sort_order: i64) -> Result<i64> {
  conn.execute(
    "INSERT INTO audio_words (english, arabic, sort_order) VALUES (?1, ?2, ?3)",
    params![english, arabic, sort_order],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_audio_word(
  conn: &Connection,
  id: i64,
  english: &str,
  arabic: &str,
  sort_order: i64,
) -> Result<()> {
  conn.execute(
    "UPDATE audio_words SET english = ?1, arabic = ?2, sort_order = ?3 WHERE id = ?4",
    params![english, arabic, sort_order, id],
  )?;
  Ok(())
}

pub fn get_audio_word(conn: &Connection, id: i64) -> Result<Option<AudioWord>> {
  conn
    .query_row(
      "SELECT id, english, arabic, sort_order FROM audio_words WHERE id = ?1",
      params![id],
      row_to_audio_word,
    )
    .optional()
}

pub fn random_audio_word(conn: &Connection) -> Result<Option<AudioWord>> {
  conn
    .query_row(
      "SELECT id, english, arabic, sort_order FROM audio_words ORDER BY RANDOM() LIMIT 1",
      [],
      row_to_audio_word,
    )
    .optional()
}

/// Question count for one game's bank (admin dashboard)
pub fn question_count(conn: &Connection, game: GameKind) -> Result<i64> {
  match game {
    GameKind::WordMatch => count_word_pairs(conn, ""),
    GameKind::FillBlank => count_fill_blank(conn, ""),
    GameKind::Translation => count_translation(conn, ""),
    GameKind::LetterScramble => count_letter_scramble(conn, ""),
    GameKind::AudioListen => count_audio_words(conn, ""),
  }
}

// ==================== Starter content ====================

/// Seed a small starter bank per game if all banks are empty (idempotent)
pub fn seed_starter_questions(conn: &Connection) -> Result<()> {
  let total: i64 = GameKind::ALL
    .iter()
    .map(|g| question_count(conn, *g).unwrap_or(0))
    .sum();
  if total > 0 {
    return Ok(());
  }

  let word_pairs = [
    ("Apple", "تفاحة"),
    ("Book", "كتاب"),
    ("Cat", "قطة"),
    ("Dog", "كلب"),
    ("House", "منزل"),
    ("Car", "سيارة"),
    ("Tree", "شجرة"),
    ("Water", "ماء"),
  ];
  for (i, (english, arabic)) in word_pairs.iter().enumerate() {
    insert_word_pair(conn, english, arabic, i as i64 + 1)?;
  }

  let fill_blanks: [(&str, &str, [&str; 3]); 8] = [
    ("I ___ a student.", "am", ["am", "is", "are"]),
    ("She ___ a teacher.", "is", ["am", "is", "are"]),
    ("They ___ happy.", "are", ["am", "is", "are"]),
    ("I ___ to school every day.", "go", ["go", "goes", "going"]),
    ("He ___ English very well.", "speaks", ["speak", "speaks", "speaking"]),
    ("We ___ a big house.", "have", ["have", "has", "having"]),
    ("The cat ___ on the table.", "is", ["am", "is", "are"]),
    ("I ___ my homework yesterday.", "did", ["do", "did", "does"]),
  ];
  for (i, (sentence, answer, options)) in fill_blanks.iter().enumerate() {
    let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    insert_fill_blank(conn, sentence, answer, &options, i as i64 + 1)?;
  }

  let translations: [(&str, &str, [&str; 4]); 6] = [
    ("Happy", "سعيد", ["سعيد", "حزين", "غاضب", "خائف"]),
    ("Beautiful", "جميل", ["قبيح", "جميل", "كبير", "صغير"]),
    ("Friend", "صديق", ["عدو", "أخ", "صديق", "جار"]),
    ("School", "مدرسة", ["مدرسة", "مستشفى", "متجر", "حديقة"]),
    ("Food", "طعام", ["ماء", "طعام", "هواء", "نار"]),
    ("Sun", "شمس", ["قمر", "نجم", "شمس", "سحاب"]),
  ];
  for (i, (word, correct, options)) in translations.iter().enumerate() {
    let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    insert_translation(conn, word, correct, &options, i as i64 + 1)?;
  }

  let scrambles = [
    ("APPLE", "A red or green fruit", "تفاحة"),
    ("HELLO", "A greeting", "مرحبا"),
    ("WATER", "A drink", "ماء"),
    ("BOOK", "You read it", "كتاب"),
    ("PHONE", "You call with it", "هاتف"),
    ("CHAIR", "You sit on it", "كرسي"),
    ("TABLE", "You eat on it", "طاولة"),
    ("HAPPY", "A feeling of joy", "سعيد"),
    ("MUSIC", "You listen to it", "موسيقى"),
    ("SMILE", "You do it when happy", "ابتسامة"),
  ];
  for (i, (word, hint, translation)) in scrambles.iter().enumerate() {
    insert_letter_scramble(conn, word, hint, translation, i as i64 + 1)?;
  }

  let audio_words = [
    ("Apple", "تفاحة"),
    ("Water", "ماء"),
    ("Hello", "مرحبا"),
    ("Friend", "صديق"),
    ("School", "مدرسة"),
    ("Morning", "صباح"),
  ];
  for (i, (english, arabic)) in audio_words.iter().enumerate() {
    insert_audio_word(conn, english, arabic, i as i64 + 1)?;
  }

  tracing::info!("Seeded starter question banks");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_insert_list_search() {
    let env = TestEnv::new().unwrap();
    insert_word_pair(&env.conn, "Apple", "تفاحة", 1).unwrap();
    insert_word_pair(&env.conn, "Book", "كتاب", 2).unwrap();

    let all = list_word_pairs(&env.conn, "", 10, 0).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].english, "Apple");

    let hits = list_word_pairs(&env.conn, "boo", 10, 0).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].english, "Book");
    assert_eq!(count_word_pairs(&env.conn, "boo").unwrap(), 1);
  }

  #[test]
  fn test_pagination_window() {
    let env = TestEnv::new().unwrap();
    for i in 0..15 {
      insert_audio_word(&env.conn, &format!("word{}", i), "كلمة", i).unwrap();
    }
    let page1 = list_audio_words(&env.conn, "", 10, 0).unwrap();
    let page2 = list_audio_words(&env.conn, "", 10, 10).unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 5);
    assert_ne!(page1[0].id, page2[0].id);
  }

  #[test]
  fn test_options_roundtrip() {
    let env = TestEnv::new().unwrap();
    let options = vec!["am".to_string(), "is".to_string(), "are".to_string()];
    let id = insert_fill_blank(&env.conn, "I ___ here.", "am", &options, 1).unwrap();

    let q = get_fill_blank(&env.conn, id).unwrap().unwrap();
    assert_eq!(q.options, options);
    assert_eq!(q.answer, "am");
  }

  #[test]
  fn test_update_and_delete() {
    let env = TestEnv::new().unwrap();
    let id = insert_word_pair(&env.conn, "Cat", "قطة", 1).unwrap();
    update_word_pair(&env.conn, id, "Cat", "قط", 2).unwrap();
    let q = get_word_pair(&env.conn, id).unwrap().unwrap();
    assert_eq!(q.arabic, "قط");
    assert_eq!(q.sort_order, 2);

    env
      .conn
      .execute("DELETE FROM word_match_questions WHERE id = ?1", params![id])
      .unwrap();
    assert!(get_word_pair(&env.conn, id).unwrap().is_none());
  }

  #[test]
  fn test_random_returns_none_when_empty() {
    let env = TestEnv::new().unwrap();
    assert!(random_translation(&env.conn).unwrap().is_none());
    assert!(random_word_pair(&env.conn).unwrap().is_none());
  }

  #[test]
  fn test_distractors_exclude_current() {
    let env = TestEnv::new().unwrap();
    let id = insert_word_pair(&env.conn, "Apple", "تفاحة", 1).unwrap();
    insert_word_pair(&env.conn, "Book", "كتاب", 2).unwrap();
    insert_word_pair(&env.conn, "Cat", "قطة", 3).unwrap();

    let distractors = random_arabic_distractors(&env.conn, id, 3).unwrap();
    assert_eq!(distractors.len(), 2);
    assert!(!distractors.contains(&"تفاحة".to_string()));
  }

  #[test]
  fn test_seed_starter_questions_idempotent() {
    let env = TestEnv::new().unwrap();
    seed_starter_questions(&env.conn).unwrap();
    let first = question_count(&env.conn, GameKind::WordMatch).unwrap();
    assert!(first > 0);

    seed_starter_questions(&env.conn).unwrap();
    assert_eq!(question_count(&env.conn, GameKind::WordMatch).unwrap(), first);
  }
}
