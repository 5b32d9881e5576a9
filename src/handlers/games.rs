//! Game play: serve a question, grade an answer, award points, and run
//! the achievement updater.

use askama::Template;
use axum::{
  extract::{Path, State},
  response::{Html, IntoResponse, Redirect, Response},
  Form,
};
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::achievements::{self, AchievementToast};
use crate::auth::AuthContext;
use crate::config;
use crate::db::{achievements as achievement_store, questions, scores, LogOnError};
use crate::domain::GameKind;
use crate::state::AppState;
use crate::validation::answers_match;

/// What the player sees for one question
pub struct QuestionView {
  pub qid: i64,
  /// Word, sentence, or scrambled letters
  pub prompt: String,
  pub hint: Option<String>,
  /// Text the browser should speak aloud (listening game)
  pub speak: Option<String>,
  /// Choice buttons; empty means free-text input
  pub choices: Vec<String>,
}

#[derive(Template)]
#[template(path = "game.html")]
pub struct GameTemplate {
  pub username: String,
  pub is_admin: bool,
  pub title: &'static str,
  pub slug: &'static str,
  pub blurb: &'static str,
  pub question: Option<QuestionView>,
}

#[derive(Template)]
#[template(path = "game_result.html")]
pub struct GameResultTemplate {
  pub username: String,
  pub is_admin: bool,
  pub title: &'static str,
  pub slug: &'static str,
  pub correct: bool,
  pub correct_answer: String,
  pub points_awarded: i64,
  pub total_score: i64,
  pub toasts: Vec<AchievementToast>,
}

#[derive(Deserialize)]
pub struct AnswerForm {
  pub qid: i64,
  pub answer: String,
}

fn shuffle_choices(correct: &str, mut distractors: Vec<String>) -> Vec<String> {
  distractors.push(correct.to_string());
  distractors.shuffle(&mut rand::rng());
  distractors
}

fn scramble(word: &str) -> String {
  let mut letters: Vec<char> = word.chars().collect();
  if letters.len() < 2 {
    return word.to_string();
  }
  let mut rng = rand::rng();
  // A shuffle can reproduce the original order; retry a few times
  for _ in 0..8 {
    letters.shuffle(&mut rng);
    if letters.iter().collect::<String>() != word {
      break;
    }
  }
  letters.iter().collect()
}

fn build_question(conn: &rusqlite::Connection, kind: GameKind) -> Option<QuestionView> {
  match kind {
    GameKind::WordMatch => {
      let pair = questions::random_word_pair(conn)
        .log_warn("Failed to load word pair")
        .flatten()?;
      let distractors = questions::random_arabic_distractors(conn, pair.id, 3)
        .log_warn_default("Failed to load distractors");
      Some(QuestionView {
        qid: pair.id,
        prompt: pair.english.clone(),
        hint: None,
        speak: None,
        choices: shuffle_choices(&pair.arabic, distractors),
      })
    }
    GameKind::FillBlank => {
      let q = questions::random_fill_blank(conn)
        .log_warn("Failed to load fill-blank question")
        .flatten()?;
      let mut choices = q.options.clone();
      choices.shuffle(&mut rand::rng());
      Some(QuestionView {
        qid: q.id,
        prompt: q.sentence.clone(),
        hint: None,
        speak: None,
        choices,
      })
    }
    GameKind::Translation => {
      let q = questions::random_translation(conn)
        .log_warn("Failed to load translation question")
        .flatten()?;
      let mut choices = q.options.clone();
      choices.shuffle(&mut rand::rng());
      Some(QuestionView {
        qid: q.id,
        prompt: q.word.clone(),
        hint: None,
        speak: None,
        choices,
      })
    }
    GameKind::LetterScramble => {
      let q = questions::random_letter_scramble(conn)
        .log_warn("Failed to load scramble question")
        .flatten()?;
      Some(QuestionView {
        qid: q.id,
        prompt: scramble(&q.word),
        hint: Some(q.hint.clone()),
        speak: None,
        choices: Vec::new(),
      })
    }
    GameKind::AudioListen => {
      let q = questions::random_audio_word(conn)
        .log_warn("Failed to load audio word")
        .flatten()?;
      Some(QuestionView {
        qid: q.id,
        prompt: "Listen and type the word you hear".to_string(),
        hint: None,
        speak: Some(q.english.clone()),
        choices: Vec::new(),
      })
    }
  }
}

/// GET /games/{game} - Show one question
pub async fn game_page(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(slug): Path<String>,
) -> Response {
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/").into_response();
  };

  let question = match state.db.lock() {
    Ok(conn) => build_question(&conn, info.kind),
    Err(_) => None,
  };

  let template = GameTemplate {
    username: auth.username,
    is_admin: auth.is_admin,
    title: info.title,
    slug: info.slug,
    blurb: info.blurb,
    question,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

/// Grade an answer against the stored question.
/// Returns (correct, display form of the right answer), or None when the
/// question no longer exists.
fn grade(
  conn: &rusqlite::Connection,
  kind: GameKind,
  qid: i64,
  answer: &str,
) -> rusqlite::Result<Option<(bool, String)>> {
  Ok(match kind {
    GameKind::WordMatch => questions::get_word_pair(conn, qid)?
      .map(|pair| (answer == pair.arabic, pair.arabic)),
    GameKind::FillBlank => questions::get_fill_blank(conn, qid)?
      .map(|q| (answer == q.answer, q.answer)),
    GameKind::Translation => questions::get_translation(conn, qid)?
      .map(|q| (answer == q.correct, q.correct)),
    GameKind::LetterScramble => questions::get_letter_scramble(conn, qid)?
      .map(|q| (answers_match(&q.word, answer), q.word)),
    GameKind::AudioListen => questions::get_audio_word(conn, qid)?
      .map(|q| (answers_match(&q.english, answer), q.english)),
  })
}

/// POST /games/{game}/answer - Grade, score, and report unlocks.
///
/// A correct answer awards points first, then feeds the achievement
/// updater; tracker failures never undo the score.
pub async fn submit_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(slug): Path<String>,
  Form(form): Form<AnswerForm>,
) -> Response {
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/").into_response();
  };

  let conn = match state.db.lock() {
    Ok(conn) => conn,
    Err(_) => return Redirect::to("/").into_response(),
  };

  let graded = grade(&conn, info.kind, form.qid, &form.answer)
    .log_warn("Failed to grade answer")
    .flatten();
  let Some((correct, correct_answer)) = graded else {
    // Question was deleted under us; just deal a fresh one
    drop(conn);
    return Redirect::to(&format!("/games/{}", info.slug)).into_response();
  };

  let (points_awarded, total_score, toasts) = if correct {
    match scores::add_points(&conn, auth.user_id, info.kind, config::POINTS_PER_QUESTION) {
      Ok(record) => {
        let newly_unlocked = achievements::update_progress(
          &conn,
          auth.user_id,
          info.kind,
          config::POINTS_PER_QUESTION,
          record.total(),
        );
        let toasts = if newly_unlocked.is_empty() {
          Vec::new()
        } else {
          let definitions = achievement_store::load_definitions(&conn)
            .log_warn_default("Failed to load definitions for toasts");
          achievements::toasts_for(&definitions, &newly_unlocked)
        };
        (config::POINTS_PER_QUESTION, record.total(), toasts)
      }
      Err(e) => {
        tracing::warn!("Failed to record score for user {}: {}", auth.user_id, e);
        (0, 0, Vec::new())
      }
    }
  } else {
    let total = scores::get_scores(&conn, auth.user_id)
      .log_warn("Failed to load scores")
      .flatten()
      .unwrap_or_default()
      .total();
    (0, total, Vec::new())
  };

  let template = GameResultTemplate {
    username: auth.username,
    is_admin: auth.is_admin,
    title: info.title,
    slug: info.slug,
    correct,
    correct_answer,
    points_awarded,
    total_score,
    toasts,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_scramble_permutes_long_words() {
    let word = "SCRAMBLE";
    let scrambled = scramble(word);
    assert_ne!(scrambled, word);

    let mut expected: Vec<char> = word.chars().collect();
    let mut got: Vec<char> = scrambled.chars().collect();
    expected.sort();
    got.sort();
    assert_eq!(got, expected);
  }

  #[test]
  fn test_scramble_leaves_single_letter() {
    assert_eq!(scramble("A"), "A");
  }

  #[test]
  fn test_shuffle_choices_contains_correct() {
    let choices = shuffle_choices("right", vec!["a".to_string(), "b".to_string()]);
    assert_eq!(choices.len(), 3);
    assert!(choices.contains(&"right".to_string()));
  }

  #[test]
  fn test_grade_word_match() {
    let env = TestEnv::new().unwrap();
    let id = questions::insert_word_pair(&env.conn, "Apple", "تفاحة", 1).unwrap();

    let (correct, display) = grade(&env.conn, GameKind::WordMatch, id, "تفاحة")
      .unwrap()
      .unwrap();
    assert!(correct);
    assert_eq!(display, "تفاحة");

    let (correct, _) = grade(&env.conn, GameKind::WordMatch, id, "كتاب")
      .unwrap()
      .unwrap();
    assert!(!correct);
  }

  #[test]
  fn test_grade_free_text_is_lenient() {
    let env = TestEnv::new().unwrap();
    let id = questions::insert_audio_word(&env.conn, "Morning", "صباح", 1).unwrap();

    let (correct, _) = grade(&env.conn, GameKind::AudioListen, id, "  morning ")
      .unwrap()
      .unwrap();
    assert!(correct);
  }

  #[test]
  fn test_grade_missing_question() {
    let env = TestEnv::new().unwrap();
    assert!(grade(&env.conn, GameKind::Translation, 999, "x").unwrap().is_none());
  }

  #[test]
  fn test_build_question_none_on_empty_bank() {
    let env = TestEnv::new().unwrap();
    assert!(build_question(&env.conn, GameKind::FillBlank).is_none());
  }

  #[test]
  fn test_build_question_word_match_has_four_choices() {
    let env = TestEnv::new().unwrap();
    questions::seed_starter_questions(&env.conn).unwrap();

    let q = build_question(&env.conn, GameKind::WordMatch).unwrap();
    assert_eq!(q.choices.len(), 4);
    assert!(q.speak.is_none());
  }
}
