//! Admin console: question banks, achievement definitions, and users.
//!
//! Every handler checks the admin flag first and bounces non-admins to
//! the home page. Mutations redirect back to the listing, carrying any
//! error in the `err` query parameter.

use askama::Template;
use axum::{
  extract::{Path, Query, State},
  response::{Html, IntoResponse, Redirect, Response},
  Form,
};
use serde::Deserialize;

use crate::auth::{db as auth_db, AuthContext};
use crate::config;
use crate::filters;
use crate::db::{achievements as achievement_store, questions, LogOnError};
use crate::domain::{AchievementDefinition, AchievementKind, GameKind};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct ListParams {
  #[serde(default)]
  pub q: String,
  pub page: Option<i64>,
  pub err: Option<String>,
}

fn redirect_with_error(base: &str, message: &str) -> Response {
  Redirect::to(&format!("{}?err={}", base, urlencoding::encode(message))).into_response()
}

// ==================== Dashboard ====================

pub struct BankSummary {
  pub title: &'static str,
  pub slug: &'static str,
  pub count: i64,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
  pub username: String,
  pub is_admin: bool,
  pub banks: Vec<BankSummary>,
  pub achievement_count: i64,
  pub user_count: i64,
}

/// GET /admin - Content counts at a glance
pub async fn admin_dashboard(State(state): State<AppState>, auth: AuthContext) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }

  let (banks, achievement_count, user_count) = match state.db.lock() {
    Ok(conn) => {
      let banks = config::GAMES
        .iter()
        .map(|info| BankSummary {
          title: info.title,
          slug: info.slug,
          count: questions::question_count(&conn, info.kind)
            .log_warn_default("Failed to count questions"),
        })
        .collect();
      let achievements = achievement_store::definition_count(&conn)
        .log_warn_default("Failed to count achievements");
      let users = auth_db::get_user_count(&conn).log_warn_default("Failed to count users");
      (banks, achievements, users)
    }
    Err(_) => (Vec::new(), 0, 0),
  };

  let template = DashboardTemplate {
    username: auth.username,
    is_admin: true,
    banks,
    achievement_count,
    user_count,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

// ==================== Question banks ====================

/// Form field descriptor for one game's question shape; drives both the
/// add form and the inline row editors in the template.
pub struct FieldSpec {
  pub field: &'static str,
  pub label: &'static str,
}

const fn spec(field: &'static str, label: &'static str) -> FieldSpec {
  FieldSpec { field, label }
}

fn field_specs(kind: GameKind) -> Vec<FieldSpec> {
  match kind {
    GameKind::WordMatch | GameKind::AudioListen => vec![
      spec("english", "English"),
      spec("arabic", "Arabic"),
      spec("sort_order", "Order"),
    ],
    GameKind::FillBlank => vec![
      spec("sentence", "Sentence"),
      spec("answer", "Answer"),
      spec("options", "Options"),
      spec("sort_order", "Order"),
    ],
    GameKind::Translation => vec![
      spec("word", "Word"),
      spec("correct", "Correct"),
      spec("options", "Options"),
      spec("sort_order", "Order"),
    ],
    GameKind::LetterScramble => vec![
      spec("word", "Word"),
      spec("hint", "Hint"),
      spec("translation", "Translation"),
      spec("sort_order", "Order"),
    ],
  }
}

/// One editable cell: the form field it posts as, plus its value
pub struct QuestionCell {
  pub field: &'static str,
  pub value: String,
}

/// One row of the admin question table
pub struct QuestionRow {
  pub id: i64,
  pub cells: Vec<QuestionCell>,
}

fn row(id: i64, kind: GameKind, values: Vec<String>) -> QuestionRow {
  let cells = field_specs(kind)
    .into_iter()
    .zip(values)
    .map(|(spec, value)| QuestionCell {
      field: spec.field,
      value,
    })
    .collect();
  QuestionRow { id, cells }
}

#[derive(Template)]
#[template(path = "admin/questions.html")]
pub struct QuestionsTemplate {
  pub username: String,
  pub is_admin: bool,
  pub title: &'static str,
  pub slug: &'static str,
  pub fields: Vec<FieldSpec>,
  pub rows: Vec<QuestionRow>,
  pub search: String,
  pub page: i64,
  pub total_pages: i64,
  pub error: Option<String>,
}

fn join_options(options: &[String]) -> String {
  options.join(", ")
}

fn load_rows(
  conn: &rusqlite::Connection,
  kind: GameKind,
  search: &str,
  page: i64,
) -> rusqlite::Result<(Vec<QuestionRow>, i64)> {
  let limit = config::ADMIN_PAGE_SIZE;
  let offset = (page - 1) * limit;

  let (rows, total) = match kind {
    GameKind::WordMatch => (
      questions::list_word_pairs(conn, search, limit, offset)?
        .into_iter()
        .map(|q| row(q.id, kind, vec![q.english, q.arabic, q.sort_order.to_string()]))
        .collect::<Vec<_>>(),
      questions::count_word_pairs(conn, search)?,
    ),
    GameKind::FillBlank => (
      questions::list_fill_blank(conn, search, limit, offset)?
        .into_iter()
        .map(|q| {
          row(
            q.id,
            kind,
            vec![
              q.sentence,
              q.answer,
              join_options(&q.options),
              q.sort_order.to_string(),
            ],
          )
        })
        .collect(),
      questions::count_fill_blank(conn, search)?,
    ),
    GameKind::Translation => (
      questions::list_translation(conn, search, limit, offset)?
        .into_iter()
        .map(|q| {
          row(
            q.id,
            kind,
            vec![
              q.word,
              q.correct,
              join_options(&q.options),
              q.sort_order.to_string(),
            ],
          )
        })
        .collect(),
      questions::count_translation(conn, search)?,
    ),
    GameKind::LetterScramble => (
      questions::list_letter_scramble(conn, search, limit, offset)?
        .into_iter()
        .map(|q| {
          row(
            q.id,
            kind,
            vec![q.word, q.hint, q.translation, q.sort_order.to_string()],
          )
        })
        .collect(),
      questions::count_letter_scramble(conn, search)?,
    ),
    GameKind::AudioListen => (
      questions::list_audio_words(conn, search, limit, offset)?
        .into_iter()
        .map(|q| row(q.id, kind, vec![q.english, q.arabic, q.sort_order.to_string()]))
        .collect(),
      questions::count_audio_words(conn, search)?,
    ),
  };

  let total_pages = (total + limit - 1) / limit;
  Ok((rows, total_pages.max(1)))
}

/// GET /admin/questions/{game} - Paged, searchable question table
pub async fn manage_questions(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(slug): Path<String>,
  Query(params): Query<ListParams>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/admin").into_response();
  };

  let page = params.page.unwrap_or(1).max(1);
  let (rows, total_pages) = match state.db.lock() {
    Ok(conn) => load_rows(&conn, info.kind, &params.q, page)
      .log_warn("Failed to load question bank")
      .unwrap_or((Vec::new(), 1)),
    Err(_) => (Vec::new(), 1),
  };

  let template = QuestionsTemplate {
    username: auth.username,
    is_admin: true,
    title: info.title,
    slug: info.slug,
    fields: field_specs(info.kind),
    rows,
    search: params.q,
    page,
    total_pages,
    error: params.err,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

/// Add/edit form covering every game's fields; the game decides which
/// ones are required.
#[derive(Deserialize, Default)]
pub struct QuestionForm {
  #[serde(default)]
  pub english: String,
  #[serde(default)]
  pub arabic: String,
  #[serde(default)]
  pub sentence: String,
  #[serde(default)]
  pub answer: String,
  /// Comma-separated option list
  #[serde(default)]
  pub options: String,
  #[serde(default)]
  pub word: String,
  #[serde(default)]
  pub correct: String,
  #[serde(default)]
  pub hint: String,
  #[serde(default)]
  pub translation: String,
  pub sort_order: Option<i64>,
}

fn parse_options(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect()
}

/// Validate the form for one game and run `insert` or `update`
fn save_question(
  conn: &rusqlite::Connection,
  kind: GameKind,
  id: Option<i64>,
  form: &QuestionForm,
) -> Result<(), String> {
  let sort_order = form.sort_order.unwrap_or(0);

  let db_result = match kind {
    GameKind::WordMatch => {
      if form.english.trim().is_empty() || form.arabic.trim().is_empty() {
        return Err("English and Arabic are required".to_string());
      }
      match id {
        Some(id) => questions::update_word_pair(conn, id, form.english.trim(), form.arabic.trim(), sort_order),
        None => questions::insert_word_pair(conn, form.english.trim(), form.arabic.trim(), sort_order).map(|_| ()),
      }
    }
    GameKind::FillBlank => {
      let options = parse_options(&form.options);
      if form.sentence.trim().is_empty() || form.answer.trim().is_empty() {
        return Err("Sentence and answer are required".to_string());
      }
      if !form.sentence.contains("___") {
        return Err("Sentence must contain a ___ blank".to_string());
      }
      if !options.iter().any(|o| o == form.answer.trim()) {
        return Err("Options must include the answer".to_string());
      }
      match id {
        Some(id) => questions::update_fill_blank(conn, id, form.sentence.trim(), form.answer.trim(), &options, sort_order),
        None => questions::insert_fill_blank(conn, form.sentence.trim(), form.answer.trim(), &options, sort_order).map(|_| ()),
      }
    }
    GameKind::Translation => {
      let options = parse_options(&form.options);
      if form.word.trim().is_empty() || form.correct.trim().is_empty() {
        return Err("Word and correct translation are required".to_string());
      }
      if !options.iter().any(|o| o == form.correct.trim()) {
        return Err("Options must include the correct translation".to_string());
      }
      match id {
        Some(id) => questions::update_translation(conn, id, form.word.trim(), form.correct.trim(), &options, sort_order),
        None => questions::insert_translation(conn, form.word.trim(), form.correct.trim(), &options, sort_order).map(|_| ()),
      }
    }
    GameKind::LetterScramble => {
      if form.word.trim().is_empty() || form.hint.trim().is_empty() {
        return Err("Word and hint are required".to_string());
      }
      match id {
        Some(id) => questions::update_letter_scramble(conn, id, form.word.trim(), form.hint.trim(), form.translation.trim(), sort_order),
        None => questions::insert_letter_scramble(conn, form.word.trim(), form.hint.trim(), form.translation.trim(), sort_order).map(|_| ()),
      }
    }
    GameKind::AudioListen => {
      if form.english.trim().is_empty() || form.arabic.trim().is_empty() {
        return Err("English and Arabic are required".to_string());
      }
      match id {
        Some(id) => questions::update_audio_word(conn, id, form.english.trim(), form.arabic.trim(), sort_order),
        None => questions::insert_audio_word(conn, form.english.trim(), form.arabic.trim(), sort_order).map(|_| ()),
      }
    }
  };

  db_result.map_err(|e| {
    tracing::warn!("Question save failed: {}", e);
    "Database error".to_string()
  })
}

/// POST /admin/questions/{game}/add
pub async fn add_question(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(slug): Path<String>,
  Form(form): Form<QuestionForm>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/admin").into_response();
  };
  let base = format!("/admin/questions/{}", info.slug);

  let conn = match state.db.lock() {
    Ok(conn) => conn,
    Err(_) => return redirect_with_error(&base, "Database unavailable"),
  };
  match save_question(&conn, info.kind, None, &form) {
    Ok(()) => Redirect::to(&base).into_response(),
    Err(message) => redirect_with_error(&base, &message),
  }
}

/// POST /admin/questions/{game}/{id}/edit
pub async fn edit_question(
  State(state): State<AppState>,
  auth: AuthContext,
  Path((slug, id)): Path<(String, i64)>,
  Form(form): Form<QuestionForm>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/admin").into_response();
  };
  let base = format!("/admin/questions/{}", info.slug);

  let conn = match state.db.lock() {
    Ok(conn) => conn,
    Err(_) => return redirect_with_error(&base, "Database unavailable"),
  };
  match save_question(&conn, info.kind, Some(id), &form) {
    Ok(()) => Redirect::to(&base).into_response(),
    Err(message) => redirect_with_error(&base, &message),
  }
}

/// POST /admin/questions/{game}/{id}/delete
pub async fn delete_question(
  State(state): State<AppState>,
  auth: AuthContext,
  Path((slug, id)): Path<(String, i64)>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  let Some(info) = config::game_by_slug(&slug) else {
    return Redirect::to("/admin").into_response();
  };

  if let Ok(conn) = state.db.lock() {
    let table = match info.kind {
      GameKind::WordMatch => "word_match_questions",
      GameKind::FillBlank => "fill_blank_questions",
      GameKind::Translation => "translation_questions",
      GameKind::LetterScramble => "letter_scramble_questions",
      GameKind::AudioListen => "audio_words",
    };
    conn
      .execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])
      .log_warn("Failed to delete question");
  }
  Redirect::to(&format!("/admin/questions/{}", info.slug)).into_response()
}

// ==================== Achievements ====================

pub struct AchievementRow {
  pub id: String,
  pub title: String,
  pub description: String,
  pub kind: String,
  pub kind_known: bool,
  pub target: i64,
  pub icon: String,
  pub gradient: String,
}

#[derive(Template)]
#[template(path = "admin/achievements.html")]
pub struct ManageAchievementsTemplate {
  pub username: String,
  pub is_admin: bool,
  pub rows: Vec<AchievementRow>,
  pub kinds: Vec<&'static str>,
  pub error: Option<String>,
}

/// Kind tags offered in the admin form
fn kind_choices() -> Vec<&'static str> {
  let mut kinds = vec!["total_score", "total"];
  kinds.extend(GameKind::ALL.iter().map(|g| g.as_str()));
  kinds
}

/// GET /admin/achievements
pub async fn manage_achievements(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(params): Query<ListParams>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }

  let rows = match state.db.lock() {
    Ok(conn) => achievement_store::load_definitions(&conn)
      .log_warn_default("Failed to load achievement definitions")
      .into_iter()
      .map(|def| AchievementRow {
        id: def.id.clone(),
        title: def.title,
        description: def.description,
        kind: def.kind.as_str().to_string(),
        kind_known: def.kind.is_known(),
        target: def.target,
        icon: def.icon,
        gradient: def.gradient.unwrap_or_default(),
      })
      .collect(),
    Err(_) => Vec::new(),
  };

  let template = ManageAchievementsTemplate {
    username: auth.username,
    is_admin: true,
    rows,
    kinds: kind_choices(),
    error: params.err,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

#[derive(Deserialize)]
pub struct AchievementForm {
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub kind: String,
  pub target: i64,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub gradient: String,
}

fn definition_from_form(id: String, form: &AchievementForm) -> AchievementDefinition {
  AchievementDefinition {
    id,
    title: form.title.trim().to_string(),
    description: form.description.trim().to_string(),
    kind: AchievementKind::from_str(form.kind.trim()),
    target: form.target,
    icon: if form.icon.trim().is_empty() {
      "trophy".to_string()
    } else {
      form.icon.trim().to_string()
    },
    gradient: if form.gradient.trim().is_empty() {
      None
    } else {
      Some(form.gradient.trim().to_string())
    },
  }
}

/// POST /admin/achievements/add - Id derives from kind and target so it
/// stays readable (`total_50`), matching the seeded convention.
pub async fn add_achievement(
  State(state): State<AppState>,
  auth: AuthContext,
  Form(form): Form<AchievementForm>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if form.title.trim().is_empty() || form.target <= 0 {
    return redirect_with_error("/admin/achievements", "Title and a positive target are required");
  }

  let id = format!("{}_{}", form.kind.trim(), form.target);
  let def = definition_from_form(id, &form);

  match state.db.lock() {
    Ok(conn) => match achievement_store::upsert_definition(&conn, &def) {
      Ok(()) => Redirect::to("/admin/achievements").into_response(),
      Err(e) => {
        tracing::warn!("Achievement save failed: {}", e);
        redirect_with_error("/admin/achievements", "Database error")
      }
    },
    Err(_) => redirect_with_error("/admin/achievements", "Database unavailable"),
  }
}

/// POST /admin/achievements/{id}/edit - Keeps the existing id
pub async fn edit_achievement(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(id): Path<String>,
  Form(form): Form<AchievementForm>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if form.title.trim().is_empty() || form.target <= 0 {
    return redirect_with_error("/admin/achievements", "Title and a positive target are required");
  }

  let def = definition_from_form(id, &form);
  match state.db.lock() {
    Ok(conn) => match achievement_store::upsert_definition(&conn, &def) {
      Ok(()) => Redirect::to("/admin/achievements").into_response(),
      Err(e) => {
        tracing::warn!("Achievement save failed: {}", e);
        redirect_with_error("/admin/achievements", "Database error")
      }
    },
    Err(_) => redirect_with_error("/admin/achievements", "Database unavailable"),
  }
}

/// POST /admin/achievements/{id}/delete
pub async fn delete_achievement(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(id): Path<String>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if let Ok(conn) = state.db.lock() {
    achievement_store::delete_definition(&conn, &id).log_warn("Failed to delete achievement");
  }
  Redirect::to("/admin/achievements").into_response()
}

/// POST /admin/achievements/seed - Insert the stock set (no-op unless
/// the table is empty)
pub async fn seed_achievements(State(state): State<AppState>, auth: AuthContext) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if let Ok(conn) = state.db.lock() {
    achievement_store::seed_definitions(&conn).log_warn("Failed to seed achievements");
  }
  Redirect::to("/admin/achievements").into_response()
}

// ==================== Users ====================

pub struct UserRow {
  pub id: i64,
  pub username: String,
  pub role: String,
  pub created_at: String,
  pub is_self: bool,
}

#[derive(Template)]
#[template(path = "admin/users.html")]
pub struct ManageUsersTemplate {
  pub username: String,
  pub is_admin: bool,
  pub rows: Vec<UserRow>,
  pub error: Option<String>,
}

/// GET /admin/users
pub async fn manage_users(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(params): Query<ListParams>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }

  let rows = match state.db.lock() {
    Ok(conn) => auth_db::get_all_users(&conn)
      .log_warn_default("Failed to list users")
      .into_iter()
      .map(|u| UserRow {
        id: u.id,
        is_self: u.id == auth.user_id,
        username: u.username,
        role: u.role,
        created_at: u.created_at,
      })
      .collect(),
    Err(_) => Vec::new(),
  };

  let template = ManageUsersTemplate {
    username: auth.username,
    is_admin: true,
    rows,
    error: params.err,
  };
  Html(template.render().unwrap_or_default()).into_response()
}

#[derive(Deserialize)]
pub struct RoleForm {
  pub role: String,
}

/// POST /admin/users/{id}/role
pub async fn set_user_role(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(id): Path<i64>,
  Form(form): Form<RoleForm>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if !matches!(form.role.as_str(), "user" | "admin") {
    return redirect_with_error("/admin/users", "Unknown role");
  }
  if id == auth.user_id && form.role == "user" {
    return redirect_with_error("/admin/users", "You cannot demote yourself");
  }

  if let Ok(conn) = state.db.lock() {
    auth_db::set_user_role(&conn, id, &form.role).log_warn("Failed to set role");
  }
  Redirect::to("/admin/users").into_response()
}

/// POST /admin/users/{id}/delete
pub async fn delete_user_account(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(id): Path<i64>,
) -> Response {
  if !auth.is_admin {
    return Redirect::to("/").into_response();
  }
  if id == auth.user_id {
    return redirect_with_error("/admin/users", "You cannot delete your own account");
  }

  if let Ok(conn) = state.db.lock() {
    auth_db::delete_user(&conn, id).log_warn("Failed to delete user");
  }
  Redirect::to("/admin/users").into_response()
}
