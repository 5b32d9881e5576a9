pub mod achievements;
pub mod admin;
pub mod games;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{scores, LogOnError};
use crate::domain::ScoreRecord;
use crate::state::AppState;

/// One game card on the home page scoreboard
pub struct GameEntry {
  pub title: &'static str,
  pub slug: &'static str,
  pub blurb: &'static str,
  pub score: i64,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub username: String,
  pub is_admin: bool,
  pub games: Vec<GameEntry>,
  pub total_score: i64,
}

pub async fn index(State(state): State<AppState>, auth: AuthContext) -> Html<String> {
  let record = match state.db.lock() {
    Ok(conn) => scores::get_scores(&conn, auth.user_id)
      .log_warn("Failed to load scores")
      .flatten()
      .unwrap_or_default(),
    Err(_) => ScoreRecord::default(),
  };

  let games = config::GAMES
    .iter()
    .map(|info| GameEntry {
      title: info.title,
      slug: info.slug,
      blurb: info.blurb,
      score: record.get(info.kind),
    })
    .collect();

  let template = IndexTemplate {
    username: auth.username,
    is_admin: auth.is_admin,
    games,
    total_score: record.total(),
  };

  Html(template.render().unwrap_or_default())
}

pub use achievements::{achievements_page, refresh_achievements};
pub use admin::{
  add_achievement, add_question, admin_dashboard, delete_achievement, delete_question,
  delete_user_account, edit_achievement, edit_question, manage_achievements, manage_questions,
  manage_users, seed_achievements, set_user_role,
};
pub use games::{game_page, submit_answer};
