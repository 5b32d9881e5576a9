//! Achievements page.
//!
//! Loading the page runs the full reconciler first, so the view always
//! reflects the stored score totals even if incremental updates were
//! missed. The refresh button just re-runs the same path.

use askama::Template;
use axum::{
  extract::State,
  response::{Html, Redirect},
};

use crate::achievements::{self, AchievementToast};
use crate::auth::AuthContext;
use crate::config;
use crate::db::{achievements as achievement_store, LogOnError};
use crate::state::AppState;

/// One badge card
pub struct AchievementView {
  pub id: String,
  pub title: String,
  pub description: String,
  pub icon: String,
  pub gradient: String,
  pub progress: i64,
  pub target: i64,
  pub percent: i64,
  pub unlocked: bool,
}

#[derive(Template)]
#[template(path = "achievements.html")]
pub struct AchievementsTemplate {
  pub username: String,
  pub is_admin: bool,
  pub total_score: i64,
  pub unlocked_count: usize,
  pub badge_count: usize,
  pub badges: Vec<AchievementView>,
  pub toasts: Vec<AchievementToast>,
}

/// GET /achievements - Reconcile, then render every badge
pub async fn achievements_page(State(state): State<AppState>, auth: AuthContext) -> Html<String> {
  let (definitions, summary, state_doc) = match state.db.lock() {
    Ok(conn) => {
      let summary = achievements::reconcile(&conn, auth.user_id);
      let definitions = achievement_store::load_definitions(&conn)
        .log_warn_default("Failed to load achievement definitions");
      let state_doc = achievement_store::get_user_state(&conn, auth.user_id)
        .log_warn("Failed to load achievement state")
        .flatten()
        .unwrap_or_default();
      (definitions, summary, state_doc)
    }
    Err(_) => (Vec::new(), None, Default::default()),
  };

  let badges: Vec<AchievementView> = definitions
    .iter()
    .map(|def| {
      let progress = state_doc.progress_for(&def.id);
      let percent = if def.target > 0 {
        (progress * 100 / def.target).min(100)
      } else {
        100
      };
      AchievementView {
        id: def.id.clone(),
        title: def.title.clone(),
        description: def.description.clone(),
        icon: def.icon.clone(),
        gradient: def
          .gradient
          .clone()
          .unwrap_or_else(|| config::DEFAULT_GRADIENT.to_string()),
        progress,
        target: def.target,
        percent,
        unlocked: state_doc.is_unlocked(&def.id),
      }
    })
    .collect();

  let toasts = match &summary {
    Some(s) if !s.newly_unlocked.is_empty() => {
      achievements::toasts_for(&definitions, &s.newly_unlocked)
    }
    _ => Vec::new(),
  };

  let template = AchievementsTemplate {
    username: auth.username,
    is_admin: auth.is_admin,
    total_score: summary.as_ref().map(|s| s.total_score).unwrap_or(0),
    unlocked_count: state_doc.unlocked.len(),
    badge_count: badges.len(),
    badges,
    toasts,
  };
  Html(template.render().unwrap_or_default())
}

/// POST /achievements/refresh - Explicit re-sync, then back to the page
pub async fn refresh_achievements(auth: AuthContext) -> Redirect {
  tracing::debug!("Achievements refresh requested by {}", auth.username);
  Redirect::to("/achievements")
}
