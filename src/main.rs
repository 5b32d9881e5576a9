use axum::{routing::get, routing::post, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use word_arcade::state::AppState;
use word_arcade::{auth, config, db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "word_arcade=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    db::achievements::seed_definitions(&conn).expect("Failed to seed achievements");
    db::questions::seed_starter_questions(&conn).expect("Failed to seed question banks");

    if let Ok(removed) = auth::db::cleanup_expired_sessions(&conn) {
      if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
      }
    }
  }

  let state = AppState::new(pool);

  let app = Router::new()
    .route("/", get(handlers::index))
    .route("/login", get(auth::login_page).post(auth::login_submit))
    .route("/register", get(auth::register_page).post(auth::register_submit))
    .route("/logout", post(auth::logout))
    .route("/games/{game}", get(handlers::game_page))
    .route("/games/{game}/answer", post(handlers::submit_answer))
    .route("/achievements", get(handlers::achievements_page))
    .route("/achievements/refresh", post(handlers::refresh_achievements))
    .route("/admin", get(handlers::admin_dashboard))
    .route("/admin/questions/{game}", get(handlers::manage_questions))
    .route("/admin/questions/{game}/add", post(handlers::add_question))
    .route("/admin/questions/{game}/{id}/edit", post(handlers::edit_question))
    .route("/admin/questions/{game}/{id}/delete", post(handlers::delete_question))
    .route("/admin/achievements", get(handlers::manage_achievements))
    .route("/admin/achievements/add", post(handlers::add_achievement))
    .route("/admin/achievements/seed", post(handlers::seed_achievements))
    .route("/admin/achievements/{id}/edit", post(handlers::edit_achievement))
    .route("/admin/achievements/{id}/delete", post(handlers::delete_achievement))
    .route("/admin/users", get(handlers::manage_users))
    .route("/admin/users/{id}/role", post(handlers::set_user_role))
    .route("/admin/users/{id}/delete", post(handlers::delete_user_account))
    .nest_service("/static", ServeDir::new("static"))
    .layer(TraceLayer::new_for_http())
    .with_state(state);

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
