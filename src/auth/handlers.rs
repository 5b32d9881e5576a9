//! Authentication handlers for login, register, and logout.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::{OptionalAuth, SESSION_COOKIE_NAME};
use super::password;
use crate::config;
use crate::session::generate_session_id;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub version: &'static str,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

fn login_error(jar: CookieJar, message: &str) -> axum::response::Response {
    let template = LoginTemplate {
        error: Some(message.to_string()),
        version: env!("CARGO_PKG_VERSION"),
    };
    (jar, Html(template.render().unwrap_or_default())).into_response()
}

fn register_error(jar: CookieJar, message: &str) -> axum::response::Response {
    let template = RegisterTemplate {
        error: Some(message.to_string()),
    };
    (jar, Html(template.render().unwrap_or_default())).into_response()
}

/// GET /login - Show login page (logged-in users go straight home)
pub async fn login_page(OptionalAuth(auth): OptionalAuth) -> axum::response::Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    let template = LoginTemplate {
        error: None,
        version: env!("CARGO_PKG_VERSION"),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

/// POST /login - Process login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    if form.username.is_empty() || form.password.is_empty() {
        return login_error(jar, "Username and password are required");
    }

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return login_error(jar, "Database error"),
    };

    // Look up user
    let (user_id, stored_hash) = match auth_db::get_user_by_username(&conn, &form.username) {
        Ok(Some(user)) => user,
        Ok(None) => return login_error(jar, "Invalid username or password"),
        Err(_) => return login_error(jar, "Database error"),
    };

    let password_digest = password::digest(&form.username, &form.password);
    if !password::verify_password(&password_digest, &stored_hash) {
        return login_error(jar, "Invalid username or password");
    }

    // Update last login time (log but don't fail on error)
    if let Err(e) = auth_db::update_last_login(&conn, user_id) {
        tracing::warn!("Failed to update last login for user {}: {}", user_id, e);
    }

    // Create session
    let session_id = generate_session_id();
    if auth_db::create_session(&conn, user_id, &session_id, config::SESSION_DURATION_HOURS).is_err()
    {
        return login_error(jar, "Failed to create session");
    }

    drop(conn);

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(config::SESSION_DURATION_HOURS))
        .build();

    (jar.add(session_cookie), Redirect::to("/")).into_response()
}

/// GET /register - Show registration page
pub async fn register_page(OptionalAuth(auth): OptionalAuth) -> axum::response::Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    let template = RegisterTemplate { error: None };
    Html(template.render().unwrap_or_default()).into_response()
}

/// POST /register - Process registration
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> impl IntoResponse {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return register_error(jar, "Username and password are required");
    }
    if username.len() > 32 || !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return register_error(jar, "Username must be alphanumeric (up to 32 characters)");
    }
    if form.password.len() < 6 {
        return register_error(jar, "Password must be at least 6 characters");
    }

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return register_error(jar, "Database error"),
    };

    match auth_db::username_exists(&conn, username) {
        Ok(true) => return register_error(jar, "Username is already taken"),
        Ok(false) => {}
        Err(_) => return register_error(jar, "Database error"),
    }

    let password_digest = password::digest(username, &form.password);
    let stored_hash = match password::hash_password(&password_digest) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Password hashing failed: {}", e);
            return register_error(jar, "Registration failed");
        }
    };

    let user_id = match auth_db::create_user(&conn, username, &stored_hash) {
        Ok(id) => id,
        Err(_) => return register_error(jar, "Registration failed"),
    };

    // Log the new user straight in
    let session_id = generate_session_id();
    if auth_db::create_session(&conn, user_id, &session_id, config::SESSION_DURATION_HOURS).is_err()
    {
        return register_error(jar, "Failed to create session");
    }

    drop(conn);
    tracing::info!("Registered new user '{}'", username);

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false)
        .max_age(time::Duration::hours(config::SESSION_DURATION_HOURS))
        .build();

    (jar.add(session_cookie), Redirect::to("/")).into_response()
}

/// POST /logout - Delete session and clear cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        if let Ok(conn) = state.db.lock() {
            let _ = auth_db::delete_session(&conn, cookie.value());
        }
    }

    let removal = Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build();
    (jar.remove(removal), Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers;
    use axum::http::StatusCode;
    use axum::{routing::get, routing::post, Router};
    use axum_test::TestServer;
    use std::sync::{Arc, Mutex};

    fn test_server() -> TestServer {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        crate::db::schema::run_migrations(&conn).unwrap();
        let state = AppState::new(Arc::new(Mutex::new(conn)));
        let app = Router::new()
            .route("/", get(handlers::index))
            .route("/login", get(login_page).post(login_submit))
            .route("/register", get(register_page).post(register_submit))
            .route("/logout", post(logout))
            .with_state(state);
        TestServer::builder().save_cookies().build(app).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let server = test_server();
        let res = server.get("/").await;
        res.assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_register_creates_session() {
        let server = test_server();

        let res = server
            .post("/register")
            .form(&[("username", "alex"), ("password", "secret1")])
            .await;
        res.assert_status(StatusCode::SEE_OTHER);

        // The registration cookie logs us straight in
        let res = server.get("/").await;
        res.assert_status_ok();
        assert!(res.text().contains("alex"));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let server = test_server();
        server
            .post("/register")
            .form(&[("username", "alex"), ("password", "secret1")])
            .await;
        server.post("/logout").await;

        let res = server
            .post("/login")
            .form(&[("username", "alex"), ("password", "wrong")])
            .await;
        res.assert_status_ok();
        assert!(res.text().contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let server = test_server();
        server
            .post("/register")
            .form(&[("username", "alex"), ("password", "secret1")])
            .await;

        let res = server
            .post("/register")
            .form(&[("username", "alex"), ("password", "other123")])
            .await;
        res.assert_status_ok();
        assert!(res.text().contains("already taken"));
    }
}
