//! Auth database operations (users and sessions tables).

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (user_id, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT id, password_hash FROM users WHERE username = ?1")?;
    stmt
        .query_row(params![username], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()
}

/// Check if a username already exists
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Check if a user is an admin (by role or legacy username='admin')
/// Backwards compatible: users named "admin" are always admins
pub fn is_user_admin(conn: &Connection, user_id: i64) -> Result<bool> {
    let is_admin: i64 = conn.query_row(
        r#"SELECT CASE
            WHEN COALESCE(role, 'user') = 'admin' THEN 1
            WHEN LOWER(username) = 'admin' THEN 1
            ELSE 0
        END FROM users WHERE id = ?1"#,
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(is_admin == 1)
}

/// Set user role ('user' or 'admin')
pub fn set_user_role(conn: &Connection, user_id: i64, role: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role, user_id],
    )?;
    Ok(())
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// User info for admin display
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

/// Get all users for admin display
pub fn get_all_users(conn: &Connection) -> Result<Vec<UserInfo>> {
    let mut stmt = conn.prepare(
        r#"SELECT id, username, COALESCE(role, 'user'), created_at
           FROM users
           ORDER BY created_at DESC"#,
    )?;
    let users = stmt
        .query_map([], |row| {
            Ok(UserInfo {
                id: row.get(0)?,
                username: row.get(1)?,
                role: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(users)
}

/// Get user count (for the admin dashboard)
pub fn get_user_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

/// Delete a user by ID; scores, sessions and achievement state cascade
pub fn delete_user(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    Ok(())
}

/// Create a new session
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Validate session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.username
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1 AND s.expires_at > ?2
    "#,
    )?;
    let result = stmt.query_row(params![session_id, now], |row| Ok((row.get(0)?, row.get(1)?)));
    match result {
        Ok((user_id, username)) => {
            // Update last access time
            let _ = conn.execute(
                "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
                params![now, session_id],
            );
            Ok(Some((user_id, username)))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_create_and_look_up_user() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "alex", "hash").unwrap();

        let (found_id, hash) = get_user_by_username(&env.conn, "alex").unwrap().unwrap();
        assert_eq!(found_id, id);
        assert_eq!(hash, "hash");
        assert!(username_exists(&env.conn, "alex").unwrap());
        assert!(!username_exists(&env.conn, "sam").unwrap());
    }

    #[test]
    fn test_admin_by_role_and_by_name() {
        let env = TestEnv::new().unwrap();
        let plain = create_user(&env.conn, "alex", "hash").unwrap();
        let named = create_user(&env.conn, "Admin", "hash").unwrap();

        assert!(!is_user_admin(&env.conn, plain).unwrap());
        assert!(is_user_admin(&env.conn, named).unwrap());

        set_user_role(&env.conn, plain, "admin").unwrap();
        assert!(is_user_admin(&env.conn, plain).unwrap());
    }

    #[test]
    fn test_session_lifecycle() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "alex", "hash").unwrap();

        create_session(&env.conn, user, "sess-1", 24).unwrap();
        let (id, name) = get_session_user(&env.conn, "sess-1").unwrap().unwrap();
        assert_eq!(id, user);
        assert_eq!(name, "alex");

        delete_session(&env.conn, "sess-1").unwrap();
        assert!(get_session_user(&env.conn, "sess-1").unwrap().is_none());
    }

    #[test]
    fn test_expired_session_rejected() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "alex", "hash").unwrap();

        // Negative duration expires the session immediately
        create_session(&env.conn, user, "sess-old", -1).unwrap();
        assert!(get_session_user(&env.conn, "sess-old").unwrap().is_none());
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
    }

    #[test]
    fn test_delete_user_cascades() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "alex", "hash").unwrap();
        create_session(&env.conn, user, "sess-1", 24).unwrap();

        delete_user(&env.conn, user).unwrap();
        assert!(get_user_by_username(&env.conn, "alex").unwrap().is_none());
        let sessions: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sessions, 0);
    }
}
