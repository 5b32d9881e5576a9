//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// Test environment with arcade.db using the authoritative schema.
///
/// The temporary directory is kept alive so the database file persists
/// for the duration of the test and is cleaned up on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// arcade.db connection with the full schema (all migrations)
    pub conn: Connection,
}

impl TestEnv {
    /// Create a test environment with an empty, fully migrated database.
    ///
    /// Seed data is not inserted; tests that need the stock achievement
    /// set or starter question banks call the seed functions themselves.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("arcade.db");
        let conn = Connection::open(&db_path)?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Insert a user directly, returning its id. The stored hash is not
    /// a real password hash; auth tests build their own.
    pub fn create_user(&self, username: &str) -> i64 {
        crate::auth::db::create_user(&self.conn, username, "test-hash")
            .expect("test user insert failed")
    }
}
