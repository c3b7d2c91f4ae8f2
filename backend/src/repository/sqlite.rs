use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::{RepositoryError, Result, UserRepository};
use crate::models::User;

const SELECT_USER: &str = "SELECT id, username, email, created_at FROM users";

/// SQLite-backed user repository.
///
/// A single connection behind a mutex, so the email check inside `create` and
/// `update` cannot interleave with another write.
pub struct SqliteUserRepository {
    conn: Mutex<Connection>,
}

impl SqliteUserRepository {
    pub fn new(database_url: &str) -> Result<Self> {
        // Parse sqlite: prefix if present
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        // Create parent directories if needed
        if path != ":memory:" {
            if let Some(parent) = Path::new(path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepositoryError::IoError(e.to_string()))?;
            }
        }

        let conn =
            Connection::open(path).map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::info!("User repository initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh in-memory database, used by tests and `database.url = ":memory:"`.
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn select_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_USER), params![id], user_from_row)
        .optional()
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

fn select_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    conn.query_row(&format!("{} WHERE email = ?1", SELECT_USER), params![email], user_from_row)
        .optional()
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

/// The only constraint a write can trip is the UNIQUE index on `email`.
fn write_error(err: rusqlite::Error, email: &str) -> RepositoryError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepositoryError::DuplicateEmail(email.to_string())
        }
        other => RepositoryError::DatabaseError(other.to_string()),
    }
}

impl UserRepository for SqliteUserRepository {
    fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.lock()?;
        tracing::debug!("Looking up user {}", id);
        select_by_id(&conn, id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        tracing::debug!("Looking up user by email {}", email);
        select_by_email(&conn, email)
    }

    fn list_all(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!("{} ORDER BY id ASC", SELECT_USER))
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let users = stmt
            .query_map([], user_from_row)
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(users)
    }

    fn create(&self, username: &str, email: &str) -> Result<User> {
        let conn = self.lock()?;

        if select_by_email(&conn, email)?.is_some() {
            return Err(RepositoryError::DuplicateEmail(email.to_string()));
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![username, email, now],
        )
        .map_err(|e| write_error(e, email))?;

        let id = conn.last_insert_rowid();
        tracing::info!("Created user {} ({})", id, email);

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    fn update(&self, user: &User, username: &str, email: &str) -> Result<User> {
        let conn = self.lock()?;

        if let Some(owner) = select_by_email(&conn, email)? {
            if owner.id != user.id {
                return Err(RepositoryError::DuplicateEmail(email.to_string()));
            }
        }

        let changed = conn
            .execute(
                "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
                params![username, email, user.id],
            )
            .map_err(|e| write_error(e, email))?;

        if changed == 0 {
            return Err(RepositoryError::NotFound(user.id));
        }

        tracing::info!("Updated user {} ({})", user.id, email);

        Ok(User {
            id: user.id,
            username: username.to_string(),
            email: email.to_string(),
            created_at: user.created_at,
        })
    }

    fn delete(&self, user: &User) -> Result<()> {
        let conn = self.lock()?;

        let changed = conn
            .execute("DELETE FROM users WHERE id = ?1", params![user.id])
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if changed == 0 {
            return Err(RepositoryError::NotFound(user.id));
        }

        tracing::info!("Removed user {} ({})", user.id, user.email);
        Ok(())
    }
}
