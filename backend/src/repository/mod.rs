//! User persistence.
//!
//! Handlers only see the [`UserRepository`] trait; the SQLite implementation
//! is wired in at startup.

mod sqlite;

pub use sqlite::SqliteUserRepository;

use crate::models::User;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Email already in use: {0}")]
    DuplicateEmail(String),
    #[error("User {0} not found")]
    NotFound(i64),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Storage operations on the `users` table.
///
/// `create` and `update` refuse to let two users share an email and report it
/// as [`RepositoryError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, oldest first.
    fn list_all(&self) -> Result<Vec<User>>;

    fn create(&self, username: &str, email: &str) -> Result<User>;

    /// Overwrite `username` and `email` of an existing user.
    fn update(&self, user: &User, username: &str, email: &str) -> Result<User>;

    fn delete(&self, user: &User) -> Result<()>;
}
