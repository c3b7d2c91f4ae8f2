use chrono::{DateTime, Utc};
use serde::Serialize;
use users_common::UserResponse;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Surrogate key assigned by the database
    pub id: i64,
    pub username: String,
    /// Unique across all users
    pub email: String,
    /// When the user was created, never changes afterwards
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
