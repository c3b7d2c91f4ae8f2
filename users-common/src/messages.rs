//! Human-readable messages returned by the users API.

pub const MSG_VALIDATION_FAILED: &str = "Input payload validation failed";
pub const MSG_DUPLICATE_EMAIL: &str = "Sorry. That email already exists.";
pub const MSG_INTERNAL_ERROR: &str = "Internal server error";

pub fn user_added(email: &str) -> String {
    format!("{} was added!", email)
}

pub fn user_updated(id: i64) -> String {
    format!("{} was updated!", id)
}

pub fn user_removed(email: &str) -> String {
    format!("{} was removed!", email)
}

pub fn user_not_found(id: i64) -> String {
    format!("User {} does not exist", id)
}
