//! Document store abstraction for the Places and Users collections.
//!
//! Reads and single-document writes go through [`DocumentStore`]. Writes that
//! must land together go through a [`Session`], whose transaction is started
//! by [`DocumentStore::start_session`] and ends with exactly one of
//! [`Session::commit`] or [`Session::abort`]. Dropping an unfinished session
//! rolls it back.

use async_trait::async_trait;

use crate::models::{Place, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// PostgreSQL `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";
/// PostgreSQL `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// Write conflict; the whole transaction may succeed when re-run
    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::Duplicate(db.message().to_string()),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return StoreError::Conflict(db.message().to_string())
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_place(&self, id: &str) -> StoreResult<Option<Place>>;

    async fn find_places_by_creator(&self, creator: &str) -> StoreResult<Vec<Place>>;

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Overwrite title and description of an existing place.
    ///
    /// Never inserts. Returns `None` when no such place exists, so a place
    /// deleted concurrently stays deleted.
    async fn update_place_details(
        &self,
        id: &str,
        title: &str,
        description: &str,
    ) -> StoreResult<Option<Place>>;

    /// Insert or replace a user outside any transaction
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    /// Cheap connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;

    /// Open a session with its transaction already started
    async fn start_session(&self) -> StoreResult<Box<dyn Session>>;
}

/// A transaction-scoped view of the store.
///
/// Reads inside a session see the session's own uncommitted writes and hold
/// whatever locks the backend needs to keep concurrent sessions from
/// clobbering the documents read.
#[async_trait]
pub trait Session: Send {
    async fn find_place(&mut self, id: &str) -> StoreResult<Option<Place>>;

    async fn find_user(&mut self, id: &str) -> StoreResult<Option<User>>;

    async fn save_place(&mut self, place: &Place) -> StoreResult<()>;

    async fn save_user(&mut self, user: &User) -> StoreResult<()>;

    async fn remove_place(&mut self, id: &str) -> StoreResult<()>;

    async fn commit(&mut self) -> StoreResult<()>;

    /// Roll back. A no-op once the session has already ended.
    async fn abort(&mut self) -> StoreResult<()>;
}
