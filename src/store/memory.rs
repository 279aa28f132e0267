//! In-process document store.
//!
//! Sessions take the store's async mutex for their whole lifetime and work on
//! a private copy of the collections, which replaces the committed state on
//! commit. Sessions are therefore fully serialized, and readers outside a
//! session never observe uncommitted writes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{DocumentStore, Session, StoreError, StoreResult};
use crate::models::{Place, User};

#[derive(Debug, Clone, Default)]
struct Collections {
    places: BTreeMap<String, Place>,
    users: BTreeMap<String, User>,
}

impl Collections {
    fn put_user(&mut self, user: &User) -> StoreResult<()> {
        let email_taken = self
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id);
        if email_taken {
            return Err(StoreError::Duplicate(format!(
                "email {} already registered",
                user.email
            )));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Faults {
    fail_next_commit: AtomicBool,
    conflicting_commits: AtomicU32,
    fail_next_place_write: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<Collections>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next session commit fail with [`StoreError::Unavailable`]
    pub fn fail_next_commit(&self) {
        self.faults.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Make the next `count` session commits fail with a transient
    /// [`StoreError::Conflict`]
    pub fn conflict_next_commits(&self, count: u32) {
        self.faults.conflicting_commits.store(count, Ordering::SeqCst);
    }

    /// Make the next place write inside a session fail
    pub fn fail_next_place_write(&self) {
        self.faults.fail_next_place_write.store(true, Ordering::SeqCst);
    }

    pub async fn place_count(&self) -> usize {
        self.state.lock().await.places.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_place(&self, id: &str) -> StoreResult<Option<Place>> {
        Ok(self.state.lock().await.places.get(id).cloned())
    }

    async fn find_places_by_creator(&self, creator: &str) -> StoreResult<Vec<Place>> {
        let state = self.state.lock().await;
        Ok(state
            .places
            .values()
            .filter(|p| p.creator == creator)
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn update_place_details(
        &self,
        id: &str,
        title: &str,
        description: &str,
    ) -> StoreResult<Option<Place>> {
        let mut state = self.state.lock().await;
        Ok(state.places.get_mut(id).map(|place| {
            place.title = title.to_string();
            place.description = description.to_string();
            place.clone()
        }))
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.state.lock().await.put_user(user)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn start_session(&self) -> StoreResult<Box<dyn Session>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemorySession {
            guard: Some(guard),
            working,
            faults: self.faults.clone(),
        }))
    }
}

pub struct MemorySession {
    guard: Option<OwnedMutexGuard<Collections>>,
    working: Collections,
    faults: Arc<Faults>,
}

impl MemorySession {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.guard.is_none() {
            return Err(StoreError::Unavailable(
                "session already finished".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn find_place(&mut self, id: &str) -> StoreResult<Option<Place>> {
        self.ensure_open()?;
        Ok(self.working.places.get(id).cloned())
    }

    async fn find_user(&mut self, id: &str) -> StoreResult<Option<User>> {
        self.ensure_open()?;
        Ok(self.working.users.get(id).cloned())
    }

    async fn save_place(&mut self, place: &Place) -> StoreResult<()> {
        self.ensure_open()?;
        if self.faults.fail_next_place_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("place write rejected".to_string()));
        }
        self.working.places.insert(place.id.clone(), place.clone());
        Ok(())
    }

    async fn save_user(&mut self, user: &User) -> StoreResult<()> {
        self.ensure_open()?;
        self.working.put_user(user)
    }

    async fn remove_place(&mut self, id: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.working.places.remove(id);
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let mut guard = self.guard.take().ok_or_else(|| {
            StoreError::Unavailable("session already finished".to_string())
        })?;
        if self.faults.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }
        let conflicted = self
            .faults
            .conflicting_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if conflicted {
            return Err(StoreError::Conflict("concurrent update".to_string()));
        }
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn abort(&mut self) -> StoreResult<()> {
        self.guard.take();
        self.working = Collections::default();
        Ok(())
    }
}
