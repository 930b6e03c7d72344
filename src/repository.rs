//! Storage seam for the exposed resources.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Largest id a caller may store explicitly. Keeps room for the sequence to
/// step past it without overflowing.
pub const MAX_ID: i64 = i64::MAX - 1;

/// Anything a repository can store: a value with an optional numeric id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: Option<i64>);
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All entities ordered by id
    async fn find_all(&self) -> AppResult<Vec<T>>;

    /// A window of [`Repository::find_all`]
    async fn find_page(&self, offset: usize, limit: usize) -> AppResult<Vec<T>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<T>>;

    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// Insert or replace. Entities without an id get the next one.
    async fn save(&self, entity: T) -> AppResult<T>;

    /// Returns whether something was deleted
    async fn delete_by_id(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<usize>;
}

/// Process-local repository backed by a concurrent map
pub struct InMemoryRepository<T: Entity> {
    entries: DashMap<i64, T>,
    next_id: AtomicI64,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn sorted(&self) -> Vec<T> {
        let mut all: Vec<(i64, T)> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Next free generated id, skipping ids already stored.
    fn allocate_id(&self) -> AppResult<i64> {
        loop {
            let id = self
                .next_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    current.checked_add(1)
                })
                .map_err(|_| AppError::Internal("id sequence exhausted".to_string()))?;

            if !self.entries.contains_key(&id) {
                return Ok(id);
            }
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find_all(&self) -> AppResult<Vec<T>> {
        Ok(self.sorted())
    }

    async fn find_page(&self, offset: usize, limit: usize) -> AppResult<Vec<T>> {
        Ok(self.sorted().into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<T>> {
        Ok(self.entries.get(&id).map(|entry| entry.value().clone()))
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.entries.contains_key(&id))
    }

    async fn save(&self, mut entity: T) -> AppResult<T> {
        let id = match entity.id() {
            Some(id) if !(1..=MAX_ID).contains(&id) => {
                return Err(AppError::Validation(format!(
                    "id must be between 1 and {}",
                    MAX_ID
                )));
            }
            Some(id) => {
                // keep generated ids clear of explicitly stored ones
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.allocate_id()?,
        };

        entity.set_id(Some(id));
        self.entries.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.entries.remove(&id).is_some())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.entries.len())
    }
}
