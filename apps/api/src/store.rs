//! Persistence boundary: a narrow get/put-by-id repository.
//!
//! The engine never owns global state; it is handed repositories. The shipped
//! backend keeps everything in memory for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

pub trait Repository<T>: Send + Sync {
    fn get(&self, id: Uuid) -> Option<T>;
    fn put(&self, id: Uuid, value: T);
}

pub struct MemoryRepository<T> {
    items: RwLock<HashMap<Uuid, T>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Repository<T> for MemoryRepository<T> {
    fn get(&self, id: Uuid) -> Option<T> {
        self.items.read().get(&id).cloned()
    }

    fn put(&self, id: Uuid, value: T) {
        self.items.write().insert(id, value);
    }
}

/// One exclusion scope per plan id, held across a read-modify-write of that plan.
///
/// An entry lives only while some caller holds its handle; idle entries are
/// dropped on the next lookup.
#[derive(Default)]
pub struct PlanLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PlanLocks {
    pub fn for_plan(&self, plan_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        // handles are only cloned under the map lock, so a count of 1 means idle
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(plan_id).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}
