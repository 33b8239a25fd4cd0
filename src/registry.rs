use crate::context::Context;
use parking_lot::{Mutex, RwLock};
use perch_core::{ContextId, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A registered context, shared between the driver and anyone who looked it up.
pub type SharedContext<H> = Arc<Mutex<Context<H>>>;

/// Map from identifier to live context.
///
/// Every operation takes the lock once, so concurrent callers always see a consistent map.
pub struct Registry<H> {
    contexts: RwLock<HashMap<ContextId, SharedContext<H>>>,
}

impl<H> Registry<H> {
    pub fn new() -> Registry<H> {
        Registry {
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a context under its identifier.
    pub fn register(&self, context: Context<H>) -> Result<SharedContext<H>> {
        let id = context.id();
        let mut contexts = self.contexts.write();
        if contexts.contains_key(&id) {
            debug_assert!(false, "context id {} registered twice", id);
            return Err(Error::DuplicateId(id));
        }

        let shared = Arc::new(Mutex::new(context));
        contexts.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    pub fn lookup(&self, id: ContextId) -> Result<SharedContext<H>> {
        self.contexts
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Removes a context. Removing it a second time is an error.
    pub fn unregister(&self, id: ContextId) -> Result<SharedContext<H>> {
        self.contexts
            .write()
            .remove(&id)
            .ok_or(Error::NotFound(id))
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.contexts.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }

    /// Snapshot of the registered identifiers.
    pub fn ids(&self) -> Vec<ContextId> {
        self.contexts.read().keys().copied().collect()
    }
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Registry::new()
    }
}
