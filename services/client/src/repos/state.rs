//! services/client/src/repos/state.rs
//!
//! The state every repository owns: the cached item list, the loading flag
//! and the last error.

use parking_lot::RwLock;
use podscript_core::domain::Entity;
use podscript_core::ports::ErrorKind;
use tracing::{error, info, warn};

struct Inner<E> {
    items: Vec<E>,
    in_flight: usize,
    error: Option<ErrorKind>,
    latest_load: u64,
}

/// Cached list of one resource plus its loading and error flags.
///
/// The list is authoritative only for this repository's own mutations and its
/// last applied load; it is never reconciled with writes made elsewhere.
pub struct ResourceState<E> {
    inner: RwLock<Inner<E>>,
}

impl<E: Entity> Default for ResourceState<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                in_flight: 0,
                error: None,
                latest_load: 0,
            }),
        }
    }
}

impl<E: Entity> ResourceState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the cached items, newest creations first.
    pub fn items(&self) -> Vec<E> {
        self.inner.read().items.clone()
    }

    pub fn find(&self, id: &str) -> Option<E> {
        self.inner.read().items.iter().find(|item| item.id() == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().in_flight > 0
    }

    /// The outcome of the most recently settled operation, if it failed.
    pub fn error(&self) -> Option<ErrorKind> {
        self.inner.read().error.clone()
    }

    /// Starts a mutation. The error from an earlier operation stays until this
    /// one settles with an outcome of its own.
    pub(crate) fn begin(&self) -> Operation<'_, E> {
        let mut inner = self.inner.write();
        inner.in_flight += 1;
        Operation {
            state: self,
            ticket: None,
        }
    }

    /// Starts a load. Any load started earlier becomes stale.
    pub(crate) fn begin_load(&self) -> Operation<'_, E> {
        let mut inner = self.inner.write();
        inner.in_flight += 1;
        inner.latest_load += 1;
        Operation {
            state: self,
            ticket: Some(inner.latest_load),
        }
    }
}

/// One in-flight operation. Dropping it releases the loading flag, so the
/// state cannot stay loading after a timeout, an error or a dropped future.
pub(crate) struct Operation<'a, E> {
    state: &'a ResourceState<E>,
    ticket: Option<u64>,
}

impl<E: Entity> Operation<'_, E> {
    /// Applies the outcome of the operation.
    ///
    /// On success `apply` runs against the cached list; on failure the error
    /// is recorded and the list is left alone. Cancelled operations and stale
    /// loads change nothing, but the caller still gets its own result.
    pub(crate) fn settle<T>(
        self,
        what: &str,
        result: Result<T, ErrorKind>,
        apply: impl FnOnce(&mut Vec<E>, &T),
    ) -> Result<T, ErrorKind> {
        if let Err(ErrorKind::Cancelled) = result {
            info!("{} cancelled", what);
            return result;
        }

        // The guard must be gone before `self` drops and takes the lock again.
        {
            let mut inner = self.state.inner.write();
            if self.ticket.is_some_and(|ticket| ticket != inner.latest_load) {
                warn!("Discarding stale response to {} (superseded)", what);
                return result;
            }

            match &result {
                Ok(value) => {
                    apply(&mut inner.items, value);
                    inner.error = None;
                    info!("{} succeeded ({} items cached)", what, inner.items.len());
                }
                Err(kind) => {
                    error!("Failed to {}: {}", what, kind);
                    inner.error = Some(kind.clone());
                }
            }
        }
        result
    }
}

impl<E> Drop for Operation<'_, E> {
    fn drop(&mut self) {
        let mut inner = self.state.inner.write();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }
}

/// Puts a newly created item at the front of the list.
pub(crate) fn prepend<E: Clone>(items: &mut Vec<E>, item: &E) {
    items.insert(0, item.clone());
}

/// Drops every item with the given id, keeping the rest in order.
pub(crate) fn remove_by_id<E: Entity>(items: &mut Vec<E>, id: &str) {
    items.retain(|item| item.id() != id);
}

/// Swaps an updated item in place; items that are not cached stay uncached.
pub(crate) fn replace_by_id<E: Entity>(items: &mut [E], updated: &E) {
    if let Some(slot) = items.iter_mut().find(|item| item.id() == updated.id()) {
        *slot = updated.clone();
    }
}
