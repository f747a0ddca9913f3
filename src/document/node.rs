//! Shared element handles

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an XML element in a paragraph tree.
///
/// The tree and the run views hold clones of the same handle, so an edit
/// made through a run is visible when the tree is written. Equality is
/// identity: use [`Node::ptr_eq`].
pub struct Node<T>(Arc<RwLock<T>>);

impl<T> Node<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Whether both handles refer to the same element
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(value) => f.debug_tuple("Node").field(&*value).finish(),
            None => f.write_str("Node(<locked>)"),
        }
    }
}
