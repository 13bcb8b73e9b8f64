// pipewright/src/state/cell.rs

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, interior-mutable workflow state behind a `parking_lot::RwLock`.
///
/// Clones point at the same state, which is how several controller handles
/// observe one workflow.
///
/// IMPORTANT: guards obtained from this struct are blocking and MUST NOT be
/// held across `.await` suspension points.
#[derive(Debug)]
pub struct StateCell<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> StateCell<T> {
  pub fn new(data: T) -> Self {
    StateCell(Arc::new(RwLock::new(data)))
  }

  /// The returned guard must be dropped before any `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// The returned guard must be dropped before any `.await` point.
  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Runs `f` under the write lock and returns its result, releasing the lock
  /// before the caller can reach an `.await`.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    f(&mut self.0.write())
  }

  /// Whether both cells share the same state.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl<T: Send + Sync + 'static> Clone for StateCell<T> {
  fn clone(&self) -> Self {
    StateCell(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for StateCell<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
