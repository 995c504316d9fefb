// cartkeep/src/pipeline/context_data.rs

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state for a single pipeline run.
///
/// Every step handler receives a clone of the same `ContextData`, so writes made
/// by one step are visible to the next.
///
/// IMPORTANT: guards returned by [`read`](Self::read) and [`write`](Self::write)
/// are blocking `parking_lot` guards and MUST be dropped before any `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}
