use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A [`TypeRegistry`] shared between threads.
///
/// Sessions borrow the registry for their whole run, so take a
/// [`read`](Self::read) guard and lend it to the
/// [`Serializer`](crate::ser::Serializer).
///
/// ```
/// use vc_archive::registry::TypeRegistryArc;
///
/// let shared = TypeRegistryArc::default();
/// let other = shared.clone();
///
/// std::thread::spawn(move || {
///     assert!(other.read().is_empty());
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.read(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeRegistryArc;
    use crate::Archive;

    #[derive(Archive, Default)]
    struct Point {
        x: i32,
    }

    #[test]
    fn writes_are_visible_to_clones() {
        let shared = TypeRegistryArc::default();
        let other = shared.clone();
        shared.write().register::<Point>();
        assert!(other.read().contains::<Point>());
    }
}
