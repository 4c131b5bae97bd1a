use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// A value cell whose storage can be pointed at.
///
/// A `Shared<T>` is archived exactly like `T`. The engine additionally
/// remembers where it wrote it, so that a [`Ptr`](crate::Ptr) to the same
/// cell becomes a `reference` to that node instead of a second copy.
///
/// Equality compares the contents.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// # Panics
    ///
    /// Panics if the cell is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// # Panics
    ///
    /// Panics if the cell is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.0.try_borrow().ok()
    }

    /// Replaces the content, returning the old one.
    #[inline]
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    #[inline]
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    #[inline]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles share the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Shared<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The address identifying this cell.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).addr()
    }
}

impl<T> Clone for Shared<T> {
    /// Clones the handle, not the content.
    #[inline]
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Shared").field(&*value).finish(),
            Err(_) => f.write_str("Shared(<borrowed>)"),
        }
    }
}

impl<T: Archive> Archive for Shared<T> {
    #[inline]
    fn type_name() -> &'static str {
        T::type_name()
    }

    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_shared(self, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_shared(key)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        T::fallback().map(Self::new)
    }
}
