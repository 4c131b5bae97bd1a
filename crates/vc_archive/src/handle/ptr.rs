use core::cell::Ref;
use core::fmt;

use crate::de::Deserializer;
use crate::handle::Shared;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// A nullable pointer to a [`Shared`] cell.
///
/// Archived as a `pointer` node. If the target cell was already written
/// somewhere else, the pointer holds a `reference` to it; otherwise it
/// holds the target itself, and a later occurrence of the cell becomes the
/// reference.
///
/// ```
/// use vc_archive::{Ptr, Shared};
///
/// let value = Shared::new(7_i32);
/// let ptr = Ptr::to(&value);
/// value.set(8);
///
/// assert!(ptr.points_to(&value));
/// assert_eq!(ptr.get(), Some(8));
/// ```
pub struct Ptr<T>(Option<Shared<T>>);

impl<T> Ptr<T> {
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    /// Points at an existing cell.
    #[inline]
    pub fn to(target: &Shared<T>) -> Self {
        Self(Some(target.clone()))
    }

    /// Points at a fresh cell holding `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self(Some(Shared::new(value)))
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn target(&self) -> Option<&Shared<T>> {
        self.0.as_ref()
    }

    /// Returns `true` if this pointer targets `cell`.
    #[inline]
    pub fn points_to(&self, cell: &Shared<T>) -> bool {
        self.0.as_ref().is_some_and(|target| target.ptr_eq(cell))
    }

    #[inline]
    pub fn borrow(&self) -> Option<Ref<'_, T>> {
        self.0.as_ref().map(Shared::borrow)
    }

    #[inline]
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.0.as_ref().map(Shared::get)
    }
}

impl<T> Default for Ptr<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Clone for Ptr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Ptr<T> {
    /// Compares the pointees.
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(target) => f.debug_tuple("Ptr").field(target).finish(),
            None => f.write_str("Ptr(null)"),
        }
    }
}

impl<T: Archive> Archive for Ptr<T> {
    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_pointer(self.0.as_ref(), key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_pointer(key).map(Self)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(Self::null())
    }
}
