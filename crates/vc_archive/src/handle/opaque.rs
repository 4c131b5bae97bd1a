use alloc::rc::Rc;
use core::any::{Any, type_name};
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// A nullable pointer to a value the engine cannot walk on its own.
///
/// `T` needs no [`Archive`] impl. Instead a codec must be registered with
/// [`TypeRegistry::register_serializer`] and
/// [`TypeRegistry::register_deserializer`] (or overridden on the session);
/// archiving a non-null `OpaquePtr` without one reports
/// [`Error::MissingCodec`].
///
/// [`TypeRegistry::register_serializer`]: crate::registry::TypeRegistry::register_serializer
/// [`TypeRegistry::register_deserializer`]: crate::registry::TypeRegistry::register_deserializer
pub struct OpaquePtr<T>(Option<Rc<RefCell<T>>>);

impl<T> OpaquePtr<T> {
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub fn new(value: T) -> Self {
        Self(Some(Rc::new(RefCell::new(value))))
    }

    #[inline]
    pub(crate) fn from_rc(rc: Option<Rc<RefCell<T>>>) -> Self {
        Self(rc)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn borrow(&self) -> Option<Ref<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow())
    }

    #[inline]
    pub fn borrow_mut(&self) -> Option<RefMut<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow_mut())
    }

    #[inline]
    pub fn ptr_eq(&self, other: &OpaquePtr<T>) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Default for OpaquePtr<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Clone for OpaquePtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for OpaquePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(rc) => write!(f, "OpaquePtr<{}>({:p})", type_name::<T>(), Rc::as_ptr(rc)),
            None => write!(f, "OpaquePtr<{}>(null)", type_name::<T>()),
        }
    }
}

impl<T: Any + Default> Archive for OpaquePtr<T> {
    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_opaque(self.0.as_ref(), key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_opaque(key).map(Self::from_rc)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(Self::null())
    }
}
