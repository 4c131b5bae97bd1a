use alloc::rc::Rc;
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use core::fmt;

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error, ObjectType};

/// A shared, identity-tracked object.
///
/// Two `Obj` handles to the same allocation are archived once; every later
/// occurrence becomes a `reference` node, so identity and cycles survive a
/// round trip. `T` may be a trait object implementing
/// [`ObjectType`], in which case the concrete type is resolved through the
/// [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// # Example
///
/// ```
/// use vc_archive::Obj;
///
/// let a = Obj::new(5_i32);
/// let b = a.clone();
/// *b.borrow_mut() += 1;
///
/// assert!(a.ptr_eq(&b));
/// assert_eq!(*a.borrow(), 6);
/// ```
pub struct Obj<T: ?Sized>(Rc<RefCell<T>>);

impl<T> Obj<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }
}

impl<T: ?Sized> Obj<T> {
    /// Wraps an existing allocation.
    #[inline]
    pub fn from_rc(rc: Rc<RefCell<T>>) -> Self {
        Self(rc)
    }

    #[inline]
    pub fn as_rc(&self) -> &Rc<RefCell<T>> {
        &self.0
    }

    #[inline]
    pub fn into_rc(self) -> Rc<RefCell<T>> {
        self.0
    }

    /// Immutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn try_borrow(&self) -> Result<Ref<'_, T>, BorrowError> {
        self.0.try_borrow()
    }

    #[inline]
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, T>, BorrowMutError> {
        self.0.try_borrow_mut()
    }

    /// Returns `true` if both handles point to the same allocation,
    /// whatever their static types.
    #[inline]
    pub fn ptr_eq<U: ?Sized>(&self, other: &Obj<U>) -> bool {
        self.addr() == other.addr()
    }

    /// The address identifying this object.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl<T: ?Sized> Clone for Obj<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Obj<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

// Objects may form cycles, so only the address is printed.
impl<T: ?Sized> fmt::Debug for Obj<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({:#x})", self.addr())
    }
}

impl<T: ?Sized + ObjectType> Archive for Obj<T> {
    #[inline]
    fn type_name() -> &'static str {
        T::static_type_name()
    }

    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_object(self, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_object(key)
    }
}
