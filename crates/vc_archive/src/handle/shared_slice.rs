use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use core::ops::Range;

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// A view into a shared, growable buffer.
///
/// Views created with [`SharedSlice::slice`] alias their parent: a write
/// through one is visible through the other. When both a buffer and a
/// sub-view of it are archived, the sub-view is written as a `slice` node
/// and reading it back restores the aliasing.
///
/// ```
/// use vc_archive::SharedSlice;
///
/// let all = SharedSlice::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7]);
/// let mid = all.slice(3..7).unwrap();
///
/// mid.borrow_mut()[0] = 30;
/// assert_eq!(all.borrow()[3], 30);
/// ```
pub struct SharedSlice<T> {
    buffer: Rc<RefCell<Vec<T>>>,
    start: usize,
    len: usize,
}

impl<T> SharedSlice<T> {
    /// A view covering all of `items`.
    #[inline]
    pub fn from_vec(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            buffer: Rc::new(RefCell::new(items)),
            start: 0,
            len,
        }
    }

    /// A view of `len` elements starting at `start`, `None` if it does not
    /// fit inside `buffer`.
    pub(crate) fn from_parts(
        buffer: Rc<RefCell<Vec<T>>>,
        start: usize,
        len: usize,
    ) -> Option<Self> {
        let end = start.checked_add(len)?;
        if end > buffer.borrow().len() {
            return None;
        }
        Some(Self { buffer, start, len })
    }

    #[inline]
    pub(crate) fn buffer(&self) -> &Rc<RefCell<Vec<T>>> {
        &self.buffer
    }

    /// A sub-view, with `range` relative to this view.
    pub fn slice(&self, range: Range<usize>) -> Option<Self> {
        if range.start > range.end || range.end > self.len {
            return None;
        }
        Some(Self {
            buffer: Rc::clone(&self.buffer),
            start: self.start + range.start,
            len: range.end - range.start,
        })
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of this view in the underlying buffer.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.start
    }

    /// Returns `true` if both views alias the same buffer.
    #[inline]
    pub fn shares_buffer(&self, other: &SharedSlice<T>) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// # Panics
    ///
    /// Panics if the buffer is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, [T]> {
        let range = self.start..self.start + self.len;
        Ref::map(self.buffer.borrow(), |items| &items[range])
    }

    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, [T]> {
        let range = self.start..self.start + self.len;
        RefMut::map(self.buffer.borrow_mut(), |items| &mut items[range])
    }

    #[inline]
    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, [T]>> {
        let range = self.start..self.start + self.len;
        let items = self.buffer.try_borrow().ok()?;
        Some(Ref::map(items, |items| &items[range]))
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.borrow().to_vec()
    }
}

impl<T> Clone for SharedSlice<T> {
    /// Clones the view, not the elements.
    #[inline]
    fn clone(&self) -> Self {
        Self {
            buffer: Rc::clone(&self.buffer),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> Default for SharedSlice<T> {
    #[inline]
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<T> From<Vec<T>> for SharedSlice<T> {
    #[inline]
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: PartialEq> PartialEq for SharedSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.borrow() == *other.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Some(items) => f.debug_list().entries(items.iter()).finish(),
            None => f.write_str("SharedSlice(<borrowed>)"),
        }
    }
}

impl<T: Archive> Archive for SharedSlice<T> {
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        let items = self
            .try_borrow()
            .ok_or(Error::InvalidState("slice buffer is mutably borrowed"))?;
        s.write_array(&items, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_shared_slice(key)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::SharedSlice;

    #[test]
    fn nested_views_alias() {
        let all = SharedSlice::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let mid = all.slice(2..6).unwrap();
        let inner = mid.slice(1..3).unwrap();

        assert_eq!(inner.offset(), 3);
        assert_eq!(&*inner.borrow(), &[3, 4]);

        inner.borrow_mut()[1] = 40;
        assert_eq!(all.borrow()[4], 40);
        assert!(inner.shares_buffer(&all));
    }

    #[test]
    fn out_of_range_views() {
        let all = SharedSlice::from_vec(vec![1, 2, 3]);
        assert!(all.slice(2..4).is_none());
        assert!(all.slice(3..3).is_some_and(|s| s.is_empty()));
        assert!(SharedSlice::from_parts(all.buffer().clone(), 2, 2).is_none());
    }
}
