use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::archiver::Archiver;
use crate::error::{ErrorAction, ErrorCallback, raise};
use crate::hash::{FixedHashState, TypeIdMap};
use crate::registry::{SerializeFn, TypeRegistry, erase_serializer};
use crate::ser::post_process::{ArrayFate, plan};
use crate::ser::session::{SerializeSession, ValueMeta};
use crate::value::{Array, Id};
use crate::{Archive, Error};

// -----------------------------------------------------------------------------
// Serializer

/// Walks a value graph and drives an [`Archiver`].
///
/// A serializer borrows its backend and its [`TypeRegistry`]. Each call to
/// [`serialize`](Self::serialize) is one session: ids and keys restart at
/// zero and every identity table starts empty.
///
/// Types implement [`Archive::serialize`] by calling the `write_*` methods,
/// and reach their children through [`write`](Self::write).
///
/// # Example
///
/// ```ignore
/// let registry = TypeRegistry::new();
/// let mut archiver = XmlArchiver::new();
/// let mut serializer = Serializer::new(&mut archiver, &registry);
///
/// let bytes = serializer.serialize(&vec![27, 382, 283], "")?;
/// ```
pub struct Serializer<'a> {
    pub(super) archiver: &'a mut dyn Archiver,
    pub(super) registry: &'a TypeRegistry,
    overrides: TypeIdMap<SerializeFn>,
    on_error: ErrorCallback,
    pub(super) session: SerializeSession,
}

impl<'a> Serializer<'a> {
    /// Creates a serializer raising every error.
    pub fn new(archiver: &'a mut dyn Archiver, registry: &'a TypeRegistry) -> Self {
        Self {
            archiver,
            registry,
            overrides: TypeIdMap::with_hasher(FixedHashState),
            on_error: Box::new(raise),
            session: SerializeSession::new(),
        }
    }

    /// Replaces the error policy, see [`ErrorCallback`].
    #[inline]
    pub fn set_error_callback(&mut self, callback: impl FnMut(&Error) -> ErrorAction + 'static) {
        self.on_error = Box::new(callback);
    }

    /// Builder form of [`set_error_callback`](Self::set_error_callback).
    #[inline]
    pub fn with_error_callback(
        mut self,
        callback: impl FnMut(&Error) -> ErrorAction + 'static,
    ) -> Self {
        self.set_error_callback(callback);
        self
    }

    /// Installs a serializer for `T` that takes precedence over the
    /// registry and over `T`'s own codec, for this serializer only.
    pub fn override_serializer<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &mut Serializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.overrides
            .insert(TypeId::of::<T>(), erase_serializer::<T, F>(f));
        self
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Serializes `value` as the root of a new archive and returns the
    /// encoded bytes.
    ///
    /// An empty `key` is replaced by the first generated key, `"0"`.
    pub fn serialize<T: Archive>(&mut self, value: &T, key: &str) -> Result<Vec<u8>, Error> {
        self.session.clear();
        log::debug!("serializing `{}`", T::type_name());

        let result = self.run(value, key);

        // Recorded addresses are only meaningful while the handles live.
        self.session.clear();
        result
    }

    fn run<T: Archive>(&mut self, value: &T, key: &str) -> Result<Vec<u8>, Error> {
        if let Err(err) = self.archiver.begin_archiving() {
            return Err(self.fail(err));
        }

        let key = match key {
            "" => self.next_key(),
            key => key.to_string(),
        };
        self.write(value, &key)?;

        if let Err(err) = self.post_process() {
            return Err(self.fail(err));
        }
        self.archiver.flush().map_err(|err| self.fail(err))
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Writes `value` under `key` in the current scope.
    ///
    /// This is where the error policy applies: if writing fails, the error
    /// callback decides between aborting and skipping the value.
    pub fn write<T: Archive>(&mut self, value: &T, key: &str) -> Result<(), Error> {
        let depth = self.archiver.depth();
        match value.serialize(self, key) {
            Ok(()) => Ok(()),
            Err(err) => self.recover(err, depth),
        }
    }

    /// Like [`write`](Self::write), for a temporary built by a custom codec.
    ///
    /// The temporary's arrays and maps are not recorded, so its addresses,
    /// which may be reused once it is dropped, cannot alias anything.
    pub fn write_detached<T: Archive>(&mut self, value: &T, key: &str) -> Result<(), Error> {
        self.session.detached += 1;
        let result = self.write(value, key);
        self.session.detached -= 1;
        result
    }

    fn recover(&mut self, err: Error, depth: usize) -> Result<(), Error> {
        if self.session.unwinding.is_some() {
            return Err(err);
        }
        match (self.on_error)(&err) {
            ErrorAction::Raise => {
                self.session.unwinding = Some(ErrorAction::Raise);
                Err(err)
            }
            ErrorAction::Ignore => {
                log::debug!("skipping a value after an ignored error");
                self.archiver.restore(depth);
                Ok(())
            }
        }
    }

    /// Reports a session-level error, which always aborts.
    fn fail(&mut self, err: Error) -> Error {
        if self.session.unwinding.is_none() {
            let _ = (self.on_error)(&err);
            self.session.unwinding = Some(ErrorAction::Raise);
        }
        err
    }

    // -------------------------------------------------------------------------
    // Counters and lookups

    /// Takes the next id.
    #[inline]
    pub fn next_id(&mut self) -> Id {
        let id = self.session.next_id;
        self.session.next_id += 1;
        id
    }

    /// Takes the next generated key.
    #[inline]
    pub fn next_key(&mut self) -> String {
        let key = self.session.next_key;
        self.session.next_key += 1;
        key.to_string()
    }

    /// Where the cell at `addr` was written as a value, if it was.
    #[inline]
    pub fn value_meta(&self, addr: usize) -> Option<&ValueMeta> {
        self.session.values.get(&addr)
    }

    /// The custom serializer of `type_id`: session override first, then
    /// the registry.
    pub(crate) fn find_serializer(&self, type_id: TypeId) -> Option<SerializeFn> {
        self.overrides
            .get(&type_id)
            .or_else(|| self.registry.serializer(type_id))
            .cloned()
    }

    /// Keeps `handle` alive until the end of the session.
    #[inline]
    pub(crate) fn keep_alive(&mut self, handle: Box<dyn Any>) {
        self.session.keep_alive.push(handle);
    }

    /// Records a written array for slice post-processing.
    pub(crate) fn track_array(&mut self, id: Id, array: Array) {
        if array.length != 0 && !self.session.is_detached() {
            self.session.arrays.push((id, array));
        }
    }

    // -------------------------------------------------------------------------
    // Post-processing

    fn post_process(&mut self) -> Result<(), Error> {
        for fate in plan(&self.session.arrays) {
            match fate {
                ArrayFate::Slice {
                    slice,
                    slice_id,
                    array_id,
                } => self.archiver.archive_slice(slice, slice_id, array_id)?,
                ArrayFate::Owner(id) => self.archiver.post_process_array(id)?,
            }
        }
        Ok(())
    }
}
