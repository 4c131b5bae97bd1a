use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::{Any, TypeId};

use crate::archiver::{NodeHeader, Unarchiver};
use crate::de::session::DeserializeSession;
use crate::error::{ErrorAction, ErrorCallback, raise};
use crate::hash::{FixedHashState, TypeIdMap};
use crate::registry::{DeserializeFn, TypeRegistry, erase_deserializer};
use crate::value::Id;
use crate::{Archive, Error};

// -----------------------------------------------------------------------------
// Deserializer

/// Rebuilds a value graph from an [`Unarchiver`].
///
/// The mirror of [`Serializer`](crate::ser::Serializer). Reads are keyed, so
/// a reference may point at a node that was not read yet: the deserializer
/// then jumps to it by id, builds it, and hands out the same instance when
/// the node is reached again in order.
///
/// # Error policy
///
/// An error is reported to the callback once, from the innermost value that
/// failed. [`ErrorAction::Ignore`] replaces that value with its
/// [`Archive::fallback`]; a value without one (an object handle) passes the
/// failure to the closest enclosing value that has one.
pub struct Deserializer<'a> {
    pub(super) unarchiver: &'a mut dyn Unarchiver,
    pub(super) registry: &'a TypeRegistry,
    overrides: TypeIdMap<DeserializeFn>,
    on_error: ErrorCallback,
    pub(super) session: DeserializeSession,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer raising every error.
    pub fn new(unarchiver: &'a mut dyn Unarchiver, registry: &'a TypeRegistry) -> Self {
        Self {
            unarchiver,
            registry,
            overrides: TypeIdMap::with_hasher(FixedHashState),
            on_error: Box::new(raise),
            session: DeserializeSession::new(),
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

    /// Installs a deserializer for `T` that takes precedence over the
    /// registry and over `T`'s own codec, for this deserializer only.
    pub fn override_deserializer<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&mut T, &mut Deserializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.overrides
            .insert(TypeId::of::<T>(), erase_deserializer::<T, F>(f));
        self
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Reads the root value stored under `key` in `data`.
    ///
    /// An empty `key` stands for the first generated key, `"0"`.
    pub fn deserialize<T: Archive>(&mut self, data: &[u8], key: &str) -> Result<T, Error> {
        self.session.clear();
        log::debug!("deserializing `{}`", T::type_name());

        let result = self.run(data, key);
        self.session.clear();
        result
    }

    fn run<T: Archive>(&mut self, data: &[u8], key: &str) -> Result<T, Error> {
        if let Err(err) = self.unarchiver.begin_unarchiving(data) {
            return Err(self.fail(err));
        }

        let key = match key {
            "" => self.next_key(),
            key => key.to_string(),
        };
        self.read(&key)
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Reads the node under `key` in the current scope as a `T`.
    ///
    /// This is where the error policy applies, see the type docs.
    pub fn read<T: Archive>(&mut self, key: &str) -> Result<T, Error> {
        let depth = self.unarchiver.depth();
        match T::deserialize(self, key) {
            Ok(value) => Ok(value),
            Err(err) => self.recover(err, depth),
        }
    }

    fn recover<T: Archive>(&mut self, err: Error, depth: usize) -> Result<T, Error> {
        let action = match self.session.unwinding {
            Some(action) => action,
            None => (self.on_error)(&err),
        };
        match action {
            ErrorAction::Raise => {
                self.session.unwinding = Some(ErrorAction::Raise);
                Err(err)
            }
            ErrorAction::Ignore => match T::fallback() {
                Some(value) => {
                    log::debug!("substituting a fallback `{}`", T::type_name());
                    self.session.unwinding = None;
                    self.unarchiver.restore(depth);
                    Ok(value)
                }
                None => {
                    self.session.unwinding = Some(ErrorAction::Ignore);
                    Err(err)
                }
            },
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

    /// Reads the node carrying `id` wherever it is in the archive, then
    /// returns to the current scope.
    pub fn read_by_id<T: Archive>(&mut self, id: Id) -> Result<T, Error> {
        let depth = self.unarchiver.depth();
        let key = self.unarchiver.enter_by_id(id)?;
        let result = self.read(&key);
        // An error passed up unrecovered can leave inner scopes open.
        self.unarchiver.restore(depth + 1);
        self.unarchiver.leave()?;
        result
    }

    // -------------------------------------------------------------------------
    // Counters and lookups

    /// Takes the next generated key.
    #[inline]
    pub fn next_key(&mut self) -> String {
        let key = self.session.next_key;
        self.session.next_key += 1;
        key.to_string()
    }

    /// Describes the node under `key` in the current scope.
    #[inline]
    pub fn node(&self, key: &str) -> Result<NodeHeader, Error> {
        self.unarchiver.node(key)
    }

    /// The custom deserializer of `type_id`: session override first, then
    /// the registry.
    pub(crate) fn find_deserializer(&self, type_id: TypeId) -> Option<DeserializeFn> {
        self.overrides
            .get(&type_id)
            .or_else(|| self.registry.deserializer(type_id))
            .cloned()
    }
}
