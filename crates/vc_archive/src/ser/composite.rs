use alloc::string::ToString;
use core::any::TypeId;

use crate::describe::Describe;
use crate::ser::Serializer;
use crate::ser::session::{Identity, StandIn};
use crate::value::{Array, Id, ScalarValue};
use crate::{Archive, Error};

impl Serializer<'_> {
    // -------------------------------------------------------------------------
    // Leaves

    pub fn write_scalar<V: ScalarValue>(&mut self, value: V, key: &str) -> Result<(), Error> {
        let id = self.next_id();
        self.archiver.archive_scalar(value.into_scalar(), key, id)
    }

    /// Writes an enum as its underlying `base` value, tagged with `ty`.
    pub fn write_enum<V: ScalarValue>(
        &mut self,
        base: V,
        ty: &str,
        key: &str,
    ) -> Result<(), Error> {
        let id = self.next_id();
        self.archiver.archive_enum(base.into_scalar(), ty, key, id)
    }

    /// Writes an absent value of type `ty`.
    pub fn write_null(&mut self, ty: &str, key: &str) -> Result<(), Error> {
        let id = self.next_id();
        self.write_null_for(id, ty, key)
    }

    /// Writes a `null` in place of the node `id` was taken for.
    pub(crate) fn write_null_for(&mut self, id: Id, ty: &str, key: &str) -> Result<(), Error> {
        self.session.stand_ins.insert(id, StandIn::Null);
        self.archiver.archive_null(ty, key)
    }

    /// Writes a reference to `target` in place of the node `id` was taken
    /// for.
    pub(crate) fn write_reference(&mut self, id: Id, target: Id, key: &str) -> Result<(), Error> {
        self.session.stand_ins.insert(id, StandIn::Reference(target));
        self.archiver.archive_reference(key, target)
    }

    pub fn write_string(&mut self, value: &str, key: &str) -> Result<(), Error> {
        let id = self.next_id();
        let array = Array::of(value.as_bytes());
        self.archiver.archive_string(&array, value, key, id)?;
        self.track_array(id, array);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Arrays and maps

    /// Writes `items` as an array, each element keyed by its index.
    ///
    /// The address range is recorded, so an array lying inside another
    /// archived array ends up as a slice of it.
    pub fn write_array<T: Archive>(&mut self, items: &[T], key: &str) -> Result<(), Error> {
        let id = self.next_id();
        let array = Array::of(items);
        self.archiver
            .begin_array(&array, T::type_name(), key, id)?;
        for (index, item) in items.iter().enumerate() {
            self.write(item, &index.to_string())?;
        }
        self.archiver.end_array()?;
        self.track_array(id, array);
        Ok(())
    }

    /// Writes an associative array.
    ///
    /// `addr` is the address of the container, which identifies it: a
    /// second occurrence of the same container is written as a reference.
    pub fn write_map<'v, K, V, I>(
        &mut self,
        addr: usize,
        entries: I,
        key: &str,
    ) -> Result<(), Error>
    where
        K: Archive,
        V: Archive,
        I: ExactSizeIterator<Item = (&'v K, &'v V)>,
    {
        let id = self.next_id();
        if !self.session.is_detached() {
            let identity = Identity::Map(addr, TypeId::of::<(K, V)>());
            if let Some(&existing) = self.session.references.get(&identity) {
                return self.write_reference(id, existing, key);
            }
            self.session.references.insert(identity, id);
        }

        self.archiver
            .begin_associative_array(K::type_name(), V::type_name(), entries.len(), key, id)?;
        for (index, (k, v)) in entries.enumerate() {
            let index = index.to_string();
            self.archiver.begin_entry_key(&index)?;
            self.write(k, &index)?;
            self.archiver.end_entry_key()?;
            self.archiver.begin_entry_value(&index)?;
            self.write(v, &index)?;
            self.archiver.end_entry_value()?;
        }
        self.archiver.end_associative_array()
    }

    // -------------------------------------------------------------------------
    // Aggregates

    /// Writes a described value as a `struct` node.
    ///
    /// Structs are values: they are never deduplicated.
    pub fn write_struct<T: Describe>(&mut self, value: &T, key: &str) -> Result<(), Error> {
        let id = self.next_id();
        self.archiver.begin_struct(T::type_name(), key, id)?;
        self.write_fields(value)?;
        self.archiver.end_struct()
    }

    /// Writes the members of `value` into the current scope.
    ///
    /// The first codec found wins: a session override, a registered
    /// serializer, the type's own [`CustomArchive`](crate::CustomArchive),
    /// and finally the field walk, followed by the `base` section.
    /// Lifecycle hooks run around whichever was chosen.
    pub fn write_fields<T: Describe>(&mut self, value: &T) -> Result<(), Error> {
        let descriptor = T::DESCRIPTOR;
        if let Some(hook) = descriptor.hooks.on_serializing {
            hook(value);
        }

        if let Some(custom) = self.find_serializer(TypeId::of::<T>()) {
            custom(value, self)?;
        } else if let Some(codec) = &descriptor.custom {
            (codec.to_archive)(value, self)?;
        } else {
            for field in descriptor.fields.iter().filter(|field| !field.skip) {
                (field.serialize)(value, self, field.name)?;
            }
            if let Some(base) = &descriptor.base {
                let id = self.next_id();
                self.archiver.begin_base((base.type_name)(), base.name, id)?;
                (base.serialize)(value, self)?;
                self.archiver.end_base()?;
            }
        }

        if let Some(hook) = descriptor.hooks.on_serialized {
            hook(value);
        }
        Ok(())
    }

    /// Writes a distinct type wrapping `inner`.
    ///
    /// The wrapped value gets its own id under a generated key.
    pub fn write_typedef<T: Archive>(
        &mut self,
        ty: &str,
        inner: &T,
        key: &str,
    ) -> Result<(), Error> {
        let id = self.next_id();
        self.archiver.begin_typedef(ty, key, id)?;
        let child = self.next_key();
        self.write(inner, &child)?;
        self.archiver.end_typedef()
    }
}
