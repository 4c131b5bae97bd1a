use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::TypeId;

use crate::archiver::NodeKind;
use crate::de::Deserializer;
use crate::describe::Describe;
use crate::value::{Id, ScalarValue, Slice};
use crate::{Archive, Error};

impl Deserializer<'_> {
    // -------------------------------------------------------------------------
    // Leaves

    pub fn read_scalar<V: ScalarValue>(&mut self, key: &str) -> Result<V, Error> {
        let scalar = self.unarchiver.unarchive_scalar(V::KIND, key)?;
        V::from_scalar(scalar)
            .ok_or_else(|| Error::type_mismatch(V::KIND.name(), scalar.kind().name()))
    }

    /// Reads the underlying value of an enum node.
    pub fn read_enum<V: ScalarValue>(&mut self, key: &str) -> Result<V, Error> {
        let scalar = self.unarchiver.unarchive_enum(V::KIND, key)?;
        V::from_scalar(scalar)
            .ok_or_else(|| Error::type_mismatch(V::KIND.name(), scalar.kind().name()))
    }

    /// Returns `true` if the node under `key` is `null`.
    #[inline]
    pub fn is_null(&self, key: &str) -> Result<bool, Error> {
        Ok(self.node(key)?.kind == NodeKind::Null)
    }

    /// Reads a string, or the part of another string a `slice` node names.
    pub fn read_string(&mut self, key: &str) -> Result<String, Error> {
        if self.node(key)?.kind != NodeKind::Slice {
            return self.unarchiver.unarchive_string(key).map(|(text, _)| text);
        }

        let slice = self.unarchiver.unarchive_slice(key)?;
        let owner: String = self.read_by_id(owner_of(&slice, key)?)?;
        owner
            .get(slice.offset..slice.offset + slice.length)
            .map(ToString::to_string)
            .ok_or_else(|| out_of_range(&slice, owner.len()))
    }

    // -------------------------------------------------------------------------
    // Arrays and maps

    /// Reads an array into an owned `Vec`.
    ///
    /// A `slice` node yields a copy of the named range of its owner. Use
    /// [`SharedSlice`](crate::SharedSlice) to keep the aliasing.
    pub fn read_array<T: Archive>(&mut self, key: &str) -> Result<Vec<T>, Error> {
        if self.node(key)?.kind != NodeKind::Slice {
            return self.read_elements(key);
        }

        let slice = self.unarchiver.unarchive_slice(key)?;
        let owner: Vec<T> = self.read_by_id(owner_of(&slice, key)?)?;
        if slice.offset + slice.length > owner.len() {
            return Err(out_of_range(&slice, owner.len()));
        }
        Ok(owner
            .into_iter()
            .skip(slice.offset)
            .take(slice.length)
            .collect())
    }

    /// Reads the elements of the `array` node under `key`.
    pub(crate) fn read_elements<T: Archive>(&mut self, key: &str) -> Result<Vec<T>, Error> {
        let header = self.unarchiver.begin_array(key)?;
        let mut items = Vec::new();
        for index in 0..header.length {
            items.push(self.read(&index.to_string())?);
        }
        self.unarchiver.end_array()?;
        Ok(items)
    }

    /// Reads the entries of an associative array, in archived order.
    ///
    /// A reference to a map written earlier yields a copy of its entries.
    pub fn read_entries<K: Archive, V: Archive>(
        &mut self,
        key: &str,
    ) -> Result<Vec<(K, V)>, Error> {
        if self.node(key)?.kind == NodeKind::Reference {
            let id = self.unarchiver.unarchive_reference(key)?;
            let depth = self.unarchiver.depth();
            let target = self.unarchiver.enter_by_id(id)?;
            let entries = self.read_entries(&target);
            self.unarchiver.restore(depth + 1);
            self.unarchiver.leave()?;
            return entries;
        }

        let header = self.unarchiver.begin_associative_array(key)?;
        let mut entries = Vec::new();
        for index in 0..header.length {
            let index = index.to_string();

            self.unarchiver.begin_entry_key(&index)?;
            let k = self.read(&index)?;
            self.unarchiver.end_entry_key()?;

            self.unarchiver.begin_entry_value(&index)?;
            let v = self.read(&index)?;
            self.unarchiver.end_entry_value()?;

            entries.push((k, v));
        }
        self.unarchiver.end_associative_array()?;
        Ok(entries)
    }

    // -------------------------------------------------------------------------
    // Aggregates

    /// Reads a `struct` node into a default-constructed `T`.
    pub fn read_struct<T: Describe>(&mut self, key: &str) -> Result<T, Error> {
        self.unarchiver.begin_struct(key)?;
        let mut value = T::default();
        self.populate(&mut value)?;
        self.unarchiver.end_struct()?;
        Ok(value)
    }

    /// Reads the members of `value` from the current scope.
    ///
    /// Mirrors [`Serializer::write_fields`](crate::Serializer::write_fields):
    /// the same codec is chosen, and the same hooks run around it.
    pub fn populate<T: Describe>(&mut self, value: &mut T) -> Result<(), Error> {
        let descriptor = T::DESCRIPTOR;
        if let Some(hook) = descriptor.hooks.on_deserializing {
            hook(value);
        }

        if let Some(custom) = self.find_deserializer(TypeId::of::<T>()) {
            custom(&mut *value, self)?;
        } else if let Some(codec) = &descriptor.custom {
            (codec.from_archive)(value, self)?;
        } else {
            for field in descriptor.fields.iter().filter(|field| !field.skip) {
                (field.deserialize)(value, self, field.name)?;
            }
            if let Some(base) = &descriptor.base {
                self.unarchiver.begin_base(base.name)?;
                (base.deserialize)(value, self)?;
                self.unarchiver.end_base()?;
            }
        }

        if let Some(hook) = descriptor.hooks.on_deserialized {
            hook(value);
        }
        Ok(())
    }

    /// Reads the value wrapped by a `typedef` node.
    pub fn read_typedef<T: Archive>(&mut self, key: &str) -> Result<T, Error> {
        self.unarchiver.begin_typedef(key)?;
        let child = self.unarchiver.sole_child_key()?;
        let inner = self.read(&child)?;
        self.unarchiver.end_typedef()?;
        Ok(inner)
    }
}

// -----------------------------------------------------------------------------
// Slice helpers

pub(super) fn owner_of(slice: &Slice, key: &str) -> Result<Id, Error> {
    slice
        .id
        .ok_or_else(|| Error::malformed(alloc::format!("slice `{key}` names no owning array")))
}

pub(super) fn out_of_range(slice: &Slice, len: usize) -> Error {
    Error::malformed(alloc::format!(
        "slice {}..{} is out of range for an owner of length {len}",
        slice.offset,
        slice.offset + slice.length,
    ))
}
