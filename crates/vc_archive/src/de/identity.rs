use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;

use crate::archiver::{NodeKind, ObjectHeader};
use crate::de::Deserializer;
use crate::de::composite::{out_of_range, owner_of};
use crate::de::session::ObjectSlot;
use crate::handle::{Obj, Ptr, Shared, SharedSlice};
use crate::value::Id;
use crate::{Archive, Error, ObjectType};

impl Deserializer<'_> {
    // -------------------------------------------------------------------------
    // Objects

    /// Reads an object handle.
    ///
    /// Every path to the same archived object yields a handle to the same
    /// allocation. The object is recorded before its members are read, so
    /// a cycle back to it resolves to the handle being built.
    pub fn read_object<T: ?Sized + ObjectType>(&mut self, key: &str) -> Result<Obj<T>, Error> {
        let header = self.node(key)?;
        match header.kind {
            NodeKind::Reference => {
                let id = self.unarchiver.unarchive_reference(key)?;
                self.resolve_object(id)
            }
            NodeKind::Object => match header.id {
                Some(id) if self.session.objects.contains_key(&id) => self.object_view(id),
                _ => self.build_object(key),
            },
            found => Err(Error::unexpected(key, "object", found)),
        }
    }

    fn resolve_object<T: ?Sized + ObjectType>(&mut self, id: Id) -> Result<Obj<T>, Error> {
        if self.session.objects.contains_key(&id) {
            return self.object_view(id);
        }
        self.read_by_id(id)
    }

    fn build_object<T: ?Sized + ObjectType>(&mut self, key: &str) -> Result<Obj<T>, Error> {
        let header = self.unarchiver.begin_object(key)?;
        let allocated = match header.runtime_type == T::static_type_name() {
            true => T::allocate(),
            false => None,
        };
        let obj = match allocated {
            Some(obj) => self.populate_static(&header, obj)?,
            None => self.populate_polymorphic(&header)?,
        };
        self.unarchiver.end_object()?;
        Ok(obj)
    }

    /// Fills an object whose runtime type is the handle's own type.
    fn populate_static<T: ?Sized + ObjectType>(
        &mut self,
        header: &ObjectHeader,
        obj: Obj<T>,
    ) -> Result<Obj<T>, Error> {
        self.session.objects.insert(
            header.id,
            ObjectSlot::new(&header.runtime_type, Box::new(obj.clone())),
        );

        let mut value = obj
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState("object is already borrowed"))?;
        let type_id = value.as_any().type_id();
        if let Some(custom) = self.find_deserializer(type_id) {
            custom(value.as_any_mut(), self)?;
        } else if let Some(result) = T::populate_static(&mut value, self) {
            result?;
        } else {
            let registry = self.registry;
            let entry = registry
                .get_with_name(&header.runtime_type)
                .ok_or_else(|| Error::unregistered(&header.runtime_type))?;
            entry.populate(value.as_any_mut(), self)?;
        }
        drop(value);
        Ok(obj)
    }

    /// Allocates an object by its runtime name and views it as a `T`.
    fn populate_polymorphic<T: ?Sized + ObjectType>(
        &mut self,
        header: &ObjectHeader,
    ) -> Result<Obj<T>, Error> {
        let registry = self.registry;
        let entry = registry
            .get_with_name(&header.runtime_type)
            .ok_or_else(|| Error::unregistered(&header.runtime_type))?;

        let handle = entry.allocate();
        let view = entry
            .upcast::<T>(&*handle)
            .ok_or_else(|| Error::type_mismatch(T::static_type_name(), &header.runtime_type))?;
        let mut slot = ObjectSlot::new(&header.runtime_type, handle);
        slot.push(Box::new(view.clone()));
        self.session.objects.insert(header.id, slot);

        let mut value = view
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState("object is already borrowed"))?;
        match self.find_deserializer(entry.type_id()) {
            Some(custom) => custom(value.as_any_mut(), self)?,
            None => entry.populate(value.as_any_mut(), self)?,
        }
        drop(value);
        Ok(view)
    }

    /// A `T` handle to the object already built for `id`.
    fn object_view<T: ?Sized + ObjectType>(&mut self, id: Id) -> Result<Obj<T>, Error> {
        let registry = self.registry;
        let slot = self
            .session
            .objects
            .get_mut(&id)
            .ok_or(Error::MissingId { id })?;
        if let Some(obj) = slot.find::<T>() {
            return Ok(obj);
        }

        let entry = registry
            .get_with_name(&slot.runtime_type)
            .ok_or_else(|| Error::unregistered(&slot.runtime_type))?;
        let view = entry
            .upcast::<T>(slot.origin())
            .ok_or_else(|| Error::type_mismatch(T::static_type_name(), &slot.runtime_type))?;
        slot.push(Box::new(view.clone()));
        Ok(view)
    }

    // -------------------------------------------------------------------------
    // Cells and pointers

    /// Reads a cell, or the cell an earlier path already produced.
    ///
    /// When `T` has a fallback, the cell is registered before its content
    /// is read, so pointers inside the content can refer back to it.
    pub fn read_shared<T: Archive>(&mut self, key: &str) -> Result<Shared<T>, Error> {
        let header = self.node(key)?;
        if header.kind == NodeKind::Reference {
            let id = self.unarchiver.unarchive_reference(key)?;
            return self.resolve_shared(id);
        }

        let Some(id) = header.id else {
            return T::deserialize(self, key).map(Shared::new);
        };
        if let Some(cell) = self.shared_cell::<T>(id)? {
            return Ok(cell);
        }

        match T::fallback() {
            Some(placeholder) => {
                let cell = Shared::new(placeholder);
                self.session.values.insert(id, Box::new(cell.clone()));
                let value = T::deserialize(self, key)?;
                cell.set(value);
                Ok(cell)
            }
            None => {
                let cell = Shared::new(T::deserialize(self, key)?);
                self.session.values.insert(id, Box::new(cell.clone()));
                Ok(cell)
            }
        }
    }

    fn resolve_shared<T: Archive>(&mut self, id: Id) -> Result<Shared<T>, Error> {
        match self.shared_cell::<T>(id)? {
            Some(cell) => Ok(cell),
            None => self.read_by_id(id),
        }
    }

    fn shared_cell<T: Archive>(&self, id: Id) -> Result<Option<Shared<T>>, Error> {
        match self.session.values.get(&id) {
            None => Ok(None),
            Some(cell) => match cell.downcast_ref::<Shared<T>>() {
                Some(cell) => Ok(Some(cell.clone())),
                None => Err(Error::type_mismatch(T::type_name(), "a value of another type")),
            },
        }
    }

    /// Reads a pointer, returning the cell it points at.
    pub fn read_pointer<T: Archive>(&mut self, key: &str) -> Result<Option<Shared<T>>, Error> {
        let header = self.node(key)?;
        match header.kind {
            NodeKind::Null => Ok(None),
            NodeKind::Reference => {
                let id = self.unarchiver.unarchive_reference(key)?;
                if let Some(target) = self.pointer_target::<T>(id)? {
                    return Ok(Some(target));
                }
                let ptr: Ptr<T> = self.read_by_id(id)?;
                Ok(ptr.target().cloned())
            }
            NodeKind::Pointer => {
                if let Some(id) = header.id
                    && let Some(target) = self.pointer_target::<T>(id)?
                {
                    return Ok(Some(target));
                }

                let id = self.unarchiver.begin_pointer(key)?;
                let child = self.unarchiver.sole_child_key()?;
                let target = self.read_shared::<T>(&child)?;
                self.unarchiver.end_pointer()?;

                self.session.pointers.insert(id, Box::new(target.clone()));
                Ok(Some(target))
            }
            found => Err(Error::unexpected(key, "pointer", found)),
        }
    }

    fn pointer_target<T: Archive>(&self, id: Id) -> Result<Option<Shared<T>>, Error> {
        match self.session.pointers.get(&id) {
            None => Ok(None),
            Some(target) => match target.downcast_ref::<Shared<T>>() {
                Some(target) => Ok(Some(target.clone())),
                None => Err(Error::type_mismatch(T::type_name(), "a pointer of another type")),
            },
        }
    }

    /// Reads a pointer whose target only a registered codec can read.
    pub fn read_opaque<T: Any + Default>(
        &mut self,
        key: &str,
    ) -> Result<Option<Rc<RefCell<T>>>, Error> {
        let header = self.node(key)?;
        match header.kind {
            NodeKind::Null => Ok(None),
            NodeKind::Reference => {
                let id = self.unarchiver.unarchive_reference(key)?;
                if let Some(target) = self.opaque_target::<T>(id)? {
                    return Ok(Some(target));
                }
                let depth = self.unarchiver.depth();
                let target = self.unarchiver.enter_by_id(id)?;
                let result = self.read_opaque(&target);
                self.unarchiver.restore(depth + 1);
                self.unarchiver.leave()?;
                result
            }
            NodeKind::Pointer => {
                if let Some(id) = header.id
                    && let Some(target) = self.opaque_target::<T>(id)?
                {
                    return Ok(Some(target));
                }

                let id = self.unarchiver.begin_pointer(key)?;
                let codec = self
                    .find_deserializer(TypeId::of::<T>())
                    .ok_or_else(|| Error::missing_codec(type_name::<T>()))?;
                let target = Rc::new(RefCell::new(T::default()));
                self.session.opaque.insert(id, Box::new(target.clone()));

                let mut value = target
                    .try_borrow_mut()
                    .map_err(|_| Error::InvalidState("pointee is already borrowed"))?;
                codec(&mut *value, self)?;
                drop(value);
                self.unarchiver.end_pointer()?;
                Ok(Some(target))
            }
            found => Err(Error::unexpected(key, "pointer", found)),
        }
    }

    fn opaque_target<T: Any>(&self, id: Id) -> Result<Option<Rc<RefCell<T>>>, Error> {
        match self.session.opaque.get(&id) {
            None => Ok(None),
            Some(target) => match target.downcast_ref::<Rc<RefCell<T>>>() {
                Some(target) => Ok(Some(target.clone())),
                None => Err(Error::type_mismatch(type_name::<T>(), "a pointee of another type")),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Slices

    /// Reads an array whose sub-views keep aliasing after the round trip.
    ///
    /// A `slice` node becomes a view into the buffer of its owning array,
    /// which is read first if it was not reached yet.
    pub fn read_shared_slice<T: Archive>(&mut self, key: &str) -> Result<SharedSlice<T>, Error> {
        let header = self.node(key)?;
        match header.kind {
            NodeKind::Slice => {
                let slice = self.unarchiver.unarchive_slice(key)?;
                let buffer = self.shared_buffer::<T>(owner_of(&slice, key)?)?;
                let len = buffer.borrow().len();
                SharedSlice::from_parts(buffer, slice.offset, slice.length)
                    .ok_or_else(|| out_of_range(&slice, len))
            }
            NodeKind::Array => {
                let buffer = match header.id {
                    Some(id) => match self.array_buffer::<T>(id)? {
                        Some(buffer) => buffer,
                        None => {
                            let buffer = Rc::new(RefCell::new(self.read_elements(key)?));
                            self.session.arrays.insert(id, Box::new(buffer.clone()));
                            buffer
                        }
                    },
                    None => Rc::new(RefCell::new(self.read_elements(key)?)),
                };
                let len = buffer.borrow().len();
                SharedSlice::from_parts(buffer, 0, len)
                    .ok_or(Error::InvalidState("buffer changed while being read"))
            }
            found => Err(Error::unexpected(key, "array", found)),
        }
    }

    fn shared_buffer<T: Archive>(&mut self, owner: Id) -> Result<Rc<RefCell<Vec<T>>>, Error> {
        if let Some(buffer) = self.array_buffer::<T>(owner)? {
            return Ok(buffer);
        }
        let whole: SharedSlice<T> = self.read_by_id(owner)?;
        Ok(whole.buffer().clone())
    }

    fn array_buffer<T: Archive>(&self, id: Id) -> Result<Option<Rc<RefCell<Vec<T>>>>, Error> {
        match self.session.arrays.get(&id) {
            None => Ok(None),
            Some(buffer) => match buffer.downcast_ref::<Rc<RefCell<Vec<T>>>>() {
                Some(buffer) => Ok(Some(buffer.clone())),
                None => Err(Error::type_mismatch(T::type_name(), "an array of another type")),
            },
        }
    }
}
