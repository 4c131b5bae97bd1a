use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::ToString;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;

use crate::handle::{Obj, Shared};
use crate::ser::Serializer;
use crate::ser::session::{Identity, StandIn, ValueMeta};
use crate::{Archive, Error, ObjectType};

impl Serializer<'_> {
    /// Writes an object, or a reference if it was written before.
    ///
    /// The identity is recorded before the members are walked, so a cycle
    /// back to the object ends in a reference.
    pub fn write_object<T: ?Sized + ObjectType>(
        &mut self,
        obj: &Obj<T>,
        key: &str,
    ) -> Result<(), Error> {
        let id = self.next_id();
        let identity = Identity::Object(obj.addr());
        if let Some(&existing) = self.session.references.get(&identity) {
            return self.write_reference(id, existing, key);
        }
        self.session.references.insert(identity, id);
        self.keep_alive(Box::new(obj.clone()));

        let value = obj
            .try_borrow()
            .map_err(|_| Error::InvalidState("object is mutably borrowed"))?;
        let runtime_type = value.runtime_type_name();
        let static_type = T::static_type_name();

        self.archiver.begin_object(runtime_type, static_type, key, id)?;
        let walked = if runtime_type == static_type {
            T::serialize_static(&value, self)
        } else {
            None
        };
        match walked {
            Some(result) => result?,
            None => self.write_polymorphic(runtime_type, value.as_any())?,
        }
        self.archiver.end_object()
    }

    /// Writes the members of an object reached through a base handle.
    fn write_polymorphic(&mut self, runtime_type: &str, value: &dyn Any) -> Result<(), Error> {
        let registry = self.registry;
        if let Some(entry) = registry.get_with_name(runtime_type) {
            return entry.walk(value, self);
        }
        if let Some(custom) = self.find_serializer(value.type_id()) {
            return custom(value, self);
        }
        Err(Error::unregistered(runtime_type))
    }

    /// Writes the content of a cell, or a reference to where it was
    /// written before.
    pub fn write_shared<T: Archive>(&mut self, cell: &Shared<T>, key: &str) -> Result<(), Error> {
        let addr = cell.addr();
        if let Some(meta) = self.session.values.get(&addr) {
            let target = meta.id;
            let id = self.next_id();
            return self.write_reference(id, target, key);
        }

        // The content takes the next id. Recording it first lets a pointer
        // inside the content refer back to the cell.
        let id = self.session.next_id;
        self.session.values.insert(
            addr,
            ValueMeta {
                id,
                key: key.to_string(),
            },
        );
        self.keep_alive(Box::new(cell.clone()));

        let value = cell
            .try_borrow()
            .ok_or(Error::InvalidState("cell is mutably borrowed"))?;
        if let Err(err) = value.serialize(self, key) {
            self.session.values.remove(&addr);
            return Err(err);
        }

        // Later pointers must refer to a node that carries an id.
        match self.session.stand_ins.get(&id) {
            Some(&StandIn::Reference(target)) => {
                if let Some(meta) = self.session.values.get_mut(&addr) {
                    meta.id = target;
                }
            }
            Some(StandIn::Null) => {
                self.session.values.remove(&addr);
            }
            None => {}
        }
        Ok(())
    }

    /// Writes a pointer to a cell.
    ///
    /// A cell that was already written becomes a reference inside the
    /// pointer; otherwise the cell is written inside the pointer under a
    /// generated key. The pointer's own identity is recorded afterwards.
    pub fn write_pointer<T: Archive>(
        &mut self,
        target: Option<&Shared<T>>,
        key: &str,
    ) -> Result<(), Error> {
        let id = self.next_id();
        let Some(target) = target else {
            return self.write_null_for(id, T::type_name(), key);
        };

        let identity = Identity::Pointer(target.addr());
        if let Some(&existing) = self.session.references.get(&identity) {
            return self.write_reference(id, existing, key);
        }

        self.archiver.begin_pointer(key, id)?;
        let child = self.next_key();
        match self.session.values.get(&target.addr()) {
            Some(meta) => {
                let target_id = meta.id;
                let child_id = self.next_id();
                self.write_reference(child_id, target_id, &child)?;
            }
            None => self.write(target, &child)?,
        }
        self.archiver.end_pointer()?;

        self.session.references.insert(identity, id);
        Ok(())
    }

    /// Writes a pointer whose target only a registered codec can write.
    pub fn write_opaque<T: Any>(
        &mut self,
        target: Option<&Rc<RefCell<T>>>,
        key: &str,
    ) -> Result<(), Error> {
        let id = self.next_id();
        let Some(target) = target else {
            return self.write_null_for(id, type_name::<T>(), key);
        };

        let identity = Identity::Pointer(Rc::as_ptr(target).addr());
        if let Some(&existing) = self.session.references.get(&identity) {
            return self.write_reference(id, existing, key);
        }

        self.archiver.begin_pointer(key, id)?;
        let codec = self
            .find_serializer(TypeId::of::<T>())
            .ok_or_else(|| Error::missing_codec(type_name::<T>()))?;
        self.keep_alive(Box::new(target.clone()));
        let value = target
            .try_borrow()
            .map_err(|_| Error::InvalidState("pointee is mutably borrowed"))?;
        codec(&*value, self)?;
        self.archiver.end_pointer()?;

        self.session.references.insert(identity, id);
        Ok(())
    }
}
