use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use crate::ErrorAction;
use crate::handle::Obj;
use crate::hash::{FixedHashState, HashMap};
use crate::traits::ObjectType;
use crate::value::Id;

// -----------------------------------------------------------------------------
// ObjectSlot

/// A reconstructed object and the typed handles made for it so far.
pub(crate) struct ObjectSlot {
    pub runtime_type: String,
    /// The first handle is the one the object was allocated as.
    handles: Vec<Box<dyn Any>>,
}

impl ObjectSlot {
    pub fn new(runtime_type: &str, handle: Box<dyn Any>) -> Self {
        Self {
            runtime_type: String::from(runtime_type),
            handles: alloc::vec![handle],
        }
    }

    /// A handle of type `Obj<T>`, if one was made already.
    pub fn find<T: ?Sized + ObjectType>(&self) -> Option<Obj<T>> {
        self.handles
            .iter()
            .find_map(|handle| handle.downcast_ref::<Obj<T>>())
            .cloned()
    }

    #[inline]
    pub fn origin(&self) -> &dyn Any {
        &*self.handles[0]
    }

    #[inline]
    pub fn push(&mut self, handle: Box<dyn Any>) {
        self.handles.push(handle);
    }
}

// -----------------------------------------------------------------------------
// DeserializeSession

/// Per-session state of a [`Deserializer`](super::Deserializer).
///
/// Every table maps the id of an archived node to what was built from it,
/// so that a second path to the node yields the same instance.
pub(crate) struct DeserializeSession {
    pub next_key: u64,
    pub objects: HashMap<Id, ObjectSlot>,
    /// `Shared<T>` cells.
    pub values: HashMap<Id, Box<dyn Any>>,
    /// Targets of `pointer` nodes, as `Shared<T>`.
    pub pointers: HashMap<Id, Box<dyn Any>>,
    /// Buffers of `SharedSlice<T>`, as `Rc<RefCell<Vec<T>>>`.
    pub arrays: HashMap<Id, Box<dyn Any>>,
    /// Targets of opaque pointers, as `Rc<RefCell<T>>`.
    pub opaque: HashMap<Id, Box<dyn Any>>,
    pub unwinding: Option<ErrorAction>,
}

impl DeserializeSession {
    pub const fn new() -> Self {
        Self {
            next_key: 0,
            objects: HashMap::with_hasher(FixedHashState),
            values: HashMap::with_hasher(FixedHashState),
            pointers: HashMap::with_hasher(FixedHashState),
            arrays: HashMap::with_hasher(FixedHashState),
            opaque: HashMap::with_hasher(FixedHashState),
            unwinding: None,
        }
    }

    pub fn clear(&mut self) {
        self.next_key = 0;
        self.objects.clear();
        self.values.clear();
        self.pointers.clear();
        self.arrays.clear();
        self.opaque.clear();
        self.unwinding = None;
    }
}
