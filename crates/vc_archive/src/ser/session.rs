use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::ErrorAction;
use crate::hash::{FixedHashState, HashMap};
use crate::value::{Array, Id};

// -----------------------------------------------------------------------------
// Identity

/// The address-like identity of a reference-tracked value.
///
/// Each kind of handle has its own space, so an object and a map stored at
/// the start of that object never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Identity {
    /// An [`Obj`](crate::Obj) allocation.
    Object(usize),
    /// The target of a [`Ptr`](crate::Ptr) or an [`OpaquePtr`](crate::OpaquePtr).
    Pointer(usize),
    /// An associative array in place.
    Map(usize, TypeId),
}

// -----------------------------------------------------------------------------
// ValueMeta

/// Where a [`Shared`](crate::Shared) cell was written as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMeta {
    pub id: Id,
    pub key: String,
}

// -----------------------------------------------------------------------------
// StandIn

/// What was written for an id that no node ended up carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StandIn {
    /// A reference to the node carrying this id.
    Reference(Id),
    Null,
}

// -----------------------------------------------------------------------------
// SerializeSession

/// Per-session state of a [`Serializer`](super::Serializer).
pub(crate) struct SerializeSession {
    pub next_id: Id,
    pub next_key: u64,
    /// Identity -> id of the node that owns it.
    pub references: HashMap<Identity, Id>,
    /// Cell address -> where it was written.
    pub values: HashMap<usize, ValueMeta>,
    /// Ids taken by a `null` or a `reference` instead of a node.
    pub stand_ins: HashMap<Id, StandIn>,
    /// Non-empty arrays in emission order, for slice post-processing.
    pub arrays: Vec<(Id, Array)>,
    /// Handles whose addresses are recorded above. Holding them keeps the
    /// addresses from being reused until the session ends.
    pub keep_alive: Vec<Box<dyn Any>>,
    /// Nesting depth of detached writes.
    pub detached: usize,
    /// Set once an error was raised, so enclosing values do not report it
    /// again.
    pub unwinding: Option<ErrorAction>,
}

impl SerializeSession {
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            next_key: 0,
            references: HashMap::with_hasher(FixedHashState),
            values: HashMap::with_hasher(FixedHashState),
            stand_ins: HashMap::with_hasher(FixedHashState),
            arrays: Vec::new(),
            keep_alive: Vec::new(),
            detached: 0,
            unwinding: None,
        }
    }

    pub fn clear(&mut self) {
        self.next_id = 0;
        self.next_key = 0;
        self.references.clear();
        self.values.clear();
        self.stand_ins.clear();
        self.arrays.clear();
        self.keep_alive.clear();
        self.detached = 0;
        self.unwinding = None;
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        self.detached != 0
    }
}
