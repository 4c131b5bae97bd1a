//! Handle types that give values an identity.
//!
//! Plain Rust values are owned by exactly one place, so the engine archives
//! them by value. Sharing has to be spelled out:
//!
//! - [`Obj`]: a reference-counted object, deduplicated by identity and
//!   usable through `dyn Trait`.
//! - [`Shared`]: a value cell that archives like its content; pointers to
//!   it are archived as references.
//! - [`Ptr`]: a nullable pointer to a [`Shared`] cell.
//! - [`SharedSlice`]: an array whose sub-views alias the same storage.
//! - [`OpaquePtr`]: a pointer to a type that only a registered codec can
//!   archive.

// -----------------------------------------------------------------------------
// Modules

mod obj;
mod opaque;
mod ptr;
mod shared;
mod shared_slice;

// -----------------------------------------------------------------------------
// Exports

pub use obj::Obj;
pub use opaque::OpaquePtr;
pub use ptr::Ptr;
pub use shared::Shared;
pub use shared_slice::SharedSlice;
