//! [`Archive`](crate::Archive) implementations for foreign types.
//!
//! ## Implemented Menu
//!
//! - scalars: `bool`, `i8`-`i128`, `u8`-`u128`, `isize`, `usize`, `f32`,
//!   `f64`, `char`
//! - `String`, `[T; N]`, `Vec<T>`, `Box<T>`, `Option<T>`
//! - maps: `BTreeMap<K, V>`, `hashbrown::HashMap<K, V, S>`
//! - std: ("std" feature)
//!     - `HashMap<K, V, S>`

// -----------------------------------------------------------------------------
// Modules

mod map;
mod option;
mod scalar;
mod sequence;
