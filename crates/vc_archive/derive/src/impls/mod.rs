// -----------------------------------------------------------------------------
// Modules

mod match_archive;

mod enum_kind;
mod struct_kind;
mod typedef_kind;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use match_archive::match_archive_impls;

use enum_kind::impl_enum;
use struct_kind::impl_struct;
use typedef_kind::impl_typedef;
