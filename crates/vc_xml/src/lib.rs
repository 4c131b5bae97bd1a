//! The XML backend of `vc_archive`.
//!
//! [`XmlArchiver`] and [`XmlUnarchiver`] implement the archive contract on
//! top of an in-memory tree that is encoded and parsed with `quick-xml`.
//! [`to_xml`] and [`from_xml`] cover the common case of one value per
//! document.
//!
//! # Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <archive version="1.0.0" type="vc_xml">
//!     <data>
//!         <object runtimeType="shapes::Circle" type="shapes::Shape" key="0" id="0">
//!             <double key="radius" id="1">1.5</double>
//!             <reference key="next">0</reference>
//!         </object>
//!     </data>
//! </archive>
//! ```
//!
//! | Element            | Attributes                                     | Text          |
//! |--------------------|------------------------------------------------|---------------|
//! | `object`           | `runtimeType` `type` `key` `id`                |               |
//! | `struct`           | `type` `key` `id`                              |               |
//! | `array`            | `type` `length` `key` `id`                     |               |
//! | `string`           | `type` `length` `key` `id`                     | the value     |
//! | `associativeArray` | `keyType` `valueType` `length` `key` `id`      |               |
//! | `key` / `value`    | `key` (entry index)                            |               |
//! | `pointer`          | `key` `id`                                     |               |
//! | `base` `typedef`   | `type` `key` `id`                              |               |
//! | scalar kind name   | `key` `id`                                     | the value     |
//! | `enum`             | `type` `baseType` `key` `id`                   | the value     |
//! | `null`             | `type` `key`                                   |               |
//! | `reference`        | `key`                                          | target id     |
//! | `slice`            | `key` `offset` `length`                        | owner id      |

// -----------------------------------------------------------------------------
// Modules

mod archiver;
mod document;
mod unarchiver;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Exports

pub use archiver::XmlArchiver;
pub use unarchiver::XmlUnarchiver;

use vc_archive::{Archive, Deserializer, Error, Serializer, TypeRegistry};

/// Version written to the root `archive` element.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Value of the root element's `type` attribute.
pub const ARCHIVE_TYPE: &str = "vc_xml";

/// Serializes `value` into a new XML document.
pub fn to_xml<T: Archive>(value: &T, registry: &TypeRegistry) -> Result<String, Error> {
    let mut archiver = XmlArchiver::new();
    let bytes = Serializer::new(&mut archiver, registry).serialize(value, "")?;
    String::from_utf8(bytes).map_err(Error::malformed)
}

/// Reads back a value written by [`to_xml`].
pub fn from_xml<T: Archive>(xml: &str, registry: &TypeRegistry) -> Result<T, Error> {
    let mut unarchiver = XmlUnarchiver::new();
    Deserializer::new(&mut unarchiver, registry).deserialize(xml.as_bytes(), "")
}
