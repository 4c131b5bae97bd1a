//! Round trips through the whole stack: derive, engine and XML backend.

mod graph;
mod policy;
mod polymorphism;
mod values;

use vc_archive::{Archive, TypeRegistry};

use crate::{from_xml, to_xml};

/// Writes `value` and reads it back with the same registry.
fn round_trip<T: Archive>(value: &T, registry: &TypeRegistry) -> T {
    let xml = to_xml(value, registry).unwrap();
    from_xml(&xml, registry).unwrap()
}

/// Wraps the children of `<data>` in a complete document.
fn document(data: &str) -> String {
    format!(r#"<archive version="1.0.0" type="vc_xml"><data>{data}</data></archive>"#)
}
