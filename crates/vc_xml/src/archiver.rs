use vc_archive::archiver::Archiver;
use vc_archive::hash::{FixedHashState, HashMap};
use vc_archive::value::{Array, Id, Scalar, Slice};
use vc_archive::Error;

use crate::document::Document;
use crate::{ARCHIVE_TYPE, FORMAT_VERSION};

// -----------------------------------------------------------------------------
// XmlArchiver

/// Builds the XML encoding of one session.
///
/// Every composite becomes an element holding its children; every leaf
/// becomes an element whose text is the value. Nothing is written out
/// before [`flush`](Archiver::flush), so that post-processing can still
/// turn an array into a `slice` of another one.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <archive version="1.0.0" type="vc_xml">
///     <data>
///         <array type="int" length="2" key="0" id="0">
///             <int key="0" id="1">27</int>
///             <int key="1" id="2">382</int>
///         </array>
///     </data>
/// </archive>
/// ```
#[derive(Debug)]
pub struct XmlArchiver {
    document: Document,
    /// Open elements; the first one is `<data>`.
    stack: Vec<usize>,
    /// Arrays and strings by id, for slice rewriting.
    arrays: HashMap<Id, usize>,
}

impl Default for XmlArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlArchiver {
    pub const fn new() -> Self {
        Self {
            document: Document::new(),
            stack: Vec::new(),
            arrays: HashMap::with_hasher(FixedHashState),
        }
    }

    fn current(&self) -> Result<usize, Error> {
        self.stack
            .last()
            .copied()
            .ok_or(Error::InvalidState("archiving has not begun"))
    }

    /// Appends an element under the current one.
    fn element(
        &mut self,
        name: &str,
        attributes: &[(&str, &dyn ToString)],
    ) -> Result<usize, Error> {
        let parent = self.current()?;
        let index = self.document.push(name, Some(parent));
        for &(attribute, value) in attributes {
            self.document.set_attribute(index, attribute, value.to_string());
        }
        Ok(index)
    }

    /// Appends an element and makes it the current one.
    fn open(&mut self, name: &str, attributes: &[(&str, &dyn ToString)]) -> Result<(), Error> {
        let index = self.element(name, attributes)?;
        self.stack.push(index);
        Ok(())
    }

    fn leaf(
        &mut self,
        name: &str,
        attributes: &[(&str, &dyn ToString)],
        text: String,
    ) -> Result<(), Error> {
        let index = self.element(name, attributes)?;
        self.document.get_mut(index).text = Some(text);
        Ok(())
    }

    /// Closes the current element, which must be named `name`.
    fn close(&mut self, name: &'static str) -> Result<(), Error> {
        if self.stack.len() <= 1 {
            return Err(Error::InvalidState("no element is open"));
        }
        let index = self.current()?;
        let found = &self.document.get(index).name;
        if found != name {
            return Err(Error::unexpected("", name, found));
        }
        self.stack.pop();
        Ok(())
    }
}

impl Archiver for XmlArchiver {
    fn begin_archiving(&mut self) -> Result<(), Error> {
        self.reset();
        let archive = self.document.push("archive", None);
        self.document.set_attribute(archive, "version", FORMAT_VERSION);
        self.document.set_attribute(archive, "type", ARCHIVE_TYPE);
        let data = self.document.push("data", Some(archive));
        self.stack.push(data);
        Ok(())
    }

    fn reset(&mut self) {
        self.document.clear();
        self.stack.clear();
        self.arrays.clear();
    }

    fn flush(&mut self) -> Result<Vec<u8>, Error> {
        if self.stack.len() != 1 {
            return Err(Error::InvalidState("an element is still open"));
        }
        let bytes = self.document.to_bytes()?;
        log::debug!(
            "wrote {} xml elements in {} bytes",
            self.document.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    #[inline]
    fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drops the element opened at `depth`, with everything inside it.
    fn restore(&mut self, depth: usize) {
        let depth = depth.max(1);
        if let Some(&failed) = self.stack.get(depth) {
            self.document.detach(failed);
        }
        self.stack.truncate(depth);
    }

    fn begin_object(
        &mut self,
        runtime_type: &str,
        static_type: &str,
        key: &str,
        id: Id,
    ) -> Result<(), Error> {
        self.open(
            "object",
            &[
                ("runtimeType", &runtime_type),
                ("type", &static_type),
                ("key", &key),
                ("id", &id),
            ],
        )
    }

    fn end_object(&mut self) -> Result<(), Error> {
        self.close("object")
    }

    fn begin_struct(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error> {
        self.open("struct", &[("type", &ty), ("key", &key), ("id", &id)])
    }

    fn end_struct(&mut self) -> Result<(), Error> {
        self.close("struct")
    }

    fn begin_array(
        &mut self,
        array: &Array,
        element_type: &str,
        key: &str,
        id: Id,
    ) -> Result<(), Error> {
        self.open(
            "array",
            &[
                ("type", &element_type),
                ("length", &array.length),
                ("key", &key),
                ("id", &id),
            ],
        )?;
        self.arrays.insert(id, self.current()?);
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close("array")
    }

    fn archive_string(
        &mut self,
        array: &Array,
        value: &str,
        key: &str,
        id: Id,
    ) -> Result<(), Error> {
        let index = self.element(
            "string",
            &[
                ("type", &"char"),
                ("length", &array.length),
                ("key", &key),
                ("id", &id),
            ],
        )?;
        self.document.get_mut(index).text = Some(value.to_owned());
        self.arrays.insert(id, index);
        Ok(())
    }

    fn begin_associative_array(
        &mut self,
        key_type: &str,
        value_type: &str,
        length: usize,
        key: &str,
        id: Id,
    ) -> Result<(), Error> {
        self.open(
            "associativeArray",
            &[
                ("keyType", &key_type),
                ("valueType", &value_type),
                ("length", &length),
                ("key", &key),
                ("id", &id),
            ],
        )
    }

    fn end_associative_array(&mut self) -> Result<(), Error> {
        self.close("associativeArray")
    }

    fn begin_entry_key(&mut self, index: &str) -> Result<(), Error> {
        self.open("key", &[("key", &index)])
    }

    fn end_entry_key(&mut self) -> Result<(), Error> {
        self.close("key")
    }

    fn begin_entry_value(&mut self, index: &str) -> Result<(), Error> {
        self.open("value", &[("key", &index)])
    }

    fn end_entry_value(&mut self) -> Result<(), Error> {
        self.close("value")
    }

    fn begin_pointer(&mut self, key: &str, id: Id) -> Result<(), Error> {
        self.open("pointer", &[("key", &key), ("id", &id)])
    }

    fn end_pointer(&mut self) -> Result<(), Error> {
        self.close("pointer")
    }

    fn begin_base(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error> {
        self.open("base", &[("type", &ty), ("key", &key), ("id", &id)])
    }

    fn end_base(&mut self) -> Result<(), Error> {
        self.close("base")
    }

    fn begin_typedef(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error> {
        self.open("typedef", &[("type", &ty), ("key", &key), ("id", &id)])
    }

    fn end_typedef(&mut self) -> Result<(), Error> {
        self.close("typedef")
    }

    fn archive_scalar(&mut self, value: Scalar, key: &str, id: Id) -> Result<(), Error> {
        self.leaf(value.kind().name(), &[("key", &key), ("id", &id)], value.to_string())
    }

    fn archive_enum(&mut self, base: Scalar, ty: &str, key: &str, id: Id) -> Result<(), Error> {
        self.leaf(
            "enum",
            &[("type", &ty), ("baseType", &base.kind().name()), ("key", &key), ("id", &id)],
            base.to_string(),
        )
    }

    fn archive_null(&mut self, ty: &str, key: &str) -> Result<(), Error> {
        self.element("null", &[("type", &ty), ("key", &key)])?;
        Ok(())
    }

    fn archive_reference(&mut self, key: &str, id: Id) -> Result<(), Error> {
        self.leaf("reference", &[("key", &key)], id.to_string())
    }

    /// Rewrites the array `slice_id` in place as a `slice` of `array_id`.
    ///
    /// A slice archived before its owner holds the first copy of whatever
    /// its elements reach, while the owner's copies only refer back to it.
    /// Those elements move into the owner, replacing its copies, so no id
    /// goes missing.
    fn archive_slice(&mut self, slice: Slice, slice_id: Id, array_id: Id) -> Result<(), Error> {
        let index = *self
            .arrays
            .get(&slice_id)
            .ok_or(Error::MissingId { id: slice_id })?;
        let owner = *self
            .arrays
            .get(&array_id)
            .ok_or(Error::MissingId { id: array_id })?;
        log::trace!("rewriting array {slice_id} as a slice of array {array_id}");

        let element = self.document.get_mut(index);
        let key = element.key().unwrap_or_default().to_owned();
        let children = core::mem::take(&mut element.children);
        for (position, child) in children.into_iter().enumerate() {
            let owner_key = (slice.offset + position).to_string();
            match self.document.child_by_key(owner, &owner_key) {
                Some(replaced) if slice_id < array_id => {
                    self.document.replace(replaced, child);
                    self.document.replace_attribute(child, "key", owner_key);
                }
                _ => self.document.detach(child),
            }
        }
        let element = self.document.get_mut(index);
        element.name = String::from("slice");
        element.attributes = vec![
            (String::from("key"), key),
            (String::from("offset"), slice.offset.to_string()),
            (String::from("length"), slice.length.to_string()),
        ];
        element.text = Some(array_id.to_string());
        Ok(())
    }

    #[inline]
    fn post_process_array(&mut self, id: Id) -> Result<(), Error> {
        match self.arrays.contains_key(&id) {
            true => Ok(()),
            false => Err(Error::MissingId { id }),
        }
    }
}
