use vc_archive::Error;
use vc_archive::archiver::{ArrayHeader, NodeHeader, NodeKind, ObjectHeader, Unarchiver};
use vc_archive::hash::{FixedHashState, HashMap};
use vc_archive::value::{Id, Scalar, ScalarKind, Slice};

use crate::ARCHIVE_TYPE;
use crate::document::{Document, Element};

// -----------------------------------------------------------------------------
// Scope

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Opened by a `begin_*` call.
    Open(usize),
    /// The parent of a node reached through `enter_by_id`.
    Entered(usize),
}

impl Scope {
    #[inline]
    const fn element(self) -> usize {
        match self {
            Scope::Open(index) | Scope::Entered(index) => index,
        }
    }
}

// -----------------------------------------------------------------------------
// XmlUnarchiver

/// Reads what [`XmlArchiver`](crate::XmlArchiver) wrote.
///
/// The whole document is parsed up front. Children are looked up by their
/// `key` attribute, so fields can be read in any order, and every node
/// carrying an `id` can be reached directly.
#[derive(Debug)]
pub struct XmlUnarchiver {
    document: Document,
    scopes: Vec<Scope>,
    ids: HashMap<Id, usize>,
}

impl Default for XmlUnarchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlUnarchiver {
    pub const fn new() -> Self {
        Self {
            document: Document::new(),
            scopes: Vec::new(),
            ids: HashMap::with_hasher(FixedHashState),
        }
    }

    fn current(&self) -> Result<usize, Error> {
        self.scopes
            .last()
            .map(|scope| scope.element())
            .ok_or(Error::InvalidState("unarchiving has not begun"))
    }

    fn child(&self, key: &str) -> Result<&Element, Error> {
        let index = self
            .document
            .child_by_key(self.current()?, key)
            .ok_or_else(|| Error::missing_element(key))?;
        Ok(self.document.get(index))
    }

    /// The child `key`, which must be a `tag` element.
    fn expect(&self, key: &str, tag: &'static str) -> Result<(usize, &Element), Error> {
        let index = self
            .document
            .child_by_key(self.current()?, key)
            .ok_or_else(|| Error::missing_element(key))?;
        let element = self.document.get(index);
        if element.name != tag {
            return Err(Error::unexpected(key, tag, &element.name));
        }
        Ok((index, element))
    }

    /// Opens the child `key`, which must be a `tag` element carrying an id.
    fn open(&mut self, key: &str, tag: &'static str) -> Result<Id, Error> {
        let (index, element) = self.expect(key, tag)?;
        let id = id_of(element)?;
        self.scopes.push(Scope::Open(index));
        Ok(id)
    }

    /// Leaves the current scope, which must be an open `tag` element.
    fn close(&mut self, tag: &'static str) -> Result<(), Error> {
        match self.scopes.last() {
            Some(&Scope::Open(index)) if self.scopes.len() > 1 => {
                let found = &self.document.get(index).name;
                if found != tag {
                    return Err(Error::unexpected("", tag, found));
                }
                self.scopes.pop();
                Ok(())
            }
            _ => Err(Error::InvalidState("no element is open")),
        }
    }

    fn array_header(&mut self, key: &str, tag: &'static str) -> Result<ArrayHeader, Error> {
        let (index, element) = self.expect(key, tag)?;
        let header = ArrayHeader {
            length: parsed(element, key, "length")?,
            id: id_of(element)?,
        };
        self.scopes.push(Scope::Open(index));
        Ok(header)
    }

    fn leaf_scalar(&self, key: &str, tag: &'static str, kind: ScalarKind) -> Result<Scalar, Error> {
        let (_, element) = self.expect(key, tag)?;
        let text = element.text.as_deref().unwrap_or_default();
        Scalar::parse(kind, text).ok_or_else(|| Error::malformed_value(key, kind.name(), text))
    }

    fn index_ids(&mut self, data: usize) -> Result<(), Error> {
        for index in self.document.descendants(data) {
            let element = self.document.get(index);
            if element.attribute("id").is_none() {
                continue;
            }
            let id = id_of(element)?;
            if self.ids.insert(id, index).is_some() {
                return Err(Error::malformed(format!("the id {id} is used twice")));
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Attributes

fn attribute<'e>(element: &'e Element, name: &'static str) -> Result<&'e str, Error> {
    element.attribute(name).ok_or_else(|| Error::MissingAttribute {
        tag: element.name.clone(),
        attribute: name,
    })
}

fn parsed<T: core::str::FromStr>(
    element: &Element,
    key: &str,
    name: &'static str,
) -> Result<T, Error> {
    let text = attribute(element, name)?;
    text.parse()
        .map_err(|_| Error::malformed_value(key, &element.name, text))
}

fn id_of(element: &Element) -> Result<Id, Error> {
    parsed(element, element.key().unwrap_or_default(), "id")
}

// -----------------------------------------------------------------------------
// Unarchiver

impl Unarchiver for XmlUnarchiver {
    fn begin_unarchiving(&mut self, data: &[u8]) -> Result<(), Error> {
        self.reset();
        self.document = Document::parse(data)?;

        let root = self
            .document
            .root()
            .ok_or_else(|| Error::malformed("the document is empty"))?;
        let archive = self.document.get(root);
        if archive.name != "archive" {
            return Err(Error::unexpected("", "archive", &archive.name));
        }
        if archive.attribute("type") != Some(ARCHIVE_TYPE) {
            return Err(Error::malformed(format!("not a {ARCHIVE_TYPE} archive")));
        }
        log::debug!(
            "reading archive version {}",
            archive.attribute("version").unwrap_or("unknown")
        );

        let data = archive
            .children
            .iter()
            .copied()
            .find(|&child| self.document.get(child).name == "data")
            .ok_or_else(|| Error::missing_element("data"))?;
        self.index_ids(data)?;
        self.scopes.push(Scope::Open(data));
        Ok(())
    }

    fn reset(&mut self) {
        self.document.clear();
        self.scopes.clear();
        self.ids.clear();
    }

    #[inline]
    fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn restore(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
    }

    fn node(&self, key: &str) -> Result<NodeHeader, Error> {
        let element = self.child(key)?;
        let kind = NodeKind::from_name(&element.name)
            .ok_or_else(|| Error::malformed_value(key, "node", &element.name))?;
        let id = match kind {
            NodeKind::Null | NodeKind::Reference | NodeKind::Slice => None,
            _ => Some(id_of(element)?),
        };
        Ok(NodeHeader { kind, id })
    }

    fn sole_child_key(&self) -> Result<String, Error> {
        let element = self.document.get(self.current()?);
        match element.children.as_slice() {
            &[child] => Ok(attribute(self.document.get(child), "key")?.to_string()),
            children => Err(Error::malformed(format!(
                "`{}` holds {} children instead of one",
                element.name,
                children.len()
            ))),
        }
    }

    fn enter_by_id(&mut self, id: Id) -> Result<String, Error> {
        let index = *self.ids.get(&id).ok_or(Error::MissingId { id })?;
        let element = self.document.get(index);
        let key = attribute(element, "key")?.to_string();
        let parent = element.parent.ok_or(Error::MissingId { id })?;
        log::trace!("jumping to node {id}");
        self.scopes.push(Scope::Entered(parent));
        Ok(key)
    }

    fn leave(&mut self) -> Result<(), Error> {
        match self.scopes.last() {
            Some(Scope::Entered(_)) => {
                self.scopes.pop();
                Ok(())
            }
            _ => Err(Error::InvalidState("no node was entered by id")),
        }
    }

    fn begin_object(&mut self, key: &str) -> Result<ObjectHeader, Error> {
        let (index, element) = self.expect(key, "object")?;
        let header = ObjectHeader {
            runtime_type: attribute(element, "runtimeType")?.to_string(),
            static_type: attribute(element, "type")?.to_string(),
            id: id_of(element)?,
        };
        self.scopes.push(Scope::Open(index));
        Ok(header)
    }

    fn end_object(&mut self) -> Result<(), Error> {
        self.close("object")
    }

    fn begin_struct(&mut self, key: &str) -> Result<Id, Error> {
        self.open(key, "struct")
    }

    fn end_struct(&mut self) -> Result<(), Error> {
        self.close("struct")
    }

    fn begin_array(&mut self, key: &str) -> Result<ArrayHeader, Error> {
        self.array_header(key, "array")
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close("array")
    }

    fn unarchive_string(&mut self, key: &str) -> Result<(String, Id), Error> {
        let (_, element) = self.expect(key, "string")?;
        let text = element.text.clone().unwrap_or_default();
        if let Some(length) = element.attribute("length")
            && length != text.len().to_string()
        {
            return Err(Error::malformed_value(key, "string", &text));
        }
        Ok((text, id_of(element)?))
    }

    fn begin_associative_array(&mut self, key: &str) -> Result<ArrayHeader, Error> {
        self.array_header(key, "associativeArray")
    }

    fn end_associative_array(&mut self) -> Result<(), Error> {
        self.close("associativeArray")
    }

    fn begin_entry_key(&mut self, index: &str) -> Result<(), Error> {
        let entry = self
            .document
            .child_by_name(self.current()?, "key", index)
            .ok_or_else(|| Error::missing_element(index))?;
        self.scopes.push(Scope::Open(entry));
        Ok(())
    }

    fn end_entry_key(&mut self) -> Result<(), Error> {
        self.close("key")
    }

    fn begin_entry_value(&mut self, index: &str) -> Result<(), Error> {
        let entry = self
            .document
            .child_by_name(self.current()?, "value", index)
            .ok_or_else(|| Error::missing_element(index))?;
        self.scopes.push(Scope::Open(entry));
        Ok(())
    }

    fn end_entry_value(&mut self) -> Result<(), Error> {
        self.close("value")
    }

    fn begin_pointer(&mut self, key: &str) -> Result<Id, Error> {
        self.open(key, "pointer")
    }

    fn end_pointer(&mut self) -> Result<(), Error> {
        self.close("pointer")
    }

    fn begin_base(&mut self, key: &str) -> Result<Id, Error> {
        self.open(key, "base")
    }

    fn end_base(&mut self) -> Result<(), Error> {
        self.close("base")
    }

    fn begin_typedef(&mut self, key: &str) -> Result<Id, Error> {
        self.open(key, "typedef")
    }

    fn end_typedef(&mut self) -> Result<(), Error> {
        self.close("typedef")
    }

    fn unarchive_scalar(&mut self, kind: ScalarKind, key: &str) -> Result<Scalar, Error> {
        self.leaf_scalar(key, kind.name(), kind)
    }

    fn unarchive_enum(&mut self, kind: ScalarKind, key: &str) -> Result<Scalar, Error> {
        let (_, element) = self.expect(key, "enum")?;
        let base = attribute(element, "baseType")?;
        if base != kind.name() {
            return Err(Error::type_mismatch(kind.name(), base));
        }
        self.leaf_scalar(key, "enum", kind)
    }

    fn unarchive_reference(&mut self, key: &str) -> Result<Id, Error> {
        let (_, element) = self.expect(key, "reference")?;
        let text = element.text.as_deref().unwrap_or_default();
        text.parse()
            .map_err(|_| Error::malformed_value(key, "reference", text))
    }

    fn unarchive_slice(&mut self, key: &str) -> Result<Slice, Error> {
        let (_, element) = self.expect(key, "slice")?;
        let text = element.text.as_deref().unwrap_or_default();
        let owner = text
            .parse()
            .map_err(|_| Error::malformed_value(key, "slice", text))?;
        Ok(Slice {
            length: parsed(element, key, "length")?,
            offset: parsed(element, key, "offset")?,
            id: Some(owner),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests
