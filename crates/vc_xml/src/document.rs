//! A minimal in-memory XML tree.
//!
//! Elements live in one arena and refer to each other by index, which lets
//! the archiver rewrite an already emitted node in place and lets the
//! unarchiver jump to any node by id.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use vc_archive::Error;

// -----------------------------------------------------------------------------
// Element

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub name: String,
    /// In insertion order, which is the order they are written in.
    pub attributes: Vec<(String, String)>,
    /// Only kept for elements without children.
    pub text: Option<String>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.attribute("key")
    }
}

// -----------------------------------------------------------------------------
// Document

#[derive(Debug, Default)]
pub(crate) struct Document {
    elements: Vec<Element>,
}

impl Document {
    #[inline]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Element {
        &self.elements[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut Element {
        &mut self.elements[index]
    }

    /// The root element, if the document has one.
    #[inline]
    pub fn root(&self) -> Option<usize> {
        (!self.elements.is_empty()).then_some(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Appends a new element under `parent`, or as the root.
    pub fn push(&mut self, name: &str, parent: Option<usize>) -> usize {
        let index = self.elements.len();
        self.elements.push(Element {
            name: name.to_owned(),
            parent,
            ..Element::default()
        });
        if let Some(parent) = parent {
            self.elements[parent].children.push(index);
        }
        index
    }

    pub fn set_attribute(&mut self, index: usize, name: &str, value: impl ToString) {
        self.elements[index]
            .attributes
            .push((name.to_owned(), value.to_string()));
    }

    /// Unlinks `index` from its parent. The element stays in the arena.
    pub fn detach(&mut self, index: usize) {
        if let Some(parent) = self.elements[index].parent.take() {
            self.elements[parent].children.retain(|&child| child != index);
        }
    }

    /// Puts `index` where `replaced` is in its parent, and unlinks `replaced`.
    pub fn replace(&mut self, replaced: usize, index: usize) {
        self.detach(index);
        let Some(parent) = self.elements[replaced].parent.take() else {
            return;
        };
        for child in &mut self.elements[parent].children {
            if *child == replaced {
                *child = index;
            }
        }
        self.elements[index].parent = Some(parent);
    }

    /// Sets an attribute, replacing the value it had.
    pub fn replace_attribute(&mut self, index: usize, name: &str, value: impl ToString) {
        let attributes = &mut self.elements[index].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, old)) => *old = value.to_string(),
            None => attributes.push((name.to_owned(), value.to_string())),
        }
    }

    /// The child of `parent` whose `key` attribute is `key`.
    pub fn child_by_key(&self, parent: usize, key: &str) -> Option<usize> {
        self.elements[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.elements[child].key() == Some(key))
    }

    /// The child of `parent` named `name` whose `key` attribute is `key`.
    pub fn child_by_name(&self, parent: usize, name: &str, key: &str) -> Option<usize> {
        self.elements[parent].children.iter().copied().find(|&child| {
            let element = &self.elements[child];
            element.name == name && element.key() == Some(key)
        })
    }

    /// Every element in document order, starting at `root`.
    pub fn descendants(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut pending = vec![root];
        while let Some(index) = pending.pop() {
            order.push(index);
            pending.extend(self.elements[index].children.iter().rev());
        }
        order
    }

    // -------------------------------------------------------------------------
    // Encoding

    /// Writes the tree below the root, indented by four spaces.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::malformed)?;
        if let Some(root) = self.root() {
            self.write_element(&mut writer, root)?;
        }
        Ok(writer.into_inner())
    }

    fn write_element(&self, writer: &mut Writer<Vec<u8>>, index: usize) -> Result<(), Error> {
        let element = &self.elements[index];
        let mut start = BytesStart::new(element.name.as_str());
        for (name, value) in &element.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        let text = element.text.as_deref().filter(|text| !text.is_empty());
        if element.children.is_empty() && text.is_none() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(Error::malformed);
        }

        writer
            .write_event(Event::Start(start))
            .map_err(Error::malformed)?;
        match text {
            Some(text) if element.children.is_empty() => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(Error::malformed)?,
            _ => {
                for &child in &element.children {
                    self.write_element(writer, child)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(Error::malformed)
    }

    // -------------------------------------------------------------------------
    // Decoding

    /// Parses `data` into a new document.
    ///
    /// Text is kept verbatim, surrounding whitespace included, but only
    /// for elements without children.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(false);

        let mut document = Document::new();
        let mut open: Vec<usize> = Vec::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).map_err(Error::malformed)? {
                Event::Start(start) => {
                    let index = document.open(&start, open.last().copied())?;
                    open.push(index);
                }
                Event::Empty(start) => {
                    document.open(&start, open.last().copied())?;
                }
                Event::End(_) => {
                    let index = open
                        .pop()
                        .ok_or_else(|| Error::malformed("unbalanced end tag"))?;
                    let element = document.get_mut(index);
                    if !element.children.is_empty() {
                        element.text = None;
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(Error::malformed)?;
                    document.append_text(open.last().copied(), &text);
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    let text = String::from_utf8_lossy(&data);
                    document.append_text(open.last().copied(), &text);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(Error::malformed("unexpected end of document"));
        }
        Ok(document)
    }

    fn open(&mut self, start: &BytesStart<'_>, parent: Option<usize>) -> Result<usize, Error> {
        if parent.is_none() && self.root().is_some() {
            return Err(Error::malformed("more than one root element"));
        }

        let name = core::str::from_utf8(start.name().as_ref())
            .map_err(Error::malformed)?
            .to_owned();
        let index = self.push(&name, parent);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(Error::malformed)?;
            let key = core::str::from_utf8(attribute.key.as_ref())
                .map_err(Error::malformed)?
                .to_owned();
            let value = attribute.unescape_value().map_err(Error::malformed)?;
            self.elements[index]
                .attributes
                .push((key, value.into_owned()));
        }
        Ok(index)
    }

    fn append_text(&mut self, index: Option<usize>, text: &str) {
        if let Some(index) = index {
            self.elements[index]
                .text
                .get_or_insert_with(String::new)
                .push_str(text);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Document;

    #[test]
    fn leaf_text_is_kept_verbatim() {
        let xml = br#"<root><a key="x">  padded  </a><b key="y"><c key="z"/></b></root>"#;
        let document = Document::parse(xml).unwrap();
        let root = document.root().unwrap();

        let a = document.child_by_key(root, "x").unwrap();
        assert_eq!(document.get(a).text.as_deref(), Some("  padded  "));

        let b = document.child_by_key(root, "y").unwrap();
        assert_eq!(document.get(b).text, None);
        assert_eq!(document.get(b).children.len(), 1);
    }

    #[test]
    fn escaped_text_round_trips() {
        let mut document = Document::new();
        let root = document.push("root", None);
        let leaf = document.push("string", Some(root));
        document.set_attribute(leaf, "key", "k");
        document.get_mut(leaf).text = Some("<a & b>".to_owned());

        let bytes = document.to_bytes().unwrap();
        let parsed = Document::parse(&bytes).unwrap();
        let leaf = parsed.child_by_key(parsed.root().unwrap(), "k").unwrap();
        assert_eq!(parsed.get(leaf).text.as_deref(), Some("<a & b>"));
    }

    #[test]
    fn replaced_children_keep_their_place() {
        let mut document = Document::new();
        let root = document.push("root", None);
        let first = document.push("a", Some(root));
        let second = document.push("b", Some(root));
        let other = document.push("other", None);
        let moved = document.push("c", Some(other));
        document.set_attribute(moved, "key", "9");

        document.replace(first, moved);
        document.replace_attribute(moved, "key", 0);

        assert_eq!(document.get(root).children, [moved, second]);
        assert!(document.get(other).children.is_empty());
        assert_eq!(document.get(first).parent, None);
        assert_eq!(document.get(moved).parent, Some(root));
        assert_eq!(document.get(moved).attributes.len(), 1);
        assert_eq!(document.child_by_key(root, "0"), Some(moved));
    }

    #[test]
    fn rejects_unbalanced_input() {
        assert!(Document::parse(b"<root><a></root>").is_err());
        assert!(Document::parse(b"<root>").is_err());
    }
}
