use std::collections::BTreeMap;

use vc_archive::{
    Archive, CustomArchive, Deserializer, Error, Obj, Ptr, Serializer, Shared, SharedSlice,
    TypeRegistry,
};

use super::{document, round_trip};
use crate::{from_xml, to_xml};

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Point")]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Archive, Default)]
#[archive(rename = "Node")]
struct Node {
    value: i32,
    next: Option<Obj<Node>>,
}

#[derive(Archive, Default)]
#[archive(rename = "Cells")]
struct Cells {
    value: Shared<i32>,
    first: Ptr<i32>,
    second: Ptr<i32>,
    empty: Ptr<i32>,
}

#[derive(Archive, Default)]
#[archive(rename = "Forward")]
struct Forward {
    pointer: Ptr<String>,
    value: Shared<String>,
}

#[derive(Archive, Default)]
#[archive(rename = "Views")]
struct Views {
    middle: SharedSlice<i32>,
    all: SharedSlice<i32>,
    head: SharedSlice<i32>,
    copy: SharedSlice<i32>,
}

#[derive(Archive, Default)]
#[archive(rename = "MaybeCell")]
struct MaybeCell {
    value: Shared<Option<i32>>,
    pointer: Ptr<Option<i32>>,
}

#[derive(Archive, Default)]
#[archive(rename = "Holder")]
struct Holder {
    point: Obj<Point>,
    cell: Shared<Obj<Point>>,
    pointer: Ptr<Obj<Point>>,
}

#[derive(Archive, Default)]
#[archive(rename = "PointViews")]
struct PointViews {
    head: SharedSlice<Obj<Point>>,
    all: SharedSlice<Obj<Point>>,
    first: Option<Obj<Point>>,
}

/// Writes one map under two keys.
#[derive(Archive, Default, Debug)]
#[archive(rename = "Catalog", custom)]
struct Catalog {
    prices: BTreeMap<String, i32>,
    copy: BTreeMap<String, i32>,
}

impl CustomArchive for Catalog {
    fn to_archive(&self, s: &mut Serializer<'_>) -> Result<(), Error> {
        s.write(&self.prices, "prices")?;
        s.write(&self.prices, "copy")
    }

    fn from_archive(&mut self, d: &mut Deserializer<'_>) -> Result<(), Error> {
        self.prices = d.read("prices")?;
        self.copy = d.read("copy")?;
        Ok(())
    }
}

/// Archived through values built on the fly.
#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Span", custom)]
struct Span {
    start: i32,
}

impl CustomArchive for Span {
    fn to_archive(&self, s: &mut Serializer<'_>) -> Result<(), Error> {
        s.write_detached(&vec![self.start, self.start + 1], "low")?;
        s.write_detached(&vec![self.start + 10, self.start + 11], "high")?;
        s.write_detached(&BTreeMap::from([(self.start, 1)]), "first")?;
        s.write_detached(&BTreeMap::from([(self.start, 2)]), "second")
    }

    fn from_archive(&mut self, d: &mut Deserializer<'_>) -> Result<(), Error> {
        let low: Vec<i32> = d.read("low")?;
        let high: Vec<i32> = d.read("high")?;
        let first: BTreeMap<i32, i32> = d.read("first")?;
        let second: BTreeMap<i32, i32> = d.read("second")?;
        if high != [low[0] + 10, low[1] + 10] || first[&low[0]] != 1 || second[&low[0]] != 2 {
            return Err(Error::InvalidState("span parts disagree"));
        }
        self.start = low[0];
        Ok(())
    }
}

#[test]
fn shared_objects_are_written_once() {
    let shared = Obj::new(Point { x: 1, y: 2 });
    let points = vec![shared.clone(), shared, Obj::new(Point { x: 1, y: 2 })];

    let registry = TypeRegistry::new();
    let xml = to_xml(&points, &registry).unwrap();
    assert!(xml.contains(r#"<object runtimeType="Point" type="Point" key="0" id="1">"#));
    assert!(xml.contains(r#"<reference key="1">1</reference>"#));

    let back: Vec<Obj<Point>> = from_xml(&xml, &registry).unwrap();
    assert!(back[0].ptr_eq(&back[1]));
    assert!(!back[0].ptr_eq(&back[2]));
    assert_eq!(*back[2].borrow(), Point { x: 1, y: 2 });

    back[0].borrow_mut().x = 10;
    assert_eq!(back[1].borrow().x, 10);
}

#[test]
fn cycles_are_relinked() {
    let a = Obj::new(Node {
        value: 1,
        next: None,
    });
    let b = Obj::new(Node {
        value: 2,
        next: Some(a.clone()),
    });
    a.borrow_mut().next = Some(b.clone());

    let back = round_trip(&a, &TypeRegistry::new());
    let next = back.borrow().next.clone().unwrap();
    assert_eq!(next.borrow().value, 2);

    let again = next.borrow().next.clone().unwrap();
    assert!(again.ptr_eq(&back));
    assert_eq!(again.borrow().value, 1);

    // Break the cycles so the handles are freed.
    a.borrow_mut().next = None;
    back.borrow_mut().next = None;
}

#[test]
fn a_self_loop() {
    let node = Obj::new(Node::default());
    node.borrow_mut().next = Some(node.clone());

    let registry = TypeRegistry::new();
    let xml = to_xml(&node, &registry).unwrap();
    assert!(xml.contains(r#"<reference key="next">0</reference>"#));

    let back: Obj<Node> = from_xml(&xml, &registry).unwrap();
    let next = back.borrow().next.clone().unwrap();
    assert!(next.ptr_eq(&back));

    node.borrow_mut().next = None;
    back.borrow_mut().next = None;
}

#[test]
fn pointers_to_a_written_value() {
    let value = Shared::new(5);
    let cells = Cells {
        first: Ptr::to(&value),
        second: Ptr::to(&value),
        empty: Ptr::null(),
        value,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&cells, &registry).unwrap();
    assert!(xml.contains(r#"<int key="value" id="1">5</int>"#));
    assert!(xml.contains(r#"<pointer key="first" id="2">"#));
    assert!(xml.contains(r#"<reference key="1">1</reference>"#));
    assert!(xml.contains(r#"<reference key="second">2</reference>"#));
    assert!(xml.contains(r#"key="empty"/>"#));

    let back: Cells = from_xml(&xml, &registry).unwrap();
    assert!(back.first.points_to(&back.value));
    assert!(back.second.points_to(&back.value));
    assert!(back.empty.is_null());

    back.value.set(9);
    assert_eq!(back.first.get(), Some(9));
}

#[test]
fn pointer_written_before_its_target() {
    let value = Shared::new(String::from("target"));
    let forward = Forward {
        pointer: Ptr::to(&value),
        value,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&forward, &registry).unwrap();
    assert!(xml.contains(r#"<string type="char" length="6" key="1" id="2">target</string>"#));
    assert!(xml.contains(r#"<reference key="value">2</reference>"#));

    let back: Forward = from_xml(&xml, &registry).unwrap();
    assert!(back.pointer.points_to(&back.value));
    assert_eq!(back.value.get(), "target");
}

#[test]
fn forward_references_are_resolved_by_id() {
    // `value` refers to the cell inside `pointer`, which is read later.
    let xml = document(
        r#"<struct type="Forward" key="0" id="0">
            <reference key="value">2</reference>
            <pointer key="pointer" id="1">
                <string type="char" length="2" key="1" id="2">hi</string>
            </pointer>
        </struct>"#,
    );
    let back: Forward = from_xml(&xml, &TypeRegistry::new()).unwrap();
    assert!(back.pointer.points_to(&back.value));
    assert_eq!(back.value.get(), "hi");
}

#[test]
fn slices_keep_aliasing() {
    let all = SharedSlice::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]);
    let views = Views {
        middle: all.slice(2..6).unwrap(),
        head: all.slice(0..3).unwrap(),
        copy: SharedSlice::from_vec(vec![3, 4, 5, 6]),
        all,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&views, &registry).unwrap();
    assert!(xml.contains(r#"<slice key="middle" offset="2" length="4">6</slice>"#));
    assert!(xml.contains(r#"<slice key="head" offset="0" length="3">6</slice>"#));
    assert!(xml.contains(r#"<array type="int" length="4" key="copy""#));

    let back: Views = from_xml(&xml, &registry).unwrap();
    assert_eq!(back.middle.to_vec(), [3, 4, 5, 6]);
    assert_eq!(back.head.to_vec(), [1, 2, 3]);
    assert!(back.middle.shares_buffer(&back.all));
    assert!(back.head.shares_buffer(&back.all));
    assert!(!back.copy.shares_buffer(&back.all));

    back.middle.borrow_mut()[0] = 30;
    assert_eq!(back.all.borrow()[2], 30);
    assert_eq!(back.head.borrow()[2], 30);
    assert_eq!(back.copy.borrow()[0], 3);
}

#[test]
fn identical_views_alias_the_first() {
    let first = SharedSlice::from_vec(vec![1_u64, 2, 3]);
    let views = vec![first.clone(), first];

    let registry = TypeRegistry::new();
    let xml = to_xml(&views, &registry).unwrap();
    assert!(xml.contains(r#"<slice key="1" offset="0" length="3">1</slice>"#));

    let back: Vec<SharedSlice<u64>> = from_xml(&xml, &registry).unwrap();
    assert!(back[0].shares_buffer(&back[1]));
}

#[test]
fn out_of_range_slices_are_rejected() {
    let xml = document(
        r#"<struct type="Views" key="0" id="0">
            <array type="int" length="2" key="all" id="1">
                <int key="0" id="2">1</int>
                <int key="1" id="3">2</int>
            </array>
            <slice key="middle" offset="1" length="4">1</slice>
            <array type="int" length="0" key="head" id="4"/>
            <array type="int" length="0" key="copy" id="5"/>
        </struct>"#,
    );
    assert!(from_xml::<Views>(&xml, &TypeRegistry::new()).is_err());
}

#[test]
fn pointer_to_a_cell_holding_null() {
    let value = Shared::new(None);
    let cells = MaybeCell {
        pointer: Ptr::to(&value),
        value,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&cells, &registry).unwrap();
    assert!(xml.contains(r#"<null type="int" key="value"/>"#));
    assert!(xml.contains(r#"<pointer key="pointer" id="2">"#));
    assert!(xml.contains(r#"<null type="int" key="1"/>"#));

    let back: MaybeCell = from_xml(&xml, &registry).unwrap();
    assert_eq!(back.value.get(), None);
    assert_eq!(back.pointer.get(), Some(None));
}

#[test]
fn pointer_to_a_cell_holding_a_reference() {
    let point = Obj::new(Point { x: 1, y: 2 });
    let cell = Shared::new(point.clone());
    let holder = Holder {
        point,
        pointer: Ptr::to(&cell),
        cell,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&holder, &registry).unwrap();
    assert!(xml.contains(r#"<reference key="cell">1</reference>"#));
    assert!(xml.contains(r#"<pointer key="pointer" id="5">"#));
    assert!(xml.contains(r#"<reference key="1">1</reference>"#));

    let back: Holder = from_xml(&xml, &registry).unwrap();
    assert!(back.pointer.points_to(&back.cell));
    assert!(back.cell.get().ptr_eq(&back.point));
    assert_eq!(*back.point.borrow(), Point { x: 1, y: 2 });
}

#[test]
fn a_view_written_before_its_owner() {
    let all = SharedSlice::from_vec(vec![
        Obj::new(Point { x: 1, y: 1 }),
        Obj::new(Point { x: 2, y: 2 }),
        Obj::new(Point { x: 3, y: 3 }),
    ]);
    let first = all.borrow()[0].clone();
    let views = PointViews {
        head: all.slice(0..2).unwrap(),
        first: Some(first),
        all,
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&views, &registry).unwrap();
    assert!(xml.contains(r#"<slice key="head" offset="0" length="2">8</slice>"#));
    assert!(xml.contains(r#"<object runtimeType="Point" type="Point" key="0" id="2">"#));
    assert!(xml.contains(r#"<object runtimeType="Point" type="Point" key="1" id="5">"#));
    assert!(xml.contains(r#"<reference key="first">2</reference>"#));

    let back: PointViews = from_xml(&xml, &registry).unwrap();
    assert!(back.head.shares_buffer(&back.all));
    assert_eq!(back.all.len(), 3);
    assert_eq!(back.head.len(), 2);
    assert!(back.first.unwrap().ptr_eq(&back.all.borrow()[0]));
    assert_eq!(*back.all.borrow()[1].borrow(), Point { x: 2, y: 2 });
    assert_eq!(*back.all.borrow()[2].borrow(), Point { x: 3, y: 3 });
}

#[test]
fn a_map_reached_twice_is_written_once() {
    let catalog = Catalog {
        prices: BTreeMap::from([(String::from("apple"), 3), (String::from("pear"), 5)]),
        copy: BTreeMap::new(),
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&catalog, &registry).unwrap();
    assert!(xml.contains(r#"key="prices" id="1">"#));
    assert!(xml.contains(r#"<reference key="copy">1</reference>"#));
    assert_eq!(xml.matches("<associativeArray").count(), 1);

    let back: Catalog = from_xml(&xml, &registry).unwrap();
    assert_eq!(back.prices, catalog.prices);
    assert_eq!(back.copy, catalog.prices);
}

#[test]
fn detached_temporaries_never_alias() {
    let spans = vec![Span { start: 1 }, Span { start: 20 }];

    let registry = TypeRegistry::new();
    let xml = to_xml(&spans, &registry).unwrap();
    assert!(!xml.contains("<slice"));
    assert!(!xml.contains("<reference"));
    assert_eq!(xml.matches("<associativeArray").count(), 4);

    let back: Vec<Span> = from_xml(&xml, &registry).unwrap();
    assert_eq!(back, spans);
}
