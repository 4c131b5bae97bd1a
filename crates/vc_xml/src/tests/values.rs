use std::collections::{BTreeMap, HashMap};

use vc_archive::{Archive, Deserializer, Serializer, TypeRegistry};

use super::{document, round_trip};
use crate::{XmlArchiver, XmlUnarchiver, from_xml, to_xml};

#[derive(Archive, Default, Debug, Clone, PartialEq)]
#[archive(rename = "Point")]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Archive, Default, Debug, Clone, Copy, PartialEq)]
#[archive(rename = "Color")]
enum Color {
    #[default]
    Red,
    Green = 5,
    Blue,
}

#[derive(Archive, Default, Debug, Clone, PartialEq)]
#[archive(rename = "Meters")]
struct Meters(f64);

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Scalars")]
struct Scalars {
    flag: bool,
    byte: i8,
    ubyte: u8,
    short: i16,
    ushort: u16,
    int: i32,
    uint: u32,
    long: i64,
    ulong: u64,
    cent: i128,
    ucent: u128,
    float: f32,
    double: f64,
    letter: char,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Record")]
struct Record {
    name: String,
    position: Point,
    color: Color,
    length: Meters,
    tags: Vec<String>,
    scores: BTreeMap<String, i64>,
    lookup: HashMap<u8, bool>,
    fixed: [u16; 3],
    missing: Option<Point>,
    present: Option<Box<Point>>,
    #[archive(skip)]
    cache: u32,
    #[archive(rename = "label")]
    title: String,
}

#[test]
fn integer_array_fragment() {
    let registry = TypeRegistry::new();
    let xml = to_xml(&vec![27_i32, 382, 283], &registry).unwrap();

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains(r#"<archive version="1.0.0" type="vc_xml">"#));
    assert!(xml.contains(r#"<array type="int" length="3" key="0" id="0">"#));
    assert!(xml.contains(r#"<int key="0" id="1">27</int>"#));
    assert!(xml.contains(r#"<int key="1" id="2">382</int>"#));
    assert!(xml.contains(r#"<int key="2" id="3">283</int>"#));

    let back: Vec<i32> = from_xml(&xml, &registry).unwrap();
    assert_eq!(back, [27, 382, 283]);
}

#[test]
fn every_scalar_kind() {
    let value = Scalars {
        flag: true,
        byte: i8::MIN,
        ubyte: u8::MAX,
        short: -12_345,
        ushort: 54_321,
        int: -7,
        uint: 4_000_000_000,
        long: i64::MIN,
        ulong: u64::MAX,
        cent: i128::MIN,
        ucent: u128::MAX,
        float: 0.1,
        double: -1.0e-300,
        letter: 'ß',
    };
    let registry = TypeRegistry::new();
    let xml = to_xml(&value, &registry).unwrap();

    assert!(xml.contains(r#"<bool key="flag" id="1">true</bool>"#));
    assert!(xml.contains(r#"<ucent key="ucent" id="11">"#));
    assert!(xml.contains(r#"<char key="letter" id="14">ß</char>"#));
    assert_eq!(from_xml::<Scalars>(&xml, &registry).unwrap(), value);
}

#[test]
fn strings_keep_markup_and_whitespace() {
    let registry = TypeRegistry::new();
    for text in [
        "",
        " ",
        "  padded  ",
        "<tag attr=\"1\"> & 'quoted'",
        "line\nbreak",
        "grüße, 世界 🦀",
    ] {
        let value = String::from(text);
        assert_eq!(round_trip(&value, &registry), value);
    }

    let xml = to_xml(&String::from("a<b"), &registry).unwrap();
    assert!(xml.contains(r#"<string type="char" length="3" key="0" id="0">a&lt;b</string>"#));
}

#[test]
fn nested_record() {
    let mut scores = BTreeMap::new();
    scores.insert(String::from("alice"), 10);
    scores.insert(String::from("bob"), -3);
    let mut lookup = HashMap::new();
    lookup.insert(1, true);
    lookup.insert(2, false);

    let record = Record {
        name: String::from("first"),
        position: Point { x: 3, y: -4 },
        color: Color::Green,
        length: Meters(12.5),
        tags: vec![String::from("a"), String::from("b")],
        scores,
        lookup,
        fixed: [1, 2, 3],
        missing: None,
        present: Some(Box::new(Point { x: 1, y: 1 })),
        cache: 99,
        title: String::from("titled"),
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&record, &registry).unwrap();
    assert!(xml.contains(r#"<struct type="Record" key="0" id="0">"#));
    assert!(xml.contains(r#"<struct type="Point" key="position""#));
    assert!(xml.contains(r#"<null type="Point" key="missing"/>"#));
    assert!(xml.contains(r#"key="label""#));
    assert!(!xml.contains(r#"key="cache""#));
    assert!(xml.contains(
        r#"<associativeArray keyType="string" valueType="long" length="2" key="scores""#
    ));

    let back: Record = from_xml(&xml, &registry).unwrap();
    assert_eq!(back.cache, 0);
    assert_eq!(back, Record { cache: 0, ..record });
}

#[test]
fn empty_containers() {
    let registry = TypeRegistry::new();
    assert!(round_trip(&Vec::<i32>::new(), &registry).is_empty());
    assert!(round_trip(&BTreeMap::<String, Point>::new(), &registry).is_empty());

    let xml = to_xml(&Vec::<String>::new(), &registry).unwrap();
    assert!(xml.contains(r#"<array type="string" length="0" key="0" id="0"/>"#));
}

#[test]
fn enums_are_written_as_their_discriminant() {
    let registry = TypeRegistry::new();
    let xml = to_xml(&Color::Blue, &registry).unwrap();
    assert!(xml.contains(r#"<enum type="Color" baseType="int" key="0" id="0">6</enum>"#));
    assert_eq!(from_xml::<Color>(&xml, &registry).unwrap(), Color::Blue);

    let unknown = document(r#"<enum type="Color" baseType="int" key="0" id="0">4</enum>"#);
    assert!(from_xml::<Color>(&unknown, &registry).is_err());
}

#[test]
fn typedefs_wrap_their_value() {
    let registry = TypeRegistry::new();
    let xml = to_xml(&Meters(2.25), &registry).unwrap();
    assert!(xml.contains(r#"<typedef type="Meters" key="0" id="0">"#));
    assert!(xml.contains(r#"<double key="1" id="1">2.25</double>"#));
    assert_eq!(from_xml::<Meters>(&xml, &registry).unwrap(), Meters(2.25));
}

#[test]
fn fields_are_read_by_key() {
    let xml = document(
        r#"<struct type="Point" key="0" id="0">
            <int key="y" id="2">4</int>
            <int key="x" id="1">3</int>
        </struct>"#,
    );
    let point: Point = from_xml(&xml, &TypeRegistry::new()).unwrap();
    assert_eq!(point, Point { x: 3, y: 4 });
}

#[test]
fn explicit_root_key() {
    let registry = TypeRegistry::new();
    let value = Point { x: 1, y: 2 };

    let mut archiver = XmlArchiver::new();
    let bytes = Serializer::new(&mut archiver, &registry)
        .serialize(&value, "origin")
        .unwrap();
    let xml = String::from_utf8(bytes.clone()).unwrap();
    assert!(xml.contains(r#"<struct type="Point" key="origin" id="0">"#));

    let mut unarchiver = XmlUnarchiver::new();
    let mut deserializer = Deserializer::new(&mut unarchiver, &registry);
    assert_eq!(deserializer.deserialize::<Point>(&bytes, "origin").unwrap(), value);
    assert!(deserializer.deserialize::<Point>(&bytes, "other").is_err());
}

#[test]
fn backends_are_reusable() {
    let registry = TypeRegistry::new();
    let mut archiver = XmlArchiver::new();
    let mut serializer = Serializer::new(&mut archiver, &registry);

    let first = serializer.serialize(&7_u8, "").unwrap();
    let second = serializer.serialize(&String::from("x"), "").unwrap();
    let second = String::from_utf8(second).unwrap();
    assert!(second.contains(r#"key="0" id="0""#));
    assert!(!second.contains("ubyte"));

    let mut unarchiver = XmlUnarchiver::new();
    let mut deserializer = Deserializer::new(&mut unarchiver, &registry);
    assert_eq!(deserializer.deserialize::<u8>(&first, "").unwrap(), 7);
    assert_eq!(deserializer.deserialize::<String>(second.as_bytes(), "").unwrap(), "x");
}
