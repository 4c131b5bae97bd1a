use std::cell::Cell;
use std::rc::Rc;

use vc_archive::{
    Archive, CustomArchive, Deserializer, Error, ErrorAction, Obj, OpaquePtr, Serializer,
    TypeRegistry, warn_and_ignore,
};

use super::{document, round_trip};
use crate::{XmlArchiver, XmlUnarchiver, from_xml, to_xml};

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Point")]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Archive, Default, Debug)]
#[archive(rename = "Path")]
struct Path {
    points: Vec<Point>,
    friend: Option<Obj<Point>>,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Secret")]
struct Secret {
    pin: u32,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Vault")]
struct Vault {
    name: String,
    secret: Secret,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Rgb", custom)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl CustomArchive for Rgb {
    fn to_archive(&self, s: &mut Serializer<'_>) -> Result<(), Error> {
        let packed = u32::from_be_bytes([0, self.r, self.g, self.b]);
        s.write(&packed, "packed")
    }

    fn from_archive(&mut self, d: &mut Deserializer<'_>) -> Result<(), Error> {
        let [_, r, g, b] = d.read::<u32>("packed")?.to_be_bytes();
        *self = Rgb { r, g, b };
        Ok(())
    }
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "Temperature")]
struct Temperature {
    celsius: f64,
}

#[derive(Archive, Default, Debug)]
#[archive(rename = "Stats", on_deserialized = Stats::recompute)]
struct Stats {
    values: Vec<i32>,
    #[archive(skip)]
    total: i32,
}

impl Stats {
    fn recompute(&mut self) {
        self.total = self.values.iter().sum();
    }
}

#[derive(Default)]
struct Handle {
    raw: u64,
}

#[derive(Archive, Default)]
#[archive(rename = "Tools")]
struct Tools {
    first: OpaquePtr<Handle>,
    second: OpaquePtr<Handle>,
    none: OpaquePtr<Handle>,
}

/// Reads `xml` with a callback that counts its calls.
fn read_counting<T: Archive>(xml: &str, action: ErrorAction) -> (Result<T, Error>, usize) {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let registry = TypeRegistry::new();
    let mut unarchiver = XmlUnarchiver::new();
    let result = Deserializer::new(&mut unarchiver, &registry)
        .with_error_callback(move |_| {
            counter.set(counter.get() + 1);
            action
        })
        .deserialize::<T>(xml.as_bytes(), "");
    (result, calls.get())
}

fn bad_point() -> String {
    document(
        r#"<struct type="Point" key="0" id="0">
            <int key="x" id="1">abc</int>
            <int key="y" id="2">4</int>
        </struct>"#,
    )
}

#[test]
fn malformed_values_raise_by_default() {
    let err = from_xml::<Point>(&bad_point(), &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err, Error::MalformedValue { ref key, .. } if key == "x"));
}

#[test]
fn ignored_errors_fall_back() {
    let (point, calls) = read_counting::<Point>(&bad_point(), ErrorAction::Ignore);
    assert_eq!(point.unwrap(), Point { x: 0, y: 4 });
    assert_eq!(calls, 1);

    let missing = document(
        r#"<struct type="Point" key="0" id="0"><int key="y" id="1">4</int></struct>"#,
    );
    let (point, calls) = read_counting::<Point>(&missing, ErrorAction::Ignore);
    assert_eq!(point.unwrap(), Point { x: 0, y: 4 });
    assert_eq!(calls, 1);
}

#[test]
fn the_callback_sees_an_error_once() {
    let xml = document(
        r#"<struct type="Path" key="0" id="0">
            <array type="Point" length="1" key="points" id="1">
                <struct type="Point" key="0" id="2">
                    <int key="x" id="3">1</int>
                    <int key="y" id="4">1.5</int>
                </struct>
            </array>
            <null type="Point" key="friend"/>
        </struct>"#,
    );
    let (path, calls) = read_counting::<Path>(&xml, ErrorAction::Raise);
    assert!(matches!(path, Err(Error::MalformedValue { .. })));
    assert_eq!(calls, 1);
}

#[test]
fn unresolved_references_become_none() {
    let xml = document(
        r#"<struct type="Path" key="0" id="0">
            <array type="Point" length="0" key="points" id="1"/>
            <reference key="friend">9</reference>
        </struct>"#,
    );
    let (path, calls) = read_counting::<Path>(&xml, ErrorAction::Ignore);
    let path = path.unwrap();
    assert!(path.points.is_empty());
    assert!(path.friend.is_none());
    assert_eq!(calls, 1);

    let (path, _) = read_counting::<Path>(&xml, ErrorAction::Raise);
    assert!(matches!(path, Err(Error::MissingId { id: 9 })));
}

#[test]
fn skipped_values_leave_no_trace() {
    let registry = TypeRegistry::new();
    let vault = Vault {
        name: String::from("main"),
        secret: Secret { pin: 1234 },
    };

    let mut archiver = XmlArchiver::new();
    let mut serializer =
        Serializer::new(&mut archiver, &registry).with_error_callback(warn_and_ignore);
    serializer
        .override_serializer::<Secret, _>(|_, _| Err(Error::Unsupported(String::from("secret"))));
    let bytes = serializer.serialize(&vault, "").unwrap();

    let xml = String::from_utf8(bytes).unwrap();
    assert!(xml.contains(r#"key="name""#));
    assert!(!xml.contains("Secret"));
    assert!(!xml.contains("1234"));

    let (back, calls) = read_counting::<Vault>(&xml, ErrorAction::Ignore);
    assert_eq!(back.unwrap(), Vault { secret: Secret::default(), ..vault });
    assert_eq!(calls, 1);
}

#[test]
fn custom_codecs_replace_the_field_walk() {
    let registry = TypeRegistry::new();
    let color = Rgb { r: 1, g: 2, b: 3 };
    let xml = to_xml(&color, &registry).unwrap();
    assert!(xml.contains(r#"<uint key="packed" id="1">66051</uint>"#));
    assert!(!xml.contains(r#"key="r""#));
    assert_eq!(from_xml::<Rgb>(&xml, &registry).unwrap(), color);
}

#[test]
fn registered_codecs_take_precedence() {
    let mut registry = TypeRegistry::new();
    registry
        .register_serializer::<Temperature, _>(|t, s| {
            s.write(&((t.celsius * 10.0).round() as i64), "tenths")
        })
        .register_deserializer::<Temperature, _>(|t, d| {
            t.celsius = d.read::<i64>("tenths")? as f64 / 10.0;
            Ok(())
        });

    let xml = to_xml(&Temperature { celsius: 21.5 }, &registry).unwrap();
    assert!(xml.contains(r#"<long key="tenths" id="1">215</long>"#));
    assert!(!xml.contains("celsius"));
    let cold = Temperature { celsius: -3.0 };
    assert_eq!(round_trip(&cold, &registry), cold);

    let mut unarchiver = XmlUnarchiver::new();
    let mut deserializer = Deserializer::new(&mut unarchiver, &registry);
    deserializer.override_deserializer::<Temperature, _>(|t, d| {
        t.celsius = d.read::<i64>("tenths")? as f64;
        Ok(())
    });
    let back = deserializer.deserialize::<Temperature>(xml.as_bytes(), "").unwrap();
    assert_eq!(back.celsius, 215.0);
}

#[test]
fn hooks_run_after_reading() {
    let stats = Stats {
        values: vec![1, 2, 3],
        total: 6,
    };
    let back = round_trip(&stats, &TypeRegistry::new());
    assert_eq!(back.values, [1, 2, 3]);
    assert_eq!(back.total, 6);
}

#[test]
fn opaque_pointers_need_a_codec() {
    let handle = OpaquePtr::new(Handle { raw: 42 });
    let tools = Tools {
        first: handle.clone(),
        second: handle,
        none: OpaquePtr::null(),
    };

    let err = to_xml(&tools, &TypeRegistry::new()).err().unwrap();
    assert!(matches!(err, Error::MissingCodec { .. }));

    let mut registry = TypeRegistry::new();
    registry
        .register_serializer::<Handle, _>(|h, s| s.write(&h.raw, "raw"))
        .register_deserializer::<Handle, _>(|h, d| {
            h.raw = d.read("raw")?;
            Ok(())
        });

    let xml = to_xml(&tools, &registry).unwrap();
    assert!(xml.contains(r#"<pointer key="first" id="1">"#));
    assert!(xml.contains(r#"<ulong key="raw" id="2">42</ulong>"#));
    assert!(xml.contains(r#"<reference key="second">1</reference>"#));

    let back: Tools = from_xml(&xml, &registry).unwrap();
    assert!(back.first.ptr_eq(&back.second));
    assert!(back.none.is_null());
    assert_eq!(back.first.borrow().unwrap().raw, 42);

    let err = from_xml::<Tools>(&xml, &TypeRegistry::new()).err().unwrap();
    assert!(matches!(err, Error::MissingCodec { .. }));
}
