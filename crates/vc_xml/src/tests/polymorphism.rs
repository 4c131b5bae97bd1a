use std::cell::RefCell;
use std::rc::Rc;

use vc_archive::{Archive, Error, Obj, Object, ObjectType, TypeRegistry, register_polymorphic};

use super::round_trip;
use crate::{from_xml, to_xml};

trait Shape: Object {
    fn area(&self) -> f64;
}

impl ObjectType for dyn Shape {
    fn static_type_name() -> &'static str {
        "shapes.Shape"
    }
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "shapes.Circle")]
struct Circle {
    radius: f64,
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        3.0 * self.radius * self.radius
    }
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "shapes.Square")]
struct Square {
    side: f64,
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

#[derive(Archive, Default)]
#[archive(rename = "shapes.Drawing")]
struct Drawing {
    shapes: Vec<Obj<dyn Shape>>,
    favourite: Option<Obj<dyn Shape>>,
}

#[derive(Archive, Default)]
#[archive(rename = "shapes.Views")]
struct Views {
    circle: Obj<Circle>,
    shape: Option<Obj<dyn Shape>>,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "shapes.Named")]
struct Named {
    name: String,
}

#[derive(Archive, Default, Debug, PartialEq)]
#[archive(rename = "shapes.Label")]
struct Label {
    #[archive(base)]
    named: Named,
    text: String,
}

fn shape<S: Shape>(value: S) -> Obj<dyn Shape> {
    let rc: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(value));
    Obj::from_rc(rc)
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_polymorphic!(registry, Circle => dyn Shape);
    register_polymorphic!(registry, Square => dyn Shape);
    registry
}

#[test]
fn objects_are_rebuilt_by_runtime_type() {
    let circle = shape(Circle { radius: 2.0 });
    let drawing = Drawing {
        shapes: vec![circle.clone(), shape(Square { side: 3.0 })],
        favourite: Some(circle),
    };

    let registry = registry();
    let xml = to_xml(&drawing, &registry).unwrap();
    assert!(xml.contains(
        r#"<object runtimeType="shapes.Circle" type="shapes.Shape" key="0" id="2">"#
    ));
    assert!(xml.contains(r#"runtimeType="shapes.Square""#));
    assert!(xml.contains(r#"<reference key="favourite">2</reference>"#));

    let back: Drawing = from_xml(&xml, &registry).unwrap();
    assert_eq!(back.shapes.len(), 2);
    assert_eq!(back.shapes[0].borrow().area(), 12.0);
    assert_eq!(back.shapes[1].borrow().area(), 9.0);
    assert_eq!(back.shapes[1].borrow().runtime_type_name(), "shapes.Square");
    assert!(back.favourite.unwrap().ptr_eq(&back.shapes[0]));
}

#[test]
fn one_object_seen_through_two_types() {
    let circle = Obj::new(Circle { radius: 1.0 });
    let rc: Rc<RefCell<dyn Shape>> = circle.as_rc().clone();
    let views = Views {
        circle,
        shape: Some(Obj::from_rc(rc)),
    };

    let back = round_trip(&views, &registry());
    let shape = back.shape.unwrap();
    assert!(shape.ptr_eq(&back.circle));

    back.circle.borrow_mut().radius = 2.0;
    assert_eq!(shape.borrow().area(), 12.0);
}

#[test]
fn unregistered_runtime_types_fail() {
    let drawing = Drawing {
        shapes: vec![shape(Square { side: 1.0 })],
        favourite: None,
    };

    let err = to_xml(&drawing, &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err, Error::UnregisteredType { ref name } if name == "shapes.Square"));

    let xml = to_xml(&drawing, &registry()).unwrap();
    let mut partial = TypeRegistry::new();
    register_polymorphic!(partial, Circle => dyn Shape);
    let err = from_xml::<Drawing>(&xml, &partial).err().unwrap();
    assert!(matches!(err, Error::UnregisteredType { .. }));
}

#[test]
fn base_types_form_a_section() {
    let label = Label {
        named: Named {
            name: String::from("title"),
        },
        text: String::from("Hello"),
    };

    let registry = TypeRegistry::new();
    let xml = to_xml(&label, &registry).unwrap();
    assert!(xml.contains(r#"<base type="shapes.Named" key="named" id="2">"#));
    assert!(xml.contains(r#"<string type="char" length="5" key="name" id="3">title</string>"#));
    assert_eq!(from_xml::<Label>(&xml, &registry).unwrap(), label);
}
