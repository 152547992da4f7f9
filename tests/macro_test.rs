#![allow(missing_docs)]

use wirejson::inspector::{self, MemberKind};
use wirejson::reflect::Tag;
use wirejson::{Json, MemberPolicy, Reflect};

#[derive(Reflect, Default, Debug, PartialEq)]
#[reflect(accessor(name = "Total", ty = "u32", get = "total", set = "set_total"))]
#[reflect(accessor(name = "Label", ty = "String", get = "label"))]
struct Invoice {
    id: u32,
    #[reflect(rename = "lineCount")]
    lines: u32,
    #[reflect(skip)]
    cache: u32,
    cents: u32,
}

impl Invoice {
    fn total(&self) -> u32 {
        self.cents / 100
    }

    fn set_total(&mut self, total: u32) {
        self.cents = total * 100;
    }

    fn label(&self) -> String {
        format!("INV-{}", self.id)
    }
}

#[derive(Reflect, Default, Debug, PartialEq)]
struct Marker;

#[derive(Reflect, Default, Debug, PartialEq)]
struct Raw {
    r#type: String,
}

fn invoice() -> Invoice {
    Invoice {
        id: 1,
        lines: 2,
        cache: 99,
        cents: 250,
    }
}

// --- TESTS ---

#[test]
fn test_schema_lists_fields_then_accessors() {
    let schema = inspector::schema::<Invoice>();
    assert_eq!(
        schema.names().collect::<Vec<_>>(),
        ["id", "lineCount", "cents", "Total", "Label"]
    );
    assert!(schema.type_name().ends_with("Invoice"));

    let total = schema.member("Total").expect("accessor present");
    assert_eq!(total.kind(), MemberKind::Accessor);
    assert!(total.is_writable());
    assert!(!schema.member("Label").expect("accessor present").is_writable());
    assert!(schema.member("cache").is_none());
    assert!(schema.member("lines").is_none());

    let id = schema.member("id").expect("field present");
    assert_eq!(id.kind(), MemberKind::Field);
    assert_eq!(id.declared_type().tag, Some(Tag::Integer));
    assert_eq!(id.declared_type().type_name, "u32");
}

#[test]
fn test_schema_is_cached() {
    assert!(std::ptr::eq(
        inspector::schema::<Invoice>(),
        inspector::schema::<Invoice>()
    ));
}

#[test]
fn test_concurrent_registration_yields_one_schema() {
    #[derive(Reflect, Default)]
    struct Ledger {
        entries: Vec<u32>,
        owner: String,
    }

    let barrier = std::sync::Barrier::new(8);
    let addrs: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    inspector::schema::<Ledger>() as *const _ as usize
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert!(addrs.iter().all(|&a| a == addrs[0]), "{addrs:?}");
    assert_eq!(inspector::schema::<Ledger>() as *const _ as usize, addrs[0]);
    assert_eq!(inspector::schema::<Ledger>().len(), 2);
}

#[test]
fn test_schema_get_set_construct() -> wirejson::Result<()> {
    let schema = inspector::schema::<Invoice>();
    let mut inv = schema.construct();
    assert_eq!(inv, Invoice::default());

    assert!(schema.set_token(&mut inv, "lineCount", " 7 ")?);
    assert!(schema.set_token(&mut inv, "Total", "3")?);
    assert!(!schema.set_token(&mut inv, "Label", "ignored")?);
    assert!(!schema.set_token(&mut inv, "missing", "1")?);
    assert_eq!(inv.lines, 7);
    assert_eq!(inv.cents, 300);

    let mut label = String::new();
    let found = schema.get(&inv, "Label", &mut |value| {
        label = wirejson::to_string(value)?;
        Ok(())
    })?;
    assert!(found);
    assert_eq!(label, r#""INV-0""#);

    let err = schema.set_token(&mut inv, "id", "not a number").unwrap_err();
    assert_eq!(err.kind(), "Conversion");
    Ok(())
}

#[test]
fn test_member_policy_on_write() -> wirejson::Result<()> {
    let inv = invoice();
    assert_eq!(
        wirejson::to_string(&inv)?,
        r#"{"id":1,"lineCount":2,"cents":250,"Total":2,"Label":"INV-1"}"#
    );

    let fields = Json::builder().members(MemberPolicy::FieldsOnly).build();
    assert_eq!(
        fields.serialize(&inv)?,
        r#"{"id":1,"lineCount":2,"cents":250}"#
    );

    let accessors = Json::builder().members(MemberPolicy::AccessorsOnly).build();
    assert_eq!(accessors.serialize(&inv)?, r#"{"Total":2,"Label":"INV-1"}"#);
    Ok(())
}

#[test]
fn test_member_policy_on_read() -> wirejson::Result<()> {
    let text = r#"{"id":5,"Total":4,"Label":"ignored","cache":9,"lineCount":{"not":"a number"}}"#;

    let accessors = Json::builder().members(MemberPolicy::AccessorsOnly).build();
    let inv: Invoice = accessors.deserialize(text)?;
    assert_eq!(
        inv,
        Invoice {
            cents: 400,
            ..Invoice::default()
        }
    );

    let err = Json::new().deserialize::<Invoice>(text).unwrap_err();
    assert_eq!(err.kind(), "InvalidOperation");
    Ok(())
}

#[test]
fn test_skipped_field_keeps_default_on_read() -> wirejson::Result<()> {
    let inv: Invoice = wirejson::from_str(r#"{"id":1,"cache":9,"Total":2}"#)?;
    assert_eq!(inv.cache, 0);
    assert_eq!(inv.cents, 200);
    Ok(())
}

#[test]
fn test_unit_struct_and_raw_identifiers() -> wirejson::Result<()> {
    assert_eq!(wirejson::to_string(&Marker)?, "{}");
    assert_eq!(wirejson::from_str::<Marker>(r#"{"any":1}"#)?, Marker);

    let raw = Raw {
        r#type: "t".into(),
    };
    let text = wirejson::to_string(&raw)?;
    assert_eq!(text, r#"{"type":"t"}"#);
    assert_eq!(wirejson::from_str::<Raw>(&text)?, raw);
    Ok(())
}
