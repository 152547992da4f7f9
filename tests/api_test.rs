#![allow(missing_docs)]

use std::fs;

use wirejson::{DateDialect, ErrorPayload, Json, JsonError, JsonSettings, MemberPolicy, Reflect};

#[derive(Reflect, Default, Debug, PartialEq, Clone)]
struct SimpleData {
    id: u32,
    message: String,
}

#[derive(Reflect, Default, Debug, PartialEq, Clone)]
struct ComplexData {
    title: String,
    numbers: Vec<u64>,
    inner: SimpleData,
}

// Generator of data
fn create_complex_data() -> ComplexData {
    ComplexData {
        title: "Integration Test".to_string(),
        numbers: (0..5_000).collect(),
        inner: SimpleData {
            id: 42,
            message: "Hello World".to_string(),
        },
    }
}

// --- TESTS ---

/// Standard File IO
/// Validate `Json::save`, `Json::load`
#[test]
fn test_standard_file_io() -> wirejson::Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("data.json");
    let data = create_complex_data();

    let json = Json::builder().pretty(true).build();
    json.save(&data, &file_path)?;

    let on_disk = fs::read_to_string(&file_path)?;
    assert!(on_disk.starts_with("{\"title\":\"Integration Test\",\n"));

    let loaded: ComplexData = json.load(&file_path)?;
    assert_eq!(data, loaded);
    Ok(())
}

#[test]
fn test_load_failures() -> wirejson::Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = Json::new()
        .load::<ComplexData, _>(dir.path().join("missing.json"))
        .unwrap_err();
    assert!(matches!(missing, JsonError::Io(_)), "{missing}");

    let empty_path = dir.path().join("empty.json");
    fs::write(&empty_path, "")?;
    let empty = Json::new()
        .load::<ComplexData, _>(&empty_path)
        .unwrap_err();
    assert_eq!(empty.kind(), "InvalidOperation");

    let binary_path = dir.path().join("binary.json");
    fs::write(&binary_path, [0xff, 0xfe, 0x00])?;
    let binary = Json::new()
        .load::<ComplexData, _>(&binary_path)
        .unwrap_err();
    assert!(binary.to_string().contains("UTF-8"), "{binary}");
    Ok(())
}

#[test]
fn test_builder_and_defaults() {
    let defaults = Json::new();
    assert_eq!(*defaults.settings(), JsonSettings::default());
    assert_eq!(defaults.settings().date_dialect, DateDialect::Iso);
    assert!(!defaults.settings().pretty);
    assert_eq!(defaults.settings().members, MemberPolicy::All);
    assert_eq!(defaults.settings().max_depth, 128);

    let json = Json::builder()
        .date_dialect(DateDialect::EpochOffset)
        .pretty(true)
        .members(MemberPolicy::FieldsOnly)
        .max_depth(8)
        .build();
    assert_eq!(
        *json.settings(),
        JsonSettings {
            date_dialect: DateDialect::EpochOffset,
            pretty: true,
            members: MemberPolicy::FieldsOnly,
            max_depth: 8,
        }
    );
    assert_eq!(Json::with_settings(*json.settings()), json);
}

#[test]
fn test_facade_is_shareable() {
    fn assert_shareable<T: Send + Sync + Copy + 'static>() {}
    assert_shareable::<Json>();

    let json = Json::builder().pretty(true).build();
    let handle = std::thread::spawn(move || json.serialize(&[1, 2]));
    let text = handle.join().expect("thread").expect("serialize");
    assert_eq!(text, "[1,\n2]");
}

#[test]
fn test_settings_file() -> wirejson::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "date_dialect": "ExpressionLiteral",
            "max_depth": 4,
            "comment": ["ignored", {"entirely": true}]
        }"#,
    )?;

    let settings = JsonSettings::load(&path)?;
    assert_eq!(settings.date_dialect, DateDialect::ExpressionLiteral);
    assert_eq!(settings.max_depth, 4);
    assert!(!settings.pretty);
    assert_eq!(settings.members, MemberPolicy::All);

    // Settings are written with the same engine.
    let text = wirejson::to_string(&settings)?;
    assert_eq!(
        text,
        r#"{"date_dialect":2,"pretty":false,"members":0,"max_depth":4}"#
    );
    assert_eq!(wirejson::from_str::<JsonSettings>(&text)?, settings);
    Ok(())
}

#[test]
fn test_error_payload() -> wirejson::Result<()> {
    let err = Json::new().deserialize::<u8>("300").unwrap_err();
    let payload = err.payload();
    assert_eq!(payload.kind, "Conversion");
    assert_eq!(payload.error, "cannot convert `300` into `u8`");

    let text = wirejson::to_string(&payload)?;
    assert_eq!(
        text,
        r#"{"error":"cannot convert `300` into `u8`","kind":"Conversion"}"#
    );
    assert_eq!(wirejson::from_str::<ErrorPayload>(&text)?, payload);
    Ok(())
}

#[test]
#[cfg(feature = "serde")]
fn test_settings_with_serde() {
    let settings = JsonSettings {
        date_dialect: DateDialect::EpochOffset,
        pretty: true,
        members: MemberPolicy::AccessorsOnly,
        max_depth: 16,
    };
    let config = bincode::config::standard();
    let bytes = bincode::serde::encode_to_vec(settings, config).expect("encode");
    let (back, _): (JsonSettings, usize) =
        bincode::serde::decode_from_slice(&bytes, config).expect("decode");
    assert_eq!(back, settings);
}
