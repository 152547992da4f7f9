#![allow(missing_docs)]

use std::collections::{BTreeSet, HashSet, VecDeque};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;
use wirejson::reader::Discard;
use wirejson::{Json, JsonError, Reflect};

#[derive(Reflect, Default, Debug, PartialEq)]
struct Account {
    id: u64,
    name: String,
    active: bool,
    owner: Option<Uuid>,
}

#[derive(Reflect, Default, Debug, PartialEq)]
struct Event {
    at: DateTime<Utc>,
    count: u32,
}

#[derive(Reflect, Default, Debug, PartialEq)]
struct Folder {
    name: String,
    children: Vec<Folder>,
}

fn assert_invalid(err: JsonError, needle: &str) {
    assert_eq!(err.kind(), "InvalidOperation", "{err}");
    assert!(err.to_string().contains(needle), "`{err}` should mention `{needle}`");
}

// --- TESTS ---

#[test]
fn test_reads_members_by_name() -> wirejson::Result<()> {
    let account: Account = wirejson::from_str(
        r#"{ "name" : "Ada", "id": 7, "active": true,
             "owner": "67e55044-10b1-426f-9247-bb680e5fe0c8" }"#,
    )?;
    assert_eq!(account.id, 7);
    assert_eq!(account.name, "Ada");
    assert!(account.active);
    assert_eq!(
        account.owner.map(|u| u.to_string()).as_deref(),
        Some("67e55044-10b1-426f-9247-bb680e5fe0c8")
    );
    Ok(())
}

#[test]
fn test_unknown_members_are_discarded() -> wirejson::Result<()> {
    let account: Account = wirejson::from_str(
        r#"{"id":1,"extra":{"deep":[1,2,{"x":"}]"}],"when":new Date(1, 2)},"name":"n","tail":null}"#,
    )?;
    assert_eq!(
        account,
        Account {
            id: 1,
            name: "n".into(),
            ..Account::default()
        }
    );
    Ok(())
}

#[test]
fn test_null_members_read_as_empty() -> wirejson::Result<()> {
    let account: Account =
        wirejson::from_str(r#"{"id":null,"name":null,"active":null,"owner":null}"#)?;
    assert_eq!(account, Account::default());
    Ok(())
}

#[test]
fn test_quoted_tokens_are_converted() -> wirejson::Result<()> {
    let account: Account = wirejson::from_str(r#"{"id":"42","active":"True"}"#)?;
    assert_eq!(account.id, 42);
    assert!(account.active);
    Ok(())
}

#[test]
fn test_string_escapes_and_structural_characters() -> wirejson::Result<()> {
    let account: Account = wirejson::from_str(r#"{"name":"a\"},{b\\","id":3}"#)?;
    assert_eq!(account.name, "a\"},{b\\");
    assert_eq!(account.id, 3);
    Ok(())
}

#[test]
fn test_stray_commas_are_skipped() -> wirejson::Result<()> {
    let account: Account = wirejson::from_str(r#"{,"id":1,,"name":"x",}"#)?;
    assert_eq!(account.id, 1);
    assert_eq!(account.name, "x");
    assert_eq!(wirejson::from_str::<Vec<u8>>("[1,,2,]")?, vec![1, 2]);
    Ok(())
}

#[test]
fn test_missing_comma_is_invalid() {
    let err = wirejson::from_str::<Account>(r#"{"id":"1" "name":"x"}"#).unwrap_err();
    assert_invalid(err, "missing comma");

    let err = wirejson::from_str::<Vec<String>>(r#"["a" "b"]"#).unwrap_err();
    assert_invalid(err, "missing comma");

    // Bare values must not swallow the member or element that follows them.
    for doc in [r#"{"name":abc "id":3}"#, r#"{"extra":null "id":3}"#] {
        let err = wirejson::from_str::<Account>(doc).unwrap_err();
        assert_invalid(err, "missing comma between members");
    }
    for doc in ["[1 2]", r#"[abc "x", "y"]"#] {
        let err = wirejson::from_str::<Vec<String>>(doc).unwrap_err();
        assert_invalid(err, "missing comma between elements");
    }
    assert_invalid(wirejson::from_str::<i64>("42 43").unwrap_err(), "trailing");
}

#[test]
fn test_unterminated_input_is_invalid() {
    assert_invalid(
        wirejson::from_str::<Account>(r#"{"name":"abc"#).unwrap_err(),
        "unterminated string",
    );
    assert_invalid(
        wirejson::from_str::<Account>(r#"{"id":1"#).unwrap_err(),
        "unterminated object",
    );
    assert_invalid(
        wirejson::from_str::<Vec<u8>>("[1, 2").unwrap_err(),
        "unterminated array",
    );
    assert_invalid(
        wirejson::from_str::<String>(r#""abc"#).unwrap_err(),
        "unterminated string",
    );
}

#[test]
fn test_empty_and_trailing_input_is_invalid() {
    assert_invalid(wirejson::from_str::<Account>("").unwrap_err(), "empty");
    assert_invalid(wirejson::from_str::<Account>(" \n\t").unwrap_err(), "empty");
    assert_invalid(
        wirejson::from_str::<Account>(r#"{"id":1} {"id":2}"#).unwrap_err(),
        "trailing",
    );
    assert_invalid(
        wirejson::from_str::<String>(r#""a" "b""#).unwrap_err(),
        "trailing",
    );
}

#[test]
fn test_top_level_literals() -> wirejson::Result<()> {
    assert_eq!(wirejson::from_str::<i64>(" -5 ")?, -5);
    assert_eq!(wirejson::from_str::<String>(r#""aé😀""#)?, "aé😀");
    assert_eq!(wirejson::from_str::<Option<i32>>("null")?, None);
    assert_eq!(wirejson::from_str::<Option<i32>>("12")?, Some(12));
    assert_eq!(wirejson::from_str::<f64>("1.5e3")?, 1500.0);
    Ok(())
}

#[test]
fn test_conversion_failure_names_the_target() {
    let err = wirejson::from_str::<Account>(r#"{"id":-1}"#).unwrap_err();
    match err {
        JsonError::Conversion { token, target } => {
            assert_eq!(token, "-1");
            assert_eq!(target, "u64");
        }
        other => panic!("expected a conversion error, got {other}"),
    }
}

#[test]
fn test_array_materialization() -> wirejson::Result<()> {
    assert_eq!(wirejson::from_str::<Vec<u8>>("[1, 2, 3]")?, vec![1, 2, 3]);
    assert_eq!(
        wirejson::from_str::<VecDeque<u8>>("[1, 2]")?,
        VecDeque::from([1, 2])
    );
    assert_eq!(
        wirejson::from_str::<HashSet<String>>(r#"["a", "b", "a"]"#)?,
        HashSet::from(["a".to_string(), "b".to_string()])
    );
    assert_eq!(
        wirejson::from_str::<BTreeSet<i32>>("[3, 1, 2]")?,
        BTreeSet::from([1, 2, 3])
    );
    assert_eq!(wirejson::from_str::<[u8; 2]>("[4, 5]")?, [4, 5]);
    assert_eq!(
        wirejson::from_str::<Vec<Vec<i32>>>("[[1], [2, 3], []]")?,
        vec![vec![1], vec![2, 3], vec![]]
    );
    Ok(())
}

#[test]
fn test_array_into_non_collection_is_invalid() {
    let err = wirejson::from_str::<Account>("[1, 2]").unwrap_err();
    assert_invalid(err, "cannot materialize an array");

    let err = wirejson::from_str::<[u8; 3]>("[1, 2]").unwrap_err();
    assert_invalid(err, "length 3");
}

#[test]
fn test_recursive_composites() -> wirejson::Result<()> {
    let folder: Folder = wirejson::from_str(
        r#"{"name":"root","children":[{"name":"a","children":[]},{"name":"b","children":[{"name":"c","children":[]}]}]}"#,
    )?;
    assert_eq!(folder.children.len(), 2);
    assert_eq!(folder.children[1].children[0].name, "c");
    Ok(())
}

#[test]
fn test_expression_dates_keep_their_commas() -> wirejson::Result<()> {
    let event: Event =
        wirejson::from_str(r#"{"at": new Date(2020, 0, 31, 12, 30, 15), "count": 2}"#)?;
    assert_eq!(
        event.at,
        Utc.with_ymd_and_hms(2020, 1, 31, 12, 30, 15)
            .single()
            .expect("valid date")
    );
    assert_eq!(event.count, 2);

    let events: Vec<DateTime<Utc>> = wirejson::from_str("[new Date(0), new Date(1970, 0, 2)]")?;
    assert_eq!(events[1].timestamp(), 86_400);
    Ok(())
}

#[test]
fn test_depth_limit() -> wirejson::Result<()> {
    let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
    let err = wirejson::from_str::<Discard>(&deep).unwrap_err();
    assert!(matches!(err, JsonError::DepthLimitExceeded(128)), "{err}");

    let shallow = Json::builder().max_depth(200).build();
    shallow.deserialize::<Discard>(&deep)?;
    Ok(())
}
