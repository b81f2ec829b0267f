use std::str::FromStr;
use std::sync::Arc;

use typed_json_codec::{CodecError, JsonSerializer};
use typed_json_schema::{
    Decimal, Json, TArray, TBool, TDecimal, TDouble, TLong, TObject, TString, TTrigger, Template,
};

fn scalar_schema() -> Arc<Template> {
    let mut obj = TObject::new("Scalars");
    obj.add_property(TBool::new("Flag"));
    obj.add_property(TLong::new("Age"));
    obj.add_property(TDouble::new("Ratio"));
    obj.add_property(TDecimal::new("Price"));
    obj.add_property(TString::new("Name"));
    obj.add_property(TTrigger::new("Poke"));
    Arc::new(Template::Object(obj))
}

fn array_root_schema() -> Arc<Template> {
    let mut row = TObject::new("Row");
    row.add_property(TLong::new("a"));
    Arc::new(Template::Array(TArray::new("Rows", row)))
}

#[test]
fn default_tree_wire_form() {
    let json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    let bytes = serializer.to_bytes(&json, None).unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"Flag":false,"Age":0,"Ratio":0.0,"Price":0.0,"Name":"","Poke":null}"#
    );
}

#[test]
fn scalar_boundary_roundtrip() {
    let serializer = JsonSerializer::new();
    for (age, name, price) in [
        (i64::MIN, "", "0.0000000000000000000000000001"),
        (i64::MAX, "quote \" and\nnewline", "0.1234567890123456789012345678"),
        (0, "日本語 😀", "-792281625142643375935439503.35"),
    ] {
        let mut json = Json::new(scalar_schema()).unwrap();
        json.set_long("Age", age).unwrap();
        json.set_str("Name", name).unwrap();
        json.set_decimal("Price", Decimal::from_str(price).unwrap()).unwrap();
        json.set_bool("Flag", true).unwrap();

        let bytes = serializer.to_bytes(&json, None).unwrap();
        let mut back = Json::new(scalar_schema()).unwrap();
        let consumed = serializer.populate(&mut back, &bytes).unwrap();
        assert_eq!(consumed, bytes.len());

        assert_eq!(back.get_long("Age").unwrap(), age);
        assert_eq!(back.get_str("Name").unwrap(), Some(name));
        assert_eq!(
            back.get_decimal("Price").unwrap(),
            Decimal::from_str(price).unwrap()
        );
        assert!(back.get_bool("Flag").unwrap());
    }
}

#[test]
fn signed_zero_doubles_keep_their_point() {
    let serializer = JsonSerializer::new();
    for (value, expected) in [(0.0f64, r#""Ratio":0.0"#), (-0.0, r#""Ratio":-0.0"#)] {
        let mut json = Json::new(scalar_schema()).unwrap();
        json.set_double("Ratio", value).unwrap();
        let bytes = serializer.to_bytes(&json, None).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(expected), "{text}");

        let mut back = Json::new(scalar_schema()).unwrap();
        serializer.populate(&mut back, &bytes).unwrap();
        let ratio = back.get_double("Ratio").unwrap();
        assert_eq!(ratio, value);
        assert_eq!(ratio.is_sign_negative(), value.is_sign_negative());
    }
}

#[test]
fn null_string_convention() {
    // The absent marker serializes as the two-byte literal "", never null.
    let json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    let bytes = serializer.to_bytes(&json, None).unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.contains(r#""Name":"""#), "{text}");
    assert!(!text.contains(r#""Name":null"#), "{text}");
}

#[test]
fn unknown_property_is_rejected() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    let err = serializer
        .populate(&mut json, br#"{"unknownField":1}"#)
        .unwrap_err();
    assert_eq!(
        err,
        CodecError::PropertyNotFound {
            property: "unknownField".to_owned()
        }
    );
}

#[test]
fn quoted_literals_are_accepted() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    serializer
        .populate(&mut json, br#"{"Age":"42","Flag":"true"}"#)
        .unwrap();
    assert_eq!(json.get_long("Age").unwrap(), 42);
    assert!(json.get_bool("Flag").unwrap());
}

#[test]
fn null_token_is_accepted_for_any_scalar() {
    let mut json = Json::new(scalar_schema()).unwrap();
    json.set_long("Age", 9).unwrap();
    json.set_str("Name", "set").unwrap();
    let serializer = JsonSerializer::new();
    serializer
        .populate(
            &mut json,
            br#"{"Age":null,"Name":null,"Flag":null,"Ratio":null,"Price":null,"Poke":null}"#,
        )
        .unwrap();
    assert_eq!(json.get_long("Age").unwrap(), 0);
    assert_eq!(json.get_str("Name").unwrap(), None);
    assert!(!json.get_bool("Flag").unwrap());
    assert_eq!(json.get_double("Ratio").unwrap(), 0.0);
    assert_eq!(json.get_decimal("Price").unwrap(), Decimal::ZERO);
}

#[test]
fn trigger_rejects_non_null() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    let err = serializer
        .populate(&mut json, br#"{"Poke":1}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::WrongValueType { .. }));
}

#[test]
fn type_mismatch_reports_property_and_raw_text() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    let err = serializer
        .populate(&mut json, br#"{"Age":"not a number"}"#)
        .unwrap_err();
    match err {
        CodecError::WrongValueType {
            property, value, ..
        } => {
            assert_eq!(property, "Age");
            assert_eq!(value, r#""not a number""#);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn array_order_is_preserved() {
    let serializer = JsonSerializer::new();
    let mut json = Json::new(array_root_schema()).unwrap();
    serializer
        .populate(&mut json, br#"[{"a":1},{"a":2},{"a":3}]"#)
        .unwrap();
    let values: Vec<i64> = json
        .items()
        .iter()
        .map(|row| row.get_long("a").unwrap())
        .collect();
    assert_eq!(values, [1, 2, 3]);

    let bytes = serializer.to_bytes(&json, None).unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"[{"a":1},{"a":2},{"a":3}]"#
    );
}

#[test]
fn nested_objects_and_arrays_roundtrip() {
    let schema = {
        let mut address = TObject::new("Address");
        address.add_property(TString::new("City"));
        address.add_property(TLong::new("Zip"));
        let mut item = TObject::new("Item");
        item.add_property(TString::new("Label"));
        let mut person = TObject::new("Person");
        person.add_property(TString::new("Name"));
        person.add_property(address);
        person.add_property(TArray::new("Items", item));
        Arc::new(Template::Object(person))
    };
    // "Address" above serializes under its template name.
    let serializer = JsonSerializer::new();
    let mut json = Json::new(schema.clone()).unwrap();
    json.set_str("Name", "Ada").unwrap();
    let address = json.child_mut("Address").unwrap();
    address.set_str("City", "London").unwrap();
    address.set_long("Zip", 12345).unwrap();
    for label in ["x", "y"] {
        json.child_mut("Items")
            .unwrap()
            .add_item()
            .unwrap()
            .set_str("Label", label)
            .unwrap();
    }

    let bytes = serializer.to_bytes(&json, None).unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"Name":"Ada","Address":{"City":"London","Zip":12345},"Items":[{"Label":"x"},{"Label":"y"}]}"#
    );

    // Independent parser agrees the output is well-formed JSON.
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["Address"]["City"], "London");
    assert_eq!(parsed["Items"][1]["Label"], "y");

    let mut back = Json::new(schema).unwrap();
    serializer.populate(&mut back, &bytes).unwrap();
    assert_eq!(
        back.child("Address").unwrap().get_str("City").unwrap(),
        Some("London")
    );
    assert_eq!(back.child("Items").unwrap().len(), 2);
}

#[test]
fn internal_properties_stay_off_the_wire() {
    let schema = {
        let mut obj = TObject::new("Mixed");
        obj.add_property(TLong::new("Public"));
        obj.add_internal(TLong::new("Secret"));
        Arc::new(Template::Object(obj))
    };
    let serializer = JsonSerializer::new();
    let mut json = Json::new(schema.clone()).unwrap();
    json.set_long("Public", 1).unwrap();
    json.set_long("Secret", 2).unwrap();

    let bytes = serializer.to_bytes(&json, None).unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"Public":1}"#);

    // An inbound property matching a non-exposed child is unknown.
    let mut back = Json::new(schema).unwrap();
    let err = serializer
        .populate(&mut back, br#"{"Secret":3}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::PropertyNotFound { .. }));
}

#[test]
fn whitespace_tolerant_populate() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    serializer
        .populate(
            &mut json,
            b" \t\r\n{ \"Age\" : 5 ,\n \"Name\" : \"a b\" } ",
        )
        .unwrap();
    assert_eq!(json.get_long("Age").unwrap(), 5);
    assert_eq!(json.get_str("Name").unwrap(), Some("a b"));
}

#[test]
fn truncated_document_is_fatal() {
    let mut json = Json::new(scalar_schema()).unwrap();
    let serializer = JsonSerializer::new();
    assert_eq!(
        serializer.populate(&mut json, br#"{"Age":5"#).unwrap_err(),
        CodecError::UnexpectedEndOfContent
    );
}
