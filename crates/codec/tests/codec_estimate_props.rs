use std::sync::Arc;

use proptest::prelude::*;

use typed_json_codec::JsonSerializer;
use typed_json_schema::{Json, TArray, TDouble, TLong, TObject, TString, Template};

fn fuzz_schema() -> Arc<Template> {
    let mut row = TObject::new("Row");
    row.add_property(TString::new("Label"));
    let mut obj = TObject::new("Fuzz");
    obj.add_property(TString::new("Name"));
    obj.add_property(TString::new("Note"));
    obj.add_property(TLong::new("Count"));
    obj.add_property(TDouble::new("Ratio"));
    obj.add_property(TArray::new("Rows", row));
    Arc::new(Template::Object(obj))
}

fn build_tree(name: &str, note: &str, count: i64, ratio: f64, labels: &[String]) -> Json {
    let mut json = Json::new(fuzz_schema()).unwrap();
    json.set_str("Name", name).unwrap();
    json.set_str("Note", note).unwrap();
    json.set_long("Count", count).unwrap();
    json.set_double("Ratio", ratio).unwrap();
    for label in labels {
        json.child_mut("Rows")
            .unwrap()
            .add_item()
            .unwrap()
            .set_str("Label", label.as_str())
            .unwrap();
    }
    json
}

proptest! {
    // Strings cover the whole unicode range; Note additionally forces the
    // control bytes 0x00-0x1f that widen under \u00XX escaping.
    #[test]
    fn estimate_covers_written(
        name in any::<String>(),
        note in "[\\x00-\\x1F ab\"\\\\]{0,24}",
        count in any::<i64>(),
        ratio in -1.0e300f64..1.0e300f64,
        labels in proptest::collection::vec(any::<String>(), 0..4),
    ) {
        let serializer = JsonSerializer::new();
        let json = build_tree(&name, &note, count, ratio, &labels);

        let estimated = serializer.estimate(&json, None).unwrap();
        let mut buf = vec![0u8; estimated];
        let written = serializer.serialize(&json, &mut buf, None).unwrap();
        prop_assert!(written <= estimated, "wrote {} of {}", written, estimated);
    }

    #[test]
    fn output_parses_under_an_independent_parser(
        name in any::<String>(),
        note in "[\\x00-\\x1F]{0,16}",
        ratio in -1.0e300f64..1.0e300f64,
    ) {
        let serializer = JsonSerializer::new();
        let json = build_tree(&name, &note, 0, ratio, &[]);
        let bytes = serializer.to_bytes(&json, None).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(parsed["Name"].as_str(), Some(name.as_str()));
        prop_assert_eq!(parsed["Note"].as_str(), Some(note.as_str()));
    }

    #[test]
    fn populate_inverts_serialize(
        name in any::<String>(),
        note in "[\\x00-\\x1F ab]{0,24}",
        count in any::<i64>(),
        ratio in -1.0e300f64..1.0e300f64,
        labels in proptest::collection::vec(any::<String>(), 0..4),
    ) {
        let serializer = JsonSerializer::new();
        let json = build_tree(&name, &note, count, ratio, &labels);
        let bytes = serializer.to_bytes(&json, None).unwrap();

        let mut back = Json::new(fuzz_schema()).unwrap();
        let consumed = serializer.populate(&mut back, &bytes).unwrap();
        prop_assert_eq!(consumed, bytes.len());

        prop_assert_eq!(back.get_str("Name").unwrap(), Some(name.as_str()));
        prop_assert_eq!(back.get_str("Note").unwrap(), Some(note.as_str()));
        prop_assert_eq!(back.get_long("Count").unwrap(), count);
        // Shortest round-trip text makes the double re-parse exactly.
        prop_assert_eq!(back.get_double("Ratio").unwrap(), ratio);

        let rows = back.child("Rows").unwrap();
        prop_assert_eq!(rows.len(), labels.len());
        for (row, label) in rows.items().iter().zip(&labels) {
            prop_assert_eq!(row.get_str("Label").unwrap(), Some(label.as_str()));
        }

        // Re-serializing the populated tree reproduces the bytes.
        let again = serializer.to_bytes(&back, None).unwrap();
        prop_assert_eq!(again, bytes);
    }
}
