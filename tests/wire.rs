use flexscalar::{
    Bool, BoolOrText, JsonType, Kind, Number, NumberValue, RawJson, Text, TextList,
    TextNumberBoolOrTimestamp, TextNumberOrTimestamp, TextOrNumber, Timestamp, MAX_SAFE_INTEGER,
};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(default)]
    id: Number,
    #[serde(default)]
    active: Bool,
    #[serde(default)]
    name: Text,
    #[serde(default)]
    created: Timestamp,
    #[serde(default)]
    tags: TextList,
    #[serde(default)]
    code: TextOrNumber,
    #[serde(default)]
    flag: BoolOrText,
    #[serde(default)]
    when: TextNumberOrTimestamp,
    #[serde(default)]
    any: TextNumberBoolOrTimestamp,
}

#[test]
fn test_record_roundtrip() {
    let json = r#"{"id":18446744073709551615,"active":true,"name":"a\"b","created":"2021-05-06T07:08:09Z","tags":["x","y"],"code":"A-1","flag":"maybe","when":"2021-05-06T07:08:09+02:00","any":-12}"#;
    let mut r: Record = serde_json::from_str(json).unwrap();
    assert_eq!(r.id.as_u64(), Some(u64::MAX));
    assert!(r.active.is_true());
    assert_eq!(r.name.get(), Some("a\"b"));
    assert!(r.created.has_value());
    assert_eq!(r.tags.len(), 2);
    assert_eq!(r.code.as_text(), Some("A-1"));
    assert_eq!(r.flag.as_bool(), None);
    assert!(r.when.is_text());
    assert_eq!(r.any.as_i8(), Some(-12));

    // the id crosses the safe range, so it is written back quoted
    let out = serde_json::to_string(&r).unwrap();
    assert!(out.starts_with(r#"{"id":"18446744073709551615","active":true,"#));

    // and the quoted form decodes to the same value
    let back: Record = serde_json::from_str(&out).unwrap();
    assert_eq!(back.id, r.id);
    assert_eq!(serde_json::to_string(&back).unwrap(), out);
}

#[test]
fn test_absent_fields() {
    let r: Record = serde_json::from_str("{}").unwrap();
    assert!(r.id.is_nil());
    assert!(r.active.is_nil());
    assert!(r.name.is_nil());
    assert!(r.created.is_nil());
    assert!(r.tags.is_empty());
    assert!(r.code.is_nil());
    assert_eq!(
        serde_json::to_string(&r).unwrap(),
        r#"{"id":null,"active":null,"name":null,"created":null,"tags":null,"code":null,"flag":null,"when":null,"any":null}"#
    );
}

#[test]
fn test_precision_boundary() {
    let safe = Number::from(MAX_SAFE_INTEGER);
    assert_eq!(safe.to_json().unwrap(), b"9007199254740991");
    let unsafe_ = Number::from(MAX_SAFE_INTEGER + 1);
    assert_eq!(unsafe_.to_json().unwrap(), br#""9007199254740992""#);
    let unsafe_neg = Number::from(-MAX_SAFE_INTEGER - 1);
    assert_eq!(unsafe_neg.to_json().unwrap(), br#""-9007199254740992""#);

    for json in [&b"9007199254740992"[..], br#""9007199254740992""#] {
        let n = Number::from_json(json).unwrap();
        assert_eq!(n.value(), Some(NumberValue::Uint(9007199254740992)));
    }
}

#[test]
fn test_variant_coercion_order() {
    let mut v = TextNumberOrTimestamp::new("234");
    assert_eq!(v.kind(), Some(Kind::Number));
    assert_eq!(v.as_i64(), Some(234));

    let v = TextNumberOrTimestamp::new("not-a-number");
    assert_eq!(v.kind(), Some(Kind::Text));

    let mut v = TextNumberBoolOrTimestamp::new("true");
    assert_eq!(v.as_bool(), Some(true));
    assert_eq!(v.kind(), Some(Kind::Bool));
}

#[test]
fn test_lazy_reinterpretation() {
    let mut v = TextNumberBoolOrTimestamp::from_json(br#""true""#).unwrap();
    assert!(v.is_text());
    assert_eq!(v.as_bool(), Some(true));
    assert!(v.is_bool());
    assert!(!v.is_text());

    let mut v = TextOrNumber::from_json(br#""1_000""#).unwrap();
    assert_eq!(v.peek_number().and_then(|n| n.as_u64()), Some(1000));
    assert!(v.is_text());
    assert_eq!(v.as_u16(), Some(1000));
    assert!(v.is_number());
}

#[test]
fn test_sniffer() {
    for (json, ty) in [
        ("  null ", JsonType::Null),
        ("false", JsonType::Boolean),
        ("-0.5e3", JsonType::Number),
        (r#""x""#, JsonType::String),
        (r#" {"a":[1]} "#, JsonType::Object),
        ("[]", JsonType::Array),
    ] {
        let raw = RawJson::from_str(json).trimmed();
        assert_eq!(raw.json_type(), Some(ty), "{}", json);
        assert!(!raw.is_malformed(), "{}", json);
    }
    assert!(RawJson::from_str("nul").is_malformed());
    assert!(RawJson::from_str(r#""open"#).is_malformed());
    assert!(RawJson::from_str("[1,").is_malformed());
    assert!(RawJson::from_str("").is_empty());
}

#[test]
fn test_shape_errors_carry_context() {
    let err = Number::from_json(br#"{"n":1}"#).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(err.raw(), Some(r#"{"n":1}"#));
    assert_eq!(err.expected(), Some("Number"));

    let err = serde_json::from_str::<Record>(r#"{"code":[1]}"#).unwrap_err();
    assert!(err.to_string().contains("TextOrNumber"), "{}", err);
}

#[test]
fn test_encode_nil_as_empty_string() {
    let mut t = Text::default();
    t.encode_nil_as_empty_string();
    assert_eq!(t.to_json().unwrap(), br#""""#);

    let mut v = TextNumberOrTimestamp::default();
    v.encode_nil_as_empty_string();
    assert_eq!(v.to_json().unwrap(), br#""""#);
    let mut out = Vec::new();
    v.to_writer(&mut out).unwrap();
    assert_eq!(out, br#""""#);
}
