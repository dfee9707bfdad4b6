//! Usage: Typed JSON field lookups that distinguish "absent" from "present with the wrong type".

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup<T> {
    Present(T),
    Absent,
    WrongType,
}

impl<T> FieldLookup<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::WrongType => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

pub(crate) fn string_field(object: &Map<String, Value>, name: &str) -> FieldLookup<String> {
    match object.get(name) {
        None => FieldLookup::Absent,
        Some(Value::String(value)) => FieldLookup::Present(value.clone()),
        Some(_) => FieldLookup::WrongType,
    }
}

pub(crate) fn bool_field(object: &Map<String, Value>, name: &str) -> FieldLookup<bool> {
    match object.get(name) {
        None => FieldLookup::Absent,
        Some(Value::Bool(value)) => FieldLookup::Present(*value),
        Some(_) => FieldLookup::WrongType,
    }
}

pub(crate) fn object_field<'a>(
    object: &'a Map<String, Value>,
    name: &str,
) -> FieldLookup<&'a Map<String, Value>> {
    match object.get(name) {
        None => FieldLookup::Absent,
        Some(Value::Object(value)) => FieldLookup::Present(value),
        Some(_) => FieldLookup::WrongType,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        match json!({"url": "https://x", "is_master": true, "error": {"code": "1"}, "n": 3}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn string_field_reports_all_three_states() {
        let obj = sample();
        assert_eq!(
            string_field(&obj, "url"),
            FieldLookup::Present("https://x".to_string())
        );
        assert_eq!(string_field(&obj, "missing"), FieldLookup::Absent);
        assert_eq!(string_field(&obj, "n"), FieldLookup::WrongType);
    }

    #[test]
    fn bool_field_rejects_strings() {
        let obj = sample();
        assert_eq!(bool_field(&obj, "is_master"), FieldLookup::Present(true));
        assert_eq!(bool_field(&obj, "url"), FieldLookup::WrongType);
    }

    #[test]
    fn object_field_only_accepts_objects() {
        let obj = sample();
        assert!(object_field(&obj, "error").is_present());
        assert_eq!(object_field(&obj, "url"), FieldLookup::WrongType);
        assert_eq!(object_field(&obj, "nope"), FieldLookup::Absent);
    }
}
