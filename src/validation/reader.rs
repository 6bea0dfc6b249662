//! Path-tracking reader over one mapping of a contract document.
//!
//! Every model constructor reads its fields through an [`ObjectReader`], which
//! attaches the document path to each shape error and rejects keys that no
//! constructor consumed. `null` is treated the same as an absent key.

use super::error::{StructuralResult, StructuralValidationError, Violation};
use super::path::FieldPath;
use crate::models::enums::Vocabulary;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Number, Value};

/// Largest float magnitude that is still folded into an integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    path: FieldPath,
    consumed: Vec<&'static str>,
}

impl<'a> ObjectReader<'a> {
    pub fn new(value: &'a Value, path: FieldPath) -> StructuralResult<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path,
                consumed: Vec::new(),
            }),
            other => Err(StructuralValidationError::new(
                path,
                Violation::WrongType {
                    expected: "mapping",
                    found: value_kind(other),
                },
            )),
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn field_path(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }

    pub fn error(&self, key: &str, violation: Violation) -> StructuralValidationError {
        StructuralValidationError::new(self.field_path(key), violation)
    }

    /// Raw value of a field, marking it consumed
    pub fn get(&mut self, key: &'static str) -> Option<&'a Value> {
        self.consumed.push(key);
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Whether a non-null value is present, without consuming it
    pub fn has(&self, key: &str) -> bool {
        !matches!(self.map.get(key), None | Some(Value::Null))
    }

    pub fn optional_string(&mut self, key: &'static str) -> StructuralResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(key, "string", other)),
        }
    }

    pub fn required_string(&mut self, key: &'static str) -> StructuralResult<String> {
        match self.get(key) {
            None => Err(self.error(key, Violation::Missing)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(self.error(key, Violation::Empty)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.wrong_type(key, "string", other)),
        }
    }

    /// A required name used as a row key; surrounding whitespace is rejected
    pub fn required_name(&mut self, key: &'static str) -> StructuralResult<String> {
        let name = self.required_string(key)?;
        if name.trim() != name {
            return Err(self.error(key, Violation::SurroundingWhitespace(name)));
        }
        Ok(name)
    }

    pub fn optional_bool(&mut self, key: &'static str) -> StructuralResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(key, "boolean", other)),
        }
    }

    /// A 1-based position such as `primaryKeyPosition`
    pub fn optional_position(&mut self, key: &'static str) -> StructuralResult<Option<u32>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => match integral(n) {
                Some(i) if i >= 1 && i <= i64::from(u32::MAX) => Ok(Some(i as u32)),
                _ => Err(self.error(key, Violation::NonPositivePosition(n.to_string()))),
            },
            Some(other) => Err(self.wrong_type(key, "integer", other)),
        }
    }

    /// A non-negative integer such as `minLength`
    pub fn optional_count(&mut self, key: &'static str) -> StructuralResult<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => match integral(n) {
                Some(i) if i >= 0 => Ok(Some(i as u64)),
                _ => Err(self.error(
                    key,
                    Violation::Invalid(format!("expected a non-negative integer, found {}", n)),
                )),
            },
            Some(other) => Err(self.wrong_type(key, "integer", other)),
        }
    }

    pub fn optional_port(&mut self, key: &'static str) -> StructuralResult<Option<u16>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => match integral(n) {
                Some(i) if (1..=i64::from(u16::MAX)).contains(&i) => Ok(Some(i as u16)),
                _ => Err(self.error(
                    key,
                    Violation::Invalid(format!("port must be between 1 and 65535, found {}", n)),
                )),
            },
            Some(other) => Err(self.wrong_type(key, "integer", other)),
        }
    }

    pub fn optional_number(&mut self, key: &'static str) -> StructuralResult<Option<Number>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(normalize_number(n))),
            Some(other) => Err(self.wrong_type(key, "number", other)),
        }
    }

    /// Exactly two numbers, lower bound first
    pub fn optional_number_pair(&mut self, key: &'static str) -> StructuralResult<Option<[Number; 2]>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(self.wrong_type(key, "list of two numbers", value));
        };
        if items.len() != 2 {
            return Err(self.error(
                key,
                Violation::Invalid(format!("expected exactly two numbers, found {}", items.len())),
            ));
        }
        let mut pair = Vec::with_capacity(2);
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::Number(n) => pair.push(normalize_number(n)),
                other => {
                    return Err(StructuralValidationError::new(
                        self.field_path(key).index(i),
                        Violation::WrongType {
                            expected: "number",
                            found: value_kind(other),
                        },
                    ));
                }
            }
        }
        let (lower, upper) = (pair[0].clone(), pair[1].clone());
        if as_f64(&lower) > as_f64(&upper) {
            return Err(self.error(
                key,
                Violation::InvertedRange {
                    lower: lower.to_string(),
                    upper: upper.to_string(),
                },
            ));
        }
        Ok(Some([lower, upper]))
    }

    /// A string, number or boolean
    pub fn optional_scalar(&mut self, key: &'static str) -> StructuralResult<Option<Value>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(value @ (Value::String(_) | Value::Bool(_))) => Ok(Some(value.clone())),
            Some(Value::Number(n)) => Ok(Some(Value::Number(normalize_number(n)))),
            Some(other) => Err(self.wrong_type(key, "scalar", other)),
        }
    }

    pub fn required_scalar(&mut self, key: &'static str) -> StructuralResult<Value> {
        match self.optional_scalar(key)? {
            Some(value) => Ok(value),
            None => Err(self.error(key, Violation::Missing)),
        }
    }

    /// Any JSON value, numbers normalized
    pub fn required_any(&mut self, key: &'static str) -> StructuralResult<Value> {
        match self.get(key) {
            None => Err(self.error(key, Violation::Missing)),
            Some(value) => Ok(normalize_value(value)),
        }
    }

    pub fn string_list(&mut self, key: &'static str) -> StructuralResult<Vec<String>> {
        self.list(key, |value, path| match value {
            Value::String(s) if s.trim().is_empty() => {
                Err(StructuralValidationError::new(path, Violation::Empty))
            }
            Value::String(s) => Ok(s.trim().to_string()),
            other => Err(StructuralValidationError::new(
                path,
                Violation::WrongType {
                    expected: "string",
                    found: value_kind(other),
                },
            )),
        })
    }

    pub fn scalar_list(&mut self, key: &'static str) -> StructuralResult<Vec<Value>> {
        self.list(key, |value, path| match value {
            Value::String(_) | Value::Bool(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::Number(normalize_number(n))),
            other => Err(StructuralValidationError::new(
                path,
                Violation::WrongType {
                    expected: "scalar",
                    found: value_kind(other),
                },
            )),
        })
    }

    /// Reads a list, constructing each element with its own indexed path
    pub fn list<T>(
        &mut self,
        key: &'static str,
        mut element: impl FnMut(&'a Value, FieldPath) -> StructuralResult<T>,
    ) -> StructuralResult<Vec<T>> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };
        let Value::Array(items) = value else {
            return Err(self.wrong_type(key, "list", value));
        };
        let base = self.field_path(key);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| element(item, base.index(i)))
            .collect()
    }

    pub fn optional_object<T>(
        &mut self,
        key: &'static str,
        build: impl FnOnce(&'a Value, FieldPath) -> StructuralResult<T>,
    ) -> StructuralResult<Option<T>> {
        let path = self.field_path(key);
        match self.get(key) {
            None => Ok(None),
            Some(value) => build(value, path).map(Some),
        }
    }

    pub fn optional_vocab<E: Vocabulary>(&mut self, key: &'static str) -> StructuralResult<Option<E>> {
        let Some(text) = self.optional_string(key)? else {
            return Ok(None);
        };
        E::parse(&text).map(Some).ok_or_else(|| {
            self.error(
                key,
                Violation::NotAllowed {
                    value: text,
                    allowed: E::allowed(),
                },
            )
        })
    }

    pub fn required_vocab<E: Vocabulary>(&mut self, key: &'static str) -> StructuralResult<E> {
        let text = self.required_string(key)?;
        E::parse(&text).ok_or_else(|| {
            self.error(
                key,
                Violation::NotAllowed {
                    value: text,
                    allowed: E::allowed(),
                },
            )
        })
    }

    pub fn optional_timestamp(
        &mut self,
        key: &'static str,
    ) -> StructuralResult<Option<DateTime<FixedOffset>>> {
        let Some(text) = self.optional_string(key)? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(text.trim()).map(Some).map_err(|e| {
            self.error(
                key,
                Violation::Invalid(format!("'{}' is not an RFC 3339 timestamp: {}", text, e)),
            )
        })
    }

    /// Rejects any key that was not read
    pub fn finish(self) -> StructuralResult<()> {
        match self
            .map
            .keys()
            .find(|key| !self.consumed.contains(&key.as_str()))
        {
            Some(unknown) => Err(StructuralValidationError::new(
                self.path.key(unknown.as_str()),
                Violation::UnknownField,
            )),
            None => Ok(()),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str, found: &Value) -> StructuralValidationError {
        self.error(
            key,
            Violation::WrongType {
                expected,
                found: value_kind(found),
            },
        )
    }
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Integer value of a number, accepting integral floats
pub fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER)
        .map(|f| f as i64)
}

/// Folds integral floats into integers so `100` and `100.0` compare equal.
pub fn normalize_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(i) = integral(n) {
            return Number::from(i);
        }
    }
    n.clone()
}

pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(normalize_number(n)),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_absent() {
        let doc = json!({"name": null});
        let mut reader = ObjectReader::new(&doc, FieldPath::root()).unwrap();
        assert_eq!(reader.optional_string("name").unwrap(), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_unknown_field_is_reported_with_path() {
        let doc = json!({"name": "orders", "colour": "blue"});
        let mut reader = ObjectReader::new(&doc, FieldPath::from("schema").index(0)).unwrap();
        reader.required_string("name").unwrap();
        let err = reader.finish().unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].colour");
        assert_eq!(err.violation, Violation::UnknownField);
    }

    #[test]
    fn test_blank_optional_string_is_absent() {
        let doc = json!({"description": "   "});
        let mut reader = ObjectReader::new(&doc, FieldPath::root()).unwrap();
        assert_eq!(reader.optional_string("description").unwrap(), None);
    }

    #[test]
    fn test_names_reject_surrounding_whitespace() {
        let doc = json!({"name": "orders "});
        let mut reader = ObjectReader::new(&doc, FieldPath::from("schema").index(0)).unwrap();
        let err = reader.required_name("name").unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].name");
        assert_eq!(err.violation, Violation::SurroundingWhitespace("orders ".to_string()));
    }

    #[test]
    fn test_string_list_items_are_trimmed() {
        let doc = json!({"tags": [" core ", "pii"]});
        let mut reader = ObjectReader::new(&doc, FieldPath::root()).unwrap();
        assert_eq!(reader.string_list("tags").unwrap(), vec!["core", "pii"]);
    }

    #[test]
    fn test_position_must_be_positive() {
        let doc = json!({"primaryKeyPosition": 0});
        let mut reader = ObjectReader::new(&doc, FieldPath::root()).unwrap();
        let err = reader.optional_position("primaryKeyPosition").unwrap_err();
        assert!(matches!(err.violation, Violation::NonPositivePosition(_)));
    }

    #[test]
    fn test_integral_float_normalizes() {
        let n = Number::from_f64(100.0).unwrap();
        assert_eq!(normalize_number(&n), Number::from(100));
        let half = Number::from_f64(99.5).unwrap();
        assert_eq!(normalize_number(&half), half);
    }

    #[test]
    fn test_number_pair_rejects_inverted_range() {
        let doc = json!({"mustBeBetween": [10, 1]});
        let mut reader = ObjectReader::new(&doc, FieldPath::root()).unwrap();
        let err = reader.optional_number_pair("mustBeBetween").unwrap_err();
        assert!(matches!(err.violation, Violation::InvertedRange { .. }));
    }

    #[test]
    fn test_wrong_container_type() {
        let doc = json!(["not", "a", "mapping"]);
        let err = ObjectReader::new(&doc, FieldPath::root()).err().unwrap();
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "mapping",
                found: "list"
            }
        );
    }
}
