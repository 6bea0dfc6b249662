//! Logical type options: constraints that depend on a property's logical type

use super::enums::LogicalType;
use crate::validation::reader::as_f64;
use crate::validation::{FieldPath, ObjectReader, StructuralResult, StructuralValidationError, Violation};
use serde::Serialize;
use serde_json::{Number, Value};

/// Option keys of each constraint group, in document order.
const STRING_OPTIONS: &[&str] = &["format", "minLength", "maxLength", "pattern"];
const NUMERIC_OPTIONS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];
const DATE_OPTIONS: &[&str] = &[
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
];
const ARRAY_OPTIONS: &[&str] = &["minItems", "maxItems", "uniqueItems"];
const OBJECT_OPTIONS: &[&str] = &["minProperties", "maxProperties", "required"];

/// Constraints for `string` properties
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StringOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Constraints for `integer` and `number` properties
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NumericOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
}

/// Constraints for `date` properties. Bounds are date strings.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
}

/// Constraints for `array` properties
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

/// Constraints for `object` properties
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// The constraint group matching the owning property's logical type.
///
/// Only one group can exist for a property, so fields of other groups are
/// unrepresentable once constructed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum LogicalTypeOptions {
    String(StringOptions),
    Numeric(NumericOptions),
    Date(DateOptions),
    Array(ArrayOptions),
    Object(ObjectOptions),
}

impl LogicalTypeOptions {
    /// Option keys valid for a logical type
    pub fn keys_for(logical_type: LogicalType) -> &'static [&'static str] {
        match logical_type {
            LogicalType::String => STRING_OPTIONS,
            LogicalType::Integer | LogicalType::Number => NUMERIC_OPTIONS,
            LogicalType::Date => DATE_OPTIONS,
            LogicalType::Array => ARRAY_OPTIONS,
            LogicalType::Object => OBJECT_OPTIONS,
            LogicalType::Boolean => &[],
        }
    }

    fn is_known_key(key: &str) -> bool {
        [STRING_OPTIONS, NUMERIC_OPTIONS, ARRAY_OPTIONS, OBJECT_OPTIONS]
            .iter()
            .any(|group| group.contains(&key))
    }

    /// Build the options of a property with the given logical type.
    ///
    /// Returns `None` for an empty options mapping.
    pub fn from_value(
        value: &Value,
        logical_type: LogicalType,
        path: FieldPath,
    ) -> StructuralResult<Option<Self>> {
        let allowed = Self::keys_for(logical_type);
        if let Value::Object(map) = value {
            for (key, option) in map {
                if option.is_null() || allowed.contains(&key.as_str()) {
                    continue;
                }
                let violation = if Self::is_known_key(key) {
                    Violation::OptionNotApplicable {
                        option: key.clone(),
                        logical_type: logical_type.to_string(),
                    }
                } else {
                    Violation::UnknownField
                };
                return Err(StructuralValidationError::new(path.key(key.as_str()), violation));
            }
        }

        let mut r = ObjectReader::new(value, path)?;
        let options = match logical_type {
            LogicalType::String => {
                let options = StringOptions {
                    format: r.optional_string("format")?,
                    min_length: r.optional_count("minLength")?,
                    max_length: r.optional_count("maxLength")?,
                    pattern: r.optional_string("pattern")?,
                };
                check_bounds(&r, "minLength", options.min_length, options.max_length)?;
                (options != StringOptions::default()).then_some(Self::String(options))
            }
            LogicalType::Integer | LogicalType::Number => {
                let options = NumericOptions {
                    minimum: r.optional_number("minimum")?,
                    maximum: r.optional_number("maximum")?,
                    exclusive_minimum: r.optional_bool("exclusiveMinimum")?,
                    exclusive_maximum: r.optional_bool("exclusiveMaximum")?,
                    multiple_of: r.optional_number("multipleOf")?,
                };
                if let (Some(min), Some(max)) = (&options.minimum, &options.maximum) {
                    if as_f64(min) > as_f64(max) {
                        return Err(r.error(
                            "minimum",
                            Violation::InvertedRange {
                                lower: min.to_string(),
                                upper: max.to_string(),
                            },
                        ));
                    }
                }
                if let Some(step) = &options.multiple_of {
                    if as_f64(step) <= 0.0 {
                        return Err(r.error(
                            "multipleOf",
                            Violation::Invalid(format!("multipleOf must be positive, found {}", step)),
                        ));
                    }
                }
                (options != NumericOptions::default()).then_some(Self::Numeric(options))
            }
            LogicalType::Date => {
                let options = DateOptions {
                    format: r.optional_string("format")?,
                    minimum: r.optional_string("minimum")?,
                    maximum: r.optional_string("maximum")?,
                    exclusive_minimum: r.optional_bool("exclusiveMinimum")?,
                    exclusive_maximum: r.optional_bool("exclusiveMaximum")?,
                };
                (options != DateOptions::default()).then_some(Self::Date(options))
            }
            LogicalType::Array => {
                let options = ArrayOptions {
                    min_items: r.optional_count("minItems")?,
                    max_items: r.optional_count("maxItems")?,
                    unique_items: r.optional_bool("uniqueItems")?,
                };
                check_bounds(&r, "minItems", options.min_items, options.max_items)?;
                (options != ArrayOptions::default()).then_some(Self::Array(options))
            }
            LogicalType::Object => {
                let options = ObjectOptions {
                    min_properties: r.optional_count("minProperties")?,
                    max_properties: r.optional_count("maxProperties")?,
                    required: r.string_list("required")?,
                };
                check_bounds(
                    &r,
                    "minProperties",
                    options.min_properties,
                    options.max_properties,
                )?;
                (options != ObjectOptions::default()).then_some(Self::Object(options))
            }
            LogicalType::Boolean => None,
        };
        r.finish()?;
        Ok(options)
    }
}

fn check_bounds(
    r: &ObjectReader<'_>,
    key: &str,
    min: Option<u64>,
    max: Option<u64>,
) -> StructuralResult<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(r.error(
            key,
            Violation::InvertedRange {
                lower: min.to_string(),
                upper: max.to_string(),
            },
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value, logical_type: LogicalType) -> StructuralResult<Option<LogicalTypeOptions>> {
        LogicalTypeOptions::from_value(&value, logical_type, FieldPath::from("logicalTypeOptions"))
    }

    #[test]
    fn test_string_options() {
        let options = build(json!({"maxLength": 50, "pattern": "^[a-z]+$"}), LogicalType::String)
            .unwrap()
            .unwrap();
        assert_eq!(
            options,
            LogicalTypeOptions::String(StringOptions {
                max_length: Some(50),
                pattern: Some("^[a-z]+$".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"maxLength": 50, "pattern": "^[a-z]+$"})
        );
    }

    #[test]
    fn test_foreign_group_option_is_named() {
        let err = build(json!({"minItems": 1}), LogicalType::String).unwrap_err();
        assert_eq!(err.path.to_string(), "logicalTypeOptions.minItems");
        assert_eq!(
            err.violation,
            Violation::OptionNotApplicable {
                option: "minItems".to_string(),
                logical_type: "string".to_string()
            }
        );
    }

    #[test]
    fn test_boolean_takes_no_options() {
        assert!(build(json!({"format": "x"}), LogicalType::Boolean).is_err());
        assert_eq!(build(json!({}), LogicalType::Boolean).unwrap(), None);
    }

    #[test]
    fn test_date_bounds_are_strings() {
        let options = build(json!({"minimum": "2020-01-01"}), LogicalType::Date).unwrap();
        assert!(matches!(options, Some(LogicalTypeOptions::Date(_))));
        assert!(build(json!({"minimum": 5}), LogicalType::Date).is_err());
    }

    #[test]
    fn test_inverted_length_bounds() {
        let err = build(json!({"minLength": 10, "maxLength": 2}), LogicalType::String).unwrap_err();
        assert!(matches!(err.violation, Violation::InvertedRange { .. }));
    }
}
