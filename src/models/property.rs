//! SchemaProperty: one column/field of a schema object

use super::enums::LogicalType;
use super::options::LogicalTypeOptions;
use super::quality::DataQualityRule;
use super::supporting::{AuthoritativeDefinition, CustomProperty, check_unique_names, read_references};
use crate::validation::{FieldPath, ObjectReader, StructuralResult, StructuralValidationError, Violation};
use serde::Serialize;
use serde_json::Value;

/// SchemaProperty - one column in a schema object
///
/// An `array` property describes its element type through `items`, which is
/// itself a property. Element types are limited to one nesting level, so the
/// `items` of an `items` property never exist.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    // === Core Identity Fields ===
    /// Property name, unique among its siblings
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<LogicalType>,
    /// Physical data type in the source system (e.g. "VARCHAR(100)")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    // === Constraints ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    /// 1-based position within a composite primary key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key_position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitioned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_position: Option<u32>,

    // === Security & Governance ===
    /// Data classification, e.g. "confidential"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_data_element: Option<bool>,

    // === Transformation Metadata ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform_source_objects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_description: Option<String>,

    // === Examples, Tags & Extensions ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_properties: Vec<CustomProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<DataQualityRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authoritative_definitions: Vec<AuthoritativeDefinition>,

    // === Type-dependent structure ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type_options: Option<LogicalTypeOptions>,
    /// Element type of an array property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a new property with the given name and logical type
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type: Some(logical_type),
            ..Default::default()
        }
    }

    /// Mark as primary key at the given position
    pub fn with_primary_key(mut self, position: u32) -> Self {
        self.primary_key = Some(true);
        self.primary_key_position = Some(position);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_items(mut self, items: SchemaProperty) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key == Some(true)
    }

    pub fn is_array(&self) -> bool {
        self.logical_type == Some(LogicalType::Array)
    }

    /// Build and validate a property from its document mapping
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        Self::read(value, path, false)
    }

    fn read(value: &Value, path: FieldPath, is_items: bool) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;

        let name = r.required_name("name")?;
        let logical_type: Option<LogicalType> = r.optional_vocab("logicalType")?;
        let physical_type = r.optional_string("physicalType")?;
        let physical_name = r.optional_string("physicalName")?;
        let description = r.optional_string("description")?;
        let business_name = r.optional_string("businessName")?;
        let required = r.optional_bool("required")?;
        let unique = r.optional_bool("unique")?;
        let primary_key = r.optional_bool("primaryKey")?;
        let primary_key_position = r.optional_position("primaryKeyPosition")?;
        let partitioned = r.optional_bool("partitioned")?;
        let partition_key_position = r.optional_position("partitionKeyPosition")?;
        let classification = r.optional_string("classification")?;
        let encrypted_name = r.optional_string("encryptedName")?;
        let critical_data_element = r.optional_bool("criticalDataElement")?;
        let transform_source_objects = r.string_list("transformSourceObjects")?;
        let transform_logic = r.optional_string("transformLogic")?;
        let transform_description = r.optional_string("transformDescription")?;
        let examples = r.scalar_list("examples")?;
        let tags = r.string_list("tags")?;

        // Cross-field checks on the scalars come before any child is read.
        if primary_key == Some(true) && primary_key_position.is_none() {
            return Err(r.error("primaryKeyPosition", Violation::MissingPrimaryKeyPosition));
        }
        let options_value = r.get("logicalTypeOptions");
        let logical_type_options = match (options_value, logical_type) {
            (None, _) => None,
            (Some(_), None) => {
                return Err(r.error("logicalTypeOptions", Violation::OptionsWithoutLogicalType));
            }
            (Some(options), Some(logical_type)) => LogicalTypeOptions::from_value(
                options,
                logical_type,
                r.field_path("logicalTypeOptions"),
            )?,
        };

        let items_path = r.field_path("items");
        let items = match (r.get("items"), logical_type) {
            (_, Some(LogicalType::Array)) if is_items => {
                return Err(r.error("items", Violation::NestedArrayItems));
            }
            (None, Some(LogicalType::Array)) => {
                return Err(r.error("items", Violation::MissingItems));
            }
            (None, _) => None,
            (Some(items), Some(LogicalType::Array)) => {
                Some(Box::new(Self::read(items, items_path, true)?))
            }
            (Some(_), _) => return Err(r.error("items", Violation::ItemsNotAllowed)),
        };

        let quality = r.list("quality", DataQualityRule::from_value)?;
        let (authoritative_definitions, custom_properties) = read_references(&mut r)?;
        r.finish()?;

        Ok(Self {
            name,
            logical_type,
            physical_type,
            physical_name,
            description,
            business_name,
            required,
            unique,
            primary_key,
            primary_key_position,
            partitioned,
            partition_key_position,
            classification,
            encrypted_name,
            critical_data_element,
            transform_source_objects,
            transform_logic,
            transform_description,
            examples,
            tags,
            custom_properties,
            quality,
            authoritative_definitions,
            logical_type_options,
            items,
        })
    }
}

/// Sibling invariants of the properties of one schema object
pub(crate) fn check_siblings(properties: &[SchemaProperty], path: &FieldPath) -> StructuralResult<()> {
    check_unique_names(
        properties.iter().map(|p| p.name.as_str()).enumerate(),
        |i| path.index(i).key("name"),
    )?;

    let mut positions = std::collections::HashSet::new();
    for (i, property) in properties.iter().enumerate() {
        if !property.is_primary_key() {
            continue;
        }
        if let Some(position) = property.primary_key_position {
            if !positions.insert(position) {
                return Err(StructuralValidationError::new(
                    path.index(i).key("primaryKeyPosition"),
                    Violation::DuplicatePrimaryKeyPosition(u64::from(position)),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value) -> StructuralResult<SchemaProperty> {
        SchemaProperty::from_value(&value, FieldPath::from("schema").index(0).key("properties").index(3))
    }

    #[test]
    fn test_primary_key_requires_position() {
        let err = build(json!({"name": "id", "logicalType": "integer", "primaryKey": true})).unwrap_err();
        assert_eq!(
            err.path.to_string(),
            "schema[0].properties[3].primaryKeyPosition"
        );
        assert_eq!(err.violation, Violation::MissingPrimaryKeyPosition);
    }

    #[test]
    fn test_array_requires_items() {
        let err = build(json!({"name": "tags", "logicalType": "array"})).unwrap_err();
        assert_eq!(err.violation, Violation::MissingItems);
    }

    #[test]
    fn test_array_items_round_out() {
        let property = build(json!({
            "name": "tags",
            "logicalType": "array",
            "items": {"name": "tag", "logicalType": "string", "logicalTypeOptions": {"maxLength": 50}}
        }))
        .unwrap();
        let items = property.items.as_deref().unwrap();
        assert_eq!(items.name, "tag");
        assert!(matches!(
            items.logical_type_options,
            Some(LogicalTypeOptions::String(_))
        ));
    }

    #[test]
    fn test_items_path_and_nesting_limit() {
        let err = build(json!({
            "name": "matrix",
            "logicalType": "array",
            "items": {"name": "row", "logicalType": "array", "items": {"name": "cell"}}
        }))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].properties[3].items.items");
        assert_eq!(err.violation, Violation::NestedArrayItems);
    }

    #[test]
    fn test_items_only_on_arrays() {
        let err = build(json!({"name": "id", "logicalType": "string", "items": {"name": "x"}})).unwrap_err();
        assert_eq!(err.violation, Violation::ItemsNotAllowed);
    }

    #[test]
    fn test_options_without_logical_type() {
        let err = build(json!({"name": "code", "logicalTypeOptions": {"maxLength": 3}})).unwrap_err();
        assert_eq!(err.violation, Violation::OptionsWithoutLogicalType);
    }

    #[test]
    fn test_duplicate_primary_key_positions() {
        let properties = vec![
            SchemaProperty::new("a", LogicalType::Integer).with_primary_key(1),
            SchemaProperty::new("b", LogicalType::Integer).with_primary_key(1),
        ];
        let err = check_siblings(&properties, &FieldPath::from("schema").index(0).key("properties"))
            .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].properties[1].primaryKeyPosition");
    }

    #[test]
    fn test_serialization_omits_absent_flags() {
        let property = SchemaProperty::new("email", LogicalType::String).with_required(false);
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({"name": "email", "logicalType": "string", "required": false})
        );
    }
}
