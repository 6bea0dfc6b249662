//! SchemaObject type: one table/view/topic of a contract

use super::enums::LogicalType;
use super::property::{SchemaProperty, check_siblings};
use super::quality::DataQualityRule;
use super::supporting::{AuthoritativeDefinition, CustomProperty, read_references};
use crate::validation::{
    FieldPath, ObjectReader, StructuralResult, StructuralValidationError, Violation,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// SchemaObject - one table/view/topic in a contract
///
/// # Example
///
/// ```rust
/// use odcs_sheets::models::{LogicalType, SchemaObject, SchemaProperty};
///
/// let orders = SchemaObject::new("orders")
///     .with_physical_name("tbl_orders")
///     .with_property(SchemaProperty::new("id", LogicalType::Integer).with_primary_key(1))
///     .with_property(SchemaProperty::new("total", LogicalType::Number));
///
/// assert_eq!(orders.primary_key_properties().len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    /// Object name, unique within the contract
    pub name: String,
    /// Always `object` when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<LogicalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_name: Option<String>,
    /// Physical type ("table", "view", "topic", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    /// e.g. "One row per order line"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_granularity_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SchemaProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_properties: Vec<CustomProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<DataQualityRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authoritative_definitions: Vec<AuthoritativeDefinition>,
}

impl SchemaObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_physical_name(mut self, physical_name: impl Into<String>) -> Self {
        self.physical_name = Some(physical_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_quality_rule(mut self, rule: DataQualityRule) -> Self {
        self.quality.push(rule);
        self
    }

    /// Primary key properties ordered by position
    pub fn primary_key_properties(&self) -> Vec<&SchemaProperty> {
        let mut keys: Vec<&SchemaProperty> =
            self.properties.iter().filter(|p| p.is_primary_key()).collect();
        keys.sort_by_key(|p| p.primary_key_position.unwrap_or(u32::MAX));
        keys
    }

    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;

        let name = r.required_name("name")?;
        let logical_type: Option<LogicalType> = r.optional_vocab("logicalType")?;
        if let Some(other) = logical_type.filter(|t| *t != LogicalType::Object) {
            return Err(r.error(
                "logicalType",
                Violation::NotAllowed {
                    value: other.to_string(),
                    allowed: "object".to_string(),
                },
            ));
        }
        let physical_name = r.optional_string("physicalName")?;
        let physical_type = r.optional_string("physicalType")?;
        let description = r.optional_string("description")?;
        let business_name = r.optional_string("businessName")?;
        let data_granularity_description = r.optional_string("dataGranularityDescription")?;
        let tags = r.string_list("tags")?;

        let properties = r.list("properties", SchemaProperty::from_value)?;
        check_siblings(&properties, &r.field_path("properties"))?;
        let quality = r.list("quality", DataQualityRule::from_value)?;
        let (authoritative_definitions, custom_properties) = read_references(&mut r)?;
        r.finish()?;

        Ok(Self {
            name,
            logical_type,
            physical_name,
            physical_type,
            description,
            business_name,
            data_granularity_description,
            properties,
            tags,
            custom_properties,
            quality,
            authoritative_definitions,
        })
    }
}

/// Synthetic object name under which the element type of an array property
/// is laid out in a workbook
pub fn items_owner_name(object: &str, property: &str, suffix: &str) -> String {
    format!("{}.{}{}", object, property, suffix)
}

/// Every array property must own a synthetic name that no object and no other
/// array property uses.
pub(crate) fn check_items_owners(schema: &[SchemaObject], suffix: &str) -> StructuralResult<()> {
    let objects: HashSet<&str> = schema.iter().map(|o| o.name.as_str()).collect();
    let mut owners = HashSet::new();
    for (i, object) in schema.iter().enumerate() {
        for (j, property) in object.properties.iter().enumerate() {
            if property.items.is_none() {
                continue;
            }
            let owner = items_owner_name(&object.name, &property.name, suffix);
            if objects.contains(owner.as_str()) || !owners.insert(owner.clone()) {
                return Err(StructuralValidationError::new(
                    FieldPath::from("schema").index(i).key("properties").index(j).key("name"),
                    Violation::ItemsOwnerConflict(owner),
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

    #[test]
    fn test_duplicate_property_names() {
        let err = SchemaObject::from_value(
            &json!({"name": "orders", "properties": [{"name": "id"}, {"name": "total"}, {"name": "id"}]}),
            FieldPath::from("schema").index(2),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[2].properties[2].name");
        assert_eq!(err.violation, Violation::DuplicateName("id".to_string()));
    }

    #[test]
    fn test_object_logical_type_must_be_object() {
        let err = SchemaObject::from_value(
            &json!({"name": "orders", "logicalType": "string"}),
            FieldPath::from("schema").index(0),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].logicalType");
    }

    #[test]
    fn test_child_error_carries_full_path() {
        let err = SchemaObject::from_value(
            &json!({"name": "orders", "properties": [
                {"name": "id"},
                {"name": "code", "logicalType": "string", "primaryKey": true}
            ]}),
            FieldPath::from("schema").index(1),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[1].properties[1].primaryKeyPosition");
    }

    #[test]
    fn test_primary_key_ordering() {
        let object = SchemaObject::new("lines")
            .with_property(SchemaProperty::new("line", LogicalType::Integer).with_primary_key(2))
            .with_property(SchemaProperty::new("order", LogicalType::Integer).with_primary_key(1));
        let names: Vec<_> = object
            .primary_key_properties()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["order", "line"]);
    }
}
