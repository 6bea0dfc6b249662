//! Contract → workbook
//!
//! The serializer turns the contract into its document mapping and walks it
//! once per catalog sheet, emitting one row per entity carried by that sheet.
//! It does not validate: a [`Contract`] is valid by construction, so every
//! failure here is a catalog that does not cover the model, or an items suffix
//! under which two element types would share an owner name.

use super::coerce::encode;
use super::error::{SerializeError, SerializeResult};
use crate::catalog::{ColumnRole, ColumnSpec, Derivation, EntityKind, FieldCatalog, LinkColumn, SheetLayout, SheetSpec};
use crate::config::{ConfigError, ConversionConfig};
use crate::models::Contract;
use crate::models::schema::{check_items_owners, items_owner_name};
use crate::tabular::{Cell, Sheet, Workbook};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info};

const ENTITY_KINDS: [EntityKind; 15] = [
    EntityKind::Contract,
    EntityKind::ContractTag,
    EntityKind::Description,
    EntityKind::Server,
    EntityKind::SchemaObject,
    EntityKind::SchemaProperty,
    EntityKind::LogicalTypeOptions,
    EntityKind::QualityRule,
    EntityKind::SupportChannel,
    EntityKind::Pricing,
    EntityKind::TeamMember,
    EntityKind::Role,
    EntityKind::SlaProperty,
    EntityKind::AuthoritativeDefinition,
    EntityKind::CustomProperty,
];

/// One entity to be written as a row, with its position in the tree
#[derive(Debug, Clone, Default)]
struct Record {
    object: Option<String>,
    property: Option<String>,
    owner_logical_type: Option<String>,
    fields: Map<String, Value>,
}

impl Record {
    fn root(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    fn key(&self) -> String {
        [self.object.as_deref(), self.property.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("/")
    }

    fn count(&self, key: &str) -> i64 {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map_or(0, |items| items.len() as i64)
    }
}

/// A property and the object name it is listed under.
///
/// Array element types are listed under `<object>.<property><items suffix>`.
struct PropertySite<'d> {
    owner: String,
    property: &'d Map<String, Value>,
}

/// Writes contracts as workbooks laid out by a [`FieldCatalog`]
#[derive(Debug, Clone)]
pub struct Serializer<'c> {
    catalog: &'c FieldCatalog,
    config: ConversionConfig,
}

impl Default for Serializer<'static> {
    fn default() -> Self {
        Serializer::new(FieldCatalog::odcs())
    }
}

impl<'c> Serializer<'c> {
    pub fn new(catalog: &'c FieldCatalog) -> Self {
        Self {
            catalog,
            config: ConversionConfig::default(),
        }
    }

    /// Use non-default cell settings; the config is validated here
    pub fn with_config(mut self, config: ConversionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Produce one sheet per catalog entry, headers included even when a
    /// sheet has no rows.
    pub fn serialize(&self, contract: &Contract) -> SerializeResult<Workbook> {
        check_items_owners(&contract.schema, &self.config.items_suffix)
            .map_err(SerializeError::ItemsOwner)?;
        let document = contract.to_value()?;
        let empty = Map::new();
        let root = document.as_object().unwrap_or(&empty);

        let mut records = HashMap::new();
        for entity in ENTITY_KINDS {
            let entity_records = collect_records(entity, root, &self.config);
            if !entity_records.is_empty() {
                self.check_coverage(entity, &entity_records)?;
            }
            records.insert(entity, entity_records);
        }

        let mut workbook = Workbook::new();
        for spec in self.catalog.sheets() {
            let sheet_records = records.remove(&spec.entity).unwrap_or_default();
            let sheet = self.write_sheet(spec, &sheet_records)?;
            debug!(sheet = %spec.name, rows = sheet.len(), "Serialized sheet");
            workbook.insert(sheet);
        }

        info!(
            id = %contract.id,
            objects = contract.schema.len(),
            sheets = workbook.len(),
            "Serialized contract to workbook"
        );
        Ok(workbook)
    }

    /// Every field of every record must land in a column or a child sheet
    fn check_coverage(&self, entity: EntityKind, records: &[Record]) -> SerializeResult<()> {
        let spec = self
            .catalog
            .sheet_for(entity)
            .ok_or(SerializeError::MissingSheet(entity))?;
        let children = entity.child_entities();
        for record in records {
            for key in record.fields.keys() {
                if spec.field_column(key).is_some() {
                    continue;
                }
                match children.iter().find(|(child_key, _)| child_key == key) {
                    Some((_, child)) if self.catalog.sheet_for(*child).is_some() => {}
                    Some((_, child)) => return Err(SerializeError::MissingSheet(*child)),
                    None => {
                        return Err(SerializeError::UncoveredField {
                            entity,
                            field: key.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn write_sheet(&self, spec: &SheetSpec, records: &[Record]) -> SerializeResult<Sheet> {
        let mut sheet = Sheet::new(spec.name.clone(), spec.headers());
        match spec.layout {
            SheetLayout::Records => {
                for record in records {
                    let row = spec
                        .columns
                        .iter()
                        .map(|column| self.cell(spec, column, record))
                        .collect::<SerializeResult<Vec<_>>>()?;
                    sheet.push_row(row);
                }
            }
            SheetLayout::KeyValue => {
                let empty = Record::default();
                let record = records.first().unwrap_or(&empty);
                for column in &spec.columns {
                    let value = self.cell(spec, column, record)?;
                    sheet.push_row(vec![
                        Cell::from(column.header.as_str()),
                        value,
                        Cell::from(column.description.clone()),
                    ]);
                }
            }
        }
        Ok(sheet)
    }

    fn cell(&self, spec: &SheetSpec, column: &ColumnSpec, record: &Record) -> SerializeResult<Cell> {
        let cell = match &column.role {
            ColumnRole::Field(key) => encode(record.fields.get(key), column.kind, &self.config).map_err(
                |expected| SerializeError::UnencodableValue {
                    sheet: spec.name.clone(),
                    field: key.clone(),
                    expected,
                },
            )?,
            ColumnRole::Link(LinkColumn::ObjectName) => Cell::from(record.object.clone()),
            ColumnRole::Link(LinkColumn::PropertyName) => Cell::from(record.property.clone()),
            ColumnRole::Derived(derivation) => derived_cell(*derivation, record),
        };
        if column.required && cell.is_empty() {
            return Err(SerializeError::MissingRequired {
                sheet: spec.name.clone(),
                column: column.header.clone(),
                key: record.key(),
            });
        }
        Ok(cell)
    }
}

fn derived_cell(derivation: Derivation, record: &Record) -> Cell {
    match derivation {
        Derivation::QualityRuleCount => Cell::Int(record.count("quality")),
        Derivation::PropertyCount => Cell::Int(record.count("properties")),
        Derivation::AuthoritativeDefinitionCount => Cell::Int(record.count("authoritativeDefinitions")),
        Derivation::OwnerLogicalType => Cell::from(record.owner_logical_type.clone()),
        Derivation::RuleLevel => match record.property {
            Some(_) => Cell::from("property"),
            None => Cell::from("object"),
        },
    }
}

fn maps<'d>(parent: &'d Map<String, Value>, key: &str) -> impl Iterator<Item = &'d Map<String, Value>> {
    parent
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn name_of(map: &Map<String, Value>) -> String {
    map.get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn property_sites<'d>(root: &'d Map<String, Value>, config: &ConversionConfig) -> Vec<PropertySite<'d>> {
    let mut sites = Vec::new();
    for object in maps(root, "schema") {
        let object_name = name_of(object);
        for property in maps(object, "properties") {
            sites.push(PropertySite {
                owner: object_name.clone(),
                property,
            });
            if let Some(items) = property.get("items").and_then(Value::as_object) {
                sites.push(PropertySite {
                    owner: items_owner_name(&object_name, &name_of(property), &config.items_suffix),
                    property: items,
                });
            }
        }
    }
    sites
}

/// Records of one entity kind, in document order
fn collect_records(entity: EntityKind, root: &Map<String, Value>, config: &ConversionConfig) -> Vec<Record> {
    let listed = |key: &str| -> Vec<Record> { maps(root, key).map(|m| Record::root(m.clone())).collect() };
    let single = |key: &str| -> Vec<Record> {
        root.get(key)
            .and_then(Value::as_object)
            .map(|m| vec![Record::root(m.clone())])
            .unwrap_or_default()
    };

    match entity {
        EntityKind::Contract => vec![Record::root(root.clone())],
        EntityKind::ContractTag => root
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|tag| {
                let mut fields = Map::new();
                fields.insert("tag".to_string(), tag.clone());
                Record::root(fields)
            })
            .collect(),
        EntityKind::Description => single("description"),
        EntityKind::Pricing => single("price"),
        EntityKind::Server => listed("servers"),
        EntityKind::SupportChannel => listed("support"),
        EntityKind::TeamMember => listed("team"),
        EntityKind::Role => listed("roles"),
        EntityKind::SlaProperty => listed("slaProperties"),
        EntityKind::SchemaObject => maps(root, "schema")
            .map(|object| Record {
                object: Some(name_of(object)),
                fields: object.clone(),
                ..Default::default()
            })
            .collect(),
        EntityKind::SchemaProperty => property_sites(root, config)
            .into_iter()
            .map(|site| Record {
                object: Some(site.owner),
                property: Some(name_of(site.property)),
                fields: site.property.clone(),
                ..Default::default()
            })
            .collect(),
        EntityKind::LogicalTypeOptions => property_sites(root, config)
            .into_iter()
            .filter_map(|site| {
                let options = site.property.get("logicalTypeOptions")?.as_object()?;
                Some(Record {
                    object: Some(site.owner),
                    property: Some(name_of(site.property)),
                    owner_logical_type: site
                        .property
                        .get("logicalType")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    fields: options.clone(),
                })
            })
            .collect(),
        EntityKind::QualityRule => owned_records(root, config, "quality", false),
        EntityKind::AuthoritativeDefinition => owned_records(root, config, "authoritativeDefinitions", true),
        EntityKind::CustomProperty => owned_records(root, config, "customProperties", true),
    }
}

/// Records of a list that objects and properties (and optionally the
/// contract itself) carry under the same key
fn owned_records(
    root: &Map<String, Value>,
    config: &ConversionConfig,
    key: &str,
    contract_level: bool,
) -> Vec<Record> {
    let mut records = Vec::new();
    if contract_level {
        records.extend(maps(root, key).map(|m| Record::root(m.clone())));
    }
    for object in maps(root, "schema") {
        let object_name = name_of(object);
        records.extend(maps(object, key).map(|m| Record {
            object: Some(object_name.clone()),
            fields: m.clone(),
            ..Default::default()
        }));
    }
    for site in property_sites(root, config) {
        let property_name = name_of(site.property);
        records.extend(maps(site.property, key).map(|m| Record {
            object: Some(site.owner.clone()),
            property: Some(property_name.clone()),
            fields: m.clone(),
            ..Default::default()
        }));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::odcs;
    use serde_json::json;

    fn contract(extra: Value) -> Contract {
        let mut doc = json!({
            "apiVersion": "v3.0.2",
            "kind": "DataContract",
            "id": "orders-contract",
            "version": "1.0.0",
            "status": "active"
        });
        if let (Some(base), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        Contract::from_value(&doc).unwrap()
    }

    #[test]
    fn test_empty_contract_has_all_sheets_with_headers() {
        let workbook = Serializer::default().serialize(&contract(json!({}))).unwrap();
        assert_eq!(workbook.len(), FieldCatalog::odcs().sheets().len());
        let schema = workbook.sheet(odcs::SCHEMA).unwrap();
        assert!(schema.is_empty());
        assert_eq!(schema.headers[0], "Object Name");
        // key/value sheets always list their fields
        assert_eq!(workbook.sheet(odcs::PRICING).unwrap().len(), 3);
    }

    #[test]
    fn test_absent_fields_are_empty_cells() {
        let workbook = Serializer::default()
            .serialize(&contract(json!({"schema": [{"name": "orders", "properties": [{"name": "id"}]}]})))
            .unwrap();
        let sheet = workbook.sheet(odcs::SCHEMA_PROPERTIES).unwrap();
        assert_eq!(sheet.cell(0, "Object Name"), Some(&Cell::from("orders")));
        assert_eq!(sheet.cell(0, "Required"), Some(&Cell::Empty));
        assert_eq!(sheet.cell(0, "Quality Rules Count"), Some(&Cell::Int(0)));
        assert!(sheet.rows[0].iter().all(|c| c.to_string() != "null" && c.to_string() != "None"));
    }

    #[test]
    fn test_items_written_under_synthetic_owner() {
        let workbook = Serializer::default()
            .serialize(&contract(json!({"schema": [{"name": "orders", "properties": [{
                "name": "tags",
                "logicalType": "array",
                "items": {"name": "tag", "logicalType": "string", "logicalTypeOptions": {"maxLength": 50}}
            }]}]})))
            .unwrap();
        let properties = workbook.sheet(odcs::SCHEMA_PROPERTIES).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties.cell(1, "Object Name"), Some(&Cell::from("orders.tags.items")));
        assert_eq!(properties.cell(1, "Property Name"), Some(&Cell::from("tag")));

        let options = workbook.sheet(odcs::LOGICAL_TYPE_OPTIONS).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options.cell(0, "Object Name"), Some(&Cell::from("orders.tags.items")));
        assert_eq!(options.cell(0, "Logical Type"), Some(&Cell::from("string")));
        assert_eq!(options.cell(0, "Max Length"), Some(&Cell::Int(50)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ConversionConfig::new().with_list_delimiter("");
        assert!(Serializer::default().with_config(config).is_err());
    }

    #[test]
    fn test_items_suffix_must_not_collide_with_objects() {
        let c = contract(json!({"schema": [
            {"name": "orders", "properties": [{
                "name": "tags",
                "logicalType": "array",
                "items": {"name": "tag", "logicalType": "string"}
            }]},
            {"name": "orders.tags.element"}
        ]}));
        let serializer = Serializer::default()
            .with_config(ConversionConfig::new().with_items_suffix(".element"))
            .unwrap();
        let err = serializer.serialize(&c).unwrap_err();
        assert!(matches!(
            err,
            SerializeError::ItemsOwner(ref e) if e.path.to_string() == "schema[0].properties[0].name"
        ));
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let c = contract(json!({"tags": ["finance", "orders"], "schema": [{"name": "orders"}]}));
        let serializer = Serializer::default();
        assert_eq!(serializer.serialize(&c).unwrap(), serializer.serialize(&c).unwrap());
    }

    #[test]
    fn test_missing_sheet_fails_loudly() {
        let catalog = FieldCatalog::odcs().without_sheet(odcs::QUALITY_RULES);
        let c = contract(json!({"schema": [{"name": "orders", "quality": [{"type": "text", "description": "fresh"}]}]}));
        let err = Serializer::new(&catalog).serialize(&c).unwrap_err();
        assert!(matches!(err, SerializeError::MissingSheet(EntityKind::QualityRule)));
    }

    #[test]
    fn test_uncovered_column_fails_loudly() {
        let mut sheets = FieldCatalog::odcs().sheets().to_vec();
        let servers = sheets.iter_mut().find(|s| s.name == odcs::SERVERS).unwrap();
        servers.columns.retain(|c| c.header != "Host");
        let catalog = FieldCatalog::new(sheets).unwrap();
        let c = contract(json!({"servers": [{"server": "pg", "type": "postgres", "host": "db.local"}]}));
        let err = Serializer::new(&catalog).serialize(&c).unwrap_err();
        assert!(matches!(err, SerializeError::UncoveredField { field, .. } if field == "host"));
    }
}
