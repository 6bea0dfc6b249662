//! Workbook → contract
//!
//! Deserialization runs in three passes:
//!
//! 1. **Read**: every catalog sheet is read row by row. Cells are decoded to
//!    their column's value kind and linking columns are collected.
//! 2. **Group**: rows are attached to their owners. Objects are keyed by name,
//!    properties by `(object, property)`, and array element types by the
//!    synthetic object name `<object>.<property>.items`.
//! 3. **Validate**: the assembled document goes through
//!    [`Contract::from_value`], the same check every other input path uses.
//!
//! Errors of the first two passes are collected across the whole workbook and
//! reported together. Structural validation only runs when they are clean.

use super::coerce::decode;
use super::error::{
    AggregateConversionError, CoercionError, CoercionReason, ConversionError, GroupingError,
    GroupingReason,
};
use crate::catalog::{
    ColumnRole, ColumnSpec, Derivation, EntityKind, FieldCatalog, KEY_VALUE_HEADERS, LinkColumn,
    SheetLayout, SheetSpec, ValueKind,
};
use crate::config::{ConfigError, ConversionConfig};
use crate::models::Contract;
use crate::models::schema::items_owner_name;
use crate::tabular::{Cell, Sheet, Workbook};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Spreadsheet row of the first data row; the header is row 1
const FIRST_DATA_ROW: usize = 2;

/// One decoded data row
#[derive(Debug, Clone, Default)]
struct Row {
    number: usize,
    object: Option<String>,
    property: Option<String>,
    key: String,
    fields: Map<String, Value>,
    derived: Vec<(Derivation, Cell)>,
}

/// Lists that objects and properties carry besides their own fields
#[derive(Debug, Default)]
struct Attached {
    options: Option<Map<String, Value>>,
    quality: Vec<Value>,
    authoritative_definitions: Vec<Value>,
    custom_properties: Vec<Value>,
}

impl Attached {
    fn write_into(self, fields: &mut Map<String, Value>) {
        if let Some(options) = self.options {
            fields.insert("logicalTypeOptions".to_string(), Value::Object(options));
        }
        insert_list(fields, "quality", self.quality);
        insert_list(fields, "authoritativeDefinitions", self.authoritative_definitions);
        insert_list(fields, "customProperties", self.custom_properties);
    }
}

#[derive(Debug)]
struct PropertyNode {
    row: Row,
    items: Option<Box<PropertyNode>>,
    attached: Attached,
}

impl PropertyNode {
    fn new(row: Row) -> Self {
        Self {
            row,
            items: None,
            attached: Attached::default(),
        }
    }

    fn is_array(&self) -> bool {
        self.row
            .fields
            .get("logicalType")
            .and_then(Value::as_str)
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("array"))
    }
}

#[derive(Debug)]
struct ObjectNode {
    row: Row,
    properties: IndexMap<String, PropertyNode>,
    attached: Attached,
}

/// Where a nested row attaches
enum Owner<'t> {
    Object(&'t mut ObjectNode),
    Property(&'t mut PropertyNode),
}

impl Owner<'_> {
    fn attached(&mut self) -> &mut Attached {
        match self {
            Owner::Object(object) => &mut object.attached,
            Owner::Property(property) => &mut property.attached,
        }
    }
}

/// Objects keyed by name, plus the synthetic owner names of element types
#[derive(Debug, Default)]
struct Tree {
    objects: IndexMap<String, ObjectNode>,
    items_owners: HashMap<String, Vec<(String, String)>>,
}

impl Tree {
    /// Only array properties own element types
    fn index_items_owners(&mut self, suffix: &str) {
        self.items_owners.clear();
        for (object, node) in &self.objects {
            for (property, _) in node.properties.iter().filter(|(_, p)| p.is_array()) {
                self.items_owners
                    .entry(items_owner_name(object, property, suffix))
                    .or_default()
                    .push((object.clone(), property.clone()));
            }
        }
    }

    /// The `(object, property)` owning a synthetic items name
    fn items_owner(&self, name: &str) -> Result<(String, String), GroupingReason> {
        match self.items_owners.get(name).map(Vec::as_slice) {
            Some([owner]) => Ok(owner.clone()),
            Some(_) => Err(GroupingReason::AmbiguousItemsOwner(name.to_string())),
            None => Err(GroupingReason::OrphanRow {
                entity: EntityKind::SchemaObject,
                owner: name.to_string(),
            }),
        }
    }

    fn property_mut(&mut self, object: &str, property: &str) -> Result<&mut PropertyNode, GroupingReason> {
        let orphan = || GroupingReason::OrphanRow {
            entity: EntityKind::SchemaProperty,
            owner: property.to_string(),
        };
        if self.objects.contains_key(object) {
            return self
                .objects
                .get_mut(object)
                .and_then(|node| node.properties.get_mut(property))
                .ok_or_else(orphan);
        }
        let (owner_object, owner_property) = self.items_owner(object)?;
        self.objects
            .get_mut(&owner_object)
            .and_then(|node| node.properties.get_mut(&owner_property))
            .and_then(|node| node.items.as_deref_mut())
            .filter(|items| trimmed_name(&items.row.fields).as_deref() == Some(property))
            .ok_or_else(orphan)
    }

    fn owner_mut(&mut self, object: &str, property: Option<&str>) -> Result<Owner<'_>, GroupingReason> {
        match property {
            Some(property) => self.property_mut(object, property).map(Owner::Property),
            None => self
                .objects
                .get_mut(object)
                .map(Owner::Object)
                .ok_or_else(|| GroupingReason::OrphanRow {
                    entity: EntityKind::SchemaObject,
                    owner: object.to_string(),
                }),
        }
    }
}

/// Reads contracts from workbooks laid out by a [`FieldCatalog`]
#[derive(Debug, Clone)]
pub struct Deserializer<'c> {
    catalog: &'c FieldCatalog,
    config: ConversionConfig,
}

impl Default for Deserializer<'static> {
    fn default() -> Self {
        Deserializer::new(FieldCatalog::odcs())
    }
}

impl<'c> Deserializer<'c> {
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

    /// Rebuild a contract from a workbook.
    ///
    /// Every coercion and grouping error is reported, not only the first.
    /// A catalog sheet missing from the workbook reads as a sheet without rows.
    pub fn deserialize(&self, workbook: &Workbook) -> Result<Contract, AggregateConversionError> {
        let mut pass = Pass {
            catalog: self.catalog,
            config: &self.config,
            errors: Vec::new(),
        };

        for name in workbook.sheet_names() {
            if self.catalog.sheet(name).is_none() {
                warn!(sheet = %name, "Ignoring sheet that is not part of the workbook layout");
            }
        }

        let mut rows: HashMap<EntityKind, Vec<Row>> = HashMap::new();
        for spec in self.catalog.sheets() {
            let sheet_rows = match workbook.sheet(&spec.name) {
                Some(sheet) => pass.read_sheet(spec, sheet),
                None => {
                    debug!(sheet = %spec.name, "Sheet not present, reading as empty");
                    Vec::new()
                }
            };
            rows.insert(spec.entity, sheet_rows);
        }

        let document = pass.group(rows);
        if !pass.errors.is_empty() {
            warn!(errors = pass.errors.len(), "Workbook has row-level errors");
            return Err(AggregateConversionError::new(pass.errors));
        }

        let contract = Contract::from_value(&document)
            .map_err(|error| AggregateConversionError::new(vec![ConversionError::Structural(error)]))?;
        info!(
            id = %contract.id,
            objects = contract.schema.len(),
            "Deserialized workbook into contract"
        );
        Ok(contract)
    }
}

/// State of one deserialization run
struct Pass<'p> {
    catalog: &'p FieldCatalog,
    config: &'p ConversionConfig,
    errors: Vec<ConversionError>,
}

impl Pass<'_> {
    fn grouping_error(&mut self, entity: EntityKind, row: &Row, reason: GroupingReason) {
        self.errors.push(
            GroupingError {
                sheet: self.sheet_name(entity),
                row: row.number,
                key: row.key.clone(),
                reason,
            }
            .into(),
        );
    }

    fn sheet_name(&self, entity: EntityKind) -> String {
        self.catalog
            .sheet_for(entity)
            .map(|spec| spec.name.clone())
            .unwrap_or_else(|| entity.to_string())
    }

    fn missing_column(&mut self, sheet: &str, header: &str) {
        self.errors.push(
            GroupingError {
                sheet: sheet.to_string(),
                row: 1,
                key: String::new(),
                reason: GroupingReason::MissingColumn(header.to_string()),
            }
            .into(),
        );
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    fn read_sheet(&mut self, spec: &SheetSpec, sheet: &Sheet) -> Vec<Row> {
        let rows = match spec.layout {
            SheetLayout::Records => self.read_records(spec, sheet),
            SheetLayout::KeyValue => self.read_key_value(spec, sheet).into_iter().collect(),
        };
        debug!(sheet = %spec.name, rows = rows.len(), "Read sheet");
        rows
    }

    fn read_records(&mut self, spec: &SheetSpec, sheet: &Sheet) -> Vec<Row> {
        for header in &sheet.headers {
            if !header.trim().is_empty() && spec.column(header).is_none() {
                warn!(sheet = %spec.name, header = %header, "Ignoring unknown column");
            }
        }

        let mut columns: Vec<(&ColumnSpec, usize)> = Vec::new();
        let mut complete = true;
        for column in &spec.columns {
            match sheet.column_index(&column.header) {
                Some(index) => columns.push((column, index)),
                None if column.required => {
                    self.missing_column(&spec.name, &column.header);
                    complete = false;
                }
                None => {}
            }
        }
        if !complete {
            return Vec::new();
        }

        let empty = Cell::Empty;
        let mut rows = Vec::new();
        for (index, cells) in sheet.data_rows() {
            let cell_at = |column: usize| cells.get(column).unwrap_or(&empty);
            let mut row = Row {
                number: index + FIRST_DATA_ROW,
                ..Default::default()
            };
            for (column, position) in &columns {
                let cell = cell_at(*position);
                match &column.role {
                    ColumnRole::Link(LinkColumn::ObjectName) => row.object = link_text(cell),
                    ColumnRole::Link(LinkColumn::PropertyName) => row.property = link_text(cell),
                    ColumnRole::Derived(derivation) => row.derived.push((*derivation, cell.clone())),
                    ColumnRole::Field(_) => {}
                }
            }
            row.key = columns
                .iter()
                .filter(|(column, _)| column.linking)
                .filter_map(|(_, position)| link_text(cell_at(*position)))
                .collect::<Vec<_>>()
                .join("/");

            let mut clean = true;
            for (column, position) in &columns {
                let ColumnRole::Field(key) = &column.role else {
                    continue;
                };
                match self.decode_cell(&spec.name, &row, column, cell_at(*position)) {
                    Ok(Some(value)) => {
                        row.fields.insert(key.clone(), value);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        self.errors.push(error.into());
                        clean = false;
                    }
                }
            }
            if clean {
                rows.push(row);
            }
        }
        rows
    }

    /// A key/value sheet holds a single entity; `None` when it has no values
    fn read_key_value(&mut self, spec: &SheetSpec, sheet: &Sheet) -> Option<Row> {
        let [field_header, value_header, _] = KEY_VALUE_HEADERS;
        let field_index = sheet.column_index(field_header);
        let value_index = sheet.column_index(value_header);
        let (Some(field_index), Some(value_index)) = (field_index, value_index) else {
            for (header, index) in [(field_header, field_index), (value_header, value_index)] {
                if index.is_none() {
                    self.missing_column(&spec.name, header);
                }
            }
            return None;
        };

        let empty = Cell::Empty;
        let mut entity = Row::default();
        let mut seen = HashSet::new();
        for (index, cells) in sheet.data_rows() {
            let number = index + FIRST_DATA_ROW;
            let Some(field) = cells.get(field_index).and_then(link_text) else {
                continue;
            };
            let row = Row {
                number,
                key: field.clone(),
                ..Default::default()
            };
            let Some(column) = spec.column(&field) else {
                self.errors.push(
                    GroupingError {
                        sheet: spec.name.clone(),
                        row: number,
                        key: String::new(),
                        reason: GroupingReason::UnknownField(field),
                    }
                    .into(),
                );
                continue;
            };
            if !seen.insert(column.header.clone()) {
                self.errors.push(
                    GroupingError {
                        sheet: spec.name.clone(),
                        row: number,
                        key: String::new(),
                        reason: GroupingReason::DuplicateField(field),
                    }
                    .into(),
                );
                continue;
            }
            let Some(key) = column.field_key() else {
                continue;
            };
            let cell = cells.get(value_index).unwrap_or(&empty);
            match self.decode_cell(&spec.name, &row, column, cell) {
                Ok(Some(value)) => {
                    entity.fields.insert(key.to_string(), value);
                }
                Ok(None) => {}
                Err(error) => self.errors.push(error.into()),
            }
        }
        (!entity.fields.is_empty()).then_some(entity)
    }

    fn decode_cell(
        &self,
        sheet: &str,
        row: &Row,
        column: &ColumnSpec,
        cell: &Cell,
    ) -> Result<Option<Value>, CoercionError> {
        let error = |reason| CoercionError {
            sheet: sheet.to_string(),
            row: row.number,
            column: column.header.clone(),
            key: row.key.clone(),
            reason,
        };
        match decode(cell, column.kind, self.config) {
            Ok(None) if column.required => Err(error(CoercionReason::RequiredEmpty)),
            Ok(value) => Ok(value),
            Err(reason) => Err(error(reason)),
        }
    }

    // ------------------------------------------------------------------
    // Group
    // ------------------------------------------------------------------

    fn group(&mut self, mut rows: HashMap<EntityKind, Vec<Row>>) -> Value {
        let mut take = |entity: EntityKind| rows.remove(&entity).unwrap_or_default();

        let mut root = take(EntityKind::Contract)
            .pop()
            .map(|row| row.fields)
            .unwrap_or_default();

        let tags: Vec<Value> = take(EntityKind::ContractTag)
            .into_iter()
            .filter_map(|mut row| row.fields.remove("tag"))
            .collect();
        insert_list(&mut root, "tags", tags);

        for (entity, key) in [(EntityKind::Description, "description"), (EntityKind::Pricing, "price")] {
            if let Some(row) = take(entity).pop() {
                root.insert(key.to_string(), Value::Object(row.fields));
            }
        }
        for (entity, key) in [
            (EntityKind::Server, "servers"),
            (EntityKind::SupportChannel, "support"),
            (EntityKind::TeamMember, "team"),
            (EntityKind::Role, "roles"),
            (EntityKind::SlaProperty, "slaProperties"),
        ] {
            let items = take(entity).into_iter().map(|row| Value::Object(row.fields)).collect();
            insert_list(&mut root, key, items);
        }

        let mut tree = Tree::default();
        self.group_objects(&mut tree, take(EntityKind::SchemaObject));
        self.group_properties(&mut tree, take(EntityKind::SchemaProperty));
        self.group_options(&mut tree, take(EntityKind::LogicalTypeOptions));
        for row in take(EntityKind::QualityRule) {
            self.attach(&mut tree, &mut root, EntityKind::QualityRule, row);
        }
        for entity in [EntityKind::AuthoritativeDefinition, EntityKind::CustomProperty] {
            for row in take(entity) {
                self.attach(&mut tree, &mut root, entity, row);
            }
        }

        let schema = tree
            .objects
            .into_values()
            .map(|object| self.object_value(object))
            .collect();
        insert_list(&mut root, "schema", schema);
        Value::Object(root)
    }

    fn group_objects(&mut self, tree: &mut Tree, rows: Vec<Row>) {
        for row in rows {
            let Some(name) = trimmed_name(&row.fields) else {
                continue;
            };
            if tree.objects.contains_key(&name) {
                self.grouping_error(EntityKind::SchemaObject, &row, GroupingReason::DuplicateKey);
                continue;
            }
            tree.objects.insert(
                name,
                ObjectNode {
                    row,
                    properties: IndexMap::new(),
                    attached: Attached::default(),
                },
            );
        }
    }

    /// Properties attach to objects first, so that element-type rows can be
    /// resolved against every property of the workbook.
    fn group_properties(&mut self, tree: &mut Tree, rows: Vec<Row>) {
        let mut element_rows = Vec::new();
        for row in rows {
            let (Some(object), Some(name)) = (row.object.clone(), trimmed_name(&row.fields)) else {
                continue;
            };
            let Some(node) = tree.objects.get_mut(&object) else {
                element_rows.push(row);
                continue;
            };
            if node.properties.contains_key(&name) {
                self.grouping_error(EntityKind::SchemaProperty, &row, GroupingReason::DuplicateKey);
                continue;
            }
            node.properties.insert(name, PropertyNode::new(row));
        }

        tree.index_items_owners(&self.config.items_suffix);
        for row in element_rows {
            let owner = row.object.clone().unwrap_or_default();
            let result = tree.items_owner(&owner).and_then(|(object, property)| {
                tree.objects
                    .get_mut(&object)
                    .and_then(|node| node.properties.get_mut(&property))
                    .ok_or(GroupingReason::OrphanRow {
                        entity: EntityKind::SchemaProperty,
                        owner: property,
                    })
            });
            match result {
                Ok(parent) if parent.items.is_some() => {
                    self.grouping_error(EntityKind::SchemaProperty, &row, GroupingReason::DuplicateKey)
                }
                Ok(parent) => parent.items = Some(Box::new(PropertyNode::new(row))),
                Err(reason) => self.grouping_error(EntityKind::SchemaProperty, &row, reason),
            }
        }
    }

    fn group_options(&mut self, tree: &mut Tree, rows: Vec<Row>) {
        for row in rows {
            let (Some(object), Some(property)) = (row.object.as_deref(), row.property.as_deref()) else {
                continue;
            };
            let reason = match tree.property_mut(object, property) {
                Ok(node) if node.attached.options.is_some() => GroupingReason::DuplicateKey,
                Ok(node) => {
                    if self.config.check_derived_columns {
                        let logical_type = node
                            .row
                            .fields
                            .get("logicalType")
                            .and_then(Value::as_str)
                            .map(str::to_string);
                        check_derived_text(&row, Derivation::OwnerLogicalType, logical_type.as_deref());
                    }
                    node.attached.options = Some(row.fields);
                    continue;
                }
                Err(reason) => reason,
            };
            self.grouping_error(EntityKind::LogicalTypeOptions, &row, reason);
        }
    }

    /// Attach a quality rule, authoritative definition or custom property to
    /// its owner. Only the latter two may sit at contract level.
    fn attach(&mut self, tree: &mut Tree, root: &mut Map<String, Value>, entity: EntityKind, row: Row) {
        if entity == EntityKind::QualityRule && self.config.check_derived_columns {
            let level = if row.property.is_some() { "property" } else { "object" };
            check_derived_text(&row, Derivation::RuleLevel, Some(level));
        }

        let value = Value::Object(row.fields.clone());
        let result = match (row.object.as_deref(), row.property.as_deref()) {
            (None, None) => {
                let key = match entity {
                    EntityKind::AuthoritativeDefinition => "authoritativeDefinitions",
                    EntityKind::CustomProperty => "customProperties",
                    _ => {
                        let reason = GroupingReason::ContractLevelNotAllowed(entity);
                        self.grouping_error(entity, &row, reason);
                        return;
                    }
                };
                let list = root.entry(key).or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = list {
                    items.push(value);
                }
                return;
            }
            (None, Some(_)) => Err(GroupingReason::PropertyWithoutObject),
            (Some(object), property) => tree.owner_mut(object, property).map(|mut owner| {
                let attached = owner.attached();
                match entity {
                    EntityKind::QualityRule => attached.quality.push(value),
                    EntityKind::AuthoritativeDefinition => attached.authoritative_definitions.push(value),
                    _ => attached.custom_properties.push(value),
                }
            }),
        };
        if let Err(reason) = result {
            self.grouping_error(entity, &row, reason);
        }
    }

    // ------------------------------------------------------------------
    // Assemble
    // ------------------------------------------------------------------

    fn object_value(&self, object: ObjectNode) -> Value {
        let ObjectNode {
            row,
            properties,
            attached,
        } = object;
        if self.config.check_derived_columns {
            check_derived_count(&row, Derivation::PropertyCount, properties.len());
            check_derived_count(&row, Derivation::QualityRuleCount, attached.quality.len());
            check_derived_count(
                &row,
                Derivation::AuthoritativeDefinitionCount,
                attached.authoritative_definitions.len(),
            );
        }
        let mut fields = row.fields;
        attached.write_into(&mut fields);
        let properties = properties
            .into_values()
            .map(|property| self.property_value(property))
            .collect();
        insert_list(&mut fields, "properties", properties);
        Value::Object(fields)
    }

    fn property_value(&self, property: PropertyNode) -> Value {
        let PropertyNode { row, items, attached } = property;
        if self.config.check_derived_columns {
            check_derived_count(&row, Derivation::QualityRuleCount, attached.quality.len());
            check_derived_count(
                &row,
                Derivation::AuthoritativeDefinitionCount,
                attached.authoritative_definitions.len(),
            );
        }
        let mut fields = row.fields;
        attached.write_into(&mut fields);
        if let Some(items) = items {
            fields.insert("items".to_string(), self.property_value(*items));
        }
        Value::Object(fields)
    }
}

fn insert_list(fields: &mut Map<String, Value>, key: &str, items: Vec<Value>) {
    if !items.is_empty() {
        fields.insert(key.to_string(), Value::Array(items));
    }
}

fn link_text(cell: &Cell) -> Option<String> {
    cell.as_text().map(|text| text.trim().to_string())
}

fn trimmed_name(fields: &Map<String, Value>) -> Option<String> {
    fields
        .get("name")
        .and_then(Value::as_str)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn derived_cell(row: &Row, derivation: Derivation) -> Option<&Cell> {
    row.derived
        .iter()
        .find(|(d, _)| *d == derivation)
        .map(|(_, cell)| cell)
        .filter(|cell| !cell.is_empty())
}

/// Derived columns are informational; disagreement is logged, not rejected
fn check_derived_count(row: &Row, derivation: Derivation, actual: usize) {
    let Some(cell) = derived_cell(row, derivation) else {
        return;
    };
    let config = ConversionConfig::default();
    let stated = decode(cell, ValueKind::Integer, &config)
        .ok()
        .flatten()
        .and_then(|value| value.as_u64());
    if stated != Some(actual as u64) {
        warn!(
            row = row.number,
            key = %row.key,
            column = ?derivation,
            stated = %cell,
            actual,
            "Derived column disagrees with the data"
        );
    }
}

fn check_derived_text(row: &Row, derivation: Derivation, actual: Option<&str>) {
    let Some(cell) = derived_cell(row, derivation) else {
        return;
    };
    let stated = cell.to_string();
    let matches = actual.is_some_and(|actual| stated.trim().eq_ignore_ascii_case(actual));
    if !matches {
        warn!(
            row = row.number,
            key = %row.key,
            column = ?derivation,
            stated = %stated,
            actual = actual.unwrap_or_default(),
            "Derived column disagrees with the data"
        );
    }
}
