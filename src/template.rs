//! Blank and example workbooks for manual data entry
//!
//! Templates are projections of the catalog: every selected sheet keeps its
//! name and its columns keep their catalog order. The deserializer locates
//! columns by header, so any template (filled in) is valid deserializer input.

use crate::catalog::{ColumnSpec, EntityKind, FieldCatalog, SheetLayout, SheetSpec};
use crate::config::{ConfigError, ConversionConfig};
use crate::convert::{SerializeError, Serializer};
use crate::models::Contract;
use crate::tabular::{Cell, Sheet, Workbook};
use crate::validation::StructuralValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// How much of the catalog a template exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Basic information, objects and properties; required columns only
    Minimal,
    /// Every sheet; required and linking columns only
    Required,
    /// Every sheet; every column except derived ones
    Full,
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Example contract is invalid: {0}")]
    Example(#[from] StructuralValidationError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Generates templates from a catalog
#[derive(Debug, Clone)]
pub struct TemplateGenerator<'c> {
    catalog: &'c FieldCatalog,
    config: ConversionConfig,
    with_examples: bool,
}

impl Default for TemplateGenerator<'static> {
    fn default() -> Self {
        TemplateGenerator::new(FieldCatalog::odcs())
    }
}

impl<'c> TemplateGenerator<'c> {
    pub fn new(catalog: &'c FieldCatalog) -> Self {
        Self {
            catalog,
            config: ConversionConfig::default(),
            with_examples: false,
        }
    }

    pub fn with_config(mut self, config: ConversionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Fill the template with rows of a built-in example contract
    pub fn with_examples(mut self, with_examples: bool) -> Self {
        self.with_examples = with_examples;
        self
    }

    pub fn generate(&self, kind: TemplateKind) -> Result<Workbook, TemplateError> {
        let example = if self.with_examples {
            let contract = example_contract()?;
            Some(
                Serializer::new(self.catalog)
                    .with_config(self.config.clone())?
                    .serialize(&contract)?,
            )
        } else {
            None
        };

        let mut workbook = Workbook::new();
        for spec in self.catalog.sheets() {
            if !includes_sheet(kind, spec) {
                continue;
            }
            let selected: Vec<&ColumnSpec> = spec
                .columns
                .iter()
                .filter(|column| includes_column(kind, column))
                .collect();
            let source = example.as_ref().and_then(|workbook| workbook.sheet(&spec.name));
            workbook.insert(project(spec, &selected, source));
        }
        debug!(kind = ?kind, sheets = workbook.len(), examples = self.with_examples, "Generated template");
        Ok(workbook)
    }
}

fn includes_sheet(kind: TemplateKind, spec: &SheetSpec) -> bool {
    match kind {
        TemplateKind::Minimal => matches!(
            spec.entity,
            EntityKind::Contract | EntityKind::SchemaObject | EntityKind::SchemaProperty
        ),
        TemplateKind::Required | TemplateKind::Full => true,
    }
}

fn includes_column(kind: TemplateKind, column: &ColumnSpec) -> bool {
    match kind {
        TemplateKind::Minimal => column.required,
        TemplateKind::Required => column.required || column.linking,
        TemplateKind::Full => !column.is_derived(),
    }
}

/// Restrict a sheet to the selected columns, copying rows from `source` when given
fn project(spec: &SheetSpec, selected: &[&ColumnSpec], source: Option<&Sheet>) -> Sheet {
    match spec.layout {
        SheetLayout::Records => {
            let headers = selected.iter().map(|column| column.header.clone()).collect();
            let mut sheet = Sheet::new(spec.name.clone(), headers);
            if let Some(source) = source {
                for index in 0..source.len() {
                    let row = selected
                        .iter()
                        .map(|column| source.cell(index, &column.header).cloned().unwrap_or_default())
                        .collect();
                    sheet.push_row(row);
                }
            }
            sheet
        }
        SheetLayout::KeyValue => {
            let mut sheet = Sheet::new(spec.name.clone(), spec.headers());
            for column in selected {
                let value = source
                    .and_then(|source| source.rows.iter().find(|row| row.first() == Some(&Cell::from(column.header.as_str()))))
                    .and_then(|row| row.get(1).cloned())
                    .unwrap_or_default();
                sheet.push_row(vec![
                    Cell::from(column.header.as_str()),
                    value,
                    Cell::from(column.description.clone()),
                ]);
            }
            sheet
        }
    }
}

/// A contract touching every sheet of the default layout
pub fn example_contract() -> Result<Contract, StructuralValidationError> {
    Contract::from_value(&json!({
        "apiVersion": "v3.0.2",
        "kind": "DataContract",
        "id": "seller-orders",
        "version": "1.0.0",
        "status": "draft",
        "name": "Seller orders",
        "domain": "sales",
        "dataProduct": "orders",
        "tags": ["sales", "orders"],
        "description": {
            "usage": "Daily revenue reporting",
            "purpose": "Order analytics for sellers",
            "limitations": "Refunds arrive with a one day delay"
        },
        "servers": [{
            "server": "warehouse",
            "type": "postgres",
            "environment": "prod",
            "host": "db.example.com",
            "port": 5432,
            "database": "sales",
            "schema": "public"
        }],
        "schema": [{
            "name": "orders",
            "physicalName": "tbl_orders",
            "physicalType": "table",
            "description": "One row per order",
            "properties": [
                {
                    "name": "order_id",
                    "logicalType": "integer",
                    "physicalType": "BIGINT",
                    "required": true,
                    "unique": true,
                    "primaryKey": true,
                    "primaryKeyPosition": 1,
                    "logicalTypeOptions": {"minimum": 1}
                },
                {
                    "name": "status",
                    "logicalType": "string",
                    "examples": ["open", "shipped"],
                    "logicalTypeOptions": {"maxLength": 20},
                    "quality": [{
                        "type": "library",
                        "rule": "validValues",
                        "validValues": ["open", "shipped", "cancelled"]
                    }]
                },
                {
                    "name": "labels",
                    "logicalType": "array",
                    "items": {"name": "label", "logicalType": "string"}
                }
            ],
            "quality": [{
                "type": "library",
                "rule": "rowCount",
                "dimension": "completeness",
                "mustBeGreaterThan": 0
            }]
        }],
        "support": [{"channel": "#orders", "url": "https://chat.example.com/orders", "tool": "slack"}],
        "price": {"priceAmount": 0.5, "priceCurrency": "USD", "priceUnit": "megabyte"},
        "team": [{"username": "jdoe", "name": "Jane Doe", "role": "owner"}],
        "roles": [{"role": "orders_reader", "access": "read"}],
        "slaProperties": [{"property": "latency", "value": 4, "unit": "h"}],
        "authoritativeDefinitions": [{"url": "https://wiki.example.com/orders", "type": "businessDefinition"}],
        "customProperties": [{"property": "costCenter", "value": "cc-42"}]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::odcs;
    use crate::convert::Deserializer;

    #[test]
    fn test_minimal_template() {
        let workbook = TemplateGenerator::default().generate(TemplateKind::Minimal).unwrap();
        let names: Vec<_> = workbook.sheet_names().collect();
        assert_eq!(names, vec![odcs::BASIC_INFORMATION, odcs::SCHEMA, odcs::SCHEMA_PROPERTIES]);
        assert_eq!(
            workbook.sheet(odcs::SCHEMA_PROPERTIES).unwrap().headers,
            vec!["Object Name", "Property Name"]
        );
        // version, kind, apiVersion, id, status
        assert_eq!(workbook.sheet(odcs::BASIC_INFORMATION).unwrap().len(), 5);
    }

    #[test]
    fn test_full_template_has_no_derived_columns() {
        let workbook = TemplateGenerator::default().generate(TemplateKind::Full).unwrap();
        assert_eq!(workbook.len(), FieldCatalog::odcs().sheets().len());
        let schema = workbook.sheet(odcs::SCHEMA).unwrap();
        assert!(schema.column_index("Properties Count").is_none());
        assert!(schema.column_index("Physical Name").is_some());
        assert!(schema.is_empty());
    }

    #[test]
    fn test_full_example_reads_back() {
        let workbook = TemplateGenerator::default()
            .with_examples(true)
            .generate(TemplateKind::Full)
            .unwrap();
        let contract = Deserializer::default().deserialize(&workbook).unwrap();
        assert_eq!(contract, example_contract().unwrap());
    }

    #[test]
    fn test_custom_delimiter_example_reads_back() {
        let config = ConversionConfig::new().with_list_delimiter("; ");
        let workbook = TemplateGenerator::default()
            .with_config(config.clone())
            .unwrap()
            .with_examples(true)
            .generate(TemplateKind::Full)
            .unwrap();
        let properties = workbook.sheet(odcs::SCHEMA_PROPERTIES).unwrap();
        assert_eq!(properties.cell(1, "Examples"), Some(&Cell::from("open; shipped")));
        let contract = Deserializer::default()
            .with_config(config)
            .unwrap()
            .deserialize(&workbook)
            .unwrap();
        assert_eq!(contract, example_contract().unwrap());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ConversionConfig::new().with_items_suffix(" ");
        assert!(TemplateGenerator::default().with_config(config).is_err());
    }
}
