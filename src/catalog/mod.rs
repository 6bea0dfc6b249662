//! Field catalog
//!
//! The single declaration of the workbook layout: for every sheet, the entity
//! it carries, its columns in header order, which columns are required, and
//! which columns link a row to its owning entity. The serializer and the
//! deserializer both walk the same catalog, so neither direction keeps a
//! column list of its own.
//!
//! [`FieldCatalog::odcs`] is the default layout. Converters take the catalog
//! as a constructor argument, so callers can substitute their own.

pub mod odcs;
pub mod spec;

pub use spec::{
    ColumnRole, ColumnSpec, Derivation, EntityKind, KEY_VALUE_HEADERS, LinkColumn, SheetLayout,
    SheetSpec, ValueKind,
};

use once_cell::sync::Lazy;
use std::collections::HashSet;
use thiserror::Error;

static ODCS_CATALOG: Lazy<FieldCatalog> = Lazy::new(|| FieldCatalog {
    sheets: odcs::sheets(),
});

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate sheet name: {0}")]
    DuplicateSheet(String),

    #[error("Sheet '{sheet}' declares header '{header}' twice")]
    DuplicateHeader { sheet: String, header: String },

    #[error("More than one sheet carries {0} entities")]
    DuplicateEntity(EntityKind),

    #[error("Sheet '{0}' is a key/value sheet but declares non-field columns")]
    KeyValueColumns(String),
}

/// Registry of sheet layouts, read-only once built
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalog {
    sheets: Vec<SheetSpec>,
}

impl FieldCatalog {
    /// Build a catalog, checking that names and entities are unambiguous
    pub fn new(sheets: Vec<SheetSpec>) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        let mut entities = HashSet::new();
        for sheet in &sheets {
            if !names.insert(sheet.name.as_str()) {
                return Err(CatalogError::DuplicateSheet(sheet.name.clone()));
            }
            if !entities.insert(sheet.entity) {
                return Err(CatalogError::DuplicateEntity(sheet.entity));
            }
            let mut headers = HashSet::new();
            for column in &sheet.columns {
                if !headers.insert(column.header.as_str()) {
                    return Err(CatalogError::DuplicateHeader {
                        sheet: sheet.name.clone(),
                        header: column.header.clone(),
                    });
                }
            }
            if sheet.layout == SheetLayout::KeyValue
                && sheet.columns.iter().any(|c| c.field_key().is_none())
            {
                return Err(CatalogError::KeyValueColumns(sheet.name.clone()));
            }
        }
        Ok(Self { sheets })
    }

    /// The default ODCS layout, built once per process
    pub fn odcs() -> &'static FieldCatalog {
        &ODCS_CATALOG
    }

    pub fn sheets(&self) -> &[SheetSpec] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// The sheet carrying an entity kind
    pub fn sheet_for(&self, entity: EntityKind) -> Option<&SheetSpec> {
        self.sheets.iter().find(|s| s.entity == entity)
    }

    /// A copy of this catalog without the named sheet
    pub fn without_sheet(&self, name: &str) -> Self {
        Self {
            sheets: self.sheets.iter().filter(|s| s.name != name).cloned().collect(),
        }
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        FieldCatalog::odcs().clone()
    }
}
