//! ODCS Sheets - Data contracts as multi-sheet workbooks
//!
//! Provides:
//! - A validated model of ODCS data contracts (`models`)
//! - A declarative field catalog describing the workbook layout (`catalog`)
//! - Conversion of contracts to workbooks and back (`convert`)
//! - Template workbooks for manual data entry (`template`)
//! - JSON/YAML document helpers (`document`)
//!
//! The workbook is an in-memory value (`tabular`); reading and writing
//! spreadsheet files is left to the caller.
//!
//! ```ignore
//! use odcs_sheets::{Contract, contract_to_workbook, workbook_to_contract};
//!
//! let contract = Contract::from_yaml_str(text)?;
//! let workbook = contract_to_workbook(&contract)?;
//! assert_eq!(workbook_to_contract(&workbook)?, contract);
//! ```

pub mod catalog;
pub mod config;
pub mod convert;
pub mod document;
pub mod models;
pub mod tabular;
pub mod template;
pub mod validation;

pub use catalog::{CatalogError, FieldCatalog};
pub use config::{ConfigError, ConversionConfig};
pub use convert::{
    AggregateConversionError, ConversionError, Deserializer, SerializeError, Serializer,
    contract_to_workbook, workbook_to_contract,
};
pub use document::{DocumentError, DocumentFormat};
pub use models::Contract;
pub use tabular::{Cell, Sheet, Workbook};
pub use template::{TemplateError, TemplateGenerator, TemplateKind};
pub use validation::{FieldPath, StructuralValidationError, Violation};
