//! Error types for workbook conversion

use crate::catalog::EntityKind;
use crate::validation::StructuralValidationError;
use std::fmt;
use thiserror::Error;

/// Why a cell could not be read as its column's type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionReason {
    #[error("required value is empty")]
    RequiredEmpty,

    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a recognised boolean")]
    NotABoolean(String),

    #[error("'{0}' is not an RFC 3339 timestamp")]
    NotATimestamp(String),

    #[error("expected {expected} values, found {found}")]
    WrongArity { expected: usize, found: usize },

    #[error("dangling escape character in '{0}'")]
    DanglingEscape(String),
}

/// A cell whose value cannot be converted to its target field type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{sheet}!{column} row {row}{}: {reason}", key_suffix(.key))]
pub struct CoercionError {
    pub sheet: String,
    /// 1-based spreadsheet row; the header is row 1
    pub row: usize,
    pub column: String,
    /// Linking key of the row, e.g. `orders/id`
    pub key: String,
    pub reason: CoercionReason,
}

/// Why a row could not be attached to the tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingReason {
    #[error("required column '{0}' is missing from the header row")]
    MissingColumn(String),

    #[error("another row has the same key")]
    DuplicateKey,

    #[error("no {entity} named '{owner}' exists")]
    OrphanRow { entity: EntityKind, owner: String },

    #[error("'{0}' is not a field of this sheet")]
    UnknownField(String),

    #[error("field '{0}' is listed more than once")]
    DuplicateField(String),

    #[error("'{0}' resolves to more than one array property")]
    AmbiguousItemsOwner(String),

    #[error("a property name requires an object name")]
    PropertyWithoutObject,

    #[error("{0} rows require an object name")]
    ContractLevelNotAllowed(EntityKind),
}

/// A row that is well-typed but cannot be placed in the tree
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{sheet} row {row}{}: {reason}", key_suffix(.key))]
pub struct GroupingError {
    pub sheet: String,
    pub row: usize,
    pub key: String,
    pub reason: GroupingReason,
}

fn key_suffix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!(" [{}]", key)
    }
}

/// One failure collected during a deserialization pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Grouping(#[from] GroupingError),

    #[error(transparent)]
    Structural(#[from] StructuralValidationError),
}

/// Every failure of one deserialization pass.
///
/// Holds at least one error. Row-level errors are reported together; a
/// structural error is only reported when no row-level error occurred.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct AggregateConversionError {
    errors: Vec<ConversionError>,
}

impl AggregateConversionError {
    pub(crate) fn new(errors: Vec<ConversionError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub fn errors(&self) -> &[ConversionError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ConversionError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn coercion_errors(&self) -> impl Iterator<Item = &CoercionError> {
        self.errors.iter().filter_map(|e| match e {
            ConversionError::Coercion(c) => Some(c),
            _ => None,
        })
    }

    pub fn grouping_errors(&self) -> impl Iterator<Item = &GroupingError> {
        self.errors.iter().filter_map(|e| match e {
            ConversionError::Grouping(g) => Some(g),
            _ => None,
        })
    }

    pub fn structural_error(&self) -> Option<&StructuralValidationError> {
        self.errors.iter().find_map(|e| match e {
            ConversionError::Structural(s) => Some(s),
            _ => None,
        })
    }
}

impl fmt::Display for AggregateConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workbook conversion failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

/// Serializer failure. Only reachable through a catalog that does not cover
/// the model, or a model built outside its validating constructor.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Failed to encode contract: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Sheet '{sheet}' has no value for required column '{column}' [{key}]")]
    MissingRequired {
        sheet: String,
        column: String,
        key: String,
    },

    #[error("Field '{field}' of {entity} is not covered by any catalog column")]
    UncoveredField { entity: EntityKind, field: String },

    #[error("No catalog sheet carries {0} entities")]
    MissingSheet(EntityKind),

    #[error("Value of '{field}' on sheet '{sheet}' cannot be written as {expected}")]
    UnencodableValue {
        sheet: String,
        field: String,
        expected: &'static str,
    },

    #[error("Element types cannot be laid out: {0}")]
    ItemsOwner(StructuralValidationError),
}

pub type SerializeResult<T> = Result<T, SerializeError>;
