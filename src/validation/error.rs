//! Structural validation errors raised while constructing the contract model.

use super::path::FieldPath;
use thiserror::Error;

/// The rule a document broke.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("required field is missing")]
    Missing,

    #[error("required field must not be empty")]
    Empty,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown field")]
    UnknownField,

    #[error("'{value}' is not one of: {allowed}")]
    NotAllowed { value: String, allowed: String },

    #[error("duplicate name '{0}'")]
    DuplicateName(String),

    #[error("name '{0}' has leading or trailing whitespace")]
    SurroundingWhitespace(String),

    #[error("element type owner '{0}' is already used by another object or array property")]
    ItemsOwnerConflict(String),

    #[error("primaryKey is true but primaryKeyPosition is missing")]
    MissingPrimaryKeyPosition,

    #[error("position must be a positive integer, found {0}")]
    NonPositivePosition(String),

    #[error("primary key position {0} is already used by another property")]
    DuplicatePrimaryKeyPosition(u64),

    #[error("logicalType array requires items")]
    MissingItems,

    #[error("items is only allowed when logicalType is array")]
    ItemsNotAllowed,

    #[error("array items may not themselves be arrays")]
    NestedArrayItems,

    #[error("logicalTypeOptions requires a logicalType")]
    OptionsWithoutLogicalType,

    #[error("option '{option}' does not apply to logicalType '{logical_type}'")]
    OptionNotApplicable {
        option: String,
        logical_type: String,
    },

    #[error("field '{field}' is not allowed on a '{rule_type}' quality rule")]
    QualityFieldNotAllowed { field: String, rule_type: String },

    #[error("'{lower}' must not be greater than '{upper}'")]
    InvertedRange { lower: String, upper: String },

    #[error("{0}")]
    Invalid(String),
}

/// A schema model invariant violation, located by its document path.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {violation}")]
pub struct StructuralValidationError {
    pub path: FieldPath,
    pub violation: Violation,
}

impl StructuralValidationError {
    pub fn new(path: FieldPath, violation: Violation) -> Self {
        Self { path, violation }
    }
}

/// Result type for model construction
pub type StructuralResult<T> = Result<T, StructuralValidationError>;
