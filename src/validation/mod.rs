//! Structural validation for the contract model
//!
//! Provides:
//! - Document paths locating a failing entity (`schema[2].properties[5]`)
//! - The structural error type raised by model construction
//! - A path-tracking reader used by every model constructor
//! - Shared input checks (URLs)

pub mod error;
pub mod input;
pub mod path;
pub mod reader;

pub use error::{StructuralResult, StructuralValidationError, Violation};
pub use input::validate_url;
pub use path::{FieldPath, PathSegment};
pub use reader::ObjectReader;
