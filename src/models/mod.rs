//! Contract model
//!
//! The validated, in-memory form of an ODCS data contract. Every type is built
//! from its document mapping through a `from_value` constructor that enforces
//! the model invariants and reports the document path of the first violation.
//! Serialization (serde) produces the document mapping again.

pub mod contract;
pub mod enums;
pub mod options;
pub mod property;
pub mod quality;
pub mod schema;
pub mod supporting;

pub use contract::Contract;
pub use enums::{ApiVersion, Kind, LogicalType, QualityDimension, QualityType, ServerType, Vocabulary};
pub use options::{
    ArrayOptions, DateOptions, LogicalTypeOptions, NumericOptions, ObjectOptions, StringOptions,
};
pub use property::SchemaProperty;
pub use quality::{CustomCheck, DataQualityRule, LibraryCheck, QualityCheck, SqlCheck, Thresholds};
pub use schema::SchemaObject;
pub use supporting::{
    AuthoritativeDefinition, ContractDescription, CustomProperty, Pricing, Role, Server, SlaProperty,
    SupportChannel, TeamMember,
};
