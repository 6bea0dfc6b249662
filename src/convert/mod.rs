//! Contract ⇄ workbook conversion
//!
//! [`Serializer`] writes a [`Contract`](crate::models::Contract) as one sheet
//! per catalog entry; [`Deserializer`] reads it back. Both are driven by the
//! same [`FieldCatalog`](crate::catalog::FieldCatalog), so a contract survives
//! the round trip unchanged.

pub mod coerce;
pub mod deserializer;
pub mod error;
pub mod serializer;

pub use coerce::{join_list, split_list};
pub use deserializer::Deserializer;
pub use error::{
    AggregateConversionError, CoercionError, CoercionReason, ConversionError, GroupingError,
    GroupingReason, SerializeError, SerializeResult,
};
pub use serializer::Serializer;

use crate::models::Contract;
use crate::tabular::Workbook;

/// Serialize with the default catalog and configuration
pub fn contract_to_workbook(contract: &Contract) -> SerializeResult<Workbook> {
    Serializer::default().serialize(contract)
}

/// Deserialize with the default catalog and configuration
pub fn workbook_to_contract(workbook: &Workbook) -> Result<Contract, AggregateConversionError> {
    Deserializer::default().deserialize(workbook)
}
