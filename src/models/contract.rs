//! Contract: the root of a data contract document

use super::enums::{ApiVersion, Kind};
use super::schema::{SchemaObject, check_items_owners};
use super::supporting::{
    AuthoritativeDefinition, ContractDescription, CustomProperty, Pricing, Role, Server, SlaProperty,
    SupportChannel, TeamMember, check_unique_names, read_references,
};
use crate::config::DEFAULT_ITEMS_SUFFIX;
use crate::document::{DocumentError, DocumentFormat, parse_document};
use crate::validation::{FieldPath, ObjectReader, StructuralResult};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Contract - a validated data contract (ODCS v3)
///
/// A contract only exists in validated form: [`Contract::from_value`] is the
/// single constructor for document input and checks every invariant of the
/// tree before returning. The tree is not mutated afterwards; conversions
/// produce new values.
///
/// # Example
///
/// ```rust
/// use odcs_sheets::models::Contract;
/// use serde_json::json;
///
/// let contract = Contract::from_value(&json!({
///     "apiVersion": "v3.0.2",
///     "kind": "DataContract",
///     "id": "orders-contract",
///     "version": "1.0.0",
///     "status": "active",
///     "schema": [{"name": "orders"}]
/// }))
/// .unwrap();
/// assert_eq!(contract.schema[0].name, "orders");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    // === Identity ===
    pub version: String,
    pub kind: Kind,
    pub api_version: ApiVersion,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Lifecycle status, e.g. "draft", "active", "deprecated"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_default_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_created_ts: Option<DateTime<FixedOffset>>,

    // === Descriptive ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<ContractDescription>,

    // === Structure ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub schema: Vec<SchemaObject>,

    // === Governance ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support: Vec<SupportChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<TeamMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sla_properties: Vec<SlaProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authoritative_definitions: Vec<AuthoritativeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_properties: Vec<CustomProperty>,
}

impl Contract {
    /// Build and validate a contract from a nested document mapping.
    ///
    /// Fails on the first invariant violation with the path of the offending
    /// field, e.g. `schema[2].properties[5].primaryKeyPosition`.
    pub fn from_value(value: &Value) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, FieldPath::root())?;

        let version = r.required_string("version")?;
        let kind = r.required_vocab("kind")?;
        let api_version = r.required_vocab("apiVersion")?;
        let id = r.required_string("id")?;
        let name = r.optional_string("name")?;
        let tenant = r.optional_string("tenant")?;
        let status = r.required_string("status")?;
        let data_product = r.optional_string("dataProduct")?;
        let domain = r.optional_string("domain")?;
        let sla_default_element = r.optional_string("slaDefaultElement")?;
        let contract_created_ts = r.optional_timestamp("contractCreatedTs")?;
        let tags = r.string_list("tags")?;

        let description = r
            .optional_object("description", ContractDescription::from_value)?
            .flatten();
        let servers = r.list("servers", Server::from_value)?;
        check_unique_names(
            servers.iter().map(|s| s.server.as_str()).enumerate(),
            |i| FieldPath::from("servers").index(i).key("server"),
        )?;
        let schema = r.list("schema", SchemaObject::from_value)?;
        check_unique_names(
            schema.iter().map(|o| o.name.as_str()).enumerate(),
            |i| FieldPath::from("schema").index(i).key("name"),
        )?;
        check_items_owners(&schema, DEFAULT_ITEMS_SUFFIX)?;
        let support = r.list("support", SupportChannel::from_value)?;
        let price = r.optional_object("price", Pricing::from_value)?.flatten();
        let team = r.list("team", TeamMember::from_value)?;
        let roles = r.list("roles", Role::from_value)?;
        let sla_properties = r.list("slaProperties", SlaProperty::from_value)?;
        let (authoritative_definitions, custom_properties) = read_references(&mut r)?;
        r.finish()?;

        debug!(
            id = %id,
            objects = schema.len(),
            servers = servers.len(),
            "Validated contract"
        );

        Ok(Self {
            version,
            kind,
            api_version,
            id,
            name,
            tenant,
            status,
            data_product,
            domain,
            sla_default_element,
            contract_created_ts,
            tags,
            description,
            servers,
            schema,
            support,
            price,
            team,
            roles,
            sla_properties,
            authoritative_definitions,
            custom_properties,
        })
    }

    /// The nested document mapping of this contract
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Parse and validate a YAML or JSON contract document
    pub fn from_str_as(text: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        let value = parse_document(text, format)?;
        Ok(Self::from_value(&value)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        Self::from_str_as(text, DocumentFormat::Yaml)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        Self::from_str_as(text, DocumentFormat::Json)
    }

    pub fn to_yaml_string(&self) -> Result<String, DocumentError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn get_schema_object(&self, name: &str) -> Option<&SchemaObject> {
        self.schema.iter().find(|o| o.name == name)
    }
}
