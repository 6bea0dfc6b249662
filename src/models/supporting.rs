//! Flat supporting records of a contract

use super::enums::{ServerType, Vocabulary};
use crate::validation::{FieldPath, ObjectReader, StructuralResult, StructuralValidationError, validate_url};
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::warn;

// ============================================================================
// References & extension points
// ============================================================================

/// Link to an authoritative source of meaning (business glossary, wiki, ...)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthoritativeDefinition {
    /// http or https URL of the definition
    pub url: String,
    /// Kind of definition, e.g. "businessDefinition"
    #[serde(rename = "type")]
    pub definition_type: String,
}

impl AuthoritativeDefinition {
    pub fn new(url: impl Into<String>, definition_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            definition_type: definition_type.into(),
        }
    }

    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let url = r.required_string("url")?;
        validate_url(&url).map_err(|violation| r.error("url", violation))?;
        let definition_type = r.required_string("type")?;
        r.finish()?;
        Ok(Self {
            url,
            definition_type,
        })
    }
}

/// Free-form extension property; the value may be any document value
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomProperty {
    pub property: String,
    pub value: Value,
}

impl CustomProperty {
    pub fn new(property: impl Into<String>, value: Value) -> Self {
        Self {
            property: property.into(),
            value,
        }
    }

    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let property = r.required_string("property")?;
        let value = r.required_any("value")?;
        r.finish()?;
        Ok(Self { property, value })
    }
}

// ============================================================================
// Contract-level records
// ============================================================================

/// Usage notes of the contract
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ContractDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
}

impl ContractDescription {
    /// Returns `None` when no field is set
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Option<Self>> {
        let mut r = ObjectReader::new(value, path)?;
        let description = Self {
            usage: r.optional_string("usage")?,
            purpose: r.optional_string("purpose")?,
            limitations: r.optional_string("limitations")?,
        };
        r.finish()?;
        Ok((description != Self::default()).then_some(description))
    }
}

/// Connection descriptor of a server hosting the contracted data.
///
/// One flat record serves every server type. Attributes that have no meaning
/// for the declared type are accepted and logged.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server identifier, unique within the contract
    pub server: String,
    #[serde(rename = "type")]
    pub server_type: ServerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
}

impl Server {
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let server = Self {
            server: r.required_string("server")?,
            server_type: r.required_vocab("type")?,
            description: r.optional_string("description")?,
            environment: r.optional_string("environment")?,
            location: r.optional_string("location")?,
            host: r.optional_string("host")?,
            port: r.optional_port("port")?,
            database: r.optional_string("database")?,
            schema: r.optional_string("schema")?,
            project: r.optional_string("project")?,
            dataset: r.optional_string("dataset")?,
            catalog: r.optional_string("catalog")?,
            format: r.optional_string("format")?,
            account: r.optional_string("account")?,
            warehouse: r.optional_string("warehouse")?,
        };
        let path = r.path().clone();
        r.finish()?;
        server.warn_irrelevant_fields(&path);
        Ok(server)
    }

    /// Connection attributes that are set, by document key
    pub fn connection_attributes(&self) -> Vec<&'static str> {
        [
            ("location", self.location.is_some()),
            ("host", self.host.is_some()),
            ("port", self.port.is_some()),
            ("database", self.database.is_some()),
            ("schema", self.schema.is_some()),
            ("project", self.project.is_some()),
            ("dataset", self.dataset.is_some()),
            ("catalog", self.catalog.is_some()),
            ("format", self.format.is_some()),
            ("account", self.account.is_some()),
            ("warehouse", self.warehouse.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect()
    }

    fn warn_irrelevant_fields(&self, path: &FieldPath) {
        let Some(relevant) = self.server_type.connection_fields() else {
            return;
        };
        for field in self.connection_attributes() {
            if !relevant.contains(&field) {
                warn!(
                    path = %path,
                    server_type = self.server_type.as_str(),
                    field,
                    "Server attribute has no meaning for this server type"
                );
            }
        }
    }
}

/// Channel where consumers get support
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportChannel {
    pub channel: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tool name, e.g. "slack", "teams", "email"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Scope, e.g. "interactive", "announcements"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_url: Option<String>,
}

impl SupportChannel {
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let channel = r.required_string("channel")?;
        let url = r.required_string("url")?;
        validate_url(&url).map_err(|violation| r.error("url", violation))?;
        let description = r.optional_string("description")?;
        let tool = r.optional_string("tool")?;
        let scope = r.optional_string("scope")?;
        let invitation_url = r.optional_string("invitationUrl")?;
        if let Some(invitation) = &invitation_url {
            validate_url(invitation).map_err(|violation| r.error("invitationUrl", violation))?;
        }
        r.finish()?;
        Ok(Self {
            channel,
            url,
            description,
            tool,
            scope,
            invitation_url,
        })
    }
}

/// Price of consuming the data
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<String>,
}

impl Pricing {
    /// Returns `None` when no field is set
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Option<Self>> {
        let mut r = ObjectReader::new(value, path)?;
        let pricing = Self {
            price_amount: r.optional_number("priceAmount")?,
            price_currency: r.optional_string("priceCurrency")?,
            price_unit: r.optional_string("priceUnit")?,
        };
        r.finish()?;
        Ok((pricing != Self::default()).then_some(pricing))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by_username: Option<String>,
}

impl TeamMember {
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let member = Self {
            username: r.required_string("username")?,
            name: r.optional_string("name")?,
            description: r.optional_string("description")?,
            role: r.optional_string("role")?,
            date_in: r.optional_string("dateIn")?,
            date_out: r.optional_string("dateOut")?,
            replaced_by_username: r.optional_string("replacedByUsername")?,
        };
        r.finish()?;
        Ok(member)
    }
}

/// Access role consumers can request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_level_approvers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_level_approvers: Option<String>,
}

impl Role {
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let role = Self {
            role: r.required_string("role")?,
            description: r.optional_string("description")?,
            access: r.optional_string("access")?,
            first_level_approvers: r.optional_string("firstLevelApprovers")?,
            second_level_approvers: r.optional_string("secondLevelApprovers")?,
        };
        r.finish()?;
        Ok(role)
    }
}

/// Service level agreement property, e.g. `latency: 4 d`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaProperty {
    pub property: String,
    /// Scalar agreement value
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ext: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

impl SlaProperty {
    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let sla = Self {
            property: r.required_string("property")?,
            value: r.required_scalar("value")?,
            value_ext: r.optional_scalar("valueExt")?,
            unit: r.optional_string("unit")?,
            element: r.optional_string("element")?,
            driver: r.optional_string("driver")?,
        };
        r.finish()?;
        Ok(sla)
    }
}

/// Shared reader for the `authoritativeDefinitions` and `customProperties`
/// lists carried by contracts, objects and properties.
pub(crate) fn read_references(
    r: &mut ObjectReader<'_>,
) -> StructuralResult<(Vec<AuthoritativeDefinition>, Vec<CustomProperty>)> {
    let definitions = r.list("authoritativeDefinitions", AuthoritativeDefinition::from_value)?;
    let custom = r.list("customProperties", CustomProperty::from_value)?;
    Ok((definitions, custom))
}

/// Fails on the second occurrence of a name within one list.
pub(crate) fn check_unique_names<'n>(
    names: impl IntoIterator<Item = (usize, &'n str)>,
    path_of: impl Fn(usize) -> FieldPath,
) -> StructuralResult<()> {
    let mut seen = std::collections::HashSet::new();
    for (index, name) in names {
        if !seen.insert(name) {
            return Err(StructuralValidationError::new(
                path_of(index),
                crate::validation::Violation::DuplicateName(name.to_string()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Violation;
    use serde_json::json;

    #[test]
    fn test_server_accepts_irrelevant_attribute() {
        let server = Server::from_value(
            &json!({"server": "prod", "type": "s3", "location": "s3://bucket/orders", "warehouse": "WH"}),
            FieldPath::from("servers").index(0),
        )
        .unwrap();
        assert_eq!(server.server_type, ServerType::S3);
        assert_eq!(server.connection_attributes(), vec!["location", "warehouse"]);
    }

    #[test]
    fn test_server_type_is_closed() {
        let err = Server::from_value(
            &json!({"server": "prod", "type": "mainframe"}),
            FieldPath::from("servers").index(0),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "servers[0].type");
        assert!(matches!(err.violation, Violation::NotAllowed { .. }));
    }

    #[test]
    fn test_support_url_scheme() {
        let err = SupportChannel::from_value(
            &json!({"channel": "#orders", "url": "slack://orders"}),
            FieldPath::from("support").index(1),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "support[1].url");
    }

    #[test]
    fn test_empty_pricing_is_absent() {
        let pricing = Pricing::from_value(&json!({"priceUnit": null}), FieldPath::from("price")).unwrap();
        assert!(pricing.is_none());
    }

    #[test]
    fn test_sla_value_must_be_scalar() {
        let err = SlaProperty::from_value(
            &json!({"property": "latency", "value": [1, 2]}),
            FieldPath::from("slaProperties").index(0),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "slaProperties[0].value");
    }

    #[test]
    fn test_custom_property_value_is_kept_verbatim() {
        let custom = CustomProperty::from_value(
            &json!({"property": "owners", "value": {"primary": "ana", "count": 2.0}}),
            FieldPath::from("customProperties").index(0),
        )
        .unwrap();
        assert_eq!(custom.value, json!({"primary": "ana", "count": 2}));
    }
}
