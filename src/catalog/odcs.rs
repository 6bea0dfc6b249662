//! The ODCS workbook layout.
//!
//! Sheet names and headers are part of the workbook format: new optional
//! fields only ever append columns.

use super::spec::{
    ColumnSpec as C, Derivation, EntityKind, LinkColumn, SheetSpec, ValueKind as V,
};

pub const BASIC_INFORMATION: &str = "Basic Information";
pub const TAGS: &str = "Tags";
pub const DESCRIPTION: &str = "Description";
pub const SERVERS: &str = "Servers";
pub const SCHEMA: &str = "Schema";
pub const SCHEMA_PROPERTIES: &str = "Schema Properties";
pub const LOGICAL_TYPE_OPTIONS: &str = "Logical Type Options";
pub const QUALITY_RULES: &str = "Quality Rules";
pub const SUPPORT: &str = "Support";
pub const PRICING: &str = "Pricing";
pub const TEAM: &str = "Team";
pub const ROLES: &str = "Roles";
pub const SLA_PROPERTIES: &str = "SLA Properties";
pub const AUTHORITATIVE_DEFINITIONS: &str = "Authoritative Definitions";
pub const CUSTOM_PROPERTIES: &str = "Custom Properties";

pub(crate) fn sheets() -> Vec<SheetSpec> {
    vec![
        SheetSpec::key_value(
            BASIC_INFORMATION,
            EntityKind::Contract,
            vec![
                C::text("version", "version").required().described("Contract version"),
                C::text("kind", "kind").required().described("Always DataContract"),
                C::text("apiVersion", "apiVersion")
                    .required()
                    .described("Standard version, e.g. v3.0.2"),
                C::text("id", "id").required().described("Unique contract identifier"),
                C::text("name", "name").described("Contract name"),
                C::text("tenant", "tenant").described("Owning tenant"),
                C::text("status", "status")
                    .required()
                    .described("Lifecycle status, e.g. draft or active"),
                C::text("dataProduct", "dataProduct").described("Data product name"),
                C::text("domain", "domain").described("Business domain"),
                C::text("slaDefaultElement", "slaDefaultElement")
                    .described("Default element for SLA checks"),
                C::field("contractCreatedTs", "contractCreatedTs", V::Timestamp)
                    .described("Creation timestamp (RFC 3339)"),
            ],
        ),
        SheetSpec::records(
            TAGS,
            EntityKind::ContractTag,
            vec![C::text("Tag", "tag").required()],
        ),
        SheetSpec::key_value(
            DESCRIPTION,
            EntityKind::Description,
            vec![
                C::text("usage", "usage").described("How to use the data"),
                C::text("purpose", "purpose").described("Purpose of the data"),
                C::text("limitations", "limitations").described("Known limitations"),
            ],
        ),
        SheetSpec::records(
            SERVERS,
            EntityKind::Server,
            vec![
                C::text("Server", "server").required(),
                C::text("Type", "type").required(),
                C::text("Description", "description"),
                C::text("Environment", "environment"),
                C::text("Location", "location"),
                C::text("Host", "host"),
                C::field("Port", "port", V::Integer),
                C::text("Database", "database"),
                C::text("Schema", "schema"),
                C::text("Project", "project"),
                C::text("Catalog", "catalog"),
                C::text("Format", "format"),
                C::text("Account", "account"),
                C::text("Warehouse", "warehouse"),
                C::text("Dataset", "dataset"),
            ],
        ),
        SheetSpec::records(
            SCHEMA,
            EntityKind::SchemaObject,
            vec![
                C::text("Object Name", "name").required().linking(),
                C::text("Physical Name", "physicalName"),
                C::text("Logical Type", "logicalType"),
                C::text("Physical Type", "physicalType"),
                C::text("Description", "description"),
                C::text("Business Name", "businessName"),
                C::text("Data Granularity", "dataGranularityDescription"),
                C::field("Tags", "tags", V::List),
                C::derived("Quality Rules Count", Derivation::QualityRuleCount),
                C::derived("Properties Count", Derivation::PropertyCount),
                C::derived("Auth Definitions Count", Derivation::AuthoritativeDefinitionCount),
            ],
        ),
        SheetSpec::records(
            SCHEMA_PROPERTIES,
            EntityKind::SchemaProperty,
            vec![
                C::link("Object Name", LinkColumn::ObjectName).required(),
                C::text("Property Name", "name").required().linking(),
                C::text("Logical Type", "logicalType"),
                C::text("Physical Type", "physicalType"),
                C::text("Physical Name", "physicalName"),
                C::text("Description", "description"),
                C::text("Business Name", "businessName"),
                C::field("Required", "required", V::Boolean),
                C::field("Unique", "unique", V::Boolean),
                C::field("Primary Key", "primaryKey", V::Boolean),
                C::field("PK Position", "primaryKeyPosition", V::Integer),
                C::field("Partitioned", "partitioned", V::Boolean),
                C::field("Partition Position", "partitionKeyPosition", V::Integer),
                C::text("Classification", "classification"),
                C::text("Encrypted Name", "encryptedName"),
                C::field("Critical Data Element", "criticalDataElement", V::Boolean),
                C::field("Transform Sources", "transformSourceObjects", V::List),
                C::text("Transform Logic", "transformLogic"),
                C::text("Transform Description", "transformDescription"),
                C::field("Examples", "examples", V::ScalarList),
                C::field("Tags", "tags", V::List),
                C::derived("Quality Rules Count", Derivation::QualityRuleCount),
                C::derived("Auth Definitions Count", Derivation::AuthoritativeDefinitionCount),
            ],
        ),
        SheetSpec::records(
            LOGICAL_TYPE_OPTIONS,
            EntityKind::LogicalTypeOptions,
            vec![
                C::link("Object Name", LinkColumn::ObjectName).required(),
                C::link("Property Name", LinkColumn::PropertyName).required(),
                C::derived("Logical Type", Derivation::OwnerLogicalType),
                C::text("Format", "format"),
                C::field("Min Length", "minLength", V::Integer),
                C::field("Max Length", "maxLength", V::Integer),
                C::text("Pattern", "pattern"),
                C::field("Minimum", "minimum", V::Json),
                C::field("Maximum", "maximum", V::Json),
                C::field("Exclusive Minimum", "exclusiveMinimum", V::Boolean),
                C::field("Exclusive Maximum", "exclusiveMaximum", V::Boolean),
                C::field("Multiple Of", "multipleOf", V::Number),
                C::field("Min Items", "minItems", V::Integer),
                C::field("Max Items", "maxItems", V::Integer),
                C::field("Unique Items", "uniqueItems", V::Boolean),
                C::field("Min Properties", "minProperties", V::Integer),
                C::field("Max Properties", "maxProperties", V::Integer),
                C::field("Required Properties", "required", V::List),
            ],
        ),
        SheetSpec::records(
            QUALITY_RULES,
            EntityKind::QualityRule,
            vec![
                C::link("Object Name", LinkColumn::ObjectName).required(),
                C::link("Property Name", LinkColumn::PropertyName),
                C::derived("Level", Derivation::RuleLevel),
                C::text("Name", "name"),
                C::text("Description", "description"),
                C::text("Type", "type").required(),
                C::text("Rule", "rule"),
                C::text("Dimension", "dimension"),
                C::text("Severity", "severity"),
                C::text("Business Impact", "businessImpact"),
                C::text("Unit", "unit"),
                C::field("Valid Values", "validValues", V::ScalarList),
                C::text("Query", "query"),
                C::text("Engine", "engine"),
                C::text("Implementation", "implementation"),
                C::field("Must Be", "mustBe", V::Number),
                C::field("Must Not Be", "mustNotBe", V::Number),
                C::field("Must Be Greater Than", "mustBeGreaterThan", V::Number),
                C::field("Must Be Greater Or Equal", "mustBeGreaterOrEqualTo", V::Number),
                C::field("Must Be Less Than", "mustBeLessThan", V::Number),
                C::field("Must Be Less Or Equal", "mustBeLessOrEqualTo", V::Number),
                C::field("Must Be Between", "mustBeBetween", V::NumberPair),
                C::field("Must Not Be Between", "mustNotBeBetween", V::NumberPair),
                C::text("Method", "method"),
                C::text("Scheduler", "scheduler"),
                C::text("Schedule", "schedule"),
                C::field("Tags", "tags", V::List),
            ],
        ),
        SheetSpec::records(
            SUPPORT,
            EntityKind::SupportChannel,
            vec![
                C::text("Channel", "channel").required(),
                C::text("URL", "url").required(),
                C::text("Description", "description"),
                C::text("Tool", "tool"),
                C::text("Scope", "scope"),
                C::text("Invitation URL", "invitationUrl"),
            ],
        ),
        SheetSpec::key_value(
            PRICING,
            EntityKind::Pricing,
            vec![
                C::field("priceAmount", "priceAmount", V::Number).described("Price amount"),
                C::text("priceCurrency", "priceCurrency").described("Currency, e.g. USD"),
                C::text("priceUnit", "priceUnit").described("Billing unit, e.g. megabyte"),
            ],
        ),
        SheetSpec::records(
            TEAM,
            EntityKind::TeamMember,
            vec![
                C::text("Username", "username").required(),
                C::text("Name", "name"),
                C::text("Role", "role"),
                C::text("Description", "description"),
                C::text("Date In", "dateIn"),
                C::text("Date Out", "dateOut"),
                C::text("Replaced By Username", "replacedByUsername"),
            ],
        ),
        SheetSpec::records(
            ROLES,
            EntityKind::Role,
            vec![
                C::text("Role", "role").required(),
                C::text("Description", "description"),
                C::text("Access", "access"),
                C::text("First Level Approvers", "firstLevelApprovers"),
                C::text("Second Level Approvers", "secondLevelApprovers"),
            ],
        ),
        SheetSpec::records(
            SLA_PROPERTIES,
            EntityKind::SlaProperty,
            vec![
                C::text("Property", "property").required(),
                C::field("Value", "value", V::Json).required(),
                C::field("Value Ext", "valueExt", V::Json),
                C::text("Unit", "unit"),
                C::text("Element", "element"),
                C::text("Driver", "driver"),
            ],
        ),
        SheetSpec::records(
            AUTHORITATIVE_DEFINITIONS,
            EntityKind::AuthoritativeDefinition,
            vec![
                C::text("URL", "url").required(),
                C::text("Type", "type").required(),
                C::link("Object Name", LinkColumn::ObjectName),
                C::link("Property Name", LinkColumn::PropertyName),
            ],
        ),
        SheetSpec::records(
            CUSTOM_PROPERTIES,
            EntityKind::CustomProperty,
            vec![
                C::text("Property", "property").required(),
                C::field("Value", "value", V::Json).required(),
                C::link("Object Name", LinkColumn::ObjectName),
                C::link("Property Name", LinkColumn::PropertyName),
            ],
        ),
    ]
}
