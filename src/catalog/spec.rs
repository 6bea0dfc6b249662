//! Sheet and column declarations

use std::fmt;

/// Headers of a key/value sheet, in order
pub const KEY_VALUE_HEADERS: [&str; 3] = ["Field", "Value", "Description"];

/// The model entity whose instances populate a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contract,
    ContractTag,
    Description,
    Server,
    SchemaObject,
    SchemaProperty,
    LogicalTypeOptions,
    QualityRule,
    SupportChannel,
    Pricing,
    TeamMember,
    Role,
    SlaProperty,
    AuthoritativeDefinition,
    CustomProperty,
}

impl EntityKind {
    /// Document keys of this entity whose content lives on another sheet
    pub fn child_entities(&self) -> &'static [(&'static str, EntityKind)] {
        match self {
            EntityKind::Contract => &[
                ("tags", EntityKind::ContractTag),
                ("description", EntityKind::Description),
                ("servers", EntityKind::Server),
                ("schema", EntityKind::SchemaObject),
                ("support", EntityKind::SupportChannel),
                ("price", EntityKind::Pricing),
                ("team", EntityKind::TeamMember),
                ("roles", EntityKind::Role),
                ("slaProperties", EntityKind::SlaProperty),
                ("authoritativeDefinitions", EntityKind::AuthoritativeDefinition),
                ("customProperties", EntityKind::CustomProperty),
            ],
            EntityKind::SchemaObject => &[
                ("properties", EntityKind::SchemaProperty),
                ("quality", EntityKind::QualityRule),
                ("authoritativeDefinitions", EntityKind::AuthoritativeDefinition),
                ("customProperties", EntityKind::CustomProperty),
            ],
            EntityKind::SchemaProperty => &[
                ("logicalTypeOptions", EntityKind::LogicalTypeOptions),
                ("items", EntityKind::SchemaProperty),
                ("quality", EntityKind::QualityRule),
                ("authoritativeDefinitions", EntityKind::AuthoritativeDefinition),
                ("customProperties", EntityKind::CustomProperty),
            ],
            _ => &[],
        }
    }

    /// Whether each owner holds at most one row of this entity per key
    pub fn is_keyed(&self) -> bool {
        matches!(
            self,
            EntityKind::SchemaObject | EntityKind::SchemaProperty | EntityKind::LogicalTypeOptions
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Contract => "contract",
            EntityKind::ContractTag => "contract tag",
            EntityKind::Description => "description",
            EntityKind::Server => "server",
            EntityKind::SchemaObject => "schema object",
            EntityKind::SchemaProperty => "schema property",
            EntityKind::LogicalTypeOptions => "logical type options",
            EntityKind::QualityRule => "quality rule",
            EntityKind::SupportChannel => "support channel",
            EntityKind::Pricing => "pricing",
            EntityKind::TeamMember => "team member",
            EntityKind::Role => "role",
            EntityKind::SlaProperty => "SLA property",
            EntityKind::AuthoritativeDefinition => "authoritative definition",
            EntityKind::CustomProperty => "custom property",
        };
        write!(f, "{}", name)
    }
}

/// How entities are laid out on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    /// One row per entity, one column per field
    Records,
    /// A single entity, one `Field | Value | Description` row per field
    KeyValue,
}

/// Semantic type of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 timestamp
    Timestamp,
    /// Delimited list of strings
    List,
    /// Delimited list of strings, numbers and booleans
    ScalarList,
    /// Exactly two delimited numbers
    NumberPair,
    /// Any document value. Text that would read back as another JSON type
    /// is written quoted.
    Json,
}

/// Owner identity carried on a row of a nested entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkColumn {
    ObjectName,
    PropertyName,
}

/// Columns computed from the tree by the serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    QualityRuleCount,
    PropertyCount,
    AuthoritativeDefinitionCount,
    /// Logical type of the owning property
    OwnerLogicalType,
    /// `object` or `property`
    RuleLevel,
}

/// What a column holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    /// A document field of the sheet's entity
    Field(String),
    Link(LinkColumn),
    Derived(Derivation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub role: ColumnRole,
    pub kind: ValueKind,
    /// An empty cell is an error
    pub required: bool,
    /// Part of the key associating a row with its owner
    pub linking: bool,
    /// Help text for templates and key/value sheets
    pub description: Option<String>,
}

impl ColumnSpec {
    pub fn field(header: impl Into<String>, key: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            header: header.into(),
            role: ColumnRole::Field(key.into()),
            kind,
            required: false,
            linking: false,
            description: None,
        }
    }

    pub fn text(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::field(header, key, ValueKind::Text)
    }

    pub fn link(header: impl Into<String>, link: LinkColumn) -> Self {
        Self {
            header: header.into(),
            role: ColumnRole::Link(link),
            kind: ValueKind::Text,
            required: false,
            linking: true,
            description: None,
        }
    }

    pub fn derived(header: impl Into<String>, derivation: Derivation) -> Self {
        let kind = match derivation {
            Derivation::OwnerLogicalType | Derivation::RuleLevel => ValueKind::Text,
            _ => ValueKind::Integer,
        };
        Self {
            header: header.into(),
            role: ColumnRole::Derived(derivation),
            kind,
            required: false,
            linking: false,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn linking(mut self) -> Self {
        self.linking = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Document key of a field column
    pub fn field_key(&self) -> Option<&str> {
        match &self.role {
            ColumnRole::Field(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.role, ColumnRole::Derived(_))
    }
}

/// One sheet of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSpec {
    pub name: String,
    pub entity: EntityKind,
    pub layout: SheetLayout,
    /// Record sheets: columns in header order. Key/value sheets: field rows in order.
    pub columns: Vec<ColumnSpec>,
}

impl SheetSpec {
    pub fn records(name: impl Into<String>, entity: EntityKind, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            entity,
            layout: SheetLayout::Records,
            columns,
        }
    }

    pub fn key_value(name: impl Into<String>, entity: EntityKind, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            entity,
            layout: SheetLayout::KeyValue,
            columns,
        }
    }

    /// Header row of the sheet
    pub fn headers(&self) -> Vec<String> {
        match self.layout {
            SheetLayout::Records => self.columns.iter().map(|c| c.header.clone()).collect(),
            SheetLayout::KeyValue => KEY_VALUE_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn column(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.header == header.trim())
    }

    pub fn field_column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field_key() == Some(key))
    }

    pub fn linking_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.linking)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.required)
    }
}
