//! Data quality rules, discriminated by their `type`

use super::enums::{QualityDimension, QualityType, Vocabulary};
use crate::validation::{FieldPath, ObjectReader, StructuralResult, Violation};
use serde::Serialize;
use serde_json::{Number, Value};

/// Fields that only some rule types accept.
const CHECK_FIELDS: &[&str] = &[
    "rule",
    "query",
    "engine",
    "implementation",
    "unit",
    "validValues",
    "mustBe",
    "mustNotBe",
    "mustBeGreaterThan",
    "mustBeGreaterOrEqualTo",
    "mustBeLessThan",
    "mustBeLessOrEqualTo",
    "mustBeBetween",
    "mustNotBeBetween",
];

/// Numeric comparison operators shared by library and SQL rules
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_not_be: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_greater_than: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_greater_or_equal_to: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_less_than: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_less_or_equal_to: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_between: Option<[Number; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_not_be_between: Option<[Number; 2]>,
}

impl Thresholds {
    fn read(r: &mut ObjectReader<'_>) -> StructuralResult<Self> {
        Ok(Self {
            must_be: r.optional_number("mustBe")?,
            must_not_be: r.optional_number("mustNotBe")?,
            must_be_greater_than: r.optional_number("mustBeGreaterThan")?,
            must_be_greater_or_equal_to: r.optional_number("mustBeGreaterOrEqualTo")?,
            must_be_less_than: r.optional_number("mustBeLessThan")?,
            must_be_less_or_equal_to: r.optional_number("mustBeLessOrEqualTo")?,
            must_be_between: r.optional_number_pair("mustBeBetween")?,
            must_not_be_between: r.optional_number_pair("mustNotBeBetween")?,
        })
    }
}

/// A named check from the standard rule library, e.g. `nullCheck`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCheck {
    pub rule: String,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqlCheck {
    pub query: String,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A check executed by a third-party engine
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomCheck {
    pub engine: String,
    pub implementation: String,
}

/// The type-specific part of a rule
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QualityCheck {
    Library(LibraryCheck),
    Sql(SqlCheck),
    Custom(CustomCheck),
    /// Free-text expectation, carried by the rule description
    Text,
}

impl QualityCheck {
    pub fn quality_type(&self) -> QualityType {
        match self {
            Self::Library(_) => QualityType::Library,
            Self::Sql(_) => QualityType::Sql,
            Self::Custom(_) => QualityType::Custom,
            Self::Text => QualityType::Text,
        }
    }

    fn allowed_fields(quality_type: QualityType) -> &'static [&'static str] {
        match quality_type {
            QualityType::Library => &[
                "rule",
                "unit",
                "validValues",
                "mustBe",
                "mustNotBe",
                "mustBeGreaterThan",
                "mustBeGreaterOrEqualTo",
                "mustBeLessThan",
                "mustBeLessOrEqualTo",
                "mustBeBetween",
                "mustNotBeBetween",
            ],
            QualityType::Sql => &[
                "query",
                "unit",
                "mustBe",
                "mustNotBe",
                "mustBeGreaterThan",
                "mustBeGreaterOrEqualTo",
                "mustBeLessThan",
                "mustBeLessOrEqualTo",
                "mustBeBetween",
                "mustNotBeBetween",
            ],
            QualityType::Custom => &["engine", "implementation"],
            QualityType::Text => &[],
        }
    }
}

/// One data quality check attached to a schema object or property
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<QualityDimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub check: QualityCheck,
}

impl DataQualityRule {
    /// Create a library rule
    pub fn library(rule: impl Into<String>) -> Self {
        Self::with_check(QualityCheck::Library(LibraryCheck {
            rule: rule.into(),
            thresholds: Thresholds::default(),
            unit: None,
            valid_values: Vec::new(),
        }))
    }

    /// Create a SQL rule
    pub fn sql(query: impl Into<String>) -> Self {
        Self::with_check(QualityCheck::Sql(SqlCheck {
            query: query.into(),
            thresholds: Thresholds::default(),
            unit: None,
        }))
    }

    fn with_check(check: QualityCheck) -> Self {
        Self {
            name: None,
            description: None,
            dimension: None,
            severity: None,
            business_impact: None,
            method: None,
            scheduler: None,
            schedule: None,
            tags: Vec::new(),
            check,
        }
    }

    pub fn quality_type(&self) -> QualityType {
        self.check.quality_type()
    }

    pub fn from_value(value: &Value, path: FieldPath) -> StructuralResult<Self> {
        let mut r = ObjectReader::new(value, path)?;
        let quality_type: QualityType = r.required_vocab("type")?;

        let allowed = QualityCheck::allowed_fields(quality_type);
        if let Some(field) = CHECK_FIELDS
            .iter()
            .find(|field| r.has(field) && !allowed.contains(field))
        {
            return Err(r.error(
                field,
                Violation::QualityFieldNotAllowed {
                    field: field.to_string(),
                    rule_type: quality_type.as_str().to_string(),
                },
            ));
        }

        let name = r.optional_string("name")?;
        let description = r.optional_string("description")?;
        let dimension = r.optional_vocab("dimension")?;
        let severity = r.optional_string("severity")?;
        let business_impact = r.optional_string("businessImpact")?;
        let method = r.optional_string("method")?;
        let scheduler = r.optional_string("scheduler")?;
        let schedule = r.optional_string("schedule")?;
        let tags = r.string_list("tags")?;

        let check = match quality_type {
            QualityType::Library => QualityCheck::Library(LibraryCheck {
                rule: r.required_string("rule")?,
                thresholds: Thresholds::read(&mut r)?,
                unit: r.optional_string("unit")?,
                valid_values: r.scalar_list("validValues")?,
            }),
            QualityType::Sql => QualityCheck::Sql(SqlCheck {
                query: r.required_string("query")?,
                thresholds: Thresholds::read(&mut r)?,
                unit: r.optional_string("unit")?,
            }),
            QualityType::Custom => QualityCheck::Custom(CustomCheck {
                engine: r.required_string("engine")?,
                implementation: r.required_string("implementation")?,
            }),
            QualityType::Text => {
                if description.is_none() {
                    return Err(r.error("description", Violation::Missing));
                }
                QualityCheck::Text
            }
        };
        r.finish()?;

        Ok(Self {
            name,
            description,
            dimension,
            severity,
            business_impact,
            method,
            scheduler,
            schedule,
            tags,
            check,
        })
    }
}
