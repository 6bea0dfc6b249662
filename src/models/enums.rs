//! Closed vocabularies of the contract standard

use serde::Serialize;

/// A closed set of string tags.
///
/// Implemented by every enumerated document field so the reader can parse and
/// report them uniformly.
pub trait Vocabulary: Sized + Copy + 'static {
    const ALL: &'static [Self];

    /// Canonical document spelling
    fn as_str(&self) -> &'static str;

    /// Case-insensitive match on the canonical spelling
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(text))
    }

    /// Comma separated canonical values, for error messages
    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Supported contract standard versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiVersion {
    #[serde(rename = "v3.1.0")]
    V3_1_0,
    #[serde(rename = "v3.0.2")]
    V3_0_2,
    #[serde(rename = "v3.0.1")]
    V3_0_1,
    #[serde(rename = "v3.0.0")]
    V3_0_0,
    #[serde(rename = "v2.2.2")]
    V2_2_2,
    #[serde(rename = "v2.2.1")]
    V2_2_1,
    #[serde(rename = "v2.2.0")]
    V2_2_0,
}

impl Vocabulary for ApiVersion {
    const ALL: &'static [Self] = &[
        Self::V3_1_0,
        Self::V3_0_2,
        Self::V3_0_1,
        Self::V3_0_0,
        Self::V2_2_2,
        Self::V2_2_1,
        Self::V2_2_0,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::V3_1_0 => "v3.1.0",
            Self::V3_0_2 => "v3.0.2",
            Self::V3_0_1 => "v3.0.1",
            Self::V3_0_0 => "v3.0.0",
            Self::V2_2_2 => "v2.2.2",
            Self::V2_2_1 => "v2.2.1",
            Self::V2_2_0 => "v2.2.0",
        }
    }
}

/// Document kind. Only data contracts are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    DataContract,
}

impl Vocabulary for Kind {
    const ALL: &'static [Self] = &[Self::DataContract];

    fn as_str(&self) -> &'static str {
        "DataContract"
    }
}

/// Server platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Api,
    Athena,
    Azure,
    Bigquery,
    Clickhouse,
    Databricks,
    Denodo,
    Dremio,
    Duckdb,
    Glue,
    Cloudsql,
    Db2,
    Informix,
    Kafka,
    Kinesis,
    Local,
    Mysql,
    Oracle,
    Postgresql,
    Postgres,
    Presto,
    Pubsub,
    Redshift,
    S3,
    Sftp,
    Snowflake,
    Sqlserver,
    Synapse,
    Trino,
    Vertica,
    Custom,
}

impl Vocabulary for ServerType {
    const ALL: &'static [Self] = &[
        Self::Api,
        Self::Athena,
        Self::Azure,
        Self::Bigquery,
        Self::Clickhouse,
        Self::Databricks,
        Self::Denodo,
        Self::Dremio,
        Self::Duckdb,
        Self::Glue,
        Self::Cloudsql,
        Self::Db2,
        Self::Informix,
        Self::Kafka,
        Self::Kinesis,
        Self::Local,
        Self::Mysql,
        Self::Oracle,
        Self::Postgresql,
        Self::Postgres,
        Self::Presto,
        Self::Pubsub,
        Self::Redshift,
        Self::S3,
        Self::Sftp,
        Self::Snowflake,
        Self::Sqlserver,
        Self::Synapse,
        Self::Trino,
        Self::Vertica,
        Self::Custom,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Athena => "athena",
            Self::Azure => "azure",
            Self::Bigquery => "bigquery",
            Self::Clickhouse => "clickhouse",
            Self::Databricks => "databricks",
            Self::Denodo => "denodo",
            Self::Dremio => "dremio",
            Self::Duckdb => "duckdb",
            Self::Glue => "glue",
            Self::Cloudsql => "cloudsql",
            Self::Db2 => "db2",
            Self::Informix => "informix",
            Self::Kafka => "kafka",
            Self::Kinesis => "kinesis",
            Self::Local => "local",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Postgresql => "postgresql",
            Self::Postgres => "postgres",
            Self::Presto => "presto",
            Self::Pubsub => "pubsub",
            Self::Redshift => "redshift",
            Self::S3 => "s3",
            Self::Sftp => "sftp",
            Self::Snowflake => "snowflake",
            Self::Sqlserver => "sqlserver",
            Self::Synapse => "synapse",
            Self::Trino => "trino",
            Self::Vertica => "vertica",
            Self::Custom => "custom",
        }
    }
}

impl ServerType {
    /// Connection attributes that mean something for this platform.
    ///
    /// `None` means every attribute is meaningful.
    pub fn connection_fields(&self) -> Option<&'static [&'static str]> {
        let fields: &'static [&'static str] = match self {
            Self::Custom => return None,
            Self::Api => &["location"],
            Self::Athena => &["location", "schema", "catalog"],
            Self::Azure | Self::S3 | Self::Sftp | Self::Local => &["location", "format"],
            Self::Bigquery => &["project", "dataset"],
            Self::Clickhouse | Self::Denodo | Self::Informix | Self::Mysql | Self::Synapse => {
                &["host", "port", "database"]
            }
            Self::Databricks => &["host", "catalog", "schema"],
            Self::Dremio => &["host", "port", "schema"],
            Self::Duckdb => &["database", "schema"],
            Self::Glue => &["account", "database", "location", "format"],
            Self::Cloudsql
            | Self::Db2
            | Self::Postgresql
            | Self::Postgres
            | Self::Sqlserver
            | Self::Vertica => &["host", "port", "database", "schema"],
            Self::Kafka => &["host", "format"],
            Self::Kinesis => &["format"],
            Self::Oracle => &["host", "port"],
            Self::Presto => &["host", "catalog", "schema"],
            Self::Trino => &["host", "port", "catalog", "schema"],
            Self::Pubsub => &["project"],
            Self::Redshift => &["host", "database", "schema", "account"],
            Self::Snowflake => &["account", "host", "port", "warehouse", "database", "schema"],
        };
        Some(fields)
    }
}

/// Logical data types of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Object,
    Array,
}

impl Vocabulary for LogicalType {
    const ALL: &'static [Self] = &[
        Self::String,
        Self::Integer,
        Self::Number,
        Self::Boolean,
        Self::Date,
        Self::Object,
        Self::Array,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data quality dimensions.
///
/// Parsing is case-insensitive and accepts the standard two-letter
/// abbreviations (`ac`, `cp`, `cf`, `cs`, `cv`, `tm`, `uq`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityDimension {
    Accuracy,
    Completeness,
    Conformity,
    Consistency,
    Coverage,
    Timeliness,
    Uniqueness,
}

impl Vocabulary for QualityDimension {
    const ALL: &'static [Self] = &[
        Self::Accuracy,
        Self::Completeness,
        Self::Conformity,
        Self::Consistency,
        Self::Coverage,
        Self::Timeliness,
        Self::Uniqueness,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Completeness => "completeness",
            Self::Conformity => "conformity",
            Self::Consistency => "consistency",
            Self::Coverage => "coverage",
            Self::Timeliness => "timeliness",
            Self::Uniqueness => "uniqueness",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "accuracy" | "ac" => Some(Self::Accuracy),
            "completeness" | "cp" => Some(Self::Completeness),
            "conformity" | "cf" => Some(Self::Conformity),
            "consistency" | "cs" => Some(Self::Consistency),
            "coverage" | "cv" => Some(Self::Coverage),
            "timeliness" | "tm" => Some(Self::Timeliness),
            "uniqueness" | "uq" => Some(Self::Uniqueness),
            _ => None,
        }
    }
}

/// Quality rule discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityType {
    Library,
    Sql,
    Custom,
    Text,
}

impl Vocabulary for QualityType {
    const ALL: &'static [Self] = &[Self::Library, Self::Sql, Self::Custom, Self::Text];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Sql => "sql",
            Self::Custom => "custom",
            Self::Text => "text",
        }
    }
}
