//! Source column type → Go field type.
use std::fmt;

/// How temporal columns are rendered. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalMode {
    /// `date.Datetime` from the helper date package.
    #[default]
    Datetime,
    /// Go's own `time.Time`.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    Long,
    Bool,
    String,
    Float,
    Datetime,
    Time,
    /// The catalog reported a type we have no mapping for. Carries the source type name.
    Unmapped(String),
}

impl TargetType {
    /// The Go spelling of the type.
    pub fn go_type(&self) -> &'static str {
        match self {
            TargetType::Long => "util.Long",
            TargetType::Bool => "bool",
            TargetType::String => "string",
            TargetType::Float => "float64",
            TargetType::Datetime => "date.Datetime",
            TargetType::Time => "time.Time",
            TargetType::Unmapped(_) => "interface{}",
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, TargetType::Unmapped(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.go_type())
    }
}

/// Every `DATA_TYPE` value we know how to map.
pub const KNOWN_SOURCE_TYPES: &[&str] = &[
    "int",
    "integer",
    "tinyint",
    "smallint",
    "mediumint",
    "bigint",
    "int unsigned",
    "integer unsigned",
    "tinyint unsigned",
    "smallint unsigned",
    "mediumint unsigned",
    "bigint unsigned",
    "bit",
    "bool",
    "boolean",
    "enum",
    "set",
    "varchar",
    "char",
    "tinytext",
    "mediumtext",
    "text",
    "longtext",
    "blob",
    "tinyblob",
    "mediumblob",
    "longblob",
    "binary",
    "varbinary",
    "float",
    "double",
    "decimal",
    "date",
    "datetime",
    "timestamp",
    "time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeMap {
    temporal: TemporalMode,
}

impl TypeMap {
    pub fn new(temporal: TemporalMode) -> Self {
        Self { temporal }
    }

    pub fn temporal_mode(&self) -> TemporalMode {
        self.temporal
    }

    pub fn map(&self, source_type: &str) -> TargetType {
        let normalized = source_type.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "int"
            | "integer"
            | "tinyint"
            | "smallint"
            | "mediumint"
            | "bigint"
            | "int unsigned"
            | "integer unsigned"
            | "tinyint unsigned"
            | "smallint unsigned"
            | "mediumint unsigned"
            | "bigint unsigned"
            | "bit" => TargetType::Long,
            "bool" | "boolean" => TargetType::Bool,
            "enum" | "set" | "varchar" | "char" | "tinytext" | "mediumtext" | "text" | "longtext" => {
                TargetType::String
            }
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => TargetType::String,
            "float" | "double" | "decimal" => TargetType::Float,
            "date" | "datetime" | "timestamp" | "time" => match self.temporal {
                TemporalMode::Datetime => TargetType::Datetime,
                TemporalMode::Native => TargetType::Time,
            },
            _ => TargetType::Unmapped(source_type.to_string()),
        }
    }
}
