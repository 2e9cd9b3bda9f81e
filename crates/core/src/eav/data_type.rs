use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared storage type of a custom attribute.
///
/// The serialized names match the `part_attributes.data_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "dec")]
    Decimal,
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "choice")]
    Choice,
}

/// All data types, in the order they are offered to administrators.
pub const ALL_DATA_TYPES: &[DataType] = &[
    DataType::Text,
    DataType::Integer,
    DataType::Decimal,
    DataType::Boolean,
    DataType::Date,
    DataType::Choice,
];

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "int",
            Self::Decimal => "dec",
            Self::Boolean => "bool",
            Self::Date => "date",
            Self::Choice => "choice",
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Choice => "choice",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a stored or submitted data type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown data type '{0}'. Must be one of: text, int, dec, bool, date, choice")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_DATA_TYPES
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| UnknownDataType(s.to_string()))
    }
}

impl TryFrom<String> for DataType {
    type Error = UnknownDataType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
