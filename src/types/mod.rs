//! Port data types.
//!
//! The wire spellings (`Table`, `int`, `List[Table]`, ...) are the ones the
//! procedure catalog emits from parameter annotations.

pub mod compat;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use compat::{compatible_targets, is_compatible};

/// Closed set of port types, including the `Any` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "Table")]
    Table,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "List[Table]")]
    TableList,
    #[serde(rename = "Any")]
    Any,
}

impl TypeTag {
    pub const ALL: [TypeTag; 7] = [
        TypeTag::Table,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Str,
        TypeTag::Bool,
        TypeTag::TableList,
        TypeTag::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Table => "Table",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
            TypeTag::TableList => "List[Table]",
            TypeTag::Any => "Any",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeTag::Any)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTypeTag(pub String);

impl fmt::Display for UnknownTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown port type '{}'", self.0)
    }
}

impl std::error::Error for UnknownTypeTag {}

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTypeTag(s.to_string()))
    }
}
