// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value type of a column, as carried on the wire next to each sort key.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    Bool,
    Int16,
    Int32,
    Int64,
    Float64,
    Decimal,
    Date,
    Timestamp,
    String,
    Blob,
}

/// Data type with nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub kind: DataTypeKind,
    pub nullable: bool,
}

impl DataType {
    pub const fn new(kind: DataTypeKind, nullable: bool) -> Self {
        DataType { kind, nullable }
    }

    pub const fn kind(&self) -> DataTypeKind {
        self.kind
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl DataTypeKind {
    pub const fn nullable(self) -> DataType {
        DataType::new(self, true)
    }

    pub const fn not_null(self) -> DataType {
        DataType::new(self, false)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown data type: {0}")]
pub struct ParseDataTypeError(String);

impl FromStr for DataTypeKind {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "smallint" | "int2" => Ok(Self::Int16),
            "int" | "int4" | "integer" => Ok(Self::Int32),
            "bigint" | "int8" => Ok(Self::Int64),
            "double" | "float8" => Ok(Self::Float64),
            "decimal" | "numeric" => Ok(Self::Decimal),
            "date" => Ok(Self::Date),
            "timestamp" => Ok(Self::Timestamp),
            "string" | "varchar" | "text" => Ok(Self::String),
            "blob" | "bytea" => Ok(Self::Blob),
            _ => Err(ParseDataTypeError(s.into())),
        }
    }
}

impl fmt::Display for DataTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "BOOLEAN",
            Self::Int16 => "SMALLINT",
            Self::Int32 => "INT",
            Self::Int64 => "BIGINT",
            Self::Float64 => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::String => "STRING",
            Self::Blob => "BLOB",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

pub type ColumnId = u32;
