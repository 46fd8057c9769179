// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};

use crate::types::{ColumnId, DataType};

/// A column in the output schema of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDesc {
    id: ColumnId,
    name: String,
    datatype: DataType,
}

impl ColumnDesc {
    pub fn new(id: ColumnId, name: impl Into<String>, datatype: DataType) -> Self {
        ColumnDesc {
            id,
            name: name.into(),
            datatype,
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }
}

impl DataType {
    /// Wrap the type into a column description.
    pub fn to_column(self, id: ColumnId, name: impl Into<String>) -> ColumnDesc {
        ColumnDesc::new(id, name, self)
    }
}
