// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use smallvec::smallvec;

use super::*;
use crate::catalog::{ColumnDesc, TableRefId};

/// The logical plan of a table scan. The leaf every order plan reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LogicalScan {
    table_ref_id: TableRefId,
    columns: Schema,
}

impl LogicalScan {
    pub fn new(table_ref_id: TableRefId, columns: Vec<ColumnDesc>) -> Self {
        LogicalScan {
            table_ref_id,
            columns: columns.into(),
        }
    }

    pub fn table_ref_id(&self) -> TableRefId {
        self.table_ref_id
    }

    pub fn columns(&self) -> &Schema {
        &self.columns
    }

    pub fn into_plan(self) -> PlanRef {
        PlanNode::new(self, smallvec![])
    }
}

impl Derive for LogicalScan {
    fn derive_traits(&self, _children: &[PlanRef]) -> TraitSet {
        TraitSet::logical()
    }

    fn derive_schema(&self, _children: &[PlanRef]) -> Schema {
        self.columns.clone()
    }
}

impl fmt::Display for LogicalScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogicalScan: {}, columns: [{}]",
            self.table_ref_id,
            self.columns.iter().map(|c| c.name()).join(", ")
        )
    }
}
