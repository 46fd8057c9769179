// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use smallvec::smallvec;

use super::*;
use crate::catalog::TableRefId;

/// The physical plan of a table scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalScan {
    logical: LogicalScan,
    distribution: Distribution,
}

impl PhysicalScan {
    /// A scan whose output is partitioned as `distribution`.
    pub fn new(logical: LogicalScan, distribution: Distribution) -> Self {
        PhysicalScan {
            logical,
            distribution,
        }
    }

    pub fn table_ref_id(&self) -> TableRefId {
        self.logical.table_ref_id()
    }

    pub fn columns(&self) -> &Schema {
        self.logical.columns()
    }
}

impl PlanNode {
    pub fn physical_scan(logical: LogicalScan, distribution: Distribution) -> PlanRef {
        PlanNode::new(PhysicalScan::new(logical, distribution), smallvec![])
    }
}

impl Derive for PhysicalScan {
    fn derive_traits(&self, _children: &[PlanRef]) -> TraitSet {
        TraitSet::batch(self.distribution.clone())
    }

    fn derive_schema(&self, _children: &[PlanRef]) -> Schema {
        self.logical.columns().clone()
    }
}

impl fmt::Display for PhysicalScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PhysicalScan: {}, columns: [{}]",
            self.table_ref_id(),
            self.columns().iter().map(|c| c.name()).join(", ")
        )
    }
}
