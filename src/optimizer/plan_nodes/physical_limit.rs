// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::*;
use crate::optimizer::bound::Bound;

/// The physical plan of limit operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalLimit {
    bound: Bound,
}

impl PhysicalLimit {
    pub fn new(bound: Bound) -> Self {
        PhysicalLimit { bound }
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn offset(&self) -> Option<usize> {
        self.bound.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.bound.limit
    }
}

impl PlanNode {
    pub fn physical_limit(bound: Bound, child: PlanRef) -> PlanRef {
        PlanNode::new(PhysicalLimit::new(bound), smallvec![child])
    }
}

impl Derive for PhysicalLimit {
    /// Truncation keeps the distribution and order of its input.
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
        children.first().map_or_else(
            || TraitSet::batch(Distribution::Any),
            |c| c.traits().clone().with_convention(Convention::Batch),
        )
    }
}

impl fmt::Display for PhysicalLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalLimit: {}", self.bound)
    }
}
