// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::physical_order::sorted_traits;
use super::*;

/// The physical plan of top N operation.
///
/// Keeps only the first `limit` rows under `order`, without materializing a full sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalTopN {
    order: Order,
    limit: usize,
}

impl PhysicalTopN {
    pub fn new(order: Order, limit: usize) -> Self {
        PhysicalTopN { order, limit }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl PlanNode {
    pub fn physical_top_n(order: Order, limit: usize, child: PlanRef) -> PlanRef {
        PlanNode::new(PhysicalTopN::new(order, limit), smallvec![child])
    }
}

impl Derive for PhysicalTopN {
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
        sorted_traits(&self.order, children)
    }
}

impl fmt::Display for PhysicalTopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalTopN: {}, limit: {}", self.order, self.limit)
    }
}
