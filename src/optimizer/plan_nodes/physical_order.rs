// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::*;

/// The physical plan of order: a full sort of its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalOrder {
    order: Order,
}

impl PhysicalOrder {
    pub fn new(order: Order) -> Self {
        PhysicalOrder { order }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }
}

impl PlanNode {
    pub fn physical_order(order: Order, child: PlanRef) -> PlanRef {
        PlanNode::new(PhysicalOrder::new(order), smallvec![child])
    }
}

impl Derive for PhysicalOrder {
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
        sorted_traits(&self.order, children)
    }
}

/// Traits of a sort over `children[0]`: same distribution, sorted by `order`.
pub(super) fn sorted_traits(order: &Order, children: &[PlanRef]) -> TraitSet {
    let distribution = children
        .first()
        .map_or(Distribution::Any, |c| c.distribution().clone());
    TraitSet::new(Convention::Batch, distribution, order.clone())
}

impl fmt::Display for PhysicalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalOrder: {}", self.order)
    }
}
