// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::*;

/// The physical plan of exchange: moves rows between workers to reach `distribution`.
///
/// A gather to [`Distribution::Singleton`] merges the sorted streams of its input partitions, so
/// it keeps the input order. Any other exchange loses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhysicalExchange {
    distribution: Distribution,
}

impl PhysicalExchange {
    pub fn new(distribution: Distribution) -> Self {
        PhysicalExchange { distribution }
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

impl PlanNode {
    pub fn physical_exchange(distribution: Distribution, child: PlanRef) -> PlanRef {
        PlanNode::new(PhysicalExchange::new(distribution), smallvec![child])
    }
}

impl Derive for PhysicalExchange {
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
        let order = match (&self.distribution, children.first()) {
            (Distribution::Singleton, Some(child)) => child.order().clone(),
            _ => Order::any(),
        };
        TraitSet::new(Convention::Batch, self.distribution.clone(), order)
    }
}

impl fmt::Display for PhysicalExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalExchange: {}", self.distribution)
    }
}
