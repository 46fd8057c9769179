// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::*;

/// A placeholder for "the child plan, converted to satisfy `required`".
///
/// Rules emit subsets instead of converting their inputs themselves. The lowering driver
/// replaces each subset with a physical plan that satisfies the required traits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Subset {
    required: TraitSet,
}

impl Subset {
    pub fn required(&self) -> &TraitSet {
        &self.required
    }
}

impl PlanNode {
    /// Require `input` to be converted to `required` traits.
    pub fn subset(input: PlanRef, required: TraitSet) -> PlanRef {
        PlanNode::new(Subset { required }, smallvec![input])
    }
}

impl Derive for Subset {
    fn derive_traits(&self, _children: &[PlanRef]) -> TraitSet {
        self.required.clone()
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subset")
    }
}
