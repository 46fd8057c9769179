// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use tracing::debug;

use super::plan_nodes::{PlanChildren, PlanNode, PlanRef};
use super::property::{Convention, Distribution, DistributionFactory, TraitSet};
use super::rules::{RuleContext, RuleSet};
use super::{ExecutionTopology, PlanError, TopologyOracle};

/// Lowers a logical plan into a batch plan.
///
/// For each logical node, the first candidate of the rule set wins. Subsets in the candidate are
/// then lowered against their required traits. When the result still misses a requirement, an
/// exchange (distribution) or a sort (order) is put on top of it.
pub struct Lowering<'a> {
    rules: &'a RuleSet,
    ctx: RuleContext<'a>,
}

impl<'a> Lowering<'a> {
    /// Ask `oracle` for the execution topology once, then lower with the batch rules.
    pub fn new(
        oracle: &dyn TopologyOracle,
        distributions: &'a dyn DistributionFactory,
    ) -> Result<Self, PlanError> {
        let topology = oracle.topology()?;
        Ok(Lowering {
            rules: RuleSet::batch(),
            ctx: RuleContext::new(topology, distributions),
        })
    }

    /// Use another rule set.
    #[must_use]
    pub fn with_rules(mut self, rules: &'a RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn topology(&self) -> ExecutionTopology {
        self.ctx.topology
    }

    /// The traits of the plan root: in distributed mode the result is gathered to one place.
    pub fn root_traits(&self) -> TraitSet {
        match self.ctx.topology {
            ExecutionTopology::Single => TraitSet::batch(Distribution::Any),
            ExecutionTopology::Distributed => TraitSet::batch(self.ctx.distributions.singleton()),
        }
    }

    /// Lower the whole plan.
    pub fn lower(&self, plan: &PlanRef) -> Result<PlanRef, PlanError> {
        self.implement(plan, &self.root_traits())
    }

    /// Lower `plan` into a batch plan satisfying `required`.
    pub fn implement(&self, plan: &PlanRef, required: &TraitSet) -> Result<PlanRef, PlanError> {
        let physical = match plan.convention() {
            Convention::Logical => {
                let candidate = self
                    .rules
                    .convert(plan, Convention::Batch, &self.ctx)
                    .into_iter()
                    .next()
                    .ok_or(PlanError::NoConversion {
                        node_type: plan.node_type(),
                        to: Convention::Batch,
                    })?;
                self.resolve(&candidate)?
            }
            Convention::Batch => self.resolve(plan)?,
        };
        Ok(self.enforce(physical, required))
    }

    /// Replace every subset in `plan` by its lowered input.
    fn resolve(&self, plan: &PlanRef) -> Result<PlanRef, PlanError> {
        if let Some(subset) = plan.as_subset() {
            let input = plan.child().ok_or(PlanError::NoConversion {
                node_type: plan.node_type(),
                to: Convention::Batch,
            })?;
            return self.implement(input, subset.required());
        }
        if plan.children().is_empty() {
            return Ok(plan.clone());
        }
        let children = plan
            .children()
            .iter()
            .map(|child| self.resolve(child))
            .collect::<Result<PlanChildren, _>>()?;
        let unchanged = children
            .iter()
            .zip(plan.children())
            .all(|(new, old)| Arc::ptr_eq(new, old));
        if unchanged {
            return Ok(plan.clone());
        }
        Ok(plan.clone_with_children(children))
    }

    /// Put enforcers on top of `plan` until it satisfies `required`.
    fn enforce(&self, mut plan: PlanRef, required: &TraitSet) -> PlanRef {
        if !plan.distribution().satisfies(&required.distribution) {
            debug!(
                from = %plan.distribution(),
                to = %required.distribution,
                "insert exchange"
            );
            plan = PlanNode::physical_exchange(required.distribution.clone(), plan);
        }
        if !plan.order().satisfies(&required.order) {
            debug!(order = %required.order, "insert sort");
            plan = PlanNode::physical_order(required.order.clone(), plan);
        }
        plan
    }
}
