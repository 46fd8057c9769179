// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::optimizer::property::Distribution;

/// Converts a logical scan into a batch scan.
///
/// A single-node scan produces all rows in one place. A distributed scan reads each worker's
/// share of the table, with no partitioning the planner can rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchScanRule;

impl BatchScanRule {
    pub fn matches(&self, plan: &PlanNode) -> bool {
        plan.convention() == Convention::Logical && plan.as_logical_scan().is_some()
    }

    pub fn convert(&self, plan: &PlanRef, ctx: &RuleContext<'_>) -> Option<PlanRef> {
        if !self.matches(plan) {
            return None;
        }
        let scan = plan.as_logical_scan()?.clone();
        let distribution = match ctx.topology {
            ExecutionTopology::Single => ctx.distributions.singleton(),
            ExecutionTopology::Distributed => Distribution::Any,
        };
        Some(PlanNode::physical_scan(scan, distribution))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::TableRefId;
    use crate::optimizer::plan_nodes::LogicalScan;
    use crate::optimizer::property::Distributions;
    use crate::types::DataTypeKind;

    #[test]
    fn scan_distribution_follows_topology() {
        let logical = LogicalScan::new(
            TableRefId::new(1, 2),
            vec![DataTypeKind::String.nullable().to_column(0, "name")],
        )
        .into_plan();

        let single = RuleContext::new(ExecutionTopology::Single, &Distributions);
        let plan = BatchScanRule.convert(&logical, &single).unwrap();
        assert_eq!(plan.distribution(), &Distribution::Singleton);
        assert_eq!(plan.convention(), Convention::Batch);
        assert!(Arc::ptr_eq(plan.schema(), logical.schema()));

        let distributed = RuleContext::new(ExecutionTopology::Distributed, &Distributions);
        let plan = BatchScanRule.convert(&logical, &distributed).unwrap();
        assert_eq!(plan.distribution(), &Distribution::Any);
        assert_eq!(plan.as_physical_scan().unwrap().table_ref_id(), TableRefId::new(1, 2));
    }
}
