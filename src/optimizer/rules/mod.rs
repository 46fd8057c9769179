// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Conversion rules from the logical convention into the batch convention.
//!
//! The rule set is a closed enumeration. Every rule is registered once, under the key
//! `(source convention, target convention, node type)`, and is never modified afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use smallvec::SmallVec;
use tracing::trace;

use super::plan_nodes::{PlanNode, PlanNodeType, PlanRef};
use super::property::{Convention, DistributionFactory};
use super::ExecutionTopology;

mod order_rule;
mod scan_rule;

pub use order_rule::*;
pub use scan_rule::*;

/// External facts a rule may consult while converting.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub topology: ExecutionTopology,
    pub distributions: &'a dyn DistributionFactory,
}

impl<'a> RuleContext<'a> {
    pub fn new(topology: ExecutionTopology, distributions: &'a dyn DistributionFactory) -> Self {
        RuleContext {
            topology,
            distributions,
        }
    }
}

/// The dispatch key of a conversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub from: Convention,
    pub to: Convention,
    pub node_type: PlanNodeType,
}

/// All conversion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterRule {
    BatchOrder(BatchOrderRule),
    BatchScan(BatchScanRule),
}

impl ConverterRule {
    pub fn key(&self) -> RuleKey {
        let node_type = match self {
            Self::BatchOrder(_) => PlanNodeType::LogicalOrder,
            Self::BatchScan(_) => PlanNodeType::LogicalScan,
        };
        RuleKey {
            from: Convention::Logical,
            to: Convention::Batch,
            node_type,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BatchOrder(_) => "Converting logical order to batch order.",
            Self::BatchScan(_) => "Converting logical scan to batch scan.",
        }
    }

    /// Returns true if the rule can fire on `plan`.
    pub fn matches(&self, plan: &PlanNode) -> bool {
        match self {
            Self::BatchOrder(rule) => rule.matches(plan),
            Self::BatchScan(rule) => rule.matches(plan),
        }
    }

    /// Convert `plan`, or `None` if the rule does not apply.
    ///
    /// Conversion is pure: the same plan and context always give the same result.
    pub fn convert(&self, plan: &PlanRef, ctx: &RuleContext<'_>) -> Option<PlanRef> {
        match self {
            Self::BatchOrder(rule) => rule.convert(plan, ctx),
            Self::BatchScan(rule) => rule.convert(plan, ctx),
        }
    }
}

/// An immutable registry of conversion rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: HashMap<RuleKey, SmallVec<[ConverterRule; 1]>>,
}

impl RuleSet {
    /// Register `rules`. Rules sharing a key fire in the given order.
    pub fn new(rules: impl IntoIterator<Item = ConverterRule>) -> Self {
        let mut map: HashMap<_, SmallVec<_>> = HashMap::new();
        for rule in rules {
            map.entry(rule.key()).or_default().push(rule);
        }
        RuleSet { rules: map }
    }

    /// The rules converting the logical convention into the batch convention.
    pub fn batch() -> &'static RuleSet {
        &BATCH_RULES
    }

    pub fn rules_for(&self, key: &RuleKey) -> &[ConverterRule] {
        self.rules
            .get(key)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }

    /// Fire every rule registered for `plan` and `target`, collecting the candidates.
    pub fn convert(
        &self,
        plan: &PlanRef,
        target: Convention,
        ctx: &RuleContext<'_>,
    ) -> Vec<PlanRef> {
        let key = RuleKey {
            from: plan.convention(),
            to: target,
            node_type: plan.node_type(),
        };
        self.rules_for(&key)
            .iter()
            .filter(|rule| rule.matches(plan))
            .filter_map(|rule| {
                let candidate = rule.convert(plan, ctx);
                trace!(
                    rule = rule.description(),
                    fired = candidate.is_some(),
                    "fire rule"
                );
                candidate
            })
            .collect()
    }
}

static BATCH_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        ConverterRule::BatchOrder(BatchOrderRule),
        ConverterRule::BatchScan(BatchScanRule),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRefId;
    use crate::optimizer::bound::Bound;
    use crate::optimizer::plan_nodes::LogicalScan;
    use crate::optimizer::property::{ColumnOrder, Distributions, Order};
    use crate::optimizer::{Config, Lowering};
    use crate::types::DataTypeKind;

    #[test]
    fn lookup_by_key() {
        let key = RuleKey {
            from: Convention::Logical,
            to: Convention::Batch,
            node_type: PlanNodeType::LogicalOrder,
        };
        assert_eq!(
            RuleSet::batch().rules_for(&key),
            &[ConverterRule::BatchOrder(BatchOrderRule)]
        );

        let reversed = RuleKey {
            from: Convention::Batch,
            to: Convention::Logical,
            ..key
        };
        assert!(RuleSet::batch().rules_for(&reversed).is_empty());
    }

    #[test]
    fn convert_is_deterministic_and_leaves_input_alone() {
        let scan = LogicalScan::new(
            TableRefId::new(0, 0),
            vec![DataTypeKind::Int32.not_null().to_column(0, "a")],
        )
        .into_plan();
        let plan =
            PlanNode::logical_order(Order::new(vec![ColumnOrder::asc(0)]), Bound::limit(5), scan)
                .unwrap();
        let before = PlanNode::clone(&plan);

        let ctx = RuleContext::new(ExecutionTopology::Distributed, &Distributions);
        let first = RuleSet::batch().convert(&plan, Convention::Batch, &ctx);
        let second = RuleSet::batch().convert(&plan, Convention::Batch, &ctx);

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(*plan, before);
        assert_eq!(plan.convention(), Convention::Logical);
    }

    #[test]
    fn candidates_follow_registration_order() {
        let rules = RuleSet::new([
            ConverterRule::BatchOrder(BatchOrderRule),
            ConverterRule::BatchScan(BatchScanRule),
            ConverterRule::BatchOrder(BatchOrderRule),
        ]);
        let key = RuleKey {
            from: Convention::Logical,
            to: Convention::Batch,
            node_type: PlanNodeType::LogicalOrder,
        };
        assert_eq!(
            rules.rules_for(&key),
            &[ConverterRule::BatchOrder(BatchOrderRule); 2]
        );

        let scan = LogicalScan::new(
            TableRefId::new(0, 0),
            vec![DataTypeKind::Int32.not_null().to_column(0, "a")],
        )
        .into_plan();
        let plan =
            PlanNode::logical_order(Order::new(vec![ColumnOrder::desc(0)]), Bound::limit(2), scan)
                .unwrap();
        let ctx = RuleContext::new(ExecutionTopology::Distributed, &Distributions);
        let candidates = rules.convert(&plan, Convention::Batch, &ctx);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], candidates[1]);

        // the driver takes the first candidate and lowers it like the shared rule set does
        let config = Config::distributed();
        let lowered = Lowering::new(&config, &Distributions)
            .unwrap()
            .with_rules(&rules)
            .lower(&plan)
            .unwrap();
        let expected = Lowering::new(&config, &Distributions)
            .unwrap()
            .lower(&plan)
            .unwrap();
        assert_eq!(lowered, expected);
        assert!(lowered.as_physical_limit().is_some());
    }

    #[test]
    fn physical_input_finds_no_rule() {
        let scan = LogicalScan::new(TableRefId::new(0, 0), vec![]);
        let plan = PlanNode::physical_scan(scan, crate::optimizer::property::Distribution::Any);
        let ctx = RuleContext::new(ExecutionTopology::Single, &Distributions);
        assert!(RuleSet::batch()
            .convert(&plan, Convention::Batch, &ctx)
            .is_empty());
    }
}
