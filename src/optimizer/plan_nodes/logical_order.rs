// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::smallvec;

use super::*;
use crate::optimizer::bound::Bound;
use crate::optimizer::PlanError;

/// The logical plan of order, with an optional offset and limit already folded to constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LogicalOrder {
    order: Order,
    bound: Bound,
}

impl LogicalOrder {
    pub fn new(order: Order, bound: Bound) -> Self {
        LogicalOrder { order, bound }
    }

    /// Get a reference to the logical order's ordering key.
    pub fn order(&self) -> &Order {
        &self.order
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
    /// Build a logical order over `child`.
    ///
    /// Every key must refer to a column of the child's output.
    pub fn logical_order(
        order: Order,
        bound: Bound,
        child: PlanRef,
    ) -> Result<PlanRef, PlanError> {
        let columns = child.schema().len();
        if let Some(key) = order.keys().iter().find(|k| k.column_index >= columns) {
            return Err(PlanError::ColumnOutOfRange {
                index: key.column_index,
                columns,
            });
        }
        Ok(PlanNode::new(LogicalOrder::new(order, bound), smallvec![child]))
    }
}

impl Derive for LogicalOrder {
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
        let distribution = children
            .first()
            .map_or(Distribution::Any, |c| c.distribution().clone());
        TraitSet::new(Convention::Logical, distribution, self.order.clone())
    }
}

impl fmt::Display for LogicalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalOrder: {}, {}", self.order, self.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRefId;
    use crate::optimizer::property::ColumnOrder;
    use crate::types::DataTypeKind;

    #[test]
    fn reject_key_outside_schema() {
        let ty = DataTypeKind::Int64.nullable();
        let scan = LogicalScan::new(
            TableRefId::new(0, 0),
            vec![ty.to_column(0, "a"), ty.to_column(1, "b")],
        )
        .into_plan();

        let ok = PlanNode::logical_order(
            Order::new(vec![ColumnOrder::asc(1)]),
            Bound::NONE,
            scan.clone(),
        );
        assert!(ok.is_ok());

        let err = PlanNode::logical_order(
            Order::new(vec![ColumnOrder::asc(0), ColumnOrder::desc(2)]),
            Bound::NONE,
            scan,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlanError::ColumnOutOfRange {
                index: 2,
                columns: 2
            }
        );
    }
}
