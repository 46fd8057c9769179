// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Defines all plan nodes and provides tools to visit plan tree.
//!
//! A plan node is a [`PlanNodeKind`] payload plus the node's trait set, its output schema and
//! its children. Nodes are immutable once built. Rewriting a plan means building new nodes over
//! new children, sharing every subtree that did not change.
//!
//! To add a new plan node, create a payload struct implementing [`Derive`] and `Display`, then
//! list it in [`for_all_plan_nodes`].

use std::fmt;
use std::sync::Arc;

use paste::paste;
use serde::Serialize;
use smallvec::SmallVec;

use super::property::{Convention, Distribution, Order, TraitSet};
use crate::catalog::Schema;

mod logical_order;
mod logical_scan;
mod physical_exchange;
mod physical_limit;
mod physical_order;
mod physical_scan;
mod physical_top_n;
mod subset;

pub use logical_order::*;
pub use logical_scan::*;
pub use physical_exchange::*;
pub use physical_limit::*;
pub use physical_order::*;
pub use physical_scan::*;
pub use physical_top_n::*;
pub use subset::*;

/// The type of reference to a plan node.
pub type PlanRef = Arc<PlanNode>;

/// Children of a plan node, in fixed order.
pub type PlanChildren = SmallVec<[PlanRef; 2]>;

/// Derives the trait set of a node from its payload and children.
pub trait Derive {
    fn derive_traits(&self, children: &[PlanRef]) -> TraitSet;

    /// Output schema. Defaults to the schema of the first child.
    fn derive_schema(&self, children: &[PlanRef]) -> Schema {
        children
            .first()
            .map(|c| c.schema().clone())
            .unwrap_or_else(|| Arc::new([]))
    }
}

/// All plan nodes.
///
/// You can use it as follows:
///
/// ```rust
/// macro_rules! use_plan {
///     ([], $($node_name:ident),*) => {};
/// }
/// batch_planner::for_all_plan_nodes! { use_plan }
/// ```
#[macro_export]
macro_rules! for_all_plan_nodes {
    ($macro:tt $(, $x:tt)*) => {
        $macro! {
            [$($x),*],
            LogicalScan,
            LogicalOrder,
            Subset,
            PhysicalScan,
            PhysicalOrder,
            PhysicalTopN,
            PhysicalLimit,
            PhysicalExchange
        }
    };
}

macro_rules! def_plan_node_kind {
    ([], $($node_name:ident),*) => {
        /// The payload of a plan node.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        pub enum PlanNodeKind {
            $( $node_name($node_name) ),*
        }

        /// Each enum value represents a [`PlanNodeKind`] variant, used as a dispatch key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum PlanNodeType {
            $( $node_name ),*
        }

        impl PlanNodeKind {
            pub fn node_type(&self) -> PlanNodeType {
                match self {
                    $( Self::$node_name(_) => PlanNodeType::$node_name ),*
                }
            }

            fn derive_traits(&self, children: &[PlanRef]) -> TraitSet {
                match self {
                    $( Self::$node_name(node) => node.derive_traits(children) ),*
                }
            }

            fn derive_schema(&self, children: &[PlanRef]) -> Schema {
                match self {
                    $( Self::$node_name(node) => node.derive_schema(children) ),*
                }
            }
        }

        impl fmt::Display for PlanNodeKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Self::$node_name(node) => write!(f, "{node}") ),*
                }
            }
        }

        $(impl From<$node_name> for PlanNodeKind {
            fn from(node: $node_name) -> Self {
                Self::$node_name(node)
            }
        })*

        impl PlanNode {
            $(
                paste! {
                    pub fn [<as_ $node_name:snake>](&self) -> Option<&$node_name> {
                        match &self.kind {
                            PlanNodeKind::$node_name(node) => Some(node),
                            _ => None,
                        }
                    }
                }
            )*
        }
    }
}
for_all_plan_nodes! { def_plan_node_kind }

/// A node in the plan tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlanNode {
    kind: PlanNodeKind,
    traits: TraitSet,
    schema: Schema,
    children: PlanChildren,
}

impl PlanNode {
    /// Build a node, deriving its traits and schema from the payload and children.
    pub fn new(kind: impl Into<PlanNodeKind>, children: PlanChildren) -> PlanRef {
        let kind = kind.into();
        let traits = kind.derive_traits(&children);
        let schema = kind.derive_schema(&children);
        Arc::new(PlanNode {
            kind,
            traits,
            schema,
            children,
        })
    }

    pub fn kind(&self) -> &PlanNodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> PlanNodeType {
        self.kind.node_type()
    }

    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    pub fn convention(&self) -> Convention {
        self.traits.convention
    }

    pub fn distribution(&self) -> &Distribution {
        &self.traits.distribution
    }

    pub fn order(&self) -> &Order {
        &self.traits.order
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn children(&self) -> &[PlanRef] {
        &self.children
    }

    /// The only child of a unary node.
    pub fn child(&self) -> Option<&PlanRef> {
        match self.children.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }

    /// Returns true if the node's traits meet the `required` traits.
    pub fn satisfies(&self, required: &TraitSet) -> bool {
        self.traits.satisfies(required)
    }

    /// Clone the node with a list of new children, re-deriving traits and schema.
    pub fn clone_with_children(&self, children: PlanChildren) -> PlanRef {
        assert_eq!(children.len(), self.children.len());
        PlanNode::new(self.kind.clone(), children)
    }

    /// Clone the node with new children and an explicit trait set.
    pub fn copy_with(&self, children: PlanChildren, traits: TraitSet) -> PlanRef {
        assert_eq!(children.len(), self.children.len());
        let schema = self.kind.derive_schema(&children);
        Arc::new(PlanNode {
            kind: self.kind.clone(),
            traits,
            schema,
            children,
        })
    }

    /// Write explain string of the plan.
    pub fn explain(&self, level: usize, f: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(
            f,
            "{}{} {{{}}}",
            " ".repeat(level * 2),
            self.kind,
            self.traits
        )?;
        for child in &self.children {
            child.explain(level + 1, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.explain(0, f)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use smallvec::smallvec;

    use super::*;
    use crate::catalog::TableRefId;
    use crate::optimizer::bound::Bound;
    use crate::optimizer::property::ColumnOrder;
    use crate::types::DataTypeKind;

    fn scan() -> PlanRef {
        let ty = DataTypeKind::Int32.not_null();
        LogicalScan::new(
            TableRefId::new(0, 1),
            vec![ty.to_column(1, "v1"), ty.to_column(2, "v2")],
        )
        .into_plan()
    }

    #[test]
    fn node_type_and_downcast() {
        let scan = scan();
        assert_eq!(scan.node_type(), PlanNodeType::LogicalScan);
        assert!(scan.as_logical_scan().is_some());
        assert!(scan.as_logical_order().is_none());
        assert!(scan.child().is_none());
    }

    #[test]
    fn copy_with_does_not_touch_receiver() {
        let order = Order::new(vec![ColumnOrder::asc(0)]);
        let child = scan();
        let sort = PlanNode::new(PhysicalOrder::new(order.clone()), smallvec![child.clone()]);
        let before = PlanNode::clone(&sort);

        let traits = TraitSet::batch(Distribution::Singleton).with_order(order);
        let copied = sort.copy_with(smallvec![child.clone()], traits.clone());

        assert_eq!(copied.traits(), &traits);
        assert_eq!(*sort, before);
        // the child is shared, not copied
        assert!(Arc::ptr_eq(&copied.children()[0], &child));
        assert!(Arc::ptr_eq(copied.schema(), child.schema()));
    }

    #[test]
    fn explain() {
        let child = scan();
        let order = Order::new(vec![ColumnOrder::desc(1)]);
        let plan = PlanNode::logical_order(order, Bound::limit(3), child).unwrap();
        let mut out = String::new();
        plan.explain(0, &mut out).unwrap();
        assert_eq!(
            out,
            indoc! {"
                LogicalOrder: [#1 desc], offset: none, limit: 3 {Logical.any.[#1 desc]}
                  LogicalScan: $0.1, columns: [v1, v2] {Logical.any}
            "}
        );
    }

    #[test]
    fn serialize_to_json() {
        let order = Order::new(vec![ColumnOrder::desc(1)]);
        let plan = PlanNode::logical_order(order, Bound::new(Some(0), None), scan()).unwrap();
        let json = serde_json::to_value(&*plan).unwrap();

        let payload = &json["kind"]["LogicalOrder"];
        assert_eq!(
            payload["order"]["keys"],
            serde_json::json!([{ "column_index": 1, "direction": "Descending" }])
        );
        assert_eq!(payload["bound"], serde_json::json!({ "offset": 0, "limit": null }));
        assert_eq!(json["traits"]["convention"], "Logical");
        assert_eq!(json["traits"]["distribution"], "Any");
        assert_eq!(json["schema"][1]["name"], "v2");

        let child = &json["children"][0];
        assert_eq!(child["kind"]["LogicalScan"]["table_ref_id"]["table_id"], 1);
        assert_eq!(child["children"], serde_json::json!([]));
    }
}
