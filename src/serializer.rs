// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Serializes a batch plan into the protobuf plan tree of the execution engine.

use prost::Message;

use crate::optimizer::bound::Bound;
use crate::optimizer::plan_nodes::{PlanNode, PlanNodeKind, PlanNodeType};
use crate::optimizer::property::{Direction, Distribution, Order};
use crate::proto;
use crate::proto::plan_node::{Body, PlanNodeType as WireNodeType};
use crate::types::{DataType, DataTypeKind};

/// The error type of plan serialization.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("{0:?} is not a physical plan node")]
    NotPhysical(PlanNodeType),
    #[error("column #{index} is out of range, input has {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },
    #[error("{0:?} has no input")]
    MissingInput(PlanNodeType),
}

/// Resolves the value type of an input column.
pub trait TypeResolver {
    fn column_type(&self, input: &PlanNode, index: usize) -> Result<DataType, SerializeError>;
}

/// Resolves column types from the output schema of the input node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaTypeResolver;

impl TypeResolver for SchemaTypeResolver {
    fn column_type(&self, input: &PlanNode, index: usize) -> Result<DataType, SerializeError> {
        input
            .schema()
            .get(index)
            .map(|column| column.datatype())
            .ok_or(SerializeError::ColumnOutOfRange {
                index,
                columns: input.schema().len(),
            })
    }
}

/// Translates a physical plan tree into wire plan nodes.
pub struct PlanSerializer<'a> {
    resolver: &'a dyn TypeResolver,
}

impl Default for PlanSerializer<'static> {
    fn default() -> Self {
        PlanSerializer {
            resolver: &SchemaTypeResolver,
        }
    }
}

impl<'a> PlanSerializer<'a> {
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        PlanSerializer { resolver }
    }

    /// Serialize `plan` and its whole subtree. Children keep their order.
    pub fn serialize(&self, plan: &PlanNode) -> Result<proto::PlanNode, SerializeError> {
        let children = plan
            .children()
            .iter()
            .map(|child| self.serialize(child))
            .collect::<Result<Vec<_>, _>>()?;
        let (node_type, body) = match plan.kind() {
            PlanNodeKind::PhysicalOrder(node) => {
                let body = proto::OrderByNode {
                    column_orders: self.column_orders(node.order(), plan)?,
                };
                (WireNodeType::OrderBy, Body::OrderBy(body))
            }
            PlanNodeKind::PhysicalTopN(node) => {
                let body = proto::TopNNode {
                    column_orders: self.column_orders(node.order(), plan)?,
                    limit: node.limit() as u64,
                };
                (WireNodeType::TopN, Body::TopN(body))
            }
            PlanNodeKind::PhysicalLimit(node) => {
                (WireNodeType::Limit, Body::Limit(limit_node(node.bound())))
            }
            PlanNodeKind::PhysicalExchange(node) => {
                let dist = distribution(node.distribution(), plan.schema().len())?;
                let body = proto::ExchangeNode {
                    distribution: Some(dist),
                };
                (WireNodeType::Exchange, Body::Exchange(body))
            }
            PlanNodeKind::PhysicalScan(node) => {
                let table = node.table_ref_id();
                let body = proto::ScanNode {
                    schema_id: table.schema_id,
                    table_id: table.table_id,
                    column_ids: node.columns().iter().map(|c| c.id()).collect(),
                };
                (WireNodeType::Scan, Body::Scan(body))
            }
            PlanNodeKind::LogicalScan(_)
            | PlanNodeKind::LogicalOrder(_)
            | PlanNodeKind::Subset(_) => {
                return Err(SerializeError::NotPhysical(plan.node_type()));
            }
        };
        Ok(proto::PlanNode {
            node_type: node_type as i32,
            children,
            body: Some(body),
        })
    }

    /// Serialize `plan` and encode it with protobuf.
    pub fn to_bytes(&self, plan: &PlanNode) -> Result<Vec<u8>, SerializeError> {
        Ok(self.serialize(plan)?.encode_to_vec())
    }

    /// One wire column order per key, in key order, typed against the input of `plan`.
    fn column_orders(
        &self,
        order: &Order,
        plan: &PlanNode,
    ) -> Result<Vec<proto::ColumnOrder>, SerializeError> {
        let input = plan
            .child()
            .ok_or(SerializeError::MissingInput(plan.node_type()))?;
        order
            .keys()
            .iter()
            .map(|key| {
                let return_type = self.resolver.column_type(input, key.column_index)?;
                let column_idx = column_index(key.column_index, input.schema().len())?;
                let order_type = match key.direction {
                    Direction::Ascending => proto::OrderType::Ascending,
                    Direction::Descending => proto::OrderType::Descending,
                };
                Ok(proto::ColumnOrder {
                    order_type: order_type as i32,
                    input_ref: Some(proto::InputRefExpr { column_idx }),
                    return_type: Some(data_type(return_type)),
                })
            })
            .collect()
    }
}

fn limit_node(bound: Bound) -> proto::LimitNode {
    proto::LimitNode {
        offset: bound.offset.map(|v| v as u64),
        limit: bound.limit.map(|v| v as u64),
    }
}

fn distribution(
    dist: &Distribution,
    columns: usize,
) -> Result<proto::Distribution, SerializeError> {
    use proto::distribution::DistributionType;

    let (distribution_type, keys) = match dist {
        Distribution::Any => (DistributionType::Any, vec![]),
        Distribution::Singleton => (DistributionType::Singleton, vec![]),
        Distribution::Hash(keys) => (
            DistributionType::Hash,
            keys.iter()
                .map(|&k| column_index(k, columns))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    Ok(proto::Distribution {
        distribution_type: distribution_type as i32,
        keys,
    })
}

/// A column index on the wire, checked against the `columns` of its input.
fn column_index(index: usize, columns: usize) -> Result<u32, SerializeError> {
    match u32::try_from(index) {
        Ok(idx) if index < columns => Ok(idx),
        _ => Err(SerializeError::ColumnOutOfRange { index, columns }),
    }
}

fn data_type(ty: DataType) -> proto::DataType {
    use proto::TypeName;

    let type_name = match ty.kind() {
        DataTypeKind::Bool => TypeName::Boolean,
        DataTypeKind::Int16 => TypeName::Int16,
        DataTypeKind::Int32 => TypeName::Int32,
        DataTypeKind::Int64 => TypeName::Int64,
        DataTypeKind::Float64 => TypeName::Float64,
        DataTypeKind::Decimal => TypeName::Decimal,
        DataTypeKind::Date => TypeName::Date,
        DataTypeKind::Timestamp => TypeName::Timestamp,
        DataTypeKind::String => TypeName::String,
        DataTypeKind::Blob => TypeName::Blob,
    };
    proto::DataType {
        type_name: type_name as i32,
        is_nullable: ty.is_nullable(),
    }
}
