// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Physical properties of a plan node: convention, distribution and order.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The calling convention a plan node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Convention {
    /// Describes what to compute. No execution strategy has been chosen.
    Logical,
    /// Executable by the batch engine.
    Batch,
}

/// How rows are partitioned across execution workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    /// No requirement, or unknown partitioning.
    Any,
    /// All rows live in one place.
    Singleton,
    /// Rows are bucketed by the hash of these columns.
    Hash(SmallVec<[usize; 4]>),
}

impl Distribution {
    /// Returns true if data with distribution `self` can be consumed where `required` is needed.
    pub fn satisfies(&self, required: &Distribution) -> bool {
        match (self, required) {
            (_, Distribution::Any) => true,
            (Distribution::Singleton, _) => true,
            // rows equal on the required keys are equal on any subset of them
            (Distribution::Hash(keys), Distribution::Hash(required)) => {
                !keys.is_empty() && keys.iter().all(|k| required.contains(k))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Singleton => write!(f, "single"),
            Self::Hash(keys) => {
                write!(f, "hash({})", keys.iter().map(|k| format!("#{k}")).join(", "))
            }
        }
    }
}

/// Builds canonical distribution values.
pub trait DistributionFactory: Send + Sync {
    /// Hash distribution over `columns`, in key order with duplicates removed.
    fn hash(&self, columns: &[usize]) -> Distribution;

    fn singleton(&self) -> Distribution;
}

/// The default [`DistributionFactory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Distributions;

impl DistributionFactory for Distributions {
    fn hash(&self, columns: &[usize]) -> Distribution {
        Distribution::Hash(columns.iter().copied().unique().collect())
    }

    fn singleton(&self) -> Distribution {
        Distribution::Singleton
    }
}

/// Sort direction of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// One entry of an ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnOrder {
    pub column_index: usize,
    pub direction: Direction,
}

impl ColumnOrder {
    pub const fn asc(column_index: usize) -> Self {
        ColumnOrder {
            column_index,
            direction: Direction::Ascending,
        }
    }

    pub const fn desc(column_index: usize) -> Self {
        ColumnOrder {
            column_index,
            direction: Direction::Descending,
        }
    }
}

impl fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.column_index, self.direction)
    }
}

/// An ordering key. The empty key means "no particular order".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    keys: Vec<ColumnOrder>,
}

impl Order {
    pub fn new(keys: Vec<ColumnOrder>) -> Self {
        Order { keys }
    }

    /// No ordering.
    pub fn any() -> Self {
        Order::default()
    }

    pub fn keys(&self) -> &[ColumnOrder] {
        &self.keys
    }

    pub fn is_any(&self) -> bool {
        self.keys.is_empty()
    }

    /// Column indices of the keys, in key order.
    pub fn column_indices(&self) -> Vec<usize> {
        self.keys.iter().map(|k| k.column_index).collect()
    }

    /// Returns true if rows ordered by `self` are also ordered by `required`.
    pub fn satisfies(&self, required: &Order) -> bool {
        self.keys.starts_with(&required.keys)
    }
}

impl From<Vec<ColumnOrder>> for Order {
    fn from(keys: Vec<ColumnOrder>) -> Self {
        Order::new(keys)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.keys.iter().join(", "))
    }
}

/// The trait set of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitSet {
    pub convention: Convention,
    pub distribution: Distribution,
    pub order: Order,
}

impl TraitSet {
    pub fn new(convention: Convention, distribution: Distribution, order: Order) -> Self {
        TraitSet {
            convention,
            distribution,
            order,
        }
    }

    /// Logical convention, no distribution or order.
    pub fn logical() -> Self {
        Self::new(Convention::Logical, Distribution::Any, Order::any())
    }

    /// Batch convention with the given distribution and no order.
    pub fn batch(distribution: Distribution) -> Self {
        Self::new(Convention::Batch, distribution, Order::any())
    }

    #[must_use]
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    #[must_use]
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Returns true if a node with traits `self` meets the `required` traits.
    pub fn satisfies(&self, required: &TraitSet) -> bool {
        self.convention == required.convention
            && self.distribution.satisfies(&required.distribution)
            && self.order.satisfies(&required.order)
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.{}", self.convention, self.distribution)?;
        if !self.order.is_any() {
            write!(f, ".{}", self.order)?;
        }
        Ok(())
    }
}
