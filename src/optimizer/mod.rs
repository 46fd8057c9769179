// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Lowering of logical plans into batch physical plans.
//!
//! Conversion rules are registered in a [`RuleSet`](rules::RuleSet). A rule turns one logical
//! node into a physical fragment whose inputs are [`Subset`](plan_nodes::Subset) placeholders,
//! i.e. "this input, converted to these traits". The [`Lowering`] driver resolves the
//! placeholders and inserts exchanges or sorts wherever an input does not meet its requirement.

use serde::{Deserialize, Serialize};

pub mod bound;
mod lowering;
pub mod plan_nodes;
pub mod property;
pub mod rules;

pub use self::lowering::*;
use self::plan_nodes::PlanNodeType;
use self::property::Convention;

/// Where the plan is going to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionTopology {
    /// One process executes the whole plan.
    Single,
    /// Rows are partitioned across workers.
    Distributed,
}

/// Answers which [`ExecutionTopology`] the current compilation targets.
pub trait TopologyOracle {
    fn topology(&self) -> Result<ExecutionTopology, ConfigError>;
}

/// Optimizer configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `None` until the session knows its execution topology.
    pub topology: Option<ExecutionTopology>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            topology: Some(ExecutionTopology::Single),
        }
    }
}

impl Config {
    pub fn single() -> Self {
        Config::default()
    }

    pub fn distributed() -> Self {
        Config {
            topology: Some(ExecutionTopology::Distributed),
        }
    }
}

impl TopologyOracle for Config {
    fn topology(&self) -> Result<ExecutionTopology, ConfigError> {
        self.topology.ok_or(ConfigError::TopologyUnavailable)
    }
}

/// The error type of optimizer configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("execution topology is not available")]
    TopologyUnavailable,
}

/// The error type of lowering.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("column #{index} is out of range, input has {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },
    #[error("no rule converts {node_type:?} to {to:?}")]
    NoConversion {
        node_type: PlanNodeType,
        to: Convention,
    },
}
