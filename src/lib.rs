// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Lowers logical ORDER BY / LIMIT plans into batch physical plans, and serializes them into the
//! wire plan tree consumed by the execution engine.

#![deny(unused_must_use)]

pub mod catalog;
pub mod optimizer;
pub mod proto;
pub mod serializer;
pub mod types;

pub use self::optimizer::{Config, ConfigError, ExecutionTopology, Lowering, PlanError};
pub use self::serializer::{PlanSerializer, SerializeError};
