// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Protobuf messages of the batch plan, generated from `plan.proto`.

#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/batch_plan.rs"));
