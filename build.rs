// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

extern crate prost_build;

fn main() {
    println!("cargo:rerun-if-changed=src/proto/plan.proto");
    // parse with protox so that no `protoc` binary is needed
    let file_descriptors = protox::compile(["plan.proto"], ["src/proto"]).unwrap();
    prost_build::compile_fds(file_descriptors).unwrap();
}
