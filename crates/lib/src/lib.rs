//! appsetgen-lib: Core types and logic for appsetgen
//!
//! This crate keeps a directory of generated Argo CD ApplicationSet
//! definitions in sync with a promotion policy:
//! - `policy`: loading and validating the promotion policy
//! - `render`: canonical, deterministic ApplicationSet rendering
//! - `definitions`: the generated files currently on disk
//! - `plan`: diffing desired against current state and applying the result

pub mod catalog;
pub mod consts;
pub mod definitions;
pub mod plan;
pub mod policy;
pub mod render;
pub mod settings;
pub mod summary;
pub mod update;
pub mod util;
