//! Graph transformation primitives
//!
//! This module provides the graph surgery used by rewrite callbacks:
//!
//! - [`replace`]: consumer rewiring, node replacement and runtime-info copy
//! - [`fuse`]: group replacement with provenance tracking
//! - [`eliminate`]: bypassing pass-through nodes
//!
//! # Overview
//!
//! All primitives work on a [`Function`](crate::graph::Function) in place and
//! are built from the single edge edit `Function::replace_source_output`.
//! None of them deletes nodes directly; replaced nodes lose their consumers
//! and are released by the pass that ran the rewrite.
//!
//! Callbacks must check every precondition before their first mutation.
//! Nothing here rolls back a partially applied rewrite.
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::transform::replace_node;
//!
//! // Negative(x) -> Multiply(x, -1)
//! let minus_one = f.add_constant(Tensor::scalar(ElementType::F32, -1.0))?;
//! let mul = f.add_node(Multiply::new(), &[x, minus_one])?;
//! replace_node(&mut f, negative, mul)?;
//! ```

pub mod eliminate;
pub mod fuse;
pub mod replace;

// Re-export main functions
pub use eliminate::{can_eliminate, eliminate_node};
pub use fuse::{can_fuse, fuse_nodes, get_fused_names};
pub use replace::{
    copy_runtime_info, replace_node, replace_node_with_outputs, replace_output_update_name,
};
