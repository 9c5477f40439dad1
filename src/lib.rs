//! # graph-rewrite
//!
//! Typed computation-graph IR with a structural pattern matcher and a
//! rewrite pass manager.
//!
//! This crate provides the graph-transformation core of an inference
//! compiler: a DAG of typed operations, a matcher that finds subgraph
//! shapes, safe replacement primitives and a manager that drives rewrite
//! rules to a fixpoint.
//!
//! ## Features
//!
//! - **Typed IR**: arena `Function` of operation nodes with element-type and
//!   partial-shape propagation
//! - **Pattern Matching**: wildcard, operation-kind, predicate and `Or`
//!   pattern nodes with explicit bindings
//! - **Graph Surgery**: consumer rewiring, node replacement, fusion and
//!   elimination with runtime-info provenance
//! - **Passes**: matcher passes, grouped graph rewrites, constant folding and
//!   a pass manager with per-run statistics
//!
//! ## Example
//!
//! ```ignore
//! use graph_rewrite::prelude::*;
//! use graph_rewrite::op::Multiply;
//!
//! let mut f = Function::new("model");
//! let x = f.add_parameter(ElementType::F32, [1, 8])?;
//! let c = f.add_constant(Tensor::scalar(ElementType::F32, 0.5))?;
//! let y = f.add_op(Multiply::new(), &[x, c])?;
//! f.add_result(y)?;
//!
//! let mut manager = OptimizationPipeline::default().build();
//! manager.run_passes(&mut f)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod error;
pub mod graph;
pub mod op;
pub mod pass;
pub mod pattern;
pub mod tensor;
pub mod transform;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use graph_rewrite::prelude::*`
///
/// Operation kinds are left out: `op::Result` would shadow `std::result::Result`.
pub mod prelude {
    pub use crate::error::{GraphError, GraphResult, InferError, InferResult};
    pub use crate::graph::{Function, Input, Node, NodeId, Output};
    pub use crate::op::{Op, OpType, TypeInfo};
    pub use crate::pass::{
        FunctionPass, GraphRewrite, Manager, ManagerConfig, MatcherPass, PassConfig,
        RewriteConfig, Validate,
    };
    pub use crate::pattern::{any_input, or, wrap_type, wrap_type_with, MatchResult, Matcher};
    pub use crate::tensor::{Dimension, ElementType, PartialShape, Shape, Tensor, TensorDesc};
    pub use crate::transform::{copy_runtime_info, replace_node, replace_output_update_name};
    pub use crate::transformers::OptimizationPipeline;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{GraphError, GraphResult};
pub use graph::Function;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
