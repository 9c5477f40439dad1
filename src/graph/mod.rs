//! Graph data model
//!
//! This module provides the IR the matcher and passes operate on:
//!
//! - [`Function`]: arena-backed graph container with a Parameter/Result boundary
//! - [`Node`]: one operation plus its edges, cached output descriptions and
//!   runtime info
//! - [`Output`] / [`Input`]: `Copy` `(NodeId, index)` handles for the two ends
//!   of an edge
//!
//! # Overview
//!
//! Edges are stored on both sides: every input records its single source
//! `Output`, every output slot records its live consumer `Input`s. The only
//! primitive edge edit, [`Function::replace_source_output`], keeps the two
//! sides in sync.
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::graph::Function;
//! use graph_rewrite::op::{Multiply, Relu};
//! use graph_rewrite::tensor::{ElementType, Tensor};
//!
//! let mut f = Function::new("model");
//! let x = f.add_parameter(ElementType::F32, [1, 8])?;
//! let half = f.add_constant(Tensor::scalar(ElementType::F32, 0.5))?;
//! let y = f.add_op(Multiply::new(), &[x, half])?;
//! let y = f.add_op(Relu::new(), &[y])?;
//! f.add_result(y)?;
//!
//! for id in f.get_ordered_ops() {
//!     println!("{}", f.node(id)?.name());
//! }
//! ```
//!
//! # Liveness
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `release_unused` | consumer-count drop, cascading to producers |
//! | `collect_garbage` | sweep of everything unreachable from the boundary |

pub mod accessors;
pub mod function;
pub mod infer;
pub mod mutators;
pub mod node;
pub mod rt_info;
pub mod traversal;

// Re-export main types
pub use function::Function;
pub use node::{Input, Node, NodeId, Output, OutputSlot};
pub use rt_info::{merge_rt_info, union_fused_names, RtInfo, RtValue, FUSED_NAMES};
pub use traversal::reachable_from;
