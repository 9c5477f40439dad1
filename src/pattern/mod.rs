//! Pattern matching module
//!
//! This module provides tools for describing subgraph shapes and finding them
//! in a [`Function`](crate::graph::Function), which is the first half of every
//! rewrite.
//!
//! # Overview
//!
//! The pattern matching system works by:
//! 1. Building a pattern DAG from wildcards, operation-kind matchers and `Or`
//!    alternatives ([`ops`])
//! 2. Optionally attaching value predicates ([`predicates`])
//! 3. Matching the pattern root against a candidate value and descending into
//!    its producers ([`Matcher`])
//!
//! A failed match is `None`, never an error.
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::op::{Constant, Multiply};
//! use graph_rewrite::pattern::{any_input, wrap_type, Matcher};
//!
//! let x = any_input();
//! let scale = wrap_type::<Constant>(vec![]);
//! let matcher = Matcher::new(wrap_type::<Multiply>(vec![x.clone(), scale.clone()]), "scale");
//!
//! if let Some(m) = matcher.match_node(&function, node) {
//!     println!("scaled value: {}", m.get(&x).unwrap());
//! }
//! ```

pub mod matcher;
pub mod ops;
pub mod predicates;

// Re-export main types
pub use matcher::{MatchResult, Matcher};
pub use ops::{
    any_input, any_input_with, or, wrap_type, wrap_type_with, wrap_types, Pattern, PatternId,
    PatternKind,
};
pub use predicates::{
    all_of, any_of, consumers_count, dim_equals, has_static_dim, has_static_dims,
    has_static_rank, has_static_shape, predicate, rank_equals, type_matches, type_matches_any,
    ValuePredicate,
};
