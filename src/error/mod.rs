//! Error types for graph-rewrite
//!
//! This module defines all error types used throughout the crate.
//!
//! A failed pattern match is never an error: the matcher returns `None`.
//! Everything here is a hard failure that aborts the current pass-manager run.

use thiserror::Error;

use crate::graph::NodeId;

/// Which side of a node an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// An input (consumer) port
    Input,
    /// An output (producer) port
    Output,
}

impl std::fmt::Display for PortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortKind::Input => f.write_str("input"),
            PortKind::Output => f.write_str("output"),
        }
    }
}

/// Main error type for graph construction, inference and rewriting
#[derive(Error, Debug)]
pub enum GraphError {
    /// An edit would break the single-producer invariant or the graph boundary
    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    /// Out-of-range port access on a node
    #[error("Index out of range: {kind} {index} of {node} (node has {size})")]
    IndexOutOfRange {
        /// Description of the node
        node: String,
        /// Port side
        kind: PortKind,
        /// Requested index
        index: usize,
        /// Number of ports of that kind
        size: usize,
    },

    /// Handle refers to a node that is not (or no longer) part of the graph
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Output arity or dimension mismatch
    #[error("Shape mismatch at {node}: {message}")]
    ShapeMismatch {
        /// Description of the node
        node: String,
        /// What went wrong
        message: String,
    },

    /// Incompatible element types
    #[error("Type mismatch at {node}: {message}")]
    TypeMismatch {
        /// Description of the node
        node: String,
        /// What went wrong
        message: String,
    },

    /// Any other static precondition of an operation
    #[error("Validation failed at {node}: {message}")]
    ValidationFailed {
        /// Description of the node
        node: String,
        /// What went wrong
        message: String,
    },

    /// The pattern cannot be evaluated by the matcher
    #[error("Unsupported pattern: {0}")]
    UnsupportedPattern(String),

    /// A pass aborted the run
    #[error("Pass `{pass}` failed: {source}")]
    PassFailed {
        /// Name of the failing pass
        pass: String,
        /// Underlying error
        #[source]
        source: Box<GraphError>,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GraphError {
    /// Whether this error belongs to the structural-violation class
    pub fn is_structural(&self) -> bool {
        match self {
            GraphError::StructuralViolation(_)
            | GraphError::IndexOutOfRange { .. }
            | GraphError::NodeNotFound(_) => true,
            GraphError::PassFailed { source, .. } => source.is_structural(),
            _ => false,
        }
    }

    /// Innermost error, looking through `PassFailed` wrappers
    pub fn root_cause(&self) -> &GraphError {
        match self {
            GraphError::PassFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Attach node context to an operation-local inference error
    pub fn from_infer(node: impl Into<String>, err: InferError) -> Self {
        let node = node.into();
        match err {
            InferError::Shape(message) => GraphError::ShapeMismatch { node, message },
            InferError::Type(message) => GraphError::TypeMismatch { node, message },
            InferError::Invalid(message) => GraphError::ValidationFailed { node, message },
        }
    }
}

/// Error raised by an operation's local inference rule
///
/// Carries no node context; the graph adds it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferError {
    /// Incompatible ranks or dimensions
    #[error("{0}")]
    Shape(String),

    /// Incompatible element types
    #[error("{0}")]
    Type(String),

    /// Bad attribute or input count
    #[error("{0}")]
    Invalid(String),
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for operation-local inference
pub type InferResult<T> = Result<T, InferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::UnsupportedPattern("empty Or".to_string());
        assert!(err.to_string().contains("empty Or"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = GraphError::IndexOutOfRange {
            node: "Multiply_3".to_string(),
            kind: PortKind::Output,
            index: 2,
            size: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("output 2"));
        assert!(msg.contains("Multiply_3"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_from_infer_maps_kinds() {
        let err = GraphError::from_infer("Add_1", InferError::Type("f32 vs i64".to_string()));
        assert!(matches!(err, GraphError::TypeMismatch { .. }));

        let err = GraphError::from_infer("Add_1", InferError::Shape("rank".to_string()));
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_pass_failed_root_cause() {
        let err = GraphError::PassFailed {
            pass: "Fuse".to_string(),
            source: Box::new(GraphError::StructuralViolation("self loop".to_string())),
        };
        assert!(err.is_structural());
        assert!(matches!(
            err.root_cause(),
            GraphError::StructuralViolation(_)
        ));
        assert!(err.to_string().contains("Fuse"));
    }
}
