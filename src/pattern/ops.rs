//! Pattern nodes and constructors
//!
//! A pattern is a small DAG of [`Pattern`] nodes rooted at one designated
//! node. Pattern nodes never live in the data graph; they only describe the
//! shape to look for.
//!
//! | Constructor | Matches |
//! |-------------|---------|
//! | [`any_input`] | any value |
//! | [`any_input_with`] | any value accepted by a predicate |
//! | [`wrap_type`] | a value produced by an operation of kind `T` |
//! | [`wrap_types`] | a value produced by one of several kinds |
//! | [`or`] | the first alternative whose local check passes |

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use smallvec::SmallVec;

use crate::error::{GraphError, GraphResult};
use crate::op::{OpType, TypeInfo};

use super::predicates::ValuePredicate;

static NEXT_PATTERN_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a pattern node, the key of a match binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(usize);

/// What a pattern node accepts
pub enum PatternKind {
    /// Wildcard, optionally filtered by a predicate
    Any {
        /// Filter on the candidate value
        predicate: Option<ValuePredicate>,
    },
    /// Operation-kind match with optional input sub-patterns
    ///
    /// With no sub-patterns the candidate's inputs are not inspected;
    /// otherwise their count must equal the candidate's input count.
    WrapType {
        /// Accepted operation kinds
        types: SmallVec<[TypeInfo; 2]>,
        /// Sub-patterns for the candidate's inputs, in order
        inputs: Vec<Pattern>,
        /// Filter on the candidate value
        predicate: Option<ValuePredicate>,
    },
    /// Ordered alternatives, no backtracking once one is chosen
    Or {
        /// Alternatives in priority order
        alternatives: Vec<Pattern>,
    },
}

struct PatternNode {
    id: PatternId,
    kind: PatternKind,
}

/// Shared handle to a pattern node
///
/// Cloning shares the node: using one handle at several places in a pattern
/// requires every occurrence to bind the same value.
#[derive(Clone)]
pub struct Pattern(Rc<PatternNode>);

impl Pattern {
    fn new(kind: PatternKind) -> Self {
        let id = PatternId(NEXT_PATTERN_ID.fetch_add(1, Ordering::Relaxed));
        Pattern(Rc::new(PatternNode { id, kind }))
    }

    /// Identity of this node
    pub fn id(&self) -> PatternId {
        self.0.id
    }

    /// What this node accepts
    pub fn kind(&self) -> &PatternKind {
        &self.0.kind
    }

    /// Sub-patterns of a type-matching node, empty otherwise
    pub fn inputs(&self) -> &[Pattern] {
        match &self.0.kind {
            PatternKind::WrapType { inputs, .. } => inputs,
            _ => &[],
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            PatternKind::Any { predicate } => f
                .debug_struct("Any")
                .field("id", &self.id().0)
                .field("predicate", &predicate.is_some())
                .finish(),
            PatternKind::WrapType {
                types,
                inputs,
                predicate,
            } => f
                .debug_struct("WrapType")
                .field("id", &self.id().0)
                .field("types", types)
                .field("inputs", inputs)
                .field("predicate", &predicate.is_some())
                .finish(),
            PatternKind::Or { alternatives } => f
                .debug_struct("Or")
                .field("id", &self.id().0)
                .field("alternatives", alternatives)
                .finish(),
        }
    }
}

/// Wildcard matching any value
pub fn any_input() -> Pattern {
    Pattern::new(PatternKind::Any { predicate: None })
}

/// Wildcard matching values accepted by `predicate`
pub fn any_input_with(predicate: ValuePredicate) -> Pattern {
    Pattern::new(PatternKind::Any {
        predicate: Some(predicate),
    })
}

/// Match values produced by an operation of kind `T`
pub fn wrap_type<T: OpType>(inputs: Vec<Pattern>) -> Pattern {
    Pattern::new(PatternKind::WrapType {
        types: SmallVec::from_elem(T::TYPE_INFO, 1),
        inputs,
        predicate: None,
    })
}

/// Match values produced by an operation of kind `T` and accepted by `predicate`
pub fn wrap_type_with<T: OpType>(inputs: Vec<Pattern>, predicate: ValuePredicate) -> Pattern {
    Pattern::new(PatternKind::WrapType {
        types: SmallVec::from_elem(T::TYPE_INFO, 1),
        inputs,
        predicate: Some(predicate),
    })
}

/// Match values produced by any of `types`
///
/// An empty type union can never match and is rejected.
pub fn wrap_types(
    types: &[TypeInfo],
    inputs: Vec<Pattern>,
    predicate: Option<ValuePredicate>,
) -> GraphResult<Pattern> {
    if types.is_empty() {
        return Err(GraphError::UnsupportedPattern(
            "type union without any operation type".to_string(),
        ));
    }
    Ok(Pattern::new(PatternKind::WrapType {
        types: types.iter().copied().collect(),
        inputs,
        predicate,
    }))
}

/// Ordered alternatives
///
/// An empty alternative set is rejected.
pub fn or(alternatives: Vec<Pattern>) -> GraphResult<Pattern> {
    if alternatives.is_empty() {
        return Err(GraphError::UnsupportedPattern(
            "Or pattern without alternatives".to_string(),
        ));
    }
    Ok(Pattern::new(PatternKind::Or { alternatives }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Add, Multiply};

    #[test]
    fn test_ids_are_unique() {
        let a = any_input();
        let b = any_input();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_wrap_type_records_inputs() {
        let x = any_input();
        let m = wrap_type::<Multiply>(vec![x.clone(), any_input()]);
        assert_eq!(m.inputs().len(), 2);
        assert_eq!(m.inputs()[0].id(), x.id());
        assert!(x.inputs().is_empty());
    }

    #[test]
    fn test_empty_unions_rejected() {
        assert!(matches!(
            or(vec![]),
            Err(GraphError::UnsupportedPattern(_))
        ));
        assert!(matches!(
            wrap_types(&[], vec![], None),
            Err(GraphError::UnsupportedPattern(_))
        ));
        assert!(wrap_types(&[Add::TYPE_INFO, Multiply::TYPE_INFO], vec![], None).is_ok());
    }
}
