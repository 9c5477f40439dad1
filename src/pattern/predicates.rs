//! Value predicates for pattern nodes
//!
//! A predicate inspects one candidate value in the context of its function.
//! Predicates are read-only and are evaluated during matching, so they see
//! the consumer counts and cached shapes of the current graph state.

use std::rc::Rc;

use crate::graph::{Function, Output};
use crate::tensor::{Dimension, ElementType};

/// Predicate on a candidate value
pub type ValuePredicate = Rc<dyn Fn(&Function, Output) -> bool>;

/// Wrap a closure as a predicate
pub fn predicate(f: impl Fn(&Function, Output) -> bool + 'static) -> ValuePredicate {
    Rc::new(f)
}

/// Value has exactly `n` consumers
pub fn consumers_count(n: usize) -> ValuePredicate {
    predicate(move |f, v| f.consumer_count(v) == n)
}

/// Value has a fully static shape
pub fn has_static_shape() -> ValuePredicate {
    predicate(|f, v| f.partial_shape(v).map(|s| s.is_static()).unwrap_or(false))
}

/// Value has a known rank
pub fn has_static_rank() -> ValuePredicate {
    predicate(|f, v| {
        f.partial_shape(v)
            .map(|s| s.is_rank_static())
            .unwrap_or(false)
    })
}

/// Dimension `pos` of the value is known
pub fn has_static_dim(pos: usize) -> ValuePredicate {
    has_static_dims(&[pos])
}

/// Every dimension in `positions` is known
pub fn has_static_dims(positions: &[usize]) -> ValuePredicate {
    let positions = positions.to_vec();
    predicate(move |f, v| {
        let Ok(shape) = f.partial_shape(v) else {
            return false;
        };
        positions
            .iter()
            .all(|&pos| shape.dim(pos).is_some_and(Dimension::is_static))
    })
}

/// Value has rank `n`
pub fn rank_equals(n: usize) -> ValuePredicate {
    predicate(move |f, v| f.partial_shape(v).map(|s| s.rank() == Some(n)).unwrap_or(false))
}

/// Dimension `pos` of the value is statically `len`
pub fn dim_equals(pos: usize, len: usize) -> ValuePredicate {
    predicate(move |f, v| {
        f.partial_shape(v)
            .map(|s| s.dim(pos) == Some(Dimension::Static(len)))
            .unwrap_or(false)
    })
}

/// Value has element type `et`
pub fn type_matches(et: ElementType) -> ValuePredicate {
    predicate(move |f, v| f.element_type(v).map(|t| t == et).unwrap_or(false))
}

/// Value has one of `types`
pub fn type_matches_any(types: &[ElementType]) -> ValuePredicate {
    let types = types.to_vec();
    predicate(move |f, v| {
        f.element_type(v)
            .map(|t| types.contains(&t))
            .unwrap_or(false)
    })
}

/// Every predicate accepts
pub fn all_of(predicates: Vec<ValuePredicate>) -> ValuePredicate {
    predicate(move |f, v| predicates.iter().all(|p| p(f, v)))
}

/// At least one predicate accepts
pub fn any_of(predicates: Vec<ValuePredicate>) -> ValuePredicate {
    predicate(move |f, v| predicates.iter().any(|p| p(f, v)))
}
