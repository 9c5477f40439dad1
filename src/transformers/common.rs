//! Common utilities for transformers
//!
//! Shared helper functions used across multiple transformers.

use crate::graph::{Function, NodeId, Output};
use crate::tensor::Tensor;

/// Constant value feeding input `index` of `node`, if any
pub fn constant_input(func: &Function, node: NodeId, index: usize) -> Option<&Tensor> {
    let source = func.node(node).ok()?.input_value(index).ok()?;
    func.constant_value(source)
}

/// Check if `value` is a `Constant` whose elements all equal `v`
pub fn is_constant_filled_with(func: &Function, value: Output, v: f64) -> bool {
    func.constant_value(value).is_some_and(|t| t.all_equal(v))
}

/// Input of a binary `node` that passes through unchanged
///
/// Returns the index of the data input when the other input is a constant
/// filled with `identity` and the node's output description equals the data
/// input's, i.e. broadcasting against the constant keeps the shape.
pub fn identity_operand(func: &Function, node: NodeId, identity: f64) -> Option<usize> {
    let n = func.node(node).ok()?;
    if n.input_size() != 2 || n.output_size() != 1 {
        return None;
    }
    let out = func.output_desc(n.output(0).ok()?).ok()?;

    (0..2).find(|&data| {
        let other = n.input_values()[1 - data];
        let data_value = n.input_values()[data];
        is_constant_filled_with(func, other, identity)
            && func.output_desc(data_value).is_ok_and(|desc| desc == out)
    })
}

/// Friendly name of output `index` of a folded node with `count` outputs
pub fn folded_name(base: &str, index: usize, count: usize) -> String {
    if count == 1 {
        base.to_string()
    } else {
        format!("{}.{}", base, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Add, Multiply};
    use crate::tensor::{Dimension, ElementType, PartialShape};

    #[test]
    fn test_identity_operand_either_side() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [2, 3]).unwrap();
        let one = f.add_constant(Tensor::scalar(ElementType::F32, 1.0)).unwrap();
        let lhs = f.add_op(Multiply::new(), &[p, one]).unwrap();
        let rhs = f.add_op(Multiply::new(), &[one, p]).unwrap();

        assert_eq!(identity_operand(&f, lhs.node, 1.0), Some(0));
        assert_eq!(identity_operand(&f, rhs.node, 1.0), Some(1));
        assert_eq!(identity_operand(&f, lhs.node, 0.0), None);
    }

    #[test]
    fn test_identity_operand_rejects_broadcast() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let zeros = f.add_constant(Tensor::filled(ElementType::F32, [2, 3], 0.0)).unwrap();
        let sum = f.add_op(Add::new(), &[p, zeros]).unwrap();
        assert_eq!(identity_operand(&f, sum.node, 0.0), None);

        let d = f
            .add_parameter(
                ElementType::F32,
                PartialShape::from([Dimension::Dynamic, Dimension::Static(3)]),
            )
            .unwrap();
        let zero = f.add_constant(Tensor::scalar(ElementType::F32, 0.0)).unwrap();
        let sum = f.add_op(Add::new(), &[d, zero]).unwrap();
        assert_eq!(identity_operand(&f, sum.node, 0.0), Some(0));
    }

    #[test]
    fn test_folded_name() {
        assert_eq!(folded_name("add", 0, 1), "add");
        assert_eq!(folded_name("split", 1, 2), "split.1");
    }
}
