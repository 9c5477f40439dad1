//! Fuse Multiply-by-constant chains
//!
//! ```text
//! x -> Multiply(C1) -> Multiply(C2)   =>   x -> Multiply(C1 * C2)
//! ```
//!
//! The inner Multiply must have no other consumer. Running to fixpoint
//! collapses a whole chain into one node.

use crate::error::GraphResult;
use crate::graph::{Function, NodeId, Output};
use crate::op::elementwise::infer_binary_arithmetic;
use crate::op::{Constant, Multiply};
use crate::pass::{FunctionPass, MatcherPass, PassConfig};
use crate::pattern::{any_input, consumers_count, wrap_type, wrap_type_with, MatchResult, Matcher};
use crate::tensor::TensorDesc;
use crate::transform::fuse_nodes;

/// Matcher pass folding two constant scales into one
#[derive(Debug)]
pub struct FuseMultiplyConstants(MatcherPass);

impl FuseMultiplyConstants {
    /// Create the pass
    pub fn new() -> Self {
        let x = any_input();
        let c1 = wrap_type::<Constant>(vec![]);
        let inner = wrap_type_with::<Multiply>(vec![x.clone(), c1.clone()], consumers_count(1));
        let c2 = wrap_type::<Constant>(vec![]);
        let root = wrap_type::<Multiply>(vec![inner.clone(), c2.clone()]);

        let matcher = Matcher::new(root, "FuseMultiplyConstants");
        Self(MatcherPass::new(matcher, move |func, m| {
            let (Some(x), Some(c1), Some(c2), Some(inner)) =
                (m.get(&x), m.get(&c1), m.get(&c2), m.node(&inner))
            else {
                return Ok(false);
            };
            fuse(func, m, x, c1, c2, inner)
        }))
    }

    /// The underlying rule, for grouping in a `GraphRewrite`
    pub fn into_matcher(self) -> MatcherPass {
        self.0
    }
}

impl Default for FuseMultiplyConstants {
    fn default() -> Self {
        Self::new()
    }
}

fn fuse(
    func: &mut Function,
    m: &MatchResult,
    x: Output,
    c1: Output,
    c2: Output,
    inner: NodeId,
) -> GraphResult<bool> {
    let root = m.root_node();
    let (Some(lhs), Some(rhs)) = (func.constant_value(c1), func.constant_value(c2)) else {
        return Ok(false);
    };
    let (Some(inner_op), Some(root_op)) =
        (func.op_as::<Multiply>(inner), func.op_as::<Multiply>(root))
    else {
        return Ok(false);
    };
    if inner_op.auto_broadcast != root_op.auto_broadcast {
        return Ok(false);
    }
    let broadcast = root_op.auto_broadcast;

    let Some(element_type) = lhs.element_type().merge(rhs.element_type()) else {
        return Ok(false);
    };
    let Some(scale) = lhs.zip_broadcast(rhs, element_type, |a, b| a * b) else {
        return Ok(false);
    };

    // The fused node must produce exactly what the chain produced
    let fused_desc = infer_binary_arithmetic(
        &[
            func.output_desc(x)?.clone(),
            TensorDesc::new(element_type, scale.partial_shape()),
        ],
        broadcast,
    );
    let expected = func.output_desc(m.root_value())?;
    if !fused_desc.is_ok_and(|descs| descs.first() == Some(expected)) {
        return Ok(false);
    }

    let scale = func.add_constant(scale)?;
    let fused = func.add_node(Multiply::with_broadcast(broadcast), &[x, scale])?;
    fuse_nodes(func, &[inner, root], root, fused)?;
    Ok(true)
}

impl FunctionPass for FuseMultiplyConstants {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
        self.0.run_on_function(func)
    }

    fn set_pass_config(&mut self, config: &PassConfig) {
        self.0.set_pass_config(config);
    }
}
