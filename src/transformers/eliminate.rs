//! Elimination transformers
//!
//! Rules that bypass operations which leave their input unchanged.

use crate::error::GraphResult;
use crate::graph::Function;
use crate::op::{Add, Convert, Multiply, OpType};
use crate::pass::{FunctionPass, GraphRewrite, MatcherPass, PassConfig};
use crate::pattern::{any_input, wrap_type, Matcher};
use crate::transform::eliminate_node;

use super::common::identity_operand;

/// `Convert` to the element type its input already has
pub fn eliminate_convert() -> MatcherPass {
    let x = any_input();
    let root = wrap_type::<Convert>(vec![x.clone()]);
    MatcherPass::new(Matcher::new(root, "EliminateConvert"), move |func, m| {
        let (Some(x), Some(convert)) = (m.get(&x), func.op_as::<Convert>(m.root_node())) else {
            return Ok(false);
        };
        if func.element_type(x)? != convert.destination {
            return Ok(false);
        }
        eliminate_node(func, m.root_node(), 0)
    })
}

/// `Multiply` by a constant of ones that does not broadcast the other side
pub fn eliminate_multiply_by_one() -> MatcherPass {
    identity_rule::<Multiply>("EliminateMultiplyByOne", 1.0)
}

/// `Add` of a constant of zeros that does not broadcast the other side
pub fn eliminate_add_zero() -> MatcherPass {
    identity_rule::<Add>("EliminateAddZero", 0.0)
}

fn identity_rule<T: OpType>(name: &str, identity: f64) -> MatcherPass {
    // Operand order is checked in the callback so both sides are covered
    let root = wrap_type::<T>(vec![]);
    MatcherPass::new(Matcher::new(root, name), move |func, m| {
        match identity_operand(func, m.root_node(), identity) {
            Some(data) => eliminate_node(func, m.root_node(), data),
            None => Ok(false),
        }
    })
}

/// Graph rewrite removing no-op operations
///
/// Bypassing a node that feeds a `Result` is refused when it would wire the
/// `Result` straight to a `Parameter` or steal the name of a shared value.
#[derive(Debug)]
pub struct NopElimination(GraphRewrite);

impl NopElimination {
    /// Create the rewrite with every elimination rule
    pub fn new() -> Self {
        Self(
            GraphRewrite::new("NopElimination")
                .with_matcher(eliminate_convert())
                .with_matcher(eliminate_multiply_by_one())
                .with_matcher(eliminate_add_zero()),
        )
    }
}

impl Default for NopElimination {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionPass for NopElimination {
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
