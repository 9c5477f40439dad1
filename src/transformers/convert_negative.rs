//! Decompose Negative into a Multiply
//!
//! ```text
//! Negative(x)   =>   Multiply(x, -1)
//! ```
//!
//! Exposes negations to the Multiply-constant fusion.

use crate::error::GraphResult;
use crate::graph::Function;
use crate::op::{Multiply, Negative};
use crate::pass::{FunctionPass, MatcherPass, PassConfig};
use crate::pattern::{any_input, wrap_type, Matcher};
use crate::tensor::Tensor;
use crate::transform::{copy_runtime_info, replace_node};

/// Matcher pass rewriting `Negative` as a multiplication by minus one
#[derive(Debug)]
pub struct ConvertNegative(MatcherPass);

impl ConvertNegative {
    /// Create the pass
    pub fn new() -> Self {
        let x = any_input();
        let root = wrap_type::<Negative>(vec![x.clone()]);

        let matcher = Matcher::new(root, "ConvertNegative");
        Self(MatcherPass::new(matcher, move |func, m| {
            let Some(x) = m.get(&x) else {
                return Ok(false);
            };
            // Unsigned or unknown types have no -1 to multiply by
            let element_type = func.element_type(x)?;
            if element_type.is_dynamic() || !element_type.is_signed() {
                return Ok(false);
            }

            let minus_one = func.add_constant(Tensor::scalar(element_type, -1.0))?;
            let mul = func.add_node(Multiply::new(), &[x, minus_one])?;
            let root = m.root_node();
            let name = func.node(root)?.friendly_name();
            func.set_friendly_name(mul, name)?;
            copy_runtime_info(func, &[root], &[mul, minus_one.node])?;
            replace_node(func, root, mul)?;
            Ok(true)
        }))
    }

    /// The underlying rule, for grouping in a `GraphRewrite`
    pub fn into_matcher(self) -> MatcherPass {
        self.0
    }
}

impl Default for ConvertNegative {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionPass for ConvertNegative {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RtValue;
    use crate::op::Constant;
    use crate::tensor::{Dimension, ElementType, PartialShape};

    #[test]
    fn test_negative_becomes_multiply() {
        let mut f = Function::new("f");
        let p = f
            .add_parameter(
                ElementType::F32,
                PartialShape::from([Dimension::Dynamic, Dimension::Static(3)]),
            )
            .unwrap();
        let neg = f.add_op(Negative::new(), &[p]).unwrap();
        f.set_friendly_name(neg.node, "flip").unwrap();
        f.rt_info_mut(neg.node).unwrap().insert("origin".to_string(), RtValue::from(1i64));
        let r = f.add_result(neg).unwrap();

        assert!(ConvertNegative::new().run_on_function(&mut f).unwrap());
        assert!(!f.contains(neg.node));

        let mul = f.node(r).unwrap().input_value(0).unwrap();
        let node = f.node(mul.node).unwrap();
        assert!(node.is::<Multiply>());
        assert_eq!(node.friendly_name(), "flip");
        assert_eq!(node.rt_info().get("origin"), Some(&RtValue::Int(1)));
        assert_eq!(node.input_value(0).unwrap(), p);
        assert_eq!(f.partial_shape(mul).unwrap(), f.partial_shape(p).unwrap());

        let c = node.input_value(1).unwrap();
        assert!(f.op_as::<Constant>(c.node).unwrap().is_scalar_value(-1.0));
    }

    #[test]
    fn test_unsigned_skipped() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::U8, [4]).unwrap();
        let neg = f.add_op(Negative::new(), &[p]).unwrap();
        f.add_result(neg).unwrap();

        assert!(!ConvertNegative::new().run_on_function(&mut f).unwrap());
        assert!(f.contains(neg.node));
    }
}
