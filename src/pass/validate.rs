//! Whole-graph re-inference pass

use crate::error::GraphResult;
use crate::graph::Function;

use super::FunctionPass;

/// Re-run type and shape inference over the whole function
///
/// Never reports a change; fails with the first node whose inference rule
/// rejects its inputs.
#[derive(Debug, Clone, Default)]
pub struct Validate;

impl Validate {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }
}

impl FunctionPass for Validate {
    fn name(&self) -> &str {
        "Validate"
    }

    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
        func.validate_nodes_and_infer_types()?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::op::{Add, Parameter};
    use crate::tensor::{ElementType, PartialShape};

    #[test]
    fn test_validate_propagates_and_reports() {
        let mut f = Function::new("f");
        let a = f.add_parameter(ElementType::F32, [2]).unwrap();
        let b = f.add_parameter(ElementType::F32, [2]).unwrap();
        let sum = f.add_op(Add::new(), &[a, b]).unwrap();
        f.add_result(sum).unwrap();

        let mut pass = Validate::new();
        assert!(!pass.run_on_function(&mut f).unwrap());

        if let Some(p) = f.op_mut::<Parameter>(a.node) {
            p.set_partial_shape(PartialShape::from([3]));
        }
        let err = pass.run_on_function(&mut f).unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }
}
