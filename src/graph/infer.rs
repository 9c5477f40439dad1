//! Type and shape propagation
//!
//! Re-inference is always explicit: edits never trigger it on their own. A
//! pass re-infers the nodes it touched (or the whole graph) once a batch of
//! edits is complete.

use crate::error::{GraphError, GraphResult};

use super::function::Function;
use super::node::NodeId;

impl Function {
    /// Re-run `id`'s local inference rule against its current inputs
    ///
    /// Returns whether any cached output description changed. The number of
    /// outputs of a node is fixed at creation and must not change.
    pub fn revalidate(&mut self, id: NodeId) -> GraphResult<bool> {
        let descs = self.input_descs(id)?;
        let node = self.node(id)?;
        let inferred = node
            .op
            .validate_and_infer_types(&descs)
            .map_err(|e| GraphError::from_infer(node.description(), e))?;
        if inferred.len() != node.outputs.len() {
            return Err(GraphError::ShapeMismatch {
                node: node.description(),
                message: format!(
                    "inference produced {} output(s), node has {}",
                    inferred.len(),
                    node.outputs.len()
                ),
            });
        }

        let node = self.node_mut(id)?;
        let mut changed = false;
        for (slot, desc) in node.outputs.iter_mut().zip(inferred) {
            if slot.desc != desc {
                slot.desc = desc;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Re-infer every reachable node in topological order
    ///
    /// Stops at the first node whose inference fails.
    pub fn validate_nodes_and_infer_types(&mut self) -> GraphResult<()> {
        for id in self.get_ordered_ops() {
            self.revalidate(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GraphError;
    use crate::graph::Function;
    use crate::op::{Add, Parameter, Relu};
    use crate::tensor::{Dimension, ElementType, PartialShape};

    #[test]
    fn test_validate_propagates_new_parameter_shape() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [Dimension::Dynamic]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        f.add_result(relu).unwrap();
        assert!(f.partial_shape(relu).unwrap().is_dynamic());

        f.op_mut::<Parameter>(p.node).unwrap().set_partial_shape([7]);
        f.validate_nodes_and_infer_types().unwrap();
        assert_eq!(f.partial_shape(relu).unwrap(), &PartialShape::from([7]));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [2, 3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        let out = f.add_result(relu).unwrap();

        f.validate_nodes_and_infer_types().unwrap();
        assert!(!f.revalidate(relu.node).unwrap());
        assert!(!f.revalidate(out).unwrap());
    }

    #[test]
    fn test_validate_reports_offending_node() {
        let mut f = Function::new("f");
        let a = f.add_parameter(ElementType::F32, [2]).unwrap();
        let b = f.add_parameter(ElementType::F32, [2]).unwrap();
        let add = f.add_op(Add::new(), &[a, b]).unwrap();
        f.add_result(add).unwrap();
        f.set_friendly_name(add.node, "sum").unwrap();

        f.op_mut::<Parameter>(b.node).unwrap().set_partial_shape([3]);
        let err = f.validate_nodes_and_infer_types().unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("Add_2 ('sum')"));
    }
}
