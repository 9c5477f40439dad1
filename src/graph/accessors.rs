//! Read-only graph queries
//!
//! Handle-based accessors on [`Function`]. Every query that takes a handle
//! validates it: stale node ids yield [`GraphError::NodeNotFound`], bad port
//! indices yield [`GraphError::IndexOutOfRange`].

use crate::error::{GraphError, GraphResult};
use crate::op::{Constant, Op, OpType};
use crate::tensor::{ElementType, PartialShape, Tensor, TensorDesc};

use super::function::Function;
use super::node::{Input, Node, NodeId, Output};

impl Function {
    // ========================================================================
    // Function-level queries
    // ========================================================================

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared graph inputs, in order
    pub fn parameters(&self) -> &[NodeId] {
        &self.parameters
    }

    /// Declared graph outputs, in order
    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    /// Number of live nodes in the arena (reachable or not)
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total number of nodes released over the function's lifetime
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Iterate over live nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Check if `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    /// Find live nodes of operation kind `T`
    pub fn find_nodes<T: OpType>(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.is::<T>()).map(Node::id).collect()
    }

    // ========================================================================
    // Node queries
    // ========================================================================

    /// Look up a node
    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// The `i`-th output of `id`
    pub fn output(&self, id: NodeId, i: usize) -> GraphResult<Output> {
        self.node(id)?.output(i)
    }

    /// The `i`-th input of `id`
    pub fn input(&self, id: NodeId, i: usize) -> GraphResult<Input> {
        self.node(id)?.input(i)
    }

    /// Check whether the node's operation is of kind `T`
    pub fn is_type<T: OpType>(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.is::<T>()).unwrap_or(false)
    }

    /// Typed access to a node's operation
    pub fn op_as<T: Op>(&self, id: NodeId) -> Option<&T> {
        self.node(id).ok().and_then(|n| n.op_as::<T>())
    }

    /// Check if `id` is a declared parameter
    pub fn is_parameter(&self, id: NodeId) -> bool {
        self.parameters.contains(&id)
    }

    /// Check if `id` is a declared result
    pub fn is_result(&self, id: NodeId) -> bool {
        self.results.contains(&id)
    }

    /// Distinct consumer nodes of any output of `id`, in first-seen order
    pub fn consumers(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut out: Vec<NodeId> = Vec::new();
        for slot in &self.node(id)?.outputs {
            for target in &slot.targets {
                if !out.contains(&target.node) {
                    out.push(target.node);
                }
            }
        }
        Ok(out)
    }

    /// Distinct producer nodes of `id`'s inputs, in input order
    pub fn producers(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut out: Vec<NodeId> = Vec::new();
        for source in &self.node(id)?.inputs {
            if !out.contains(&source.node) {
                out.push(source.node);
            }
        }
        Ok(out)
    }

    // ========================================================================
    // Value queries
    // ========================================================================

    /// Live consumers of `output`
    ///
    /// Borrowed from the graph, so it always reflects the current state;
    /// copy it before rewiring.
    pub fn target_inputs(&self, output: Output) -> GraphResult<&[Input]> {
        Ok(self.slot(output)?.targets())
    }

    /// Number of consumers of `output`, zero for invalid handles
    pub fn consumer_count(&self, output: Output) -> usize {
        self.slot(output).map(|s| s.targets.len()).unwrap_or(0)
    }

    /// The single source of `input`
    pub fn source_output(&self, input: Input) -> GraphResult<Output> {
        self.node(input.node)?.input_value(input.index)
    }

    /// Cached element type and shape of `output`
    pub fn output_desc(&self, output: Output) -> GraphResult<&TensorDesc> {
        Ok(self.slot(output)?.desc())
    }

    /// Cached element type of `output`
    pub fn element_type(&self, output: Output) -> GraphResult<ElementType> {
        Ok(self.output_desc(output)?.element_type)
    }

    /// Cached shape of `output`
    pub fn partial_shape(&self, output: Output) -> GraphResult<&PartialShape> {
        Ok(&self.output_desc(output)?.shape)
    }

    /// Value of `output` if it is produced by a `Constant`
    pub fn constant_value(&self, output: Output) -> Option<&Tensor> {
        self.op_as::<Constant>(output.node).map(Constant::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortKind;
    use crate::op::{Multiply, Parameter, Relu};

    fn make_fanout() -> (Function, Output, Output, Output) {
        let mut f = Function::new("fanout");
        let p = f.add_parameter(ElementType::F32, [8]).unwrap();
        let a = f.add_op(Relu::new(), &[p]).unwrap();
        let b = f.add_op(Multiply::new(), &[p, p]).unwrap();
        f.add_result(a).unwrap();
        f.add_result(b).unwrap();
        (f, p, a, b)
    }

    #[test]
    fn test_target_inputs_and_sources() {
        let (f, p, a, b) = make_fanout();
        assert_eq!(
            f.target_inputs(p).unwrap(),
            &[Input::new(a.node, 0), Input::new(b.node, 0), Input::new(b.node, 1)]
        );
        assert_eq!(f.consumer_count(p), 3);
        assert_eq!(f.consumers(p.node).unwrap(), vec![a.node, b.node]);
        assert_eq!(f.producers(b.node).unwrap(), vec![p.node]);
        assert_eq!(f.source_output(Input::new(b.node, 1)).unwrap(), p);
    }

    #[test]
    fn test_index_errors() {
        let (f, p, a, _) = make_fanout();
        let err = f.output(a.node, 1).unwrap_err();
        assert!(matches!(
            err,
            GraphError::IndexOutOfRange {
                kind: PortKind::Output,
                index: 1,
                size: 1,
                ..
            }
        ));
        assert!(err.is_structural());

        let err = f.input(p.node, 0).unwrap_err();
        assert!(matches!(
            err,
            GraphError::IndexOutOfRange {
                kind: PortKind::Input,
                ..
            }
        ));
    }

    #[test]
    fn test_typed_access() {
        let (f, p, a, _) = make_fanout();
        assert!(f.is_type::<Parameter>(p.node));
        assert!(f.is_parameter(p.node));
        assert!(!f.is_type::<Parameter>(a.node));
        assert_eq!(
            f.op_as::<Parameter>(p.node).map(|op| op.element_type),
            Some(ElementType::F32)
        );
        assert_eq!(f.find_nodes::<Relu>(), vec![a.node]);
        assert_eq!(f.results().len(), 2);
    }

    #[test]
    fn test_names() {
        let (f, _, a, _) = make_fanout();
        let node = f.node(a.node).unwrap();
        assert_eq!(node.name(), "Relu_1");
        assert_eq!(node.friendly_name(), "Relu_1");
        assert!(!node.has_friendly_name());
    }
}
