//! The graph container
//!
//! `Function` is an arena of nodes addressed by [`NodeId`]. Slots of released
//! nodes stay empty so that ids are never reused and stale handles report
//! [`GraphError::NodeNotFound`] instead of aliasing a new node.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::error::{GraphError, GraphResult, PortKind};
use crate::op::{self, Op};
use crate::tensor::{ElementType, PartialShape, Tensor, TensorDesc};

use super::node::{Input, Node, NodeId, Output, OutputSlot};
use super::rt_info::RtInfo;

/// A computation graph with a Parameter/Result boundary
#[derive(Debug, Default)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) parameters: Vec<NodeId>,
    pub(crate) results: Vec<NodeId>,
    pub(crate) released: usize,
}

impl Function {
    /// Create an empty function
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Add a node consuming `inputs`
    ///
    /// Type inference runs before the node is inserted; on failure the graph
    /// is left untouched. `Parameter` and `Result` nodes are registered on the
    /// function boundary.
    pub fn add_node(&mut self, op: impl Op, inputs: &[Output]) -> GraphResult<NodeId> {
        self.add_boxed(Box::new(op), inputs)
    }

    /// Add a node from an already boxed operation
    pub fn add_boxed(&mut self, op: Box<dyn Op>, inputs: &[Output]) -> GraphResult<NodeId> {
        let id = NodeId(self.nodes.len());

        let mut descs = Vec::with_capacity(inputs.len());
        for source in inputs {
            descs.push(self.output_desc(*source)?.clone());
        }
        let inferred = op.validate_and_infer_types(&descs).map_err(|e| {
            let name = format!("{}_{}", op.type_info().name, id.0);
            GraphError::from_infer(format!("{} ('{}')", name, name), e)
        })?;

        for (index, source) in inputs.iter().enumerate() {
            self.slot_mut(*source)?.targets.push(Input::new(id, index));
        }

        let is_parameter = op.is::<op::Parameter>();
        let is_result = op.is::<op::Result>();
        self.nodes.push(Some(Node {
            id,
            op,
            inputs: inputs.iter().copied().collect(),
            outputs: inferred.into_iter().map(OutputSlot::new).collect(),
            friendly_name: None,
            rt_info: RtInfo::new(),
        }));
        if is_parameter {
            self.parameters.push(id);
        }
        if is_result {
            self.results.push(id);
        }
        Ok(id)
    }

    /// Add a node and return its first output
    pub fn add_op(&mut self, op: impl Op, inputs: &[Output]) -> GraphResult<Output> {
        let id = self.add_node(op, inputs)?;
        self.output(id, 0)
    }

    /// Add a graph input
    pub fn add_parameter(
        &mut self,
        element_type: ElementType,
        shape: impl Into<PartialShape>,
    ) -> GraphResult<Output> {
        self.add_op(op::Parameter::new(element_type, shape), &[])
    }

    /// Add a constant
    pub fn add_constant(&mut self, value: Tensor) -> GraphResult<Output> {
        self.add_op(op::Constant::new(value), &[])
    }

    /// Add a graph output fed by `value`
    pub fn add_result(&mut self, value: Output) -> GraphResult<NodeId> {
        self.add_node(op::Result::new(), &[value])
    }

    /// Re-create `node`'s operation on new inputs
    ///
    /// The clone gets a fresh id and no friendly name or runtime info.
    pub fn clone_with_new_inputs(
        &mut self,
        node: NodeId,
        inputs: &[Output],
    ) -> GraphResult<NodeId> {
        let op = self.node(node)?.op.clone_op();
        self.add_boxed(op, inputs)
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Topologically sorted live nodes reachable from the boundary
    ///
    /// Depth-first post-order, rooted at the parameters and then the results,
    /// visiting inputs in index order. Every producer precedes its consumers
    /// and the order is deterministic for a fixed graph state.
    pub fn get_ordered_ops(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        for &root in self.parameters.iter().chain(self.results.iter()) {
            if !self.contains(root) || !visited.insert(root) {
                continue;
            }
            stack.push((root, 0));

            while let Some((id, next)) = stack.pop() {
                let source = self
                    .nodes
                    .get(id.0)
                    .and_then(Option::as_ref)
                    .and_then(|node| node.inputs.get(next).map(|o| o.node));
                match source {
                    Some(producer) => {
                        stack.push((id, next + 1));
                        if visited.insert(producer) {
                            stack.push((producer, 0));
                        }
                    }
                    None => order.push(id),
                }
            }
        }

        order
    }

    // ========================================================================
    // Internal slot access
    // ========================================================================

    pub(crate) fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn slot(&self, output: Output) -> GraphResult<&OutputSlot> {
        self.node(output.node)?.output_slot(output.index)
    }

    pub(crate) fn slot_mut(&mut self, output: Output) -> GraphResult<&mut OutputSlot> {
        let node = self.node_mut(output.node)?;
        let size = node.outputs.len();
        if output.index >= size {
            return Err(GraphError::IndexOutOfRange {
                node: node.description(),
                kind: PortKind::Output,
                index: output.index,
                size,
            });
        }
        Ok(&mut node.outputs[output.index])
    }

    /// Descriptions of the sources of `node`'s inputs
    pub(crate) fn input_descs(&self, node: NodeId) -> GraphResult<SmallVec<[TensorDesc; 4]>> {
        self.node(node)?
            .inputs
            .iter()
            .map(|source| self.output_desc(*source).cloned())
            .collect()
    }
}
