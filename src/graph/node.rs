//! Nodes and value handles
//!
//! A [`Node`] owns its operation, the list of [`Output`]s it consumes and one
//! [`OutputSlot`] per produced value. Each slot caches the inferred
//! [`TensorDesc`] and the live set of consumer [`Input`]s, so that both edge
//! directions are O(1) to query.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{GraphError, GraphResult, PortKind};
use crate::op::{Op, OpType, TypeInfo};
use crate::tensor::TensorDesc;

use super::rt_info::RtInfo;

/// Stable arena handle of a node; never reused within one function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Producer endpoint: output `index` of `node`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Output {
    /// Producing node
    pub node: NodeId,
    /// Output index on the producing node
    pub index: usize,
}

impl Output {
    /// Create a handle
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.index)
    }
}

/// Consumer endpoint: input `index` of `node`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Input {
    /// Consuming node
    pub node: NodeId,
    /// Input index on the consuming node
    pub index: usize,
}

impl Input {
    /// Create a handle
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<-{}", self.node, self.index)
    }
}

/// One produced value: cached inference result plus live consumers
#[derive(Debug, Clone, Default)]
pub struct OutputSlot {
    pub(crate) desc: TensorDesc,
    pub(crate) targets: SmallVec<[Input; 4]>,
}

impl OutputSlot {
    pub(crate) fn new(desc: TensorDesc) -> Self {
        Self {
            desc,
            targets: SmallVec::new(),
        }
    }

    /// Cached element type and shape
    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    /// Current consumers
    pub fn targets(&self) -> &[Input] {
        &self.targets
    }
}

/// A vertex of the data graph
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) op: Box<dyn Op>,
    pub(crate) inputs: SmallVec<[Output; 4]>,
    pub(crate) outputs: SmallVec<[OutputSlot; 1]>,
    pub(crate) friendly_name: Option<String>,
    pub(crate) rt_info: RtInfo,
}

impl Node {
    /// Arena handle
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The wrapped operation
    pub fn op(&self) -> &dyn Op {
        self.op.as_ref()
    }

    /// Type tag of the wrapped operation
    pub fn type_info(&self) -> TypeInfo {
        self.op.type_info()
    }

    /// Check whether the operation is of kind `T`
    pub fn is<T: OpType>(&self) -> bool {
        self.op.is::<T>()
    }

    /// Downcast the operation
    pub fn op_as<T: Op>(&self) -> Option<&T> {
        self.op.downcast_ref::<T>()
    }

    /// Generated unique name, `<TypeName>_<id>`
    pub fn name(&self) -> String {
        format!("{}_{}", self.op.type_info().name, self.id.0)
    }

    /// Human-readable name, falling back to [`Node::name`] when none was set
    pub fn friendly_name(&self) -> String {
        self.friendly_name.clone().unwrap_or_else(|| self.name())
    }

    /// Check if a friendly name was set explicitly
    pub fn has_friendly_name(&self) -> bool {
        self.friendly_name.is_some()
    }

    /// Node description used in error messages
    pub fn description(&self) -> String {
        format!("{} ('{}')", self.name(), self.friendly_name())
    }

    /// Number of inputs
    pub fn input_size(&self) -> usize {
        self.inputs.len()
    }

    /// Number of outputs
    pub fn output_size(&self) -> usize {
        self.outputs.len()
    }

    /// The `i`-th output handle
    pub fn output(&self, i: usize) -> GraphResult<Output> {
        if i >= self.outputs.len() {
            return Err(self.out_of_range(PortKind::Output, i, self.outputs.len()));
        }
        Ok(Output::new(self.id, i))
    }

    /// The `i`-th input handle
    pub fn input(&self, i: usize) -> GraphResult<Input> {
        if i >= self.inputs.len() {
            return Err(self.out_of_range(PortKind::Input, i, self.inputs.len()));
        }
        Ok(Input::new(self.id, i))
    }

    /// Source of the `i`-th input
    pub fn input_value(&self, i: usize) -> GraphResult<Output> {
        self.inputs
            .get(i)
            .copied()
            .ok_or_else(|| self.out_of_range(PortKind::Input, i, self.inputs.len()))
    }

    /// Sources of all inputs, in order
    pub fn input_values(&self) -> &[Output] {
        &self.inputs
    }

    /// All output handles, in order
    pub fn outputs(&self) -> impl Iterator<Item = Output> + '_ {
        (0..self.outputs.len()).map(move |i| Output::new(self.id, i))
    }

    /// All input handles, in order
    pub fn inputs(&self) -> impl Iterator<Item = Input> + '_ {
        (0..self.inputs.len()).map(move |i| Input::new(self.id, i))
    }

    /// Output slot `i`
    pub fn output_slot(&self, i: usize) -> GraphResult<&OutputSlot> {
        self.outputs
            .get(i)
            .ok_or_else(|| self.out_of_range(PortKind::Output, i, self.outputs.len()))
    }

    /// Descriptions of every output
    pub fn output_descs(&self) -> impl Iterator<Item = &TensorDesc> {
        self.outputs.iter().map(|slot| &slot.desc)
    }

    /// Check if no output has a consumer
    pub fn has_no_consumers(&self) -> bool {
        self.outputs.iter().all(|slot| slot.targets.is_empty())
    }

    /// Runtime info
    pub fn rt_info(&self) -> &RtInfo {
        &self.rt_info
    }

    fn out_of_range(&self, kind: PortKind, index: usize, size: usize) -> GraphError {
        GraphError::IndexOutOfRange {
            node: self.description(),
            kind,
            index,
            size,
        }
    }
}
