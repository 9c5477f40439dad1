//! Graph mutation operations
//!
//! The only primitive edge edit is [`Function::replace_source_output`]; every
//! higher-level replacement in [`crate::transform`] is built from it. Nodes are
//! never deleted explicitly: they are released once nothing consumes them
//! ([`Function::release_unused`]) or swept when unreachable from the boundary
//! ([`Function::collect_garbage`]).

use tracing::trace;

use crate::error::{GraphError, GraphResult};
use crate::op::Op;

use super::function::Function;
use super::node::{Input, NodeId, Output};
use super::rt_info::RtInfo;
use super::traversal::reachable_from;

impl Function {
    // ========================================================================
    // Edge mutation
    // ========================================================================

    /// Rewire exactly one consumer edge
    ///
    /// Removes `input` from its old source's target set and adds it to
    /// `new_source`'s. Every handle is validated before anything changes.
    /// Wiring a node to one of its own outputs is a structural violation.
    pub fn replace_source_output(&mut self, input: Input, new_source: Output) -> GraphResult<()> {
        let old_source = self.source_output(input)?;
        self.slot(new_source)?;
        if new_source.node == input.node {
            return Err(GraphError::StructuralViolation(format!(
                "cannot connect {} to its own output {}",
                self.node(input.node)?.description(),
                new_source.index
            )));
        }
        if old_source == new_source {
            return Ok(());
        }

        self.slot_mut(old_source)?.targets.retain(|t| *t != input);
        self.node_mut(input.node)?.inputs[input.index] = new_source;
        self.slot_mut(new_source)?.targets.push(input);
        Ok(())
    }

    // ========================================================================
    // Node attributes
    // ========================================================================

    /// Rename the function
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set a node's friendly name
    pub fn set_friendly_name(&mut self, id: NodeId, name: impl Into<String>) -> GraphResult<()> {
        self.node_mut(id)?.friendly_name = Some(name.into());
        Ok(())
    }

    /// Mutable runtime info of a node
    pub fn rt_info_mut(&mut self, id: NodeId) -> GraphResult<&mut RtInfo> {
        Ok(&mut self.node_mut(id)?.rt_info)
    }

    /// Typed mutable access to a node's operation
    ///
    /// Cached output descriptions are not updated; call
    /// [`Function::revalidate`] or [`Function::validate_nodes_and_infer_types`]
    /// afterwards.
    pub fn op_mut<T: Op>(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).ok().and_then(|n| n.op.downcast_mut::<T>())
    }

    // ========================================================================
    // Boundary
    // ========================================================================

    /// Drop `id` from the declared results and release it
    pub fn remove_result(&mut self, id: NodeId) -> GraphResult<()> {
        let pos = self
            .results
            .iter()
            .position(|r| *r == id)
            .ok_or_else(|| {
                GraphError::StructuralViolation(format!("{} is not a result of the function", id))
            })?;
        self.results.remove(pos);
        self.release_unused([id]);
        Ok(())
    }

    // ========================================================================
    // Liveness
    // ========================================================================

    /// Release nodes that lost their last consumer
    ///
    /// Each listed node that is not on the function boundary and whose outputs
    /// have no consumers is detached from its producers and removed; the
    /// producers are then examined in turn. Returns the number of released
    /// nodes.
    pub fn release_unused(&mut self, ids: impl IntoIterator<Item = NodeId>) -> usize {
        let mut worklist: Vec<NodeId> = ids.into_iter().collect();
        let mut released = 0;

        while let Some(id) = worklist.pop() {
            let Ok(node) = self.node(id) else {
                continue;
            };
            if !node.has_no_consumers() || self.is_parameter(id) || self.is_result(id) {
                continue;
            }
            for producer in self.detach(id) {
                worklist.push(producer);
            }
            released += 1;
        }

        released
    }

    /// Remove every node unreachable from the results and parameters
    ///
    /// Returns the number of released nodes.
    pub fn collect_garbage(&mut self) -> usize {
        let roots: Vec<NodeId> = self
            .results
            .iter()
            .chain(self.parameters.iter())
            .copied()
            .collect();
        let live = reachable_from(self, roots);

        let dead: Vec<NodeId> = self
            .nodes()
            .map(|n| n.id())
            .filter(|id| !live.contains(id))
            .collect();
        for id in &dead {
            self.detach(*id);
        }
        dead.len()
    }

    /// Unlink `id` from its producers and free its slot
    ///
    /// Returns the producer ids. Consumers of `id` are left untouched, so
    /// callers must only detach nodes without live consumers.
    fn detach(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return Vec::new();
        };
        trace!(node = %node.description(), "releasing node");
        self.released += 1;

        let mut producers = Vec::with_capacity(node.inputs.len());
        for (index, source) in node.inputs.iter().enumerate() {
            let input = Input::new(id, index);
            if let Ok(slot) = self.slot_mut(*source) {
                slot.targets.retain(|t| *t != input);
            }
            if !producers.contains(&source.node) {
                producers.push(source.node);
            }
        }
        producers
    }
}
