//! Constant folding
//!
//! Replaces every node computable from constants (or from static shapes
//! alone) by `Constant` nodes holding the result.

use tracing::debug;

use crate::error::GraphResult;
use crate::graph::{Function, NodeId, Output};
use crate::op::{Constant, Parameter, Result as ResultOp};
use crate::pass::FunctionPass;
use crate::tensor::Tensor;
use crate::transform::{copy_runtime_info, replace_node_with_outputs};

use super::common::folded_name;

/// Fold constant subgraphs in one topological walk
///
/// Nodes visited after a fold are re-inferred before they are examined, so a
/// fold exposes its consumers to folding in the same walk.
#[derive(Debug, Clone, Default)]
pub struct ConstantFolding;

impl ConstantFolding {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }

    /// Fold `id` if possible, returning whether it was replaced
    fn fold_node(func: &mut Function, id: NodeId) -> GraphResult<bool> {
        let node = func.node(id)?;
        if node.is::<Parameter>() || node.is::<ResultOp>() || node.is::<Constant>() {
            return Ok(false);
        }

        let values: Vec<Option<&Tensor>> = node
            .input_values()
            .iter()
            .map(|v| func.constant_value(*v))
            .collect();
        let descs = func.input_descs(id)?;
        let Some(folded) = node.op().fold(&values, &descs) else {
            return Ok(false);
        };
        if folded.len() != node.output_size() {
            return Ok(false);
        }
        let name = node.friendly_name();
        let count = folded.len();

        let mut replacements: Vec<Output> = Vec::with_capacity(count);
        for (index, value) in folded.into_iter().enumerate() {
            let constant = func.add_constant(value)?;
            func.set_friendly_name(constant.node, folded_name(&name, index, count))?;
            replacements.push(constant);
        }
        replace_node_with_outputs(func, id, &replacements)?;

        for replacement in &replacements {
            let consumers: Vec<NodeId> = func
                .target_inputs(*replacement)?
                .iter()
                .map(|input| input.node)
                .collect();
            for consumer in consumers {
                copy_runtime_info(func, &[id, consumer], &[consumer])?;
            }
        }

        let released = func.release_unused([id]);
        debug!(node = %name, outputs = count, released, "constant folded");
        Ok(true)
    }
}

impl FunctionPass for ConstantFolding {
    fn name(&self) -> &str {
        "ConstantFolding"
    }

    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
        let mut changed = false;
        for id in func.get_ordered_ops() {
            if !func.contains(id) {
                continue;
            }
            if changed {
                func.revalidate(id)?;
            }
            changed |= Self::fold_node(func, id)?;
        }
        Ok(changed)
    }
}
