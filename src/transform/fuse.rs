//! Node fusion
//!
//! Handles replacing a matched group of nodes by a single new node while
//! keeping provenance: the fused node inherits the runtime info of the group
//! and records the friendly names of every original node under
//! [`FUSED_NAMES`].

use indexmap::IndexSet;

use crate::error::GraphResult;
use crate::graph::{Function, NodeId, Output, RtValue, FUSED_NAMES};
use crate::op::{Parameter, Result as ResultOp};

use super::replace::{copy_runtime_info, replace_node};

/// Friendly names a node stands for
///
/// A node that was never fused stands for itself.
pub fn get_fused_names(func: &Function, node: NodeId) -> GraphResult<IndexSet<String>> {
    let n = func.node(node)?;
    Ok(match n.rt_info().get(FUSED_NAMES).and_then(RtValue::as_names) {
        Some(names) => names.clone(),
        None => std::iter::once(n.friendly_name()).collect(),
    })
}

/// Check if `value` can be folded into its consumer
///
/// The value must have exactly one consumer and must not come from the
/// function boundary.
pub fn can_fuse(func: &Function, value: Output) -> bool {
    func.consumer_count(value) == 1
        && !func.is_type::<Parameter>(value.node)
        && !func.is_type::<ResultOp>(value.node)
}

/// Replace `root` by `fused`, recording `originals` as its provenance
///
/// `originals` should list every node the fused node stands for, `root`
/// included. Runtime info is merged into `fused` first, then `root`'s
/// consumers are moved over.
pub fn fuse_nodes(
    func: &mut Function,
    originals: &[NodeId],
    root: NodeId,
    fused: NodeId,
) -> GraphResult<()> {
    let mut names = IndexSet::new();
    for id in originals {
        names.extend(get_fused_names(func, *id)?);
    }
    let root_name = func.node(root)?.friendly_name();

    copy_runtime_info(func, originals, &[fused])?;
    replace_node(func, root, fused)?;

    func.rt_info_mut(fused)?
        .insert(FUSED_NAMES.to_string(), RtValue::Names(names));
    if !func.node(fused)?.has_friendly_name() {
        func.set_friendly_name(fused, root_name)?;
    }
    Ok(())
}
