//! Reachability over producer edges

use rustc_hash::FxHashSet;

use super::function::Function;
use super::node::NodeId;

/// Nodes reachable backwards from any of `roots`, roots included
pub fn reachable_from(
    func: &Function,
    roots: impl IntoIterator<Item = NodeId>,
) -> FxHashSet<NodeId> {
    let mut visited = FxHashSet::default();
    let mut stack: Vec<NodeId> = roots
        .into_iter()
        .filter(|id| func.contains(*id))
        .collect();
    visited.extend(stack.iter().copied());

    while let Some(id) = stack.pop() {
        let Ok(node) = func.node(id) else {
            continue;
        };
        for producer in node.inputs.iter().map(|o| o.node) {
            if visited.insert(producer) {
                stack.push(producer);
            }
        }
    }

    visited
}
