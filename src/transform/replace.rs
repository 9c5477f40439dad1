//! Replacement primitives
//!
//! Safe graph surgery built on [`Function::replace_source_output`]. Every
//! primitive validates all handles before the first edge is touched, so a
//! failed call leaves the graph unchanged.

use crate::error::{GraphError, GraphResult};
use crate::graph::{
    merge_rt_info, union_fused_names, Function, Input, NodeId, Output, RtInfo, RtValue,
    FUSED_NAMES,
};
use crate::op::Parameter;

/// Move every consumer of `old` onto `new`
///
/// The consumer set is snapshotted first. Consumers belonging to `new`'s own
/// node are skipped, so `new` may read `old` (inserting a node after `old`).
///
/// The friendly name of `old`'s node moves to `new`'s node when that is
/// unambiguous: `old`'s node has a single output and an explicit name, and
/// `new`'s node has no explicit name and is not a `Parameter`.
pub fn replace_output_update_name(
    func: &mut Function,
    old: Output,
    new: Output,
) -> GraphResult<()> {
    func.output_desc(new)?;
    let targets: Vec<Input> = func
        .target_inputs(old)?
        .iter()
        .copied()
        .filter(|input| input.node != new.node)
        .collect();
    if old == new {
        return Ok(());
    }

    let old_node = func.node(old.node)?;
    let new_node = func.node(new.node)?;
    let rename = (old_node.output_size() == 1
        && old_node.has_friendly_name()
        && !new_node.has_friendly_name()
        && !new_node.is::<Parameter>())
    .then(|| old_node.friendly_name());

    for input in targets {
        func.replace_source_output(input, new)?;
    }
    if let Some(name) = rename {
        func.set_friendly_name(new.node, name)?;
    }
    Ok(())
}

/// Replace every output of `old` by the same-index output of `new`
///
/// Both nodes must have the same number of outputs. `old` is not deleted; it
/// becomes unreachable once its consumers are rewired.
pub fn replace_node(func: &mut Function, old: NodeId, new: NodeId) -> GraphResult<()> {
    if old == new {
        return Err(GraphError::StructuralViolation(format!(
            "cannot replace {} with itself",
            func.node(old)?.description()
        )));
    }
    let new_outputs: Vec<Output> = func.node(new)?.outputs().collect();
    replace_node_with_outputs(func, old, &new_outputs)
}

/// Replace every output of `old` by the corresponding value in `outputs`
pub fn replace_node_with_outputs(
    func: &mut Function,
    old: NodeId,
    outputs: &[Output],
) -> GraphResult<()> {
    let old_node = func.node(old)?;
    if old_node.output_size() != outputs.len() {
        return Err(GraphError::ShapeMismatch {
            node: old_node.description(),
            message: format!(
                "replacement provides {} output(s), node has {}",
                outputs.len(),
                old_node.output_size()
            ),
        });
    }
    for output in outputs {
        func.output_desc(*output)?;
    }

    for (index, new) in outputs.iter().enumerate() {
        replace_output_update_name(func, Output::new(old, index), *new)?;
    }
    Ok(())
}

/// Merge the runtime info of `from` into every node of `to`
///
/// Colliding keys take the value of the last `from` node listing them. The
/// fused-names sets of all `from` nodes are united instead of overwritten.
pub fn copy_runtime_info(func: &mut Function, from: &[NodeId], to: &[NodeId]) -> GraphResult<()> {
    let mut merged = RtInfo::new();
    let mut sources = Vec::with_capacity(from.len());
    for id in from {
        let info = func.node(*id)?.rt_info();
        merge_rt_info(&mut merged, info);
        sources.push(info);
    }
    let names = union_fused_names(sources);
    if !names.is_empty() {
        merged.insert(FUSED_NAMES.to_string(), RtValue::Names(names));
    }
    for id in to {
        func.node(*id)?;
    }

    for id in to {
        merge_rt_info(func.rt_info_mut(*id)?, &merged);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Constant, Multiply, Negative, Relu, Result as ResultOp};
    use crate::tensor::{ElementType, Tensor};

    #[test]
    fn test_replace_node_rewires_all_consumers() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let neg = f.add_op(Negative::new(), &[p]).unwrap();
        let a = f.add_op(Relu::new(), &[neg]).unwrap();
        let b = f.add_result(neg).unwrap();

        let minus_one = f.add_constant(Tensor::scalar(ElementType::F32, -1.0)).unwrap();
        let mul = f.add_op(Multiply::new(), &[p, minus_one]).unwrap();
        replace_node(&mut f, neg.node, mul.node).unwrap();

        assert!(f.target_inputs(neg).unwrap().is_empty());
        assert_eq!(f.source_output(Input::new(a.node, 0)).unwrap(), mul);
        assert_eq!(f.source_output(Input::new(b, 0)).unwrap(), mul);
        assert_eq!(f.consumer_count(mul), 2);
    }

    #[test]
    fn test_replace_node_arity_mismatch() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        f.add_result(relu).unwrap();

        let err = replace_node_with_outputs(&mut f, relu.node, &[p, p]).unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
        assert_eq!(f.consumer_count(relu), 1);

        let err = replace_node(&mut f, relu.node, relu.node).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_replace_allows_new_node_reading_old() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        let out = f.add_result(relu).unwrap();

        let after = f.add_op(Negative::new(), &[relu]).unwrap();
        replace_output_update_name(&mut f, relu, after).unwrap();
        assert_eq!(f.source_output(Input::new(out, 0)).unwrap(), after);
        assert_eq!(f.source_output(Input::new(after.node, 0)).unwrap(), relu);
    }

    #[test]
    fn test_friendly_name_propagation() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        f.add_result(relu).unwrap();
        f.set_friendly_name(relu.node, "activation").unwrap();

        let neg = f.add_op(Negative::new(), &[p]).unwrap();
        replace_output_update_name(&mut f, relu, neg).unwrap();
        assert_eq!(f.node(neg.node).unwrap().friendly_name(), "activation");

        // Parameters keep their own name
        let other = f.add_op(Relu::new(), &[p]).unwrap();
        f.add_result(other).unwrap();
        f.set_friendly_name(other.node, "other").unwrap();
        replace_output_update_name(&mut f, other, p).unwrap();
        assert!(!f.node(p.node).unwrap().has_friendly_name());
    }

    #[test]
    fn test_copy_runtime_info() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let a = f.add_op(Relu::new(), &[p]).unwrap();
        let b = f.add_op(Relu::new(), &[a]).unwrap();
        let c = f.add_op(Relu::new(), &[b]).unwrap();

        f.rt_info_mut(a.node).unwrap().insert("origin".into(), "a".into());
        f.rt_info_mut(b.node).unwrap().insert("origin".into(), "b".into());
        f.rt_info_mut(b.node).unwrap().insert("extra".into(), 1i64.into());
        f.rt_info_mut(c.node).unwrap().insert("own".into(), true.into());

        copy_runtime_info(&mut f, &[a.node, b.node], &[c.node]).unwrap();
        let info = f.node(c.node).unwrap().rt_info();
        assert_eq!(info["origin"], RtValue::Str("b".into()));
        assert_eq!(info["extra"], RtValue::Int(1));
        assert_eq!(info["own"], RtValue::Bool(true));

        let err = copy_runtime_info(&mut f, &[a.node], &[NodeId(99)]).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_single_producer_invariant_after_replace() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let c = f.add_constant(Tensor::scalar(ElementType::F32, 2.0)).unwrap();
        let m = f.add_op(Multiply::new(), &[p, c]).unwrap();
        f.add_result(m).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        replace_node(&mut f, m.node, relu.node).unwrap();
        f.collect_garbage();

        for id in f.get_ordered_ops() {
            let node = f.node(id).unwrap();
            for input in node.inputs() {
                let source = f.source_output(input).unwrap();
                assert!(f.target_inputs(source).unwrap().contains(&input));
            }
        }
        assert!(f.find_nodes::<Constant>().is_empty());
        assert_eq!(f.find_nodes::<ResultOp>().len(), 1);
    }
}
