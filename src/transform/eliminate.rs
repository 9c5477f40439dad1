//! Node elimination
//!
//! Removes pass-through nodes by connecting their consumers directly to one
//! of their inputs.

use crate::error::GraphResult;
use crate::graph::{Function, NodeId, Output};
use crate::op::{Parameter, Result as ResultOp};

use super::replace::copy_runtime_info;

/// Check whether `node` can be bypassed through input `input_index`
///
/// A node feeding a graph `Result` keeps the output name of the function, so
/// it can only be bypassed when the source can take over that name: the
/// source must not be a `Parameter` and must have no other consumers.
pub fn can_eliminate(func: &Function, node: NodeId, input_index: usize) -> GraphResult<bool> {
    let n = func.node(node)?;
    if n.output_size() != 1 {
        return Ok(false);
    }
    let source = n.input_value(input_index)?;
    let output = n.output(0)?;

    let feeds_result = func
        .target_inputs(output)?
        .iter()
        .any(|input| func.is_type::<ResultOp>(input.node));
    if !feeds_result {
        return Ok(true);
    }
    Ok(!func.is_type::<Parameter>(source.node) && func.consumer_count(source) == 1)
}

/// Bypass `node`: its consumers read its input `input_index` instead
///
/// Returns `false` without touching the graph when [`can_eliminate`] refuses.
/// When the node fed a `Result`, the source node takes over its friendly name
/// and runtime info. The bypassed node is released if nothing else uses it.
pub fn eliminate_node(func: &mut Function, node: NodeId, input_index: usize) -> GraphResult<bool> {
    if !can_eliminate(func, node, input_index)? {
        return Ok(false);
    }
    let n = func.node(node)?;
    let source = n.input_value(input_index)?;
    let output = Output::new(node, 0);
    let feeds_result = func
        .target_inputs(output)?
        .iter()
        .any(|input| func.is_type::<ResultOp>(input.node));
    let name = n.friendly_name();

    let targets = func.target_inputs(output)?.to_vec();
    for input in targets {
        func.replace_source_output(input, source)?;
    }
    if feeds_result {
        func.set_friendly_name(source.node, name)?;
        copy_runtime_info(func, &[source.node, node], &[source.node])?;
    }
    func.release_unused([node]);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Input;
    use crate::op::{Convert, Relu};
    use crate::tensor::ElementType;

    #[test]
    fn test_eliminate_internal_node() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let cvt = f.add_op(Convert::new(ElementType::F32), &[p]).unwrap();
        let relu = f.add_op(Relu::new(), &[cvt]).unwrap();
        f.add_result(relu).unwrap();

        assert!(eliminate_node(&mut f, cvt.node, 0).unwrap());
        assert!(!f.contains(cvt.node));
        assert_eq!(f.source_output(Input::new(relu.node, 0)).unwrap(), p);
    }

    #[test]
    fn test_refuses_result_to_parameter() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let cvt = f.add_op(Convert::new(ElementType::F32), &[p]).unwrap();
        let out = f.add_result(cvt).unwrap();

        assert!(!eliminate_node(&mut f, cvt.node, 0).unwrap());
        assert!(f.contains(cvt.node));
        assert_eq!(f.source_output(Input::new(out, 0)).unwrap(), cvt);
    }

    #[test]
    fn test_result_consumer_renames_source() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        let cvt = f.add_op(Convert::new(ElementType::F32), &[relu]).unwrap();
        let out = f.add_result(cvt).unwrap();
        f.set_friendly_name(cvt.node, "prob").unwrap();

        assert!(eliminate_node(&mut f, cvt.node, 0).unwrap());
        assert_eq!(f.source_output(Input::new(out, 0)).unwrap(), relu);
        assert_eq!(f.node(relu.node).unwrap().friendly_name(), "prob");
    }

    #[test]
    fn test_refuses_shared_source_feeding_result() {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [3]).unwrap();
        let relu = f.add_op(Relu::new(), &[p]).unwrap();
        let cvt = f.add_op(Convert::new(ElementType::F32), &[relu]).unwrap();
        f.add_result(cvt).unwrap();
        f.add_result(relu).unwrap();

        assert!(!can_eliminate(&f, cvt.node, 0).unwrap());
    }
}
