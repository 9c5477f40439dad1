//! Graph output

use crate::error::InferResult;
use crate::tensor::TensorDesc;

use super::{check_input_count, Op, OpType, TypeInfo};

/// Graph output sink
///
/// Has a single output mirroring its input so that the produced value stays
/// addressable; nothing in the graph consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Result;

impl Result {
    /// Create a result
    pub fn new() -> Self {
        Self
    }
}

impl OpType for Result {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Result", 0);
}

impl Op for Result {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        check_input_count(inputs, 1)?;
        Ok(vec![inputs[0].clone()])
    }
}
