//! Constant values

use crate::error::{InferError, InferResult};
use crate::tensor::{Tensor, TensorDesc};

use super::{Op, OpType, TypeInfo};

/// Node holding a fixed tensor value
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    value: Tensor,
}

impl Constant {
    /// Create a constant
    pub fn new(value: Tensor) -> Self {
        Self { value }
    }

    /// The held value
    pub fn value(&self) -> &Tensor {
        &self.value
    }

    /// Check if the value is a single element equal to `v` (any rank)
    pub fn is_scalar_value(&self, v: f64) -> bool {
        self.value.len() == 1 && self.value.all_equal(v)
    }
}

impl OpType for Constant {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Constant", 0);
}

impl Op for Constant {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        if !inputs.is_empty() {
            return Err(InferError::Invalid("constant takes no inputs".to_string()));
        }
        Ok(vec![TensorDesc::new(
            self.value.element_type(),
            self.value.partial_shape(),
        )])
    }
}
