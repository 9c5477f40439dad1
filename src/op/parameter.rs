//! Graph input

use crate::error::{InferError, InferResult};
use crate::tensor::{ElementType, PartialShape, TensorDesc};

use super::{Op, OpType, TypeInfo};

/// Graph input placeholder with a declared element type and shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Declared element type
    pub element_type: ElementType,
    /// Declared shape
    pub shape: PartialShape,
}

impl Parameter {
    /// Create a parameter
    pub fn new(element_type: ElementType, shape: impl Into<PartialShape>) -> Self {
        Self {
            element_type,
            shape: shape.into(),
        }
    }

    /// Change the declared shape; takes effect on the next inference
    pub fn set_partial_shape(&mut self, shape: impl Into<PartialShape>) {
        self.shape = shape.into();
    }
}

impl OpType for Parameter {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Parameter", 0);
}

impl Op for Parameter {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        if !inputs.is_empty() {
            return Err(InferError::Invalid(
                "parameter takes no inputs".to_string(),
            ));
        }
        Ok(vec![TensorDesc::new(self.element_type, self.shape.clone())])
    }
}
