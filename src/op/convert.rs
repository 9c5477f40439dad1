//! Element type conversion

use crate::error::{InferError, InferResult};
use crate::tensor::{ElementType, Tensor, TensorDesc};

use super::{check_input_count, Op, OpType, TypeInfo};

/// Convert values to another element type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convert {
    /// Target element type
    pub destination: ElementType,
}

impl Convert {
    /// Create a conversion to `destination`
    pub fn new(destination: ElementType) -> Self {
        Self { destination }
    }
}

impl OpType for Convert {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Convert", 0);
}

impl Op for Convert {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        check_input_count(inputs, 1)?;
        if self.destination.is_dynamic() {
            return Err(InferError::Type(
                "destination element type must be static".to_string(),
            ));
        }
        Ok(vec![TensorDesc::new(self.destination, inputs[0].shape.clone())])
    }

    fn evaluate(&self, inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
        let [input] = inputs else {
            return None;
        };
        Some(vec![input.map(self.destination, |v| v)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Dimension, PartialShape};

    #[test]
    fn test_convert_keeps_shape() {
        let shape = PartialShape::from([Dimension::Dynamic, Dimension::Static(2)]);
        let out = Convert::new(ElementType::I64)
            .validate_and_infer_types(&[TensorDesc::new(ElementType::F32, shape.clone())])
            .unwrap();
        assert_eq!(out[0], TensorDesc::new(ElementType::I64, shape));
    }

    #[test]
    fn test_convert_evaluate_truncates() {
        let t = Tensor::new(ElementType::F32, [2], vec![1.75, -0.5]).unwrap();
        let out = Convert::new(ElementType::I32).evaluate(&[&t]).unwrap();
        assert_eq!(out[0].element_type(), ElementType::I32);
        assert_eq!(out[0].values(), vec![1.0, 0.0]);
    }
}
