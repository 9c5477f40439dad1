//! Shape extraction

use crate::error::InferResult;
use crate::tensor::{Dimension, ElementType, PartialShape, Tensor, TensorDesc};

use super::{check_input_count, Op, OpType, TypeInfo};

/// Produce the shape of the input as a 1-D `i64` tensor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeOf;

impl ShapeOf {
    /// Create the operation
    pub fn new() -> Self {
        Self
    }
}

impl OpType for ShapeOf {
    const TYPE_INFO: TypeInfo = TypeInfo::new("ShapeOf", 3);
}

impl Op for ShapeOf {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        check_input_count(inputs, 1)?;
        let length = match inputs[0].shape.rank() {
            Some(rank) => Dimension::Static(rank),
            None => Dimension::Dynamic,
        };
        Ok(vec![TensorDesc::new(
            ElementType::I64,
            PartialShape::new([length]),
        )])
    }

    fn evaluate(&self, inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
        let [input] = inputs else {
            return None;
        };
        Some(vec![shape_tensor(&input.shape())])
    }

    // Folds whenever the input shape is static, the value itself is not needed
    fn fold(&self, _inputs: &[Option<&Tensor>], descs: &[TensorDesc]) -> Option<Vec<Tensor>> {
        let [desc] = descs else {
            return None;
        };
        let shape = desc.shape.to_shape()?;
        Some(vec![shape_tensor(&shape)])
    }
}

fn shape_tensor(dims: &[usize]) -> Tensor {
    let values = dims.iter().map(|&d| d as f64).collect::<Vec<_>>();
    Tensor::from_array(ElementType::I64, ndarray::Array1::from(values).into_dyn())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_of_infer() {
        let out = ShapeOf::new()
            .validate_and_infer_types(&[TensorDesc::new(
                ElementType::F32,
                [Dimension::Dynamic, Dimension::Static(3)],
            )])
            .unwrap();
        assert_eq!(out[0], TensorDesc::new(ElementType::I64, [2]));

        let out = ShapeOf::new()
            .validate_and_infer_types(&[TensorDesc::dynamic()])
            .unwrap();
        assert_eq!(out[0].shape, PartialShape::new([Dimension::Dynamic]));
    }

    #[test]
    fn test_shape_of_folds_from_static_desc() {
        let desc = TensorDesc::new(ElementType::F32, [2, 5, 7]);
        let out = ShapeOf::new().fold(&[None], &[desc]).unwrap();
        assert_eq!(out[0].values(), vec![2.0, 5.0, 7.0]);
        assert_eq!(out[0].element_type(), ElementType::I64);

        let dynamic = TensorDesc::new(ElementType::F32, [Dimension::Dynamic]);
        assert!(ShapeOf::new().fold(&[None], &[dynamic]).is_none());
    }
}
