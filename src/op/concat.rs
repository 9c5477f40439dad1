//! Concatenation along one axis

use crate::error::{InferError, InferResult};
use crate::tensor::{normalize_axis, Dimension, ElementType, PartialShape, Tensor, TensorDesc};

use super::{Op, OpType, TypeInfo};

/// Join inputs along `axis`
///
/// All inputs must share a rank and agree on every dimension except `axis`.
/// A negative axis counts from the back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concat {
    /// Concatenation axis
    pub axis: i64,
}

impl Concat {
    /// Create a concatenation along `axis`
    pub fn new(axis: i64) -> Self {
        Self { axis }
    }
}

impl OpType for Concat {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Concat", 0);
}

impl Op for Concat {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        if inputs.is_empty() {
            return Err(InferError::Invalid(
                "at least one argument required".to_string(),
            ));
        }

        let mut element_type = ElementType::Dynamic;
        for (i, input) in inputs.iter().enumerate() {
            element_type = element_type.merge(input.element_type).ok_or_else(|| {
                InferError::Type(format!(
                    "argument {} element type {} is inconsistent with {}",
                    i, input.element_type, element_type
                ))
            })?;
        }

        let mut rank = None;
        for input in inputs {
            if let Some(r) = input.shape.rank() {
                match rank {
                    None => rank = Some(r),
                    Some(prev) if prev != r => {
                        return Err(InferError::Shape(format!(
                            "argument ranks are inconsistent: {} vs {}",
                            prev, r
                        )));
                    }
                    _ => {}
                }
            }
        }
        let Some(rank) = rank else {
            return Ok(vec![TensorDesc::new(element_type, PartialShape::dynamic())]);
        };

        let axis = normalize_axis(self.axis, rank).ok_or_else(|| {
            InferError::Invalid(format!("axis {} is out of range for rank {}", self.axis, rank))
        })?;

        let mut dims = vec![Dimension::Dynamic; rank];
        let mut concat_dim = Dimension::Static(0);
        for input in inputs {
            let Some(input_dims) = input.shape.dims() else {
                // Unknown rank: the axis length becomes unknown too
                concat_dim = Dimension::Dynamic;
                continue;
            };
            for (i, &d) in input_dims.iter().enumerate() {
                if i == axis {
                    concat_dim = concat_dim + d;
                } else {
                    dims[i] = dims[i].merge(d).ok_or_else(|| {
                        InferError::Shape(format!(
                            "dimension {} is inconsistent: {} vs {}",
                            i, dims[i], d
                        ))
                    })?;
                }
            }
        }
        dims[axis] = concat_dim;

        Ok(vec![TensorDesc::new(element_type, dims)])
    }

    fn evaluate(&self, inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
        let first = inputs.first()?;
        let axis = normalize_axis(self.axis, first.data().ndim())?;
        let mut element_type = ElementType::Dynamic;
        for t in inputs {
            element_type = element_type.merge(t.element_type())?;
        }
        let views = inputs.iter().map(|t| t.data().view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(ndarray::Axis(axis), &views).ok()?;
        Some(vec![Tensor::from_array(element_type, data)])
    }
}
