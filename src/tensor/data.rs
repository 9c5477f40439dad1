//! Constant tensor data
//!
//! Values are stored as `f64` in an `ndarray` array and coerced into the
//! range of the declared element type on construction.

use ndarray::{ArrayD, IxDyn, Zip};

use crate::error::{GraphError, GraphResult};

use super::dtype::ElementType;
use super::shape::{PartialShape, Shape};

/// Host tensor holding the value of a `Constant`
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    element_type: ElementType,
    data: ArrayD<f64>,
}

impl Tensor {
    /// Create a tensor from a flat, row-major value list
    pub fn new(
        element_type: ElementType,
        shape: impl Into<Shape>,
        values: Vec<f64>,
    ) -> GraphResult<Self> {
        let shape = shape.into();
        let expected = shape.numel();
        if values.len() != expected {
            return Err(GraphError::ShapeMismatch {
                node: "tensor".to_string(),
                message: format!(
                    "shape {} needs {} values, got {}",
                    shape,
                    expected,
                    values.len()
                ),
            });
        }
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| GraphError::Internal(e.to_string()))?;
        Ok(Self::from_array(element_type, data))
    }

    /// Rank-0 tensor
    pub fn scalar(element_type: ElementType, value: f64) -> Self {
        Self::from_array(element_type, ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Tensor of the given shape filled with one value
    pub fn filled(element_type: ElementType, shape: impl Into<Shape>, value: f64) -> Self {
        let shape = shape.into();
        Self::from_array(element_type, ArrayD::from_elem(IxDyn(&shape), value))
    }

    /// Wrap an array, coercing values to the element type
    pub fn from_array(element_type: ElementType, mut data: ArrayD<f64>) -> Self {
        data.mapv_inplace(|v| element_type.coerce(v));
        Self { element_type, data }
    }

    /// Element type
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Static shape
    pub fn shape(&self) -> Shape {
        Shape::from(self.data.shape())
    }

    /// Shape as a [`PartialShape`]
    pub fn partial_shape(&self) -> PartialShape {
        PartialShape::from(self.shape())
    }

    /// Underlying array
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Flat row-major values
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if every element equals `value`
    pub fn all_equal(&self, value: f64) -> bool {
        !self.data.is_empty() && self.data.iter().all(|&v| v == value)
    }

    /// Apply a scalar function elementwise
    pub fn map(&self, element_type: ElementType, f: impl Fn(f64) -> f64) -> Tensor {
        Tensor::from_array(element_type, self.data.mapv(f))
    }

    /// Numpy-broadcast binary function, `None` if the shapes don't broadcast
    pub fn zip_broadcast(
        &self,
        other: &Tensor,
        element_type: ElementType,
        f: impl Fn(f64, f64) -> f64,
    ) -> Option<Tensor> {
        let out = PartialShape::broadcast_merge(&self.partial_shape(), &other.partial_shape())?
            .to_shape()?;
        let lhs = self.data.broadcast(IxDyn(&out))?;
        let rhs = other.data.broadcast(IxDyn(&out))?;
        let data = Zip::from(&lhs).and(&rhs).map_collect(|&a, &b| f(a, b));
        Some(Tensor::from_array(element_type, data))
    }
}
