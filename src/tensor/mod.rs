//! Tensor descriptions and constant data
//!
//! This module provides the value-level vocabulary of the graph:
//! - Element types (`dtype`)
//! - Partial and static shapes (`shape`)
//! - Host tensors backing constants (`data`)
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::tensor::{Dimension, ElementType, PartialShape};
//!
//! let batch_dynamic = PartialShape::from([Dimension::Dynamic, Dimension::Static(3)]);
//! assert!(batch_dynamic.is_dynamic());
//! assert_eq!(ElementType::F32.merge(ElementType::Dynamic), Some(ElementType::F32));
//! ```

pub mod data;
pub mod dtype;
pub mod shape;

// Re-export commonly used items
pub use data::Tensor;
pub use dtype::ElementType;
pub use shape::{normalize_axis, Dimension, PartialShape, Shape};

/// Element type plus shape of one graph value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TensorDesc {
    /// Element type
    pub element_type: ElementType,
    /// Shape
    pub shape: PartialShape,
}

impl TensorDesc {
    /// Create a description
    pub fn new(element_type: ElementType, shape: impl Into<PartialShape>) -> Self {
        Self {
            element_type,
            shape: shape.into(),
        }
    }

    /// Fully unknown description
    pub fn dynamic() -> Self {
        Self {
            element_type: ElementType::Dynamic,
            shape: PartialShape::dynamic(),
        }
    }
}

impl std::fmt::Display for TensorDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.element_type, self.shape)
    }
}
