//! Operation kinds
//!
//! Every graph node wraps one boxed [`Op`]. An operation kind supplies the
//! minimal capability set the engine needs to match and rewrite it:
//!
//! - [`Op::type_info`]: stable type tag (name + version), what `wrap_type`
//!   patterns compare against
//! - [`Op::validate_and_infer_types`]: local element-type/shape rule
//! - [`Op::clone_op`]: copy of the attributes, used to re-create the node on
//!   new inputs
//!
//! and optionally [`Op::evaluate`] / [`Op::fold`] for constant folding.
//!
//! # Custom operations
//!
//! ```ignore
//! use graph_rewrite::op::{Op, OpType, TypeInfo};
//!
//! #[derive(Debug, Clone)]
//! struct Swish;
//!
//! impl OpType for Swish {
//!     const TYPE_INFO: TypeInfo = TypeInfo::new("Swish", 4);
//! }
//!
//! impl Op for Swish {
//!     graph_rewrite::op_common!();
//!
//!     fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
//!         check_input_count(inputs, 1)?;
//!         Ok(vec![inputs[0].clone()])
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;

use crate::error::{InferError, InferResult};
use crate::tensor::{Tensor, TensorDesc};

/// Implement the boilerplate members of [`Op`] for a type that implements
/// [`OpType`] and `Clone`
#[macro_export]
macro_rules! op_common {
    () => {
        fn type_info(&self) -> $crate::op::TypeInfo {
            <Self as $crate::op::OpType>::TYPE_INFO
        }

        fn clone_op(&self) -> ::std::boxed::Box<dyn $crate::op::Op> {
            ::std::boxed::Box::new(::std::clone::Clone::clone(self))
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

pub mod concat;
pub mod constant;
pub mod convert;
pub mod convolution;
pub mod elementwise;
pub mod parameter;
pub mod result;
pub mod shape_of;

pub use concat::Concat;
pub use constant::Constant;
pub use convert::Convert;
pub use convolution::{AutoPad, Convolution, MaxPool, RoundingType};
pub use elementwise::{
    Abs, Add, AutoBroadcast, Divide, Exp, Maximum, Minimum, Multiply, Negative, Power, Relu,
    Sqrt, Subtract,
};
pub use parameter::Parameter;
pub use result::Result;
pub use shape_of::ShapeOf;

/// Stable identifier of an operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeInfo {
    /// Operation name
    pub name: &'static str,
    /// Operation set version
    pub version: u64,
}

impl TypeInfo {
    /// Create a type tag
    pub const fn new(name: &'static str, version: u64) -> Self {
        Self { name, version }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v{}", self.name, self.version)
    }
}

/// Statically known type tag of an operation kind
///
/// Lets patterns and downcasts name a kind by its Rust type.
pub trait OpType: Op {
    /// Type tag shared by every instance
    const TYPE_INFO: TypeInfo;
}

/// Capability set of an operation kind
pub trait Op: fmt::Debug + Any {
    /// Type tag of this instance
    fn type_info(&self) -> TypeInfo;

    /// Compute output descriptions from input descriptions
    ///
    /// Must fail (not guess) when inputs violate the operation's static
    /// preconditions, and must mark every output dimension that depends on a
    /// dynamic input dimension as dynamic.
    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>>;

    /// Copy of this operation's attributes
    fn clone_op(&self) -> Box<dyn Op>;

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Compute outputs from constant inputs, `None` when not supported
    fn evaluate(&self, _inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
        None
    }

    /// Constant-fold given whatever input values are constant
    ///
    /// The default requires every input to be constant and defers to
    /// [`Op::evaluate`]. Operations that can fold from shapes alone override it.
    fn fold(&self, inputs: &[Option<&Tensor>], _descs: &[TensorDesc]) -> Option<Vec<Tensor>> {
        let values = inputs.iter().copied().collect::<Option<Vec<&Tensor>>>()?;
        self.evaluate(&values)
    }
}

impl dyn Op {
    /// Check whether this operation is of kind `T`
    pub fn is<T: OpType>(&self) -> bool {
        self.type_info() == T::TYPE_INFO
    }

    /// Downcast to a concrete kind
    pub fn downcast_ref<T: Op>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutable downcast to a concrete kind
    pub fn downcast_mut<T: Op>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Fail unless exactly `expected` inputs are given
pub fn check_input_count(inputs: &[TensorDesc], expected: usize) -> InferResult<()> {
    if inputs.len() != expected {
        return Err(InferError::Invalid(format!(
            "expected {} input(s), got {}",
            expected,
            inputs.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::ElementType;

    #[test]
    fn test_type_info_display() {
        assert_eq!(Multiply::TYPE_INFO.to_string(), "Multiply.v1");
        assert_eq!(Multiply::TYPE_INFO, Multiply::new().type_info());
        assert_ne!(Multiply::TYPE_INFO, Add::TYPE_INFO);
    }

    #[test]
    fn test_is_and_downcast() {
        let op: Box<dyn Op> = Box::new(Convert::new(ElementType::I32));
        assert!(op.is::<Convert>());
        assert!(!op.is::<Multiply>());
        assert_eq!(
            op.downcast_ref::<Convert>().map(|c| c.destination),
            Some(ElementType::I32)
        );
        assert!(op.downcast_ref::<Relu>().is_none());
    }

    #[test]
    fn test_clone_op_keeps_attributes() {
        let op = Concat::new(-1);
        let cloned = op.clone_op();
        assert_eq!(cloned.downcast_ref::<Concat>().map(|c| c.axis), Some(-1));
    }

    #[test]
    fn test_check_input_count() {
        let descs = vec![TensorDesc::dynamic()];
        assert!(check_input_count(&descs, 1).is_ok());
        assert!(matches!(
            check_input_count(&descs, 2),
            Err(InferError::Invalid(_))
        ));
    }
}
