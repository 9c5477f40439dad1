//! Elementwise operations
//!
//! Unary kinds pass their input description through. Binary arithmetic kinds
//! merge element types and broadcast shapes according to [`AutoBroadcast`].

use crate::error::{InferError, InferResult};
use crate::tensor::{ElementType, PartialShape, Tensor, TensorDesc};

use super::{check_input_count, Op, OpType, TypeInfo};

/// Shape rule for binary elementwise operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoBroadcast {
    /// Shapes must merge exactly
    None,
    /// Numpy-style trailing-dimension broadcasting
    #[default]
    Numpy,
}

/// Shared inference rule for binary arithmetic
pub fn infer_binary_arithmetic(
    inputs: &[TensorDesc],
    broadcast: AutoBroadcast,
) -> InferResult<Vec<TensorDesc>> {
    check_input_count(inputs, 2)?;
    let (lhs, rhs) = (&inputs[0], &inputs[1]);

    let element_type = lhs.element_type.merge(rhs.element_type).ok_or_else(|| {
        InferError::Type(format!(
            "argument element types are inconsistent: {} vs {}",
            lhs.element_type, rhs.element_type
        ))
    })?;
    if element_type == ElementType::Boolean {
        return Err(InferError::Type(
            "arguments cannot have boolean element type".to_string(),
        ));
    }

    let shape = match broadcast {
        AutoBroadcast::None => PartialShape::merge(&lhs.shape, &rhs.shape),
        AutoBroadcast::Numpy => PartialShape::broadcast_merge(&lhs.shape, &rhs.shape),
    }
    .ok_or_else(|| {
        InferError::Shape(format!(
            "argument shapes are inconsistent: {} vs {}",
            lhs.shape, rhs.shape
        ))
    })?;

    Ok(vec![TensorDesc::new(element_type, shape)])
}

fn evaluate_binary(
    inputs: &[&Tensor],
    broadcast: AutoBroadcast,
    f: impl Fn(f64, f64) -> f64,
) -> Option<Vec<Tensor>> {
    let [lhs, rhs] = inputs else {
        return None;
    };
    let element_type = lhs.element_type().merge(rhs.element_type())?;
    if broadcast == AutoBroadcast::None && lhs.shape() != rhs.shape() {
        return None;
    }
    lhs.zip_broadcast(rhs, element_type, f).map(|t| vec![t])
}

macro_rules! binary_arithmetic {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $f:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            /// Broadcasting rule
            pub auto_broadcast: AutoBroadcast,
        }

        impl $name {
            /// Create with numpy broadcasting
            pub fn new() -> Self {
                Self::default()
            }

            /// Create with an explicit broadcasting rule
            pub fn with_broadcast(auto_broadcast: AutoBroadcast) -> Self {
                Self { auto_broadcast }
            }
        }

        impl OpType for $name {
            const TYPE_INFO: TypeInfo = TypeInfo::new($type_name, 1);
        }

        impl Op for $name {
            crate::op_common!();

            fn validate_and_infer_types(
                &self,
                inputs: &[TensorDesc],
            ) -> InferResult<Vec<TensorDesc>> {
                infer_binary_arithmetic(inputs, self.auto_broadcast)
            }

            fn evaluate(&self, inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
                evaluate_binary(inputs, self.auto_broadcast, $f)
            }
        }
    };
}

binary_arithmetic!(
    /// Elementwise sum
    Add, "Add", |a, b| a + b
);
binary_arithmetic!(
    /// Elementwise difference
    Subtract, "Subtract", |a, b| a - b
);
binary_arithmetic!(
    /// Elementwise product
    Multiply, "Multiply", |a, b| a * b
);
binary_arithmetic!(
    /// Elementwise quotient
    Divide, "Divide", |a, b| a / b
);
binary_arithmetic!(
    /// Elementwise maximum
    Maximum, "Maximum", f64::max
);
binary_arithmetic!(
    /// Elementwise minimum
    Minimum, "Minimum", f64::min
);
binary_arithmetic!(
    /// Elementwise power
    Power, "Power", f64::powf
);

macro_rules! unary {
    (
        $(#[$doc:meta])* $name:ident, $type_name:literal,
        allow_bool = $allow_bool:literal, $f:expr
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            /// Create the operation
            pub fn new() -> Self {
                Self
            }
        }

        impl OpType for $name {
            const TYPE_INFO: TypeInfo = TypeInfo::new($type_name, 1);
        }

        impl Op for $name {
            crate::op_common!();

            fn validate_and_infer_types(
                &self,
                inputs: &[TensorDesc],
            ) -> InferResult<Vec<TensorDesc>> {
                check_input_count(inputs, 1)?;
                if !$allow_bool && inputs[0].element_type == ElementType::Boolean {
                    return Err(InferError::Type(
                        "argument cannot have boolean element type".to_string(),
                    ));
                }
                Ok(vec![inputs[0].clone()])
            }

            fn evaluate(&self, inputs: &[&Tensor]) -> Option<Vec<Tensor>> {
                let [input] = inputs else {
                    return None;
                };
                Some(vec![input.map(input.element_type(), $f)])
            }
        }
    };
}

unary!(
    /// Elementwise negation
    Negative, "Negative", allow_bool = false, |x: f64| -x
);
unary!(
    /// Rectified linear unit
    Relu, "Relu", allow_bool = false, |x: f64| x.max(0.0)
);
unary!(
    /// Absolute value
    Abs, "Abs", allow_bool = false, f64::abs
);
unary!(
    /// Natural exponent
    Exp, "Exp", allow_bool = false, f64::exp
);
unary!(
    /// Square root
    Sqrt, "Sqrt", allow_bool = false, f64::sqrt
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Dimension::{Dynamic, Static};

    fn desc(et: ElementType, shape: impl Into<PartialShape>) -> TensorDesc {
        TensorDesc::new(et, shape)
    }

    #[test]
    fn test_binary_numpy_broadcast() {
        let out = Multiply::new()
            .validate_and_infer_types(&[
                desc(ElementType::F32, [2, 1, 4]),
                desc(ElementType::F32, [3, 1]),
            ])
            .unwrap();
        assert_eq!(out, vec![desc(ElementType::F32, [2, 3, 4])]);
    }

    #[test]
    fn test_binary_dynamic_dimension_stays_dynamic() {
        let out = Add::new()
            .validate_and_infer_types(&[
                desc(ElementType::F32, [Dynamic, Static(4)]),
                desc(ElementType::F32, [1, 4]),
            ])
            .unwrap();
        assert_eq!(out[0].shape, PartialShape::from([Dynamic, Static(4)]));
    }

    #[test]
    fn test_binary_type_mismatch() {
        let err = Add::new()
            .validate_and_infer_types(&[
                desc(ElementType::F32, [2]),
                desc(ElementType::I64, [2]),
            ])
            .unwrap_err();
        assert!(matches!(err, InferError::Type(_)));
    }

    #[test]
    fn test_binary_rejects_boolean() {
        let err = Subtract::new()
            .validate_and_infer_types(&[
                desc(ElementType::Boolean, [2]),
                desc(ElementType::Boolean, [2]),
            ])
            .unwrap_err();
        assert!(matches!(err, InferError::Type(_)));
    }

    #[test]
    fn test_binary_no_broadcast_requires_equal_shapes() {
        let op = Add::with_broadcast(AutoBroadcast::None);
        let err = op
            .validate_and_infer_types(&[
                desc(ElementType::F32, [2, 3]),
                desc(ElementType::F32, [3]),
            ])
            .unwrap_err();
        assert!(matches!(err, InferError::Shape(_)));

        let out = op
            .validate_and_infer_types(&[
                desc(ElementType::F32, [Dynamic, Static(3)]),
                desc(ElementType::F32, [2, 3]),
            ])
            .unwrap();
        assert_eq!(out[0].shape, PartialShape::from([2, 3]));
    }

    #[test]
    fn test_binary_evaluate() {
        let a = Tensor::new(ElementType::F32, [2], vec![3.0, 4.0]).unwrap();
        let b = Tensor::scalar(ElementType::F32, 0.5);
        let out = Multiply::new().evaluate(&[&a, &b]).unwrap();
        assert_eq!(out[0].values(), vec![1.5, 2.0]);

        let out = Maximum::new().evaluate(&[&a, &Tensor::scalar(ElementType::F32, 3.5)]).unwrap();
        assert_eq!(out[0].values(), vec![3.5, 4.0]);
    }

    #[test]
    fn test_integer_divide_truncates() {
        let a = Tensor::new(ElementType::I32, [2], vec![7.0, -7.0]).unwrap();
        let b = Tensor::scalar(ElementType::I32, 2.0);
        let out = Divide::new().evaluate(&[&a, &b]).unwrap();
        assert_eq!(out[0].values(), vec![3.0, -3.0]);
    }

    #[test]
    fn test_unary_passthrough() {
        let input = desc(ElementType::F16, [Dynamic, Static(8)]);
        let out = Relu::new().validate_and_infer_types(&[input.clone()]).unwrap();
        assert_eq!(out, vec![input]);
        assert!(Negative::new()
            .validate_and_infer_types(&[desc(ElementType::Boolean, [1])])
            .is_err());
    }

    #[test]
    fn test_unary_evaluate() {
        let a = Tensor::new(ElementType::F32, [3], vec![-1.0, 0.0, 2.0]).unwrap();
        assert_eq!(Negative::new().evaluate(&[&a]).unwrap()[0].values(), vec![1.0, -0.0, -2.0]);
        assert_eq!(Relu::new().evaluate(&[&a]).unwrap()[0].values(), vec![0.0, 0.0, 2.0]);
    }
}
