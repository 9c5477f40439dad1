//! Sliding-window operations
//!
//! Both kinds share the spatial output rule
//! `(input + pad_begin + pad_end - effective_kernel) / stride + 1` with
//! `effective_kernel = (kernel - 1) * dilation + 1`. Convolution always rounds
//! down; pooling rounds per [`RoundingType`]. With `SAME_*` auto-padding the
//! output is `ceil(input / stride)` regardless of the kernel.

use crate::error::{InferError, InferResult};
use crate::tensor::{Dimension, ElementType, PartialShape, TensorDesc};

use super::{check_input_count, Op, OpType, TypeInfo};

/// Padding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoPad {
    /// Use the `pads_begin` / `pads_end` attributes
    #[default]
    Explicit,
    /// No padding
    Valid,
    /// Pad so that `out = ceil(in / stride)`, odd padding at the end
    SameUpper,
    /// Pad so that `out = ceil(in / stride)`, odd padding at the beginning
    SameLower,
}

/// Rounding of the spatial output length for pooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingType {
    /// Round down
    #[default]
    Floor,
    /// Round up
    Ceil,
}

/// Per-axis window geometry
#[derive(Debug, Clone, Copy)]
struct Window {
    stride: usize,
    dilation: usize,
    pad_begin: usize,
    pad_end: usize,
}

fn spatial_output(
    input: Dimension,
    kernel: Dimension,
    window: Window,
    auto_pad: AutoPad,
    rounding: RoundingType,
) -> InferResult<Dimension> {
    let Window {
        stride,
        dilation,
        mut pad_begin,
        mut pad_end,
    } = window;

    if matches!(auto_pad, AutoPad::SameUpper | AutoPad::SameLower) {
        return Ok(match input {
            Dimension::Static(len) => Dimension::Static(len.div_ceil(stride)),
            Dimension::Dynamic => Dimension::Dynamic,
        });
    }
    if auto_pad == AutoPad::Valid {
        pad_begin = 0;
        pad_end = 0;
    }

    let (Dimension::Static(input), Dimension::Static(kernel)) = (input, kernel) else {
        return Ok(Dimension::Dynamic);
    };
    if kernel == 0 {
        return Err(InferError::Shape("kernel length must be positive".to_string()));
    }

    let padded = input + pad_begin + pad_end;
    let effective_kernel = (kernel - 1) * dilation + 1;
    if effective_kernel > padded {
        return Err(InferError::Shape(format!(
            "effective kernel {} is larger than padded input {}",
            effective_kernel, padded
        )));
    }

    let span = padded - effective_kernel;
    let mut out = match rounding {
        RoundingType::Floor => span / stride + 1,
        RoundingType::Ceil => span.div_ceil(stride) + 1,
    };
    // The last window must start inside the input or the leading padding
    if rounding == RoundingType::Ceil && (out - 1) * stride >= input + pad_begin {
        out -= 1;
    }
    Ok(Dimension::Static(out))
}

fn dims_or_dynamic(shape: &PartialShape, rank: usize) -> Vec<Dimension> {
    match shape.dims() {
        Some(dims) => dims.to_vec(),
        None => vec![Dimension::Dynamic; rank],
    }
}

fn check_attribute(name: &str, values: &[usize], spatial: usize) -> InferResult<()> {
    if values.len() != spatial {
        return Err(InferError::Invalid(format!(
            "{} has {} value(s), expected {}",
            name,
            values.len(),
            spatial
        )));
    }
    Ok(())
}

fn check_positive(name: &str, values: &[usize]) -> InferResult<()> {
    if values.contains(&0) {
        return Err(InferError::Invalid(format!("{} must be positive", name)));
    }
    Ok(())
}

/// N-D convolution of `[N, C_in, spatial...]` data with
/// `[C_out, C_in, kernel...]` filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convolution {
    /// Window stride per spatial axis
    pub strides: Vec<usize>,
    /// Kernel dilation per spatial axis
    pub dilations: Vec<usize>,
    /// Leading padding per spatial axis
    pub pads_begin: Vec<usize>,
    /// Trailing padding per spatial axis
    pub pads_end: Vec<usize>,
    /// Padding mode
    pub auto_pad: AutoPad,
}

impl Convolution {
    /// Create a convolution
    pub fn new(
        strides: Vec<usize>,
        dilations: Vec<usize>,
        pads_begin: Vec<usize>,
        pads_end: Vec<usize>,
        auto_pad: AutoPad,
    ) -> Self {
        Self {
            strides,
            dilations,
            pads_begin,
            pads_end,
            auto_pad,
        }
    }

    /// Unit strides and dilations, no padding
    pub fn unit(spatial_rank: usize) -> Self {
        Self::new(
            vec![1; spatial_rank],
            vec![1; spatial_rank],
            vec![0; spatial_rank],
            vec![0; spatial_rank],
            AutoPad::Explicit,
        )
    }
}

impl OpType for Convolution {
    const TYPE_INFO: TypeInfo = TypeInfo::new("Convolution", 1);
}

impl Op for Convolution {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        check_input_count(inputs, 2)?;
        let (data, filters) = (&inputs[0], &inputs[1]);

        let element_type = data.element_type.merge(filters.element_type).ok_or_else(|| {
            InferError::Type(format!(
                "data and filter element types are inconsistent: {} vs {}",
                data.element_type, filters.element_type
            ))
        })?;
        if element_type == ElementType::Boolean {
            return Err(InferError::Type(
                "arguments cannot have boolean element type".to_string(),
            ));
        }

        let rank = match (data.shape.rank(), filters.shape.rank()) {
            (Some(a), Some(b)) if a != b => {
                return Err(InferError::Shape(format!(
                    "data rank {} and filter rank {} differ",
                    a, b
                )));
            }
            (Some(r), _) | (_, Some(r)) => r,
            (None, None) => {
                return Ok(vec![TensorDesc::new(element_type, PartialShape::dynamic())]);
            }
        };
        if rank < 3 {
            return Err(InferError::Shape(format!(
                "expected rank of at least 3, got {}",
                rank
            )));
        }

        let spatial = rank - 2;
        check_attribute("strides", &self.strides, spatial)?;
        check_attribute("dilations", &self.dilations, spatial)?;
        check_positive("strides", &self.strides)?;
        check_positive("dilations", &self.dilations)?;
        if self.auto_pad == AutoPad::Explicit {
            check_attribute("pads_begin", &self.pads_begin, spatial)?;
            check_attribute("pads_end", &self.pads_end, spatial)?;
        }

        let data_shape = dims_or_dynamic(&data.shape, rank);
        let filter_shape = dims_or_dynamic(&filters.shape, rank);

        data_shape[1].merge(filter_shape[1]).ok_or_else(|| {
            InferError::Shape(format!(
                "data channels {} and filter input channels {} differ",
                data_shape[1], filter_shape[1]
            ))
        })?;

        let mut out = Vec::with_capacity(rank);
        out.push(data_shape[0]);
        out.push(filter_shape[0]);
        for i in 0..spatial {
            let window = Window {
                stride: self.strides[i],
                dilation: self.dilations[i],
                pad_begin: self.pads_begin.get(i).copied().unwrap_or(0),
                pad_end: self.pads_end.get(i).copied().unwrap_or(0),
            };
            out.push(spatial_output(
                data_shape[i + 2],
                filter_shape[i + 2],
                window,
                self.auto_pad,
                RoundingType::Floor,
            )?);
        }

        Ok(vec![TensorDesc::new(element_type, out)])
    }
}

/// Max pooling of `[N, C, spatial...]` data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxPool {
    /// Window stride per spatial axis
    pub strides: Vec<usize>,
    /// Leading padding per spatial axis
    pub pads_begin: Vec<usize>,
    /// Trailing padding per spatial axis
    pub pads_end: Vec<usize>,
    /// Window size per spatial axis
    pub kernel: Vec<usize>,
    /// Output length rounding
    pub rounding_type: RoundingType,
    /// Padding mode
    pub auto_pad: AutoPad,
}

impl MaxPool {
    /// Create a max pooling operation
    pub fn new(
        strides: Vec<usize>,
        pads_begin: Vec<usize>,
        pads_end: Vec<usize>,
        kernel: Vec<usize>,
        rounding_type: RoundingType,
        auto_pad: AutoPad,
    ) -> Self {
        Self {
            strides,
            pads_begin,
            pads_end,
            kernel,
            rounding_type,
            auto_pad,
        }
    }
}

impl OpType for MaxPool {
    const TYPE_INFO: TypeInfo = TypeInfo::new("MaxPool", 1);
}

impl Op for MaxPool {
    crate::op_common!();

    fn validate_and_infer_types(&self, inputs: &[TensorDesc]) -> InferResult<Vec<TensorDesc>> {
        check_input_count(inputs, 1)?;
        let data = &inputs[0];

        let spatial = self.kernel.len();
        let rank = spatial + 2;
        if let Some(r) = data.shape.rank() {
            if r != rank {
                return Err(InferError::Shape(format!(
                    "data rank {} does not match kernel rank {}",
                    r, spatial
                )));
            }
        }
        if spatial == 0 {
            return Err(InferError::Invalid("kernel must not be empty".to_string()));
        }
        check_attribute("strides", &self.strides, spatial)?;
        check_positive("strides", &self.strides)?;
        check_positive("kernel", &self.kernel)?;
        if self.auto_pad == AutoPad::Explicit {
            check_attribute("pads_begin", &self.pads_begin, spatial)?;
            check_attribute("pads_end", &self.pads_end, spatial)?;
        }

        let data_shape = dims_or_dynamic(&data.shape, rank);

        let mut out = Vec::with_capacity(rank);
        out.push(data_shape[0]);
        out.push(data_shape[1]);
        for i in 0..spatial {
            let window = Window {
                stride: self.strides[i],
                dilation: 1,
                pad_begin: self.pads_begin.get(i).copied().unwrap_or(0),
                pad_end: self.pads_end.get(i).copied().unwrap_or(0),
            };
            out.push(spatial_output(
                data_shape[i + 2],
                Dimension::Static(self.kernel[i]),
                window,
                self.auto_pad,
                self.rounding_type,
            )?);
        }

        Ok(vec![TensorDesc::new(data.element_type, out)])
    }
}
