//! Element types
//!
//! The scalar type carried by every graph value. `Dynamic` is the unknown
//! type and merges with anything.

use std::fmt;

/// Element type of a graph value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementType {
    /// Not yet known
    #[default]
    Dynamic,
    /// Boolean
    Boolean,
    /// IEEE half precision
    F16,
    /// IEEE single precision
    F32,
    /// IEEE double precision
    F64,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer
    U64,
}

impl ElementType {
    /// Check if the type is known
    pub fn is_static(self) -> bool {
        self != ElementType::Dynamic
    }

    /// Check if the type is unknown
    pub fn is_dynamic(self) -> bool {
        self == ElementType::Dynamic
    }

    /// Check if data type is signed
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ElementType::I8
                | ElementType::I16
                | ElementType::I32
                | ElementType::I64
                | ElementType::F16
                | ElementType::F32
                | ElementType::F64
        )
    }

    /// Size in bytes, `None` for `Dynamic`
    pub fn size(self) -> Option<usize> {
        match self {
            ElementType::Dynamic => None,
            ElementType::Boolean | ElementType::I8 | ElementType::U8 => Some(1),
            ElementType::F16 | ElementType::I16 | ElementType::U16 => Some(2),
            ElementType::F32 | ElementType::I32 | ElementType::U32 => Some(4),
            ElementType::F64 | ElementType::I64 | ElementType::U64 => Some(8),
        }
    }

    /// Merge two element types
    ///
    /// `Dynamic` yields the other side; two static types merge only if equal.
    pub fn merge(self, other: ElementType) -> Option<ElementType> {
        match (self, other) {
            (ElementType::Dynamic, t) | (t, ElementType::Dynamic) => Some(t),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }

    /// Coerce an `f64` into the value range of this type
    ///
    /// Integers truncate toward zero and saturate, booleans become 0/1,
    /// reduced-precision floats round through `f32`.
    pub fn coerce(self, value: f64) -> f64 {
        fn clamp_int(v: f64, min: f64, max: f64) -> f64 {
            if v.is_nan() {
                0.0
            } else {
                v.trunc().clamp(min, max)
            }
        }

        match self {
            ElementType::Dynamic | ElementType::F64 => value,
            ElementType::F16 | ElementType::F32 => value as f32 as f64,
            ElementType::Boolean => {
                if value != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ElementType::I8 => clamp_int(value, i8::MIN as f64, i8::MAX as f64),
            ElementType::I16 => clamp_int(value, i16::MIN as f64, i16::MAX as f64),
            ElementType::I32 => clamp_int(value, i32::MIN as f64, i32::MAX as f64),
            ElementType::I64 => clamp_int(value, i64::MIN as f64, i64::MAX as f64),
            ElementType::U8 => clamp_int(value, 0.0, u8::MAX as f64),
            ElementType::U16 => clamp_int(value, 0.0, u16::MAX as f64),
            ElementType::U32 => clamp_int(value, 0.0, u32::MAX as f64),
            ElementType::U64 => clamp_int(value, 0.0, u64::MAX as f64),
        }
    }

    /// Short lowercase name (`f32`, `i64`, ...)
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Dynamic => "dynamic",
            ElementType::Boolean => "boolean",
            ElementType::F16 => "f16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
