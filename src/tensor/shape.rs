//! Shapes with optional dynamism
//!
//! [`PartialShape`] is the shape carried on every graph value: the rank may be
//! unknown, and each dimension of a known rank may be unknown. [`Shape`] is the
//! fully static special case.

use std::fmt;
use std::ops::{Add, Deref};

use smallvec::SmallVec;

/// One dimension of a [`PartialShape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Known, non-negative length
    Static(usize),
    /// Unknown length
    Dynamic,
}

impl Dimension {
    /// Check if the length is known
    pub fn is_static(self) -> bool {
        matches!(self, Dimension::Static(_))
    }

    /// Check if the length is unknown
    pub fn is_dynamic(self) -> bool {
        matches!(self, Dimension::Dynamic)
    }

    /// Merge two dimensions; static lengths must agree
    pub fn merge(self, other: Dimension) -> Option<Dimension> {
        match (self, other) {
            (Dimension::Dynamic, d) | (d, Dimension::Dynamic) => Some(d),
            (Dimension::Static(a), Dimension::Static(b)) if a == b => Some(self),
            _ => None,
        }
    }

    /// Numpy broadcast of two dimensions
    ///
    /// A static 1 yields the other side. A dynamic dimension against a static
    /// length greater than one yields that length.
    pub fn broadcast_merge(self, other: Dimension) -> Option<Dimension> {
        match (self, other) {
            (Dimension::Static(1), d) | (d, Dimension::Static(1)) => Some(d),
            (Dimension::Dynamic, d) | (d, Dimension::Dynamic) => Some(d),
            (Dimension::Static(a), Dimension::Static(b)) if a == b => Some(self),
            _ => None,
        }
    }
}

impl Add for Dimension {
    type Output = Dimension;

    fn add(self, rhs: Dimension) -> Dimension {
        match (self, rhs) {
            (Dimension::Static(a), Dimension::Static(b)) => Dimension::Static(a + b),
            _ => Dimension::Dynamic,
        }
    }
}

impl From<usize> for Dimension {
    fn from(len: usize) -> Self {
        Dimension::Static(len)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Static(len) => write!(f, "{}", len),
            Dimension::Dynamic => f.write_str("?"),
        }
    }
}

/// Fully static shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// Create a shape from dimension lengths
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Self {
        Self(dims.into_iter().collect())
    }

    /// Rank-0 shape
    pub fn scalar() -> Self {
        Self(SmallVec::new())
    }

    /// Calculate total number of elements (1 for a scalar)
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.iter().copied())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", d)?;
        }
        f.write_str("]")
    }
}

/// Shape whose rank and dimensions may be unknown
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialShape {
    dims: Option<SmallVec<[Dimension; 4]>>,
}

impl PartialShape {
    /// Shape with unknown rank
    pub fn dynamic() -> Self {
        Self { dims: None }
    }

    /// Shape of known rank from explicit dimensions
    pub fn new(dims: impl IntoIterator<Item = Dimension>) -> Self {
        Self {
            dims: Some(dims.into_iter().collect()),
        }
    }

    /// Rank-0 static shape
    pub fn scalar() -> Self {
        Self::new(std::iter::empty())
    }

    /// Rank if known
    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(|d| d.len())
    }

    /// Check if the rank is known
    pub fn is_rank_static(&self) -> bool {
        self.dims.is_some()
    }

    /// Check if rank and all dimensions are known
    pub fn is_static(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|d| d.iter().all(|dim| dim.is_static()))
    }

    /// Check if anything is unknown
    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Dimensions if the rank is known
    pub fn dims(&self) -> Option<&[Dimension]> {
        self.dims.as_deref()
    }

    /// Dimension at `index`, `None` if the rank is unknown or too small
    pub fn dim(&self, index: usize) -> Option<Dimension> {
        self.dims.as_ref().and_then(|d| d.get(index).copied())
    }

    /// Convert to a static shape if fully known
    pub fn to_shape(&self) -> Option<Shape> {
        let dims = self.dims.as_ref()?;
        dims.iter()
            .map(|d| match d {
                Dimension::Static(len) => Some(*len),
                Dimension::Dynamic => None,
            })
            .collect::<Option<SmallVec<[usize; 4]>>>()
            .map(Shape)
    }

    /// Merge two shapes
    ///
    /// Unknown rank yields the other side; known ranks must agree and every
    /// dimension pair must merge.
    pub fn merge(a: &PartialShape, b: &PartialShape) -> Option<PartialShape> {
        match (&a.dims, &b.dims) {
            (None, _) => Some(b.clone()),
            (_, None) => Some(a.clone()),
            (Some(da), Some(db)) => {
                if da.len() != db.len() {
                    return None;
                }
                let dims = da
                    .iter()
                    .zip(db.iter())
                    .map(|(x, y)| x.merge(*y))
                    .collect::<Option<SmallVec<[Dimension; 4]>>>()?;
                Some(PartialShape { dims: Some(dims) })
            }
        }
    }

    /// Numpy-style broadcast of two shapes
    ///
    /// Unknown rank on either side yields unknown rank.
    pub fn broadcast_merge(a: &PartialShape, b: &PartialShape) -> Option<PartialShape> {
        let (da, db) = match (&a.dims, &b.dims) {
            (Some(da), Some(db)) => (da, db),
            _ => return Some(PartialShape::dynamic()),
        };

        let rank = da.len().max(db.len());
        let mut dims: SmallVec<[Dimension; 4]> = SmallVec::from_elem(Dimension::Dynamic, rank);

        for i in 0..rank {
            // Index from the right (broadcasting aligns from trailing dimensions)
            let x = if i < da.len() {
                da[da.len() - 1 - i]
            } else {
                Dimension::Static(1)
            };
            let y = if i < db.len() {
                db[db.len() - 1 - i]
            } else {
                Dimension::Static(1)
            };
            dims[rank - 1 - i] = x.broadcast_merge(y)?;
        }

        Some(PartialShape { dims: Some(dims) })
    }
}

impl Default for PartialShape {
    fn default() -> Self {
        PartialShape::dynamic()
    }
}

impl From<Shape> for PartialShape {
    fn from(shape: Shape) -> Self {
        PartialShape::new(shape.iter().map(|&d| Dimension::Static(d)))
    }
}

impl From<&Shape> for PartialShape {
    fn from(shape: &Shape) -> Self {
        PartialShape::new(shape.iter().map(|&d| Dimension::Static(d)))
    }
}

impl From<Vec<Dimension>> for PartialShape {
    fn from(dims: Vec<Dimension>) -> Self {
        PartialShape::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for PartialShape {
    fn from(dims: [usize; N]) -> Self {
        PartialShape::new(dims.into_iter().map(Dimension::Static))
    }
}

impl<const N: usize> From<[Dimension; N]> for PartialShape {
    fn from(dims: [Dimension; N]) -> Self {
        PartialShape::new(dims)
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dims {
            None => f.write_str("[...]"),
            Some(dims) => {
                f.write_str("[")?;
                for (i, d) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", d)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Normalize a possibly negative axis against a rank
pub fn normalize_axis(axis: i64, rank: usize) -> Option<usize> {
    let rank_i64 = rank as i64;
    let normalized = if axis < 0 { axis + rank_i64 } else { axis };

    if normalized < 0 || normalized >= rank_i64 {
        None
    } else {
        Some(normalized as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Dimension::{Dynamic, Static};

    #[test]
    fn test_numel() {
        assert_eq!(Shape::from([2, 3, 4]).numel(), 24);
        assert_eq!(Shape::from([1, 1, 1]).numel(), 1);
        assert_eq!(Shape::scalar().numel(), 1);
    }

    #[test]
    fn test_static_and_dynamic() {
        assert!(PartialShape::from([1, 3, 224, 224]).is_static());
        assert!(PartialShape::from([Dynamic, Static(3)]).is_dynamic());
        assert!(PartialShape::dynamic().is_dynamic());
        assert!(!PartialShape::dynamic().is_rank_static());
        assert_eq!(PartialShape::from([Dynamic, Dynamic, Dynamic]).rank(), Some(3));
    }

    #[test]
    fn test_to_shape() {
        assert_eq!(
            PartialShape::from([2, 5]).to_shape(),
            Some(Shape::from([2, 5]))
        );
        assert_eq!(PartialShape::from([Dynamic, Static(5)]).to_shape(), None);
        assert_eq!(PartialShape::dynamic().to_shape(), None);
    }

    #[test]
    fn test_merge() {
        let a = PartialShape::from([Dynamic, Static(3)]);
        let b = PartialShape::from([Static(2), Dynamic]);
        assert_eq!(
            PartialShape::merge(&a, &b),
            Some(PartialShape::from([2, 3]))
        );

        let c = PartialShape::from([4, 3]);
        assert_eq!(PartialShape::merge(&PartialShape::from([2, 3]), &c), None);
        assert_eq!(PartialShape::merge(&PartialShape::dynamic(), &c), Some(c.clone()));
        assert_eq!(PartialShape::merge(&PartialShape::from([4]), &c), None);
    }

    #[test]
    fn test_broadcast_merge() {
        let r = PartialShape::broadcast_merge(
            &PartialShape::from([1, 3, 1]),
            &PartialShape::from([2, 1, 4]),
        );
        assert_eq!(r, Some(PartialShape::from([2, 3, 4])));

        let r =
            PartialShape::broadcast_merge(&PartialShape::from([3, 4]), &PartialShape::from([4]));
        assert_eq!(r, Some(PartialShape::from([3, 4])));

        assert_eq!(
            PartialShape::broadcast_merge(&PartialShape::from([3, 4]), &PartialShape::from([5])),
            None
        );
    }

    #[test]
    fn test_broadcast_merge_dynamic() {
        // dynamic against 1 stays dynamic, dynamic against 5 becomes 5
        let r = PartialShape::broadcast_merge(
            &PartialShape::from([Dynamic, Dynamic]),
            &PartialShape::from([1, 5]),
        );
        assert_eq!(r, Some(PartialShape::from([Dynamic, Static(5)])));

        let r = PartialShape::broadcast_merge(&PartialShape::dynamic(), &PartialShape::from([5]));
        assert_eq!(r, Some(PartialShape::dynamic()));
    }

    #[test]
    fn test_dimension_add() {
        assert_eq!(Static(2) + Static(3), Static(5));
        assert_eq!(Static(2) + Dynamic, Dynamic);
    }

    #[test]
    fn test_display() {
        assert_eq!(PartialShape::from([Dynamic, Static(3)]).to_string(), "[?,3]");
        assert_eq!(PartialShape::dynamic().to_string(), "[...]");
        assert_eq!(Shape::from([1, 2]).to_string(), "[1,2]");
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(0, 4), Some(0));
        assert_eq!(normalize_axis(-1, 4), Some(3));
        assert_eq!(normalize_axis(4, 4), None);
        assert_eq!(normalize_axis(-5, 4), None);
    }
}
