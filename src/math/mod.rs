pub mod intersect_3d;
pub mod polygon_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The axis following this one in cyclic order (X → Y → Z → X).
    #[must_use]
    pub fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// The axis preceding this one in cyclic order.
    #[must_use]
    pub fn prev(self) -> Axis {
        match self {
            Axis::X => Axis::Z,
            Axis::Y => Axis::X,
            Axis::Z => Axis::Y,
        }
    }

    /// Unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// Upper-case axis letter, for logging.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

/// Distance and angle tolerances used by sampling and the mesh kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Two points closer than this are considered coincident.
    pub dist: f64,
    /// Squared `dist`.
    pub dist_sq: f64,
    /// Cosine threshold below which vectors are considered perpendicular.
    pub perp: f64,
}

impl Tolerance {
    /// Creates a tolerance from a coincidence distance and perpendicularity threshold.
    #[must_use]
    pub fn new(dist: f64, perp: f64) -> Self {
        Self {
            dist,
            dist_sq: dist * dist,
            perp,
        }
    }

    /// Returns `true` if `value` is within `dist` of zero.
    #[must_use]
    pub fn near_zero(&self, value: f64) -> bool {
        value.abs() < self.dist
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(0.005, 1e-5)
    }
}

/// Returns `true` if the value lies strictly inside `(a, b)` (or `(b, a)`) by more than `tol`.
#[must_use]
pub fn strictly_between(value: f64, a: f64, b: f64, tol: f64) -> bool {
    (value > a + tol && value < b - tol) || (value < a - tol && value > b + tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cycle() {
        for axis in Axis::ALL {
            assert_eq!(axis.next().prev(), axis);
        }
        assert_eq!(Axis::Y.next(), Axis::Z);
        assert_eq!(Axis::Y.prev(), Axis::X);
    }

    #[test]
    fn strictly_between_excludes_ends() {
        assert!(strictly_between(5.0, 0.0, 10.0, 0.005));
        assert!(strictly_between(5.0, 10.0, 0.0, 0.005));
        assert!(!strictly_between(0.001, 0.0, 10.0, 0.005));
        assert!(!strictly_between(10.0, 0.0, 10.0, 0.005));
    }
}
