use std::ops::{Deref, Neg};

use crate::Vector3;

/// Guards the normalization against zero-length input.
const LENGTH_EPSILON: f64 = 1e-12;

/// A unit-length direction.
///
/// The only way to build one is to normalize a vector, so every `Normal`
/// is unit length (or exactly zero for a zero input).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Normal(Vector3);

impl Normal {
    /// Normalize `v`. A zero vector stays zero instead of becoming NaN.
    #[inline]
    pub fn new(v: Vector3) -> Self {
        Self(v / (v.length() + LENGTH_EPSILON))
    }

    /// Normalize the given components.
    #[inline]
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z))
    }

    /// The underlying vector.
    #[inline]
    pub fn as_vec(&self) -> Vector3 {
        self.0
    }
}

impl Deref for Normal {
    type Target = Vector3;

    #[inline]
    fn deref(&self) -> &Vector3 {
        &self.0
    }
}

impl Neg for Normal {
    type Output = Normal;

    #[inline]
    fn neg(self) -> Normal {
        Normal(-self.0)
    }
}

impl From<Normal> for Vector3 {
    fn from(n: Normal) -> Vector3 {
        n.0
    }
}
