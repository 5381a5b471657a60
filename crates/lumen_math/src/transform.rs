// Transform utilities for DMat4
//
// Extends glam::DMat4 with the operations primitives need to move rays and
// normals between world space and their local frame.
// Note: glam::DMat4 already provides transform_point3() and transform_vector3()

use glam::{DMat3, DMat4};

use crate::{MathError, MathResult, Normal, Ray};

/// Determinants below this fraction of the column-length product are singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Check `det` against the Hadamard bound, so the test does not depend on
/// the overall scale of the matrix.
fn check_determinant(det: f64, column_lengths: impl IntoIterator<Item = f64>) -> MathResult<()> {
    let bound: f64 = column_lengths.into_iter().product();
    if !det.is_finite() || bound == 0.0 || det.abs() < SINGULAR_EPSILON * bound {
        return Err(MathError::SingularMatrix(det));
    }
    Ok(())
}

/// Extension trait for DMat4 to provide ray tracing transform utilities
pub trait Mat4Ext {
    /// Invert the matrix, failing instead of producing infinities when it is singular.
    fn try_inverse(&self) -> MathResult<DMat4>;

    /// Transform a ray: the origin as a point, the direction as a vector.
    /// The resulting direction is renormalized.
    fn transform_ray(&self, ray: &Ray) -> Ray;

    /// The inverse-transpose of the upper 3x3 block, used to transform normals.
    fn normal_matrix(&self) -> MathResult<DMat3>;
}

impl Mat4Ext for DMat4 {
    fn try_inverse(&self) -> MathResult<DMat4> {
        let columns = [self.x_axis, self.y_axis, self.z_axis, self.w_axis];
        check_determinant(self.determinant(), columns.map(|c| c.length()))?;
        Ok(self.inverse())
    }

    fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform_point3(ray.origin),
            self.transform_vector3(ray.direction.as_vec()),
        )
    }

    fn normal_matrix(&self) -> MathResult<DMat3> {
        let upper = DMat3::from_mat4(*self);
        let columns = [upper.x_axis, upper.y_axis, upper.z_axis];
        check_determinant(upper.determinant(), columns.map(|c| c.length()))?;
        Ok(upper.inverse().transpose())
    }
}

/// Transform a normal with a precomputed normal matrix.
#[inline]
pub fn transform_normal(normal_matrix: &DMat3, n: Normal) -> Normal {
    Normal::new(*normal_matrix * n.as_vec())
}
