//! Core scalar abstraction and fixed-size types.
//!
//! Everything in this crate is generic over the base scalar so the same
//! formulas run in single or double precision:
//!
//! - [`Real`]: the base scalar trait (`f32` or `f64`)
//! - Fixed-size aliases for the 12-DOF element quantities
//! - [`Invariants`]: the scalar invariants of the right Cauchy-Green tensor

use nalgebra::{Matrix3, RealField, SMatrix, SVector, Vector3};

use crate::multicomplex::ComplexScalar;

/// Base scalar for all element arithmetic.
///
/// Implemented for `f32` and `f64`. The `RealField` bound supplies the
/// 3x3 matrix algebra (products, inversion, determinant) and the
/// `nalgebra::convert` path for literals; the `ComplexScalar` bound
/// lets the base scalar serve as the order-0 floor of the multicomplex
/// tower.
pub trait Real: RealField + Copy + Send + Sync + ComplexScalar<Real = Self> {}

impl Real for f32 {}

impl Real for f64 {}

/// A point in 3D space.
pub type Point3<T> = Vector3<T>;

/// Nodal displacement/force vector for one tetrahedral element (4 nodes x 3).
pub type DofVector<T> = SVector<T, 12>;

/// Element stiffness matrix (12x12).
pub type DofMatrix<T> = SMatrix<T, 12, 12>;

/// Scalar invariants of C = F^T F for an isotropic energy formula.
///
/// `ic = tr(C)`, `iic = tr(C^2)`, `iiic = det(C)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invariants<T> {
    /// First invariant, trace of C.
    pub ic: T,
    /// Second invariant, trace of C^2.
    pub iic: T,
    /// Third invariant, determinant of C.
    pub iiic: T,
}

impl<T: Real> Invariants<T> {
    /// Compute the invariants from a deformation gradient.
    pub fn from_deformation_gradient(f: &Matrix3<T>) -> Self {
        let c = f.transpose() * f;
        Self {
            ic: c.trace(),
            iic: (c * c).trace(),
            iiic: c.determinant(),
        }
    }
}
