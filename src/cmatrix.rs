//! 3x3 matrices over multicomplex scalars.
//!
//! [`ComplexMatrix3`] carries the lifted deformation gradient through
//! the energy formula. Entries are any [`ComplexScalar`], so the same
//! matrix code serves the real verification path and the order-1..3
//! derivative paths. Storage is column-major, matching nalgebra; with
//! all imaginary slots zero every operation reduces to ordinary real
//! 3x3 arithmetic.

use std::ops::Mul;

use nalgebra::Matrix3;

use crate::multicomplex::ComplexScalar;

/// A 3x3 matrix with multicomplex entries, column-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexMatrix3<C> {
    /// Entries in column-major order: entry (r, c) lives at `c * 3 + r`.
    pub data: [C; 9],
}

impl<C: ComplexScalar> ComplexMatrix3<C> {
    /// The zero matrix.
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: [C::zero(); 9],
        }
    }

    /// Embed a real matrix (all imaginary slots zero).
    pub fn from_real(m: &Matrix3<C::Real>) -> Self {
        let mut out = Self::zero();
        out.set_real(m);
        out
    }

    /// Copy a real matrix into the fully-real slot of every entry,
    /// keeping the imaginary slots untouched.
    pub fn set_real(&mut self, m: &Matrix3<C::Real>) {
        for k in 0..9 {
            self.data[k] = self.data[k].with_real(m[(k % 3, k / 3)]);
        }
    }

    /// Entry at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> C {
        self.data[col * 3 + row]
    }

    /// Set the entry at (row, col).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: C) {
        self.data[col * 3 + row] = value;
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zero();
        for k in 0..9 {
            let (r, c) = (k % 3, k / 3);
            out.data[r * 3 + c] = self.data[k];
        }
        out
    }

    /// Fused `self^T * rhs`, the shape the strain computation consumes.
    pub fn transpose_mul(&self, rhs: &Self) -> Self {
        let mut out = Self::zero();
        for c in 0..3 {
            for r in 0..3 {
                let mut acc = C::zero();
                for k in 0..3 {
                    acc = acc + self.data[r * 3 + k] * rhs.data[c * 3 + k];
                }
                out.data[c * 3 + r] = acc;
            }
        }
        out
    }

    /// Right-multiply by a real matrix.
    pub fn mul_real(&self, rhs: &Matrix3<C::Real>) -> Self {
        let mut out = Self::zero();
        for c in 0..3 {
            for r in 0..3 {
                let mut acc = C::zero();
                for k in 0..3 {
                    acc = acc + self.data[k * 3 + r].scale(rhs[(k, c)]);
                }
                out.data[c * 3 + r] = acc;
            }
        }
        out
    }

    /// Sum of the diagonal entries.
    #[inline]
    pub fn trace(&self) -> C {
        self.data[0] + self.data[4] + self.data[8]
    }

    /// Square of the trace, `tr(A)^2`.
    #[inline]
    pub fn trace_square(&self) -> C {
        let tr = self.trace();
        tr * tr
    }

    /// Multiply every entry by a base-real factor.
    pub fn scale(&self, s: C::Real) -> Self {
        let mut out = *self;
        for entry in &mut out.data {
            *entry = entry.scale(s);
        }
        out
    }
}

impl<C: ComplexScalar> Mul for ComplexMatrix3<C> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = Self::zero();
        for c in 0..3 {
            for r in 0..3 {
                let mut acc = C::zero();
                for k in 0..3 {
                    acc = acc + self.data[k * 3 + r] * rhs.data[c * 3 + k];
                }
                out.data[c * 3 + r] = acc;
            }
        }
        out
    }
}

/// Frobenius inner product `<A, B> = sum_ij a_ij * b_ij`.
pub fn inner_product<C: ComplexScalar>(a: &ComplexMatrix3<C>, b: &ComplexMatrix3<C>) -> C {
    let mut acc = C::zero();
    for k in 0..9 {
        acc = acc + a.data[k] * b.data[k];
    }
    acc
}
