//! St. Venant-Kirchhoff material.
//!
//! Holds the per-element Lamé parameters and the fixed step size used
//! by the derivative extractors, and provides the closed-form path on
//! the invariants of C = F^T F:
//!
//!   energy = 0.125 * lambda * (IC - 3)^2 + 0.25 * mu * (IIC - 2 IC + 3)
//!
//! together with its gradient and Hessian with respect to the
//! invariants. The closed-form path is the ground truth the lifted
//! extractors in [`crate::csfd`] are checked against.
//!
//! Every closed-form result is passed through a
//! [`CompressionResistance`] hook as the last step; the hook's policy
//! (typically a volume-collapse penalty below some threshold) belongs
//! to the owner of the hook, not to this crate.

use nalgebra::{convert, Matrix3};

use crate::cmatrix::{inner_product, ComplexMatrix3};
use crate::error::{Error, Result};
use crate::multicomplex::ComplexScalar;
use crate::types::{DofVector, Invariants, Real};

/// Default step size for the multicomplex-step extractors.
///
/// Truncation shrinks quadratically with the step and there is no
/// cancellation penalty for making it small.
pub const DEFAULT_STEP: f64 = 1e-6;

/// Additive correction applied after each closed-form computation.
///
/// Implementations may adjust the result in place, e.g. to penalize
/// volumetric compression once `sqrt(IIIC)` drops below a threshold.
/// The default methods leave the result untouched.
pub trait CompressionResistance<T: Real>: Send + Sync {
    /// Correct the scalar energy.
    fn add_energy(&self, _element: usize, _invariants: &Invariants<T>, _energy: &mut T) {}

    /// Correct the energy gradient w.r.t. the invariants.
    fn add_gradient(&self, _element: usize, _invariants: &Invariants<T>, _gradient: &mut [T; 3]) {}

    /// Correct the energy Hessian w.r.t. the invariants.
    fn add_hessian(&self, _element: usize, _invariants: &Invariants<T>, _hessian: &mut [T; 6]) {}
}

/// Hook implementation that applies no correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompressionResistance;

impl<T: Real> CompressionResistance<T> for NoCompressionResistance {}

/// St. Venant-Kirchhoff material with per-element Lamé parameters.
pub struct StVkMaterial<T: Real> {
    mu: Vec<T>,
    lambda: Vec<T>,
    h: T,
    compression: Box<dyn CompressionResistance<T>>,
}

impl<T: Real> StVkMaterial<T> {
    /// Create a material from per-element Lamé parameter arrays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] when the arrays differ in
    /// length or any shear modulus is non-positive.
    pub fn new(mu: Vec<T>, lambda: Vec<T>) -> Result<Self> {
        if mu.len() != lambda.len() {
            return Err(Error::InvalidMaterial(
                "per-element Lamé arrays must have equal length".into(),
            ));
        }
        if mu.iter().any(|&m| m <= T::zero()) {
            return Err(Error::InvalidMaterial(
                "shear modulus must be positive".into(),
            ));
        }
        Ok(Self {
            mu,
            lambda,
            h: convert(DEFAULT_STEP),
            compression: Box::new(NoCompressionResistance),
        })
    }

    /// Create a material with the same Lamé pair for every element.
    pub fn uniform(n_elements: usize, mu: T, lambda: T) -> Result<Self> {
        Self::new(vec![mu; n_elements], vec![lambda; n_elements])
    }

    /// Create a uniform material from Young's modulus and Poisson's
    /// ratio.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] for E <= 0 or nu outside
    /// (-1, 0.5).
    pub fn from_young_poisson(n_elements: usize, youngs_modulus: T, poissons_ratio: T) -> Result<Self> {
        if youngs_modulus <= T::zero() {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        let one: T = convert(1.0);
        let half: T = convert(0.5);
        if poissons_ratio <= -one || poissons_ratio >= half {
            return Err(Error::InvalidMaterial(
                "Poisson's ratio must be in range (-1, 0.5)".into(),
            ));
        }
        let two: T = convert(2.0);
        let mu = youngs_modulus / (two * (one + poissons_ratio));
        let lambda = youngs_modulus * poissons_ratio
            / ((one + poissons_ratio) * (one - two * poissons_ratio));
        Self::uniform(n_elements, mu, lambda)
    }

    /// Replace the extractor step size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] for a zero step.
    pub fn with_step(mut self, h: T) -> Result<Self> {
        if h == T::zero() {
            return Err(Error::InvalidMaterial("step size must be nonzero".into()));
        }
        self.h = h;
        Ok(self)
    }

    /// Install a compression-resistance hook.
    pub fn with_compression_resistance(
        mut self,
        hook: Box<dyn CompressionResistance<T>>,
    ) -> Self {
        self.compression = hook;
        self
    }

    /// Number of elements this material covers.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.mu.len()
    }

    /// Shear modulus of one element.
    #[inline]
    pub fn mu(&self, element: usize) -> T {
        self.mu[element]
    }

    /// First Lamé parameter of one element.
    #[inline]
    pub fn lambda(&self, element: usize) -> T {
        self.lambda[element]
    }

    /// Extractor step size.
    #[inline]
    pub fn step(&self) -> T {
        self.h
    }

    /// Strain energy density from the invariants, closed form.
    pub fn energy_density(&self, element: usize, invariants: &Invariants<T>) -> T {
        let ic = invariants.ic;
        let iic = invariants.iic;
        let three: T = convert(3.0);
        let d = ic - three;
        let mut energy = convert::<f64, T>(0.125) * self.lambda[element] * d * d
            + convert::<f64, T>(0.25) * self.mu[element] * (iic - convert::<f64, T>(2.0) * ic + three);
        self.compression.add_energy(element, invariants, &mut energy);
        energy
    }

    /// Energy gradient w.r.t. the invariants, closed form.
    ///
    /// The IIIC slot is zero for this law; it exists for the
    /// compression hook to write into.
    pub fn energy_gradient(&self, element: usize, invariants: &Invariants<T>) -> [T; 3] {
        let ic = invariants.ic;
        let mut gradient = [
            convert::<f64, T>(0.25) * self.lambda[element] * (ic - convert::<f64, T>(3.0))
                - convert::<f64, T>(0.5) * self.mu[element],
            convert::<f64, T>(0.25) * self.mu[element],
            T::zero(),
        ];
        self.compression
            .add_gradient(element, invariants, &mut gradient);
        gradient
    }

    /// Energy Hessian w.r.t. the invariants, closed form, as the six
    /// entries (11, 12, 13, 22, 23, 33) of the symmetric 3x3 matrix.
    ///
    /// Only the (IC, IC) entry is nonzero for this law.
    pub fn energy_hessian(&self, element: usize, invariants: &Invariants<T>) -> [T; 6] {
        let mut hessian = [
            convert::<f64, T>(0.25) * self.lambda[element],
            T::zero(),
            T::zero(),
            T::zero(),
            T::zero(),
            T::zero(),
        ];
        self.compression
            .add_hessian(element, invariants, &mut hessian);
        hessian
    }

    /// First Piola-Kirchhoff stress `P = F (2 mu E + lambda tr(E) I)`.
    pub fn first_piola_kirchhoff(&self, element: usize, f: &Matrix3<T>) -> Matrix3<T> {
        let e = green_strain(f);
        f * (e * (convert::<f64, T>(2.0) * self.mu[element])
            + Matrix3::identity() * (self.lambda[element] * e.trace()))
    }

    /// Elastic forces from the closed-form stress: `force_r = <P, dF/du_r>`.
    ///
    /// Verification path; the production path is
    /// [`elastic_forces`](Self::elastic_forces).
    pub fn elastic_forces_closed_form(
        &self,
        element: usize,
        tet: &crate::element::TetElement<T>,
        f: &Matrix3<T>,
    ) -> DofVector<T> {
        let p = self.first_piola_kirchhoff(element, f);
        let mut forces = DofVector::zeros();
        for r in 0..12 {
            forces[r] = p.dot(tet.direction(r));
        }
        forces
    }
}

/// Green strain tensor `E = 0.5 (F^T F - I)`.
pub fn green_strain<T: Real>(f: &Matrix3<T>) -> Matrix3<T> {
    (f.transpose() * f - Matrix3::identity()) * convert::<f64, T>(0.5)
}

/// StVK strain energy over a (possibly lifted) deformation gradient:
/// `mu <E, E> + 0.5 lambda tr(E)^2` with `E = 0.5 (F^T F - I)`.
///
/// One formula serves every operand order; the derivative extractors
/// call it with order-1..3 entries and read the imaginary lanes of the
/// result.
pub fn stvk_energy<C: ComplexScalar>(f: &ComplexMatrix3<C>, mu: C::Real, lambda: C::Real) -> C {
    let half: C::Real = convert(0.5);
    let one = C::from_real(convert(1.0));
    let mut e = f.transpose_mul(f);
    e.data[0] = e.data[0] - one;
    e.data[4] = e.data[4] - one;
    e.data[8] = e.data[8] - one;
    let e = e.scale(half);
    inner_product(&e, &e).scale(mu) + e.trace_square().scale(lambda * half)
}
