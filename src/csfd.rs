//! Multicomplex-step derivative extractors.
//!
//! The elastic force vector and element stiffness matrix are read off
//! the imaginary lanes of the lifted energy formula instead of being
//! derived by hand:
//!
//! - forces: order-1 seeding, one imaginary direction per DOF, readout
//!   `im / h`
//! - stiffness: order-2 seeding over the 78 upper-triangle DOF pairs,
//!   readout `im.im / h^2`
//! - directional stiffness: order-3 seeding with the direction folded
//!   into the third lane, readout `im.im.im / h^3`
//!
//! No subtraction of nearly-equal reals occurs anywhere, so the step
//! size never trades truncation against cancellation the way classical
//! finite differences do.
//!
//! The stiffness pass reuses per-direction strain lanes across pairs
//! that share a seeded direction ([`hessian_mode`]); the reuse is a
//! cost optimization only and [`HessianScheme::FullSeeding`] evaluates
//! every pair with complete order-2 arithmetic instead.

use nalgebra::{convert, Matrix3};
use num_traits::Zero;

use crate::cmatrix::ComplexMatrix3;
use crate::element::TetElement;
use crate::material::{green_strain, stvk_energy, StVkMaterial};
use crate::multicomplex::{Bicomplex, Complex1, ComplexScalar, MultiComplex, Tricomplex};
use crate::types::{DofMatrix, DofVector, Real};

/// Which seeding scheme the stiffness pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HessianScheme {
    /// Reuse per-direction strain lanes across pairs (default).
    LaneReuse,
    /// Seed and evaluate every pair in full order-2 arithmetic.
    FullSeeding,
}

/// Computation mode for one (u, v) pair under lane reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HessianMode {
    /// Evaluate every lane; fills the shared real lane and both
    /// direction caches.
    Full,
    /// Evaluate the second direction lane and the mixed lane; the real
    /// lane and the first direction are already cached.
    SecondLane,
    /// Evaluate the mixed lane only; all single-direction lanes come
    /// from the cache.
    MixedLane,
}

/// Select the computation mode for the pair (u, v), u <= v.
///
/// The first row of the triangle (u = 0) populates the caches; every
/// later row only needs the mixed lane. Any mode must reproduce the
/// numbers of a full evaluation.
pub fn hessian_mode(u: usize, v: usize) -> HessianMode {
    if u != 0 {
        HessianMode::MixedLane
    } else if v != 0 {
        HessianMode::SecondLane
    } else {
        HessianMode::Full
    }
}

/// Order-1 deformation gradient: real part F, imaginary part the
/// step-scaled direction.
fn seed_first_order<T: Real>(
    f: &Matrix3<T>,
    direction: &Matrix3<T>,
    h: T,
) -> ComplexMatrix3<Complex1<T>> {
    let mut out = ComplexMatrix3::zero();
    for k in 0..9 {
        let (r, c) = (k % 3, k / 3);
        out.data[k] = MultiComplex::new(f[(r, c)], direction[(r, c)] * h);
    }
    out
}

/// Order-2 deformation gradient: level-1 lane carries `h * dir_u`,
/// level-2 lane carries `h * dir_v`, both against the same real F.
fn seed_second_order<T: Real>(
    f: &Matrix3<T>,
    dir_u: &Matrix3<T>,
    dir_v: &Matrix3<T>,
    h: T,
) -> ComplexMatrix3<Bicomplex<T>> {
    let zero = T::zero();
    let mut out = ComplexMatrix3::zero();
    for k in 0..9 {
        let (r, c) = (k % 3, k / 3);
        out.data[k] = MultiComplex::new(
            MultiComplex::new(f[(r, c)], dir_u[(r, c)] * h),
            MultiComplex::new(dir_v[(r, c)] * h, zero),
        );
    }
    out
}

impl<T: Real> StVkMaterial<T> {
    /// Elastic energy and force vector for one element.
    ///
    /// Seeds one order-1 imaginary direction per DOF of the first
    /// three nodes and reads `im / h`; the fourth node follows from
    /// translation invariance of the energy:
    /// `force[9 + i] = -(force[i] + force[3 + i] + force[6 + i])`.
    pub fn elastic_forces(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
    ) -> (T, DofVector<T>) {
        let h = self.step();
        let mu = self.mu(element);
        let lambda = self.lambda(element);
        let mut forces = DofVector::zeros();
        let mut energy = T::zero();
        for r in 0..9 {
            let fc = seed_first_order(f, tet.direction(r), h);
            let w = stvk_energy(&fc, mu, lambda);
            forces[r] = w.im / h;
            energy = w.re;
        }
        for i in 0..3 {
            forces[9 + i] = -(forces[i] + forces[3 + i] + forces[6 + i]);
        }
        (energy, forces)
    }

    /// Element stiffness matrix with the default lane-reuse scheme.
    pub fn stiffness_matrix(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
    ) -> DofMatrix<T> {
        self.stiffness_matrix_with(element, tet, f, HessianScheme::LaneReuse)
    }

    /// Element stiffness matrix with an explicit seeding scheme.
    ///
    /// Only the upper triangle is evaluated; the result is mirrored
    /// and therefore exactly symmetric.
    pub fn stiffness_matrix_with(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
        scheme: HessianScheme,
    ) -> DofMatrix<T> {
        match scheme {
            HessianScheme::LaneReuse => self.stiffness_lane_reuse(element, tet, f),
            HessianScheme::FullSeeding => self.stiffness_full_seeding(element, tet, f),
        }
    }

    /// Full order-2 evaluation of every pair.
    fn stiffness_full_seeding(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
    ) -> DofMatrix<T> {
        let h = self.step();
        let h2 = h * h;
        let mu = self.mu(element);
        let lambda = self.lambda(element);
        let mut k = DofMatrix::zeros();
        for u in 0..12 {
            for v in u..12 {
                let fc = seed_second_order(f, tet.direction(u), tet.direction(v), h);
                let w = stvk_energy(&fc, mu, lambda);
                let kuv = w.im.im / h2;
                k[(u, v)] = kuv;
                k[(v, u)] = kuv;
            }
        }
        k
    }

    /// Lane-reuse evaluation.
    ///
    /// The real strain lane and the single-direction lanes are the
    /// same for every pair that shares a direction, so they are
    /// computed once on the first row of the triangle and cached for
    /// the rest of the call. Only the mixed lane of the lifted energy
    /// is evaluated per pair:
    ///
    ///   W_mixed = 2 mu (<E0, E3> + <E1, E2>)
    ///           + lambda (tr E0 tr E3 + tr E1 tr E2)
    ///
    /// with E0 the real strain, E1/E2 the cached direction lanes and
    /// E3 the mixed lane of E. The cache lives on the stack of this
    /// call; nothing persists across calls.
    fn stiffness_lane_reuse(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
    ) -> DofMatrix<T> {
        let h = self.step();
        let h2 = h * h;
        let half: T = convert(0.5);
        let two: T = convert(2.0);
        let mu = self.mu(element);
        let lambda = self.lambda(element);

        let e_real = green_strain(f);
        let tr_real = e_real.trace();
        let mut e_dir: [Matrix3<T>; 12] = [Matrix3::zeros(); 12];

        let mut k = DofMatrix::zeros();
        for u in 0..12 {
            for v in u..12 {
                match hessian_mode(u, v) {
                    HessianMode::Full | HessianMode::SecondLane => {
                        let a_v = tet.direction(v);
                        e_dir[v] = (a_v.transpose() * f + f.transpose() * a_v) * (half * h);
                    }
                    HessianMode::MixedLane => {}
                }
                let a_u = tet.direction(u);
                let a_v = tet.direction(v);
                let e_mixed =
                    (a_u.transpose() * a_v + a_v.transpose() * a_u) * (half * h2);
                let w_mixed = mu
                    * two
                    * (e_real.dot(&e_mixed) + e_dir[u].dot(&e_dir[v]))
                    + lambda
                        * (tr_real * e_mixed.trace() + e_dir[u].trace() * e_dir[v].trace());
                let kuv = w_mixed / h2;
                k[(u, v)] = kuv;
                k[(v, u)] = kuv;
            }
        }
        k
    }

    /// Directional derivative of the stiffness matrix along a 12-DOF
    /// direction, together with the energy at F.
    ///
    /// For each pair, an order-3 deformation gradient carries the unit
    /// perturbation at `row` in the level-2 lane, the unit perturbation
    /// at `col` in the level-3 lane and the full direction in the
    /// level-1 lane, all scaled by `h` and mapped onto F through the
    /// edge-matrix assembly and `Dm^-1`. Readout is the triple-imaginary
    /// lane over h^3; for this quartic energy it is exact for any
    /// nonzero h.
    pub fn directional_stiffness(
        &self,
        element: usize,
        tet: &TetElement<T>,
        f: &Matrix3<T>,
        direction: &DofVector<T>,
        h: T,
    ) -> (T, DofMatrix<T>) {
        let mu = self.mu(element);
        let lambda = self.lambda(element);
        let h3 = h * h * h;
        let mut k = DofMatrix::zeros();
        let mut energy = T::zero();
        for row in 0..12 {
            for col in 0..=row {
                let mut seeds = [Tricomplex::<T>::zero(); 12];
                seeds[row].re.im.re = h;
                seeds[col].im.re.re = h;
                for i in 0..12 {
                    seeds[i].re.re.im = direction[i] * h;
                }

                // Nodal seeds to edge-matrix perturbation, node 3
                // entering every column with opposite sign.
                let mut ds = ComplexMatrix3::<Tricomplex<T>>::zero();
                for j in 0..3 {
                    for i in 0..3 {
                        ds.data[j * 3 + i] = seeds[j * 3 + i] - seeds[9 + i];
                    }
                }

                let mut fc = ds.mul_real(tet.dm_inverse());
                fc.set_real(f);

                let w = stvk_energy(&fc, mu, lambda);
                let kuv = w.im.im.im / h3;
                k[(row, col)] = kuv;
                k[(col, row)] = kuv;
                energy = w.real();
            }
        }
        (energy, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Invariants;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Element whose rest edge matrix is the identity, so direction
    /// matrices are unit matrices and hand values stay simple.
    fn axis_tet() -> TetElement<f64> {
        TetElement::new(&[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
        ])
        .unwrap()
    }

    fn skewed_tet() -> TetElement<f64> {
        TetElement::new(&[
            Vector3::new(0.1, 0.0, -0.2),
            Vector3::new(1.3, 0.2, 0.1),
            Vector3::new(-0.1, 0.9, 0.3),
            Vector3::new(0.2, 0.1, 1.4),
        ])
        .unwrap()
    }

    fn sample_f() -> Matrix3<f64> {
        Matrix3::new(1.1, 0.02, 0.0, 0.03, 0.97, 0.01, 0.0, 0.04, 1.05)
    }

    fn material(mu: f64, lambda: f64) -> StVkMaterial<f64> {
        StVkMaterial::uniform(1, mu, lambda).unwrap()
    }

    #[test]
    fn mode_selection() {
        assert_eq!(hessian_mode(0, 0), HessianMode::Full);
        assert_eq!(hessian_mode(0, 5), HessianMode::SecondLane);
        assert_eq!(hessian_mode(0, 11), HessianMode::SecondLane);
        assert_eq!(hessian_mode(1, 1), HessianMode::MixedLane);
        assert_eq!(hessian_mode(3, 7), HessianMode::MixedLane);
    }

    #[test]
    fn forces_match_closed_form_stress() {
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let f = sample_f();
        let (energy, forces) = mat.elastic_forces(0, &tet, &f);
        let reference = mat.elastic_forces_closed_form(0, &tet, &f);
        for r in 0..12 {
            assert_relative_eq!(forces[r], reference[r], epsilon = 1e-9, max_relative = 1e-8);
        }
        let inv = Invariants::from_deformation_gradient(&f);
        assert_relative_eq!(energy, mat.energy_density(0, &inv), epsilon = 1e-6);
    }

    #[test]
    fn step_size_robustness() {
        // Accuracy stays at rounding level as h shrinks; no
        // cancellation blow-up the way a real-valued difference has.
        let tet = skewed_tet();
        let f = sample_f();
        let reference = material(3.5, 1.2).elastic_forces_closed_form(0, &tet, &f);
        for h in [1e-8, 1e-7, 1e-6, 1e-5, 1e-4] {
            let mat = StVkMaterial::uniform(1, 3.5, 1.2).unwrap().with_step(h).unwrap();
            let (_, forces) = mat.elastic_forces(0, &tet, &f);
            for r in 0..12 {
                assert_relative_eq!(forces[r], reference[r], epsilon = 1e-6, max_relative = 1e-6);
            }
        }
        // A coarse step only costs quadratic truncation.
        let mat = StVkMaterial::uniform(1, 3.5, 1.2).unwrap().with_step(1e-2).unwrap();
        let (_, forces) = mat.elastic_forces(0, &tet, &f);
        for r in 0..12 {
            assert_relative_eq!(forces[r], reference[r], epsilon = 1e-2);
        }
    }

    #[test]
    fn rest_state_is_force_free() {
        let tet = axis_tet();
        let mat = material(2.0, 1.5);
        let (energy, forces) = mat.elastic_forces(0, &tet, &Matrix3::identity());
        assert_relative_eq!(energy, 0.0, epsilon = 1e-6);
        for r in 0..12 {
            assert_relative_eq!(forces[r], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn forces_balance_exactly() {
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let (_, forces) = mat.elastic_forces(0, &tet, &sample_f());
        for axis in 0..3 {
            let sum = forces[axis] + forces[3 + axis] + forces[6 + axis] + forces[9 + axis];
            assert_eq!(sum, 0.0);
        }
    }

    #[test]
    fn translation_leaves_energy_and_forces_unchanged() {
        let rest = [
            Vector3::new(0.1, 0.0, -0.2),
            Vector3::new(1.3, 0.2, 0.1),
            Vector3::new(-0.1, 0.9, 0.3),
            Vector3::new(0.2, 0.1, 1.4),
        ];
        let tet = TetElement::new(&rest).unwrap();
        let mat = material(3.5, 1.2);
        let current = [
            Vector3::new(0.15, 0.02, -0.25),
            Vector3::new(1.42, 0.18, 0.13),
            Vector3::new(-0.05, 1.01, 0.28),
            Vector3::new(0.21, 0.08, 1.52),
        ];
        let shift = Vector3::new(-2.0, 0.7, 3.1);
        let moved = [
            current[0] + shift,
            current[1] + shift,
            current[2] + shift,
            current[3] + shift,
        ];
        let (e0, f0) = mat.elastic_forces(0, &tet, &tet.deformation_gradient(&current));
        let (e1, f1) = mat.elastic_forces(0, &tet, &tet.deformation_gradient(&moved));
        assert_relative_eq!(e0, e1, epsilon = 1e-10, max_relative = 1e-10);
        for r in 0..12 {
            assert_relative_eq!(f0[r], f1[r], epsilon = 1e-9, max_relative = 1e-8);
        }
    }

    #[test]
    fn uniaxial_stretch_matches_hand_values() {
        // F = diag(1 + eps, 1, 1) on the axis-aligned element with
        // mu = lambda = 1; direction matrices are unit matrices, so
        // forces are entries of P and K[0][0] has a short hand form.
        let eps: f64 = 0.1;
        let s = 1.0 + eps;
        let x = eps + 0.5 * eps * eps; // E_11
        let tet = axis_tet();
        let mat = material(1.0, 1.0);
        let f = Matrix3::new(s, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

        let (energy, forces) = mat.elastic_forces(0, &tet, &f);
        assert_relative_eq!(energy, 1.5 * x * x, epsilon = 1e-7);

        // P = diag(3 s x, x, x).
        let expected = [
            3.0 * s * x,
            0.0,
            0.0,
            0.0,
            x,
            0.0,
            0.0,
            0.0,
            x,
            -3.0 * s * x,
            -x,
            -x,
        ];
        for r in 0..12 {
            assert_relative_eq!(forces[r], expected[r], epsilon = 1e-9, max_relative = 1e-8);
        }

        // K[0][0] = 2 mu (E_11 + s^2) + lambda (E_11 + s^2).
        let k = mat.stiffness_matrix(0, &tet, &f);
        assert_relative_eq!(k[(0, 0)], 3.0 * (x + s * s), epsilon = 1e-6, max_relative = 1e-7);
    }

    #[test]
    fn stiffness_is_exactly_symmetric() {
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let k = mat.stiffness_matrix(0, &tet, &sample_f());
        for u in 0..12 {
            for v in 0..12 {
                assert_eq!(k[(u, v)], k[(v, u)]);
            }
        }
    }

    #[test]
    fn lane_reuse_matches_full_seeding() {
        // Both schemes evaluate the same lanes; full seeding carries
        // the intrinsic h^2 unit-collapse term in its real lane, so
        // agreement is to truncation order, which shrinks with h.
        let tet = skewed_tet();
        let mat = StVkMaterial::uniform(1, 3.5, 1.2)
            .unwrap()
            .with_step(1e-6)
            .unwrap();
        let f = sample_f();
        let k_lane = mat.stiffness_matrix_with(0, &tet, &f, HessianScheme::LaneReuse);
        let k_full = mat.stiffness_matrix_with(0, &tet, &f, HessianScheme::FullSeeding);
        for u in 0..12 {
            for v in 0..12 {
                assert_relative_eq!(
                    k_lane[(u, v)],
                    k_full[(u, v)],
                    epsilon = 1e-9,
                    max_relative = 1e-10
                );
            }
        }
    }

    #[test]
    fn stiffness_predicts_force_changes() {
        // Central differences of the force vector along each DOF; the
        // forces are cubic in the positions, so the O(t^2) truncation
        // stays well under the tolerance.
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let f = sample_f();
        let k = mat.stiffness_matrix(0, &tet, &f);
        let t = 1e-4;
        for j in 0..12 {
            let df = tet.direction(j) * t;
            let (_, g_plus) = mat.elastic_forces(0, &tet, &(f + df));
            let (_, g_minus) = mat.elastic_forces(0, &tet, &(f - df));
            for i in 0..12 {
                let fd = (g_plus[i] - g_minus[i]) / (2.0 * t);
                assert_relative_eq!(k[(i, j)], fd, epsilon = 1e-6, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn directional_stiffness_matches_stiffness_derivative() {
        // The stiffness is quadratic in the positions, so a central
        // difference along the direction is exact up to rounding.
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let f = sample_f();
        let direction = DofVector::from_row_slice(&[
            0.3, -0.1, 0.7, 0.2, 0.5, -0.4, -0.6, 0.1, 0.2, 0.0, -0.3, 0.8,
        ]);

        let (energy, dk) = mat.directional_stiffness(0, &tet, &f, &direction, 1e-3);

        let mut df_dir = Matrix3::zeros();
        for r in 0..12 {
            df_dir += tet.direction(r) * direction[r];
        }
        let t = 1e-3;
        let k_plus = mat.stiffness_matrix(0, &tet, &(f + df_dir * t));
        let k_minus = mat.stiffness_matrix(0, &tet, &(f - df_dir * t));
        for u in 0..12 {
            for v in 0..12 {
                let fd = (k_plus[(u, v)] - k_minus[(u, v)]) / (2.0 * t);
                assert_relative_eq!(dk[(u, v)], fd, epsilon = 1e-8, max_relative = 1e-7);
            }
        }

        let inv = Invariants::from_deformation_gradient(&f);
        assert_relative_eq!(energy, mat.energy_density(0, &inv), epsilon = 1e-4);
    }

    #[test]
    fn directional_stiffness_is_step_independent() {
        let tet = skewed_tet();
        let mat = material(3.5, 1.2);
        let f = sample_f();
        let direction = DofVector::from_row_slice(&[
            0.3, -0.1, 0.7, 0.2, 0.5, -0.4, -0.6, 0.1, 0.2, 0.0, -0.3, 0.8,
        ]);
        let (_, coarse) = mat.directional_stiffness(0, &tet, &f, &direction, 1e-2);
        let (_, fine) = mat.directional_stiffness(0, &tet, &f, &direction, 1e-6);
        for u in 0..12 {
            for v in 0..12 {
                assert_relative_eq!(
                    coarse[(u, v)],
                    fine[(u, v)],
                    epsilon = 1e-10,
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn single_precision_forces_agree_with_closed_form() {
        let tet = TetElement::<f32>::new(&[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        let mat = StVkMaterial::<f32>::uniform(1, 2.0, 1.0).unwrap();
        let f = Matrix3::<f32>::new(1.1, 0.0, 0.02, 0.01, 0.95, 0.0, 0.0, 0.03, 1.04);
        let (_, forces) = mat.elastic_forces(0, &tet, &f);
        let reference = mat.elastic_forces_closed_form(0, &tet, &f);
        for r in 0..12 {
            assert_relative_eq!(forces[r], reference[r], epsilon = 1e-3, max_relative = 1e-2);
        }
    }
}
