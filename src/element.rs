//! Tetrahedral element rest-shape data.
//!
//! A [`TetElement`] owns everything about one 4-node tetrahedron that
//! is fixed by its rest configuration: the rest edge matrix `Dm` and
//! its inverse, and the 12 precomputed direction matrices `dF/du_r`
//! giving the change of the deformation gradient per unit change of
//! nodal DOF r. All of it is immutable after construction, so
//! concurrent evaluations over different elements share nothing
//! mutable.
//!
//! DOF ordering is `[node0 xyz, node1 xyz, node2 xyz, node3 xyz]`;
//! edge columns are taken against node 3.

use nalgebra::{convert, Matrix3};

use crate::error::{Error, Result};
use crate::types::{Point3, Real};

/// Rest-shape data for one 4-node tetrahedron.
#[derive(Debug, Clone)]
pub struct TetElement<T: Real> {
    dm: Matrix3<T>,
    dm_inv: Matrix3<T>,
    df_du: [Matrix3<T>; 12],
    rest_volume: T,
}

impl<T: Real> TetElement<T> {
    /// Build from the four rest positions.
    ///
    /// Returns [`Error::DegenerateElement`] when the rest shape is
    /// (near-)flat and `Dm` cannot be inverted. Rejecting bad geometry
    /// happens here, at construction; the evaluation paths themselves
    /// propagate whatever the formulas yield.
    pub fn new(rest: &[Point3<T>; 4]) -> Result<Self> {
        let dm = Matrix3::from_columns(&[rest[0] - rest[3], rest[1] - rest[3], rest[2] - rest[3]]);
        let dm_inv = dm.try_inverse().ok_or_else(|| {
            Error::DegenerateElement("rest-shape matrix Dm is singular".into())
        })?;
        let det = dm.determinant();
        let signed_volume = det / convert::<f64, T>(6.0);
        let rest_volume = if signed_volume < T::zero() {
            -signed_volume
        } else {
            signed_volume
        };

        // dF/du_r = (dDs/du_r) * Dm^-1; Ds column j responds to node j,
        // and node 3 enters every column with opposite sign.
        let one: T = convert(1.0);
        let mut df_du = [Matrix3::zeros(); 12];
        for node in 0..3 {
            for comp in 0..3 {
                let mut d_ds = Matrix3::zeros();
                d_ds[(comp, node)] = one;
                df_du[3 * node + comp] = d_ds * dm_inv;
            }
        }
        for comp in 0..3 {
            let mut d_ds = Matrix3::zeros();
            for col in 0..3 {
                d_ds[(comp, col)] = -one;
            }
            df_du[9 + comp] = d_ds * dm_inv;
        }

        Ok(Self {
            dm,
            dm_inv,
            df_du,
            rest_volume,
        })
    }

    /// Rest edge matrix (column j = X_j - X_3).
    #[inline]
    pub fn dm(&self) -> &Matrix3<T> {
        &self.dm
    }

    /// Inverse of the rest edge matrix.
    #[inline]
    pub fn dm_inverse(&self) -> &Matrix3<T> {
        &self.dm_inv
    }

    /// Direction matrix `dF/du_r` for nodal DOF r (0..12).
    #[inline]
    pub fn direction(&self, r: usize) -> &Matrix3<T> {
        &self.df_du[r]
    }

    /// All 12 direction matrices.
    #[inline]
    pub fn directions(&self) -> &[Matrix3<T>; 12] {
        &self.df_du
    }

    /// Rest volume of the tetrahedron.
    #[inline]
    pub fn rest_volume(&self) -> T {
        self.rest_volume
    }

    /// Deformation gradient `F = Ds * Dm^-1` for the given current
    /// positions.
    pub fn deformation_gradient(&self, current: &[Point3<T>; 4]) -> Matrix3<T> {
        let ds = Matrix3::from_columns(&[
            current[0] - current[3],
            current[1] - current[3],
            current[2] - current[3],
        ]);
        ds * self.dm_inv
    }
}
