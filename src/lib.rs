//! tetvk - St. Venant-Kirchhoff tetrahedral element core.
//!
//! Computes, for a 4-node tetrahedral element under the StVK
//! hyperelastic law, the scalar strain energy, the elastic force vector
//! over the 12 nodal DOFs and the 12x12 element stiffness matrix. The
//! derivatives are not hand-derived: the ordinary energy formula is
//! evaluated over nested multicomplex numbers whose imaginary lanes
//! carry first- and second-order derivative information exactly, with
//! no subtractive cancellation and no symbolic differentiation.
//!
//! # Architecture
//!
//! - [`multicomplex`]: the order-1..3 number tower and the scalar
//!   interface the energy kernel is generic over
//! - [`cmatrix`]: 3x3 matrices over multicomplex entries
//! - [`material`]: per-element Lamé parameters, the closed-form
//!   invariant path and the compression-resistance hook
//! - [`element`]: rest-shape matrices and the precomputed `dF/du`
//!   direction matrices
//! - [`csfd`]: the force, stiffness and directional-stiffness
//!   extractors
//! - [`assembly`]: element-parallel batch evaluation
//!
//! # Example
//!
//! ```
//! use nalgebra::{Matrix3, Vector3};
//! use tetvk::{StVkMaterial, TetElement};
//!
//! let tet = TetElement::new(&[
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 0.0, 0.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//!     Vector3::new(0.0, 0.0, 1.0),
//! ])?;
//! let material = StVkMaterial::uniform(1, 2.0, 1.0)?;
//!
//! let f = Matrix3::new(1.1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
//! let (energy, forces) = material.elastic_forces(0, &tet, &f);
//! let stiffness = material.stiffness_matrix(0, &tet, &f);
//!
//! assert!(energy > 0.0);
//! assert_eq!(stiffness[(0, 1)], stiffness[(1, 0)]);
//! # let _ = forces;
//! # Ok::<(), tetvk::Error>(())
//! ```

pub mod assembly;
pub mod cmatrix;
pub mod csfd;
pub mod element;
pub mod error;
pub mod material;
pub mod multicomplex;
pub mod types;

pub use assembly::{batch_elastic_forces, batch_stiffness_matrices};
pub use cmatrix::ComplexMatrix3;
pub use csfd::{hessian_mode, HessianMode, HessianScheme};
pub use element::TetElement;
pub use error::{Error, Result};
pub use material::{
    green_strain, stvk_energy, CompressionResistance, NoCompressionResistance, StVkMaterial,
};
pub use multicomplex::{Bicomplex, Complex1, ComplexScalar, MultiComplex, Tricomplex};
pub use types::{DofMatrix, DofVector, Invariants, Point3, Real};
