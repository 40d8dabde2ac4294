//! Parallel per-element evaluation.
//!
//! Each element's evaluation is a pure function of that element's own
//! immutable data, so batches run element-parallel with Rayon and one
//! output slot per element. Gathering the results into a global system
//! is the caller's concern.

use nalgebra::Matrix3;
use rayon::prelude::*;

use crate::csfd::HessianScheme;
use crate::element::TetElement;
use crate::material::StVkMaterial;
use crate::types::{DofMatrix, DofVector, Real};

/// Energy and force vector for every element of a batch.
///
/// `deformation_gradients[i]` belongs to `elements[i]`; the material is
/// indexed by position in the batch.
///
/// # Panics
///
/// Panics when the slice lengths differ.
pub fn batch_elastic_forces<T: Real>(
    material: &StVkMaterial<T>,
    elements: &[TetElement<T>],
    deformation_gradients: &[Matrix3<T>],
) -> Vec<(T, DofVector<T>)> {
    assert_eq!(
        elements.len(),
        deformation_gradients.len(),
        "one deformation gradient per element"
    );
    elements
        .par_iter()
        .zip(deformation_gradients.par_iter())
        .enumerate()
        .map(|(index, (tet, f))| material.elastic_forces(index, tet, f))
        .collect()
}

/// Stiffness matrix for every element of a batch.
///
/// # Panics
///
/// Panics when the slice lengths differ.
pub fn batch_stiffness_matrices<T: Real>(
    material: &StVkMaterial<T>,
    elements: &[TetElement<T>],
    deformation_gradients: &[Matrix3<T>],
    scheme: HessianScheme,
) -> Vec<DofMatrix<T>> {
    assert_eq!(
        elements.len(),
        deformation_gradients.len(),
        "one deformation gradient per element"
    );
    elements
        .par_iter()
        .zip(deformation_gradients.par_iter())
        .enumerate()
        .map(|(index, (tet, f))| material.stiffness_matrix_with(index, tet, f, scheme))
        .collect()
}
