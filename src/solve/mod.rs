// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Linear solves of the scattering system.
//!
//! Small systems go through a dense LU; big, sparse ones through a sparse
//! LU. The choice is purely structural, a function of the mode count and
//! the non-zero count, so a simulation makes it once, on its first
//! wavelength, and keeps it for every subsequent sample.


use std::fmt;

use faer::complex_native::c64;
use faer::prelude::*;
use faer::sparse::SparseColMat;
use faer::Mat;
use log::debug;
use nalgebra::{DMatrix, DVector, Dyn};
use num_complex::Complex64;
use thiserror::Error;

use crate::constants::{
    COMPLEX_SIZE, DENSE_FOOTPRINT_CEILING, DENSE_MODE_CUTOFF, SPARSITY_CUTOFF,
};

#[derive(Error, Debug)]
pub enum SolveError {
    /// I − S·C could not be factorised. Usually a perfectly resonant loop;
    /// the simulation aborts with no partial result.
    #[error("the scattering system (I − S·C) is singular and cannot be factorised")]
    SingularSystem,
}

/// Which factorisation backs the solves of one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SolverKind {
    Dense,
    Sparse,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolverKind::Dense => f.write_str("dense"),
            SolverKind::Sparse => f.write_str("sparse"),
        }
    }
}

/// Pick the solver for a system with `num_modes` unknowns and `nnz`
/// structural non-zeros. Deterministic in its two arguments.
pub(crate) fn select(num_modes: usize, nnz: usize) -> SolverKind {
    // Below this size the sparse machinery costs more than it saves.
    if num_modes < DENSE_MODE_CUTOFF {
        return SolverKind::Dense;
    }
    // A dense matrix that cannot reasonably fit in memory forces sparse.
    if num_modes * num_modes * COMPLEX_SIZE > DENSE_FOOTPRINT_CEILING {
        return SolverKind::Sparse;
    }
    let density = nnz as f64 / (num_modes * num_modes) as f64;
    if density < SPARSITY_CUTOFF {
        SolverKind::Sparse
    } else {
        SolverKind::Dense
    }
}

/// A factorisation of I − S·C, reusable across right-hand sides.
pub(crate) enum Factorized {
    Dense(nalgebra::LU<Complex64, Dyn, Dyn>),
    Sparse(faer::sparse::linalg::solvers::Lu<usize, c64>),
}

impl Factorized {
    pub(crate) fn dense(m: DMatrix<Complex64>) -> Result<Factorized, SolveError> {
        let lu = m.lu();
        if !lu.is_invertible() {
            return Err(SolveError::SingularSystem);
        }
        Ok(Factorized::Dense(lu))
    }

    pub(crate) fn sparse(
        dim: usize,
        triplets: &[(usize, usize, Complex64)],
    ) -> Result<Factorized, SolveError> {
        let triplets: Vec<(usize, usize, c64)> = triplets
            .iter()
            .map(|&(r, c, v)| (r, c, c64::new(v.re, v.im)))
            .collect();
        let m = SparseColMat::<usize, c64>::try_new_from_triplets(dim, dim, &triplets)
            .expect("assembled triplets are in bounds");
        debug!("sparse factorisation: {dim} modes, {} non-zeros", triplets.len());
        let lu = m.as_ref().sp_lu().map_err(|_| SolveError::SingularSystem)?;
        Ok(Factorized::Sparse(lu))
    }

    /// Solve M·x = rhs for one right-hand side.
    pub(crate) fn solve_vector(
        &self,
        rhs: &DVector<Complex64>,
    ) -> Result<DVector<Complex64>, SolveError> {
        match self {
            Factorized::Dense(lu) => lu.solve(rhs).ok_or(SolveError::SingularSystem),
            Factorized::Sparse(lu) => {
                let n = rhs.len();
                let rhs = Mat::from_fn(n, 1, |i, _| c64::new(rhs[i].re, rhs[i].im));
                let x = lu.solve(&rhs);
                Ok(DVector::from_fn(n, |i, _| {
                    let v = x.read(i, 0);
                    Complex64::new(v.re, v.im)
                }))
            }
        }
    }

    /// Solve M·X = RHS for a whole matrix of right-hand sides.
    pub(crate) fn solve_matrix(
        &self,
        rhs: &DMatrix<Complex64>,
    ) -> Result<DMatrix<Complex64>, SolveError> {
        match self {
            Factorized::Dense(lu) => lu.solve(rhs).ok_or(SolveError::SingularSystem),
            Factorized::Sparse(lu) => {
                let (n, k) = rhs.shape();
                let rhs = Mat::from_fn(n, k, |i, j| {
                    let v = rhs[(i, j)];
                    c64::new(v.re, v.im)
                });
                let x = lu.solve(&rhs);
                Ok(DMatrix::from_fn(n, k, |i, j| {
                    let v = x.read(i, j);
                    Complex64::new(v.re, v.im)
                }))
            }
        }
    }
}
