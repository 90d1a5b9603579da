// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic components standing in for fused chains.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// A 1-in/1-out component holding a pre-folded 4×4 scattering matrix.
///
/// These are created by the condenser when it fuses a maximal sequential
/// chain; the stored matrix is only valid for the wavelength it was last
/// folded at, so the scheduler re-folds the owning chain whenever the
/// wavelength moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Condensed {
    s: DMatrix<Complex64>,
}

impl Condensed {
    pub(crate) fn new(s: DMatrix<Complex64>) -> Condensed {
        debug_assert_eq!(s.shape(), (4, 4));
        Condensed { s }
    }

    pub(crate) fn s_matrix(&self) -> DMatrix<Complex64> {
        self.s.clone()
    }

    pub(crate) fn replace(&mut self, s: DMatrix<Complex64>) {
        debug_assert_eq!(s.shape(), (4, 4));
        self.s = s;
    }
}
