// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polarisation rotators, reciprocal and not.

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

use super::two_port;

/// Fixed 90° mode converter: swaps the H and V energy. Reciprocal.
pub(super) fn polarization_rotator() -> DMatrix<Complex64> {
    let z = Complex64::default();
    let one = Complex64::new(1.0, 0.0);

    let j = Matrix2::new(z, one, one, z);
    two_port(j, j)
}

/// A magneto-optic rotator.
///
/// Unlike a wave plate, the rotation sense is fixed by the magnetic field,
/// not by the propagation direction: the backward pass applies the same
/// rotation again instead of undoing it, so a round trip rotates by 2θ.
/// That broken reciprocity is what isolators are built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaradayRotator {
    /// Rotation of the polarisation plane per pass \[rad\].
    pub angle: f64,
}

impl FaradayRotator {
    pub(super) fn s_matrix(&self) -> DMatrix<Complex64> {
        let cos = Complex64::new(self.angle.cos(), 0.0);
        let sin = Complex64::new(self.angle.sin(), 0.0);

        let rotation = Matrix2::new(cos, -sin, sin, cos);
        two_port(rotation, rotation)
    }
}

impl fmt::Display for FaradayRotator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Faraday rotator ({:.4} rad, non-reciprocal)", self.angle)
    }
}
