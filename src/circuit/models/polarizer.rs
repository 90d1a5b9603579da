// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Linear polarisers.

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

use crate::constants::FRAC_PI_2;

use super::two_port;

/// Orientation of a polariser's transmission axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PolarizerAxis {
    Horizontal,
    Vertical,
    /// Arbitrary axis, measured from horizontal \[rad\].
    Angle(f64),
}

impl PolarizerAxis {
    pub fn angle(&self) -> f64 {
        match self {
            PolarizerAxis::Horizontal => 0.0,
            PolarizerAxis::Vertical => FRAC_PI_2,
            PolarizerAxis::Angle(a) => *a,
        }
    }
}

/// A 1-in/1-out filter that removes the polarisation orthogonal to its
/// axis. The Jones matrix is the projector onto the axis, so half the power
/// of unpolarised light survives and light already on the axis passes
/// untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polarizer {
    pub axis: PolarizerAxis,
}

impl Polarizer {
    pub(super) fn s_matrix(&self) -> DMatrix<Complex64> {
        let angle = self.axis.angle();
        let j11 = Complex64::new(angle.cos().powi(2), 0.0);
        let j22 = Complex64::new(angle.sin().powi(2), 0.0);
        let j_off = Complex64::new(angle.sin() * angle.cos(), 0.0);

        let j = Matrix2::new(j11, j_off, j_off, j22);
        // Projectors are symmetric, so forward and backward coincide.
        two_port(j, j)
    }
}

impl fmt::Display for Polarizer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "polarizer ({:.4} rad axis)", self.axis.angle())
    }
}
