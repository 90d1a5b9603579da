// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Retarders: half- and quarter-wave plates.

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

use crate::constants::FRAC_PI_4;

use super::two_port;

/// A π retarder oriented at `angle` from horizontal.
///
/// Rotates linear polarisation by twice the plate angle; the Jones matrix is
/// [[cos2ψ, sin2ψ], [sin2ψ, −cos2ψ]].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfWavePlate {
    /// Fast-axis orientation from horizontal \[rad\].
    pub angle: f64,
}

impl HalfWavePlate {
    pub(super) fn s_matrix(&self) -> DMatrix<Complex64> {
        let cos = Complex64::new((2.0 * self.angle).cos(), 0.0);
        let sin = Complex64::new((2.0 * self.angle).sin(), 0.0);

        let j = Matrix2::new(cos, sin, sin, -cos);
        two_port(j, j)
    }
}

impl fmt::Display for HalfWavePlate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HWP ({:.4} rad)", self.angle)
    }
}

/// Which axis of a quarter-wave plate is the fast one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FastAxis {
    Horizontal,
    Vertical,
}

/// A π/2 retarder with its fast axis on H or V.
///
/// Converts between linear and circular polarisation when the incident
/// state sits at 45° to the fast axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuarterWavePlate {
    pub fast_axis: FastAxis,
}

impl QuarterWavePlate {
    pub(super) fn s_matrix(&self) -> DMatrix<Complex64> {
        let lead = Complex64::from_polar(1.0, FRAC_PI_4);
        let retard = match self.fast_axis {
            FastAxis::Horizontal => Complex64::new(0.0, 1.0),
            FastAxis::Vertical => Complex64::new(0.0, -1.0),
        };

        let j = Matrix2::from_diagonal(&nalgebra::Vector2::new(lead, lead * retard));
        two_port(j, j)
    }
}

impl fmt::Display for QuarterWavePlate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.fast_axis {
            FastAxis::Horizontal => f.write_str("QWP (fast axis horizontal)"),
            FastAxis::Vertical => f.write_str("QWP (fast axis vertical)"),
        }
    }
}
