// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Waveguide/fibre propagation segments.

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

use crate::constants::TAU;

use super::two_port;

/// A birefringent waveguide segment of length L.
///
/// Each polarisation mode sees its own effective index (with linear
/// dispersion around a centre wavelength) and its own propagation loss. The
/// field picks up e^{−i·2π·n·L/λ} over the segment, the engineering sign
/// convention for a wave ∝ e^{i(ωt − kz)}.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseShifter {
    /// Effective index for the H mode \[unitless\].
    pub n_h: f64,
    /// dn/dλ for the H mode \[1/m\].
    pub n_h_gradient: f64,
    /// Wavelength `n_h` is quoted at \[m\].
    pub central_wavelength_h: f64,
    /// Effective index for the V mode \[unitless\].
    pub n_v: f64,
    /// dn/dλ for the V mode \[1/m\].
    pub n_v_gradient: f64,
    /// Wavelength `n_v` is quoted at \[m\].
    pub central_wavelength_v: f64,
    /// Segment length \[m\].
    pub length: f64,
    /// Propagation loss for the H mode \[dB/m\].
    pub loss_h_db_per_m: f64,
    /// Propagation loss for the V mode \[dB/m\].
    pub loss_v_db_per_m: f64,
}

impl PhaseShifter {
    /// A lossless, dispersionless segment with the same index on both
    /// modes. Enough for most switching and delay work.
    pub fn isotropic(n: f64, length: f64, central_wavelength: f64) -> PhaseShifter {
        PhaseShifter {
            n_h: n,
            n_h_gradient: 0.0,
            central_wavelength_h: central_wavelength,
            n_v: n,
            n_v_gradient: 0.0,
            central_wavelength_v: central_wavelength,
            length,
            loss_h_db_per_m: 0.0,
            loss_v_db_per_m: 0.0,
        }
    }

    pub(super) fn s_matrix(&self, wavelength: f64) -> DMatrix<Complex64> {
        let n_h = self.n_h - (wavelength - self.central_wavelength_h) * self.n_h_gradient;
        let n_v = self.n_v - (wavelength - self.central_wavelength_v) * self.n_v_gradient;

        let phase_h = TAU * n_h * self.length / wavelength;
        let phase_v = TAU * n_v * self.length / wavelength;
        let a_h = 10f64.powf(-self.loss_h_db_per_m * self.length / 20.0);
        let a_v = 10f64.powf(-self.loss_v_db_per_m * self.length / 20.0);

        let j = Matrix2::from_diagonal(&nalgebra::Vector2::new(
            Complex64::from_polar(a_h, -phase_h),
            Complex64::from_polar(a_v, -phase_v),
        ));
        // Diagonal Jones, so the backward matrix is the same.
        two_port(j, j)
    }
}

impl fmt::Display for PhaseShifter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let phi_h = TAU * self.n_h * self.length / self.central_wavelength_h;
        let phi_v = TAU * self.n_v * self.length / self.central_wavelength_v;
        write!(
            f,
            "phase shifter ({:.3e} m, φ_H {:.2} rad, φ_V {:.2} rad, Δn {:.3e})",
            self.length,
            phi_h % TAU,
            phi_v % TAU,
            self.n_h - self.n_v
        )
    }
}
