// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Folded Mach-Zehnder interferometers.

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

use crate::constants::TAU;

use super::two_port;

/// An unbalanced Mach-Zehnder interferometer folded into a 1-in/1-out
/// device.
///
/// The arm imbalance produces a phase φ = 2π·n·ΔL/λ per polarisation; the
/// forward transmission is i·e^{iφ/2}·cos(φ/2), so the device acts as a
/// switch or a spectral filter. The complementary sin arm leaves backward
/// through the input port rather than through a second output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MachZehnderInterferometer {
    /// Length imbalance of the phase-shifting arm \[m\].
    pub arm_length: f64,
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
}

impl MachZehnderInterferometer {
    pub(super) fn s_matrix(&self, wavelength: f64) -> DMatrix<Complex64> {
        let n_h = self.n_h + self.n_h_gradient * (wavelength - self.central_wavelength_h);
        let n_v = self.n_v + self.n_v_gradient * (wavelength - self.central_wavelength_v);

        let phi_h = TAU * n_h * self.arm_length / wavelength;
        let phi_v = TAU * n_v * self.arm_length / wavelength;

        let i = Complex64::new(0.0, 1.0);
        let arm = |phi: f64, f: fn(f64) -> f64| {
            i * Complex64::from_polar(1.0, phi / 2.0) * f(phi / 2.0)
        };

        let forward = Matrix2::from_diagonal(&nalgebra::Vector2::new(
            arm(phi_h, f64::cos),
            arm(phi_v, f64::cos),
        ));
        let backward = Matrix2::from_diagonal(&nalgebra::Vector2::new(
            arm(phi_h, f64::sin),
            arm(phi_v, f64::sin),
        ));
        two_port(forward, backward)
    }
}

impl fmt::Display for MachZehnderInterferometer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let phi_h = TAU * self.n_h * self.arm_length / self.central_wavelength_h;
        let phi_v = TAU * self.n_v * self.arm_length / self.central_wavelength_v;
        write!(
            f,
            "MZI (ΔL {:.3e} m, φ_H {:.2} rad, φ_V {:.2} rad)",
            self.arm_length,
            phi_h % TAU,
            phi_v % TAU
        )
    }
}
