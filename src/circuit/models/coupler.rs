// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Directional couplers.

use std::fmt;

use nalgebra::DMatrix;
use num_complex::Complex64;

use super::{directional_four_port, loss_amplitude};

/// A 2-in/2-out evanescent coupler.
///
/// Two waveguides run close enough that power transfers between them; after
/// a length L with coupling strength κ the through amplitude is cos(κL) and
/// the coupled amplitude i·sin(κL). The coupling strength disperses linearly
/// around a centre wavelength, independently per polarisation, and a scalar
/// insertion loss attenuates both paths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coupler {
    /// Wavelength the H coupling strength is quoted at \[m\].
    pub central_wavelength_h: f64,
    /// Wavelength the V coupling strength is quoted at \[m\].
    pub central_wavelength_v: f64,
    /// κ for the H mode at its centre wavelength \[1/m\].
    pub coupling_strength_h: f64,
    /// κ for the V mode at its centre wavelength \[1/m\].
    pub coupling_strength_v: f64,
    /// dκ/dλ for the H mode \[1/m²\].
    pub coupling_gradient_h: f64,
    /// dκ/dλ for the V mode \[1/m²\].
    pub coupling_gradient_v: f64,
    /// Interaction length \[m\].
    pub length: f64,
    /// Total power lost, applied as a field factor 10^(−IL/20) \[dB\].
    pub insertion_loss_db: f64,
}

impl Coupler {
    pub(super) fn s_matrix(&self, wavelength: f64) -> DMatrix<Complex64> {
        let alpha = loss_amplitude(self.insertion_loss_db);

        let k_h = self.coupling_strength_h
            + self.coupling_gradient_h * (wavelength - self.central_wavelength_h);
        let k_v = self.coupling_strength_v
            + self.coupling_gradient_v * (wavelength - self.central_wavelength_v);

        let tau_h = Complex64::new(alpha * (k_h * self.length).cos(), 0.0);
        let tau_v = Complex64::new(alpha * (k_v * self.length).cos(), 0.0);
        let kappa_h = Complex64::new(0.0, alpha * (k_h * self.length).sin());
        let kappa_v = Complex64::new(0.0, alpha * (k_v * self.length).sin());

        directional_four_port(tau_h, tau_v, kappa_h, kappa_v)
    }
}

impl fmt::Display for Coupler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let alpha = loss_amplitude(self.insertion_loss_db);
        let thru_h = (alpha * (self.coupling_strength_h * self.length).cos()).powi(2) * 100.0;
        let thru_v = (alpha * (self.coupling_strength_v * self.length).cos()).powi(2) * 100.0;
        write!(
            f,
            "coupler ({:.2e} m, H {thru_h:.1}% thru, V {thru_v:.1}% thru, {} dB loss)",
            self.length, self.insertion_loss_db
        )
    }
}
