// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Field and polarisation primitives.
//!
//! A coherent field is a Jones pair (E_H, E_V) of complex phasors plus the
//! wavelength it was sampled at; partially-characterised quantities use the
//! Stokes description. Conversions follow the engineering sign convention
//! (field ∝ e^{i(ωt − kz)}) and the IEEE handedness convention (right-hand
//! circular means V leads H).

#[cfg(test)]
mod tests;

use std::fmt;

use num_complex::Complex64;

use crate::constants::FRAC_PI_2;

/// The four Stokes parameters of a polarisation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stokes {
    pub s0: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl Stokes {
    pub fn new(s0: f64, s1: f64, s2: f64, s3: f64) -> Stokes {
        Stokes { s0, s1, s2, s3 }
    }

    /// The degree of polarisation, √(S1² + S2² + S3²)/S0.
    ///
    /// NaN for a dark field (S0 = 0); clamping is left to display layers.
    pub fn degree_of_polarization(&self) -> f64 {
        (self.s1.powi(2) + self.s2.powi(2) + self.s3.powi(2)).sqrt() / self.s0
    }
}

impl fmt::Display for Stokes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "S = [{:.3}, {:.3}, {:.3}, {:.3}]ᵀ",
            self.s0, self.s1, self.s2, self.s3
        )
    }
}

/// Which polarisation mode of a port is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolMode {
    Horizontal,
    Vertical,
}

/// Whether light states carry field-level or power-level superposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coherence {
    /// A single source; fields interfere.
    Coherent,
    /// Multiple mutually-incoherent sources; only powers add.
    Incoherent,
}

impl fmt::Display for Coherence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coherence::Coherent => write!(f, "COHERENT"),
            Coherence::Incoherent => write!(f, "INCOHERENT"),
        }
    }
}

/// A monochromatic, fully-polarised field sample: a Jones pair and the
/// wavelength it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoherentLight {
    /// Horizontal Jones component.
    pub eh: Complex64,
    /// Vertical Jones component.
    pub ev: Complex64,
    /// Wavelength \[m\].
    pub wavelength: f64,
}

impl CoherentLight {
    pub fn from_jones(eh: Complex64, ev: Complex64, wavelength: f64) -> CoherentLight {
        CoherentLight { eh, ev, wavelength }
    }

    /// Construct the Jones pair of a fully-polarised Stokes state.
    ///
    /// A_x = √((S0+S1)/2), A_y = √((S0−S1)/2) and the relative phase is
    /// atan2(S3, S2), so S3 > 0 (RHC) puts V ahead of H.
    pub fn from_stokes(stokes: Stokes, wavelength: f64, global_phase: f64) -> CoherentLight {
        let a_x = (0.5 * (stokes.s0 + stokes.s1)).sqrt();
        let a_y = (0.5 * (stokes.s0 - stokes.s1)).sqrt();
        let relative_phase = stokes.s3.atan2(stokes.s2);
        CoherentLight {
            eh: Complex64::from_polar(a_x, global_phase),
            ev: Complex64::from_polar(a_y, global_phase + relative_phase),
            wavelength,
        }
    }

    /// The Stokes description of this field.
    pub fn stokes(&self) -> Stokes {
        Stokes {
            s0: self.eh.norm_sqr() + self.ev.norm_sqr(),
            s1: self.eh.norm_sqr() - self.ev.norm_sqr(),
            s2: 2.0 * (self.eh.conj() * self.ev).re,
            s3: 2.0 * (self.eh.conj() * self.ev).im,
        }
    }

    /// Total optical power, |E_H|² + |E_V|².
    pub fn intensity(&self) -> f64 {
        self.eh.norm_sqr() + self.ev.norm_sqr()
    }

    pub fn intensity_h(&self) -> f64 {
        self.eh.norm_sqr()
    }

    pub fn intensity_v(&self) -> f64 {
        self.ev.norm_sqr()
    }

    pub fn degree_of_polarization(&self) -> f64 {
        self.stokes().degree_of_polarization()
    }

    /// Orientation of the polarisation ellipse's major axis, ½·atan2(S2, S1).
    pub fn orientation_angle(&self) -> f64 {
        let s = self.stokes();
        0.5 * s.s2.atan2(s.s1)
    }

    /// Ellipticity angle, ½·asin(S3/√(S1² + S2² + S3²)).
    pub fn ellipticity_angle(&self) -> f64 {
        let s = self.stokes();
        0.5 * (s.s3 / (s.s1.powi(2) + s.s2.powi(2) + s.s3.powi(2)).sqrt()).asin()
    }

    /// Absolute phase of one polarisation mode.
    pub fn phase(&self, mode: PolMode) -> f64 {
        match mode {
            PolMode::Horizontal => self.eh.arg(),
            PolMode::Vertical => self.ev.arg(),
        }
    }

    /// Phase of H minus phase of V.
    pub fn relative_phase(&self) -> f64 {
        self.eh.arg() - self.ev.arg()
    }

    /// Is every number in this sample finite?
    pub(crate) fn is_finite(&self) -> bool {
        self.eh.re.is_finite()
            && self.eh.im.is_finite()
            && self.ev.re.is_finite()
            && self.ev.im.is_finite()
            && self.wavelength.is_finite()
    }
}

impl fmt::Display for CoherentLight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "E_H = {:.4e}∠{:.3}, E_V = {:.4e}∠{:.3} @ {:.1} nm",
            self.eh.norm(),
            self.eh.arg(),
            self.ev.norm(),
            self.ev.arg(),
            self.wavelength * 1e9
        )
    }
}

/// The superposition of mutually-incoherent coherent fields.
///
/// There is no cross term between incoherent sources, so the component
/// fields are never pre-summed; power-level quantities sum over the
/// components instead.
#[derive(Clone, Debug, PartialEq)]
pub struct IncoherentLight {
    /// One entry per active source, in the circuit's input order.
    pub components: Vec<CoherentLight>,
}

impl IncoherentLight {
    pub fn intensity(&self) -> f64 {
        self.components.iter().map(|c| c.intensity()).sum()
    }

    pub fn intensity_h(&self) -> f64 {
        self.components.iter().map(|c| c.intensity_h()).sum()
    }

    pub fn intensity_v(&self) -> f64 {
        self.components.iter().map(|c| c.intensity_v()).sum()
    }
}

/// A single output sample: either one coherent field, or a power-level
/// superposition of several.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Coherent(CoherentLight),
    Incoherent(IncoherentLight),
}

impl Light {
    pub fn coherence(&self) -> Coherence {
        match self {
            Light::Coherent(_) => Coherence::Coherent,
            Light::Incoherent(_) => Coherence::Incoherent,
        }
    }

    pub fn intensity(&self) -> f64 {
        match self {
            Light::Coherent(c) => c.intensity(),
            Light::Incoherent(i) => i.intensity(),
        }
    }

    pub fn intensity_h(&self) -> f64 {
        match self {
            Light::Coherent(c) => c.intensity_h(),
            Light::Incoherent(i) => i.intensity_h(),
        }
    }

    pub fn intensity_v(&self) -> f64 {
        match self {
            Light::Coherent(c) => c.intensity_v(),
            Light::Incoherent(i) => i.intensity_v(),
        }
    }
}

/// Jones pairs of a few named states, mostly for tests and laser helpers.
pub fn horizontal(amplitude: f64) -> (Complex64, Complex64) {
    (Complex64::new(amplitude, 0.0), Complex64::new(0.0, 0.0))
}

pub fn vertical(amplitude: f64) -> (Complex64, Complex64) {
    (Complex64::new(0.0, 0.0), Complex64::new(amplitude, 0.0))
}

/// Diagonal (+45°) linear polarisation.
pub fn diagonal(amplitude: f64) -> (Complex64, Complex64) {
    let a = Complex64::new(amplitude / 2.0_f64.sqrt(), 0.0);
    (a, a)
}

/// Right-hand circular: V leads H by π/2.
pub fn right_circular(amplitude: f64) -> (Complex64, Complex64) {
    let a = amplitude / 2.0_f64.sqrt();
    (
        Complex64::new(a, 0.0),
        Complex64::from_polar(a, FRAC_PI_2),
    )
}
