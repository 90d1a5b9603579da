// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The component library.
//!
//! Every device is described by its scattering matrix at a wavelength: a
//! dense 2N×2N complex matrix over the component's N ports, two modes per
//! port (H first, then V), input-side ports before output-side ports. The
//! matrix relates outgoing to incoming modal amplitudes, is linear, depends
//! on nothing but the wavelength, and knows nothing about the circuit graph.
//!
//! Matrices are evaluated fresh at every wavelength; nothing here caches.

mod beam_splitter;
mod condensed;
mod coupler;
mod mach_zehnder;
mod phase_shifter;
mod polarization_beam_splitter;
mod polarizer;
mod rotators;
mod wave_plates;

#[cfg(test)]
mod tests;

use std::fmt;

use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;

pub use condensed::Condensed;
pub use coupler::Coupler;
pub use mach_zehnder::MachZehnderInterferometer;
pub use phase_shifter::PhaseShifter;
pub use polarization_beam_splitter::{Extinction, PolarizationBeamSplitter};
pub use polarizer::{Polarizer, PolarizerAxis};
pub use rotators::FaradayRotator;
pub use wave_plates::{FastAxis, HalfWavePlate, QuarterWavePlate};

/// The devices this library can place in a circuit.
///
/// A closed set: the solver dispatches over it without virtual calls and
/// the condenser clones models into its retained chains. [`Condensed`] is
/// synthesised by the simulator when it fuses a chain; the other variants
/// are built by users.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentModel {
    /// 50/50 splitter/combiner; −π/2 phase on the cross paths.
    BeamSplitter,
    /// Directional coupler with wavelength-dependent coupling.
    Coupler(Coupler),
    /// Birefringent waveguide segment.
    PhaseShifter(PhaseShifter),
    /// Unbalanced interferometer folded into a single through device.
    MachZehnderInterferometer(MachZehnderInterferometer),
    /// Separates H and V onto different output ports.
    PolarizationBeamSplitter(PolarizationBeamSplitter),
    /// Fixed 90° mode converter: swaps H and V energy.
    PolarizationRotator,
    /// Linear polariser at an arbitrary axis.
    Polarizer(Polarizer),
    /// π retarder: rotates linear polarisation by twice its axis angle.
    HalfWavePlate(HalfWavePlate),
    /// π/2 retarder with the fast axis on H or V.
    QuarterWavePlate(QuarterWavePlate),
    /// Non-reciprocal rotator: a round trip rotates by twice the angle.
    FaradayRotator(FaradayRotator),
    /// A fused chain of sequential devices (built during condensation).
    Condensed(Condensed),
}

impl ComponentModel {
    pub fn num_inputs(&self) -> usize {
        match self {
            ComponentModel::BeamSplitter
            | ComponentModel::Coupler(_)
            | ComponentModel::PolarizationBeamSplitter(_) => 2,
            _ => 1,
        }
    }

    pub fn num_outputs(&self) -> usize {
        match self {
            ComponentModel::BeamSplitter
            | ComponentModel::Coupler(_)
            | ComponentModel::PolarizationBeamSplitter(_) => 2,
            _ => 1,
        }
    }

    pub fn num_ports(&self) -> usize {
        self.num_inputs() + self.num_outputs()
    }

    /// The scattering matrix at `wavelength`, sized 2N×2N for N ports.
    pub fn s_matrix(&self, wavelength: f64) -> DMatrix<Complex64> {
        match self {
            ComponentModel::BeamSplitter => beam_splitter::s_matrix(),
            ComponentModel::Coupler(c) => c.s_matrix(wavelength),
            ComponentModel::PhaseShifter(p) => p.s_matrix(wavelength),
            ComponentModel::MachZehnderInterferometer(m) => m.s_matrix(wavelength),
            ComponentModel::PolarizationBeamSplitter(p) => p.s_matrix(),
            ComponentModel::PolarizationRotator => rotators::polarization_rotator(),
            ComponentModel::Polarizer(p) => p.s_matrix(),
            ComponentModel::HalfWavePlate(h) => h.s_matrix(),
            ComponentModel::QuarterWavePlate(q) => q.s_matrix(),
            ComponentModel::FaradayRotator(r) => r.s_matrix(),
            ComponentModel::Condensed(c) => c.s_matrix(),
        }
    }

    pub(crate) fn kind_str(&self) -> &'static str {
        match self {
            ComponentModel::BeamSplitter => "beam splitter",
            ComponentModel::Coupler(_) => "coupler",
            ComponentModel::PhaseShifter(_) => "phase shifter",
            ComponentModel::MachZehnderInterferometer(_) => "Mach-Zehnder interferometer",
            ComponentModel::PolarizationBeamSplitter(_) => "polarization beam splitter",
            ComponentModel::PolarizationRotator => "polarization rotator",
            ComponentModel::Polarizer(_) => "polarizer",
            ComponentModel::HalfWavePlate(_) => "half-wave plate",
            ComponentModel::QuarterWavePlate(_) => "quarter-wave plate",
            ComponentModel::FaradayRotator(_) => "Faraday rotator",
            ComponentModel::Condensed(_) => "condensed chain",
        }
    }
}

impl fmt::Display for ComponentModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComponentModel::Coupler(c) => fmt::Display::fmt(c, f),
            ComponentModel::PhaseShifter(p) => fmt::Display::fmt(p, f),
            ComponentModel::MachZehnderInterferometer(m) => fmt::Display::fmt(m, f),
            ComponentModel::PolarizationBeamSplitter(p) => fmt::Display::fmt(p, f),
            ComponentModel::Polarizer(p) => fmt::Display::fmt(p, f),
            ComponentModel::HalfWavePlate(h) => fmt::Display::fmt(h, f),
            ComponentModel::QuarterWavePlate(q) => fmt::Display::fmt(q, f),
            ComponentModel::FaradayRotator(r) => fmt::Display::fmt(r, f),
            other => f.write_str(other.kind_str()),
        }
    }
}

/// Build the 4×4 matrix of a 1-in/1-out device from its forward (port 1 →
/// port 2) and backward (port 2 → port 1) Jones matrices. For a reciprocal
/// device the backward matrix is the transpose of the forward one.
pub(crate) fn two_port(
    forward: Matrix2<Complex64>,
    backward: Matrix2<Complex64>,
) -> DMatrix<Complex64> {
    let mut s = DMatrix::zeros(4, 4);
    s.view_mut((0, 2), (2, 2)).copy_from(&backward);
    s.view_mut((2, 0), (2, 2)).copy_from(&forward);
    s
}

/// Build the symmetric 8×8 matrix of a polarisation-preserving 2-in/2-out
/// device from its per-mode through (1↔3, 2↔4) and cross (1↔4, 2↔3)
/// amplitudes.
pub(crate) fn directional_four_port(
    through_h: Complex64,
    through_v: Complex64,
    cross_h: Complex64,
    cross_v: Complex64,
) -> DMatrix<Complex64> {
    let z = Complex64::default();
    let (th, tv, xh, xv) = (through_h, through_v, cross_h, cross_v);
    #[rustfmt::skip]
    let s = DMatrix::from_row_slice(8, 8, &[
         z,  z,  z,  z, th,  z, xh,  z,
         z,  z,  z,  z,  z, tv,  z, xv,
         z,  z,  z,  z, xh,  z, th,  z,
         z,  z,  z,  z,  z, xv,  z, tv,
        th,  z, xh,  z,  z,  z,  z,  z,
         z, tv,  z, xv,  z,  z,  z,  z,
        xh,  z, th,  z,  z,  z,  z,  z,
         z, xv,  z, tv,  z,  z,  z,  z,
    ]);
    s
}

/// Field transmission for an insertion loss in dB.
pub(crate) fn loss_amplitude(insertion_loss_db: f64) -> f64 {
    10f64.powf(-insertion_loss_db / 20.0)
}
