// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulation results.
//!
//! A [`SimulationResult`] maps every designated output port to the sequence
//! of light states it emitted, one per requested sample time, in order.
//! Ports are looked up with the same component-name + port-name references
//! used to build the circuit; the lookup resolves against a snapshot of the
//! caller's circuit, so condensation (which rewrites the working copy) is
//! invisible here.


use indexmap::IndexMap;
use thiserror::Error;

use crate::circuit::{Circuit, CircuitError, PortKey, PortRef};
use crate::light::{Coherence, Light, PolMode};

#[derive(Error, Debug)]
pub enum ResultError {
    /// A field-level view (phase, wavelength) was requested from an
    /// incoherent result, where only power-level quantities are defined.
    #[error("the result holds {actual} light; {requested} is only defined for coherent results")]
    InvalidLightType {
        actual: Coherence,
        requested: &'static str,
    },

    #[error("port {0} is not a designated circuit output")]
    NotAnOutput(PortRef),

    #[error(transparent)]
    Lookup(#[from] CircuitError),
}

/// The light observed at every output port of a simulated circuit.
#[derive(Debug)]
pub struct SimulationResult {
    /// Snapshot of the caller's circuit; names resolve against this.
    circuit: Circuit,
    coherence: Coherence,
    times: Vec<f64>,
    /// Output port → one light state per sample time.
    samples: IndexMap<PortKey, Vec<Light>>,
}

impl SimulationResult {
    pub(crate) fn new(
        circuit: Circuit,
        coherence: Coherence,
        times: Vec<f64>,
        per_port: Vec<(PortKey, Vec<Light>)>,
    ) -> SimulationResult {
        SimulationResult {
            circuit,
            coherence,
            times,
            samples: per_port.into_iter().collect(),
        }
    }

    /// Whether this result came from a coherent (one-source) or incoherent
    /// (multi-source) run.
    pub fn coherence(&self) -> Coherence {
        self.coherence
    }

    /// The sample times the result is aligned with.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The raw per-sample light states at an output port.
    pub fn lights(&self, port: impl Into<PortRef>) -> Result<&[Light], ResultError> {
        let port = port.into();
        let key = self.circuit.resolve(&port)?;
        self.samples
            .get(&key)
            .map(|lights| lights.as_slice())
            .ok_or(ResultError::NotAnOutput(port))
    }

    /// Total power per sample. Incoherent samples sum their components'
    /// powers; no cross term exists between mutually-incoherent sources.
    pub fn power(&self, port: impl Into<PortRef>) -> Result<Vec<f64>, ResultError> {
        Ok(self.lights(port)?.iter().map(Light::intensity).collect())
    }

    /// Power in the horizontal mode per sample.
    pub fn power_h(&self, port: impl Into<PortRef>) -> Result<Vec<f64>, ResultError> {
        Ok(self.lights(port)?.iter().map(Light::intensity_h).collect())
    }

    /// Power in the vertical mode per sample.
    pub fn power_v(&self, port: impl Into<PortRef>) -> Result<Vec<f64>, ResultError> {
        Ok(self.lights(port)?.iter().map(Light::intensity_v).collect())
    }

    /// Mean of [`power`](Self::power) over the samples. NaN for an empty
    /// sweep.
    pub fn average_power(&self, port: impl Into<PortRef>) -> Result<f64, ResultError> {
        let power = self.power(port)?;
        Ok(power.iter().sum::<f64>() / power.len() as f64)
    }

    /// Wavelength per sample. Coherent results only: an incoherent sample
    /// carries one wavelength per source.
    pub fn wavelengths(&self, port: impl Into<PortRef>) -> Result<Vec<f64>, ResultError> {
        self.coherent_view("wavelength", port, |c| c.wavelength)
    }

    /// Absolute phase of one polarisation mode per sample. Coherent results
    /// only.
    pub fn phase(
        &self,
        port: impl Into<PortRef>,
        mode: PolMode,
    ) -> Result<Vec<f64>, ResultError> {
        self.coherent_view("phase", port, |c| c.phase(mode))
    }

    /// Phase of H minus phase of V per sample. Coherent results only.
    pub fn relative_phase(&self, port: impl Into<PortRef>) -> Result<Vec<f64>, ResultError> {
        self.coherent_view("relative phase", port, |c| c.relative_phase())
    }

    fn coherent_view(
        &self,
        requested: &'static str,
        port: impl Into<PortRef>,
        view: impl Fn(&crate::light::CoherentLight) -> f64,
    ) -> Result<Vec<f64>, ResultError> {
        if self.coherence == Coherence::Incoherent {
            return Err(ResultError::InvalidLightType {
                actual: self.coherence,
                requested,
            });
        }
        self.lights(port)?
            .iter()
            .map(|light| match light {
                Light::Coherent(c) => Ok(view(c)),
                Light::Incoherent(_) => Err(ResultError::InvalidLightType {
                    actual: Coherence::Incoherent,
                    requested,
                }),
            })
            .collect()
    }
}
