// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frequency-domain simulation of linear, polarisation-aware photonic
//! circuits.
//!
//! Build a [`Circuit`] out of library components (beam splitters, couplers,
//! wave plates, phase shifters, …), wire their ports, hang [`Laser`]s on
//! the inputs and detectors on the outputs, and ask a [`Simulation`] for
//! the steady-state field at every output across a time or wavelength
//! sweep. Fields are Jones pairs (two complex amplitudes per port), so
//! polarisation effects fall out of the linear algebra instead of being
//! bolted on.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lucerna::models::ComponentModel;
//! use lucerna::{Circuit, Component, Laser, Simulation, Stokes};
//!
//! let mut circuit = Circuit::new();
//! circuit.add(Component::new("bs", ComponentModel::BeamSplitter))?;
//! circuit.set_input(
//!     Laser::from_stokes(Stokes::new(1.0, 1.0, 0.0, 0.0), 1550e-9),
//!     ("bs", 1),
//! )?;
//! circuit.set_output(("bs", 3))?;
//! circuit.set_output(("bs", 4))?;
//!
//! let result = Simulation::new(&circuit).simulate(&[0.0])?;
//! let split = result.power(("bs", 3))?;
//! assert!((split[0] - 0.5).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub(crate) mod assemble;
pub mod circuit;
pub(crate) mod condense;
pub mod constants;
pub(crate) mod error;
pub mod laser;
pub mod light;
pub mod result;
pub mod simulate;
pub(crate) mod solve;

// Re-exports.
pub use circuit::models;
pub use circuit::{
    Circuit, CircuitError, Component, Connection, Port, PortKey, PortKind, PortName, PortRef,
};
pub use condense::error::CondenseError;
pub use error::LucernaError;
pub use laser::Laser;
pub use light::{Coherence, CoherentLight, IncoherentLight, Light, PolMode, Stokes};
pub use result::{ResultError, SimulationResult};
pub use simulate::{SimulateError, Simulation};
pub use solve::SolveError;
