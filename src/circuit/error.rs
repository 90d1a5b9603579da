// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for circuit-building problems.
//!
//! Every variant here is raised at the offending builder call, before any
//! state is mutated; a failed call leaves the circuit exactly as it was.

use thiserror::Error;

use super::port::{PortName, PortRef};

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("component '{0}' already belongs to a circuit")]
    DuplicateComponent(String),

    #[error("a different component named '{0}' is already in the circuit")]
    DuplicateComponentName(String),

    #[error("component '{0}' still has live connections; disconnect them before removing it")]
    ComponentStillConnected(String),

    #[error("no component named '{0}' in the circuit")]
    MissingComponent(String),

    #[error("'{alias}' is not an alias of any port on component '{component}'")]
    MissingAlias { component: String, alias: String },

    #[error("'{alias}' already exists as a port alias on component '{component}'")]
    DuplicatePortAlias { component: String, alias: String },

    #[error("component '{component}' has no port {port}")]
    MissingPort { component: String, port: PortName },

    #[error("cannot connect port {0} to itself")]
    SelfConnection(PortRef),

    #[error("port {port} is already a circuit {role}; a port cannot be both an input and an output")]
    ConflictingConnection { port: PortRef, role: &'static str },

    #[error("component '{component}' is non-passive at λ = {wavelength:.4e} m (‖S‖₂ = {norm:.6})")]
    Passivity {
        component: String,
        wavelength: f64,
        norm: f64,
    },
}
