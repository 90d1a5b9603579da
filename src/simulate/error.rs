// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for simulation runs.

use thiserror::Error;

use crate::condense::CondenseError;
use crate::solve::SolveError;

#[derive(Error, Debug)]
pub enum SimulateError {
    #[error("the circuit has no circuit {missing}; designate at least one input and one output before simulating")]
    EmptyInterface { missing: &'static str },

    #[error("the laser driving '{component}' returned a non-physical sample at t = {time:e}: \
             field components must be finite and the wavelength finite and positive")]
    InvalidLightFunction { component: String, time: f64 },

    #[error("simulation cancelled")]
    Cancelled,

    #[error(transparent)]
    Condense(#[from] CondenseError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}
