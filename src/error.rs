// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The top-level error type, aggregating every sub-error the crate can
//! produce. Callers who don't care which stage failed can bubble
//! everything up as a [`LucernaError`].

use thiserror::Error;

use crate::circuit::CircuitError;
use crate::result::ResultError;
use crate::simulate::SimulateError;

#[derive(Error, Debug)]
pub enum LucernaError {
    /// A circuit-building call was rejected.
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// A simulation run aborted. No partial result exists.
    #[error(transparent)]
    Simulate(#[from] SimulateError),

    /// A result lookup or view failed.
    #[error(transparent)]
    Result(#[from] ResultError),
}
