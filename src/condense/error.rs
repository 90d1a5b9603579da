// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for chain condensation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondenseError {
    /// The Redheffer interior of a chain could not be inverted. This
    /// happens on perfectly resonant cascades; the chain is reported by its
    /// member component names, upstream first.
    #[error("cannot fold chain [{}] at λ = {wavelength:.4e} m: the reflection interior is singular",
            .components.join(" → "))]
    IllConditionedChain {
        components: Vec<String>,
        wavelength: f64,
    },
}
