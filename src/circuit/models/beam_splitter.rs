// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The ideal 50/50 beam splitter.
//!
//! Ports 1 and 2 are inputs, 3 and 4 outputs. The through paths (1↔3, 2↔4)
//! leave the field unchanged; the cross paths (1↔4, 2↔3) pick up a −π/2
//! phase, which is what makes the device lossless. Feeding a single input
//! splits the power in half; feeding both inputs with a π/2 lead on one
//! recombines everything onto a single output.

use nalgebra::DMatrix;
use num_complex::Complex64;

use super::directional_four_port;

pub(super) fn s_matrix() -> DMatrix<Complex64> {
    let through = Complex64::new(1.0 / 2f64.sqrt(), 0.0);
    let cross = Complex64::new(0.0, -1.0 / 2f64.sqrt());
    directional_four_port(through, through, cross, cross)
}
