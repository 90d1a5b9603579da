// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All wavelengths are in metres and all phases in radians. Everything is double
precision; `lucerna` never downgrades a field amplitude below `f64`.
 */

pub use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// Wavelength sweeps whose total spread is below this value are treated as
/// monochromatic, which lets a simulation reuse one factorisation of the
/// scattering system across every sample.
pub const WAVELENGTH_CONSTANT_TOLERANCE: f64 = 1e-9;

/// The placeholder wavelength used when folding chains during condensation.
/// The folded matrix at this wavelength is only used to establish structure;
/// every chain is re-folded at the real wavelength before a solve.
pub const DUMMY_WAVELENGTH: f64 = 1.0;

/// Systems with fewer modes than this always take the dense solver path; the
/// sparse machinery costs more than it saves down here.
pub const DENSE_MODE_CUTOFF: usize = 1000;

/// A dense system matrix bigger than this many bytes forces the sparse path.
pub const DENSE_FOOTPRINT_CEILING: usize = 8 * 1024 * 1024 * 1024;

/// Below this non-zero density the sparse path wins even when the dense
/// matrix would fit comfortably in memory.
pub const SPARSITY_CUTOFF: f64 = 0.02;

/// Bytes per element of a dense complex system matrix.
pub const COMPLEX_SIZE: usize = 16;
