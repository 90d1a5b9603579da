// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Laser sources.
//!
//! A laser is a pure function from a sample time to a coherent field. The
//! scheduler may call it from worker threads, so the profile must be `Send +
//! Sync`; it is shared (not copied) when a circuit is deep-cloned for a
//! simulation run.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;

use crate::light::{CoherentLight, Stokes};

/// A time-indexed coherent source feeding one circuit input.
#[derive(Clone)]
pub struct Laser {
    profile: Arc<dyn Fn(f64) -> CoherentLight + Send + Sync>,
}

impl Laser {
    /// A laser with an arbitrary time profile. The profile must be pure:
    /// same `t` in, same field out.
    pub fn new<F>(profile: F) -> Laser
    where
        F: Fn(f64) -> CoherentLight + Send + Sync + 'static,
    {
        Laser {
            profile: Arc::new(profile),
        }
    }

    /// A time-invariant source with a fixed Jones pair.
    pub fn continuous_wave(eh: Complex64, ev: Complex64, wavelength: f64) -> Laser {
        Laser::new(move |_| CoherentLight::from_jones(eh, ev, wavelength))
    }

    /// A time-invariant source described by a fully-polarised Stokes state.
    pub fn from_stokes(stokes: Stokes, wavelength: f64) -> Laser {
        Laser::new(move |_| CoherentLight::from_stokes(stokes, wavelength, 0.0))
    }

    /// Evaluate the profile at `t`. The scheduler validates the returned
    /// sample; a non-finite field or non-positive wavelength is rejected as
    /// an invalid light function there.
    pub fn sample(&self, t: f64) -> CoherentLight {
        (self.profile)(t)
    }
}

impl fmt::Debug for Laser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Laser(..)")
    }
}
