// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polarisation beam splitters.

use std::fmt;

use nalgebra::DMatrix;
use num_complex::Complex64;

use super::loss_amplitude;

/// How well the wrong polarisation is suppressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extinction {
    /// No leakage at all.
    Ideal,
    /// A finite extinction ratio in dB (20 dB ≈ 100:1 in power).
    Db(f64),
}

/// A 2-in/2-out device that physically separates the H and V components.
///
/// H entering port 1 leaves at port 3 (through) and V at port 4 (cross);
/// port 2 mirrors that onto ports 4 and 3. Driving both inputs combines an
/// H and a V field onto one output. A finite extinction ratio leaks a little
/// of each polarisation down the wrong path, with its own phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarizationBeamSplitter {
    /// Crosstalk suppression.
    pub extinction: Extinction,
    /// Total power lost \[dB\].
    pub insertion_loss_db: f64,
    /// Phase of the intended path \[rad\].
    pub phase_through: f64,
    /// Phase of the leakage path \[rad\].
    pub phase_leak: f64,
}

impl PolarizationBeamSplitter {
    /// A lossless splitter with infinite extinction and no added phase.
    pub fn ideal() -> PolarizationBeamSplitter {
        PolarizationBeamSplitter {
            extinction: Extinction::Ideal,
            insertion_loss_db: 0.0,
            phase_through: 0.0,
            phase_leak: 0.0,
        }
    }

    pub(super) fn s_matrix(&self) -> DMatrix<Complex64> {
        let alpha = loss_amplitude(self.insertion_loss_db);

        let (magnitude_t, magnitude_e) = match self.extinction {
            Extinction::Ideal => (alpha, 0.0),
            Extinction::Db(er_db) => {
                let amplitude_ratio = 10f64.powf(er_db / 20.0);
                let e = alpha / (amplitude_ratio.powi(2) + 1.0).sqrt();
                ((alpha.powi(2) - e.powi(2)).sqrt(), e)
            }
        };

        let t = Complex64::from_polar(magnitude_t, self.phase_through);
        let e = Complex64::from_polar(magnitude_e, self.phase_leak);
        let z = Complex64::default();

        #[rustfmt::skip]
        let s = DMatrix::from_row_slice(8, 8, &[
            z, z, z, z, t, e, z, z,
            z, z, z, z, z, z, e, t,
            z, z, z, z, z, z, t, e,
            z, z, z, z, e, t, z, z,
            t, z, z, e, z, z, z, z,
            e, z, z, t, z, z, z, z,
            z, e, t, z, z, z, z, z,
            z, t, e, z, z, z, z, z,
        ]);
        s
    }
}

impl fmt::Display for PolarizationBeamSplitter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.extinction {
            Extinction::Ideal => write!(
                f,
                "PBS (ideal extinction, {} dB loss)",
                self.insertion_loss_db
            ),
            Extinction::Db(er) => {
                let leakage_pct = 10f64.powf(-er / 10.0) * 100.0;
                write!(
                    f,
                    "PBS ({er} dB extinction, {leakage_pct:.4}% leakage, {} dB loss)",
                    self.insertion_loss_db
                )
            }
        }
    }
}
