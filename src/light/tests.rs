// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polarisation conversion tests.

use approx::assert_abs_diff_eq;
use num_complex::Complex64;

use super::*;
use crate::constants::{FRAC_PI_2, FRAC_PI_4};

const WL: f64 = 1550e-9;

fn assert_stokes_eq(a: Stokes, b: Stokes, eps: f64) {
    assert_abs_diff_eq!(a.s0, b.s0, epsilon = eps);
    assert_abs_diff_eq!(a.s1, b.s1, epsilon = eps);
    assert_abs_diff_eq!(a.s2, b.s2, epsilon = eps);
    assert_abs_diff_eq!(a.s3, b.s3, epsilon = eps);
}

#[test]
fn stokes_to_jones_and_back_is_identity_for_pure_states() {
    // All pure: S0² = S1² + S2² + S3².
    let pure_states = [
        Stokes::new(1.0, 1.0, 0.0, 0.0),
        Stokes::new(1.0, -1.0, 0.0, 0.0),
        Stokes::new(1.0, 0.0, 1.0, 0.0),
        Stokes::new(1.0, 0.0, 0.0, 1.0),
        Stokes::new(1.0, 0.0, 0.0, -1.0),
        Stokes::new(
            1.0,
            (1.0f64 / 3.0).sqrt(),
            -(1.0f64 / 3.0).sqrt(),
            (1.0f64 / 3.0).sqrt(),
        ),
        Stokes::new(2.5, 1.5, -2.0, 0.0),
    ];

    for stokes in pure_states {
        for global_phase in [0.0, 0.3, -1.2] {
            let light = CoherentLight::from_stokes(stokes, WL, global_phase);
            assert_stokes_eq(light.stokes(), stokes, 1e-12);
        }
    }
}

#[test]
fn rhc_means_v_leads_h() {
    // IEEE convention: S3 = +1 is right-hand circular, V ahead of H by π/2.
    let light = CoherentLight::from_stokes(Stokes::new(1.0, 0.0, 0.0, 1.0), WL, 0.0);
    assert_abs_diff_eq!(
        light.phase(PolMode::Vertical) - light.phase(PolMode::Horizontal),
        FRAC_PI_2,
        epsilon = 1e-12
    );

    let (eh, ev) = right_circular(1.0);
    let light = CoherentLight::from_jones(eh, ev, WL);
    assert_abs_diff_eq!(light.stokes().s3, 1.0, epsilon = 1e-12);
}

#[test]
fn intensity_splits_by_mode() {
    let light = CoherentLight::from_jones(
        Complex64::new(0.6, 0.0),
        Complex64::new(0.0, 0.8),
        WL,
    );
    assert_abs_diff_eq!(light.intensity_h(), 0.36, epsilon = 1e-15);
    assert_abs_diff_eq!(light.intensity_v(), 0.64, epsilon = 1e-15);
    assert_abs_diff_eq!(light.intensity(), 1.0, epsilon = 1e-15);
}

#[test]
fn pure_states_have_unit_dop() {
    let diag = {
        let (eh, ev) = diagonal(1.0);
        CoherentLight::from_jones(eh, ev, WL)
    };
    assert_abs_diff_eq!(diag.degree_of_polarization(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(diag.orientation_angle(), FRAC_PI_4, epsilon = 1e-12);
    assert_abs_diff_eq!(diag.ellipticity_angle(), 0.0, epsilon = 1e-12);
}

#[test]
fn relative_phase_is_h_minus_v() {
    let light = CoherentLight::from_jones(
        Complex64::from_polar(1.0, 0.7),
        Complex64::from_polar(1.0, 0.2),
        WL,
    );
    assert_abs_diff_eq!(light.relative_phase(), 0.5, epsilon = 1e-12);
}

#[test]
fn incoherent_power_sums_components() {
    let (eh, ev) = horizontal(1.0);
    let a = CoherentLight::from_jones(eh, ev, WL);
    let (eh, ev) = vertical(0.5);
    let b = CoherentLight::from_jones(eh, ev, WL + 1e-9);
    let light = IncoherentLight {
        components: vec![a, b],
    };
    assert_abs_diff_eq!(light.intensity(), 1.25, epsilon = 1e-15);
    assert_abs_diff_eq!(light.intensity_h(), 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(light.intensity_v(), 0.25, epsilon = 1e-15);
}
