// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Component library tests.

use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use num_complex::Complex64;

use super::*;
use crate::constants::{FRAC_PI_2, PI, TAU};

const WL: f64 = 1550e-9;

/// Largest |element| of SᴴS − I.
fn unitarity_defect(s: &DMatrix<Complex64>) -> f64 {
    let n = s.nrows();
    let product = s.adjoint() * s;
    let defect = product - DMatrix::<Complex64>::identity(n, n);
    defect.iter().map(|e| e.norm()).fold(0.0, f64::max)
}

#[test]
fn lossless_components_are_unitary() {
    let shifter = PhaseShifter::isotropic(1.5, 1e-3, WL);
    let birefringent = PhaseShifter {
        n_h: 1.52,
        n_h_gradient: 1e4,
        central_wavelength_h: WL,
        n_v: 1.48,
        n_v_gradient: -2e4,
        central_wavelength_v: WL,
        length: 2e-3,
        loss_h_db_per_m: 0.0,
        loss_v_db_per_m: 0.0,
    };
    let coupler = Coupler {
        central_wavelength_h: WL,
        central_wavelength_v: WL,
        coupling_strength_h: 7000.0,
        coupling_strength_v: 7400.0,
        coupling_gradient_h: 1e9,
        coupling_gradient_v: 1e9,
        length: 1e-4,
        insertion_loss_db: 0.0,
    };

    let lossless: Vec<ComponentModel> = vec![
        ComponentModel::BeamSplitter,
        ComponentModel::Coupler(coupler),
        ComponentModel::PhaseShifter(shifter),
        ComponentModel::PhaseShifter(birefringent),
        ComponentModel::PolarizationBeamSplitter(PolarizationBeamSplitter::ideal()),
        ComponentModel::PolarizationRotator,
        ComponentModel::HalfWavePlate(HalfWavePlate { angle: 0.37 }),
        ComponentModel::QuarterWavePlate(QuarterWavePlate {
            fast_axis: FastAxis::Vertical,
        }),
        ComponentModel::FaradayRotator(FaradayRotator { angle: 0.81 }),
    ];

    for model in lossless {
        let s = model.s_matrix(WL);
        assert!(
            unitarity_defect(&s) < 1e-9,
            "{model} is not unitary: defect {}",
            unitarity_defect(&s)
        );
    }
}

#[test]
fn beam_splitter_splits_evenly_with_quadrature_phase() {
    let s = ComponentModel::BeamSplitter.s_matrix(WL);
    // H into port 1: outgoing port 3 H is row 4, outgoing port 4 H is row 6.
    let through = s[(4, 0)];
    let cross = s[(6, 0)];
    assert_abs_diff_eq!(through.norm_sqr(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(cross.norm_sqr(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(cross.arg() - through.arg(), -FRAC_PI_2, epsilon = 1e-12);
}

#[test]
fn phase_shifter_uses_engineering_sign_convention() {
    // 2π·n·L/λ = π/2 → forward element must be e^{−iπ/2} = −i.
    let n = 1.5;
    let length = WL / (4.0 * n);
    let s = ComponentModel::PhaseShifter(PhaseShifter::isotropic(n, length, WL)).s_matrix(WL);
    let forward_h = s[(2, 0)];
    assert_abs_diff_eq!(forward_h.re, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(forward_h.im, -1.0, epsilon = 1e-12);
}

#[test]
fn phase_shifter_loss_converts_db_per_metre() {
    let mut shifter = PhaseShifter::isotropic(1.5, 2.0, WL);
    shifter.loss_h_db_per_m = 3.0;
    let s = ComponentModel::PhaseShifter(shifter).s_matrix(WL);
    // 6 dB over 2 m: field factor 10^(−6/20).
    assert_abs_diff_eq!(s[(2, 0)].norm(), 10f64.powf(-0.3), epsilon = 1e-12);
    // V mode is lossless here.
    assert_abs_diff_eq!(s[(3, 1)].norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn coupler_coupling_disperses_linearly() {
    let coupler = Coupler {
        central_wavelength_h: WL,
        central_wavelength_v: WL,
        coupling_strength_h: PI / (4.0 * 1e-4),
        coupling_strength_v: PI / (4.0 * 1e-4),
        coupling_gradient_h: 0.0,
        coupling_gradient_v: 0.0,
        length: 1e-4,
        insertion_loss_db: 0.0,
    };
    // κL = π/4: a 50/50 split.
    let s = ComponentModel::Coupler(coupler).s_matrix(WL);
    assert_abs_diff_eq!(s[(4, 0)].norm_sqr(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(s[(6, 0)].norm_sqr(), 0.5, epsilon = 1e-12);

    // A gradient moves the split away from 50/50 off-centre.
    let dispersive = Coupler {
        coupling_gradient_h: 1e12,
        coupling_gradient_v: 1e12,
        ..coupler
    };
    let s = ComponentModel::Coupler(dispersive).s_matrix(WL + 100e-9);
    assert!((s[(4, 0)].norm_sqr() - 0.5).abs() > 1e-3);
}

#[test]
fn pbs_extinction_ratio_sets_leakage_power() {
    let pbs = PolarizationBeamSplitter {
        extinction: Extinction::Db(20.0),
        insertion_loss_db: 0.0,
        phase_through: 0.0,
        phase_leak: 0.0,
    };
    let s = ComponentModel::PolarizationBeamSplitter(pbs).s_matrix(WL);
    let t = s[(4, 0)].norm_sqr();
    let e = s[(5, 0)].norm_sqr();
    // 20 dB extinction: 100:1 in power, summing to the (lossless) total.
    assert_abs_diff_eq!(t / e, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(t + e, 1.0, epsilon = 1e-12);

    let ideal = ComponentModel::PolarizationBeamSplitter(PolarizationBeamSplitter::ideal())
        .s_matrix(WL);
    assert_abs_diff_eq!(ideal[(4, 0)].norm_sqr(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ideal[(5, 0)].norm_sqr(), 0.0, epsilon = 1e-12);
}

#[test]
fn faraday_rotation_accumulates_over_a_round_trip() {
    let angle = 0.3;
    let s = ComponentModel::FaradayRotator(FaradayRotator { angle }).s_matrix(WL);
    let forward = s.view((2, 0), (2, 2)).clone_owned();
    let backward = s.view((0, 2), (2, 2)).clone_owned();

    // Forward is a rotation by θ...
    assert_abs_diff_eq!(forward[(0, 0)].re, angle.cos(), epsilon = 1e-12);
    assert_abs_diff_eq!(forward[(1, 0)].re, angle.sin(), epsilon = 1e-12);

    // ...and the round trip rotates by 2θ instead of cancelling.
    let round_trip = backward * forward;
    assert_abs_diff_eq!(round_trip[(0, 0)].re, (2.0 * angle).cos(), epsilon = 1e-12);
    assert_abs_diff_eq!(round_trip[(1, 0)].re, (2.0 * angle).sin(), epsilon = 1e-12);
}

#[test]
fn half_wave_plate_rotates_linear_polarization_by_twice_its_angle() {
    let hwp = ComponentModel::HalfWavePlate(HalfWavePlate { angle: PI / 8.0 });
    let s = hwp.s_matrix(WL);
    // H in → 45° linear out.
    let out_h = s[(2, 0)];
    let out_v = s[(3, 0)];
    assert_abs_diff_eq!(out_h.re, (PI / 4.0).cos(), epsilon = 1e-12);
    assert_abs_diff_eq!(out_v.re, (PI / 4.0).sin(), epsilon = 1e-12);
}

#[test]
fn polarizer_blocks_the_orthogonal_mode() {
    let s = ComponentModel::Polarizer(Polarizer {
        axis: PolarizerAxis::Horizontal,
    })
    .s_matrix(WL);
    assert_abs_diff_eq!(s[(2, 0)].norm(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(s[(3, 1)].norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn mzi_splits_power_between_cos_and_sin_arms() {
    let mzi = MachZehnderInterferometer {
        arm_length: 1e-4,
        n_h: 1.5,
        n_h_gradient: 0.0,
        central_wavelength_h: WL,
        n_v: 1.5,
        n_v_gradient: 0.0,
        central_wavelength_v: WL,
    };
    let s = ComponentModel::MachZehnderInterferometer(mzi).s_matrix(WL);
    let phi = TAU * 1.5 * 1e-4 / WL;
    let forward = s[(2, 0)];
    let backward = s[(0, 2)];
    assert_abs_diff_eq!(forward.norm(), (phi / 2.0).cos().abs(), epsilon = 1e-12);
    assert_abs_diff_eq!(backward.norm(), (phi / 2.0).sin().abs(), epsilon = 1e-12);
    // All power accounted for between the two arms.
    assert_abs_diff_eq!(
        forward.norm_sqr() + backward.norm_sqr(),
        1.0,
        epsilon = 1e-12
    );
}

#[test]
fn quarter_wave_plates_compose_to_identity_on_diagonal_light() {
    let vertical = ComponentModel::QuarterWavePlate(QuarterWavePlate {
        fast_axis: FastAxis::Vertical,
    })
    .s_matrix(WL);
    let horizontal = ComponentModel::QuarterWavePlate(QuarterWavePlate {
        fast_axis: FastAxis::Horizontal,
    })
    .s_matrix(WL);

    let j_v = vertical.view((2, 0), (2, 2)).clone_owned();
    let j_h = horizontal.view((2, 0), (2, 2)).clone_owned();
    let both = j_h * j_v;
    // Opposite fast axes cancel up to a global phase.
    let ratio = both[(1, 1)] / both[(0, 0)];
    assert_abs_diff_eq!(ratio.re, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ratio.im, 0.0, epsilon = 1e-12);
}
