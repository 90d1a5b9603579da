// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Condenser tests: the star product itself, chain discovery, and splicing.

use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use num_complex::Complex64;

use super::*;
use crate::circuit::models::PhaseShifter;
use crate::circuit::Circuit;
use crate::constants::TAU;
use crate::laser::Laser;

const WL: f64 = 1550e-9;

fn shifter(name: &str, n: f64, length: f64) -> Component {
    Component::new(
        name,
        ComponentModel::PhaseShifter(PhaseShifter::isotropic(n, length, WL)),
    )
}

fn bs(name: &str) -> Component {
    Component::new(name, ComponentModel::BeamSplitter)
}

fn laser() -> Laser {
    Laser::continuous_wave(Complex64::new(1.0, 0.0), Complex64::default(), WL)
}

fn max_abs_diff(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> f64 {
    (a - b).iter().map(|e| e.norm()).fold(0.0, f64::max)
}

/// A dense, well-conditioned 4×4 with non-trivial reflection blocks, seeded
/// deterministically.
fn scattering_like(seed: u64) -> DMatrix<Complex64> {
    // Small reflections keep the Redheffer interiors far from singular.
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 32) as f64 / (1u64 << 31) as f64) - 1.0
    };
    DMatrix::from_fn(4, 4, |r, c| {
        let interior = (r < 2) == (c < 2);
        let scale = if interior { 0.2 } else { 0.6 };
        Complex64::new(scale * next(), scale * next())
    })
}

#[test]
fn star_is_associative() {
    let a = scattering_like(1);
    let b = scattering_like(2);
    let c = scattering_like(3);

    let left = star(&star(&a, &b).unwrap(), &c).unwrap();
    let right = star(&a, &star(&b, &c).unwrap()).unwrap();
    assert!(max_abs_diff(&left, &right) < 1e-9);
}

#[test]
fn star_of_reflectionless_devices_multiplies_their_transmissions() {
    // A quarter-wave and an eighth-wave segment: phases π/2 and π/4.
    let a = shifter("a", 1.0, WL / 4.0).model().s_matrix(WL);
    let b = shifter("b", 1.0, WL / 8.0).model().s_matrix(WL);

    let fused = star(&a, &b).unwrap();
    let forward = fused[(2, 0)];
    assert_abs_diff_eq!(forward.norm(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(forward.arg(), -3.0 * TAU / 8.0, epsilon = 1e-12);
    // No reflection appears out of nothing.
    assert_abs_diff_eq!(fused[(0, 0)].norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn star_rejects_a_singular_interior() {
    // A22·B11 = I makes the interior exactly singular.
    let mut a = DMatrix::<Complex64>::zeros(4, 4);
    let mut b = DMatrix::<Complex64>::zeros(4, 4);
    for i in 0..2 {
        a[(2 + i, 2 + i)] = Complex64::new(1.0, 0.0);
        b[(i, i)] = Complex64::new(1.0, 0.0);
    }
    assert!(star(&a, &b).is_none());
}

#[test]
fn a_run_of_shifters_between_splitters_fuses_into_one_component() {
    let mut circuit = Circuit::new();
    circuit.add(bs("split")).unwrap();
    circuit.add(bs("merge")).unwrap();
    for i in 0..10 {
        circuit.add(shifter(&format!("ps{i}"), 1.5, 1e-4)).unwrap();
    }
    circuit.connect(("split", 3), ("ps0", 1)).unwrap();
    for i in 0..9 {
        circuit
            .connect((format!("ps{i}"), 2), (format!("ps{}", i + 1), 1))
            .unwrap();
    }
    circuit.connect(("ps9", 2), ("merge", 1)).unwrap();
    // Keep the splitters anchored with boundary designations.
    circuit.set_input(laser(), ("split", 1)).unwrap();
    circuit.connect(("split", 4), ("merge", 2)).unwrap();
    circuit.set_output(("merge", 3)).unwrap();

    let before = circuit.num_components();
    let chains = condense(&mut circuit).unwrap();

    assert_eq!(before, 12);
    assert_eq!(circuit.num_components(), 3);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].len(), 10);

    let condensed = circuit.comp(chains[0].condensed);
    assert_eq!(condensed.num_inputs(), 1);
    assert_eq!(condensed.num_outputs(), 1);
    assert_eq!(condensed.in_degree(), 1);
    assert_eq!(condensed.out_degree(), 1);
}

#[test]
fn a_chain_between_laser_and_detector_keeps_its_designations() {
    let mut circuit = Circuit::new();
    circuit.add(shifter("a", 1.5, 1e-4)).unwrap();
    circuit.add(shifter("b", 1.5, 2e-4)).unwrap();
    circuit.connect(("a", 2), ("b", 1)).unwrap();
    circuit.set_input(laser(), ("a", 1)).unwrap();
    circuit.set_output(("b", 2)).unwrap();

    let chains = condense(&mut circuit).unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(circuit.num_components(), 1);

    // Laser mapping and the output entry moved onto the synthetic ports.
    let synth = chains[0].condensed;
    let input_key = *circuit.inputs().keys().next().unwrap();
    assert_eq!(input_key, PortKey { component: synth, port: 0 });
    assert_eq!(circuit.outputs(), [PortKey { component: synth, port: 1 }]);
}

#[test]
fn single_component_runs_are_left_alone() {
    let mut circuit = Circuit::new();
    circuit.add(bs("split")).unwrap();
    circuit.add(bs("merge")).unwrap();
    circuit.add(shifter("ps", 1.5, 1e-4)).unwrap();
    circuit.connect(("split", 3), ("ps", 1)).unwrap();
    circuit.connect(("ps", 2), ("merge", 1)).unwrap();
    circuit.set_input(laser(), ("split", 1)).unwrap();
    circuit.set_output(("merge", 3)).unwrap();

    let chains = condense(&mut circuit).unwrap();
    assert!(chains.is_empty());
    assert!(circuit.component("ps").is_ok());
}

#[test]
fn fully_dangling_components_are_pruned() {
    let mut circuit = Circuit::new();
    circuit.add(shifter("used", 1.5, 1e-4)).unwrap();
    circuit.add(shifter("stray", 1.5, 1e-4)).unwrap();
    circuit.set_input(laser(), ("used", 1)).unwrap();
    circuit.set_output(("used", 2)).unwrap();

    condense(&mut circuit).unwrap();
    assert!(circuit.component("stray").is_err());
    assert!(circuit.component("used").is_ok());
}

#[test]
fn refresh_refolds_at_the_requested_wavelength() {
    let mut circuit = Circuit::new();
    circuit.add(shifter("a", 1.5, 1e-4)).unwrap();
    circuit.add(shifter("b", 2.0, 3e-4)).unwrap();
    circuit.connect(("a", 2), ("b", 1)).unwrap();
    circuit.set_input(laser(), ("a", 1)).unwrap();
    circuit.set_output(("b", 2)).unwrap();

    let a = circuit.component("a").unwrap().model().clone();
    let b = circuit.component("b").unwrap().model().clone();
    let chains = condense(&mut circuit).unwrap();

    refresh(&mut circuit, &chains, WL).unwrap();
    let refolded = circuit.comp(chains[0].condensed).model().s_matrix(WL);
    let expected = star(&a.s_matrix(WL), &b.s_matrix(WL)).unwrap();
    assert!(max_abs_diff(&refolded, &expected) < 1e-12);

    // The dummy-wavelength fold really was replaced.
    let dummy = star(
        &a.s_matrix(DUMMY_WAVELENGTH),
        &b.s_matrix(DUMMY_WAVELENGTH),
    )
    .unwrap();
    assert!(max_abs_diff(&refolded, &dummy) > 1e-3);
}
