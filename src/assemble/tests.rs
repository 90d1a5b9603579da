// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assembly tests: mode indexing, connectivity encoding, right-hand sides.

use approx::assert_abs_diff_eq;
use num_complex::Complex64;

use super::*;
use crate::circuit::models::{ComponentModel, PhaseShifter};
use crate::circuit::Component;
use crate::constants::TAU;
use crate::laser::Laser;

const WL: f64 = 1550e-9;

fn shifter(name: &str) -> Component {
    Component::new(
        name,
        ComponentModel::PhaseShifter(PhaseShifter::isotropic(1.5, 1e-4, WL)),
    )
}

fn laser_h() -> Laser {
    Laser::continuous_wave(Complex64::new(1.0, 0.0), Complex64::default(), WL)
}

fn two_component_circuit() -> Circuit {
    let mut circuit = Circuit::new();
    circuit.add(Component::new("bs", ComponentModel::BeamSplitter)).unwrap();
    circuit.add(shifter("ps")).unwrap();
    circuit.connect(("bs", 3), ("ps", 1)).unwrap();
    circuit.set_input(laser_h(), ("bs", 1)).unwrap();
    circuit.set_output(("ps", 2)).unwrap();
    circuit
}

#[test]
fn modes_are_packed_in_insertion_order() {
    let circuit = two_component_circuit();
    let assembly = Assembly::build(&circuit);

    // 4 + 2 ports → 12 modes; the shifter's block starts after the
    // splitter's 8 modes.
    assert_eq!(assembly.num_modes(), 12);
    assert_eq!(assembly.blocks.len(), 2);
    assert_eq!(assembly.blocks[1].offset, 8);
    assert_eq!(assembly.num_outputs(), 1);
    // Output port is the shifter's second port: modes 10/11.
    assert_eq!(assembly.output_modes, [10]);
}

#[test]
fn partners_form_a_symmetric_involution() {
    let circuit = two_component_circuit();
    let assembly = Assembly::build(&circuit);

    // bs port 3 (port index 2 → modes 4,5) wired to ps port 1 (modes 8,9).
    assert_eq!(assembly.partner[4], Some(8));
    assert_eq!(assembly.partner[8], Some(4));
    assert_eq!(assembly.partner[5], Some(9));
    assert_eq!(assembly.partner[9], Some(5));

    for (m, partner) in assembly.partner.iter().enumerate() {
        if let Some(n) = partner {
            assert_ne!(*n, m);
            assert_eq!(assembly.partner[*n], Some(m));
        }
    }

    // Tagged and dangling modes have no partner.
    assert_eq!(assembly.partner[0], None);
    assert_eq!(assembly.partner[10], None);
}

#[test]
fn unwired_circuits_assemble_to_the_identity() {
    let mut circuit = Circuit::new();
    circuit.add(shifter("ps")).unwrap();
    circuit.set_input(laser_h(), ("ps", 1)).unwrap();
    circuit.set_output(("ps", 2)).unwrap();

    let assembly = Assembly::build(&circuit);
    let blocks = assembly.s_blocks(&circuit, WL);
    let m = assembly.dense_system(&blocks);
    assert_eq!(m, DMatrix::identity(4, 4));
    assert_eq!(assembly.system_nnz(&blocks), 4);
}

#[test]
fn the_dense_system_subtracts_gathered_columns() {
    let circuit = two_component_circuit();
    let assembly = Assembly::build(&circuit);
    let blocks = assembly.s_blocks(&circuit, WL);
    let m = assembly.dense_system(&blocks);

    // The shifter's forward element S[2,0] couples its input modes (8,9)
    // to what the splitter emits on modes 4,5: M[10,4] = −s_fwd.
    let shifter_s = &blocks[1];
    assert_eq!(m[(10, 4)], -shifter_s[(2, 0)]);
    assert_eq!(m[(11, 5)], -shifter_s[(3, 1)]);
    // And the splitter sees the shifter's backward element on the wire.
    let bs_s = &blocks[0];
    assert_eq!(m[(0, 8)], -bs_s[(0, 4)]);
    // Diagonal is untouched where no feedback exists.
    assert_eq!(m[(0, 0)], Complex64::new(1.0, 0.0));
}

#[test]
fn triplets_and_dense_agree() {
    let circuit = two_component_circuit();
    let assembly = Assembly::build(&circuit);
    let blocks = assembly.s_blocks(&circuit, WL);

    let mut from_triplets = DMatrix::<Complex64>::zeros(12, 12);
    for (r, c, v) in assembly.system_triplets(&blocks) {
        from_triplets[(r, c)] += v;
    }
    assert_eq!(from_triplets, assembly.dense_system(&blocks));
}

#[test]
fn rhs_scatters_the_laser_through_its_component() {
    let mut circuit = Circuit::new();
    circuit.add(shifter("ps")).unwrap();
    circuit.set_input(laser_h(), ("ps", 1)).unwrap();
    circuit.set_output(("ps", 2)).unwrap();

    let assembly = Assembly::build(&circuit);
    let blocks = assembly.s_blocks(&circuit, WL);
    let field = CoherentLight::from_jones(Complex64::new(1.0, 0.0), Complex64::default(), WL);
    let rhs = assembly.rhs(&blocks, &[Some(field)]);

    // S·a_ext: the H excitation leaves through the forward element.
    let phase = TAU * 1.5 * 1e-4 / WL;
    assert_abs_diff_eq!(rhs[2].norm(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(rhs[2].arg(), Complex64::from_polar(1.0, -phase).arg(), epsilon = 1e-9);
    assert_eq!(rhs[0], Complex64::default());
    assert_eq!(rhs[3], Complex64::default());

    // Silencing the only source zeroes the whole vector.
    let silent = assembly.rhs(&blocks, &[None]);
    assert!(silent.iter().all(|v| *v == Complex64::default()));
}

#[test]
fn source_columns_match_per_mode_excitations() {
    let circuit = two_component_circuit();
    let assembly = Assembly::build(&circuit);
    let blocks = assembly.s_blocks(&circuit, WL);

    let columns = assembly.source_columns(&blocks);
    assert_eq!(columns.ncols(), 2);

    let h_only = assembly.rhs(
        &blocks,
        &[Some(CoherentLight::from_jones(
            Complex64::new(1.0, 0.0),
            Complex64::default(),
            WL,
        ))],
    );
    assert_eq!(columns.column(0), h_only);
}
