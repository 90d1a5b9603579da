// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chain condensation.
//!
//! Before assembling the global scattering system, maximal runs of
//! sequentially-wired 1-in/1-out components are fused into single synthetic
//! components via the Redheffer star product. A chain of length n collapses
//! n 4×4 blocks of the global system into one, which shrinks the linear
//! system by roughly the mean chain length.
//!
//! Anchors (components with `in_degree ≠ 1` or `out_degree ≠ 1`, which
//! covers all splitters/combiners and every dangling or multiply-tagged
//! device) break chains. Walks run forward from each anchor's output wires
//! and from each circuit-input port, and stop at the next anchor or
//! boundary tag.
//!
//! The discovered chains are retained: each remembers its member models and
//! which port pair of each member is wired into the chain, so the condensed
//! 4×4 can be folded again at any wavelength without re-walking the graph.

pub(crate) mod error;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use itertools::Itertools;
use log::debug;
use nalgebra::{DMatrix, Matrix2};
use num_complex::Complex64;
use vec1::Vec1;

use crate::circuit::models::{ComponentModel, Condensed};
use crate::circuit::{Circuit, Component, Connection, PortKey, PortKind};
use crate::constants::DUMMY_WAVELENGTH;

pub(crate) use error::CondenseError;

/// One member of a fused chain: enough to re-evaluate its 4×4 contribution
/// at any wavelength after the component itself has been spliced out.
#[derive(Clone, Debug)]
pub(crate) struct ChainLink {
    name: String,
    model: ComponentModel,
    /// 0-based index of the port the chain enters through.
    in_port: usize,
    /// 0-based index of the port the chain leaves through.
    out_port: usize,
}

impl ChainLink {
    /// The member's 4×4 scattering matrix restricted to its chain-facing
    /// port pair. For a 1-in/1-out component this is its whole matrix;
    /// for a multi-port member with exactly one wired input and output the
    /// unwired ports carry no amplitude and drop out.
    fn s_matrix(&self, wavelength: f64) -> DMatrix<Complex64> {
        let full = self.model.s_matrix(wavelength);
        let modes = [
            2 * self.in_port,
            2 * self.in_port + 1,
            2 * self.out_port,
            2 * self.out_port + 1,
        ];
        DMatrix::from_fn(4, 4, |r, c| full[(modes[r], modes[c])])
    }
}

/// A fused chain: its links (upstream first) and the arena index of the
/// synthetic component standing in for it.
#[derive(Clone, Debug)]
pub(crate) struct Chain {
    links: Vec1<ChainLink>,
    pub(crate) condensed: usize,
}

impl Chain {
    /// Left-fold the chain's members into one 4×4 at `wavelength`.
    pub(crate) fn fold(&self, wavelength: f64) -> Result<DMatrix<Complex64>, CondenseError> {
        let mut acc = self.links.first().s_matrix(wavelength);
        for link in self.links.iter().skip(1) {
            acc = star(&acc, &link.s_matrix(wavelength)).ok_or_else(|| {
                CondenseError::IllConditionedChain {
                    components: self.names(),
                    wavelength,
                }
            })?;
        }
        Ok(acc)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.links.iter().map(|l| l.name.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }
}

/// The Redheffer star product of two 4×4 two-port scattering matrices,
/// composed left-to-right (light passes `a`, then `b`).
///
/// With each matrix split into 2×2 blocks (11 = reflection at the input
/// side, 21 = forward transmission, 12 = backward transmission, 22 =
/// reflection at the output side), the interface amplitudes between the two
/// devices are eliminated exactly, which accounts for every internal
/// round trip. Returns `None` when the interior (I − A22·B11) is singular.
pub(crate) fn star(
    a: &DMatrix<Complex64>,
    b: &DMatrix<Complex64>,
) -> Option<DMatrix<Complex64>> {
    let block = |m: &DMatrix<Complex64>, r: usize, c: usize| -> Matrix2<Complex64> {
        m.fixed_view::<2, 2>(r, c).into_owned()
    };
    let (a11, a12, a21, a22) = (block(a, 0, 0), block(a, 0, 2), block(a, 2, 0), block(a, 2, 2));
    let (b11, b12, b21, b22) = (block(b, 0, 0), block(b, 0, 2), block(b, 2, 0), block(b, 2, 2));

    let eye = Matrix2::<Complex64>::identity();
    let d1 = (eye - a22 * b11).try_inverse()?;
    let d2 = (eye - b11 * a22).try_inverse()?;

    let c11 = a11 + a12 * b11 * d1 * a21;
    let c12 = a12 * d2 * b12;
    let c21 = b21 * d1 * a21;
    let c22 = b22 + b21 * a22 * d2 * b12;

    let mut s = DMatrix::zeros(4, 4);
    s.view_mut((0, 0), (2, 2)).copy_from(&c11);
    s.view_mut((0, 2), (2, 2)).copy_from(&c12);
    s.view_mut((2, 0), (2, 2)).copy_from(&c21);
    s.view_mut((2, 2), (2, 2)).copy_from(&c22);
    Some(s)
}

/// Condense `circuit` in place and return the chain list for later
/// re-folding. The circuit must be the simulation's private copy; the
/// caller's circuit is never touched.
pub(crate) fn condense(circuit: &mut Circuit) -> Result<Vec<Chain>, CondenseError> {
    let before = circuit.num_components();

    // Fully dangling components contribute nothing to the solve.
    let dangling: Vec<usize> = circuit
        .live_indices()
        .filter(|&i| circuit.comp(i).is_fully_disconnected())
        .collect();
    for index in dangling {
        circuit.remove_by_index(index);
    }

    // Chains can only begin just after an anchor, or at a laser port.
    let mut starts: Vec<usize> = vec![];
    let live: Vec<usize> = circuit.live_indices().collect();
    for &index in &live {
        if !is_anchor(circuit, index) {
            continue;
        }
        for port in output_connections(circuit.comp(index)) {
            if let Connection::ToPort(next) = port {
                if enters_through_an_input(circuit, next) && !is_anchor(circuit, next.component) {
                    starts.push(next.component);
                }
            }
        }
    }
    for &key in circuit.inputs().keys() {
        if !is_anchor(circuit, key.component) {
            starts.push(key.component);
        }
    }

    // Forward walks. Every non-anchor has exactly one wired input and one
    // wired output, so each walk is deterministic; the visited set guards
    // against duplicate starts.
    let mut visited: HashSet<usize> = HashSet::new();
    let mut chains: Vec<Chain> = vec![];
    for start in starts {
        let mut members: Vec<usize> = vec![];
        let mut current = start;
        loop {
            if !visited.insert(current) {
                break;
            }
            members.push(current);
            let (_, connection) = single_wired_output(circuit.comp(current));
            match connection {
                Connection::ToPort(next)
                    if enters_through_an_input(circuit, next)
                        && !is_anchor(circuit, next.component) =>
                {
                    current = next.component;
                }
                _ => break,
            }
        }
        if members.len() < 2 {
            continue;
        }
        let chain = splice(circuit, &members)?;
        debug!("fused [{}]", chain.names().iter().join(" → "));
        chains.push(chain);
    }

    debug!(
        "condensed {} chain(s): {} components down to {}",
        chains.len(),
        before,
        circuit.num_components()
    );
    Ok(chains)
}

/// Re-fold every chain at `wavelength` and store the result in its
/// synthetic component. Called before any solve whose wavelength differs
/// from the last fold; the dummy-wavelength matrices written during
/// discovery never reach a solver.
pub(crate) fn refresh(
    circuit: &mut Circuit,
    chains: &[Chain],
    wavelength: f64,
) -> Result<(), CondenseError> {
    for chain in chains {
        let s = chain.fold(wavelength)?;
        match circuit.comp_mut(chain.condensed).model_mut() {
            ComponentModel::Condensed(condensed) => condensed.replace(s),
            _ => unreachable!("chain handle points at a condensed component"),
        }
    }
    Ok(())
}

fn is_anchor(circuit: &Circuit, index: usize) -> bool {
    let component = circuit.comp(index);
    component.in_degree() != 1 || component.out_degree() != 1
}

fn enters_through_an_input(circuit: &Circuit, key: PortKey) -> bool {
    circuit.comp(key.component).ports()[key.port].kind() == PortKind::Input
}

fn output_connections(component: &Component) -> impl Iterator<Item = Connection> + '_ {
    component
        .ports()
        .iter()
        .filter(|p| p.kind() == PortKind::Output)
        .map(|p| p.connection())
}

/// The port index and connection of a non-anchor's only wired output.
fn single_wired_output(component: &Component) -> (usize, Connection) {
    component
        .ports()
        .iter()
        .enumerate()
        .find(|(_, p)| p.kind() == PortKind::Output && !p.connection().is_none())
        .map(|(i, p)| (i, p.connection()))
        .expect("non-anchor has a wired output")
}

fn single_wired_input(component: &Component) -> usize {
    component
        .ports()
        .iter()
        .position(|p| p.kind() == PortKind::Input && !p.connection().is_none())
        .expect("non-anchor has a wired input")
}

/// Replace `members` (a discovered chain, upstream first) with one
/// synthetic component carrying the folded 4×4.
fn splice(circuit: &mut Circuit, members: &[usize]) -> Result<Chain, CondenseError> {
    let links: Vec<ChainLink> = members
        .iter()
        .map(|&index| {
            let component = circuit.comp(index);
            ChainLink {
                name: component.name().to_string(),
                model: component.model().clone(),
                in_port: single_wired_input(component),
                out_port: single_wired_output(component).0,
            }
        })
        .collect();
    let links = Vec1::try_from_vec(links).expect("chain has at least two members");

    let head_key = PortKey {
        component: members[0],
        port: links.first().in_port,
    };
    let tail_key = PortKey {
        component: *members.last().expect("non-empty chain"),
        port: links.last().out_port,
    };
    let upstream = circuit.port_connection(head_key);
    let downstream = circuit.port_connection(tail_key);

    // Fold once at the dummy wavelength to establish structure and surface
    // ill-conditioned chains early.
    let chain = Chain {
        links,
        condensed: usize::MAX,
    };
    let folded = chain.fold(DUMMY_WAVELENGTH)?;

    // A fresh, collision-free name for the synthetic component.
    let mut n = 0usize;
    let name = loop {
        let candidate = format!("condensed{n}");
        if circuit.component_index(&candidate).is_err() {
            break candidate;
        }
        n += 1;
    };
    circuit
        .add(Component::new(
            name.as_str(),
            ComponentModel::Condensed(Condensed::new(folded)),
        ))
        .expect("synthetic component is fresh and uniquely named");
    let condensed = circuit
        .component_index(&name)
        .expect("synthetic component was just added");
    let synth_in = PortKey {
        component: condensed,
        port: 0,
    };
    let synth_out = PortKey {
        component: condensed,
        port: 1,
    };

    // Splice in: the synthetic component takes over the chain's boundary
    // connections, tags and laser mapping included.
    match upstream {
        Connection::ToPort(peer) => {
            circuit
                .comp_mut(peer.component)
                .install(peer.port, Connection::ToPort(synth_in));
            circuit
                .comp_mut(condensed)
                .install(0, Connection::ToPort(peer));
        }
        Connection::CircuitInput => {
            circuit.comp_mut(condensed).install(0, Connection::CircuitInput);
            circuit.rekey_input(head_key, synth_in);
        }
        Connection::None | Connection::CircuitOutput => {
            unreachable!("chain head enters through a wired or laser-tagged input")
        }
    }
    match downstream {
        Connection::ToPort(peer) => {
            circuit
                .comp_mut(peer.component)
                .install(peer.port, Connection::ToPort(synth_out));
            circuit
                .comp_mut(condensed)
                .install(1, Connection::ToPort(peer));
        }
        Connection::CircuitOutput => {
            circuit
                .comp_mut(condensed)
                .install(1, Connection::CircuitOutput);
            circuit.rekey_output(tail_key, synth_out);
        }
        Connection::None | Connection::CircuitInput => {
            unreachable!("chain tail leaves through a wired or detector-tagged output")
        }
    }

    for &index in members {
        circuit.remove_by_index(index);
    }

    Ok(Chain { condensed, ..chain })
}
