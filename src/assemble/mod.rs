// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assembly of the global scattering system.
//!
//! The condensed circuit's P ports are packed into a dense index (component
//! insertion order, ports in declaration order), giving a field vector of
//! 2P modes: mode 2k is the H amplitude of port k, mode 2k+1 its V
//! amplitude. Over that index live
//!
//! - the global scattering matrix S, block-diagonal with one 2Nᵢ×2Nᵢ block
//!   per component (kept as blocks; it is never materialised whole),
//! - the connectivity matrix C, which says "what leaves port k enters its
//!   wired partner q". Every mode has at most one partner, so C is a
//!   partial permutation and S·C is just a column gather of S,
//! - the excitation vector a_ext, zero except at laser-driven modes.
//!
//! The steady state satisfies a = a_ext + C·b and b = S·a, i.e.
//! (I − S·C)·b = S·a_ext. This module builds I − S·C (dense or as
//! triplets) and the right-hand sides; the structure (index, partners,
//! sources, outputs) is wavelength-independent and built once per run.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::circuit::{Circuit, Connection, PortKey};
use crate::light::CoherentLight;

/// One component's slice of the mode index.
#[derive(Clone, Debug)]
pub(crate) struct Block {
    /// Arena index of the component in the condensed circuit.
    pub(crate) component: usize,
    /// First mode of this block.
    pub(crate) offset: usize,
    /// Number of modes (2 × ports).
    pub(crate) modes: usize,
}

/// A circuit input: where its two modes sit in the global index.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Source {
    /// Index into [`Assembly::blocks`] of the owning component.
    block: usize,
    /// H-mode column within that block (V is the next one).
    local_mode: usize,
}

/// The wavelength-independent structure of one simulation run.
#[derive(Clone, Debug)]
pub(crate) struct Assembly {
    blocks: Vec<Block>,
    /// Mode → wired partner mode. An involution without fixed points:
    /// `partner[m] = Some(n)` ⇔ `partner[n] = Some(m)`, never `m = n`.
    partner: Vec<Option<usize>>,
    /// Circuit inputs, in designation order.
    pub(crate) sources: Vec<Source>,
    /// H-mode index of each circuit output, in designation order.
    output_modes: Vec<usize>,
    two_p: usize,
}

impl Assembly {
    pub(crate) fn build(circuit: &Circuit) -> Assembly {
        let mut blocks = vec![];
        let mut port_index: HashMap<PortKey, usize> = HashMap::new();
        let mut ports: Vec<PortKey> = vec![];
        let mut block_of_port: Vec<usize> = vec![];

        for component in circuit.live_indices() {
            let num_ports = circuit.comp(component).num_ports();
            let offset = 2 * ports.len();
            for port in 0..num_ports {
                let key = PortKey { component, port };
                port_index.insert(key, ports.len());
                ports.push(key);
                block_of_port.push(blocks.len());
            }
            blocks.push(Block {
                component,
                offset,
                modes: 2 * num_ports,
            });
        }

        let two_p = 2 * ports.len();
        let mut partner: Vec<Option<usize>> = vec![None; two_p];
        for (k, &key) in ports.iter().enumerate() {
            if let Connection::ToPort(peer) = circuit.port_connection(key) {
                let q = port_index[&peer];
                partner[2 * k] = Some(2 * q);
                partner[2 * k + 1] = Some(2 * q + 1);
            }
        }

        let sources = circuit
            .inputs()
            .keys()
            .map(|key| {
                let k = port_index[key];
                let block = block_of_port[k];
                Source {
                    block,
                    local_mode: 2 * k - blocks[block].offset,
                }
            })
            .collect();

        let output_modes = circuit
            .outputs()
            .iter()
            .map(|key| 2 * port_index[key])
            .collect();

        Assembly {
            blocks,
            partner,
            sources,
            output_modes,
            two_p,
        }
    }

    /// Total number of modes, 2P.
    pub(crate) fn num_modes(&self) -> usize {
        self.two_p
    }

    pub(crate) fn num_outputs(&self) -> usize {
        self.output_modes.len()
    }

    /// Every component's scattering block at `wavelength`, in block order.
    pub(crate) fn s_blocks(&self, circuit: &Circuit, wavelength: f64) -> Vec<DMatrix<Complex64>> {
        self.blocks
            .iter()
            .map(|block| {
                let s = circuit.comp(block.component).model().s_matrix(wavelength);
                debug_assert_eq!(s.nrows(), block.modes);
                s
            })
            .collect()
    }

    /// Number of structural non-zeros of I − S·C, used for solver
    /// selection. Deterministic in the block contents and the wiring.
    pub(crate) fn system_nnz(&self, s_blocks: &[DMatrix<Complex64>]) -> usize {
        let mut nnz = self.two_p;
        for (block, s) in self.blocks.iter().zip(s_blocks) {
            for c in 0..block.modes {
                if self.partner[block.offset + c].is_none() {
                    continue;
                }
                nnz += (0..block.modes).filter(|&r| s[(r, c)] != Complex64::default()).count();
            }
        }
        nnz
    }

    /// Materialise M = I − S·C as a dense column-major matrix.
    pub(crate) fn dense_system(&self, s_blocks: &[DMatrix<Complex64>]) -> DMatrix<Complex64> {
        let mut m = DMatrix::identity(self.two_p, self.two_p);
        for (block, s) in self.blocks.iter().zip(s_blocks) {
            for c in 0..block.modes {
                let Some(j) = self.partner[block.offset + c] else {
                    continue;
                };
                for r in 0..block.modes {
                    let value = s[(r, c)];
                    if value != Complex64::default() {
                        m[(block.offset + r, j)] -= value;
                    }
                }
            }
        }
        m
    }

    /// M = I − S·C as triplets for the sparse path. Duplicate positions
    /// (a diagonal hit by both the identity and a feedback wire) sum.
    pub(crate) fn system_triplets(
        &self,
        s_blocks: &[DMatrix<Complex64>],
    ) -> Vec<(usize, usize, Complex64)> {
        let mut triplets: Vec<(usize, usize, Complex64)> =
            (0..self.two_p).map(|i| (i, i, Complex64::new(1.0, 0.0))).collect();
        for (block, s) in self.blocks.iter().zip(s_blocks) {
            for c in 0..block.modes {
                let Some(j) = self.partner[block.offset + c] else {
                    continue;
                };
                for r in 0..block.modes {
                    let value = s[(r, c)];
                    if value != Complex64::default() {
                        triplets.push((block.offset + r, j, -value));
                    }
                }
            }
        }
        triplets
    }

    /// The right-hand side S·a_ext for one solve. `fields[i]` is the sample
    /// driving source i; `None` silences that source (used by the
    /// per-source passes of incoherent runs).
    pub(crate) fn rhs(
        &self,
        s_blocks: &[DMatrix<Complex64>],
        fields: &[Option<CoherentLight>],
    ) -> DVector<Complex64> {
        debug_assert_eq!(fields.len(), self.sources.len());
        let mut rhs = DVector::zeros(self.two_p);
        for (source, field) in self.sources.iter().zip(fields) {
            let Some(field) = field else { continue };
            let block = &self.blocks[source.block];
            let s = &s_blocks[source.block];
            for r in 0..block.modes {
                rhs[block.offset + r] +=
                    s[(r, source.local_mode)] * field.eh + s[(r, source.local_mode + 1)] * field.ev;
            }
        }
        rhs
    }

    /// One right-hand-side column per input mode (S·e_m for every driven
    /// mode m), for the steady-state transfer-matrix solve.
    pub(crate) fn source_columns(&self, s_blocks: &[DMatrix<Complex64>]) -> DMatrix<Complex64> {
        let mut columns = DMatrix::zeros(self.two_p, 2 * self.sources.len());
        for (i, source) in self.sources.iter().enumerate() {
            let block = &self.blocks[source.block];
            let s = &s_blocks[source.block];
            for r in 0..block.modes {
                columns[(block.offset + r, 2 * i)] = s[(r, source.local_mode)];
                columns[(block.offset + r, 2 * i + 1)] = s[(r, source.local_mode + 1)];
            }
        }
        columns
    }

    /// Pull the output-port fields out of a solved mode vector.
    pub(crate) fn extract_outputs(
        &self,
        b: &DVector<Complex64>,
        wavelength: f64,
    ) -> Vec<CoherentLight> {
        self.output_modes
            .iter()
            .map(|&m| CoherentLight::from_jones(b[m], b[m + 1], wavelength))
            .collect()
    }

    /// The (2·outputs × 2·inputs) sub-block of a matrix solve X = M⁻¹·S·E:
    /// the steady-state transfer matrix of the external interface.
    pub(crate) fn extract_transfer(&self, x: &DMatrix<Complex64>) -> DMatrix<Complex64> {
        let num_cols = x.ncols();
        DMatrix::from_fn(2 * self.output_modes.len(), num_cols, |r, c| {
            x[(self.output_modes[r / 2] + r % 2, c)]
        })
    }
}
