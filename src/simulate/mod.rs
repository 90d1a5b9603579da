// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The scheduler: time- and wavelength-swept evaluation of a circuit.
//!
//! A [`Simulation`] never touches the caller's circuit. Each run deep-clones
//! it, condenses sequential chains on the copy, assembles the global
//! scattering structure once, and then reuses as much as the sweep allows:
//! a wavelength-constant sweep factorises I − S·C a single time and replays
//! it against every sample's excitation, while a varying sweep rebuilds per
//! wavelength. One laser means coherent (field-level) evaluation; several
//! lasers mean incoherent evaluation, one independent solve per source per
//! sample, and only powers (never fields) are summed downstream.
//!
//! The per-sample solves under a constant wavelength are independent, so
//! they run on the rayon pool with the factorisation shared immutably.
//! Long sweeps poll a cancel flag once per sample.

pub(crate) mod error;


use crossbeam_utils::atomic::AtomicCell;
use log::{debug, info};
use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::assemble::Assembly;
use crate::circuit::Circuit;
use crate::condense::{self, Chain};
use crate::constants::WAVELENGTH_CONSTANT_TOLERANCE;
use crate::light::{Coherence, CoherentLight, IncoherentLight, Light};
use crate::result::SimulationResult;
use crate::solve::{select, Factorized, SolverKind};

pub use error::SimulateError;

/// A simulation run over a borrowed, read-only circuit.
pub struct Simulation<'c> {
    circuit: &'c Circuit,
    condense_chains: bool,
}

impl<'c> Simulation<'c> {
    pub fn new(circuit: &'c Circuit) -> Simulation<'c> {
        Simulation {
            circuit,
            condense_chains: true,
        }
    }

    /// Disable chain condensation, forcing direct assembly of the full
    /// graph. The results are identical; this exists as a reference path
    /// for testing and debugging.
    pub fn condense(mut self, enabled: bool) -> Simulation<'c> {
        self.condense_chains = enabled;
        self
    }

    /// Evaluate the steady-state output fields at every sample time.
    pub fn simulate(&self, times: &[f64]) -> Result<SimulationResult, SimulateError> {
        let cancel = AtomicCell::new(false);
        self.simulate_with_cancel(times, &cancel)
    }

    /// [`simulate`](Self::simulate), polling `cancel` once per time sample.
    pub fn simulate_with_cancel(
        &self,
        times: &[f64],
        cancel: &AtomicCell<bool>,
    ) -> Result<SimulationResult, SimulateError> {
        if self.circuit.inputs().is_empty() {
            return Err(SimulateError::EmptyInterface { missing: "inputs" });
        }
        if self.circuit.outputs().is_empty() {
            return Err(SimulateError::EmptyInterface { missing: "outputs" });
        }

        // Sample every laser at every time up front. Lasers are pure, so
        // this is equivalent to sampling inside the loops, and it lets the
        // whole sweep be classified before any solve.
        let fields = self.sample_lasers(times)?;
        let coherence = if fields.len() == 1 {
            Coherence::Coherent
        } else {
            Coherence::Incoherent
        };
        let constant = constant_wavelength(&fields);

        let mut working = self.circuit.clone();
        let chains = if self.condense_chains {
            condense::condense(&mut working)?
        } else {
            vec![]
        };
        let assembly = Assembly::build(&working);

        info!(
            "simulating {} sample(s): {} source(s) ({coherence}), {} output(s), {} modes, {} λ",
            times.len(),
            fields.len(),
            assembly.num_outputs(),
            assembly.num_modes(),
            if constant { "constant" } else { "swept" },
        );

        let per_port = if times.is_empty() {
            vec![vec![]; assembly.num_outputs()]
        } else {
            match (coherence, constant) {
                (Coherence::Coherent, true) => {
                    coherent_constant(&mut working, &chains, &assembly, &fields[0], times, cancel)?
                }
                (Coherence::Coherent, false) => {
                    coherent_varying(&mut working, &chains, &assembly, &fields[0], times, cancel)?
                }
                (Coherence::Incoherent, true) => {
                    incoherent_constant(&mut working, &chains, &assembly, &fields, times, cancel)?
                }
                (Coherence::Incoherent, false) => {
                    incoherent_varying(&mut working, &chains, &assembly, &fields, times, cancel)?
                }
            }
        };

        // The splice keeps output positions, so output i of the condensed
        // copy is output i of the caller's circuit.
        let keys = self.circuit.outputs().to_vec();
        Ok(SimulationResult::new(
            self.circuit.clone(),
            coherence,
            times.to_vec(),
            keys.into_iter().zip(per_port).collect(),
        ))
    }

    /// The steady-state transfer matrices of the external interface, one
    /// (2·outputs × 2·inputs) matrix per wavelength. Independent of any
    /// laser values.
    pub fn s_parameters(
        &self,
        wavelengths: &[f64],
    ) -> Result<Vec<DMatrix<Complex64>>, SimulateError> {
        if self.circuit.inputs().is_empty() {
            return Err(SimulateError::EmptyInterface { missing: "inputs" });
        }
        if self.circuit.outputs().is_empty() {
            return Err(SimulateError::EmptyInterface { missing: "outputs" });
        }

        let mut working = self.circuit.clone();
        let chains = if self.condense_chains {
            condense::condense(&mut working)?
        } else {
            vec![]
        };
        let assembly = Assembly::build(&working);

        let mut kind: Option<SolverKind> = None;
        let mut transfer = Vec::with_capacity(wavelengths.len());
        for &wavelength in wavelengths {
            condense::refresh(&mut working, &chains, wavelength)?;
            let blocks = assembly.s_blocks(&working, wavelength);
            let kind = *kind
                .get_or_insert_with(|| select(assembly.num_modes(), assembly.system_nnz(&blocks)));
            let factorized = factorize(kind, &assembly, &blocks)?;
            let x = factorized.solve_matrix(&assembly.source_columns(&blocks))?;
            transfer.push(assembly.extract_transfer(&x));
        }
        Ok(transfer)
    }

    /// One sampled field sequence per source, in input-designation order.
    fn sample_lasers(&self, times: &[f64]) -> Result<Vec<Vec<CoherentLight>>, SimulateError> {
        let mut fields = Vec::with_capacity(self.circuit.inputs().len());
        for (&key, laser) in self.circuit.inputs() {
            let mut samples = Vec::with_capacity(times.len());
            for &t in times {
                let sample = laser.sample(t);
                if !sample.is_finite() || sample.wavelength <= 0.0 {
                    return Err(SimulateError::InvalidLightFunction {
                        component: self.circuit.comp(key.component).name().to_string(),
                        time: t,
                    });
                }
                samples.push(sample);
            }
            fields.push(samples);
        }
        Ok(fields)
    }
}

/// Does the whole sweep sit within the monochromatic tolerance?
fn constant_wavelength(fields: &[Vec<CoherentLight>]) -> bool {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for sample in fields.iter().flatten() {
        min = min.min(sample.wavelength);
        max = max.max(sample.wavelength);
    }
    !(max - min >= WAVELENGTH_CONSTANT_TOLERANCE)
}

fn factorize(
    kind: SolverKind,
    assembly: &Assembly,
    blocks: &[DMatrix<Complex64>],
) -> Result<Factorized, SimulateError> {
    let factorized = match kind {
        SolverKind::Dense => Factorized::dense(assembly.dense_system(blocks))?,
        SolverKind::Sparse => {
            Factorized::sparse(assembly.num_modes(), &assembly.system_triplets(blocks))?
        }
    };
    Ok(factorized)
}

fn select_and_log(assembly: &Assembly, blocks: &[DMatrix<Complex64>]) -> SolverKind {
    let nnz = assembly.system_nnz(blocks);
    let kind = select(assembly.num_modes(), nnz);
    debug!(
        "selected the {kind} solver: {} modes, {nnz} non-zeros",
        assembly.num_modes()
    );
    kind
}

/// One source, one wavelength: factorise once, replay every excitation
/// against it in parallel.
fn coherent_constant(
    working: &mut Circuit,
    chains: &[Chain],
    assembly: &Assembly,
    fields: &[CoherentLight],
    times: &[f64],
    cancel: &AtomicCell<bool>,
) -> Result<Vec<Vec<Light>>, SimulateError> {
    let wavelength = fields[0].wavelength;
    condense::refresh(working, chains, wavelength)?;
    let blocks = assembly.s_blocks(working, wavelength);
    let kind = select_and_log(assembly, &blocks);
    let factorized = factorize(kind, assembly, &blocks)?;

    let per_time: Vec<Vec<CoherentLight>> = (0..times.len())
        .into_par_iter()
        .map(|ti| {
            if cancel.load() {
                return Err(SimulateError::Cancelled);
            }
            let field = fields[ti];
            let rhs = assembly.rhs(&blocks, &[Some(field)]);
            let b = factorized.solve_vector(&rhs)?;
            Ok(assembly.extract_outputs(&b, field.wavelength))
        })
        .collect::<Result<_, _>>()?;

    Ok(transpose_coherent(per_time, assembly.num_outputs()))
}

/// One source, swept wavelength: rebuild and refactorise whenever the
/// wavelength moves, sequentially so cancellation stays sample-granular.
fn coherent_varying(
    working: &mut Circuit,
    chains: &[Chain],
    assembly: &Assembly,
    fields: &[CoherentLight],
    times: &[f64],
    cancel: &AtomicCell<bool>,
) -> Result<Vec<Vec<Light>>, SimulateError> {
    let mut kind: Option<SolverKind> = None;
    let mut current: Option<(f64, Vec<DMatrix<Complex64>>, Factorized)> = None;
    let mut per_time = Vec::with_capacity(times.len());

    for ti in 0..times.len() {
        if cancel.load() {
            return Err(SimulateError::Cancelled);
        }
        let field = fields[ti];
        let stale = !matches!(&current, Some((w, _, _)) if *w == field.wavelength);
        if stale {
            condense::refresh(working, chains, field.wavelength)?;
            let blocks = assembly.s_blocks(working, field.wavelength);
            let kind = *kind.get_or_insert_with(|| select_and_log(assembly, &blocks));
            let factorized = factorize(kind, assembly, &blocks)?;
            current = Some((field.wavelength, blocks, factorized));
        }
        let (_, blocks, factorized) = current.as_ref().expect("factorisation was just built");

        let rhs = assembly.rhs(blocks, &[Some(field)]);
        let b = factorized.solve_vector(&rhs)?;
        per_time.push(assembly.extract_outputs(&b, field.wavelength));
    }

    Ok(transpose_coherent(per_time, assembly.num_outputs()))
}

/// Several sources, one wavelength: factorise once; per sample, run one
/// coherent solve per source with the others silenced.
fn incoherent_constant(
    working: &mut Circuit,
    chains: &[Chain],
    assembly: &Assembly,
    fields: &[Vec<CoherentLight>],
    times: &[f64],
    cancel: &AtomicCell<bool>,
) -> Result<Vec<Vec<Light>>, SimulateError> {
    let wavelength = fields[0][0].wavelength;
    condense::refresh(working, chains, wavelength)?;
    let blocks = assembly.s_blocks(working, wavelength);
    let kind = select_and_log(assembly, &blocks);
    let factorized = factorize(kind, assembly, &blocks)?;
    let num_sources = fields.len();

    let per_time: Vec<Vec<Vec<CoherentLight>>> = (0..times.len())
        .into_par_iter()
        .map(|ti| {
            if cancel.load() {
                return Err(SimulateError::Cancelled);
            }
            let mut per_output = vec![Vec::with_capacity(num_sources); assembly.num_outputs()];
            for s in 0..num_sources {
                let mut excitation = vec![None; num_sources];
                excitation[s] = Some(fields[s][ti]);
                let rhs = assembly.rhs(&blocks, &excitation);
                let b = factorized.solve_vector(&rhs)?;
                let outputs = assembly.extract_outputs(&b, fields[s][ti].wavelength);
                for (port, light) in outputs.into_iter().enumerate() {
                    per_output[port].push(light);
                }
            }
            Ok(per_output)
        })
        .collect::<Result<_, _>>()?;

    Ok(transpose_incoherent(per_time, assembly.num_outputs()))
}

/// Several sources, swept wavelengths: every source may sit at its own
/// wavelength, so the system is rebuilt on every wavelength change.
fn incoherent_varying(
    working: &mut Circuit,
    chains: &[Chain],
    assembly: &Assembly,
    fields: &[Vec<CoherentLight>],
    times: &[f64],
    cancel: &AtomicCell<bool>,
) -> Result<Vec<Vec<Light>>, SimulateError> {
    let num_sources = fields.len();
    let mut kind: Option<SolverKind> = None;
    let mut current: Option<(f64, Vec<DMatrix<Complex64>>, Factorized)> = None;
    let mut per_time = Vec::with_capacity(times.len());

    for ti in 0..times.len() {
        if cancel.load() {
            return Err(SimulateError::Cancelled);
        }
        let mut per_output = vec![Vec::with_capacity(num_sources); assembly.num_outputs()];
        for s in 0..num_sources {
            let field = fields[s][ti];
            let stale = !matches!(&current, Some((w, _, _)) if *w == field.wavelength);
            if stale {
                condense::refresh(working, chains, field.wavelength)?;
                let blocks = assembly.s_blocks(working, field.wavelength);
                let kind = *kind.get_or_insert_with(|| select_and_log(assembly, &blocks));
                let factorized = factorize(kind, assembly, &blocks)?;
                current = Some((field.wavelength, blocks, factorized));
            }
            let (_, blocks, factorized) = current.as_ref().expect("factorisation was just built");

            let mut excitation = vec![None; num_sources];
            excitation[s] = Some(field);
            let rhs = assembly.rhs(blocks, &excitation);
            let b = factorized.solve_vector(&rhs)?;
            let outputs = assembly.extract_outputs(&b, field.wavelength);
            for (port, light) in outputs.into_iter().enumerate() {
                per_output[port].push(light);
            }
        }
        per_time.push(per_output);
    }

    Ok(transpose_incoherent(per_time, assembly.num_outputs()))
}

fn transpose_coherent(per_time: Vec<Vec<CoherentLight>>, num_outputs: usize) -> Vec<Vec<Light>> {
    let mut per_port = vec![Vec::with_capacity(per_time.len()); num_outputs];
    for outputs in per_time {
        for (port, light) in outputs.into_iter().enumerate() {
            per_port[port].push(Light::Coherent(light));
        }
    }
    per_port
}

fn transpose_incoherent(
    per_time: Vec<Vec<Vec<CoherentLight>>>,
    num_outputs: usize,
) -> Vec<Vec<Light>> {
    let mut per_port = vec![Vec::with_capacity(per_time.len()); num_outputs];
    for outputs in per_time {
        for (port, components) in outputs.into_iter().enumerate() {
            per_port[port].push(Light::Incoherent(IncoherentLight { components }));
        }
    }
    per_port
}
