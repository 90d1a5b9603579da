// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Components: a model plus named, connectable ports.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::error::CircuitError;
use super::models::ComponentModel;
use super::port::{Connection, Port, PortKind, PortName};

/// Identities survive cloning (a deep-copied circuit holds the *same*
/// components, structurally), so they come from a process-wide counter
/// rather than from arena positions.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One device instance: a model, a unique name, and a port table with
/// aliases and degree counters.
///
/// Ports are ordered inputs-first, and the user-facing port index is
/// 1-based: a beam splitter's inputs are ports 1 and 2, its outputs 3
/// and 4. Aliases are unique within a component across both directions.
#[derive(Clone, Debug)]
pub struct Component {
    id: u64,
    name: String,
    model: ComponentModel,
    ports: Vec<Port>,
    /// alias → 0-based port index.
    aliases: IndexMap<String, usize>,
    /// Number of input-side ports whose connection is not `None`.
    in_degree: usize,
    /// Number of output-side ports whose connection is not `None`.
    out_degree: usize,
    /// Id of the owning circuit; set on add, cleared on remove.
    pub(crate) circuit: Option<u64>,
}

impl Component {
    pub fn new(name: impl Into<String>, model: ComponentModel) -> Component {
        let ports = (0..model.num_inputs())
            .map(|_| Port::new(PortKind::Input))
            .chain((0..model.num_outputs()).map(|_| Port::new(PortKind::Output)))
            .collect();
        Component {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            model,
            ports,
            aliases: IndexMap::new(),
            in_degree: 0,
            out_degree: 0,
            circuit: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &ComponentModel {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut ComponentModel {
        &mut self.model
    }

    pub fn num_inputs(&self) -> usize {
        self.model.num_inputs()
    }

    pub fn num_outputs(&self) -> usize {
        self.model.num_outputs()
    }

    pub fn num_ports(&self) -> usize {
        self.ports.len()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// How many input-side ports are currently connected (wires and
    /// circuit-input tags both count).
    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    /// How many output-side ports are currently connected.
    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Install an alias on the 1-based port `index`.
    pub fn set_alias(&mut self, index: usize, alias: impl Into<String>) -> Result<(), CircuitError> {
        let alias = alias.into();
        let port = self.resolve(&PortName::Index(index))?;
        if self.aliases.contains_key(&alias) {
            return Err(CircuitError::DuplicatePortAlias {
                component: self.name.clone(),
                alias,
            });
        }
        self.ports[port].alias = Some(alias.clone());
        self.aliases.insert(alias, port);
        Ok(())
    }

    /// Find the 0-based port index carrying `alias`.
    pub fn search(&self, alias: &str) -> Result<usize, CircuitError> {
        self.aliases
            .get(alias)
            .copied()
            .ok_or_else(|| CircuitError::MissingAlias {
                component: self.name.clone(),
                alias: alias.to_string(),
            })
    }

    /// Resolve a user-facing port name to a 0-based port index.
    pub(crate) fn resolve(&self, port: &PortName) -> Result<usize, CircuitError> {
        match port {
            PortName::Index(i) => {
                if *i >= 1 && *i <= self.ports.len() {
                    Ok(i - 1)
                } else {
                    Err(CircuitError::MissingPort {
                        component: self.name.clone(),
                        port: port.clone(),
                    })
                }
            }
            PortName::Alias(alias) => self.search(alias),
        }
    }

    /// Overwrite one port's connection, keeping the degree counters in step:
    /// a counter moves only on the None ↔ non-None edges.
    pub(crate) fn install(&mut self, port: usize, connection: Connection) {
        let slot = &mut self.ports[port];
        let was_connected = !slot.connection.is_none();
        let now_connected = !connection.is_none();
        slot.connection = connection;

        let degree = match slot.kind {
            PortKind::Input => &mut self.in_degree,
            PortKind::Output => &mut self.out_degree,
        };
        match (was_connected, now_connected) {
            (false, true) => *degree += 1,
            (true, false) => *degree -= 1,
            _ => (),
        }
    }

    pub(crate) fn connection(&self, port: usize) -> Connection {
        self.ports[port].connection
    }

    pub(crate) fn is_fully_disconnected(&self) -> bool {
        self.ports.iter().all(|p| p.connection.is_none())
    }

    /// ‖S‖₂ at `wavelength`; a passive component never exceeds 1.
    pub fn check_passivity(&self, wavelength: f64) -> Result<(), CircuitError> {
        let norm = self
            .model
            .s_matrix(wavelength)
            .singular_values()
            .iter()
            .fold(0.0, |acc: f64, &sv| acc.max(sv));
        if norm > 1.0 + 1e-9 {
            return Err(CircuitError::Passivity {
                component: self.name.clone(),
                wavelength,
                norm,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} in, {} out wired",
            self.name,
            self.model,
            self.in_degree,
            self.out_degree
        )
    }
}
