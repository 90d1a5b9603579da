// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The circuit graph.
//!
//! A [`Circuit`] owns its components in an arena: components are addressed
//! by stable indices, wires are symmetric pairs of [`Connection::ToPort`]
//! entries, and the circuit boundary is marked with `CircuitInput` /
//! `CircuitOutput` tags plus a laser per input. Removal leaves a tombstone
//! so existing [`PortKey`]s never dangle.
//!
//! Builder calls validate before they mutate: a call that returns an error
//! has not changed the circuit.

pub(crate) mod component;
pub(crate) mod error;
pub mod models;
pub(crate) mod port;


use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::laser::Laser;

pub use component::Component;
pub use error::CircuitError;
pub use port::{Connection, Port, PortKey, PortKind, PortName, PortRef};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A directed graph of optical components.
///
/// Cloning a circuit is the deep copy used by simulation runs: it carries
/// the same components (same identities) with the same wiring, and shares
/// the (pure) lasers.
#[derive(Clone, Debug)]
pub struct Circuit {
    id: u64,
    /// Arena of components; `None` marks a removed slot.
    slots: Vec<Option<Component>>,
    /// Component name → arena index, in insertion order.
    names: IndexMap<String, usize>,
    /// Circuit-input ports and their driving lasers, in designation order.
    inputs: IndexMap<PortKey, Laser>,
    /// Circuit-output ports, in designation order.
    outputs: Vec<PortKey>,
}

impl Default for Circuit {
    fn default() -> Circuit {
        Circuit::new()
    }
}

impl Circuit {
    pub fn new() -> Circuit {
        Circuit {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            slots: vec![],
            names: IndexMap::new(),
            inputs: IndexMap::new(),
            outputs: vec![],
        }
    }

    /// Add a component. Fails if this exact component is already owned by a
    /// circuit, or if another component in this circuit has the same name.
    pub fn add(&mut self, component: Component) -> Result<(), CircuitError> {
        if component.circuit.is_some()
            || self
                .slots
                .iter()
                .flatten()
                .any(|c| c.id() == component.id())
        {
            return Err(CircuitError::DuplicateComponent(component.name().to_string()));
        }
        if self.names.contains_key(component.name()) {
            return Err(CircuitError::DuplicateComponentName(
                component.name().to_string(),
            ));
        }

        let mut component = component;
        component.circuit = Some(self.id);
        let index = self.slots.len();
        self.names.insert(component.name().to_string(), index);
        self.slots.push(Some(component));
        Ok(())
    }

    /// Remove a component by name and hand it back. The component must be
    /// fully disconnected first; there is no cascading disconnect.
    pub fn remove(&mut self, name: &str) -> Result<Component, CircuitError> {
        let index = self.component_index(name)?;
        if !self.comp(index).is_fully_disconnected() {
            return Err(CircuitError::ComponentStillConnected(name.to_string()));
        }

        self.names.shift_remove(name);
        let mut component = self.slots[index].take().expect("live index");
        component.circuit = None;
        Ok(component)
    }

    /// Wire two ports together. Any previous connection on either side is
    /// undone first: existing wires are released symmetrically and
    /// circuit-input/-output designations are demoted (the laser mapping or
    /// output entry is dropped).
    pub fn connect(
        &mut self,
        source: impl Into<PortRef>,
        destination: impl Into<PortRef>,
    ) -> Result<(), CircuitError> {
        let source = source.into();
        let destination = destination.into();
        let a = self.resolve(&source)?;
        let b = self.resolve(&destination)?;
        if a == b {
            return Err(CircuitError::SelfConnection(source));
        }

        self.clear_port(a);
        self.clear_port(b);
        self.comp_mut(a.component).install(a.port, Connection::ToPort(b));
        self.comp_mut(b.component).install(b.port, Connection::ToPort(a));
        Ok(())
    }

    /// Clear one port. A wire is released on both sides; an input/output
    /// designation is dropped. Disconnecting a dangling port is a no-op.
    pub fn disconnect(&mut self, port: impl Into<PortRef>) -> Result<(), CircuitError> {
        let key = self.resolve(&port.into())?;
        self.clear_port(key);
        Ok(())
    }

    /// Designate a port as a circuit input driven by `laser`.
    ///
    /// Re-designating an existing input swaps the laser in place. A port
    /// already designated as a circuit output is rejected.
    pub fn set_input(
        &mut self,
        laser: Laser,
        port: impl Into<PortRef>,
    ) -> Result<(), CircuitError> {
        let port = port.into();
        let key = self.resolve(&port)?;
        match self.port_connection(key) {
            Connection::CircuitOutput => {
                return Err(CircuitError::ConflictingConnection {
                    port,
                    role: "output",
                })
            }
            Connection::CircuitInput => {
                // IndexMap keeps the original designation order on overwrite.
                self.inputs.insert(key, laser);
                return Ok(());
            }
            Connection::ToPort(_) => self.clear_port(key),
            Connection::None => (),
        }

        self.comp_mut(key.component)
            .install(key.port, Connection::CircuitInput);
        self.inputs.insert(key, laser);
        Ok(())
    }

    /// Designate a port as a circuit output (a detector tap). Appends to the
    /// ordered output list; re-designating is a no-op.
    pub fn set_output(&mut self, port: impl Into<PortRef>) -> Result<(), CircuitError> {
        let port = port.into();
        let key = self.resolve(&port)?;
        match self.port_connection(key) {
            Connection::CircuitInput => {
                return Err(CircuitError::ConflictingConnection {
                    port,
                    role: "input",
                })
            }
            Connection::CircuitOutput => return Ok(()),
            Connection::ToPort(_) => self.clear_port(key),
            Connection::None => (),
        }

        self.comp_mut(key.component)
            .install(key.port, Connection::CircuitOutput);
        self.outputs.push(key);
        Ok(())
    }

    /// Borrow a component by name.
    pub fn component(&self, name: &str) -> Result<&Component, CircuitError> {
        self.component_index(name).map(|i| self.comp(i))
    }

    /// Mutably borrow a component by name (e.g. to set port aliases after
    /// adding it).
    pub fn component_mut(&mut self, name: &str) -> Result<&mut Component, CircuitError> {
        let index = self.component_index(name)?;
        Ok(self.comp_mut(index))
    }

    /// Live components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter().flatten()
    }

    pub fn num_components(&self) -> usize {
        self.names.len()
    }

    /// Check ‖S‖₂ ≤ 1 for every component at `wavelength`. This is a
    /// validation pass for user-built circuits; the solver never calls it.
    pub fn check_passivity(&self, wavelength: f64) -> Result<(), CircuitError> {
        for component in self.components() {
            component.check_passivity(wavelength)?;
        }
        Ok(())
    }

    // Crate-internal surface, used by the condenser, assembler and result
    // lookup.

    pub(crate) fn resolve(&self, port_ref: &PortRef) -> Result<PortKey, CircuitError> {
        let component = self.component_index(&port_ref.component)?;
        let port = self.comp(component).resolve(&port_ref.port)?;
        Ok(PortKey { component, port })
    }

    pub(crate) fn component_index(&self, name: &str) -> Result<usize, CircuitError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| CircuitError::MissingComponent(name.to_string()))
    }

    pub(crate) fn comp(&self, index: usize) -> &Component {
        self.slots[index].as_ref().expect("live component index")
    }

    pub(crate) fn comp_mut(&mut self, index: usize) -> &mut Component {
        self.slots[index].as_mut().expect("live component index")
    }

    pub(crate) fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i))
    }

    pub(crate) fn port_connection(&self, key: PortKey) -> Connection {
        self.comp(key.component).connection(key.port)
    }

    pub(crate) fn inputs(&self) -> &IndexMap<PortKey, Laser> {
        &self.inputs
    }

    pub(crate) fn outputs(&self) -> &[PortKey] {
        &self.outputs
    }

    /// Forcibly drop a component slot, name included. Only the condenser
    /// uses this, on its private working copy, after it has rewired
    /// everything that referenced the slot.
    pub(crate) fn remove_by_index(&mut self, index: usize) {
        if let Some(component) = self.slots[index].take() {
            self.names.shift_remove(component.name());
        }
    }

    /// Replace the laser-map key for a condensed chain's relocated input
    /// port, keeping the designation order intact.
    pub(crate) fn rekey_input(&mut self, old: PortKey, new: PortKey) {
        self.inputs = self
            .inputs
            .iter()
            .map(|(&key, laser)| (if key == old { new } else { key }, laser.clone()))
            .collect();
    }

    /// Replace an output-list entry in place, keeping its position.
    pub(crate) fn rekey_output(&mut self, old: PortKey, new: PortKey) {
        for key in &mut self.outputs {
            if *key == old {
                *key = new;
            }
        }
    }

    fn clear_port(&mut self, key: PortKey) {
        match self.port_connection(key) {
            Connection::None => (),
            Connection::ToPort(peer) => {
                self.comp_mut(key.component).install(key.port, Connection::None);
                self.comp_mut(peer.component).install(peer.port, Connection::None);
            }
            Connection::CircuitInput => {
                self.inputs.shift_remove(&key);
                self.comp_mut(key.component).install(key.port, Connection::None);
            }
            Connection::CircuitOutput => {
                self.outputs.retain(|k| *k != key);
                self.comp_mut(key.component).install(key.port, Connection::None);
            }
        }
    }
}
