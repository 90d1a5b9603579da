// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ports, connections and the names users refer to them by.

use std::fmt;

/// Whether a port accepts light into its component or emits it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

/// A stable handle to one port of one component inside a circuit arena.
///
/// Components are never moved or renumbered once added (removal leaves a
/// tombstone), so keys stay valid for the life of the circuit and of any
/// deep copies made from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortKey {
    pub(crate) component: usize,
    pub(crate) port: usize,
}

/// What one side of a port is doing right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connection {
    /// Dangling.
    #[default]
    None,
    /// Wired to another port in the same circuit. Always symmetric: if `a`
    /// points at `b` then `b` points at `a`, and `a ≠ b`.
    ToPort(PortKey),
    /// This port is driven by a laser at the circuit boundary.
    CircuitInput,
    /// This port is tapped by a detector at the circuit boundary.
    CircuitOutput,
}

impl Connection {
    pub fn is_none(&self) -> bool {
        matches!(self, Connection::None)
    }
}

/// One port of a component: its direction, an optional alias, and the
/// current connection.
#[derive(Clone, Debug)]
pub struct Port {
    pub(crate) kind: PortKind,
    pub(crate) alias: Option<String>,
    pub(crate) connection: Connection,
}

impl Port {
    pub(crate) fn new(kind: PortKind) -> Port {
        Port {
            kind,
            alias: None,
            connection: Connection::None,
        }
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }
}

/// How callers name a port: by alias, or by 1-based position in the
/// component's port list (inputs first, then outputs).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortName {
    Index(usize),
    Alias(String),
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PortName::Index(i) => write!(f, "{i}"),
            PortName::Alias(a) => write!(f, "{a}"),
        }
    }
}

/// A user-facing reference to a port: component name plus port name.
///
/// Tuples convert for ergonomics, so `circuit.connect(("bs", 3), ("ps", 1))`
/// works without spelling the type out.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub component: String,
    pub port: PortName,
}

impl PortRef {
    pub fn new(component: impl Into<String>, port: PortName) -> PortRef {
        PortRef {
            component: component.into(),
            port,
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.port)
    }
}

impl<C: Into<String>> From<(C, usize)> for PortRef {
    fn from((component, index): (C, usize)) -> PortRef {
        PortRef::new(component, PortName::Index(index))
    }
}

impl<C: Into<String>> From<(C, &str)> for PortRef {
    fn from((component, alias): (C, &str)) -> PortRef {
        PortRef::new(component, PortName::Alias(alias.to_string()))
    }
}
