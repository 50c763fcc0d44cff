// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed switch/port topology references.
//!
//! Port URIs have the fixed shape
//! `/redfish/v1/Fabrics/{fabric}/Switches/{switch}/Ports/{port}` where the
//! switch segment ends in the controller node ID (`<uuid>:101`) and the port
//! segment ends in the controller interface name (`<uuid>:eth1-5`). A URI is
//! parsed exactly once into a [`PortRef`]; everything downstream works with
//! the typed ordinals and only the serialization boundary sees the URI again.
//!
//! All ports of an endpoint are unified into a [`SwitchPortPattern`]: one or
//! two switches, one line card, one contiguous port range repeated on every
//! switch. The pattern's string forms name every controller object of the
//! endpoint, so they must round-trip through [`SwitchPortPattern::parse`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::constants::{
    INTERFACE_NAME_PREFIX, KEY_SEPARATOR, MAX_ENDPOINT_SWITCHES, PORTS_SEGMENT,
    PORT_PATTERN_SEPARATOR, SWITCHES_SEGMENT,
};

/// Positional index of the fabric segment in a port URI
const FABRIC_SEGMENT_INDEX: usize = 4;

/// Positional index of the switch segment in a port URI
const SWITCH_SEGMENT_INDEX: usize = 6;

/// Positional index of the port segment in a port URI
const PORT_SEGMENT_INDEX: usize = 8;

/// Reasons a set of ports cannot be turned into a switch/port pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The URI does not have the `/Switches/{switch}/Ports/{port}` shape
    #[error("port URI {uri} is malformed: {reason}")]
    MalformedPortUri {
        /// The offending URI
        uri: String,
        /// What is wrong with it
        reason: String,
    },

    /// No ports were supplied
    #[error("an endpoint needs at least one port")]
    NoPorts,

    /// Ports span more switches than a port channel can bundle
    #[error("ports span {count} switches, at most {MAX_ENDPOINT_SWITCHES} are supported")]
    TooManySwitches {
        /// Number of distinct switches
        count: usize,
    },

    /// Ports sit on different line cards
    #[error("ports span line cards {cards:?}, all ports must share one card")]
    MixedCards {
        /// The distinct cards seen
        cards: Vec<u32>,
    },

    /// Switches carry different port sets
    #[error("switch {node} carries ports {ports:?}, expected {expected:?}")]
    MismatchedPorts {
        /// Node whose ports differ
        node: u32,
        /// Ports on that node
        ports: Vec<u32>,
        /// Ports on the first node
        expected: Vec<u32>,
    },

    /// Ports do not form a contiguous range
    #[error("ports {ports:?} are not contiguous")]
    NonContiguousPorts {
        /// The port numbers
        ports: Vec<u32>,
    },

    /// A pattern string could not be parsed back
    #[error("pattern {pattern} is malformed")]
    MalformedPattern {
        /// The offending pattern
        pattern: String,
    },
}

/// A port of a fabric switch, addressed by controller ordinals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRef {
    /// Original Redfish URI of the port
    pub uri: String,
    /// Fabric the port belongs to
    pub fabric_id: String,
    /// Redfish identifier of the switch (last URI segment before `/Ports`)
    pub switch_id: String,
    /// Controller node ID of the switch
    pub node: u32,
    /// Line card of the interface
    pub card: u32,
    /// Port number of the interface
    pub port: u32,
}

impl PortRef {
    /// Parse a port URI into typed ordinals.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MalformedPortUri`] when the URI does not have the
    /// `/redfish/v1/Fabrics/{f}/Switches/{s}/Ports/{p}` shape, or when the switch
    /// or port token cannot be read as a node ID / interface name.
    pub fn parse(uri: &str) -> Result<Self, TopologyError> {
        let malformed = |reason: &str| TopologyError::MalformedPortUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = uri.trim_end_matches('/').split('/').collect();
        if segments.len() != PORT_SEGMENT_INDEX + 1 {
            return Err(malformed("unexpected number of path segments"));
        }
        if segments[SWITCH_SEGMENT_INDEX - 1] != SWITCHES_SEGMENT
            || segments[PORT_SEGMENT_INDEX - 1] != PORTS_SEGMENT
        {
            return Err(malformed("expected .../Switches/{switch}/Ports/{port}"));
        }

        let switch_id = segments[SWITCH_SEGMENT_INDEX];
        let node = last_token(switch_id)
            .parse::<u32>()
            .map_err(|_| malformed("switch token does not end in a node ID"))?;

        let (card, port) = parse_interface_name(last_token(segments[PORT_SEGMENT_INDEX]))
            .ok_or_else(|| malformed("port token does not end in an interface name"))?;

        Ok(Self {
            uri: uri.to_string(),
            fabric_id: segments[FABRIC_SEGMENT_INDEX].to_string(),
            switch_id: switch_id.to_string(),
            node,
            card,
            port,
        })
    }

    /// Controller interface name of this port (e.g. `eth1-5`).
    #[must_use]
    pub fn interface_name(&self) -> String {
        format!("{INTERFACE_NAME_PREFIX}{}-{}", self.card, self.port)
    }
}

/// Last colon-delimited token of a URI segment.
fn last_token(segment: &str) -> &str {
    segment.rsplit(KEY_SEPARATOR).next().unwrap_or(segment)
}

/// Parse `eth<card>-<port>` into its ordinals.
fn parse_interface_name(name: &str) -> Option<(u32, u32)> {
    let lower = name.to_ascii_lowercase();
    let ordinals = lower.strip_prefix(INTERFACE_NAME_PREFIX)?;
    let (card, port) = ordinals.split_once('-')?;
    Some((card.parse().ok()?, port.parse().ok()?))
}

/// The unified switch/port shape of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPortPattern {
    /// Controller node IDs, ascending
    pub nodes: Vec<u32>,
    /// Line card shared by every port
    pub card: u32,
    /// Lowest port number
    pub low_port: u32,
    /// Highest port number
    pub high_port: u32,
}

impl SwitchPortPattern {
    /// Unify the ports of one endpoint into a single pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] when the ports are empty, span more than two
    /// switches or several line cards, differ between switches, or are not
    /// contiguous.
    pub fn derive(ports: &[PortRef]) -> Result<Self, TopologyError> {
        if ports.is_empty() {
            return Err(TopologyError::NoPorts);
        }

        let cards: BTreeSet<u32> = ports.iter().map(|p| p.card).collect();
        if cards.len() > 1 {
            return Err(TopologyError::MixedCards {
                cards: cards.into_iter().collect(),
            });
        }

        let mut by_node: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        for port in ports {
            by_node.entry(port.node).or_default().insert(port.port);
        }
        if by_node.len() > MAX_ENDPOINT_SWITCHES {
            return Err(TopologyError::TooManySwitches {
                count: by_node.len(),
            });
        }

        let mut nodes = by_node.iter();
        let (_, expected) = nodes.next().ok_or(TopologyError::NoPorts)?;
        for (node, node_ports) in nodes {
            if node_ports != expected {
                return Err(TopologyError::MismatchedPorts {
                    node: *node,
                    ports: node_ports.iter().copied().collect(),
                    expected: expected.iter().copied().collect(),
                });
            }
        }

        let low_port = *expected.first().ok_or(TopologyError::NoPorts)?;
        let high_port = *expected.last().ok_or(TopologyError::NoPorts)?;
        let span = u64::from(high_port) - u64::from(low_port) + 1;
        if span != expected.len() as u64 {
            return Err(TopologyError::NonContiguousPorts {
                ports: expected.iter().copied().collect(),
            });
        }

        Ok(Self {
            nodes: by_node.keys().copied().collect(),
            card: cards.into_iter().next().ok_or(TopologyError::NoPorts)?,
            low_port,
            high_port,
        })
    }

    /// Switch pattern: node IDs joined by `-` (e.g. `101-102`).
    #[must_use]
    pub fn switch_pattern(&self) -> String {
        self.nodes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Port pattern: `<card>-<lowport>-ports-<highport>` (e.g. `1-5-ports-6`).
    #[must_use]
    pub fn port_pattern(&self) -> String {
        format!(
            "{}-{}{PORT_PATTERN_SEPARATOR}{}",
            self.card, self.low_port, self.high_port
        )
    }

    /// True when the ports are bundled across two switches.
    #[must_use]
    pub fn is_virtual_port_channel(&self) -> bool {
        self.nodes.len() == MAX_ENDPOINT_SWITCHES
    }

    /// Rebuild a pattern from its switch and port strings.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MalformedPattern`] if either string does not have
    /// the shape produced by [`switch_pattern`](Self::switch_pattern) and
    /// [`port_pattern`](Self::port_pattern).
    pub fn parse(switch_pattern: &str, port_pattern: &str) -> Result<Self, TopologyError> {
        let malformed = || TopologyError::MalformedPattern {
            pattern: format!("{switch_pattern}/{port_pattern}"),
        };

        let nodes = switch_pattern
            .split('-')
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;
        if nodes.is_empty() || nodes.len() > MAX_ENDPOINT_SWITCHES {
            return Err(malformed());
        }

        let (card_and_low, high) = port_pattern
            .split_once(PORT_PATTERN_SEPARATOR)
            .ok_or_else(malformed)?;
        let (card, low) = card_and_low.split_once('-').ok_or_else(malformed)?;

        let pattern = Self {
            nodes,
            card: card.parse().map_err(|_| malformed())?,
            low_port: low.parse().map_err(|_| malformed())?,
            high_port: high.parse().map_err(|_| malformed())?,
        };
        if pattern.low_port > pattern.high_port {
            return Err(malformed());
        }
        Ok(pattern)
    }
}

impl fmt::Display for SwitchPortPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.switch_pattern(), self.port_pattern())
    }
}
