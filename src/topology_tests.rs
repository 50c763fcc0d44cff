// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `topology.rs`

#[cfg(test)]
mod tests {
    use crate::topology::{PortRef, SwitchPortPattern, TopologyError};

    fn port_uri(node: u32, interface: &str) -> String {
        format!(
            "/redfish/v1/Fabrics/f1/Switches/a1b2c3:{node}/Ports/a1b2c3:{interface}"
        )
    }

    fn port(node: u32, interface: &str) -> PortRef {
        PortRef::parse(&port_uri(node, interface)).unwrap()
    }

    #[test]
    fn test_parse_port_uri() {
        let port = port(101, "eth1-5");

        assert_eq!(port.fabric_id, "f1");
        assert_eq!(port.switch_id, "a1b2c3:101");
        assert_eq!(port.node, 101);
        assert_eq!(port.card, 1);
        assert_eq!(port.port, 5);
        assert_eq!(port.interface_name(), "eth1-5");
    }

    #[test]
    fn test_parse_port_uri_uppercase_interface() {
        let port = port(102, "Eth1-49");
        assert_eq!(port.port, 49);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let result = PortRef::parse("/redfish/v1/Fabrics/f1/Switches/a:101");
        assert!(matches!(
            result,
            Err(TopologyError::MalformedPortUri { .. })
        ));

        let result = PortRef::parse("/redfish/v1/Fabrics/f1/Chassis/a:101/Ports/a:eth1-1");
        assert!(matches!(
            result,
            Err(TopologyError::MalformedPortUri { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        assert!(PortRef::parse(&port_uri(0, "eth1")).is_err());
        assert!(PortRef::parse(
            "/redfish/v1/Fabrics/f1/Switches/a:leaf/Ports/a:eth1-1"
        )
        .is_err());
    }

    #[test]
    fn test_single_switch_pattern() {
        let pattern =
            SwitchPortPattern::derive(&[port(101, "eth1-5"), port(101, "eth1-6")]).unwrap();

        assert_eq!(pattern.switch_pattern(), "101");
        assert_eq!(pattern.port_pattern(), "1-5-ports-6");
        assert!(!pattern.is_virtual_port_channel());
    }

    #[test]
    fn test_two_switch_pattern_sorts_nodes() {
        let pattern = SwitchPortPattern::derive(&[
            port(102, "eth1-10"),
            port(101, "eth1-10"),
        ])
        .unwrap();

        assert_eq!(pattern.switch_pattern(), "101-102");
        assert_eq!(pattern.port_pattern(), "1-10-ports-10");
        assert!(pattern.is_virtual_port_channel());
        assert_eq!(pattern.to_string(), "101-102_1-10-ports-10");
    }

    #[test]
    fn test_pattern_rejects_three_switches() {
        let result = SwitchPortPattern::derive(&[
            port(101, "eth1-1"),
            port(102, "eth1-1"),
            port(103, "eth1-1"),
        ]);
        assert_eq!(result, Err(TopologyError::TooManySwitches { count: 3 }));
    }

    #[test]
    fn test_pattern_rejects_mismatched_ports() {
        let result = SwitchPortPattern::derive(&[port(101, "eth1-1"), port(102, "eth1-2")]);
        assert!(matches!(result, Err(TopologyError::MismatchedPorts { .. })));
    }

    #[test]
    fn test_pattern_rejects_mixed_cards() {
        let result = SwitchPortPattern::derive(&[port(101, "eth1-1"), port(101, "eth2-2")]);
        assert!(matches!(result, Err(TopologyError::MixedCards { .. })));
    }

    #[test]
    fn test_pattern_rejects_gaps() {
        let result = SwitchPortPattern::derive(&[port(101, "eth1-1"), port(101, "eth1-3")]);
        assert_eq!(
            result,
            Err(TopologyError::NonContiguousPorts { ports: vec![1, 3] })
        );
    }

    #[test]
    fn test_pattern_rejects_full_width_port_gap() {
        let result =
            SwitchPortPattern::derive(&[port(101, "eth1-0"), port(101, "eth1-4294967295")]);
        assert_eq!(
            result,
            Err(TopologyError::NonContiguousPorts {
                ports: vec![0, u32::MAX]
            })
        );
    }

    #[test]
    fn test_pattern_rejects_empty() {
        assert_eq!(SwitchPortPattern::derive(&[]), Err(TopologyError::NoPorts));
    }

    #[test]
    fn test_pattern_strings_round_trip() {
        let pattern = SwitchPortPattern::derive(&[
            port(201, "eth1-7"),
            port(201, "eth1-8"),
            port(202, "eth1-7"),
            port(202, "eth1-8"),
        ])
        .unwrap();

        let parsed =
            SwitchPortPattern::parse(&pattern.switch_pattern(), &pattern.port_pattern()).unwrap();
        assert_eq!(parsed, pattern);
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(SwitchPortPattern::parse("101", "5-6").is_err());
        assert!(SwitchPortPattern::parse("abc", "1-5-ports-6").is_err());
        assert!(SwitchPortPattern::parse("101", "1-7-ports-6").is_err());
        assert!(SwitchPortPattern::parse("101-102-103", "1-5-ports-6").is_err());
    }
}
