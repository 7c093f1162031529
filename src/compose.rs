//! Docker Compose `ports:` parsing.
//!
//! Entries arrive as dynamically typed YAML — integers, strings, or
//! small objects. They are deserialized into a typed union first, then
//! dispatched to one parse function per accepted shape. Entries that
//! match no shape are skipped without failing the file; a whole-file
//! failure is reserved for undecodable YAML or a top level that is not
//! a mapping.

use std::path::Path;

use crate::types::{PortMapping, Protocol};

/// Whole-file parse failure. The verifier converts the YAML and
/// structure variants into a single `parse_error` conflict; I/O
/// failures stay errors because they indicate an environment problem.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Reading the file failed for a reason other than absence.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The document decoded but its top level is not a mapping.
    #[error("top-level structure is not a mapping")]
    NotAMapping,

    /// The document is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(
        /// The wrapped YAML error.
        #[from]
        serde_yaml::Error,
    ),
}

/// One raw `ports:` entry, discriminated immediately after decoding.
/// Shapes are tried in declaration order by serde's untagged
/// deserialization, matching the documented precedence.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum PortsEntry {
    /// Bare integer: `8080` publishes host 8080 to container 8080.
    Int(u64),
    /// String form: `"H:C"`, `"H:C/proto"`, `"IP:H:C"`, `"IP:H:C/proto"`.
    Str(String),
    /// Long syntax object with `target` and `published`.
    Obj(PortsObject),
}

/// Long syntax `ports:` object. Unknown keys (`mode`, `name`, ...) are
/// ignored; only the published/target pair and protocol are modeled.
#[derive(Debug, serde::Deserialize)]
struct PortsObject {
    /// Transport protocol, defaulting to tcp when absent.
    protocol: Option<String>,
    /// Host port.
    published: u64,
    /// Container port.
    target: u64,
}

/// Parse a bare integer entry: host and container are the same port.
fn parse_bare_int(service_name: &str, value: u64) -> Option<PortMapping> {
    let port = u16::try_from(value).ok()?;
    return Some(PortMapping {
        container_port: port,
        host_port: port,
        protocol: Protocol::Tcp,
        raw_mapping: value.to_string(),
        service_name: service_name.to_string(),
    });
}

/// Parse a long syntax object entry. `published` maps to the host,
/// `target` to the container. A protocol other than tcp/udp rejects
/// the entry, consistent with the string form.
fn parse_port_object(service_name: &str, obj: &PortsObject) -> Option<PortMapping> {
    let host_port = u16::try_from(obj.published).ok()?;
    let container_port = u16::try_from(obj.target).ok()?;
    let protocol = match obj.protocol.as_deref() {
        None => Protocol::Tcp,
        Some(proto) => parse_protocol(proto)?,
    };
    return Some(PortMapping {
        container_port,
        host_port,
        protocol,
        raw_mapping: format!(
            "{{target: {}, published: {}, protocol: {protocol}}}",
            obj.target, obj.published,
        ),
        service_name: service_name.to_string(),
    });
}

/// Parse a string entry: `"H:C"`, `"H:C/proto"`, `"IP:H:C"`, or
/// `"IP:H:C/proto"`. The bind address, when present, is discarded —
/// the engine validates host port ranges, not bind addresses.
fn parse_port_string(service_name: &str, raw: &str) -> Option<PortMapping> {
    let trimmed = raw.trim();
    let (spec, protocol) = split_protocol_suffix(trimmed)?;

    let parts: Vec<&str> = spec.split(':').collect();
    let (host_part, container_part) = match parts.as_slice() {
        [host, container] => (*host, *container),
        [bind, host, container] if !bind.is_empty() => (*host, *container),
        _ => return None,
    };

    let host_port: u16 = host_part.parse().ok()?;
    let container_port: u16 = container_part.parse().ok()?;

    return Some(PortMapping {
        container_port,
        host_port,
        protocol,
        raw_mapping: trimmed.to_string(),
        service_name: service_name.to_string(),
    });
}

/// Decode and parse a whole Compose file, returning every mapping of
/// every service in document order.
///
/// A missing or empty `services` key yields an empty list — a project
/// may legitimately define no ports yet. Service values that are not
/// mappings are skipped.
///
/// # Errors
///
/// Returns `ComposeError::Io` if the file cannot be read,
/// `ComposeError::Yaml` if it is not valid YAML, or
/// `ComposeError::NotAMapping` if the top level is not a mapping.
pub fn parse_compose_file(path: &Path) -> Result<Vec<PortMapping>, ComposeError> {
    let content = std::fs::read_to_string(path)?;
    let document: serde_yaml::Value = serde_yaml::from_str(&content)?;

    let serde_yaml::Value::Mapping(top) = document else {
        return Err(ComposeError::NotAMapping);
    };

    let mut mappings = Vec::new();

    let Some(serde_yaml::Value::Mapping(services)) = top.get("services") else {
        return Ok(mappings);
    };

    for (name, service_config) in services {
        let Some(service_name) = name.as_str() else {
            continue;
        };
        let serde_yaml::Value::Mapping(config) = service_config else {
            continue;
        };
        let Some(serde_yaml::Value::Sequence(ports)) = config.get("ports") else {
            continue;
        };
        mappings.extend(parse_ports_section(service_name, ports));
    }

    return Ok(mappings);
}

/// Parse one service's raw `ports` sequence into the mappings that
/// matched a known shape. Unrecognized entries are dropped silently
/// and do not affect their neighbors.
pub fn parse_ports_section(
    service_name: &str,
    ports: &[serde_yaml::Value],
) -> Vec<PortMapping> {
    let mut mappings = Vec::new();

    for raw_entry in ports {
        let Ok(entry) = serde_yaml::from_value::<PortsEntry>(raw_entry.clone()) else {
            continue;
        };
        let parsed = match entry {
            PortsEntry::Int(value) => parse_bare_int(service_name, value),
            PortsEntry::Obj(obj) => parse_port_object(service_name, &obj),
            PortsEntry::Str(raw) => parse_port_string(service_name, &raw),
        };
        if let Some(mapping) = parsed {
            mappings.push(mapping);
        }
    }

    return mappings;
}

/// Interpret a protocol token. Anything other than `tcp` or `udp`
/// rejects the owning entry.
fn parse_protocol(token: &str) -> Option<Protocol> {
    return match token {
        "tcp" => Some(Protocol::Tcp),
        "udp" => Some(Protocol::Udp),
        _ => None,
    };
}

/// Split an optional `/proto` suffix off a port spec. No suffix means
/// tcp; an unrecognized suffix rejects the entry.
fn split_protocol_suffix(spec: &str) -> Option<(&str, Protocol)> {
    return match spec.split_once('/') {
        None => Some((spec, Protocol::Tcp)),
        Some((head, proto)) => Some((head, parse_protocol(proto)?)),
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    /// Build a YAML sequence from a literal `ports:` block.
    fn ports_sequence(yaml: &str) -> Vec<serde_yaml::Value> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let serde_yaml::Value::Sequence(seq) = value else {
            panic!("fixture is not a sequence");
        };
        return seq;
    }

    #[test]
    fn bare_integer_maps_port_to_itself() {
        let ports = ports_sequence("- 9090");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].host_port, 9090);
        assert_eq!(mappings[0].container_port, 9090);
        assert_eq!(mappings[0].protocol, Protocol::Tcp);
        assert_eq!(mappings[0].raw_mapping, "9090");
    }

    #[test]
    fn bind_address_is_discarded() {
        let ports = ports_sequence("- \"127.0.0.1:8080:80\"\n- \"0.0.0.0:9090:90/udp\"");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].host_port, 8080);
        assert_eq!(mappings[0].container_port, 80);
        assert_eq!(mappings[1].host_port, 9090);
        assert_eq!(mappings[1].protocol, Protocol::Udp);
    }

    #[test]
    fn object_form_defaults_to_tcp() {
        let ports = ports_sequence("- target: 80\n  published: 8080");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].host_port, 8080);
        assert_eq!(mappings[0].container_port, 80);
        assert_eq!(mappings[0].protocol, Protocol::Tcp);
    }

    #[test]
    fn object_form_honors_protocol() {
        let ports = ports_sequence("- target: 53\n  published: 5300\n  protocol: udp");
        let mappings = parse_ports_section("dns", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].protocol, Protocol::Udp);
    }

    #[test]
    fn simple_string_parses_host_and_container() {
        let ports = ports_sequence("- \"8080:80\"");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].host_port, 8080);
        assert_eq!(mappings[0].container_port, 80);
        assert_eq!(mappings[0].protocol, Protocol::Tcp);
    }

    #[test]
    fn string_with_protocol_suffix() {
        let ports = ports_sequence("- \"8080:80/udp\"\n- \"9090:90/tcp\"");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].protocol, Protocol::Udp);
        assert_eq!(mappings[1].protocol, Protocol::Tcp);
    }

    #[test]
    fn unknown_protocol_rejects_only_that_entry() {
        let ports = ports_sequence("- \"8080:80/sctp\"\n- \"9090:90\"");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].host_port, 9090);
    }

    #[test]
    fn unrecognized_entry_is_skipped() {
        let ports = ports_sequence("- \"no-colons-here\"\n- \"8080:80\"\n- [1, 2]");
        let mappings = parse_ports_section("web", &ports);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].host_port, 8080);
    }
}
