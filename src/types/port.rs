//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the parsed form of a user port specification: either a
//! single port or one contiguous inclusive range.

use std::fmt;
use std::iter::Map;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port without validation. Only for values already known to be
    /// in range, such as the bounds of an existing `PortRange`.
    #[inline]
    const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PortError::OutOfRange(value.to_string()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port specification parsing.
///
/// Every variant carries the original input so the message can point at what
/// the user actually typed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("invalid port specification: {0}")]
    InvalidFormat(String),
    #[error("port out of bounds (1-65535): {0}")]
    OutOfRange(String),
    #[error("invalid port range, start is greater than end: {0}")]
    InvalidOrder(String),
}

/// Ascending iterator over the ports of a `PortRange`.
pub type Ports = Map<RangeInclusive<u16>, fn(u16) -> Port>;

/// An inclusive, non-empty range of ports.
///
/// A single port is represented as a range whose start equals its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Separator between the two bounds of a range.
    pub const SEPARATOR: char = '-';

    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidOrder(format!("{}-{}", start, end)))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Every valid port, 1-65535.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    /// Parse a port specification such as `"80"` or `"20-443"`.
    pub fn parse(spec: &str) -> Result<Self, PortError> {
        if !spec.contains(Self::SEPARATOR) {
            let port = parse_bound(spec, spec)?;
            return Ok(Self::single(port));
        }

        let bounds: Vec<&str> = spec.split(Self::SEPARATOR).collect();
        let [start, end] = bounds.as_slice() else {
            return Err(PortError::InvalidFormat(spec.to_string()));
        };

        let start = parse_bound(start, spec)?;
        let end = parse_bound(end, spec)?;
        if start > end {
            return Err(PortError::InvalidOrder(spec.to_string()));
        }

        Ok(Self { start, end })
    }

    /// First port of the range.
    pub const fn start(&self) -> Port {
        self.start
    }

    /// Last port of the range (inclusive).
    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether the range covers exactly one port.
    pub const fn is_single(&self) -> bool {
        self.start.0 == self.end.0
    }

    /// Check whether `port` lies inside the range.
    pub fn contains(&self, port: Port) -> bool {
        self.start <= port && port <= self.end
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> Ports {
        (self.start.0..=self.end.0).map(Port::new_unchecked as fn(u16) -> Port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl IntoIterator for PortRange {
    type Item = Port;
    type IntoIter = Ports;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}{}{}", self.start, Self::SEPARATOR, self.end)
        }
    }
}

/// Parse one bound of a specification. `input` is the whole user string,
/// used for error messages.
fn parse_bound(raw: &str, input: &str) -> Result<Port, PortError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                PortError::OutOfRange(input.to_string())
            }
            _ => PortError::InvalidFormat(input.to_string()),
        })?;

    u16::try_from(value)
        .ok()
        .and_then(Port::new)
        .ok_or_else(|| PortError::OutOfRange(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(80).is_some());
        assert!(Port::new(65535).is_some());
        assert!(matches!(Port::try_from(0), Err(PortError::OutOfRange(_))));
    }

    #[test]
    fn test_parse_single_port() {
        for p in [1u16, 22, 80, 8080, 65535] {
            let range = PortRange::parse(&p.to_string()).unwrap();
            assert_eq!(range.len(), 1);
            assert_eq!(range.iter().collect::<Vec<_>>(), vec![Port::new(p).unwrap()]);
        }
    }

    #[test]
    fn test_parse_range() {
        let range: PortRange = "20-25".parse().unwrap();
        let ports: Vec<u16> = range.iter().map(u16::from).collect();
        assert_eq!(ports, vec![20, 21, 22, 23, 24, 25]);
        assert_eq!(range.len(), 6);
    }

    #[test]
    fn test_parse_degenerate_range() {
        let range = PortRange::parse("443-443").unwrap();
        assert!(range.is_single());
        assert_eq!(range.to_string(), "443");
    }

    #[test]
    fn test_parse_full_range() {
        let range = PortRange::parse("1-65535").unwrap();
        assert_eq!(range, PortRange::full());
        assert_eq!(range.len(), 65535);
        assert_eq!(range.iter().last(), Port::new(65535));
    }

    #[test]
    fn test_parse_trims_bounds() {
        let range = PortRange::parse(" 80 - 82 ").unwrap();
        assert_eq!(range.to_string(), "80-82");
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            PortRange::parse("0"),
            Err(PortError::OutOfRange("0".to_string()))
        );
        assert_eq!(
            PortRange::parse("65536"),
            Err(PortError::OutOfRange("65536".to_string()))
        );
        assert_eq!(
            PortRange::parse("99999999999999999999"),
            Err(PortError::OutOfRange("99999999999999999999".to_string()))
        );
        assert_eq!(
            PortRange::parse("0-100"),
            Err(PortError::OutOfRange("0-100".to_string()))
        );
        assert_eq!(
            PortRange::parse("1-70000"),
            Err(PortError::OutOfRange("1-70000".to_string()))
        );
    }

    #[test]
    fn test_invalid_order() {
        assert_eq!(
            PortRange::parse("10-5"),
            Err(PortError::InvalidOrder("10-5".to_string()))
        );
        assert!(matches!(
            PortRange::new(Port::new(10).unwrap(), Port::new(5).unwrap()),
            Err(PortError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_invalid_format() {
        for input in ["a-b-c", "1-2-3", "abc", "", "   ", "-5", "80-", "8o"] {
            assert!(
                matches!(PortRange::parse(input), Err(PortError::InvalidFormat(_))),
                "expected InvalidFormat for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_error_names_input() {
        let err = PortRange::parse("1-99999").unwrap_err();
        assert!(err.to_string().contains("1-99999"));
    }

    #[test]
    fn test_contains() {
        let range = PortRange::parse("100-200").unwrap();
        assert!(range.contains(Port::new(100).unwrap()));
        assert!(range.contains(Port::new(200).unwrap()));
        assert!(!range.contains(Port::new(201).unwrap()));
    }
}
