// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt::Display;
use std::net::Ipv4Addr;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

/// The port used when the caller does not specify one.
pub const DEFAULT_PORT: u16 = 9001;

/// The regex used to validate the dotted-quad shape of an IPv4 address.
///
/// The pattern only constrains the shape; octet bounds are enforced
/// separately so that values such as `999.1.1.1` are rejected.
static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap());

/// The error type for endpoint parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum EndpointParsingError {
  /// The address is not a valid IPv4 dotted-quad.
  InvalidAddressFormat,

  /// The port is not an integer in the 0-65535 range.
  InvalidPort,
}

// ===== impl EndpointParsingError =====

impl Display for EndpointParsingError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidAddressFormat => write!(f, "invalid format for IP address"),
      Self::InvalidPort => write!(f, "invalid port number"),
    }
  }
}

impl std::error::Error for EndpointParsingError {}

/// A TCP destination or bind target: an IPv4 address plus a port.
///
/// Endpoints are immutable once constructed and are validated at
/// construction time, so holding an `Endpoint` is proof that the
/// address and port are well-formed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Endpoint {
  /// The IPv4 address.
  address: Ipv4Addr,

  /// The TCP port.
  port: u16,
}

// ===== impl Endpoint =====

impl Endpoint {
  /// Creates a new endpoint, validating the address.
  ///
  /// # Errors
  ///
  /// Returns an error if the address is not a valid dotted-quad IPv4
  /// address with every octet in the 0-255 range.
  pub fn new(address: &str, port: u16) -> Result<Self, EndpointParsingError> {
    Ok(Self { address: Self::validate_address(address)?, port })
  }

  /// Creates a new endpoint from an address string and a textual port.
  ///
  /// # Errors
  ///
  /// Returns an error if the address is malformed, or if the port does
  /// not parse as an integer in the 0-65535 range.
  pub fn from_parts(address: &str, port_text: &str) -> Result<Self, EndpointParsingError> {
    let address = Self::validate_address(address)?;
    let port = port_text.trim().parse::<u16>().map_err(|_| EndpointParsingError::InvalidPort)?;

    Ok(Self { address, port })
  }

  /// Validates a dotted-quad IPv4 address, enforcing 0-255 octet bounds.
  fn validate_address(address: &str) -> Result<Ipv4Addr, EndpointParsingError> {
    if !IPV4_REGEX.is_match(address) {
      return Err(EndpointParsingError::InvalidAddressFormat);
    }

    let mut octets = [0u8; 4];
    for (i, part) in address.split('.').enumerate() {
      octets[i] = part.parse::<u8>().map_err(|_| EndpointParsingError::InvalidAddressFormat)?;
    }
    Ok(Ipv4Addr::from(octets))
  }

  /// Returns the IPv4 address of the endpoint.
  pub fn address(&self) -> Ipv4Addr {
    self.address
  }

  /// Returns the TCP port of the endpoint.
  pub fn port(&self) -> u16 {
    self.port
  }
}

impl Default for Endpoint {
  fn default() -> Self {
    Self { address: Ipv4Addr::new(127, 0, 0, 1), port: DEFAULT_PORT }
  }
}

impl Display for Endpoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.address, self.port)
  }
}

impl FromStr for Endpoint {
  type Err = EndpointParsingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split_once(':') {
      Some((address, port_text)) => Self::from_parts(address, port_text),
      None => Ok(Self { address: Self::validate_address(s)?, port: DEFAULT_PORT }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_valid_endpoints() {
    struct TestCase {
      name: &'static str,
      address: &'static str,
      port_text: &'static str,
      expected: (Ipv4Addr, u16),
    }

    let test_cases = vec![
      TestCase {
        name: "loopback",
        address: "127.0.0.1",
        port_text: "9001",
        expected: (Ipv4Addr::new(127, 0, 0, 1), 9001),
      },
      TestCase { name: "wildcard", address: "0.0.0.0", port_text: "0", expected: (Ipv4Addr::new(0, 0, 0, 0), 0) },
      TestCase {
        name: "octet upper bound",
        address: "255.255.255.255",
        port_text: "65535",
        expected: (Ipv4Addr::new(255, 255, 255, 255), 65535),
      },
      TestCase {
        name: "port surrounded by spaces",
        address: "10.0.0.2",
        port_text: " 8080 ",
        expected: (Ipv4Addr::new(10, 0, 0, 2), 8080),
      },
    ];

    for tc in test_cases {
      let endpoint = Endpoint::from_parts(tc.address, tc.port_text)
        .unwrap_or_else(|err| panic!("test case '{}': unexpected error: {}", tc.name, err));

      assert_eq!(endpoint.address(), tc.expected.0, "test case '{}': address mismatch", tc.name);
      assert_eq!(endpoint.port(), tc.expected.1, "test case '{}': port mismatch", tc.name);
    }
  }

  #[test]
  fn test_invalid_endpoints() {
    struct TestCase {
      name: &'static str,
      address: &'static str,
      port_text: &'static str,
      expected: EndpointParsingError,
    }

    let test_cases = vec![
      TestCase {
        name: "out of range octet",
        address: "999.1.1.1",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "octet just above bound",
        address: "256.0.0.1",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "not an address",
        address: "abc",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "too few octets",
        address: "1.2.3",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "too many octets",
        address: "1.2.3.4.5",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "empty address",
        address: "",
        port_text: "9001",
        expected: EndpointParsingError::InvalidAddressFormat,
      },
      TestCase {
        name: "negative port",
        address: "127.0.0.1",
        port_text: "-1",
        expected: EndpointParsingError::InvalidPort,
      },
      TestCase {
        name: "port above range",
        address: "127.0.0.1",
        port_text: "99999",
        expected: EndpointParsingError::InvalidPort,
      },
      TestCase {
        name: "non-numeric port",
        address: "127.0.0.1",
        port_text: "notanumber",
        expected: EndpointParsingError::InvalidPort,
      },
    ];

    for tc in test_cases {
      let result = Endpoint::from_parts(tc.address, tc.port_text);

      assert!(result.is_err(), "test case '{}': expected error", tc.name);
      assert_eq!(result.unwrap_err(), tc.expected, "test case '{}': error mismatch", tc.name);
    }
  }

  #[test]
  fn test_default_endpoint() {
    let endpoint = Endpoint::default();

    assert_eq!(endpoint.to_string(), "127.0.0.1:9001");
  }

  #[test]
  fn test_endpoint_from_str() {
    let endpoint = Endpoint::from_str("192.168.1.10:4242").unwrap();
    assert_eq!(endpoint.address(), Ipv4Addr::new(192, 168, 1, 10));
    assert_eq!(endpoint.port(), 4242);

    // Address without a port falls back to the default port.
    let endpoint = Endpoint::from_str("192.168.1.10").unwrap();
    assert_eq!(endpoint.port(), DEFAULT_PORT);

    assert!(Endpoint::from_str("192.168.1.10:notaport").is_err());
  }
}
