//! Remote channel endpoint.
//!
//! An `Endpoint` is an immutable, already validated `ws://` or `wss://` URI. It is parsed
//! once at construction so that the client only ever sees a scheme, a host, and a port.
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::ChannelError;

/// Parsed WebSocket endpoint (scheme, host, port).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parses and validates an endpoint such as `ws://localhost:9002`.
    ///
    /// Only the `ws` and `wss` schemes are accepted, a host is required, and the port
    /// falls back to the scheme default (80 / 443) when omitted.
    pub fn parse(raw: &str) -> Result<Self, ChannelError> {
        let url = Url::parse(raw.trim())?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ChannelError::InvalidEndpoint(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                raw
            )));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ChannelError::InvalidEndpoint(format!("missing host in {}", raw)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ChannelError::InvalidEndpoint(format!("missing port in {}", raw)))?;

        Ok(Self { url, host, port })
    }

    /// URI scheme, either `ws` or `wss`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host name or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Full URI as handed to the transport.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl FromStr for Endpoint {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme(), self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_default_endpoint() {
        let endpoint = Endpoint::parse(crate::net::DEFAULT_ENDPOINT).unwrap();
        assert_eq!(endpoint.scheme(), "ws");
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.port(), 9002);
        assert_eq!(endpoint.to_string(), "ws://localhost:9002");
    }

    #[rstest]
    #[case("ws://example.com", 80)]
    #[case("wss://example.com", 443)]
    #[case("ws://127.0.0.1:4000/feed", 4000)]
    fn fills_in_ports(#[case] raw: &str, #[case] port: u16) {
        assert_eq!(Endpoint::parse(raw).unwrap().port(), port);
    }

    #[rstest]
    #[case("http://localhost:9002")]
    #[case("localhost:9002")]
    #[case("not a uri")]
    fn rejects_non_websocket_uris(#[case] raw: &str) {
        assert!(matches!(
            Endpoint::parse(raw),
            Err(ChannelError::InvalidEndpoint(_))
        ));
    }
}
