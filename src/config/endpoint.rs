//! Parsing of the collector `host` option.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Port used when the host option omits one.
pub const DEFAULT_PORT: u16 = 9020;

/// Collector address resolved from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16, tls: bool },
    Unix { path: PathBuf },
}

impl Endpoint {
    /// Parse `tcp://host:port`, `tls://host:port`, `unix:///path`, or a bare
    /// `host[:port]`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let (scheme, rest) = match raw.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("tcp".to_owned(), raw),
        };
        match scheme.as_str() {
            "tcp" => parse_host_port(rest, false),
            "tls" => parse_host_port(rest, true),
            "unix" if !rest.is_empty() => Ok(Endpoint::Unix {
                path: PathBuf::from(rest),
            }),
            "unix" => Err(invalid("unix host requires a socket path")),
            other => Err(invalid(&format!("unsupported host scheme '{other}'"))),
        }
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::InvalidConfig(msg.to_owned())
}

fn parse_host_port(rest: &str, tls: bool) -> Result<Endpoint, ConfigError> {
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid("host must not be empty"));
    }
    let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 address in host"))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(port),
            None if tail.is_empty() => None,
            None => return Err(invalid("unexpected text after IPv6 address")),
        };
        (host, port)
    } else {
        match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        }
    };
    if host.is_empty() {
        return Err(invalid("host must not be empty"));
    }
    let port = match port {
        Some(port) => port
            .parse::<u16>()
            .map_err(|_| invalid(&format!("invalid port '{port}' in host")))?,
        None => DEFAULT_PORT,
    };
    Ok(Endpoint::Tcp {
        host: host.to_owned(),
        port,
        tls,
    })
}
