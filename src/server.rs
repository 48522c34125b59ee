//! Listener setup for the HTTP binary.
//!
//! A port given on the command line or through `SERVER_PORT` is used as-is and any bind
//! failure is fatal. Without one the server takes the first free port from
//! [`DEFAULT_PORTS`], skipping ports other processes already hold.

use std::io;
use std::net::IpAddr;
use std::ops::RangeInclusive;
use tokio::net::TcpListener;

/// Ports scanned when no explicit port is configured.
pub const DEFAULT_PORTS: RangeInclusive<u16> = 5000..=5099;

/// Ports to try, in order.
pub fn candidate_ports(requested: Option<u16>) -> Vec<u16> {
    match requested {
        Some(port) => vec![port],
        None => DEFAULT_PORTS.collect(),
    }
}

/// Bind `ip` on the requested port, or on the first free default port.
pub async fn bind_listener(ip: IpAddr, requested: Option<u16>) -> io::Result<TcpListener> {
    let scanning = requested.is_none();
    for port in candidate_ports(requested) {
        match TcpListener::bind((ip, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok(listener);
            }
            Err(err) if scanning && err.kind() == io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
            }
            Err(err) => return Err(err),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        format!(
            "no free port between {} and {}",
            DEFAULT_PORTS.start(),
            DEFAULT_PORTS.end()
        ),
    ))
}
