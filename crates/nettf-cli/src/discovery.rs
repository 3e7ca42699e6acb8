//! LAN discovery scanner: a simple TCP-connect probe over the local /24,
//! standing in for the ARP/ping/port-probe collaborator the specification
//! describes only as an external contract. Not part of the wire protocol
//! engine — this crate owns it purely as CLI plumbing.

use std::net::{Ipv4Addr, SocketAddrV4, TcpStream, UdpSocket};
use std::time::Duration;

/// A host that answered a TCP connect attempt on the NETTF port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredHost {
    /// Address that accepted the connection.
    pub addr: Ipv4Addr,
}

/// Determines this host's own LAN-facing IPv4 address by "connecting" a UDP
/// socket to a well-known external address without sending any packet —
/// the kernel routing table picks the outbound interface and source address.
fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(addr) => Some(addr),
        std::net::IpAddr::V6(_) => None,
    }
}

/// Scans the /24 subnet containing this host's own LAN address, attempting a
/// TCP connect to `port` on every other host with the given per-host
/// `timeout`. Returns every host that accepted the connection.
#[must_use]
pub fn scan(port: u16, timeout: Duration) -> Vec<DiscoveredHost> {
    let Some(me) = local_ipv4() else {
        return Vec::new();
    };
    let octets = me.octets();

    let mut found = Vec::new();
    for last in 1..=254u8 {
        if last == octets[3] {
            continue;
        }
        let candidate = Ipv4Addr::new(octets[0], octets[1], octets[2], last);
        let addr = SocketAddrV4::new(candidate, port);
        if TcpStream::connect_timeout(&addr.into(), timeout).is_ok() {
            found.push(DiscoveredHost { addr: candidate });
        }
    }
    found
}
