//! Endpoint resolution, grounded on `nio.c`'s `create_socket`: build a
//! hint-filtered address list, then either `bind` (passive / server) or
//! `connect` (active / client) to the first candidate that succeeds.

use std::net::{
    Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6, ToSocketAddrs, UdpSocket,
};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::CoreError;

/// Address family selection, mirroring `nio.c`'s `-4`/`-6`/unset CLI flags.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Family {
    #[default]
    Unspecified,
    V4,
    V6,
}

impl Family {
    fn accepts(self, addr: &SocketAddr) -> bool {
        match self {
            Family::Unspecified => true,
            Family::V4 => addr.is_ipv4(),
            Family::V6 => addr.is_ipv6(),
        }
    }
}

/// Creates a non-blocking UDP socket.
///
/// `host = None` binds a passive (server) socket on `service`, for the
/// requested `family` (an unspecified family prefers binding dual-stack
/// via an IPv6 wildcard, falling back to IPv4).
///
/// `host = Some(h)` connects an active (client) socket to the first
/// resolved candidate for `h:service` that accepts a `connect`, having
/// first sorted v6 candidates ahead of v4 ones when `family` is
/// unspecified.
pub fn create_socket(
    family: Family,
    host: Option<&str>,
    service: &str,
) -> Result<UdpSocket, CoreError> {
    let port: u16 = service
        .parse()
        .map_err(|_| CoreError::NoCandidateAddress {
            host: host.map(str::to_owned),
            service: service.to_owned(),
        })?;

    match host {
        None => bind_passive(family, port),
        Some(host) => connect_active(family, host, service, port),
    }
}

fn bind_passive(family: Family, port: u16) -> Result<UdpSocket, CoreError> {
    let candidates: Vec<SocketAddr> = match family {
        Family::V4 => vec![SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into()],
        Family::V6 => vec![SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, port, 0, 0).into()],
        Family::Unspecified => vec![
            SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, port, 0, 0).into(),
            SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into(),
        ],
    };

    for addr in &candidates {
        if let Ok(socket) = new_socket(addr) {
            if socket.bind(&(*addr).into()).is_ok() {
                socket.set_nonblocking(true)?;
                return Ok(socket.into());
            }
        }
    }

    Err(CoreError::NoCandidateAddress {
        host: None,
        service: port.to_string(),
    })
}

fn connect_active(
    family: Family,
    host: &str,
    service: &str,
    port: u16,
) -> Result<UdpSocket, CoreError> {
    let mut candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| CoreError::Resolve {
            host: Some(host.to_owned()),
            service: service.to_owned(),
            source,
        })?
        .filter(|addr| family.accepts(addr))
        .collect();

    if family == Family::Unspecified {
        // Prefer v6 candidates when the family wasn't pinned down.
        candidates.sort_by_key(|addr| !addr.is_ipv6());
    }

    for addr in &candidates {
        if let Ok(socket) = new_socket(addr) {
            if socket.connect(&(*addr).into()).is_ok() {
                socket.set_nonblocking(true)?;
                return Ok(socket.into());
            }
        }
    }

    Err(CoreError::NoCandidateAddress {
        host: Some(host.to_owned()),
        service: service.to_owned(),
    })
}

fn new_socket(addr: &SocketAddr) -> Result<Socket, CoreError> {
    Socket::new(Domain::for_address(*addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(CoreError::Socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_a_passive_v4_socket_on_an_ephemeral_port() {
        let socket = create_socket(Family::V4, None, "0").expect("bind succeeds");
        assert!(socket.local_addr().unwrap().is_ipv4());
    }

    #[test]
    fn connects_an_active_v4_socket_to_loopback() {
        let server = create_socket(Family::V4, None, "0").expect("bind succeeds");
        let port = server.local_addr().unwrap().port();

        let client = create_socket(Family::V4, Some("127.0.0.1"), &port.to_string())
            .expect("connect succeeds");
        assert!(client.peer_addr().is_ok());
    }

    #[test]
    fn rejects_unparsable_service() {
        let result = create_socket(Family::V4, None, "not-a-port");
        assert!(result.is_err());
    }
}
