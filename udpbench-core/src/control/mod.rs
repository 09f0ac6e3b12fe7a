//! The control-plane state machines: a small, 1-second ticked loop on each
//! side of the handshake, layered on the same readiness primitive the
//! data-plane workers use.

mod client;
mod server;

pub use client::ClientControl;
pub use server::ServerControl;

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::CoreError;
use crate::protocol::ControlFrame;

/// The tick that paces both `DATA` emission and shutdown observation.
pub(crate) const TICK: Duration = Duration::from_secs(1);

/// Sends a control frame as a single datagram. A short write is treated as
/// fatal: the caller propagates it instead of continuing in an
/// inconsistent state.
pub(crate) fn send_frame(socket: &UdpSocket, frame: &ControlFrame) -> Result<(), CoreError> {
    let encoded = frame.encode();
    let written = socket.send(&encoded)?;
    if written != encoded.len() {
        return Err(CoreError::Socket(io::Error::new(
            io::ErrorKind::WriteZero,
            "short write on control socket",
        )));
    }
    Ok(())
}

/// Reads one datagram from the control socket, if any is pending, and
/// decodes it. A short/long/malformed datagram is dropped silently
/// (returns `Ok(None)`), never surfaced as an error.
pub(crate) fn try_recv_frame(socket: &UdpSocket) -> io::Result<Option<ControlFrame>> {
    let mut buf = [0u8; crate::protocol::FRAME_LEN + 1];
    match socket.recv(&mut buf) {
        Ok(n) => Ok(ControlFrame::decode(&buf[..n])),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(err) => Err(err),
    }
}

/// Server-side variant: the control socket is unconnected (bound only),
/// so replies must target an explicit address learned from the client's
/// first `START`.
pub(crate) fn send_frame_to(
    socket: &UdpSocket,
    frame: &ControlFrame,
    addr: SocketAddr,
) -> Result<(), CoreError> {
    let encoded = frame.encode();
    let written = socket.send_to(&encoded, addr)?;
    if written != encoded.len() {
        return Err(CoreError::Socket(io::Error::new(
            io::ErrorKind::WriteZero,
            "short write on control socket",
        )));
    }
    Ok(())
}

pub(crate) fn try_recv_frame_from(
    socket: &UdpSocket,
) -> io::Result<Option<(ControlFrame, SocketAddr)>> {
    let mut buf = [0u8; crate::protocol::FRAME_LEN + 1];
    match socket.recv_from(&mut buf) {
        Ok((n, addr)) => Ok(ControlFrame::decode(&buf[..n]).map(|frame| (frame, addr))),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(err) => Err(err),
    }
}
