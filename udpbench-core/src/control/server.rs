use std::net::{SocketAddr, UdpSocket};
use std::os::unix::io::AsRawFd;
use std::time::Instant;

use super::{send_frame_to, try_recv_frame_from, TICK};
use crate::error::CoreError;
use crate::io::{wait_readable, wait_writable, Readiness};
use crate::pool::WorkerPool;
use crate::protocol::{Command, ControlFrame};
use crate::shutdown::StopFlag;
use crate::socket::Family;
use crate::worker::Mode;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum State {
    Start,
    Started,
    Dying,
}

/// A reply armed by a read or a tick, waiting for the control socket to
/// report writable before it actually goes out. Mirrors the client's own
/// wait-then-send handling of `START`/`STOP` so a momentarily-unwritable
/// socket never turns into a propagated send error.
enum PendingWrite {
    Ack { addr: SocketAddr, threads: u32 },
    Data { addr: SocketAddr },
}

/// Server-side control-plane state machine.
pub struct ServerControl {
    socket: UdpSocket,
    family: Family,
    base_port: u16,
    polling: bool,
    stop: StopFlag,
    state: State,
    client_addr: Option<SocketAddr>,
    pool: Option<WorkerPool>,
    last_tick: Instant,
    pending: Option<PendingWrite>,
}

impl ServerControl {
    pub fn new(socket: UdpSocket, family: Family, base_port: u16, polling: bool, stop: StopFlag) -> Self {
        ServerControl {
            socket,
            family,
            base_port,
            polling,
            stop,
            state: State::Start,
            client_addr: None,
            pool: None,
            last_tick: Instant::now(),
            pending: None,
        }
    }

    /// Runs the server side to completion: accepts one `START`, replies
    /// `ACK`, spawns the receiver pool, sends periodic `DATA`, and exits
    /// once `STOP` arrives or shutdown is requested externally.
    pub fn run(&mut self) -> Result<(), CoreError> {
        let fd = self.socket.as_raw_fd();

        while !self.stop.is_set() && self.state != State::Dying {
            if self.pending.is_some() {
                if let Readiness::Ready = wait_writable(fd, TICK)? {
                    self.handle_writable()?;
                }
            } else if let Readiness::Ready = wait_readable(fd, TICK)? {
                self.handle_readable()?;
            }
            self.handle_tick();
        }

        if let Some(mut pool) = self.pool.take() {
            pool.join_all();
        }

        Ok(())
    }

    fn handle_readable(&mut self) -> Result<(), CoreError> {
        let Some((frame, addr)) = try_recv_frame_from(&self.socket)? else {
            return Ok(());
        };

        match (self.state, frame.cmd) {
            (State::Start, Command::Start) => {
                self.client_addr = Some(addr);
                self.pending = Some(PendingWrite::Ack {
                    addr,
                    threads: frame.threads.max(1),
                });
            }
            (State::Started, Command::Stop) => {
                if let Some(mut pool) = self.pool.take() {
                    pool.join_all();
                }
                self.state = State::Dying;
                tracing::info!("received STOP, shutting down");
            }
            _ => {
                // Unknown command, or one that doesn't apply to the
                // current state: ignored.
            }
        }

        Ok(())
    }

    /// Sends whatever reply was armed by `handle_readable` or `handle_tick`,
    /// now that the control socket has reported writable.
    fn handle_writable(&mut self) -> Result<(), CoreError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        match pending {
            PendingWrite::Ack { addr, threads } => {
                send_frame_to(&self.socket, &ControlFrame::ack(), addr)?;

                let pool = WorkerPool::start(
                    Mode::Receiver,
                    threads as usize,
                    self.family,
                    None,
                    self.base_port,
                    self.polling,
                    self.stop.clone(),
                )?;
                self.pool = Some(pool);
                self.last_tick = Instant::now();
                self.state = State::Started;

                tracing::info!(threads, %addr, "accepted START, spawned worker pool");
            }
            PendingWrite::Data { addr } => {
                let Some(pool) = self.pool.as_ref() else {
                    return Ok(());
                };

                let (packets_received, max_last_seq) = pool.stats();
                send_frame_to(
                    &self.socket,
                    &ControlFrame::data(max_last_seq, packets_received),
                    addr,
                )?;
                self.last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_tick(&mut self) {
        if self.state != State::Started || self.pending.is_some() {
            return;
        }

        if self.last_tick.elapsed() < TICK {
            return;
        }

        let Some(addr) = self.client_addr else {
            return;
        };

        self.pending = Some(PendingWrite::Data { addr });
    }
}
