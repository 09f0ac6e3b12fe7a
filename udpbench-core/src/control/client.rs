use std::net::UdpSocket;
use std::os::unix::io::AsRawFd;
use std::time::Instant;

use super::{send_frame, try_recv_frame, TICK};
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
    StartSent,
    Started,
    Dying,
}

struct DeltaSample {
    recv: u64,
    sent: u64,
    at: Instant,
}

/// Client-side control-plane state machine. The socket passed in must
/// already be connected to the server's control address.
pub struct ClientControl {
    socket: UdpSocket,
    n_threads: usize,
    family: Family,
    host: String,
    base_port: u16,
    polling: bool,
    stop: StopFlag,
    state: State,
    pool: Option<WorkerPool>,
    prev_sample: Option<DeltaSample>,
}

impl ClientControl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        socket: UdpSocket,
        n_threads: usize,
        family: Family,
        host: String,
        base_port: u16,
        polling: bool,
        stop: StopFlag,
    ) -> Self {
        ClientControl {
            socket,
            n_threads,
            family,
            host,
            base_port,
            polling,
            stop,
            state: State::Start,
            pool: None,
            prev_sample: None,
        }
    }

    /// Runs the client side to completion: sends `START`, waits for
    /// `ACK`, spawns the sender pool, prints a `PPS:` line per `DATA`,
    /// and sends `STOP` once shutdown is requested.
    pub fn run(&mut self) -> Result<(), CoreError> {
        let fd = self.socket.as_raw_fd();

        loop {
            if self.stop.is_set() && self.state != State::Dying {
                // Only leave the loop once STOP actually went out on the
                // wire, not merely once shutdown was requested.
                if self.send_stop()? {
                    self.state = State::Dying;
                }
                continue;
            }

            if self.state == State::Dying {
                break;
            }

            match self.state {
                State::Start => {
                    if let Readiness::Ready = wait_writable(fd, TICK)? {
                        send_frame(&self.socket, &ControlFrame::start(self.n_threads as u32))?;
                        self.state = State::StartSent;
                        tracing::info!(threads = self.n_threads, "sent START");
                    }
                }
                State::StartSent => {
                    if let Readiness::Ready = wait_readable(fd, TICK)? {
                        if let Some(frame) = try_recv_frame(&self.socket)? {
                            if frame.cmd == Command::Ack {
                                self.pool = Some(WorkerPool::start(
                                    Mode::Sender,
                                    self.n_threads,
                                    self.family,
                                    Some(self.host.as_str()),
                                    self.base_port,
                                    self.polling,
                                    self.stop.clone(),
                                )?);
                                self.state = State::Started;
                                tracing::info!("received ACK, spawned worker pool");
                            }
                        }
                    }
                }
                State::Started => {
                    if let Readiness::Ready = wait_readable(fd, TICK)? {
                        if let Some(frame) = try_recv_frame(&self.socket)? {
                            if frame.cmd == Command::Data {
                                self.on_data(frame);
                            }
                        }
                    }
                }
                State::Dying => unreachable!("handled above"),
            }
        }

        if let Some(mut pool) = self.pool.take() {
            pool.join_all();
        }

        Ok(())
    }

    /// Returns `true` once STOP has actually gone out on the wire.
    fn send_stop(&mut self) -> Result<bool, CoreError> {
        let fd = self.socket.as_raw_fd();
        if let Readiness::Ready = wait_writable(fd, TICK)? {
            send_frame(&self.socket, &ControlFrame::stop())?;
            tracing::info!("sent STOP");
            return Ok(true);
        }
        Ok(false)
    }

    fn on_data(&mut self, frame: ControlFrame) {
        let now = Instant::now();
        let sent = self.pool.as_ref().map(|p| p.stats().0).unwrap_or(0);
        let recv = frame.packets_received;

        if let Some(prev) = &self.prev_sample {
            let dt_us = now.duration_since(prev.at).as_micros().max(1) as u64;
            let recv_pps = recv.saturating_sub(prev.recv) * 1_000_000 / dt_us;
            let sent_pps = sent.saturating_sub(prev.sent) * 1_000_000 / dt_us;
            println!("PPS: {recv_pps} Sent: {sent_pps}");
        }

        self.prev_sample = Some(DeltaSample { recv, sent, at: now });
    }
}
