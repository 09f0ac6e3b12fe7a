//! The per-thread send/receive loop.

use std::net::UdpSocket;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::io::{wait_readable, wait_writable, Readiness};
use crate::shutdown::StopFlag;

/// Length, in bytes, of the opaque data-plane sequence-number payload.
pub const PACKET_LEN: usize = 8;

/// Upper bound on non-blocking I/O attempts between readiness waits.
const BURST_SIZE: usize = 16384;

/// Readiness-wait timeout in select mode; also the tick used elsewhere
/// for DATA emission and shutdown observation.
const TICK: Duration = Duration::from_secs(1);

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
    Sender,
    Receiver,
}

/// Shared, lock-free counters for one worker. The worker thread is the
/// sole writer; the stats aggregator (and tests) read concurrently.
/// Torn reads are tolerated here: the counters are advisory statistics,
/// not a correctness-critical tally.
#[derive(Default)]
pub struct WorkerCounters {
    packets: AtomicU64,
    last_seq: AtomicU64,
}

impl WorkerCounters {
    pub fn new() -> Self {
        WorkerCounters::default()
    }

    pub fn packets(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq.load(Ordering::Relaxed)
    }

    pub(crate) fn record(&self, seq: u64) {
        self.last_seq.store(seq, Ordering::Relaxed);
        self.packets.fetch_add(1, Ordering::Relaxed);
    }
}

/// Runs the loop for a single worker thread until `stop` is observed.
/// Owns `socket` for the duration of the call; the socket closes when
/// this function returns and the thread's stack unwinds.
pub fn run(
    mode: Mode,
    socket: UdpSocket,
    thread_num: usize,
    n_threads: usize,
    polling: bool,
    stop: StopFlag,
    counters: Arc<WorkerCounters>,
) {
    match mode {
        Mode::Sender => sender_loop(socket, thread_num, n_threads, polling, stop, counters),
        Mode::Receiver => receiver_loop(socket, polling, stop, counters),
    }
}

fn sender_loop(
    socket: UdpSocket,
    thread_num: usize,
    n_threads: usize,
    polling: bool,
    stop: StopFlag,
    counters: Arc<WorkerCounters>,
) {
    let fd = socket.as_raw_fd();
    let mut iter: u64 = 0;

    while !stop.is_set() {
        if !polling {
            match wait_writable(fd, TICK) {
                Ok(Readiness::TimedOut) => continue,
                Ok(Readiness::Ready) => {}
                Err(_) => continue,
            }
        }

        for _ in 0..BURST_SIZE {
            let seq = iter * n_threads as u64 + thread_num as u64;
            let payload = seq.to_ne_bytes();

            match socket.send(&payload) {
                Ok(n) if n == PACKET_LEN => {
                    counters.record(seq);
                    iter += 1;
                }
                _ => break, // short write / would-block: break the burst
            }
        }
    }
}

fn receiver_loop(
    socket: UdpSocket,
    polling: bool,
    stop: StopFlag,
    counters: Arc<WorkerCounters>,
) {
    let fd = socket.as_raw_fd();
    let mut buf = [0u8; PACKET_LEN];

    while !stop.is_set() {
        if !polling {
            match wait_readable(fd, TICK) {
                Ok(Readiness::TimedOut) => continue,
                Ok(Readiness::Ready) => {}
                Err(_) => continue,
            }
        }

        for _ in 0..BURST_SIZE {
            match socket.recv(&mut buf) {
                Ok(n) if n == PACKET_LEN => {
                    let seq = u64::from_ne_bytes(buf);
                    counters.record(seq);
                }
                _ => break, // short datagram / would-block: break the burst
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::{create_socket, Family};
    use std::thread;

    #[test]
    fn sender_and_receiver_exchange_packets_over_loopback() {
        let server_socket = create_socket(Family::V4, None, "0").unwrap();
        let port = server_socket.local_addr().unwrap().port();
        let client_socket =
            create_socket(Family::V4, Some("127.0.0.1"), &port.to_string()).unwrap();

        let stop = StopFlag::new();
        let recv_counters = Arc::new(WorkerCounters::new());
        let send_counters = Arc::new(WorkerCounters::new());

        let recv_stop = stop.clone();
        let recv_counters_clone = recv_counters.clone();
        let receiver = thread::spawn(move || {
            run(
                Mode::Receiver,
                server_socket,
                0,
                1,
                true,
                recv_stop,
                recv_counters_clone,
            )
        });

        let send_stop = stop.clone();
        let send_counters_clone = send_counters.clone();
        let sender = thread::spawn(move || {
            run(
                Mode::Sender,
                client_socket,
                0,
                1,
                true,
                send_stop,
                send_counters_clone,
            )
        });

        // Let both workers run a short burst of real traffic.
        thread::sleep(Duration::from_millis(200));
        stop.set();

        sender.join().unwrap();
        receiver.join().unwrap();

        assert!(send_counters.packets() > 0);
        assert!(recv_counters.packets() > 0);
    }

    #[test]
    fn stop_before_start_sends_nothing() {
        let server_socket = create_socket(Family::V4, None, "0").unwrap();
        let port = server_socket.local_addr().unwrap().port();
        let client_socket =
            create_socket(Family::V4, Some("127.0.0.1"), &port.to_string()).unwrap();
        drop(server_socket);

        let stop = StopFlag::new();
        stop.set();
        let counters = Arc::new(WorkerCounters::new());

        run(Mode::Sender, client_socket, 0, 1, true, stop, counters.clone());

        assert_eq!(counters.packets(), 0);
    }
}
