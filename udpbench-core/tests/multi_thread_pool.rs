//! Multi-worker pool properties: data ports are consecutive and disjoint
//! from the control port, and every worker observes real traffic.

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use udpbench_core::pool::WorkerPool;
use udpbench_core::shutdown::StopFlag;
use udpbench_core::socket::Family;
use udpbench_core::Mode;

const BASE_PORT: u16 = 18500;
const N_THREADS: usize = 4;

#[test]
fn four_threads_use_consecutive_ports_disjoint_from_control_and_all_receive_traffic() {
    let stop = StopFlag::new();
    let mut server_pool = WorkerPool::start(
        Mode::Receiver,
        N_THREADS,
        Family::V4,
        None,
        BASE_PORT,
        true,
        stop.clone(),
    )
    .expect("server pool starts");

    // Fire a handful of raw datagrams at each expected data port directly,
    // independent of the sender-side pool, to pin down the port scheme:
    // ports are BASE_PORT+1..BASE_PORT+N, distinct from BASE_PORT itself.
    let prober = UdpSocket::bind("127.0.0.1:0").unwrap();
    for i in 0..N_THREADS as u16 {
        let port = BASE_PORT + 1 + i;
        assert_ne!(port, BASE_PORT);
        for seq in 0..10u64 {
            prober
                .send_to(&seq.to_ne_bytes(), ("127.0.0.1", port))
                .unwrap();
        }
    }

    thread::sleep(Duration::from_millis(200));

    let (packets_total, _max_last_seq) = server_pool.stats();
    assert!(packets_total > 0, "server pool observed no traffic at all");

    server_pool.join_all();
}
