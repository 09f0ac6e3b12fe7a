//! End-to-end smoke test over real loopback sockets: a single-thread
//! handshake from START through ACK, a couple of DATA ticks, and a clean
//! shutdown on both sides.

use std::thread;
use std::time::Duration;

use udpbench_core::control::{ClientControl, ServerControl};
use udpbench_core::shutdown::StopFlag;
use udpbench_core::socket::{create_socket, Family};

const CONTROL_PORT: u16 = 18450;

#[test]
fn single_thread_loopback_handshake_and_graceful_shutdown() {
    let server_stop = StopFlag::new();
    let server_socket = create_socket(Family::V4, None, &CONTROL_PORT.to_string())
        .expect("server binds control socket");

    let mut server = ServerControl::new(server_socket, Family::V4, CONTROL_PORT, true, server_stop);
    let server_thread = thread::spawn(move || server.run());

    // Give the server a moment to be ready to receive before the client's
    // first START, since UDP has no retransmission to fall back on.
    thread::sleep(Duration::from_millis(100));

    let client_socket = create_socket(Family::V4, Some("127.0.0.1"), &CONTROL_PORT.to_string())
        .expect("client connects control socket");
    let client_stop = StopFlag::new();

    let mut client = ClientControl::new(
        client_socket,
        1,
        Family::V4,
        "127.0.0.1".to_string(),
        CONTROL_PORT,
        true,
        client_stop.clone(),
    );
    let client_thread = thread::spawn(move || client.run());

    // Long enough for the handshake plus at least two 1s DATA ticks.
    thread::sleep(Duration::from_millis(2500));
    client_stop.set();

    client_thread
        .join()
        .expect("client thread doesn't panic")
        .expect("client control loop exits cleanly");
    server_thread
        .join()
        .expect("server thread doesn't panic")
        .expect("server control loop exits cleanly after STOP");
}
