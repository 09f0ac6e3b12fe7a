//! A malformed control datagram must be dropped without disturbing state.

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use udpbench_core::control::{ClientControl, ServerControl};
use udpbench_core::shutdown::StopFlag;
use udpbench_core::socket::{create_socket, Family};

const CONTROL_PORT: u16 = 18460;

#[test]
fn garbage_datagram_before_start_is_dropped_and_handshake_still_succeeds() {
    let server_stop = StopFlag::new();
    let server_socket = create_socket(Family::V4, None, &CONTROL_PORT.to_string())
        .expect("server binds control socket");

    let mut server = ServerControl::new(server_socket, Family::V4, CONTROL_PORT, true, server_stop);
    let server_thread = thread::spawn(move || server.run());

    thread::sleep(Duration::from_millis(100));

    // A 10-byte datagram is neither a valid frame length nor decodable;
    // the server must silently discard it and remain ready for a real
    // START from the eventual client.
    let prober = UdpSocket::bind("127.0.0.1:0").unwrap();
    prober
        .send_to(&[0u8; 10], ("127.0.0.1", CONTROL_PORT))
        .unwrap();

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

    // Enough time for START/ACK to complete even though a bogus datagram
    // arrived first.
    thread::sleep(Duration::from_millis(800));
    client_stop.set();

    client_thread.join().unwrap().expect("client exits cleanly");
    server_thread.join().unwrap().expect("server exits cleanly");
}
