//! The 24-byte, big-endian control-plane frame.
//!
//! Layout (all fields `u32`, network byte order):
//! `cmd | threads | seq_lo | seq_hi | recv_lo | recv_hi`.

/// Size of a control frame on the wire. Anything else is not a frame.
pub const FRAME_LEN: usize = 24;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Command {
    Start = 1,
    Ack = 2,
    Stop = 3,
    Data = 4,
}

impl Command {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Command::Start),
            2 => Some(Command::Ack),
            3 => Some(Command::Stop),
            4 => Some(Command::Data),
            _ => None,
        }
    }
}

/// A decoded control-plane frame. Fields not meaningful for a given
/// `cmd` are always zero, both in memory and on the wire.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ControlFrame {
    pub cmd: Command,
    pub threads: u32,
    pub last_seq: u64,
    pub packets_received: u64,
}

impl ControlFrame {
    pub fn start(threads: u32) -> Self {
        ControlFrame {
            cmd: Command::Start,
            threads,
            last_seq: 0,
            packets_received: 0,
        }
    }

    pub fn ack() -> Self {
        ControlFrame {
            cmd: Command::Ack,
            threads: 0,
            last_seq: 0,
            packets_received: 0,
        }
    }

    pub fn stop() -> Self {
        ControlFrame {
            cmd: Command::Stop,
            threads: 0,
            last_seq: 0,
            packets_received: 0,
        }
    }

    pub fn data(last_seq: u64, packets_received: u64) -> Self {
        ControlFrame {
            cmd: Command::Data,
            threads: 0,
            last_seq,
            packets_received,
        }
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0..4].copy_from_slice(&(self.cmd as u32).to_be_bytes());
        buf[4..8].copy_from_slice(&self.threads.to_be_bytes());
        buf[8..12].copy_from_slice(&((self.last_seq >> 32) as u32).to_be_bytes());
        buf[12..16].copy_from_slice(&(self.last_seq as u32).to_be_bytes());
        buf[16..20].copy_from_slice(&((self.packets_received >> 32) as u32).to_be_bytes());
        buf[20..24].copy_from_slice(&(self.packets_received as u32).to_be_bytes());
        buf
    }

    /// Decodes a datagram. Returns `None` for anything that isn't exactly
    /// `FRAME_LEN` bytes or doesn't carry a recognised command. Both cases
    /// are dropped silently by the caller, never surfaced as an error.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != FRAME_LEN {
            return None;
        }

        let read_u32 = |off: usize| -> u32 {
            u32::from_be_bytes(buf[off..off + 4].try_into().expect("4-byte slice"))
        };

        let cmd = Command::from_u32(read_u32(0))?;
        let threads = read_u32(4);
        let seq_hi = read_u32(8) as u64;
        let seq_lo = read_u32(12) as u64;
        let recv_hi = read_u32(16) as u64;
        let recv_lo = read_u32(20) as u64;

        Some(ControlFrame {
            cmd,
            threads,
            last_seq: (seq_hi << 32) | seq_lo,
            packets_received: (recv_hi << 32) | recv_lo,
        })
    }
}
