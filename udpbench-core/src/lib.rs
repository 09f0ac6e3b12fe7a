//! Concurrent control-plane and data-plane engine for a UDP
//! packets-per-second benchmark.
//!
//! This crate has no opinion on argument parsing, signal registration,
//! or address resolution policy beyond what's needed to open a socket.
//! Callers (see `udpbench-cli`) hand it a resolved family/host/port and
//! an `Arc<AtomicBool>`-backed [`shutdown::StopFlag`].

pub mod control;
pub mod error;
pub mod io;
pub mod pool;
pub mod protocol;
pub mod shutdown;
pub mod socket;
pub mod stats;
pub mod worker;

pub use control::{ClientControl, ServerControl};
pub use error::CoreError;
pub use pool::WorkerPool;
pub use shutdown::StopFlag;
pub use socket::Family;
pub use worker::Mode;
