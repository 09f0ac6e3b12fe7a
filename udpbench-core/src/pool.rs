//! The worker pool: owns `N` data sockets and `N` OS threads, one flow
//! per thread on `base_port + 1 + i`.

use std::net::UdpSocket;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::CoreError;
use crate::shutdown::StopFlag;
use crate::socket::{create_socket, Family};
use crate::stats;
use crate::worker::{self, Mode, WorkerCounters};

struct WorkerHandle {
    join: JoinHandle<()>,
    counters: Arc<WorkerCounters>,
}

/// Scoped resource: owns every data socket and worker thread it spawned.
/// Dropping it (on any exit path, including an unwind) sets the stop flag
/// and joins every worker, so sockets are always closed by their owning
/// thread.
pub struct WorkerPool {
    handles: Vec<WorkerHandle>,
    stop: StopFlag,
}

impl WorkerPool {
    /// Spawns `n_threads` workers, one data socket each, on consecutive
    /// ports starting at `base_port + 1`. On any socket-creation or
    /// spawn failure, every worker started so far is stopped and joined
    /// before the error is returned, so the caller sees either a fully
    /// running pool or none at all.
    pub fn start(
        mode: Mode,
        n_threads: usize,
        family: Family,
        host: Option<&str>,
        base_port: u16,
        polling: bool,
        stop: StopFlag,
    ) -> Result<WorkerPool, CoreError> {
        let mut pool = WorkerPool {
            handles: Vec::with_capacity(n_threads),
            stop: stop.clone(),
        };

        for i in 0..n_threads {
            match spawn_one(mode, i, n_threads, family, host, base_port, polling, &stop) {
                Ok(handle) => pool.handles.push(handle),
                Err(err) => {
                    pool.join_all();
                    return Err(err);
                }
            }
        }

        Ok(pool)
    }

    /// `(packets_total, max_last_seq)` across every worker still owned
    /// by this pool.
    pub fn stats(&self) -> (u64, u64) {
        let counters: Vec<Arc<WorkerCounters>> =
            self.handles.iter().map(|h| h.counters.clone()).collect();
        stats::aggregate(&counters)
    }

    /// Signals shutdown and joins every worker. Idempotent: a second
    /// call finds an empty handle list and is a no-op.
    pub fn join_all(&mut self) {
        self.stop.set();
        for handle in self.handles.drain(..) {
            let _ = handle.join.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_one(
    mode: Mode,
    index: usize,
    n_threads: usize,
    family: Family,
    host: Option<&str>,
    base_port: u16,
    polling: bool,
    stop: &StopFlag,
) -> Result<WorkerHandle, CoreError> {
    let data_port = base_port + 1 + index as u16;
    let socket: UdpSocket = create_socket(family, host, &data_port.to_string())?;
    let counters = Arc::new(WorkerCounters::new());
    let worker_stop = stop.clone();
    let worker_counters = counters.clone();

    let join = thread::Builder::new()
        .name(format!("udpbench-worker-{index}"))
        .spawn(move || worker::run(mode, socket, index, n_threads, polling, worker_stop, worker_counters))
        .map_err(|source| CoreError::SpawnWorker { index, source })?;

    Ok(WorkerHandle { join, counters })
}
