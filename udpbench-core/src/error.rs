use std::io;

/// Errors that can abort a benchmark run before any data-plane packet is sent.
///
/// Transient per-packet failures (would-block, short reads/writes, a
/// malformed control datagram) never reach this type. They are handled
/// in place by the worker and control-plane loops.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to resolve {host:?}:{service}: {source}")]
    Resolve {
        host: Option<String>,
        service: String,
        #[source]
        source: io::Error,
    },

    #[error("could not create socket for {host:?}:{service}: no candidate address succeeded")]
    NoCandidateAddress {
        host: Option<String>,
        service: String,
    },

    #[error("socket operation failed")]
    Socket(#[from] io::Error),

    #[error("failed to spawn worker thread {index}: {source}")]
    SpawnWorker {
        index: usize,
        #[source]
        source: io::Error,
    },
}
