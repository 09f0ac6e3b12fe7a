use clap::Parser;

/// UDP packets-per-second benchmark: a server (`-s`) waits for workers to
/// connect and reports received-packet counters; a client (`-r HOST`)
/// drives `N` parallel sender flows against it and prints throughput.
#[derive(Parser, Debug)]
#[command(name = "udpbench", about, long_about = None)]
pub struct Args {
    /// Server mode: wait for a client handshake and receive data-plane traffic.
    #[arg(short = 's', long, conflicts_with = "host")]
    pub server: bool,

    /// Client mode: target host to benchmark against.
    #[arg(short = 'r', long = "remote", value_name = "HOST")]
    pub host: Option<String>,

    /// Control-plane UDP port; data-plane flows use PORT+1..PORT+N.
    #[arg(short = 'p', long, default_value_t = 7124)]
    pub port: u16,

    /// Number of parallel worker threads (one UDP flow each).
    #[arg(short = 'n', long = "threads", default_value_t = 1)]
    pub threads: u32,

    /// Client-only: stop after this many seconds.
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Busy-poll instead of waiting for readiness between bursts.
    #[arg(short = 'l', long = "poll")]
    pub polling: bool,

    /// Force IPv4.
    #[arg(short = '4', long = "ipv4", conflicts_with = "force_v6")]
    pub force_v4: bool,

    /// Force IPv6.
    #[arg(short = '6', long = "ipv6")]
    pub force_v6: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("exactly one of -s (server) or -r HOST (client) is required")]
    NoModeSelected,
    #[error("-n/--threads must be at least 1, got {0}")]
    ZeroThreads(u32),
    #[error("-t/--timeout only applies to client mode (-r)")]
    TimeoutWithoutClient,
}

impl Args {
    /// Cross-field validation clap's declarative attributes can't express.
    pub fn validate(&self) -> Result<(), ArgsError> {
        if self.server == self.host.is_some() {
            // Either neither or both were given; `server`/`host` are
            // already mutually exclusive via `conflicts_with`, so this
            // only catches "neither".
            return Err(ArgsError::NoModeSelected);
        }

        if self.threads < 1 {
            return Err(ArgsError::ZeroThreads(self.threads));
        }

        if self.server && self.timeout_secs.is_some() {
            return Err(ArgsError::TimeoutWithoutClient);
        }

        Ok(())
    }

    pub fn family(&self) -> udpbench_core::Family {
        if self.force_v4 {
            udpbench_core::Family::V4
        } else if self.force_v6 {
            udpbench_core::Family::V6
        } else {
            udpbench_core::Family::Unspecified
        }
    }
}
