use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes a process-wide `tracing` subscriber, following the
/// teacher's own CLI entry points (e.g. `relay/src/main.rs`): `fmt`
/// output, `RUST_LOG`-driven filtering with an `info` default.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}
