use anyhow::{Context, Result};
use udpbench_core::StopFlag;

/// Maps interrupt, terminate, quit, hangup, and alarm to `flag.set()`, so
/// any of them triggers a graceful shutdown instead of an abrupt exit.
pub fn register(flag: &StopFlag) -> Result<()> {
    let raw = flag.raw();

    for signal in [
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGQUIT,
        signal_hook::consts::SIGHUP,
        signal_hook::consts::SIGALRM,
    ] {
        signal_hook::flag::register(signal, raw.clone())
            .with_context(|| format!("failed to register handler for signal {signal}"))?;
    }

    Ok(())
}

/// Arms the client's one-shot `-t SECS` shutdown timer: after `duration`
/// elapses, sets the flag exactly once and exits.
pub fn arm_timeout(flag: StopFlag, duration: std::time::Duration) {
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        flag.set();
    });
}
