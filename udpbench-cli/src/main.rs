mod cli;
mod logging;
mod signals;

use anyhow::{Context, Result};
use clap::Parser;

use udpbench_core::control::{ClientControl, ServerControl};
use udpbench_core::shutdown::StopFlag;
use udpbench_core::socket::create_socket;

fn main() -> Result<()> {
    logging::init();

    let args = cli::Args::parse();
    args.validate().context("invalid arguments")?;

    let stop = StopFlag::new();
    signals::register(&stop).context("failed to register signal handlers")?;

    if args.server {
        run_server(&args, stop)
    } else {
        run_client(&args, stop)
    }
}

fn run_server(args: &cli::Args, stop: StopFlag) -> Result<()> {
    let family = args.family();
    let socket = create_socket(family, None, &args.port.to_string())
        .with_context(|| format!("failed to bind control socket on port {}", args.port))?;

    tracing::info!(port = args.port, "listening for a client handshake");

    let mut server = ServerControl::new(socket, family, args.port, args.polling, stop);
    server.run().context("server control loop failed")?;

    Ok(())
}

fn run_client(args: &cli::Args, stop: StopFlag) -> Result<()> {
    let family = args.family();
    let host = args
        .host
        .clone()
        .expect("validate() guarantees host is set in client mode");

    let socket = create_socket(family, Some(&host), &args.port.to_string())
        .with_context(|| format!("failed to connect control socket to {host}:{}", args.port))?;

    if let Some(secs) = args.timeout_secs {
        signals::arm_timeout(stop.clone(), std::time::Duration::from_secs(secs));
    }

    let mut client = ClientControl::new(
        socket,
        args.threads as usize,
        family,
        host,
        args.port,
        args.polling,
        stop,
    );
    client.run().context("client control loop failed")?;

    Ok(())
}
