use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pantau::capture::{self, CaptureConfig, RawCapture, MAX_INTERFACE_NAME_LEN};
use pantau::listener::FrameListener;

#[derive(Parser)]
#[command(name = "pantau")]
#[command(about = "Captures raw frames on an interface and prints their Ethernet headers")]
struct Args {
    /// Network interface to capture on (e.g., eth0)
    interface: Option<String>,

    /// Enable promiscuous mode on the interface
    #[arg(short, long)]
    promiscuous: bool,

    /// Capture only IPv4 frames
    #[arg(long)]
    ip_only: bool,

    /// List available network interfaces and exit
    #[arg(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if args.list {
        for line in capture::list_interfaces() {
            println!("{}", line);
        }
        return ExitCode::SUCCESS;
    }

    let Some(interface) = args.interface else {
        eprintln!("usage: pantau <interface>");
        return ExitCode::FAILURE;
    };

    match run(&interface, args.promiscuous, args.ip_only) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(interface: &str, promiscuous: bool, ip_only: bool) -> Result<()> {
    if interface.len() > MAX_INTERFACE_NAME_LEN {
        tracing::warn!(
            "interface name '{}' exceeds {} bytes and will be truncated",
            interface,
            MAX_INTERFACE_NAME_LEN
        );
    }

    let config = CaptureConfig::new(interface)
        .with_promiscuous(promiscuous)
        .with_ip_only(ip_only);
    let mut source = RawCapture::open(&config)
        .with_context(|| format!("failed to open capture on '{}'", interface))?;
    tracing::info!(
        "capturing on {} (ifindex {}, protocol 0x{:04X})",
        source.interface_name(),
        source.ifindex(),
        source.protocol()
    );

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut listener = FrameListener::new(running);
    listener.run(&mut source, &mut out)?;

    tracing::info!("capture stopped");
    Ok(())
}
