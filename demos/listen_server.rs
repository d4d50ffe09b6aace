//! Live imaging server
//!
//! Run with: cargo run --example listen_server [BIND_ADDR] [STREAM_URL]
//!
//! Examples:
//!   cargo run --example listen_server                      # binds to 0.0.0.0:5000
//!   cargo run --example listen_server 127.0.0.1:5001
//!   cargo run --example listen_server 0.0.0.0:5000 rtmp://a.rtmp.youtube.com/live2/SECRET
//!
//! Point the correlator at the bind address; artifacts land in the
//! current directory, and the optional second argument enables live
//! streaming through ffmpeg.

use std::net::SocketAddr;

use allsky_rs::{ServerConfig, VisServer};

fn print_usage() {
    eprintln!("Usage: listen_server [BIND_ADDR] [STREAM_URL]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:5000)");
    eprintln!("  STREAM_URL   Optional RTMP destination for the live stream");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr: SocketAddr = match args.get(1) {
        Some(addr) => match addr.parse() {
            Ok(addr) => addr,
            Err(_) => {
                eprintln!("Error: invalid bind address '{addr}'");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:5000".parse()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("allsky_rs=debug".parse()?),
        )
        .init();

    let mut config = ServerConfig::default().bind(bind_addr);
    if let Some(url) = args.get(2) {
        config = config.stream_destination(url.clone());
    }

    println!("Starting visibility server on {bind_addr}");

    let server = VisServer::new(config);
    let stats = server.stats();

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
            println!("{:?}", stats.snapshot());
        }
    }

    Ok(())
}
