//! Recorded-stream playback
//!
//! Run with: cargo run --example replay_file <RECORDING> [MEDIA_ROOT]
//!
//! Replays a recorded visibility stream through the full pipeline and
//! exits once every frame has been imaged and archived.

use allsky_rs::{ServerConfig, VisServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let Some(recording) = args.get(1) else {
        eprintln!("Usage: replay_file <RECORDING> [MEDIA_ROOT]");
        std::process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("allsky_rs=info".parse()?),
        )
        .init();

    let mut config = ServerConfig::default();
    if let Some(root) = args.get(2) {
        config = config.media_root(root);
    }

    let server = VisServer::new(config);
    server.run_file(recording).await?;

    println!("{:?}", server.stats().snapshot());
    Ok(())
}
