//! Carbon Server Binary
//!
//! Serves the hellogoodbye schema over TCP.

use std::sync::Arc;

use carbon::hellogoodbye::HelloGoodbyeService;
use carbon::network::Server;
use carbon::{CodecConfig, ServerConfig};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Carbon Server
#[derive(Parser, Debug)]
#[command(name = "carbon-server")]
#[command(about = "Carbon request/reply server for the hellogoodbye schema")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Maximum connections waiting for a worker
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Maximum frame payload in KB
    #[arg(short = 'f', long, default_value = "16384")]
    max_frame_kb: usize,

    /// Maximum struct/container nesting depth
    #[arg(short = 'd', long, default_value = "64")]
    max_depth: usize,

    /// Replace invalid UTF-8 in strings instead of rejecting the request
    #[arg(long)]
    lossy_utf8: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,carbon=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Carbon Server v{}", carbon::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let codec = CodecConfig::default()
        .with_max_depth(args.max_depth)
        .with_strict_utf8(!args.lossy_utf8);

    // Build config from args
    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .workers(args.workers)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_kb * 1024)
        .codec(codec)
        .build();

    let service = Arc::new(HelloGoodbyeService::new(codec));

    let server = match Server::bind(config, service) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
