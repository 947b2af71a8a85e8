//! Carbon CLI Client
//!
//! Command-line interface for talking to a Carbon server.

use carbon::hellogoodbye::{GoodbyeRequest, HelloRequest};
use carbon::network::Client;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// Carbon CLI
#[derive(Parser, Debug)]
#[command(name = "carbon-cli")]
#[command(about = "CLI for the Carbon hellogoodbye service")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Say hello for a key
    Hello {
        /// The key to greet
        key: String,

        /// Shard the key lives on
        #[arg(long, default_value = "0")]
        shard: i32,
    },

    /// Say goodbye for a key
    Goodbye {
        /// The key to part with
        key: String,

        /// Shard the key lives on
        #[arg(long, default_value = "0")]
        shard: i32,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Commands::Hello { key, shard } => client
            .call(&HelloRequest::new(key, shard))
            .map(|reply| format!("{:?}", reply.result)),
        Commands::Goodbye { key, shard } => client
            .call(&GoodbyeRequest::new(key, shard))
            .map(|reply| format!("{:?}: {}", reply.result, reply.message)),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
