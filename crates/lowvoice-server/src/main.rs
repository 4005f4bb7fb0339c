//! Low Voice server binary.
//!
//! # Usage
//!
//! ```bash
//! # Local bridge on the default port
//! lowvoice-server --bot-username LowVoiceBot
//!
//! # Shorter whispers, bigger resolver cache
//! lowvoice-server --bind 0.0.0.0:7070 --ttl-secs 600 --resolver-capacity 4096
//! ```

use std::{num::NonZeroUsize, time::Duration};

use clap::Parser;
use lowvoice_core::{MAX_TTL, VaultConfig};
use lowvoice_server::{DEFAULT_PROFILE_BASE, Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const MAX_TTL_SECS: u64 = MAX_TTL.as_secs();

/// Low Voice whisper server
#[derive(Parser, Debug)]
#[command(name = "lowvoice-server")]
#[command(about = "Private messages in public chats, gone on a timer")]
#[command(version)]
struct Args {
    /// Gateway address to bind to
    #[arg(short, long, env = "LOWVOICE_BIND", default_value = "127.0.0.1:7070")]
    bind: String,

    /// The bot's own handle (no leading @)
    #[arg(long, env = "LOWVOICE_BOT_USERNAME", default_value = "LowVoiceBot")]
    bot_username: String,

    /// Whisper lifetime in seconds (at most one week)
    #[arg(
        long,
        env = "LOWVOICE_TTL_SECS",
        default_value = "1800",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS)
    )]
    ttl_secs: u64,

    /// Number of handles the resolver cache remembers
    #[arg(long, env = "LOWVOICE_RESOLVER_CAPACITY", default_value = "1024")]
    resolver_capacity: NonZeroUsize,

    /// Base URL for public profile pages
    #[arg(long, env = "LOWVOICE_PROFILE_BASE", default_value = DEFAULT_PROFILE_BASE)]
    profile_base: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Low Voice server starting");
    tracing::info!("Whisper TTL {}s, resolver cache {}", args.ttl_secs, args.resolver_capacity);

    let config = ServerConfig {
        bind_address: args.bind,
        bot_username: args.bot_username.trim_start_matches('@').to_string(),
        profile_base_url: args.profile_base,
        vault: VaultConfig {
            ttl: Duration::from_secs(args.ttl_secs),
            resolver_capacity: args.resolver_capacity,
        },
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
