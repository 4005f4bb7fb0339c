//! Low Voice production server.
//!
//! This crate wires the whisper vault to the outside world:
//! - Tokio for the async runtime and expiry timers
//! - `reqwest` for public profile lookups
//! - A JSON-lines TCP gateway for the chat-platform bridge
//!
//! ## Architecture
//!
//! ```text
//! lowvoice-server
//!   ├─ Gateway            (TCP, one JSON request/response per line)
//!   ├─ Dispatcher         (events -> vault ops -> replies)
//!   ├─ HttpProfileLookup  (t.me profile scrape, behind the resolver cache)
//!   └─ SystemEnv          (production Environment impl)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod error;
mod gateway;
pub mod payload;
mod profile;
mod render;
mod system_env;

pub use config::ServerConfig;
pub use dispatcher::{Article, Button, DispatchConfig, Dispatcher, Event, Reply};
pub use error::ServerError;
pub use gateway::{Gateway, Request, Response};
use lowvoice_core::{IdentityResolver, Vault};
pub use profile::{DEFAULT_PROFILE_BASE, HttpProfileLookup};
pub use system_env::SystemEnv;

/// Production Low Voice server.
///
/// Wraps the gateway around a dispatcher built from `ServerConfig`.
pub struct Server {
    gateway: Gateway<SystemEnv, HttpProfileLookup>,
}

impl Server {
    /// Build the vault, resolver and dispatcher, and bind the gateway.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The HTTP client cannot be built
    /// - Binding to the address fails
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let env = SystemEnv::new();
        let vault = Vault::new(env);
        let lookup = HttpProfileLookup::new(&config.profile_base_url)?;
        let resolver = IdentityResolver::new(lookup, config.vault.resolver_capacity);
        let dispatcher = Dispatcher::new(
            vault,
            resolver,
            DispatchConfig { bot_username: config.bot_username, vault: config.vault },
        );

        let gateway = Gateway::bind(&config.bind_address, dispatcher).await?;
        Ok(Self { gateway })
    }

    /// Run the server until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        self.gateway.run().await
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.gateway.local_addr()
    }
}
