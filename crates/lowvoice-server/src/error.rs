//! Server error types.

use std::fmt;

use lowvoice_core::VaultError;

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error
    Config(String),

    /// Transport/network error
    Transport(String),

    /// Gateway framing error
    Codec(String),

    /// Vault failure (fatal)
    Vault(VaultError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Codec(msg) => write!(f, "codec error: {}", msg),
            Self::Vault(err) => write!(f, "vault error: {}", err),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Vault(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VaultError> for ServerError {
    fn from(err: VaultError) -> Self {
        Self::Vault(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_error_is_source() {
        let err = ServerError::from(VaultError::IdSpaceExhausted { attempts: 8 });
        assert_eq!(err.to_string(), "vault error: id space exhausted after 8 attempts");
        assert!(std::error::Error::source(&err).is_some());
    }
}
