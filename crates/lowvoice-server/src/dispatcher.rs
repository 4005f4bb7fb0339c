//! Request Dispatcher
//!
//! Translates platform events into vault operations and renders the
//! outcome as a reply for the platform bridge to deliver.
//!
//! ## Events
//!
//! - Inline query `@RECIPIENT message`: create a whisper, answer with two
//!   postable articles (with and without a Save deep link)
//! - Button callback `REVEAL|id` / `EXPIRE|id`: reveal as an alert, or expire
//! - Start command, optionally with `SAVE_id`: welcome text, or re-post the
//!   whisper into the requester's private chat
//!
//! ## Design
//!
//! - No I/O: `handle` returns a `Reply`, the gateway delivers it
//! - Only fatal vault errors escape; every recoverable outcome becomes text
//! - `Denied` variants are logged, never rendered differently

use lowvoice_core::{
    Actor, Denied, Environment, Handle, Identity, IdentityResolver, ProfileLookup, Vault,
    VaultConfig, WhisperId,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServerError,
    payload::{Callback, CallbackAction, DeepLink, PayloadError},
    render,
};

/// Cache hint for successful inline answers (seconds).
const INLINE_CACHE_SECS: u32 = 3;
/// Cache hint for inline error articles (seconds).
const INLINE_ERROR_CACHE_SECS: u32 = 3600;
/// Cache hint for reveal alerts (seconds).
const REVEAL_CACHE_SECS: u32 = 30;
/// Cache hint for callback errors and expire confirmations (seconds).
const CALLBACK_CACHE_SECS: u32 = 1800;

/// Incoming platform event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// User typed `@bot ...` in a chat.
    InlineQuery {
        /// Who is typing.
        from: Identity,
        /// Everything after the bot mention.
        query: String,
    },
    /// User pressed a button on a posted whisper.
    Callback {
        /// Who pressed it.
        from: Actor,
        /// Opaque button payload.
        data: String,
    },
    /// User sent `/start`, possibly through a deep link.
    Start {
        /// Who started the bot.
        from: Actor,
        /// Deep-link parameter, if any.
        payload: Option<String>,
    },
    /// Liveness probe.
    Ping,
}

/// Button attached to an article or message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Button {
    /// Sends `data` back as a callback.
    Callback {
        /// Button text.
        label: String,
        /// Callback payload.
        data: String,
    },
    /// Opens a URL.
    Url {
        /// Button text.
        label: String,
        /// Target.
        url: String,
    },
    /// Starts an inline query in the current chat.
    SwitchInline {
        /// Button text.
        label: String,
        /// Pre-filled query.
        query: String,
    },
}

/// One inline query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Result id, unique per answer.
    pub id: String,
    /// Title shown in the result list.
    pub title: String,
    /// Text posted when chosen.
    pub text: String,
    /// Buttons under the posted text (one row).
    pub buttons: Vec<Button>,
}

/// Outgoing reply for the platform bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Answer to an inline query.
    InlineAnswer {
        /// Results to offer.
        articles: Vec<Article>,
        /// How long the platform may cache the answer.
        cache_time_secs: u32,
        /// Whether the answer is specific to the querying user.
        personal: bool,
    },
    /// Answer to a button callback.
    CallbackAnswer {
        /// Text to show.
        text: String,
        /// Modal alert instead of a toast.
        show_alert: bool,
        /// How long the platform may cache the answer.
        cache_time_secs: u32,
    },
    /// Message into the requester's chat.
    Message {
        /// Text to send.
        text: String,
        /// Buttons under the message.
        buttons: Vec<Button>,
    },
    /// Gateway-level failure (malformed frame).
    Error {
        /// What went wrong.
        message: String,
    },
}

impl Reply {
    fn callback(text: impl Into<String>, show_alert: bool, cache_time_secs: u32) -> Self {
        Self::CallbackAnswer { text: text.into(), show_alert, cache_time_secs }
    }

    fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into(), buttons: Vec::new() }
    }

    fn inline_error(id: &str, title: &str, text: String) -> Self {
        Self::InlineAnswer {
            articles: vec![Article {
                id: id.to_string(),
                title: title.to_string(),
                text,
                buttons: Vec::new(),
            }],
            cache_time_secs: INLINE_ERROR_CACHE_SECS,
            personal: false,
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Bot's own handle.
    pub bot_username: String,
    /// Lifetime of new whispers.
    pub vault: VaultConfig,
}

/// Routes events to the vault and resolver.
pub struct Dispatcher<E: Environment, L> {
    vault: Vault<E>,
    resolver: IdentityResolver<L>,
    config: DispatchConfig,
}

impl<E, L> Dispatcher<E, L>
where
    E: Environment,
    L: ProfileLookup,
{
    /// Create a dispatcher over `vault` and `resolver`.
    pub fn new(vault: Vault<E>, resolver: IdentityResolver<L>, config: DispatchConfig) -> Self {
        Self { vault, resolver, config }
    }

    /// The underlying vault.
    pub fn vault(&self) -> &Vault<E> {
        &self.vault
    }

    /// Process an event and return the reply to deliver.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Vault` only for fatal vault failures.
    pub async fn handle(&self, event: Event) -> Result<Reply, ServerError> {
        match event {
            Event::InlineQuery { from, query } => self.handle_inline(from, &query).await,
            Event::Callback { from, data } => Ok(self.handle_callback(&from, &data)),
            Event::Start { from, payload } => Ok(self.handle_start(&from, payload.as_deref())),
            Event::Ping => Ok(Reply::message(render::PONG)),
        }
    }

    async fn handle_inline(&self, from: Identity, query: &str) -> Result<Reply, ServerError> {
        let bot = &self.config.bot_username;
        let query = query.trim_start();
        if query.is_empty() {
            return Ok(Reply::inline_error("EMPTY_ARG", render::USAGE_TITLE, render::usage(bot)));
        }

        let Some((recipient, content)) = query
            .split_once(char::is_whitespace)
            .map(|(r, c)| (r, c.trim_start()))
            .filter(|(_, c)| !c.is_empty())
        else {
            return Ok(Reply::inline_error(
                "USAGE_ERROR",
                render::USAGE_ERROR_TITLE,
                render::usage_error(bot),
            ));
        };

        let invalid = || {
            Reply::inline_error(
                "INVALID_USERNAME",
                render::INVALID_USERNAME,
                render::INVALID_USERNAME.to_string(),
            )
        };
        let Ok(recipient) = Handle::parse(recipient) else {
            return Ok(invalid());
        };
        let Some(recipient_name) = self.resolver.resolve(&recipient).await else {
            return Ok(invalid());
        };

        let sender = render::mention(&from);
        let ttl = self.config.vault.ttl;
        let id = self.vault.create(from, recipient.clone(), content.to_string(), ttl)?;
        tracing::info!(
            whisper = %id,
            "From {} to {} (@{}): WHISPER_REDACTED",
            sender,
            recipient_name,
            recipient
        );

        let minutes = self.config.vault.ttl_minutes();
        let text = render::notice(&recipient_name, recipient.as_str(), minutes);
        let reveal = Button::Callback {
            label: render::REVEAL_BUTTON.to_string(),
            data: Callback::new(CallbackAction::Reveal, id.clone()).to_string(),
        };
        let expire = Button::Callback {
            label: render::EXPIRE_BUTTON.to_string(),
            data: Callback::new(CallbackAction::Expire, id.clone()).to_string(),
        };
        let save = Button::Url {
            label: render::SAVE_BUTTON.to_string(),
            url: render::save_url(bot, &DeepLink::Save(id.clone()).to_string()),
        };

        Ok(Reply::InlineAnswer {
            articles: vec![
                Article {
                    id: format!("{id}-1"),
                    title: render::WITH_SAVE_TITLE.to_string(),
                    text: text.clone(),
                    buttons: vec![reveal.clone(), save, expire.clone()],
                },
                Article {
                    id: format!("{id}-2"),
                    title: render::WITHOUT_SAVE_TITLE.to_string(),
                    text,
                    buttons: vec![reveal, expire],
                },
            ],
            cache_time_secs: INLINE_CACHE_SECS,
            personal: true,
        })
    }

    fn handle_callback(&self, from: &Actor, data: &str) -> Reply {
        let callback = match data.parse::<Callback>() {
            Ok(callback) => callback,
            Err(PayloadError::UnsupportedAction(action)) => {
                tracing::debug!(%action, "unsupported callback action");
                return Reply::callback(render::UNSUPPORTED, false, CALLBACK_CACHE_SECS);
            },
            Err(e) => {
                tracing::debug!(error = %e, "malformed callback payload");
                return Reply::callback(render::MALFORMED, false, CALLBACK_CACHE_SECS);
            },
        };

        match callback.action {
            CallbackAction::Reveal => match self.vault.reveal(&callback.id, from) {
                Ok(record) => Reply::callback(render::revealed(&record), true, REVEAL_CACHE_SECS),
                Err(denied) => Self::denied(&callback.id, from, denied),
            },
            CallbackAction::Expire => match self.vault.expire(&callback.id, from) {
                Ok(()) => Reply::callback(render::EXPIRED_OK, false, CALLBACK_CACHE_SECS),
                Err(denied) => Self::denied(&callback.id, from, denied),
            },
        }
    }

    fn handle_start(&self, from: &Actor, payload: Option<&str>) -> Reply {
        let Some(payload) = payload.filter(|p| !p.is_empty()) else {
            return Reply::Message {
                text: render::WELCOME.to_string(),
                buttons: vec![Button::SwitchInline {
                    label: render::START_BUTTON.to_string(),
                    query: String::new(),
                }],
            };
        };

        let DeepLink::Save(id) = match payload.parse::<DeepLink>() {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!(error = %e, "malformed start payload");
                return Reply::message(render::MALFORMED);
            },
        };

        match self.vault.reveal(&id, from) {
            Ok(record) => Reply::message(render::saved(&record)),
            Err(denied) => {
                tracing::debug!(whisper = %id, actor = %from.id, reason = %denied, "save refused");
                Reply::message(render::DENIED)
            },
        }
    }

    fn denied(id: &WhisperId, from: &Actor, denied: Denied) -> Reply {
        tracing::debug!(whisper = %id, actor = %from.id, reason = %denied, "request refused");
        Reply::callback(render::DENIED, false, CALLBACK_CACHE_SECS)
    }
}

impl<E: Environment, L> std::fmt::Debug for Dispatcher<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("vault", &self.vault)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
