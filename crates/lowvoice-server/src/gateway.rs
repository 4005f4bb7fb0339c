//! JSON-lines gateway.
//!
//! A chat-platform bridge connects over TCP and exchanges one JSON object
//! per line: a `Request` (an `Event` plus an optional `id`) in, a `Response`
//! (a `Reply` echoing that `id`) out.
//!
//! Requests on one connection are handled concurrently, so a reveal is not
//! stuck behind an inline query waiting on a profile fetch. Responses are
//! written as they complete; the bridge matches them up by `id`. A line
//! that does not decode gets an `error` response without an `id` and the
//! connection stays open.

use std::{net::SocketAddr, sync::Arc};

use lowvoice_core::{Environment, ProfileLookup};
use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinSet,
};

use crate::{
    dispatcher::{Dispatcher, Event, Reply},
    error::ServerError,
};

/// Requests one connection may have in flight before reading pauses.
const MAX_IN_FLIGHT: usize = 64;

/// Inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id chosen by the bridge, echoed in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// The platform event.
    #[serde(flatten)]
    pub event: Event,
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Id of the request this answers; absent for undecodable lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// The reply to deliver.
    #[serde(flatten)]
    pub reply: Reply,
}

/// TCP front for a `Dispatcher`.
pub struct Gateway<E: Environment, L> {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<E, L>>,
}

impl<E, L> Gateway<E, L>
where
    E: Environment,
    L: ProfileLookup + 'static,
{
    /// Bind the listener.
    pub async fn bind(address: &str, dispatcher: Dispatcher<E, L>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, dispatcher: Arc::new(dispatcher) })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Gateway listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        tracing::debug!("New connection: {}", peer);
                        if let Err(e) = handle_connection(stream, dispatcher).await {
                            tracing::error!("Connection error: {}", e);
                        }
                        tracing::debug!("Connection closed: {}", peer);
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}

/// Serve one bridge connection.
///
/// Returns once the bridge has closed its side and every in-flight request
/// has been answered. A fatal dispatcher error drops the connection and
/// aborts whatever is still in flight.
async fn handle_connection<E, L>(
    stream: TcpStream,
    dispatcher: Arc<Dispatcher<E, L>>,
) -> Result<(), ServerError>
where
    E: Environment,
    L: ProfileLookup + 'static,
{
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut in_flight = JoinSet::new();
    let mut reading = true;

    while reading || !in_flight.is_empty() {
        tokio::select! {
            line = lines.next_line(), if reading && in_flight.len() < MAX_IN_FLIGHT => {
                let Some(line) = line? else {
                    reading = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<Request>(&line) {
                    Ok(Request { id, event }) => {
                        let dispatcher = Arc::clone(&dispatcher);
                        in_flight.spawn(async move { (id, dispatcher.handle(event).await) });
                    },
                    Err(e) => {
                        tracing::warn!("Request decode error: {}", e);
                        let reply = Reply::Error { message: e.to_string() };
                        write_response(&mut write, &Response { id: None, reply }).await?;
                    },
                }
            },
            Some(done) = in_flight.join_next() => {
                let (id, reply) = done.map_err(|e| ServerError::Transport(e.to_string()))?;
                write_response(&mut write, &Response { id, reply: reply? }).await?;
            },
        }
    }

    Ok(())
}

async fn write_response<W>(write: &mut W, response: &Response) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = serde_json::to_vec(response)?;
    buf.push(b'\n');
    write.write_all(&buf).await?;
    write.flush().await?;
    Ok(())
}
