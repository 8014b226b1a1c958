//! WebSocket-backed implementation of the voice-gateway client.
//!
//! One connection per call: `start` opens the socket, frames the start
//! request, and spawns a send task (client command frames) and a
//! receive task (event frames fanned out to subscribers). `stop`
//! frames a stop command and tears the connection down.

use super::{CallEvent, ClientError, StartRequest, VoiceClient};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::header::InvalidHeaderValue,
        protocol::Message,
    },
};
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 256;
const COMMAND_CAPACITY: usize = 32;

/// Frames sent from the client to the gateway.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientCommand {
    Start { call: StartRequest },
    Stop,
}

struct ActiveCall {
    generation: u64,
    commands: mpsc::Sender<ClientCommand>,
    send_handle: JoinHandle<()>,
    recv_handle: JoinHandle<()>,
}

/// The one-call-per-client slot. Each call gets a fresh generation so
/// a call's receive task can tell, at teardown, whether it still owns
/// the slot or a newer call has been dialed since.
struct CallSlot {
    generation: u64,
    call: Option<ActiveCall>,
}

impl CallSlot {
    /// Releases a finished call's entry, leaving a newer call's entry
    /// untouched. Returns whether the finished call is still the
    /// latest one dialed; only then may the caller synthesize a
    /// call-end for it.
    fn release(&mut self, generation: u64) -> bool {
        if self
            .call
            .as_ref()
            .is_some_and(|call| call.generation == generation)
        {
            self.call = None;
        }
        self.generation == generation
    }
}

/// The concrete gateway client. Construct through
/// [`crate::client::shared`] for the process-wide instance.
pub struct GatewayClient {
    token: Option<String>,
    url: String,
    events: broadcast::Sender<CallEvent>,
    active: Arc<Mutex<CallSlot>>,
}

impl GatewayClient {
    /// Creates a client. A missing token is tolerated here; starting a
    /// call is what requires one.
    pub fn new(token: Option<String>, url: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            token,
            url,
            events,
            active: Arc::new(Mutex::new(CallSlot {
                generation: 0,
                call: None,
            })),
        }
    }
}

#[async_trait]
impl VoiceClient for GatewayClient {
    async fn start(&self, request: StartRequest) -> Result<(), ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::MissingToken)?;

        let mut slot = self.active.lock().await;
        if slot.call.is_some() {
            return Err(ClientError::CallInProgress);
        }

        let mut ws_request = self.url.as_str().into_client_request()?;
        let auth = format!("Bearer {token}").parse().map_err(
            |e: InvalidHeaderValue| ClientError::Transport(tungstenite::Error::HttpFormat(e.into())),
        )?;
        ws_request.headers_mut().insert("Authorization", auth);

        let (ws_stream, _) = connect_async(ws_request).await?;
        let (mut write, mut read) = ws_stream.split();
        info!("connected to the voice gateway");

        // A failed dial keeps the previous generation, so only calls
        // that actually connect can displace an earlier teardown.
        slot.generation += 1;
        let generation = slot.generation;

        let (cmd_tx, mut cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        cmd_tx
            .send(ClientCommand::Start { call: request })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        let send_handle = tokio::spawn(async move {
            while let Some(command) = cmd_rx.recv().await {
                let stopping = matches!(command, ClientCommand::Stop);
                match serde_json::to_string(&command) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text.into())).await {
                            error!("failed to send gateway frame: {e}");
                            break;
                        }
                    }
                    Err(e) => error!("failed to encode gateway frame: {e}"),
                }
                if stopping {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            }
        });

        let events = self.events.clone();
        let active = Arc::clone(&self.active);
        let recv_handle = tokio::spawn(async move {
            let mut saw_call_end = false;
            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        error!("failed to read gateway frame: {e}");
                        break;
                    }
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<CallEvent>(text.as_str())
                    {
                        Ok(event) => {
                            let ended = matches!(event, CallEvent::CallEnd);
                            if events.send(event).is_err() {
                                debug!("gateway event dropped: no subscribers");
                            }
                            if ended {
                                saw_call_end = true;
                                break;
                            }
                        }
                        Err(e) => warn!("unrecognized gateway frame: {e}"),
                    },
                    Message::Close(reason) => {
                        info!("gateway closed the connection: {reason:?}");
                        break;
                    }
                    _ => {}
                }
            }
            let mut slot = active.lock().await;
            let current = slot.release(generation);
            if current && !saw_call_end {
                // The connection ended without a call-end frame;
                // synthesize one so subscribers still see the call end.
                // Skipped when a newer call has been dialed since, so a
                // stale teardown cannot end the new call.
                let _ = events.send(CallEvent::CallEnd);
            }
        });

        slot.call = Some(ActiveCall {
            generation,
            commands: cmd_tx,
            send_handle,
            recv_handle,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ClientError> {
        let mut slot = self.active.lock().await;
        let Some(call) = slot.call.take() else {
            debug!("stop requested with no active call");
            return Ok(());
        };
        if call.commands.send(ClientCommand::Stop).await.is_err() {
            // The send task is already gone; tear down whatever is left.
            call.send_handle.abort();
            call.recv_handle.abort();
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }
}
