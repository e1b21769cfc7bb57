//! A [`Session`] that talks JSON over WebSocket to a local gateway process.
//!
//! The gateway owns the vendor connection. This side only frames the four
//! session operations (start, open service, send request, stop) as JSON text
//! messages and turns the gateway's event frames back into [`Event`]s, which a
//! reader task hands to the registered [`EventHandler`].
//!
//! When the socket closes for any reason the reader delivers a final
//! `SessionTerminated` status event, so outstanding requests fail instead of
//! waiting forever.

mod frames;

pub use frames::StartOptions;

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, warn};
use url::Url;

use crate::core::{CorrelationId, Event, EventHandler, RankError, Session, wire::decode_event};
use crate::rank::QueryRequest;
use frames::{ClientFrame, QUERY_OPERATION};

/// How long [`BridgeSession::closed`] waits for the socket to wind down.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Cloneable outbound handle. This is the `&dyn Session` handlers receive.
#[derive(Clone)]
pub struct BridgeSender {
    tx: mpsc::UnboundedSender<ClientFrame>,
    options: StartOptions,
}

impl BridgeSender {
    fn push(&self, frame: ClientFrame) -> Result<(), String> {
        self.tx
            .send(frame)
            .map_err(|_| "bridge connection closed".to_string())
    }
}

impl Session for BridgeSender {
    fn start_async(&self) -> Result<(), RankError> {
        self.push(ClientFrame::Start(self.options.clone()))
            .map_err(RankError::SessionStartup)
    }

    fn open_service_async(&self, service: &str) -> Result<(), RankError> {
        self.push(ClientFrame::OpenService {
            service: service.to_string(),
        })
        .map_err(|reason| RankError::ServiceOpen {
            service: service.to_string(),
            reason,
        })
    }

    fn send_request(
        &self,
        service: &str,
        request: &QueryRequest,
        cid: CorrelationId,
    ) -> Result<(), RankError> {
        self.push(ClientFrame::SendRequest {
            service: service.to_string(),
            operation: QUERY_OPERATION,
            correlation_id: cid,
            request: request.clone(),
        })
        .map_err(RankError::RequestSubmit)
    }

    fn stop(&self) {
        let _ = self.tx.send(ClientFrame::Stop);
    }
}

/// A live connection to the gateway with its reader and writer tasks.
///
/// Dropping it requests a stop.
pub struct BridgeSession {
    sender: BridgeSender,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl BridgeSession {
    /// Connects to `url` and starts delivering gateway events to `handler`.
    ///
    /// The session is not started yet; call [`Session::start_async`].
    pub async fn connect(
        url: &Url,
        options: StartOptions,
        handler: Arc<dyn EventHandler>,
    ) -> Result<Self, RankError> {
        let (ws, _resp) = connect_async(url.as_str()).await?;
        debug!(%url, "bridge connected");
        let (mut write, mut read) = ws.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<ClientFrame>();
        let sender = BridgeSender { tx, options };

        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let stop = matches!(frame, ClientFrame::Stop);
                match serde_json::to_string(&frame) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::text(text)).await {
                            warn!(error = %e, "bridge write failed");
                            break;
                        }
                    }
                    Err(e) => error!(error = %e, "could not encode bridge frame"),
                }
                if stop {
                    break;
                }
            }
            let _ = write.close().await;
        });

        let reader_session = sender.clone();
        let reader = tokio::spawn(async move {
            while let Some(next) = read.next().await {
                match next {
                    Ok(Message::Text(text)) => match decode_event(text.as_str()) {
                        Ok(event) => handler.process_event(&event, &reader_session),
                        Err(e) => warn!(error = %e, "dropping undecodable bridge frame"),
                    },
                    Ok(Message::Close(frame)) => {
                        debug!(?frame, "bridge closed by gateway");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "bridge read failed");
                        break;
                    }
                }
            }
            handler.process_event(&Event::session_terminated(), &reader_session);
        });

        Ok(Self {
            sender,
            reader,
            writer,
        })
    }

    /// The outbound handle, for use outside the handler.
    pub fn sender(&self) -> &BridgeSender {
        &self.sender
    }

    /// Waits for both tasks to finish after a stop, aborting them if the
    /// gateway does not close the socket in time.
    pub async fn closed(&mut self) {
        let finished = tokio::time::timeout(CLOSE_GRACE, async {
            if !self.writer.is_finished() {
                let _ = (&mut self.writer).await;
            }
            if !self.reader.is_finished() {
                let _ = (&mut self.reader).await;
            }
        })
        .await
        .is_ok();

        if !finished {
            debug!("bridge did not close in time; aborting tasks");
            self.writer.abort();
            self.reader.abort();
        }
    }
}

impl Session for BridgeSession {
    fn start_async(&self) -> Result<(), RankError> {
        self.sender.start_async()
    }

    fn open_service_async(&self, service: &str) -> Result<(), RankError> {
        self.sender.open_service_async(service)
    }

    fn send_request(
        &self,
        service: &str,
        request: &QueryRequest,
        cid: CorrelationId,
    ) -> Result<(), RankError> {
        self.sender.send_request(service, request, cid)
    }

    fn stop(&self) {
        self.sender.stop();
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        self.sender.stop();
    }
}
