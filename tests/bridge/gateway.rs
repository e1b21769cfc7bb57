//! A scripted stand-in for the bridge gateway.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// One partial response and one final response, one record each.
    Report,
    /// A final ErrorInfo response.
    ErrorInfo,
    /// Refuse to open the service.
    ServiceFails,
    /// Drop the socket as soon as the request arrives.
    DropAfterRequest,
    /// Drop the socket right after the handshake.
    HangUp,
}

async fn send(ws: &mut WebSocketStream<TcpStream>, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

fn status(event_type: &str, message_type: &str, elements: Value) -> Value {
    json!({
        "eventType": event_type,
        "messages": [{"messageType": message_type, "elements": elements}]
    })
}

fn record(acronym: &str, bought: f64) -> Value {
    json!({
        "broker": {"acronym": acronym},
        "bought": bought, "crossed": 0.0, "highTouch": 0.0, "lowTouch": bought,
        "numReports": 1, "sold": 0.0, "total": bought, "traded": bought
    })
}

/// Listens on an ephemeral port and plays `script` for one client.
/// The handle yields every frame the client sent.
pub async fn spawn(script: Script) -> (u16, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut seen = Vec::new();
        if script == Script::HangUp {
            return seen;
        }

        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else {
                continue;
            };
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            seen.push(frame.clone());

            match frame["op"].as_str().unwrap_or_default() {
                "start" => {
                    send(&mut ws, status("SESSION_STATUS", "SessionStarted", Value::Null)).await;
                }
                "openService" if script == Script::ServiceFails => {
                    let reason = json!({"reason": {"description": "Service not found"}});
                    send(&mut ws, status("SERVICE_STATUS", "ServiceOpenFailure", reason)).await;
                }
                "openService" => {
                    send(&mut ws, status("SERVICE_STATUS", "ServiceOpened", Value::Null)).await;
                }
                "sendRequest" => {
                    let cid = frame["correlationId"].clone();
                    match script {
                        Script::DropAfterRequest => break,
                        Script::ErrorInfo => {
                            send(&mut ws, json!({
                                "eventType": "RESPONSE",
                                "messages": [{
                                    "messageType": "ErrorInfo",
                                    "correlationIds": [cid],
                                    "elements": {"errorCode": 418, "errorMessage": "rate limited"}
                                }]
                            }))
                            .await;
                        }
                        _ => {
                            for (event_type, acronym) in
                                [("PARTIAL_RESPONSE", "BCAP"), ("RESPONSE", "GSCO")]
                            {
                                send(&mut ws, json!({
                                    "eventType": event_type,
                                    "messages": [{
                                        "messageType": "Report",
                                        "correlationIds": [cid],
                                        "elements": {"records": [record(acronym, 100.0)]}
                                    }]
                                }))
                                .await;
                            }
                        }
                    }
                }
                "stop" => {
                    let _ = ws.close(None).await;
                }
                _ => {}
            }
        }
        seen
    });

    (port, handle)
}
