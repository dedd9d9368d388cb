//! WebSocket connection handlers.
//!
//! One socket is one participant. The socket is upgraded only after the
//! room has been found, so a bad link is reported as a plain HTTP error.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomEvent, RoomId, Username},
    infrastructure::dto::{
        conversion::encode_event,
        event::ClientAction,
        http::StreamQuery,
    },
    ui::state::AppState,
    usecase::RelayError,
};

use super::connection_id_or_generate;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id = query
        .room_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| RelayError::InvalidInput("roomId is required".to_string()))?;
    let room = state.get_room_info_usecase.execute(&room_id).await?;
    let connection_id = connection_id_or_generate(query.user_id)?;
    let username = Username::from_optional(query.username)?;

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, state, room.id, connection_id, username)
    }))
}

/// Spawns a task that forwards events from the delivery channel to the socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_id: RoomId,
    connection_id: ConnectionId,
    username: Username,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // connected は参加処理より前に必ず届ける
    push_local(
        &tx,
        &RoomEvent::Connected {
            connection_id: connection_id.clone(),
        },
    );

    if let Err(e) = state
        .join_room_usecase
        .execute(room_id.clone(), connection_id.clone(), username, tx.clone())
        .await
    {
        tracing::warn!("Join of '{}' to room '{}' failed: {}", connection_id, room_id, e);
        push_local(&tx, &RoomEvent::Error { message: e.to_string() });
        drop(tx);
        let mut rx = rx;
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
        return;
    }
    drop(tx);

    let state_for_recv = state.clone();
    let room_for_recv = room_id.clone();
    let connection_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
            };

            match frame {
                Message::Text(text) => {
                    let action = match serde_json::from_str::<ClientAction>(&text) {
                        Ok(action) => action,
                        Err(e) => {
                            tracing::warn!("Unparseable frame from '{}': {}", connection_for_recv, e);
                            report_error(
                                &state_for_recv,
                                &room_for_recv,
                                &connection_for_recv,
                                "Invalid message format".to_string(),
                            )
                            .await;
                            continue;
                        }
                    };
                    if matches!(action, ClientAction::Leave) {
                        tracing::debug!("'{}' asked to leave", connection_for_recv);
                        break;
                    }
                    if let Err(e) =
                        dispatch(&state_for_recv, &room_for_recv, &connection_for_recv, action)
                            .await
                    {
                        report_error(
                            &state_for_recv,
                            &room_for_recv,
                            &connection_for_recv,
                            e.to_string(),
                        )
                        .await;
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("'{}' closed the socket", connection_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state
        .leave_room_usecase
        .execute(&room_id, &connection_id)
        .await
    {
        tracing::debug!("Leave of '{}' after disconnect: {}", connection_id, e);
    }
}

async fn dispatch(
    state: &AppState,
    room_id: &RoomId,
    connection_id: &ConnectionId,
    action: ClientAction,
) -> Result<(), RelayError> {
    match action {
        ClientAction::SendMessage {
            message,
            message_id,
        } => {
            state
                .send_message_usecase
                .execute(room_id, connection_id, message, message_id)
                .await?;
        }
        ClientAction::Typing { typing } => {
            state
                .typing_usecase
                .execute(room_id, connection_id, typing)
                .await?;
        }
        ClientAction::TypingStart => {
            state
                .typing_usecase
                .execute(room_id, connection_id, true)
                .await?;
        }
        ClientAction::TypingStop => {
            state
                .typing_usecase
                .execute(room_id, connection_id, false)
                .await?;
        }
        ClientAction::Leave => {}
    }
    Ok(())
}

async fn report_error(
    state: &AppState,
    room_id: &RoomId,
    connection_id: &ConnectionId,
    message: String,
) {
    let event = RoomEvent::Error { message };
    if let Err(e) = state
        .message_pusher
        .push_to(room_id, connection_id, &event)
        .await
    {
        tracing::debug!("Could not report error to '{}': {}", connection_id, e);
    }
}

fn push_local(tx: &mpsc::UnboundedSender<String>, event: &RoomEvent) {
    match encode_event(event) {
        Ok(payload) => {
            let _ = tx.send(payload);
        }
        Err(e) => tracing::error!("Failed to encode {} event: {}", event.kind(), e),
    }
}
