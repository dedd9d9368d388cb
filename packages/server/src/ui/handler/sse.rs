//! Server-sent events stream.
//!
//! The stream is the participant: opening it joins the room and dropping
//! it (client gone or server shutdown) leaves. Sends and typing go through
//! the separate HTTP endpoints.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomEvent, RoomId, Username},
    infrastructure::dto::{conversion::encode_event, http::StreamQuery},
    ui::state::AppState,
    usecase::RelayError,
};

use super::{connection_id_or_generate, room_id_from_path};

pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, RelayError> {
    let room_id = room_id_from_path(room_id)?;
    let connection_id = connection_id_or_generate(query.user_id)?;
    let username = Username::from_optional(query.username)?;

    let (tx, rx) = mpsc::unbounded_channel();
    match encode_event(&RoomEvent::Connected {
        connection_id: connection_id.clone(),
    }) {
        Ok(payload) => {
            let _ = tx.send(payload);
        }
        Err(e) => tracing::error!("Failed to encode connected event: {}", e),
    }

    state
        .join_room_usecase
        .execute(room_id.clone(), connection_id.clone(), username, tx)
        .await?;

    let guard = LeaveOnDrop {
        state,
        room_id,
        connection_id,
    };
    let events = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let payload = rx.recv().await?;
        Some((Ok(Event::default().data(payload)), (rx, guard)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Leaves the room when the event stream goes away.
struct LeaveOnDrop {
    state: Arc<AppState>,
    room_id: RoomId,
    connection_id: ConnectionId,
}

impl Drop for LeaveOnDrop {
    fn drop(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let state = self.state.clone();
        let room_id = self.room_id.clone();
        let connection_id = self.connection_id.clone();
        runtime.spawn(async move {
            if let Err(e) = state
                .leave_room_usecase
                .execute(&room_id, &connection_id)
                .await
            {
                tracing::debug!("Leave of '{}' after stream end: {}", connection_id, e);
            }
        });
    }
}
