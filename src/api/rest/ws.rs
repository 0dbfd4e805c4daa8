use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{RecordFilter, RecordStream};
use crate::error::AppError;
use crate::models::delivery::{DeliveryRecord, DeliveryStatus, Party};
use crate::models::view::{CourierView, CustomerView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WatchParams {
    pub role: Party,
    pub delivery_id: Option<Uuid>,
    pub status: Option<DeliveryStatus>,
}

impl WatchParams {
    pub fn filter(&self) -> Result<RecordFilter, AppError> {
        match (self.delivery_id, self.status) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "delivery_id and status cannot be combined".to_string(),
            )),
            (Some(id), None) => Ok(RecordFilter::Delivery(id)),
            (None, Some(status)) => Ok(RecordFilter::Status(status)),
            (None, None) => Ok(RecordFilter::All),
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WatchParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.filter()?;
    let role = params.role;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, role, filter)))
}

fn view_json(role: Party, record: &DeliveryRecord) -> serde_json::Result<String> {
    match role {
        Party::Courier => serde_json::to_string(&CourierView::from(record)),
        Party::Customer => serde_json::to_string(&CustomerView::from(record)),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, role: Party, filter: RecordFilter) {
    let (sender, receiver) = socket.split();
    let changes = state.engine.watch(filter);

    info!(%role, ?filter, "websocket client connected");
    pump_changes(changes, role, sender, receiver).await;
    info!(%role, "websocket client disconnected");
}

// Returns once either side finishes; both halves, and with them the
// subscription, are dropped before returning.
async fn pump_changes<S, R, E>(mut changes: RecordStream, role: Party, mut sender: S, mut receiver: R)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    let forward = async {
        while let Some(record) = changes.next().await {
            let json = match view_json(role, &record) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize delivery for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    };

    let drain = async { while let Some(Ok(_msg)) = receiver.next().await {} };

    tokio::select! {
        _ = forward => {},
        _ = drain => {},
    }
}
