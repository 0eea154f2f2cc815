//! WebSocket endpoint
//!
//! GET /ws  (bearer token in `Authorization`, or `?token=` for browsers)
//!
//! - Client → Server: `join-vendor-room` / `join-user-room` / `join-order-room`
//! - Server → Client: `joined-*` acks and order events fanned out by the router
//!
//! Joins the caller may not make are dropped without a reply.

use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::{AppError, ClientEvent};
use tokio::time::Duration;

use super::hub::ConnectionId;
use super::room::Room;
use crate::api::extract::ApiQuery;
use crate::auth::{CurrentUser, JwtService, Role, authenticate};
use crate::core::ServerState;
use crate::security_log;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// GET /ws
pub async fn handle_ws(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let header_token = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string);

    let Some(token) = header_token.or(query.token) else {
        security_log!("WARN", "auth_missing", uri = "/ws");
        return Err(AppError::unauthorized());
    };

    let user = authenticate(&state.get_jwt_service(), &token, "/ws")?;
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, user)))
}

async fn ws_session(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let (mut sink, mut stream) = socket.split();
    let (conn_id, mut frames) = state.hub.register(&user.id);

    tracing::info!(connection_id = conn_id, user_id = %user.id, role = user.role.as_str(), "WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            frame = frames.recv() => {
                match frame {
                    Some(frame) => {
                        if sink.send(Message::Text(Utf8Bytes::from(frame.to_string()))).await.is_err() {
                            break;
                        }
                    }
                    // hub closed the connection (shutdown)
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => handle_join(&state, &user, conn_id, &event).await,
                            Err(e) => {
                                tracing::debug!(connection_id = conn_id, error = %e, "Ignoring unknown client frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.unregister(conn_id);
    tracing::info!(connection_id = conn_id, user_id = %user.id, "WS disconnected");
}

async fn handle_join(state: &ServerState, user: &CurrentUser, conn_id: ConnectionId, event: &ClientEvent) {
    let Some(room) = Room::from_join(event) else {
        return;
    };

    if !may_join(state, user, &room).await {
        security_log!(
            "WARN",
            "room_join_denied",
            user_id = user.id.as_str(),
            room = room.to_string()
        );
        return;
    }

    if state.hub.join(conn_id, room.clone()) {
        state.hub.send_to(conn_id, &room.joined_event());
        tracing::debug!(connection_id = conn_id, room = %room, "Joined room");
    }
}

/// Whether `user` may receive events for `room`
async fn may_join(state: &ServerState, user: &CurrentUser, room: &Room) -> bool {
    if user.is_admin() {
        return true;
    }
    match room {
        Room::Vendor(vendor_id) => user.can_act_for_vendor(vendor_id),
        Room::Customer(user_id) => user.role == Role::Customer && &user.id == user_id,
        Room::Order(parent_id) => {
            if user.role != Role::Customer {
                return false;
            }
            let orders = state.orders.clone();
            let user_id = user.id.clone();
            let parent_id = parent_id.clone();
            match tokio::task::spawn_blocking(move || orders.owns_parent_order(&user_id, &parent_id))
                .await
            {
                Ok(Ok(owns)) => owns,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Ownership check failed");
                    false
                }
                Err(e) => {
                    tracing::error!(error = %e, "Ownership check task failed");
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::orders::{CheckoutInput, OrderStorage};
    use crate::realtime::hub::Frame;
    use shared::models::{Cart, CartItem, Vendor};
    use shared::order::PaymentMethod;
    use tokio::sync::mpsc;

    fn test_state() -> ServerState {
        let config = Config::with_overrides("./data-ws-test", 0).unwrap();
        ServerState::new(config, OrderStorage::open_in_memory().unwrap()).unwrap()
    }

    fn customer(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            role: Role::Customer,
            vendor_id: None,
            court_id: Some("court-1".to_string()),
        }
    }

    fn vendor_staff(vendor_id: &str) -> CurrentUser {
        CurrentUser {
            id: format!("staff-{}", vendor_id),
            role: Role::Vendor,
            vendor_id: Some(vendor_id.to_string()),
            court_id: Some("court-1".to_string()),
        }
    }

    /// Place one order for `user_id` and return its parent id
    fn place_order(state: &ServerState, user_id: &str) -> String {
        let storage = state.orders.storage();
        storage
            .put_vendor(&Vendor {
                id: "v-1".to_string(),
                court_id: "court-1".to_string(),
                name: "Dosa Corner".to_string(),
                is_active: true,
                estimated_preparation_time: None,
            })
            .unwrap();
        storage
            .put_cart(&Cart {
                user_id: user_id.to_string(),
                court_id: "court-1".to_string(),
                items: vec![CartItem {
                    vendor_id: "v-1".to_string(),
                    menu_item_id: "dosa".to_string(),
                    name: "Dosa".to_string(),
                    unit_price: 60.0,
                    quantity: 1,
                    customizations: vec![],
                }],
            })
            .unwrap();
        state
            .orders
            .checkout(CheckoutInput {
                user_id: user_id.to_string(),
                payment_method: PaymentMethod::Upi,
                special_instructions: None,
            })
            .unwrap()
            .parent_order_id
    }

    /// Run a join and return the ack event name, if any
    async fn join(
        state: &ServerState,
        user: &CurrentUser,
        conn: ConnectionId,
        frames: &mut mpsc::Receiver<Frame>,
        event: ClientEvent,
    ) -> Option<String> {
        handle_join(state, user, conn, &event).await;
        let frame = frames.try_recv().ok()?;
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        value["event"].as_str().map(str::to_string)
    }

    #[tokio::test]
    async fn test_vendor_joins_only_own_room() {
        let state = test_state();
        let user = vendor_staff("v-1");
        let (conn, mut frames) = state.hub.register(&user.id);

        let other = ClientEvent::JoinVendorRoom("v-2".to_string());
        assert_eq!(join(&state, &user, conn, &mut frames, other).await, None);
        assert_eq!(state.hub.room_size(&Room::Vendor("v-2".to_string())), 0);

        let customer_room = ClientEvent::JoinUserRoom("u-1".to_string());
        assert_eq!(join(&state, &user, conn, &mut frames, customer_room).await, None);
        assert_eq!(state.hub.room_size(&Room::Customer("u-1".to_string())), 0);

        let own = ClientEvent::JoinVendorRoom("v-1".to_string());
        assert_eq!(
            join(&state, &user, conn, &mut frames, own).await.as_deref(),
            Some("joined-vendor-room")
        );
        assert_eq!(state.hub.room_size(&Room::Vendor("v-1".to_string())), 1);
    }

    #[tokio::test]
    async fn test_customer_joins_only_own_user_room() {
        let state = test_state();
        let user = customer("u-1");
        let (conn, mut frames) = state.hub.register(&user.id);

        let other = ClientEvent::JoinUserRoom("u-2".to_string());
        assert_eq!(join(&state, &user, conn, &mut frames, other).await, None);

        let vendor_room = ClientEvent::JoinVendorRoom("v-1".to_string());
        assert_eq!(join(&state, &user, conn, &mut frames, vendor_room).await, None);

        let own = ClientEvent::JoinUserRoom("u-1".to_string());
        assert_eq!(
            join(&state, &user, conn, &mut frames, own).await.as_deref(),
            Some("joined-user-room")
        );
    }

    #[tokio::test]
    async fn test_order_room_requires_a_sub_order() {
        let state = test_state();
        let parent = place_order(&state, "u-1");

        let stranger = customer("u-2");
        let (conn, mut frames) = state.hub.register(&stranger.id);
        let event = ClientEvent::JoinOrderRoom(parent.clone());
        assert_eq!(join(&state, &stranger, conn, &mut frames, event).await, None);
        assert_eq!(state.hub.room_size(&Room::Order(parent.clone())), 0);

        // unknown parent
        let event = ClientEvent::JoinOrderRoom("p-missing".to_string());
        assert_eq!(join(&state, &stranger, conn, &mut frames, event).await, None);

        let owner = customer("u-1");
        let (conn, mut frames) = state.hub.register(&owner.id);
        let event = ClientEvent::JoinOrderRoom(parent.clone());
        assert_eq!(
            join(&state, &owner, conn, &mut frames, event).await.as_deref(),
            Some("joined-order-room")
        );
        assert_eq!(state.hub.room_size(&Room::Order(parent)), 1);
    }

    #[tokio::test]
    async fn test_vendor_cannot_join_order_room() {
        let state = test_state();
        let parent = place_order(&state, "u-1");

        let user = vendor_staff("v-1");
        let (conn, mut frames) = state.hub.register(&user.id);
        let event = ClientEvent::JoinOrderRoom(parent);
        assert_eq!(join(&state, &user, conn, &mut frames, event).await, None);
    }

    #[tokio::test]
    async fn test_admin_joins_any_room() {
        let state = test_state();
        let admin = CurrentUser {
            id: "admin-1".to_string(),
            role: Role::Admin,
            vendor_id: None,
            court_id: None,
        };
        let (conn, mut frames) = state.hub.register(&admin.id);

        let event = ClientEvent::JoinVendorRoom("v-9".to_string());
        assert_eq!(
            join(&state, &admin, conn, &mut frames, event).await.as_deref(),
            Some("joined-vendor-room")
        );
        let event = ClientEvent::JoinUserRoom("u-9".to_string());
        assert_eq!(
            join(&state, &admin, conn, &mut frames, event).await.as_deref(),
            Some("joined-user-room")
        );
    }
}
