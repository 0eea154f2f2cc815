//! Event Router - committed order changes to socket rooms
//!
//! ```text
//! OrdersManager (broadcast, commit order)
//!        │
//!        └── EventRouter
//!               ├── vendor:<id>    new-order / order-status-updated / order-removed
//!               ├── customer:<id>  order-placed / order-status-updated
//!               └── order:<parent> order-status-updated
//! ```
//!
//! One router task drains the broadcast so rooms see changes in commit order.
//! Delivery to each connection is best-effort (see [`FanoutHub::publish`]).

use shared::ServerEvent;
use shared::message::{
    CustomerStatusUpdate, NewOrder, OrderPlaced, OrderRemoved, OrderStatusUpdate,
    VendorStatusUpdate,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::orders::OrderChange;
use crate::realtime::{FanoutHub, Room};

/// Routes committed changes into the fan-out hub
pub struct EventRouter {
    hub: FanoutHub,
}

impl EventRouter {
    pub fn new(hub: FanoutHub) -> Self {
        Self { hub }
    }

    /// Run until the source closes or shutdown is requested
    pub async fn run(self, mut source: broadcast::Receiver<OrderChange>, shutdown: CancellationToken) {
        tracing::info!("Event router started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Event router stopping (shutdown)");
                    break;
                }
                change = source.recv() => match change {
                    Ok(change) => self.dispatch(&change),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // clients recover by refetching over HTTP
                        tracing::error!(skipped = n, "Event router lagged, changes not delivered");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Source channel closed, event router stopping");
                        break;
                    }
                }
            }
        }
    }

    fn dispatch(&self, change: &OrderChange) {
        for (room, event) in route(change) {
            let delivered = self.hub.publish(&room, &event);
            tracing::trace!(
                parent_order_id = %change.parent_order_id(),
                room = %room,
                event = event.name(),
                delivered,
                "Routed change"
            );
        }
    }
}

/// Frames a committed change produces, per room
pub fn route(change: &OrderChange) -> Vec<(Room, ServerEvent)> {
    match change {
        OrderChange::Placed {
            parent_order_id,
            user_id,
            orders,
        } => {
            let mut frames: Vec<(Room, ServerEvent)> = orders
                .iter()
                .map(|(order, counts)| {
                    (
                        Room::Vendor(order.vendor_id.clone()),
                        ServerEvent::NewOrder(NewOrder {
                            order: order.clone(),
                            section_counts: *counts,
                        }),
                    )
                })
                .collect();

            if let Some(user_id) = user_id {
                frames.push((
                    Room::Customer(user_id.clone()),
                    ServerEvent::OrderPlaced(OrderPlaced {
                        parent_order_id: parent_order_id.clone(),
                        orders: orders.iter().map(|(o, _)| o.clone()).collect(),
                    }),
                ));
            }
            frames
        }

        OrderChange::StatusChanged {
            order,
            action,
            section_counts,
        } => {
            let mut frames = Vec::with_capacity(3);

            let vendor_room = Room::Vendor(order.vendor_id.clone());
            match order.status.section() {
                Some(section) => frames.push((
                    vendor_room,
                    ServerEvent::OrderStatusUpdated(OrderStatusUpdate::Vendor(
                        VendorStatusUpdate {
                            section,
                            order: order.clone(),
                            action: *action,
                            section_counts: *section_counts,
                        },
                    )),
                )),
                // terminal
                None => frames.push((
                    vendor_room,
                    ServerEvent::OrderRemoved(OrderRemoved {
                        order_id: order.id.clone(),
                        section_counts: *section_counts,
                    }),
                )),
            }

            if let Some(user_id) = &order.user_id {
                let update = ServerEvent::OrderStatusUpdated(OrderStatusUpdate::Customer(
                    CustomerStatusUpdate {
                        parent_order_id: order.parent_order_id.clone(),
                        vendor_order: order.clone(),
                        action: *action,
                    },
                ));
                frames.push((Room::Customer(user_id.clone()), update.clone()));
                frames.push((Room::Order(order.parent_order_id.clone()), update));
            }
            frames
        }
    }
}
