//! OrdersManager - transactional order lifecycle and change broadcasting
//!
//! Every mutation follows the same shape:
//!
//! ```text
//! mutate(...)
//!     ├─ 1. Take the commit lock
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Load and check current state
//!     ├─ 4. Apply the change (splitter / state machine / refund bookkeeping)
//!     ├─ 5. Persist rows and index entries
//!     ├─ 6. Recompute vendor section counts inside the transaction
//!     ├─ 7. Commit
//!     ├─ 8. Broadcast the OrderChange (still under the lock)
//!     └─ 9. Return
//! ```
//!
//! Any error before step 7 drops the transaction, which aborts it: nothing
//! is persisted and nothing is broadcast. Holding the lock through step 8
//! makes broadcast order equal commit order.

mod error;
pub use error::*;

use super::aggregate;
use super::change::OrderChange;
use super::queue::{self, SectionFilter, SectionPage};
use super::splitter::{ChargeRates, CheckoutInput, split_cart};
use super::state_machine::{self, TransitionContext};
use super::storage::{OrderStorage, StorageError};
use parking_lot::Mutex;
use shared::models::Vendor;
use shared::order::{
    OrderDetail, OrderStatus, OrderSummary, PaymentStatus, RefundStatus, SectionCounts, SubOrder,
    VendorAction,
};
use shared::response::CheckoutResponse;
use shared::types::Pagination;
use shared::util::now_millis;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::broadcast;

/// Default change broadcast capacity
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Inputs of a state machine action besides the action itself
#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    /// User id recorded in the history entry
    pub actor: String,
    pub otp: Option<String>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub estimated_preparation_time: Option<u32>,
}

impl ActionInput {
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            ..Default::default()
        }
    }
}

/// Filters of the customer order list
#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    pub parent_order_id: Option<String>,
    /// Matches when any sibling is in this status
    pub status: Option<OrderStatus>,
    pub active_only: bool,
    pub page: u32,
    pub limit: u32,
}

/// OrdersManager for the order core
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderChange>,
    /// Serializes commit + broadcast
    commit_lock: Mutex<()>,
    rates: ChargeRates,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("rates", &self.rates)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        rates: ChargeRates,
        channel_capacity: usize,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::with_storage(storage, rates, channel_capacity))
    }

    /// Create an OrdersManager with existing storage
    pub fn with_storage(storage: OrderStorage, rates: ChargeRates, channel_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            storage,
            event_tx,
            commit_lock: Mutex::new(()),
            rates,
        }
    }

    /// Subscribe to committed changes
    pub fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    fn broadcast(&self, change: OrderChange) {
        if self.event_tx.send(change).is_err() {
            tracing::debug!("Order change not broadcast: no active receivers");
        }
    }

    // ========== Checkout ==========

    /// Split the user's cart into per-vendor sub-orders and clear the cart
    pub fn checkout(&self, input: CheckoutInput) -> ManagerResult<CheckoutResponse> {
        let _guard = self.commit_lock.lock();
        let txn = self.storage.begin_write()?;

        let cart = self
            .storage
            .get_cart_txn(&txn, &input.user_id)?
            .ok_or(ManagerError::EmptyCart)?;
        if cart.is_empty() {
            return Err(ManagerError::EmptyCart);
        }

        let mut vendors: HashMap<String, Vendor> = HashMap::new();
        for vendor_id in cart.vendor_ids() {
            if let Some(vendor) = self.storage.get_vendor_txn(&txn, vendor_id)? {
                vendors.insert(vendor.id.clone(), vendor);
            }
        }

        let plan = split_cart(&cart, &vendors, &self.rates, &input, now_millis())?;

        for order in &plan.orders {
            self.storage.insert_order_txn(&txn, order)?;
        }
        for payment in &plan.payments {
            self.storage.put_payment_txn(&txn, payment)?;
        }
        self.storage.clear_cart_txn(&txn, &input.user_id)?;

        let mut placed = Vec::with_capacity(plan.orders.len());
        for order in &plan.orders {
            let active = self.storage.active_vendor_orders_txn(&txn, &order.vendor_id)?;
            placed.push((order.clone(), queue::section_counts(&active)));
        }

        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            parent_order_id = %plan.parent_order_id,
            user_id = %input.user_id,
            vendors = plan.orders.len(),
            total = plan.total_amount(),
            "Checkout committed"
        );

        self.broadcast(OrderChange::Placed {
            parent_order_id: plan.parent_order_id.clone(),
            user_id: Some(input.user_id.clone()),
            orders: placed,
        });

        let total_amount = plan.total_amount();
        Ok(CheckoutResponse {
            parent_order_id: plan.parent_order_id,
            order_otp: plan.order_otp,
            orders: plan.orders,
            total_amount,
            charges: plan.charges,
        })
    }

    // ========== State machine ==========

    /// Apply a vendor action to one of the vendor's sub-orders
    pub fn apply_action(
        &self,
        vendor_id: &str,
        order_id: &str,
        action: VendorAction,
        input: &ActionInput,
    ) -> ManagerResult<SubOrder> {
        self.transition(order_id, action, input, |order| {
            // other vendors' orders are reported as missing
            if order.vendor_id != vendor_id {
                return Err(ManagerError::OrderNotFound(order_id.to_string()));
            }
            Ok(())
        })
    }

    /// Customer cancellation; only the owner, only while pending
    pub fn customer_cancel(
        &self,
        user_id: &str,
        order_id: &str,
        reason: Option<String>,
    ) -> ManagerResult<SubOrder> {
        let input = ActionInput {
            actor: user_id.to_string(),
            reason,
            ..Default::default()
        };
        self.transition(order_id, VendorAction::Cancel, &input, |order| {
            if order.user_id.as_deref() != Some(user_id) {
                return Err(ManagerError::AccessDenied(format!(
                    "Order {} does not belong to the caller",
                    order_id
                )));
            }
            if order.status != OrderStatus::Pending {
                return Err(ManagerError::InvalidTransition {
                    order_id: order_id.to_string(),
                    status: order.status,
                    action: VendorAction::Cancel,
                });
            }
            Ok(())
        })
    }

    fn transition(
        &self,
        order_id: &str,
        action: VendorAction,
        input: &ActionInput,
        authorize: impl FnOnce(&SubOrder) -> ManagerResult<()>,
    ) -> ManagerResult<SubOrder> {
        let _guard = self.commit_lock.lock();
        let txn = self.storage.begin_write()?;

        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        authorize(&order)?;

        state_machine::ensure_can_apply(order.status, action)
            .map_err(|e| ManagerError::transition(order_id, e))?;

        let queue_position = if action == VendorAction::Accept {
            let active = self.storage.active_vendor_orders_txn(&txn, &order.vendor_id)?;
            Some(queue::next_queue_position(&active))
        } else {
            None
        };

        let now = now_millis();
        let ctx = TransitionContext {
            now,
            actor: &input.actor,
            otp: input.otp.as_deref(),
            reason: input.reason.as_deref(),
            note: input.note.as_deref(),
            queue_position,
            estimated_preparation_time: input.estimated_preparation_time,
        };
        state_machine::apply(&mut order, action, &ctx)
            .map_err(|e| ManagerError::transition(order_id, e))?;

        self.storage.update_order_txn(&txn, &order)?;

        if action == VendorAction::Complete {
            let mut payment = self
                .storage
                .get_payment_txn(&txn, order_id)?
                .ok_or_else(|| ManagerError::PaymentNotFound(order_id.to_string()))?;
            payment.status = PaymentStatus::Completed;
            payment.completed_at = Some(now);
            payment.updated_at = now;
            self.storage.put_payment_txn(&txn, &payment)?;
        }

        let active = self.storage.active_vendor_orders_txn(&txn, &order.vendor_id)?;
        let section_counts = queue::section_counts(&active);

        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            action = %action,
            status = %order.status,
            queue_position = ?order.queue_position,
            "Order transition committed"
        );

        self.broadcast(OrderChange::StatusChanged {
            order: order.clone(),
            action,
            section_counts,
        });

        Ok(order)
    }

    // ========== Refund bookkeeping ==========

    /// Record the refund outcome of a rejected or cancelled sub-order
    ///
    /// Not a status transition; the status history is left alone.
    pub fn update_refund(
        &self,
        vendor_id: &str,
        order_id: &str,
        refund_status: RefundStatus,
    ) -> ManagerResult<SubOrder> {
        if refund_status == RefundStatus::Pending {
            return Err(ManagerError::Validation(
                "Refund status must be processed or failed".to_string(),
            ));
        }

        let _guard = self.commit_lock.lock();
        let txn = self.storage.begin_write()?;

        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .filter(|o| o.vendor_id == vendor_id)
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        if !matches!(order.status, OrderStatus::Rejected | OrderStatus::Cancelled) {
            return Err(ManagerError::RefundNotAllowed(order.id, order.status));
        }
        if order.refund_status == Some(RefundStatus::Processed) {
            return Err(ManagerError::PaymentAlreadyRefunded(order.id));
        }

        let now = now_millis();
        order.refund_status = Some(refund_status);
        if order.refund_amount.is_none() {
            order.refund_amount = Some(order.total_amount);
        }
        order.updated_at = now;
        self.storage.update_order_txn(&txn, &order)?;

        if refund_status == RefundStatus::Processed {
            let mut payment = self
                .storage
                .get_payment_txn(&txn, order_id)?
                .ok_or_else(|| ManagerError::PaymentNotFound(order_id.to_string()))?;
            payment.status = PaymentStatus::Refunded;
            payment.refunded_at = Some(now);
            payment.updated_at = now;
            self.storage.put_payment_txn(&txn, &payment)?;
        }

        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            refund_status = ?refund_status,
            refund_amount = ?order.refund_amount,
            "Refund status updated"
        );
        Ok(order)
    }

    // ========== Vendor queue ==========

    /// One page of a vendor queue section plus live counts
    pub fn list_section(&self, vendor_id: &str, filter: &SectionFilter) -> ManagerResult<SectionPage> {
        let active = self.storage.active_vendor_orders(vendor_id)?;
        Ok(queue::list_section(active, filter))
    }

    /// Live section counts of a vendor
    pub fn section_counts(&self, vendor_id: &str) -> ManagerResult<SectionCounts> {
        let active = self.storage.active_vendor_orders(vendor_id)?;
        Ok(queue::section_counts(&active))
    }

    // ========== Customer view ==========

    /// Whether the user owns at least one sub-order of the parent order
    pub fn owns_parent_order(&self, user_id: &str, parent_order_id: &str) -> ManagerResult<bool> {
        let siblings = self.storage.sibling_orders(parent_order_id)?;
        Ok(siblings
            .iter()
            .any(|o| o.user_id.as_deref() == Some(user_id)))
    }

    /// The user's parent orders, newest first
    pub fn order_summaries(
        &self,
        user_id: &str,
        filter: &SummaryFilter,
    ) -> ManagerResult<(Vec<OrderSummary>, Pagination)> {
        let parent_ids = match &filter.parent_order_id {
            Some(id) => vec![id.clone()],
            None => self.storage.user_parent_ids(user_id)?,
        };

        let mut summaries = Vec::new();
        for parent_id in parent_ids {
            let siblings = self.storage.sibling_orders(&parent_id)?;
            if !siblings.iter().any(|o| o.user_id.as_deref() == Some(user_id)) {
                continue;
            }
            if let Some(status) = filter.status
                && !siblings.iter().any(|o| o.status == status)
            {
                continue;
            }
            let Some(summary) = aggregate::summarize(&siblings) else {
                continue;
            };
            if filter.active_only && !aggregate::is_active(summary.overall_status) {
                continue;
            }
            summaries.push(summary);
        }

        let pagination = Pagination::new(filter.page, filter.limit, summaries.len() as u64);
        let page = summaries
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit as usize)
            .collect();
        Ok((page, pagination))
    }

    /// Full detail of one parent order owned by the user
    pub fn order_detail(&self, user_id: &str, parent_order_id: &str) -> ManagerResult<OrderDetail> {
        let siblings = self.storage.sibling_orders(parent_order_id)?;
        if siblings.is_empty() {
            return Err(ManagerError::OrderNotFound(parent_order_id.to_string()));
        }
        if !siblings.iter().any(|o| o.user_id.as_deref() == Some(user_id)) {
            return Err(ManagerError::AccessDenied(format!(
                "Order {} does not belong to the caller",
                parent_order_id
            )));
        }

        let mut payments = Vec::with_capacity(siblings.len());
        for order in &siblings {
            if let Some(payment) = self.storage.get_payment(&order.id)? {
                payments.push(payment);
            }
        }

        aggregate::detail(siblings, payments)
            .ok_or_else(|| ManagerError::OrderNotFound(parent_order_id.to_string()))
    }
}

#[cfg(test)]
mod tests;
