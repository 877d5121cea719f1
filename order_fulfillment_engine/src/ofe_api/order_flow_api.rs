use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, StockFault},
    events::{EventProducers, OrderPlacedEvent},
    ofe_api::order_objects::PlacedOrder,
    traits::{FulfillmentDatabase, FulfillmentError},
};

/// `OrderFlowApi` handles the inbound half of the order lifecycle: turning a verified payment confirmation into an
/// authoritative order record and adjusting inventory for it.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: FulfillmentDatabase
{
    /// Record a new order for a payment the gateway has confirmed.
    ///
    /// The caller has already established that the confirmation is authentic; this method owns everything after
    /// that:
    /// * field validation for the chosen identity branch and the line items,
    /// * resolution of the fulfilling store from the referenced products,
    /// * idempotent insertion keyed on the gateway payment id: a replayed confirmation returns the stored order
    ///   and performs no further side effects,
    /// * the per-item conditional stock decrement, with failures reported as warnings rather than errors.
    pub async fn process_confirmed_payment(&self, order: NewOrder) -> Result<PlacedOrder, FulfillmentError> {
        validate_new_order(&order)?;
        let product_ids = order.items.iter().map(|i| i.product_id.clone()).collect::<Vec<_>>();
        let store_id = self.db.resolve_store_for_products(&product_ids).await?;
        let (stored, created) = self.db.insert_order(order, &store_id).await?;
        if !created {
            info!(
                "🔄️📦️ Confirmation for payment {} replayed. Returning existing order {} untouched.",
                stored.razorpay_payment_id.as_deref().unwrap_or("??"),
                stored.order_id
            );
            return Ok(PlacedOrder { order: stored, created: false, stock_faults: Vec::new() });
        }
        let stock_faults = self.db.adjust_stock_for_order(&stored).await?;
        for fault in &stock_faults {
            warn!(
                "🔄️📦️ Stock for product {} could not be reduced by {} on order {}: {}. Displayed stock may be \
                 out of sync until reconciled.",
                fault.product_id, fault.quantity, stored.order_id, fault.reason
            );
        }
        debug!("🔄️📦️ Order {} created for store {}", stored.order_id, stored.store_id);
        self.call_order_placed_hook(&stored, &stock_faults).await;
        Ok(PlacedOrder { order: stored, created: true, stock_faults })
    }

    async fn call_order_placed_hook(&self, order: &Order, stock_faults: &[StockFault]) {
        for emitter in &self.producers.order_placed_producer {
            trace!("🔄️📦️ Notifying order placed hook subscribers");
            let event = OrderPlacedEvent::new(order.clone(), stock_faults.to_vec());
            emitter.publish_event(event).await;
        }
    }
}

fn validate_new_order(order: &NewOrder) -> Result<(), FulfillmentError> {
    if order.items.is_empty() {
        return Err(FulfillmentError::InvalidOrder("An order must contain at least one item".to_string()));
    }
    if let Some(item) = order.items.iter().find(|i| i.quantity < 1) {
        return Err(FulfillmentError::InvalidOrder(format!(
            "Item {} has a non-positive quantity ({})",
            item.product_id, item.quantity
        )));
    }
    if let Some(item) = order.items.iter().find(|i| i.price.is_negative()) {
        return Err(FulfillmentError::InvalidOrder(format!("Item {} has a negative price", item.product_id)));
    }
    if order.shipping_fee.is_negative() {
        return Err(FulfillmentError::InvalidOrder("The shipping fee cannot be negative".to_string()));
    }
    if order.razorpay_payment_id.trim().is_empty() {
        return Err(FulfillmentError::InvalidOrder("The gateway payment id is missing".to_string()));
    }
    if let Some(guest) = order.customer.guest() {
        if !guest.is_complete() {
            return Err(FulfillmentError::InvalidOrder(
                "Guest checkout requires a name, email and phone number".to_string(),
            ));
        }
    }
    Ok(())
}
