use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CustomerIdentity, Order, OrderId, ShippingAddress, Store, StoreId, UserId},
    events::{CustomerContact, EventProducers, OrderUpdatedEvent},
    ofe_api::order_objects::OrderUpdate,
    traits::{FulfillmentDatabase, FulfillmentError, OrderManagement, OrderQueryError, StoreManagement},
};

/// `FulfillmentApi` is the seller-facing mutation surface. Every operation takes the acting store's id and treats it
/// as the authority scope: an order owned by a different store behaves as if it did not exist (except for the
/// address update, which deliberately distinguishes "missing" from "not yours", matching the dashboard contract).
pub struct FulfillmentApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for FulfillmentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B> FulfillmentApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> FulfillmentApi<B>
where B: StoreManagement
{
    /// The store the given (already authenticated) user owns. A user without one is not a seller and must be
    /// rejected before any order is touched.
    pub async fn store_for_owner(&self, owner: &UserId) -> Result<Option<Store>, OrderQueryError> {
        self.db.fetch_store_for_owner(owner).await
    }
}

impl<B> FulfillmentApi<B>
where B: FulfillmentDatabase + OrderManagement
{
    /// Applies a status/tracking patch to an order owned by the given store.
    ///
    /// The patch only carries the allow-listed fields; absent fields are untouched. A status change must be legal
    /// under the transition table: a same-status write is reported as a no-op, a backward or otherwise forbidden
    /// move as [`FulfillmentError::StatusTransitionForbidden`], and in both cases the stored order is untouched.
    ///
    /// When the status or any tracking field changed, an [`OrderUpdatedEvent`] is queued for the notification
    /// subscribers. Event delivery is decoupled from this call and can never fail it.
    pub async fn update_order(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Order, FulfillmentError> {
        if update.is_empty() {
            return Err(FulfillmentError::OrderModificationNoOp);
        }
        let existing = self
            .db
            .fetch_order_for_store(store_id, order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        if let Some(next) = update.status {
            if next == existing.status {
                return Err(FulfillmentError::OrderModificationNoOp);
            }
            if !existing.status.can_transition_to(next) {
                return Err(FulfillmentError::StatusTransitionForbidden { from: existing.status, to: next });
            }
        }
        let status_changed = update.status.is_some();
        let tracking_changed = update.touches_tracking();
        let updated = self
            .db
            .update_order(store_id, order_id, update)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        debug!("🚚️ Order {order_id} updated by store {store_id}. Status is now {}", updated.status);
        // contact resolution reads the user registry, so only do it when someone is listening
        if (status_changed || tracking_changed) && !self.producers.order_updated_producer.is_empty() {
            let contact = self.contact_for(&updated).await;
            let event = OrderUpdatedEvent {
                order: updated.clone(),
                previous_status: existing.status,
                status_changed,
                tracking_changed,
                contact,
            };
            self.call_order_updated_hook(event).await;
        }
        Ok(updated)
    }

    /// Sets the shipping address on an order. Unlike the other mutations this one reports ownership mismatches
    /// distinctly ([`FulfillmentError::OrderNotOwned`]) instead of hiding the order's existence.
    pub async fn update_shipping_address(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        address: ShippingAddress,
    ) -> Result<Order, FulfillmentError> {
        if !address.is_complete() {
            return Err(FulfillmentError::InvalidOrder(
                "Invalid address - street, city, and country are required".to_string(),
            ));
        }
        let existing =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        if &existing.store_id != store_id {
            return Err(FulfillmentError::OrderNotOwned);
        }
        let updated = self
            .db
            .set_shipping_address(store_id, order_id, address)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        debug!("🚚️ Shipping address set on order {order_id} by store {store_id}");
        Ok(updated)
    }

    /// Hard-removes an order owned by the given store.
    pub async fn delete_order(&self, store_id: &StoreId, order_id: &OrderId) -> Result<(), FulfillmentError> {
        let deleted = self.db.delete_order(store_id, order_id).await?;
        if deleted {
            info!("🚚️ Order {order_id} deleted by store {store_id}");
            Ok(())
        } else {
            Err(FulfillmentError::OrderNotFound(order_id.clone()))
        }
    }

    /// A single order, scoped by the owning store.
    pub async fn order_for_store(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
    ) -> Result<Option<Order>, OrderQueryError> {
        self.db.fetch_order_for_store(store_id, order_id).await
    }

    /// All of a store's orders, newest first.
    pub async fn orders_for_store(&self, store_id: &StoreId) -> Result<Vec<Order>, OrderQueryError> {
        self.db.fetch_orders_for_store(store_id).await
    }

    async fn call_order_updated_hook(&self, event: OrderUpdatedEvent) {
        for emitter in &self.producers.order_updated_producer {
            trace!("🚚️ Notifying order updated hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    /// Resolve who to notify about this order. Registered customers come from the user registry; guests carry their
    /// contact details on the order. The shipping address fills any gaps.
    async fn contact_for(&self, order: &Order) -> CustomerContact {
        let address = order.shipping_address.as_ref();
        let address_name = address.map(|a| a.name.clone()).filter(|n| !n.trim().is_empty());
        let address_email = address.map(|a| a.email.clone()).filter(|e| !e.trim().is_empty());
        let phone = order.contact_phone().map(String::from);
        match &order.customer {
            CustomerIdentity::Registered { user_id } => match self.db.fetch_user_contact(user_id).await {
                Ok(Some(contact)) => CustomerContact {
                    name: contact.name,
                    email: Some(contact.email).filter(|e| !e.trim().is_empty()).or(address_email),
                    phone,
                },
                Ok(None) => {
                    warn!("🚚️ No contact record for user {user_id}; falling back to the shipping address");
                    CustomerContact { name: address_name.unwrap_or_default(), email: address_email, phone }
                },
                Err(e) => {
                    warn!("🚚️ Could not fetch contact for user {user_id}: {e}");
                    CustomerContact { name: address_name.unwrap_or_default(), email: address_email, phone }
                },
            },
            CustomerIdentity::Guest(guest) => CustomerContact {
                name: guest.name.clone(),
                email: Some(guest.email.clone()).filter(|e| !e.trim().is_empty()).or(address_email),
                phone,
            },
        }
    }
}
